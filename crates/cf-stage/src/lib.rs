//! # cf-stage — ClusterForge Timeline System
//!
//! Defines the canonical timeline events a cluster-pays spin resolves into.
//! The rendering layer never understands engine internals — only EVENTS.
//!
//! ## Philosophy
//!
//! Every spin, regardless of game theme, passes through the same semantic
//! moments: the board lands → symbols transform → clusters explode and the
//! board cascades → bonuses settle. This crate defines those moments as an
//! ordered, append-only event log that can be replayed against any renderer.
//!
//! Each event carries a full grid snapshot, the deltas that produced it, and
//! the running win totals, so playback needs no access to engine state.

pub mod event;
pub mod stage;
pub mod taxonomy;
pub mod trace;

pub use event::*;
pub use stage::*;
pub use taxonomy::*;
pub use trace::*;
