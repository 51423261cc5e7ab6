//! # cf-engine — ClusterForge Spin Resolution Engine
//!
//! A deterministic cluster-pays slot engine: fill a board, find
//! adjacency clusters, pay them, cascade, repeat until stable — and emit
//! the whole resolution as a replayable timeline of events.
//!
//! ## Architecture
//!
//! ```text
//! ClusterEngine
//!     │
//!     ├── SpinRng (seeded 32-bit mixer)
//!     ├── SymbolCatalog (weights, match rules, payouts)
//!     ├── Grid (column-major board)
//!     │     ├── sampler (weighted draws)
//!     │     ├── cluster (flood-fill detection)
//!     │     └── cascade (filtered-append refill)
//!     └── payout (cluster wins, multipliers)
//!           │
//!           v
//!     SpinOutcome → Vec<TimelineEvent>
//! ```
//!
//! The engine is pure, synchronous state computation: no I/O, no
//! suspension points, no rendering knowledge. Rendering and the bonus
//! mini-game are collaborators on the other side of the timeline.

pub mod cascade;
pub mod cluster;
pub mod config;
pub mod engine;
pub mod error;
pub mod grid;
pub mod payout;
pub mod rng;
pub mod sampler;
pub mod symbols;

pub use config::*;
pub use engine::*;
pub use error::*;
pub use grid::*;
pub use rng::*;
pub use symbols::*;

pub use cluster::{Cluster, ClusterCell};
pub use payout::StepPayout;
