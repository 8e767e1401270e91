//! Public coding-activity summary for a source-hosting user.
//!
//! The entry point is [`get_user_stats`]: it lists the user's repositories,
//! fetches per-repository metrics on a best-effort basis, folds them into
//! running totals and derives the final labeled stat list.

pub mod aggregate;
pub mod analysis;
pub mod config;
pub mod engine;
pub mod error;
pub mod github;
pub mod loc;
pub mod report;
pub mod stats;

pub use config::{EngineConfig, LocMode};
pub use engine::get_user_stats;
pub use error::{Metric, StatsError, StatsResult};
pub use stats::{ResultEnvelope, StatEntry, StatValue};
