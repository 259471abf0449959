//! Core data models for draw analytics.

mod combination;
mod draw;
mod ids;
mod index;
mod stats;

pub use combination::*;
pub use draw::*;
pub use ids::*;
pub use index::*;
pub use stats::*;
