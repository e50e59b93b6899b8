//! Analysis modules.
//!
//! Decoding, attribution, classification and aggregation of session log
//! events.

pub mod aggregator;
pub mod classifier;
pub mod decoder;
pub mod resolver;

pub use aggregator::{AggregateState, Aggregator};
pub use resolver::ActorResolver;
