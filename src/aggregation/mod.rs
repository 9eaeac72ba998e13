pub mod algorithm;
pub mod config;

pub use algorithm::{VisitTracker, VisitTransition};
pub use config::AggregationConfig;
