pub mod query;
pub mod retention;
pub mod timeframe;

pub use query::filter_by_timeframe;
pub use timeframe::Timeframe;
