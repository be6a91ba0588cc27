pub mod analytics_aggregator;
pub mod analytics_summary;
pub mod clock;
pub mod global_identity;
