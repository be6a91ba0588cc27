pub mod fusion_engine;
pub mod infrastructure;
pub mod pipeline_logger;
