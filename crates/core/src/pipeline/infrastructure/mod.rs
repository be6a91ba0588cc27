pub mod threaded_fusion_executor;
