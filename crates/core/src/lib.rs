//! Cross-camera identity fusion and presence analytics.
//!
//! Per-camera trackers report confirmed local tracks with appearance
//! embeddings; the [`IdentityResolver`] binds each local track to a global
//! identity shared across cameras, and the [`AnalyticsAggregator`] keeps
//! dwell time, camera coverage and trajectories per identity.

pub mod analytics;
pub mod identity;
pub mod pipeline;
pub mod shared;

pub use analytics::domain::analytics_aggregator::AnalyticsAggregator;
pub use analytics::domain::analytics_summary::{AnalyticsSummary, PersonSummary};
pub use identity::domain::embedding_gallery::EmbeddingGallery;
pub use identity::domain::identity_resolver::IdentityResolver;
pub use pipeline::fusion_engine::FusionEngine;
pub use shared::config::FusionConfig;
