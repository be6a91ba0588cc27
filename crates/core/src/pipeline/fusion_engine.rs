use std::time::Instant;

use crate::analytics::domain::analytics_aggregator::AnalyticsAggregator;
use crate::analytics::domain::analytics_summary::AnalyticsSummary;
use crate::identity::domain::identity_resolver::IdentityResolver;
use crate::pipeline::pipeline_logger::{NullPipelineLogger, PipelineLogger};
use crate::shared::config::FusionConfig;
use crate::shared::ids::CameraId;
use crate::shared::track::{CameraFrame, LocalTrack, ResolvedTrack};

/// The single mutation domain: identity resolution followed by analytics
/// ingestion for one camera frame at a time.
///
/// Owns all fusion state; nothing is global, so independent engines (one
/// per site, say) never interfere. Callers that feed several cameras
/// concurrently must serialize access, see
/// [`ThreadedFusionExecutor`](crate::pipeline::infrastructure::threaded_fusion_executor::ThreadedFusionExecutor).
pub struct FusionEngine {
    resolver: IdentityResolver,
    aggregator: AnalyticsAggregator,
    logger: Box<dyn PipelineLogger>,
    frames_processed: u64,
}

impl FusionEngine {
    pub fn new(config: &FusionConfig) -> Self {
        Self::from_parts(IdentityResolver::new(config), AnalyticsAggregator::new())
    }

    pub fn from_parts(resolver: IdentityResolver, aggregator: AnalyticsAggregator) -> Self {
        Self {
            resolver,
            aggregator,
            logger: Box::new(NullPipelineLogger),
            frames_processed: 0,
        }
    }

    pub fn with_logger(mut self, logger: Box<dyn PipelineLogger>) -> Self {
        self.logger = logger;
        self
    }

    /// Resolves one camera's tracks and records the result.
    ///
    /// Returns the resolved tracks in input order for rendering or
    /// reporting. Skipped tracks are absent.
    pub fn process_tracks(
        &mut self,
        camera_id: &CameraId,
        tracks: &[LocalTrack],
    ) -> Vec<ResolvedTrack> {
        let start = Instant::now();
        let resolved = self.resolver.resolve_batch(camera_id, tracks);
        self.logger.timing("resolve", elapsed_ms(start));

        let start = Instant::now();
        self.aggregator.ingest(camera_id, &resolved);
        self.logger.timing("ingest", elapsed_ms(start));

        self.logger.metric("tracks_in", tracks.len() as f64);
        self.logger.metric("tracks_resolved", resolved.len() as f64);
        self.frames_processed += 1;
        self.logger.progress(self.frames_processed);

        resolved
    }

    pub fn process(&mut self, frame: &CameraFrame) -> Vec<ResolvedTrack> {
        self.process_tracks(&frame.camera_id, &frame.tracks)
    }

    pub fn summary(&self) -> AnalyticsSummary {
        self.aggregator.summary()
    }

    pub fn resolver(&self) -> &IdentityResolver {
        &self.resolver
    }

    pub fn aggregator(&self) -> &AnalyticsAggregator {
        &self.aggregator
    }

    pub fn frames_processed(&self) -> u64 {
        self.frames_processed
    }

    /// Emits the logger's end-of-run report.
    pub fn finish(&mut self) {
        self.logger.info(&self.report_line());
        self.logger.summary();
    }

    fn report_line(&self) -> String {
        format!(
            "{} unique people ({} active) across {} camera frames",
            self.aggregator.unique_count(),
            self.aggregator.active_count(),
            self.frames_processed
        )
    }
}

fn elapsed_ms(start: Instant) -> f64 {
    start.elapsed().as_secs_f64() * 1000.0
}
