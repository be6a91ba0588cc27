use std::collections::BTreeMap;

use crate::analytics::domain::analytics_summary::{AnalyticsSummary, PersonSummary};
use crate::analytics::domain::clock::Clock;
use crate::analytics::domain::global_identity::GlobalIdentity;
use crate::analytics::infrastructure::system_clock::SystemClock;
use crate::shared::ids::{CameraId, GlobalId};
use crate::shared::track::ResolvedTrack;

/// Per-identity presence statistics built from resolved track batches.
///
/// Every record in one batch is stamped with the same ingestion time.
/// Queries never mutate and the summary is rebuilt on every call.
pub struct AnalyticsAggregator {
    people: BTreeMap<GlobalId, GlobalIdentity>,
    clock: Box<dyn Clock>,
    batches_ingested: u64,
}

impl AnalyticsAggregator {
    pub fn new() -> Self {
        Self::with_clock(Box::new(SystemClock))
    }

    pub fn with_clock(clock: Box<dyn Clock>) -> Self {
        Self {
            people: BTreeMap::new(),
            clock,
            batches_ingested: 0,
        }
    }

    pub fn ingest(&mut self, camera_id: &CameraId, batch: &[ResolvedTrack]) {
        self.batches_ingested += 1;
        let now = self.clock.now();

        for record in batch {
            match self.people.get_mut(&record.global_id) {
                Some(person) => person.observe(camera_id, &record.bbox, now),
                None => {
                    self.people.insert(
                        record.global_id,
                        GlobalIdentity::new(record.global_id, camera_id, &record.bbox, now),
                    );
                }
            }
        }
    }

    /// Distinct identities ever observed.
    pub fn unique_count(&self) -> usize {
        self.people.len()
    }

    /// Seconds between first and last observation, 0 for unknown ids.
    pub fn dwell_time(&self, global_id: GlobalId) -> f64 {
        self.people
            .get(&global_id)
            .map_or(0.0, GlobalIdentity::dwell_time)
    }

    pub fn camera_count(&self, global_id: GlobalId) -> usize {
        self.people
            .get(&global_id)
            .map_or(0, GlobalIdentity::camera_count)
    }

    pub fn identity(&self, global_id: GlobalId) -> Option<&GlobalIdentity> {
        self.people.get(&global_id)
    }

    /// Identities seen over a non-zero span of time.
    pub fn active_count(&self) -> usize {
        self.people.values().filter(|p| p.dwell_time() > 0.0).count()
    }

    pub fn batches_ingested(&self) -> u64 {
        self.batches_ingested
    }

    pub fn summary(&self) -> AnalyticsSummary {
        AnalyticsSummary {
            unique_people: self.unique_count(),
            people: self
                .people
                .values()
                .map(|p| PersonSummary {
                    global_id: p.global_id(),
                    dwell_time: p.dwell_time(),
                    frames: p.frame_count(),
                    cameras: p.cameras().to_vec(),
                })
                .collect(),
        }
    }
}

impl Default for AnalyticsAggregator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analytics::infrastructure::manual_clock::ManualClock;
    use crate::shared::bbox::BoundingBox;
    use approx::assert_relative_eq;

    fn record(local_id: u32, global_id: u64, bbox: BoundingBox) -> ResolvedTrack {
        ResolvedTrack {
            bbox,
            local_id,
            global_id: GlobalId::new(global_id),
        }
    }

    fn aggregator() -> (AnalyticsAggregator, ManualClock) {
        let clock = ManualClock::new(1000.0);
        (AnalyticsAggregator::with_clock(Box::new(clock.clone())), clock)
    }

    #[test]
    fn test_new_identity_record() {
        let (mut agg, _clock) = aggregator();
        agg.ingest(
            &CameraId::from("A"),
            &[record(1, 1, BoundingBox::new(0, 0, 10, 30))],
        );

        let person = agg.identity(GlobalId::new(1)).unwrap();
        assert_eq!(person.frame_count(), 1);
        assert_relative_eq!(person.first_seen(), 1000.0);
        assert_relative_eq!(person.last_seen(), 1000.0);
        assert_eq!(person.trajectory(), &[(5, 15)]);
        assert_eq!(agg.unique_count(), 1);
    }

    #[test]
    fn test_dwell_time_follows_clock() {
        let (mut agg, clock) = aggregator();
        let cam = CameraId::from("A");
        let bbox = BoundingBox::new(0, 0, 10, 10);

        agg.ingest(&cam, &[record(1, 1, bbox)]);
        clock.advance(2.5);
        agg.ingest(&cam, &[record(1, 1, bbox)]);

        assert_relative_eq!(agg.dwell_time(GlobalId::new(1)), 2.5);
        assert_eq!(agg.active_count(), 1);
    }

    #[test]
    fn test_unknown_identity_queries_are_zero() {
        let (agg, _clock) = aggregator();
        assert_relative_eq!(agg.dwell_time(GlobalId::new(4)), 0.0);
        assert_eq!(agg.camera_count(GlobalId::new(4)), 0);
        assert!(agg.identity(GlobalId::new(4)).is_none());
    }

    #[test]
    fn test_cameras_are_deduplicated() {
        let (mut agg, _clock) = aggregator();
        let bbox = BoundingBox::new(0, 0, 10, 10);
        agg.ingest(&CameraId::from("A"), &[record(1, 1, bbox)]);
        agg.ingest(&CameraId::from("B"), &[record(7, 1, bbox)]);
        agg.ingest(&CameraId::from("A"), &[record(1, 1, bbox)]);

        assert_eq!(agg.camera_count(GlobalId::new(1)), 2);
        assert_eq!(agg.identity(GlobalId::new(1)).unwrap().frame_count(), 3);
    }

    #[test]
    fn test_trajectory_only_grows_when_observed() {
        let (mut agg, _clock) = aggregator();
        let cam = CameraId::from("A");
        agg.ingest(&cam, &[record(1, 1, BoundingBox::new(0, 0, 2, 2))]);
        agg.ingest(&cam, &[record(2, 2, BoundingBox::new(0, 0, 4, 4))]);
        agg.ingest(&cam, &[record(1, 1, BoundingBox::new(2, 2, 4, 4))]);

        assert_eq!(agg.identity(GlobalId::new(1)).unwrap().trajectory(), &[(1, 1), (3, 3)]);
        assert_eq!(agg.identity(GlobalId::new(2)).unwrap().trajectory(), &[(2, 2)]);
    }

    #[test]
    fn test_empty_batch_counts_but_creates_nothing() {
        let (mut agg, _clock) = aggregator();
        agg.ingest(&CameraId::from("A"), &[]);
        assert_eq!(agg.batches_ingested(), 1);
        assert_eq!(agg.unique_count(), 0);
        assert!(agg.summary().people.is_empty());
    }

    #[test]
    fn test_summary_is_sorted_and_fresh() {
        let (mut agg, clock) = aggregator();
        let bbox = BoundingBox::new(0, 0, 10, 10);
        agg.ingest(&CameraId::from("B"), &[record(3, 2, bbox)]);
        agg.ingest(&CameraId::from("A"), &[record(1, 1, bbox)]);

        let before = agg.summary();
        assert_eq!(before.unique_people, 2);
        let ids: Vec<u64> = before.people.iter().map(|p| p.global_id.value()).collect();
        assert_eq!(ids, vec![1, 2]);

        clock.advance(1.0);
        agg.ingest(&CameraId::from("A"), &[record(1, 1, bbox)]);
        let after = agg.summary();
        assert_eq!(after.person(GlobalId::new(1)).unwrap().frames, 2);
        assert_eq!(before.person(GlobalId::new(1)).unwrap().frames, 1);
    }
}
