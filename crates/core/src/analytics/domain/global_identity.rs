use crate::analytics::domain::clock::Timestamp;
use crate::shared::bbox::{BoundingBox, Point};
use crate::shared::ids::{CameraId, GlobalId};

/// Presence record of one global identity.
///
/// Created on first observation and never removed. `last_seen` never
/// moves backwards, even if the clock does.
#[derive(Clone, Debug, PartialEq)]
pub struct GlobalIdentity {
    global_id: GlobalId,
    cameras: Vec<CameraId>,
    first_seen: Timestamp,
    last_seen: Timestamp,
    frame_count: u64,
    trajectory: Vec<Point>,
}

impl GlobalIdentity {
    pub fn new(
        global_id: GlobalId,
        camera_id: &CameraId,
        bbox: &BoundingBox,
        now: Timestamp,
    ) -> Self {
        Self {
            global_id,
            cameras: vec![camera_id.clone()],
            first_seen: now,
            last_seen: now,
            frame_count: 1,
            trajectory: vec![bbox.center()],
        }
    }

    pub fn observe(&mut self, camera_id: &CameraId, bbox: &BoundingBox, now: Timestamp) {
        self.last_seen = self.last_seen.max(now);
        self.frame_count += 1;
        if !self.cameras.contains(camera_id) {
            self.cameras.push(camera_id.clone());
        }
        self.trajectory.push(bbox.center());
    }

    pub fn global_id(&self) -> GlobalId {
        self.global_id
    }

    /// Cameras that have seen this identity, in order of first sighting.
    pub fn cameras(&self) -> &[CameraId] {
        &self.cameras
    }

    pub fn first_seen(&self) -> Timestamp {
        self.first_seen
    }

    pub fn last_seen(&self) -> Timestamp {
        self.last_seen
    }

    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    /// Bounding-box centers, one per observation.
    pub fn trajectory(&self) -> &[Point] {
        &self.trajectory
    }

    pub fn dwell_time(&self) -> f64 {
        self.last_seen - self.first_seen
    }

    pub fn camera_count(&self) -> usize {
        self.cameras.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn bbox(x1: i32, y1: i32, x2: i32, y2: i32) -> BoundingBox {
        BoundingBox::new(x1, y1, x2, y2)
    }

    #[test]
    fn test_new_record() {
        let person =
            GlobalIdentity::new(GlobalId::FIRST, &CameraId::from("A"), &bbox(0, 0, 10, 20), 5.0);
        assert_eq!(person.frame_count(), 1);
        assert_eq!(person.cameras(), &[CameraId::from("A")]);
        assert_eq!(person.trajectory(), &[(5, 10)]);
        assert_relative_eq!(person.dwell_time(), 0.0);
    }

    #[test]
    fn test_observe_updates_all_fields() {
        let mut person =
            GlobalIdentity::new(GlobalId::FIRST, &CameraId::from("A"), &bbox(0, 0, 10, 20), 5.0);
        person.observe(&CameraId::from("B"), &bbox(10, 10, 20, 20), 7.5);
        person.observe(&CameraId::from("A"), &bbox(20, 20, 30, 30), 9.0);

        assert_eq!(person.frame_count(), 3);
        assert_eq!(person.cameras(), &[CameraId::from("A"), CameraId::from("B")]);
        assert_eq!(person.trajectory(), &[(5, 10), (15, 15), (25, 25)]);
        assert_relative_eq!(person.dwell_time(), 4.0);
    }

    #[test]
    fn test_clock_going_backwards_keeps_dwell_non_negative() {
        let mut person =
            GlobalIdentity::new(GlobalId::FIRST, &CameraId::from("A"), &bbox(0, 0, 2, 2), 100.0);
        person.observe(&CameraId::from("A"), &bbox(0, 0, 2, 2), 90.0);
        assert!(person.last_seen() >= person.first_seen());
        assert_relative_eq!(person.dwell_time(), 0.0);
        assert_eq!(person.frame_count(), 2);
    }
}
