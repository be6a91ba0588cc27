use serde::{Deserialize, Serialize};

use crate::shared::ids::{CameraId, GlobalId};

/// Snapshot of every identity's presence statistics for external reporting.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AnalyticsSummary {
    pub unique_people: usize,
    pub people: Vec<PersonSummary>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PersonSummary {
    pub global_id: GlobalId,
    /// Seconds between first and most recent observation.
    pub dwell_time: f64,
    pub frames: u64,
    pub cameras: Vec<CameraId>,
}

impl AnalyticsSummary {
    pub fn person(&self, global_id: GlobalId) -> Option<&PersonSummary> {
        self.people.iter().find(|p| p.global_id == global_id)
    }
}
