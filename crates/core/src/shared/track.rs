use serde::{Deserialize, Serialize};

use crate::shared::bbox::BoundingBox;
use crate::shared::embedding::Embedding;
use crate::shared::ids::{CameraId, GlobalId};

/// One track reported by a camera's tracker for the current frame.
///
/// `local_track_id` is only unique within one tracker instance and may be
/// reused after that tracker restarts. `embedding` is the most recent
/// appearance feature, if the tracker has one yet.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LocalTrack {
    pub local_track_id: u32,
    pub bbox: BoundingBox,
    #[serde(default)]
    pub embedding: Option<Embedding>,
    #[serde(default = "default_confirmed")]
    pub confirmed: bool,
}

fn default_confirmed() -> bool {
    true
}

impl LocalTrack {
    /// A confirmed track without an embedding.
    pub fn new(local_track_id: u32, bbox: BoundingBox) -> Self {
        Self {
            local_track_id,
            bbox,
            embedding: None,
            confirmed: true,
        }
    }

    pub fn with_embedding(mut self, embedding: Embedding) -> Self {
        self.embedding = Some(embedding);
        self
    }

    pub fn unconfirmed(mut self) -> Self {
        self.confirmed = false;
        self
    }
}

/// All tracks one camera reported for one frame, in tracker order.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CameraFrame {
    pub camera_id: CameraId,
    #[serde(default)]
    pub tracks: Vec<LocalTrack>,
}

impl CameraFrame {
    pub fn new(camera_id: impl Into<CameraId>, tracks: Vec<LocalTrack>) -> Self {
        Self {
            camera_id: camera_id.into(),
            tracks,
        }
    }
}

/// A local track tagged with the global identity it is bound to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedTrack {
    pub bbox: BoundingBox,
    pub local_id: u32,
    pub global_id: GlobalId,
}
