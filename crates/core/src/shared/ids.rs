use std::fmt;

use serde::{Deserialize, Serialize};

/// Identifier of one camera feed.
///
/// Upstream producers label cameras with either names (`"cam1"`) or
/// integer indices; both normalize to the same textual form so `"3"` and
/// `3` refer to the same feed.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "RawCameraId", into = "String")]
pub struct CameraId(String);

impl CameraId {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CameraId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for CameraId {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl From<String> for CameraId {
    fn from(name: String) -> Self {
        Self(name)
    }
}

impl From<u32> for CameraId {
    fn from(index: u32) -> Self {
        Self(index.to_string())
    }
}

impl From<CameraId> for String {
    fn from(id: CameraId) -> Self {
        id.0
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawCameraId {
    Name(String),
    Index(u64),
}

impl From<RawCameraId> for CameraId {
    fn from(raw: RawCameraId) -> Self {
        match raw {
            RawCameraId::Name(name) => Self(name),
            RawCameraId::Index(index) => Self(index.to_string()),
        }
    }
}

/// Process-lifetime identifier of one physical person across all cameras.
///
/// Minted strictly increasing from [`GlobalId::FIRST`]; never reused.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GlobalId(u64);

impl GlobalId {
    pub const FIRST: GlobalId = GlobalId(1);

    pub fn new(value: u64) -> Self {
        Self(value)
    }

    pub fn value(self) -> u64 {
        self.0
    }

    /// The id minted right after this one.
    pub fn next(self) -> Self {
        Self(self.0 + 1)
    }
}

impl fmt::Display for GlobalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
