/// Cosine similarity at or above which an unbound track joins an existing
/// identity.
pub const DEFAULT_SIMILARITY_THRESHOLD: f64 = 0.85;

/// Embeddings kept per identity before the oldest is evicted.
pub const DEFAULT_GALLERY_CAPACITY: usize = 50;

/// Guards the cosine similarity denominator against near-zero norms.
pub const SIMILARITY_EPSILON: f64 = 1e-6;

/// Bounded queue depth between camera workers and the fusion actor.
pub const DEFAULT_CHANNEL_CAPACITY: usize = 64;

pub const CONFIG_DIR_NAME: &str = "MultiCam";
pub const CONFIG_FILE_NAME: &str = "fusion.json";
