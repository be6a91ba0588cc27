use std::collections::{BTreeMap, VecDeque};

use ndarray::Array1;

use crate::identity::domain::identity_error::IdentityError;
use crate::shared::constants::DEFAULT_GALLERY_CAPACITY;
use crate::shared::embedding::Embedding;
use crate::shared::ids::GlobalId;

/// Recent embeddings of one identity plus their running component sum.
struct GalleryEntry {
    embeddings: VecDeque<Embedding>,
    sum: Array1<f64>,
}

impl GalleryEntry {
    fn new(dim: usize) -> Self {
        Self {
            embeddings: VecDeque::new(),
            sum: Array1::zeros(dim),
        }
    }

    fn push(&mut self, embedding: Embedding, capacity: usize) {
        self.sum += &embedding.as_array().mapv(f64::from);
        self.embeddings.push_back(embedding);
        while self.embeddings.len() > capacity {
            if let Some(oldest) = self.embeddings.pop_front() {
                self.sum -= &oldest.as_array().mapv(f64::from);
            }
        }
    }

    fn mean(&self) -> Embedding {
        let n = self.embeddings.len().max(1) as f64;
        Embedding::from_array(self.sum.mapv(|x| (x / n) as f32))
    }
}

/// Bounded per-identity store of appearance embeddings.
///
/// Each identity keeps at most `capacity` embeddings; adding beyond that
/// evicts the oldest first. The representative vector is the component-wise
/// mean of what is currently stored, maintained as a running sum so reading
/// it costs O(dim) regardless of how full the entry is.
///
/// All embeddings share the dimension of the first one accepted.
pub struct EmbeddingGallery {
    capacity: usize,
    dim: Option<usize>,
    entries: BTreeMap<GlobalId, GalleryEntry>,
}

impl EmbeddingGallery {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            dim: None,
            entries: BTreeMap::new(),
        }
    }

    pub fn add(&mut self, global_id: GlobalId, embedding: Embedding) -> Result<(), IdentityError> {
        self.check_embedding(&embedding)?;
        let dim = embedding.dim();
        self.dim.get_or_insert(dim);
        let capacity = self.capacity;
        self.entries
            .entry(global_id)
            .or_insert_with(|| GalleryEntry::new(dim))
            .push(embedding, capacity);
        Ok(())
    }

    pub fn representative(&self, global_id: GlobalId) -> Result<Embedding, IdentityError> {
        self.entries
            .get(&global_id)
            .map(GalleryEntry::mean)
            .ok_or(IdentityError::UnknownIdentity(global_id))
    }

    /// Representatives of every identity in ascending id order.
    pub fn representatives(&self) -> impl Iterator<Item = (GlobalId, Embedding)> + '_ {
        self.entries.iter().map(|(gid, entry)| (*gid, entry.mean()))
    }

    /// Fails if `embedding` could not be stored alongside what is already here.
    ///
    /// Empty vectors would pin the gallery dimension at zero and non-finite
    /// components would poison the running sum past their eviction, so both
    /// are refused before any state changes.
    pub fn check_embedding(&self, embedding: &Embedding) -> Result<(), IdentityError> {
        if embedding.dim() == 0 {
            return Err(IdentityError::EmptyEmbedding);
        }
        if !embedding.is_finite() {
            return Err(IdentityError::NonFiniteEmbedding);
        }
        match self.dim {
            Some(expected) if expected != embedding.dim() => {
                Err(IdentityError::DimensionMismatch {
                    expected,
                    actual: embedding.dim(),
                })
            }
            _ => Ok(()),
        }
    }

    /// Stored embeddings for an identity, oldest first.
    pub fn embeddings(&self, global_id: GlobalId) -> Option<impl Iterator<Item = &Embedding>> {
        self.entries.get(&global_id).map(|e| e.embeddings.iter())
    }

    pub fn len(&self, global_id: GlobalId) -> usize {
        self.entries
            .get(&global_id)
            .map_or(0, |e| e.embeddings.len())
    }

    pub fn contains(&self, global_id: GlobalId) -> bool {
        self.entries.contains_key(&global_id)
    }

    pub fn identity_count(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn dim(&self) -> Option<usize> {
        self.dim
    }
}

impl Default for EmbeddingGallery {
    fn default() -> Self {
        Self::new(DEFAULT_GALLERY_CAPACITY)
    }
}
