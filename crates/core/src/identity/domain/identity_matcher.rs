use crate::identity::domain::embedding_gallery::EmbeddingGallery;
use crate::shared::embedding::Embedding;
use crate::shared::ids::GlobalId;

/// Best-scoring known identity for a query embedding.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MatchCandidate {
    pub global_id: GlobalId,
    pub similarity: f64,
}

/// Domain interface for nearest-identity search over the gallery.
///
/// Returns the highest-similarity identity without applying any threshold;
/// the resolver owns the accept/mint decision. An approximate index may
/// implement this, but must document the recall it gives up.
pub trait IdentityMatcher: Send {
    fn best_match(
        &self,
        gallery: &EmbeddingGallery,
        query: &Embedding,
    ) -> Option<MatchCandidate>;
}
