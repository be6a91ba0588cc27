//! Exact nearest-identity search by scanning every representative.
//!
//! O(identities * dim) per query. This is the dominant cost of resolving
//! unbound tracks once the identity count grows large.

use crate::identity::domain::embedding_gallery::EmbeddingGallery;
use crate::identity::domain::identity_matcher::{IdentityMatcher, MatchCandidate};
use crate::shared::embedding::Embedding;

#[derive(Debug, Default, Clone, Copy)]
pub struct LinearScanMatcher;

impl LinearScanMatcher {
    pub fn new() -> Self {
        Self
    }
}

impl IdentityMatcher for LinearScanMatcher {
    /// Ties go to the lowest global id: the gallery iterates in ascending id
    /// order and only a strictly greater score replaces the current best.
    fn best_match(
        &self,
        gallery: &EmbeddingGallery,
        query: &Embedding,
    ) -> Option<MatchCandidate> {
        let mut best: Option<MatchCandidate> = None;
        for (global_id, representative) in gallery.representatives() {
            let similarity = query.cosine_similarity(&representative);
            if best.map_or(true, |b| similarity > b.similarity) {
                best = Some(MatchCandidate {
                    global_id,
                    similarity,
                });
            }
        }
        best
    }
}
