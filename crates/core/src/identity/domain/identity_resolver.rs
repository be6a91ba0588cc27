use std::collections::HashMap;

use crate::identity::domain::embedding_gallery::EmbeddingGallery;
use crate::identity::domain::identity_error::{IdentityError, SkipReason};
use crate::identity::domain::identity_matcher::IdentityMatcher;
use crate::identity::infrastructure::linear_scan_matcher::LinearScanMatcher;
use crate::shared::config::FusionConfig;
use crate::shared::embedding::Embedding;
use crate::shared::ids::{CameraId, GlobalId};
use crate::shared::track::{LocalTrack, ResolvedTrack};

type BindingKey = (CameraId, u32);

/// Maps camera-scoped local tracks onto process-wide global identities.
///
/// A local track is bound the first time it is seen confirmed with an
/// embedding: it joins the most similar known identity when that similarity
/// reaches the threshold, otherwise a new identity is minted for it. The
/// binding is permanent for the track's lifetime, so later appearance drift
/// can never move a track to a different identity.
pub struct IdentityResolver {
    gallery: EmbeddingGallery,
    matcher: Box<dyn IdentityMatcher>,
    bindings: HashMap<BindingKey, GlobalId>,
    next_global_id: GlobalId,
    similarity_threshold: f64,
    reinforce_bound_tracks: bool,
}

impl IdentityResolver {
    pub fn new(config: &FusionConfig) -> Self {
        Self::with_matcher(config, Box::new(LinearScanMatcher::new()))
    }

    pub fn with_matcher(config: &FusionConfig, matcher: Box<dyn IdentityMatcher>) -> Self {
        Self {
            gallery: EmbeddingGallery::new(config.gallery_capacity),
            matcher,
            bindings: HashMap::new(),
            next_global_id: GlobalId::FIRST,
            similarity_threshold: config.similarity_threshold,
            reinforce_bound_tracks: config.reinforce_bound_tracks,
        }
    }

    /// Resolves every track of one camera frame, preserving input order.
    /// Skipped tracks are simply absent from the output.
    pub fn resolve_batch(
        &mut self,
        camera_id: &CameraId,
        tracks: &[LocalTrack],
    ) -> Vec<ResolvedTrack> {
        tracks
            .iter()
            .filter_map(|track| self.resolve(camera_id, track))
            .collect()
    }

    /// Returns the global identity for `track`, or `None` when the track
    /// cannot be assigned this frame.
    pub fn resolve(&mut self, camera_id: &CameraId, track: &LocalTrack) -> Option<ResolvedTrack> {
        match self.try_resolve(camera_id, track) {
            Ok(resolved) => Some(resolved),
            Err(SkipReason::Identity(e @ IdentityError::UnknownIdentity(_))) => {
                log::error!(
                    "Inconsistent identity state resolving {camera_id}/{}: {e}",
                    track.local_track_id
                );
                None
            }
            Err(SkipReason::Identity(e)) => {
                log::warn!("Skipping {camera_id}/{}: {e}", track.local_track_id);
                None
            }
            Err(reason) => {
                log::debug!("Skipping {camera_id}/{}: {reason}", track.local_track_id);
                None
            }
        }
    }

    /// Same as [`resolve`](Self::resolve) but reports why a track was skipped.
    pub fn try_resolve(
        &mut self,
        camera_id: &CameraId,
        track: &LocalTrack,
    ) -> Result<ResolvedTrack, SkipReason> {
        if !track.confirmed {
            return Err(SkipReason::UnconfirmedTrack);
        }

        let key = (camera_id.clone(), track.local_track_id);
        if let Some(&global_id) = self.bindings.get(&key) {
            self.reinforce(global_id, track);
            return Ok(resolved(track, global_id));
        }

        let embedding = track
            .embedding
            .as_ref()
            .ok_or(SkipReason::MissingEmbedding)?;
        self.gallery.check_embedding(embedding)?;
        if embedding.is_degenerate() {
            log::debug!(
                "Near-zero embedding for {camera_id}/{}, similarity will be ~0",
                track.local_track_id
            );
        }

        let global_id = self.match_or_mint(camera_id, track.local_track_id, embedding);
        self.gallery.add(global_id, embedding.clone())?;
        self.bindings.insert(key, global_id);
        Ok(resolved(track, global_id))
    }

    fn match_or_mint(
        &mut self,
        camera_id: &CameraId,
        local_id: u32,
        embedding: &Embedding,
    ) -> GlobalId {
        match self.matcher.best_match(&self.gallery, embedding) {
            Some(candidate) if candidate.similarity >= self.similarity_threshold => {
                log::debug!(
                    "Fused {camera_id}/{local_id} into identity {} (similarity {:.3})",
                    candidate.global_id,
                    candidate.similarity
                );
                candidate.global_id
            }
            _ => {
                let global_id = self.mint();
                log::info!("New identity {global_id} from {camera_id}/{local_id}");
                global_id
            }
        }
    }

    /// Keeps the identity's representative fresh without touching the binding.
    fn reinforce(&mut self, global_id: GlobalId, track: &LocalTrack) {
        if !self.reinforce_bound_tracks {
            return;
        }
        let Some(embedding) = &track.embedding else {
            return;
        };
        if let Err(e) = self.gallery.add(global_id, embedding.clone()) {
            log::warn!("Not reinforcing identity {global_id}: {e}");
        }
    }

    fn mint(&mut self) -> GlobalId {
        let global_id = self.next_global_id;
        self.next_global_id = global_id.next();
        global_id
    }

    pub fn binding(&self, camera_id: &CameraId, local_id: u32) -> Option<GlobalId> {
        self.bindings.get(&(camera_id.clone(), local_id)).copied()
    }

    pub fn binding_count(&self) -> usize {
        self.bindings.len()
    }

    /// Number of identities minted so far.
    pub fn identity_count(&self) -> usize {
        (self.next_global_id.value() - GlobalId::FIRST.value()) as usize
    }

    pub fn next_global_id(&self) -> GlobalId {
        self.next_global_id
    }

    pub fn gallery(&self) -> &EmbeddingGallery {
        &self.gallery
    }

    pub fn similarity_threshold(&self) -> f64 {
        self.similarity_threshold
    }
}

impl Default for IdentityResolver {
    fn default() -> Self {
        Self::new(&FusionConfig::default())
    }
}

fn resolved(track: &LocalTrack, global_id: GlobalId) -> ResolvedTrack {
    ResolvedTrack {
        bbox: track.bbox,
        local_id: track.local_track_id,
        global_id,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identity::domain::identity_matcher::MatchCandidate;
    use crate::shared::bbox::BoundingBox;
    use rstest::rstest;

    fn cam(name: &str) -> CameraId {
        CameraId::from(name)
    }

    fn track(local_id: u32, values: &[f32]) -> LocalTrack {
        LocalTrack::new(local_id, BoundingBox::new(0, 0, 10, 20))
            .with_embedding(Embedding::new(values.to_vec()))
    }

    fn gid(n: u64) -> GlobalId {
        GlobalId::new(n)
    }

    #[test]
    fn test_first_track_mints_one() {
        let mut resolver = IdentityResolver::default();
        let r = resolver.resolve(&cam("A"), &track(1, &[1.0, 0.0])).unwrap();
        assert_eq!(r.global_id, GlobalId::FIRST);
        assert_eq!(r.local_id, 1);
        assert_eq!(r.bbox, BoundingBox::new(0, 0, 10, 20));
    }

    #[test]
    fn test_unconfirmed_track_is_skipped_without_side_effects() {
        let mut resolver = IdentityResolver::default();
        let t = track(1, &[1.0, 0.0]).unconfirmed();

        assert_eq!(
            resolver.try_resolve(&cam("A"), &t),
            Err(SkipReason::UnconfirmedTrack)
        );
        assert!(resolver.gallery().is_empty());
        assert_eq!(resolver.binding_count(), 0);
    }

    #[test]
    fn test_unbound_track_without_embedding_is_deferred() {
        let mut resolver = IdentityResolver::default();
        let t = LocalTrack::new(5, BoundingBox::new(0, 0, 4, 4));

        assert_eq!(
            resolver.try_resolve(&cam("A"), &t),
            Err(SkipReason::MissingEmbedding)
        );
        assert_eq!(resolver.binding(&cam("A"), 5), None);

        let later = resolver.resolve(&cam("A"), &track(5, &[0.0, 1.0])).unwrap();
        assert_eq!(later.global_id, gid(1));
    }

    #[test]
    fn test_bound_track_without_embedding_still_resolves() {
        let mut resolver = IdentityResolver::default();
        resolver.resolve(&cam("A"), &track(1, &[1.0, 0.0])).unwrap();

        let bare = LocalTrack::new(1, BoundingBox::new(2, 2, 12, 22));
        let r = resolver.resolve(&cam("A"), &bare).unwrap();
        assert_eq!(r.global_id, gid(1));
        assert_eq!(r.bbox, BoundingBox::new(2, 2, 12, 22));
        assert_eq!(resolver.gallery().len(gid(1)), 1);
    }

    #[test]
    fn test_binding_survives_embedding_drift() {
        let mut resolver = IdentityResolver::default();
        resolver.resolve(&cam("A"), &track(1, &[1.0, 0.0])).unwrap();
        resolver.resolve(&cam("A"), &track(2, &[0.0, 1.0])).unwrap();

        // Local track 1 now looks exactly like identity 2.
        for _ in 0..5 {
            let r = resolver.resolve(&cam("A"), &track(1, &[0.0, 1.0])).unwrap();
            assert_eq!(r.global_id, gid(1));
        }
    }

    #[test]
    fn test_reinforcement_feeds_gallery() {
        let mut resolver = IdentityResolver::default();
        resolver.resolve(&cam("A"), &track(1, &[1.0, 0.0])).unwrap();
        resolver.resolve(&cam("A"), &track(1, &[0.9, 0.1])).unwrap();
        assert_eq!(resolver.gallery().len(gid(1)), 2);
    }

    #[test]
    fn test_reinforcement_can_be_disabled() {
        let config = FusionConfig {
            reinforce_bound_tracks: false,
            ..FusionConfig::default()
        };
        let mut resolver = IdentityResolver::new(&config);
        resolver.resolve(&cam("A"), &track(1, &[1.0, 0.0])).unwrap();
        resolver.resolve(&cam("A"), &track(1, &[0.9, 0.1])).unwrap();
        assert_eq!(resolver.gallery().len(gid(1)), 1);
    }

    #[test]
    fn test_same_local_id_on_other_camera_is_a_separate_key() {
        let mut resolver = IdentityResolver::default();
        resolver.resolve(&cam("A"), &track(1, &[1.0, 0.0])).unwrap();
        let r = resolver.resolve(&cam("B"), &track(1, &[0.0, 1.0])).unwrap();
        assert_eq!(r.global_id, gid(2));
        assert_eq!(resolver.binding(&cam("A"), 1), Some(gid(1)));
        assert_eq!(resolver.binding(&cam("B"), 1), Some(gid(2)));
    }

    #[rstest]
    #[case::at_threshold(0.85, true)]
    #[case::above_threshold(0.95, true)]
    #[case::below_threshold(0.84, false)]
    fn test_threshold_is_inclusive(#[case] similarity: f64, #[case] fused: bool) {
        let mut resolver = IdentityResolver::with_matcher(
            &FusionConfig::default(),
            Box::new(FixedMatcher(similarity)),
        );
        resolver.resolve(&cam("A"), &track(1, &[1.0, 0.0])).unwrap();
        let r = resolver.resolve(&cam("B"), &track(7, &[1.0, 0.0])).unwrap();
        assert_eq!(r.global_id == gid(1), fused);
    }

    #[test]
    fn test_dimension_mismatch_does_not_mint() {
        let mut resolver = IdentityResolver::default();
        resolver.resolve(&cam("A"), &track(1, &[1.0, 0.0])).unwrap();

        let odd = track(2, &[1.0, 0.0, 0.0]);
        assert!(matches!(
            resolver.try_resolve(&cam("A"), &odd),
            Err(SkipReason::Identity(IdentityError::DimensionMismatch { .. }))
        ));
        assert_eq!(resolver.next_global_id(), gid(2));
        assert_eq!(resolver.binding(&cam("A"), 2), None);
    }

    #[test]
    fn test_empty_first_embedding_does_not_block_later_tracks() {
        let mut resolver = IdentityResolver::default();
        assert_eq!(
            resolver.try_resolve(&cam("A"), &track(1, &[])),
            Err(SkipReason::Identity(IdentityError::EmptyEmbedding))
        );
        assert_eq!(resolver.next_global_id(), gid(1));
        assert_eq!(resolver.binding(&cam("A"), 1), None);

        for local_id in 2..12 {
            let r = resolver.resolve(&cam("A"), &track(local_id, &[1.0, 0.0])).unwrap();
            assert_eq!(r.global_id, gid(1));
        }
        let other = resolver.resolve(&cam("B"), &track(1, &[0.0, 1.0])).unwrap();
        assert_eq!(other.global_id, gid(2));
    }

    #[test]
    fn test_non_finite_unbound_track_is_skipped() {
        let mut resolver = IdentityResolver::default();
        assert_eq!(
            resolver.try_resolve(&cam("A"), &track(1, &[f32::NAN, 1.0])),
            Err(SkipReason::Identity(IdentityError::NonFiniteEmbedding))
        );
        assert!(resolver.gallery().is_empty());
        assert_eq!(resolver.next_global_id(), gid(1));
    }

    #[test]
    fn test_non_finite_reinforcement_keeps_identity_matchable() {
        let mut resolver = IdentityResolver::default();
        resolver.resolve(&cam("A"), &track(1, &[1.0, 0.0])).unwrap();

        let bad = resolver.resolve(&cam("A"), &track(1, &[f32::INFINITY, 0.0])).unwrap();
        assert_eq!(bad.global_id, gid(1));
        assert_eq!(resolver.gallery().len(gid(1)), 1);

        for _ in 0..60 {
            resolver.resolve(&cam("A"), &track(1, &[1.0, 0.0])).unwrap();
        }
        let fused = resolver.resolve(&cam("B"), &track(7, &[1.0, 0.0])).unwrap();
        assert_eq!(fused.global_id, gid(1));
    }

    #[test]
    fn test_degenerate_embedding_mints_new_identity() {
        let mut resolver = IdentityResolver::default();
        resolver.resolve(&cam("A"), &track(1, &[1.0, 0.0])).unwrap();
        let r = resolver.resolve(&cam("A"), &track(2, &[0.0, 0.0])).unwrap();
        assert_eq!(r.global_id, gid(2));
    }

    #[test]
    fn test_resolve_batch_preserves_order_and_drops_skips() {
        let mut resolver = IdentityResolver::default();
        let tracks = vec![
            track(3, &[1.0, 0.0]),
            track(4, &[0.0, 1.0]).unconfirmed(),
            LocalTrack::new(5, BoundingBox::new(0, 0, 1, 1)),
            track(6, &[0.0, 1.0]),
        ];
        let out = resolver.resolve_batch(&cam("A"), &tracks);
        let locals: Vec<u32> = out.iter().map(|r| r.local_id).collect();
        assert_eq!(locals, vec![3, 6]);
        assert_eq!(resolver.identity_count(), 2);
    }

    /// Reports a fixed similarity against identity 1 whenever it exists.
    struct FixedMatcher(f64);

    impl IdentityMatcher for FixedMatcher {
        fn best_match(
            &self,
            gallery: &EmbeddingGallery,
            _query: &Embedding,
        ) -> Option<MatchCandidate> {
            gallery.contains(GlobalId::FIRST).then_some(MatchCandidate {
                global_id: GlobalId::FIRST,
                similarity: self.0,
            })
        }
    }
}
