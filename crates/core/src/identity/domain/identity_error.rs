use thiserror::Error;

use crate::shared::ids::GlobalId;

#[derive(Debug, Error, PartialEq)]
pub enum IdentityError {
    /// A representative was requested for an identity that was never added.
    /// Only reachable through a bookkeeping bug.
    #[error("no gallery entry for identity {0}")]
    UnknownIdentity(GlobalId),
    #[error("embedding has {actual} dimensions, gallery holds {expected}")]
    DimensionMismatch { expected: usize, actual: usize },
    #[error("embedding has no components")]
    EmptyEmbedding,
    #[error("embedding contains NaN or infinite components")]
    NonFiniteEmbedding,
}

/// Why a track produced no assignment this frame.
///
/// None of these halt the frame loop; the track is simply skipped and may
/// resolve on a later frame.
#[derive(Debug, Error, PartialEq)]
pub enum SkipReason {
    #[error("track is not confirmed")]
    UnconfirmedTrack,
    #[error("unbound track has no embedding yet")]
    MissingEmbedding,
    #[error(transparent)]
    Identity(#[from] IdentityError),
}
