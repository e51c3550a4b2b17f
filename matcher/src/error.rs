use sightid_vecstore::VecError;
use thiserror::Error;

/// Errors returned by matcher operations. Each one is scoped to a single
/// model tag.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum MatchError {
    #[error("matcher: model {model:?} has no reference embeddings")]
    EmptyReferenceSet { model: String },

    #[error("matcher: embedding at position {position} has model {got:?}, want {want:?}")]
    ModelMismatch {
        position: usize,
        got: String,
        want: String,
    },

    #[error("matcher: model {model:?} index holds {got} vectors for {want} embeddings")]
    IndexSizeMismatch {
        model: String,
        got: usize,
        want: usize,
    },

    #[error("matcher: model {model:?} index returned position {position} with no embedding")]
    UnknownPosition { model: String, position: usize },

    #[error("matcher: {0}")]
    Index(#[from] VecError),
}

impl MatchError {
    /// Rewrites the vector position carried by an index error, for errors
    /// raised on a filtered or offset view of the caller's list.
    pub(crate) fn map_position(self, f: impl Fn(usize) -> usize) -> Self {
        match self {
            Self::Index(VecError::DimensionMismatch {
                position,
                got,
                want,
            }) => Self::Index(VecError::DimensionMismatch {
                position: f(position),
                got,
                want,
            }),
            Self::Index(VecError::DegenerateVector { position }) => {
                Self::Index(VecError::DegenerateVector {
                    position: f(position),
                })
            }
            other => other,
        }
    }
}
