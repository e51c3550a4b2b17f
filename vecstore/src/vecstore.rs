use serde::{Deserialize, Serialize};

use crate::error::VecError;

/// Neighbor is a single result from a nearest-neighbor search.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Neighbor {
    /// Build-insertion position of the matched vector in the list the index
    /// was built from. Skipped degenerate vectors keep their slot, so this
    /// always refers back to the caller's own list.
    pub position: usize,

    /// Squared Euclidean distance between the normalized query and the
    /// normalized matched vector, in `[0, 4]`. Lower is more similar.
    pub distance: f32,
}

/// What to do with a zero-norm vector, which has no direction to normalize.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DegeneratePolicy {
    /// Leave the vector out and log a warning. A skipped reference vector is
    /// never returned; a skipped query gets an empty neighbor list.
    #[default]
    Skip,
    /// Abort the whole operation with [`VecError::DegenerateVector`].
    Fail,
}

/// VecIndex is the interface for nearest-neighbor search over a fixed
/// collection of dense float32 vectors.
///
/// Implementations are built once and read-only afterwards, so they must be
/// safe for concurrent use (Send + Sync).
pub trait VecIndex: Send + Sync {
    /// Dimensionality shared by every indexed vector.
    fn dim(&self) -> usize;

    /// Return the number of searchable vectors.
    fn len(&self) -> usize;

    /// Return true if the index contains no searchable vectors.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Return, for every query, the `k` nearest vectors ordered by ascending
    /// distance. Equal distances are ordered by build-insertion position.
    ///
    /// The outer list always has one entry per query.
    fn search(&self, queries: &[&[f32]], k: usize) -> Result<Vec<Vec<Neighbor>>, VecError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_policy_serde() {
        assert_eq!(serde_json::to_string(&DegeneratePolicy::Skip).unwrap(), "\"skip\"");
        let p: DegeneratePolicy = serde_json::from_str("\"fail\"").unwrap();
        assert_eq!(p, DegeneratePolicy::Fail);
        assert_eq!(DegeneratePolicy::default(), DegeneratePolicy::Skip);
    }
}
