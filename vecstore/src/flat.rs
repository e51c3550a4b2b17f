use std::cmp::Ordering;

use tracing::{debug, warn};

use crate::error::VecError;
use crate::l2::{normalized, squared_l2_distance};
use crate::vecstore::{DegeneratePolicy, Neighbor, VecIndex};

/// FlatIndex is an exact VecIndex: every query is compared against every
/// stored vector. Suited to research-sized collections (thousands of
/// vectors), where exactness matters more than sub-linear search.
pub struct FlatIndex {
    dim: usize,
    /// L2-normalized vectors, in build order.
    vectors: Vec<Vec<f32>>,
    /// positions[i] is the caller's build position of vectors[i].
    positions: Vec<usize>,
    skipped: usize,
    policy: DegeneratePolicy,
}

impl FlatIndex {
    /// Builds an index over `vectors`. The dimensionality is taken from the
    /// first vector; any other length fails with
    /// [`VecError::DimensionMismatch`].
    ///
    /// Zero-norm vectors are handled according to `policy`.
    pub fn build<V: AsRef<[f32]>>(
        vectors: &[V],
        policy: DegeneratePolicy,
    ) -> Result<Self, VecError> {
        let dim = vectors.first().map(|v| v.as_ref().len()).unwrap_or(0);

        let mut stored = Vec::with_capacity(vectors.len());
        let mut positions = Vec::with_capacity(vectors.len());
        let mut skipped = 0usize;

        for (position, v) in vectors.iter().enumerate() {
            let v = v.as_ref();
            if v.len() != dim {
                return Err(VecError::DimensionMismatch {
                    position,
                    got: v.len(),
                    want: dim,
                });
            }
            match normalized(v) {
                Some(unit) => {
                    stored.push(unit);
                    positions.push(position);
                }
                None => match policy {
                    DegeneratePolicy::Fail => {
                        return Err(VecError::DegenerateVector { position });
                    }
                    DegeneratePolicy::Skip => {
                        warn!("vecstore: skipping zero-norm vector at position {}", position);
                        skipped += 1;
                    }
                },
            }
        }

        debug!(
            "vecstore: built flat index, dim={}, vectors={}, skipped={}",
            dim,
            stored.len(),
            skipped
        );

        Ok(Self {
            dim,
            vectors: stored,
            positions,
            skipped,
            policy,
        })
    }

    /// Number of input vectors left out because they had zero norm.
    pub fn skipped(&self) -> usize {
        self.skipped
    }

    /// The degenerate-vector policy this index applies to queries.
    pub fn policy(&self) -> DegeneratePolicy {
        self.policy
    }

    fn rank(&self, unit_query: &[f32], k: usize) -> Vec<Neighbor> {
        let mut hits: Vec<Neighbor> = self
            .vectors
            .iter()
            .zip(&self.positions)
            .map(|(v, &position)| Neighbor {
                position,
                distance: squared_l2_distance(unit_query, v),
            })
            .collect();

        if k < hits.len() {
            hits.select_nth_unstable_by(k - 1, cmp_neighbors);
            hits.truncate(k);
        }
        hits.sort_by(cmp_neighbors);
        hits
    }
}

/// Ascending distance; equal distances fall back to build order.
fn cmp_neighbors(a: &Neighbor, b: &Neighbor) -> Ordering {
    a.distance
        .total_cmp(&b.distance)
        .then(a.position.cmp(&b.position))
}

impl VecIndex for FlatIndex {
    fn dim(&self) -> usize {
        self.dim
    }

    fn len(&self) -> usize {
        self.vectors.len()
    }

    fn search(&self, queries: &[&[f32]], k: usize) -> Result<Vec<Vec<Neighbor>>, VecError> {
        if k == 0 {
            return Err(VecError::InvalidK);
        }
        if self.vectors.is_empty() {
            return Ok(vec![Vec::new(); queries.len()]);
        }

        let mut results = Vec::with_capacity(queries.len());
        for (position, query) in queries.iter().enumerate() {
            if query.len() != self.dim {
                return Err(VecError::DimensionMismatch {
                    position,
                    got: query.len(),
                    want: self.dim,
                });
            }
            match normalized(query) {
                Some(unit) => results.push(self.rank(&unit, k)),
                None => match self.policy {
                    DegeneratePolicy::Fail => {
                        return Err(VecError::DegenerateVector { position });
                    }
                    DegeneratePolicy::Skip => {
                        warn!("vecstore: zero-norm query at position {}, no neighbors", position);
                        results.push(Vec::new());
                    }
                },
            }
        }
        Ok(results)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn try_build(vectors: &[Vec<f32>], policy: DegeneratePolicy) -> Result<FlatIndex, VecError> {
        FlatIndex::build(vectors, policy)
    }

    fn build(vectors: &[Vec<f32>]) -> FlatIndex {
        try_build(vectors, DegeneratePolicy::Fail).unwrap()
    }

    #[test]
    fn test_build_and_search() {
        let idx = build(&[
            vec![1.0, 0.0, 0.0, 0.0],
            vec![0.0, 1.0, 0.0, 0.0],
            vec![0.9, 0.1, 0.0, 0.0],
        ]);
        assert_eq!(idx.dim(), 4);
        assert_eq!(idx.len(), 3);

        let hits = idx.search(&[&[1.0, 0.0, 0.0, 0.0]], 2).unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].len(), 2);
        assert_eq!(hits[0][0].position, 0);
        assert_eq!(hits[0][1].position, 2);
        assert!(hits[0][0].distance <= hits[0][1].distance);
    }

    #[test]
    fn test_build_dimension_mismatch() {
        let err = try_build(&[vec![1.0, 0.0], vec![1.0, 0.0, 0.0]], DegeneratePolicy::Fail)
            .err()
            .unwrap();
        assert_eq!(
            err,
            VecError::DimensionMismatch {
                position: 1,
                got: 3,
                want: 2
            }
        );
    }

    #[test]
    fn test_query_dimension_mismatch() {
        let idx = build(&[vec![1.0, 0.0]]);
        assert!(matches!(
            idx.search(&[&[1.0, 0.0, 0.0]], 1),
            Err(VecError::DimensionMismatch { position: 0, .. })
        ));
    }

    #[test]
    fn test_magnitude_is_ignored() {
        let idx = build(&[vec![10.0, 0.0], vec![0.0, 0.5]]);
        let hits = idx.search(&[&[0.001, 0.0]], 1).unwrap();
        assert_eq!(hits[0][0].position, 0);
        assert!(hits[0][0].distance.abs() < 1e-6);
    }

    #[test]
    fn test_opposite_direction_distance_is_four() {
        let idx = build(&[vec![1.0, 0.0]]);
        let hits = idx.search(&[&[-3.0, 0.0]], 1).unwrap();
        assert!((hits[0][0].distance - 4.0).abs() < 1e-6);
    }

    #[test]
    fn test_ties_broken_by_insertion_order() {
        let idx = build(&[
            vec![0.0, 1.0],
            vec![1.0, 0.0],
            vec![2.0, 0.0],
            vec![1.0, 0.0],
        ]);
        let hits = idx.search(&[&[1.0, 0.0]], 3).unwrap();
        let positions: Vec<usize> = hits[0].iter().map(|n| n.position).collect();
        assert_eq!(positions, vec![1, 2, 3]);
    }

    #[test]
    fn test_k_larger_than_index() {
        let idx = build(&[vec![1.0, 0.0], vec![0.0, 1.0]]);
        let hits = idx.search(&[&[1.0, 1.0]], 10).unwrap();
        assert_eq!(hits[0].len(), 2);
    }

    #[test]
    fn test_k_zero_rejected() {
        let idx = build(&[vec![1.0, 0.0]]);
        assert_eq!(idx.search(&[&[1.0, 0.0]], 0).err(), Some(VecError::InvalidK));
    }

    #[test]
    fn test_empty_index() {
        let idx = build(&[]);
        assert!(idx.is_empty());
        let hits = idx.search(&[&[1.0, 0.0], &[0.0, 1.0]], 1).unwrap();
        assert_eq!(hits.len(), 2);
        assert!(hits.iter().all(|h| h.is_empty()));
    }

    #[test]
    fn test_zero_vector_fail_fast() {
        let err = try_build(&[vec![1.0, 0.0], vec![0.0, 0.0]], DegeneratePolicy::Fail)
            .err()
            .unwrap();
        assert_eq!(err, VecError::DegenerateVector { position: 1 });
    }

    #[test]
    fn test_zero_vector_skipped_keeps_positions() {
        let idx = try_build(
            &[vec![0.0, 0.0], vec![0.0, 1.0], vec![1.0, 0.0]],
            DegeneratePolicy::Skip,
        )
        .unwrap();
        assert_eq!(idx.len(), 2);
        assert_eq!(idx.skipped(), 1);
        assert_eq!(idx.policy(), DegeneratePolicy::Skip);

        let hits = idx.search(&[&[1.0, 0.0]], 3).unwrap();
        let positions: Vec<usize> = hits[0].iter().map(|n| n.position).collect();
        assert_eq!(positions, vec![2, 1]);
    }

    #[test]
    fn test_zero_query_skip_yields_empty_slot() {
        let idx = try_build(&[vec![1.0, 0.0]], DegeneratePolicy::Skip).unwrap();
        let hits = idx.search(&[&[0.0, 0.0], &[1.0, 0.0]], 1).unwrap();
        assert_eq!(hits.len(), 2);
        assert!(hits[0].is_empty());
        assert_eq!(hits[1][0].position, 0);
    }

    #[test]
    fn test_zero_query_fail_fast() {
        let idx = build(&[vec![1.0, 0.0]]);
        assert_eq!(idx.policy(), DegeneratePolicy::Fail);
        assert_eq!(
            idx.search(&[&[1.0, 0.0], &[0.0, 0.0]], 1).err(),
            Some(VecError::DegenerateVector { position: 1 })
        );
    }

    #[test]
    fn test_multiple_queries_keep_order() {
        let idx = build(&[vec![1.0, 0.0], vec![0.0, 1.0]]);
        let hits = idx.search(&[&[0.0, 2.0], &[3.0, 0.1]], 1).unwrap();
        assert_eq!(hits[0][0].position, 1);
        assert_eq!(hits[1][0].position, 0);
    }
}
