use std::fmt;

use sightid_vecstore::{DegeneratePolicy, FlatIndex, VecIndex};
use tracing::debug;

use crate::error::MatchError;
use crate::types::{Embedding, MatchedEmbedding};

struct Owner {
    individual_id: String,
    occurrence_id: String,
}

/// A built vector index for one model, with the individual and occurrence
/// behind every indexed position.
pub struct ReferenceIndex {
    model: String,
    index: Box<dyn VecIndex>,
    owners: Vec<Owner>,
}

impl fmt::Debug for ReferenceIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReferenceIndex")
            .field("model", &self.model)
            .field("dim", &self.index.dim())
            .field("len", &self.index.len())
            .finish()
    }
}

impl ReferenceIndex {
    /// Builds an exact index over `embeddings`, which must all carry the
    /// `model` tag and share one dimensionality.
    pub fn build<'a>(
        model: &str,
        embeddings: impl IntoIterator<Item = &'a Embedding>,
        policy: DegeneratePolicy,
    ) -> Result<Self, MatchError> {
        let embeddings: Vec<&Embedding> = embeddings.into_iter().collect();
        check_model(model, &embeddings)?;

        let vectors: Vec<&[f32]> = embeddings.iter().map(|e| e.vector.as_slice()).collect();
        let index = FlatIndex::build(&vectors, policy)?;
        debug!(
            "matcher: model {} indexed {} of {} embeddings",
            model,
            index.len(),
            embeddings.len()
        );

        Ok(Self::from_parts(model, Box::new(index), &embeddings))
    }

    /// Wraps an index built elsewhere (any [`VecIndex`] backend). Position
    /// `i` of `index` must correspond to `embeddings[i]`; an index holding
    /// more vectors than there are embeddings is rejected.
    pub fn with_index(
        model: &str,
        index: Box<dyn VecIndex>,
        embeddings: &[Embedding],
    ) -> Result<Self, MatchError> {
        if index.len() > embeddings.len() {
            return Err(MatchError::IndexSizeMismatch {
                model: model.to_string(),
                got: index.len(),
                want: embeddings.len(),
            });
        }
        let embeddings: Vec<&Embedding> = embeddings.iter().collect();
        check_model(model, &embeddings)?;
        Ok(Self::from_parts(model, index, &embeddings))
    }

    fn from_parts(model: &str, index: Box<dyn VecIndex>, embeddings: &[&Embedding]) -> Self {
        let owners = embeddings
            .iter()
            .map(|e| Owner {
                individual_id: e.individual_id.clone(),
                occurrence_id: e.occurrence_id.clone(),
            })
            .collect();
        Self {
            model: model.to_string(),
            index,
            owners,
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Number of searchable embeddings.
    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Searches the `k` nearest embeddings for every query vector.
    /// The outer list has one entry per query.
    pub fn search(
        &self,
        queries: &[&[f32]],
        k: usize,
    ) -> Result<Vec<Vec<MatchedEmbedding>>, MatchError> {
        let hits = self.index.search(queries, k)?;
        hits.into_iter()
            .map(|neighbors| {
                neighbors
                    .into_iter()
                    .map(|n| self.resolve(n.position, n.distance))
                    .collect::<Result<Vec<_>, _>>()
            })
            .collect()
    }

    fn resolve(&self, position: usize, distance: f32) -> Result<MatchedEmbedding, MatchError> {
        let owner = self
            .owners
            .get(position)
            .ok_or_else(|| MatchError::UnknownPosition {
                model: self.model.clone(),
                position,
            })?;
        Ok(MatchedEmbedding {
            position,
            individual_id: owner.individual_id.clone(),
            occurrence_id: owner.occurrence_id.clone(),
            distance,
        })
    }
}

fn check_model(model: &str, embeddings: &[&Embedding]) -> Result<(), MatchError> {
    match embeddings.iter().position(|e| e.model != model) {
        Some(position) => Err(MatchError::ModelMismatch {
            position,
            got: embeddings[position].model.clone(),
            want: model.to_string(),
        }),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sightid_vecstore::VecError;

    fn emb(v: &[f32], ind: &str, occ: &str) -> Embedding {
        Embedding::new(v.to_vec(), ind, occ, "m")
    }

    #[test]
    fn test_build_maps_positions_to_owners() {
        let idx = ReferenceIndex::build(
            "m",
            &[emb(&[1.0, 0.0], "A", "a1"), emb(&[0.0, 1.0], "B", "b1")],
            DegeneratePolicy::Fail,
        )
        .unwrap();
        assert_eq!(idx.model(), "m");
        assert_eq!(idx.len(), 2);

        let hits = idx.search(&[&[0.2, 0.8]], 2).unwrap();
        assert_eq!(hits[0][0].individual_id, "B");
        assert_eq!(hits[0][0].occurrence_id, "b1");
        assert_eq!(hits[0][0].position, 1);
        assert_eq!(hits[0][1].individual_id, "A");
    }

    #[test]
    fn test_build_rejects_foreign_model() {
        let other = Embedding::new(vec![1.0, 0.0], "B", "b1", "dinov2");
        let embeddings = [emb(&[1.0, 0.0], "A", "a1"), other];
        let err = ReferenceIndex::build("m", &embeddings, DegeneratePolicy::Fail)
            .err()
            .unwrap();
        assert_eq!(
            err,
            MatchError::ModelMismatch {
                position: 1,
                got: "dinov2".into(),
                want: "m".into()
            }
        );
    }

    #[test]
    fn test_build_rejects_mixed_dimensions() {
        let err = ReferenceIndex::build(
            "m",
            &[emb(&[1.0, 0.0], "A", "a1"), emb(&[1.0, 0.0, 0.0], "B", "b1")],
            DegeneratePolicy::Fail,
        )
        .err()
        .unwrap();
        assert!(matches!(
            err,
            MatchError::Index(VecError::DimensionMismatch { position: 1, .. })
        ));
    }

    #[test]
    fn test_with_index_accepts_prebuilt_backend() {
        let embeddings = vec![emb(&[1.0, 0.0], "A", "a1"), emb(&[0.0, 1.0], "B", "b1")];
        let flat = FlatIndex::build(
            &[vec![1.0f32, 0.0], vec![0.0, 1.0]],
            DegeneratePolicy::Fail,
        )
        .unwrap();
        let idx = ReferenceIndex::with_index("m", Box::new(flat), &embeddings).unwrap();
        let hits = idx.search(&[&[1.0, 0.1]], 1).unwrap();
        assert_eq!(hits[0][0].individual_id, "A");
    }

    /// Reports a fixed neighbor regardless of the query.
    struct FixedIndex {
        len: usize,
        position: usize,
    }

    impl VecIndex for FixedIndex {
        fn dim(&self) -> usize {
            2
        }

        fn len(&self) -> usize {
            self.len
        }

        fn search(
            &self,
            queries: &[&[f32]],
            _k: usize,
        ) -> Result<Vec<Vec<sightid_vecstore::Neighbor>>, VecError> {
            let n = sightid_vecstore::Neighbor {
                position: self.position,
                distance: 0.0,
            };
            Ok(vec![vec![n]; queries.len()])
        }
    }

    #[test]
    fn test_with_index_rejects_larger_index() {
        let embeddings = vec![emb(&[1.0, 0.0], "A", "a1")];
        let flat = FlatIndex::build(
            &[vec![1.0f32, 0.0], vec![0.0, 1.0]],
            DegeneratePolicy::Fail,
        )
        .unwrap();
        let err = ReferenceIndex::with_index("m", Box::new(flat), &embeddings)
            .err()
            .unwrap();
        assert_eq!(
            err,
            MatchError::IndexSizeMismatch {
                model: "m".into(),
                got: 2,
                want: 1
            }
        );
    }

    #[test]
    fn test_search_surfaces_position_without_owner() {
        let embeddings = vec![emb(&[1.0, 0.0], "A", "a1")];
        let idx = ReferenceIndex::with_index(
            "m",
            Box::new(FixedIndex {
                len: 1,
                position: 5,
            }),
            &embeddings,
        )
        .unwrap();
        let err = idx.search(&[&[0.0, 1.0]], 1).err().unwrap();
        assert_eq!(
            err,
            MatchError::UnknownPosition {
                model: "m".into(),
                position: 5
            }
        );
    }
}
