use std::collections::{BTreeMap, BTreeSet};

use tracing::{debug, info, warn};

use crate::error::MatchError;
use crate::reference::ReferenceIndex;
use crate::types::{Embedding, MatchCandidate, MatchConfig, MatchRun, ModelFailure};

/// Matches query embeddings against per-model reference indexes.
///
/// Indexes are built by the caller (or by [`Matcher::from_embeddings`]) and
/// handed in explicitly; the matcher never builds or caches anything on
/// first use.
#[derive(Debug, Default)]
pub struct Matcher {
    cfg: MatchConfig,
    indexes: BTreeMap<String, ReferenceIndex>,
    /// Models whose reference index could not be built.
    broken: BTreeMap<String, MatchError>,
}

impl Matcher {
    pub fn new(cfg: MatchConfig) -> Self {
        Self {
            cfg,
            indexes: BTreeMap::new(),
            broken: BTreeMap::new(),
        }
    }

    /// Groups `known` by model tag and builds one reference index per tag.
    ///
    /// A model whose index fails to build (mixed dimensions, or a zero-norm
    /// vector under the fail policy) is remembered as broken and reported by
    /// every later match run; the other models are unaffected.
    pub fn from_embeddings(known: &[Embedding], cfg: MatchConfig) -> Self {
        let mut matcher = Self::new(cfg);
        let mut by_model: BTreeMap<&str, Vec<&Embedding>> = BTreeMap::new();
        for e in known {
            by_model.entry(e.model.as_str()).or_default().push(e);
        }
        for (model, embeddings) in by_model {
            match ReferenceIndex::build(model, embeddings, cfg.degenerate) {
                Ok(index) => {
                    matcher.insert(index);
                }
                Err(e) => {
                    warn!("matcher: model {} reference index not built: {}", model, e);
                    matcher.broken.insert(model.to_string(), e);
                }
            }
        }
        matcher
    }

    /// Registers a reference index, replacing any index with the same model
    /// tag. Returns the replaced index.
    pub fn insert(&mut self, index: ReferenceIndex) -> Option<ReferenceIndex> {
        self.broken.remove(index.model());
        self.indexes.insert(index.model().to_string(), index)
    }

    pub fn config(&self) -> &MatchConfig {
        &self.cfg
    }

    /// Model tags with a usable index, in sorted order.
    pub fn models(&self) -> impl Iterator<Item = &str> {
        self.indexes.keys().map(|m| m.as_str())
    }

    pub fn index_of(&self, model: &str) -> Option<&ReferenceIndex> {
        self.indexes.get(model)
    }

    /// Matches every query against the reference index of its own model.
    ///
    /// Each query yields `k` ranked candidates per model, or one placeholder
    /// candidate when it has no usable neighbor. A model fails as a whole
    /// when its reference set is empty, its index is broken, or one of its
    /// queries has the wrong dimensionality.
    pub fn match_known(&self, queries: &[Embedding]) -> MatchRun {
        let mut models: BTreeSet<&str> = self.indexes.keys().map(|m| m.as_str()).collect();
        models.extend(self.broken.keys().map(|m| m.as_str()));
        models.extend(queries.iter().map(|q| q.model.as_str()));

        let mut run = MatchRun::default();
        for model in models {
            match self.match_model(model, queries) {
                Ok(candidates) => {
                    debug!("matcher: model {} produced {} candidates", model, candidates.len());
                    run.candidates.extend(candidates);
                }
                Err(error) => {
                    warn!("matcher: model {} failed: {}", model, error);
                    run.failures.push(ModelFailure {
                        model: model.to_string(),
                        error,
                    });
                }
            }
        }

        info!(
            "matcher: {} queries, {} candidates, {} failed models",
            queries.len(),
            run.candidates.len(),
            run.failures.len()
        );
        run.finish()
    }

    /// Mode A for a single model.
    pub fn match_model(
        &self,
        model: &str,
        queries: &[Embedding],
    ) -> Result<Vec<MatchCandidate>, MatchError> {
        if let Some(e) = self.broken.get(model) {
            return Err(e.clone());
        }
        let index = match self.indexes.get(model) {
            Some(index) if !index.is_empty() => index,
            _ => {
                return Err(MatchError::EmptyReferenceSet {
                    model: model.to_string(),
                })
            }
        };

        let positions: Vec<usize> = queries
            .iter()
            .enumerate()
            .filter(|(_, q)| q.model == model)
            .map(|(i, _)| i)
            .collect();
        if positions.is_empty() {
            return Ok(Vec::new());
        }

        let vectors: Vec<&[f32]> = positions
            .iter()
            .map(|&i| queries[i].vector.as_slice())
            .collect();
        let hits = index
            .search(&vectors, self.cfg.top_k())
            .map_err(|e| e.map_position(|p| positions.get(p).copied().unwrap_or(p)))?;

        let mut candidates = Vec::with_capacity(positions.len() * self.cfg.top_k());
        for (&position, neighbors) in positions.iter().zip(hits) {
            let query = &queries[position];
            if neighbors.is_empty() {
                candidates.push(MatchCandidate::new(model, position, query, 0, None));
                continue;
            }
            for (rank, matched) in neighbors.into_iter().enumerate() {
                candidates.push(MatchCandidate::new(model, position, query, rank, Some(matched)));
            }
        }
        Ok(candidates)
    }
}
