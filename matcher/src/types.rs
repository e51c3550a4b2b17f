use serde::{Deserialize, Serialize, Serializer};
use sightid_vecstore::DegeneratePolicy;

use crate::error::MatchError;

/// A learned visual embedding of one image crop.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Embedding {
    pub vector: Vec<f32>,

    /// The individual the crop is labeled as.
    pub individual_id: String,

    /// The occurrence (sighting) the crop was taken from.
    pub occurrence_id: String,

    /// The embedding space (model) that produced the vector.
    pub model: String,
}

impl Embedding {
    pub fn new(
        vector: Vec<f32>,
        individual_id: impl Into<String>,
        occurrence_id: impl Into<String>,
        model: impl Into<String>,
    ) -> Self {
        Self {
            vector,
            individual_id: individual_id.into(),
            occurrence_id: occurrence_id.into(),
            model: model.into(),
        }
    }
}

/// Controls matcher behavior.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchConfig {
    /// Candidates returned per query and model. Default: 1. Zero means 1.
    pub k: usize,

    /// Handling of zero-norm embeddings. Default: skip.
    pub degenerate: DegeneratePolicy,
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            k: 1,
            degenerate: DegeneratePolicy::Skip,
        }
    }
}

impl MatchConfig {
    pub(crate) fn top_k(&self) -> usize {
        self.k.max(1)
    }
}

/// The reference embedding a query was matched to.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatchedEmbedding {
    /// Position of the matched embedding in the list its index was built
    /// from.
    #[serde(rename = "matched_position")]
    pub position: usize,

    #[serde(rename = "matched_individual_id")]
    pub individual_id: String,

    #[serde(rename = "matched_occurrence_id")]
    pub occurrence_id: String,

    /// Squared Euclidean distance between the L2-normalized vectors, in
    /// `[0, 4]`.
    pub distance: f32,
}

/// One proposed identification for one query under one model.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatchCandidate {
    pub model: String,

    /// Position of the query in the caller's query list.
    pub query_position: usize,

    pub query_individual_id: String,

    pub query_occurrence_id: String,

    /// 0 for the nearest neighbor, 1 for the next, and so on.
    pub rank: usize,

    /// None when the query had no usable neighbor (zero-norm query, or a
    /// lone embedding in all-against-all mode). The row is still emitted so
    /// every query position is accounted for.
    #[serde(flatten)]
    pub matched: Option<MatchedEmbedding>,
}

impl MatchCandidate {
    pub(crate) fn new(
        model: &str,
        query_position: usize,
        query: &Embedding,
        rank: usize,
        matched: Option<MatchedEmbedding>,
    ) -> Self {
        Self {
            model: model.to_string(),
            query_position,
            query_individual_id: query.individual_id.clone(),
            query_occurrence_id: query.occurrence_id.clone(),
            rank,
            matched,
        }
    }
}

/// A model that produced no candidates because of a structural error.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModelFailure {
    pub model: String,

    #[serde(serialize_with = "serialize_display")]
    pub error: MatchError,
}

fn serialize_display<S: Serializer>(e: &MatchError, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_str(e)
}

/// The output of one matching pass over all models.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MatchRun {
    /// Sorted by query position, then model tag, then rank.
    pub candidates: Vec<MatchCandidate>,

    /// Sorted by model tag.
    pub failures: Vec<ModelFailure>,
}

impl MatchRun {
    /// True when every model ran.
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }

    /// Returns the failure for a model, if it failed.
    pub fn failure_of(&self, model: &str) -> Option<&MatchError> {
        self.failures
            .iter()
            .find(|f| f.model == model)
            .map(|f| &f.error)
    }

    /// Candidates produced by one model.
    pub fn candidates_of<'a>(
        &'a self,
        model: &'a str,
    ) -> impl Iterator<Item = &'a MatchCandidate> + 'a {
        self.candidates.iter().filter(move |c| c.model == model)
    }

    pub(crate) fn finish(mut self) -> Self {
        self.candidates.sort_by(|a, b| {
            a.query_position
                .cmp(&b.query_position)
                .then_with(|| a.model.cmp(&b.model))
                .then(a.rank.cmp(&b.rank))
        });
        self.failures.sort_by(|a, b| a.model.cmp(&b.model));
        self
    }
}
