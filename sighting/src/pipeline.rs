use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};
use sightid_matcher::{
    match_all_against_all, Embedding, MatchCandidate, MatchConfig, Matcher, ModelFailure,
};
use sightid_plausibility::{Validator, ValidatorConfig};
use tracing::{debug, info};

use crate::error::SightingError;
use crate::occurrence::{Occurrence, OccurrenceTable};
use crate::summary::{aggregate_with_roster, explode, IndividualMatches, OccurrenceMatchRow};
use crate::validate::{validate_candidates, ValidationResult};

/// Retrieval mode.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// Queries against the known reference set.
    #[default]
    Known,
    /// Known and queries pooled; each query takes its nearest non-self
    /// neighbor.
    All,
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mode::Known => f.write_str("known"),
            Mode::All => f.write_str("all"),
        }
    }
}

/// Settings for a full run. Missing sections take their defaults.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub mode: Mode,
    pub matcher: MatchConfig,
    pub validator: ValidatorConfig,
}

/// Input of a run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Dataset {
    /// Reference embeddings with confirmed identities.
    pub known: Vec<Embedding>,
    /// Embeddings to identify.
    pub queries: Vec<Embedding>,
    /// Sighting metadata, joined to embeddings by occurrence key.
    pub occurrences: Vec<Occurrence>,
}

/// Output of a run.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Report {
    pub mode: Mode,
    pub candidates: Vec<MatchCandidate>,
    pub failures: Vec<ModelFailure>,
    pub validations: Vec<ValidationResult>,
    pub individuals: Vec<IndividualMatches>,
    pub occurrences: Vec<OccurrenceMatchRow>,
}

/// Match, validate, aggregate and explode in one pass.
#[derive(Debug, Clone)]
pub struct Pipeline {
    cfg: PipelineConfig,
    validator: Validator,
}

impl Pipeline {
    pub fn new(cfg: PipelineConfig) -> Result<Self, SightingError> {
        let validator = Validator::new(cfg.validator)?;
        Ok(Self { cfg, validator })
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.cfg
    }

    pub fn run(&self, data: &Dataset) -> Report {
        info!(
            "sighting: run mode={} known={} queries={} occurrences={}",
            self.cfg.mode,
            data.known.len(),
            data.queries.len(),
            data.occurrences.len()
        );

        let run = match self.cfg.mode {
            Mode::Known => {
                Matcher::from_embeddings(&data.known, self.cfg.matcher).match_known(&data.queries)
            }
            Mode::All => match_all_against_all(&data.known, &data.queries, &self.cfg.matcher),
        };
        debug!(
            "sighting: {} candidates, {} failed models",
            run.candidates.len(),
            run.failures.len()
        );

        let table: OccurrenceTable = data.occurrences.iter().cloned().collect();
        let validations = validate_candidates(&run.candidates, &table, &self.validator);

        let roster: BTreeSet<&str> = data
            .queries
            .iter()
            .map(|q| q.individual_id.as_str())
            .collect();
        let individuals = aggregate_with_roster(&validations, roster);
        let occurrences = explode(&individuals, &table, &self.validator);

        Report {
            mode: self.cfg.mode,
            candidates: run.candidates,
            failures: run.failures,
            validations,
            individuals,
            occurrences,
        }
    }
}
