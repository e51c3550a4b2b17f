use std::collections::HashSet;

use serde::Serialize;
use sightid_matcher::MatchCandidate;
use sightid_plausibility::{Assessment, Validator, VerdictCounts};
use tracing::info;

use crate::occurrence::{Occurrence, OccurrenceTable};

/// Where and when one side of a pair was seen.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Site {
    pub key: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub event_date: Option<String>,
}

impl From<&Occurrence> for Site {
    fn from(o: &Occurrence) -> Self {
        Self {
            key: o.key.clone(),
            latitude: o.latitude,
            longitude: o.longitude,
            event_date: o.event_date.clone(),
        }
    }
}

/// A match candidate with its geo-temporal assessment.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidationResult {
    #[serde(flatten)]
    pub candidate: MatchCandidate,

    pub query_site: Option<Site>,

    pub matched_site: Option<Site>,

    #[serde(flatten)]
    pub assessment: Assessment,
}

/// Assesses two optional occurrences; a missing side gives UNKNOWN.
pub(crate) fn assess_pair(
    validator: &Validator,
    query: Option<&Occurrence>,
    matched: Option<&Occurrence>,
) -> Assessment {
    match (query, matched) {
        (Some(q), Some(m)) => validator.assess(&q.observation(), &m.observation()),
        _ => Assessment::unknown(),
    }
}

pub(crate) fn log_tally(what: &str, rows: usize, counts: VerdictCounts) {
    info!("sighting: {} {} rows: {}", what, rows, counts);
}

/// Validates every candidate, joining both sides to their occurrences by
/// occurrence key.
///
/// Returns exactly one result per candidate, in candidate order.
/// Placeholder candidates and candidates whose occurrences are not in the
/// table are UNKNOWN; malformed occurrence data is ERROR.
pub fn validate_candidates(
    candidates: &[MatchCandidate],
    table: &OccurrenceTable,
    validator: &Validator,
) -> Vec<ValidationResult> {
    let results: Vec<ValidationResult> = candidates
        .iter()
        .map(|c| {
            let query = table.get(&c.query_occurrence_id);
            let matched = c.matched.as_ref().and_then(|m| table.get(&m.occurrence_id));
            ValidationResult {
                candidate: c.clone(),
                query_site: query.map(Site::from),
                matched_site: matched.map(Site::from),
                assessment: assess_pair(validator, query, matched),
            }
        })
        .collect();

    log_tally(
        "validated",
        results.len(),
        results.iter().map(|r| r.assessment.verdict).collect(),
    );
    results
}

/// Validates at the level of individuals: both sides are represented by the
/// first recorded sighting of their individual, and only the first
/// candidate of each query individual is kept.
pub fn validate_individual_matches(
    candidates: &[MatchCandidate],
    table: &OccurrenceTable,
    validator: &Validator,
) -> Vec<ValidationResult> {
    let mut seen: HashSet<&str> = HashSet::new();
    let results: Vec<ValidationResult> = candidates
        .iter()
        .filter(|c| seen.insert(c.query_individual_id.as_str()))
        .map(|c| {
            let query = table.first_of_individual(&c.query_individual_id);
            let matched = c
                .matched
                .as_ref()
                .and_then(|m| table.first_of_individual(&m.individual_id));
            ValidationResult {
                candidate: c.clone(),
                query_site: query.map(Site::from),
                matched_site: matched.map(Site::from),
                assessment: assess_pair(validator, query, matched),
            }
        })
        .collect();

    log_tally(
        "validated individual",
        results.len(),
        results.iter().map(|r| r.assessment.verdict).collect(),
    );
    results
}
