use std::collections::btree_map::Entry;
use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use sightid_plausibility::{Assessment, Validator};

use crate::occurrence::{Occurrence, OccurrenceTable};
use crate::validate::{assess_pair, log_tally, Site, ValidationResult};

/// One distinct match of an individual.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchEntry {
    pub matched_individual_id: String,
    pub matched_occurrence_id: String,
    pub distance: f32,
    pub model: String,

    /// The query sighting that produced the closest instance of this match.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub query_occurrence_id: Option<String>,
}

/// All distinct matches of one individual.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndividualMatches {
    pub individual_id: String,

    /// Sorted by matched individual, then distance, occurrence and model.
    #[serde(default)]
    pub matches: Vec<MatchEntry>,
}

impl IndividualMatches {
    pub fn new(individual_id: impl Into<String>) -> Self {
        Self {
            individual_id: individual_id.into(),
            matches: Vec::new(),
        }
    }

    /// Human-readable match list, e.g.
    /// `B (occ-7, 0.0123) [miewid]; C (occ-9, 0.4100) [miewid]`.
    /// Empty when there are no matches.
    pub fn describe(&self) -> String {
        self.matches
            .iter()
            .map(|m| {
                format!(
                    "{} ({}, {:.4}) [{}]",
                    m.matched_individual_id, m.matched_occurrence_id, m.distance, m.model
                )
            })
            .collect::<Vec<_>>()
            .join("; ")
    }
}

/// Collapses per-occurrence results into one row per query individual.
pub fn aggregate_by_individual(results: &[ValidationResult]) -> Vec<IndividualMatches> {
    aggregate_with_roster(results, std::iter::empty())
}

/// Like [`aggregate_by_individual`], but every id in `roster` gets a row even
/// when no result mentions it.
///
/// A match is identified by (matched individual, matched occurrence, model);
/// repeated matches keep their smallest distance. Placeholder results add
/// the individual without a match. Rows are sorted by individual id.
pub fn aggregate_with_roster<'a>(
    results: &[ValidationResult],
    roster: impl IntoIterator<Item = &'a str>,
) -> Vec<IndividualMatches> {
    type Key = (String, String, String);
    let mut grouped: BTreeMap<String, BTreeMap<Key, MatchEntry>> = BTreeMap::new();

    for id in roster {
        grouped.entry(id.to_string()).or_default();
    }

    for r in results {
        let c = &r.candidate;
        let matches = grouped.entry(c.query_individual_id.clone()).or_default();
        let Some(m) = &c.matched else {
            continue;
        };

        let entry = MatchEntry {
            matched_individual_id: m.individual_id.clone(),
            matched_occurrence_id: m.occurrence_id.clone(),
            distance: m.distance,
            model: c.model.clone(),
            query_occurrence_id: Some(c.query_occurrence_id.clone()),
        };
        let key = (
            entry.matched_individual_id.clone(),
            entry.matched_occurrence_id.clone(),
            entry.model.clone(),
        );
        match matches.entry(key) {
            Entry::Vacant(v) => {
                v.insert(entry);
            }
            Entry::Occupied(mut o) => {
                if entry.distance < o.get().distance {
                    o.insert(entry);
                }
            }
        }
    }

    grouped
        .into_iter()
        .map(|(individual_id, matches)| {
            let mut matches: Vec<MatchEntry> = matches.into_values().collect();
            matches.sort_by(|a, b| {
                a.matched_individual_id
                    .cmp(&b.matched_individual_id)
                    .then(a.distance.total_cmp(&b.distance))
                    .then_with(|| a.matched_occurrence_id.cmp(&b.matched_occurrence_id))
                    .then_with(|| a.model.cmp(&b.model))
            });
            IndividualMatches {
                individual_id,
                matches,
            }
        })
        .collect()
}

/// One (individual, match) pair with both sightings re-attached and
/// re-validated.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OccurrenceMatchRow {
    pub individual_id: String,

    pub query_site: Option<Site>,

    /// None for an individual without matches.
    pub matched: Option<MatchEntry>,

    pub matched_site: Option<Site>,

    #[serde(flatten)]
    pub assessment: Assessment,
}

/// Expands per-individual summaries into one row per (individual, match).
///
/// An individual without matches still yields exactly one UNKNOWN row, so
/// `n` individuals with `m_i` matches give `sum(max(m_i, 1))` rows.
///
/// Each side is re-attached to its own sighting: the recorded occurrence
/// key when it is in the table, otherwise the first sighting of its
/// individual.
pub fn explode(
    rows: &[IndividualMatches],
    table: &OccurrenceTable,
    validator: &Validator,
) -> Vec<OccurrenceMatchRow> {
    let mut out = Vec::with_capacity(rows.iter().map(|r| r.matches.len().max(1)).sum());

    for row in rows {
        if row.matches.is_empty() {
            out.push(OccurrenceMatchRow {
                individual_id: row.individual_id.clone(),
                query_site: table.first_of_individual(&row.individual_id).map(Site::from),
                matched: None,
                matched_site: None,
                assessment: Assessment::unknown(),
            });
            continue;
        }

        for m in &row.matches {
            let query = resolve(table, m.query_occurrence_id.as_deref(), &row.individual_id);
            let matched = resolve(table, Some(&m.matched_occurrence_id), &m.matched_individual_id);
            out.push(OccurrenceMatchRow {
                individual_id: row.individual_id.clone(),
                query_site: query.map(Site::from),
                matched: Some(m.clone()),
                matched_site: matched.map(Site::from),
                assessment: assess_pair(validator, query, matched),
            });
        }
    }

    log_tally(
        "exploded",
        out.len(),
        out.iter().map(|r| r.assessment.verdict).collect(),
    );
    out
}

fn resolve<'a>(
    table: &'a OccurrenceTable,
    occurrence_key: Option<&str>,
    individual_id: &str,
) -> Option<&'a Occurrence> {
    occurrence_key
        .and_then(|k| table.get(k))
        .or_else(|| table.first_of_individual(individual_id))
}
