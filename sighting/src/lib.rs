//! Joins match candidates to their sightings and checks them.
//!
//! Flow of a run:
//!
//! 1. match query embeddings per model ([`sightid_matcher`]);
//! 2. join both sides of every candidate to an [`Occurrence`] and assess
//!    the pair ([`validate_candidates`]);
//! 3. collapse candidates into one row per query individual
//!    ([`aggregate_by_individual`]);
//! 4. expand those rows back to one row per (individual, match) with both
//!    sightings re-validated ([`explode`]).
//!
//! [`Pipeline`] does all four.
//!
//! ```
//! use sightid_matcher::Embedding;
//! use sightid_plausibility::Plausibility;
//! use sightid_sighting::{Dataset, Occurrence, Pipeline, PipelineConfig};
//!
//! let data = Dataset {
//!     known: vec![Embedding::new(vec![1.0, 0.0], "A", "k1", "miewid")],
//!     queries: vec![Embedding::new(vec![0.9, 0.1], "q", "q1", "miewid")],
//!     occurrences: vec![
//!         Occurrence::new("k1").at(18.0, -98.0, "2020-01-01").of("A"),
//!         Occurrence::new("q1").at(18.1, -98.0, "2020-01-05").of("q"),
//!     ],
//! };
//! let report = Pipeline::new(PipelineConfig::default()).unwrap().run(&data);
//! assert_eq!(report.validations[0].assessment.verdict, Plausibility::Plausible);
//! ```

mod error;
mod occurrence;
mod pipeline;
mod summary;
mod validate;

pub use error::SightingError;
pub use occurrence::{consolidate_individual_id, Individual, Occurrence, OccurrenceTable};
pub use pipeline::{Dataset, Mode, Pipeline, PipelineConfig, Report};
pub use summary::{
    aggregate_by_individual, aggregate_with_roster, explode, IndividualMatches, MatchEntry,
    OccurrenceMatchRow,
};
pub use validate::{validate_candidates, validate_individual_matches, Site, ValidationResult};
