//! Per-model nearest-neighbor matching of animal embeddings.
//!
//! Every embedding belongs to one model tag (the embedding space it was
//! computed in). Embeddings of different models are never compared: each
//! model gets its own [`ReferenceIndex`] and yields its own candidates. When
//! two models disagree about a query, both answers are returned side by side
//! and reconciling them is left to the consumer.
//!
//! Two retrieval modes:
//!
//! - [`Matcher::match_known`]: queries are matched against a reference
//!   ("known") set, top-k per model.
//! - [`match_all_against_all`]: known and query embeddings are pooled per
//!   model and every query takes its nearest neighbor other than itself.
//!
//! Structural problems (empty reference set, mixed dimensions) fail the
//! affected model only; they are reported in [`MatchRun::failures`] while the
//! other models still produce candidates.
//!
//! # Usage
//!
//! ```
//! use sightid_matcher::{Embedding, MatchConfig, Matcher};
//!
//! let known = vec![
//!     Embedding::new(vec![1.0, 0.0], "A", "occ-a", "miewid"),
//!     Embedding::new(vec![0.0, 1.0], "B", "occ-b", "miewid"),
//! ];
//! let matcher = Matcher::from_embeddings(&known, MatchConfig::default());
//!
//! let queries = vec![Embedding::new(vec![0.1, 0.9], "q", "occ-q", "miewid")];
//! let run = matcher.match_known(&queries);
//! let best = run.candidates[0].matched.as_ref().unwrap();
//! assert_eq!(best.individual_id, "B");
//! ```

mod error;
mod matcher;
mod reference;
mod self_match;
mod types;

pub use error::MatchError;
pub use matcher::Matcher;
pub use reference::ReferenceIndex;
pub use self_match::match_all_against_all;
pub use types::{Embedding, MatchCandidate, MatchConfig, MatchRun, MatchedEmbedding, ModelFailure};

pub use sightid_vecstore::DegeneratePolicy;
