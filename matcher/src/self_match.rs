use std::collections::BTreeSet;

use tracing::{debug, info, warn};

use crate::error::MatchError;
use crate::reference::ReferenceIndex;
use crate::types::{Embedding, MatchCandidate, MatchConfig, MatchRun, ModelFailure};

/// Matches every query against everything else: the known embeddings and
/// the other queries of the same model.
///
/// Per model, known embeddings and then queries are pooled into one index.
/// The query at pool position `known_len + i` is searched with two
/// neighbors and takes the first one whose position is not its own, so a
/// query is never matched to itself even when exact duplicates tie with it
/// at distance 0.
/// Each query yields exactly one candidate at rank 0; `MatchConfig::k` only
/// applies to [`Matcher::match_known`](crate::Matcher::match_known).
///
/// `MatchedEmbedding::position` and index error positions refer to the
/// pooled list. An empty query set yields an empty run.
pub fn match_all_against_all(
    known: &[Embedding],
    queries: &[Embedding],
    cfg: &MatchConfig,
) -> MatchRun {
    let mut run = MatchRun::default();
    if queries.is_empty() {
        return run;
    }

    let models: BTreeSet<&str> = queries.iter().map(|q| q.model.as_str()).collect();
    for model in models {
        match match_model_within(model, known, queries, cfg) {
            Ok(candidates) => {
                debug!(
                    "matcher: model {} produced {} self-excluded candidates",
                    model,
                    candidates.len()
                );
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
        "matcher: all-against-all over {} known + {} queries, {} candidates, {} failed models",
        known.len(),
        queries.len(),
        run.candidates.len(),
        run.failures.len()
    );
    run.finish()
}

fn match_model_within(
    model: &str,
    known: &[Embedding],
    queries: &[Embedding],
    cfg: &MatchConfig,
) -> Result<Vec<MatchCandidate>, MatchError> {
    let known: Vec<&Embedding> = known.iter().filter(|e| e.model == model).collect();
    let positions: Vec<usize> = queries
        .iter()
        .enumerate()
        .filter(|(_, q)| q.model == model)
        .map(|(i, _)| i)
        .collect();

    let offset = known.len();
    let pool = known
        .iter()
        .copied()
        .chain(positions.iter().map(|&i| &queries[i]));
    let index = ReferenceIndex::build(model, pool, cfg.degenerate)?;

    let vectors: Vec<&[f32]> = positions
        .iter()
        .map(|&i| queries[i].vector.as_slice())
        .collect();
    let hits = index.search(&vectors, 2)?;

    let mut candidates = Vec::with_capacity(positions.len());
    for (j, (&position, neighbors)) in positions.iter().zip(hits).enumerate() {
        let own = offset + j;
        let matched = neighbors.into_iter().find(|n| n.position != own);
        candidates.push(MatchCandidate::new(model, position, &queries[position], 0, matched));
    }
    Ok(candidates)
}
