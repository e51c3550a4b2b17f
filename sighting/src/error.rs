use sightid_plausibility::PlausibilityError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SightingError {
    #[error("sighting: invalid validator config: {0}")]
    Config(#[from] PlausibilityError),
}
