//! Geo-temporal plausibility checks for re-identified animal sightings.
//!
//! A visual match between two sightings claims they show the same animal.
//! This crate tests that claim against physics: how far apart the two
//! sightings were, how many days separate them, and the travel speed that
//! would be needed to cover the distance.
//!
//! ```text
//! distance   haversine great-circle distance, R = 6371 km
//! days       |date_a - date_b| in whole days (time of day truncated)
//! speed      distance / days, +inf when days == 0
//!
//! speed <= vuncertain            PLAUSIBLE
//! speed <= vmax                  UNCERTAIN
//! otherwise                      IMPOSSIBLE
//! speed == +inf, d <  radius     PLAUSIBLE   (same day, same place)
//! speed == +inf, d >= radius     IMPOSSIBLE  (same day, far apart)
//! missing coordinate or date     UNKNOWN
//! malformed coordinate or date   ERROR
//! ```
//!
//! # Usage
//!
//! ```
//! use sightid_plausibility::{Observation, Plausibility, Validator};
//!
//! let v = Validator::default();
//! let a = Observation::new("occ-1", Some(18.0), Some(-98.0), Some("2020-01-01"));
//! let b = Observation::new("occ-2", Some(-10.0), Some(115.0), Some("2020-01-02"));
//! assert_eq!(v.assess(&a, &b).verdict, Plausibility::Impossible);
//! ```

mod date;
mod error;
mod geo;
mod validator;
mod verdict;

pub use date::{EventDate, Granularity};
pub use error::PlausibilityError;
pub use geo::{haversine_distance_km, implied_speed_km_per_day, GeoFix, EARTH_RADIUS_KM};
pub use validator::{
    categorize_plausibility, Assessment, Observation, Validator, ValidatorConfig, SPEED_SENTINEL,
};
pub use verdict::{Plausibility, VerdictCounts};
