use crate::date::EventDate;
use crate::error::PlausibilityError;

/// Mean Earth radius used for great-circle distances.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Great-circle distance in kilometers between two points given in degrees.
///
/// Symmetric in its two points; identical points yield exactly 0.0.
pub fn haversine_distance_km(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let phi1 = lat1.to_radians();
    let phi2 = lat2.to_radians();
    let half_dphi = (lat2 - lat1).to_radians() / 2.0;
    let half_dlambda = (lon2 - lon1).to_radians() / 2.0;

    let a = half_dphi.sin().powi(2) + phi1.cos() * phi2.cos() * half_dlambda.sin().powi(2);
    // a can drift a hair above 1 for antipodal points.
    2.0 * EARTH_RADIUS_KM * a.sqrt().min(1.0).asin()
}

/// A validated position with the day it was observed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoFix {
    pub latitude: f64,
    pub longitude: f64,
    pub date: EventDate,
}

impl GeoFix {
    /// Creates a GeoFix. Coordinates must be finite, latitude within
    /// [-90, 90] and longitude within [-180, 180].
    pub fn new(latitude: f64, longitude: f64, date: EventDate) -> Result<Self, PlausibilityError> {
        let valid = latitude.is_finite()
            && longitude.is_finite()
            && (-90.0..=90.0).contains(&latitude)
            && (-180.0..=180.0).contains(&longitude);
        if !valid {
            return Err(PlausibilityError::InvalidCoordinate {
                latitude,
                longitude,
            });
        }
        Ok(Self {
            latitude,
            longitude,
            date,
        })
    }

    /// Great-circle distance to another fix, in kilometers.
    pub fn distance_km(&self, other: &Self) -> f64 {
        haversine_distance_km(self.latitude, self.longitude, other.latitude, other.longitude)
    }

    /// Whole days between the two fixes.
    pub fn days_between(&self, other: &Self) -> u64 {
        self.date.days_between(&other.date)
    }
}

/// Travel speed needed to get from `a` to `b`, in km/day.
///
/// Returns `f64::INFINITY` when both fixes fall on the same day, including
/// when they are at the same place; the caller decides what that means.
pub fn implied_speed_km_per_day(a: &GeoFix, b: &GeoFix) -> f64 {
    speed_over(a.distance_km(b), a.days_between(b))
}

pub(crate) fn speed_over(distance_km: f64, days: u64) -> f64 {
    if days == 0 {
        return f64::INFINITY;
    }
    distance_km / days as f64
}
