use serde::{Deserialize, Serialize, Serializer};
use tracing::warn;

use crate::date::EventDate;
use crate::error::PlausibilityError;
use crate::geo::{speed_over, GeoFix};
use crate::verdict::Plausibility;

/// Exported in place of an infinite implied speed.
pub const SPEED_SENTINEL: f64 = 999_999.0;

/// Speed and distance thresholds for a species.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidatorConfig {
    /// Outer bound of sustained travel speed (km/day). Faster is IMPOSSIBLE.
    /// Default: 200.
    pub vmax_km_per_day: f64,

    /// Inner bound (km/day). At or below it a match is PLAUSIBLE, between it
    /// and `vmax_km_per_day` UNCERTAIN. Default: 150.
    pub vuncertain_km_per_day: f64,

    /// Same-day sightings closer than this (km) are PLAUSIBLE, farther ones
    /// IMPOSSIBLE. Default: 10.
    pub same_day_radius_km: f64,
}

impl Default for ValidatorConfig {
    fn default() -> Self {
        Self {
            vmax_km_per_day: 200.0,
            vuncertain_km_per_day: 150.0,
            same_day_radius_km: 10.0,
        }
    }
}

impl ValidatorConfig {
    /// Replaces zero values with the defaults.
    pub fn with_defaults(mut self) -> Self {
        let d = Self::default();
        if self.vmax_km_per_day == 0.0 {
            self.vmax_km_per_day = d.vmax_km_per_day;
        }
        if self.vuncertain_km_per_day == 0.0 {
            self.vuncertain_km_per_day = d.vuncertain_km_per_day;
        }
        if self.same_day_radius_km == 0.0 {
            self.same_day_radius_km = d.same_day_radius_km;
        }
        self
    }

    pub fn validate(&self) -> Result<(), PlausibilityError> {
        for (name, v) in [
            ("vmax_km_per_day", self.vmax_km_per_day),
            ("vuncertain_km_per_day", self.vuncertain_km_per_day),
            ("same_day_radius_km", self.same_day_radius_km),
        ] {
            if !v.is_finite() || v < 0.0 {
                return Err(PlausibilityError::InvalidThresholds(format!(
                    "{name} must be a non-negative number, got {v}"
                )));
            }
        }
        if self.vuncertain_km_per_day > self.vmax_km_per_day {
            return Err(PlausibilityError::InvalidThresholds(format!(
                "vuncertain_km_per_day ({}) exceeds vmax_km_per_day ({})",
                self.vuncertain_km_per_day, self.vmax_km_per_day
            )));
        }
        Ok(())
    }
}

/// Turns an implied speed and distance into a verdict.
///
/// `None` or NaN on either input means the measurement is missing and gives
/// [`Plausibility::Unknown`]. An infinite speed means a same-day pair and is
/// decided by distance alone.
pub fn categorize_plausibility(
    speed_km_per_day: Option<f64>,
    distance_km: Option<f64>,
    cfg: &ValidatorConfig,
) -> Plausibility {
    let (Some(speed), Some(distance)) = (speed_km_per_day, distance_km) else {
        return Plausibility::Unknown;
    };
    if speed.is_nan() || distance.is_nan() {
        return Plausibility::Unknown;
    }

    if speed.is_infinite() {
        return if distance < cfg.same_day_radius_km {
            Plausibility::Plausible
        } else {
            Plausibility::Impossible
        };
    }

    if speed <= cfg.vuncertain_km_per_day {
        Plausibility::Plausible
    } else if speed <= cfg.vmax_km_per_day {
        Plausibility::Uncertain
    } else {
        Plausibility::Impossible
    }
}

/// One side of a pair to validate, as recorded: any field may be absent.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Observation<'a> {
    /// Identifies the record in log messages.
    pub key: &'a str,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub event_date: Option<&'a str>,
}

impl<'a> Observation<'a> {
    pub fn new(
        key: &'a str,
        latitude: Option<f64>,
        longitude: Option<f64>,
        event_date: Option<&'a str>,
    ) -> Self {
        Self {
            key,
            latitude,
            longitude,
            event_date,
        }
    }

    /// An observation with nothing recorded.
    pub fn missing(key: &'a str) -> Self {
        Self::new(key, None, None, None)
    }

    fn fix(&self) -> Result<Option<GeoFix>, PlausibilityError> {
        let (Some(lat), Some(lon), Some(date)) = (self.latitude, self.longitude, self.event_date)
        else {
            return Ok(None);
        };
        if date.trim().is_empty() {
            return Ok(None);
        }
        let date = EventDate::parse(date)?;
        GeoFix::new(lat, lon, date).map(Some)
    }
}

/// The outcome of validating one pair of observations.
///
/// Values are kept at full precision. Serialization is the export boundary:
/// distance and speed are rounded to 2 decimals there and an infinite speed
/// is written as [`SPEED_SENTINEL`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Assessment {
    #[serde(serialize_with = "serialize_rounded")]
    pub distance_km: Option<f64>,

    pub days_between: Option<u64>,

    #[serde(serialize_with = "serialize_speed")]
    pub implied_speed_km_per_day: Option<f64>,

    pub verdict: Plausibility,
}

impl Assessment {
    pub fn unknown() -> Self {
        Self::empty(Plausibility::Unknown)
    }

    pub fn error() -> Self {
        Self::empty(Plausibility::Error)
    }

    fn empty(verdict: Plausibility) -> Self {
        Self {
            distance_km: None,
            days_between: None,
            implied_speed_km_per_day: None,
            verdict,
        }
    }
}

fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

fn serialize_rounded<S: Serializer>(v: &Option<f64>, serializer: S) -> Result<S::Ok, S::Error> {
    match v {
        Some(v) => serializer.serialize_some(&round2(*v)),
        None => serializer.serialize_none(),
    }
}

fn serialize_speed<S: Serializer>(v: &Option<f64>, serializer: S) -> Result<S::Ok, S::Error> {
    match v {
        Some(v) if v.is_infinite() => serializer.serialize_some(&SPEED_SENTINEL),
        Some(v) => serializer.serialize_some(&round2(*v)),
        None => serializer.serialize_none(),
    }
}

/// Scores pairs of observations against a [`ValidatorConfig`].
#[derive(Debug, Clone, Default)]
pub struct Validator {
    cfg: ValidatorConfig,
}

impl Validator {
    /// Creates a Validator. Zero thresholds take their defaults; negative,
    /// non-finite or inverted thresholds are rejected.
    pub fn new(cfg: ValidatorConfig) -> Result<Self, PlausibilityError> {
        let cfg = cfg.with_defaults();
        cfg.validate()?;
        Ok(Self { cfg })
    }

    pub fn config(&self) -> &ValidatorConfig {
        &self.cfg
    }

    /// Validates one pair. Never fails: missing data gives UNKNOWN, and
    /// malformed data gives ERROR and a warning naming both records.
    pub fn assess(&self, a: &Observation<'_>, b: &Observation<'_>) -> Assessment {
        match self.measure(a, b) {
            Ok(Some(assessment)) => assessment,
            Ok(None) => Assessment::unknown(),
            Err(e) => {
                warn!("plausibility: {} -> {}: {}", a.key, b.key, e);
                Assessment::error()
            }
        }
    }

    fn measure(
        &self,
        a: &Observation<'_>,
        b: &Observation<'_>,
    ) -> Result<Option<Assessment>, PlausibilityError> {
        let fa = a.fix()?;
        let fb = b.fix()?;
        let (Some(fa), Some(fb)) = (fa, fb) else {
            return Ok(None);
        };

        let distance = fa.distance_km(&fb);
        let days = fa.days_between(&fb);
        let speed = speed_over(distance, days);

        Ok(Some(Assessment {
            distance_km: Some(distance),
            days_between: Some(days),
            implied_speed_km_per_day: Some(speed),
            verdict: categorize_plausibility(Some(speed), Some(distance), &self.cfg),
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cfg() -> ValidatorConfig {
        ValidatorConfig::default()
    }

    #[test]
    fn test_categorize_thresholds() {
        let c = cfg();
        let at = |speed: f64| categorize_plausibility(Some(speed), Some(500.0), &c);
        assert_eq!(at(0.0), Plausibility::Plausible);
        assert_eq!(at(150.0), Plausibility::Plausible);
        assert_eq!(at(150.01), Plausibility::Uncertain);
        assert_eq!(at(200.0), Plausibility::Uncertain);
        assert_eq!(at(200.01), Plausibility::Impossible);
    }

    #[test]
    fn test_categorize_same_day() {
        let c = cfg();
        let inf = Some(f64::INFINITY);
        assert_eq!(categorize_plausibility(inf, Some(0.0), &c), Plausibility::Plausible);
        assert_eq!(categorize_plausibility(inf, Some(9.99), &c), Plausibility::Plausible);
        assert_eq!(categorize_plausibility(inf, Some(10.0), &c), Plausibility::Impossible);
        assert_eq!(categorize_plausibility(inf, Some(16_000.0), &c), Plausibility::Impossible);
    }

    #[test]
    fn test_categorize_missing() {
        let c = cfg();
        assert_eq!(categorize_plausibility(None, Some(1.0), &c), Plausibility::Unknown);
        assert_eq!(categorize_plausibility(Some(1.0), None, &c), Plausibility::Unknown);
        assert_eq!(categorize_plausibility(Some(f64::NAN), Some(1.0), &c), Plausibility::Unknown);
        assert_eq!(categorize_plausibility(Some(1.0), Some(f64::NAN), &c), Plausibility::Unknown);
    }

    #[test]
    fn test_categorize_custom_species() {
        let slow = ValidatorConfig {
            vmax_km_per_day: 20.0,
            vuncertain_km_per_day: 5.0,
            same_day_radius_km: 1.0,
        };
        let at = |speed: f64| categorize_plausibility(Some(speed), Some(100.0), &slow);
        assert_eq!(at(10.0), Plausibility::Uncertain);
        assert_eq!(at(30.0), Plausibility::Impossible);
        assert_eq!(
            categorize_plausibility(Some(f64::INFINITY), Some(2.0), &slow),
            Plausibility::Impossible
        );
    }

    #[test]
    fn test_config_defaults_and_validation() {
        let c = ValidatorConfig {
            vmax_km_per_day: 0.0,
            vuncertain_km_per_day: 0.0,
            same_day_radius_km: 0.0,
        }
        .with_defaults();
        assert_eq!(c, ValidatorConfig::default());

        let zeroed = ValidatorConfig {
            same_day_radius_km: 0.0,
            ..ValidatorConfig::default()
        };
        assert_eq!(Validator::new(zeroed).unwrap().config(), &ValidatorConfig::default());

        let inverted = ValidatorConfig {
            vmax_km_per_day: 100.0,
            vuncertain_km_per_day: 150.0,
            same_day_radius_km: 10.0,
        };
        assert!(matches!(
            Validator::new(inverted),
            Err(PlausibilityError::InvalidThresholds(_))
        ));

        let negative = ValidatorConfig {
            same_day_radius_km: -1.0,
            ..ValidatorConfig::default()
        };
        assert!(Validator::new(negative).is_err());

        let nan = ValidatorConfig {
            vmax_km_per_day: f64::NAN,
            ..ValidatorConfig::default()
        };
        assert!(Validator::new(nan).is_err());
    }

    #[test]
    fn test_config_deserializes_partial() {
        let c: ValidatorConfig =
            serde_json::from_str(r#"{"vmax_km_per_day": 120.0, "vuncertain_km_per_day": 80.0}"#)
                .unwrap();
        assert_eq!(c.vmax_km_per_day, 120.0);
        assert_eq!(c.vuncertain_km_per_day, 80.0);
        assert_eq!(c.same_day_radius_km, 10.0);
    }

    #[test]
    fn test_assess_missing_is_unknown() {
        let v = Validator::default();
        let a = Observation::new("a", Some(1.0), None, Some("2020-01-01"));
        let b = Observation::new("b", Some(1.0), Some(2.0), Some("2020-01-05"));
        assert_eq!(v.assess(&a, &b), Assessment::unknown());
        assert_eq!(v.assess(&b, &Observation::missing("c")), Assessment::unknown());

        let blank = Observation::new("d", Some(1.0), Some(2.0), Some("  "));
        assert_eq!(v.assess(&b, &blank).verdict, Plausibility::Unknown);
    }

    #[test]
    fn test_assess_malformed_is_error() {
        let v = Validator::default();
        let good = Observation::new("a", Some(1.0), Some(2.0), Some("2020-01-01"));
        let bad_date = Observation::new("b", Some(1.0), Some(2.0), Some("yesterday"));
        let bad_lat = Observation::new("c", Some(123.0), Some(2.0), Some("2020-01-01"));
        assert_eq!(v.assess(&good, &bad_date), Assessment::error());
        assert_eq!(v.assess(&bad_lat, &good), Assessment::error());
    }

    #[test]
    fn test_assess_measures_pair() {
        let v = Validator::default();
        let a = Observation::new("a", Some(0.0), Some(0.0), Some("2020-01-01"));
        let b = Observation::new("b", Some(0.0), Some(1.0), Some("2020-01-03T06:00:00"));
        let r = v.assess(&a, &b);
        assert_eq!(r.days_between, Some(2));
        assert!((r.distance_km.unwrap() - 111.195).abs() < 0.01);
        assert!((r.implied_speed_km_per_day.unwrap() - 55.597).abs() < 0.01);
        assert_eq!(r.verdict, Plausibility::Plausible);
    }

    #[test]
    fn test_assessment_export_format() {
        let same_day = Assessment {
            distance_km: Some(12.3456),
            days_between: Some(0),
            implied_speed_km_per_day: Some(f64::INFINITY),
            verdict: Plausibility::Impossible,
        };
        let json = serde_json::to_value(same_day).unwrap();
        assert_eq!(json["distance_km"], 12.35);
        assert_eq!(json["days_between"], 0);
        assert_eq!(json["implied_speed_km_per_day"], SPEED_SENTINEL);
        assert_eq!(json["verdict"], "IMPOSSIBLE");

        let json = serde_json::to_value(Assessment::unknown()).unwrap();
        assert!(json["distance_km"].is_null());
        assert!(json["implied_speed_km_per_day"].is_null());
        assert_eq!(json["verdict"], "UNKNOWN");
    }
}
