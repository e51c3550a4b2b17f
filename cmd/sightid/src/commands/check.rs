//! Single-pair plausibility check.

use anyhow::{Context, Result};
use clap::Args;
use sightid_plausibility::{Observation, Validator};

use crate::config::load_config;
use crate::output::write_json;
use crate::Cli;

/// Assess whether one animal could have been at both sightings.
#[derive(Args)]
pub struct CheckCommand {
    /// First sighting as LAT,LON,DATE (e.g. 18.0,-98.0,2020-01-01)
    #[arg(long, allow_hyphen_values = true)]
    from: String,

    /// Second sighting as LAT,LON,DATE
    #[arg(long, allow_hyphen_values = true)]
    to: String,
}

impl CheckCommand {
    pub fn run(&self, cli: &Cli) -> Result<()> {
        let cfg = load_config(cli.config.as_deref())?;
        let validator = Validator::new(cfg.validator)?;

        let (lat_a, lon_a, date_a) = parse_sighting(&self.from).context("--from")?;
        let (lat_b, lon_b, date_b) = parse_sighting(&self.to).context("--to")?;

        let a = Observation::new("from", Some(lat_a), Some(lon_a), Some(date_a));
        let b = Observation::new("to", Some(lat_b), Some(lon_b), Some(date_b));
        write_json(&validator.assess(&a, &b), cli.output.as_deref())
    }
}

/// Splits `LAT,LON,DATE`. The date is passed through unparsed.
fn parse_sighting(s: &str) -> Result<(f64, f64, &str)> {
    let mut parts = s.splitn(3, ',').map(str::trim);
    let (Some(lat), Some(lon), Some(date)) = (parts.next(), parts.next(), parts.next()) else {
        anyhow::bail!("expected LAT,LON,DATE, got {:?}", s);
    };
    let lat: f64 = lat.parse().with_context(|| format!("invalid latitude {:?}", lat))?;
    let lon: f64 = lon.parse().with_context(|| format!("invalid longitude {:?}", lon))?;
    Ok((lat, lon, date))
}
