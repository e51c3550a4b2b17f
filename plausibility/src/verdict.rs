use std::fmt;

use serde::{Deserialize, Serialize};

/// Whether two sightings could show the same animal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Plausibility {
    /// The implied travel is well within what the species can do.
    Plausible,
    /// The implied travel is possible but near the limit.
    Uncertain,
    /// The implied travel is faster than the species can sustain.
    Impossible,
    /// Coordinates or dates are missing on at least one side.
    Unknown,
    /// The input could not be interpreted (bad date, bad coordinate).
    Error,
}

impl Plausibility {
    /// Orders the physical verdicts from most to least believable.
    /// Returns None for Unknown and Error, which carry no physical claim.
    pub fn severity(self) -> Option<u8> {
        match self {
            Self::Plausible => Some(0),
            Self::Uncertain => Some(1),
            Self::Impossible => Some(2),
            Self::Unknown | Self::Error => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Plausible => "PLAUSIBLE",
            Self::Uncertain => "UNCERTAIN",
            Self::Impossible => "IMPOSSIBLE",
            Self::Unknown => "UNKNOWN",
            Self::Error => "ERROR",
        }
    }
}

impl fmt::Display for Plausibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-verdict tally of a batch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct VerdictCounts {
    pub plausible: usize,
    pub uncertain: usize,
    pub impossible: usize,
    pub unknown: usize,
    pub error: usize,
}

impl VerdictCounts {
    pub fn add(&mut self, verdict: Plausibility) {
        match verdict {
            Plausibility::Plausible => self.plausible += 1,
            Plausibility::Uncertain => self.uncertain += 1,
            Plausibility::Impossible => self.impossible += 1,
            Plausibility::Unknown => self.unknown += 1,
            Plausibility::Error => self.error += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.plausible + self.uncertain + self.impossible + self.unknown + self.error
    }
}

impl FromIterator<Plausibility> for VerdictCounts {
    fn from_iter<I: IntoIterator<Item = Plausibility>>(iter: I) -> Self {
        let mut counts = Self::default();
        for v in iter {
            counts.add(v);
        }
        counts
    }
}

impl fmt::Display for VerdictCounts {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "PLAUSIBLE={} UNCERTAIN={} IMPOSSIBLE={} UNKNOWN={} ERROR={}",
            self.plausible, self.uncertain, self.impossible, self.unknown, self.error
        )
    }
}
