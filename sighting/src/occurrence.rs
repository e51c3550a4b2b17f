use std::collections::HashMap;
use std::fmt;

use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize};
use sightid_plausibility::Observation;

/// One recorded sighting.
///
/// Field names follow snake_case; the Darwin Core / GBIF column names are
/// accepted as aliases so occurrence exports load unchanged.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Occurrence {
    /// Join key. Embeddings refer to their occurrence by this value.
    #[serde(deserialize_with = "string_or_number")]
    pub key: String,

    #[serde(default, alias = "occurrenceID", skip_serializing_if = "Option::is_none")]
    pub occurrence_id: Option<String>,

    #[serde(default, alias = "decimalLatitude")]
    pub latitude: Option<f64>,

    #[serde(default, alias = "decimalLongitude")]
    pub longitude: Option<f64>,

    /// Full date, year-month or year; any time of day is ignored.
    #[serde(default, alias = "eventDate")]
    pub event_date: Option<String>,

    #[serde(default, alias = "organismID", skip_serializing_if = "Option::is_none")]
    pub organism_id: Option<String>,

    #[serde(default, alias = "identificationID", skip_serializing_if = "Option::is_none")]
    pub identification_id: Option<String>,
}

impl Occurrence {
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            ..Self::default()
        }
    }

    /// Sets coordinates and date.
    pub fn at(mut self, latitude: f64, longitude: f64, event_date: impl Into<String>) -> Self {
        self.latitude = Some(latitude);
        self.longitude = Some(longitude);
        self.event_date = Some(event_date.into());
        self
    }

    /// Sets the identification id, the usual source of the individual id.
    pub fn of(mut self, individual_id: impl Into<String>) -> Self {
        self.identification_id = Some(individual_id.into());
        self
    }

    /// The individual this sighting belongs to, if known. See
    /// [`consolidate_individual_id`].
    pub fn individual_id(&self) -> Option<&str> {
        consolidate_individual_id(self.organism_id.as_deref(), self.identification_id.as_deref())
    }

    /// View for the plausibility validator.
    pub fn observation(&self) -> Observation<'_> {
        Observation::new(&self.key, self.latitude, self.longitude, self.event_date.as_deref())
    }
}

/// Picks the individual id from the raw identifier fields: the organism id
/// when present, otherwise the identification id. Blank values count as
/// absent.
pub fn consolidate_individual_id<'a>(
    organism_id: Option<&'a str>,
    identification_id: Option<&'a str>,
) -> Option<&'a str> {
    [organism_id, identification_id]
        .into_iter()
        .flatten()
        .map(str::trim)
        .find(|s| !s.is_empty())
}

fn string_or_number<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    struct KeyVisitor;

    impl Visitor<'_> for KeyVisitor {
        type Value = String;

        fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("a string or integer key")
        }

        fn visit_str<E: de::Error>(self, v: &str) -> Result<String, E> {
            Ok(v.to_string())
        }

        fn visit_u64<E: de::Error>(self, v: u64) -> Result<String, E> {
            Ok(v.to_string())
        }

        fn visit_i64<E: de::Error>(self, v: i64) -> Result<String, E> {
            Ok(v.to_string())
        }
    }

    deserializer.deserialize_any(KeyVisitor)
}

/// An individual and the sightings attributed to it, in table order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Individual {
    pub id: String,
    pub occurrence_keys: Vec<String>,
}

/// In-memory occurrence metadata with lookups by key and by individual.
///
/// When a key or an individual appears more than once, the first row wins.
#[derive(Debug, Clone, Default)]
pub struct OccurrenceTable {
    rows: Vec<Occurrence>,
    by_key: HashMap<String, usize>,
    by_individual: HashMap<String, usize>,
}

impl OccurrenceTable {
    pub fn new(rows: Vec<Occurrence>) -> Self {
        let mut by_key = HashMap::with_capacity(rows.len());
        let mut by_individual = HashMap::new();
        for (i, row) in rows.iter().enumerate() {
            by_key.entry(row.key.clone()).or_insert(i);
            if let Some(id) = row.individual_id() {
                by_individual.entry(id.to_string()).or_insert(i);
            }
        }
        Self {
            rows,
            by_key,
            by_individual,
        }
    }

    pub fn get(&self, key: &str) -> Option<&Occurrence> {
        self.by_key.get(key).map(|&i| &self.rows[i])
    }

    /// First sighting of an individual.
    pub fn first_of_individual(&self, individual_id: &str) -> Option<&Occurrence> {
        self.by_individual.get(individual_id).map(|&i| &self.rows[i])
    }

    /// Every identified individual, sorted by id.
    pub fn individuals(&self) -> Vec<Individual> {
        let mut grouped: HashMap<&str, Vec<String>> = HashMap::new();
        for row in &self.rows {
            if let Some(id) = row.individual_id() {
                grouped.entry(id).or_default().push(row.key.clone());
            }
        }
        let mut out: Vec<Individual> = grouped
            .into_iter()
            .map(|(id, occurrence_keys)| Individual {
                id: id.to_string(),
                occurrence_keys,
            })
            .collect();
        out.sort_by(|a, b| a.id.cmp(&b.id));
        out
    }

    pub fn rows(&self) -> &[Occurrence] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

impl FromIterator<Occurrence> for OccurrenceTable {
    fn from_iter<I: IntoIterator<Item = Occurrence>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}
