use std::path::Path;

use anyhow::{Context, Result};
use mongodb::bson::DateTime;
use serde::{Deserialize, Deserializer, Serialize};

/// An advocate as stored in the `advocates` collection.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Advocate {
    #[serde(rename = "_id")]
    pub id: i64,

    pub first_name: String,
    pub last_name: String,
    pub city: String,
    pub degree: String,
    #[serde(default, deserialize_with = "deserialize_specialties")]
    pub specialties: Vec<String>,
    pub years_of_experience: u32,
    pub phone_number: i64,
    pub created_at: DateTime,
}

/// An advocate entry from a fixture file, before it has an id or a creation
/// timestamp.
#[derive(Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct NewAdvocate {
    pub first_name: String,
    pub last_name: String,
    pub city: String,
    pub degree: String,
    #[serde(default, deserialize_with = "deserialize_specialties")]
    pub specialties: Vec<String>,
    pub years_of_experience: u32,
    pub phone_number: i64,
}

impl NewAdvocate {
    pub fn into_advocate(self, id: i64, created_at: DateTime) -> Advocate {
        Advocate {
            id,
            first_name: self.first_name,
            last_name: self.last_name,
            city: self.city,
            degree: self.degree,
            specialties: self.specialties,
            years_of_experience: self.years_of_experience,
            phone_number: self.phone_number,
            created_at,
        }
    }
}

/// Older rows hold a bare string where a list of specialties is expected.
#[derive(Deserialize)]
#[serde(untagged)]
enum Specialties {
    Many(Vec<String>),
    One(String),
}

impl From<Specialties> for Vec<String> {
    fn from(value: Specialties) -> Self {
        match value {
            Specialties::Many(list) => list,
            Specialties::One(single) => vec![single],
        }
    }
}

fn deserialize_specialties<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Specialties>::deserialize(deserializer)?;
    Ok(value.map(Vec::from).unwrap_or_default())
}

/// Read a JSON array of advocate entries.
pub fn load_fixtures(path: impl AsRef<Path>) -> Result<Vec<NewAdvocate>> {
    let path = path.as_ref();
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read fixture file {}", path.display()))?;
    serde_json::from_str(&raw)
        .with_context(|| format!("Failed to parse fixture file {}", path.display()))
}

/// Assign ids `1..=n` and strictly increasing creation timestamps, in file
/// order, starting at `base`.
pub fn stamp_fixtures(entries: Vec<NewAdvocate>, base: DateTime) -> Vec<Advocate> {
    let base_ms = base.timestamp_millis();
    entries
        .into_iter()
        .zip(0i64..)
        .map(|(entry, i)| entry.into_advocate(i + 1, DateTime::from_millis(base_ms + i)))
        .collect()
}
