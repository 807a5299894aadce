//! Job application models and status pipeline helpers

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Status pipeline in kanban column order
pub const STATUS_ORDER: [&str; 6] = [
    "En étude",
    "Candidature envoyée",
    "Première sélection",
    "Entretien",
    "Offre reçue",
    "Refusée",
];

/// Short names accepted on the command line for each pipeline status
const STATUS_ALIASES: [(&str, &str); 7] = [
    ("study", "En étude"),
    ("sent", "Candidature envoyée"),
    ("screening", "Première sélection"),
    ("interview", "Entretien"),
    ("test", "Test technique"),
    ("offer", "Offre reçue"),
    ("rejected", "Refusée"),
];

/// A tracked job application.
///
/// Missing optional fields from the API default to empty values; the record
/// id is read from either `_id` or `id`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Application {
    #[serde(rename = "_id", alias = "id", default)]
    pub id: String,

    #[serde(default)]
    pub user_id: String,

    #[serde(default)]
    pub company: String,

    #[serde(default)]
    pub position: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,

    #[serde(default)]
    pub application_date: String,

    #[serde(default)]
    pub status: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default, deserialize_with = "notes_or_empty")]
    pub notes: Vec<String>,

    #[serde(default)]
    pub created_at: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,

    #[serde(default)]
    pub archived: bool,
}

/// Accept `null` or a missing list as no notes
fn notes_or_empty<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(Option::<Vec<String>>::deserialize(deserializer)?.unwrap_or_default())
}

/// Payload for creating an application
#[derive(Debug, Clone, Serialize)]
pub struct NewApplication {
    pub company: String,
    pub position: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    pub application_date: String,
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub notes: Vec<String>,
    pub archived: bool,
}

/// Partial update; only set fields are sent
#[derive(Debug, Clone, Default, Serialize)]
pub struct ApplicationUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub application_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub archived: Option<bool>,
}

impl ApplicationUpdate {
    pub fn is_empty(&self) -> bool {
        self.company.is_none()
            && self.position.is_none()
            && self.location.is_none()
            && self.url.is_none()
            && self.application_date.is_none()
            && self.status.is_none()
            && self.description.is_none()
            && self.notes.is_none()
            && self.archived.is_none()
    }
}

/// Map user input to a pipeline status label.
///
/// Accepts the exact label (case-insensitive) or a short alias; anything else
/// is passed through for the backend to validate.
pub fn resolve_status(input: &str) -> String {
    let trimmed = input.trim();
    let lowered = trimmed.to_lowercase();

    if let Some((_, label)) = STATUS_ALIASES.iter().find(|(alias, _)| *alias == lowered) {
        return label.to_string();
    }
    if let Some((_, label)) = STATUS_ALIASES
        .iter()
        .find(|(_, label)| label.to_lowercase() == lowered)
    {
        return label.to_string();
    }
    trimmed.to_string()
}

/// Pipeline progress percentage for a status
pub fn progress(status: &str) -> u8 {
    match status {
        "Candidature envoyée" => 25,
        "Entretien" => 50,
        "Offre reçue" => 100,
        _ => 0,
    }
}

/// Whole days between `date` and `now`, rounded up.
///
/// Accepts RFC 3339 timestamps, naive `YYYY-MM-DDTHH:MM:SS` and plain dates.
pub fn days_since(date: &str, now: DateTime<Utc>) -> Option<i64> {
    let then = parse_date(date)?;
    let secs = (now - then).num_seconds().abs();
    Some((secs + 86_399) / 86_400)
}

fn parse_date(value: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(naive) = chrono::NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(naive.and_utc());
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}
