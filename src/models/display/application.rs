//! Application display models

use chrono::{DateTime, Utc};
use serde::Serialize;
use tabled::Tabled;

use super::common::{truncate_string, yes_no};
use crate::client::models::{Application, days_since, progress};
use crate::output::formatters::{format_date, format_days, or_dash, progress_bar};

/// Application row for list output
#[derive(Debug, Clone, Tabled, Serialize)]
pub struct ApplicationDisplay {
    #[tabled(rename = "ID")]
    pub id: String,

    #[tabled(rename = "COMPANY")]
    pub company: String,

    #[tabled(rename = "POSITION")]
    pub position: String,

    #[tabled(rename = "STATUS")]
    pub status: String,

    #[tabled(rename = "PROGRESS")]
    pub progress: String,

    #[tabled(rename = "APPLIED")]
    pub applied: String,

    /// Days since the application was sent
    #[tabled(rename = "AGE")]
    pub age: String,

    #[tabled(rename = "ARCHIVED")]
    pub archived: String,
}

impl ApplicationDisplay {
    pub fn new(app: &Application, now: DateTime<Utc>) -> Self {
        Self {
            id: app.id.clone(),
            company: truncate_string(&app.company, 30),
            position: truncate_string(&app.position, 40),
            status: app.status.clone(),
            progress: progress_bar(progress(&app.status)),
            applied: format_date(&app.application_date),
            age: format_days(days_since(&app.application_date, now)),
            archived: yes_no(app.archived),
        }
    }
}

/// Compact application card for the board
#[derive(Debug, Clone, Tabled, Serialize)]
pub struct ApplicationCard {
    #[tabled(rename = "ID")]
    pub id: String,

    #[tabled(rename = "COMPANY")]
    pub company: String,

    #[tabled(rename = "POSITION")]
    pub position: String,

    #[tabled(rename = "AGE")]
    pub age: String,
}

impl ApplicationCard {
    pub fn new(app: &Application, now: DateTime<Utc>) -> Self {
        Self {
            id: app.id.clone(),
            company: truncate_string(&app.company, 24),
            position: truncate_string(&app.position, 32),
            age: format_days(days_since(&app.application_date, now)),
        }
    }
}

/// Every field of one application, for `app show`
#[derive(Debug, Clone, Tabled, Serialize)]
pub struct ApplicationDetail {
    #[tabled(rename = "ID")]
    pub id: String,

    #[tabled(rename = "COMPANY")]
    pub company: String,

    #[tabled(rename = "POSITION")]
    pub position: String,

    #[tabled(rename = "LOCATION")]
    pub location: String,

    #[tabled(rename = "URL")]
    pub url: String,

    #[tabled(rename = "STATUS")]
    pub status: String,

    #[tabled(rename = "PROGRESS")]
    pub progress: String,

    #[tabled(rename = "APPLIED")]
    pub applied: String,

    #[tabled(rename = "AGE")]
    pub age: String,

    #[tabled(rename = "DESCRIPTION")]
    pub description: String,

    #[tabled(rename = "NOTES")]
    pub notes: String,

    #[tabled(rename = "ARCHIVED")]
    pub archived: String,

    #[tabled(rename = "CREATED")]
    pub created: String,
}

impl ApplicationDetail {
    pub fn new(app: &Application, now: DateTime<Utc>) -> Self {
        let notes = if app.notes.is_empty() {
            "--".to_string()
        } else {
            app.notes
                .iter()
                .map(|n| format!("- {}", n))
                .collect::<Vec<_>>()
                .join("\n")
        };

        Self {
            id: app.id.clone(),
            company: app.company.clone(),
            position: app.position.clone(),
            location: or_dash(app.location.as_deref()),
            url: or_dash(app.url.as_deref()),
            status: app.status.clone(),
            progress: progress_bar(progress(&app.status)),
            applied: format_date(&app.application_date),
            age: format_days(days_since(&app.application_date, now)),
            description: or_dash(app.description.as_deref()),
            notes,
            archived: yes_no(app.archived),
            created: format_date(&app.created_at),
        }
    }
}
