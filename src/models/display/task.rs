//! Task display models

use serde::Serialize;
use tabled::Tabled;

use super::common::truncate_string;
use crate::client::models::Task;
use crate::output::formatters::{format_date, or_dash};

#[derive(Debug, Clone, Tabled, Serialize)]
pub struct TaskDisplay {
    #[tabled(rename = "ID")]
    pub id: String,

    #[tabled(rename = "TITLE")]
    pub title: String,

    #[tabled(rename = "STATUS")]
    pub status: String,

    #[tabled(rename = "DUE")]
    pub due: String,

    #[tabled(rename = "APPLICATION")]
    pub application: String,
}

impl From<&Task> for TaskDisplay {
    fn from(task: &Task) -> Self {
        Self {
            id: task.id.clone(),
            title: truncate_string(&task.title, 40),
            status: task.status.clone(),
            due: task
                .due_date
                .as_deref()
                .map(format_date)
                .unwrap_or_else(|| "--".to_string()),
            application: or_dash(task.application_id.as_deref()),
        }
    }
}

/// Compact task card for the board
#[derive(Debug, Clone, Tabled, Serialize)]
pub struct TaskCard {
    #[tabled(rename = "ID")]
    pub id: String,

    #[tabled(rename = "TITLE")]
    pub title: String,

    #[tabled(rename = "DUE")]
    pub due: String,
}

impl From<&Task> for TaskCard {
    fn from(task: &Task) -> Self {
        let row = TaskDisplay::from(task);
        Self {
            id: row.id,
            title: row.title,
            due: row.due,
        }
    }
}
