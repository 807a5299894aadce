//! API data models
//!
//! Request and response types for the JobTrack backend, plus the kanban
//! grouping shared by applications and tasks.

mod application;
mod job_offer;
mod task;
mod user;

pub use application::{
    Application, ApplicationUpdate, NewApplication, STATUS_ORDER, days_since, progress,
    resolve_status,
};
pub use job_offer::{
    CollectSummary, CountBucket, JobOffer, JobOfferFilter, JobOfferStats, OfferCount,
};
pub use task::{NewTask, Task, TaskStatus, TaskUpdate};
pub use user::{NewUser, PasswordChange, User, UserUpdate};

use crate::session::TokenPair;

/// Response of `/auth/token` and `/auth/refresh`
#[derive(Debug, Clone, serde::Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub refresh_token: String,
}

impl From<TokenResponse> for TokenPair {
    fn from(resp: TokenResponse) -> Self {
        TokenPair {
            access_token: resp.access_token,
            refresh_token: resp.refresh_token,
        }
    }
}

/// One kanban column
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct Column<T> {
    pub status: String,
    pub items: Vec<T>,
}

/// Group items into columns following `order`.
///
/// Statuses outside `order` get their own columns after the known ones, in
/// order of first appearance. Known columns are kept even when empty unless
/// `skip_empty` is set.
pub fn group_by_status<T, F>(
    items: Vec<T>,
    order: &[&str],
    skip_empty: bool,
    status: F,
) -> Vec<Column<T>>
where
    F: Fn(&T) -> &str,
{
    let mut columns: Vec<Column<T>> = order
        .iter()
        .map(|s| Column {
            status: s.to_string(),
            items: Vec::new(),
        })
        .collect();

    for item in items {
        let key = status(&item).to_string();
        match columns.iter_mut().find(|c| c.status == key) {
            Some(column) => column.items.push(item),
            None => columns.push(Column {
                status: key,
                items: vec![item],
            }),
        }
    }

    if skip_empty {
        columns.retain(|c| !c.items.is_empty());
    }
    columns
}

impl<T> Column<T> {
    /// Convert every item, keeping the column
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Column<U> {
        Column {
            status: self.status,
            items: self.items.into_iter().map(f).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn app(id: &str, status: &str) -> Application {
        Application {
            id: id.to_string(),
            status: status.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_group_keeps_pipeline_order() {
        let apps = vec![
            app("1", "Entretien"),
            app("2", "En étude"),
            app("3", "Entretien"),
            app("4", "Refusée"),
        ];

        let board = group_by_status(apps, &STATUS_ORDER, false, |a| a.status.as_str());

        let names: Vec<&str> = board.iter().map(|c| c.status.as_str()).collect();
        assert_eq!(names, STATUS_ORDER.to_vec());
        assert_eq!(board[0].items.len(), 1);
        assert_eq!(board[3].items.len(), 2);
        assert!(board[1].items.is_empty());
    }

    #[test]
    fn test_group_appends_unknown_statuses() {
        let apps = vec![app("1", "Test technique"), app("2", "Offre reçue"), app("3", "")];

        let board = group_by_status(apps, &STATUS_ORDER, true, |a| a.status.as_str());

        let names: Vec<&str> = board.iter().map(|c| c.status.as_str()).collect();
        assert_eq!(names, vec!["Offre reçue", "Test technique", ""]);
    }

    #[test]
    fn test_token_response_into_pair() {
        let resp: TokenResponse = serde_json::from_str(
            r#"{"access_token": "a", "refresh_token": "r", "token_type": "bearer"}"#,
        )
        .unwrap();
        let pair: TokenPair = resp.into();
        assert_eq!(pair.access_token, "a");
        assert_eq!(pair.refresh_token, "r");
    }
}
