//! User account models

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    #[serde(alias = "_id")]
    pub id: String,

    pub username: String,

    pub email: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_admin: Option<bool>,
}

/// Registration payload
#[derive(Debug, Clone, Serialize)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub password: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
}

/// Partial user update
#[derive(Debug, Clone, Default, Serialize)]
pub struct UserUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
}

impl UserUpdate {
    pub fn is_empty(&self) -> bool {
        self.username.is_none() && self.email.is_none() && self.full_name.is_none()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PasswordChange {
    pub current_password: String,
    pub new_password: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_optional_fields() {
        let user: User =
            serde_json::from_str(r#"{"id": "u1", "username": "alice", "email": "a@x.io"}"#)
                .unwrap();
        assert_eq!(user.username, "alice");
        assert!(user.full_name.is_none());
        assert!(user.is_admin.is_none());
    }

    #[test]
    fn test_new_user_omits_missing_full_name() {
        let payload = NewUser {
            username: "bob".into(),
            email: "b@x.io".into(),
            password: "pw".into(),
            full_name: None,
        };
        let json = serde_json::to_value(&payload).unwrap();
        assert!(json.get("full_name").is_none());
        assert_eq!(json["password"], "pw");
    }

    #[test]
    fn test_user_update_sends_only_given_fields() {
        let update = UserUpdate {
            email: Some("new@x.io".into()),
            ..Default::default()
        };
        assert!(!update.is_empty());
        assert_eq!(
            serde_json::to_value(&update).unwrap(),
            serde_json::json!({"email": "new@x.io"})
        );
        assert!(UserUpdate::default().is_empty());
    }
}
