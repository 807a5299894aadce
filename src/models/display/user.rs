//! User display model

use serde::Serialize;
use tabled::Tabled;

use super::common::yes_no;
use crate::client::models::User;
use crate::output::formatters::or_dash;

#[derive(Debug, Clone, Tabled, Serialize)]
pub struct UserDisplay {
    #[tabled(rename = "USER ID")]
    pub id: String,

    #[tabled(rename = "USERNAME")]
    pub username: String,

    #[tabled(rename = "EMAIL")]
    pub email: String,

    #[tabled(rename = "NAME")]
    pub name: String,

    #[tabled(rename = "ADMIN")]
    pub admin: String,
}

impl From<&User> for UserDisplay {
    fn from(user: &User) -> Self {
        Self {
            id: user.id.clone(),
            username: user.username.clone(),
            email: user.email.clone(),
            name: or_dash(user.full_name.as_deref()),
            admin: yes_no(user.is_admin.unwrap_or(false)),
        }
    }
}
