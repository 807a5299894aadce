//! Account API trait

use async_trait::async_trait;

use crate::client::models::{NewUser, PasswordChange, User};
use crate::error::Result;

#[async_trait]
pub trait AccountApi: Send + Sync {
    /// Create an account. Sent without credentials.
    async fn register(&self, user: &NewUser) -> Result<User>;

    /// The signed-in user
    async fn me(&self) -> Result<User>;

    async fn change_password(&self, change: &PasswordChange) -> Result<User>;
}
