//! User administration API trait

use async_trait::async_trait;

use crate::client::models::{User, UserUpdate};
use crate::error::Result;

#[async_trait]
pub trait UserApi: Send + Sync {
    async fn list_users(&self) -> Result<Vec<User>>;

    async fn get_user(&self, id: &str) -> Result<User>;

    async fn update_user(&self, id: &str, update: &UserUpdate) -> Result<User>;

    async fn delete_user(&self, id: &str) -> Result<()>;
}
