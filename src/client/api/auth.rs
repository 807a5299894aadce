//! Authentication API trait

use async_trait::async_trait;

use crate::error::Result;
use crate::session::TokenPair;

/// Token endpoints. Neither call goes through the 401 retry pipeline.
#[async_trait]
pub trait AuthApi: Send + Sync {
    /// Exchange username and password for a token pair
    async fn login(&self, username: &str, password: &str) -> Result<TokenPair>;

    /// Exchange a refresh token for a new token pair
    async fn refresh(&self, refresh_token: &str) -> Result<TokenPair>;
}
