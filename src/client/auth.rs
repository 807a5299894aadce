//! Token endpoint client

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client as HttpClient;

use super::api::AuthApi;
use super::error_detail;
use super::models::TokenResponse;
use crate::error::{ApiError, Result};
use crate::session::TokenPair;

/// Client for `/auth/token` and `/auth/refresh`.
///
/// These calls bypass the request pipeline: a rejected refresh must not
/// trigger another refresh.
#[derive(Clone)]
pub struct AuthClient {
    http: HttpClient,
    base_url: String,
}

impl AuthClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let http = HttpClient::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ApiError::Network(e.to_string()))?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    async fn token_response(response: reqwest::Response, fallback: &str) -> Result<TokenPair> {
        let status = response.status();
        let body = response.text().await.map_err(ApiError::from)?;

        if !status.is_success() {
            let detail = error_detail(&body).unwrap_or_else(|| fallback.to_string());
            return Err(ApiError::AuthFailed(detail).into());
        }

        let tokens: TokenResponse = serde_json::from_str(&body).map_err(|e| {
            ApiError::InvalidResponse(format!("Failed to parse token response: {}", e))
        })?;
        Ok(tokens.into())
    }
}

#[async_trait]
impl AuthApi for AuthClient {
    async fn login(&self, username: &str, password: &str) -> Result<TokenPair> {
        let url = format!("{}/auth/token", self.base_url);
        log::debug!("POST {}", url);

        let response = self
            .http
            .post(&url)
            .form(&[("username", username), ("password", password)])
            .send()
            .await
            .map_err(ApiError::from)?;

        Self::token_response(response, "Login failed").await
    }

    async fn refresh(&self, refresh_token: &str) -> Result<TokenPair> {
        let url = format!("{}/auth/refresh", self.base_url);
        log::debug!("POST {}", url);

        let response = self
            .http
            .post(&url)
            .json(&serde_json::json!({ "refresh_token": refresh_token }))
            .send()
            .await
            .map_err(ApiError::from)?;

        Self::token_response(response, "Refresh failed").await
    }
}
