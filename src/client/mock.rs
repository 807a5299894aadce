//! Mock API implementations for testing
//!
//! Provides in-process implementations of the API traits so session and
//! client logic can be tested without a server.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use super::api::{ApplicationApi, AuthApi};
use super::models::{Application, ApplicationUpdate, NewApplication};
use crate::error::{ApiError, Result};
use crate::session::token::unsigned_jwt;
use crate::session::{Clock, TokenPair};

/// Mock token endpoint.
///
/// Mints unsigned JWTs that expire `lifetime` after the current time of the
/// injected clock, and numbered refresh tokens.
///
/// # Example
/// ```ignore
/// let auth = MockAuthApi::new(clock.clone(), Duration::from_secs(900));
/// auth.reject_refresh();
/// assert!(auth.refresh("refresh-1").await.is_err());
/// assert_eq!(auth.refresh_calls(), 1);
/// ```
pub struct MockAuthApi {
    clock: Arc<dyn Clock>,
    lifetime: Duration,
    state: Arc<Mutex<AuthState>>,
}

#[derive(Default)]
struct AuthState {
    /// Subject of the last successful login
    subject: Option<String>,
    /// Counter for minted refresh tokens
    issued: usize,
    refresh_calls: usize,
    last_refresh_token: Option<String>,
    reject_login: bool,
    reject_refresh: bool,
    refresh_latency: Duration,
}

impl MockAuthApi {
    pub fn new(clock: Arc<dyn Clock>, lifetime: Duration) -> Self {
        Self {
            clock,
            lifetime,
            state: Arc::new(Mutex::new(AuthState::default())),
        }
    }

    /// Fail every subsequent login
    pub fn reject_login(&self) {
        self.state.lock().unwrap().reject_login = true;
    }

    /// Fail every subsequent refresh
    pub fn reject_refresh(&self) {
        self.state.lock().unwrap().reject_refresh = true;
    }

    /// Make each refresh take `latency` of tokio time
    pub fn set_refresh_latency(&self, latency: Duration) {
        self.state.lock().unwrap().refresh_latency = latency;
    }

    /// Number of refresh calls received, including rejected ones
    pub fn refresh_calls(&self) -> usize {
        self.state.lock().unwrap().refresh_calls
    }

    /// Refresh token presented by the latest refresh call
    pub fn last_refresh_token(&self) -> Option<String> {
        self.state.lock().unwrap().last_refresh_token.clone()
    }

    fn mint(&self, subject: &str) -> TokenPair {
        let mut state = self.state.lock().unwrap();
        state.issued += 1;

        let expires_at =
            self.clock.now() + chrono::Duration::from_std(self.lifetime).unwrap_or_default();
        TokenPair {
            access_token: unsigned_jwt(subject, expires_at),
            refresh_token: format!("refresh-{}", state.issued),
        }
    }
}

#[async_trait]
impl AuthApi for MockAuthApi {
    async fn login(&self, username: &str, _password: &str) -> Result<TokenPair> {
        {
            let mut state = self.state.lock().unwrap();
            if state.reject_login {
                return Err(ApiError::AuthFailed("Incorrect username or password".into()).into());
            }
            state.subject = Some(username.to_string());
        }
        Ok(self.mint(username))
    }

    async fn refresh(&self, refresh_token: &str) -> Result<TokenPair> {
        let latency = {
            let mut state = self.state.lock().unwrap();
            state.refresh_calls += 1;
            state.last_refresh_token = Some(refresh_token.to_string());
            state.refresh_latency
        };

        if !latency.is_zero() {
            tokio::time::sleep(latency).await;
        }

        let subject = {
            let state = self.state.lock().unwrap();
            if state.reject_refresh {
                return Err(ApiError::AuthFailed("Invalid refresh token".into()).into());
            }
            state.subject.clone().unwrap_or_else(|| "user".to_string())
        };
        Ok(self.mint(&subject))
    }
}

/// In-memory application store recording every update it receives.
#[derive(Default)]
pub struct MockApplicationApi {
    apps: Arc<Mutex<Vec<Application>>>,
    updates: Arc<Mutex<Vec<ApplicationUpdate>>>,
}

impl MockApplicationApi {
    pub fn with(apps: Vec<Application>) -> Self {
        Self {
            apps: Arc::new(Mutex::new(apps)),
            updates: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Updates received so far, in order
    pub fn updates(&self) -> Vec<ApplicationUpdate> {
        self.updates.lock().unwrap().clone()
    }

    fn not_found(id: &str) -> crate::error::Error {
        ApiError::NotFound(format!("Application {}", id)).into()
    }
}

#[async_trait]
impl ApplicationApi for MockApplicationApi {
    async fn list_applications(&self, status: Option<&str>) -> Result<Vec<Application>> {
        let apps = self.apps.lock().unwrap();
        Ok(apps
            .iter()
            .filter(|a| status.is_none_or(|s| a.status == s))
            .cloned()
            .collect())
    }

    async fn get_application(&self, id: &str) -> Result<Application> {
        let apps = self.apps.lock().unwrap();
        apps.iter()
            .find(|a| a.id == id)
            .cloned()
            .ok_or_else(|| Self::not_found(id))
    }

    async fn create_application(&self, new: &NewApplication) -> Result<Application> {
        let mut apps = self.apps.lock().unwrap();
        let app = Application {
            id: format!("app-{}", apps.len() + 1),
            company: new.company.clone(),
            position: new.position.clone(),
            location: new.location.clone(),
            url: new.url.clone(),
            application_date: new.application_date.clone(),
            status: new.status.clone(),
            description: new.description.clone(),
            notes: new.notes.clone(),
            archived: new.archived,
            ..Default::default()
        };
        apps.push(app.clone());
        Ok(app)
    }

    async fn update_application(
        &self,
        id: &str,
        update: &ApplicationUpdate,
    ) -> Result<Application> {
        let mut apps = self.apps.lock().unwrap();
        let app = apps
            .iter_mut()
            .find(|a| a.id == id)
            .ok_or_else(|| Self::not_found(id))?;

        if let Some(status) = &update.status {
            app.status = status.clone();
        }
        if let Some(notes) = &update.notes {
            app.notes = notes.clone();
        }
        if let Some(archived) = update.archived {
            app.archived = archived;
        }
        if let Some(company) = &update.company {
            app.company = company.clone();
        }
        if let Some(position) = &update.position {
            app.position = position.clone();
        }

        self.updates.lock().unwrap().push(update.clone());
        Ok(app.clone())
    }

    async fn delete_application(&self, id: &str) -> Result<()> {
        let mut apps = self.apps.lock().unwrap();
        let before = apps.len();
        apps.retain(|a| a.id != id);
        if apps.len() == before {
            return Err(Self::not_found(id));
        }
        Ok(())
    }
}
