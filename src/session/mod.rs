//! Client-side session management
//!
//! A [`Session`] owns the token pair and keeps it valid without user-visible
//! interruption:
//! - a single timer renews the access token shortly before it expires
//! - renewal is skipped in favour of a forced logout once the user has been
//!   idle past the inactivity timeout
//! - concurrent renewals (timer and 401 handler) share one network call
//!
//! Every collaborator is injected so the whole lifecycle runs on a paused
//! tokio clock in tests.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::{DateTime, Utc};
use thiserror::Error;
use tokio::sync::watch;

use crate::client::AuthApi;
use crate::config::SessionSettings;
use crate::error::Result;

pub mod activity;
pub mod clock;
mod refresh;
mod scheduler;
pub mod store;
pub mod token;

pub use activity::{ActivityFeed, ActivityKind, ActivityTracker};
pub use clock::{Clock, SystemClock};
pub use scheduler::refresh_delay;
pub use store::TokenStore;
pub use token::{AccessClaims, TokenPair};

use activity::{ActivityEvents, ActivityHandle};
use refresh::InFlight;
use scheduler::ArmedRefresh;

/// Route of the login view
pub const LOGIN_ROUTE: &str = "/auth/login";

/// Why a session was ended by the client
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogoutReason {
    /// Renewal failed or the user was idle too long
    Expired,
    /// The backend kept refusing a freshly renewed token
    Unauthorized,
}

/// Navigation target after an unrecoverable session failure
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginRedirect {
    pub reason: LogoutReason,
}

impl LoginRedirect {
    pub fn route(&self) -> String {
        match self.reason {
            LogoutReason::Expired => format!("{}?session=expired", LOGIN_ROUTE),
            LogoutReason::Unauthorized => LOGIN_ROUTE.to_string(),
        }
    }
}

/// Receives the login redirect when a session ends
pub trait Navigator: Send + Sync {
    fn redirect(&self, to: &LoginRedirect);
}

/// Navigator that only logs the redirect
#[derive(Debug, Default)]
pub struct LogNavigator;

impl Navigator for LogNavigator {
    fn redirect(&self, to: &LoginRedirect) {
        log::warn!("Session ended, redirecting to {}", to.route());
    }
}

/// Observable session lifecycle
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    /// A token pair is stored
    Active,
    /// No session, either never logged in or logged out on request
    SignedOut,
    /// Ended by the client; the redirect has been issued
    Ended(LoginRedirect),
}

/// Timing policy for renewal and idle logout
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionPolicy {
    pub refresh_threshold: Duration,
    pub inactivity_timeout: Duration,
    pub activity_throttle: Duration,
}

impl Default for SessionPolicy {
    fn default() -> Self {
        Self::from(&SessionSettings::default())
    }
}

impl From<&SessionSettings> for SessionPolicy {
    fn from(settings: &SessionSettings) -> Self {
        Self {
            refresh_threshold: settings.refresh_threshold(),
            inactivity_timeout: settings.inactivity_timeout(),
            activity_throttle: settings.activity_throttle(),
        }
    }
}

/// Why a renewal could not produce a new token pair
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RefreshFailure {
    #[error("no refresh token stored")]
    MissingRefreshToken,

    #[error("refresh rejected: {0}")]
    Rejected(String),

    #[error("failed to store renewed tokens: {0}")]
    Storage(String),

    #[error("session ended while refreshing")]
    Abandoned,
}

/// Handle to a client session. Cheap to clone.
#[derive(Clone)]
pub struct Session {
    inner: Arc<SessionInner>,
}

struct SessionInner {
    store: TokenStore,
    auth: Arc<dyn AuthApi>,
    clock: Arc<dyn Clock>,
    navigator: Arc<dyn Navigator>,
    activity: Arc<ActivityTracker>,
    policy: SessionPolicy,
    state: watch::Sender<SessionState>,
    inflight: Mutex<InFlight>,
    timer: Mutex<Option<ArmedRefresh>>,
}

/// Builder for [`Session`]
pub struct SessionBuilder {
    store: TokenStore,
    auth: Arc<dyn AuthApi>,
    clock: Arc<dyn Clock>,
    navigator: Arc<dyn Navigator>,
    policy: SessionPolicy,
}

impl SessionBuilder {
    #[cfg(test)]
    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn navigator(mut self, navigator: Arc<dyn Navigator>) -> Self {
        self.navigator = navigator;
        self
    }

    pub fn policy(mut self, policy: SessionPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn build(self) -> Session {
        let initial = if self.store.access_token().is_some() || self.store.refresh_token().is_some()
        {
            SessionState::Active
        } else {
            SessionState::SignedOut
        };
        let (state, _) = watch::channel(initial);
        let activity = Arc::new(ActivityTracker::new(
            self.clock.clone(),
            self.policy.activity_throttle,
        ));

        Session {
            inner: Arc::new(SessionInner {
                store: self.store,
                auth: self.auth,
                clock: self.clock,
                navigator: self.navigator,
                activity,
                policy: self.policy,
                state,
                inflight: Mutex::new(InFlight::default()),
                timer: Mutex::new(None),
            }),
        }
    }
}

impl Session {
    pub fn builder(store: TokenStore, auth: Arc<dyn AuthApi>) -> SessionBuilder {
        SessionBuilder {
            store,
            auth,
            clock: Arc::new(SystemClock),
            navigator: Arc::new(LogNavigator),
            policy: SessionPolicy::default(),
        }
    }

    /// Exchange credentials for a token pair, store it and arm renewal
    pub async fn login(&self, username: &str, password: &str) -> Result<TokenPair> {
        let pair = self.inner.auth.login(username, password).await?;
        self.inner.store.store_pair(&pair)?;
        self.set_state(SessionState::Active);
        log::info!("Logged in as {}", username);

        self.setup_token_refresh();
        Ok(pair)
    }

    /// End the session on the user's request
    pub fn logout(&self) -> Result<()> {
        self.cancel_refresh();
        self.abandon_refresh();
        self.inner.store.clear()?;
        self.set_state(SessionState::SignedOut);
        Ok(())
    }

    /// Terminate the session: clear tokens and issue the login redirect
    pub fn expire(&self, reason: LogoutReason) {
        self.cancel_refresh();
        self.abandon_refresh();
        if let Err(e) = self.inner.store.clear() {
            log::warn!("Failed to clear tokens while ending session: {}", e);
        }

        let redirect = LoginRedirect { reason };
        log::warn!("Session ended ({:?})", reason);
        self.set_state(SessionState::Ended(redirect.clone()));
        self.inner.navigator.redirect(&redirect);
    }

    pub fn access_token(&self) -> Option<String> {
        self.inner.store.access_token()
    }

    pub fn has_refresh_token(&self) -> bool {
        self.inner.store.refresh_token().is_some()
    }

    /// Claims of the stored access token, if it decodes
    pub fn claims(&self) -> Option<AccessClaims> {
        self.access_token()
            .and_then(|token| AccessClaims::decode(&token).ok())
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.inner.clock.now()
    }

    pub fn activity(&self) -> &Arc<ActivityTracker> {
        &self.inner.activity
    }

    /// Feed user activity to the tracker and end the session with a
    /// `session=expired` redirect once it has been idle for the inactivity
    /// timeout. Stopping the handle disarms the idle deadline.
    pub fn track_activity(&self, events: ActivityEvents) -> ActivityHandle {
        let weak = Arc::downgrade(&self.inner);
        self.inner
            .activity
            .start(events, self.inner.policy.inactivity_timeout, move || {
                let Some(inner) = weak.upgrade() else {
                    return;
                };
                let session = Session { inner };
                if session.state() == SessionState::Active {
                    log::warn!("Inactivity timeout reached, ending session");
                    session.expire(LogoutReason::Expired);
                }
            })
    }

    pub fn policy(&self) -> SessionPolicy {
        self.inner.policy
    }

    pub fn state(&self) -> SessionState {
        self.inner.state.borrow().clone()
    }

    /// Watch lifecycle transitions
    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.inner.state.subscribe()
    }

    fn set_state(&self, state: SessionState) {
        self.inner.state.send_replace(state);
    }
}


#[cfg(test)]
mod tests {
    use super::test_support::*;
    use super::*;

    #[test]
    fn test_redirect_routes() {
        let expired = LoginRedirect {
            reason: LogoutReason::Expired,
        };
        assert_eq!(expired.route(), "/auth/login?session=expired");

        let unauthorized = LoginRedirect {
            reason: LogoutReason::Unauthorized,
        };
        assert_eq!(unauthorized.route(), "/auth/login");
    }

    #[test]
    fn test_policy_defaults() {
        let policy = SessionPolicy::default();
        assert_eq!(policy.refresh_threshold, Duration::from_secs(300));
        assert_eq!(policy.inactivity_timeout, Duration::from_secs(1800));
        assert_eq!(policy.activity_throttle, Duration::from_secs(5));
    }

    #[tokio::test(start_paused = true)]
    async fn test_initial_state_follows_store() {
        let h = harness(Duration::from_secs(3600));
        assert_eq!(h.session.state(), SessionState::SignedOut);

        h.store.set_refresh_token("r").unwrap();
        let resumed = Session::builder(h.store.clone(), h.auth.clone())
            .clock(h.clock.clone())
            .build();
        assert_eq!(resumed.state(), SessionState::Active);
    }

    #[tokio::test(start_paused = true)]
    async fn test_login_stores_pair_and_arms_refresh() {
        let h = harness(Duration::from_secs(3600));

        let pair = h.session.login("alice", "secret").await.unwrap();
        assert_eq!(h.store.access_token(), Some(pair.access_token.clone()));
        assert_eq!(h.store.refresh_token(), Some(pair.refresh_token));
        assert_eq!(h.session.state(), SessionState::Active);
        assert_eq!(
            h.session.claims().unwrap().subject.as_deref(),
            Some("alice")
        );

        let due = h.session.armed_refresh_at().unwrap();
        assert_eq!(due, epoch() + chrono::Duration::minutes(55));
    }

    #[tokio::test(start_paused = true)]
    async fn test_login_failure_leaves_store_empty() {
        let h = harness(Duration::from_secs(3600));
        h.auth.reject_login();

        assert!(h.session.login("alice", "wrong").await.is_err());
        assert!(h.store.access_token().is_none());
        assert!(h.session.armed_refresh_at().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_logout_clears_without_redirect() {
        let h = harness(Duration::from_secs(3600));
        h.session.login("alice", "secret").await.unwrap();

        h.session.logout().unwrap();
        assert!(h.store.access_token().is_none());
        assert!(h.store.refresh_token().is_none());
        assert!(h.session.armed_refresh_at().is_none());
        assert_eq!(h.session.state(), SessionState::SignedOut);
        assert!(h.navigator.routes().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_expire_notifies_subscribers() {
        let h = harness(Duration::from_secs(3600));
        h.session.login("alice", "secret").await.unwrap();
        let mut rx = h.session.subscribe();

        h.session.expire(LogoutReason::Expired);

        rx.changed().await.unwrap();
        assert_eq!(
            *rx.borrow(),
            SessionState::Ended(LoginRedirect {
                reason: LogoutReason::Expired
            })
        );
        assert_eq!(h.navigator.routes(), vec!["/auth/login?session=expired"]);
        assert!(h.store.access_token().is_none());
    }

    const MINUTE: Duration = Duration::from_secs(60);

    #[tokio::test(start_paused = true)]
    async fn test_idle_logout_before_renewal_is_due() {
        // Tokens live an hour, so the renewal timer would not look at
        // idleness until 55 minutes.
        let h = harness(60 * MINUTE);
        h.session.login("alice", "secret").await.unwrap();
        let (_feed, events) = ActivityFeed::channel();
        let _tracking = h.session.track_activity(events);

        tokio::time::sleep(29 * MINUTE).await;
        assert_eq!(h.session.state(), SessionState::Active);

        tokio::time::sleep(2 * MINUTE).await;
        assert_eq!(h.navigator.routes(), vec!["/auth/login?session=expired"]);
        assert!(h.store.access_token().is_none());
        assert!(h.store.refresh_token().is_none());
        assert!(h.session.armed_refresh_at().is_none());
        assert_eq!(h.auth.refresh_calls(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_activity_pushes_idle_logout_back() {
        let h = harness(60 * MINUTE);
        h.session.login("alice", "secret").await.unwrap();
        let (feed, events) = ActivityFeed::channel();
        let _tracking = h.session.track_activity(events);

        tokio::time::sleep(20 * MINUTE).await;
        feed.emit(ActivityKind::KeyPress);

        tokio::time::sleep(25 * MINUTE).await;
        assert_eq!(h.session.state(), SessionState::Active);
        assert!(h.navigator.routes().is_empty());

        tokio::time::sleep(6 * MINUTE).await;
        assert_eq!(h.navigator.routes(), vec!["/auth/login?session=expired"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stopped_tracking_does_not_log_out() {
        let h = harness(60 * MINUTE);
        h.session.login("alice", "secret").await.unwrap();
        let (_feed, events) = ActivityFeed::channel();
        h.session.track_activity(events).stop();

        tokio::time::sleep(40 * MINUTE).await;
        assert_eq!(h.session.state(), SessionState::Active);
        assert!(h.navigator.routes().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_idle_after_logout_is_silent() {
        let h = harness(60 * MINUTE);
        h.session.login("alice", "secret").await.unwrap();
        let (_feed, events) = ActivityFeed::channel();
        let _tracking = h.session.track_activity(events);

        h.session.logout().unwrap();
        tokio::time::sleep(31 * MINUTE).await;

        assert_eq!(h.session.state(), SessionState::SignedOut);
        assert!(h.navigator.routes().is_empty());
    }
}
