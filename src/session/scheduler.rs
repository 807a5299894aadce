//! Proactive token renewal timer

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::task::JoinHandle;

use super::{AccessClaims, LogoutReason, Session};

/// The single pending renewal of a session
pub(super) struct ArmedRefresh {
    due_at: DateTime<Utc>,
    handle: JoinHandle<()>,
}

/// Delay until a token expiring at `expires_at` should be renewed.
///
/// `None` when the token has already expired; zero when it expires within
/// `threshold`.
pub fn refresh_delay(
    expires_at: DateTime<Utc>,
    now: DateTime<Utc>,
    threshold: Duration,
) -> Option<Duration> {
    if expires_at <= now {
        return None;
    }
    let remaining = (expires_at - now).to_std().ok()?;
    Some(remaining.saturating_sub(threshold))
}

impl Session {
    /// Arm one renewal attempt for the stored access token.
    ///
    /// Returns the delay that was armed. Nothing is armed (and no error is
    /// raised) when there is no token, it cannot be decoded, or it has already
    /// expired. Arming replaces any previously armed attempt.
    pub fn setup_token_refresh(&self) -> Option<Duration> {
        let Some(token) = self.inner.store.access_token() else {
            log::debug!("No access token, refresh not scheduled");
            return None;
        };

        let claims = match AccessClaims::decode(&token) {
            Ok(claims) => claims,
            Err(e) => {
                log::warn!("Cannot schedule refresh: {}", e);
                return None;
            }
        };

        let now = self.inner.clock.now();
        let Some(delay) = refresh_delay(claims.expires_at, now, self.inner.policy.refresh_threshold)
        else {
            log::debug!("Access token already expired at {}", claims.expires_at);
            return None;
        };

        let due_at = now + chrono::Duration::from_std(delay).unwrap_or_default();
        log::debug!("Refresh scheduled in {:?} (at {})", delay, due_at);

        let weak = Arc::downgrade(&self.inner);
        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            if let Some(inner) = weak.upgrade() {
                Session { inner }.evaluate().await;
            }
        });

        self.replace_timer(Some(ArmedRefresh { due_at, handle }));
        Some(delay)
    }

    /// When the armed renewal will fire, if one is pending
    pub fn armed_refresh_at(&self) -> Option<DateTime<Utc>> {
        let slot = self.inner.timer.lock().ok()?;
        slot.as_ref()
            .filter(|armed| !armed.handle.is_finished())
            .map(|armed| armed.due_at)
    }

    /// Drop the pending renewal, if any
    pub(super) fn cancel_refresh(&self) {
        self.replace_timer(None);
    }

    /// Timer body: renew if the user is active, otherwise end the session
    async fn evaluate(&self) {
        let idle = self.inner.activity.idle_for();
        if idle >= self.inner.policy.inactivity_timeout {
            log::warn!("Idle for {:?}, ending session", idle);
            self.expire(LogoutReason::Expired);
            return;
        }

        log::debug!("Idle for {:?}, renewing access token", idle);
        // Success re-arms through the refresh primitive; failure already
        // ended the session there.
        let _ = self.renew().await;
    }

    fn replace_timer(&self, next: Option<ArmedRefresh>) {
        let Ok(mut slot) = self.inner.timer.lock() else {
            return;
        };
        if let Some(prev) = slot.take() {
            // The timer task re-arms from inside itself; it must not abort
            // its own remaining work.
            if tokio::task::try_id() != Some(prev.handle.id()) {
                prev.handle.abort();
            }
        }
        *slot = next;
    }
}
