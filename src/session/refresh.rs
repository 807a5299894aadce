//! Single-flight token renewal
//!
//! The proactive timer and the 401 handler both call [`Session::renew`]. The
//! first caller starts the exchange and parks a shared future in the session;
//! everyone arriving while it is pending awaits that same future, so at most
//! one `/auth/refresh` call is in flight per session.

use std::sync::MutexGuard;

use futures::FutureExt;
use futures::future::{BoxFuture, Shared};

use super::token::redact;
use super::{LogoutReason, RefreshFailure, Session, SessionState, TokenPair};

type SharedRefresh = Shared<BoxFuture<'static, Result<TokenPair, RefreshFailure>>>;

/// The pending renewal of a session, if any.
///
/// `epoch` advances whenever the session is ended or logged out. A renewal
/// started under an older epoch must not store its result.
#[derive(Default)]
pub(super) struct InFlight {
    epoch: u64,
    pending: Option<SharedRefresh>,
}

impl Session {
    /// Renew the token pair, joining an in-flight renewal if there is one.
    ///
    /// On success the new pair is stored and the next renewal is armed. On
    /// any failure the session is ended with a `session=expired` redirect;
    /// there is no retry. A renewal overtaken by logout or session end
    /// resolves to [`RefreshFailure::Abandoned`] and leaves the store alone.
    pub async fn renew(&self) -> Result<TokenPair, RefreshFailure> {
        let pending = {
            let mut slot = self.lock_inflight();
            match slot.pending.as_ref() {
                Some(pending) => {
                    log::debug!("Joining in-flight token refresh");
                    pending.clone()
                }
                None => {
                    let pending = self.clone().refresh_once(slot.epoch).boxed().shared();
                    slot.pending = Some(pending.clone());
                    pending
                }
            }
        };

        pending.await
    }

    /// Forget the pending renewal so it can never store tokens
    pub(super) fn abandon_refresh(&self) {
        let mut slot = self.lock_inflight();
        slot.epoch += 1;
        if slot.pending.take().is_some() {
            log::debug!("Abandoned in-flight token refresh");
        }
    }

    fn lock_inflight(&self) -> MutexGuard<'_, InFlight> {
        match self.inner.inflight.lock() {
            Ok(slot) => slot,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    async fn refresh_once(self, epoch: u64) -> Result<TokenPair, RefreshFailure> {
        let mut result = self.exchange(epoch).await;

        {
            let mut slot = self.lock_inflight();
            if slot.epoch == epoch {
                slot.pending = None;
            } else if result.is_err() {
                result = Err(RefreshFailure::Abandoned);
            }
        }

        match &result {
            Ok(_) => {
                log::info!("Access token refreshed");
                self.inner.state.send_replace(SessionState::Active);
                self.setup_token_refresh();
            }
            Err(RefreshFailure::Abandoned) => {
                log::debug!("Session ended while refreshing, discarding result");
            }
            Err(e) => {
                log::warn!("Token refresh failed: {}", e);
                self.expire(LogoutReason::Expired);
            }
        }

        result
    }

    async fn exchange(&self, epoch: u64) -> Result<TokenPair, RefreshFailure> {
        let Some(refresh_token) = self.inner.store.refresh_token() else {
            return Err(RefreshFailure::MissingRefreshToken);
        };

        log::debug!("Refreshing with token {}", redact(&refresh_token));
        let pair = self
            .inner
            .auth
            .refresh(&refresh_token)
            .await
            .map_err(|e| RefreshFailure::Rejected(e.to_string()))?;

        // Held across the write so logout cannot interleave with it
        let slot = self.lock_inflight();
        if slot.epoch != epoch {
            return Err(RefreshFailure::Abandoned);
        }
        self.inner
            .store
            .store_pair(&pair)
            .map_err(|e| RefreshFailure::Storage(e.to_string()))?;
        drop(slot);

        Ok(pair)
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::session::test_support::*;

    const MINUTE: Duration = Duration::from_secs(60);

    #[tokio::test(start_paused = true)]
    async fn test_concurrent_renewals_share_one_call() {
        let h = harness(15 * MINUTE);
        h.session.login("alice", "secret").await.unwrap();
        h.auth.set_refresh_latency(Duration::from_secs(2));

        let (a, b, c) = tokio::join!(h.session.renew(), h.session.renew(), h.session.renew());

        assert_eq!(h.auth.refresh_calls(), 1);
        let a = a.unwrap();
        assert_eq!(a, b.unwrap());
        assert_eq!(a, c.unwrap());
        assert_eq!(h.store.access_token(), Some(a.access_token));
    }

    #[tokio::test(start_paused = true)]
    async fn test_sequential_renewals_each_call_backend() {
        let h = harness(15 * MINUTE);
        h.session.login("alice", "secret").await.unwrap();

        let first = h.session.renew().await.unwrap();
        let second = h.session.renew().await.unwrap();

        assert_eq!(h.auth.refresh_calls(), 2);
        assert_eq!(h.auth.last_refresh_token(), Some(first.refresh_token));
        assert_eq!(h.store.refresh_token(), Some(second.refresh_token));
    }

    #[tokio::test(start_paused = true)]
    async fn test_concurrent_failure_redirects_once() {
        let h = harness(15 * MINUTE);
        h.session.login("alice", "secret").await.unwrap();
        h.auth.set_refresh_latency(Duration::from_secs(1));
        h.auth.reject_refresh();

        let (a, b) = tokio::join!(h.session.renew(), h.session.renew());

        assert!(matches!(a, Err(RefreshFailure::Rejected(_))));
        assert!(matches!(b, Err(RefreshFailure::Rejected(_))));
        assert_eq!(h.auth.refresh_calls(), 1);
        assert_eq!(h.navigator.routes(), vec!["/auth/login?session=expired"]);
        assert!(h.store.access_token().is_none());
        assert!(h.store.refresh_token().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_missing_refresh_token_ends_session_without_call() {
        let h = harness(15 * MINUTE);

        let result = h.session.renew().await;

        assert_eq!(result, Err(RefreshFailure::MissingRefreshToken));
        assert_eq!(h.auth.refresh_calls(), 0);
        assert_eq!(h.navigator.routes(), vec!["/auth/login?session=expired"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_timer_and_reactive_refresh_deduplicate() {
        let h = harness(15 * MINUTE);
        h.session.login("alice", "secret").await.unwrap();
        h.auth.set_refresh_latency(Duration::from_secs(5));

        // Timer fires at 10 minutes and its exchange takes 5 seconds; a
        // reactive renewal arrives in the middle of it.
        tokio::time::sleep(10 * MINUTE + Duration::from_secs(2)).await;
        let reactive = h.session.renew().await.unwrap();

        assert_eq!(h.auth.refresh_calls(), 1);
        assert_eq!(h.store.access_token(), Some(reactive.access_token));
    }

    #[tokio::test(start_paused = true)]
    async fn test_logout_during_refresh_discards_result() {
        let h = harness(15 * MINUTE);
        h.session.login("alice", "secret").await.unwrap();
        h.auth.set_refresh_latency(Duration::from_secs(5));

        let session = h.session.clone();
        let pending = tokio::spawn(async move { session.renew().await });
        tokio::time::sleep(Duration::from_secs(1)).await;

        h.session.logout().unwrap();
        let result = pending.await.unwrap();

        assert_eq!(result, Err(RefreshFailure::Abandoned));
        assert!(h.store.access_token().is_none());
        assert!(h.store.refresh_token().is_none());
        assert_eq!(h.session.state(), SessionState::SignedOut);
        assert!(h.session.armed_refresh_at().is_none());
        assert!(h.navigator.routes().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_renewal_after_logout_starts_fresh() {
        let h = harness(15 * MINUTE);
        h.session.login("alice", "secret").await.unwrap();
        h.auth.set_refresh_latency(Duration::from_secs(5));

        // Timer fires at 10 minutes; logout lands while it is exchanging
        tokio::time::sleep(10 * MINUTE + Duration::from_secs(1)).await;
        h.session.logout().unwrap();
        tokio::time::sleep(Duration::from_secs(10)).await;
        assert!(h.store.access_token().is_none());

        h.session.login("alice", "secret").await.unwrap();
        let renewed = h.session.renew().await.unwrap();

        assert_eq!(h.auth.refresh_calls(), 2);
        assert_eq!(h.store.access_token(), Some(renewed.access_token));
        assert_eq!(h.session.state(), SessionState::Active);
    }
}
