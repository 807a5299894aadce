//! User activity tracking for idle detection

use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use super::Clock;

/// Interaction events that count as user activity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActivityKind {
    PointerDown,
    PointerMove,
    KeyPress,
    Scroll,
    TouchStart,
    Click,
    KeyDown,
}

#[cfg(test)]
impl ActivityKind {
    pub const ALL: [ActivityKind; 7] = [
        ActivityKind::PointerDown,
        ActivityKind::PointerMove,
        ActivityKind::KeyPress,
        ActivityKind::Scroll,
        ActivityKind::TouchStart,
        ActivityKind::Click,
        ActivityKind::KeyDown,
    ];
}

/// Sending half of an activity event source
#[derive(Debug, Clone)]
pub struct ActivityFeed {
    tx: mpsc::UnboundedSender<ActivityKind>,
}

/// Receiving half of an activity event source, consumed by [`ActivityTracker::start`]
#[derive(Debug)]
pub struct ActivityEvents {
    rx: mpsc::UnboundedReceiver<ActivityKind>,
}

impl ActivityFeed {
    pub fn channel() -> (ActivityFeed, ActivityEvents) {
        let (tx, rx) = mpsc::unbounded_channel();
        (ActivityFeed { tx }, ActivityEvents { rx })
    }

    /// Report an interaction. Returns false once the tracker has stopped listening.
    pub fn emit(&self, kind: ActivityKind) -> bool {
        self.tx.send(kind).is_ok()
    }
}

#[derive(Debug)]
struct ActivityState {
    last_update: Option<DateTime<Utc>>,
    last_activity: DateTime<Utc>,
}

/// Best-effort record of the last time the user did something.
///
/// Updates are throttled: an event only counts if at least `throttle` has
/// passed since the previously recorded one, which bounds writes under a
/// burst of events while keeping idle detection accurate to one throttle
/// window.
pub struct ActivityTracker {
    clock: Arc<dyn Clock>,
    throttle: Duration,
    state: Mutex<ActivityState>,
}

impl ActivityTracker {
    pub fn new(clock: Arc<dyn Clock>, throttle: Duration) -> Self {
        let now = clock.now();
        Self {
            clock,
            throttle,
            state: Mutex::new(ActivityState {
                last_update: None,
                last_activity: now,
            }),
        }
    }

    /// Record an interaction. Returns whether it updated the timestamp.
    pub fn record(&self, kind: ActivityKind) -> bool {
        let now = self.clock.now();
        let Ok(mut state) = self.state.lock() else {
            return false;
        };

        if let Some(last) = state.last_update {
            let since = (now - last).to_std().unwrap_or(Duration::ZERO);
            if since < self.throttle {
                return false;
            }
        }

        log::trace!("Activity {:?} recorded at {}", kind, now);
        state.last_update = Some(now);
        if now > state.last_activity {
            state.last_activity = now;
        }
        true
    }

    /// Most recently recorded activity, or the tracker's start time
    pub fn last_activity_time(&self) -> DateTime<Utc> {
        match self.state.lock() {
            Ok(state) => state.last_activity,
            Err(poisoned) => poisoned.into_inner().last_activity,
        }
    }

    /// Time elapsed since the last recorded activity
    pub fn idle_for(&self) -> Duration {
        (self.clock.now() - self.last_activity_time())
            .to_std()
            .unwrap_or(Duration::ZERO)
    }

    /// Start listening to an event source and watching for idleness.
    ///
    /// The start instant counts as activity. Once nothing has been recorded
    /// for `timeout`, `on_idle` runs and the listener exits. Dropping or
    /// stopping the returned handle detaches the listener and disarms the
    /// idle deadline.
    pub fn start<F>(
        self: &Arc<Self>,
        events: ActivityEvents,
        timeout: Duration,
        on_idle: F,
    ) -> ActivityHandle
    where
        F: FnOnce() + Send + 'static,
    {
        self.mark_started();

        let tracker = Arc::clone(self);
        let mut rx = events.rx;
        let task = tokio::spawn(async move {
            let mut open = true;
            loop {
                // Recomputed every pass, so each recorded update pushes the
                // deadline back to last_activity + timeout.
                let remaining = timeout.saturating_sub(tracker.idle_for());
                tokio::select! {
                    event = rx.recv(), if open => match event {
                        Some(kind) => {
                            tracker.record(kind);
                        }
                        None => {
                            log::debug!("Activity source closed");
                            open = false;
                        }
                    },
                    _ = tokio::time::sleep(remaining) => {
                        if tracker.idle_for() >= timeout {
                            log::debug!("No activity for {:?}", timeout);
                            on_idle();
                            break;
                        }
                    }
                }
            }
        });

        ActivityHandle { task: Some(task) }
    }

    fn mark_started(&self) {
        let now = self.clock.now();
        if let Ok(mut state) = self.state.lock() {
            state.last_update = Some(now);
            if now > state.last_activity {
                state.last_activity = now;
            }
        }
    }
}

/// Listener registration returned by [`ActivityTracker::start`]
#[derive(Debug)]
pub struct ActivityHandle {
    task: Option<JoinHandle<()>>,
}

impl ActivityHandle {
    /// Detach the listener
    pub fn stop(mut self) {
        self.detach();
    }

    fn detach(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

impl Drop for ActivityHandle {
    fn drop(&mut self) {
        self.detach();
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicBool, Ordering};

    use super::*;
    use crate::session::clock::TokioClock;

    fn tracker() -> (Arc<TokioClock>, Arc<ActivityTracker>) {
        let clock = Arc::new(TokioClock::starting_at(
            DateTime::from_timestamp(1_800_000_000, 0).unwrap(),
        ));
        let tracker = Arc::new(ActivityTracker::new(clock.clone(), Duration::from_secs(5)));
        (clock, tracker)
    }

    #[tokio::test(start_paused = true)]
    async fn test_defaults_to_creation_time() {
        let (clock, tracker) = tracker();
        let created = clock.now();

        tokio::time::advance(Duration::from_secs(60)).await;
        assert_eq!(tracker.last_activity_time(), created);
        assert_eq!(tracker.idle_for(), Duration::from_secs(60));
    }

    #[tokio::test(start_paused = true)]
    async fn test_throttles_to_one_update_per_window() {
        let (clock, tracker) = tracker();
        let origin = clock.now();

        let mut updates = Vec::new();
        // Events every second for 12 seconds
        for _ in 0..=12 {
            if tracker.record(ActivityKind::PointerMove) {
                updates.push(clock.now());
            }
            let latest_event = clock.now();
            assert!(tracker.last_activity_time() <= latest_event);
            tokio::time::advance(Duration::from_secs(1)).await;
        }

        let offsets: Vec<i64> = updates
            .iter()
            .map(|t| (*t - origin).num_seconds())
            .collect();
        assert_eq!(offsets, vec![0, 5, 10]);
        assert_eq!(
            tracker.last_activity_time(),
            origin + chrono::Duration::seconds(10)
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_every_kind_qualifies() {
        let (_clock, tracker) = tracker();
        for kind in ActivityKind::ALL {
            tokio::time::advance(Duration::from_secs(5)).await;
            assert!(tracker.record(kind), "{:?} should count as activity", kind);
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_start_consumes_feed_and_stop_detaches() {
        let (clock, tracker) = tracker();
        let (feed, events) = ActivityFeed::channel();

        tokio::time::advance(Duration::from_secs(30)).await;
        let handle = tracker.start(events, Duration::from_secs(3600), || {});
        let started = clock.now();
        assert_eq!(tracker.last_activity_time(), started);

        tokio::time::advance(Duration::from_secs(10)).await;
        assert!(feed.emit(ActivityKind::KeyPress));
        tokio::task::yield_now().await;
        tokio::task::yield_now().await;
        let after_event = tracker.last_activity_time();
        assert_eq!(after_event, started + chrono::Duration::seconds(10));

        handle.stop();
        tokio::task::yield_now().await;

        tokio::time::advance(Duration::from_secs(10)).await;
        feed.emit(ActivityKind::Click);
        tokio::task::yield_now().await;
        assert_eq!(tracker.last_activity_time(), after_event);
    }

    fn idle_flag() -> (Arc<AtomicBool>, impl FnOnce() + Send + 'static) {
        let fired = Arc::new(AtomicBool::new(false));
        let flag = fired.clone();
        (fired, move || flag.store(true, Ordering::SeqCst))
    }

    #[tokio::test(start_paused = true)]
    async fn test_idle_deadline_follows_last_activity() {
        let (_clock, tracker) = tracker();
        let (feed, events) = ActivityFeed::channel();
        let (fired, on_idle) = idle_flag();
        let _handle = tracker.start(events, Duration::from_secs(60), on_idle);

        tokio::time::sleep(Duration::from_secs(40)).await;
        feed.emit(ActivityKind::Scroll);

        // 80 s since start but only 40 s since the scroll
        tokio::time::sleep(Duration::from_secs(40)).await;
        assert!(!fired.load(Ordering::SeqCst));

        tokio::time::sleep(Duration::from_secs(21)).await;
        assert!(fired.load(Ordering::SeqCst));
    }

    #[tokio::test(start_paused = true)]
    async fn test_idle_deadline_survives_closed_feed() {
        let (_clock, tracker) = tracker();
        let (feed, events) = ActivityFeed::channel();
        let (fired, on_idle) = idle_flag();
        let _handle = tracker.start(events, Duration::from_secs(60), on_idle);

        drop(feed);
        tokio::time::sleep(Duration::from_secs(61)).await;
        assert!(fired.load(Ordering::SeqCst));
    }

    #[tokio::test(start_paused = true)]
    async fn test_stop_disarms_idle_deadline() {
        let (_clock, tracker) = tracker();
        let (_feed, events) = ActivityFeed::channel();
        let (fired, on_idle) = idle_flag();
        let handle = tracker.start(events, Duration::from_secs(60), on_idle);

        tokio::time::sleep(Duration::from_secs(30)).await;
        handle.stop();
        tokio::time::sleep(Duration::from_secs(120)).await;
        assert!(!fired.load(Ordering::SeqCst));
    }
}
