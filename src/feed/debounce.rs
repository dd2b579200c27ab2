//! Quiet-period gate for the search input.
//!
//! Every keystroke pushes the latest query text and restarts the timer; only
//! the value still pending when the timer expires is ever emitted. The gate
//! owns no background task: the event loop awaits [`DebounceGate::settled`]
//! as one `tokio::select!` branch and the timer dies with the gate.

use tokio::time::{Duration, Instant};

/// Quiet interval applied to the search input.
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(500);

#[derive(Debug)]
struct Pending {
    value: String,
    deadline: Instant,
}

#[derive(Debug)]
pub struct DebounceGate {
    interval: Duration,
    pending: Option<Pending>,
}

impl Default for DebounceGate {
    fn default() -> Self {
        Self::new(DEFAULT_DEBOUNCE)
    }
}

impl DebounceGate {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            pending: None,
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Record a new value and restart the quiet timer from now.
    pub fn push(&mut self, value: impl Into<String>) {
        self.push_at(value, Instant::now());
    }

    pub fn push_at(&mut self, value: impl Into<String>, now: Instant) {
        self.pending = Some(Pending {
            value: value.into(),
            deadline: now + self.interval,
        });
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.pending.as_ref().map(|p| p.deadline)
    }

    /// Drop the pending value without emitting it.
    pub fn cancel(&mut self) -> bool {
        self.pending.take().is_some()
    }

    /// Emit the pending value immediately, skipping the rest of the quiet period.
    pub fn flush(&mut self) -> Option<String> {
        self.pending.take().map(|p| p.value)
    }

    /// Take the pending value if its quiet period has elapsed at `now`.
    pub fn poll_settled(&mut self, now: Instant) -> Option<String> {
        match &self.pending {
            Some(p) if now >= p.deadline => self.flush(),
            _ => None,
        }
    }

    /// Wait for the pending value to settle.
    ///
    /// Never resolves while nothing is pending. Cancel-safe: dropping the
    /// future keeps the pending value, so a `select!` loop can re-await it.
    pub async fn settled(&mut self) -> String {
        let Some(deadline) = self.deadline() else {
            return std::future::pending().await;
        };

        tokio::time::sleep_until(deadline).await;

        match self.flush() {
            Some(value) => value,
            None => std::future::pending().await,
        }
    }
}
