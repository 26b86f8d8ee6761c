//! Transient user-facing notices.
//!
//! Every action reports local validation failures and remote failures by
//! raising a notice on the shared [`AlertTray`]. Notices are never coalesced:
//! rapid-fire failures stack, newest first, and each one expires on its own
//! [`ALERT_LIFETIME`] after it was raised.
use std::borrow::Cow;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tokio::time::Instant;

/// How long a notice stays visible.
pub const ALERT_LIFETIME: Duration = Duration::from_millis(3000);

/// A single notice in the tray.
#[derive(Debug, Clone)]
pub struct Alert {
    pub id: u64,
    pub message: Cow<'static, str>,
    pub raised_at: Instant,
}

impl Alert {
    /// True once [`ALERT_LIFETIME`] has elapsed since the notice was raised.
    pub fn is_expired_at(&self, now: Instant) -> bool {
        now.saturating_duration_since(self.raised_at) >= ALERT_LIFETIME
    }
}

#[derive(Default)]
struct TrayInner {
    next_id: AtomicU64,
    alerts: Mutex<VecDeque<Alert>>,
}

/// Shared notification container.
///
/// Cloning is cheap and every clone sees the same notices, so concurrent
/// actions can raise notices without coordinating.
#[derive(Clone, Default)]
pub struct AlertTray {
    inner: Arc<TrayInner>,
}

impl AlertTray {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, VecDeque<Alert>> {
        // A panic while holding the lock cannot leave the deque half-updated.
        self.inner
            .alerts
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Raise a notice. It is placed in front of every existing notice and
    /// expires independently of them. Notices that already expired are
    /// dropped first.
    ///
    /// Returns the notice id, which callers may ignore.
    pub fn notify(&self, message: impl Into<Cow<'static, str>>) -> u64 {
        let message = message.into();
        let id = self.inner.next_id.fetch_add(1, Ordering::Relaxed);
        tracing::info!(alert_id = id, message = %message, "Notice raised");
        let now = Instant::now();
        let mut alerts = self.lock();
        alerts.retain(|a| !a.is_expired_at(now));
        alerts.push_front(Alert {
            id,
            message,
            raised_at: now,
        });
        id
    }

    /// Notices that have not yet expired, newest first.
    pub fn active(&self) -> Vec<Alert> {
        let now = Instant::now();
        self.lock()
            .iter()
            .filter(|a| !a.is_expired_at(now))
            .cloned()
            .collect()
    }

    /// Messages of the active notices, newest first.
    pub fn messages(&self) -> Vec<String> {
        self.active()
            .into_iter()
            .map(|a| a.message.into_owned())
            .collect()
    }

    /// Drop expired notices. Returns how many were removed.
    pub fn prune_expired(&self) -> usize {
        let now = Instant::now();
        let mut alerts = self.lock();
        let before = alerts.len();
        alerts.retain(|a| !a.is_expired_at(now));
        let removed = before - alerts.len();
        if removed > 0 {
            tracing::debug!(removed, remaining = alerts.len(), "Expired notices pruned");
        }
        removed
    }

    pub fn len(&self) -> usize {
        let now = Instant::now();
        self.lock().iter().filter(|a| !a.is_expired_at(now)).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl std::fmt::Debug for AlertTray {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AlertTray")
            .field("active", &self.len())
            .finish()
    }
}
