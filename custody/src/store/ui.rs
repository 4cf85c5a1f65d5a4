//! Transient notifications and the global loading counter.
//!
//! Expiry is measured on the tokio clock so it can be driven by a paused
//! runtime in tests. Renderers subscribe to a broadcast channel and see every
//! notification as it is pushed.

use std::collections::VecDeque;
use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use parking_lot::Mutex;
use serde::Serialize;
use tokio::sync::broadcast;
use tokio::time::Instant;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationKind {
    Success,
    Error,
    Info,
    Warning,
}

impl fmt::Display for NotificationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NotificationKind::Success => write!(f, "success"),
            NotificationKind::Error => write!(f, "error"),
            NotificationKind::Info => write!(f, "info"),
            NotificationKind::Warning => write!(f, "warning"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub id: String,
    pub kind: NotificationKind,
    pub message: String,
    pub expires_at: Instant,
}

pub struct UiStore {
    ttl: Duration,
    notifications: Mutex<VecDeque<Notification>>,
    loading: AtomicUsize,
    tx: broadcast::Sender<Notification>,
}

impl UiStore {
    pub fn new(ttl: Duration) -> Self {
        let (tx, _) = broadcast::channel(64);
        Self {
            ttl,
            notifications: Mutex::new(VecDeque::new()),
            loading: AtomicUsize::new(0),
            tx,
        }
    }

    /// Queue a notification and return its id.
    pub fn push(&self, kind: NotificationKind, message: impl Into<String>) -> String {
        let notification = Notification {
            id: format!("notif-{}", uuid::Uuid::new_v4()),
            kind,
            message: message.into(),
            expires_at: Instant::now() + self.ttl,
        };
        debug!(kind = %notification.kind, message = %notification.message, "notification");
        let id = notification.id.clone();
        self.notifications.lock().push_back(notification.clone());
        let _ = self.tx.send(notification);
        id
    }

    pub fn success(&self, message: impl Into<String>) -> String {
        self.push(NotificationKind::Success, message)
    }

    pub fn error(&self, message: impl Into<String>) -> String {
        self.push(NotificationKind::Error, message)
    }

    pub fn info(&self, message: impl Into<String>) -> String {
        self.push(NotificationKind::Info, message)
    }

    pub fn warning(&self, message: impl Into<String>) -> String {
        self.push(NotificationKind::Warning, message)
    }

    /// Unexpired notifications, oldest first.
    pub fn active(&self) -> Vec<Notification> {
        let now = Instant::now();
        let mut queue = self.notifications.lock();
        queue.retain(|n| n.expires_at > now);
        queue.iter().cloned().collect()
    }

    pub fn dismiss(&self, id: &str) {
        self.notifications.lock().retain(|n| n.id != id);
    }

    pub fn clear(&self) {
        self.notifications.lock().clear();
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Notification> {
        self.tx.subscribe()
    }

    pub fn start_loading(&self) {
        self.loading.fetch_add(1, Ordering::SeqCst);
    }

    pub fn stop_loading(&self) {
        let _ = self
            .loading
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| Some(n.saturating_sub(1)));
    }

    pub fn is_loading(&self) -> bool {
        self.loading.load(Ordering::SeqCst) > 0
    }

    /// Mark the UI busy until the returned guard is dropped.
    pub fn loading(&self) -> LoadingGuard<'_> {
        self.start_loading();
        LoadingGuard { ui: self }
    }
}

pub struct LoadingGuard<'a> {
    ui: &'a UiStore,
}

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        self.ui.stop_loading();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_notifications_expire_after_ttl() {
        let ui = UiStore::new(Duration::from_secs(5));
        ui.info("first");
        tokio::time::advance(Duration::from_secs(3)).await;
        ui.error("second");
        assert_eq!(ui.active().len(), 2);

        tokio::time::advance(Duration::from_secs(3)).await;
        let active = ui.active();
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].message, "second");

        tokio::time::advance(Duration::from_secs(3)).await;
        assert!(ui.active().is_empty());
    }

    #[tokio::test]
    async fn test_dismiss_and_clear() {
        let ui = UiStore::new(Duration::from_secs(5));
        let id = ui.success("saved");
        ui.warning("careful");
        ui.dismiss(&id);
        let active = ui.active();
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].kind, NotificationKind::Warning);
        ui.clear();
        assert!(ui.active().is_empty());
    }

    #[tokio::test]
    async fn test_subscribers_receive_pushes() {
        let ui = UiStore::new(Duration::from_secs(5));
        let mut rx = ui.subscribe();
        ui.error("boom");
        let got = rx.recv().await.unwrap();
        assert_eq!(got.kind, NotificationKind::Error);
        assert_eq!(got.message, "boom");
    }

    #[test]
    fn test_loading_counter_saturates_and_guard_releases() {
        let ui = UiStore::new(Duration::from_secs(5));
        ui.stop_loading();
        assert!(!ui.is_loading());
        {
            let _outer = ui.loading();
            let _inner = ui.loading();
            assert!(ui.is_loading());
        }
        assert!(!ui.is_loading());
    }
}
