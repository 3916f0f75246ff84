use std::{
    sync::{Arc, Mutex, MutexGuard},
    time::Duration,
};

use chrono::{DateTime, Utc};
use tokio::sync::broadcast;
use uuid::Uuid;

pub const DEFAULT_FLASH_TTL: Duration = Duration::from_millis(4000);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationKind {
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub id: Uuid,
    pub kind: NotificationKind,
    pub message: String,
    pub shown_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotificationEvent {
    Shown(Notification),
    Dismissed(Uuid),
}

#[derive(Clone)]
pub struct Notifier {
    active: Arc<Mutex<Vec<Notification>>>,
    events: broadcast::Sender<NotificationEvent>,
    ttl: Duration,
}

impl Notifier {
    pub fn new(ttl: Duration) -> Self {
        let (events, _) = broadcast::channel(64);
        Self {
            active: Arc::new(Mutex::new(Vec::new())),
            events,
            ttl,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn subscribe(&self) -> broadcast::Receiver<NotificationEvent> {
        self.events.subscribe()
    }

    pub fn active(&self) -> Vec<Notification> {
        lock(&self.active).clone()
    }

    pub fn success(&self, message: impl Into<String>) -> Notification {
        self.show(NotificationKind::Success, message)
    }

    pub fn error(&self, message: impl Into<String>) -> Notification {
        self.show(NotificationKind::Error, message)
    }

    /// Must be called from within a tokio runtime.
    pub fn show(&self, kind: NotificationKind, message: impl Into<String>) -> Notification {
        let notification = Notification {
            id: Uuid::new_v4(),
            kind,
            message: message.into(),
            shown_at: Utc::now(),
        };
        lock(&self.active).push(notification.clone());
        let _ = self
            .events
            .send(NotificationEvent::Shown(notification.clone()));

        let id = notification.id;
        let active = Arc::clone(&self.active);
        let events = self.events.clone();
        let deadline = tokio::time::Instant::now() + self.ttl;
        tokio::spawn(async move {
            tokio::time::sleep_until(deadline).await;
            remove(&active, &events, id);
        });

        notification
    }

    pub fn dismiss(&self, id: Uuid) -> bool {
        remove(&self.active, &self.events, id)
    }
}

impl Default for Notifier {
    fn default() -> Self {
        Self::new(DEFAULT_FLASH_TTL)
    }
}

fn remove(
    active: &Mutex<Vec<Notification>>,
    events: &broadcast::Sender<NotificationEvent>,
    id: Uuid,
) -> bool {
    let removed = {
        let mut active = lock(active);
        let before = active.len();
        active.retain(|n| n.id != id);
        active.len() != before
    };
    if removed {
        let _ = events.send(NotificationEvent::Dismissed(id));
    }
    removed
}

fn lock(active: &Mutex<Vec<Notification>>) -> MutexGuard<'_, Vec<Notification>> {
    active.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}
