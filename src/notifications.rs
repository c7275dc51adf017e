// Standard Library Imports
use std::{
    sync::{Arc, Mutex},
    time::{Duration, Instant},
};

// Local Crate Imports
use crate::refresh::Refresh;

// Public API ==========================================================================================================

#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum Kind {
    Success,
    Error,
}

#[derive(Clone, Eq, PartialEq, Debug)]
pub struct Notification {
    pub id: u64,
    pub kind: Kind,
    pub message: String,
    pub created_at: Instant,
}

/// The toasts shown on top of the page. Cloning shares the same list, and every change bumps `changed()` so the
/// view knows to redraw
#[derive(Clone, Debug, Default)]
pub struct Notifications {
    entries: Arc<Mutex<Entries>>,
    changed: Refresh,
}

impl Notifications {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn success(&self, message: impl Into<String>) -> u64 {
        self.push(Kind::Success, message.into())
    }

    pub fn error(&self, message: impl Into<String>) -> u64 {
        self.push(Kind::Error, message.into())
    }

    #[must_use]
    pub fn list(&self) -> Vec<Notification> {
        self.entries.lock().unwrap().notifications.clone()
    }

    pub fn dismiss(&self, id: u64) {
        let removed = {
            let mut entries = self.entries.lock().unwrap();
            let before = entries.notifications.len();
            entries.notifications.retain(|notification| notification.id != id);
            entries.notifications.len() != before
        };

        if removed {
            self.changed.bump();
        }
    }

    /// Drops every notification older than `max_age`, returning how many were removed
    pub fn expire(&self, max_age: Duration) -> usize {
        let removed = {
            let mut entries = self.entries.lock().unwrap();
            let before = entries.notifications.len();
            entries
                .notifications
                .retain(|notification| notification.created_at.elapsed() < max_age);
            before - entries.notifications.len()
        };

        if removed > 0 {
            self.changed.bump();
        }

        removed
    }

    #[must_use]
    pub const fn changed(&self) -> &Refresh {
        &self.changed
    }
}

// Private Helper Code =================================================================================================

#[derive(Debug, Default)]
struct Entries {
    next_id: u64,
    notifications: Vec<Notification>,
}

impl Notifications {
    fn push(&self, kind: Kind, message: String) -> u64 {
        let id = {
            let mut entries = self.entries.lock().unwrap();
            let id = entries.next_id;
            entries.next_id += 1;
            entries.notifications.push(Notification {
                id,
                kind,
                message,
                created_at: Instant::now(),
            });
            id
        };

        self.changed.bump();
        id
    }
}

// Unit Tests ==========================================================================================================
