//! Append-only notification feed with mutable read state.

use chrono::{DateTime, Utc};

use nexus_core::{DomainError, DomainResult, NotificationId};

use crate::{Notification, NotificationSink};

#[derive(Debug, Clone, Default)]
pub struct NotificationFeed {
    // Oldest first; listing reverses.
    entries: Vec<Notification>,
}

impl NotificationFeed {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, notification: Notification) -> NotificationId {
        let id = notification.id;
        tracing::debug!(%id, title = %notification.title, "notification appended");
        self.entries.push(notification);
        id
    }

    /// Newest first.
    pub fn list(&self) -> impl Iterator<Item = &Notification> {
        self.entries.iter().rev()
    }

    pub fn get(&self, id: &NotificationId) -> Option<&Notification> {
        self.entries.iter().find(|n| n.id == *id)
    }

    pub fn mark_read(&mut self, id: &NotificationId) -> DomainResult<()> {
        let entry = self
            .entries
            .iter_mut()
            .find(|n| n.id == *id)
            .ok_or_else(|| DomainError::not_found(format!("notification {id}")))?;
        entry.read = true;
        Ok(())
    }

    /// Returns how many notifications flipped from unread to read.
    pub fn mark_all_read(&mut self) -> usize {
        let mut flipped = 0;
        for entry in self.entries.iter_mut().filter(|n| !n.read) {
            entry.read = true;
            flipped += 1;
        }
        flipped
    }

    pub fn unread_count(&self) -> usize {
        self.entries.iter().filter(|n| !n.read).count()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl NotificationSink for NotificationFeed {
    fn notify(&mut self, title: &str, message: &str, at: DateTime<Utc>) {
        self.push(Notification::new(title, message, at));
    }
}
