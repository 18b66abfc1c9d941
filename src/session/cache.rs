use crate::types::{Notification, NotificationId};

use std::sync::{Arc, Mutex, MutexGuard};

/// Notification records currently rendered, newest first.
///
/// Cloning yields another handle to the same records. Every method locks once
/// and never across an await, so each mutation is atomic for its caller.
#[derive(Debug, Clone, Default)]
pub struct NotificationCache {
    records: Arc<Mutex<Vec<Notification>>>,
}

impl NotificationCache {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Vec<Notification>> {
        self.records.lock().expect("notification cache lock")
    }

    pub fn replace(&self, mut notifications: Vec<Notification>) {
        notifications.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        *self.lock() = notifications;
    }

    pub fn snapshot(&self) -> Vec<Notification> {
        self.lock().clone()
    }

    pub fn get(&self, id: &NotificationId) -> Option<Notification> {
        self.lock().iter().find(|n| &n.id == id).cloned()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    pub fn unread_len(&self) -> usize {
        self.lock().iter().filter(|n| !n.read).count()
    }

    /// Flips the record to read. Returns its previous `read` flag, or `None`
    /// when the id is not cached.
    pub fn mark_read(&self, id: &NotificationId) -> Option<bool> {
        let mut records = self.lock();
        let record = records.iter_mut().find(|n| &n.id == id)?;
        let was_read = record.read;
        record.read = true;
        Some(was_read)
    }

    /// Applies acknowledged read receipts. Records reloaded while a flush was
    /// in flight may carry a stale unread flag; this settles them.
    pub fn confirm_read(&self, ids: &[NotificationId]) -> usize {
        let mut records = self.lock();
        let mut changed = 0;
        for record in records.iter_mut().filter(|n| ids.contains(&n.id)) {
            if !record.read {
                record.read = true;
                changed += 1;
            }
        }
        changed
    }

    /// Returns how many records changed.
    pub fn mark_all_read(&self) -> usize {
        let mut records = self.lock();
        let mut changed = 0;
        for record in records.iter_mut().filter(|n| !n.read) {
            record.read = true;
            changed += 1;
        }
        changed
    }

    pub fn remove(&self, id: &NotificationId) -> Option<Notification> {
        let mut records = self.lock();
        let position = records.iter().position(|n| &n.id == id)?;
        Some(records.remove(position))
    }

    /// Returns how many records were dropped.
    pub fn clear(&self) -> usize {
        let mut records = self.lock();
        let dropped = records.len();
        records.clear();
        dropped
    }
}
