use crate::ports::{BoxFuture, NotificationService};
use crate::types::{Category, Notification, NotificationId};

use std::convert::Infallible;
use std::sync::{Arc, Mutex, MutexGuard};
use time::{Duration, OffsetDateTime};

/// In-process notification store with the same semantics the remote service
/// promises: every write is idempotent and read flags only move to `true`.
#[derive(Debug, Clone, Default)]
pub struct InMemoryNotificationStore {
    records: Arc<Mutex<Vec<Notification>>>,
}

impl InMemoryNotificationStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_notifications(notifications: Vec<Notification>) -> Self {
        let store = Self::new();
        for notification in notifications {
            store.insert(notification);
        }
        store
    }

    fn lock(&self) -> MutexGuard<'_, Vec<Notification>> {
        self.records.lock().expect("notification store lock")
    }

    /// Replaces any record with the same id.
    pub fn insert(&self, notification: Notification) {
        let mut records = self.lock();
        records.retain(|existing| existing.id != notification.id);
        records.push(notification);
    }

    pub fn get(&self, id: &NotificationId) -> Option<Notification> {
        self.lock().iter().find(|n| &n.id == id).cloned()
    }

    pub fn list(&self, limit: usize) -> Vec<Notification> {
        let mut records = self.lock().clone();
        records.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        records.truncate(limit);
        records
    }

    pub fn mark_read(&self, id: &NotificationId) -> bool {
        self.bulk_mark_read(std::slice::from_ref(id)) == 1
    }

    /// Set-union of read flags. Returns how many records flipped.
    pub fn bulk_mark_read(&self, ids: &[NotificationId]) -> usize {
        let mut records = self.lock();
        let mut flipped = 0;
        for record in records.iter_mut().filter(|n| ids.contains(&n.id)) {
            if !record.read {
                record.read = true;
                flipped += 1;
            }
        }
        flipped
    }

    pub fn mark_all_read(&self) -> usize {
        let mut records = self.lock();
        let mut flipped = 0;
        for record in records.iter_mut().filter(|n| !n.read) {
            record.read = true;
            flipped += 1;
        }
        flipped
    }

    pub fn delete(&self, id: &NotificationId) -> bool {
        let mut records = self.lock();
        let before = records.len();
        records.retain(|n| &n.id != id);
        records.len() != before
    }

    pub fn delete_all(&self) -> usize {
        let mut records = self.lock();
        let removed = records.len();
        records.clear();
        removed
    }

    pub fn unread_count(&self) -> u64 {
        self.lock().iter().filter(|n| !n.read).count() as u64
    }
}

impl NotificationService for InMemoryNotificationStore {
    type Error = Infallible;

    fn list(&self, limit: usize) -> BoxFuture<'_, Result<Vec<Notification>, Self::Error>> {
        let records = InMemoryNotificationStore::list(self, limit);
        Box::pin(async move { Ok(records) })
    }

    fn mark_as_read<'a>(
        &'a self,
        id: &'a NotificationId,
    ) -> BoxFuture<'a, Result<(), Self::Error>> {
        self.mark_read(id);
        Box::pin(async { Ok(()) })
    }

    fn bulk_mark_as_read<'a>(
        &'a self,
        ids: &'a [NotificationId],
    ) -> BoxFuture<'a, Result<(), Self::Error>> {
        self.bulk_mark_read(ids);
        Box::pin(async { Ok(()) })
    }

    fn mark_all_as_read(&self) -> BoxFuture<'_, Result<(), Self::Error>> {
        self.mark_all_read();
        Box::pin(async { Ok(()) })
    }

    fn delete_notification<'a>(
        &'a self,
        id: &'a NotificationId,
    ) -> BoxFuture<'a, Result<(), Self::Error>> {
        self.delete(id);
        Box::pin(async { Ok(()) })
    }

    fn delete_all(&self) -> BoxFuture<'_, Result<(), Self::Error>> {
        InMemoryNotificationStore::delete_all(self);
        Box::pin(async { Ok(()) })
    }

    fn fetch_unread_count(&self) -> BoxFuture<'_, Result<u64, Self::Error>> {
        let count = self.unread_count();
        Box::pin(async move { Ok(count) })
    }
}

/// A small, varied feed for local development.
pub fn demo_notifications(now: OffsetDateTime) -> Vec<Notification> {
    let entries: [(&str, Category, &str, &str, bool, i64, Option<&str>); 8] = [
        (
            "n-1001",
            Category::ApplicationUpdate,
            "Application viewed",
            "Northwind Labs opened your application for Backend Engineer.",
            false,
            4,
            Some("/applications/381"),
        ),
        (
            "n-1002",
            Category::JobAlert,
            "12 new matches",
            "New roles match your saved search \"Rust, remote\".",
            false,
            35,
            Some("/jobs?search=rust-remote"),
        ),
        (
            "n-1003",
            Category::Reminder,
            "Interview tomorrow",
            "Technical interview with Contoso at 10:00.",
            false,
            90,
            Some("/calendar"),
        ),
        (
            "n-1004",
            Category::ApplicationUpdate,
            "Application submitted",
            "Your application to Fabrikam was sent automatically.",
            false,
            60 * 5,
            Some("/applications/377"),
        ),
        (
            "n-1005",
            Category::System,
            "Resume parsed",
            "We extracted 3 projects and 2 positions from your resume.",
            true,
            60 * 26,
            None,
        ),
        (
            "n-1006",
            Category::Announcement,
            "Weekly digest",
            "Auto-apply now supports cover letter templates.",
            false,
            60 * 24 * 3,
            None,
        ),
        (
            "n-1007",
            Category::JobAlert,
            "Salary range updated",
            "A job you saved raised its posted salary range.",
            true,
            60 * 24 * 5,
            Some("/jobs/912"),
        ),
        (
            "n-1008",
            Category::System,
            "Profile incomplete",
            "Add your education history to improve matching.",
            false,
            60 * 24 * 12,
            Some("/profile/education"),
        ),
    ];

    entries
        .into_iter()
        .map(
            |(id, category, title, message, read, minutes_ago, action_url)| Notification {
                id: NotificationId::from(id),
                category,
                title: title.to_string(),
                message: message.to_string(),
                read,
                created_at: now - Duration::minutes(minutes_ago),
                action_url: action_url.map(str::to_string),
            },
        )
        .collect()
}
