use crate::ports::BoxFuture;
use crate::types::{Notification, NotificationId};

/// Client view of the remote notification service.
///
/// Every write is idempotent on the service side: marking an already-read id
/// or deleting a missing one is a no-op, and `bulk_mark_as_read` is a
/// set-union. Callers rely on this to flush overlapping batches safely.
pub trait NotificationService: Clone + Send + Sync + 'static {
    type Error: std::fmt::Display + Send + Sync + 'static;

    /// Newest first, at most `limit` records.
    fn list(&self, limit: usize) -> BoxFuture<'_, Result<Vec<Notification>, Self::Error>>;

    fn mark_as_read<'a>(&'a self, id: &'a NotificationId)
    -> BoxFuture<'a, Result<(), Self::Error>>;

    fn bulk_mark_as_read<'a>(
        &'a self,
        ids: &'a [NotificationId],
    ) -> BoxFuture<'a, Result<(), Self::Error>>;

    fn mark_all_as_read(&self) -> BoxFuture<'_, Result<(), Self::Error>>;

    fn delete_notification<'a>(
        &'a self,
        id: &'a NotificationId,
    ) -> BoxFuture<'a, Result<(), Self::Error>>;

    fn delete_all(&self) -> BoxFuture<'_, Result<(), Self::Error>>;

    fn fetch_unread_count(&self) -> BoxFuture<'_, Result<u64, Self::Error>>;
}

/// Best-effort outbox for bulk read receipts that must outlive the caller.
///
/// `dispatch` hands the ids to a delivery mechanism and returns immediately.
/// There is no completion signal; delivery failures are only logged.
pub trait DurableOutbox: Clone + Send + Sync + 'static {
    fn dispatch(&self, ids: Vec<NotificationId>);
}
