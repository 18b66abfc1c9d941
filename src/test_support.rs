use crate::backend::InMemoryNotificationStore;
use crate::error::ServiceError;
use crate::ports::{self, BoxFuture, NotificationService, Toast};
use crate::types::{Category, Notification, NotificationId};

use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::task::{Context, Poll};
use std::time::Duration;
use time::OffsetDateTime;
use time::macros::datetime;
use tokio::sync::oneshot;

pub(crate) fn fixed_now() -> OffsetDateTime {
    datetime!(2025-01-12 09:30:00 UTC)
}

pub(crate) fn notification(id: &str, read: bool, minutes_ago: i64) -> Notification {
    Notification {
        id: NotificationId::from(id),
        category: Category::JobAlert,
        title: format!("Notification {id}"),
        message: "A new role matches your profile".to_string(),
        read,
        created_at: fixed_now() - time::Duration::minutes(minutes_ago),
        action_url: None,
    }
}

pub(crate) fn unread_feed(count: usize) -> Vec<Notification> {
    (1..=count)
        .map(|n| notification(&n.to_string(), false, n as i64))
        .collect()
}

pub(crate) fn ids(raw: &[&str]) -> Vec<NotificationId> {
    raw.iter().map(|id| NotificationId::from(*id)).collect()
}

#[derive(Clone)]
pub(crate) struct TestTime {
    now: OffsetDateTime,
    manual: bool,
    sleeps: Arc<Mutex<Vec<oneshot::Sender<()>>>>,
    durations: Arc<Mutex<Vec<Duration>>>,
}

impl TestTime {
    /// Sleeps complete immediately; durations are still recorded.
    pub(crate) fn immediate() -> Self {
        Self::build(false)
    }

    /// Sleeps block until `trigger_all`.
    pub(crate) fn manual() -> Self {
        Self::build(true)
    }

    fn build(manual: bool) -> Self {
        Self {
            now: fixed_now(),
            manual,
            sleeps: Arc::new(Mutex::new(Vec::new())),
            durations: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub(crate) fn sleep_durations(&self) -> Vec<Duration> {
        self.durations.lock().expect("durations lock").clone()
    }

    pub(crate) fn pending_sleeps(&self) -> usize {
        self.sleeps.lock().expect("sleeps lock").len()
    }

    pub(crate) async fn wait_for_sleeps(&self, count: usize) {
        while self.pending_sleeps() < count {
            tokio::task::yield_now().await;
        }
    }

    pub(crate) fn trigger_all(&self) {
        let mut sends = self.sleeps.lock().expect("sleeps lock");
        for sender in sends.drain(..) {
            let _ = sender.send(());
        }
    }
}

pub(crate) struct ManualSleep {
    receiver: Option<oneshot::Receiver<()>>,
}

impl Future for ManualSleep {
    type Output = ();

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        match self.receiver.as_mut() {
            None => Poll::Ready(()),
            Some(receiver) => match Pin::new(receiver).poll(cx) {
                Poll::Ready(_) => Poll::Ready(()),
                Poll::Pending => Poll::Pending,
            },
        }
    }
}

impl ports::TimeProvider for TestTime {
    type Sleep<'a>
        = ManualSleep
    where
        Self: 'a;

    fn now(&self) -> OffsetDateTime {
        self.now
    }

    fn sleep<'a>(&'a self, duration: Duration) -> Self::Sleep<'a> {
        self.durations
            .lock()
            .expect("durations lock")
            .push(duration);
        if !self.manual {
            return ManualSleep { receiver: None };
        }
        let (sender, receiver) = oneshot::channel();
        self.sleeps.lock().expect("sleeps lock").push(sender);
        ManualSleep {
            receiver: Some(receiver),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Call {
    List(usize),
    MarkAsRead(NotificationId),
    BulkMarkAsRead(Vec<NotificationId>),
    MarkAllAsRead,
    Delete(NotificationId),
    DeleteAll,
    FetchUnreadCount,
}

/// In-memory service that records every call and can be switched to fail.
#[derive(Clone, Default)]
pub(crate) struct RecordingService {
    pub(crate) store: InMemoryNotificationStore,
    calls: Arc<Mutex<Vec<Call>>>,
    failing: Arc<AtomicBool>,
}

impl RecordingService {
    pub(crate) fn with_notifications(notifications: Vec<Notification>) -> Self {
        Self {
            store: InMemoryNotificationStore::with_notifications(notifications),
            ..Self::default()
        }
    }

    pub(crate) fn fail_writes(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub(crate) fn calls(&self) -> Vec<Call> {
        self.calls.lock().expect("calls lock").clone()
    }

    pub(crate) fn bulk_deliveries(&self) -> Vec<Vec<NotificationId>> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                Call::BulkMarkAsRead(ids) => Some(ids),
                _ => None,
            })
            .collect()
    }

    fn record(&self, call: Call) -> Result<(), ServiceError> {
        let is_read_only = matches!(call, Call::List(_) | Call::FetchUnreadCount);
        self.calls.lock().expect("calls lock").push(call);
        if !is_read_only && self.failing.load(Ordering::SeqCst) {
            return Err(ServiceError::Unavailable("injected failure".to_string()));
        }
        Ok(())
    }
}

impl NotificationService for RecordingService {
    type Error = ServiceError;

    fn list(&self, limit: usize) -> BoxFuture<'_, Result<Vec<Notification>, Self::Error>> {
        let result = self.record(Call::List(limit)).map(|_| self.store.list(limit));
        Box::pin(async move { result })
    }

    fn mark_as_read<'a>(
        &'a self,
        id: &'a NotificationId,
    ) -> BoxFuture<'a, Result<(), Self::Error>> {
        let result = self.record(Call::MarkAsRead(id.clone())).map(|_| {
            self.store.mark_read(id);
        });
        Box::pin(async move { result })
    }

    fn bulk_mark_as_read<'a>(
        &'a self,
        ids: &'a [NotificationId],
    ) -> BoxFuture<'a, Result<(), Self::Error>> {
        let result = self.record(Call::BulkMarkAsRead(ids.to_vec())).map(|_| {
            self.store.bulk_mark_read(ids);
        });
        Box::pin(async move { result })
    }

    fn mark_all_as_read(&self) -> BoxFuture<'_, Result<(), Self::Error>> {
        let result = self.record(Call::MarkAllAsRead).map(|_| {
            self.store.mark_all_read();
        });
        Box::pin(async move { result })
    }

    fn delete_notification<'a>(
        &'a self,
        id: &'a NotificationId,
    ) -> BoxFuture<'a, Result<(), Self::Error>> {
        let result = self.record(Call::Delete(id.clone())).map(|_| {
            self.store.delete(id);
        });
        Box::pin(async move { result })
    }

    fn delete_all(&self) -> BoxFuture<'_, Result<(), Self::Error>> {
        let result = self.record(Call::DeleteAll).map(|_| {
            self.store.delete_all();
        });
        Box::pin(async move { result })
    }

    fn fetch_unread_count(&self) -> BoxFuture<'_, Result<u64, Self::Error>> {
        let result = self
            .record(Call::FetchUnreadCount)
            .map(|_| self.store.unread_count());
        Box::pin(async move { result })
    }
}

/// Durable outbox that applies deliveries to a store synchronously.
#[derive(Clone, Default)]
pub(crate) struct RecordingOutbox {
    store: Option<InMemoryNotificationStore>,
    dispatched: Arc<Mutex<Vec<Vec<NotificationId>>>>,
}

impl RecordingOutbox {
    pub(crate) fn delivering_to(store: InMemoryNotificationStore) -> Self {
        Self {
            store: Some(store),
            ..Self::default()
        }
    }

    pub(crate) fn dispatched(&self) -> Vec<Vec<NotificationId>> {
        self.dispatched.lock().expect("dispatched lock").clone()
    }
}

impl ports::DurableOutbox for RecordingOutbox {
    fn dispatch(&self, ids: Vec<NotificationId>) {
        if let Some(store) = &self.store {
            store.bulk_mark_read(&ids);
        }
        self.dispatched.lock().expect("dispatched lock").push(ids);
    }
}

#[derive(Clone, Default)]
pub(crate) struct RecordingToasts {
    shown: Arc<Mutex<Vec<Toast>>>,
}

impl RecordingToasts {
    pub(crate) fn shown(&self) -> Vec<Toast> {
        self.shown.lock().expect("toasts lock").clone()
    }
}

impl ports::ToastSink for RecordingToasts {
    fn show(&self, toast: Toast) {
        self.shown.lock().expect("toasts lock").push(toast);
    }
}
