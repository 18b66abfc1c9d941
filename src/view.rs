use crate::config::ClientConfig;
use crate::display::Filter;
use crate::ports::{self, LifecycleEvent, Toast};
use crate::session::NotificationSession;
use crate::sync::{FlushCoordinator, FlushOutcome, VisibilityTracker};
use crate::types::{Notification, NotificationId};

use std::time::Duration;

/// Where a notification sits on the read-status axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadState {
    Unread,
    /// Read locally after being seen; the receipt has not been acknowledged.
    PendingRead,
    ConfirmedRead,
}

#[derive(Debug, Clone, Copy)]
pub struct ViewOptions {
    pub list_limit: usize,
    pub visibility_threshold: f32,
    pub refetch_delay: Duration,
}

impl From<&ClientConfig> for ViewOptions {
    fn from(config: &ClientConfig) -> Self {
        Self {
            list_limit: config.list_limit,
            visibility_threshold: config.visibility_threshold,
            refetch_delay: config.refetch_delay,
        }
    }
}

impl Default for ViewOptions {
    fn default() -> Self {
        Self::from(&ClientConfig::default())
    }
}

/// Controller behind the activity / notifications view.
///
/// Explicit user actions talk to the service directly; cards that merely
/// scroll into view go through the pending batch. Every action mutates the
/// session and the batch before its first await.
#[derive(Clone)]
pub struct NotificationsView<S, O, T, N> {
    session: NotificationSession,
    service: S,
    coordinator: FlushCoordinator<S, O, T>,
    toasts: N,
    options: ViewOptions,
}

impl<S, O, T, N> NotificationsView<S, O, T, N>
where
    S: ports::NotificationService,
    O: ports::DurableOutbox,
    T: ports::TimeProvider,
    N: ports::ToastSink,
{
    pub fn new(
        session: NotificationSession,
        service: S,
        outbox: O,
        time: T,
        toasts: N,
        options: ViewOptions,
    ) -> Self {
        let coordinator = FlushCoordinator::new(
            session.clone(),
            service.clone(),
            outbox,
            time,
            options.refetch_delay,
        );
        Self {
            session,
            service,
            coordinator,
            toasts,
            options,
        }
    }

    pub fn session(&self) -> &NotificationSession {
        &self.session
    }

    pub fn coordinator(&self) -> &FlushCoordinator<S, O, T> {
        &self.coordinator
    }

    pub fn unread_count(&self) -> u64 {
        self.session.counter().get()
    }

    pub fn notifications(&self, filter: Filter) -> Vec<Notification> {
        let records = self.session.cache().snapshot();
        filter.apply(&records).into_iter().cloned().collect()
    }

    pub fn read_state(&self, id: &NotificationId) -> Option<ReadState> {
        let record = self.session.cache().get(id)?;
        let state = match (record.read, self.coordinator.is_pending(id)) {
            (false, _) => ReadState::Unread,
            (true, true) => ReadState::PendingRead,
            (true, false) => ReadState::ConfirmedRead,
        };
        Some(state)
    }

    /// Fetches the first page and the authoritative unread count.
    pub async fn load(&self) -> Result<usize, S::Error> {
        let notifications = match self.service.list(self.options.list_limit).await {
            Ok(notifications) => notifications,
            Err(err) => {
                tracing::warn!(error = %err, "failed to load notifications");
                self.toasts.show(Toast::error("Failed to load notifications."));
                return Err(err);
            }
        };
        let loaded = notifications.len();
        self.session.cache().replace(notifications);
        self.refetch_count().await;
        tracing::debug!(loaded, "notifications loaded");
        Ok(loaded)
    }

    /// Builds the tracker for one rendered card. Read cards get an inert one.
    pub fn tracker(&self, notification: &Notification) -> VisibilityTracker {
        let view = self.clone();
        VisibilityTracker::attach(
            notification,
            self.options.visibility_threshold,
            move |id| {
                view.mark_seen(&id);
            },
        )
    }

    /// Visibility callback: optimistic read, counter decrement, batch insert.
    /// Returns `false` when the id is unknown or already read locally.
    pub fn mark_seen(&self, id: &NotificationId) -> bool {
        match self.session.cache().mark_read(id) {
            Some(false) => {
                self.session.counter().decrement();
                self.coordinator.enqueue(id.clone());
                true
            }
            Some(true) | None => false,
        }
    }

    pub async fn mark_as_read(&self, id: &NotificationId) -> Result<(), S::Error> {
        self.coordinator.forget(id);
        self.session.cache().mark_read(id);

        let result = self.service.mark_as_read(id).await;
        if let Err(err) = &result {
            tracing::warn!(id = %id, error = %err, "mark as read failed");
            self.toasts
                .show(Toast::error("Failed to mark notification as read."));
        }
        self.refetch_count().await;
        result
    }

    pub async fn mark_all_as_read(&self) -> Result<(), S::Error> {
        self.session.cache().mark_all_read();
        self.coordinator.clear();
        self.session.counter().set(0);

        let result = self.service.mark_all_as_read().await;
        if let Err(err) = &result {
            tracing::warn!(error = %err, "mark all as read failed");
            self.toasts
                .show(Toast::error("Failed to mark all notifications as read."));
        }
        self.refetch_count().await;
        result
    }

    pub async fn delete(&self, id: &NotificationId) -> Result<(), S::Error> {
        self.coordinator.forget(id);
        let removed = self.session.cache().remove(id);
        if removed.is_some_and(|notification| !notification.read) {
            self.session.counter().decrement();
        }

        let result = self.service.delete_notification(id).await;
        if let Err(err) = &result {
            tracing::warn!(id = %id, error = %err, "delete notification failed");
            self.toasts
                .show(Toast::error("Failed to delete notification."));
        }
        result
    }

    pub async fn delete_all(&self) -> Result<(), S::Error> {
        self.session.cache().clear();
        self.coordinator.clear();
        self.session.counter().set(0);

        let result = self.service.delete_all().await;
        if let Err(err) = &result {
            tracing::warn!(error = %err, "delete all notifications failed");
            self.toasts
                .show(Toast::error("Failed to delete notifications."));
        }
        result
    }

    pub async fn on_lifecycle(&self, event: LifecycleEvent) -> FlushOutcome {
        self.coordinator.on_lifecycle(event).await
    }

    /// Dispatches host events until the view is torn down. A source that ends
    /// without a teardown event still gets the cooperative fallback flush.
    pub async fn run_lifecycle<L: ports::LifecycleSource>(&self, source: &mut L) {
        while let Some(event) = source.next_event().await {
            let outcome = self.on_lifecycle(event).await;
            tracing::debug!(?event, ?outcome, "lifecycle event handled");
            if event == LifecycleEvent::ViewTeardown {
                return;
            }
        }
        self.on_lifecycle(LifecycleEvent::ViewTeardown).await;
    }

    async fn refetch_count(&self) {
        if let Err(err) = self.coordinator.refetch_unread_count().await {
            tracing::warn!(error = %err, "unread count refetch failed");
        }
    }
}
