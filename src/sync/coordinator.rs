use crate::ports::{self, LifecycleEvent};
use crate::session::NotificationSession;
use crate::sync::PendingBatch;
use crate::types::NotificationId;

use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;

pub const DEFAULT_REFETCH_DELAY: Duration = Duration::from_secs(1);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlushMode {
    /// Awaited bulk request; the view is expected to stay alive.
    Cooperative,
    /// Handed to the durable outbox; the view may be gone before delivery.
    Durable,
}

impl FlushMode {
    pub fn for_event(event: LifecycleEvent) -> Self {
        match event {
            LifecycleEvent::Hidden | LifecycleEvent::Unloading => FlushMode::Durable,
            LifecycleEvent::ViewTeardown => FlushMode::Cooperative,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlushOutcome {
    /// Nothing was pending; no request was made.
    Empty,
    /// Cooperative flush acknowledged by the service.
    Delivered(usize),
    /// Cooperative flush rejected; the ids stay optimistically read.
    Failed(usize),
    /// Durable flush handed to the outbox.
    Dispatched(usize),
}

/// Owns the pending read batch and decides how it reaches the service.
///
/// Cloning yields another handle to the same batch. Refetch tasks are spawned
/// on the runtime captured at construction, or the caller's runtime; without
/// either the refetch is skipped and the flush itself still goes through.
#[derive(Clone)]
pub struct FlushCoordinator<S, O, T> {
    batch: Arc<Mutex<PendingBatch>>,
    session: NotificationSession,
    service: S,
    outbox: O,
    time: T,
    refetch_delay: Duration,
    runtime: Option<Handle>,
    refetches: Arc<Mutex<Vec<JoinHandle<()>>>>,
}

impl<S, O, T> FlushCoordinator<S, O, T>
where
    S: ports::NotificationService,
    O: ports::DurableOutbox,
    T: ports::TimeProvider,
{
    pub fn new(
        session: NotificationSession,
        service: S,
        outbox: O,
        time: T,
        refetch_delay: Duration,
    ) -> Self {
        Self {
            batch: Arc::new(Mutex::new(PendingBatch::new())),
            session,
            service,
            outbox,
            time,
            refetch_delay,
            runtime: Handle::try_current().ok(),
            refetches: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Spawns refetches on `runtime` even when flushed from outside it.
    pub fn with_runtime(mut self, runtime: Handle) -> Self {
        self.runtime = Some(runtime);
        self
    }

    fn batch(&self) -> MutexGuard<'_, PendingBatch> {
        self.batch.lock().expect("pending batch lock")
    }

    pub fn enqueue(&self, id: NotificationId) -> bool {
        self.batch().add(id)
    }

    /// Drops an id the caller is about to handle directly.
    pub fn forget(&self, id: &NotificationId) -> bool {
        self.batch().remove(id)
    }

    pub fn clear(&self) {
        self.batch().clear();
    }

    pub fn is_pending(&self, id: &NotificationId) -> bool {
        self.batch().contains(id)
    }

    pub fn pending(&self) -> Vec<NotificationId> {
        self.batch().ids().to_vec()
    }

    pub async fn flush(&self, mode: FlushMode) -> FlushOutcome {
        match mode {
            FlushMode::Cooperative => self.flush_cooperative().await,
            FlushMode::Durable => self.flush_durable(),
        }
    }

    pub async fn on_lifecycle(&self, event: LifecycleEvent) -> FlushOutcome {
        let mode = FlushMode::for_event(event);
        tracing::debug!(?event, ?mode, "lifecycle flush");
        self.flush(mode).await
    }

    pub async fn flush_cooperative(&self) -> FlushOutcome {
        let ids = self.batch().drain();
        if ids.is_empty() {
            return FlushOutcome::Empty;
        }

        let count = ids.len();
        match self.service.bulk_mark_as_read(&ids).await {
            Ok(()) => {
                self.session.cache().confirm_read(&ids);
                tracing::debug!(count, "read receipts delivered");
                self.schedule_refetch();
                FlushOutcome::Delivered(count)
            }
            Err(err) => {
                tracing::warn!(count, error = %err, "read receipt flush failed");
                FlushOutcome::Failed(count)
            }
        }
    }

    /// Never blocks and never needs an async context; safe to call from
    /// synchronous teardown handlers.
    pub fn flush_durable(&self) -> FlushOutcome {
        let ids = self.batch().drain();
        if ids.is_empty() {
            return FlushOutcome::Empty;
        }

        let count = ids.len();
        self.outbox.dispatch(ids);
        tracing::debug!(count, "read receipts handed to durable outbox");
        self.schedule_refetch();
        FlushOutcome::Dispatched(count)
    }

    fn schedule_refetch(&self) {
        let Some(runtime) = self.runtime.clone().or_else(|| Handle::try_current().ok()) else {
            tracing::warn!("no tokio runtime available; skipping unread count refetch");
            return;
        };
        let coordinator = self.clone();
        let handle = runtime.spawn(async move {
            coordinator.time.sleep(coordinator.refetch_delay).await;
            if let Err(err) = coordinator.refetch_unread_count().await {
                tracing::warn!(error = %err, "unread count refetch failed");
            }
        });

        let mut refetches = self.refetches.lock().expect("refetch handles lock");
        refetches.retain(|handle| !handle.is_finished());
        refetches.push(handle);
    }

    /// Replaces the counter with the service's count minus the ids still
    /// waiting in the batch; the service has not seen those yet.
    pub async fn refetch_unread_count(&self) -> Result<u64, S::Error> {
        let authoritative = self.service.fetch_unread_count().await?;
        let unacknowledged = self.batch().len() as u64;
        let count = self
            .session
            .counter()
            .reconcile(authoritative, unacknowledged);
        tracing::debug!(authoritative, unacknowledged, count, "unread count refetched");
        Ok(count)
    }

    pub fn scheduled_refetches(&self) -> usize {
        self.refetches
            .lock()
            .expect("refetch handles lock")
            .iter()
            .filter(|handle| !handle.is_finished())
            .count()
    }

    /// Waits for every scheduled refetch to finish.
    pub async fn settle(&self) {
        let handles: Vec<JoinHandle<()>> = {
            let mut refetches = self.refetches.lock().expect("refetch handles lock");
            refetches.drain(..).collect()
        };
        for handle in handles {
            if let Err(err) = handle.await {
                tracing::warn!(error = %err, "unread count refetch task failed");
            }
        }
    }
}
