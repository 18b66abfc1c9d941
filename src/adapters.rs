use std::sync::{Arc, Mutex};
use std::time::Duration;

use reqwest::header::COOKIE;
use reqwest::{Method, RequestBuilder, Url};
use time::OffsetDateTime;
use tokio::runtime::Handle;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::config::ClientConfig;
use crate::error::ServiceError;
use crate::ports::{self, BoxFuture, LifecycleEvent, Toast};
use crate::types::{BulkReadRequest, Notification, NotificationId, UnreadCount};

pub const SESSION_COOKIE: &str = "session";

#[derive(Debug, Clone, Copy, Default)]
pub struct TokioTimeProvider;

impl ports::TimeProvider for TokioTimeProvider {
    type Sleep<'a>
        = tokio::time::Sleep
    where
        Self: 'a;

    fn now(&self) -> OffsetDateTime {
        OffsetDateTime::now_utc()
    }

    fn sleep<'a>(&'a self, duration: Duration) -> Self::Sleep<'a> {
        tokio::time::sleep(duration)
    }
}

/// Remote notification service over HTTP.
///
/// Every request carries the session token as a cookie so the service can
/// authenticate it exactly like a browser request. Ids travel as single
/// percent-encoded path segments.
#[derive(Debug, Clone)]
pub struct HttpNotificationService {
    client: reqwest::Client,
    base_url: Url,
    session_token: Option<Arc<str>>,
}

const NOTIFICATIONS: [&str; 2] = ["api", "notifications"];

impl HttpNotificationService {
    pub fn new(config: &ClientConfig) -> Result<Self, ServiceError> {
        let client = reqwest::Client::builder().build()?;
        Self::with_client(client, config)
    }

    pub fn with_client(client: reqwest::Client, config: &ClientConfig) -> Result<Self, ServiceError> {
        let invalid = || ServiceError::InvalidUrl(config.base_url.clone());
        let base_url = Url::parse(config.base_url.trim_end_matches('/')).map_err(|_| invalid())?;
        if base_url.cannot_be_a_base() {
            return Err(invalid());
        }
        Ok(Self {
            client,
            base_url,
            session_token: config.session_token.as_deref().map(Arc::from),
        })
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url, ServiceError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| ServiceError::InvalidUrl(self.base_url.to_string()))?
            .pop_if_empty()
            .extend(NOTIFICATIONS.iter().chain(segments));
        Ok(url)
    }

    fn request(&self, method: Method, segments: &[&str]) -> Result<RequestBuilder, ServiceError> {
        let builder = self.client.request(method, self.endpoint(segments)?);
        Ok(match self.session_token.as_deref() {
            Some(token) => builder.header(COOKIE, format!("{SESSION_COOKIE}={token}")),
            None => builder,
        })
    }

    async fn send(builder: RequestBuilder) -> Result<reqwest::Response, ServiceError> {
        let response = builder.send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        Err(ServiceError::Status {
            status: status.as_u16(),
            body,
        })
    }

    pub async fn list(&self, limit: usize) -> Result<Vec<Notification>, ServiceError> {
        let builder = self.request(Method::GET, &[])?.query(&[("limit", limit)]);
        let notifications = Self::send(builder).await?.json().await?;
        Ok(notifications)
    }

    pub async fn mark_as_read(&self, id: &NotificationId) -> Result<(), ServiceError> {
        Self::send(self.request(Method::POST, &[id.as_str(), "read"])?).await?;
        Ok(())
    }

    pub async fn bulk_mark_as_read(&self, ids: &[NotificationId]) -> Result<(), ServiceError> {
        let body = BulkReadRequest { ids: ids.to_vec() };
        let builder = self.request(Method::POST, &["read"])?.json(&body);
        Self::send(builder).await?;
        Ok(())
    }

    pub async fn mark_all_as_read(&self) -> Result<(), ServiceError> {
        Self::send(self.request(Method::POST, &["read-all"])?).await?;
        Ok(())
    }

    pub async fn delete_notification(&self, id: &NotificationId) -> Result<(), ServiceError> {
        Self::send(self.request(Method::DELETE, &[id.as_str()])?).await?;
        Ok(())
    }

    pub async fn delete_all(&self) -> Result<(), ServiceError> {
        Self::send(self.request(Method::DELETE, &[])?).await?;
        Ok(())
    }

    pub async fn fetch_unread_count(&self) -> Result<u64, ServiceError> {
        let builder = self.request(Method::GET, &["unread-count"])?;
        let unread: UnreadCount = Self::send(builder).await?.json().await?;
        Ok(unread.count)
    }
}

impl ports::NotificationService for HttpNotificationService {
    type Error = ServiceError;

    fn list(&self, limit: usize) -> BoxFuture<'_, Result<Vec<Notification>, Self::Error>> {
        Box::pin(HttpNotificationService::list(self, limit))
    }

    fn mark_as_read<'a>(
        &'a self,
        id: &'a NotificationId,
    ) -> BoxFuture<'a, Result<(), Self::Error>> {
        Box::pin(HttpNotificationService::mark_as_read(self, id))
    }

    fn bulk_mark_as_read<'a>(
        &'a self,
        ids: &'a [NotificationId],
    ) -> BoxFuture<'a, Result<(), Self::Error>> {
        Box::pin(HttpNotificationService::bulk_mark_as_read(self, ids))
    }

    fn mark_all_as_read(&self) -> BoxFuture<'_, Result<(), Self::Error>> {
        Box::pin(HttpNotificationService::mark_all_as_read(self))
    }

    fn delete_notification<'a>(
        &'a self,
        id: &'a NotificationId,
    ) -> BoxFuture<'a, Result<(), Self::Error>> {
        Box::pin(HttpNotificationService::delete_notification(self, id))
    }

    fn delete_all(&self) -> BoxFuture<'_, Result<(), Self::Error>> {
        Box::pin(HttpNotificationService::delete_all(self))
    }

    fn fetch_unread_count(&self) -> BoxFuture<'_, Result<u64, Self::Error>> {
        Box::pin(HttpNotificationService::fetch_unread_count(self))
    }
}

/// Durable outbox backed by detached tokio tasks.
///
/// Each dispatch spawns a task that owns its own handle to the service, so
/// the delivery does not depend on the view that requested it. Tasks run on
/// the runtime captured at construction, which lets synchronous teardown
/// code dispatch from outside any async context. Join handles are kept only
/// so process shutdown can wait for in-flight deliveries.
#[derive(Debug, Clone)]
pub struct KeepaliveOutbox<S> {
    service: S,
    runtime: Option<Handle>,
    deliveries: Arc<Mutex<Vec<JoinHandle<()>>>>,
}

impl<S: ports::NotificationService> KeepaliveOutbox<S> {
    pub fn new(service: S) -> Self {
        Self {
            service,
            runtime: Handle::try_current().ok(),
            deliveries: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn with_runtime(service: S, runtime: Handle) -> Self {
        Self {
            runtime: Some(runtime),
            ..Self::new(service)
        }
    }

    pub fn in_flight(&self) -> usize {
        self.deliveries
            .lock()
            .expect("outbox deliveries lock")
            .iter()
            .filter(|handle| !handle.is_finished())
            .count()
    }

    /// Waits for deliveries dispatched so far.
    pub async fn settle(&self) {
        let handles: Vec<JoinHandle<()>> = {
            let mut deliveries = self.deliveries.lock().expect("outbox deliveries lock");
            deliveries.drain(..).collect()
        };
        for handle in handles {
            if let Err(err) = handle.await {
                tracing::warn!(error = %err, "durable delivery task failed");
            }
        }
    }
}

impl<S: ports::NotificationService> ports::DurableOutbox for KeepaliveOutbox<S> {
    fn dispatch(&self, ids: Vec<NotificationId>) {
        let Some(runtime) = self.runtime.clone().or_else(|| Handle::try_current().ok()) else {
            tracing::error!(count = ids.len(), "no tokio runtime available; durable delivery dropped");
            return;
        };
        let service = self.service.clone();
        let handle = runtime.spawn(async move {
            match service.bulk_mark_as_read(&ids).await {
                Ok(()) => tracing::debug!(count = ids.len(), "durable delivery sent"),
                Err(err) => {
                    tracing::warn!(count = ids.len(), error = %err, "durable delivery failed")
                }
            }
        });
        let mut deliveries = self.deliveries.lock().expect("outbox deliveries lock");
        deliveries.retain(|handle| !handle.is_finished());
        deliveries.push(handle);
    }
}

/// Lifecycle events pushed by an embedding UI runtime.
#[derive(Debug)]
pub struct ChannelLifecycle {
    events: mpsc::UnboundedReceiver<LifecycleEvent>,
}

impl ChannelLifecycle {
    pub fn channel() -> (mpsc::UnboundedSender<LifecycleEvent>, Self) {
        let (sender, events) = mpsc::unbounded_channel();
        (sender, Self { events })
    }
}

impl ports::LifecycleSource for ChannelLifecycle {
    fn next_event(&mut self) -> BoxFuture<'_, Option<LifecycleEvent>> {
        Box::pin(self.events.recv())
    }
}

/// Maps Ctrl-C to a single `Unloading` event; the process is about to end.
#[derive(Debug, Default)]
pub struct SignalLifecycle {
    fired: bool,
}

impl ports::LifecycleSource for SignalLifecycle {
    fn next_event(&mut self) -> BoxFuture<'_, Option<LifecycleEvent>> {
        Box::pin(async move {
            if self.fired {
                return None;
            }
            self.fired = true;
            match tokio::signal::ctrl_c().await {
                Ok(()) => Some(LifecycleEvent::Unloading),
                Err(err) => {
                    tracing::warn!(error = %err, "failed to listen for ctrl-c");
                    None
                }
            }
        })
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ConsoleToasts;

impl ports::ToastSink for ConsoleToasts {
    fn show(&self, toast: Toast) {
        eprintln!("error: {}", toast.message);
    }
}
