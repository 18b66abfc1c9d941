use std::future::Future;
use std::pin::Pin;

pub mod lifecycle;
pub mod notifications;
pub mod time;
pub mod toast;

pub use lifecycle::{LifecycleEvent, LifecycleSource};
pub use notifications::{DurableOutbox, NotificationService};
pub use self::time::TimeProvider;
pub use toast::{Toast, ToastSink};

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;
