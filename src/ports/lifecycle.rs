use crate::ports::BoxFuture;

/// Host signals that drive flushing of the pending read batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleEvent {
    /// The view was hidden but may come back (tab switch, app backgrounded).
    Hidden,
    /// The view is being destroyed (page unload, window close).
    Unloading,
    /// The notifications view itself was left through normal navigation.
    ViewTeardown,
}

pub trait LifecycleSource: Send {
    /// `None` once the host will deliver no further events.
    fn next_event(&mut self) -> BoxFuture<'_, Option<LifecycleEvent>>;
}
