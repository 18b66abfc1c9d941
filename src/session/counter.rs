use std::sync::Arc;
use tokio::sync::watch;

/// Optimistic unread count shared with any UI that shows a badge.
///
/// Writes go through `decrement`, `set` and `reconcile` only. Readers either
/// poll `get` or hold a `watch::Receiver` from `subscribe`.
#[derive(Debug, Clone)]
pub struct UnreadCounter {
    value: Arc<watch::Sender<u64>>,
}

impl Default for UnreadCounter {
    fn default() -> Self {
        Self::new(0)
    }
}

impl UnreadCounter {
    pub fn new(initial: u64) -> Self {
        let (sender, _) = watch::channel(initial);
        Self {
            value: Arc::new(sender),
        }
    }

    pub fn get(&self) -> u64 {
        *self.value.borrow()
    }

    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.value.subscribe()
    }

    /// Saturates at zero.
    pub fn decrement(&self) {
        self.value.send_modify(|count| *count = count.saturating_sub(1));
    }

    pub fn set(&self, count: u64) {
        self.value.send_replace(count);
    }

    /// Adopts an authoritative count, minus reads the service has not been
    /// told about yet.
    pub fn reconcile(&self, authoritative: u64, unacknowledged: u64) -> u64 {
        let count = authoritative.saturating_sub(unacknowledged);
        self.set(count);
        count
    }
}
