mod cache;
mod counter;

pub use cache::NotificationCache;
pub use counter::UnreadCounter;

/// Per-login notification state.
///
/// Created when the user's session starts and handed by reference (clone) to
/// every component that reads or mutates it. Navigating away from the
/// notifications view keeps it alive; only [`NotificationSession::dispose`]
/// at logout tears it down.
#[derive(Debug, Clone, Default)]
pub struct NotificationSession {
    cache: NotificationCache,
    counter: UnreadCounter,
}

impl NotificationSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cache(&self) -> &NotificationCache {
        &self.cache
    }

    pub fn counter(&self) -> &UnreadCounter {
        &self.counter
    }

    pub fn dispose(self) {
        let dropped = self.cache.clear();
        self.counter.set(0);
        tracing::debug!(dropped, "notification session disposed");
    }
}

#[cfg(test)]
#[allow(non_snake_case)]
mod tests {
    use super::*;
    use crate::test_support::notification;

    #[test]
    fn dispose__should_reset_state_seen_by_other_handles() {
        // Given
        let session = NotificationSession::new();
        session
            .cache()
            .replace(vec![notification("1", false, 5), notification("2", false, 6)]);
        session.counter().set(2);
        let badge = session.counter().clone();
        let cache = session.cache().clone();

        // When
        session.dispose();

        // Then
        assert_eq!(badge.get(), 0);
        assert!(cache.is_empty());
    }
}
