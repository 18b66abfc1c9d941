use crate::types::{Notification, NotificationId};

pub const DEFAULT_VISIBILITY_THRESHOLD: f32 = 0.5;

type VisibleCallback = Box<dyn FnOnce(NotificationId) + Send>;

/// One-shot observer for a single rendered notification card.
///
/// The host feeds intersection ratios through [`VisibilityTracker::observe`].
/// The first ratio at or above the threshold invokes the callback with the
/// notification id; after that the tracker is disengaged for good. Trackers
/// built for already-read notifications start disengaged.
pub struct VisibilityTracker {
    id: NotificationId,
    threshold: f32,
    on_visible: Option<VisibleCallback>,
}

impl VisibilityTracker {
    pub fn attach<F>(notification: &Notification, threshold: f32, on_visible: F) -> Self
    where
        F: FnOnce(NotificationId) + Send + 'static,
    {
        let on_visible: Option<VisibleCallback> = if notification.read {
            None
        } else {
            Some(Box::new(on_visible))
        };
        Self {
            id: notification.id.clone(),
            threshold,
            on_visible,
        }
    }

    pub fn id(&self) -> &NotificationId {
        &self.id
    }

    pub fn is_engaged(&self) -> bool {
        self.on_visible.is_some()
    }

    /// Returns `true` only for the observation that fired the callback.
    pub fn observe(&mut self, visible_ratio: f32) -> bool {
        // NaN never crosses the threshold.
        if !(visible_ratio >= self.threshold) {
            return false;
        }
        match self.on_visible.take() {
            Some(on_visible) => {
                on_visible(self.id.clone());
                true
            }
            None => false,
        }
    }

    pub fn detach(&mut self) {
        self.on_visible = None;
    }
}

impl std::fmt::Debug for VisibilityTracker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VisibilityTracker")
            .field("id", &self.id)
            .field("threshold", &self.threshold)
            .field("engaged", &self.is_engaged())
            .finish()
    }
}

#[cfg(test)]
#[allow(non_snake_case)]
mod tests {
    use super::*;
    use crate::test_support::notification;
    use std::sync::{Arc, Mutex};

    fn recording() -> (
        Arc<Mutex<Vec<NotificationId>>>,
        impl FnOnce(NotificationId) + Send + 'static,
    ) {
        let fired = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&fired);
        (fired, move |id| sink.lock().expect("fired lock").push(id))
    }

    #[test]
    fn observe__should_fire_once_at_threshold() {
        // Given
        let (fired, callback) = recording();
        let mut tracker = VisibilityTracker::attach(
            &notification("7", false, 5),
            DEFAULT_VISIBILITY_THRESHOLD,
            callback,
        );

        // When
        let below = tracker.observe(0.49);
        let at = tracker.observe(0.5);
        let out = tracker.observe(0.0);
        let back_in = tracker.observe(1.0);

        // Then
        assert!(!below);
        assert!(at);
        assert!(!out);
        assert!(!back_in);
        assert!(!tracker.is_engaged());
        assert_eq!(
            *fired.lock().expect("fired lock"),
            vec![NotificationId::from("7")]
        );
    }

    #[test]
    fn attach__should_be_inert_for_read_notifications() {
        // Given
        let (fired, callback) = recording();

        // When
        let mut tracker = VisibilityTracker::attach(
            &notification("8", true, 5),
            DEFAULT_VISIBILITY_THRESHOLD,
            callback,
        );
        let fired_now = tracker.observe(1.0);

        // Then
        assert!(!tracker.is_engaged());
        assert!(!fired_now);
        assert!(fired.lock().expect("fired lock").is_empty());
    }

    #[test]
    fn observe__should_ignore_nan_ratios() {
        // Given
        let (fired, callback) = recording();
        let mut tracker = VisibilityTracker::attach(&notification("9", false, 5), 0.5, callback);

        // When
        let fired_now = tracker.observe(f32::NAN);

        // Then
        assert!(!fired_now);
        assert!(tracker.is_engaged());
        assert!(fired.lock().expect("fired lock").is_empty());
    }

    #[test]
    fn observe__should_compare_out_of_range_ratios_as_given() {
        // Given
        let (fired, callback) = recording();
        let mut tracker = VisibilityTracker::attach(&notification("11", false, 5), 0.5, callback);

        // When
        let negative = tracker.observe(-0.2);
        let overshoot = tracker.observe(1.5);

        // Then
        assert!(!negative);
        assert!(overshoot);
        assert_eq!(fired.lock().expect("fired lock").len(), 1);
    }

    #[test]
    fn detach__should_prevent_later_callbacks() {
        // Given
        let (fired, callback) = recording();
        let mut tracker = VisibilityTracker::attach(&notification("10", false, 5), 0.5, callback);

        // When
        tracker.detach();
        tracker.observe(1.0);

        // Then
        assert!(fired.lock().expect("fired lock").is_empty());
    }
}
