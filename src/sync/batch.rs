use crate::types::NotificationId;

use std::collections::HashSet;

/// Ids seen by the user and optimistically marked read, not yet acknowledged
/// by the service.
///
/// Membership is a set; `drain` hands ids back in first-seen order.
#[derive(Debug, Default)]
pub struct PendingBatch {
    order: Vec<NotificationId>,
    members: HashSet<NotificationId>,
}

impl PendingBatch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `false` when the id was already pending.
    pub fn add(&mut self, id: NotificationId) -> bool {
        if !self.members.insert(id.clone()) {
            return false;
        }
        self.order.push(id);
        true
    }

    /// Returns `false` when the id was not pending.
    pub fn remove(&mut self, id: &NotificationId) -> bool {
        if !self.members.remove(id) {
            return false;
        }
        self.order.retain(|pending| pending != id);
        true
    }

    pub fn contains(&self, id: &NotificationId) -> bool {
        self.members.contains(id)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn ids(&self) -> &[NotificationId] {
        &self.order
    }

    /// Takes every pending id and leaves the batch empty.
    pub fn drain(&mut self) -> Vec<NotificationId> {
        self.members.clear();
        std::mem::take(&mut self.order)
    }

    pub fn clear(&mut self) {
        self.members.clear();
        self.order.clear();
    }
}
