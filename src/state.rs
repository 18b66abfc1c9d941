use crate::backend::InMemoryNotificationStore;

use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub store: InMemoryNotificationStore,
    pub session_token: Option<Arc<str>>,
}

impl AppState {
    pub fn new(store: InMemoryNotificationStore, session_token: Option<&str>) -> Self {
        Self {
            store,
            session_token: session_token.map(Arc::from),
        }
    }
}
