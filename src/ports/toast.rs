#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toast {
    pub message: String,
}

impl Toast {
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Transient user-facing notices for failed user actions.
pub trait ToastSink: Clone + Send + Sync + 'static {
    fn show(&self, toast: Toast);
}
