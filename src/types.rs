pub mod notification;

pub use notification::{BulkReadRequest, Category, Notification, NotificationId, UnreadCount};
