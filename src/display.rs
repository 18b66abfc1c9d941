use crate::types::{Category, Notification};

use time::macros::format_description;
use time::{Duration, OffsetDateTime};

impl Category {
    pub fn label(self) -> &'static str {
        match self {
            Category::ApplicationUpdate => "Application update",
            Category::JobAlert => "Job alert",
            Category::Reminder => "Reminder",
            Category::System => "System",
            Category::Announcement => "Announcement",
        }
    }

    pub fn icon(self) -> &'static str {
        match self {
            Category::ApplicationUpdate => "briefcase",
            Category::JobAlert => "bell",
            Category::Reminder => "calendar",
            Category::System => "settings",
            Category::Announcement => "megaphone",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Filter {
    #[default]
    All,
    Unread,
    Category(Category),
}

impl Filter {
    pub fn matches(self, notification: &Notification) -> bool {
        match self {
            Filter::All => true,
            Filter::Unread => !notification.read,
            Filter::Category(category) => notification.category == category,
        }
    }

    pub fn apply(self, notifications: &[Notification]) -> Vec<&Notification> {
        notifications.iter().filter(|n| self.matches(n)).collect()
    }
}

pub fn relative_time(created_at: OffsetDateTime, now: OffsetDateTime) -> String {
    let elapsed = now - created_at;
    if elapsed < Duration::minutes(1) {
        return "just now".to_string();
    }
    if elapsed < Duration::hours(1) {
        return format!("{}m ago", elapsed.whole_minutes());
    }
    if elapsed < Duration::days(1) {
        return format!("{}h ago", elapsed.whole_hours());
    }
    if elapsed < Duration::days(7) {
        return format!("{}d ago", elapsed.whole_days());
    }
    created_at
        .format(format_description!("[year]-[month]-[day]"))
        .unwrap_or_else(|_| created_at.date().to_string())
}

/// One console line per notification. `*` marks unread, `~` marks read
/// locally but still waiting for the service to acknowledge.
pub fn render_line(notification: &Notification, now: OffsetDateTime, pending: bool) -> String {
    let marker = match (notification.read, pending) {
        (false, _) => '*',
        (true, true) => '~',
        (true, false) => ' ',
    };
    format!(
        "{marker} {:<10} {:<18} {:>10}  {}: {}",
        notification.id.as_str(),
        notification.category.label(),
        relative_time(notification.created_at, now),
        notification.title,
        notification.message
    )
}
