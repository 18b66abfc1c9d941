use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use time::OffsetDateTime;

/// Opaque, stable identifier assigned by the notification service.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NotificationId(String);

impl NotificationId {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NotificationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for NotificationId {
    fn from(raw: &str) -> Self {
        Self(raw.to_string())
    }
}

impl From<String> for NotificationId {
    fn from(raw: String) -> Self {
        Self(raw)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Category {
    ApplicationUpdate,
    JobAlert,
    Reminder,
    System,
    Announcement,
}

impl Category {
    pub const ALL: [Category; 5] = [
        Category::ApplicationUpdate,
        Category::JobAlert,
        Category::Reminder,
        Category::System,
        Category::Announcement,
    ];

    pub fn tag(self) -> &'static str {
        match self {
            Category::ApplicationUpdate => "application-update",
            Category::JobAlert => "job-alert",
            Category::Reminder => "reminder",
            Category::System => "system",
            Category::Announcement => "announcement",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

impl FromStr for Category {
    type Err = String;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let normalized = raw.trim().to_ascii_lowercase().replace('_', "-");
        Category::ALL
            .into_iter()
            .find(|category| category.tag() == normalized)
            .ok_or_else(|| {
                format!(
                    "unknown category '{raw}'; expected one of application-update, job-alert, reminder, system, announcement"
                )
            })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub id: NotificationId,
    #[serde(rename = "type")]
    pub category: Category,
    pub title: String,
    pub message: String,
    pub read: bool,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action_url: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnreadCount {
    pub count: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BulkReadRequest {
    pub ids: Vec<NotificationId>,
}

#[cfg(test)]
#[allow(non_snake_case)]
mod tests {
    use super::*;
    use time::macros::datetime;

    #[test]
    fn category__should_parse_tags_and_aliases() {
        assert_eq!("job-alert".parse::<Category>(), Ok(Category::JobAlert));
        assert_eq!(
            "Application_Update".parse::<Category>(),
            Ok(Category::ApplicationUpdate)
        );
        assert!("promotion".parse::<Category>().is_err());
    }

    #[test]
    fn notification__should_use_camel_case_wire_format() {
        // Given
        let notification = Notification {
            id: NotificationId::from("n-1"),
            category: Category::Reminder,
            title: "Interview tomorrow".to_string(),
            message: "Prepare your portfolio".to_string(),
            read: false,
            created_at: datetime!(2025-01-12 09:30:00 UTC),
            action_url: Some("/jobs/42".to_string()),
        };

        // When
        let value = serde_json::to_value(&notification).expect("serialize");

        // Then
        assert_eq!(value["id"], "n-1");
        assert_eq!(value["type"], "reminder");
        assert_eq!(value["createdAt"], "2025-01-12T09:30:00Z");
        assert_eq!(value["actionUrl"], "/jobs/42");
        let decoded: Notification = serde_json::from_value(value).expect("deserialize");
        assert_eq!(decoded, notification);
    }

    #[test]
    fn notification__should_default_missing_action_url() {
        // Given
        let raw = r#"{
            "id": "n-2",
            "type": "system",
            "title": "Maintenance",
            "message": "Tonight at 22:00",
            "read": true,
            "createdAt": "2025-01-12T09:30:00Z"
        }"#;

        // When
        let notification: Notification = serde_json::from_str(raw).expect("deserialize");

        // Then
        assert_eq!(notification.action_url, None);
        assert_eq!(notification.category, Category::System);
    }
}
