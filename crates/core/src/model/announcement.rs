use chrono::NaiveDate;

use crate::model::ids::AnnouncementId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Priority {
    Low,
    Normal,
    High,
}

/// A notice shown on the dashboard.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Announcement {
    pub id: AnnouncementId,
    pub title: String,
    pub content: String,
    pub date: NaiveDate,
    pub author: String,
    pub priority: Priority,
}

impl Announcement {
    #[must_use]
    pub fn new(
        id: AnnouncementId,
        title: impl Into<String>,
        content: impl Into<String>,
        date: NaiveDate,
        author: impl Into<String>,
        priority: Priority,
    ) -> Self {
        Self {
            id,
            title: title.into(),
            content: content.into(),
            date,
            author: author.into(),
            priority,
        }
    }

    #[must_use]
    pub fn is_urgent(&self) -> bool {
        self.priority == Priority::High
    }
}
