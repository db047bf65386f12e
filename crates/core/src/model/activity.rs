use chrono::NaiveDate;
use std::fmt;
use thiserror::Error;

use crate::model::ids::ActivityId;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ActivityError {
    #[error("activity title cannot be empty")]
    EmptyTitle,

    #[error("activity location cannot be empty")]
    EmptyLocation,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActivityKind {
    Camp,
    Outreach,
    Drills,
    Pathfinder,
    Social,
}

impl fmt::Display for ActivityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ActivityKind::Camp => "Camp",
            ActivityKind::Outreach => "Outreach",
            ActivityKind::Drills => "Drills",
            ActivityKind::Pathfinder => "Pathfinder",
            ActivityKind::Social => "Social",
        };
        f.write_str(label)
    }
}

/// Unvalidated activity input.
#[derive(Clone, Debug)]
pub struct ActivityDraft {
    pub id: ActivityId,
    pub title: String,
    pub description: String,
    pub date: NaiveDate,
    pub location: String,
    pub capacity: u32,
    pub registered_count: u32,
    pub requirements: Vec<String>,
    pub kind: ActivityKind,
}

impl ActivityDraft {
    /// Validate and normalize the draft into an activity.
    ///
    /// # Errors
    ///
    /// Returns `ActivityError` if the title or location is blank.
    pub fn validate(self) -> Result<Activity, ActivityError> {
        let title = self.title.trim().to_owned();
        if title.is_empty() {
            return Err(ActivityError::EmptyTitle);
        }
        let location = self.location.trim().to_owned();
        if location.is_empty() {
            return Err(ActivityError::EmptyLocation);
        }
        let requirements = self
            .requirements
            .into_iter()
            .map(|req| req.trim().to_owned())
            .filter(|req| !req.is_empty())
            .collect();

        Ok(Activity {
            id: self.id,
            title,
            description: self.description,
            date: self.date,
            location,
            capacity: self.capacity,
            registered_count: self.registered_count,
            requirements,
            kind: self.kind,
        })
    }
}

/// A scheduled ministry event members can register for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Activity {
    id: ActivityId,
    title: String,
    description: String,
    date: NaiveDate,
    location: String,
    capacity: u32,
    registered_count: u32,
    requirements: Vec<String>,
    kind: ActivityKind,
}

impl Activity {
    #[must_use]
    pub fn id(&self) -> &ActivityId {
        &self.id
    }

    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    #[must_use]
    pub fn date(&self) -> NaiveDate {
        self.date
    }

    #[must_use]
    pub fn location(&self) -> &str {
        &self.location
    }

    #[must_use]
    pub fn capacity(&self) -> u32 {
        self.capacity
    }

    #[must_use]
    pub fn registered_count(&self) -> u32 {
        self.registered_count
    }

    #[must_use]
    pub fn requirements(&self) -> &[String] {
        &self.requirements
    }

    #[must_use]
    pub fn kind(&self) -> ActivityKind {
        self.kind
    }

    #[must_use]
    pub fn spots_left(&self) -> u32 {
        self.capacity.saturating_sub(self.registered_count)
    }

    /// Share of capacity already taken, capped at 100. Zero capacity reads as full.
    #[must_use]
    pub fn fill_percent(&self) -> f64 {
        if self.capacity == 0 {
            return 100.0;
        }
        (f64::from(self.registered_count) / f64::from(self.capacity) * 100.0).min(100.0)
    }
}
