use std::fmt;
use std::str::FromStr;

use thiserror::Error;
use url::Url;

use crate::model::ids::LessonId;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum LessonError {
    #[error("lesson title cannot be empty")]
    EmptyTitle,

    #[error("invalid video URL: {0}")]
    InvalidVideoUrl(String),

    #[error("unknown lesson level: {0}")]
    UnknownLevel(String),
}

/// Age group a lesson targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LessonLevel {
    Junior,
    Senior,
}

impl fmt::Display for LessonLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LessonLevel::Junior => f.write_str("Junior"),
            LessonLevel::Senior => f.write_str("Senior"),
        }
    }
}

impl FromStr for LessonLevel {
    type Err = LessonError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "junior" => Ok(Self::Junior),
            "senior" => Ok(Self::Senior),
            _ => Err(LessonError::UnknownLevel(s.to_owned())),
        }
    }
}

/// A published lesson. Per-member completion is tracked in storage, not here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Lesson {
    id: LessonId,
    title: String,
    description: String,
    content: String,
    level: LessonLevel,
    topic: String,
    year: i32,
    video_url: Option<Url>,
}

impl Lesson {
    /// # Errors
    ///
    /// Returns `LessonError::EmptyTitle` for a blank title.
    pub fn new(
        id: LessonId,
        title: impl Into<String>,
        description: impl Into<String>,
        content: impl Into<String>,
        level: LessonLevel,
        topic: impl Into<String>,
        year: i32,
    ) -> Result<Self, LessonError> {
        let title = title.into().trim().to_owned();
        if title.is_empty() {
            return Err(LessonError::EmptyTitle);
        }
        Ok(Self {
            id,
            title,
            description: description.into(),
            content: content.into(),
            level,
            topic: topic.into(),
            year,
            video_url: None,
        })
    }

    /// Attach an embeddable video.
    ///
    /// # Errors
    ///
    /// Returns `LessonError::InvalidVideoUrl` if `url` does not parse.
    pub fn with_video_url(mut self, url: &str) -> Result<Self, LessonError> {
        let parsed = Url::parse(url).map_err(|_| LessonError::InvalidVideoUrl(url.to_owned()))?;
        self.video_url = Some(parsed);
        Ok(self)
    }

    #[must_use]
    pub fn id(&self) -> &LessonId {
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
    pub fn content(&self) -> &str {
        &self.content
    }

    #[must_use]
    pub fn level(&self) -> LessonLevel {
        self.level
    }

    #[must_use]
    pub fn topic(&self) -> &str {
        &self.topic
    }

    #[must_use]
    pub fn year(&self) -> i32 {
        self.year
    }

    #[must_use]
    pub fn video_url(&self) -> Option<&Url> {
        self.video_url.as_ref()
    }
}
