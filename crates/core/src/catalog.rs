use std::sync::Arc;

use chrono::NaiveDate;

use crate::error::Error;
use crate::model::{
    Activity, ActivityDraft, ActivityId, ActivityKind, Announcement, AnnouncementId, Exam, ExamId,
    Lesson, LessonId, LessonLevel, Priority, Question, QuestionId, User, UserId, UserRole,
};

/// Read-only portal content: members, lessons, exams, activities and notices.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    users: Vec<User>,
    lessons: Vec<Lesson>,
    exams: Vec<Arc<Exam>>,
    activities: Vec<Activity>,
    announcements: Vec<Announcement>,
}

impl Catalog {
    #[must_use]
    pub fn new(
        users: Vec<User>,
        lessons: Vec<Lesson>,
        exams: Vec<Exam>,
        activities: Vec<Activity>,
        announcements: Vec<Announcement>,
    ) -> Self {
        Self {
            users,
            lessons,
            exams: exams.into_iter().map(Arc::new).collect(),
            activities,
            announcements,
        }
    }

    #[must_use]
    pub fn users(&self) -> &[User] {
        &self.users
    }

    #[must_use]
    pub fn lessons(&self) -> &[Lesson] {
        &self.lessons
    }

    #[must_use]
    pub fn exams(&self) -> &[Arc<Exam>] {
        &self.exams
    }

    #[must_use]
    pub fn activities(&self) -> &[Activity] {
        &self.activities
    }

    #[must_use]
    pub fn announcements(&self) -> &[Announcement] {
        &self.announcements
    }

    #[must_use]
    pub fn user(&self, id: &UserId) -> Option<&User> {
        self.users.iter().find(|u| u.id() == id)
    }

    #[must_use]
    pub fn lesson(&self, id: &LessonId) -> Option<&Lesson> {
        self.lessons.iter().find(|l| l.id() == id)
    }

    /// Shared handle to an exam, ready to hand to the engine.
    #[must_use]
    pub fn exam(&self, id: &ExamId) -> Option<Arc<Exam>> {
        self.exams.iter().find(|e| e.id() == id).cloned()
    }

    #[must_use]
    pub fn activity(&self, id: &ActivityId) -> Option<&Activity> {
        self.activities.iter().find(|a| a.id() == id)
    }

    /// The demo content the portal ships with.
    ///
    /// # Errors
    ///
    /// Returns `Error` if any of the built-in records fails validation.
    pub fn sample() -> Result<Self, Error> {
        let users = vec![
            User::new(
                UserId::new("u1"),
                "John Miller",
                "john.miller@sda.org",
                UserRole::Member,
                date(2023, 1, 15)?,
            )?
            .with_avatar("https://picsum.photos/seed/john/200")?
            .with_progress(65)?,
            User::new(
                UserId::new("u2"),
                "Director Sarah",
                "sarah@sda.org",
                UserRole::AyLeader,
                date(2023, 1, 15)?,
            )?
            .with_progress(100)?,
        ];

        let lessons = vec![
            Lesson::new(
                LessonId::new("l1"),
                "The Great Disappointment",
                "Understanding the events of October 22, 1844 and how they shaped our faith.",
                "The Millerites expected Jesus to return in 1844. When He did not, it led to a period of intense Bible study...",
                LessonLevel::Senior,
                "Heritage",
                2024,
            )?
            .with_video_url("https://www.youtube.com/embed/dQw4w9WgXcQ")?,
            Lesson::new(
                LessonId::new("l2"),
                "Pioneers: James and Ellen White",
                "Exploring the lives of our co-founders and their mission.",
                "Ellen G. White was a prolific author and visionary whose writings continue to guide the church...",
                LessonLevel::Senior,
                "Biography",
                2024,
            )?,
            Lesson::new(
                LessonId::new("l3"),
                "Sabbath Reform in the 19th Century",
                "How the early believers discovered the seventh-day Sabbath.",
                "Through study with Seventh Day Baptists, Rachel Oakes Preston introduced the Sabbath truth...",
                LessonLevel::Junior,
                "Doctrines",
                2023,
            )?,
        ];

        let activities = vec![
            ActivityDraft {
                id: ActivityId::new("a1"),
                title: "Regional Youth Camp 2024".into(),
                description: "A week of spiritual revival and outdoor skills at Pine Lake.".into(),
                date: date(2024, 7, 15)?,
                location: "Pine Lake Conference Center".into(),
                capacity: 200,
                registered_count: 145,
                requirements: vec!["Full Uniform".into(), "Bible".into(), "Camping Gear".into()],
                kind: ActivityKind::Camp,
            }
            .validate()?,
            ActivityDraft {
                id: ActivityId::new("a2"),
                title: "City-Wide Community Clean-up".into(),
                description: "Living the gospel through service to our neighbors.".into(),
                date: date(2024, 4, 20)?,
                location: "Main St Community Park".into(),
                capacity: 50,
                registered_count: 22,
                requirements: vec!["Service T-shirt".into(), "Water Bottle".into()],
                kind: ActivityKind::Outreach,
            }
            .validate()?,
        ];

        let announcements = vec![
            Announcement::new(
                AnnouncementId::new("an1"),
                "AY Heritage Exam Next Sabbath",
                "Please ensure you have completed Lesson 1-5 before taking the exam.",
                date(2024, 3, 25)?,
                "Pastor Sam",
                Priority::High,
            ),
            Announcement::new(
                AnnouncementId::new("an2"),
                "Uniform Inspection Reminder",
                "Pathfinders, please have your Class A uniforms ready for inspection.",
                date(2024, 3, 22)?,
                "Director Sarah",
                Priority::Normal,
            ),
        ];

        let exams = vec![
            Exam::new(
                ExamId::new("e1"),
                "Adventist History 101",
                LessonId::new("l1"),
                vec![
                    Question::new(
                        QuestionId::new("q1"),
                        "Who is considered the primary visionary among the SDA pioneers?",
                        ["William Miller", "James White", "Ellen White", "Joseph Bates"],
                        2,
                    )?,
                    Question::new(
                        QuestionId::new("q2"),
                        "In what year was the Seventh-day Adventist Church officially organized?",
                        ["1844", "1863", "1888", "1901"],
                        1,
                    )?,
                ],
                70,
            )?
            .with_time_limit(15)
            .with_attempts_allowed(3),
        ];

        Ok(Self::new(users, lessons, exams, activities, announcements))
    }
}

fn date(year: i32, month: u32, day: u32) -> Result<NaiveDate, Error> {
    NaiveDate::from_ymd_opt(year, month, day).ok_or(Error::InvalidDate { year, month, day })
}
