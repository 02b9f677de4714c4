use std::fmt::Display;

use bytes::Bytes;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The kind of learning action an event describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LearningEventType {
    LessonStarted,
    LessonCompleted,
}

impl LearningEventType {
    /// The tag as it appears on the wire.
    pub fn as_str(&self) -> &'static str {
        match self {
            LearningEventType::LessonStarted => "LESSON_STARTED",
            LearningEventType::LessonCompleted => "LESSON_COMPLETED",
        }
    }
}

impl Display for LearningEventType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A single user-learning action, published as one message.
///
/// Identifiers are opaque strings. Instances are never mutated after
/// construction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LearningEvent {
    event_type: LearningEventType,
    user_id: String,
    path_id: String,
    course_id: String,
    lesson_id: String,
    occurred_at: DateTime<Utc>,
}

impl LearningEvent {
    pub fn new(
        event_type: LearningEventType,
        user_id: impl Into<String>,
        path_id: impl Into<String>,
        course_id: impl Into<String>,
        lesson_id: impl Into<String>,
        occurred_at: DateTime<Utc>,
    ) -> Self {
        Self {
            event_type,
            user_id: user_id.into(),
            path_id: path_id.into(),
            course_id: course_id.into(),
            lesson_id: lesson_id.into(),
            occurred_at,
        }
    }

    /// Encode this event as the UTF-8 JSON object that is sent to the broker.
    pub fn to_payload(&self) -> Result<Bytes, serde_json::Error> {
        serde_json::to_vec(self).map(Bytes::from)
    }

    pub fn event_type(&self) -> LearningEventType {
        self.event_type
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    pub fn path_id(&self) -> &str {
        &self.path_id
    }

    pub fn course_id(&self) -> &str {
        &self.course_id
    }

    pub fn lesson_id(&self) -> &str {
        &self.lesson_id
    }

    pub fn occurred_at(&self) -> DateTime<Utc> {
        self.occurred_at
    }

    #[cfg(test)]
    pub fn test_event(event_type: LearningEventType) -> Self {
        Self::new(
            event_type,
            "user",
            "path",
            "course",
            "lesson",
            DateTime::from_timestamp(1_737_885_600, 0).unwrap(),
        )
    }
}
