use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};

use crate::data_types::{LearningEvent, LearningEventType};

const USER_ID: &str = "user123";
const PATH_ID: &str = "pathA";
const COURSE_ID: &str = "courseB";
const LESSON_ID: &str = "lesson1";

/// The fixed sequence sent on every run: one lesson being started and then
/// completed ten minutes later.
pub fn lesson_sequence() -> Vec<LearningEvent> {
    const STARTED_AT: NaiveDateTime = at(2025, 1, 26, 10, 0);
    const COMPLETED_AT: NaiveDateTime = at(2025, 1, 26, 10, 10);

    vec![
        lesson_event(LearningEventType::LessonStarted, STARTED_AT.and_utc()),
        lesson_event(LearningEventType::LessonCompleted, COMPLETED_AT.and_utc()),
    ]
}

fn lesson_event(event_type: LearningEventType, occurred_at: DateTime<Utc>) -> LearningEvent {
    LearningEvent::new(
        event_type,
        USER_ID,
        PATH_ID,
        COURSE_ID,
        LESSON_ID,
        occurred_at,
    )
}

/// Evaluated in const context, so an invalid literal fails the build.
const fn at(year: i32, month: u32, day: u32, hour: u32, min: u32) -> NaiveDateTime {
    let date = match NaiveDate::from_ymd_opt(year, month, day) {
        Some(date) => date,
        None => panic!("invalid fixture date"),
    };
    let time = match NaiveTime::from_hms_opt(hour, min, 0) {
        Some(time) => time,
        None => panic!("invalid fixture time"),
    };
    NaiveDateTime::new(date, time)
}
