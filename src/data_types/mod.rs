pub mod event;

pub use event::{LearningEvent, LearningEventType};
