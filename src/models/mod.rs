pub mod difficulty;
pub mod question;

pub use difficulty::Difficulty;
pub use question::{Question, QuizConfig, OPTIONS_PER_QUESTION, QUESTION_COUNT_OPTIONS};
