pub mod pdf_extractor;
pub mod quiz_generator;
pub mod timer;

pub use pdf_extractor::PdfExtractor;
pub use quiz_generator::{QuizGenerator, SOURCE_CHAR_LIMIT};
pub use timer::{format_elapsed, QuizTimer};
