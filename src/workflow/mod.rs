pub mod flow;
pub mod runner;
pub mod session;

pub use flow::QuizFlow;
pub use runner::{AdvanceOutcome, QuizRunner};
pub use session::{accuracy_percent, AppState, QuizSession};
