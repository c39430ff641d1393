pub mod action;
pub mod question;
pub mod settings;
pub mod stats;

pub use action::{LearnEvent, LearnKind, PageAction};
pub use question::{ExerciseMode, QuestionRecord};
pub use settings::Settings;
pub use stats::{Stats, StoreStats};
