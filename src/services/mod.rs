pub mod answer_extractor;
pub mod assist;
pub mod candidates;
pub mod exercise_classifier;
pub mod feedback;
pub mod text_scorer;
pub mod ui_text;
pub mod vocabulary;

pub use answer_extractor::AnswerExtractor;
pub use assist::{plan_actions, Assistance};
pub use exercise_classifier::ExerciseClassifier;
pub use text_scorer::TextScorer;
pub use ui_text::is_ui_text;
pub use vocabulary::extract_word_pairs;
