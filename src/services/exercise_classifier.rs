//! 练习模式识别
//!
//! 按优先级判断：选项数量先于输入框判断，避免带有零散输入框的选择题被误判为填写题

use tracing::debug;

use crate::dom::patterns::{GAME_CONTAINERS, TEST_CONTAINERS};
use crate::dom::PageTree;
use crate::models::ExerciseMode;
use crate::services::candidates::{collect_options, text_inputs};
use crate::services::vocabulary::extract_word_pairs;

const MIN_SELECTION_OPTIONS: usize = 2;

/// 练习模式识别
pub struct ExerciseClassifier;

impl ExerciseClassifier {
    pub fn classify<T: PageTree + ?Sized>(tree: &T) -> ExerciseMode {
        let mode = Self::detect(tree);
        debug!("练习模式: {}", mode);
        mode
    }

    fn detect<T: PageTree + ?Sized>(tree: &T) -> ExerciseMode {
        if collect_options(tree).len() >= MIN_SELECTION_OPTIONS {
            return ExerciseMode::Selection;
        }
        if !text_inputs(tree).is_empty() {
            return ExerciseMode::Typing;
        }
        if tree.query_first(&GAME_CONTAINERS).is_some() {
            return ExerciseMode::Game;
        }
        if tree.query_first(&TEST_CONTAINERS).is_some() {
            return ExerciseMode::Test;
        }
        if !extract_word_pairs(tree).is_empty() {
            return ExerciseMode::Vocabulary;
        }
        ExerciseMode::None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::SnapshotBuilder;

    #[test]
    fn test_selection_beats_stray_input() {
        let mut builder = SnapshotBuilder::new();
        builder.element(0, "input", &[("type", "text")], "");
        builder.element(0, "button", &[("class", "choice")], "cat");
        builder.element(0, "button", &[("class", "choice")], "dog");
        let tree = builder.build();

        assert_eq!(ExerciseClassifier::classify(&tree), ExerciseMode::Selection);
    }

    #[test]
    fn test_single_option_with_input_is_typing() {
        let mut builder = SnapshotBuilder::new();
        builder.element(0, "textarea", &[], "");
        builder.element(0, "button", &[("class", "choice")], "cat");
        let tree = builder.build();

        assert_eq!(ExerciseClassifier::classify(&tree), ExerciseMode::Typing);
    }

    #[test]
    fn test_containers() {
        let mut builder = SnapshotBuilder::new();
        builder.element(0, "div", &[("class", "memory-game")], "");
        assert_eq!(ExerciseClassifier::classify(&builder.build()), ExerciseMode::Game);

        let mut builder = SnapshotBuilder::new();
        builder.element(0, "section", &[("class", "quiz-panel")], "");
        assert_eq!(ExerciseClassifier::classify(&builder.build()), ExerciseMode::Test);
    }

    #[test]
    fn test_vocabulary_and_none() {
        let mut builder = SnapshotBuilder::new();
        let dl = builder.element(0, "dl", &[], "");
        builder.element(dl, "dt", &[], "Maus");
        builder.element(dl, "dd", &[], "mouse");
        assert_eq!(
            ExerciseClassifier::classify(&builder.build()),
            ExerciseMode::Vocabulary
        );

        let mut builder = SnapshotBuilder::new();
        builder.element(0, "p", &[], "Willkommen");
        assert_eq!(ExerciseClassifier::classify(&builder.build()), ExerciseMode::None);
    }
}
