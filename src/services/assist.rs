//! 提示规划
//!
//! 根据练习模式与已学到的词对，生成渲染层需要执行的写操作和提示文本。
//! 本模块只产出描述，不直接修改页面

use crate::dom::PageTree;
use crate::models::{ExerciseMode, PageAction, Settings};
use crate::services::candidates::{active_input, collect_options, input_text};
use crate::store::WordStore;
use crate::utils::normalize;

/// 一次处理得到的帮助
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Assistance {
    pub actions: Vec<PageAction>,
    pub hint: Option<String>,
}

impl Assistance {
    pub fn is_empty(&self) -> bool {
        self.actions.is_empty() && self.hint.is_none()
    }
}

/// 为当前题目规划帮助
pub fn plan_actions<T: PageTree + ?Sized>(
    tree: &T,
    mode: ExerciseMode,
    question: Option<&str>,
    store: &WordStore,
    settings: Settings,
) -> Assistance {
    let mut assistance = Assistance::default();
    let Some(question) = question else {
        return assistance;
    };
    let Some(known) = store.lookup(question).filter(|known| !known.is_empty()) else {
        return assistance;
    };

    match mode {
        ExerciseMode::Selection if settings.auto_highlight => {
            for option in collect_options(tree) {
                if known.contains(&normalize(&option.text)) {
                    assistance.actions.push(PageAction::Highlight { node: option.node });
                }
            }
        }
        ExerciseMode::Typing if settings.auto_answer => {
            if let Some(input) = active_input(tree) {
                if input_text(tree, input).is_empty() {
                    assistance.actions.push(PageAction::SetInputValue {
                        node: input,
                        text: known[0].clone(),
                    });
                }
            }
        }
        _ => {}
    }

    if settings.show_hints {
        assistance.hint = Some(format!("{} → {}", question, known.join(", ")));
    }
    assistance
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::SnapshotBuilder;

    fn store() -> WordStore {
        let mut store = WordStore::new();
        store.add("Katze", "cat");
        store
    }

    #[test]
    fn test_highlights_known_option() {
        let mut builder = SnapshotBuilder::new();
        builder.element(0, "li", &[("class", "option")], "dog");
        let cat = builder.element(0, "li", &[("class", "option")], "Cat");
        let tree = builder.build();

        let assistance = plan_actions(
            &tree,
            ExerciseMode::Selection,
            Some("Katze"),
            &store(),
            Settings::default(),
        );
        assert_eq!(assistance.actions, vec![PageAction::Highlight { node: cat }]);
        assert_eq!(assistance.hint.as_deref(), Some("Katze → cat"));
    }

    #[test]
    fn test_fills_empty_input_only_when_enabled() {
        let mut builder = SnapshotBuilder::new();
        let input = builder.element(0, "input", &[("type", "text")], "");
        builder.edit(input, |node| node.value = Some(String::new()));
        let tree = builder.build();

        let quiet = Settings {
            show_hints: false,
            ..Settings::default()
        };
        assert!(plan_actions(&tree, ExerciseMode::Typing, Some("Katze"), &store(), quiet).is_empty());

        let eager = Settings {
            auto_answer: true,
            ..quiet
        };
        let assistance = plan_actions(&tree, ExerciseMode::Typing, Some("Katze"), &store(), eager);
        assert_eq!(
            assistance.actions,
            vec![PageAction::SetInputValue {
                node: input,
                text: "cat".to_string()
            }]
        );
    }

    #[test]
    fn test_unknown_question_gets_nothing() {
        let tree = SnapshotBuilder::new().build();
        assert!(plan_actions(
            &tree,
            ExerciseMode::Selection,
            Some("Vogel"),
            &store(),
            Settings::default()
        )
        .is_empty());
    }
}
