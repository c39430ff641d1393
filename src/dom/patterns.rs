//! 固定选择器列表
//!
//! 列表顺序即优先级。无法解析的条目在初始化时跳过。
//! 会出现否定形式的类名（`incorrect-answer`、`unselected`）只按整词匹配

use once_cell::sync::Lazy;

use crate::dom::selector::Selector;

/// 题目候选（题目类名优先，其次标题，最后强调标签）
pub static PROMINENT_QUESTION: Lazy<Vec<Selector>> = Lazy::new(|| {
    Selector::parse_lossy(&[
        "[data-question]",
        ".question-text",
        "[class*=question]",
        "[class*=word]",
        "[class*=prompt]",
        "[class*=vocab]",
        "h1",
        "h2",
        "h3",
        "strong",
        "b",
        "em",
    ])
});

/// 选择题选项
pub static ANSWER_OPTIONS: Lazy<Vec<Selector>> = Lazy::new(|| {
    Selector::parse_lossy(&[
        "[class*=option]",
        "[class*=choice]",
        "[class*=answer-item]",
        "li[class*=answer]",
        "button[class*=answer]",
        "[role=radio]",
        "[role=option]",
        "[data-option]",
    ])
});

/// 可输入文本的节点（`input` 无 type 属性的情况在代码中单独判断）
pub static TEXT_INPUTS: Lazy<Vec<Selector>> = Lazy::new(|| {
    Selector::parse_lossy(&[
        "input[type=text]",
        "input[type=search]",
        "textarea",
        "[contenteditable=true]",
    ])
});

/// 游戏容器
pub static GAME_CONTAINERS: Lazy<Vec<Selector>> =
    Lazy::new(|| Selector::parse_lossy(&["[data-game]", "[class*=game]", "[id*=game]"]));

/// 测验容器
pub static TEST_CONTAINERS: Lazy<Vec<Selector>> = Lazy::new(|| {
    Selector::parse_lossy(&[
        "[data-test]",
        "[class*=quiz]",
        "[class*=test-container]",
        "[class*=exam]",
        "[id*=test]",
    ])
});

/// 通用反馈容器（用于文本判定）
pub static FEEDBACK_CONTAINERS: Lazy<Vec<Selector>> = Lazy::new(|| {
    Selector::parse_lossy(&[
        "[class*=feedback]",
        "[role=alert]",
        "[aria-live]",
        "[class*=result]",
        "[class*=message]",
    ])
});

/// 回答正确的反馈
pub static CORRECT_FEEDBACK: Lazy<Vec<Selector>> = Lazy::new(|| {
    Selector::parse_lossy(&[
        "[data-feedback=correct]",
        "[data-result=correct]",
        "[class*=feedback][class~=correct]",
        "[class*=feedback][class*=success]",
        "[class*=result][class~=correct]",
        ".alert-success",
        "[class~=success-message]",
    ])
});

/// 回答错误的反馈
pub static INCORRECT_FEEDBACK: Lazy<Vec<Selector>> = Lazy::new(|| {
    Selector::parse_lossy(&[
        "[data-feedback=incorrect]",
        "[data-feedback=wrong]",
        "[data-result=wrong]",
        "[class*=feedback][class*=incorrect]",
        "[class*=feedback][class*=wrong]",
        "[class*=result][class*=incorrect]",
        ".alert-danger",
        "[class~=error-message]",
    ])
});

/// 被高亮 / 选中的节点
pub static HIGHLIGHTED: Lazy<Vec<Selector>> = Lazy::new(|| {
    Selector::parse_lossy(&[
        "[class~=selected]",
        "[class*=highlight]",
        "[class*=chosen]",
        "[aria-selected=true]",
        "[aria-checked=true]",
    ])
});

/// 标记为正确的节点
pub static CORRECT_LIKE: Lazy<Vec<Selector>> = Lazy::new(|| {
    Selector::parse_lossy(&[
        "[class~=correct]",
        "[class*=is-correct]",
        "[class~=correct-option]",
        "[class~=right]",
        "[data-correct=true]",
        "[data-is-correct=true]",
    ])
});

/// 通用激活 / 选中状态
pub static ACTIVE_SELECTED: Lazy<Vec<Selector>> = Lazy::new(|| {
    Selector::parse_lossy(&[
        "[class~=selected]",
        "[class*=is-selected]",
        "[class~=active]",
        "[aria-selected=true]",
        "[aria-checked=true]",
        "[aria-pressed=true]",
    ])
});

/// 显式公布正确答案的节点
pub static REVEALED_ANSWER: Lazy<Vec<Selector>> = Lazy::new(|| {
    Selector::parse_lossy(&[
        "[data-correct-answer]",
        "[class~=correct-answer]",
        "[class~=right-answer]",
        "[class*=revealed]",
        "[class*=solution]",
    ])
});

/// 词汇表中的一行（词 + 译文）
pub static VOCAB_ROWS: Lazy<Vec<Selector>> = Lazy::new(|| {
    Selector::parse_lossy(&[
        "[class*=pair]",
        "[class*=vocab-item]",
        "[class*=word-row]",
        "[class*=flashcard]",
    ])
});

/// 词汇行中的原词
pub static VOCAB_SOURCE: Lazy<Vec<Selector>> = Lazy::new(|| {
    Selector::parse_lossy(&[
        "[class*=term]",
        "[class*=source]",
        "[class*=original]",
        "[class*=front]",
        "[class~=word]",
    ])
});

/// 词汇行中的译文
pub static VOCAB_TARGET: Lazy<Vec<Selector>> = Lazy::new(|| {
    Selector::parse_lossy(&[
        "[class*=translation]",
        "[class*=meaning]",
        "[class*=definition]",
        "[class*=target]",
        "[class*=back]",
    ])
});
