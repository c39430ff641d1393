//! 界面文本过滤
//!
//! 题目发现、选项过滤、词库写入共用同一套拒绝规则，避免把导航、反馈和本工具自身的界面文字学进词库

use tracing::trace;

use crate::utils::text::{digit_count, has_long_numeral, is_pure_digits, letter_count};

/// 固定的界面短语（英语 + 捷克语），已是小写且只含字母与空格
static UI_PHRASES: phf::Set<&'static str> = phf::phf_set! {
    // 导航
    "ok", "next", "continue", "check", "submit", "skip", "back", "previous",
    "start", "restart", "finish", "done", "close", "cancel", "save", "menu",
    "home", "settings", "help", "hint", "hints", "login", "log in", "sign in",
    "sign up", "logout", "loading", "score", "points", "progress", "level",
    "lesson", "exercise",
    "další", "pokračovat", "zkontrolovat", "odeslat", "přeskočit", "zpět",
    "předchozí", "začít", "dokončit", "hotovo", "zavřít", "zrušit", "uložit",
    "nabídka", "domů", "nastavení", "nápověda", "přihlásit", "odhlásit",
    "načítání", "skóre", "pokrok", "úroveň", "lekce", "cvičení",
    // 反馈
    "correct", "incorrect", "wrong", "right answer", "correct answer",
    "try again", "well done", "great job", "good job", "excellent",
    "show answer", "your answer", "type your answer",
    "choose the correct answer", "select the correct answer",
    "správně", "špatně", "chyba", "nesprávně", "správná odpověď",
    "zkus to znovu", "zkusit znovu", "výborně", "skvěle", "dobře",
    "zobrazit odpověď", "tvoje odpověď", "vyber správnou odpověď",
    "napiš odpověď",
    // 本工具界面
    "word learner", "auto highlight", "show hints", "auto answer",
    "words indexed", "answers helped", "export", "import",
    "clear database", "learned",
};

/// 把文本折叠为只含字母、数字与单个空格的小写形式
fn phrase_key(text: &str) -> String {
    text.chars()
        .map(|c| if c.is_alphanumeric() { c } else { ' ' })
        .collect::<String>()
        .split_whitespace()
        .map(|part| part.to_lowercase())
        .collect::<Vec<_>>()
        .join(" ")
}

/// 是否包含某个界面短语（完全相等或整词序列包含）
pub fn matches_ui_phrase(text: &str) -> bool {
    let key = phrase_key(text);
    if UI_PHRASES.contains(key.as_str()) {
        return true;
    }

    let padded = format!(" {} ", key);
    UI_PHRASES
        .iter()
        .any(|phrase| padded.contains(&format!(" {} ", phrase)))
}

/// 判断文本是否属于界面噪声
///
/// 满足任一条件即为 true：纯数字、含 10 位以上数字串、字母少于 2 个、
/// 数字多于字母、命中界面短语表
pub fn is_ui_text(text: &str) -> bool {
    let trimmed = text.trim();

    if is_pure_digits(trimmed) || has_long_numeral(trimmed) {
        return true;
    }

    let letters = letter_count(trimmed);
    if letters < 2 || digit_count(trimmed) > letters {
        return true;
    }

    if matches_ui_phrase(trimmed) {
        trace!("界面短语: {}", trimmed);
        return true;
    }

    false
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_noise() {
        assert!(is_ui_text("123456"));
        assert!(is_ui_text("1700000000000"));
        assert!(is_ui_text("OK"));
        assert!(is_ui_text("next"));
        assert!(is_ui_text("správně"));
        assert!(is_ui_text("Správně!"));
        assert!(is_ui_text("a"));
        assert!(is_ui_text(""));
        assert!(is_ui_text("ab123"));
        assert!(is_ui_text("Lesson 3"));
        assert!(is_ui_text("Well done, keep going"));
    }

    #[test]
    fn test_accepts_words() {
        assert!(!is_ui_text("Haus"));
        assert!(!is_ui_text("dům"));
        assert!(!is_ui_text("magnifique"));
        assert!(!is_ui_text("book"));
        assert!(!is_ui_text("die Katze"));
        assert!(!is_ui_text("Straße 12"));
    }
}
