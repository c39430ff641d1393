//! 文本工具
//!
//! 归一化与字符统计，供 WordStore / TextScorer / UI 过滤共用

/// 归一化：去首尾空白、小写、内部空白折叠为单个空格
///
/// 幂等：`normalize(&normalize(x)) == normalize(x)`
pub fn normalize(text: &str) -> String {
    text.split_whitespace()
        .map(|part| part.to_lowercase())
        .collect::<Vec<_>>()
        .join(" ")
}

/// 字母数量（含带变音符号的字母）
pub fn letter_count(text: &str) -> usize {
    text.chars().filter(|c| c.is_alphabetic()).count()
}

/// 数字数量（仅 ASCII 数字）
pub fn digit_count(text: &str) -> usize {
    text.chars().filter(|c| c.is_ascii_digit()).count()
}

/// 是否为纯数字
pub fn is_pure_digits(text: &str) -> bool {
    let trimmed = text.trim();
    !trimmed.is_empty() && trimmed.chars().all(|c| c.is_ascii_digit())
}

/// 是否包含 10 位及以上的连续数字（时间戳、编号等）
pub fn has_long_numeral(text: &str) -> bool {
    let mut run = 0usize;
    for c in text.chars() {
        if c.is_ascii_digit() {
            run += 1;
            if run >= 10 {
                return true;
            }
        } else {
            run = 0;
        }
    }
    false
}

/// 截断长文本用于日志显示
pub fn truncate_text(text: &str, max_len: usize) -> String {
    if text.chars().count() > max_len {
        text.chars().take(max_len).collect::<String>() + "..."
    } else {
        text.to_string()
    }
}
