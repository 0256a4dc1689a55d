//! 从译文中推断章节标题。

use regex::Regex;
use std::sync::OnceLock;

const MAX_SCAN_LINES: usize = 3;
const MIN_FALLBACK_CHARS: usize = 6;
const MAX_FALLBACK_CHARS: usize = 99;

static TITLE_PATTERNS: OnceLock<Vec<Regex>> = OnceLock::new();

fn title_patterns() -> &'static [Regex] {
    TITLE_PATTERNS.get_or_init(|| {
        [
            r"(?i)^chapter\s+[0-9]+[:\-\s](.+)$",
            r"^第[0-9零〇一二三四五六七八九十百千万两]+章[:：\-\s](.+)$",
            r"(?i)^ch\.\s*[0-9]+[:\-\s](.+)$",
            r"^[0-9]+[:\-\s](.+)$",
        ]
        .iter()
        .map(|p| Regex::new(p).expect("compile title pattern"))
        .collect()
    })
}

fn leading_lines(text: &str) -> impl Iterator<Item = &str> {
    text.lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .take(MAX_SCAN_LINES)
}

fn looks_like_title(line: &str) -> bool {
    let len = line.chars().count();
    if !(MIN_FALLBACK_CHARS..=MAX_FALLBACK_CHARS).contains(&len) {
        return false;
    }
    line.chars()
        .next()
        .is_some_and(|c| c.is_ascii_uppercase() || c.is_ascii_digit() || c == '第')
}

/// 返回最可能的标题行（整行）；找不到时返回 `None`。
///
/// 先在前 3 个非空行中按模式匹配，全部落空后再按长度与首字符做启发式回退。
pub fn extract_chapter_title(translation: &str) -> Option<String> {
    let patterns = title_patterns();

    if let Some(line) =
        leading_lines(translation).find(|line| patterns.iter().any(|re| re.is_match(line)))
    {
        return Some(line.to_string());
    }

    leading_lines(translation)
        .find(|line| looks_like_title(line))
        .map(str::to_string)
}

/// 手动译文拆分为（标题, 正文）：首个非空行为标题，其余非空行为正文。
pub fn split_manual_translation(text: &str) -> (String, String) {
    let mut lines = text.lines().filter(|l| !l.trim().is_empty());
    let title = lines.next().map(|l| l.trim().to_string()).unwrap_or_default();
    let body = lines.collect::<Vec<_>>().join("\n").trim().to_string();
    (title, body)
}
