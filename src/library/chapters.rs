//! 章节列表的定位与修改。
//!
//! 章节号是外部的 1 起始字符串标签。写入类操作把它换算成数组下标（`n - 1`），
//! 只支持“按章节号升序、无缺口、与下标一一对应”的存储顺序；若该位置上的章节号
//! 与标签不符，直接报错而不是改写错误的槽位。删除类操作与阅读页的正文回填
//! 则按章节号的值定位。

use std::collections::HashSet;

use super::error::{LibraryError, Result};
use super::models::Chapter;

/// 可按下标覆盖的章节字段。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChapterField {
    Body,
    Translation,
    TranslatedTitle,
}

pub fn resolve_chapter_index(chapters: &[Chapter], chapter_number: &str) -> Result<usize> {
    let label = chapter_number.trim();
    let n: usize = label
        .parse()
        .map_err(|_| LibraryError::InvalidChapterNumber(chapter_number.to_string()))?;
    if n == 0 {
        return Err(LibraryError::InvalidChapterNumber(chapter_number.to_string()));
    }

    let position = n - 1;
    let Some(slot) = chapters.get(position) else {
        return Err(LibraryError::ChapterNotFound(label.to_string()));
    };

    if slot.chapter_number.trim() != label {
        return Err(LibraryError::ChapterOutOfPlace {
            label: label.to_string(),
            position,
            found: slot.chapter_number.clone(),
        });
    }

    Ok(position)
}

pub fn set_field(
    chapters: &mut [Chapter],
    chapter_number: &str,
    field: ChapterField,
    value: String,
) -> Result<()> {
    let idx = resolve_chapter_index(chapters, chapter_number)?;
    let chapter = &mut chapters[idx];
    let slot = match field {
        ChapterField::Body => &mut chapter.content,
        ChapterField::Translation => &mut chapter.translation,
        ChapterField::TranslatedTitle => &mut chapter.translated_chapter_title,
    };
    *slot = Some(value);
    Ok(())
}

pub fn set_body(chapters: &mut [Chapter], chapter_number: &str, body: String) -> Result<()> {
    set_field(chapters, chapter_number, ChapterField::Body, body)
}

pub fn set_translation(
    chapters: &mut [Chapter],
    chapter_number: &str,
    translation: String,
) -> Result<()> {
    set_field(chapters, chapter_number, ChapterField::Translation, translation)
}

pub fn set_translated_title(
    chapters: &mut [Chapter],
    chapter_number: &str,
    title: String,
) -> Result<()> {
    set_field(chapters, chapter_number, ChapterField::TranslatedTitle, title)
}

/// 移除所有章节号等于 `chapter_number` 的章节，返回移除数量。
pub fn delete_chapter(chapters: &mut Vec<Chapter>, chapter_number: &str) -> usize {
    let before = chapters.len();
    chapters.retain(|c| c.chapter_number != chapter_number);
    before - chapters.len()
}

/// 批量删除；空集合不改变列表。
pub fn delete_chapters(chapters: &mut Vec<Chapter>, chapter_numbers: &HashSet<String>) -> usize {
    if chapter_numbers.is_empty() {
        return 0;
    }
    let before = chapters.len();
    chapters.retain(|c| !chapter_numbers.contains(&c.chapter_number));
    before - chapters.len()
}

/// 按章节号的值查找（阅读页使用，不依赖下标）。
pub fn find_by_number<'a>(chapters: &'a [Chapter], chapter_number: &str) -> Option<(usize, &'a Chapter)> {
    chapters
        .iter()
        .enumerate()
        .find(|(_, c)| c.chapter_number == chapter_number)
}

/// 阅读页回填正文：按值定位，只写入正文仍为空的章节。返回是否写入。
pub fn fill_missing_body(chapters: &mut [Chapter], chapter_number: &str, body: String) -> Result<bool> {
    let chapter = chapters
        .iter_mut()
        .find(|c| c.chapter_number == chapter_number)
        .ok_or_else(|| LibraryError::ChapterNotFound(chapter_number.to_string()))?;
    if chapter.content.as_deref().is_some_and(|c| !c.is_empty()) {
        return Ok(false);
    }
    chapter.content = Some(body);
    Ok(true)
}
