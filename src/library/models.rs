//! 书库数据模型：Novel / Chapter / Glossary，以及外部服务的响应结构。
//!
//! 字段的序列化名称与外部抓取服务、已有文档保持一致（`coverImg`、`sourceUrl` 等）。

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

/// 术语表：原文术语 → 译文术语。
pub type Glossary = BTreeMap<String, String>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chapter {
    pub chapter_number: String,
    pub chapter_name: String,
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub translation: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub translated_chapter_title: Option<String>,
}

impl Chapter {
    pub fn new(number: impl Into<String>, name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            chapter_number: number.into(),
            chapter_name: name.into(),
            url: url.into(),
            content: None,
            translation: None,
            translated_chapter_title: None,
        }
    }

    pub fn is_translated(&self) -> bool {
        self.translation.as_deref().is_some_and(|t| !t.is_empty())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Novel {
    #[serde(rename = "_id")]
    pub id: String,
    pub title: String,
    pub author: String,
    pub cover_img: String,
    #[serde(default)]
    pub chapters: Vec<Chapter>,
    #[serde(default)]
    pub glossary: Glossary,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_url: Option<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

impl Novel {
    /// 由抓取结果构建新书：术语表为空，记录来源链接。
    pub fn from_scrape(id: String, scraped: ScrapedNovel, source_url: &str) -> Self {
        let now = OffsetDateTime::now_utc();
        Self {
            id,
            title: scraped.title,
            author: scraped.author,
            cover_img: scraped.cover_img,
            chapters: scraped.chapters,
            glossary: Glossary::new(),
            source_url: Some(source_url.to_string()),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn touch(&mut self) {
        self.updated_at = OffsetDateTime::now_utc();
    }

    pub fn translated_count(&self) -> usize {
        self.chapters.iter().filter(|c| c.is_translated()).count()
    }
}

/// `GET /scrape` 响应。
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScrapedNovel {
    pub title: String,
    pub author: String,
    #[serde(default)]
    pub cover_img: String,
    #[serde(default)]
    pub chapters: Vec<Chapter>,
}

/// `GET /extract` 响应。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChapterContent {
    pub success: bool,
    #[serde(default)]
    pub content: String,
}

/// `POST /translate` 响应。
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Translation {
    pub translation: String,
    #[serde(default)]
    pub new_terms: Glossary,
    #[serde(default)]
    pub glossary: Glossary,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct MetadataUpdate {
    pub title: Option<String>,
    pub author: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SyncReport {
    pub new_chapters: usize,
}

/// 阅读页：当前章节与前后章节（按阅读顺序）。
#[derive(Debug, Clone, Serialize)]
pub struct ChapterView {
    pub novel_id: String,
    pub novel_title: String,
    pub chapter: Chapter,
    pub prev: Option<ChapterLink>,
    pub next: Option<ChapterLink>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ChapterLink {
    pub chapter_number: String,
    pub chapter_name: String,
}

impl From<&Chapter> for ChapterLink {
    fn from(c: &Chapter) -> Self {
        Self {
            chapter_number: c.chapter_number.clone(),
            chapter_name: c.chapter_name.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct LibraryStats {
    pub total_novels: usize,
    pub total_chapters: usize,
    pub translated_chapters: usize,
    pub recently_added: Vec<Novel>,
}
