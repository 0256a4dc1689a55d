//! 书库操作编排：外部服务 → 合并/提取 → 文档存储。
//!
//! 子模块：
//! - `models`    — Novel / Chapter / Glossary 及外部服务响应
//! - `title`     — 从译文推断章节标题
//! - `glossary`  — 术语表合并
//! - `chapters`  — 章节号定位与章节增删改
//! - `sync`      — 与来源目录对比，追加新章节
//! - `store`     — JSON 文档存储
//! - `error`     — 错误类型

pub mod chapters;
pub mod error;
pub mod glossary;
pub mod models;
pub mod store;
pub mod sync;
pub mod title;

use std::collections::HashSet;
use std::sync::Arc;

use tracing::{info, warn};
use uuid::Uuid;

use crate::third_party::service_client::NovelService;
use error::{LibraryError, Result};
use glossary::GlossaryPolicy;
use models::{ChapterLink, ChapterView, LibraryStats, MetadataUpdate, Novel, SyncReport};
use store::{NovelStore, UpdateOutcome};

const RECENTLY_ADDED: usize = 3;

/// 持有存储与外部服务的句柄；由调用方显式构建后注入。
#[derive(Clone)]
pub struct Library {
    store: NovelStore,
    service: Arc<dyn NovelService>,
}

/// 写入结果校验：未命中为 `NovelNotFound`，命中但字节未变为 `NotModified`。
///
/// 现有操作都会 `touch()` 更新时间，命中即视为修改；`NotModified` 留给不刷新
/// 时间戳的写入。
fn require_modified(outcome: UpdateOutcome, id: &str) -> Result<()> {
    if !outcome.matched {
        return Err(LibraryError::NovelNotFound(id.to_string()));
    }
    if !outcome.modified {
        return Err(LibraryError::NotModified);
    }
    Ok(())
}

impl Library {
    pub fn new(store: NovelStore, service: Arc<dyn NovelService>) -> Self {
        Self { store, service }
    }

    pub fn add_novel(&self, source_url: &str) -> Result<Novel> {
        let source_url = source_url.trim();
        if source_url.is_empty() {
            return Err(LibraryError::InvalidInput("source url must not be empty".into()));
        }

        let scraped = self.service.scrape(source_url)?;
        let novel = Novel::from_scrape(Uuid::new_v4().to_string(), scraped, source_url);
        self.store.insert(&novel)?;
        info!(
            target: "library",
            id = %novel.id,
            title = %novel.title,
            chapters = novel.chapters.len(),
            "novel added"
        );
        Ok(novel)
    }

    pub fn list_novels(&self) -> Result<Vec<Novel>> {
        self.store.find_all()
    }

    pub fn get_novel(&self, id: &str) -> Result<Novel> {
        self.store
            .find_one(id)?
            .ok_or_else(|| LibraryError::NovelNotFound(id.to_string()))
    }

    pub fn fetch_chapter_content(&self, chapter_url: &str) -> Result<String> {
        Ok(self.service.extract(chapter_url)?)
    }

    /// 阅读页：按章节号的值定位章节；正文缺失时先提取并按值回填，
    /// 因此删除章节后的缺口序列也只会提取一次。
    pub fn open_chapter(&self, id: &str, chapter_number: &str) -> Result<ChapterView> {
        let novel = self.get_novel(id)?;
        let (idx, found) = chapters::find_by_number(&novel.chapters, chapter_number)
            .ok_or_else(|| LibraryError::ChapterNotFound(chapter_number.to_string()))?;
        let mut chapter = found.clone();

        if chapter.content.as_deref().is_none_or(str::is_empty) {
            let body = self.service.extract(&chapter.url)?;
            // 正文已拿到；写回失败不影响本次阅读
            let stored = body.clone();
            let persisted = self.store.update_one(id, |novel| {
                if chapters::fill_missing_body(&mut novel.chapters, chapter_number, stored)? {
                    novel.touch();
                }
                Ok(())
            });
            if let Err(e) = persisted {
                warn!(target: "library", id, chapter = chapter_number, error = %e, "chapter body not persisted");
            }
            chapter.content = Some(body);
        }

        Ok(ChapterView {
            novel_id: novel.id.clone(),
            novel_title: novel.title.clone(),
            chapter,
            prev: idx
                .checked_sub(1)
                .and_then(|i| novel.chapters.get(i))
                .map(ChapterLink::from),
            next: novel.chapters.get(idx + 1).map(ChapterLink::from),
        })
    }

    pub fn save_chapter_content(&self, id: &str, chapter_number: &str, body: String) -> Result<()> {
        let outcome = self.store.update_one(id, |novel| {
            chapters::set_body(&mut novel.chapters, chapter_number, body)?;
            novel.touch();
            Ok(())
        })?;
        require_modified(outcome, id)
    }

    /// 首次翻译：术语表整体替换为服务返回的版本。
    pub fn translate_chapter(&self, id: &str, chapter_number: &str, text: &str) -> Result<String> {
        self.store_translation(id, chapter_number, text, GlossaryPolicy::Replace)
    }

    /// 重新翻译：术语表与已有版本合并。
    pub fn retranslate_chapter(&self, id: &str, chapter_number: &str, text: &str) -> Result<String> {
        self.store_translation(id, chapter_number, text, GlossaryPolicy::Merge)
    }

    fn store_translation(
        &self,
        id: &str,
        chapter_number: &str,
        text: &str,
        policy: GlossaryPolicy,
    ) -> Result<String> {
        if text.trim().is_empty() {
            return Err(LibraryError::InvalidInput("nothing to translate".into()));
        }
        // 先校验书与章节号，避免白白调用翻译服务
        let novel = self.get_novel(id)?;
        chapters::resolve_chapter_index(&novel.chapters, chapter_number)?;

        let result = self.service.translate(text)?;
        let title = title::extract_chapter_title(&result.translation);
        info!(
            target: "library",
            id,
            chapter = chapter_number,
            new_terms = result.new_terms.len(),
            title = title.as_deref().unwrap_or("-"),
            "chapter translated"
        );

        let translation = result.translation;
        let fresh_glossary = result.glossary;
        let stored = translation.clone();
        let outcome = self.store.update_one(id, move |novel| {
            chapters::set_translation(&mut novel.chapters, chapter_number, stored)?;
            if let Some(title) = title {
                chapters::set_translated_title(&mut novel.chapters, chapter_number, title)?;
            }
            novel.glossary = policy.apply(&novel.glossary, fresh_glossary);
            novel.touch();
            Ok(())
        })?;
        require_modified(outcome, id)?;
        Ok(translation)
    }

    /// 手动译文：首个非空行为标题（非空时才覆盖），其余为正文。
    pub fn save_manual_translation(&self, id: &str, chapter_number: &str, text: &str) -> Result<()> {
        let (title, body) = title::split_manual_translation(text);
        let outcome = self.store.update_one(id, |novel| {
            chapters::set_translation(&mut novel.chapters, chapter_number, body)?;
            if !title.is_empty() {
                chapters::set_translated_title(&mut novel.chapters, chapter_number, title)?;
            }
            novel.touch();
            Ok(())
        })?;
        require_modified(outcome, id)
    }

    pub fn update_glossary_term(&self, id: &str, source: &str, target: &str) -> Result<()> {
        let outcome = self.store.update_one(id, |novel| {
            glossary::set_term(&mut novel.glossary, source, target)?;
            novel.touch();
            Ok(())
        })?;
        require_modified(outcome, id)
    }

    pub fn update_novel_metadata(&self, id: &str, update: MetadataUpdate) -> Result<()> {
        let outcome = self.store.update_one(id, |novel| {
            if let Some(title) = update.title {
                novel.title = title;
            }
            if let Some(author) = update.author {
                novel.author = author;
            }
            novel.touch();
            Ok(())
        })?;
        require_modified(outcome, id)
    }

    pub fn delete_novel(&self, id: &str) -> Result<()> {
        if !self.store.delete_one(id)? {
            return Err(LibraryError::NovelNotFound(id.to_string()));
        }
        info!(target: "library", id, "novel deleted");
        Ok(())
    }

    pub fn delete_chapter(&self, id: &str, chapter_number: &str) -> Result<usize> {
        let mut removed = 0;
        let outcome = self.store.update_one(id, |novel| {
            removed = chapters::delete_chapter(&mut novel.chapters, chapter_number);
            novel.touch();
            Ok(())
        })?;
        require_modified(outcome, id)?;
        Ok(removed)
    }

    pub fn delete_chapters(&self, id: &str, chapter_numbers: &HashSet<String>) -> Result<usize> {
        let mut removed = 0;
        let outcome = self.store.update_one(id, |novel| {
            removed = chapters::delete_chapters(&mut novel.chapters, chapter_numbers);
            novel.touch();
            Ok(())
        })?;
        require_modified(outcome, id)?;
        Ok(removed)
    }

    /// 从来源重新抓取目录，追加新章节；0 个新章节也算成功。
    pub fn sync_novel(&self, id: &str) -> Result<SyncReport> {
        let novel = self.get_novel(id)?;
        let source_url = novel
            .source_url
            .clone()
            .ok_or_else(|| LibraryError::MissingSourceUrl(id.to_string()))?;

        let fresh = self.service.scrape(&source_url)?;

        let mut new_chapters = 0;
        let outcome = self.store.update_one(id, |novel| {
            new_chapters = sync::apply_sync(novel, fresh);
            novel.touch();
            Ok(())
        })?;
        require_modified(outcome, id)?;

        info!(target: "library", id, new_chapters, "novel synced");
        Ok(SyncReport { new_chapters })
    }

    pub fn library_stats(&self) -> Result<LibraryStats> {
        let novels = self.store.find_all()?;
        Ok(LibraryStats {
            total_novels: novels.len(),
            total_chapters: novels.iter().map(|n| n.chapters.len()).sum(),
            translated_chapters: novels.iter().map(Novel::translated_count).sum(),
            recently_added: novels.into_iter().take(RECENTLY_ADDED).collect(),
        })
    }
}
