//! 与来源站点对比章节目录，只追加新章节。

use std::collections::HashSet;

use super::models::{Chapter, Novel, ScrapedNovel};

/// 新抓取目录中尚未收录的章节（按章节号判断），保持抓取顺序。
pub fn plan_sync(stored: &[Chapter], fresh: &[Chapter]) -> Vec<Chapter> {
    let known: HashSet<&str> = stored.iter().map(|c| c.chapter_number.as_str()).collect();
    fresh
        .iter()
        .filter(|c| !known.contains(c.chapter_number.as_str()))
        .cloned()
        .collect()
}

/// 刷新书名/作者/封面并追加新章节，返回追加数量。已有章节内容保持不变。
pub fn apply_sync(novel: &mut Novel, fresh: ScrapedNovel) -> usize {
    let new_chapters = plan_sync(&novel.chapters, &fresh.chapters);
    let count = new_chapters.len();

    novel.title = fresh.title;
    novel.author = fresh.author;
    novel.cover_img = fresh.cover_img;
    novel.chapters.extend(new_chapters);
    count
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::library::models::Glossary;
    use time::OffsetDateTime;

    fn numbered(labels: &[&str]) -> Vec<Chapter> {
        labels
            .iter()
            .map(|n| Chapter::new(*n, format!("第{n}章"), format!("https://src.example/c/{n}")))
            .collect()
    }

    fn stored_novel(labels: &[&str]) -> Novel {
        let now = OffsetDateTime::now_utc();
        let mut chapters = numbered(labels);
        for c in &mut chapters {
            c.content = Some(format!("body {}", c.chapter_number));
            c.translation = Some(format!("translation {}", c.chapter_number));
        }
        Novel {
            id: "n1".into(),
            title: "旧书名".into(),
            author: "作者".into(),
            cover_img: "old.jpg".into(),
            chapters,
            glossary: Glossary::new(),
            source_url: Some("https://src.example/book".into()),
            created_at: now,
            updated_at: now,
        }
    }

    fn scraped(labels: &[&str]) -> ScrapedNovel {
        ScrapedNovel {
            title: "新书名".into(),
            author: "新作者".into(),
            cover_img: "new.jpg".into(),
            chapters: numbered(labels),
        }
    }

    #[test]
    fn appends_only_unseen_chapters_in_scrape_order() {
        let mut novel = stored_novel(&["1", "2", "3"]);
        let added = apply_sync(&mut novel, scraped(&["1", "2", "3", "4", "5"]));
        assert_eq!(added, 2);
        let labels: Vec<_> = novel.chapters.iter().map(|c| c.chapter_number.as_str()).collect();
        assert_eq!(labels, ["1", "2", "3", "4", "5"]);
    }

    #[test]
    fn identical_directories_leave_chapters_untouched() {
        let mut novel = stored_novel(&["1", "2", "3"]);
        let before = novel.chapters.clone();
        let added = apply_sync(&mut novel, scraped(&["1", "2", "3"]));
        assert_eq!(added, 0);
        assert_eq!(novel.chapters, before);
    }

    #[test]
    fn metadata_is_refreshed_even_without_new_chapters() {
        let mut novel = stored_novel(&["1"]);
        apply_sync(&mut novel, scraped(&["1"]));
        assert_eq!(novel.title, "新书名");
        assert_eq!(novel.author, "新作者");
        assert_eq!(novel.cover_img, "new.jpg");
    }

    #[test]
    fn identity_is_by_label_not_position() {
        let stored = numbered(&["1", "3"]);
        let fresh = numbered(&["3", "2", "1", "序"]);
        let plan = plan_sync(&stored, &fresh);
        let labels: Vec<_> = plan.iter().map(|c| c.chapter_number.as_str()).collect();
        assert_eq!(labels, ["2", "序"]);
    }
}
