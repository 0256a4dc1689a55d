//! 命令行子命令：不启动 Web 服务，直接执行一次书库操作并打印结果。

use anyhow::{Context, Result};

use crate::library::Library;
use crate::library::models::Novel;

pub fn add(library: &Library, url: &str) -> Result<()> {
    let novel = library
        .add_novel(url)
        .with_context(|| format!("添加失败: {url}"))?;
    println!(
        "已添加《{}》 作者: {} 章节数: {}\nid: {}",
        novel.title,
        novel.author,
        novel.chapters.len(),
        novel.id
    );
    Ok(())
}

pub fn list(library: &Library) -> Result<()> {
    let novels = library.list_novels()?;
    if novels.is_empty() {
        println!("书库为空。");
        return Ok(());
    }
    for novel in &novels {
        println!("{}", summary_line(novel));
    }
    Ok(())
}

pub fn sync(library: &Library, id: &str) -> Result<()> {
    let report = library
        .sync_novel(id)
        .with_context(|| format!("更新失败: {id}"))?;
    if report.new_chapters == 0 {
        println!("没有新章节。");
    } else {
        println!("新增 {} 章。", report.new_chapters);
    }
    Ok(())
}

pub fn delete(library: &Library, id: &str) -> Result<()> {
    library
        .delete_novel(id)
        .with_context(|| format!("删除失败: {id}"))?;
    println!("已删除 {id}");
    Ok(())
}

pub fn stats(library: &Library) -> Result<()> {
    let stats = library.library_stats()?;
    println!(
        "小说: {}  章节: {}  已翻译: {}",
        stats.total_novels, stats.total_chapters, stats.translated_chapters
    );
    if !stats.recently_added.is_empty() {
        println!("最近添加:");
        for novel in &stats.recently_added {
            println!("  {}", summary_line(novel));
        }
    }
    Ok(())
}

fn summary_line(novel: &Novel) -> String {
    format!(
        "{}  《{}》 {}  [{}/{}]",
        novel.id,
        novel.title,
        novel.author,
        novel.translated_count(),
        novel.chapters.len()
    )
}
