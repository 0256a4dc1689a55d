//! 术语表合并与单条编辑。

use super::error::{LibraryError, Result};
use super::models::Glossary;

/// 翻译结果落库时如何处理术语表。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GlossaryPolicy {
    /// 首次翻译：整体替换为服务返回的术语表。
    Replace,
    /// 重新翻译：与已有术语表合并，新值优先。
    Merge,
}

impl GlossaryPolicy {
    pub fn apply(self, current: &Glossary, fresh: Glossary) -> Glossary {
        match self {
            Self::Replace => fresh,
            Self::Merge => merge_glossary(current, fresh),
        }
    }
}

pub fn merge_glossary(current: &Glossary, fresh: Glossary) -> Glossary {
    let mut merged = current.clone();
    merged.extend(fresh);
    merged
}

pub fn set_term(glossary: &mut Glossary, source: &str, target: &str) -> Result<()> {
    let source = source.trim();
    if source.is_empty() {
        return Err(LibraryError::InvalidInput("glossary term must not be empty".into()));
    }
    glossary.insert(source.to_string(), target.trim().to_string());
    Ok(())
}
