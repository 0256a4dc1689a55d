use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::third_party::service_client::ServiceError;

#[derive(Debug, Error)]
pub enum LibraryError {
    #[error("external service failed: {0}")]
    Service(#[from] ServiceError),
    #[error("novel not found: {0}")]
    NovelNotFound(String),
    #[error("chapter {0} not found")]
    ChapterNotFound(String),
    #[error("invalid chapter number '{0}'")]
    InvalidChapterNumber(String),
    #[error("chapter {label} is not stored at position {position} (found {found})")]
    ChapterOutOfPlace {
        label: String,
        position: usize,
        found: String,
    },
    #[error("novel {0} has no source url")]
    MissingSourceUrl(String),
    #[error("no document was modified")]
    NotModified,
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("store io error at {path}: {source}")]
    StoreIo { path: PathBuf, source: io::Error },
    #[error("corrupt document at {path}: {source}")]
    StoreJson {
        path: PathBuf,
        source: serde_json::Error,
    },
}

impl LibraryError {
    /// 错误分类，供 UI 层映射状态码与提示。
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Service(_) => ErrorKind::Service,
            Self::NovelNotFound(_) | Self::ChapterNotFound(_) => ErrorKind::NotFound,
            Self::InvalidChapterNumber(_)
            | Self::ChapterOutOfPlace { .. }
            | Self::MissingSourceUrl(_)
            | Self::InvalidInput(_) => ErrorKind::Validation,
            Self::NotModified => ErrorKind::NotModified,
            Self::StoreIo { .. } | Self::StoreJson { .. } => ErrorKind::Store,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Service,
    NotFound,
    Validation,
    NotModified,
    Store,
}

pub type Result<T, E = LibraryError> = std::result::Result<T, E>;
