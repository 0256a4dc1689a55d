//! 文档存储：每本书一个 JSON 文档（`<root>/novels/<id>.json`）。
//!
//! 写入先落临时文件再原子替换。没有锁，也没有版本号：并发写同一本书时后写者覆盖。

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use tracing::{debug, warn};

use super::error::{LibraryError, Result};
use super::models::Novel;

const COLLECTION_DIR: &str = "novels";

/// `update_one` 的结果：是否找到文档、文档内容是否真的改变。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UpdateOutcome {
    pub matched: bool,
    pub modified: bool,
}

#[derive(Debug, Clone)]
pub struct NovelStore {
    dir: PathBuf,
}

impl NovelStore {
    pub fn open(root: &Path) -> Result<Self> {
        let dir = root.join(COLLECTION_DIR);
        fs::create_dir_all(&dir).map_err(|source| LibraryError::StoreIo {
            path: dir.clone(),
            source,
        })?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// 非法 id（含路径分隔符等）视为不存在。
    fn doc_path(&self, id: &str) -> Option<PathBuf> {
        let valid = !id.is_empty()
            && id
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        valid.then(|| self.dir.join(format!("{id}.json")))
    }

    pub fn insert(&self, novel: &Novel) -> Result<()> {
        let path = self
            .doc_path(&novel.id)
            .ok_or_else(|| LibraryError::InvalidInput(format!("bad document id '{}'", novel.id)))?;
        self.write_doc(&path, &encode(&path, novel)?)?;
        debug!(target: "store", id = %novel.id, "inserted");
        Ok(())
    }

    pub fn find_one(&self, id: &str) -> Result<Option<Novel>> {
        let Some(path) = self.doc_path(id) else {
            return Ok(None);
        };
        read_doc(&path)
    }

    /// 全部文档，按创建时间倒序。损坏的文档跳过并记录警告。
    pub fn find_all(&self) -> Result<Vec<Novel>> {
        let entries = fs::read_dir(&self.dir).map_err(|source| LibraryError::StoreIo {
            path: self.dir.clone(),
            source,
        })?;

        let mut out = Vec::new();
        for entry in entries.flatten() {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            match read_doc(&path) {
                Ok(Some(novel)) => out.push(novel),
                Ok(None) => {}
                Err(e) => warn!(target: "store", path = %path.display(), error = %e, "skip unreadable document"),
            }
        }

        out.sort_by(|a, b| b.created_at.cmp(&a.created_at).then_with(|| a.id.cmp(&b.id)));
        Ok(out)
    }

    /// 读取-修改-写回。`mutate` 返回错误时不写入。
    pub fn update_one<F>(&self, id: &str, mutate: F) -> Result<UpdateOutcome>
    where
        F: FnOnce(&mut Novel) -> Result<()>,
    {
        let Some(path) = self.doc_path(id) else {
            return Ok(UpdateOutcome {
                matched: false,
                modified: false,
            });
        };
        let Some(mut novel) = read_doc(&path)? else {
            return Ok(UpdateOutcome {
                matched: false,
                modified: false,
            });
        };

        let before = encode(&path, &novel)?;
        mutate(&mut novel)?;
        // 文档 id 不允许被改写
        novel.id = id.to_string();
        let after = encode(&path, &novel)?;

        if before == after {
            return Ok(UpdateOutcome {
                matched: true,
                modified: false,
            });
        }

        self.write_doc(&path, &after)?;
        Ok(UpdateOutcome {
            matched: true,
            modified: true,
        })
    }

    pub fn delete_one(&self, id: &str) -> Result<bool> {
        let Some(path) = self.doc_path(id) else {
            return Ok(false);
        };
        match fs::remove_file(&path) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(source) => Err(LibraryError::StoreIo { path, source }),
        }
    }

    fn write_doc(&self, path: &Path, bytes: &[u8]) -> Result<()> {
        let io_err = |source| LibraryError::StoreIo {
            path: path.to_path_buf(),
            source,
        };
        let mut tmp = NamedTempFile::new_in(&self.dir).map_err(io_err)?;
        tmp.write_all(bytes).map_err(io_err)?;
        tmp.persist(path).map_err(|e| io_err(e.error))?;
        Ok(())
    }
}

fn encode(path: &Path, novel: &Novel) -> Result<Vec<u8>> {
    serde_json::to_vec_pretty(novel).map_err(|source| LibraryError::StoreJson {
        path: path.to_path_buf(),
        source,
    })
}

fn read_doc(path: &Path) -> Result<Option<Novel>> {
    let raw = match fs::read(path) {
        Ok(raw) => raw,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(source) => {
            return Err(LibraryError::StoreIo {
                path: path.to_path_buf(),
                source,
            });
        }
    };
    serde_json::from_slice(&raw)
        .map(Some)
        .map_err(|source| LibraryError::StoreJson {
            path: path.to_path_buf(),
            source,
        })
}
