//! 配置文件读写：缺省值合并 + 带注释生成。
//!
//! 用户文件中缺失的键会用默认值补齐并写回，已有键保持原值。

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_yaml::{Mapping, Value};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("io error at {path}: {source}")]
    Io { path: PathBuf, source: io::Error },
    #[error("invalid yaml at {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_yaml::Error,
    },
    #[error("validation error: {0}")]
    Validation(String),
}

#[derive(Debug, Clone, Copy)]
pub struct FieldMeta {
    pub name: &'static str,
    pub description: &'static str,
}

pub trait ConfigSpec: Serialize + DeserializeOwned + Default {
    const FILE_NAME: &'static str;
    fn fields() -> &'static [FieldMeta];

    /// 加载后的额外校验。
    fn validate(&self) -> Result<(), ConfigError> {
        Ok(())
    }
}

/// 读取 `base_dir/FILE_NAME`（未给目录时取当前目录）；不存在则写出默认配置。
pub fn load_or_create<T: ConfigSpec>(base_dir: Option<&Path>) -> Result<T, ConfigError> {
    let path = base_dir
        .map(|d| d.join(T::FILE_NAME))
        .unwrap_or_else(|| PathBuf::from(T::FILE_NAME));
    load_or_create_at(&path)
}

pub fn load_or_create_at<T: ConfigSpec>(path: &Path) -> Result<T, ConfigError> {
    ensure_parent(path)?;

    if !path.exists() {
        let config = T::default();
        write_with_comments(&config, path)?;
        return Ok(config);
    }

    let raw = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let user: Value = serde_yaml::from_str(&raw).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })?;

    let incomplete = missing_fields::<T>(&user);

    let mut merged = to_yaml(&T::default())?;
    overlay(&mut merged, user);
    let config: T = serde_yaml::from_value(merged).map_err(validation)?;
    config.validate()?;

    if incomplete {
        write_with_comments(&config, path)?;
    }
    Ok(config)
}

pub fn write_with_comments<T: ConfigSpec>(config: &T, path: &Path) -> Result<(), ConfigError> {
    ensure_parent(path)?;
    let yaml = render_with_comments(config)?;
    fs::write(path, yaml).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// 按 `fields()` 的顺序输出，每个键前带一行 `#` 说明。
pub fn render_with_comments<T: ConfigSpec>(config: &T) -> Result<String, ConfigError> {
    let Value::Mapping(map) = to_yaml(config)? else {
        return Err(ConfigError::Validation(
            "config must serialize to a mapping".to_string(),
        ));
    };

    let mut out = String::new();
    for field in T::fields() {
        if !field.description.is_empty() {
            for line in field.description.lines() {
                out.push_str("# ");
                out.push_str(line);
                out.push('\n');
            }
        }
        let key = Value::String(field.name.to_string());
        let val = map.get(&key).cloned().unwrap_or(Value::Null);
        let entry = serde_yaml::to_string(&Mapping::from_iter([(key, val)])).map_err(validation)?;
        out.push_str(entry.trim_end());
        out.push('\n');
    }
    Ok(out)
}

fn missing_fields<T: ConfigSpec>(user: &Value) -> bool {
    let Value::Mapping(map) = user else {
        return true;
    };
    T::fields()
        .iter()
        .any(|f| !map.contains_key(Value::String(f.name.to_string())))
}

fn overlay(dest: &mut Value, user: Value) {
    match (dest, user) {
        (Value::Mapping(dest), Value::Mapping(src)) => {
            for (key, val) in src {
                match dest.get_mut(&key) {
                    Some(slot) => overlay(slot, val),
                    None => {
                        dest.insert(key, val);
                    }
                }
            }
        }
        // 空值不覆盖默认值
        (_, Value::Null) => {}
        (dest, other) => *dest = other,
    }
}

fn to_yaml<T: Serialize>(v: &T) -> Result<Value, ConfigError> {
    serde_yaml::to_value(v).map_err(validation)
}

fn validation(err: serde_yaml::Error) -> ConfigError {
    ConfigError::Validation(err.to_string())
}

fn ensure_parent(path: &Path) -> Result<(), ConfigError> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => {
            fs::create_dir_all(parent).map_err(|source| ConfigError::Io {
                path: parent.to_path_buf(),
                source,
            })
        }
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Demo {
        endpoint: String,
        timeout: u64,
    }

    impl Default for Demo {
        fn default() -> Self {
            Self {
                endpoint: "http://127.0.0.1:8000".into(),
                timeout: 30,
            }
        }
    }

    impl ConfigSpec for Demo {
        const FILE_NAME: &'static str = "demo.yml";

        fn fields() -> &'static [FieldMeta] {
            &[
                FieldMeta {
                    name: "endpoint",
                    description: "service base url",
                },
                FieldMeta {
                    name: "timeout",
                    description: "seconds\n0 = transport default",
                },
            ]
        }
    }

    #[test]
    fn creates_commented_default_file() {
        let tmp = tempfile::tempdir().unwrap();
        let cfg: Demo = load_or_create(Some(tmp.path())).unwrap();
        assert_eq!(cfg, Demo::default());

        let written = fs::read_to_string(tmp.path().join("demo.yml")).unwrap();
        assert!(written.contains("# service base url\nendpoint: "));
        assert!(written.contains("# seconds\n# 0 = transport default\ntimeout: 30"));
    }

    #[test]
    fn backfills_missing_keys_and_keeps_user_values() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("demo.yml");
        fs::write(&path, "timeout: 5\n").unwrap();

        let cfg: Demo = load_or_create_at(&path).unwrap();
        assert_eq!(cfg.timeout, 5);
        assert_eq!(cfg.endpoint, "http://127.0.0.1:8000");

        let rewritten = fs::read_to_string(&path).unwrap();
        assert!(rewritten.contains("endpoint:"));
        assert!(rewritten.contains("timeout: 5"));
    }

    #[test]
    fn broken_yaml_is_a_parse_error() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("demo.yml");
        fs::write(&path, "timeout: [unclosed\n").unwrap();
        assert!(matches!(
            load_or_create_at::<Demo>(&path),
            Err(ConfigError::Parse { .. })
        ));
    }
}
