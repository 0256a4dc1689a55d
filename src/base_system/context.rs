//! 全局配置结构（Config）与默认值。
//!
//! 该模块同时提供生成 `config.yml` 的字段元信息。

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::config::{ConfigError, ConfigSpec, FieldMeta};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    // 外部服务
    #[serde(default = "default_scrape_endpoint")]
    pub scrape_endpoint: String,
    #[serde(default = "default_extract_endpoint")]
    pub extract_endpoint: String,
    #[serde(default = "default_translate_endpoint")]
    pub translate_endpoint: String,
    #[serde(default = "default_request_timeout")]
    pub request_timeout: u64,
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout: u64,

    // 存储
    #[serde(default = "default_data_dir")]
    pub data_dir: String,

    // Web
    #[serde(default = "default_web_addr")]
    pub web_addr: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            scrape_endpoint: default_scrape_endpoint(),
            extract_endpoint: default_extract_endpoint(),
            translate_endpoint: default_translate_endpoint(),
            request_timeout: default_request_timeout(),
            connect_timeout: default_connect_timeout(),
            data_dir: default_data_dir(),
            web_addr: default_web_addr(),
        }
    }
}

impl ConfigSpec for Config {
    const FILE_NAME: &'static str = "config.yml";

    fn fields() -> &'static [FieldMeta] {
        static FIELDS: [FieldMeta; 7] = [
            FieldMeta {
                name: "scrape_endpoint",
                description: "抓取服务地址（GET ?url=<小说页>，返回书名/作者/封面/章节目录）",
            },
            FieldMeta {
                name: "extract_endpoint",
                description: "正文提取服务地址（GET ?url=<章节页>）",
            },
            FieldMeta {
                name: "translate_endpoint",
                description: "翻译服务地址（POST {\"text\": ...}）",
            },
            FieldMeta {
                name: "request_timeout",
                description: "请求超时时间（秒），0 表示使用 HTTP 客户端默认值",
            },
            FieldMeta {
                name: "connect_timeout",
                description: "连接超时时间（秒），0 表示使用 HTTP 客户端默认值",
            },
            FieldMeta {
                name: "data_dir",
                description: "书库存储目录；相对路径基于配置文件所在目录",
            },
            FieldMeta {
                name: "web_addr",
                description: "Web API 监听地址，多个地址用逗号分隔（可被 NOVEL_SHELF_ADDR 覆盖）",
            },
        ];
        &FIELDS
    }

    fn validate(&self) -> Result<(), ConfigError> {
        for (name, value) in [
            ("scrape_endpoint", &self.scrape_endpoint),
            ("extract_endpoint", &self.extract_endpoint),
            ("translate_endpoint", &self.translate_endpoint),
        ] {
            let v = value.trim();
            if !(v.starts_with("http://") || v.starts_with("https://")) {
                return Err(ConfigError::Validation(format!(
                    "{name} must be an http(s) url, got '{v}'"
                )));
            }
        }
        if self.data_dir.trim().is_empty() {
            return Err(ConfigError::Validation("data_dir must not be empty".into()));
        }
        Ok(())
    }
}

impl Config {
    /// 书库存储根目录。
    pub fn library_dir(&self, base_dir: Option<&Path>) -> PathBuf {
        let dir = PathBuf::from(self.data_dir.trim());
        match base_dir {
            Some(base) if dir.is_relative() => base.join(dir),
            _ => dir,
        }
    }
}

fn default_scrape_endpoint() -> String {
    "http://127.0.0.1:8000/scrape".to_string()
}

fn default_extract_endpoint() -> String {
    "http://127.0.0.1:8000/extract".to_string()
}

fn default_translate_endpoint() -> String {
    "http://127.0.0.1:8000/translate".to_string()
}

fn default_request_timeout() -> u64 {
    0
}

fn default_connect_timeout() -> u64 {
    10
}

fn default_data_dir() -> String {
    "library".to_string()
}

fn default_web_addr() -> String {
    "127.0.0.1:18424".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::base_system::config::{load_or_create_at, render_with_comments};

    #[test]
    fn every_field_is_described() {
        let rendered = render_with_comments(&Config::default()).unwrap();
        for f in Config::fields() {
            assert!(rendered.contains(&format!("{}:", f.name)), "{}", f.name);
        }
    }

    #[test]
    fn rejects_non_http_endpoint() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("config.yml");
        std::fs::write(&path, "translate_endpoint: ftp://nowhere\n").unwrap();
        assert!(matches!(
            load_or_create_at::<Config>(&path),
            Err(ConfigError::Validation(_))
        ));
    }

    #[test]
    fn relative_data_dir_follows_base() {
        let cfg = Config::default();
        assert_eq!(
            cfg.library_dir(Some(Path::new("/srv/shelf"))),
            PathBuf::from("/srv/shelf/library")
        );
        assert_eq!(cfg.library_dir(None), PathBuf::from("library"));
    }
}
