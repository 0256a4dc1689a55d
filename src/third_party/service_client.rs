use std::time::Duration;

use reqwest::StatusCode;
use reqwest::blocking::{Client, Response};
use reqwest::header::{ACCEPT, ACCEPT_ENCODING, CONNECTION, HeaderMap, HeaderValue, USER_AGENT};
use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::debug;

use crate::base_system::context::Config;
use crate::library::models::{ChapterContent, ScrapedNovel, Translation};

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("{endpoint}: transport error: {source}")]
    Transport {
        endpoint: String,
        source: reqwest::Error,
    },
    #[error("{endpoint}: http status {status}")]
    Status { endpoint: String, status: StatusCode },
    #[error("{endpoint}: undecodable response: {source}")]
    Decode {
        endpoint: String,
        source: reqwest::Error,
    },
    #[error("{endpoint}: extraction reported failure")]
    ExtractionFailed { endpoint: String },
    #[error("client setup failed: {0}")]
    Setup(reqwest::Error),
}

/// 抓取 / 正文提取 / 翻译三个外部接口。
///
/// 每次调用都是一次阻塞往返，不重试；非 2xx 与传输错误直接返回给调用方。
pub trait NovelService: Send + Sync {
    fn scrape(&self, source_url: &str) -> Result<ScrapedNovel, ServiceError>;
    fn extract(&self, chapter_url: &str) -> Result<String, ServiceError>;
    fn translate(&self, text: &str) -> Result<Translation, ServiceError>;
}

#[derive(Debug, Clone)]
pub struct ServiceEndpoints {
    pub scrape: String,
    pub extract: String,
    pub translate: String,
}

impl ServiceEndpoints {
    pub fn from_config(cfg: &Config) -> Self {
        Self {
            scrape: normalize_endpoint(&cfg.scrape_endpoint),
            extract: normalize_endpoint(&cfg.extract_endpoint),
            translate: normalize_endpoint(&cfg.translate_endpoint),
        }
    }
}

fn normalize_endpoint(raw: &str) -> String {
    raw.trim().trim_end_matches('/').to_string()
}

#[derive(Serialize)]
struct TranslateRequest<'a> {
    text: &'a str,
}

#[derive(Clone)]
pub struct HttpNovelService {
    client: Client,
    endpoints: ServiceEndpoints,
}

impl HttpNovelService {
    pub fn new(
        endpoints: ServiceEndpoints,
        timeout: Option<Duration>,
        connect_timeout: Option<Duration>,
    ) -> Result<Self, ServiceError> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT_ENCODING, HeaderValue::from_static("identity"));
        headers.insert(CONNECTION, HeaderValue::from_static("keep-alive"));
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        headers.insert(
            USER_AGENT,
            HeaderValue::from_static(concat!("novel-shelf/", env!("CARGO_PKG_VERSION"))),
        );

        let mut builder = Client::builder().default_headers(headers);
        // reqwest blocking 默认 30s 超时；配置为 0 时保留默认。
        if let Some(t) = timeout {
            builder = builder.timeout(t);
        }
        if let Some(t) = connect_timeout {
            builder = builder.connect_timeout(t);
        }

        Ok(Self {
            client: builder.build().map_err(ServiceError::Setup)?,
            endpoints,
        })
    }

    pub fn from_config(cfg: &Config) -> Result<Self, ServiceError> {
        Self::new(
            ServiceEndpoints::from_config(cfg),
            secs(cfg.request_timeout),
            secs(cfg.connect_timeout),
        )
    }
}

fn secs(v: u64) -> Option<Duration> {
    (v > 0).then(|| Duration::from_secs(v))
}

fn decode<T: DeserializeOwned>(endpoint: &str, resp: Response) -> Result<T, ServiceError> {
    let status = resp.status();
    if !status.is_success() {
        return Err(ServiceError::Status {
            endpoint: endpoint.to_string(),
            status,
        });
    }
    resp.json().map_err(|source| ServiceError::Decode {
        endpoint: endpoint.to_string(),
        source,
    })
}

fn transport(endpoint: &str) -> impl FnOnce(reqwest::Error) -> ServiceError + '_ {
    move |source| ServiceError::Transport {
        endpoint: endpoint.to_string(),
        source,
    }
}

impl NovelService for HttpNovelService {
    fn scrape(&self, source_url: &str) -> Result<ScrapedNovel, ServiceError> {
        let endpoint = &self.endpoints.scrape;
        debug!(target: "service", %source_url, "scrape");
        let resp = self
            .client
            .get(endpoint)
            .query(&[("url", source_url)])
            .send()
            .map_err(transport(endpoint))?;
        decode(endpoint, resp)
    }

    fn extract(&self, chapter_url: &str) -> Result<String, ServiceError> {
        let endpoint = &self.endpoints.extract;
        debug!(target: "service", %chapter_url, "extract");
        let resp = self
            .client
            .get(endpoint)
            .query(&[("url", chapter_url)])
            .send()
            .map_err(transport(endpoint))?;
        let body: ChapterContent = decode(endpoint, resp)?;
        if !body.success {
            return Err(ServiceError::ExtractionFailed {
                endpoint: endpoint.clone(),
            });
        }
        Ok(body.content)
    }

    fn translate(&self, text: &str) -> Result<Translation, ServiceError> {
        let endpoint = &self.endpoints.translate;
        debug!(target: "service", chars = text.chars().count(), "translate");
        let resp = self
            .client
            .post(endpoint)
            .json(&TranslateRequest { text })
            .send()
            .map_err(transport(endpoint))?;
        decode(endpoint, resp)
    }
}
