use axum::Router;
use axum::extract::connect_info::ConnectInfo;
use axum::http::Request;
use axum::middleware::{Next, from_fn};
use axum::response::Response;
use axum::routing::{delete, get, post, put};
use tracing::info;

use super::routes;
use super::state::AppState;

pub(crate) fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/api/status", get(routes::status::api_status))
        .route("/api/stats", get(routes::novels::library_stats))
        .route(
            "/api/novels",
            get(routes::novels::list_novels).post(routes::novels::add_novel),
        )
        .route(
            "/api/novels/:id",
            get(routes::novels::get_novel)
                .delete(routes::novels::delete_novel)
                .patch(routes::novels::update_metadata),
        )
        .route("/api/novels/:id/sync", post(routes::novels::sync_novel))
        .route("/api/novels/:id/glossary", put(routes::glossary::update_term))
        .route(
            "/api/novels/:id/chapters",
            delete(routes::chapters::delete_batch),
        )
        .route(
            "/api/novels/:id/chapters/:number",
            get(routes::chapters::open_chapter).delete(routes::chapters::delete_chapter),
        )
        .route(
            "/api/novels/:id/chapters/:number/content",
            put(routes::chapters::save_content),
        )
        .route(
            "/api/novels/:id/chapters/:number/translate",
            post(routes::chapters::translate),
        )
        .route(
            "/api/novels/:id/chapters/:number/retranslate",
            post(routes::chapters::retranslate),
        )
        .route(
            "/api/novels/:id/chapters/:number/translation",
            put(routes::chapters::save_manual_translation),
        )
        .route("/api/chapter-content", get(routes::chapters::fetch_content))
        .fallback(routes::not_found)
        .layer(from_fn(access_log_mw))
        .with_state(state)
}

async fn access_log_mw(req: Request<axum::body::Body>, next: Next) -> Response {
    let path = req.uri().path().to_string();
    let method = req.method().to_string();
    let ip = req
        .extensions()
        .get::<ConnectInfo<std::net::SocketAddr>>()
        .map(|c| c.0.to_string())
        .unwrap_or_else(|| "unknown".to_string());

    let resp = next.run(req).await;
    info!(target: "web_access", ip = %ip, method = %method, path = %path, status = %resp.status().as_u16(), "request");
    resp
}

#[cfg(test)]
mod tests {
    use std::net::SocketAddr;
    use std::path::PathBuf;
    use std::sync::{Arc, Mutex};

    use axum::body::{self, Body};
    use axum::http::{Method, StatusCode};
    use serde_json::{Value, json};
    use tower::ServiceExt;

    use super::*;
    use crate::library::Library;
    use crate::library::models::{Chapter, ScrapedNovel, Translation};
    use crate::library::store::NovelStore;
    use crate::third_party::service_client::{NovelService, ServiceError};

    /// 按顺序返回预置目录的抓取桩；正文与翻译一律失败。
    #[derive(Default)]
    struct ScriptedService {
        scrapes: Mutex<Vec<ScrapedNovel>>,
    }

    impl ScriptedService {
        fn unavailable(endpoint: &str) -> ServiceError {
            ServiceError::Status {
                endpoint: endpoint.into(),
                status: reqwest::StatusCode::SERVICE_UNAVAILABLE,
            }
        }
    }

    impl NovelService for ScriptedService {
        fn scrape(&self, _source_url: &str) -> Result<ScrapedNovel, ServiceError> {
            let mut q = self.scrapes.lock().unwrap();
            if q.is_empty() {
                return Err(Self::unavailable("scrape"));
            }
            Ok(q.remove(0))
        }

        fn extract(&self, _chapter_url: &str) -> Result<String, ServiceError> {
            Err(Self::unavailable("extract"))
        }

        fn translate(&self, _text: &str) -> Result<Translation, ServiceError> {
            Err(Self::unavailable("translate"))
        }
    }

    fn scraped(labels: &[&str]) -> ScrapedNovel {
        ScrapedNovel {
            title: "Ashen Gate".into(),
            author: "anon".into(),
            cover_img: String::new(),
            chapters: labels
                .iter()
                .map(|n| Chapter::new(*n, format!("Chapter {n}"), format!("https://src.example/c/{n}")))
                .collect(),
        }
    }

    fn test_router(service: Arc<ScriptedService>) -> (tempfile::TempDir, Router) {
        let tmp = tempfile::tempdir().unwrap();
        let store = NovelStore::open(tmp.path()).unwrap();
        let state = AppState {
            bind_addrs: Arc::new(vec!["127.0.0.1:18424".parse::<SocketAddr>().unwrap()]),
            library_root: Arc::new(PathBuf::from(tmp.path())),
            library: Library::new(store, service),
        };
        (tmp, build_router(state))
    }

    async fn send(router: &Router, method: Method, uri: &str, payload: Option<&str>) -> (StatusCode, Value) {
        let mut req = Request::builder().method(method).uri(uri);
        let body = match payload {
            Some(raw) => {
                req = req.header("content-type", "application/json");
                Body::from(raw.to_string())
            }
            None => Body::empty(),
        };
        let response = router
            .clone()
            .oneshot(req.body(body).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn malformed_bodies_get_uniform_failure_shape() {
        let (_tmp, router) = test_router(Arc::default());

        let (status, body) = send(&router, Method::POST, "/api/novels", Some("{}")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["success"], json!(false));
        assert!(body["error"].as_str().unwrap().contains("url"));

        let (status, body) = send(&router, Method::PUT, "/api/novels/x/glossary", Some("not json")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["success"], json!(false));

        let (status, body) = send(&router, Method::GET, "/api/chapter-content", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["success"], json!(false));
    }

    #[tokio::test]
    async fn unknown_novel_and_unknown_route_are_404_json() {
        let (_tmp, router) = test_router(Arc::default());

        let (status, body) = send(&router, Method::GET, "/api/novels/missing", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["success"], json!(false));
        assert!(body["error"].is_string());

        let (status, body) = send(&router, Method::POST, "/api/novels/missing/sync", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["success"], json!(false));

        let (status, body) = send(&router, Method::GET, "/api/nothing-here", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["success"], json!(false));
    }

    #[tokio::test]
    async fn add_then_sync_reports_new_chapter_count() {
        let service = Arc::new(ScriptedService::default());
        service.scrapes.lock().unwrap().extend([
            scraped(&["1", "2"]),
            scraped(&["1", "2", "3", "4", "5"]),
        ]);
        let (_tmp, router) = test_router(service);

        let (status, body) = send(
            &router,
            Method::POST,
            "/api/novels",
            Some(r#"{"url":"https://src.example/book/9"}"#),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], json!(true));
        let id = body["novel"]["_id"].as_str().unwrap().to_string();

        let (status, body) = send(&router, Method::POST, &format!("/api/novels/{id}/sync"), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({ "success": true, "new_chapters": 3 }));

        // scrape queue drained: service failure maps to 502
        let (status, body) = send(&router, Method::POST, &format!("/api/novels/{id}/sync"), None).await;
        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert_eq!(body["success"], json!(false));
    }

    #[tokio::test]
    async fn chapter_routes_validate_numbers() {
        let service = Arc::new(ScriptedService::default());
        service.scrapes.lock().unwrap().push(scraped(&["1", "2"]));
        let (_tmp, router) = test_router(service);

        let (_, body) = send(
            &router,
            Method::POST,
            "/api/novels",
            Some(r#"{"url":"https://src.example/book/9"}"#),
        )
        .await;
        let id = body["novel"]["_id"].as_str().unwrap().to_string();

        let (status, body) = send(
            &router,
            Method::PUT,
            &format!("/api/novels/{id}/chapters/abc/content"),
            Some(r#"{"text":"body"}"#),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["success"], json!(false));

        let (status, body) = send(
            &router,
            Method::DELETE,
            &format!("/api/novels/{id}/chapters"),
            Some(r#"{"chapter_numbers":["2"]}"#),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({ "success": true, "removed": 1 }));
    }
}
