//! HTTP front end for Tally.
//!
//! Wraps [`tally_api::api_router`] under `/api`, adds a health check at `/`,
//! and applies the CORS and request-tracing layers shared by every route.

use std::{path::PathBuf, sync::Arc};

use axum::{
  Json, Router,
  http::{Method, header},
  routing::get,
};
use serde::Deserialize;
use serde_json::{Value, json};
use tally_core::store::FinanceStore;
use tower_http::{
  cors::{Any, CorsLayer},
  trace::TraceLayer,
};

// ─── Configuration ────────────────────────────────────────────────────────────

/// Runtime server configuration, deserialised from `config.toml` and
/// `TALLY_*` environment variables.
#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
  #[serde(default = "default_host")]
  pub host:       String,
  #[serde(default = "default_port")]
  pub port:       u16,
  /// SQLite database file. A leading `~/` is expanded by the binary.
  pub store_path: PathBuf,
}

fn default_host() -> String { "0.0.0.0".to_string() }

fn default_port() -> u16 { 3000 }

// ─── Router ───────────────────────────────────────────────────────────────────

/// Build the full application router for `store`.
pub fn app<S>(store: Arc<S>) -> Router
where
  S: FinanceStore + 'static,
{
  Router::new()
    .route("/", get(health))
    .nest("/api", tally_api::api_router(store))
    .layer(cors())
    .layer(TraceLayer::new_for_http())
}

/// Any origin may call the API; it carries no cookies.
fn cors() -> CorsLayer {
  CorsLayer::new()
    .allow_origin(Any)
    .allow_methods([
      Method::GET,
      Method::POST,
      Method::PUT,
      Method::DELETE,
      Method::OPTIONS,
    ])
    .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
}

async fn health() -> Json<Value> {
  Json(json!({ "message": "Tally API is running." }))
}

#[cfg(test)]
mod tests {
  use axum::{
    body::Body,
    http::{Request, StatusCode},
  };
  use tally_store_sqlite::SqliteStore;
  use tower::ServiceExt as _;

  use super::*;

  async fn make_app() -> Router {
    let store = SqliteStore::open_in_memory().await.unwrap();
    app(Arc::new(store))
  }

  async fn body_json(resp: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
      .await
      .unwrap();
    serde_json::from_slice(&bytes).unwrap()
  }

  // ── Configuration ───────────────────────────────────────────────────────────

  fn parse_config(toml: &str) -> Result<ServerConfig, config::ConfigError> {
    config::Config::builder()
      .add_source(config::File::from_str(toml, config::FileFormat::Toml))
      .build()?
      .try_deserialize()
  }

  #[test]
  fn config_fills_in_defaults() {
    let cfg = parse_config(r#"store_path = "/tmp/tally.db""#).unwrap();
    assert_eq!(cfg.host, "0.0.0.0");
    assert_eq!(cfg.port, 3000);
    assert_eq!(cfg.store_path, PathBuf::from("/tmp/tally.db"));
  }

  #[test]
  fn config_overrides_defaults() {
    let cfg = parse_config(
      "host = \"127.0.0.1\"\nport = 8080\nstore_path = \"tally.db\"\n",
    )
    .unwrap();
    assert_eq!(cfg.host, "127.0.0.1");
    assert_eq!(cfg.port, 8080);
  }

  #[test]
  fn config_requires_store_path() {
    assert!(parse_config("port = 8080").is_err());
  }

  // ── Routes ──────────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn health_check_answers_at_root() {
    let req = Request::builder().uri("/").body(Body::empty()).unwrap();
    let resp = make_app().await.oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_json(resp).await;
    assert!(body["message"].is_string());
  }

  #[tokio::test]
  async fn api_is_mounted_under_prefix() {
    let req = Request::builder()
      .uri("/api/categories")
      .body(Body::empty())
      .unwrap();
    let resp = make_app().await.oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(body_json(resp).await.as_array().unwrap().len(), 11);

    let req = Request::builder()
      .uri("/categories")
      .body(Body::empty())
      .unwrap();
    let resp = make_app().await.oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
  }

  #[tokio::test]
  async fn preflight_allows_any_origin() {
    let req = Request::builder()
      .method("OPTIONS")
      .uri("/api/transactions")
      .header(header::ORIGIN, "http://localhost:8081")
      .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
      .header(header::ACCESS_CONTROL_REQUEST_HEADERS, "content-type")
      .body(Body::empty())
      .unwrap();
    let resp = make_app().await.oneshot(req).await.unwrap();
    assert!(resp.status().is_success());
    assert_eq!(
      resp.headers().get(header::ACCESS_CONTROL_ALLOW_ORIGIN).unwrap(),
      "*"
    );
    let methods = resp
      .headers()
      .get(header::ACCESS_CONTROL_ALLOW_METHODS)
      .unwrap()
      .to_str()
      .unwrap();
    assert!(methods.contains("PUT"), "allow-methods: {methods}");
  }

  #[tokio::test]
  async fn simple_request_carries_cors_header() {
    let req = Request::builder()
      .uri("/api/categories")
      .header(header::ORIGIN, "http://example.com")
      .body(Body::empty())
      .unwrap();
    let resp = make_app().await.oneshot(req).await.unwrap();
    assert_eq!(
      resp.headers().get(header::ACCESS_CONTROL_ALLOW_ORIGIN).unwrap(),
      "*"
    );
  }
}
