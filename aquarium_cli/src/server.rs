//! HTTP API over the aquarium gateway.

use aquarium_core::{Aquarium, AquariumError, AquariumState, HistorySeries};
use axum::extract::{Request, State};
use axum::http::{HeaderValue, Method, StatusCode, header};
use axum::middleware::{self, Next};
use axum::response::{Html, IntoResponse, Response};
use axum::routing::{delete, get, post};
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::{Value, json};

const DASHBOARD: &str = include_str!("../static/index.html");

#[derive(Clone)]
pub struct AppState {
    pub aquarium: Aquarium,
}

pub fn router(aquarium: Aquarium) -> Router {
    Router::new()
        .route("/", get(dashboard))
        .route("/healthz", get(health))
        .route("/api/status", get(status))
        .route("/api/history", get(history))
        .route("/api/light/toggle", post(toggle_light))
        .route("/api/leak/toggle", post(toggle_leak))
        .route("/api/manual/water", post(manual_water))
        .route("/api/manual/air", post(manual_air))
        .route("/api/manual/leak", post(manual_leak))
        .route("/api/manual", delete(clear_manual))
        .layer(middleware::from_fn(cors))
        .with_state(AppState { aquarium })
}

/// Allow any origin; answer preflight requests directly.
async fn cors(req: Request, next: Next) -> Response {
    let mut res = if req.method() == Method::OPTIONS {
        StatusCode::NO_CONTENT.into_response()
    } else {
        next.run(req).await
    };
    let h = res.headers_mut();
    h.insert(header::ACCESS_CONTROL_ALLOW_ORIGIN, HeaderValue::from_static("*"));
    h.insert(
        header::ACCESS_CONTROL_ALLOW_METHODS,
        HeaderValue::from_static("GET, POST, DELETE, OPTIONS"),
    );
    h.insert(
        header::ACCESS_CONTROL_ALLOW_HEADERS,
        HeaderValue::from_static("content-type"),
    );
    res
}

fn success() -> Json<Value> {
    Json(json!({ "status": "success" }))
}

fn rejected(err: &AquariumError) -> Response {
    (
        StatusCode::UNPROCESSABLE_ENTITY,
        Json(json!({ "status": "error", "message": err.to_string() })),
    )
        .into_response()
}

async fn dashboard() -> Html<&'static str> {
    Html(DASHBOARD)
}

async fn health() -> StatusCode {
    StatusCode::OK
}

async fn status(State(app): State<AppState>) -> Json<AquariumState> {
    Json(app.aquarium.status())
}

async fn history(State(app): State<AppState>) -> Json<HistorySeries> {
    Json(app.aquarium.history())
}

async fn toggle_light(State(app): State<AppState>) -> Json<Value> {
    let on = app.aquarium.toggle_light();
    tracing::info!(light_on = on, "light toggled via http");
    success()
}

async fn toggle_leak(State(app): State<AppState>) -> Json<Value> {
    let leak = app.aquarium.toggle_leak();
    tracing::info!(water_leak = leak, "leak toggled via http");
    success()
}

#[derive(Debug, Deserialize)]
struct TempBody {
    value: f64,
}

/// Accepts `true`/`false` or `0`/`1`.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum LeakValue {
    Flag(bool),
    Number(i64),
}

#[derive(Debug, Deserialize)]
struct LeakBody {
    value: LeakValue,
}

async fn manual_water(State(app): State<AppState>, Json(body): Json<TempBody>) -> Response {
    match app.aquarium.set_manual_temp_water(body.value) {
        Ok(()) => success().into_response(),
        Err(e) => rejected(&e),
    }
}

async fn manual_air(State(app): State<AppState>, Json(body): Json<TempBody>) -> Response {
    match app.aquarium.set_manual_temp_air(body.value) {
        Ok(()) => success().into_response(),
        Err(e) => rejected(&e),
    }
}

async fn manual_leak(State(app): State<AppState>, Json(body): Json<LeakBody>) -> Response {
    let leak = match body.value {
        LeakValue::Flag(b) => b,
        LeakValue::Number(0) => false,
        LeakValue::Number(1) => true,
        LeakValue::Number(n) => {
            return rejected(&AquariumError::Validation {
                field: "manual_water_leak",
                reason: format!("{n} is not 0 or 1"),
            });
        }
    };
    app.aquarium.set_manual_leak(leak);
    success().into_response()
}

async fn clear_manual(State(app): State<AppState>) -> Json<Value> {
    app.aquarium.clear_manual_overrides();
    success()
}

#[cfg(test)]
mod tests {
    use super::*;
    use aquarium_core::StoreCfg;
    use aquarium_traits::test_clock::ManualClock;
    use axum::body::{Body, to_bytes};
    use axum::http::Request as HttpRequest;
    use rstest::rstest;
    use tower::ServiceExt; // for `oneshot`

    fn app() -> (Router, Aquarium) {
        let aquarium = Aquarium::new(&StoreCfg::default(), ManualClock::at(9, 30));
        (router(aquarium.clone()), aquarium)
    }

    async fn call(app: Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value, Response) {
        let mut req = HttpRequest::builder().method(method).uri(uri);
        let body = match body {
            Some(v) => {
                req = req.header("content-type", "application/json");
                Body::from(v.to_string())
            }
            None => Body::empty(),
        };
        let resp = app.oneshot(req.body(body).unwrap()).await.unwrap();
        let status = resp.status();
        let (parts, body) = resp.into_parts();
        let bytes = to_bytes(body, usize::MAX).await.unwrap();
        let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, json, Response::from_parts(parts, Body::empty()))
    }

    #[tokio::test]
    async fn status_is_flat_state() {
        let (app, _) = app();
        let (code, v, resp) = call(app, "GET", "/api/status", None).await;
        assert_eq!(code, StatusCode::OK);
        assert_eq!(v["temp_water"], 24.5);
        assert_eq!(v["temp_air"], 22.0);
        assert_eq!(v["water_leak"], false);
        assert_eq!(v["feeding_time"], "12:00");
        assert!(v["manual_temp_water"].is_null());
        assert_eq!(resp.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN], "*");
    }

    #[tokio::test]
    async fn history_starts_empty() {
        let (app, _) = app();
        let (code, v, _) = call(app, "GET", "/api/history", None).await;
        assert_eq!(code, StatusCode::OK);
        assert_eq!(v, json!({ "water": [], "air": [], "labels": [] }));
    }

    #[tokio::test]
    async fn toggles_flip_flags() {
        let (app, aq) = app();
        let (code, v, _) = call(app.clone(), "POST", "/api/light/toggle", None).await;
        assert_eq!(code, StatusCode::OK);
        assert_eq!(v["status"], "success");
        assert!(aq.status().light_on);

        call(app, "POST", "/api/leak/toggle", None).await;
        let s = aq.status();
        assert!(s.water_leak);
        assert_eq!(s.manual_water_leak, Some(true));
    }

    #[rstest]
    #[case("/api/manual/water", json!({"value": 27.0}), StatusCode::OK)]
    #[case("/api/manual/water", json!({"value": 50.0}), StatusCode::UNPROCESSABLE_ENTITY)]
    #[case("/api/manual/air", json!({"value": 10.0}), StatusCode::OK)]
    #[case("/api/manual/air", json!({"value": 9.9}), StatusCode::UNPROCESSABLE_ENTITY)]
    #[case("/api/manual/leak", json!({"value": 1}), StatusCode::OK)]
    #[case("/api/manual/leak", json!({"value": false}), StatusCode::OK)]
    #[case("/api/manual/leak", json!({"value": 3}), StatusCode::UNPROCESSABLE_ENTITY)]
    #[tokio::test]
    async fn manual_endpoints(#[case] uri: &str, #[case] body: Value, #[case] expected: StatusCode) {
        let (app, aq) = app();
        let before = aq.status();
        let (code, v, _) = call(app, "POST", uri, Some(body)).await;
        assert_eq!(code, expected);
        if expected == StatusCode::OK {
            assert_eq!(v["status"], "success");
            assert!(aq.status().has_manual_override());
        } else {
            assert_eq!(v["status"], "error");
            assert!(v["message"].as_str().is_some_and(|m| !m.is_empty()));
            assert_eq!(aq.status(), before);
        }
    }

    #[tokio::test]
    async fn delete_manual_restores_auto() {
        let (app, aq) = app();
        aq.set_manual_temp_water(30.0).unwrap();
        aq.set_manual_leak(true);
        let (code, _, _) = call(app, "DELETE", "/api/manual", None).await;
        assert_eq!(code, StatusCode::OK);
        let s = aq.status();
        assert!(!s.has_manual_override());
        assert_eq!(s.temp_water, 24.5);
        assert!(!s.water_leak);
    }

    #[tokio::test]
    async fn preflight_and_health() {
        let (app, _) = app();
        let (code, _, resp) = call(app.clone(), "OPTIONS", "/api/light/toggle", None).await;
        assert_eq!(code, StatusCode::NO_CONTENT);
        assert_eq!(resp.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN], "*");
        let (code, _, _) = call(app.clone(), "GET", "/healthz", None).await;
        assert_eq!(code, StatusCode::OK);

        let resp = app
            .oneshot(HttpRequest::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        assert!(String::from_utf8_lossy(&bytes).contains("/api/status"));
    }
}
