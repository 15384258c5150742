use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{OriginalUri, Path, State},
    http::{header, HeaderMap, Method, StatusCode},
    response::{IntoResponse, Response},
    routing::{any, get, post},
    Json, Router,
};
use base64::{engine::general_purpose::STANDARD, Engine};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tokio::{net::TcpListener, sync::RwLock};

pub const DEFAULT_USER: &str = "user";
pub const DEFAULT_PASSWORD: &str = "pass";

/// What the server saw, returned by `/echo`.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Echo {
    pub method: String,
    pub uri: String,
    pub content_type: Option<String>,
    pub authorization: Option<String>,
    pub body: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Txt2Img {
    pub prompt: String,
    #[serde(default)]
    pub negative_prompt: String,
    #[serde(default = "default_steps")]
    pub steps: u32,
    #[serde(default = "default_batch_size")]
    pub batch_size: u32,
}

fn default_steps() -> u32 {
    20
}

fn default_batch_size() -> u32 {
    1
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Txt2ImgResponse {
    pub images: Vec<String>,
    pub parameters: Value,
    pub info: String,
}

#[derive(Clone)]
pub struct AppState {
    options: Arc<RwLock<Map<String, Value>>>,
    expected_auth: String,
}

pub fn app() -> Router {
    app_with_auth(DEFAULT_USER, DEFAULT_PASSWORD)
}

/// Router whose `/protected` route accepts only `user` / `password`.
pub fn app_with_auth(user: &str, password: &str) -> Router {
    let mut options = Map::new();
    options.insert("sd_model_checkpoint".to_string(), Value::from("v1-5-pruned-emaonly.safetensors"));
    options.insert("CLIP_stop_at_last_layers".to_string(), Value::from(1));

    let state = AppState {
        options: Arc::new(RwLock::new(options)),
        expected_auth: format!("Basic {}", STANDARD.encode(format!("{user}:{password}"))),
    };

    Router::new()
        .route("/echo", any(echo))
        .route("/echo/{*rest}", any(echo))
        .route("/sdapi/v1/options", get(get_options).post(set_options))
        .route("/sdapi/v1/txt2img", post(txt2img))
        .route("/protected", get(protected))
        .route("/status/{code}", any(status))
        .fallback(not_found)
        .with_state(state)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

fn header_string(headers: &HeaderMap, name: header::HeaderName) -> Option<String> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
}

async fn echo(method: Method, OriginalUri(uri): OriginalUri, headers: HeaderMap, body: Bytes) -> Json<Echo> {
    Json(Echo {
        method: method.to_string(),
        uri: uri.to_string(),
        content_type: header_string(&headers, header::CONTENT_TYPE),
        authorization: header_string(&headers, header::AUTHORIZATION),
        body: String::from_utf8_lossy(&body).into_owned(),
    })
}

async fn get_options(State(state): State<AppState>) -> Json<Value> {
    let options = state.options.read().await;
    Json(Value::Object(options.clone()))
}

async fn set_options(State(state): State<AppState>, Json(patch): Json<Map<String, Value>>) -> Json<Value> {
    let mut options = state.options.write().await;
    options.extend(patch);
    Json(Value::Null)
}

async fn txt2img(Json(input): Json<Txt2Img>) -> Json<Txt2ImgResponse> {
    let images = (0..input.batch_size)
        .map(|i| STANDARD.encode(format!("image {i}: {}", input.prompt)))
        .collect();
    let info = format!("{}\nSteps: {}", input.prompt, input.steps);
    let parameters = serde_json::to_value(&input).unwrap_or(Value::Null);
    Json(Txt2ImgResponse {
        images,
        parameters,
        info,
    })
}

async fn protected(State(state): State<AppState>, headers: HeaderMap) -> Response {
    match header_string(&headers, header::AUTHORIZATION) {
        Some(auth) if auth == state.expected_auth => (StatusCode::OK, "ok").into_response(),
        _ => {
            tracing::debug!("rejected request to /protected");
            (StatusCode::UNAUTHORIZED, "unauthorized").into_response()
        }
    }
}

async fn status(Path(code): Path<u16>) -> Response {
    let Ok(status) = StatusCode::from_u16(code) else {
        return (StatusCode::BAD_REQUEST, "invalid status code").into_response();
    };
    if status == StatusCode::NO_CONTENT || status == StatusCode::NOT_MODIFIED {
        return status.into_response();
    }
    (status, format!("status {code}")).into_response()
}

async fn not_found() -> (StatusCode, &'static str) {
    (StatusCode::NOT_FOUND, "not found")
}
