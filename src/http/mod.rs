//! HTTP / WebSocket 介面
//!
//! - POST /api/chat：一輪對話，回覆附帶本輪結束時的事實快照
//! - POST /api/fact/set、GET /api/fact/get/*path：直接讀寫事實
//! - GET /api/facts/all、GET /api/graph/current、GET /api/sessions
//! - GET /ws/chat：每個文字訊息為一輪，回傳 `{message, graph}`

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    extract::{
        ws::{Message as WsMessage, WebSocket, WebSocketUpgrade},
        Path, Query, State,
    },
    http::StatusCode,
    response::Response,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tokio_util::sync::CancellationToken;

use crate::core::{SessionInfo, TurnOrchestrator};
use crate::facts::{known_paths, FactSnapshot, FactValue};

/// 未指定 session_id 時使用的會話鍵
pub const DEFAULT_SESSION: &str = "default";

pub struct AppState {
    pub orchestrator: Arc<TurnOrchestrator>,
}

type ApiResult<T> = Result<Json<T>, (StatusCode, String)>;

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub message: String,
    #[serde(default)]
    pub session_id: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ChatResponse {
    pub message: String,
    pub session_id: String,
    pub fact_graph_data: FactSnapshot,
}

#[derive(Debug, Deserialize)]
pub struct SetFactRequest {
    pub path: String,
    pub value: serde_json::Value,
    #[serde(default)]
    pub session_id: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct SessionQuery {
    #[serde(default)]
    pub session_id: Option<String>,
}

fn session_key(requested: Option<String>) -> String {
    requested
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| DEFAULT_SESSION.to_string())
}

/// JSON 請求值轉事實值：字串走字面解析，布林與數字保留型別
fn value_from_json(value: &serde_json::Value) -> Result<FactValue, String> {
    match value {
        serde_json::Value::String(s) => Ok(FactValue::parse_literal(s)),
        serde_json::Value::Bool(b) => Ok(FactValue::Boolean(*b)),
        serde_json::Value::Number(n) => n
            .as_f64()
            .map(FactValue::Number)
            .ok_or_else(|| format!("unsupported number {n}")),
        other => Err(format!("unsupported fact value {other}")),
    }
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/api/health", get(|| async { "OK" }))
        .route("/api/chat", post(api_chat))
        .route("/api/fact/set", post(api_fact_set))
        .route("/api/fact/get/*path", get(api_fact_get))
        .route("/api/facts/all", get(api_facts_all))
        .route("/api/graph/current", get(api_graph_current))
        .route("/api/sessions", get(api_sessions))
        .route("/ws/chat", get(ws_chat))
        .with_state(state)
}

/// 綁定位址並服務，直到 shutdown 被取消
pub async fn serve(
    orchestrator: Arc<TurnOrchestrator>,
    addr: SocketAddr,
    shutdown: CancellationToken,
) -> anyhow::Result<()> {
    let app = router(Arc::new(AppState { orchestrator }));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("factchat API: http://{}", listener.local_addr()?);
    tracing::info!("WebSocket: ws://{}/ws/chat", listener.local_addr()?);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown.cancelled_owned())
        .await?;
    Ok(())
}

async fn root(State(state): State<Arc<AppState>>) -> Json<serde_json::Value> {
    Json(json!({
        "message": "Fact Graph + LLM API",
        "status": "running",
        "sessions": state.orchestrator.sessions().active_count().await,
    }))
}

async fn api_chat(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ChatRequest>,
) -> ApiResult<ChatResponse> {
    let message = req.message.trim();
    if message.is_empty() {
        return Err((StatusCode::BAD_REQUEST, "message is required".to_string()));
    }
    let session_id = session_key(req.session_id);
    tracing::info!(session = %session_id, "chat message received");

    let outcome = state.orchestrator.run_turn(message, &session_id).await;
    Ok(Json(ChatResponse {
        message: outcome.reply,
        session_id,
        fact_graph_data: outcome.facts,
    }))
}

async fn api_fact_set(
    State(state): State<Arc<AppState>>,
    Json(req): Json<SetFactRequest>,
) -> ApiResult<serde_json::Value> {
    let path = req.path.trim();
    if path.is_empty() {
        return Err((StatusCode::BAD_REQUEST, "path is required".to_string()));
    }
    let value = value_from_json(&req.value).map_err(|e| (StatusCode::BAD_REQUEST, e))?;

    let session = state
        .orchestrator
        .sessions()
        .get_or_create(&session_key(req.session_id))
        .await;
    let stored = session
        .lock()
        .await
        .set_fact(path, value)
        .map_err(|e| (StatusCode::BAD_REQUEST, e.to_string()))?;

    Ok(Json(json!({
        "success": true,
        "result": { "path": path, "value": stored.to_json() },
    })))
}

async fn api_fact_get(
    State(state): State<Arc<AppState>>,
    Path(path): Path<String>,
    Query(query): Query<SessionQuery>,
) -> Json<serde_json::Value> {
    let path = format!("/{}", path.trim_start_matches('/'));
    // 只讀：不存在的會話不建立
    let value = match state
        .orchestrator
        .sessions()
        .get(&session_key(query.session_id))
        .await
    {
        Some(session) => {
            let session = session.lock().await;
            session.facts.get(&path)
        }
        None => None,
    };
    Json(json!({
        "path": path,
        "value": value.map(|v| v.to_json()),
    }))
}

async fn api_facts_all() -> Json<serde_json::Value> {
    let paths = known_paths();
    Json(json!({ "count": paths.len(), "paths": paths }))
}

async fn api_graph_current(
    State(state): State<Arc<AppState>>,
    Query(query): Query<SessionQuery>,
) -> Json<serde_json::Value> {
    let graph = match state
        .orchestrator
        .sessions()
        .get(&session_key(query.session_id))
        .await
    {
        Some(session) => {
            let session = session.lock().await;
            session.facts.snapshot()
        }
        None => FactSnapshot::new(),
    };
    Json(json!({ "graph": graph }))
}

async fn api_sessions(State(state): State<Arc<AppState>>) -> Json<Vec<SessionInfo>> {
    Json(state.orchestrator.sessions().list().await)
}

async fn ws_chat(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
    Query(query): Query<SessionQuery>,
) -> Response {
    // 每個連線未指定時各自一個會話
    let key = query
        .session_id
        .filter(|s| !s.trim().is_empty())
        .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());
    ws.on_upgrade(move |socket| ws_session(socket, state, key))
}

async fn ws_session(mut socket: WebSocket, state: Arc<AppState>, key: String) {
    tracing::info!(session = %key, "websocket connected");
    while let Some(msg) = socket.recv().await {
        let msg = match msg {
            Ok(m) => m,
            Err(e) => {
                tracing::warn!(session = %key, "websocket error: {}", e);
                break;
            }
        };
        match msg {
            WsMessage::Text(text) => {
                let outcome = state.orchestrator.run_turn(&text, &key).await;
                let payload = json!({ "message": outcome.reply, "graph": outcome.facts });
                if socket.send(WsMessage::Text(payload.to_string())).await.is_err() {
                    break;
                }
            }
            WsMessage::Close(_) => break,
            _ => {}
        }
    }
    tracing::info!(session = %key, "websocket disconnected");
}
