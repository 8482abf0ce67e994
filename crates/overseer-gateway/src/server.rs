//! Gateway server: Axum-based HTTP + WebSocket front end for the chat page

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

use anyhow::Context;
use axum::Router;
use axum::extract::rejection::JsonRejection;
use axum::extract::ws::{Message, WebSocket};
use axum::extract::{ConnectInfo, State, WebSocketUpgrade};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use futures_util::{SinkExt, StreamExt};
use overseer_core::{AgentId, ChatInput, ChatRequest, Dispatcher, registry};
use tokio::net::TcpListener;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tower_http::cors::CorsLayer;
use tracing::{debug, error, info, warn};

use crate::protocol::{
    self, ERR_INTERNAL, ERR_INVALID_METHOD, ERR_INVALID_PARAMS, GatewayEvent, GatewayRequest,
    GatewayResponse, Outbound,
};
use crate::session::SessionManager;

/// Shared state for all connections
#[derive(Clone)]
pub struct GatewayState {
    pub sessions: Arc<SessionManager>,
    pub dispatcher: Dispatcher,
    pub start_time: Instant,
}

impl GatewayState {
    pub fn new(dispatcher: Dispatcher) -> Self {
        Self {
            sessions: Arc::new(SessionManager::new()),
            dispatcher,
            start_time: Instant::now(),
        }
    }

    async fn status(&self) -> serde_json::Value {
        serde_json::json!({
            "status": "ok",
            "sessions": self.sessions.count().await,
            "uptime_secs": self.start_time.elapsed().as_secs(),
            "model": self.dispatcher.provider().model(),
        })
    }
}

/// The gateway server
pub struct GatewayServer {
    state: GatewayState,
    bind: SocketAddr,
}

impl GatewayServer {
    pub fn new(bind: SocketAddr, dispatcher: Dispatcher) -> Self {
        Self {
            state: GatewayState::new(dispatcher),
            bind,
        }
    }

    /// Build the Axum router
    pub fn router(&self) -> Router {
        Router::new()
            .route("/ws", get(ws_handler))
            .route("/api/status", get(status_handler))
            .route("/api/agents", get(agents_handler))
            .route("/api/chat", post(chat_handler))
            .route("/", get(crate::webchat::index_handler))
            .route("/assets/{*path}", get(crate::webchat::asset_handler))
            .layer(CorsLayer::permissive())
            .with_state(self.state.clone())
    }

    /// Bind the configured address and serve until `shutdown` fires
    pub async fn run(self, shutdown: CancellationToken) -> anyhow::Result<()> {
        let listener = TcpListener::bind(self.bind)
            .await
            .with_context(|| format!("Failed to bind gateway to {}", self.bind))?;
        self.serve(listener, shutdown).await
    }

    /// Serve on an already-bound listener until `shutdown` fires
    pub async fn serve(self, listener: TcpListener, shutdown: CancellationToken) -> anyhow::Result<()> {
        let router = self.router();
        info!("Gateway listening on http://{}", listener.local_addr()?);

        axum::serve(
            listener,
            router.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .with_graceful_shutdown(async move { shutdown.cancelled().await })
        .await?;

        info!("Gateway stopped");
        Ok(())
    }
}

// ── HTTP Handlers ──

async fn status_handler(State(state): State<GatewayState>) -> impl IntoResponse {
    axum::Json(state.status().await)
}

async fn agents_handler() -> impl IntoResponse {
    axum::Json(serde_json::json!({ "agents": registry() }))
}

/// One-shot dispatch without a session. Malformed bodies and validation
/// failures are 400s with `{"error": ...}`; provider failures come back as
/// `success: false`.
async fn chat_handler(
    State(state): State<GatewayState>,
    body: Result<axum::Json<serde_json::Value>, JsonRejection>,
) -> Response {
    let parsed = match body {
        Ok(axum::Json(params)) => parse_chat_params(&params),
        Err(rejection) => Err(rejection.body_text()),
    };
    match parsed {
        Ok(request) => axum::Json(state.dispatcher.dispatch(&request).await).into_response(),
        Err(message) => (
            StatusCode::BAD_REQUEST,
            axum::Json(serde_json::json!({ "error": message })),
        )
            .into_response(),
    }
}

// ── WebSocket Handler ──

async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<GatewayState>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
) -> impl IntoResponse {
    info!("WebSocket connection from {}", addr);
    ws.on_upgrade(move |socket| handle_ws(socket, state, addr))
}

async fn handle_ws(socket: WebSocket, state: GatewayState, addr: SocketAddr) {
    let (mut ws_sender, mut ws_receiver) = socket.split();
    let session = state.sessions.create().await;
    let (outbound_tx, mut outbound_rx) = mpsc::unbounded_channel::<Outbound>();

    // Single writer: responses and events for this connection only
    let send_task = tokio::spawn(async move {
        while let Some(outbound) = outbound_rx.recv().await {
            let json = match serde_json::to_string(&outbound) {
                Ok(j) => j,
                Err(e) => {
                    error!("Failed to serialize outbound message: {}", e);
                    continue;
                }
            };
            if ws_sender.send(Message::Text(json.into())).await.is_err() {
                break;
            }
        }
    });

    while let Some(msg) = ws_receiver.next().await {
        let msg = match msg {
            Ok(Message::Text(text)) => text,
            Ok(Message::Close(_)) => {
                debug!("Client {} sent close", addr);
                break;
            }
            Ok(_) => continue,
            Err(e) => {
                warn!("WebSocket error from {}: {}", addr, e);
                break;
            }
        };

        if let Some(response) = handle_request(&state, &session.id, &outbound_tx, &msg).await {
            if outbound_tx.send(response.into()).is_err() {
                break;
            }
        }
    }

    send_task.abort();
    state.sessions.remove(&session.id).await;
    info!("Client {} disconnected", addr);
}

/// Handle one request from a connection. Returns the immediate response, or
/// `None` when the response will be written later by a spawned dispatch.
async fn handle_request(
    state: &GatewayState,
    session_id: &str,
    outbound: &mpsc::UnboundedSender<Outbound>,
    raw: &str,
) -> Option<GatewayResponse> {
    let req: GatewayRequest = match serde_json::from_str(raw) {
        Ok(r) => r,
        Err(e) => {
            return Some(GatewayResponse::err(
                None,
                ERR_INVALID_PARAMS,
                format!("Invalid JSON: {}", e),
            ));
        }
    };

    let id = req.id.clone();

    let response = match req.method.as_str() {
        protocol::methods::STATUS_GET => {
            let mut status = state.status().await;
            status["session_id"] = serde_json::json!(session_id);
            status["session"] = serde_json::json!(state.sessions.get(session_id).await);
            GatewayResponse::ok(id, status)
        }

        protocol::methods::AGENT_LIST => {
            GatewayResponse::ok(id, serde_json::to_value(registry()).unwrap_or_default())
        }

        protocol::methods::TRANSCRIPT_GET => {
            let agent = match req.params.get("agent").and_then(|v| v.as_str()) {
                Some(raw_agent) => match raw_agent.parse::<AgentId>() {
                    Ok(agent) => Some(agent),
                    Err(e) => {
                        return Some(GatewayResponse::err(id, ERR_INVALID_PARAMS, e.to_string()));
                    }
                },
                None => None,
            };

            match state.sessions.transcript(session_id, agent).await {
                Some(entries) => GatewayResponse::ok(
                    id,
                    serde_json::json!({
                        "session_id": session_id,
                        "agent": agent,
                        "entries": entries,
                    }),
                ),
                None => GatewayResponse::err(
                    id,
                    ERR_INTERNAL,
                    format!("Session '{}' not found", session_id),
                ),
            }
        }

        protocol::methods::MESSAGE_SEND => {
            let request = match parse_chat_params(&req.params) {
                Ok(r) => r,
                Err(message) => return Some(GatewayResponse::err(id, ERR_INVALID_PARAMS, message)),
            };

            let Some(user_entry) = state.sessions.record_request(session_id, &request).await else {
                return Some(GatewayResponse::err(
                    id,
                    ERR_INTERNAL,
                    format!("Session '{}' not found", session_id),
                ));
            };

            let _ = outbound.send(
                GatewayEvent::new(
                    protocol::events::TYPING_START,
                    serde_json::json!({ "agent": request.agent() }),
                )
                .into(),
            );

            let state = state.clone();
            let outbound = outbound.clone();
            let session_id = session_id.to_string();
            tokio::spawn(async move {
                let result = state.dispatcher.dispatch(&request).await;
                let agent_entry = state.sessions.record_result(&session_id, &result).await;

                let _ = outbound.send(
                    GatewayEvent::new(
                        protocol::events::TYPING_STOP,
                        serde_json::json!({ "agent": result.agent }),
                    )
                    .into(),
                );

                let Some(agent_entry) = agent_entry else {
                    debug!("Session {} closed before reply from '{}'", session_id, result.agent);
                    return;
                };

                let _ = outbound.send(
                    GatewayEvent::new(
                        protocol::events::MESSAGE_RECEIVED,
                        serde_json::json!({ "entry": agent_entry, "result": result }),
                    )
                    .into(),
                );
                let _ = outbound.send(
                    GatewayResponse::ok(
                        id,
                        serde_json::json!({
                            "result": result,
                            "user_entry": user_entry,
                            "agent_entry": agent_entry,
                        }),
                    )
                    .into(),
                );
            });

            return None;
        }

        _ => GatewayResponse::err(
            id,
            ERR_INVALID_METHOD,
            format!("Unknown method: {}", req.method),
        ),
    };

    Some(response)
}

fn parse_chat_params(params: &serde_json::Value) -> Result<ChatRequest, String> {
    let input: ChatInput = if params.is_null() {
        ChatInput::default()
    } else {
        serde_json::from_value(params.clone()).map_err(|e| format!("Invalid params: {}", e))?
    };
    ChatRequest::try_from(input).map_err(|e| e.to_string())
}
