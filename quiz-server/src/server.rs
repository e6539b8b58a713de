use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    Router,
    extract::Path,
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use quiz_core::{Clock, ProgressGate, QuestionBank, TokenGenerator};
use rust_embed::RustEmbed;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};

use crate::activity::ActivityLog;
use crate::config::ServerConfig;
use crate::error::{Result, ServerError};
use crate::handler;
use crate::session::SessionManager;

pub const START_PATH: &str = "/";
pub const SUBMIT_PATH: &str = "/submit";
pub const SUCCESS_PATH: &str = "/success";
pub const FEEDBACK_PATH: &str = "/feedback";
pub const LOG_CLICK_PATH: &str = "/log-click";
pub const GIFT_PATH: &str = "/gift";
pub const LETSGO_PATH: &str = "/letsgo";

/// URL of a question page.
pub fn question_path(question_id: u32, token: &str) -> String {
    format!("/question/{}/{}", question_id, token)
}

// Embed static files at compile time
#[derive(RustEmbed)]
#[folder = "static/"]
struct StaticAssets;

#[derive(Clone)]
pub struct AppState {
    pub gate: Arc<ProgressGate>,
    pub sessions: SessionManager,
    pub activity: ActivityLog,
    pub cookie_secure: bool,
}

impl AppState {
    pub fn new(
        config: &ServerConfig,
        clock: Arc<dyn Clock>,
        sessions: SessionManager,
        activity: ActivityLog,
    ) -> Self {
        let gate = ProgressGate::new(
            QuestionBank::default(),
            TokenGenerator::new(config.secret.clone()),
            clock,
        );
        Self {
            gate: Arc::new(gate),
            sessions,
            activity,
            cookie_secure: config.cookie_secure,
        }
    }
}

pub fn create_app(state: AppState) -> Router {
    Router::new()
        .route(START_PATH, get(handler::start))
        .route("/question/:id/:token", get(handler::question))
        .route(SUBMIT_PATH, post(handler::submit))
        .route(SUCCESS_PATH, get(handler::success))
        .route(FEEDBACK_PATH, post(handler::feedback))
        .route(LOG_CLICK_PATH, post(handler::log_click))
        .route(GIFT_PATH, get(handler::gift))
        .route(LETSGO_PATH, get(handler::letsgo))
        .route("/static/*path", get(serve_static))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

// Serve embedded static files
async fn serve_static(Path(path): Path<String>) -> impl IntoResponse {
    serve_static_file(&path)
}

fn serve_static_file(path: &str) -> Response {
    match StaticAssets::get(path) {
        Some(content) => {
            let mime = mime_guess::from_path(path).first_or_octet_stream();
            (
                StatusCode::OK,
                [(header::CONTENT_TYPE, mime.as_ref())],
                content.data,
            )
                .into_response()
        }
        None => (StatusCode::NOT_FOUND, "404 Not Found").into_response(),
    }
}

/// A running server and its background tasks.
pub struct ServerHandle {
    addr: SocketAddr,
    shutdown: CancellationToken,
    server: JoinHandle<()>,
    sweeper: Option<JoinHandle<()>>,
    log_writer: JoinHandle<()>,
}

impl ServerHandle {
    /// Address the listener is bound to.
    pub fn local_addr(&self) -> SocketAddr {
        self.addr
    }

    /// Token that stops the server when cancelled.
    pub fn shutdown_token(&self) -> CancellationToken {
        self.shutdown.clone()
    }

    /// Stop accepting requests and wait for in-flight work and queued
    /// activity lines.
    pub async fn shutdown(self) {
        self.shutdown.cancel();
        self.wait().await;
    }

    /// Wait until the server stops on its own or through the shutdown token.
    pub async fn wait(self) {
        if let Err(e) = self.server.await {
            warn!("Server task ended abnormally: {}", e);
        }
        // The sweeper shares the token; make sure it stops with the server.
        self.shutdown.cancel();
        if let Some(sweeper) = self.sweeper {
            let _ = sweeper.await;
        }
        // The router owned the last activity log handles, so the writer
        // drains and exits now.
        if let Err(e) = self.log_writer.await {
            warn!("Activity log writer ended abnormally: {}", e);
        }
        info!("Quiz server stopped");
    }
}

/// Bind `config.addr` and serve the quiz in a background task.
pub async fn start_server(config: &ServerConfig, clock: Arc<dyn Clock>) -> Result<ServerHandle> {
    let listener = TcpListener::bind(&config.addr)
        .await
        .map_err(|source| ServerError::Bind {
            addr: config.addr.clone(),
            source,
        })?;
    let addr = listener.local_addr()?;

    let shutdown = CancellationToken::new();
    if config.session_ttl.is_none() {
        warn!("Session expiry is disabled; idle sessions are kept until restart");
    }
    let sessions = SessionManager::new(config.session_ttl);
    let sweeper = sessions.spawn_sweeper(shutdown.clone());
    let (activity, log_writer) = ActivityLog::spawn(config.activity_log.clone());

    let app = create_app(AppState::new(config, clock, sessions, activity));

    info!("Quiz server listening on http://{}", addr);

    let signal = shutdown.clone();
    let server = tokio::spawn(async move {
        let result = axum::serve(
            listener,
            app.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .with_graceful_shutdown(signal.cancelled_owned())
        .await;
        if let Err(e) = result {
            error!("Server error: {}", e);
        }
    });

    Ok(ServerHandle {
        addr,
        shutdown,
        server,
        sweeper,
        log_writer,
    })
}
