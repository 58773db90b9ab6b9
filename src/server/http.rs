//! HTTP server implementation
//!
//! Uses hyper http1 with TokioIo for async handling. Each request is routed
//! to exactly one route group by path prefix; groups that decline a request
//! fall through to the 404 envelope.

use bytes::Bytes;
use http_body_util::{BodyExt, Full};
use hyper::body::Incoming;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::{Method, Request, Response, StatusCode};
use hyper_util::rt::TokioIo;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;
use tokio::net::TcpListener;
use tracing::{error, info};

use crate::auth::SessionStore;
use crate::config::Args;
use crate::routes;
use crate::services::{AppointmentService, ConnectionService, EngagementService, MessageService};
use crate::store::EntityStore;
use crate::types::ApiError;

type BoxBody = http_body_util::combinators::BoxBody<Bytes, hyper::Error>;

/// Shared application state
pub struct AppState {
    pub args: Args,
    /// Entity store backing every domain service
    pub store: Arc<dyn EntityStore>,
    /// Live cookie sessions
    pub sessions: Arc<SessionStore>,
    pub connections: ConnectionService,
    pub appointments: AppointmentService,
    pub engagement: EngagementService,
    pub messages: MessageService,
    /// Server start, for uptime reporting
    pub started_at: Instant,
}

impl AppState {
    pub fn new(args: Args, store: Arc<dyn EntityStore>) -> Self {
        let sessions = Arc::new(SessionStore::new(args.session_ttl_secs));
        Self {
            connections: ConnectionService::new(Arc::clone(&store)),
            appointments: AppointmentService::new(Arc::clone(&store)),
            engagement: EngagementService::new(Arc::clone(&store)),
            messages: MessageService::new(Arc::clone(&store)),
            store,
            sessions,
            args,
            started_at: Instant::now(),
        }
    }
}

pub async fn run(state: Arc<AppState>) -> Result<(), ApiError> {
    let listener = TcpListener::bind(state.args.listen).await?;

    info!(
        "MediConnect API listening on {} ({} storage)",
        state.args.listen,
        state.args.storage.as_str()
    );

    loop {
        match listener.accept().await {
            Ok((stream, addr)) => {
                let state = Arc::clone(&state);
                tokio::spawn(async move {
                    let io = TokioIo::new(stream);

                    let service = service_fn(move |req| {
                        let state = Arc::clone(&state);
                        async move { handle_request(state, addr, req).await }
                    });

                    if let Err(err) = http1::Builder::new().serve_connection(io, service).await {
                        error!("Error serving connection from {}: {:?}", addr, err);
                    }
                });
            }
            Err(e) => {
                error!("Error accepting connection: {:?}", e);
            }
        }
    }
}

/// Route incoming HTTP requests
async fn handle_request(
    state: Arc<AppState>,
    addr: SocketAddr,
    req: Request<Incoming>,
) -> Result<Response<BoxBody>, hyper::Error> {
    let method = req.method().clone();
    let path = req.uri().path().to_string();

    info!("[{}] {} {}", addr, method, path);

    // Probes and build info live outside /api
    match (&method, path.as_str()) {
        (&Method::GET, "/health") | (&Method::GET, "/healthz") => {
            return Ok(to_boxed(routes::health_check(Arc::clone(&state))));
        }
        (&Method::GET, "/version") => return Ok(to_boxed(routes::version_info())),
        _ => {}
    }

    // Route groups consume the request, so pick one by prefix
    let response = if path == "/api/register"
        || path == "/api/login"
        || path == "/api/logout"
        || path == "/api/user"
        || path.starts_with("/api/user/")
    {
        routes::handle_auth_request(req, state).await
    } else if path.starts_with("/api/posts") {
        routes::handle_posts_request(req, state).await
    } else if path.starts_with("/api/connections") {
        routes::handle_connections_request(req, state).await
    } else if path.starts_with("/api/messages") {
        routes::handle_messages_request(req, state).await
    } else if path.starts_with("/api/appointments") {
        routes::handle_appointments_request(req, state).await
    } else if path.starts_with("/api/doctors") || path.starts_with("/api/patients") {
        routes::handle_directory_request(req, state).await
    } else if path.starts_with("/api/health-topics") {
        routes::handle_topics_request(req, state).await
    } else {
        None
    };

    match response {
        Some(response) => Ok(response),
        None => Ok(to_boxed(not_found_response(&path))),
    }
}

/// Convert a Full<Bytes> body to BoxBody
fn to_boxed(response: Response<Full<Bytes>>) -> Response<BoxBody> {
    response.map(|body| body.map_err(|never| match never {}).boxed())
}

/// Not found response
fn not_found_response(path: &str) -> Response<Full<Bytes>> {
    let body = serde_json::json!({ "message": format!("Not found: {}", path) });

    Response::builder()
        .status(StatusCode::NOT_FOUND)
        .header("Content-Type", "application/json")
        .body(Full::new(Bytes::from(body.to_string())))
        .unwrap()
}
