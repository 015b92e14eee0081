//! HTTP server for the Planillas tools.
//!
//! Every pipeline endpoint sits behind a session cookie obtained from
//! `/api/login`. Workbooks are stored in the upload directory and the
//! pipelines run on the blocking pool.
//!
//! # API Endpoints
//!
//! | Method | Path                       | Description                          |
//! |--------|----------------------------|--------------------------------------|
//! | GET    | `/health`                  | Health check                         |
//! | POST   | `/api/login`               | Open a session                       |
//! | POST   | `/api/logout`              | Close the session                    |
//! | POST   | `/api/password`            | Change the password                  |
//! | POST   | `/api/normalize`           | Normalize an uploaded workbook       |
//! | POST   | `/api/sheets`              | List `Analisis*` sheets of a workbook|
//! | POST   | `/api/transfer`            | Transfer an analysis sheet to `BD6`  |
//! | GET    | `/api/download/{filename}` | Download a processed workbook        |
//! | GET    | `/api/logs`                | SSE stream for real-time logs        |

use axum::{
    extract::{DefaultBodyLimit, Multipart, Path as UrlPath, State},
    http::{header, HeaderValue, Method, StatusCode},
    response::{sse::Event, IntoResponse, Json, Response, Sse},
    routing::{get, post},
    Router,
};
use axum_extra::extract::cookie::{Cookie, CookieJar};
use futures::stream::Stream;
use serde_json::{json, Value};
use std::collections::{HashMap, HashSet};
use std::path::PathBuf;
use std::sync::Arc;
use std::{convert::Infallible, net::SocketAddr, time::Duration};
use tokio::sync::RwLock;
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::StreamExt as _;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use uuid::Uuid;

use super::logs::{log_info, LOG_BROADCASTER};
use super::types::{
    allowed_file, error_response, sanitize_filename, ApiError, LoginRequest, MessageResponse,
    NormalizeResponse, SheetsResponse,
};
use crate::auth::{change_password, verify_password, PasswordChange};
use crate::config::{AppConfig, PasswordStore};
use crate::error::{AuthError, ServerError};
use crate::normalize::process_workbook;
use crate::transfer::{
    analysis_sheets, choose_sheet, run_transfer, TransferOutcome, TransferRequest,
};

/// Name of the session cookie.
pub const SESSION_COOKIE: &str = "session";

/// Shared server state
pub struct AppState {
    pub config: AppConfig,
    pub store: PasswordStore,
    sessions: RwLock<HashSet<String>>,
}

impl AppState {
    pub fn new(config: AppConfig) -> Self {
        let store = config.password_store();
        Self {
            config,
            store,
            sessions: RwLock::new(HashSet::new()),
        }
    }

    /// Register a new session token.
    pub async fn open_session(&self) -> String {
        let token = Uuid::new_v4().to_string();
        self.sessions.write().await.insert(token.clone());
        token
    }

    pub async fn close_session(&self, token: &str) {
        self.sessions.write().await.remove(token);
    }

    /// Drop every session, e.g. after a password change.
    pub async fn close_all_sessions(&self) {
        self.sessions.write().await.clear();
    }

    pub async fn is_active(&self, token: &str) -> bool {
        self.sessions.read().await.contains(token)
    }

    /// Reject requests without an active session cookie.
    async fn require_session(&self, jar: &CookieJar) -> Result<(), ApiError> {
        if let Some(cookie) = jar.get(SESSION_COOKIE) {
            if self.is_active(cookie.value()).await {
                return Ok(());
            }
        }
        Err(ServerError::Unauthorized.into_api())
    }
}

type SharedState = Arc<AppState>;

/// Build the router with all routes and layers.
pub fn router(state: SharedState) -> Router {
    // Permissive CORS for local use
    let cors = CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT])
        .expose_headers([header::CONTENT_TYPE, header::CONTENT_DISPOSITION]);

    let body_limit = state.config.max_upload_bytes;

    Router::new()
        .route("/", get(health))
        .route("/health", get(health))
        .route("/api/login", post(login))
        .route("/api/logout", post(logout))
        .route("/api/password", post(password))
        .route("/api/normalize", post(normalize))
        .route("/api/sheets", post(sheets))
        .route("/api/transfer", post(transfer))
        .route("/api/download/{filename}", get(download))
        .route("/api/logs", get(sse_logs))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Start the HTTP server
pub async fn start_server(config: AppConfig) -> Result<(), Box<dyn std::error::Error>> {
    tokio::fs::create_dir_all(&config.upload_dir).await?;

    let port = config.port;
    let app = router(Arc::new(AppState::new(config)));

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!("🚀 Planillas server running on http://localhost:{}", port);
    tracing::info!("   POST /api/normalize - Normalize a workbook");
    tracing::info!("   POST /api/transfer  - Transfer an analysis sheet");
    tracing::info!("   GET  /api/logs      - SSE log stream");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Health check endpoint
async fn health() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "service": "planillas",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

async fn login(
    State(state): State<SharedState>,
    jar: CookieJar,
    Json(body): Json<LoginRequest>,
) -> Result<(CookieJar, Json<MessageResponse>), ApiError> {
    if !verify_password(&state.store, Some(body.password.as_str())) {
        return Err((
            StatusCode::UNAUTHORIZED,
            Json(error_response(&AuthError::WrongPassword.to_string())),
        ));
    }

    let token = state.open_session().await;
    let cookie = Cookie::build((SESSION_COOKIE, token)).path("/").http_only(true);
    Ok((jar.add(cookie), Json(MessageResponse::ok("Sesión iniciada"))))
}

async fn logout(
    State(state): State<SharedState>,
    jar: CookieJar,
) -> (CookieJar, Json<MessageResponse>) {
    if let Some(cookie) = jar.get(SESSION_COOKIE) {
        state.close_session(cookie.value()).await;
    }
    (
        jar.remove(Cookie::build(SESSION_COOKIE).path("/")),
        Json(MessageResponse::ok("Sesión cerrada")),
    )
}

async fn password(
    State(state): State<SharedState>,
    jar: CookieJar,
    Json(body): Json<PasswordChange>,
) -> Result<(CookieJar, Json<MessageResponse>), ApiError> {
    state.require_session(&jar).await?;

    change_password(&state.store, &body)
        .map_err(|e| (StatusCode::BAD_REQUEST, Json(error_response(&e.to_string()))))?;

    state.close_all_sessions().await;
    Ok((
        jar.remove(Cookie::build(SESSION_COOKIE).path("/")),
        Json(MessageResponse::ok("Contraseña cambiada correctamente")),
    ))
}

async fn normalize(
    State(state): State<SharedState>,
    jar: CookieJar,
    multipart: Multipart,
) -> Result<Json<NormalizeResponse>, ApiError> {
    state.require_session(&jar).await?;

    let form = read_form(multipart).await?;
    let upload = form
        .files
        .get("file")
        .ok_or_else(|| bad_request("No se seleccionó ningún archivo"))?;
    let path = save_upload(&state, upload).await?;

    log_info(format!("📄 Normalizando {}", upload.name));
    let outcome = blocking(move || process_workbook(&path)).await?;
    Ok(Json(outcome.into()))
}

async fn sheets(
    State(state): State<SharedState>,
    jar: CookieJar,
    multipart: Multipart,
) -> Result<Json<SheetsResponse>, ApiError> {
    state.require_session(&jar).await?;

    let form = read_form(multipart).await?;
    let upload = form
        .files
        .get("file")
        .ok_or_else(|| bad_request("No se seleccionó ningún archivo"))?;
    let path = save_upload(&state, upload).await?;

    let sheets = blocking(move || analysis_sheets(&path))
        .await?
        .map_err(|e| bad_request(&e.to_string()))?;
    Ok(Json(SheetsResponse { sheets }))
}

async fn transfer(
    State(state): State<SharedState>,
    jar: CookieJar,
    multipart: Multipart,
) -> Result<Json<TransferOutcome>, ApiError> {
    state.require_session(&jar).await?;

    let form = read_form(multipart).await?;
    let password = form.fields.get("password").cloned().unwrap_or_default();
    if !verify_password(&state.store, Some(password.as_str())) {
        return Ok(Json(TransferOutcome::failed(AuthError::WrongPassword.to_string())));
    }

    let (Some(origen), Some(destino)) =
        (form.files.get("file_origen"), form.files.get("file_destino"))
    else {
        return Err(bad_request("Debe seleccionar ambos archivos"));
    };
    let source = save_upload(&state, origen).await?;
    let destination = save_upload(&state, destino).await?;

    let requested = form.fields.get("hoja_analisis").cloned();
    let store = state.store.clone();
    let outcome = blocking(move || {
        let sheet = match analysis_sheets(&source) {
            Ok(sheets) => choose_sheet(&sheets, requested.as_deref()),
            Err(e) => return TransferOutcome::failed(format!("Error al leer hojas: {}", e)),
        };
        let Some(sheet) = sheet else {
            return TransferOutcome::failed("Error al leer hojas");
        };

        let request = TransferRequest {
            source: &source,
            destination: &destination,
            sheet: &sheet,
            password: Some(password.as_str()),
        };
        run_transfer(&store, &request)
    })
    .await?;

    Ok(Json(outcome))
}

async fn download(
    State(state): State<SharedState>,
    jar: CookieJar,
    UrlPath(filename): UrlPath<String>,
) -> Result<Response, ApiError> {
    state.require_session(&jar).await?;

    let name = sanitize_filename(&filename)
        .ok_or_else(|| ServerError::NotFound(filename.clone()).into_api())?;
    let bytes = tokio::fs::read(state.config.upload_dir.join(&name))
        .await
        .map_err(|_| ServerError::NotFound(name.clone()).into_api())?;

    let disposition = HeaderValue::from_str(&format!("attachment; filename=\"{}\"", name))
        .map_err(|e| ServerError::Internal(e.to_string()).into_api())?;
    Ok((
        [
            (
                header::CONTENT_TYPE,
                HeaderValue::from_static(
                    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
                ),
            ),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        bytes,
    )
        .into_response())
}

/// SSE endpoint for real-time log streaming
async fn sse_logs() -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let rx = LOG_BROADCASTER.subscribe();

    let stream = BroadcastStream::new(rx).filter_map(|result| match result {
        Ok(entry) => {
            let json = serde_json::to_string(&entry).ok()?;
            Some(Ok(Event::default().data(json)))
        }
        Err(_) => None,
    });

    Sse::new(stream).keep_alive(
        axum::response::sse::KeepAlive::new()
            .interval(Duration::from_secs(15))
            .text("keep-alive"),
    )
}

// =============================================================================
// Upload helpers
// =============================================================================

/// An uploaded file held in memory.
struct Upload {
    name: String,
    bytes: Vec<u8>,
}

/// Text fields and files of a multipart form, keyed by field name.
#[derive(Default)]
struct Form {
    fields: HashMap<String, String>,
    files: HashMap<String, Upload>,
}

async fn read_form(mut multipart: Multipart) -> Result<Form, ApiError> {
    let mut form = Form::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| bad_request(&format!("Multipart error: {}", e)))?
    {
        let name = field.name().unwrap_or("").to_string();
        match field.file_name().map(str::to_string) {
            Some(file_name) => {
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| bad_request(&format!("Read error: {}", e)))?;
                // Browsers send an empty part when no file was picked
                if !file_name.is_empty() {
                    form.files.insert(name, Upload { name: file_name, bytes: bytes.to_vec() });
                }
            }
            None => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| bad_request(&format!("Read error: {}", e)))?;
                form.fields.insert(name, text);
            }
        }
    }
    Ok(form)
}

/// Store an upload under its sanitized name in the upload directory.
async fn save_upload(state: &AppState, upload: &Upload) -> Result<PathBuf, ApiError> {
    if !allowed_file(&upload.name) {
        return Err(bad_request("Tipo de archivo no permitido"));
    }
    let name = sanitize_filename(&upload.name)
        .ok_or_else(|| bad_request("Nombre de archivo inválido"))?;

    let dir = &state.config.upload_dir;
    let path = dir.join(&name);
    let write = async {
        tokio::fs::create_dir_all(dir).await?;
        tokio::fs::write(&path, &upload.bytes).await
    };
    write
        .await
        .map_err(|e| ServerError::Internal(e.to_string()).into_api())?;

    tracing::info!(file = %name, bytes = upload.bytes.len(), "upload stored");
    Ok(path)
}

/// Run a pipeline on the blocking pool.
async fn blocking<T, F>(f: F) -> Result<T, ApiError>
where
    F: FnOnce() -> T + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| ServerError::Internal(e.to_string()).into_api())
}

fn bad_request(message: &str) -> ApiError {
    ServerError::BadRequest(message.to_string()).into_api()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state() -> AppState {
        AppState::new(AppConfig::default())
    }

    #[tokio::test]
    async fn test_sessions_open_and_close() {
        let state = state();
        let token = state.open_session().await;
        assert!(state.is_active(&token).await);

        state.close_session(&token).await;
        assert!(!state.is_active(&token).await);
    }

    #[tokio::test]
    async fn test_close_all_sessions() {
        let state = state();
        let a = state.open_session().await;
        let b = state.open_session().await;
        assert_ne!(a, b);

        state.close_all_sessions().await;
        assert!(!state.is_active(&a).await);
        assert!(!state.is_active(&b).await);
    }

    #[tokio::test]
    async fn test_require_session_checks_cookie() {
        let state = state();
        let jar = CookieJar::new();
        assert!(state.require_session(&jar).await.is_err());

        let token = state.open_session().await;
        let jar = jar.add(Cookie::new(SESSION_COOKIE, token));
        assert!(state.require_session(&jar).await.is_ok());
    }
}
