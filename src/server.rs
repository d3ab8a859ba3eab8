//! HTTP surface of the service.
//!
//! Thin request/response plumbing over the workflow: multipart upload in,
//! structured subtitle records and downloadable artifacts out, plus the
//! account endpoints. Stage errors cross this boundary as a single
//! human-readable message; diagnostic detail stays in the logs.

use std::net::SocketAddr;
use std::path::{Path as StdPath, PathBuf};
use std::sync::Arc;

use axum::Json;
use axum::Router;
use axum::body::{Body, Bytes};
use axum::extract::{DefaultBodyLimit, Form, Multipart, Path, State};
use axum::http::{HeaderMap, HeaderValue, StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use serde::{Deserialize, Serialize};
use tokio::net::TcpListener;
use tokio_util::io::ReaderStream;
use tower_http::trace::{DefaultMakeSpan, DefaultOnFailure, DefaultOnResponse, TraceLayer};
use tracing::{Level, error, info};
use uuid::Uuid;

use crate::account::AccountService;
use crate::config::Config;
use crate::error::SubvoxError;
use crate::subtitle::SubtitleRecord;
use crate::translate::TranslationStatus;
use crate::workflow::Workflow;

#[derive(Clone)]
struct AppState {
    workflow: Arc<Workflow>,
    accounts: Arc<AccountService>,
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
}

struct AppError {
    status: StatusCode,
    message: String,
}

impl AppError {
    fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }

    fn unauthorized(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::UNAUTHORIZED,
            message: message.into(),
        }
    }

    fn not_found(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            message: message.into(),
        }
    }

    fn internal(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: message.into(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body = Json(ErrorBody {
            error: self.message,
        });
        (self.status, body).into_response()
    }
}

/// 400 for caller mistakes, 500 (with logging) for everything else.
fn account_error(err: SubvoxError) -> AppError {
    match err {
        SubvoxError::Auth(message) => AppError::bad_request(message),
        SubvoxError::InvalidRequest(message) => AppError::bad_request(message),
        other => {
            error!("Account operation failed: {}", other);
            AppError::internal("Server error")
        }
    }
}

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
    message: &'static str,
}

#[derive(Debug, Serialize)]
struct UploadResponse {
    status: &'static str,
    subtitles: Vec<SubtitleRecord>,
    translation: TranslationStatus,
    srt_file: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    burned_video: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    burn_error: Option<String>,
}

#[derive(Debug, Serialize)]
struct AuthResponse {
    success: bool,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    token: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    email: Option<String>,
}

impl AuthResponse {
    fn message(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
            token: None,
            email: None,
        }
    }
}

#[derive(Debug, Deserialize)]
struct CredentialsForm {
    email: String,
    password: String,
}

#[derive(Debug, Deserialize)]
struct ForgotPasswordForm {
    email: String,
}

#[derive(Debug, Deserialize)]
struct ResetPasswordForm {
    token: String,
    new_password: String,
}

#[derive(Debug, Deserialize)]
struct ChangePasswordForm {
    old_password: String,
    new_password: String,
}

/// Start the HTTP server and block until it exits.
pub async fn serve(
    config: &Config,
    workflow: Arc<Workflow>,
    accounts: Arc<AccountService>,
) -> crate::error::Result<()> {
    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
        .parse()
        .map_err(|e| SubvoxError::Config(format!("Invalid bind address: {}", e)))?;

    let state = AppState { workflow, accounts };

    let app = Router::new()
        .route("/health", get(health))
        .route("/upload", post(upload))
        .route("/process", post(process_legacy))
        .route("/download/srt/{filename}", get(download_srt))
        .route("/download/output/{filename}", get(download_output))
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/forgot-password", post(forgot_password))
        .route("/reset-password", post(reset_password))
        .route("/change-password", post(change_password))
        .with_state(state)
        .layer(DefaultBodyLimit::max(config.server.max_upload_bytes))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO))
                .on_failure(DefaultOnFailure::new().level(Level::ERROR)),
        );

    let listener = TcpListener::bind(addr).await?;
    info!("Listening on {}", addr);
    axum::serve(listener, app).await?;

    Ok(())
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        message: "Backend is running",
    })
}

/// Parsed fields of a video-processing request.
struct VideoRequest {
    video: Bytes,
    target_language: String,
    source_language: Option<String>,
    burn: bool,
}

async fn read_video_request(mut multipart: Multipart) -> Result<VideoRequest, AppError> {
    let mut video: Option<Bytes> = None;
    let mut target_language = "english".to_string();
    let mut source_language: Option<String> = None;
    let mut burn = false;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::bad_request(e.to_string()))?
    {
        let name = field.name().map(|name| name.to_string());
        match name.as_deref() {
            Some("video") => {
                video = Some(
                    field
                        .bytes()
                        .await
                        .map_err(|e| AppError::bad_request(e.to_string()))?,
                );
            }
            // /upload sends "language", the legacy /process sends "target_lang"
            Some("language") | Some("target_lang") => {
                target_language = field
                    .text()
                    .await
                    .map_err(|e| AppError::bad_request(e.to_string()))?;
            }
            Some("source_lang") => {
                let value = field
                    .text()
                    .await
                    .map_err(|e| AppError::bad_request(e.to_string()))?;
                if !value.trim().is_empty() {
                    source_language = Some(value);
                }
            }
            Some("burn") => {
                let value = field
                    .text()
                    .await
                    .map_err(|e| AppError::bad_request(e.to_string()))?;
                burn = matches!(value.trim().to_lowercase().as_str(), "1" | "true" | "yes");
            }
            _ => {}
        }
    }

    let video = video.ok_or_else(|| AppError::bad_request("No file provided"))?;
    if video.is_empty() {
        return Err(AppError::bad_request("File is empty"));
    }

    Ok(VideoRequest {
        video,
        target_language,
        source_language,
        burn,
    })
}

/// Store the upload under a fresh UUID name, run the workflow, and always
/// remove the uploaded video afterwards.
async fn run_video_request(
    state: &AppState,
    request: VideoRequest,
    burn: bool,
) -> Result<crate::workflow::ProcessOutcome, AppError> {
    let file_id = Uuid::new_v4();
    let video_path = state
        .workflow
        .upload_dir()
        .join(format!("{}.mp4", file_id));

    tokio::fs::write(&video_path, &request.video)
        .await
        .map_err(|e| {
            error!("Failed to store upload: {}", e);
            AppError::internal("Failed to store upload")
        })?;

    let outcome = state
        .workflow
        .process_video(
            &video_path,
            &request.target_language,
            request.source_language.as_deref(),
            burn,
        )
        .await;

    // Cleanup uploaded file
    let _ = tokio::fs::remove_file(&video_path).await;

    outcome.map_err(|e| {
        error!("Error processing video: {}", e);
        AppError::internal(format!("Error processing video: {}", e))
    })
}

async fn upload(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<UploadResponse>, AppError> {
    let request = read_video_request(multipart).await?;
    let burn = request.burn;
    let outcome = run_video_request(&state, request, burn).await?;

    Ok(Json(UploadResponse {
        status: "success",
        subtitles: outcome.subtitles,
        translation: outcome.translation,
        srt_file: outcome.srt_file,
        burned_video: outcome.burned_video,
        burn_error: outcome.burn_error,
    }))
}

/// Legacy endpoint: always burns and streams the final video back.
async fn process_legacy(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Response, AppError> {
    let request = read_video_request(multipart).await?;
    let outcome = run_video_request(&state, request, true).await?;

    let Some(burned_video) = outcome.burned_video else {
        let reason = outcome
            .burn_error
            .unwrap_or_else(|| "unknown burn failure".to_string());
        error!("Legacy process failed to burn subtitles: {}", reason);
        return Err(AppError::internal("Error processing video"));
    };

    let path = state.workflow.output_dir().join(&burned_video);
    stream_file(&path, "video/mp4", "output.mp4").await
}

async fn download_srt(
    State(state): State<AppState>,
    Path(filename): Path<String>,
) -> Result<Response, AppError> {
    let path = safe_join(state.workflow.upload_dir(), &filename)?;
    let name = basename(&path);
    stream_file(&path, "text/plain; charset=utf-8", &name).await
}

async fn download_output(
    State(state): State<AppState>,
    Path(filename): Path<String>,
) -> Result<Response, AppError> {
    let path = safe_join(state.workflow.output_dir(), &filename)?;
    let content_type = match path.extension().and_then(|ext| ext.to_str()) {
        Some("mp4") => "video/mp4",
        Some("srt") => "text/plain; charset=utf-8",
        _ => "application/octet-stream",
    };
    let name = basename(&path);
    stream_file(&path, content_type, &name).await
}

/// Join a client-supplied filename onto a storage directory, keeping only the
/// basename so the path cannot escape it.
fn safe_join(dir: &StdPath, filename: &str) -> Result<PathBuf, AppError> {
    let name = StdPath::new(filename)
        .file_name()
        .ok_or_else(|| AppError::bad_request("Invalid filename"))?;
    Ok(dir.join(name))
}

fn basename(path: &StdPath) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().to_string())
        .unwrap_or_default()
}

async fn stream_file(
    path: &StdPath,
    content_type: &str,
    download_name: &str,
) -> Result<Response, AppError> {
    let file = match tokio::fs::File::open(path).await {
        Ok(file) => file,
        Err(_) => return Err(AppError::not_found("File not found")),
    };

    let body = Body::from_stream(ReaderStream::new(file));

    let content_type = HeaderValue::from_str(content_type)
        .map_err(|_| AppError::internal("Invalid content type"))?;
    let disposition =
        HeaderValue::from_str(&format!("attachment; filename=\"{}\"", download_name))
            .map_err(|_| AppError::internal("Invalid filename"))?;

    Ok((
        [
            (header::CONTENT_TYPE, content_type),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        body,
    )
        .into_response())
}

async fn register(
    State(state): State<AppState>,
    Form(form): Form<CredentialsForm>,
) -> Result<Json<AuthResponse>, AppError> {
    state
        .accounts
        .register(&form.email, &form.password)
        .await
        .map_err(account_error)?;

    Ok(Json(AuthResponse::message("Registration successful")))
}

async fn login(
    State(state): State<AppState>,
    Form(form): Form<CredentialsForm>,
) -> Result<Json<AuthResponse>, AppError> {
    let (token, email) = state
        .accounts
        .login(&form.email, &form.password)
        .await
        .map_err(account_error)?;

    Ok(Json(AuthResponse {
        success: true,
        message: "Login successful".to_string(),
        token: Some(token),
        email: Some(email),
    }))
}

async fn forgot_password(
    State(state): State<AppState>,
    Form(form): Form<ForgotPasswordForm>,
) -> Result<Json<AuthResponse>, AppError> {
    let token = state
        .accounts
        .forgot_password(&form.email)
        .await
        .map_err(account_error)?;

    if let Some(token) = token {
        // No mail transport is wired up; surface the link through the logs
        // the way the original's dev path did.
        info!(
            "Password reset requested; link: {}",
            state.accounts.reset_link(&token)
        );
    }

    // Do not reveal whether the address is registered.
    Ok(Json(AuthResponse::message(
        "If this email is registered, a password reset link will be sent.",
    )))
}

async fn reset_password(
    State(state): State<AppState>,
    Form(form): Form<ResetPasswordForm>,
) -> Result<Json<AuthResponse>, AppError> {
    state
        .accounts
        .reset_password(&form.token, &form.new_password)
        .await
        .map_err(account_error)?;

    Ok(Json(AuthResponse::message(
        "Password has been reset. You can now log in with your new password.",
    )))
}

async fn change_password(
    State(state): State<AppState>,
    headers: HeaderMap,
    Form(form): Form<ChangePasswordForm>,
) -> Result<Json<AuthResponse>, AppError> {
    let user = authenticate(&state, &headers).await?;

    state
        .accounts
        .change_password(&user, &form.old_password, &form.new_password)
        .await
        .map_err(account_error)?;

    Ok(Json(AuthResponse::message("Password updated successfully.")))
}

async fn authenticate(
    state: &AppState,
    headers: &HeaderMap,
) -> Result<crate::account::AuthenticatedUser, AppError> {
    let header = headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .ok_or_else(|| AppError::unauthorized("Authorization header required"))?;

    let token = header.strip_prefix("Bearer ").unwrap_or(header);

    state
        .accounts
        .verify_token(token)
        .await
        .map_err(|e| match e {
            SubvoxError::Auth(message) => AppError::unauthorized(message),
            other => {
                error!("Token verification failed: {}", other);
                AppError::internal("Server error")
            }
        })
}
