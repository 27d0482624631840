// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

#![deny(
    clippy::pedantic,
    clippy::cargo,
    clippy::nursery,
    clippy::style,
    clippy::correctness,
    clippy::all,
    clippy::unwrap_used,
    clippy::expect_used
)]
#![allow(clippy::multiple_crate_versions)]

mod session;

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{DefaultBodyLimit, Multipart, Path, Query, State as AxumState},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::{get, post, put},
};
use clap::Parser;
use mutlukent_api::{
    ApiError, AuthenticatedUser, AuthenticationService, CreateBranchRequest, CreateUserRequest,
    DashboardResponse, DeleteReportResponse, DeleteUserResponse, ExportReportsRequest,
    ExportReportsResponse, GetReportResponse, ListBranchesRequest, ListBranchesResponse,
    ListReportsRequest, ListReportsResponse, ListRolesResponse, ListUsersResponse, LoginRequest,
    LoginResponse, PhotoUpload, ReportFormResponse, ReportPhoto, SaveBranchResponse,
    SaveReportResponse, SaveUserResponse, SubmitReportRequest, UpdateBranchRequest,
    UpdateUserRequest, VerifyReportRequest, VerifyReportResponse, WhoAmIResponse,
};
use mutlukent_domain::{AmountInput, BusinessClock, DEFAULT_TIMEZONE, MAX_PHOTO_BYTES};
use mutlukent_persistence::{Persistence, PhotoStore};
use serde::{Deserialize, Serialize};
use tokio::sync::{Mutex, OwnedMutexGuard};
use tracing::{debug, error, info, warn};

use crate::session::SessionToken;

/// Mutlukent back office: daily Z-report collection for a chain of stores.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the `SQLite` database file. If not provided, uses in-memory database.
    #[arg(short, long)]
    database: Option<String>,

    /// Port to bind the server to
    #[arg(short, long, default_value_t = 3000)]
    port: u16,

    /// Address to bind the server to
    #[arg(long, default_value = "127.0.0.1")]
    bind: String,

    /// Directory that holds uploaded Z-report photos
    #[arg(long, default_value = "./photos")]
    photo_dir: PathBuf,

    /// IANA time zone that defines the business day
    #[arg(long, default_value = DEFAULT_TIMEZONE)]
    timezone: String,

    /// Email of the first admin, created only when no user exists
    #[arg(long, requires = "admin_password")]
    admin_email: Option<String>,

    /// Password of the first admin
    #[arg(long, requires = "admin_email")]
    admin_password: Option<String>,
}

/// Application state shared across handlers.
///
/// One connection serves every request; the mutex serialises them. A
/// handler authenticates, checks permissions and writes under one hold of
/// the lock (see `with_session`).
#[derive(Clone)]
struct AppState {
    persistence: Arc<Mutex<Persistence>>,
    photos: Arc<PhotoStore>,
    clock: BusinessClock,
}

// ============================================================================
// Errors
// ============================================================================

/// Error body returned by every failing route.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct ErrorResponse {
    /// Error indicator.
    error: bool,
    /// User-facing message.
    message: String,
    /// Per-field validation messages.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    field_errors: BTreeMap<String, Vec<String>>,
}

/// HTTP error wrapper that implements `IntoResponse`.
struct HttpError {
    status: StatusCode,
    message: String,
    field_errors: BTreeMap<String, Vec<String>>,
}

impl HttpError {
    const fn new(status: StatusCode, message: String) -> Self {
        Self {
            status,
            message,
            field_errors: BTreeMap::new(),
        }
    }
}

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        let body: Json<ErrorResponse> = Json(ErrorResponse {
            error: true,
            message: self.message,
            field_errors: self.field_errors,
        });
        (self.status, body).into_response()
    }
}

impl From<ApiError> for HttpError {
    fn from(err: ApiError) -> Self {
        let message: String = err.public_message();
        match err {
            ApiError::AuthenticationFailed { .. } => Self::new(StatusCode::UNAUTHORIZED, message),
            ApiError::Unauthorized { .. } => Self::new(StatusCode::FORBIDDEN, message),
            ApiError::ValidationFailed { field_errors, .. } => Self {
                status: StatusCode::UNPROCESSABLE_ENTITY,
                message,
                field_errors,
            },
            ApiError::InvalidInput { .. } => Self::new(StatusCode::BAD_REQUEST, message),
            ApiError::DomainRuleViolation { .. } => Self::new(StatusCode::CONFLICT, message),
            ApiError::ResourceNotFound { .. } => Self::new(StatusCode::NOT_FOUND, message),
            ApiError::Internal { message: detail } => {
                error!(error = %detail, "Internal error");
                Self::new(StatusCode::INTERNAL_SERVER_ERROR, message)
            }
        }
    }
}

// ============================================================================
// Session routes
// ============================================================================

/// Runs `action` against the store on the blocking pool.
///
/// The lock is held for the whole call, so reads and the writes they guard
/// never interleave with another request. `SQLite` and photo file I/O stay off
/// the async workers.
///
/// # Errors
///
/// Whatever `action` returns, or HTTP 500 if the blocking task fails.
async fn with_store<T, F>(app_state: &AppState, action: F) -> Result<T, HttpError>
where
    T: Send + 'static,
    F: FnOnce(&mut Persistence) -> Result<T, HttpError> + Send + 'static,
{
    let mut persistence: OwnedMutexGuard<Persistence> =
        Arc::clone(&app_state.persistence).lock_owned().await;
    tokio::task::spawn_blocking(move || action(&mut persistence))
        .await
        .map_err(|e| {
            HttpError::from(ApiError::Internal {
                message: format!("Blocking task failed: {e}"),
            })
        })?
}

/// Authenticates the session and runs `action` under the same lock.
///
/// The caller's scope is resolved from the rows `action` sees, so a role
/// change or deactivation committed by another request applies at once.
async fn with_session<T, F>(
    app_state: &AppState,
    session: SessionToken,
    action: F,
) -> Result<T, HttpError>
where
    T: Send + 'static,
    F: FnOnce(&mut Persistence, &AuthenticatedUser) -> Result<T, ApiError> + Send + 'static,
{
    with_store(app_state, move |persistence| {
        let user: AuthenticatedUser = session.authenticate(persistence)?;
        action(persistence, &user).map_err(HttpError::from)
    })
    .await
}

async fn handle_login(
    AxumState(app_state): AxumState<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, HttpError> {
    debug!("Handling login request");
    let response: LoginResponse = with_store(&app_state, move |persistence| {
        mutlukent_api::login(persistence, &req).map_err(HttpError::from)
    })
    .await?;
    Ok(Json(response))
}

async fn handle_logout(
    AxumState(app_state): AxumState<AppState>,
    session: SessionToken,
) -> Result<StatusCode, HttpError> {
    let token: String = session.0.clone();
    with_session(&app_state, session, move |persistence, user| {
        mutlukent_api::logout(persistence, &token)?;
        info!(user_id = user.user_id(), "Logged out");
        Ok(())
    })
    .await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn handle_whoami(
    AxumState(app_state): AxumState<AppState>,
    session: SessionToken,
) -> Result<Json<WhoAmIResponse>, HttpError> {
    let response: WhoAmIResponse = with_session(&app_state, session, |_, user| {
        Ok(mutlukent_api::whoami(user))
    })
    .await?;
    Ok(Json(response))
}

// ============================================================================
// Dashboard and report routes
// ============================================================================

async fn handle_dashboard(
    AxumState(app_state): AxumState<AppState>,
    session: SessionToken,
) -> Result<Json<DashboardResponse>, HttpError> {
    let clock: BusinessClock = app_state.clock;
    let response: DashboardResponse = with_session(&app_state, session, move |persistence, user| {
        mutlukent_api::dashboard(persistence, &clock, user)
    })
    .await?;
    Ok(Json(response))
}

async fn handle_list_reports(
    AxumState(app_state): AxumState<AppState>,
    session: SessionToken,
    Query(req): Query<ListReportsRequest>,
) -> Result<Json<ListReportsResponse>, HttpError> {
    let response: ListReportsResponse =
        with_session(&app_state, session, move |persistence, user| {
            mutlukent_api::list_reports(persistence, user, &req)
        })
        .await?;
    Ok(Json(response))
}

async fn handle_report_form(
    AxumState(app_state): AxumState<AppState>,
    session: SessionToken,
) -> Result<Json<ReportFormResponse>, HttpError> {
    let clock: BusinessClock = app_state.clock;
    let response: ReportFormResponse =
        with_session(&app_state, session, move |persistence, user| {
            mutlukent_api::report_form(persistence, &clock, user)
        })
        .await?;
    Ok(Json(response))
}

fn multipart_error(err: &axum::extract::multipart::MultipartError) -> HttpError {
    warn!(error = %err, "Malformed multipart body");
    HttpError::new(err.status(), err.body_text())
}

/// Reads the new-report form: text fields plus an optional `photo` file.
///
/// Amounts stay text so the decimal parser reports them per field. An empty
/// file input counts as no photo.
async fn read_report_form(
    mut multipart: Multipart,
) -> Result<(SubmitReportRequest, Option<PhotoUpload>), HttpError> {
    let mut request: SubmitReportRequest = SubmitReportRequest::default();
    let mut photo: Option<PhotoUpload> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| multipart_error(&e))?
    {
        let name: String = field.name().unwrap_or_default().to_string();
        if name == "photo" {
            let content_type: String = field.content_type().unwrap_or_default().to_string();
            let bytes: Vec<u8> = field
                .bytes()
                .await
                .map_err(|e| multipart_error(&e))?
                .to_vec();
            if !bytes.is_empty() {
                photo = Some(PhotoUpload {
                    content_type,
                    bytes,
                });
            }
            continue;
        }

        let text: String = field.text().await.map_err(|e| multipart_error(&e))?;
        match name.as_str() {
            "branch_id" => {
                let trimmed: &str = text.trim();
                if !trimmed.is_empty() {
                    let branch_id: i64 = trimmed.parse().map_err(|_| {
                        HttpError::from(ApiError::field("branch_id", "Geçersiz şube seçimi."))
                    })?;
                    request.branch_id = Some(branch_id);
                }
            }
            "report_date" => request.report_date = Some(text),
            "cash_sales" => request.cash_sales = Some(AmountInput::Text(text)),
            "credit_card_sales" => request.credit_card_sales = Some(AmountInput::Text(text)),
            "debit_card_sales" => request.debit_card_sales = Some(AmountInput::Text(text)),
            "notes" => request.notes = Some(text),
            other => debug!(field = other, "Ignoring unknown form field"),
        }
    }

    Ok((request, photo))
}

async fn handle_create_report(
    AxumState(app_state): AxumState<AppState>,
    session: SessionToken,
    multipart: Multipart,
) -> Result<Json<SaveReportResponse>, HttpError> {
    let (req, photo): (SubmitReportRequest, Option<PhotoUpload>) =
        read_report_form(multipart).await?;

    let photos: Arc<PhotoStore> = Arc::clone(&app_state.photos);
    let clock: BusinessClock = app_state.clock;
    let response: SaveReportResponse =
        with_session(&app_state, session, move |persistence, user| {
            mutlukent_api::create_report(persistence, &photos, &clock, user, &req, photo.as_ref())
        })
        .await?;
    Ok(Json(response))
}

async fn handle_export_reports(
    AxumState(app_state): AxumState<AppState>,
    session: SessionToken,
    Query(req): Query<ExportReportsRequest>,
) -> Result<Response, HttpError> {
    let clock: BusinessClock = app_state.clock;
    let export: ExportReportsResponse =
        with_session(&app_state, session, move |persistence, user| {
            mutlukent_api::export_reports(persistence, &clock, user, &req)
        })
        .await?;

    Ok((
        [
            (header::CONTENT_TYPE, String::from("text/csv; charset=utf-8")),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", export.filename),
            ),
        ],
        export.content,
    )
        .into_response())
}

async fn handle_get_report(
    AxumState(app_state): AxumState<AppState>,
    session: SessionToken,
    Path(report_id): Path<i64>,
) -> Result<Json<GetReportResponse>, HttpError> {
    let response: GetReportResponse =
        with_session(&app_state, session, move |persistence, user| {
            mutlukent_api::get_report(persistence, user, report_id)
        })
        .await?;
    Ok(Json(response))
}

async fn handle_update_report(
    AxumState(app_state): AxumState<AppState>,
    session: SessionToken,
    Path(report_id): Path<i64>,
    Json(req): Json<SubmitReportRequest>,
) -> Result<Json<SaveReportResponse>, HttpError> {
    let clock: BusinessClock = app_state.clock;
    let response: SaveReportResponse =
        with_session(&app_state, session, move |persistence, user| {
            mutlukent_api::update_report(persistence, &clock, user, report_id, &req)
        })
        .await?;
    Ok(Json(response))
}

async fn handle_delete_report(
    AxumState(app_state): AxumState<AppState>,
    session: SessionToken,
    Path(report_id): Path<i64>,
) -> Result<Json<DeleteReportResponse>, HttpError> {
    let photos: Arc<PhotoStore> = Arc::clone(&app_state.photos);
    let response: DeleteReportResponse =
        with_session(&app_state, session, move |persistence, user| {
            mutlukent_api::delete_report(persistence, &photos, user, report_id)
        })
        .await?;
    Ok(Json(response))
}

async fn handle_verify_report(
    AxumState(app_state): AxumState<AppState>,
    session: SessionToken,
    Path(report_id): Path<i64>,
    Json(req): Json<VerifyReportRequest>,
) -> Result<Json<VerifyReportResponse>, HttpError> {
    let response: VerifyReportResponse =
        with_session(&app_state, session, move |persistence, user| {
            mutlukent_api::verify_report(persistence, user, report_id, req)
        })
        .await?;
    Ok(Json(response))
}

async fn handle_report_photo(
    AxumState(app_state): AxumState<AppState>,
    session: SessionToken,
    Path(report_id): Path<i64>,
) -> Result<Response, HttpError> {
    let photos: Arc<PhotoStore> = Arc::clone(&app_state.photos);
    let photo: ReportPhoto = with_session(&app_state, session, move |persistence, user| {
        mutlukent_api::get_report_photo(persistence, &photos, user, report_id)
    })
    .await?;

    Ok(([(header::CONTENT_TYPE, photo.content_type)], photo.bytes).into_response())
}

// ============================================================================
// Branch, user and role routes
// ============================================================================

async fn handle_list_branches(
    AxumState(app_state): AxumState<AppState>,
    session: SessionToken,
    Query(req): Query<ListBranchesRequest>,
) -> Result<Json<ListBranchesResponse>, HttpError> {
    let response: ListBranchesResponse =
        with_session(&app_state, session, move |persistence, user| {
            mutlukent_api::list_branches(persistence, user, req)
        })
        .await?;
    Ok(Json(response))
}

async fn handle_create_branch(
    AxumState(app_state): AxumState<AppState>,
    session: SessionToken,
    Json(req): Json<CreateBranchRequest>,
) -> Result<Json<SaveBranchResponse>, HttpError> {
    let response: SaveBranchResponse =
        with_session(&app_state, session, move |persistence, user| {
            mutlukent_api::create_branch(persistence, user, &req)
        })
        .await?;
    Ok(Json(response))
}

async fn handle_update_branch(
    AxumState(app_state): AxumState<AppState>,
    session: SessionToken,
    Path(branch_id): Path<i64>,
    Json(req): Json<UpdateBranchRequest>,
) -> Result<Json<SaveBranchResponse>, HttpError> {
    let response: SaveBranchResponse =
        with_session(&app_state, session, move |persistence, user| {
            mutlukent_api::update_branch(persistence, user, branch_id, &req)
        })
        .await?;
    Ok(Json(response))
}

async fn handle_list_users(
    AxumState(app_state): AxumState<AppState>,
    session: SessionToken,
) -> Result<Json<ListUsersResponse>, HttpError> {
    let response: ListUsersResponse = with_session(&app_state, session, |persistence, user| {
        mutlukent_api::list_users(persistence, user)
    })
    .await?;
    Ok(Json(response))
}

async fn handle_create_user(
    AxumState(app_state): AxumState<AppState>,
    session: SessionToken,
    Json(req): Json<CreateUserRequest>,
) -> Result<Json<SaveUserResponse>, HttpError> {
    let response: SaveUserResponse =
        with_session(&app_state, session, move |persistence, user| {
            mutlukent_api::create_user(persistence, user, &req)
        })
        .await?;
    Ok(Json(response))
}

async fn handle_update_user(
    AxumState(app_state): AxumState<AppState>,
    session: SessionToken,
    Path(user_id): Path<i64>,
    Json(req): Json<UpdateUserRequest>,
) -> Result<Json<SaveUserResponse>, HttpError> {
    let response: SaveUserResponse =
        with_session(&app_state, session, move |persistence, user| {
            mutlukent_api::update_user(persistence, user, user_id, &req)
        })
        .await?;
    Ok(Json(response))
}

async fn handle_delete_user(
    AxumState(app_state): AxumState<AppState>,
    session: SessionToken,
    Path(user_id): Path<i64>,
) -> Result<Json<DeleteUserResponse>, HttpError> {
    let response: DeleteUserResponse =
        with_session(&app_state, session, move |persistence, user| {
            mutlukent_api::delete_user(persistence, user, user_id)
        })
        .await?;
    Ok(Json(response))
}

async fn handle_list_roles(
    AxumState(app_state): AxumState<AppState>,
    session: SessionToken,
) -> Result<Json<ListRolesResponse>, HttpError> {
    let response: ListRolesResponse = with_session(&app_state, session, |persistence, user| {
        mutlukent_api::list_roles(persistence, user)
    })
    .await?;
    Ok(Json(response))
}

/// Builds the application router with all endpoints.
fn build_router(app_state: AppState) -> Router {
    // Room for a maximum-size photo plus the text fields
    let upload_limit: usize = MAX_PHOTO_BYTES + 1024 * 1024;

    Router::new()
        .route("/auth/login", post(handle_login))
        .route("/auth/logout", post(handle_logout))
        .route("/auth/me", get(handle_whoami))
        .route("/dashboard", get(handle_dashboard))
        .route(
            "/reports",
            get(handle_list_reports)
                .post(handle_create_report)
                .layer(DefaultBodyLimit::max(upload_limit)),
        )
        .route("/reports/form", get(handle_report_form))
        .route("/reports/export", get(handle_export_reports))
        .route(
            "/reports/{report_id}",
            get(handle_get_report)
                .put(handle_update_report)
                .delete(handle_delete_report),
        )
        .route("/reports/{report_id}/verify", post(handle_verify_report))
        .route("/reports/{report_id}/photo", get(handle_report_photo))
        .route(
            "/branches",
            get(handle_list_branches).post(handle_create_branch),
        )
        .route("/branches/{branch_id}", put(handle_update_branch))
        .route("/users", get(handle_list_users).post(handle_create_user))
        .route(
            "/users/{user_id}",
            put(handle_update_user).delete(handle_delete_user),
        )
        .route("/roles", get(handle_list_roles))
        .with_state(app_state)
}

/// Purges expired sessions and creates the first admin when asked to.
fn prepare_database(persistence: &mut Persistence, args: &Args) -> Result<(), ApiError> {
    let purged: usize = AuthenticationService::purge_expired_sessions(persistence)?;
    debug!(purged, "Startup session purge done");

    if let (Some(email), Some(password)) = (&args.admin_email, &args.admin_password) {
        match AuthenticationService::bootstrap_admin(persistence, email, password)? {
            Some(user_id) => info!(user_id, "Created first admin"),
            None => info!("Users already exist; admin bootstrap skipped"),
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    info!("Initializing Mutlukent back office");

    let mut persistence: Persistence = if let Some(db_path) = &args.database {
        info!("Using file-based database at: {}", db_path);
        Persistence::new_with_file(db_path)?
    } else {
        warn!("Using in-memory database; data is lost on exit");
        Persistence::new_in_memory()?
    };
    prepare_database(&mut persistence, &args)?;

    let clock: BusinessClock = BusinessClock::new(&args.timezone)?;
    info!(timezone = clock.timezone_name(), "Business clock ready");

    let photos: PhotoStore = PhotoStore::new(&args.photo_dir);
    info!(photo_dir = %args.photo_dir.display(), "Photo store ready");

    let app_state: AppState = AppState {
        persistence: Arc::new(Mutex::new(persistence)),
        photos: Arc::new(photos),
        clock,
    };

    let app: Router = build_router(app_state);

    let addr: std::net::SocketAddr = format!("{}:{}", args.bind, args.port).parse()?;
    info!("Server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

#[cfg(test)]
mod tests;
