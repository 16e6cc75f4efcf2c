//! HTTP route handlers.

use std::path::Path;

use askama::Template;
use axum::{
    Json, Router,
    extract::{Path as UrlPath, Query, State},
    http::{HeaderMap, StatusCode, header},
    response::{Html, IntoResponse, Response},
    routing::{get, post, put},
};
use chrono::{Local, NaiveDate};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::companies::companies_for;
use crate::domain::{
    FrequentRoute, InvalidTransportationType, RecordId, RecordInput, RouteInput,
    TransportationType, TravelRecord, ValidationErrors,
};
use crate::export::{ExportError, ExportFormat, ExportRange, export as export_records};
use crate::history::derive_view;
use crate::places::ReportedPosition;
use crate::store::StoreError;

use super::dto::*;
use super::state::AppState;
use super::templates::*;

/// Create the application router.
///
/// `static_dir` is the path to the static assets directory.
pub fn create_router(state: AppState, static_dir: impl AsRef<Path>) -> Router {
    Router::new()
        .route("/", get(index_page))
        .route("/health", get(health))
        .route("/api/records", get(list_records).post(create_record))
        .route(
            "/api/records/:id",
            get(get_record).put(update_record).delete(delete_record),
        )
        .route("/api/records/:id/reuse", post(reuse_record))
        .route("/api/routes", get(list_routes).post(create_route))
        .route("/api/routes/:id", put(update_route).delete(delete_route))
        .route("/api/routes/:id/use", post(use_route))
        .route("/api/companies", get(companies))
        .route("/api/places", get(places_snapshot))
        .route("/api/places/lookup", post(places_lookup))
        .route("/api/places/reset", post(places_reset))
        .route("/api/export", get(export))
        .nest_service("/static", ServeDir::new(static_dir.as_ref()))
        .fallback(not_found)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Health check endpoint.
async fn health() -> &'static str {
    "ok"
}

fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// Check if request accepts HTML.
fn accepts_html(headers: &HeaderMap) -> bool {
    headers
        .get(header::ACCEPT)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|accept| accept.contains("text/html"))
}

/// History page.
async fn index_page(
    State(state): State<AppState>,
    Query(params): Query<HistoryParams>,
) -> Result<Html<String>, AppError> {
    let records = state.store.all_records().await;
    let routes = state.store.all_routes().await;
    let spec = params.to_spec(state.query);
    let view = derive_view(&records, &spec);

    let template = IndexTemplate::new(&spec, &view, &records, &routes);
    let html = template.render().map_err(|e| AppError::Internal {
        message: format!("Template error: {}", e),
    })?;

    Ok(Html(html))
}

/// Filtered, sorted, grouped or paginated history.
async fn list_records(
    State(state): State<AppState>,
    Query(params): Query<HistoryParams>,
) -> Json<HistoryResponse> {
    let records = state.store.all_records().await;
    let spec = params.to_spec(state.query);
    let ignored_filters = spec.invalid_bounds();
    if !ignored_filters.is_empty() {
        tracing::debug!(?ignored_filters, "history query has malformed date bounds");
    }

    Json(HistoryResponse {
        view: derive_view(&records, &spec),
        ignored_filters,
    })
}

async fn get_record(
    State(state): State<AppState>,
    UrlPath(id): UrlPath<String>,
) -> Result<Json<TravelRecord>, AppError> {
    let id = RecordId::new(id);
    state
        .store
        .record(&id)
        .await
        .map(Json)
        .ok_or_else(|| StoreError::RecordNotFound(id).into())
}

async fn create_record(
    State(state): State<AppState>,
    Json(input): Json<RecordInput>,
) -> Result<(StatusCode, Json<TravelRecord>), AppError> {
    let draft = input.validate()?;
    let record = state.store.insert_record(draft).await?;
    tracing::info!(id = %record.id, "record created");
    Ok((StatusCode::CREATED, Json(record)))
}

async fn update_record(
    State(state): State<AppState>,
    UrlPath(id): UrlPath<String>,
    Json(input): Json<RecordInput>,
) -> Result<Json<TravelRecord>, AppError> {
    let draft = input.validate()?;
    let record = state
        .store
        .replace_record(&RecordId::new(id), draft)
        .await?;
    tracing::info!(id = %record.id, "record updated");
    Ok(Json(record))
}

async fn delete_record(
    State(state): State<AppState>,
    UrlPath(id): UrlPath<String>,
) -> Result<StatusCode, AppError> {
    let removed = state.store.delete_record(&RecordId::new(id)).await?;
    tracing::info!(id = %removed.id, "record deleted");
    Ok(StatusCode::NO_CONTENT)
}

/// Log the same trip again today.
async fn reuse_record(
    State(state): State<AppState>,
    UrlPath(id): UrlPath<String>,
) -> Result<(StatusCode, Json<TravelRecord>), AppError> {
    let record = state
        .store
        .reuse_record(&RecordId::new(id), today())
        .await?;
    tracing::info!(id = %record.id, "record reused");
    Ok((StatusCode::CREATED, Json(record)))
}

async fn list_routes(State(state): State<AppState>) -> Json<Vec<FrequentRoute>> {
    Json(state.store.all_routes().await)
}

async fn create_route(
    State(state): State<AppState>,
    Json(input): Json<RouteInput>,
) -> Result<(StatusCode, Json<FrequentRoute>), AppError> {
    let draft = input.validate()?;
    let route = state.store.insert_route(draft).await?;
    tracing::info!(id = %route.id, name = %route.name, "route created");
    Ok((StatusCode::CREATED, Json(route)))
}

async fn update_route(
    State(state): State<AppState>,
    UrlPath(id): UrlPath<String>,
    Json(input): Json<RouteInput>,
) -> Result<Json<FrequentRoute>, AppError> {
    let draft = input.validate()?;
    let route = state.store.replace_route(&RecordId::new(id), draft).await?;
    Ok(Json(route))
}

async fn delete_route(
    State(state): State<AppState>,
    UrlPath(id): UrlPath<String>,
) -> Result<StatusCode, AppError> {
    state.store.delete_route(&RecordId::new(id)).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Log a trip today from a frequent route.
async fn use_route(
    State(state): State<AppState>,
    UrlPath(id): UrlPath<String>,
) -> Result<(StatusCode, Json<TravelRecord>), AppError> {
    let record = state.store.use_route(&RecordId::new(id), today()).await?;
    tracing::info!(id = %record.id, "record created from route");
    Ok((StatusCode::CREATED, Json(record)))
}

/// Company suggestions for a transportation type (train by default).
async fn companies(
    Query(params): Query<CompaniesParams>,
) -> Result<Json<CompaniesResponse>, AppError> {
    let transportation_type = match params.transportation_type.as_deref() {
        None | Some("") => TransportationType::Train,
        Some(value) => value.parse()?,
    };

    Ok(Json(CompaniesResponse {
        companies: companies_for(transportation_type).to_vec(),
    }))
}

async fn places_snapshot(State(state): State<AppState>) -> Json<PlacesResponse> {
    Json(PlacesResponse::from_snapshot(state.resolver.snapshot().await))
}

/// Hand the browser's geolocation result to the resolver and run a lookup.
async fn places_lookup(
    State(state): State<AppState>,
    Json(request): Json<LookupRequest>,
) -> Result<Json<PlacesResponse>, AppError> {
    let report = request.report().ok_or_else(|| AppError::BadRequest {
        message: "Request must include position, errorCode, or supported=false".to_string(),
    })?;

    let snapshot = state
        .resolver
        .fetch_from_current_location(&ReportedPosition(report), request.place_type)
        .await;

    Ok(Json(PlacesResponse::from_snapshot(snapshot)))
}

async fn places_reset(State(state): State<AppState>) -> Json<PlacesResponse> {
    state.resolver.reset().await;
    Json(PlacesResponse::from_snapshot(state.resolver.snapshot().await))
}

/// Spreadsheet download.
async fn export(
    State(state): State<AppState>,
    Query(params): Query<ExportParams>,
) -> Result<Response, AppError> {
    let default_month = today().format("%Y-%m").to_string();
    let range = ExportRange::parse(
        params.range.as_deref().unwrap_or("all"),
        params.start.as_deref(),
        params.end.as_deref(),
        params.month.as_deref(),
        &default_month,
    )?;

    let format: ExportFormat = params.format.as_deref().unwrap_or("").parse()?;

    let records = state.store.all_records().await;
    let file = export_records(&records, &range, format)?;

    let headers = [
        (header::CONTENT_TYPE, file.content_type().to_string()),
        (header::CONTENT_DISPOSITION, file.content_disposition()),
    ];
    Ok((headers, file.contents).into_response())
}

async fn not_found(headers: HeaderMap) -> Response {
    if accepts_html(&headers) {
        let template = ErrorTemplate {
            title: "Not found".to_string(),
            message: "The page you asked for does not exist.".to_string(),
            details: None,
        };
        let html = template
            .render()
            .unwrap_or_else(|e| format!("Template error: {}", e));
        return (StatusCode::NOT_FOUND, Html(html)).into_response();
    }

    AppError::NotFound {
        message: "not found".to_string(),
    }
    .into_response()
}

// ============================================================================
// Error handling
// ============================================================================

/// Application error type.
#[derive(Debug)]
pub enum AppError {
    BadRequest { message: String },
    Validation(ValidationErrors),
    NotFound { message: String },
    Internal { message: String },
}

impl From<ValidationErrors> for AppError {
    fn from(e: ValidationErrors) -> Self {
        AppError::Validation(e)
    }
}

impl From<InvalidTransportationType> for AppError {
    fn from(e: InvalidTransportationType) -> Self {
        AppError::BadRequest {
            message: e.to_string(),
        }
    }
}

impl From<StoreError> for AppError {
    fn from(e: StoreError) -> Self {
        if e.is_not_found() {
            AppError::NotFound {
                message: e.to_string(),
            }
        } else {
            AppError::Internal {
                message: e.to_string(),
            }
        }
    }
}

impl From<ExportError> for AppError {
    fn from(e: ExportError) -> Self {
        match e {
            ExportError::Empty => AppError::NotFound {
                message: e.to_string(),
            },
            ExportError::Write { .. } => AppError::Internal {
                message: e.to_string(),
            },
            _ => AppError::BadRequest {
                message: e.to_string(),
            },
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let (status, error, fields) = match self {
            AppError::BadRequest { message } => (StatusCode::BAD_REQUEST, message, None),
            AppError::Validation(errors) => (
                StatusCode::BAD_REQUEST,
                errors.to_string(),
                Some(errors.fields().clone()),
            ),
            AppError::NotFound { message } => (StatusCode::NOT_FOUND, message, None),
            AppError::Internal { message } => (StatusCode::INTERNAL_SERVER_ERROR, message, None),
        };

        if status.is_server_error() {
            tracing::error!(%status, %error, "request failed");
        } else {
            tracing::debug!(%status, %error, "request rejected");
        }

        let body = Json(ErrorResponse { error, fields });
        (status, body).into_response()
    }
}

#[cfg(test)]
#[path = "routes_tests.rs"]
mod tests;
