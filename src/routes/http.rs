// HTTP handlers: version, upload, history, summary, pdf

use axum::{
    Json,
    extract::{Multipart, Path, Query, State},
    http::{StatusCode, header},
    response::IntoResponse,
};
use serde::Deserialize;
use tracing::info;

use super::{ApiError, AppState};
use crate::aggregator;
use crate::ingest::Table;
use crate::report;

const UPLOAD_FIELD: &str = "file";
const DEFAULT_FILE_NAME: &str = "upload.csv";

/// GET /version — package name and version baked in at build time.
pub(super) async fn version_handler() -> impl IntoResponse {
    Json(serde_json::json!({
        "name": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

/// POST /api/upload/ — multipart `file` field; summarises, stores, returns the record (201).
pub(super) async fn upload_handler(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<impl IntoResponse, ApiError> {
    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some(UPLOAD_FIELD) {
            continue;
        }
        let file_name = field
            .file_name()
            .filter(|n| !n.is_empty())
            .unwrap_or(DEFAULT_FILE_NAME)
            .to_string();
        let bytes = field.bytes().await?;

        let table = Table::from_csv(&bytes)?;
        let fields = aggregator::aggregate(&file_name, &table)?;
        let record = state.store.insert(fields).await?;
        info!(
            id = record.id,
            file_name = %record.file_name,
            total_count = record.total_count,
            "stored upload summary"
        );
        return Ok((StatusCode::CREATED, Json(record)));
    }
    Err(ApiError::BadRequest("No file uploaded".into()))
}

#[derive(Debug, Deserialize)]
pub(super) struct HistoryParams {
    limit: Option<u32>,
}

/// GET /api/history/ — newest first; `limit` defaults to (and is capped at) the retention ceiling.
pub(super) async fn history_handler(
    State(state): State<AppState>,
    Query(params): Query<HistoryParams>,
) -> Result<impl IntoResponse, ApiError> {
    let limit = params.limit.unwrap_or(state.store.retention_limit());
    let records = state.store.list_recent(limit).await?;
    Ok(Json(records))
}

/// GET /api/summary/{id}/
pub(super) async fn summary_handler(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    let record = state.store.get(id).await?;
    Ok(Json(record))
}

/// GET /api/pdf/{id}/ — report as a PDF attachment.
pub(super) async fn pdf_handler(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    let record = state.store.get(id).await?;
    let pdf = report::render_pdf(&record)?;
    Ok((
        [
            (header::CONTENT_TYPE, "application/pdf".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"dataset_{}_report.pdf\"", id),
            ),
        ],
        pdf,
    ))
}
