use std::str::FromStr;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use tracing::instrument;

use crate::{
    domain::models::{LookupEntry, LookupId, LookupKind},
    AppState,
};

use super::ApiError;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/:kind", get(list_entries).post(resolve_entry))
        .route("/:kind/:id", get(get_entry).delete(delete_entry))
}

fn parse_kind(kind: &str) -> Result<LookupKind, ApiError> {
    LookupKind::from_str(kind)
        .map_err(|_| ApiError::not_found(format!("Unknown lookup table: {kind}")))
}

#[instrument(name = "GET /lookups/:kind", skip(app_state))]
async fn list_entries(
    State(app_state): State<AppState>,
    Path(kind): Path<String>,
) -> Result<Json<Vec<LookupEntry>>, ApiError> {
    let kind = parse_kind(&kind)?;
    let entries = app_state.lookup_repo.list(kind).await?;
    Ok(Json(entries))
}

#[derive(Debug, Deserialize)]
struct ResolveEntryBody {
    name: String,
}

#[instrument(name = "POST /lookups/:kind", skip(app_state))]
async fn resolve_entry(
    State(app_state): State<AppState>,
    Path(kind): Path<String>,
    Json(body): Json<ResolveEntryBody>,
) -> Result<Json<LookupEntry>, ApiError> {
    let kind = parse_kind(&kind)?;
    let name = body.name.trim();
    if name.is_empty() {
        return Err(ApiError::bad_request("name must not be blank"));
    }

    let id = app_state.lookup_repo.resolve(kind, name).await?;
    Ok(Json(LookupEntry::new(id, name)))
}

#[instrument(name = "GET /lookups/:kind/:id", skip(app_state))]
async fn get_entry(
    State(app_state): State<AppState>,
    Path((kind, id)): Path<(String, LookupId)>,
) -> Result<Json<LookupEntry>, ApiError> {
    let kind = parse_kind(&kind)?;
    let entry = app_state.lookup_repo.get(kind, id).await?;
    Ok(Json(entry))
}

#[instrument(name = "DELETE /lookups/:kind/:id", skip(app_state))]
async fn delete_entry(
    State(app_state): State<AppState>,
    Path((kind, id)): Path<(String, LookupId)>,
) -> Result<StatusCode, ApiError> {
    let kind = parse_kind(&kind)?;
    app_state.lookup_repo.delete(kind, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
