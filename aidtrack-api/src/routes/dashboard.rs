use axum::{extract::State, routing::get, Json, Router};
use tracing::instrument;

use crate::{domain::models::Dashboard, AppState};

use super::ApiError;

pub fn router() -> Router<AppState> {
    Router::new().route("/", get(get_dashboard))
}

#[instrument(name = "GET /dashboard", skip(app_state))]
async fn get_dashboard(State(app_state): State<AppState>) -> Result<Json<Dashboard>, ApiError> {
    let dashboard = app_state.project_repo.dashboard().await?;
    Ok(Json(dashboard))
}
