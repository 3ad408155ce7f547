use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use tracing::instrument;

use crate::{
    domain::models::{ProjectDetail, ProjectFilter, ProjectId, ProjectRecord, ProjectSummary},
    AppState,
};

use super::ApiError;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_projects).post(create_project))
        .route("/all", get(list_projects))
        .route("/country/:country_name", get(list_projects_by_country))
        .route(
            "/approval-status/:status_name",
            get(list_projects_by_approval_status),
        )
        .route(
            "/:project_id",
            get(get_project).put(update_project).delete(delete_project),
        )
}

#[instrument(name = "GET /projects", skip(app_state))]
async fn list_projects(
    State(app_state): State<AppState>,
) -> Result<Json<Vec<ProjectSummary>>, ApiError> {
    let projects = app_state.project_repo.list(&ProjectFilter::All).await?;
    Ok(Json(projects))
}

#[instrument(name = "GET /projects/country/:country_name", skip(app_state))]
async fn list_projects_by_country(
    State(app_state): State<AppState>,
    Path(country_name): Path<String>,
) -> Result<Json<Vec<ProjectSummary>>, ApiError> {
    let projects = app_state
        .project_repo
        .list(&ProjectFilter::Country(country_name))
        .await?;
    Ok(Json(projects))
}

#[instrument(name = "GET /projects/approval-status/:status_name", skip(app_state))]
async fn list_projects_by_approval_status(
    State(app_state): State<AppState>,
    Path(status_name): Path<String>,
) -> Result<Json<Vec<ProjectSummary>>, ApiError> {
    let projects = app_state
        .project_repo
        .list(&ProjectFilter::ApprovalStatus(status_name))
        .await?;
    Ok(Json(projects))
}

#[instrument(name = "GET /projects/:project_id", skip(app_state))]
async fn get_project(
    State(app_state): State<AppState>,
    Path(project_id): Path<ProjectId>,
) -> Result<Json<ProjectDetail>, ApiError> {
    let project = app_state.project_repo.get(project_id).await?;
    Ok(Json(project))
}

fn validate(record: &ProjectRecord) -> Result<(), ApiError> {
    if record.title.trim().is_empty() {
        return Err(ApiError::bad_request("title is required"));
    }
    Ok(())
}

#[instrument(
    name = "POST /projects",
    skip(app_state, record),
    fields(project_id = %record.project_id)
)]
async fn create_project(
    State(app_state): State<AppState>,
    Json(record): Json<ProjectRecord>,
) -> Result<(StatusCode, Json<ProjectDetail>), ApiError> {
    validate(&record)?;
    app_state.project_repo.insert(&record).await?;
    tracing::info!("Created project");

    let project = app_state.project_repo.get(record.project_id).await?;
    Ok((StatusCode::CREATED, Json(project)))
}

#[instrument(name = "PUT /projects/:project_id", skip(app_state, record))]
async fn update_project(
    State(app_state): State<AppState>,
    Path(project_id): Path<ProjectId>,
    Json(record): Json<ProjectRecord>,
) -> Result<Json<ProjectDetail>, ApiError> {
    if record.project_id != project_id {
        return Err(ApiError::bad_request(format!(
            "project id {} in body does not match path",
            record.project_id
        )));
    }
    validate(&record)?;
    app_state.project_repo.update(&record).await?;

    let project = app_state.project_repo.get(project_id).await?;
    Ok(Json(project))
}

#[instrument(name = "DELETE /projects/:project_id", skip(app_state))]
async fn delete_project(
    State(app_state): State<AppState>,
    Path(project_id): Path<ProjectId>,
) -> Result<StatusCode, ApiError> {
    app_state.project_repo.delete(project_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
