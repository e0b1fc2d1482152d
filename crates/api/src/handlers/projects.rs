//! Handlers for the `/projects` resource.
//!
//! Projects hold the editor's node/edge graph as opaque JSON. Every query
//! is scoped to the caller, so someone else's project is a 404.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use modiste_core::error::CoreError;
use modiste_core::project::{
    duplicate_name, validate_graph, validate_name, ProjectStatus, Viewport,
};
use modiste_core::types::DbId;
use modiste_db::models::project::{
    AutoSaveProject, AutoSaveResult, CreateProject, Project, ProjectSummary, UpdateProject,
};
use modiste_db::repositories::ProjectRepo;
use serde::Deserialize;
use serde_json::Value;

use crate::error::{AppError, AppResult};
use crate::extract::AppJson;
use crate::middleware::auth::AuthUser;
use crate::query::page_window;
use crate::response::{DataResponse, MessageResponse, PagedResponse};
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request types
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct ProjectListParams {
    pub status: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
    pub page: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct CreateProjectRequest {
    pub name: String,
    pub description: Option<String>,
    pub status: Option<String>,
    pub nodes: Option<Value>,
    pub edges: Option<Value>,
    pub viewport: Option<Value>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProjectRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub status: Option<String>,
    pub nodes: Option<Value>,
    pub edges: Option<Value>,
    pub viewport: Option<Value>,
    pub thumbnail_url: Option<String>,
}

/// Auto-save payload. `nodes` and `edges` are required and replace the
/// stored graph wholesale.
#[derive(Debug, Deserialize)]
pub struct AutoSaveRequest {
    pub nodes: Option<Value>,
    pub edges: Option<Value>,
    pub viewport: Option<Value>,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// GET /api/projects
///
/// The caller's projects, most recently modified first. Graphs are omitted;
/// each row carries a `nodeCount` instead.
pub async fn list_projects(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(params): Query<ProjectListParams>,
) -> AppResult<Json<PagedResponse<ProjectSummary>>> {
    let status = params
        .status
        .as_deref()
        .map(ProjectStatus::parse)
        .transpose()?
        .map(ProjectStatus::as_str);
    let (limit, offset) = page_window(params.limit, params.offset, params.page);

    let projects =
        ProjectRepo::list_for_owner(&state.pool, auth.user_id, status, limit, offset).await?;
    let total = ProjectRepo::count_for_owner(&state.pool, auth.user_id, status).await?;

    Ok(Json(PagedResponse::new(projects, total, limit, offset)))
}

/// POST /api/projects
pub async fn create_project(
    State(state): State<AppState>,
    auth: AuthUser,
    AppJson(input): AppJson<CreateProjectRequest>,
) -> AppResult<(StatusCode, Json<DataResponse<Project>>)> {
    let name = validate_name(&input.name)?;
    let status = match input.status.as_deref() {
        Some(s) => ProjectStatus::parse(s)?,
        None => ProjectStatus::default(),
    };
    validate_graph(
        input.nodes.as_ref(),
        input.edges.as_ref(),
        input.viewport.as_ref(),
    )?;

    let project = ProjectRepo::create(
        &state.pool,
        &CreateProject {
            owner_id: auth.user_id,
            name,
            description: input.description,
            status: status.as_str().to_string(),
            nodes: input.nodes.unwrap_or_else(|| Value::Array(vec![])),
            edges: input.edges.unwrap_or_else(|| Value::Array(vec![])),
            viewport: input.viewport.unwrap_or_else(Viewport::default_json),
        },
    )
    .await?;

    tracing::info!(project_id = project.id, owner_id = auth.user_id, "Project created");
    Ok((StatusCode::CREATED, Json(DataResponse::new(project))))
}

/// GET /api/projects/{id}
pub async fn get_project(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<Project>>> {
    let project = ProjectRepo::find_by_id(&state.pool, id, auth.user_id)
        .await?
        .ok_or_else(|| not_found(id))?;
    Ok(Json(DataResponse::new(project)))
}

/// PUT /api/projects/{id}
///
/// Full update. Omitted fields keep their stored value.
pub async fn update_project(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<DbId>,
    AppJson(input): AppJson<UpdateProjectRequest>,
) -> AppResult<Json<DataResponse<Project>>> {
    let name = input.name.as_deref().map(validate_name).transpose()?;
    let status = input
        .status
        .as_deref()
        .map(ProjectStatus::parse)
        .transpose()?
        .map(|s| s.as_str().to_string());
    validate_graph(
        input.nodes.as_ref(),
        input.edges.as_ref(),
        input.viewport.as_ref(),
    )?;

    let update = UpdateProject {
        name,
        description: input.description,
        status,
        nodes: input.nodes,
        edges: input.edges,
        viewport: input.viewport,
        thumbnail_url: input.thumbnail_url,
    };
    let project = ProjectRepo::update(&state.pool, id, auth.user_id, &update)
        .await?
        .ok_or_else(|| not_found(id))?;

    tracing::info!(project_id = id, owner_id = auth.user_id, "Project updated");
    Ok(Json(DataResponse::new(project)))
}

/// PATCH /api/projects/{id}/autosave
///
/// Debounced editor save: overwrites nodes, edges and (when sent) the
/// viewport. Last write wins. The response carries only the new
/// `lastModified` so the client can track staleness cheaply.
pub async fn auto_save_project(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<DbId>,
    AppJson(input): AppJson<AutoSaveRequest>,
) -> AppResult<Json<DataResponse<AutoSaveResult>>> {
    let (Some(nodes), Some(edges)) = (input.nodes, input.edges) else {
        return Err(AppError::Core(CoreError::Validation(
            "nodes and edges are required".into(),
        )));
    };
    validate_graph(Some(&nodes), Some(&edges), input.viewport.as_ref())?;

    let saved = ProjectRepo::auto_save(
        &state.pool,
        id,
        auth.user_id,
        &AutoSaveProject {
            nodes,
            edges,
            viewport: input.viewport,
        },
    )
    .await?
    .ok_or_else(|| not_found(id))?;

    tracing::debug!(project_id = id, "Project auto-saved");
    Ok(Json(DataResponse::new(saved)))
}

/// POST /api/projects/{id}/duplicate
///
/// Copy a project, graph included, as a new draft named "<name> (Copy)".
pub async fn duplicate_project(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<(StatusCode, Json<DataResponse<Project>>)> {
    let source = ProjectRepo::find_by_id(&state.pool, id, auth.user_id)
        .await?
        .ok_or_else(|| not_found(id))?;

    let copy = ProjectRepo::duplicate(&state.pool, id, auth.user_id, &duplicate_name(&source.name))
        .await?
        .ok_or_else(|| not_found(id))?;

    tracing::info!(source_id = id, project_id = copy.id, "Project duplicated");
    Ok((StatusCode::CREATED, Json(DataResponse::new(copy))))
}

/// DELETE /api/projects/{id}
pub async fn delete_project(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<Json<MessageResponse>> {
    if !ProjectRepo::soft_delete(&state.pool, id, auth.user_id).await? {
        return Err(not_found(id));
    }
    tracing::info!(project_id = id, owner_id = auth.user_id, "Project deleted");
    Ok(Json(MessageResponse::new("Project deleted successfully")))
}

fn not_found(id: DbId) -> AppError {
    AppError::Core(CoreError::NotFound {
        entity: "Project",
        id,
    })
}
