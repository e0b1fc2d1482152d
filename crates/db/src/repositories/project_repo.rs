//! Repository for the `projects` table.
//!
//! Every query is scoped by `owner_id`; a project owned by someone else is
//! indistinguishable from a missing one.

use modiste_core::types::DbId;
use sqlx::PgPool;

use crate::models::project::{
    AutoSaveProject, AutoSaveResult, CreateProject, Project, ProjectSummary, UpdateProject,
};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, owner_id, name, description, status, nodes, edges, viewport, \
                       graph_version, thumbnail_url, last_modified, created_at, updated_at";

/// Columns for listing rows (graph omitted).
const SUMMARY_COLUMNS: &str = "id, name, description, status, thumbnail_url, \
                               jsonb_array_length(nodes) AS node_count, \
                               last_modified, created_at";

/// Provides CRUD and auto-save operations for projects.
pub struct ProjectRepo;

impl ProjectRepo {
    /// Insert a new project, returning the created row.
    pub async fn create(pool: &PgPool, input: &CreateProject) -> Result<Project, sqlx::Error> {
        let query = format!(
            "INSERT INTO projects (owner_id, name, description, status, nodes, edges, viewport)
             VALUES ($1, $2, $3, $4, $5, $6, $7)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Project>(&query)
            .bind(input.owner_id)
            .bind(&input.name)
            .bind(&input.description)
            .bind(&input.status)
            .bind(&input.nodes)
            .bind(&input.edges)
            .bind(&input.viewport)
            .fetch_one(pool)
            .await
    }

    /// Find an owner's project by ID. Excludes soft-deleted rows.
    pub async fn find_by_id(
        pool: &PgPool,
        id: DbId,
        owner_id: DbId,
    ) -> Result<Option<Project>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM projects
             WHERE id = $1 AND owner_id = $2 AND deleted_at IS NULL"
        );
        sqlx::query_as::<_, Project>(&query)
            .bind(id)
            .bind(owner_id)
            .fetch_optional(pool)
            .await
    }

    /// Whether the owner has a live project with this ID.
    pub async fn exists_for_owner(
        pool: &PgPool,
        id: DbId,
        owner_id: DbId,
    ) -> Result<bool, sqlx::Error> {
        let (exists,): (bool,) = sqlx::query_as(
            "SELECT EXISTS (
                SELECT 1 FROM projects WHERE id = $1 AND owner_id = $2 AND deleted_at IS NULL
             )",
        )
        .bind(id)
        .bind(owner_id)
        .fetch_one(pool)
        .await?;
        Ok(exists)
    }

    /// List an owner's projects, most recently modified first.
    pub async fn list_for_owner(
        pool: &PgPool,
        owner_id: DbId,
        status: Option<&str>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<ProjectSummary>, sqlx::Error> {
        let query = format!(
            "SELECT {SUMMARY_COLUMNS} FROM projects
             WHERE owner_id = $1
               AND deleted_at IS NULL
               AND ($2::TEXT IS NULL OR status = $2)
             ORDER BY last_modified DESC, id DESC
             LIMIT $3 OFFSET $4"
        );
        sqlx::query_as::<_, ProjectSummary>(&query)
            .bind(owner_id)
            .bind(status)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    /// Count an owner's live projects, optionally by status.
    pub async fn count_for_owner(
        pool: &PgPool,
        owner_id: DbId,
        status: Option<&str>,
    ) -> Result<i64, sqlx::Error> {
        let (count,): (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM projects
             WHERE owner_id = $1
               AND deleted_at IS NULL
               AND ($2::TEXT IS NULL OR status = $2)",
        )
        .bind(owner_id)
        .bind(status)
        .fetch_one(pool)
        .await?;
        Ok(count)
    }

    /// Update a project. Only non-`None` fields in `input` are applied.
    ///
    /// Returns `None` if the project does not exist for this owner.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        owner_id: DbId,
        input: &UpdateProject,
    ) -> Result<Option<Project>, sqlx::Error> {
        let query = format!(
            "UPDATE projects SET
                name = COALESCE($3, name),
                description = COALESCE($4, description),
                status = COALESCE($5, status),
                nodes = COALESCE($6, nodes),
                edges = COALESCE($7, edges),
                viewport = COALESCE($8, viewport),
                thumbnail_url = COALESCE($9, thumbnail_url),
                last_modified = NOW()
             WHERE id = $1 AND owner_id = $2 AND deleted_at IS NULL
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Project>(&query)
            .bind(id)
            .bind(owner_id)
            .bind(&input.name)
            .bind(&input.description)
            .bind(&input.status)
            .bind(&input.nodes)
            .bind(&input.edges)
            .bind(&input.viewport)
            .bind(&input.thumbnail_url)
            .fetch_optional(pool)
            .await
    }

    /// Overwrite the editor graph. Last write wins; no merge is attempted.
    ///
    /// `last_modified` advances on every call, even if the payload is
    /// identical to what is stored.
    pub async fn auto_save(
        pool: &PgPool,
        id: DbId,
        owner_id: DbId,
        input: &AutoSaveProject,
    ) -> Result<Option<AutoSaveResult>, sqlx::Error> {
        sqlx::query_as::<_, AutoSaveResult>(
            "UPDATE projects SET
                nodes = $3,
                edges = $4,
                viewport = COALESCE($5, viewport),
                last_modified = NOW()
             WHERE id = $1 AND owner_id = $2 AND deleted_at IS NULL
             RETURNING id, last_modified",
        )
        .bind(id)
        .bind(owner_id)
        .bind(&input.nodes)
        .bind(&input.edges)
        .bind(&input.viewport)
        .fetch_optional(pool)
        .await
    }

    /// Copy a project (graph included) under a new name, as a draft.
    ///
    /// Returns `None` if the source does not exist for this owner.
    pub async fn duplicate(
        pool: &PgPool,
        id: DbId,
        owner_id: DbId,
        new_name: &str,
    ) -> Result<Option<Project>, sqlx::Error> {
        let query = format!(
            "INSERT INTO projects
                (owner_id, name, description, status, nodes, edges, viewport,
                 graph_version, thumbnail_url)
             SELECT owner_id, $3, description, 'draft', nodes, edges, viewport,
                    graph_version, thumbnail_url
             FROM projects
             WHERE id = $1 AND owner_id = $2 AND deleted_at IS NULL
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Project>(&query)
            .bind(id)
            .bind(owner_id)
            .bind(new_name)
            .fetch_optional(pool)
            .await
    }

    /// Soft-delete a project. Returns `true` if a row was marked deleted.
    pub async fn soft_delete(pool: &PgPool, id: DbId, owner_id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE projects SET deleted_at = NOW()
             WHERE id = $1 AND owner_id = $2 AND deleted_at IS NULL",
        )
        .bind(id)
        .bind(owner_id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }
}
