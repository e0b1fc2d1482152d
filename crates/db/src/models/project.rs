//! Project entity model and DTOs.

use modiste_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A full project row, including the editor graph.
#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: DbId,
    pub owner_id: DbId,
    pub name: String,
    pub description: Option<String>,
    pub status: String,
    pub nodes: serde_json::Value,
    pub edges: serde_json::Value,
    pub viewport: serde_json::Value,
    pub graph_version: i32,
    pub thumbnail_url: Option<String>,
    pub last_modified: Timestamp,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Project listing row without the (potentially large) graph.
#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectSummary {
    pub id: DbId,
    pub name: String,
    pub description: Option<String>,
    pub status: String,
    pub thumbnail_url: Option<String>,
    pub node_count: i32,
    pub last_modified: Timestamp,
    pub created_at: Timestamp,
}

/// DTO for creating a project. Missing graph parts start empty.
#[derive(Debug, Clone)]
pub struct CreateProject {
    pub owner_id: DbId,
    pub name: String,
    pub description: Option<String>,
    pub status: String,
    pub nodes: serde_json::Value,
    pub edges: serde_json::Value,
    pub viewport: serde_json::Value,
}

/// DTO for a full project update. `None` fields keep their stored value.
#[derive(Debug, Clone, Default)]
pub struct UpdateProject {
    pub name: Option<String>,
    pub description: Option<String>,
    pub status: Option<String>,
    pub nodes: Option<serde_json::Value>,
    pub edges: Option<serde_json::Value>,
    pub viewport: Option<serde_json::Value>,
    pub thumbnail_url: Option<String>,
}

/// DTO for the auto-save overwrite. Nodes and edges are always replaced;
/// the viewport is replaced when present.
#[derive(Debug, Clone)]
pub struct AutoSaveProject {
    pub nodes: serde_json::Value,
    pub edges: serde_json::Value,
    pub viewport: Option<serde_json::Value>,
}

/// Auto-save acknowledgement returned instead of the full row.
#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AutoSaveResult {
    pub id: DbId,
    pub last_modified: Timestamp,
}
