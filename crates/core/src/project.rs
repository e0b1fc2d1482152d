//! Project lifecycle and editor graph shape checks.
//!
//! The editor's node/edge graph is opaque to the server: nodes and edges are
//! stored exactly as the client sends them. Only the outer shape is checked
//! here so that a malformed auto-save cannot corrupt a project.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::CoreError;

/// Maximum project name length.
pub const MAX_NAME_LEN: usize = 120;

/// Maximum number of nodes allowed on a single canvas.
pub const MAX_NODES_PER_CANVAS: usize = 500;

/// Maximum number of edges allowed on a single canvas.
pub const MAX_EDGES_PER_CANVAS: usize = 2_000;

/// Minimum allowed zoom level.
pub const MIN_ZOOM: f64 = 0.1;

/// Maximum allowed zoom level.
pub const MAX_ZOOM: f64 = 4.0;

/// Suffix appended to the name of a duplicated project.
pub const COPY_SUFFIX: &str = " (Copy)";

/// Project status, stored as text in `projects.status`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProjectStatus {
    #[default]
    Draft,
    Published,
    Archived,
}

impl ProjectStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            ProjectStatus::Draft => "draft",
            ProjectStatus::Published => "published",
            ProjectStatus::Archived => "archived",
        }
    }

    pub fn parse(s: &str) -> Result<Self, CoreError> {
        match s {
            "draft" => Ok(ProjectStatus::Draft),
            "published" => Ok(ProjectStatus::Published),
            "archived" => Ok(ProjectStatus::Archived),
            other => Err(CoreError::Validation(format!(
                "Unknown project status '{other}'. Expected draft, published or archived"
            ))),
        }
    }
}

/// Canvas viewport as persisted with a project.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub x: f64,
    pub y: f64,
    pub zoom: f64,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            zoom: 1.0,
        }
    }
}

impl Viewport {
    /// Default viewport as a JSON value, for new projects.
    pub fn default_json() -> Value {
        serde_json::json!({ "x": 0.0, "y": 0.0, "zoom": 1.0 })
    }
}

/// Validate and trim a project name.
pub fn validate_name(name: &str) -> Result<String, CoreError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(CoreError::Validation("Project name is required".into()));
    }
    if name.chars().count() > MAX_NAME_LEN {
        return Err(CoreError::Validation(format!(
            "Project name must be at most {MAX_NAME_LEN} characters"
        )));
    }
    Ok(name.to_string())
}

/// Check the outer shape of an editor graph.
///
/// `nodes` and `edges` must be JSON arrays within the canvas limits and
/// `viewport`, when present, must decode as a [`Viewport`] with a zoom in
/// `[MIN_ZOOM, MAX_ZOOM]`. Node and edge contents are not inspected.
pub fn validate_graph(
    nodes: Option<&Value>,
    edges: Option<&Value>,
    viewport: Option<&Value>,
) -> Result<(), CoreError> {
    if let Some(nodes) = nodes {
        let nodes = nodes
            .as_array()
            .ok_or_else(|| CoreError::Validation("nodes must be an array".into()))?;
        if nodes.len() > MAX_NODES_PER_CANVAS {
            return Err(CoreError::Validation(format!(
                "Canvas has {} nodes, exceeding the maximum of {MAX_NODES_PER_CANVAS}",
                nodes.len()
            )));
        }
    }

    if let Some(edges) = edges {
        let edges = edges
            .as_array()
            .ok_or_else(|| CoreError::Validation("edges must be an array".into()))?;
        if edges.len() > MAX_EDGES_PER_CANVAS {
            return Err(CoreError::Validation(format!(
                "Canvas has {} edges, exceeding the maximum of {MAX_EDGES_PER_CANVAS}",
                edges.len()
            )));
        }
    }

    if let Some(viewport) = viewport {
        let vp: Viewport = serde_json::from_value(viewport.clone()).map_err(|_| {
            CoreError::Validation("viewport must be an object with numeric x, y and zoom".into())
        })?;
        validate_zoom(vp.zoom)?;
    }

    Ok(())
}

/// Validate that a zoom level is within allowed bounds.
pub fn validate_zoom(zoom: f64) -> Result<(), CoreError> {
    if !(MIN_ZOOM..=MAX_ZOOM).contains(&zoom) {
        return Err(CoreError::Validation(format!(
            "Zoom {zoom} is outside the allowed range [{MIN_ZOOM}, {MAX_ZOOM}]"
        )));
    }
    Ok(())
}

/// Name given to a duplicated project, kept within [`MAX_NAME_LEN`].
pub fn duplicate_name(name: &str) -> String {
    let budget = MAX_NAME_LEN - COPY_SUFFIX.chars().count();
    let base: String = name.chars().take(budget).collect();
    format!("{base}{COPY_SUFFIX}")
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use serde_json::json;

    use super::*;

    #[test]
    fn status_round_trips_through_text() {
        for status in [
            ProjectStatus::Draft,
            ProjectStatus::Published,
            ProjectStatus::Archived,
        ] {
            assert_eq!(ProjectStatus::parse(status.as_str()).unwrap(), status);
        }
        assert!(ProjectStatus::parse("deleted").is_err());
    }

    #[test]
    fn name_is_trimmed_and_required() {
        assert_eq!(validate_name("  Spring lookbook ").unwrap(), "Spring lookbook");
        assert_matches!(validate_name("   "), Err(CoreError::Validation(_)));
        assert!(validate_name(&"x".repeat(MAX_NAME_LEN + 1)).is_err());
    }

    #[test]
    fn graph_accepts_arbitrary_node_payloads() {
        let nodes = json!([
            {
                "id": "model-1",
                "type": "modelNode",
                "position": {"x": 10, "y": 20},
                "data": {"persona": "ava"}
            },
            {"id": "prompt-1", "type": "whatever-the-client-invents", "data": null}
        ]);
        let edges = json!([{"id": "e1", "source": "model-1", "target": "prompt-1"}]);
        let viewport = json!({"x": -120.5, "y": 40, "zoom": 0.75});
        assert!(validate_graph(Some(&nodes), Some(&edges), Some(&viewport)).is_ok());
    }

    #[test]
    fn graph_rejects_wrong_shapes() {
        assert!(validate_graph(Some(&json!({})), None, None).is_err());
        assert!(validate_graph(None, Some(&json!("edges")), None).is_err());
        assert!(validate_graph(None, None, Some(&json!({"x": 0}))).is_err());
        assert!(validate_graph(None, None, Some(&json!({"x": 0, "y": 0, "zoom": 9.0}))).is_err());
    }

    #[test]
    fn graph_rejects_oversized_canvas() {
        let nodes = Value::Array(vec![json!({}); MAX_NODES_PER_CANVAS + 1]);
        assert!(validate_graph(Some(&nodes), None, None).is_err());
    }

    #[test]
    fn absent_parts_are_not_checked() {
        assert!(validate_graph(None, None, None).is_ok());
    }

    #[test]
    fn duplicate_name_appends_suffix_within_limit() {
        assert_eq!(duplicate_name("Capsule"), "Capsule (Copy)");
        let long = "n".repeat(MAX_NAME_LEN);
        let dup = duplicate_name(&long);
        assert_eq!(dup.chars().count(), MAX_NAME_LEN);
        assert!(dup.ends_with(COPY_SUFFIX));
    }

    #[test]
    fn default_viewport_matches_struct_default() {
        let vp: Viewport = serde_json::from_value(Viewport::default_json()).unwrap();
        assert_eq!(vp, Viewport::default());
    }
}
