//! Rendering boundary: node and edge records handed to the diagram widget.
//!
//! The widget owns drag interaction and connection gestures; it reports
//! position updates and manager assignments back through the core's
//! mutation API.

use serde::{Deserialize, Serialize};

use crate::chart::Position;

/// A positioned, styled node ready for rendering.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiagramNode {
    pub id: String,
    pub position: Position,
    pub department_color: String,
    pub is_manager: bool,
    pub is_collapsed: bool,
    pub is_custom: bool,
    pub direct_reports_count: usize,
    pub display_name: String,
    pub role_name: String,
}

/// One reporting edge between two visible nodes.
///
/// `source` is the manager, `target` the report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiagramEdge {
    pub id: String,
    pub source: String,
    pub target: String,
    /// Manager and report belong to different departments; drawn distinctly.
    pub cross_department: bool,
}

/// Complete projection output for one rebuild.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Diagram {
    pub nodes: Vec<DiagramNode>,
    pub edges: Vec<DiagramEdge>,
}

impl Diagram {
    pub fn node(&self, id: &str) -> Option<&DiagramNode> {
        self.nodes.iter().find(|n| n.id == id)
    }
}
