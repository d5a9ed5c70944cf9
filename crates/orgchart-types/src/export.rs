//! Persisted exchange schema (export/import boundary), version 1.
//!
//! Missing required top-level keys fail deserialization, which the importer
//! surfaces as a wholesale format error. The canonical manager map is not
//! stored separately; importers reconstruct it from `personNodes[*].managerId`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::chart::{Department, PeriodFilter, PersonNode, RoleTemplate};

/// Current schema version. Foreign versions are rejected wholesale
/// (hard-migration policy: persisted payloads are never transformed).
pub const EXPORT_VERSION: u32 = 1;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartExport {
    pub version: u32,
    pub export_date: DateTime<Utc>,
    #[serde(default)]
    pub csv_file_name: Option<String>,
    pub selected_quarter: PeriodFilter,
    pub departments: Vec<Department>,
    pub role_templates: Vec<RoleTemplate>,
    pub person_nodes: Vec<PersonNode>,
    /// The collapse set, serialized as an array.
    pub collapsed_nodes: Vec<String>,
}
