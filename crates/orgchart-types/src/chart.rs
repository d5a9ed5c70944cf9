//! Core domain types: quarters, departments, role templates, person nodes.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

// =============================================================================
// QUARTERS & PERIOD SELECTION
// =============================================================================

/// One of the four fixed planning quarters.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub enum Quarter {
    P1,
    P2,
    P3,
    P4,
}

impl Quarter {
    /// All quarters in fixed order.
    pub const ALL: [Quarter; 4] = [Quarter::P1, Quarter::P2, Quarter::P3, Quarter::P4];

    pub fn as_str(&self) -> &'static str {
        match self {
            Quarter::P1 => "P1",
            Quarter::P2 => "P2",
            Quarter::P3 => "P3",
            Quarter::P4 => "P4",
        }
    }

    pub fn parse(s: &str) -> Option<Quarter> {
        match s.to_uppercase().as_str() {
            "P1" => Some(Quarter::P1),
            "P2" => Some(Quarter::P2),
            "P3" => Some(Quarter::P3),
            "P4" => Some(Quarter::P4),
            _ => None,
        }
    }
}

impl fmt::Display for Quarter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The period the chart is viewed for: one quarter, or the full-year
/// aggregate (headcount = max across quarters).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum PeriodFilter {
    FullYear,
    Quarter(Quarter),
}

impl Default for PeriodFilter {
    fn default() -> Self {
        PeriodFilter::Quarter(Quarter::P1)
    }
}

impl PeriodFilter {
    pub fn as_str(&self) -> &'static str {
        match self {
            PeriodFilter::FullYear => "ALL",
            PeriodFilter::Quarter(q) => q.as_str(),
        }
    }
}

impl From<PeriodFilter> for String {
    fn from(p: PeriodFilter) -> String {
        p.as_str().to_string()
    }
}

impl TryFrom<String> for PeriodFilter {
    type Error = String;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        if s.eq_ignore_ascii_case("ALL") {
            return Ok(PeriodFilter::FullYear);
        }
        Quarter::parse(&s)
            .map(PeriodFilter::Quarter)
            .ok_or_else(|| format!("unknown period: {s}"))
    }
}

/// Per-quarter headcount for one role template.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuarterCounts {
    #[serde(rename = "P1", default)]
    pub p1: u32,
    #[serde(rename = "P2", default)]
    pub p2: u32,
    #[serde(rename = "P3", default)]
    pub p3: u32,
    #[serde(rename = "P4", default)]
    pub p4: u32,
}

impl QuarterCounts {
    pub fn new(p1: u32, p2: u32, p3: u32, p4: u32) -> Self {
        Self { p1, p2, p3, p4 }
    }

    pub fn get(&self, quarter: Quarter) -> u32 {
        match quarter {
            Quarter::P1 => self.p1,
            Quarter::P2 => self.p2,
            Quarter::P3 => self.p3,
            Quarter::P4 => self.p4,
        }
    }

    /// Maximum headcount across all quarters (full-year view).
    pub fn max(&self) -> u32 {
        Quarter::ALL.iter().map(|q| self.get(*q)).max().unwrap_or(0)
    }

    /// Headcount for the given period selection.
    pub fn headcount_for(&self, period: PeriodFilter) -> u32 {
        match period {
            PeriodFilter::FullYear => self.max(),
            PeriodFilter::Quarter(q) => self.get(q),
        }
    }

    /// Earliest quarter (fixed order) with a non-zero headcount.
    pub fn first_active(&self) -> Option<Quarter> {
        Quarter::ALL.iter().copied().find(|q| self.get(*q) > 0)
    }

    /// Quarters with a non-zero headcount, in fixed order.
    pub fn active_quarters(&self) -> BTreeSet<Quarter> {
        Quarter::ALL
            .iter()
            .copied()
            .filter(|q| self.get(*q) > 0)
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.max() == 0
    }
}

// =============================================================================
// DEPARTMENTS & ROLE TEMPLATES
// =============================================================================

/// A department as produced by the tabular parser.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Department {
    pub id: String,
    pub display_name: String,
    /// CSS-style color for the diagram widget, e.g. `"#1e40af"`.
    pub color: String,
    pub order_index: u32,
}

/// One cleaned row of source data: a role with quarterly headcount.
///
/// Created once at import; only `department_id` may change afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoleTemplate {
    /// Stable identifier tied to source row position, e.g. `"role-5"`.
    pub id: String,
    pub clean_name: String,
    pub original_name: String,
    pub department_id: String,
    pub quarters: QuarterCounts,
}

/// Parser output contract: cleaned departments and quarter-bucketed templates.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParsedWorkbook {
    pub departments: Vec<Department>,
    pub role_templates: Vec<RoleTemplate>,
}

// =============================================================================
// PERSON NODES
// =============================================================================

/// 2-D diagram coordinate (node center).
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f32,
    pub y: f32,
}

impl Position {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// One expanded instance of a role template for the selected period, or a
/// user-created custom role.
///
/// Template-derived nodes are regenerated wholesale on every period switch;
/// `manager_id` is a projection of the canonical assignment map, never
/// derived from templates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonNode {
    /// `"{templateId}-person-{i}"` for template instances; `"custom-{uuid}"`
    /// for user-created roles.
    pub id: String,
    #[serde(default)]
    pub template_id: Option<String>,
    pub role_name: String,
    pub display_name: String,
    /// Synthesized manager placeholders may not belong to any department.
    #[serde(default)]
    pub department_id: Option<String>,
    #[serde(default)]
    pub manager_id: Option<String>,
    #[serde(default)]
    pub position: Position,
    /// Quarters where the owning template has headcount > 0. A set
    /// internally; crosses the wire as an array.
    #[serde(default)]
    pub active_in_quarters: BTreeSet<Quarter>,
    #[serde(default)]
    pub is_custom: bool,
    /// True when the node exists only because something references it as a
    /// manager before its own template activates in the selected period.
    #[serde(default)]
    pub is_future_role: bool,
    #[serde(default)]
    pub start_quarter: Option<Quarter>,
}

impl PersonNode {
    /// Deterministic id for the `index`-th instance of a template.
    pub fn instance_id(template_id: &str, index: usize) -> String {
        format!("{template_id}-person-{index}")
    }
}
