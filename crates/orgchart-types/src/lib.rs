//! Shared boundary types for the org-chart engine
//!
//! This crate is the SINGLE SOURCE OF TRUTH for all types crossing external
//! boundaries.
//!
//! ## Boundaries
//!
//! ```text
//! ┌──────────────────┐  ParsedWorkbook   ┌──────────────────┐
//! │  Tabular parser  │ ────────────────► │  orgchart core   │
//! └──────────────────┘                   │  (store/engines) │
//! ┌──────────────────┐  Diagram          └────────┬─────────┘
//! │  Diagram widget  │ ◄─────────────────────────┤
//! └──────────────────┘                            │
//! ┌──────────────────┐  ChartExport (JSON)        │
//! │  File exchange   │ ◄──────────────────────────┘
//! └──────────────────┘
//! ```
//!
//! ## Rules
//!
//! 1. All boundary types live here - no inline struct definitions at call sites
//! 2. camelCase keys on everything that is persisted or handed to the widget
//! 3. Collections that are sets internally cross the wire as arrays

pub mod chart;
pub mod diagram;
pub mod export;

pub use chart::{
    Department, ParsedWorkbook, PeriodFilter, PersonNode, Position, Quarter, QuarterCounts,
    RoleTemplate,
};
pub use diagram::{Diagram, DiagramEdge, DiagramNode};
pub use export::{ChartExport, EXPORT_VERSION};
