//! Layout engine and diagram projection for the org chart.
//!
//! # Architecture
//!
//! ```text
//! visible PersonNodes (+ full set for manager checks)
//!        │
//!        ▼
//! LayoutEngine (hierarchical tree or department grid)
//!        │
//!        ▼
//! position map (person id → {x, y})
//!        │
//!        ▼
//! project() ──► Diagram (node/edge records for the external widget)
//! ```
//!
//! The rendering widget itself lives outside this crate; everything here is
//! plain data in, plain data out.

pub mod layout;
pub mod projection;

pub use layout::LayoutEngine;
pub use projection::project;
