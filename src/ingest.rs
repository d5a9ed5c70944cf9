//! Input boundary for the external tabular parser.
//!
//! The parser itself (section detection, row/column extraction) lives
//! outside the core. This module holds the pieces both sides share: the
//! role-title cleaning contract and structural validation of the parser's
//! output before it replaces store state.

use once_cell::sync::Lazy;
use regex::Regex;

use orgchart_types::ParsedWorkbook;

use crate::error::{ChartError, ChartResult};

static PARENTHETICAL: Lazy<Regex> = Lazy::new(|| Regex::new(r"\([^)]*\)").unwrap());
static MARKERS: Lazy<Regex> = Lazy::new(|| Regex::new(r"[*†#•~]+").unwrap());

/// Normalize a raw role title: strip parenthetical annotations, strip marker
/// characters, collapse whitespace, trim.
pub fn clean_role_title(raw: &str) -> String {
    let stripped = PARENTHETICAL.replace_all(raw, " ");
    let stripped = MARKERS.replace_all(&stripped, " ");
    stripped.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Validate parser output before it is allowed to replace store state.
pub fn validate_workbook(workbook: &ParsedWorkbook) -> ChartResult<()> {
    for template in &workbook.role_templates {
        if !workbook
            .departments
            .iter()
            .any(|d| d.id == template.department_id)
        {
            return Err(ChartError::InvalidWorkbook(format!(
                "template {} references unknown department {}",
                template.id, template.department_id
            )));
        }
        if template.quarters.is_empty() {
            return Err(ChartError::InvalidWorkbook(format!(
                "template {} has no active quarter",
                template.id
            )));
        }
    }
    let mut seen = std::collections::HashSet::new();
    for template in &workbook.role_templates {
        if !seen.insert(template.id.as_str()) {
            return Err(ChartError::InvalidWorkbook(format!(
                "duplicate template id {}",
                template.id
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use orgchart_types::{Department, QuarterCounts, RoleTemplate};

    #[test]
    fn test_clean_role_title() {
        assert_eq!(
            clean_role_title("Senior Engineer* (contractor)"),
            "Senior Engineer"
        );
        assert_eq!(clean_role_title("  Designer †  "), "Designer");
        assert_eq!(clean_role_title("Data   Analyst"), "Data Analyst");
    }

    #[test]
    fn test_workbook_with_empty_template_rejected() {
        let workbook = ParsedWorkbook {
            departments: vec![Department {
                id: "eng".into(),
                display_name: "Engineering".into(),
                color: "#1e40af".into(),
                order_index: 0,
            }],
            role_templates: vec![RoleTemplate {
                id: "role-1".into(),
                clean_name: "Engineer".into(),
                original_name: "Engineer".into(),
                department_id: "eng".into(),
                quarters: QuarterCounts::default(),
            }],
        };
        assert!(matches!(
            validate_workbook(&workbook),
            Err(ChartError::InvalidWorkbook(_))
        ));
    }

    #[test]
    fn test_workbook_with_unknown_department_rejected() {
        let workbook = ParsedWorkbook {
            departments: vec![],
            role_templates: vec![RoleTemplate {
                id: "role-1".into(),
                clean_name: "Engineer".into(),
                original_name: "Engineer".into(),
                department_id: "ghost".into(),
                quarters: QuarterCounts::new(1, 0, 0, 0),
            }],
        };
        assert!(validate_workbook(&workbook).is_err());
    }
}
