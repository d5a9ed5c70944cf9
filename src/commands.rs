//! Command boundary - structured operation descriptors
//!
//! The external interpreter turns free-text instructions into one of a fixed
//! set of descriptors; the core's only obligations are to execute a
//! well-formed descriptor against the store and to classify the destructive
//! kinds for the confirmation UI. The interpreter itself (and its LLM
//! transport) lives outside this crate; [`ContextSnapshot`] is the state
//! summary it receives alongside the instruction.

use serde::{Deserialize, Serialize};

use orgchart_types::PeriodFilter;

use crate::error::ChartResult;
use crate::store::OrgChartStore;
use crate::visibility;

// =============================================================================
// OPERATION DESCRIPTORS
// =============================================================================

/// One role to create, as extracted by the interpreter.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewRole {
    pub role_name: String,
    pub department_id: String,
    #[serde(default)]
    pub manager_id: Option<String>,
}

/// The fixed operation set the interpreter may return. Each variant maps 1:1
/// onto a store mutation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ChartOperation {
    #[serde(rename_all = "camelCase")]
    AddRole {
        role_name: String,
        department_id: String,
        #[serde(default)]
        manager_id: Option<String>,
    },
    AddRoles { roles: Vec<NewRole> },
    #[serde(rename_all = "camelCase")]
    DeleteRoles { person_ids: Vec<String> },
    #[serde(rename_all = "camelCase")]
    SetManager {
        person_id: String,
        manager_id: String,
    },
    #[serde(rename_all = "camelCase")]
    BulkSetManager {
        person_ids: Vec<String>,
        manager_id: String,
    },
    #[serde(rename_all = "camelCase")]
    RemoveManager { person_id: String },
    #[serde(rename_all = "camelCase")]
    BulkRemoveManager { person_ids: Vec<String> },
}

impl ChartOperation {
    /// Operations that require user confirmation before execution.
    pub fn is_destructive(&self) -> bool {
        matches!(
            self,
            ChartOperation::DeleteRoles { .. } | ChartOperation::BulkRemoveManager { .. }
        )
    }
}

/// What happened when a descriptor ran.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OperationReport {
    pub applied: usize,
    pub message: String,
}

/// Execute a well-formed descriptor against the store.
///
/// Validation failures inside the store surface exactly as they do for
/// direct mutations: a typed error plus the store's advisory message.
pub fn apply_operation(
    store: &mut OrgChartStore,
    operation: ChartOperation,
) -> ChartResult<OperationReport> {
    match operation {
        ChartOperation::AddRole {
            role_name,
            department_id,
            manager_id,
        } => {
            store.add_custom_role(&role_name, &department_id, manager_id.as_deref())?;
            Ok(OperationReport {
                applied: 1,
                message: format!("Added role {role_name}"),
            })
        }
        ChartOperation::AddRoles { roles } => {
            let mut applied = 0;
            for role in &roles {
                store.add_custom_role(
                    &role.role_name,
                    &role.department_id,
                    role.manager_id.as_deref(),
                )?;
                applied += 1;
            }
            Ok(OperationReport {
                applied,
                message: format!("Added {applied} roles"),
            })
        }
        ChartOperation::DeleteRoles { person_ids } => {
            let outcome = store.delete_persons(&person_ids);
            Ok(OperationReport {
                applied: outcome.applied,
                message: format!(
                    "Deleted {} roles ({} skipped)",
                    outcome.applied, outcome.skipped
                ),
            })
        }
        ChartOperation::SetManager {
            person_id,
            manager_id,
        } => {
            store.set_manager(&person_id, Some(&manager_id))?;
            Ok(OperationReport {
                applied: 1,
                message: format!("{person_id} now reports to {manager_id}"),
            })
        }
        ChartOperation::BulkSetManager {
            person_ids,
            manager_id,
        } => {
            let outcome = store.bulk_set_manager(&person_ids, &manager_id);
            Ok(OperationReport {
                applied: outcome.applied,
                message: format!(
                    "Assigned {} reports to {manager_id} ({} skipped)",
                    outcome.applied, outcome.skipped
                ),
            })
        }
        ChartOperation::RemoveManager { person_id } => {
            store.remove_manager(&person_id)?;
            Ok(OperationReport {
                applied: 1,
                message: format!("{person_id} no longer has a manager"),
            })
        }
        ChartOperation::BulkRemoveManager { person_ids } => {
            store.bulk_remove_manager(&person_ids);
            Ok(OperationReport {
                applied: person_ids.len(),
                message: format!("Removed managers from {} persons", person_ids.len()),
            })
        }
    }
}

// =============================================================================
// CONTEXT SNAPSHOT
// =============================================================================

/// Serialized state summary handed to the interpreter with each instruction.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContextSnapshot {
    pub selected_quarter: PeriodFilter,
    pub departments: Vec<DepartmentSummary>,
    pub persons: Vec<PersonSummary>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DepartmentSummary {
    pub id: String,
    pub display_name: String,
    pub headcount: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonSummary {
    pub id: String,
    pub display_name: String,
    pub role_name: String,
    #[serde(default)]
    pub department_id: Option<String>,
    #[serde(default)]
    pub manager_id: Option<String>,
    pub is_manager: bool,
}

pub fn context_snapshot(store: &OrgChartStore) -> ContextSnapshot {
    let managers = visibility::manager_ids(store.persons());
    let departments = store
        .departments()
        .iter()
        .map(|d| DepartmentSummary {
            id: d.id.clone(),
            display_name: d.display_name.clone(),
            headcount: store
                .persons()
                .iter()
                .filter(|p| p.department_id.as_deref() == Some(d.id.as_str()))
                .count(),
        })
        .collect();
    let persons = store
        .persons()
        .iter()
        .map(|p| PersonSummary {
            id: p.id.clone(),
            display_name: p.display_name.clone(),
            role_name: p.role_name.clone(),
            department_id: p.department_id.clone(),
            manager_id: p.manager_id.clone(),
            is_manager: managers.contains(&p.id),
        })
        .collect();
    ContextSnapshot {
        selected_quarter: store.period(),
        departments,
        persons,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_destructive_classification() {
        let delete = ChartOperation::DeleteRoles {
            person_ids: vec!["custom-1".into()],
        };
        let bulk_remove = ChartOperation::BulkRemoveManager {
            person_ids: vec!["a".into()],
        };
        let assign = ChartOperation::SetManager {
            person_id: "a".into(),
            manager_id: "b".into(),
        };
        assert!(delete.is_destructive());
        assert!(bulk_remove.is_destructive());
        assert!(!assign.is_destructive());
    }

    #[test]
    fn test_descriptor_wire_format() {
        let json = r#"{"type":"set_manager","personId":"role-1-person-0","managerId":"role-2-person-0"}"#;
        let op: ChartOperation = serde_json::from_str(json).unwrap();
        match op {
            ChartOperation::SetManager {
                person_id,
                manager_id,
            } => {
                assert_eq!(person_id, "role-1-person-0");
                assert_eq!(manager_id, "role-2-person-0");
            }
            other => panic!("unexpected descriptor: {other:?}"),
        }
    }

    #[test]
    fn test_add_roles_wire_format() {
        let json = r#"{"type":"add_roles","roles":[
            {"roleName":"Data Engineer","departmentId":"eng"},
            {"roleName":"QA Lead","departmentId":"eng","managerId":"role-1-person-0"}
        ]}"#;
        let op: ChartOperation = serde_json::from_str(json).unwrap();
        match op {
            ChartOperation::AddRoles { roles } => {
                assert_eq!(roles.len(), 2);
                assert_eq!(roles[1].manager_id.as_deref(), Some("role-1-person-0"));
            }
            other => panic!("unexpected descriptor: {other:?}"),
        }
    }
}
