//! Manager relationship engine - canonical map and validated mutation
//!
//! The canonical assignment map is the only relationship state that survives
//! period switches; `PersonNode::manager_id` is a regenerable projection of
//! it. All mutation goes through the operations here, which validate before
//! touching either structure, so the relation stays an acyclic, irreflexive
//! forest.

use std::collections::{BTreeMap, HashMap, HashSet};

use serde::{Deserialize, Serialize};
use tracing::warn;

use orgchart_types::PersonNode;

use crate::error::{ChartError, ChartResult};

/// Hard cap on upward chain walks. Exceeding it fails safe: the assignment
/// is rejected as if it cycled.
pub const CYCLE_WALK_CAP: usize = 1000;

// =============================================================================
// CANONICAL ASSIGNMENT MAP
// =============================================================================

/// Durable person → manager relation, independent of the selected period.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManagerAssignments {
    map: BTreeMap<String, String>,
}

impl ManagerAssignments {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reconstruct the map from person records (import boundary: the
    /// exchange format stores only `personNodes[*].managerId`).
    pub fn from_persons(persons: &[PersonNode]) -> Self {
        let map = persons
            .iter()
            .filter_map(|p| Some((p.id.clone(), p.manager_id.clone()?)))
            .collect();
        Self { map }
    }

    pub fn manager_of(&self, person_id: &str) -> Option<&str> {
        self.map.get(person_id).map(String::as_str)
    }

    pub fn assign(&mut self, person_id: &str, manager_id: &str) {
        self.map
            .insert(person_id.to_string(), manager_id.to_string());
    }

    pub fn clear(&mut self, person_id: &str) {
        self.map.remove(person_id);
    }

    /// Deletion cascade over the map: drop the person's own entry and every
    /// entry that reports to them.
    pub fn remove_all_references(&mut self, id: &str) {
        self.map.remove(id);
        self.map.retain(|_, manager| manager != id);
    }

    /// Every id referenced as a manager, sorted and unique. Feeds placeholder
    /// synthesis during expansion.
    pub fn referenced_manager_ids(&self) -> Vec<String> {
        let unique: std::collections::BTreeSet<&str> =
            self.map.values().map(String::as_str).collect();
        unique.into_iter().map(String::from).collect()
    }

    pub fn contains_person(&self, person_id: &str) -> bool {
        self.map.contains_key(person_id)
    }

    pub fn references_as_manager(&self, id: &str) -> bool {
        self.map.values().any(|m| m == id)
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}

// =============================================================================
// CYCLE VALIDATION
// =============================================================================

/// Would assigning `candidate_manager_id` as `person_id`'s manager create a
/// cycle (or a self-loop)?
///
/// Walks the candidate's manager chain upward. A repeated node (cycle
/// already present in the data) or an exhausted walk cap also answers true -
/// reject rather than loop.
pub fn would_create_cycle(
    person_id: &str,
    candidate_manager_id: Option<&str>,
    persons: &[PersonNode],
) -> bool {
    let managers: HashMap<&str, &str> = persons
        .iter()
        .filter_map(|p| Some((p.id.as_str(), p.manager_id.as_deref()?)))
        .collect();
    walk_would_cycle(person_id, candidate_manager_id, &managers)
}

fn walk_would_cycle(
    person_id: &str,
    candidate_manager_id: Option<&str>,
    managers: &HashMap<&str, &str>,
) -> bool {
    let Some(candidate) = candidate_manager_id else {
        return false;
    };
    if candidate == person_id {
        return true;
    }

    let mut visited: HashSet<&str> = HashSet::new();
    visited.insert(candidate);
    let mut current = candidate;
    for _ in 0..CYCLE_WALK_CAP {
        let Some(next) = managers.get(current).copied() else {
            return false;
        };
        if next == person_id {
            return true;
        }
        if !visited.insert(next) {
            // existing data already cycles; refuse to extend it
            return true;
        }
        current = next;
    }
    warn!(person_id, candidate, "manager chain walk cap exceeded");
    true
}

// =============================================================================
// MUTATION OPERATIONS
// =============================================================================

/// Set or clear one person's manager.
///
/// Clearing (`None`) always succeeds and deletes the canonical entry. A
/// rejected assignment mutates nothing.
pub fn set_manager(
    assignments: &mut ManagerAssignments,
    persons: &mut [PersonNode],
    person_id: &str,
    manager_id: Option<&str>,
) -> ChartResult<()> {
    if !persons.iter().any(|p| p.id == person_id) {
        return Err(ChartError::UnknownPerson(person_id.to_string()));
    }
    match manager_id {
        None => {
            assignments.clear(person_id);
            set_person_manager(persons, person_id, None);
            Ok(())
        }
        Some(manager) if manager == person_id => Err(ChartError::SelfManager {
            person_id: person_id.to_string(),
        }),
        Some(manager) => {
            if would_create_cycle(person_id, Some(manager), persons) {
                return Err(ChartError::CycleRejected {
                    person_id: person_id.to_string(),
                    manager_id: manager.to_string(),
                });
            }
            assignments.assign(person_id, manager);
            set_person_manager(persons, person_id, Some(manager));
            Ok(())
        }
    }
}

/// Outcome of a bulk mutation: how many ids were applied and skipped.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BulkOutcome {
    pub applied: usize,
    pub skipped: usize,
}

/// Assign one manager to many persons.
///
/// Every id validates against the pre-mutation graph: earlier successes in
/// the batch never enable (or block) later entries of the same call. Invalid
/// ids are skipped and counted, not surfaced individually.
pub fn bulk_set_manager(
    assignments: &mut ManagerAssignments,
    persons: &mut [PersonNode],
    person_ids: &[String],
    manager_id: &str,
) -> BulkOutcome {
    let snapshot: HashMap<&str, &str> = persons
        .iter()
        .filter_map(|p| Some((p.id.as_str(), p.manager_id.as_deref()?)))
        .collect();
    let known: HashSet<&str> = persons.iter().map(|p| p.id.as_str()).collect();

    let mut accepted = Vec::new();
    let mut outcome = BulkOutcome::default();
    for person_id in person_ids {
        let valid = known.contains(person_id.as_str())
            && !walk_would_cycle(person_id, Some(manager_id), &snapshot);
        if valid {
            accepted.push(person_id.clone());
            outcome.applied += 1;
        } else {
            outcome.skipped += 1;
        }
    }
    for person_id in &accepted {
        assignments.assign(person_id, manager_id);
        set_person_manager(persons, person_id, Some(manager_id));
    }
    if outcome.skipped > 0 {
        warn!(
            skipped = outcome.skipped,
            manager_id, "bulk manager assignment partially applied"
        );
    }
    outcome
}

/// Remove the manager from many persons. Unconditional; always succeeds.
pub fn bulk_remove_manager(
    assignments: &mut ManagerAssignments,
    persons: &mut [PersonNode],
    person_ids: &[String],
) {
    for person_id in person_ids {
        assignments.clear(person_id);
        set_person_manager(persons, person_id, None);
    }
}

fn set_person_manager(persons: &mut [PersonNode], person_id: &str, manager_id: Option<&str>) {
    if let Some(person) = persons.iter_mut().find(|p| p.id == person_id) {
        person.manager_id = manager_id.map(String::from);
    }
}
