//! Person expansion - templates to discrete person entities
//!
//! Turns role templates plus a selected period into a flat collection of
//! uniquely identified persons. Ids are deterministic
//! (`"{templateId}-person-{i}"`), so the same conceptual seat keeps its id
//! across period switches and the canonical manager map can be reapplied to
//! the regenerated set.

use std::collections::{BTreeSet, HashSet};

use tracing::{debug, warn};

use orgchart_types::{PeriodFilter, PersonNode, Position, RoleTemplate};

/// Hard cap on placeholder-synthesis passes. Remaining unresolved manager
/// references after the cap are left dangling and downstream consumers treat
/// them as "no manager".
pub const PLACEHOLDER_PASS_CAP: usize = 10;

/// Expand templates into person nodes for the selected period.
///
/// `referenced_manager_ids` is every id the canonical map references as a
/// manager (its value set). Referenced template instances whose headcount is
/// zero in this period become future-role placeholders; referenced ids that
/// match no template at all get a bare placeholder so no edge is silently
/// dropped.
///
/// Identical inputs always produce an identical output array - same ids,
/// same order, same fields.
pub fn expand(
    templates: &[RoleTemplate],
    period: PeriodFilter,
    referenced_manager_ids: &[String],
) -> Vec<PersonNode> {
    let refs: BTreeSet<&str> = referenced_manager_ids.iter().map(String::as_str).collect();
    let mut persons = Vec::new();

    for template in templates {
        let count = template.quarters.headcount_for(period) as usize;
        for i in 0..count {
            persons.push(instantiate(template, i, count, false));
        }

        // Instances referenced as managers beyond the active headcount
        // (including headcount zero) materialize as future-role placeholders.
        let prefix = format!("{}-person-", template.id);
        let mut extra: Vec<usize> = refs
            .iter()
            .filter_map(|r| {
                let index: usize = r.strip_prefix(prefix.as_str())?.parse().ok()?;
                // reject aliases like "-person-01" that parse but don't round-trip
                (PersonNode::instance_id(&template.id, index) == *r).then_some(index)
            })
            .filter(|i| *i >= count)
            .collect();
        extra.sort_unstable();
        extra.dedup();
        for i in extra {
            persons.push(instantiate(template, i, count, true));
        }
    }

    synthesize_missing(&mut persons, &refs);

    debug!(
        templates = templates.len(),
        persons = persons.len(),
        period = period.as_str(),
        "expanded person set"
    );
    persons
}

fn instantiate(
    template: &RoleTemplate,
    index: usize,
    active_count: usize,
    future: bool,
) -> PersonNode {
    // Ordinal suffix only when the role has more than one instance.
    let display_name = if active_count.max(index + 1) > 1 {
        format!("{} {}", template.clean_name, index + 1)
    } else {
        template.clean_name.clone()
    };
    PersonNode {
        id: PersonNode::instance_id(&template.id, index),
        template_id: Some(template.id.clone()),
        role_name: template.clean_name.clone(),
        display_name,
        department_id: Some(template.department_id.clone()),
        manager_id: None,
        position: Position::default(),
        active_in_quarters: template.quarters.active_quarters(),
        is_custom: false,
        is_future_role: future,
        start_quarter: template.quarters.first_active(),
    }
}

/// Synthesize bare placeholders for referenced ids with no node, iterating
/// until stable so transitive manager-of-manager chains resolve, bounded by
/// [`PLACEHOLDER_PASS_CAP`].
fn synthesize_missing(persons: &mut Vec<PersonNode>, refs: &BTreeSet<&str>) {
    for _pass in 0..PLACEHOLDER_PASS_CAP {
        let existing: HashSet<&str> = persons.iter().map(|p| p.id.as_str()).collect();
        let missing: Vec<&str> = refs
            .iter()
            .copied()
            .filter(|r| !existing.contains(r))
            .collect();
        if missing.is_empty() {
            return;
        }
        for id in missing {
            persons.push(PersonNode {
                id: id.to_string(),
                template_id: None,
                role_name: id.to_string(),
                display_name: id.to_string(),
                department_id: None,
                manager_id: None,
                position: Position::default(),
                active_in_quarters: BTreeSet::new(),
                is_custom: false,
                is_future_role: true,
                start_quarter: None,
            });
        }
    }

    let existing: HashSet<&str> = persons.iter().map(|p| p.id.as_str()).collect();
    let dangling = refs.iter().filter(|r| !existing.contains(*r)).count();
    if dangling > 0 {
        warn!(dangling, "placeholder synthesis cap reached; references left dangling");
    }
}
