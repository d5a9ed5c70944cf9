//! Visibility / collapse engine
//!
//! A person is visible unless some strict ancestor in the manager chain is
//! collapsed; collapsing a manager hides the entire descendant subtree
//! regardless of deeper collapse flags. Everything here is recomputed fresh
//! on every rebuild - no cached state.

use std::collections::{BTreeSet, HashMap, HashSet};

use orgchart_types::PersonNode;

/// Ids referenced as a (live) manager by at least one other person.
pub fn manager_ids(persons: &[PersonNode]) -> HashSet<String> {
    let known: HashSet<&str> = persons.iter().map(|p| p.id.as_str()).collect();
    persons
        .iter()
        .filter_map(|p| p.manager_id.as_deref())
        .filter(|m| known.contains(m))
        .map(String::from)
        .collect()
}

/// Filter the person set down to those without a collapsed strict ancestor.
pub fn compute_visible(persons: &[PersonNode], collapsed: &BTreeSet<String>) -> Vec<PersonNode> {
    let managers: HashMap<&str, &str> = persons
        .iter()
        .filter_map(|p| Some((p.id.as_str(), p.manager_id.as_deref()?)))
        .collect();

    persons
        .iter()
        .filter(|p| !has_collapsed_ancestor(&p.id, &managers, collapsed))
        .cloned()
        .collect()
}

fn has_collapsed_ancestor(
    id: &str,
    managers: &HashMap<&str, &str>,
    collapsed: &BTreeSet<String>,
) -> bool {
    let mut visited: HashSet<&str> = HashSet::new();
    let mut current = id;
    while let Some(manager) = managers.get(current).copied() {
        if collapsed.contains(manager) {
            return true;
        }
        // visited guard so corrupted (cyclic) data cannot hang the walk
        if !visited.insert(manager) {
            return false;
        }
        current = manager;
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use orgchart_types::Position;
    use pretty_assertions::assert_eq;

    fn person(id: &str, manager: Option<&str>) -> PersonNode {
        PersonNode {
            id: id.into(),
            template_id: None,
            role_name: "role".into(),
            display_name: id.into(),
            department_id: Some("eng".into()),
            manager_id: manager.map(Into::into),
            position: Position::default(),
            active_in_quarters: Default::default(),
            is_custom: false,
            is_future_role: false,
            start_quarter: None,
        }
    }

    fn chain() -> Vec<PersonNode> {
        vec![
            person("ceo", None),
            person("vp", Some("ceo")),
            person("lead", Some("vp")),
            person("dev", Some("lead")),
            person("loner", None),
        ]
    }

    #[test]
    fn test_collapse_hides_entire_subtree() {
        let persons = chain();
        let collapsed: BTreeSet<String> = ["vp".to_string()].into();
        let visible = compute_visible(&persons, &collapsed);
        let ids: Vec<&str> = visible.iter().map(|p| p.id.as_str()).collect();
        // vp itself stays; lead and dev are hidden transitively
        assert_eq!(ids, ["ceo", "vp", "loner"]);
    }

    #[test]
    fn test_deeper_collapse_flags_do_not_resurface_nodes() {
        let persons = chain();
        let collapsed: BTreeSet<String> = ["vp".to_string(), "lead".to_string()].into();
        let visible = compute_visible(&persons, &collapsed);
        let ids: Vec<&str> = visible.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, ["ceo", "vp", "loner"]);
    }

    #[test]
    fn test_collapsing_more_never_grows_the_visible_set() {
        let persons = chain();
        let mut collapsed = BTreeSet::new();
        let mut previous = compute_visible(&persons, &collapsed).len();
        for id in ["lead", "vp", "ceo"] {
            collapsed.insert(id.to_string());
            let now = compute_visible(&persons, &collapsed).len();
            assert!(now <= previous);
            previous = now;
        }
    }

    #[test]
    fn test_manager_ids_ignores_dangling_references() {
        let mut persons = chain();
        persons.push(person("ghost-report", Some("nobody")));
        let managers = manager_ids(&persons);
        assert!(managers.contains("ceo"));
        assert!(managers.contains("lead"));
        assert!(!managers.contains("nobody"));
    }
}
