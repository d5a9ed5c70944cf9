//! Diagram projection - renderable node/edge records
//!
//! Converts the positioned visible set plus the full relationship graph into
//! the records the external widget consumes. Sibling leaves that share a
//! manager and a role collapse onto one visual edge; manager-to-manager
//! edges are always drawn.

use std::collections::{BTreeSet, HashMap, HashSet};

use orgchart_types::{Department, Diagram, DiagramEdge, DiagramNode, PersonNode, Position};

/// Fallback node color when a person has no department.
const DEFAULT_COLOR: &str = "#6b7280";

/// Build the widget-facing diagram from one rebuild's outputs.
///
/// `all_persons` supplies manager-existence checks and report counts; only
/// `visible` persons produce nodes, and only edges between two visible
/// persons are emitted.
pub fn project(
    visible: &[PersonNode],
    all_persons: &[PersonNode],
    departments: &[Department],
    collapsed: &BTreeSet<String>,
    positions: &HashMap<String, Position>,
) -> Diagram {
    let colors: HashMap<&str, &str> = departments
        .iter()
        .map(|d| (d.id.as_str(), d.color.as_str()))
        .collect();
    let all_ids: HashSet<&str> = all_persons.iter().map(|p| p.id.as_str()).collect();
    let managers: HashSet<&str> = all_persons
        .iter()
        .filter_map(|p| p.manager_id.as_deref())
        .filter(|m| all_ids.contains(m))
        .collect();
    let mut report_counts: HashMap<&str, usize> = HashMap::new();
    for person in all_persons {
        if let Some(manager) = person.manager_id.as_deref() {
            *report_counts.entry(manager).or_default() += 1;
        }
    }
    let visible_depts: HashMap<&str, Option<&str>> = visible
        .iter()
        .map(|p| (p.id.as_str(), p.department_id.as_deref()))
        .collect();

    let nodes = visible
        .iter()
        .map(|person| DiagramNode {
            id: person.id.clone(),
            position: positions
                .get(&person.id)
                .copied()
                .unwrap_or(person.position),
            department_color: person
                .department_id
                .as_deref()
                .and_then(|d| colors.get(d))
                .unwrap_or(&DEFAULT_COLOR)
                .to_string(),
            is_manager: managers.contains(person.id.as_str()),
            is_collapsed: collapsed.contains(&person.id),
            is_custom: person.is_custom,
            direct_reports_count: report_counts
                .get(person.id.as_str())
                .copied()
                .unwrap_or(0),
            display_name: person.display_name.clone(),
            role_name: person.role_name.clone(),
        })
        .collect();

    let mut edges = Vec::new();
    let mut seen_leaf_edges: HashSet<(String, String)> = HashSet::new();
    for person in visible {
        let Some(manager) = person.manager_id.as_deref() else {
            continue;
        };
        if !visible_depts.contains_key(manager) {
            continue;
        }
        if !managers.contains(person.id.as_str()) {
            // leaf: one visual edge per (manager, role) pair
            let key = (manager.to_string(), edge_role_key(person).to_string());
            if !seen_leaf_edges.insert(key) {
                continue;
            }
        }
        let cross_department = visible_depts
            .get(manager)
            .map(|d| *d != person.department_id.as_deref())
            .unwrap_or(false);
        edges.push(DiagramEdge {
            id: format!("edge-{}-{}", manager, person.id),
            source: manager.to_string(),
            target: person.id.clone(),
            cross_department,
        });
    }

    Diagram { nodes, edges }
}

fn edge_role_key(person: &PersonNode) -> &str {
    person
        .template_id
        .as_deref()
        .unwrap_or(person.role_name.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn person(id: &str, role: &str, dept: &str, manager: Option<&str>) -> PersonNode {
        PersonNode {
            id: id.into(),
            template_id: Some(role.into()),
            role_name: role.into(),
            display_name: id.into(),
            department_id: Some(dept.into()),
            manager_id: manager.map(Into::into),
            position: Position::default(),
            active_in_quarters: Default::default(),
            is_custom: false,
            is_future_role: false,
            start_quarter: None,
        }
    }

    fn dept(id: &str, color: &str) -> Department {
        Department {
            id: id.into(),
            display_name: id.to_uppercase(),
            color: color.into(),
            order_index: 0,
        }
    }

    #[test]
    fn test_leaf_edges_deduplicated_per_role() {
        let people = vec![
            person("boss", "head", "eng", None),
            person("dev0", "engineer", "eng", Some("boss")),
            person("dev1", "engineer", "eng", Some("boss")),
            person("qa", "tester", "eng", Some("boss")),
        ];
        let diagram = project(
            &people,
            &people,
            &[dept("eng", "#111111")],
            &BTreeSet::new(),
            &HashMap::new(),
        );

        // two same-role devs collapse onto one edge; qa keeps its own
        assert_eq!(diagram.edges.len(), 2);
        assert!(diagram.edges.iter().any(|e| e.target == "dev0"));
        assert!(!diagram.edges.iter().any(|e| e.target == "dev1"));
        assert!(diagram.edges.iter().any(|e| e.target == "qa"));
    }

    #[test]
    fn test_manager_edges_never_deduplicated() {
        let people = vec![
            person("ceo", "ceo", "hq", None),
            person("m1", "manager", "eng", Some("ceo")),
            person("m2", "manager", "eng", Some("ceo")),
            person("d1", "engineer", "eng", Some("m1")),
            person("d2", "engineer", "eng", Some("m2")),
        ];
        let diagram = project(
            &people,
            &people,
            &[dept("hq", "#111111"), dept("eng", "#222222")],
            &BTreeSet::new(),
            &HashMap::new(),
        );

        // m1 and m2 share role "manager" but are managers themselves:
        // both ceo→m edges survive
        let ceo_edges: Vec<_> = diagram.edges.iter().filter(|e| e.source == "ceo").collect();
        assert_eq!(ceo_edges.len(), 2);
        assert_eq!(diagram.edges.len(), 4);
    }

    #[test]
    fn test_cross_department_flag() {
        let people = vec![
            person("boss", "head", "eng", None),
            person("dev", "engineer", "eng", Some("boss")),
            person("analyst", "analyst", "ops", Some("boss")),
        ];
        let diagram = project(
            &people,
            &people,
            &[dept("eng", "#111111"), dept("ops", "#222222")],
            &BTreeSet::new(),
            &HashMap::new(),
        );

        let dev_edge = diagram.edges.iter().find(|e| e.target == "dev").unwrap();
        let analyst_edge = diagram.edges.iter().find(|e| e.target == "analyst").unwrap();
        assert!(!dev_edge.cross_department);
        assert!(analyst_edge.cross_department);
    }

    #[test]
    fn test_node_flags_and_counts() {
        let all = vec![
            person("boss", "head", "eng", None),
            person("dev0", "engineer", "eng", Some("boss")),
            person("dev1", "engineer", "eng", Some("boss")),
        ];
        // reports hidden by collapse
        let visible = vec![all[0].clone()];
        let collapsed: BTreeSet<String> = ["boss".to_string()].into();
        let diagram = project(
            &visible,
            &all,
            &[dept("eng", "#123456")],
            &collapsed,
            &HashMap::new(),
        );

        assert_eq!(diagram.nodes.len(), 1);
        let node = diagram.node("boss").unwrap();
        assert!(node.is_manager);
        assert!(node.is_collapsed);
        assert_eq!(node.direct_reports_count, 2);
        assert_eq!(node.department_color, "#123456");
        // no edges into hidden reports
        assert!(diagram.edges.is_empty());
    }

    #[test]
    fn test_edges_only_between_visible_persons() {
        let all = vec![
            person("boss", "head", "eng", None),
            person("mid", "manager", "eng", Some("boss")),
            person("dev", "engineer", "eng", Some("mid")),
        ];
        // mid collapsed away: dev's manager is not visible
        let visible = vec![all[0].clone(), all[2].clone()];
        let diagram = project(
            &visible,
            &all,
            &[dept("eng", "#111111")],
            &BTreeSet::new(),
            &HashMap::new(),
        );
        assert_eq!(diagram.edges.len(), 0);
    }
}
