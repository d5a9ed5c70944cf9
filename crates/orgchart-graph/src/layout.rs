//! Layout algorithm - tree and grid positioning
//!
//! Two modes, selected globally: a hierarchical tree layout as soon as any
//! reporting relationship exists, a department-grouped grid otherwise.
//!
//! The hierarchical mode groups same-role leaf siblings into vertical
//! columns; a manager with many same-titled reports stays roughly as wide as
//! its distinct roles rather than its headcount.

use std::collections::{HashMap, HashSet};

use tracing::debug;

use orgchart_types::{Department, PersonNode, Position};

// =============================================================================
// LAYOUT CONSTANTS
// =============================================================================

/// Default node size
pub const NODE_WIDTH: f32 = 160.0;
pub const NODE_HEIGHT: f32 = 70.0;

/// Spacing between nodes
pub const H_SPACING: f32 = 40.0;
pub const V_SPACING: f32 = 120.0;

/// Columns in the department grid mode
pub const GRID_COLUMNS: usize = 4;

/// One horizontal layout cell: node plus trailing gap
const UNIT: f32 = NODE_WIDTH + H_SPACING;

/// Vertical step between tree levels
const LEVEL_STEP: f32 = NODE_HEIGHT + V_SPACING;

/// Vertical step between rows in grids and unassigned blocks
const ROW_STEP: f32 = NODE_HEIGHT + 30.0;

/// Vertical step between same-role leaves stacked in one column
const STACK_STEP: f32 = NODE_HEIGHT + 20.0;

/// Gap below a department block or the unassigned block
const BLOCK_SPACING: f32 = 60.0;

/// Leaf siblings sharing a template (or role name, for custom roles) stack
/// into one column.
fn role_key(person: &PersonNode) -> &str {
    person
        .template_id
        .as_deref()
        .unwrap_or(person.role_name.as_str())
}

// =============================================================================
// LAYOUT ENGINE
// =============================================================================

/// Computes a position (node center) for every visible person.
#[derive(Debug, Clone, Copy, Default)]
pub struct LayoutEngine;

impl LayoutEngine {
    pub fn new() -> Self {
        Self
    }

    /// Compute positions for the visible set.
    ///
    /// Mode selection consults the *full* person set: any non-null manager
    /// anywhere switches the whole chart to hierarchical layout.
    pub fn compute_layout(
        &self,
        visible: &[PersonNode],
        all_persons: &[PersonNode],
        departments: &[Department],
    ) -> HashMap<String, Position> {
        let any_managed = all_persons.iter().any(|p| p.manager_id.is_some());
        debug!(
            visible = visible.len(),
            total = all_persons.len(),
            hierarchical = any_managed,
            "computing layout"
        );
        if any_managed {
            self.hierarchical_layout(visible, all_persons, departments)
        } else {
            self.grid_layout(visible, departments)
        }
    }

    // =========================================================================
    // DEPARTMENT GRID
    // =========================================================================

    /// Group by department in display order, fixed-column grid per block.
    fn grid_layout(
        &self,
        visible: &[PersonNode],
        departments: &[Department],
    ) -> HashMap<String, Position> {
        let mut positions = HashMap::new();
        let mut y = 0.0;
        for bucket in department_buckets(visible, departments) {
            let rows = place_rows(&mut positions, &bucket, 0.0, y);
            y += rows as f32 * ROW_STEP + BLOCK_SPACING;
        }
        positions
    }

    // =========================================================================
    // HIERARCHICAL TREE
    // =========================================================================

    fn hierarchical_layout(
        &self,
        visible: &[PersonNode],
        all_persons: &[PersonNode],
        departments: &[Department],
    ) -> HashMap<String, Position> {
        let all_ids: HashSet<&str> = all_persons.iter().map(|p| p.id.as_str()).collect();
        // A person is a manager iff someone in the full set reports to them.
        let managers: HashSet<&str> = all_persons
            .iter()
            .filter_map(|p| p.manager_id.as_deref())
            .filter(|m| all_ids.contains(m))
            .collect();

        let visible_ids: HashSet<&str> = visible.iter().map(|p| p.id.as_str()).collect();
        let mut children: HashMap<&str, Vec<&PersonNode>> = HashMap::new();
        for person in visible {
            if let Some(manager) = person.manager_id.as_deref() {
                if visible_ids.contains(manager) {
                    children.entry(manager).or_default().push(person);
                }
            }
        }

        // A manager id pointing at nothing (unresolved placeholder chain) is
        // treated as no manager.
        let unmanaged = |p: &PersonNode| {
            p.manager_id
                .as_deref()
                .map(|m| !all_ids.contains(m))
                .unwrap_or(true)
        };

        let mut positions = HashMap::new();
        let mut cursor_y = 0.0;

        // Plain unassigned individuals (never managed, never a manager) sit
        // in department-grouped rows above the trees.
        let unassigned: Vec<PersonNode> = visible
            .iter()
            .filter(|p| unmanaged(p) && !managers.contains(p.id.as_str()))
            .cloned()
            .collect();
        if !unassigned.is_empty() {
            for bucket in department_buckets(&unassigned, departments) {
                let rows = place_rows(&mut positions, &bucket, 0.0, cursor_y);
                cursor_y += rows as f32 * ROW_STEP;
            }
            cursor_y += BLOCK_SPACING;
        }

        // True roots: unmanaged but referenced as someone's manager.
        let roots: Vec<&PersonNode> = visible
            .iter()
            .filter(|p| unmanaged(p) && managers.contains(p.id.as_str()))
            .collect();

        let mut tree = TreeContext {
            children,
            managers,
            widths: HashMap::new(),
        };
        let mut cursor_x = 0.0;
        for root in roots {
            let width = tree.subtree_width(root.id.as_str());
            tree.place_subtree(root, cursor_x, cursor_y, &mut positions);
            cursor_x += width + H_SPACING;
        }

        positions
    }
}

/// Visible persons grouped by department in display order, with a trailing
/// bucket for persons outside any department. Empty buckets are dropped.
fn department_buckets<'a>(
    persons: &'a [PersonNode],
    departments: &[Department],
) -> Vec<Vec<&'a PersonNode>> {
    let mut ordered: Vec<&Department> = departments.iter().collect();
    ordered.sort_by_key(|d| d.order_index);

    let mut buckets = Vec::new();
    for dept in ordered {
        let members: Vec<&PersonNode> = persons
            .iter()
            .filter(|p| p.department_id.as_deref() == Some(dept.id.as_str()))
            .collect();
        if !members.is_empty() {
            buckets.push(members);
        }
    }
    let homeless: Vec<&PersonNode> = persons
        .iter()
        .filter(|p| p.department_id.is_none())
        .collect();
    if !homeless.is_empty() {
        buckets.push(homeless);
    }
    buckets
}

/// Lay one bucket out in a fixed-column grid starting at (`left_x`, `top_y`).
/// Returns the number of rows used.
fn place_rows(
    positions: &mut HashMap<String, Position>,
    members: &[&PersonNode],
    left_x: f32,
    top_y: f32,
) -> usize {
    for (i, person) in members.iter().enumerate() {
        let row = i / GRID_COLUMNS;
        let col = i % GRID_COLUMNS;
        positions.insert(
            person.id.clone(),
            Position::new(
                left_x + col as f32 * UNIT + NODE_WIDTH / 2.0,
                top_y + row as f32 * ROW_STEP,
            ),
        );
    }
    members.len().div_ceil(GRID_COLUMNS)
}

/// Shared traversal state for one hierarchical layout run.
struct TreeContext<'a> {
    children: HashMap<&'a str, Vec<&'a PersonNode>>,
    managers: HashSet<&'a str>,
    widths: HashMap<&'a str, f32>,
}

impl<'a> TreeContext<'a> {
    /// Horizontal extent of a subtree, in pixels.
    ///
    /// A leaf occupies one unit. Manager children contribute their own
    /// subtree widths; leaf children contribute one unit per distinct role,
    /// since same-role siblings stack into a shared column.
    fn subtree_width(&mut self, id: &'a str) -> f32 {
        if let Some(width) = self.widths.get(id) {
            return *width;
        }
        let kids = self.children.get(id).cloned().unwrap_or_default();
        let width = if kids.is_empty() {
            UNIT
        } else {
            let mut width = 0.0;
            let mut leaf_roles: Vec<&str> = Vec::new();
            for kid in kids.iter().copied() {
                if self.managers.contains(kid.id.as_str()) {
                    width += self.subtree_width(kid.id.as_str());
                } else {
                    let key = role_key(kid);
                    if !leaf_roles.contains(&key) {
                        leaf_roles.push(key);
                    }
                }
            }
            (width + leaf_roles.len() as f32 * UNIT).max(UNIT)
        };
        self.widths.insert(id, width);
        width
    }

    /// Place `node` centered over its subtree, then its children one level
    /// down: manager subtrees left-to-right, leaf role columns to their right.
    fn place_subtree(
        &mut self,
        node: &'a PersonNode,
        left_x: f32,
        y: f32,
        positions: &mut HashMap<String, Position>,
    ) {
        let width = self.subtree_width(node.id.as_str());
        positions.insert(node.id.clone(), Position::new(left_x + width / 2.0, y));

        let kids = self.children.get(node.id.as_str()).cloned().unwrap_or_default();
        if kids.is_empty() {
            return;
        }
        let child_y = y + LEVEL_STEP;
        let mut cursor_x = left_x;

        let mut leaf_columns: Vec<(&str, Vec<&'a PersonNode>)> = Vec::new();
        for kid in kids.iter().copied() {
            if self.managers.contains(kid.id.as_str()) {
                let kid_width = self.subtree_width(kid.id.as_str());
                self.place_subtree(kid, cursor_x, child_y, positions);
                cursor_x += kid_width;
            } else {
                let key = role_key(kid);
                match leaf_columns.iter_mut().find(|(k, _)| *k == key) {
                    Some((_, column)) => column.push(kid),
                    None => leaf_columns.push((key, vec![kid])),
                }
            }
        }

        for (_, column) in leaf_columns {
            let column_x = cursor_x + UNIT / 2.0;
            for (j, leaf) in column.iter().enumerate() {
                positions.insert(
                    leaf.id.clone(),
                    Position::new(column_x, child_y + j as f32 * STACK_STEP),
                );
            }
            cursor_x += UNIT;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn dept(id: &str, order: u32) -> Department {
        Department {
            id: id.into(),
            display_name: id.to_uppercase(),
            color: "#1e40af".into(),
            order_index: order,
        }
    }

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

    #[test]
    fn test_grid_mode_when_no_relationships() {
        let people: Vec<PersonNode> = (0..5)
            .map(|i| person(&format!("p{i}"), "engineer", "eng", None))
            .collect();
        let departments = vec![dept("eng", 0)];
        let layout = LayoutEngine::new().compute_layout(&people, &people, &departments);

        // 4-column grid: index 4 wraps to row 1, column 0.
        assert_eq!(layout.len(), 5);
        let first = layout["p0"];
        let wrapped = layout["p4"];
        assert_eq!(wrapped.x, first.x);
        assert_eq!(wrapped.y, first.y + ROW_STEP);
        // index 3 is still on row 0, column 3.
        assert_eq!(layout["p3"].y, first.y);
        assert_eq!(layout["p3"].x, first.x + 3.0 * UNIT);
    }

    #[test]
    fn test_grid_blocks_follow_department_order() {
        let mut people = vec![person("a", "analyst", "ops", None)];
        people.push(person("b", "engineer", "eng", None));
        // eng displays before ops regardless of input order
        let departments = vec![dept("ops", 1), dept("eng", 0)];
        let layout = LayoutEngine::new().compute_layout(&people, &people, &departments);
        assert!(layout["b"].y < layout["a"].y);
    }

    #[test]
    fn test_single_relationship_switches_mode_globally() {
        let people = vec![
            person("boss", "head", "eng", None),
            person("dev", "engineer", "eng", Some("boss")),
            person("loner", "analyst", "ops", None),
        ];
        let departments = vec![dept("eng", 0), dept("ops", 1)];
        let layout = LayoutEngine::new().compute_layout(&people, &people, &departments);

        // unassigned individual sits above the tree
        assert!(layout["loner"].y < layout["boss"].y);
        assert!(layout["dev"].y > layout["boss"].y);
        // every visible person is positioned
        assert_eq!(layout.len(), 3);
    }

    #[test]
    fn test_same_role_leaves_share_a_column() {
        let mut people = vec![person("boss", "head", "eng", None)];
        for i in 0..4 {
            people.push(person(&format!("dev{i}"), "engineer", "eng", Some("boss")));
        }
        let departments = vec![dept("eng", 0)];
        let layout = LayoutEngine::new().compute_layout(&people, &people, &departments);

        // one role => one column: all four stack at the same x
        let x = layout["dev0"].x;
        for i in 1..4 {
            assert_eq!(layout[&format!("dev{i}")].x, x);
        }
        assert_eq!(layout["dev1"].y, layout["dev0"].y + STACK_STEP);
        // the manager is centered over a single-unit subtree
        assert_eq!(layout["boss"].x, x);
    }

    #[test]
    fn test_distinct_roles_get_side_by_side_columns() {
        let people = vec![
            person("boss", "head", "eng", None),
            person("dev", "engineer", "eng", Some("boss")),
            person("qa", "tester", "eng", Some("boss")),
        ];
        let departments = vec![dept("eng", 0)];
        let layout = LayoutEngine::new().compute_layout(&people, &people, &departments);

        assert_eq!(layout["qa"].x, layout["dev"].x + UNIT);
        assert_eq!(layout["qa"].y, layout["dev"].y);
        // parent centered over the two columns
        assert_eq!(layout["boss"].x, (layout["dev"].x + layout["qa"].x) / 2.0);
    }

    #[test]
    fn test_manager_children_widen_the_subtree() {
        let people = vec![
            person("ceo", "ceo", "hq", None),
            person("m1", "manager", "eng", Some("ceo")),
            person("m2", "manager", "ops", Some("ceo")),
            person("d1", "engineer", "eng", Some("m1")),
            person("d2", "tester", "eng", Some("m1")),
            person("o1", "analyst", "ops", Some("m2")),
        ];
        let departments = vec![dept("hq", 0), dept("eng", 1), dept("ops", 2)];
        let layout = LayoutEngine::new().compute_layout(&people, &people, &departments);

        // m1's subtree spans two role columns, m2's one
        assert_eq!(layout["m1"].x, (layout["d1"].x + layout["d2"].x) / 2.0);
        assert_eq!(layout["m2"].x, layout["o1"].x);
        assert!(layout["m2"].x > layout["m1"].x);
        // roots above managers above leaves
        assert!(layout["ceo"].y < layout["m1"].y);
        assert!(layout["m1"].y < layout["d1"].y);
    }

    #[test]
    fn test_collapsed_manager_is_laid_out_as_leaf() {
        let all = vec![
            person("boss", "head", "eng", None),
            person("dev", "engineer", "eng", Some("boss")),
        ];
        // dev hidden by collapse: only boss visible
        let visible = vec![all[0].clone()];
        let departments = vec![dept("eng", 0)];
        let layout = LayoutEngine::new().compute_layout(&visible, &all, &departments);
        assert_eq!(layout.len(), 1);
        assert!(layout.contains_key("boss"));
    }

    #[test]
    fn test_dangling_manager_treated_as_unmanaged() {
        let people = vec![
            person("boss", "head", "eng", None),
            person("dev", "engineer", "eng", Some("boss")),
            person("ghost-report", "analyst", "eng", Some("no-such-id")),
        ];
        let departments = vec![dept("eng", 0)];
        let layout = LayoutEngine::new().compute_layout(&people, &people, &departments);
        // still positioned, in the unassigned block above the tree
        assert!(layout["ghost-report"].y < layout["boss"].y);
    }

    #[test]
    fn test_roots_advance_left_to_right() {
        let people = vec![
            person("r1", "head", "eng", None),
            person("r2", "head", "ops", None),
            person("a", "engineer", "eng", Some("r1")),
            person("b", "analyst", "ops", Some("r2")),
        ];
        let departments = vec![dept("eng", 0), dept("ops", 1)];
        let layout = LayoutEngine::new().compute_layout(&people, &people, &departments);
        assert!(layout["r2"].x > layout["r1"].x);
        assert_eq!(layout["r1"].y, layout["r2"].y);
    }
}
