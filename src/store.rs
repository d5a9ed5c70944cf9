//! Org chart store - exclusively owned state plus the rebuild pipeline
//!
//! One store instance owns every piece of mutable chart state: templates,
//! departments, the working person set, the canonical manager map, the
//! collapse set and the selected period. All mutation entry points run
//! synchronously to completion and finish with a full re-derivation
//! (regenerate → visibility → layout → projection); there is no incremental
//! update path and no internal concurrency.
//!
//! ```text
//! mutation ──► regenerate (expansion + canonical reapply + customs)
//!                  │
//!                  ▼
//!              compute_visible ──► compute_layout ──► project
//!                  │                    │                │
//!                  ▼                    ▼                ▼
//!              visible set        position map        Diagram
//! ```

use std::collections::{BTreeSet, HashMap, HashSet};

use tracing::{debug, info};
use uuid::Uuid;

use orgchart_graph::{project, LayoutEngine};
use orgchart_types::{
    ChartExport, Department, Diagram, ParsedWorkbook, PeriodFilter, PersonNode, Position, Quarter,
    RoleTemplate, EXPORT_VERSION,
};

use crate::error::{ChartError, ChartResult};
use crate::expansion;
use crate::ingest;
use crate::persistence;
use crate::relationships::{self, BulkOutcome, ManagerAssignments};
use crate::visibility;

/// The single owner of all chart state.
#[derive(Debug, Default)]
pub struct OrgChartStore {
    departments: Vec<Department>,
    templates: Vec<RoleTemplate>,
    /// Working person set: template expansion plus custom roles.
    persons: Vec<PersonNode>,
    /// Durable relationship state; survives every regeneration.
    assignments: ManagerAssignments,
    collapsed: BTreeSet<String>,
    period: PeriodFilter,
    csv_file_name: Option<String>,

    // advisory messages; cleared explicitly by the caller
    last_error: Option<String>,
    last_warning: Option<String>,

    // derived, recomputed on every rebuild
    visible: Vec<PersonNode>,
    layout: HashMap<String, Position>,
    diagram: Diagram,

    layout_engine: LayoutEngine,
}

impl OrgChartStore {
    pub fn new() -> Self {
        Self::default()
    }

    // =========================================================================
    // ACCESSORS
    // =========================================================================

    pub fn departments(&self) -> &[Department] {
        &self.departments
    }

    pub fn templates(&self) -> &[RoleTemplate] {
        &self.templates
    }

    /// The full working set, placeholders and custom roles included.
    pub fn persons(&self) -> &[PersonNode] {
        &self.persons
    }

    /// Persons surviving the collapse filter, with layout positions applied.
    pub fn visible(&self) -> &[PersonNode] {
        &self.visible
    }

    pub fn diagram(&self) -> &Diagram {
        &self.diagram
    }

    pub fn layout(&self) -> &HashMap<String, Position> {
        &self.layout
    }

    pub fn period(&self) -> PeriodFilter {
        self.period
    }

    pub fn collapsed(&self) -> &BTreeSet<String> {
        &self.collapsed
    }

    pub fn assignments(&self) -> &ManagerAssignments {
        &self.assignments
    }

    pub fn csv_file_name(&self) -> Option<&str> {
        self.csv_file_name.as_deref()
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn last_warning(&self) -> Option<&str> {
        self.last_warning.as_deref()
    }

    pub fn clear_error(&mut self) {
        self.last_error = None;
    }

    pub fn clear_warning(&mut self) {
        self.last_warning = None;
    }

    // =========================================================================
    // LOADING & PERIOD SELECTION
    // =========================================================================

    /// Replace all state with a freshly parsed workbook. Relationship and
    /// collapse state from any previous dataset is discarded.
    pub fn load(
        &mut self,
        workbook: ParsedWorkbook,
        csv_file_name: Option<String>,
    ) -> ChartResult<()> {
        if let Err(e) = ingest::validate_workbook(&workbook) {
            return self.fail(e);
        }
        info!(
            departments = workbook.departments.len(),
            templates = workbook.role_templates.len(),
            "loading workbook"
        );
        self.departments = workbook.departments;
        self.templates = workbook.role_templates;
        self.persons.clear();
        self.assignments = ManagerAssignments::new();
        self.collapsed.clear();
        self.csv_file_name = csv_file_name;
        self.refresh();
        Ok(())
    }

    pub fn set_period(&mut self, period: PeriodFilter) {
        self.period = period;
        self.refresh();
    }

    pub fn toggle_collapse(&mut self, manager_id: &str) {
        if !self.collapsed.remove(manager_id) {
            self.collapsed.insert(manager_id.to_string());
        }
        self.rebuild();
    }

    // =========================================================================
    // RELATIONSHIP MUTATIONS
    // =========================================================================

    pub fn set_manager(&mut self, person_id: &str, manager_id: Option<&str>) -> ChartResult<()> {
        match relationships::set_manager(
            &mut self.assignments,
            &mut self.persons,
            person_id,
            manager_id,
        ) {
            Ok(()) => {
                self.refresh();
                Ok(())
            }
            Err(e) => self.fail(e),
        }
    }

    pub fn remove_manager(&mut self, person_id: &str) -> ChartResult<()> {
        self.set_manager(person_id, None)
    }

    /// Assign one manager to many persons; invalid ids are skipped and
    /// surfaced as one aggregate warning.
    pub fn bulk_set_manager(&mut self, person_ids: &[String], manager_id: &str) -> BulkOutcome {
        let outcome = relationships::bulk_set_manager(
            &mut self.assignments,
            &mut self.persons,
            person_ids,
            manager_id,
        );
        if outcome.skipped > 0 {
            self.last_warning = Some(format!(
                "{} of {} assignments skipped to avoid reporting cycles",
                outcome.skipped,
                person_ids.len()
            ));
        }
        self.refresh();
        outcome
    }

    pub fn bulk_remove_manager(&mut self, person_ids: &[String]) {
        relationships::bulk_remove_manager(&mut self.assignments, &mut self.persons, person_ids);
        self.refresh();
    }

    // =========================================================================
    // CUSTOM ROLES & DELETION
    // =========================================================================

    /// Create a user-defined role not backed by any template. Returns the new
    /// person id. Custom roles are active in every quarter and survive
    /// period switches untouched.
    pub fn add_custom_role(
        &mut self,
        role_name: &str,
        department_id: &str,
        manager_id: Option<&str>,
    ) -> ChartResult<String> {
        if !self.departments.iter().any(|d| d.id == department_id) {
            return self.fail(ChartError::UnknownDepartment(department_id.to_string()));
        }
        let id = format!("custom-{}", Uuid::new_v4());
        self.persons.push(PersonNode {
            id: id.clone(),
            template_id: None,
            role_name: role_name.to_string(),
            display_name: role_name.to_string(),
            department_id: Some(department_id.to_string()),
            manager_id: None,
            position: Position::default(),
            active_in_quarters: Quarter::ALL.iter().copied().collect(),
            is_custom: true,
            is_future_role: false,
            start_quarter: None,
        });
        if let Some(manager) = manager_id {
            if let Err(e) = relationships::set_manager(
                &mut self.assignments,
                &mut self.persons,
                &id,
                Some(manager),
            ) {
                self.persons.pop();
                return self.fail(e);
            }
        }
        self.refresh();
        Ok(id)
    }

    /// Delete a custom person. Everyone reporting to them becomes unmanaged;
    /// the canonical map keeps no key or value equal to the deleted id.
    pub fn delete_person(&mut self, person_id: &str) -> ChartResult<()> {
        match self.delete_one(person_id) {
            Ok(()) => {
                self.refresh();
                Ok(())
            }
            Err(e) => self.fail(e),
        }
    }

    /// Delete many persons; non-custom ids are skipped and surfaced as one
    /// aggregate warning.
    pub fn delete_persons(&mut self, person_ids: &[String]) -> BulkOutcome {
        let mut outcome = BulkOutcome::default();
        for id in person_ids {
            match self.delete_one(id) {
                Ok(()) => outcome.applied += 1,
                Err(_) => outcome.skipped += 1,
            }
        }
        if outcome.skipped > 0 {
            self.last_warning = Some(format!(
                "{} of {} roles not deleted (only custom roles can be deleted)",
                outcome.skipped,
                person_ids.len()
            ));
        }
        self.refresh();
        outcome
    }

    fn delete_one(&mut self, person_id: &str) -> ChartResult<()> {
        let Some(index) = self.persons.iter().position(|p| p.id == person_id) else {
            return Err(ChartError::UnknownPerson(person_id.to_string()));
        };
        if !self.persons[index].is_custom {
            return Err(ChartError::NotCustom(person_id.to_string()));
        }
        self.persons.remove(index);
        self.assignments.remove_all_references(person_id);
        for person in &mut self.persons {
            if person.manager_id.as_deref() == Some(person_id) {
                person.manager_id = None;
            }
        }
        self.collapsed.remove(person_id);
        Ok(())
    }

    // =========================================================================
    // DEPARTMENT EDITS
    // =========================================================================

    pub fn rename_department(&mut self, department_id: &str, name: &str) -> ChartResult<()> {
        if let Some(dept) = self.departments.iter_mut().find(|d| d.id == department_id) {
            dept.display_name = name.to_string();
            return Ok(());
        }
        self.fail(ChartError::UnknownDepartment(department_id.to_string()))
    }

    pub fn recolor_department(&mut self, department_id: &str, color: &str) -> ChartResult<()> {
        if let Some(dept) = self.departments.iter_mut().find(|d| d.id == department_id) {
            dept.color = color.to_string();
            self.rebuild();
            return Ok(());
        }
        self.fail(ChartError::UnknownDepartment(department_id.to_string()))
    }

    /// Move a role template (and therefore its expanded persons) to another
    /// department.
    pub fn reassign_template_department(
        &mut self,
        template_id: &str,
        department_id: &str,
    ) -> ChartResult<()> {
        if !self.departments.iter().any(|d| d.id == department_id) {
            return self.fail(ChartError::UnknownDepartment(department_id.to_string()));
        }
        if let Some(template) = self.templates.iter_mut().find(|t| t.id == template_id) {
            template.department_id = department_id.to_string();
            self.refresh();
            return Ok(());
        }
        self.fail(ChartError::UnknownTemplate(template_id.to_string()))
    }

    // =========================================================================
    // WIDGET FEEDBACK
    // =========================================================================

    /// Record a widget-reported drag. The next structural mutation's rebuild
    /// re-runs layout and may overwrite it.
    pub fn set_position(&mut self, person_id: &str, position: Position) -> ChartResult<()> {
        if !self.persons.iter().any(|p| p.id == person_id) {
            return self.fail(ChartError::UnknownPerson(person_id.to_string()));
        }
        for person in self.persons.iter_mut().chain(self.visible.iter_mut()) {
            if person.id == person_id {
                person.position = position;
            }
        }
        self.layout.insert(person_id.to_string(), position);
        if let Some(node) = self.diagram.nodes.iter_mut().find(|n| n.id == person_id) {
            node.position = position;
        }
        Ok(())
    }

    // =========================================================================
    // EXPORT / IMPORT
    // =========================================================================

    pub fn export(&self) -> ChartExport {
        ChartExport {
            version: EXPORT_VERSION,
            export_date: chrono::Utc::now(),
            csv_file_name: self.csv_file_name.clone(),
            selected_quarter: self.period,
            departments: self.departments.clone(),
            role_templates: self.templates.clone(),
            person_nodes: self.persons.clone(),
            collapsed_nodes: persistence::collapse_list_from_set(&self.collapsed),
        }
    }

    pub fn export_json(&self) -> ChartResult<String> {
        persistence::to_json(&self.export())
    }

    /// All-or-nothing import: a malformed or foreign-version payload leaves
    /// prior state untouched.
    pub fn import_json(&mut self, json: &str) -> ChartResult<()> {
        match persistence::parse_export(json) {
            Ok(export) => {
                self.apply_import(export);
                Ok(())
            }
            Err(e) => self.fail(e),
        }
    }

    fn apply_import(&mut self, export: ChartExport) {
        info!(
            persons = export.person_nodes.len(),
            templates = export.role_templates.len(),
            "importing chart"
        );
        self.departments = export.departments;
        self.templates = export.role_templates;
        // The exchange format stores no separate relationship map; rebuild it
        // from the persisted manager ids.
        self.assignments = ManagerAssignments::from_persons(&export.person_nodes);
        self.persons = export.person_nodes;
        self.collapsed = persistence::collapse_set_from_list(&export.collapsed_nodes);
        self.period = export.selected_quarter;
        self.csv_file_name = export.csv_file_name;
        self.refresh();
    }

    // =========================================================================
    // REBUILD PIPELINE
    // =========================================================================

    /// Regenerate the working person set, then re-derive everything.
    fn refresh(&mut self) {
        self.regenerate();
        self.rebuild();
    }

    /// Template expansion + canonical-map reapplication + custom roles.
    fn regenerate(&mut self) {
        let customs: Vec<PersonNode> = self
            .persons
            .iter()
            .filter(|p| p.is_custom)
            .cloned()
            .collect();
        let custom_ids: HashSet<&str> = customs.iter().map(|p| p.id.as_str()).collect();
        // Custom roles already satisfy their references; everything else the
        // canonical map points at may need a placeholder.
        let refs: Vec<String> = self
            .assignments
            .referenced_manager_ids()
            .into_iter()
            .filter(|r| !custom_ids.contains(r.as_str()))
            .collect();

        let mut persons = expansion::expand(&self.templates, self.period, &refs);
        persons.extend(customs);

        let ids: HashSet<String> = persons.iter().map(|p| p.id.clone()).collect();
        for person in &mut persons {
            person.manager_id = self
                .assignments
                .manager_of(&person.id)
                .filter(|m| ids.contains(*m))
                .map(String::from);
        }
        self.persons = persons;
    }

    /// Derive visibility, layout and projection from the working set.
    fn rebuild(&mut self) {
        let mut visible = visibility::compute_visible(&self.persons, &self.collapsed);
        let layout = self
            .layout_engine
            .compute_layout(&visible, &self.persons, &self.departments);
        for person in self.persons.iter_mut().chain(visible.iter_mut()) {
            if let Some(position) = layout.get(&person.id) {
                person.position = *position;
            }
        }
        self.diagram = project(
            &visible,
            &self.persons,
            &self.departments,
            &self.collapsed,
            &layout,
        );
        debug!(
            visible = visible.len(),
            edges = self.diagram.edges.len(),
            "rebuild complete"
        );
        self.layout = layout;
        self.visible = visible;
    }

    fn fail<T>(&mut self, error: ChartError) -> ChartResult<T> {
        self.last_error = Some(error.to_string());
        Err(error)
    }
}
