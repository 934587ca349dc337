// In-memory task list store backing the Gantt grid

use crate::filter::Filter;
use crate::hierarchy::{self, Violation};
use crate::models::{MAX_INDENT, Task, TaskField, TaskPatch, parse_dependencies};
use crate::schedule;
use chrono::NaiveDate;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Ordered task list plus the row the UI has selected
///
/// Every mutation either applies cleanly or leaves the list untouched; the
/// returned `bool` says which. Structural edits (add, delete, indent,
/// unindent) re-derive all `parent_id`s from row order before returning.
#[derive(Debug, Clone, Default)]
pub struct TaskStore {
    tasks: Vec<Task>,
    selected: Option<usize>,
}

impl TaskStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Adopt an existing list, e.g. one loaded from a snapshot
    ///
    /// Progress is clamped and parents are re-derived from row order; remaining
    /// inconsistencies are logged, not rejected.
    pub fn from_tasks(tasks: Vec<Task>) -> Self {
        let mut store = Self { tasks, selected: None };
        for task in &mut store.tasks {
            let raw = task.progress;
            task.set_progress(raw);
            if task.progress != raw {
                debug!(task_id = %task.id, raw, "from_tasks: progress clamped");
            }
        }
        hierarchy::relink_parents(&mut store.tasks);

        let violations = store.check();
        if !violations.is_empty() {
            warn!(count = violations.len(), "Task list has hierarchy violations");
            for v in &violations {
                debug!(violation = %v, "from_tasks: violation");
            }
        }

        store
    }

    /// Store preloaded with the built-in construction schedule
    pub fn seeded() -> Self {
        Self::from_tasks(crate::seed::construction_schedule())
    }

    pub fn into_tasks(self) -> Vec<Task> {
        self.tasks
    }

    // ========================================================================
    // Read-only views
    // ========================================================================

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Row of the task with this id
    pub fn position(&self, task_id: &str) -> Option<usize> {
        self.tasks.iter().position(|t| t.id == task_id)
    }

    pub fn get(&self, task_id: &str) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == task_id)
    }

    /// Selected row, if any
    pub fn selected(&self) -> Option<usize> {
        self.selected
    }

    pub fn selected_task(&self) -> Option<&Task> {
        self.selected.and_then(|row| self.tasks.get(row))
    }

    /// Direct children of a task, in row order
    pub fn children(&self, task_id: &str) -> Vec<&Task> {
        match self.position(task_id) {
            Some(row) => hierarchy::children_of(&self.tasks, row)
                .into_iter()
                .map(|i| &self.tasks[i])
                .collect(),
            None => Vec::new(),
        }
    }

    /// All descendants of a task: the rows after it that are nested deeper
    pub fn subtree(&self, task_id: &str) -> &[Task] {
        match self.position(task_id) {
            Some(row) => &self.tasks[row + 1..hierarchy::subtree_end(&self.tasks, row)],
            None => &[],
        }
    }

    /// Hierarchy invariant violations in the current list
    pub fn check(&self) -> Vec<Violation> {
        hierarchy::check(&self.tasks)
    }

    /// Tasks, in row order, matching every filter
    pub fn list(&self, filters: &[Filter]) -> Vec<&Task> {
        self.tasks
            .iter()
            .filter(|t| filters.iter().all(|f| f.matches(*t)))
            .collect()
    }

    // ========================================================================
    // Mutations
    // ========================================================================

    /// Insert a blank task dated today at `position`; returns its id
    pub fn add(&mut self, position: usize) -> String {
        self.add_on(position, schedule::today())
    }

    /// Insert a blank task dated `day` at `position`; returns its id
    ///
    /// `position` is clamped to the list length. The task takes the indent of
    /// the row above it, and becomes the selected row.
    pub fn add_on(&mut self, position: usize, day: NaiveDate) -> String {
        let position = position.min(self.tasks.len());
        let id = self.generate_id();

        let mut task = Task::blank(id.clone(), day);
        if position > 0 {
            task.indent = self.tasks[position - 1].indent;
        }

        self.tasks.insert(position, task);
        hierarchy::relink_parents(&mut self.tasks);
        self.selected = Some(position);

        debug!(task_id = %id, position, "Added task");
        id
    }

    /// Remove the task with this id
    ///
    /// Its descendants stay in place and are re-parented by position.
    /// References to it in other tasks' dependencies are dropped.
    pub fn delete(&mut self, task_id: &str) -> bool {
        let Some(row) = self.position(task_id) else {
            debug!(task_id, "delete: no such task");
            return false;
        };

        self.tasks.remove(row);
        for task in &mut self.tasks {
            task.dependencies.retain(|d| d != task_id);
        }

        self.selected = match self.selected {
            Some(sel) if sel == row => None,
            Some(sel) if sel > row => Some(sel - 1),
            other => other,
        };

        hierarchy::relink_parents(&mut self.tasks);
        info!(task_id, row, "Deleted task");
        true
    }

    /// Merge `patch` into the task with this id
    pub fn update(&mut self, task_id: &str, patch: TaskPatch) -> bool {
        let Some(task) = self.tasks.iter_mut().find(|t| t.id == task_id) else {
            debug!(task_id, "update: no such task");
            return false;
        };

        patch.apply(task);
        true
    }

    /// Select the row holding this id; `None` or an unknown id clears the selection
    pub fn select(&mut self, task_id: Option<&str>) {
        self.selected = task_id.and_then(|id| self.position(id));
        if let (Some(id), None) = (task_id, self.selected) {
            debug!(task_id = id, "select: no such task, selection cleared");
        }
    }

    /// Nest a task one level deeper, carrying its subtree along
    ///
    /// No-op when the task or any of its descendants is already at `MAX_INDENT`,
    /// not only the task itself, so the subtree keeps its shape.
    pub fn indent(&mut self, task_id: &str) -> bool {
        let Some(row) = self.position(task_id) else {
            debug!(task_id, "indent: no such task");
            return false;
        };

        let end = hierarchy::subtree_end(&self.tasks, row);
        let deepest = self.tasks[row..end].iter().map(|t| t.indent).max().unwrap_or(0);
        if deepest >= MAX_INDENT {
            debug!(task_id, deepest, "indent: already at max depth");
            return false;
        }

        for task in &mut self.tasks[row..end] {
            task.indent += 1;
        }
        hierarchy::relink_parents(&mut self.tasks);

        debug!(task_id, moved = end - row, "Indented task");
        true
    }

    /// Lift a task one level, carrying its subtree along
    ///
    /// No-op for a top-level task.
    pub fn unindent(&mut self, task_id: &str) -> bool {
        let Some(row) = self.position(task_id) else {
            debug!(task_id, "unindent: no such task");
            return false;
        };

        if self.tasks[row].indent == 0 {
            debug!(task_id, "unindent: already top-level");
            return false;
        }

        // Every descendant is deeper than the task, so none can underflow
        let end = hierarchy::subtree_end(&self.tasks, row);
        for task in &mut self.tasks[row..end] {
            task.indent -= 1;
        }
        hierarchy::relink_parents(&mut self.tasks);

        debug!(task_id, moved = end - row, "Unindented task");
        true
    }

    /// Write a raw grid cell value into row `row`, keeping dates and duration in step
    ///
    /// - `Duration`: integer days; negative or unparsable is ignored. Moves
    ///   the end date when the start date parses, and is ignored when that
    ///   end date would be out of range.
    /// - `StartDate`/`EndDate`: stored as given; the duration follows when
    ///   both dates parse.
    /// - `Progress`: number clamped to `[0, 100]`; unparsable is ignored.
    /// - `Dependencies`: comma-separated ids.
    pub fn set_field(&mut self, row: usize, field: TaskField, value: &str) -> bool {
        let Some(task) = self.tasks.get_mut(row) else {
            debug!(row, %field, "set_field: no such row");
            return false;
        };

        match field {
            TaskField::Name => task.name = value.to_string(),
            TaskField::TaskType => task.task_type = value.to_string(),
            TaskField::Assignee => task.assignee = value.to_string(),
            TaskField::Duration => {
                let days = match value.trim().parse::<i64>() {
                    Ok(days) if days >= 0 => days,
                    _ => {
                        debug!(row, value, "set_field: rejected duration");
                        return false;
                    }
                };
                match task.start() {
                    Some(start) => {
                        let Some(end) = schedule::end_from_duration(start, days) else {
                            debug!(row, days, "set_field: end date out of range");
                            return false;
                        };
                        task.duration = days;
                        task.end_date = schedule::format_date(end);
                    }
                    None => task.duration = days,
                }
            }
            TaskField::StartDate => {
                task.start_date = value.to_string();
                sync_duration(task);
            }
            TaskField::EndDate => {
                task.end_date = value.to_string();
                sync_duration(task);
            }
            TaskField::Progress => match value.trim().parse::<f64>() {
                Ok(progress) => task.set_progress(progress),
                Err(_) => {
                    debug!(row, value, "set_field: rejected progress");
                    return false;
                }
            },
            TaskField::Dependencies => task.dependencies = parse_dependencies(value),
        }

        true
    }

    // ========================================================================
    // Helper methods
    // ========================================================================

    fn generate_id(&self) -> String {
        loop {
            let id = Uuid::now_v7().to_string();
            if self.position(&id).is_none() {
                return id;
            }
        }
    }
}

/// Recompute `duration` from the dates when both parse
fn sync_duration(task: &mut Task) {
    if let (Some(start), Some(end)) = (task.start(), task.end()) {
        task.duration = schedule::duration_between(start, end);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::FilterOp;
    use crate::record::IndexValue;
    use std::collections::HashSet;

    fn day(s: &str) -> NaiveDate {
        schedule::parse_date(s).unwrap()
    }

    fn store_with(levels: &[(&str, u8)]) -> TaskStore {
        let tasks = levels
            .iter()
            .map(|(id, indent)| {
                let mut t = Task::blank(*id, day("2024-01-01"));
                t.indent = *indent;
                t
            })
            .collect();
        TaskStore::from_tasks(tasks)
    }

    fn levels(store: &TaskStore) -> Vec<u8> {
        store.tasks().iter().map(|t| t.indent).collect()
    }

    #[test]
    fn test_add_to_empty_list() {
        let mut store = TaskStore::new();
        let id = store.add(0);

        assert_eq!(store.len(), 1);
        let task = &store.tasks()[0];
        assert_eq!(task.id, id);
        assert_eq!(task.indent, 0);
        assert!(task.parent_id.is_none());
        assert_eq!(task.start_date, task.end_date);
        assert_eq!(store.selected(), Some(0));
    }

    #[test]
    fn test_add_generates_distinct_ids() {
        let mut store = store_with(&[("1", 0), ("2", 0)]);
        let mut ids: HashSet<String> = store.tasks().iter().map(|t| t.id.clone()).collect();

        for _ in 0..200 {
            let id = store.add(0);
            assert!(ids.insert(id), "duplicate id generated");
        }
        assert_eq!(store.len(), 202);
    }

    #[test]
    fn test_add_inherits_indent_and_parent() {
        let mut store = store_with(&[("a", 0), ("b", 1), ("c", 2)]);
        let id = store.add_on(3, day("2024-05-01"));

        let task = store.get(&id).unwrap();
        assert_eq!(task.indent, 2);
        assert_eq!(task.parent_id.as_deref(), Some("b"));
        assert_eq!(task.start_date, "2024-05-01");
        assert_eq!(store.selected(), Some(3));
    }

    #[test]
    fn test_add_finds_parent_across_shallower_row() {
        let mut store = store_with(&[("a", 0), ("b", 1), ("c", 0), ("d", 2)]);
        let id = store.add(4);

        let task = store.get(&id).unwrap();
        assert_eq!(task.indent, 2);
        assert_eq!(task.parent_id.as_deref(), Some("b"));
    }

    #[test]
    fn test_add_clamps_position() {
        let mut store = store_with(&[("a", 0), ("b", 1)]);
        let id = store.add(99);
        assert_eq!(store.position(&id), Some(2));
        assert_eq!(store.get(&id).unwrap().parent_id.as_deref(), Some("a"));
    }

    #[test]
    fn test_delete_uses_id_not_selection() {
        let mut store = store_with(&[("a", 0), ("b", 0), ("c", 0)]);
        store.select(Some("a"));

        assert!(store.delete("c"));
        assert_eq!(store.len(), 2);
        assert!(store.get("c").is_none());
        assert_eq!(store.selected(), Some(0));
    }

    #[test]
    fn test_delete_adjusts_selection() {
        let mut store = store_with(&[("a", 0), ("b", 0), ("c", 0)]);

        store.select(Some("c"));
        assert!(store.delete("a"));
        assert_eq!(store.selected_task().unwrap().id, "c");

        assert!(store.delete("c"));
        assert_eq!(store.selected(), None);
    }

    #[test]
    fn test_delete_scrubs_dependencies_and_relinks() {
        let mut store = store_with(&[("a", 0), ("b", 1), ("c", 1)]);
        store.set_field(2, TaskField::Dependencies, "a, b");

        assert!(store.delete("a"));
        assert_eq!(store.get("c").unwrap().dependencies, vec!["b"]);
        // With "a" gone no level-0 row precedes "b"
        assert!(store.get("b").unwrap().parent_id.is_none());
    }

    #[test]
    fn test_delete_unknown_is_noop() {
        let mut store = store_with(&[("a", 0)]);
        store.select(Some("a"));
        assert!(!store.delete("zzz"));
        assert_eq!(store.len(), 1);
        assert_eq!(store.selected(), Some(0));
    }

    #[test]
    fn test_update_merges_fields() {
        let mut store = store_with(&[("a", 0)]);
        let patch = TaskPatch {
            name: Some("Site Preparation".to_string()),
            assignee: Some("John Doe".to_string()),
            progress: Some(-10.0),
            ..Default::default()
        };

        assert!(store.update("a", patch));
        let task = store.get("a").unwrap();
        assert_eq!(task.name, "Site Preparation");
        assert_eq!(task.assignee, "John Doe");
        assert_eq!(task.progress, 0.0);
        assert_eq!(task.indent, 0);
    }

    #[test]
    fn test_update_unknown_is_noop() {
        let mut store = store_with(&[("a", 0)]);
        let before = store.tasks().to_vec();
        assert!(!store.update("zzz", TaskPatch::default()));
        assert_eq!(store.tasks(), before.as_slice());
    }

    #[test]
    fn test_select() {
        let mut store = store_with(&[("a", 0), ("b", 0)]);
        store.select(Some("b"));
        assert_eq!(store.selected(), Some(1));

        store.select(Some("missing"));
        assert_eq!(store.selected(), None);

        store.select(Some("a"));
        store.select(None);
        assert!(store.selected_task().is_none());
    }

    #[test]
    fn test_indent_worked_example() {
        let mut store = store_with(&[("A", 0), ("B", 1), ("C", 2), ("D", 0)]);
        store.select(Some("B"));

        assert!(store.indent("B"));
        assert_eq!(levels(&store), vec![0, 2, 3, 0]);
        assert_eq!(store.get("C").unwrap().parent_id.as_deref(), Some("B"));
    }

    #[test]
    fn test_indent_caps_at_max() {
        let mut store = store_with(&[("a", 0), ("b", 0)]);
        for _ in 0..20 {
            store.indent("b");
        }
        assert_eq!(store.get("b").unwrap().indent, MAX_INDENT);
        assert!(!store.indent("b"));
    }

    #[test]
    fn test_indent_blocked_by_deep_descendant() {
        let mut store = store_with(&[("a", 0), ("b", 3), ("c", 4), ("d", 5)]);
        assert!(!store.indent("b"));
        assert_eq!(levels(&store), vec![0, 3, 4, 5]);
    }

    #[test]
    fn test_indent_leaves_rows_outside_subtree() {
        let mut store = store_with(&[("a", 0), ("b", 1), ("c", 2), ("d", 1), ("e", 2)]);
        assert!(store.indent("b"));
        assert_eq!(levels(&store), vec![0, 2, 3, 1, 2]);
    }

    #[test]
    fn test_unindent_top_level_is_noop() {
        let mut store = store_with(&[("a", 0), ("b", 1)]);
        assert!(!store.unindent("a"));
        assert_eq!(levels(&store), vec![0, 1]);
    }

    #[test]
    fn test_unindent_carries_subtree_and_clears_parent() {
        let mut store = store_with(&[("a", 0), ("b", 1), ("c", 2), ("d", 3), ("e", 1)]);
        assert!(store.unindent("b"));

        assert_eq!(levels(&store), vec![0, 0, 1, 2, 1]);
        assert!(store.get("b").unwrap().parent_id.is_none());
        assert_eq!(store.get("c").unwrap().parent_id.as_deref(), Some("b"));
        assert_eq!(store.get("e").unwrap().parent_id.as_deref(), Some("b"));
    }

    #[test]
    fn test_indent_then_unindent_restores_shape() {
        let mut store = store_with(&[("a", 0), ("b", 1), ("c", 2), ("d", 0)]);
        let before = levels(&store);
        assert!(store.indent("b"));
        assert!(store.unindent("b"));
        assert_eq!(levels(&store), before);
        assert!(store.check().is_empty());
    }

    #[test]
    fn test_structural_ops_ignore_unknown_id() {
        let mut store = store_with(&[("a", 0), ("b", 1)]);
        assert!(!store.indent("zzz"));
        assert!(!store.unindent("zzz"));
        assert_eq!(levels(&store), vec![0, 1]);
    }

    #[test]
    fn test_set_duration_moves_end_date() {
        let mut store = store_with(&[("a", 0)]);
        store.set_field(0, TaskField::StartDate, "2024-01-21");

        assert!(store.set_field(0, TaskField::Duration, "15"));
        let task = store.get("a").unwrap();
        assert_eq!(task.duration, 15);
        assert_eq!(task.end_date, "2024-02-05");
    }

    #[test]
    fn test_set_negative_duration_is_noop() {
        let mut store = store_with(&[("a", 0)]);
        store.set_field(0, TaskField::EndDate, "2024-01-10");
        let before = store.get("a").unwrap().clone();

        assert!(!store.set_field(0, TaskField::Duration, "-3"));
        assert!(!store.set_field(0, TaskField::Duration, "ten"));
        assert_eq!(store.get("a").unwrap(), &before);
    }

    #[test]
    fn test_set_duration_past_date_range_is_noop() {
        let mut store = store_with(&[("a", 0)]);
        store.set_field(0, TaskField::Duration, "3");
        let before = store.get("a").unwrap().clone();

        assert!(!store.set_field(0, TaskField::Duration, "999999999999"));
        let task = store.get("a").unwrap();
        assert_eq!(task, &before);
        assert_eq!(task.duration, 3);
        assert_eq!(task.end_date, "2024-01-04");
    }

    #[test]
    fn test_set_duration_with_bad_start_keeps_end() {
        let mut store = store_with(&[("a", 0)]);
        store.set_field(0, TaskField::StartDate, "someday");

        assert!(store.set_field(0, TaskField::Duration, "4"));
        let task = store.get("a").unwrap();
        assert_eq!(task.duration, 4);
        assert_eq!(task.end_date, "2024-01-01");
    }

    #[test]
    fn test_set_dates_recompute_duration() {
        let mut store = store_with(&[("a", 0)]);

        assert!(store.set_field(0, TaskField::StartDate, "2024-02-16"));
        assert!(store.set_field(0, TaskField::EndDate, "2024-02-25"));
        assert_eq!(store.get("a").unwrap().duration, 9);

        assert!(store.set_field(0, TaskField::StartDate, "2024-02-20"));
        assert_eq!(store.get("a").unwrap().duration, 5);
    }

    #[test]
    fn test_set_unparsable_date_is_stored_without_recompute() {
        let mut store = store_with(&[("a", 0)]);
        store.set_field(0, TaskField::EndDate, "2024-01-05");

        assert!(store.set_field(0, TaskField::StartDate, "not a date"));
        let task = store.get("a").unwrap();
        assert_eq!(task.start_date, "not a date");
        assert_eq!(task.duration, 4);
    }

    #[test]
    fn test_set_progress_clamps() {
        let mut store = store_with(&[("a", 0)]);
        assert!(store.set_field(0, TaskField::Progress, "140"));
        assert_eq!(store.get("a").unwrap().progress, 100.0);
        assert!(store.set_field(0, TaskField::Progress, "37.5"));
        assert_eq!(store.get("a").unwrap().progress, 37.5);
        assert!(!store.set_field(0, TaskField::Progress, "lots"));
        assert_eq!(store.get("a").unwrap().progress, 37.5);
    }

    #[test]
    fn test_set_dependencies() {
        let mut store = store_with(&[("a", 0)]);
        assert!(store.set_field(0, TaskField::Dependencies, "1, 2,,3"));
        assert_eq!(store.get("a").unwrap().dependencies, vec!["1", "2", "3"]);
    }

    #[test]
    fn test_set_text_fields_and_missing_row() {
        let mut store = store_with(&[("a", 0)]);
        assert!(store.set_field(0, TaskField::Name, "Framing"));
        assert!(store.set_field(0, TaskField::TaskType, "Construction"));
        assert!(store.set_field(0, TaskField::Assignee, "Jane Smith"));
        assert!(!store.set_field(5, TaskField::Name, "ghost"));

        let task = store.get("a").unwrap();
        assert_eq!(task.name, "Framing");
        assert_eq!(task.task_type, "Construction");
        assert_eq!(task.assignee, "Jane Smith");
    }

    #[test]
    fn test_children_and_subtree() {
        let store = store_with(&[("a", 0), ("b", 1), ("c", 2), ("d", 1), ("e", 0)]);

        let children: Vec<&str> = store.children("a").iter().map(|t| t.id.as_str()).collect();
        assert_eq!(children, vec!["b", "d"]);

        let subtree: Vec<&str> = store.subtree("b").iter().map(|t| t.id.as_str()).collect();
        assert_eq!(subtree, vec!["c"]);

        assert!(store.subtree("e").is_empty());
        assert!(store.children("zzz").is_empty());
    }

    #[test]
    fn test_list_with_filters() {
        let store = TaskStore::seeded();

        let jane = store.list(&[Filter::eq_str("assignee", "Jane Smith")]);
        assert_eq!(jane.len(), 10);
        assert!(jane.iter().all(|t| t.assignee == "Jane Smith"));

        let nested = store.list(&[Filter::new("indent", FilterOp::Gt, IndexValue::Int(0))]);
        let ids: Vec<&str> = nested.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, vec!["2", "3", "4", "5"]);

        assert_eq!(store.list(&[]).len(), 20);
    }

    #[test]
    fn test_from_tasks_clamps_progress() {
        let mut tasks = vec![Task::blank("a", day("2024-01-01")), Task::blank("b", day("2024-01-01"))];
        tasks[0].progress = 500.0;
        tasks[1].progress = -20.0;

        let store = TaskStore::from_tasks(tasks);
        assert_eq!(store.get("a").unwrap().progress, 100.0);
        assert_eq!(store.get("b").unwrap().progress, 0.0);
    }

    #[test]
    fn test_from_tasks_relinks_stale_parents() {
        let mut tasks = vec![Task::blank("a", day("2024-01-01")), Task::blank("b", day("2024-01-01"))];
        tasks[1].indent = 1;
        tasks[1].parent_id = Some("ghost".to_string());

        let store = TaskStore::from_tasks(tasks);
        assert_eq!(store.get("b").unwrap().parent_id.as_deref(), Some("a"));
        assert!(store.check().is_empty());
    }
}
