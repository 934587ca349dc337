// Data models for the task list

use crate::schedule;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Deepest indent level a task may reach
pub const MAX_INDENT: u8 = 5;

/// One schedulable unit of work in the Gantt list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: String,
    pub name: String,
    /// ISO `YYYY-MM-DD`, stored as entered
    pub start_date: String,
    /// ISO `YYYY-MM-DD`, stored as entered
    pub end_date: String,
    /// Whole days, kept in step with the dates
    #[serde(default)]
    pub duration: i64,
    pub progress: f64,
    pub assignee: String,
    #[serde(default)]
    pub dependencies: Vec<String>,
    #[serde(default)]
    pub indent: u8,
    /// Derived from position, see `hierarchy::relink_parents`
    #[serde(default)]
    pub parent_id: Option<String>,
    pub task_type: String,
}

impl Task {
    /// A blank task starting and ending on `day`
    pub fn blank(id: impl Into<String>, day: NaiveDate) -> Self {
        let date = schedule::format_date(day);
        Self {
            id: id.into(),
            name: String::new(),
            start_date: date.clone(),
            end_date: date,
            duration: 0,
            progress: 0.0,
            assignee: String::new(),
            dependencies: Vec::new(),
            indent: 0,
            parent_id: None,
            task_type: String::new(),
        }
    }

    pub fn start(&self) -> Option<NaiveDate> {
        schedule::parse_date(&self.start_date)
    }

    pub fn end(&self) -> Option<NaiveDate> {
        schedule::parse_date(&self.end_date)
    }

    pub fn set_progress(&mut self, value: f64) {
        self.progress = clamp_progress(value);
    }
}

/// Clamp a progress percentage into `[0, 100]`; NaN becomes 0
pub fn clamp_progress(value: f64) -> f64 {
    if value.is_nan() { 0.0 } else { value.clamp(0.0, 100.0) }
}

/// Split a comma-separated dependency list into trimmed, non-empty ids
pub fn parse_dependencies(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|d| !d.is_empty())
        .map(String::from)
        .collect()
}

/// Partial update merged by `TaskStore::update`
///
/// Structural fields (`id`, `indent`, `parent_id`) only change through
/// add/delete/indent/unindent, so they have no slot here.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskPatch {
    pub name: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub duration: Option<i64>,
    pub progress: Option<f64>,
    pub assignee: Option<String>,
    pub dependencies: Option<Vec<String>>,
    pub task_type: Option<String>,
}

impl TaskPatch {
    pub fn is_empty(&self) -> bool {
        *self == TaskPatch::default()
    }

    /// Merge the present fields into `task`
    pub fn apply(self, task: &mut Task) {
        if let Some(name) = self.name {
            task.name = name;
        }
        if let Some(start) = self.start_date {
            task.start_date = start;
        }
        if let Some(end) = self.end_date {
            task.end_date = end;
        }
        if let Some(duration) = self.duration {
            task.duration = duration;
        }
        if let Some(progress) = self.progress {
            task.set_progress(progress);
        }
        if let Some(assignee) = self.assignee {
            task.assignee = assignee;
        }
        if let Some(deps) = self.dependencies {
            task.dependencies = deps;
        }
        if let Some(task_type) = self.task_type {
            task.task_type = task_type;
        }
    }
}

/// Editable columns addressed by `TaskStore::set_field`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TaskField {
    Name,
    TaskType,
    Assignee,
    Duration,
    StartDate,
    EndDate,
    Progress,
    Dependencies,
}

impl TaskField {
    pub const ALL: [TaskField; 8] = [
        TaskField::Name,
        TaskField::TaskType,
        TaskField::Assignee,
        TaskField::Duration,
        TaskField::StartDate,
        TaskField::EndDate,
        TaskField::Progress,
        TaskField::Dependencies,
    ];

    /// Column key as the web front end names it
    pub fn key(self) -> &'static str {
        match self {
            TaskField::Name => "name",
            TaskField::TaskType => "taskType",
            TaskField::Assignee => "assignee",
            TaskField::Duration => "duration",
            TaskField::StartDate => "startDate",
            TaskField::EndDate => "endDate",
            TaskField::Progress => "progress",
            TaskField::Dependencies => "dependencies",
        }
    }
}

impl std::fmt::Display for TaskField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.key())
    }
}

impl FromStr for TaskField {
    type Err = String;

    /// Accepts the column key (`startDate`) or its kebab/snake spelling (`start-date`)
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted: String = s
            .chars()
            .filter(|c| *c != '-' && *c != '_')
            .flat_map(char::to_lowercase)
            .collect();
        TaskField::ALL
            .into_iter()
            .find(|field| field.key().to_lowercase() == wanted)
            .ok_or_else(|| format!("Unknown task field: {}", s))
    }
}
