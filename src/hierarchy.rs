// Positional hierarchy over the ordered task list
//
// A task's parent is the nearest earlier row one level shallower, wherever it
// sits, and its subtree is the contiguous run of following rows deeper than it.

use crate::models::{MAX_INDENT, Task};
use std::collections::HashMap;

/// Recompute every `parent_id` from row order and indent levels
///
/// Keeps, for each level, the id of the last row seen at that level, so a row
/// at level L takes the latest earlier row at L-1 even across shallower rows.
/// A row with no earlier row at L-1 gets no parent.
pub fn relink_parents(tasks: &mut [Task]) {
    let mut last_at: Vec<Option<String>> = Vec::new();

    for task in tasks.iter_mut() {
        let level = task.indent as usize;

        task.parent_id = match level {
            0 => None,
            _ => last_at.get(level - 1).cloned().flatten(),
        };

        if last_at.len() <= level {
            last_at.resize(level + 1, None);
        }
        last_at[level] = Some(task.id.clone());
    }
}

/// Exclusive end of the subtree rooted at `row`
///
/// Returns `row + 1` for a leaf. `row` must be in bounds.
pub fn subtree_end(tasks: &[Task], row: usize) -> usize {
    let level = tasks[row].indent;
    tasks[row + 1..]
        .iter()
        .position(|t| t.indent <= level)
        .map(|offset| row + 1 + offset)
        .unwrap_or(tasks.len())
}

/// Rows whose derived parent is `row`
///
/// Those are the rows one level deeper up to the next row at `row`'s level,
/// which takes over as the nearest candidate.
pub fn children_of(tasks: &[Task], row: usize) -> Vec<usize> {
    let level = tasks[row].indent;
    let child_level = level.saturating_add(1);
    (row + 1..tasks.len())
        .take_while(|&i| tasks[i].indent != level)
        .filter(|&i| tasks[i].indent == child_level)
        .collect()
}

/// A structural inconsistency in the task list
#[derive(Debug, Clone, PartialEq)]
pub enum Violation {
    /// Two rows share an id
    DuplicateId { id: String, rows: (usize, usize) },
    /// Level above `MAX_INDENT`
    IndentTooDeep { id: String, indent: u8 },
    /// Level > 0 but no earlier row sits one level shallower
    Orphan { id: String, indent: u8 },
    /// Stored `parent_id` disagrees with the position-derived parent
    StaleParent {
        id: String,
        stored: Option<String>,
        derived: Option<String>,
    },
}

impl std::fmt::Display for Violation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Violation::DuplicateId { id, rows } => {
                write!(f, "duplicate id {} at rows {} and {}", id, rows.0, rows.1)
            }
            Violation::IndentTooDeep { id, indent } => {
                write!(f, "task {} at indent {} (max {})", id, indent, MAX_INDENT)
            }
            Violation::Orphan { id, indent } => {
                write!(f, "task {} at indent {} has no parent", id, indent)
            }
            Violation::StaleParent { id, stored, derived } => write!(
                f,
                "task {} stores parent {} but its position gives {}",
                id,
                stored.as_deref().unwrap_or("-"),
                derived.as_deref().unwrap_or("-")
            ),
        }
    }
}

/// Validate the list against the positional hierarchy rules
pub fn check(tasks: &[Task]) -> Vec<Violation> {
    let mut violations = Vec::new();

    let mut first_row: HashMap<&str, usize> = HashMap::new();
    for (row, task) in tasks.iter().enumerate() {
        if let Some(&first) = first_row.get(task.id.as_str()) {
            violations.push(Violation::DuplicateId {
                id: task.id.clone(),
                rows: (first, row),
            });
        } else {
            first_row.insert(&task.id, row);
        }
    }

    let mut derived = tasks.to_vec();
    relink_parents(&mut derived);

    for (task, expected) in tasks.iter().zip(&derived) {
        if task.indent > MAX_INDENT {
            violations.push(Violation::IndentTooDeep {
                id: task.id.clone(),
                indent: task.indent,
            });
        }
        if task.indent > 0 && expected.parent_id.is_none() {
            violations.push(Violation::Orphan {
                id: task.id.clone(),
                indent: task.indent,
            });
        }
        if task.parent_id != expected.parent_id {
            violations.push(Violation::StaleParent {
                id: task.id.clone(),
                stored: task.parent_id.clone(),
                derived: expected.parent_id.clone(),
            });
        }
    }

    violations
}
