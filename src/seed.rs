// Built-in sample schedule: a residential build from site prep to handover

use crate::hierarchy;
use crate::models::Task;

// (id, name, start, end, duration, assignee, indent, task_type)
const CONSTRUCTION: &[(&str, &str, &str, &str, i64, &str, u8, &str)] = &[
    ("1", "Site Preparation", "2024-01-01", "2024-01-10", 10, "John Doe", 0, "Preparation"),
    ("2", "Foundation Work", "2024-01-11", "2024-01-20", 10, "Jane Smith", 1, "Construction"),
    ("3", "Framing", "2024-01-21", "2024-02-05", 15, "John Doe", 1, "Construction"),
    ("4", "Roofing", "2024-02-06", "2024-02-15", 10, "Jane Smith", 2, "Construction"),
    ("5", "Electrical Rough-In", "2024-02-16", "2024-02-25", 10, "John Doe", 3, "Electrical"),
    ("6", "Plumbing Rough-In", "2024-02-26", "2024-03-07", 10, "Jane Smith", 0, "Plumbing"),
    ("7", "HVAC Rough-In", "2024-03-08", "2024-03-17", 10, "John Doe", 0, "HVAC"),
    ("8", "Insulation", "2024-03-18", "2024-03-27", 10, "Jane Smith", 0, "Insulation"),
    ("9", "Drywall Installation", "2024-03-28", "2024-04-06", 10, "John Doe", 0, "Drywall"),
    ("10", "Painting", "2024-04-07", "2024-04-16", 10, "Jane Smith", 0, "Painting"),
    ("11", "Flooring Installation", "2024-04-17", "2024-04-26", 10, "John Doe", 0, "Flooring"),
    ("12", "Cabinet Installation", "2024-04-27", "2024-05-06", 10, "Jane Smith", 0, "Cabinetry"),
    ("13", "Trim Work", "2024-05-07", "2024-05-16", 10, "John Doe", 0, "Trim"),
    ("14", "Final Electrical", "2024-05-17", "2024-05-26", 10, "Jane Smith", 0, "Electrical"),
    ("15", "Final Plumbing", "2024-05-27", "2024-06-05", 10, "John Doe", 0, "Plumbing"),
    ("16", "Final HVAC", "2024-06-06", "2024-06-15", 10, "Jane Smith", 0, "HVAC"),
    ("17", "Final Inspection", "2024-06-16", "2024-06-20", 5, "John Doe", 0, "Inspection"),
    ("18", "Punch List", "2024-06-21", "2024-06-25", 5, "Jane Smith", 0, "Finalization"),
    ("19", "Final Walkthrough", "2024-06-26", "2024-06-30", 5, "John Doe", 0, "Finalization"),
    ("20", "Project Completion", "2024-07-01", "2024-07-01", 1, "Jane Smith", 0, "Completion"),
];

/// The sample schedule with parents linked; each task depends on the one before it
pub fn construction_schedule() -> Vec<Task> {
    let mut tasks: Vec<Task> = CONSTRUCTION
        .iter()
        .enumerate()
        .map(|(i, &(id, name, start, end, duration, assignee, indent, task_type))| Task {
            id: id.to_string(),
            name: name.to_string(),
            start_date: start.to_string(),
            end_date: end.to_string(),
            duration,
            progress: 0.0,
            assignee: assignee.to_string(),
            dependencies: match i {
                0 => Vec::new(),
                _ => vec![CONSTRUCTION[i - 1].0.to_string()],
            },
            indent,
            parent_id: None,
            task_type: task_type.to_string(),
        })
        .collect();

    hierarchy::relink_parents(&mut tasks);
    tasks
}
