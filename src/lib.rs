// ganttstore - Task list state layer for Gantt-chart scheduling

pub mod config;
pub mod filter;
pub mod hierarchy;
pub mod jsonl;
pub mod models;
pub mod record;
pub mod schedule;
pub mod seed;
pub mod store;

// Re-export main types for convenience
pub use config::Config;
pub use filter::{Filter, FilterOp};
pub use hierarchy::Violation;
pub use models::{MAX_INDENT, Task, TaskField, TaskPatch};
pub use record::{IndexValue, Record};
pub use store::TaskStore;
