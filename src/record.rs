// Queryable record trait and the task's indexed fields

use crate::models::Task;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Anything the store can hold and query by indexed fields
pub trait Record: Serialize + for<'de> Deserialize<'de> + Clone + 'static {
    /// Unique identifier for this record
    fn id(&self) -> &str;

    /// Fields exposed to `Filter`s
    /// Return empty HashMap if nothing should be filterable
    fn indexed_fields(&self) -> HashMap<String, IndexValue> {
        HashMap::new()
    }
}

/// Value types that can be indexed for filtering
#[derive(Debug, Clone, PartialEq)]
pub enum IndexValue {
    String(String),
    Int(i64),
    Bool(bool),
}

impl std::fmt::Display for IndexValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            IndexValue::String(s) => write!(f, "{}", s),
            IndexValue::Int(i) => write!(f, "{}", i),
            IndexValue::Bool(b) => write!(f, "{}", b),
        }
    }
}

impl Record for Task {
    fn id(&self) -> &str {
        &self.id
    }

    fn indexed_fields(&self) -> HashMap<String, IndexValue> {
        let mut fields = HashMap::new();
        fields.insert("name".to_string(), IndexValue::String(self.name.clone()));
        fields.insert("assignee".to_string(), IndexValue::String(self.assignee.clone()));
        fields.insert("task_type".to_string(), IndexValue::String(self.task_type.clone()));
        // ISO dates compare correctly as strings
        fields.insert("start_date".to_string(), IndexValue::String(self.start_date.clone()));
        fields.insert("end_date".to_string(), IndexValue::String(self.end_date.clone()));
        fields.insert("indent".to_string(), IndexValue::Int(self.indent as i64));
        fields.insert("duration".to_string(), IndexValue::Int(self.duration));
        fields.insert("progress".to_string(), IndexValue::Int(self.progress.round() as i64));
        fields.insert("has_parent".to_string(), IndexValue::Bool(self.parent_id.is_some()));
        fields
    }
}
