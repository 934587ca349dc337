// Query filtering over indexed record fields

use crate::record::{IndexValue, Record};
use std::cmp::Ordering;

/// Filter for querying records
#[derive(Debug, Clone)]
pub struct Filter {
    /// Field name to filter on
    pub field: String,
    /// Comparison operator
    pub op: FilterOp,
    /// Value to compare against
    pub value: IndexValue,
}

impl Filter {
    pub fn new(field: impl Into<String>, op: FilterOp, value: IndexValue) -> Self {
        Self {
            field: field.into(),
            op,
            value,
        }
    }

    /// Shorthand for a string equality filter
    pub fn eq_str(field: impl Into<String>, value: impl Into<String>) -> Self {
        Self::new(field, FilterOp::Eq, IndexValue::String(value.into()))
    }

    /// True when the record exposes the field and the comparison holds
    pub fn matches<T: Record>(&self, record: &T) -> bool {
        record
            .indexed_fields()
            .get(&self.field)
            .is_some_and(|actual| self.op.compare(actual, &self.value))
    }
}

/// Comparison operators for filtering
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterOp {
    Eq,       // ==
    Ne,       // !=
    Gt,       // >
    Lt,       // <
    Gte,      // >=
    Lte,      // <=
    Contains, // substring, case-insensitive
}

impl FilterOp {
    /// Evaluate `actual <op> expected`; values of different kinds never match
    pub fn compare(self, actual: &IndexValue, expected: &IndexValue) -> bool {
        if let FilterOp::Contains = self {
            return match (actual, expected) {
                (IndexValue::String(a), IndexValue::String(e)) => a.to_lowercase().contains(&e.to_lowercase()),
                _ => false,
            };
        }

        let ordering = match (actual, expected) {
            (IndexValue::String(a), IndexValue::String(e)) => a.cmp(e),
            (IndexValue::Int(a), IndexValue::Int(e)) => a.cmp(e),
            (IndexValue::Bool(a), IndexValue::Bool(e)) => a.cmp(e),
            _ => return false,
        };

        match self {
            FilterOp::Eq => ordering == Ordering::Equal,
            FilterOp::Ne => ordering != Ordering::Equal,
            FilterOp::Gt => ordering == Ordering::Greater,
            FilterOp::Lt => ordering == Ordering::Less,
            FilterOp::Gte => ordering != Ordering::Less,
            FilterOp::Lte => ordering != Ordering::Greater,
            FilterOp::Contains => unreachable!("handled above"),
        }
    }
}

impl std::fmt::Display for FilterOp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FilterOp::Eq => write!(f, "="),
            FilterOp::Ne => write!(f, "!="),
            FilterOp::Gt => write!(f, ">"),
            FilterOp::Lt => write!(f, "<"),
            FilterOp::Gte => write!(f, ">="),
            FilterOp::Lte => write!(f, "<="),
            FilterOp::Contains => write!(f, "~"),
        }
    }
}

impl std::fmt::Display for Filter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {} {}", self.field, self.op, self.value)
    }
}
