//! Row filter / ordering description shared by every gateway.
//!
//! The in-process gateway evaluates a [`Query`] against JSON rows; the REST
//! gateway translates it into PostgREST query parameters. Both paths give
//! the same answer for the same data.

use std::cmp::Ordering;

use serde_json::Value;

#[derive(Debug, Clone, PartialEq)]
pub enum Condition {
    /// `column = value`
    Eq(String, Value),
    /// `column >= value` (string comparison)
    Gte(String, String),
    /// `column <= value` (string comparison)
    Lte(String, String),
    /// Case-insensitive substring match on any of the columns
    AnyILike(Vec<String>, String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderBy {
    pub column: String,
    pub descending: bool,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Query {
    pub conditions: Vec<Condition>,
    pub order: Option<OrderBy>,
    pub limit: Option<usize>,
}

impl Query {
    pub fn new() -> Self {
        Self::default()
    }

    /// Shorthand for the common `id = ?` lookup
    pub fn by_id(id: &str) -> Self {
        Self::new().eq("id", id)
    }

    pub fn eq(mut self, column: &str, value: impl Into<Value>) -> Self {
        self.conditions
            .push(Condition::Eq(column.to_string(), value.into()));
        self
    }

    pub fn gte(mut self, column: &str, value: impl Into<String>) -> Self {
        self.conditions
            .push(Condition::Gte(column.to_string(), value.into()));
        self
    }

    pub fn lte(mut self, column: &str, value: impl Into<String>) -> Self {
        self.conditions
            .push(Condition::Lte(column.to_string(), value.into()));
        self
    }

    pub fn any_ilike(mut self, columns: &[&str], needle: impl Into<String>) -> Self {
        self.conditions.push(Condition::AnyILike(
            columns.iter().map(|c| c.to_string()).collect(),
            needle.into(),
        ));
        self
    }

    pub fn order_by(mut self, column: &str, descending: bool) -> Self {
        self.order = Some(OrderBy {
            column: column.to_string(),
            descending,
        });
        self
    }

    pub fn limit(mut self, n: usize) -> Self {
        self.limit = Some(n);
        self
    }

    /// Whether a single row satisfies every condition
    pub fn matches(&self, row: &Value) -> bool {
        self.conditions.iter().all(|c| c.matches(row))
    }

    /// Filter, order and truncate a row set
    pub fn apply(&self, rows: impl IntoIterator<Item = Value>) -> Vec<Value> {
        let mut out: Vec<Value> = rows.into_iter().filter(|r| self.matches(r)).collect();
        if let Some(order) = &self.order {
            out.sort_by(|a, b| {
                let ord = compare_values(a.get(&order.column), b.get(&order.column));
                if order.descending { ord.reverse() } else { ord }
            });
        }
        if let Some(n) = self.limit {
            out.truncate(n);
        }
        out
    }
}

impl Condition {
    fn matches(&self, row: &Value) -> bool {
        match self {
            Condition::Eq(col, expected) => row.get(col) == Some(expected),
            Condition::Gte(col, bound) => row
                .get(col)
                .and_then(Value::as_str)
                .is_some_and(|v| v >= bound.as_str()),
            Condition::Lte(col, bound) => row
                .get(col)
                .and_then(Value::as_str)
                .is_some_and(|v| v <= bound.as_str()),
            Condition::AnyILike(cols, needle) => {
                let needle = needle.to_lowercase();
                cols.iter().any(|col| {
                    row.get(col)
                        .and_then(Value::as_str)
                        .is_some_and(|v| v.to_lowercase().contains(&needle))
                })
            }
        }
    }
}

/// Missing and null sort first; numbers numerically; everything else as text
fn compare_values(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    match (a, b) {
        (None | Some(Value::Null), None | Some(Value::Null)) => Ordering::Equal,
        (None | Some(Value::Null), _) => Ordering::Less,
        (_, None | Some(Value::Null)) => Ordering::Greater,
        (Some(Value::Number(x)), Some(Value::Number(y))) => x
            .as_f64()
            .partial_cmp(&y.as_f64())
            .unwrap_or(Ordering::Equal),
        (Some(Value::String(x)), Some(Value::String(y))) => x.cmp(y),
        (Some(x), Some(y)) => x.to_string().cmp(&y.to_string()),
    }
}
