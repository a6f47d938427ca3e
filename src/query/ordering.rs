use std::cmp::Ordering;
use std::fmt;

use super::record::Record;
use super::value::Value;
use crate::errors::{QueryError, QueryResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Ascending,
    Descending,
}

/// One sort key; a leading `-` in the textual form means descending
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortKey {
    pub field: String,
    pub direction: Direction,
}

impl SortKey {
    pub fn parse(key: &str) -> Self {
        match key.strip_prefix('-') {
            Some(field) => SortKey {
                field: field.to_string(),
                direction: Direction::Descending,
            },
            None => SortKey {
                field: key.to_string(),
                direction: Direction::Ascending,
            },
        }
    }

    fn apply(&self, ordering: Ordering) -> Ordering {
        match self.direction {
            Direction::Ascending => ordering,
            Direction::Descending => ordering.reverse(),
        }
    }
}

impl From<&str> for SortKey {
    fn from(key: &str) -> Self {
        SortKey::parse(key)
    }
}

impl From<String> for SortKey {
    fn from(key: String) -> Self {
        SortKey::parse(&key)
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.direction {
            Direction::Ascending => write!(f, "{}", self.field),
            Direction::Descending => write!(f, "-{}", self.field),
        }
    }
}

/// Lexicographic ordering over a sequence of sort keys
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MultiKeyComparator {
    keys: Vec<SortKey>,
}

impl MultiKeyComparator {
    pub fn new<I, K>(keys: I) -> Self
    where
        I: IntoIterator<Item = K>,
        K: Into<SortKey>,
    {
        Self {
            keys: keys.into_iter().map(Into::into).collect(),
        }
    }

    pub fn keys(&self) -> &[SortKey] {
        &self.keys
    }

    /// Resolve every sort key on a record, in key order
    pub fn sort_values(&self, record: &dyn Record) -> QueryResult<Vec<Value>> {
        self.keys
            .iter()
            .map(|key| record.require(&key.field))
            .collect()
    }

    /// Compare two records key by key; the first non-equal key decides
    pub fn compare(&self, a: &dyn Record, b: &dyn Record) -> QueryResult<Ordering> {
        self.compare_values(&self.sort_values(a)?, &self.sort_values(b)?)
    }

    /// Compare two sets of values previously produced by `sort_values`
    pub fn compare_values(&self, a: &[Value], b: &[Value]) -> QueryResult<Ordering> {
        for ((key, left), right) in self.keys.iter().zip(a).zip(b) {
            let ordering = key.apply(left.compare(right)?);
            if ordering != Ordering::Equal {
                return Ok(ordering);
            }
        }
        Ok(Ordering::Equal)
    }

    /// Check that each key column of decorated rows is totally ordered.
    ///
    /// Every value in a column must compare cleanly with the column's first
    /// value, which rejects mixed types and NaN. List keys are checked one
    /// position at a time.
    pub fn check_columns<V: AsRef<[Value]>>(&self, rows: &[V]) -> QueryResult<()> {
        for index in 0..self.keys.len() {
            let column: Vec<&Value> = rows
                .iter()
                .filter_map(|row| row.as_ref().get(index))
                .collect();
            check_column(&column)?;
        }
        Ok(())
    }
}

fn check_column(column: &[&Value]) -> QueryResult<()> {
    let Some(first) = column.first() else {
        return Ok(());
    };

    if let Value::List(_) = first {
        let mut width = 0;
        for value in column {
            match value {
                Value::List(items) => width = width.max(items.len()),
                other => {
                    return Err(QueryError::type_mismatch(
                        "compare",
                        first.type_name(),
                        other.type_name(),
                    ))
                }
            }
        }
        for position in 0..width {
            let items: Vec<&Value> = column
                .iter()
                .filter_map(|value| value.as_list().and_then(|items| items.get(position)))
                .collect();
            check_column(&items)?;
        }
        return Ok(());
    }

    for value in column {
        first.compare(value)?;
    }
    Ok(())
}
