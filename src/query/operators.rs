use std::fmt;
use std::str::FromStr;

use super::value::Value;
use crate::errors::{QueryError, QueryResult};

/// Comparison operators available as `field__operator` lookup suffixes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operator {
    Gt,
    Gte,
    Lt,
    Lte,
    Exact,
    IExact,
    In,
    Contains,
    IContains,
    StartsWith,
    IStartsWith,
    EndsWith,
    IEndsWith,
    Range,
}

impl Operator {
    pub const ALL: [Operator; 14] = [
        Operator::Gt,
        Operator::Gte,
        Operator::Lt,
        Operator::Lte,
        Operator::Exact,
        Operator::IExact,
        Operator::In,
        Operator::Contains,
        Operator::IContains,
        Operator::StartsWith,
        Operator::IStartsWith,
        Operator::EndsWith,
        Operator::IEndsWith,
        Operator::Range,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Operator::Gt => "gt",
            Operator::Gte => "gte",
            Operator::Lt => "lt",
            Operator::Lte => "lte",
            Operator::Exact => "exact",
            Operator::IExact => "iexact",
            Operator::In => "in",
            Operator::Contains => "contains",
            Operator::IContains => "icontains",
            Operator::StartsWith => "startswith",
            Operator::IStartsWith => "istartswith",
            Operator::EndsWith => "endswith",
            Operator::IEndsWith => "iendswith",
            Operator::Range => "range",
        }
    }

    /// Compare a record's field value against a filter target
    pub fn apply(&self, value: &Value, target: &Value) -> QueryResult<bool> {
        match self {
            Operator::Gt => Ok(value.compare(target)?.is_gt()),
            Operator::Gte => Ok(value.compare(target)?.is_ge()),
            Operator::Lt => Ok(value.compare(target)?.is_lt()),
            Operator::Lte => Ok(value.compare(target)?.is_le()),
            Operator::Exact => Ok(value.loosely_equals(target)),
            Operator::IExact => self.with_strings(value, target, |v, t| v == t),
            Operator::In => target.contains(value),
            Operator::Contains => value.contains(target),
            Operator::IContains => self.with_strings(value, target, |v, t| v.contains(t)),
            Operator::StartsWith => self.with_raw_strings(value, target, |v, t| v.starts_with(t)),
            Operator::IStartsWith => self.with_strings(value, target, |v, t| v.starts_with(t)),
            Operator::EndsWith => self.with_raw_strings(value, target, |v, t| v.ends_with(t)),
            Operator::IEndsWith => self.with_strings(value, target, |v, t| v.ends_with(t)),
            Operator::Range => {
                let (low, high) = match target.as_list() {
                    Some([low, high]) => (low, high),
                    _ => {
                        return Err(QueryError::type_mismatch(
                            self.name(),
                            value.type_name(),
                            target.type_name(),
                        ))
                    }
                };
                Ok(low.compare(value)?.is_le() && value.compare(high)?.is_le())
            }
        }
    }

    fn with_raw_strings(
        &self,
        value: &Value,
        target: &Value,
        test: impl Fn(&str, &str) -> bool,
    ) -> QueryResult<bool> {
        match (value.as_str(), target.as_str()) {
            (Some(v), Some(t)) => Ok(test(v, t)),
            _ => Err(QueryError::type_mismatch(
                self.name(),
                value.type_name(),
                target.type_name(),
            )),
        }
    }

    /// Case-insensitive variant: both operands are lowercased first
    fn with_strings(
        &self,
        value: &Value,
        target: &Value,
        test: impl Fn(&str, &str) -> bool,
    ) -> QueryResult<bool> {
        self.with_raw_strings(value, target, |v, t| {
            test(&v.to_lowercase(), &t.to_lowercase())
        })
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for Operator {
    type Err = QueryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Operator::ALL
            .iter()
            .copied()
            .find(|op| op.name() == s)
            .ok_or_else(|| QueryError::UnknownOperator {
                lookup: s.to_string(),
                operator: s.to_string(),
            })
    }
}
