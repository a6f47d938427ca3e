use chrono::NaiveDateTime;
use serde::Serialize;
use std::cmp::Ordering;
use std::fmt;

use crate::errors::{QueryError, QueryResult};

/// Timestamp layout used by the listing API and for rendering timestamps
pub const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Dynamically typed attribute value read from a record
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    DateTime(NaiveDateTime),
    List(Vec<Value>),
}

/// Arithmetic operators supported by derived accessors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArithOp {
    Add,
    Sub,
    Mul,
    Div,
}

impl ArithOp {
    pub fn name(&self) -> &'static str {
        match self {
            ArithOp::Add => "add",
            ArithOp::Sub => "sub",
            ArithOp::Mul => "mul",
            ArithOp::Div => "div",
        }
    }
}

impl fmt::Display for ArithOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArithOp::Add => write!(f, "+"),
            ArithOp::Sub => write!(f, "-"),
            ArithOp::Mul => write!(f, "*"),
            ArithOp::Div => write!(f, "/"),
        }
    }
}

impl Value {
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "boolean",
            Value::Int(_) => "integer",
            Value::Float(_) => "float",
            Value::Str(_) => "string",
            Value::DateTime(_) => "timestamp",
            Value::List(_) => "list",
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(items) => Some(items),
            _ => None,
        }
    }

    /// Total order between two values of compatible types.
    ///
    /// Integers and floats compare numerically with each other, lists compare
    /// lexicographically. Any other mix of types, or a NaN operand, is a
    /// `TypeMismatch`.
    pub fn compare(&self, other: &Value) -> QueryResult<Ordering> {
        let ordering = match (self, other) {
            (Value::Null, Value::Null) => Some(Ordering::Equal),
            (Value::Bool(a), Value::Bool(b)) => Some(a.cmp(b)),
            (Value::Int(a), Value::Int(b)) => Some(a.cmp(b)),
            (Value::Int(a), Value::Float(b)) => (*a as f64).partial_cmp(b),
            (Value::Float(a), Value::Int(b)) => a.partial_cmp(&(*b as f64)),
            (Value::Float(a), Value::Float(b)) => a.partial_cmp(b),
            (Value::Str(a), Value::Str(b)) => Some(a.cmp(b)),
            (Value::DateTime(a), Value::DateTime(b)) => Some(a.cmp(b)),
            (Value::List(a), Value::List(b)) => return compare_lists(a, b),
            _ => None,
        };

        ordering.ok_or_else(|| {
            QueryError::type_mismatch("compare", self.type_name(), other.type_name())
        })
    }

    /// Equality that treats `Int(1)` and `Float(1.0)` as the same value.
    /// Values of unrelated types are simply unequal.
    pub fn loosely_equals(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Int(a), Value::Float(b)) | (Value::Float(b), Value::Int(a)) => {
                (*a as f64) == *b
            }
            (Value::List(a), Value::List(b)) => {
                a.len() == b.len() && a.iter().zip(b).all(|(x, y)| x.loosely_equals(y))
            }
            _ => self == other,
        }
    }

    /// Membership test: list element or substring
    pub fn contains(&self, needle: &Value) -> QueryResult<bool> {
        match (self, needle) {
            (Value::List(items), _) => Ok(items.iter().any(|item| item.loosely_equals(needle))),
            (Value::Str(haystack), Value::Str(n)) => Ok(haystack.contains(n.as_str())),
            _ => Err(QueryError::type_mismatch(
                "contains",
                self.type_name(),
                needle.type_name(),
            )),
        }
    }

    pub fn arith(&self, op: ArithOp, rhs: &Value) -> QueryResult<Value> {
        match (self, rhs) {
            (Value::Int(a), Value::Int(b)) => int_arith(op, *a, *b),
            (Value::Int(a), Value::Float(b)) => float_arith(op, *a as f64, *b),
            (Value::Float(a), Value::Int(b)) => float_arith(op, *a, *b as f64),
            (Value::Float(a), Value::Float(b)) => float_arith(op, *a, *b),
            (Value::Str(a), Value::Str(b)) if op == ArithOp::Add => {
                Ok(Value::Str(format!("{}{}", a, b)))
            }
            (Value::List(a), Value::List(b)) if op == ArithOp::Add => {
                Ok(Value::List(a.iter().chain(b).cloned().collect()))
            }
            _ => Err(QueryError::type_mismatch(
                op.name(),
                self.type_name(),
                rhs.type_name(),
            )),
        }
    }
}

fn compare_lists(a: &[Value], b: &[Value]) -> QueryResult<Ordering> {
    for (x, y) in a.iter().zip(b) {
        let ordering = x.compare(y)?;
        if ordering != Ordering::Equal {
            return Ok(ordering);
        }
    }
    Ok(a.len().cmp(&b.len()))
}

fn int_arith(op: ArithOp, a: i64, b: i64) -> QueryResult<Value> {
    let result = match op {
        ArithOp::Add => a.checked_add(b),
        ArithOp::Sub => a.checked_sub(b),
        ArithOp::Mul => a.checked_mul(b),
        ArithOp::Div => {
            if b == 0 {
                return Err(QueryError::DivisionByZero);
            }
            floor_div(a, b)
        }
    };

    result
        .map(Value::Int)
        .ok_or_else(|| QueryError::ArithmeticOverflow {
            operation: op.name().to_string(),
        })
}

/// Integer division rounding toward negative infinity, so `-7 / 2 == -4`
fn floor_div(a: i64, b: i64) -> Option<i64> {
    let quotient = a.checked_div(b)?;
    let remainder = a.checked_rem(b)?;
    if remainder != 0 && (remainder < 0) != (b < 0) {
        Some(quotient - 1)
    } else {
        Some(quotient)
    }
}

fn float_arith(op: ArithOp, a: f64, b: f64) -> QueryResult<Value> {
    let result = match op {
        ArithOp::Add => a + b,
        ArithOp::Sub => a - b,
        ArithOp::Mul => a * b,
        ArithOp::Div => {
            if b == 0.0 {
                return Err(QueryError::DivisionByZero);
            }
            a / b
        }
    };
    Ok(Value::Float(result))
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => Ok(()),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Int(i) => write!(f, "{}", i),
            Value::Float(x) => write!(f, "{}", x),
            Value::Str(s) => write!(f, "{}", s),
            Value::DateTime(dt) => write!(f, "{}", dt.format(DATETIME_FORMAT)),
            Value::List(items) => {
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ",")?;
                    }
                    write!(f, "{}", item)?;
                }
                Ok(())
            }
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(i)
    }
}

impl From<i32> for Value {
    fn from(i: i32) -> Self {
        Value::Int(i64::from(i))
    }
}

impl From<u32> for Value {
    fn from(i: u32) -> Self {
        Value::Int(i64::from(i))
    }
}

impl From<f64> for Value {
    fn from(x: f64) -> Self {
        Value::Float(x)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Str(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Str(s)
    }
}

impl From<NaiveDateTime> for Value {
    fn from(dt: NaiveDateTime) -> Self {
        Value::DateTime(dt)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(items: Vec<T>) -> Self {
        Value::List(items.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(opt: Option<T>) -> Self {
        opt.map(Into::into).unwrap_or(Value::Null)
    }
}

/// A `(low, high)` pair becomes a two-element list, the shape `range` expects
impl<A: Into<Value>, B: Into<Value>> From<(A, B)> for Value {
    fn from((low, high): (A, B)) -> Self {
        Value::List(vec![low.into(), high.into()])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn ts(y: i32, m: u32, d: u32) -> Value {
        Value::DateTime(
            NaiveDate::from_ymd_opt(y, m, d)
                .unwrap()
                .and_hms_opt(12, 0, 0)
                .unwrap(),
        )
    }

    #[test]
    fn test_compare_mixed_numbers() {
        assert_eq!(
            Value::Int(2).compare(&Value::Float(2.5)).unwrap(),
            Ordering::Less
        );
        assert_eq!(
            Value::Float(3.0).compare(&Value::Int(3)).unwrap(),
            Ordering::Equal
        );
    }

    #[test]
    fn test_compare_timestamps_and_lists() {
        assert_eq!(
            ts(2012, 1, 1).compare(&ts(2011, 6, 1)).unwrap(),
            Ordering::Greater
        );
        let a = Value::from(vec![1, 2]);
        let b = Value::from(vec![1, 2, 0]);
        assert_eq!(a.compare(&b).unwrap(), Ordering::Less);
    }

    #[test]
    fn test_compare_incompatible_types() {
        let err = Value::from("a").compare(&Value::Int(1)).unwrap_err();
        assert!(matches!(err, QueryError::TypeMismatch { .. }));

        let err = Value::Float(f64::NAN).compare(&Value::Float(1.0)).unwrap_err();
        assert!(matches!(err, QueryError::TypeMismatch { .. }));
    }

    #[test]
    fn test_loosely_equals() {
        assert!(Value::Int(100).loosely_equals(&Value::Float(100.0)));
        assert!(!Value::Int(100).loosely_equals(&Value::from("100")));
        assert!(Value::from(vec![1, 2]).loosely_equals(&Value::from(vec![1.0, 2.0])));
    }

    #[test]
    fn test_contains() {
        let list = Value::from(vec!["Vasastan", "Birkastan"]);
        assert!(list.contains(&Value::from("Birkastan")).unwrap());
        assert!(!list.contains(&Value::from("Södermalm")).unwrap());
        assert!(Value::from("Storgatan 1").contains(&Value::from("gatan")).unwrap());
        assert!(Value::Int(5).contains(&Value::Int(5)).is_err());
    }

    #[test]
    fn test_arith_promotion() {
        let v = Value::Int(100).arith(ArithOp::Mul, &Value::Float(1.1)).unwrap();
        match v {
            Value::Float(x) => assert!((x - 110.0).abs() < 1e-9),
            other => panic!("Expected float, got {:?}", other),
        }
        assert_eq!(
            Value::Int(7).arith(ArithOp::Sub, &Value::Int(2)).unwrap(),
            Value::Int(5)
        );
        assert_eq!(
            Value::Int(7).arith(ArithOp::Div, &Value::Int(2)).unwrap(),
            Value::Int(3)
        );
        assert_eq!(
            Value::Int(7).arith(ArithOp::Div, &Value::Float(2.0)).unwrap(),
            Value::Float(3.5)
        );
    }

    #[test]
    fn test_integer_division_floors() {
        let div = |a: i64, b: i64| Value::Int(a).arith(ArithOp::Div, &Value::Int(b)).unwrap();
        assert_eq!(div(150, 100), Value::Int(1));
        assert_eq!(div(-7, 2), Value::Int(-4));
        assert_eq!(div(7, -2), Value::Int(-4));
        assert_eq!(div(-7, -2), Value::Int(3));
        assert_eq!(div(-8, 2), Value::Int(-4));
        assert!(matches!(
            Value::Int(i64::MIN).arith(ArithOp::Div, &Value::Int(-1)),
            Err(QueryError::ArithmeticOverflow { .. })
        ));
    }

    #[test]
    fn test_arith_errors() {
        assert_eq!(
            Value::Int(1).arith(ArithOp::Div, &Value::Int(0)).unwrap_err(),
            QueryError::DivisionByZero
        );
        assert_eq!(
            Value::Float(1.0).arith(ArithOp::Div, &Value::Float(0.0)).unwrap_err(),
            QueryError::DivisionByZero
        );
        assert!(matches!(
            Value::Int(i64::MAX).arith(ArithOp::Add, &Value::Int(1)),
            Err(QueryError::ArithmeticOverflow { .. })
        ));
        assert!(matches!(
            Value::from("a").arith(ArithOp::Mul, &Value::Int(2)),
            Err(QueryError::TypeMismatch { .. })
        ));
    }

    #[test]
    fn test_string_concatenation() {
        let v = Value::from("Kungs").arith(ArithOp::Add, &Value::from("gatan")).unwrap();
        assert_eq!(v, Value::from("Kungsgatan"));
    }

    #[test]
    fn test_display() {
        assert_eq!(Value::from(vec![1, 2, 3]).to_string(), "1,2,3");
        assert_eq!(ts(2012, 3, 4).to_string(), "2012-03-04 12:00:00");
        assert_eq!(Value::Null.to_string(), "");
    }
}
