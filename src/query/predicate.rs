use std::fmt;
use std::ops::{BitAnd, BitOr, Not};
use std::str::FromStr;
use std::sync::Arc;

use super::accessor::F;
use super::operators::Operator;
use super::record::Record;
use crate::errors::{QueryError, QueryResult};

type TestFn = dyn Fn(&dyn Record) -> QueryResult<bool> + Send + Sync;

/// Parsed `field` or `field__operator` token
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Lookup {
    pub field: String,
    pub operator: Operator,
}

impl FromStr for Lookup {
    type Err = QueryError;

    /// Only the first two `__` segments count: `price__gte__x` is `price`
    /// with `gte`. A missing suffix means `exact`.
    fn from_str(token: &str) -> Result<Self, Self::Err> {
        let mut parts = token.split("__");
        let field = parts.next().unwrap_or("").to_string();

        let operator = match parts.next() {
            None => Operator::Exact,
            Some(name) => name
                .parse::<Operator>()
                .map_err(|_| QueryError::UnknownOperator {
                    lookup: token.to_string(),
                    operator: name.to_string(),
                })?,
        };

        Ok(Lookup { field, operator })
    }
}

impl fmt::Display for Lookup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}__{}", self.field, self.operator)
    }
}

/// Single comparison of a record field against a constant or accessor
#[derive(Debug, Clone)]
pub struct FieldTest {
    pub lookup: Lookup,
    pub value: F,
}

impl FieldTest {
    pub fn eval(&self, record: &dyn Record) -> QueryResult<bool> {
        let actual = record.require(&self.lookup.field)?;
        let target = self.value.eval(record)?;
        self.lookup.operator.apply(&actual, &target)
    }
}

/// Composable boolean predicate over a record.
///
/// Built from lookups and combined with `&`, `|` and `!`; every combination
/// yields a new predicate and leaves its operands untouched.
#[derive(Clone, Default)]
pub enum Q {
    #[default]
    Always,
    FieldTest(FieldTest),
    Derived(Arc<TestFn>),
    And(Box<Q>, Box<Q>),
    Or(Box<Q>, Box<Q>),
    Not(Box<Q>),
}

impl Q {
    /// The always-true predicate
    pub fn new() -> Self {
        Q::Always
    }

    /// One field test. Unknown operator suffixes are rejected here, before
    /// any record is evaluated.
    pub fn lookup(token: &str, value: impl Into<F>) -> QueryResult<Self> {
        Ok(Q::FieldTest(FieldTest {
            lookup: token.parse()?,
            value: value.into(),
        }))
    }

    /// Conjunction of several lookups
    pub fn from_lookups<I, K, V>(lookups: I) -> QueryResult<Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<F>,
    {
        lookups
            .into_iter()
            .try_fold(Q::Always, |acc, (token, value)| {
                Ok(acc.and(Q::lookup(token.as_ref(), value)?))
            })
    }

    /// Conjunction of several predicates; empty input is always-true
    pub fn all(predicates: impl IntoIterator<Item = Q>) -> Self {
        predicates.into_iter().fold(Q::Always, Q::and)
    }

    pub fn derived<Func>(test: Func) -> Self
    where
        Func: Fn(&dyn Record) -> QueryResult<bool> + Send + Sync + 'static,
    {
        Q::Derived(Arc::new(test))
    }

    pub fn and(self, other: Q) -> Q {
        match (self, other) {
            (Q::Always, q) | (q, Q::Always) => q,
            (left, right) => Q::And(Box::new(left), Box::new(right)),
        }
    }

    pub fn or(self, other: Q) -> Q {
        Q::Or(Box::new(self), Box::new(other))
    }

    pub fn negate(self) -> Q {
        Q::Not(Box::new(self))
    }

    /// Evaluate against a record. `And` and `Or` short-circuit.
    pub fn matches(&self, record: &dyn Record) -> QueryResult<bool> {
        match self {
            Q::Always => Ok(true),
            Q::FieldTest(test) => test.eval(record),
            Q::Derived(test) => test(record),
            Q::And(left, right) => Ok(left.matches(record)? && right.matches(record)?),
            Q::Or(left, right) => Ok(left.matches(record)? || right.matches(record)?),
            Q::Not(inner) => Ok(!inner.matches(record)?),
        }
    }
}

impl fmt::Debug for Q {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Q::Always => write!(f, "Q()"),
            Q::FieldTest(test) => write!(f, "Q({}={:?})", test.lookup, test.value),
            Q::Derived(_) => write!(f, "Q(<fn>)"),
            Q::And(left, right) => write!(f, "({:?} & {:?})", left, right),
            Q::Or(left, right) => write!(f, "({:?} | {:?})", left, right),
            Q::Not(inner) => write!(f, "~{:?}", inner),
        }
    }
}

impl BitAnd for Q {
    type Output = Q;

    fn bitand(self, rhs: Q) -> Q {
        self.and(rhs)
    }
}

impl BitAnd for &Q {
    type Output = Q;

    fn bitand(self, rhs: &Q) -> Q {
        self.clone().and(rhs.clone())
    }
}

impl BitOr for Q {
    type Output = Q;

    fn bitor(self, rhs: Q) -> Q {
        self.or(rhs)
    }
}

impl BitOr for &Q {
    type Output = Q;

    fn bitor(self, rhs: &Q) -> Q {
        self.clone().or(rhs.clone())
    }
}

impl Not for Q {
    type Output = Q;

    fn not(self) -> Q {
        self.negate()
    }
}

impl Not for &Q {
    type Output = Q;

    fn not(self) -> Q {
        self.clone().negate()
    }
}
