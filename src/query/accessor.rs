use std::fmt;
use std::ops::{Add, Div, Mul, Sub};
use std::sync::Arc;

use super::record::Record;
use super::value::{ArithOp, Value};
use crate::errors::QueryResult;

type DeriveFn = dyn Fn(&dyn Record) -> QueryResult<Value> + Send + Sync;

/// Field accessor: extracts or derives a value from a record.
///
/// Plain values convert into `F::Const`, so they can be mixed freely with
/// accessors in arithmetic and in lookup targets:
///
/// ```
/// use booli_query::query::F;
///
/// let price_per_sqm = F::field("price") / F::field("size");
/// let with_fee = F::field("price") + F::field("fee") * 12;
/// ```
#[derive(Clone)]
pub enum F {
    Field(String),
    Const(Value),
    Derived(Arc<DeriveFn>),
    Arith(ArithOp, Box<F>, Box<F>),
}

impl F {
    pub fn field(name: impl Into<String>) -> Self {
        F::Field(name.into())
    }

    pub fn constant(value: impl Into<Value>) -> Self {
        F::Const(value.into())
    }

    pub fn derived<Func>(func: Func) -> Self
    where
        Func: Fn(&dyn Record) -> QueryResult<Value> + Send + Sync + 'static,
    {
        F::Derived(Arc::new(func))
    }

    pub fn eval(&self, record: &dyn Record) -> QueryResult<Value> {
        match self {
            F::Field(name) => record.require(name),
            F::Const(value) => Ok(value.clone()),
            F::Derived(func) => func(record),
            F::Arith(op, lhs, rhs) => {
                let left = lhs.eval(record)?;
                let right = rhs.eval(record)?;
                left.arith(*op, &right)
            }
        }
    }

    fn combine(self, op: ArithOp, rhs: F) -> F {
        F::Arith(op, Box::new(self), Box::new(rhs))
    }
}

impl fmt::Debug for F {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            F::Field(name) => write!(f, "F({})", name),
            F::Const(value) => write!(f, "{:?}", value),
            F::Derived(_) => write!(f, "F(<fn>)"),
            F::Arith(op, lhs, rhs) => write!(f, "({:?} {} {:?})", lhs, op, rhs),
        }
    }
}

macro_rules! impl_const_from {
    ($($ty:ty),* $(,)?) => {
        $(
            impl From<$ty> for F {
                fn from(value: $ty) -> Self {
                    F::Const(value.into())
                }
            }
        )*
    };
}

impl_const_from!(Value, bool, i64, i32, u32, f64, &str, String, chrono::NaiveDateTime);

impl<T: Into<Value>> From<Vec<T>> for F {
    fn from(items: Vec<T>) -> Self {
        F::Const(items.into())
    }
}

impl<A: Into<Value>, B: Into<Value>> From<(A, B)> for F {
    fn from(pair: (A, B)) -> Self {
        F::Const(pair.into())
    }
}

macro_rules! impl_arith {
    ($($trait:ident, $method:ident, $op:expr);* $(;)?) => {
        $(
            impl<T: Into<F>> $trait<T> for F {
                type Output = F;

                fn $method(self, rhs: T) -> F {
                    self.combine($op, rhs.into())
                }
            }

            impl<T: Into<F>> $trait<T> for &F {
                type Output = F;

                fn $method(self, rhs: T) -> F {
                    self.clone().combine($op, rhs.into())
                }
            }
        )*
    };
}

impl_arith!(
    Add, add, ArithOp::Add;
    Sub, sub, ArithOp::Sub;
    Mul, mul, ArithOp::Mul;
    Div, div, ArithOp::Div;
);
