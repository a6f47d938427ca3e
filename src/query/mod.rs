//! In-memory query layer over search results: lookups, predicates,
//! accessors, ordering and grouping.

pub mod accessor;
pub mod operators;
pub mod ordering;
pub mod predicate;
pub mod record;
pub mod result_set;
pub mod value;

pub use accessor::F;
pub use operators::Operator;
pub use ordering::{Direction, MultiKeyComparator, SortKey};
pub use predicate::{FieldTest, Lookup, Q};
pub use record::Record;
pub use result_set::ResultSet;
pub use value::{ArithOp, Value};
