use std::collections::{BTreeMap, HashMap};
use std::hash::BuildHasher;

use super::value::Value;
use crate::errors::{QueryError, QueryResult};

/// Anything the query engine can read named attributes from.
///
/// `field` returns `None` for names the record does not have; the engine
/// turns that into `QueryError::MissingField`.
pub trait Record {
    fn field(&self, name: &str) -> Option<Value>;

    fn require(&self, name: &str) -> QueryResult<Value> {
        self.field(name)
            .ok_or_else(|| QueryError::missing_field(name))
    }
}

impl<R: Record + ?Sized> Record for &R {
    fn field(&self, name: &str) -> Option<Value> {
        (**self).field(name)
    }
}

impl<R: Record + ?Sized> Record for Box<R> {
    fn field(&self, name: &str) -> Option<Value> {
        (**self).field(name)
    }
}

impl Record for BTreeMap<String, Value> {
    fn field(&self, name: &str) -> Option<Value> {
        self.get(name).cloned()
    }
}

impl<S: BuildHasher> Record for HashMap<String, Value, S> {
    fn field(&self, name: &str) -> Option<Value> {
        self.get(name).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_map_record() {
        let mut record = BTreeMap::new();
        record.insert("price".to_string(), Value::Int(100));

        assert_eq!(record.field("price"), Some(Value::Int(100)));
        assert_eq!(record.field("city"), None);
        assert_eq!(
            record.require("city").unwrap_err(),
            QueryError::missing_field("city")
        );
    }

    #[test]
    fn test_reference_record() {
        let mut record: HashMap<String, Value> = HashMap::new();
        record.insert("city".to_string(), Value::from("Uppsala"));
        let by_ref: &dyn Record = &record;

        assert_eq!(by_ref.require("city").unwrap(), Value::from("Uppsala"));
    }
}
