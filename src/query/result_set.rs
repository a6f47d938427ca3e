use serde::Serialize;
use std::ops::Deref;
use tracing::debug;

use super::accessor::F;
use super::ordering::{MultiKeyComparator, SortKey};
use super::predicate::Q;
use super::record::Record;
use super::value::Value;
use crate::errors::QueryResult;

/// Ordered collection of records returned by a search.
///
/// Every query operation builds a new collection and leaves `self` as it
/// was. `total_count` is the server-reported number of matches, which can
/// exceed `len()` when the upstream search paginates.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResultSet<R> {
    records: Vec<R>,
    #[serde(skip_serializing_if = "Option::is_none")]
    total_count: Option<u64>,
}

impl<R> ResultSet<R> {
    pub fn new(records: Vec<R>) -> Self {
        Self {
            records,
            total_count: None,
        }
    }

    pub fn with_total_count(records: Vec<R>, total_count: u64) -> Self {
        Self {
            records,
            total_count: Some(total_count),
        }
    }

    pub fn total_count(&self) -> Option<u64> {
        self.total_count
    }

    pub fn records(&self) -> &[R] {
        &self.records
    }

    pub fn into_vec(self) -> Vec<R> {
        self.records
    }
}

impl<R: Record + Clone> ResultSet<R> {
    /// Records for which the predicate holds
    pub fn filter(&self, predicate: &Q) -> QueryResult<Self> {
        let records = self.select(predicate, true)?;
        debug!(
            "Filter kept {} of {} records: {:?}",
            records.len(),
            self.records.len(),
            predicate
        );
        Ok(Self::new(records))
    }

    /// `filter` over the conjunction of `field[__operator]` lookups
    pub fn filter_by<I, K, V>(&self, lookups: I) -> QueryResult<Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<F>,
    {
        self.filter(&Q::from_lookups(lookups)?)
    }

    /// Records for which the predicate does not hold
    pub fn exclude(&self, predicate: &Q) -> QueryResult<Self> {
        let records = self.select(predicate, false)?;
        debug!(
            "Exclude kept {} of {} records: {:?}",
            records.len(),
            self.records.len(),
            predicate
        );
        Ok(Self::new(records))
    }

    pub fn exclude_by<I, K, V>(&self, lookups: I) -> QueryResult<Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<F>,
    {
        self.exclude(&Q::from_lookups(lookups)?)
    }

    fn select(&self, predicate: &Q, keep: bool) -> QueryResult<Vec<R>> {
        let mut selected = Vec::new();
        for record in &self.records {
            if predicate.matches(record)? == keep {
                selected.push(record.clone());
            }
        }
        Ok(selected)
    }

    /// Stable sort by one or more keys, `-field` for descending.
    ///
    /// Sort values are resolved once per record up front, so a missing field
    /// fails before any comparison is made. A key column holding values that
    /// cannot be ordered together fails with `TypeMismatch` before sorting.
    pub fn order_by<I, K>(&self, keys: I) -> QueryResult<Self>
    where
        I: IntoIterator<Item = K>,
        K: Into<SortKey>,
    {
        let comparator = MultiKeyComparator::new(keys);

        let mut decorated = self
            .records
            .iter()
            .map(|record| Ok((comparator.sort_values(record)?, record)))
            .collect::<QueryResult<Vec<_>>>()?;

        let rows: Vec<&[Value]> = decorated.iter().map(|(values, _)| values.as_slice()).collect();
        comparator.check_columns(&rows)?;

        // columns are checked, so every comparison succeeds
        decorated.sort_by(|(a, _), (b, _)| {
            comparator
                .compare_values(a, b)
                .unwrap_or(std::cmp::Ordering::Equal)
        });

        debug!(
            "Ordered {} records by {:?}",
            decorated.len(),
            comparator.keys()
        );

        Ok(Self {
            records: decorated
                .into_iter()
                .map(|(_, record)| record.clone())
                .collect(),
            total_count: self.total_count,
        })
    }

    /// Group consecutive records sharing the same value of a field.
    ///
    /// Runs are adjacency-based: equal keys separated by another key form
    /// separate groups. Call `order_by` on the same key first for one group
    /// per distinct value.
    pub fn group_by(&self, field: &str) -> QueryResult<Vec<(Value, Self)>> {
        self.group_by_with(&F::field(field))
    }

    /// `group_by` keeping only the size of each run
    pub fn group_by_count(&self, field: &str) -> QueryResult<Vec<(Value, usize)>> {
        self.group_by_count_with(&F::field(field))
    }

    pub fn group_by_with(&self, key: &F) -> QueryResult<Vec<(Value, Self)>> {
        let groups = self
            .runs(key)?
            .into_iter()
            .map(|(value, members)| (value, members.into_iter().cloned().collect::<Self>()))
            .collect::<Vec<_>>();
        debug!(
            "Grouped {} records into {} runs by {:?}",
            self.records.len(),
            groups.len(),
            key
        );
        Ok(groups)
    }

    pub fn group_by_count_with(&self, key: &F) -> QueryResult<Vec<(Value, usize)>> {
        Ok(self
            .runs(key)?
            .into_iter()
            .map(|(value, records)| (value, records.len()))
            .collect())
    }

    fn runs(&self, key: &F) -> QueryResult<Vec<(Value, Vec<&R>)>> {
        let mut runs: Vec<(Value, Vec<&R>)> = Vec::new();
        for record in &self.records {
            let value = key.eval(record)?;
            if let Some((current, members)) = runs.last_mut() {
                if current.loosely_equals(&value) {
                    members.push(record);
                    continue;
                }
            }
            runs.push((value, vec![record]));
        }
        Ok(runs)
    }
}

impl<R> Default for ResultSet<R> {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

impl<R> Deref for ResultSet<R> {
    type Target = [R];

    fn deref(&self) -> &[R] {
        &self.records
    }
}

impl<R> From<Vec<R>> for ResultSet<R> {
    fn from(records: Vec<R>) -> Self {
        Self::new(records)
    }
}

impl<R> FromIterator<R> for ResultSet<R> {
    fn from_iter<T: IntoIterator<Item = R>>(iter: T) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl<R> IntoIterator for ResultSet<R> {
    type Item = R;
    type IntoIter = std::vec::IntoIter<R>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.into_iter()
    }
}

impl<'a, R> IntoIterator for &'a ResultSet<R> {
    type Item = &'a R;
    type IntoIter = std::slice::Iter<'a, R>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::QueryError;
    use std::collections::BTreeMap;

    type Row = BTreeMap<String, Value>;

    fn row(id: i64, price: i64, city: &str) -> Row {
        let mut r = BTreeMap::new();
        r.insert("id".to_string(), Value::Int(id));
        r.insert("price".to_string(), Value::Int(price));
        r.insert("city".to_string(), Value::from(city));
        r
    }

    fn sample() -> ResultSet<Row> {
        ResultSet::with_total_count(
            vec![row(1, 100, "A"), row(2, 200, "B"), row(3, 150, "A")],
            42,
        )
    }

    fn ids(set: &ResultSet<Row>) -> Vec<i64> {
        set.iter()
            .map(|r| match r.field("id") {
                Some(Value::Int(id)) => id,
                other => panic!("Expected id, got {:?}", other),
            })
            .collect()
    }

    #[test]
    fn test_filter_keeps_order() {
        let set = sample();
        let in_a = set.filter_by([("city__exact", "A")]).unwrap();
        assert_eq!(ids(&in_a), vec![1, 3]);
        assert_eq!(in_a.total_count(), None);

        let by_price = in_a.order_by(["price"]).unwrap();
        assert_eq!(ids(&by_price), vec![1, 3]);

        // source untouched
        assert_eq!(ids(&set), vec![1, 2, 3]);
    }

    #[test]
    fn test_order_descending() {
        let set = sample().order_by(["-price"]).unwrap();
        assert_eq!(ids(&set), vec![2, 3, 1]);
        assert_eq!(set.total_count(), Some(42));
    }

    #[test]
    fn test_order_is_stable() {
        let set = sample().order_by(["city"]).unwrap();
        assert_eq!(ids(&set), vec![1, 3, 2]);

        let set = sample().order_by(["-city"]).unwrap();
        assert_eq!(ids(&set), vec![2, 1, 3]);
    }

    #[test]
    fn test_order_multiple_keys() {
        let set = sample().order_by(["city", "-price"]).unwrap();
        assert_eq!(ids(&set), vec![3, 1, 2]);
    }

    #[test]
    fn test_order_errors() {
        let err = sample().order_by(["rooms"]).unwrap_err();
        assert_eq!(err, QueryError::missing_field("rooms"));

        let mut mixed = sample().into_vec();
        mixed.push({
            let mut r = row(4, 0, "C");
            r.insert("price".to_string(), Value::from("unknown"));
            r
        });
        let err = ResultSet::new(mixed).order_by(["price"]).unwrap_err();
        assert!(matches!(err, QueryError::TypeMismatch { .. }));
    }

    #[test]
    fn test_order_large_mixed_column() {
        let rows = (0..200)
            .map(|i| {
                let mut r = row(i, 0, "A");
                let price = match i % 3 {
                    0 => Value::from(format!("p{}", 200 - i)),
                    _ => Value::Int((i * 7919) % 101),
                };
                r.insert("price".to_string(), price);
                r
            })
            .collect::<Vec<_>>();

        let err = ResultSet::new(rows).order_by(["-price", "id"]).unwrap_err();
        assert!(matches!(err, QueryError::TypeMismatch { .. }));
    }

    #[test]
    fn test_order_rejects_nan() {
        let rows = (0..50)
            .map(|i| {
                let mut r = row(i, 0, "A");
                let price = if i == 25 { f64::NAN } else { i as f64 };
                r.insert("price".to_string(), Value::Float(price));
                r
            })
            .collect::<Vec<_>>();

        let err = ResultSet::new(rows).order_by(["price"]).unwrap_err();
        assert!(matches!(err, QueryError::TypeMismatch { .. }));
    }

    #[test]
    fn test_exclude_complements_filter() {
        let set = sample();
        let q = Q::lookup("price__gte", 150).unwrap();
        let kept = set.filter(&q).unwrap();
        let dropped = set.exclude(&q).unwrap();
        assert_eq!(ids(&kept), vec![2, 3]);
        assert_eq!(ids(&dropped), vec![1]);
    }

    #[test]
    fn test_unknown_operator_fails_before_scan() {
        let set = sample();
        let err = set.filter_by([("price__foo", 1)]).unwrap_err();
        assert!(matches!(err, QueryError::UnknownOperator { .. }));

        // also when no record would ever be tested
        let empty: ResultSet<Row> = ResultSet::default();
        assert!(empty.exclude_by([("price__foo", 1)]).is_err());
    }

    #[test]
    fn test_filter_missing_field() {
        let err = sample().filter_by([("rooms__gt", 2)]).unwrap_err();
        assert_eq!(err, QueryError::missing_field("rooms"));
    }

    #[test]
    fn test_group_by_is_adjacency_based() {
        let groups = sample().group_by_count("city").unwrap();
        assert_eq!(
            groups,
            vec![
                (Value::from("A"), 1),
                (Value::from("B"), 1),
                (Value::from("A"), 1)
            ]
        );

        let groups = sample().order_by(["city"]).unwrap().group_by("city").unwrap();
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].0, Value::from("A"));
        assert_eq!(ids(&groups[0].1), vec![1, 3]);
        assert_eq!(ids(&groups[1].1), vec![2]);
    }

    #[test]
    fn test_group_by_accessor() {
        let bucket = F::field("price") / 100;
        let groups = sample()
            .order_by(["price"])
            .unwrap()
            .group_by_count_with(&bucket)
            .unwrap();
        assert_eq!(
            groups,
            vec![
                (Value::Int(1), 2),
                (Value::Int(2), 1)
            ]
        );
    }

    #[test]
    fn test_empty_collection() {
        let empty: ResultSet<Row> = ResultSet::default();
        assert!(empty.filter(&Q::new()).unwrap().is_empty());
        assert!(empty.order_by(["price"]).unwrap().is_empty());
        assert!(empty.group_by("city").unwrap().is_empty());
    }
}
