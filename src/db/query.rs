//! List queries understood by every record store.
//!
//! Field names are the record's serialized (camelCase) names. Filters are
//! AND-ed; `Contains` is the only filter that looks at several fields, and it
//! matches when any one of them does.

use serde_json::Value;
use std::cmp::Ordering;

#[derive(Debug, Clone, PartialEq)]
pub enum Filter {
    Equals {
        field: &'static str,
        value: Value,
    },
    OneOf {
        field: &'static str,
        values: Vec<Value>,
    },
    /// Inclusive on both ends.
    Between {
        field: &'static str,
        low: Value,
        high: Value,
    },
    /// Case-insensitive substring match against any of `fields`.
    Contains {
        fields: Vec<&'static str>,
        needle: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Ascending,
    Descending,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Sort {
    pub field: &'static str,
    pub direction: Direction,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Query {
    pub filters: Vec<Filter>,
    pub sort: Option<Sort>,
}

impl Query {
    /// A query with no filters, in id order.
    pub fn all() -> Self {
        Self::default()
    }

    /// Keeps records whose `field` equals `value`.
    pub fn eq(mut self, field: &'static str, value: impl Into<Value>) -> Self {
        self.filters.push(Filter::Equals {
            field,
            value: value.into(),
        });
        self
    }

    pub fn one_of<V: Into<Value>>(
        mut self,
        field: &'static str,
        values: impl IntoIterator<Item = V>,
    ) -> Self {
        self.filters.push(Filter::OneOf {
            field,
            values: values.into_iter().map(Into::into).collect(),
        });
        self
    }

    pub fn between(
        mut self,
        field: &'static str,
        low: impl Into<Value>,
        high: impl Into<Value>,
    ) -> Self {
        self.filters.push(Filter::Between {
            field,
            low: low.into(),
            high: high.into(),
        });
        self
    }

    /// Keeps records where any of `fields` contains `needle`, ignoring case.
    pub fn contains(mut self, fields: &[&'static str], needle: &str) -> Self {
        self.filters.push(Filter::Contains {
            fields: fields.to_vec(),
            needle: needle.to_string(),
        });
        self
    }

    pub fn sorted_by(mut self, field: &'static str, direction: Direction) -> Self {
        self.sort = Some(Sort { field, direction });
        self
    }

    /// Evaluates the filters against a record's JSON form.
    pub fn matches(&self, record: &Value) -> bool {
        self.filters.iter().all(|filter| filter.matches(record))
    }

    /// Orders JSON records by the query's sort field. Stable, so records that
    /// compare equal keep their incoming order.
    pub fn order<T>(&self, rows: &mut [(T, Value)]) {
        let Some(sort) = self.sort else {
            return;
        };
        rows.sort_by(|(_, a), (_, b)| {
            let ordering = compare(field(a, sort.field), field(b, sort.field))
                .unwrap_or(Ordering::Equal);
            match sort.direction {
                Direction::Ascending => ordering,
                Direction::Descending => ordering.reverse(),
            }
        });
    }
}

impl Filter {
    fn matches(&self, record: &Value) -> bool {
        match self {
            Filter::Equals { field: name, value } => same(field(record, name), value),
            Filter::OneOf {
                field: name,
                values,
            } => {
                let actual = field(record, name);
                values.iter().any(|value| same(actual, value))
            }
            Filter::Between {
                field: name,
                low,
                high,
            } => {
                let actual = field(record, name);
                matches!(
                    compare(actual, low),
                    Some(Ordering::Greater | Ordering::Equal)
                ) && matches!(compare(actual, high), Some(Ordering::Less | Ordering::Equal))
            }
            Filter::Contains { fields, needle } => {
                let needle = needle.to_lowercase();
                fields.iter().any(|name| match field(record, name) {
                    Value::String(text) => text.to_lowercase().contains(&needle),
                    Value::Number(number) => number.to_string().contains(&needle),
                    _ => false,
                })
            }
        }
    }
}

fn field<'a>(record: &'a Value, name: &str) -> &'a Value {
    record.get(name).unwrap_or(&Value::Null)
}

fn same(actual: &Value, expected: &Value) -> bool {
    match (actual, expected) {
        (Value::Number(_), Value::Number(_)) => compare(actual, expected) == Some(Ordering::Equal),
        _ => actual == expected,
    }
}

/// Orders two JSON scalars of the same type; mixed types are incomparable.
pub(crate) fn compare(a: &Value, b: &Value) -> Option<Ordering> {
    match (a, b) {
        (Value::Number(a), Value::Number(b)) => a.as_f64()?.partial_cmp(&b.as_f64()?),
        (Value::String(a), Value::String(b)) => Some(a.cmp(b)),
        (Value::Bool(a), Value::Bool(b)) => Some(a.cmp(b)),
        (Value::Null, Value::Null) => Some(Ordering::Equal),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record() -> Value {
        json!({
            "Id": 4,
            "firstName": "Robert",
            "lastName": "Chen",
            "phone": "555-0142",
            "date": "2024-06-03",
            "departmentId": 2,
            "status": "waiting"
        })
    }

    #[test]
    fn equality_and_one_of() {
        assert!(Query::all().eq("departmentId", 2).matches(&record()));
        assert!(Query::all().eq("departmentId", 2.0).matches(&record()));
        assert!(!Query::all().eq("departmentId", 3).matches(&record()));
        assert!(Query::all()
            .one_of("status", ["in_progress", "waiting"])
            .matches(&record()));
        assert!(!Query::all().eq("missing", 1).matches(&record()));
    }

    #[test]
    fn between_is_inclusive() {
        let query = Query::all().between("date", "2024-06-03", "2024-06-10");
        assert!(query.matches(&record()));
        let query = Query::all().between("date", "2024-06-04", "2024-06-10");
        assert!(!query.matches(&record()));
    }

    #[test]
    fn contains_is_case_insensitive_across_fields() {
        let query = Query::all().contains(&["firstName", "lastName", "phone"], "CHE");
        assert!(query.matches(&record()));
        let query = Query::all().contains(&["firstName", "lastName", "phone"], "0142");
        assert!(query.matches(&record()));
        let query = Query::all().contains(&["firstName"], "chen");
        assert!(!query.matches(&record()));
    }

    #[test]
    fn filters_are_anded() {
        let query = Query::all().eq("departmentId", 2).eq("status", "completed");
        assert!(!query.matches(&record()));
    }

    #[test]
    fn order_is_stable_and_directional() {
        let mut rows = vec![
            ("a", json!({"position": 2})),
            ("b", json!({"position": 1})),
            ("c", json!({"position": 2})),
        ];
        Query::all()
            .sorted_by("position", Direction::Ascending)
            .order(&mut rows);
        let order: Vec<_> = rows.iter().map(|(tag, _)| *tag).collect();
        assert_eq!(order, ["b", "a", "c"]);

        Query::all()
            .sorted_by("position", Direction::Descending)
            .order(&mut rows);
        let order: Vec<_> = rows.iter().map(|(tag, _)| *tag).collect();
        assert_eq!(order, ["a", "c", "b"]);
    }
}
