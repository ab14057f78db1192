use super::{BatchOutcome, Direction, Filter, Query, RecordFailure, RecordStore, StoreError};
use crate::models::Record;
use rusqlite::functions::FunctionFlags;
use rusqlite::types::Value as SqlValue;
use rusqlite::{params, params_from_iter, Connection, OptionalExtension};
use serde_json::Value;
use std::marker::PhantomData;
use std::rc::Rc;

/// Stores each record as a JSON body in the table named by `R::KIND`.
pub struct SqliteStore<R> {
    conn: Rc<Connection>,
    _record: PhantomData<R>,
}

impl<R: Record> SqliteStore<R> {
    /// Creates a store over a shared connection. The schema and SQL functions
    /// must already be set up; see [`super::init_schema`].
    pub fn new(conn: Rc<Connection>) -> Self {
        Self {
            conn,
            _record: PhantomData,
        }
    }
}

/// SQL name of the Unicode-aware lowercase function used by text search.
const FOLD_FN: &str = "fold_case";

/// Registers the scalar functions queries rely on. SQLite's own `lower()` only
/// folds ASCII, which would make `Élodie` unreachable from `élodie`.
pub fn register_functions(conn: &Connection) -> Result<(), StoreError> {
    conn.create_scalar_function(
        FOLD_FN,
        1,
        FunctionFlags::SQLITE_UTF8 | FunctionFlags::SQLITE_DETERMINISTIC,
        |ctx| Ok(ctx.get::<Option<String>>(0)?.map(|text| text.to_lowercase())),
    )?;
    Ok(())
}

/// Maps a `(id, body)` row back to its record.
fn decode<R: Record>(row: &rusqlite::Row<'_>) -> rusqlite::Result<R> {
    let id: i64 = row.get(0)?;
    let body: String = row.get(1)?;
    let mut record: R = serde_json::from_str(&body).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(1, rusqlite::types::Type::Text, Box::new(e))
    })?;
    record.set_id(id as u64);
    Ok(record)
}

/// JSON path for a serialized field name.
fn json_path(field: &str) -> Result<String, StoreError> {
    let valid = !field.is_empty() && field.chars().all(|c| c.is_ascii_alphanumeric() || c == '_');
    if !valid {
        return Err(StoreError::InvalidField(field.to_string()));
    }
    Ok(format!("$.{field}"))
}

/// Converts a JSON scalar into the value `json_extract` would return for it.
fn sql_value(value: &Value) -> SqlValue {
    match value {
        Value::Null => SqlValue::Null,
        Value::Bool(flag) => SqlValue::Integer(i64::from(*flag)),
        Value::Number(number) => match number.as_i64() {
            Some(int) => SqlValue::Integer(int),
            None => SqlValue::Real(number.as_f64().unwrap_or_default()),
        },
        Value::String(text) => SqlValue::Text(text.clone()),
        other => SqlValue::Text(other.to_string()),
    }
}

/// Renders a query as `SELECT id, body` SQL plus its bound parameters.
fn select_sql(table: &str, query: &Query) -> Result<(String, Vec<SqlValue>), StoreError> {
    let mut clauses = Vec::new();
    let mut params = Vec::new();

    for filter in &query.filters {
        match filter {
            Filter::Equals { field, value } => {
                params.push(SqlValue::Text(json_path(field)?));
                if value.is_null() {
                    clauses.push("json_extract(body, ?) IS NULL".to_string());
                } else {
                    clauses.push("json_extract(body, ?) = ?".to_string());
                    params.push(sql_value(value));
                }
            }
            Filter::OneOf { field, values } => {
                if values.is_empty() {
                    clauses.push("0".to_string());
                    continue;
                }
                params.push(SqlValue::Text(json_path(field)?));
                let slots = vec!["?"; values.len()].join(", ");
                clauses.push(format!("json_extract(body, ?) IN ({slots})"));
                params.extend(values.iter().map(sql_value));
            }
            Filter::Between { field, low, high } => {
                let path = json_path(field)?;
                clauses.push("json_extract(body, ?) BETWEEN ? AND ?".to_string());
                params.push(SqlValue::Text(path));
                params.push(sql_value(low));
                params.push(sql_value(high));
            }
            Filter::Contains { fields, needle } => {
                if fields.is_empty() {
                    clauses.push("0".to_string());
                    continue;
                }
                let mut any = Vec::new();
                for field in fields {
                    any.push(format!(
                        "instr({FOLD_FN}(CAST(json_extract(body, ?) AS TEXT)), ?) > 0"
                    ));
                    params.push(SqlValue::Text(json_path(field)?));
                    params.push(SqlValue::Text(needle.to_lowercase()));
                }
                clauses.push(format!("({})", any.join(" OR ")));
            }
        }
    }

    let mut sql = format!("SELECT id, body FROM {table}");
    if !clauses.is_empty() {
        sql.push_str(" WHERE ");
        sql.push_str(&clauses.join(" AND "));
    }
    match query.sort {
        Some(sort) => {
            let direction = match sort.direction {
                Direction::Ascending => "ASC",
                Direction::Descending => "DESC",
            };
            sql.push_str(&format!(" ORDER BY json_extract(body, ?) {direction}, id ASC"));
            params.push(SqlValue::Text(json_path(sort.field)?));
        }
        None => sql.push_str(" ORDER BY id ASC"),
    }
    Ok((sql, params))
}

impl<R: Record> RecordStore<R> for SqliteStore<R> {
    fn query(&self, query: &Query) -> Result<Vec<R>, StoreError> {
        let (sql, params) = select_sql(R::KIND, query)?;
        tracing::debug!(table = R::KIND, %sql, "Querying records");
        let mut stmt = self.conn.prepare(&sql)?;
        let records = stmt
            .query_map(params_from_iter(params), decode::<R>)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(records)
    }

    fn get(&self, id: u64) -> Result<Option<R>, StoreError> {
        let sql = format!("SELECT id, body FROM {} WHERE id = ?1", R::KIND);
        let record = self
            .conn
            .query_row(&sql, params![id as i64], decode::<R>)
            .optional()?;
        Ok(record)
    }

    fn create_batch(&mut self, records: Vec<R>) -> Result<BatchOutcome<R>, StoreError> {
        let tx = self.conn.unchecked_transaction()?;
        let insert = format!("INSERT INTO {} (body) VALUES (?1)", R::KIND);
        let rewrite = format!("UPDATE {} SET body = ?1 WHERE id = ?2", R::KIND);

        let mut outcomes = Vec::with_capacity(records.len());
        for mut record in records {
            let stored = (|| -> Result<R, StoreError> {
                tx.execute(&insert, params![serde_json::to_string(&record)?])?;
                let id = tx.last_insert_rowid();
                record.set_id(id as u64);
                tx.execute(&rewrite, params![serde_json::to_string(&record)?, id])?;
                Ok(record)
            })();
            outcomes.push(stored.map_err(|e| RecordFailure::Rejected {
                reason: e.to_string(),
            }));
        }
        tx.commit()?;
        Ok(outcomes)
    }

    fn update_batch(&mut self, records: Vec<R>) -> Result<BatchOutcome<R>, StoreError> {
        let tx = self.conn.unchecked_transaction()?;
        let update = format!("UPDATE {} SET body = ?1 WHERE id = ?2", R::KIND);

        let mut outcomes = Vec::with_capacity(records.len());
        for record in records {
            let id = record.id();
            let changed = serde_json::to_string(&record)
                .map_err(StoreError::from)
                .and_then(|body| Ok(tx.execute(&update, params![body, id as i64])?));
            outcomes.push(match changed {
                Ok(0) => Err(RecordFailure::NotFound { id }),
                Ok(_) => Ok(record),
                Err(e) => Err(RecordFailure::Rejected {
                    reason: e.to_string(),
                }),
            });
        }
        tx.commit()?;
        Ok(outcomes)
    }

    fn delete_batch(&mut self, ids: &[u64]) -> Result<BatchOutcome<u64>, StoreError> {
        let tx = self.conn.unchecked_transaction()?;
        let delete = format!("DELETE FROM {} WHERE id = ?1", R::KIND);

        let mut outcomes = Vec::with_capacity(ids.len());
        for &id in ids {
            outcomes.push(match tx.execute(&delete, params![id as i64]) {
                Ok(0) => Err(RecordFailure::NotFound { id }),
                Ok(_) => Ok(id),
                Err(e) => Err(RecordFailure::Rejected {
                    reason: e.to_string(),
                }),
            });
        }
        tx.commit()?;
        Ok(outcomes)
    }
}
