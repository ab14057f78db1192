use super::{BatchOutcome, Query, RecordFailure, RecordStore, StoreError};
use crate::models::Record;

/// Keeps records in a vector, in id order. Callers always get copies.
pub struct MemoryStore<R> {
    records: Vec<R>,
}

impl<R: Record> MemoryStore<R> {
    /// An empty store whose first record gets id 1.
    pub fn new() -> Self {
        Self {
            records: Vec::new(),
        }
    }

    fn next_id(&self) -> u64 {
        self.records.iter().map(Record::id).max().unwrap_or(0) + 1
    }

    fn position(&self, id: u64) -> Option<usize> {
        self.records.iter().position(|record| record.id() == id)
    }
}

impl<R: Record> Default for MemoryStore<R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: Record> RecordStore<R> for MemoryStore<R> {
    fn query(&self, query: &Query) -> Result<Vec<R>, StoreError> {
        let mut rows = Vec::new();
        for record in &self.records {
            let value = serde_json::to_value(record)?;
            if query.matches(&value) {
                rows.push((record, value));
            }
        }
        query.order(&mut rows);
        Ok(rows.into_iter().map(|(record, _)| record.clone()).collect())
    }

    fn get(&self, id: u64) -> Result<Option<R>, StoreError> {
        Ok(self.position(id).map(|index| self.records[index].clone()))
    }

    fn create_batch(&mut self, records: Vec<R>) -> Result<BatchOutcome<R>, StoreError> {
        let mut outcomes = Vec::with_capacity(records.len());
        for mut record in records {
            record.set_id(self.next_id());
            self.records.push(record.clone());
            outcomes.push(Ok(record));
        }
        Ok(outcomes)
    }

    fn update_batch(&mut self, records: Vec<R>) -> Result<BatchOutcome<R>, StoreError> {
        let mut outcomes = Vec::with_capacity(records.len());
        for record in records {
            let id = record.id();
            match self.position(id) {
                Some(index) => {
                    self.records[index] = record.clone();
                    outcomes.push(Ok(record));
                }
                None => outcomes.push(Err(RecordFailure::NotFound { id })),
            }
        }
        Ok(outcomes)
    }

    fn delete_batch(&mut self, ids: &[u64]) -> Result<BatchOutcome<u64>, StoreError> {
        let mut outcomes = Vec::with_capacity(ids.len());
        for &id in ids {
            match self.position(id) {
                Some(index) => {
                    self.records.remove(index);
                    outcomes.push(Ok(id));
                }
                None => outcomes.push(Err(RecordFailure::NotFound { id })),
            }
        }
        Ok(outcomes)
    }
}
