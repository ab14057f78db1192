//! Walk-in patient queue.
//!
//! Every department keeps its own line. Waiting entries hold positions
//! `1..=N` with no gaps; an entry that leaves the waiting state (called in,
//! completed, no-show, or removed) closes its gap by moving everyone behind it
//! up one place. Entries that are in progress keep whatever position they had
//! last, which means nothing once they are out of the line.

use super::analytics::{self, QueueAnalytics};
use crate::clock::Clock;
use crate::db::{BatchOutcome, Direction, Query, RecordFailure, RecordStore, StoreError};
use crate::models::{CheckIn, QueueEntry, QueueStatus};
use std::rc::Rc;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum QueueError {
    #[error("Queue entry {0} not found")]
    NotFound(u64),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("Queue entry not saved: {0}")]
    Rejected(#[from] RecordFailure),
}

pub type Result<T, E = QueueError> = std::result::Result<T, E>;

/// Queue operations over the raw store. Unlike the CRUD services, every
/// call returns its error so callers can tell "not found" from "store down".
pub struct QueueService {
    store: Box<dyn RecordStore<QueueEntry>>,
    clock: Rc<dyn Clock>,
}

/// Unwraps the outcome of a one-record batch call.
fn single<T>(outcome: BatchOutcome<T>) -> Result<T> {
    let result = outcome.into_iter().next().unwrap_or_else(|| {
        Err(RecordFailure::Rejected {
            reason: "empty batch response".into(),
        })
    });
    result.map_err(|failure| match failure {
        RecordFailure::NotFound { id } => QueueError::NotFound(id),
        other => QueueError::Rejected(other),
    })
}

/// Ticket shown to the patient: `Q` and the last six digits of the
/// millisecond timestamp.
pub fn ticket_number(now: time::OffsetDateTime) -> String {
    let millis = now.unix_timestamp_nanos() / 1_000_000;
    format!("Q{:06}", millis.rem_euclid(1_000_000))
}

impl QueueService {
    pub fn new(store: Box<dyn RecordStore<QueueEntry>>, clock: Rc<dyn Clock>) -> Self {
        Self { store, clock }
    }

    /// Every entry ever checked in, finished ones included.
    pub fn all(&self) -> Result<Vec<QueueEntry>> {
        Ok(self.store.query(&Query::all())?)
    }

    /// Entries still in the queue, waiting or in progress, by position.
    pub fn active(&self) -> Result<Vec<QueueEntry>> {
        let query = Query::all()
            .one_of(
                "status",
                [QueueStatus::Waiting.as_str(), QueueStatus::InProgress.as_str()],
            )
            .sorted_by("position", Direction::Ascending);
        Ok(self.store.query(&query)?)
    }

    /// # Errors
    ///
    /// [`QueueError::NotFound`] when no entry has this id.
    pub fn get(&self, id: u64) -> Result<QueueEntry> {
        self.store.get(id)?.ok_or(QueueError::NotFound(id))
    }

    /// All of a department's entries, by position.
    pub fn by_department(&self, department_id: u64) -> Result<Vec<QueueEntry>> {
        let query = Query::all()
            .eq("departmentId", department_id)
            .sorted_by("position", Direction::Ascending);
        Ok(self.store.query(&query)?)
    }

    /// Entries in one status, earliest check-in first.
    ///
    /// Check-in times are stored as RFC 3339 text in whatever offset the clock
    /// used, so they are ordered here rather than by the store.
    pub fn by_status(&self, status: QueueStatus) -> Result<Vec<QueueEntry>> {
        let mut entries = self
            .store
            .query(&Query::all().eq("status", status.as_str()))?;
        entries.sort_by_key(|entry| (entry.check_in_time, entry.id));
        Ok(entries)
    }

    /// Substring search over ticket number and status. A blank query returns
    /// every entry.
    pub fn search(&self, text: &str) -> Result<Vec<QueueEntry>> {
        let text = text.trim();
        if text.is_empty() {
            return self.all();
        }
        let query = Query::all().contains(&["ticketNumber", "status"], text);
        Ok(self.store.query(&query)?)
    }

    /// Waiting entries of one department, front of the line first.
    pub fn waiting(&self, department_id: u64) -> Result<Vec<QueueEntry>> {
        let query = Query::all()
            .eq("departmentId", department_id)
            .eq("status", QueueStatus::Waiting.as_str())
            .sorted_by("position", Direction::Ascending);
        Ok(self.store.query(&query)?)
    }

    fn next_position(&self, department_id: u64) -> Result<u32> {
        let last = self
            .waiting(department_id)?
            .iter()
            .map(|entry| entry.position)
            .max()
            .unwrap_or(0);
        Ok(last + 1)
    }

    /// Adds a patient to the back of a department's line.
    pub fn check_in(&mut self, request: CheckIn) -> Result<QueueEntry> {
        let now = self.clock.now();
        let entry = QueueEntry {
            id: 0,
            patient_id: request.patient_id,
            department_id: request.department_id,
            ticket_number: ticket_number(now),
            position: self.next_position(request.department_id)?,
            status: QueueStatus::Waiting,
            check_in_time: now,
            completed_at: None,
            updated_at: None,
            notes: request.notes,
        };

        let created = single(self.store.create_batch(vec![entry])?)?;
        tracing::info!(
            id = created.id,
            department_id = created.department_id,
            position = created.position,
            ticket = %created.ticket_number,
            "Patient checked in"
        );
        Ok(created)
    }

    /// Moves an entry to `status` and repairs the department's line.
    ///
    /// An entry put back to waiting joins the end of the line.
    pub fn set_status(&mut self, id: u64, status: QueueStatus) -> Result<QueueEntry> {
        let mut entry = self.get(id)?;
        let previous = entry.status;
        let now = self.clock.now();

        if status == QueueStatus::Waiting && previous != QueueStatus::Waiting {
            entry.position = self.next_position(entry.department_id)?;
        }
        entry.status = status;
        entry.updated_at = Some(now);
        if status == QueueStatus::Completed {
            entry.completed_at = Some(now);
        }

        let saved = single(self.store.update_batch(vec![entry])?)?;
        tracing::info!(id, from = %previous, to = %status, "Queue status changed");

        if status != QueueStatus::Waiting {
            self.renumber(saved.department_id)?;
        }
        Ok(saved)
    }

    /// Calls the entry in.
    pub fn call(&mut self, id: u64) -> Result<QueueEntry> {
        self.set_status(id, QueueStatus::InProgress)
    }

    /// Calls in whoever is at the front of the department's line.
    pub fn call_next(&mut self, department_id: u64) -> Result<Option<QueueEntry>> {
        match self.waiting(department_id)?.first() {
            Some(front) => {
                let id = front.id;
                self.call(id).map(Some)
            }
            None => Ok(None),
        }
    }

    /// Marks an entry completed and stamps `completed_at`.
    pub fn complete(&mut self, id: u64) -> Result<QueueEntry> {
        self.set_status(id, QueueStatus::Completed)
    }

    /// Marks an entry as a no-show; the line behind it moves up.
    pub fn mark_no_show(&mut self, id: u64) -> Result<QueueEntry> {
        self.set_status(id, QueueStatus::NoShow)
    }

    /// Deletes the entry and closes its gap in the line.
    pub fn remove(&mut self, id: u64) -> Result<()> {
        let entry = self.get(id)?;
        single(self.store.delete_batch(&[id])?)?;
        tracing::info!(id, department_id = entry.department_id, "Queue entry removed");
        self.renumber(entry.department_id)
    }

    /// Rewrites the department's waiting positions as `1..=N`, keeping their
    /// relative order. Only entries whose position changes are written.
    fn renumber(&mut self, department_id: u64) -> Result<()> {
        let mut moved = Vec::new();
        for (entry, position) in self.waiting(department_id)?.into_iter().zip(1u32..) {
            if entry.position != position {
                moved.push(QueueEntry { position, ..entry });
            }
        }
        if moved.is_empty() {
            return Ok(());
        }

        let count = moved.len();
        for outcome in self.store.update_batch(moved)? {
            outcome?;
        }
        tracing::debug!(department_id, count, "Queue renumbered");
        Ok(())
    }

    /// Live figures over the whole queue collection.
    pub fn analytics(&self) -> Result<QueueAnalytics> {
        Ok(analytics::summarize(&self.all()?, self.clock.now()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;
    use crate::db::{MemoryStore, Stores};
    use rusqlite::Connection;
    use std::collections::BTreeMap;
    use time::macros::datetime;
    use time::Duration;

    fn service() -> (QueueService, Rc<FixedClock>) {
        let clock = Rc::new(FixedClock::new(datetime!(2024-06-03 08:00 UTC)));
        let service = QueueService::new(Box::new(MemoryStore::new()), clock.clone());
        (service, clock)
    }

    fn check_in(service: &mut QueueService, department_id: u64) -> QueueEntry {
        service
            .check_in(CheckIn {
                patient_id: 1,
                department_id,
                notes: String::new(),
            })
            .unwrap()
    }

    /// Waiting positions per department, in the order the store returns them.
    fn waiting_positions(service: &QueueService) -> BTreeMap<u64, Vec<u32>> {
        let mut lines: BTreeMap<u64, Vec<u32>> = BTreeMap::new();
        for entry in service.by_status(QueueStatus::Waiting).unwrap() {
            lines.entry(entry.department_id).or_default().push(entry.position);
        }
        for positions in lines.values_mut() {
            positions.sort_unstable();
        }
        lines
    }

    fn assert_contiguous(service: &QueueService) {
        for (department, positions) in waiting_positions(service) {
            let expected: Vec<u32> = (1..=positions.len() as u32).collect();
            assert_eq!(positions, expected, "department {department}");
        }
    }

    #[test]
    fn positions_count_up_per_department() {
        let (mut service, _) = service();
        assert_eq!(check_in(&mut service, 1).position, 1);
        assert_eq!(check_in(&mut service, 1).position, 2);
        assert_eq!(check_in(&mut service, 2).position, 1);
    }

    #[test]
    fn check_in_sets_ticket_and_time() {
        let (mut service, clock) = service();
        let entry = check_in(&mut service, 1);
        assert_eq!(entry.status, QueueStatus::Waiting);
        assert_eq!(entry.check_in_time, clock.now());
        assert_eq!(entry.ticket_number, ticket_number(clock.now()));
        assert!(entry.ticket_number.starts_with('Q'));
        assert_eq!(entry.ticket_number.len(), 7);
    }

    #[test]
    fn completing_the_front_moves_the_line_up() {
        let (mut service, clock) = service();
        let first = check_in(&mut service, 1);
        let second = check_in(&mut service, 1);

        clock.advance(Duration::minutes(20));
        let done = service.complete(first.id).unwrap();
        assert_eq!(done.completed_at, Some(clock.now()));
        assert_eq!(done.updated_at, Some(clock.now()));
        assert_eq!(service.get(second.id).unwrap().position, 1);
    }

    #[test]
    fn calling_in_renumbers_and_drops_out_of_the_line() {
        let (mut service, _) = service();
        let a = check_in(&mut service, 1);
        let b = check_in(&mut service, 1);
        let c = check_in(&mut service, 1);

        let called = service.call_next(1).unwrap().unwrap();
        assert_eq!(called.id, a.id);
        assert_eq!(called.status, QueueStatus::InProgress);
        assert_eq!(called.completed_at, None);
        assert_eq!(service.get(b.id).unwrap().position, 1);
        assert_eq!(service.get(c.id).unwrap().position, 2);
    }

    #[test]
    fn removal_closes_the_gap() {
        let (mut service, _) = service();
        let a = check_in(&mut service, 3);
        let b = check_in(&mut service, 3);
        let c = check_in(&mut service, 3);

        service.remove(b.id).unwrap();
        assert_eq!(service.get(a.id).unwrap().position, 1);
        assert_eq!(service.get(c.id).unwrap().position, 2);
        assert!(matches!(service.get(b.id), Err(QueueError::NotFound(id)) if id == b.id));
    }

    #[test]
    fn returning_to_waiting_joins_the_end() {
        let (mut service, _) = service();
        let a = check_in(&mut service, 1);
        check_in(&mut service, 1);
        check_in(&mut service, 1);

        service.call(a.id).unwrap();
        let back = service.set_status(a.id, QueueStatus::Waiting).unwrap();
        assert_eq!(back.position, 3);
        assert_contiguous(&service);
    }

    #[test]
    fn other_departments_are_untouched() {
        let (mut service, _) = service();
        let a = check_in(&mut service, 1);
        let other = check_in(&mut service, 2);
        check_in(&mut service, 2);

        service.mark_no_show(a.id).unwrap();
        assert_eq!(service.get(other.id).unwrap().position, 1);
        assert_eq!(service.waiting(2).unwrap().len(), 2);
    }

    #[test]
    fn unknown_ids_are_not_found() {
        let (mut service, _) = service();
        assert!(matches!(service.complete(42), Err(QueueError::NotFound(42))));
        assert!(matches!(service.remove(42), Err(QueueError::NotFound(42))));
        assert!(service.call_next(1).unwrap().is_none());
    }

    #[test]
    fn active_and_search() {
        let (mut service, _) = service();
        let a = check_in(&mut service, 1);
        let b = check_in(&mut service, 1);
        check_in(&mut service, 2);
        service.complete(a.id).unwrap();
        service.call(b.id).unwrap();

        let active = service.active().unwrap();
        assert_eq!(active.len(), 2);
        assert!(active.iter().all(|e| !e.status.is_closed()));
        assert_eq!(service.search("progress").unwrap().len(), 1);
        assert_eq!(service.search("").unwrap().len(), 3);
    }

    /// Drives a long scripted mix of operations across three departments and
    /// checks the line after every step.
    fn exercise_positions(service: &mut QueueService, clock: &FixedClock) {
        let mut seed: u64 = 0x5eed;
        let mut next = move |bound: u64| {
            seed = seed.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
            (seed >> 33) % bound
        };

        for _ in 0..200 {
            clock.advance(Duration::minutes(1));
            let department = next(3) + 1;
            let entries = service.by_department(department).unwrap();
            let pick = (!entries.is_empty())
                .then(|| entries[next(entries.len() as u64) as usize].id);

            match (next(6), pick) {
                (0 | 1, _) | (_, None) => {
                    check_in(service, department);
                }
                (2, Some(id)) => {
                    service.call(id).unwrap();
                }
                (3, Some(id)) => {
                    service.complete(id).unwrap();
                }
                (4, Some(id)) => {
                    service.mark_no_show(id).unwrap();
                }
                (_, Some(id)) => {
                    service.remove(id).unwrap();
                }
            }
            assert_contiguous(service);
        }
    }

    #[test]
    fn by_status_orders_by_instant_across_offsets() {
        let clock = Rc::new(FixedClock::new(datetime!(2024-06-03 08:00 UTC)));
        let stores = [
            Stores::memory(),
            Stores::sqlite(Connection::open_in_memory().unwrap()).unwrap(),
        ];
        for stores in stores {
            let mut store = stores.queue;
            let entry = |ticket: &str, check_in_time| QueueEntry {
                id: 0,
                patient_id: 1,
                department_id: 1,
                ticket_number: ticket.into(),
                position: 1,
                status: QueueStatus::Waiting,
                check_in_time,
                completed_at: None,
                updated_at: None,
                notes: String::new(),
            };
            store
                .create_batch(vec![
                    entry("Q000900", datetime!(2024-06-03 09:00 UTC)),
                    // 12:00 UTC, written by a clock five hours behind.
                    entry("Q001200", datetime!(2024-06-03 07:00 -5)),
                ])
                .unwrap();

            let service = QueueService::new(store, clock.clone());
            let tickets: Vec<_> = service
                .by_status(QueueStatus::Waiting)
                .unwrap()
                .into_iter()
                .map(|e| e.ticket_number)
                .collect();
            assert_eq!(tickets, ["Q000900", "Q001200"]);
        }
    }

    #[test]
    fn waiting_positions_stay_contiguous_in_memory() {
        let (mut service, clock) = service();
        exercise_positions(&mut service, &clock);
    }

    #[test]
    fn waiting_positions_stay_contiguous_in_sqlite() {
        let clock = Rc::new(FixedClock::new(datetime!(2024-06-03 08:00 UTC)));
        let stores = Stores::sqlite(Connection::open_in_memory().unwrap()).unwrap();
        let mut service = QueueService::new(stores.queue, clock.clone());
        exercise_positions(&mut service, &clock);
    }
}
