//! Services module for wardboard.
//!
//! One service per record kind, each explicitly constructed around its store,
//! the shared notifier, and the clock. The CRUD services never hand errors to
//! their callers: storage failures are logged, reported once through the
//! notifier, and come back as an empty list, `None`, or `false`. The queue
//! service is the exception; its errors are typed because position
//! bookkeeping has to know what went wrong.

pub mod admissions;
pub mod analytics;
pub mod appointments;
pub mod dashboard;
pub mod departments;
pub mod patients;
pub mod queue;
pub mod staff;

pub use admissions::AdmissionService;
pub use analytics::QueueAnalytics;
pub use appointments::AppointmentService;
pub use dashboard::DashboardSnapshot;
pub use departments::DepartmentService;
pub use patients::PatientService;
pub use queue::{QueueError, QueueService};
pub use staff::StaffService;

use crate::clock::Clock;
use crate::db::{Query, RecordFailure, RecordStore, StoreError, Stores};
use crate::models::{Patch, Record};
use crate::notify::{Level, Notifier};
use std::rc::Rc;

/// CRUD access to one record kind with the degrade-to-empty error policy.
pub struct Repository<R: Record> {
    /// Singular noun used in log lines and notifications, e.g. "patient".
    label: &'static str,
    store: Box<dyn RecordStore<R>>,
    notifier: Rc<dyn Notifier>,
}

impl<R: Record> Repository<R> {
    /// Wraps `store`. `label` names the record kind in notifications.
    pub fn new(
        label: &'static str,
        store: Box<dyn RecordStore<R>>,
        notifier: Rc<dyn Notifier>,
    ) -> Self {
        Self {
            label,
            store,
            notifier,
        }
    }

    /// Every record, in id order.
    pub fn list(&self) -> Vec<R> {
        self.query(&Query::all())
    }

    /// Runs a list query.
    ///
    /// # Returns
    ///
    /// The matching records, or an empty list if the store could not be read.
    pub fn query(&self, query: &Query) -> Vec<R> {
        tracing::debug!(kind = R::KIND, ?query, "Listing records");
        match self.store.query(query) {
            Ok(records) => records,
            Err(e) => {
                self.store_failure("load", &e);
                Vec::new()
            }
        }
    }

    /// Fetches one record. `None` covers both a missing id and a store failure;
    /// only the latter is reported.
    pub fn get(&self, id: u64) -> Option<R> {
        match self.store.get(id) {
            Ok(record) => record,
            Err(e) => {
                self.store_failure("load", &e);
                None
            }
        }
    }

    /// Stores one new record and returns it with its id.
    pub fn create(&mut self, record: R) -> Option<R> {
        self.create_all(vec![record]).into_iter().next()
    }

    /// Stores new records and returns the ones that were accepted, with their
    /// assigned ids.
    pub fn create_all(&mut self, records: Vec<R>) -> Vec<R> {
        let outcome = self.store.create_batch(records);
        self.accepted("create", outcome)
    }

    /// Replaces a stored record with `record` as a whole.
    pub fn put(&mut self, record: R) -> Option<R> {
        let outcome = self.store.update_batch(vec![record]);
        self.accepted("update", outcome).into_iter().next()
    }

    /// Merges `patch` onto the stored record.
    ///
    /// # Arguments
    ///
    /// * `id` - The id of the record to update.
    /// * `patch` - Fields to change; everything else keeps its stored value.
    ///
    /// # Returns
    ///
    /// The updated record, or `None` if it does not exist or could not be
    /// saved.
    pub fn update<P: Patch<R>>(&mut self, id: u64, patch: P) -> Option<R> {
        let mut record = self.get(id)?;
        patch.apply(&mut record);
        self.put(record)
    }

    /// Deletes one record.
    ///
    /// # Returns
    ///
    /// `true` if the record was removed. A missing id is `false` without a
    /// notification; only store and rejection failures are reported.
    pub fn delete(&mut self, id: u64) -> bool {
        let outcome = self.store.delete_batch(&[id]).map(|results| {
            results
                .into_iter()
                .filter(|result| match result {
                    Err(RecordFailure::NotFound { id }) => {
                        tracing::debug!(kind = R::KIND, id, "Nothing to delete");
                        false
                    }
                    _ => true,
                })
                .collect::<Vec<_>>()
        });
        !self.accepted("delete", outcome).is_empty()
    }

    /// Deletes by id and returns the ids that were removed.
    pub fn delete_all(&mut self, ids: &[u64]) -> Vec<u64> {
        let outcome = self.store.delete_batch(ids);
        self.accepted("delete", outcome)
    }

    /// Keeps the successful records of a batch call, reporting the rest.
    fn accepted<T>(
        &self,
        action: &str,
        outcome: Result<Vec<Result<T, RecordFailure>>, StoreError>,
    ) -> Vec<T> {
        let results = match outcome {
            Ok(results) => results,
            Err(e) => {
                self.store_failure(action, &e);
                return Vec::new();
            }
        };

        let mut accepted = Vec::with_capacity(results.len());
        for result in results {
            match result {
                Ok(value) => accepted.push(value),
                Err(failure) => self.record_failure(action, &failure),
            }
        }
        if !accepted.is_empty() {
            tracing::info!(kind = R::KIND, action, count = accepted.len(), "Records saved");
        }
        accepted
    }

    fn store_failure(&self, action: &str, error: &StoreError) {
        tracing::error!(kind = R::KIND, action, %error, "Record store call failed");
        self.notifier
            .error(&format!("Failed to {action} {} records", self.label));
    }

    fn record_failure(&self, action: &str, failure: &RecordFailure) {
        tracing::warn!(kind = R::KIND, action, %failure, "Record not saved");
        let level = match failure {
            RecordFailure::NotFound { .. } => Level::Warning,
            RecordFailure::Rejected { .. } => Level::Error,
        };
        self.notifier
            .notify(level, &format!("Failed to {action} {}: {failure}", self.label));
    }
}

/// Every service the dashboard uses, wired to one set of stores.
pub struct Services {
    pub patients: PatientService,
    pub appointments: AppointmentService,
    pub staff: StaffService,
    pub departments: DepartmentService,
    pub admissions: AdmissionService,
    pub queue: QueueService,
    clock: Rc<dyn Clock>,
    notifier: Rc<dyn Notifier>,
}

impl Services {
    /// Builds every service over `stores`, sharing one notifier and clock.
    pub fn new(stores: Stores, notifier: Rc<dyn Notifier>, clock: Rc<dyn Clock>) -> Self {
        let Stores {
            patients,
            appointments,
            staff,
            departments,
            admissions,
            queue,
        } = stores;

        Self {
            patients: PatientService::new(
                Repository::new("patient", patients, Rc::clone(&notifier)),
                Rc::clone(&clock),
            ),
            appointments: AppointmentService::new(
                Repository::new("appointment", appointments, Rc::clone(&notifier)),
                Rc::clone(&clock),
            ),
            staff: StaffService::new(
                Repository::new("staff member", staff, Rc::clone(&notifier)),
                Rc::clone(&clock),
            ),
            departments: DepartmentService::new(Repository::new(
                "department",
                departments,
                Rc::clone(&notifier),
            )),
            admissions: AdmissionService::new(
                Repository::new("admission", admissions, Rc::clone(&notifier)),
                Rc::clone(&clock),
            ),
            queue: QueueService::new(queue, Rc::clone(&clock)),
            clock,
            notifier,
        }
    }

    pub fn clock(&self) -> &dyn Clock {
        self.clock.as_ref()
    }

    /// Where views report the outcome of their own actions.
    pub fn notifier(&self) -> &dyn Notifier {
        self.notifier.as_ref()
    }

    /// Loads every collection and computes the dashboard figures for today.
    pub fn dashboard(&self) -> DashboardSnapshot {
        dashboard::summarize(
            &self.patients.list(),
            &self.appointments.list(),
            &self.departments.list(),
            &self.admissions.list(),
            &self.staff.list(),
            self.clock.today(),
        )
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use crate::clock::FixedClock;
    use crate::notify::RecordingNotifier;
    use time::macros::datetime;

    /// In-memory services on a fixed Monday morning, plus the notifier they
    /// report to.
    pub fn services() -> (Services, Rc<RecordingNotifier>) {
        services_with(Stores::memory())
    }

    pub fn services_with(stores: Stores) -> (Services, Rc<RecordingNotifier>) {
        let notifier = Rc::new(RecordingNotifier::default());
        let clock = Rc::new(FixedClock::new(datetime!(2024-06-03 09:00 UTC)));
        let services = Services::new(stores, notifier.clone(), clock);
        (services, notifier)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::testing::UnavailableStore;
    use crate::db::MemoryStore;
    use crate::models::{Department, DepartmentUpdate};
    use crate::models::Change;
    use crate::notify::RecordingNotifier;

    fn department(name: &str) -> Department {
        Department {
            id: 0,
            name: name.into(),
            floor: "2".into(),
            head_of_department: "Dr. Okafor".into(),
            phone: "555-0102".into(),
            total_beds: 10,
            occupied_beds: 4,
        }
    }

    #[test]
    fn unavailable_store_degrades_to_empty_results() {
        let notifier = Rc::new(RecordingNotifier::default());
        let mut repo: Repository<Department> =
            Repository::new("department", Box::new(UnavailableStore), notifier.clone());

        assert!(repo.list().is_empty());
        assert!(repo.get(1).is_none());
        assert!(repo.create(department("ICU")).is_none());
        assert!(!repo.delete(1));
        assert_eq!(notifier.count(Level::Error), 4);
    }

    #[test]
    fn missing_records_are_none_or_false() {
        let notifier = Rc::new(RecordingNotifier::default());
        let mut repo = Repository::new(
            "department",
            Box::new(MemoryStore::<Department>::new()),
            notifier.clone(),
        );

        assert!(repo.get(9).is_none());
        assert!(repo.update(9, DepartmentUpdate::default()).is_none());
        assert!(!repo.delete(9));
        assert!(notifier.messages.borrow().is_empty());
    }

    #[test]
    fn update_merges_onto_the_stored_record() {
        let notifier = Rc::new(RecordingNotifier::default());
        let mut repo = Repository::new(
            "department",
            Box::new(MemoryStore::<Department>::new()),
            notifier,
        );
        let created = repo.create(department("Cardiology")).unwrap();

        let updated = repo
            .update(
                created.id,
                DepartmentUpdate {
                    occupied_beds: Change::Set(9),
                    ..Default::default()
                },
            )
            .unwrap();
        assert_eq!(updated.occupied_beds, 9);
        assert_eq!(updated.name, "Cardiology");
        assert_eq!(repo.get(created.id).unwrap().occupied_beds, 9);
    }

    #[test]
    fn batch_calls_return_only_successful_records() {
        let notifier = Rc::new(RecordingNotifier::default());
        let mut repo = Repository::new(
            "department",
            Box::new(MemoryStore::<Department>::new()),
            notifier.clone(),
        );
        let created = repo.create_all(vec![department("A"), department("B")]);
        assert_eq!(created.len(), 2);

        let removed = repo.delete_all(&[created[0].id, 77]);
        assert_eq!(removed, vec![created[0].id]);
        assert_eq!(notifier.count(Level::Warning), 1);
    }
}
