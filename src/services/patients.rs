use super::Repository;
use crate::clock::Clock;
use crate::db::{Direction, Query};
use crate::models::{Patient, PatientStatus, PatientUpdate};
use std::rc::Rc;

/// Fields the patient search box looks at.
const SEARCH_FIELDS: &[&str] = &["firstName", "lastName", "phone", "email"];

/// Patient records: registration, lookups and the search box behind the
/// patient list.
pub struct PatientService {
    repo: Repository<Patient>,
    clock: Rc<dyn Clock>,
}

impl PatientService {
    /// Creates the service around its repository. `clock` dates new
    /// registrations.
    pub fn new(repo: Repository<Patient>, clock: Rc<dyn Clock>) -> Self {
        Self { repo, clock }
    }

    /// Every patient, in id order. Empty if the store could not be read.
    pub fn list(&self) -> Vec<Patient> {
        self.repo.list()
    }

    /// Looks up one patient.
    ///
    /// # Returns
    ///
    /// The patient, or `None` if there is no such id or the store failed.
    pub fn get(&self, id: u64) -> Option<Patient> {
        self.repo.get(id)
    }

    /// Registers a new patient, stamping today's registration date.
    pub fn create(&mut self, mut patient: Patient) -> Option<Patient> {
        patient.registration_date = self.clock.today();
        let created = self.repo.create(patient)?;
        tracing::info!(id = created.id, "Patient registered");
        Some(created)
    }

    /// Applies the `Set` fields of `update` to a stored patient.
    ///
    /// # Arguments
    ///
    /// * `id` - The patient to change.
    /// * `update` - Fields to replace; `Change::Keep` fields are left alone.
    ///
    /// # Returns
    ///
    /// The saved patient, or `None` if the id is unknown or the save failed.
    pub fn update(&mut self, id: u64, update: PatientUpdate) -> Option<Patient> {
        self.repo.update(id, update)
    }

    /// Removes a patient. `false` if nothing was deleted.
    pub fn delete(&mut self, id: u64) -> bool {
        self.repo.delete(id)
    }

    /// Case-insensitive substring search over name, phone and email. A blank
    /// query returns every patient.
    pub fn search(&self, text: &str) -> Vec<Patient> {
        let text = text.trim();
        if text.is_empty() {
            return self.list();
        }
        self.repo.query(
            &Query::all()
                .contains(SEARCH_FIELDS, text)
                .sorted_by("lastName", Direction::Ascending),
        )
    }

    /// Patients currently in `status`.
    pub fn by_admission_status(&self, status: PatientStatus) -> Vec<Patient> {
        self.repo
            .query(&Query::all().eq("admissionStatus", status.as_str()))
    }
}
