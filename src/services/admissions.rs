use super::Repository;
use crate::clock::Clock;
use crate::db::{Direction, Query};
use crate::models::{Admission, AdmissionStatus, AdmissionUpdate, DischargeDetails};
use std::rc::Rc;

/// Inpatient stays, from admission to discharge.
pub struct AdmissionService {
    repo: Repository<Admission>,
    clock: Rc<dyn Clock>,
}

impl AdmissionService {
    pub fn new(repo: Repository<Admission>, clock: Rc<dyn Clock>) -> Self {
        Self { repo, clock }
    }

    /// Every admission, discharged ones included.
    pub fn list(&self) -> Vec<Admission> {
        self.repo.list()
    }

    pub fn get(&self, id: u64) -> Option<Admission> {
        self.repo.get(id)
    }

    /// Admits a patient, stamping today's admission date.
    pub fn create(&mut self, mut admission: Admission) -> Option<Admission> {
        admission.admission_date = self.clock.today();
        admission.actual_discharge = None;
        self.repo.create(admission)
    }

    /// Merges `update` onto a stored admission.
    ///
    /// # Returns
    ///
    /// The saved admission, or `None` if it does not exist or was not saved.
    pub fn update(&mut self, id: u64, update: AdmissionUpdate) -> Option<Admission> {
        self.repo.update(id, update)
    }

    /// Removes an admission record outright. Use `discharge` to end a stay.
    pub fn delete(&mut self, id: u64) -> bool {
        self.repo.delete(id)
    }

    /// Admissions still occupying a bed, i.e. Active, Critical or Stable.
    pub fn active(&self) -> Vec<Admission> {
        self.repo.query(&Query::all().one_of(
            "status",
            [
                AdmissionStatus::Active.as_str(),
                AdmissionStatus::Critical.as_str(),
                AdmissionStatus::Stable.as_str(),
            ],
        ))
    }

    /// A patient's stays, newest admission first.
    pub fn by_patient(&self, patient_id: u64) -> Vec<Admission> {
        self.repo.query(
            &Query::all()
                .eq("patientId", patient_id)
                .sorted_by("admissionDate", Direction::Descending),
        )
    }

    /// Case-insensitive substring search over bed number and diagnosis.
    /// A blank query returns every admission.
    pub fn search(&self, text: &str) -> Vec<Admission> {
        let text = text.trim();
        if text.is_empty() {
            return self.list();
        }
        self.repo
            .query(&Query::all().contains(&["bedNumber", "diagnosis"], text))
    }

    /// Marks the admission discharged as of today, merging any extra details.
    ///
    /// # Returns
    ///
    /// The discharged admission, or `None` if it does not exist or could not
    /// be saved.
    pub fn discharge(&mut self, id: u64, details: DischargeDetails) -> Option<Admission> {
        let mut admission = self.repo.get(id)?;
        if let Some(notes) = details.notes {
            admission.discharge_notes = notes;
        }
        if let Some(diagnosis) = details.diagnosis {
            admission.diagnosis = diagnosis;
        }
        admission.status = AdmissionStatus::Discharged;
        admission.actual_discharge = Some(self.clock.today());

        let discharged = self.repo.put(admission)?;
        tracing::info!(id, patient_id = discharged.patient_id, "Patient discharged");
        Some(discharged)
    }
}

#[cfg(test)]
mod tests {
    use crate::models::{Admission, AdmissionStatus, DischargeDetails};
    use crate::services::testing::services;
    use time::macros::date;

    fn admission(patient_id: u64, bed: &str, status: AdmissionStatus) -> Admission {
        Admission {
            id: 0,
            patient_id,
            department_id: 2,
            attending_doctor_id: 2,
            bed_number: bed.into(),
            diagnosis: "Unstable angina".into(),
            admission_type: "Emergency".into(),
            admission_date: date!(2000 - 01 - 01),
            estimated_discharge: None,
            actual_discharge: None,
            status,
            discharge_notes: String::new(),
        }
    }

    #[test]
    fn active_excludes_discharged() {
        let (mut services, _) = services();
        let admissions = &mut services.admissions;
        admissions.create(admission(1, "C-204", AdmissionStatus::Stable));
        admissions.create(admission(2, "C-205", AdmissionStatus::Critical));
        admissions.create(admission(3, "C-206", AdmissionStatus::Discharged));

        assert_eq!(admissions.active().len(), 2);
        assert_eq!(admissions.search("c-206").len(), 1);
        assert_eq!(admissions.by_patient(2).len(), 1);
    }

    #[test]
    fn discharge_sets_status_and_date() {
        let (mut services, _) = services();
        let created = services
            .admissions
            .create(admission(1, "C-204", AdmissionStatus::Active))
            .unwrap();
        assert_eq!(created.admission_date, date!(2024 - 06 - 03));

        let discharged = services
            .admissions
            .discharge(
                created.id,
                DischargeDetails {
                    notes: Some("Follow up in clinic".into()),
                    diagnosis: None,
                },
            )
            .unwrap();
        assert_eq!(discharged.status, AdmissionStatus::Discharged);
        assert_eq!(discharged.actual_discharge, Some(date!(2024 - 06 - 03)));
        assert_eq!(discharged.discharge_notes, "Follow up in clinic");
        assert_eq!(discharged.diagnosis, "Unstable angina");
        assert!(services.admissions.active().is_empty());
    }

    #[test]
    fn discharging_a_missing_admission_is_none() {
        let (mut services, _) = services();
        assert!(services
            .admissions
            .discharge(99, DischargeDetails::default())
            .is_none());
    }
}
