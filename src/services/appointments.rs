use super::Repository;
use crate::clock::Clock;
use crate::db::{Direction, Query};
use crate::models::{Appointment, AppointmentStatus, AppointmentUpdate};
use std::rc::Rc;
use time::macros::format_description;
use time::Date;

/// Appointment book: CRUD plus the date-based views the schedule and
/// dashboard read.
pub struct AppointmentService {
    repo: Repository<Appointment>,
    clock: Rc<dyn Clock>,
}

/// Dates are stored as `YYYY-MM-DD`, so range filters compare the strings.
fn date_key(date: Date) -> String {
    date.format(format_description!("[year]-[month]-[day]"))
        .unwrap_or_default()
}

impl AppointmentService {
    pub fn new(repo: Repository<Appointment>, clock: Rc<dyn Clock>) -> Self {
        Self { repo, clock }
    }

    /// Every appointment, in id order.
    pub fn list(&self) -> Vec<Appointment> {
        self.repo.list()
    }

    /// One appointment, or `None` when it does not exist.
    pub fn get(&self, id: u64) -> Option<Appointment> {
        self.repo.get(id)
    }

    /// Books an appointment, stamping today's creation date.
    pub fn create(&mut self, mut appointment: Appointment) -> Option<Appointment> {
        appointment.created_at = self.clock.today();
        self.repo.create(appointment)
    }

    /// Merges `update` onto a stored appointment and returns the saved copy.
    pub fn update(&mut self, id: u64, update: AppointmentUpdate) -> Option<Appointment> {
        self.repo.update(id, update)
    }

    /// Removes an appointment. A missing id is `false`, not an error.
    pub fn delete(&mut self, id: u64) -> bool {
        self.repo.delete(id)
    }

    /// Appointments dated between `start` and `end`, both inclusive.
    pub fn by_date_range(&self, start: Date, end: Date) -> Vec<Appointment> {
        self.repo.query(
            &Query::all()
                .between("date", date_key(start), date_key(end))
                .sorted_by("date", Direction::Ascending),
        )
    }

    /// Appointments booked for `date`.
    pub fn on_date(&self, date: Date) -> Vec<Appointment> {
        let mut found = self.repo.query(&Query::all().eq("date", date_key(date)));
        found.sort_by_key(|a| a.time);
        found
    }

    /// A patient's appointments.
    pub fn by_patient(&self, patient_id: u64) -> Vec<Appointment> {
        self.repo
            .query(&Query::all().eq("patientId", patient_id))
    }

    /// The earliest `limit` appointments still scheduled or in progress.
    pub fn upcoming(&self, limit: usize) -> Vec<Appointment> {
        let mut open = self.repo.query(&Query::all().one_of(
            "status",
            [
                AppointmentStatus::Scheduled.as_str(),
                AppointmentStatus::InProgress.as_str(),
            ],
        ));
        open.sort_by_key(Appointment::starts_at);
        open.truncate(limit);
        open
    }
}

#[cfg(test)]
mod tests {
    use crate::models::{Appointment, AppointmentStatus, AppointmentUpdate, Change};
    use crate::services::testing::services;
    use time::macros::{date, time};
    use time::{Date, Month, Time};

    fn appointment(patient_id: u64, date: Date, at: Time, status: AppointmentStatus) -> Appointment {
        Appointment {
            id: 0,
            patient_id,
            doctor_id: 2,
            date,
            time: at,
            duration: 30,
            department: "Cardiology".into(),
            reason: "Follow-up".into(),
            notes: String::new(),
            status,
            created_at: date!(2000 - 01 - 01),
        }
    }

    #[test]
    fn date_range_is_inclusive() {
        let (mut services, _) = services();
        let appointments = &mut services.appointments;
        for day in [1, 3, 5, 7] {
            appointments.create(appointment(
                1,
                Date::from_calendar_date(2024, Month::June, day).unwrap(),
                time!(09:00),
                AppointmentStatus::Scheduled,
            ));
        }

        let found = appointments.by_date_range(date!(2024 - 06 - 03), date!(2024 - 06 - 05));
        let days: Vec<u8> = found.iter().map(|a| a.date.day()).collect();
        assert_eq!(days, [3, 5]);
    }

    #[test]
    fn upcoming_skips_closed_and_sorts_by_start() {
        let (mut services, _) = services();
        let appointments = &mut services.appointments;
        appointments.create(appointment(1, date!(2024 - 06 - 04), time!(10:00), AppointmentStatus::Scheduled));
        appointments.create(appointment(2, date!(2024 - 06 - 03), time!(15:00), AppointmentStatus::InProgress));
        appointments.create(appointment(3, date!(2024 - 06 - 03), time!(08:00), AppointmentStatus::Cancelled));
        appointments.create(appointment(4, date!(2024 - 06 - 03), time!(11:30), AppointmentStatus::Scheduled));

        let upcoming = appointments.upcoming(2);
        let patients: Vec<u64> = upcoming.iter().map(|a| a.patient_id).collect();
        assert_eq!(patients, [4, 2]);
    }

    #[test]
    fn create_stamps_created_at_and_update_merges() {
        let (mut services, _) = services();
        let created = services
            .appointments
            .create(appointment(5, date!(2024 - 06 - 10), time!(13:15), AppointmentStatus::Scheduled))
            .unwrap();
        assert_eq!(created.created_at, date!(2024 - 06 - 03));

        let updated = services
            .appointments
            .update(
                created.id,
                AppointmentUpdate {
                    status: Change::Set(AppointmentStatus::Completed),
                    ..Default::default()
                },
            )
            .unwrap();
        assert_eq!(updated.status, AppointmentStatus::Completed);
        assert_eq!(updated.time, time!(13:15));
        assert_eq!(services.appointments.by_patient(5).len(), 1);
        assert_eq!(services.appointments.on_date(date!(2024 - 06 - 10)).len(), 1);
    }
}
