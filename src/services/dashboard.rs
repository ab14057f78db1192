use crate::models::{
    percent, Admission, Appointment, Availability, Department, Patient, PatientStatus,
    StaffMember,
};
use time::Date;

/// How many rows the dashboard's two lists show.
pub const LIST_LIMIT: usize = 5;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DashboardStats {
    pub total_patients: usize,
    pub todays_appointments: usize,
    /// Occupied share of all beds, rounded; 0 when there are no beds.
    pub bed_occupancy_percent: u32,
    pub available_beds: u32,
    pub emergency_cases: usize,
    pub available_staff: usize,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct DashboardSnapshot {
    pub stats: DashboardStats,
    /// Earliest scheduled or in-progress appointments.
    pub upcoming_appointments: Vec<Appointment>,
    pub active_admissions: Vec<Admission>,
}

/// Computes the dashboard figures from already loaded collections.
///
/// # Arguments
///
/// * `today` - The day `todays_appointments` counts bookings for.
pub fn summarize(
    patients: &[Patient],
    appointments: &[Appointment],
    departments: &[Department],
    admissions: &[Admission],
    staff: &[StaffMember],
    today: Date,
) -> DashboardSnapshot {
    let total_beds: u32 = departments.iter().map(|d| d.total_beds).sum();
    let occupied_beds: u32 = departments.iter().map(|d| d.occupied_beds).sum();

    let stats = DashboardStats {
        total_patients: patients.len(),
        todays_appointments: appointments.iter().filter(|a| a.date == today).count(),
        bed_occupancy_percent: percent(occupied_beds, total_beds),
        available_beds: total_beds.saturating_sub(occupied_beds),
        emergency_cases: patients
            .iter()
            .filter(|p| p.admission_status == PatientStatus::Emergency)
            .count(),
        available_staff: staff
            .iter()
            .filter(|s| s.availability_status == Availability::Available)
            .count(),
    };

    let mut upcoming: Vec<Appointment> =
        appointments.iter().filter(|a| a.is_open()).cloned().collect();
    upcoming.sort_by_key(Appointment::starts_at);
    upcoming.truncate(LIST_LIMIT);

    let active_admissions = admissions
        .iter()
        .filter(|a| a.is_active())
        .take(LIST_LIMIT)
        .cloned()
        .collect();

    DashboardSnapshot {
        stats,
        upcoming_appointments: upcoming,
        active_admissions,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{seed, Query, Stores};
    use crate::services::testing::services_with;
    use time::macros::date;

    #[test]
    fn empty_hospital_has_zero_occupancy() {
        let snapshot = summarize(&[], &[], &[], &[], &[], date!(2024 - 06 - 03));
        assert_eq!(snapshot.stats, DashboardStats::default());
        assert!(snapshot.upcoming_appointments.is_empty());
    }

    #[test]
    fn demo_day_figures() {
        let mut stores = Stores::memory();
        seed::seed_demo_data(&mut stores, date!(2024 - 06 - 03)).unwrap();
        let departments = stores.departments.query(&Query::all()).unwrap();
        let (services, _) = services_with(stores);

        let snapshot = services.dashboard();
        let stats = &snapshot.stats;
        assert_eq!(stats.total_patients, 8);
        assert_eq!(stats.todays_appointments, 3);
        assert_eq!(stats.emergency_cases, 2);
        assert_eq!(stats.available_staff, 4);

        let total: u32 = departments.iter().map(|d| d.total_beds).sum();
        let occupied: u32 = departments.iter().map(|d| d.occupied_beds).sum();
        assert_eq!(stats.available_beds, total - occupied);
        assert_eq!(stats.bed_occupancy_percent, percent(occupied, total));

        assert_eq!(snapshot.upcoming_appointments.len(), LIST_LIMIT);
        assert!(snapshot
            .upcoming_appointments
            .windows(2)
            .all(|w| w[0].starts_at() <= w[1].starts_at()));
        assert_eq!(snapshot.active_admissions.len(), 3);
    }
}
