//! Hospital operations views.
//!
//! Each view loads what it shows from the services when it is opened and
//! reloads after its own mutations. The queue board and the dashboard also
//! reload on a [`RefreshSchedule`](crate::refresh::RefreshSchedule).

use crate::app::View;
use crate::components::Component;
use crate::services::Services;
use std::time::Duration;

pub mod admissions;
pub mod appointments;
pub mod dashboard;
pub mod departments;
pub mod patients;
pub mod queue;
pub mod staff;

/// Builds the component for `view`, loading its initial data.
///
/// Load failures are reported through the services' notifier and leave the
/// view empty, so opening never fails.
///
/// # Arguments
///
/// * `view` - The screen to open.
/// * `services` - Services the view loads its data from.
/// * `refresh_interval` - Reload period for views that poll.
pub fn open(view: View, services: &Services, refresh_interval: Duration) -> Box<dyn Component> {
    match view {
        View::Dashboard => Box::new(dashboard::Dashboard::new(services, refresh_interval)),
        View::Patients => Box::new(patients::list::ListPatients::new(services)),
        View::RegisterPatient => Box::new(patients::add::AddPatient::new()),
        View::Admissions => Box::new(admissions::Admissions::new(services)),
        View::Queue => Box::new(queue::QueueBoard::new(services, refresh_interval)),
        View::Appointments => Box::new(appointments::Appointments::new(services)),
        View::Staff => Box::new(staff::list::StaffDirectory::new(services)),
        View::Departments => Box::new(departments::Departments::new(services)),
    }
}
