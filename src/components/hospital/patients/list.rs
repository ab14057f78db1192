//! Patient list with search, details, status changes and deletion.

use crate::app::{Transition, View};
use crate::components::{widgets, Component};
use crate::models::{Admission, Change, Patient, PatientStatus, PatientUpdate};
use crate::services::Services;
use crate::tui::Frame;
use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{prelude::*, widgets::*};

// Constants for focus indices
const PATIENT_LIST: usize = 0;
const BACK_BUTTON: usize = 1;

/// Component to display and manage the patient register.
pub struct ListPatients {
    patients: Vec<Patient>,
    state: TableState,
    search: String,
    searching: bool,
    /// Only patients with this admission status, when set.
    status_filter: Option<PatientStatus>,
    show_details: bool,
    /// Hospital stays of the selected patient, newest first.
    stays: Vec<Admission>,
    confirm_delete: Option<bool>,
    focus_index: usize,
}

impl ListPatients {
    pub fn new(services: &Services) -> Self {
        let mut list = Self {
            patients: Vec::new(),
            state: TableState::default(),
            search: String::new(),
            searching: false,
            status_filter: None,
            show_details: false,
            stays: Vec::new(),
            confirm_delete: None,
            focus_index: PATIENT_LIST,
        };
        list.fetch_patients(services);
        list
    }

    /// Reloads the table, applying the current search text and status filter.
    fn fetch_patients(&mut self, services: &Services) {
        let mut patients = match self.status_filter {
            Some(status) if self.search.trim().is_empty() => {
                services.patients.by_admission_status(status)
            }
            _ => services.patients.search(&self.search),
        };
        if let Some(status) = self.status_filter {
            patients.retain(|p| p.admission_status == status);
        }
        self.patients = patients;
        widgets::clamp_selection(&mut self.state, self.patients.len());
        if self.patients.is_empty() {
            self.show_details = false;
        }
        self.load_stays(services);
    }

    fn load_stays(&mut self, services: &Services) {
        self.stays = match self.selected_patient() {
            Some(patient) if self.show_details => services.admissions.by_patient(patient.id),
            _ => Vec::new(),
        };
    }

    /// Steps the status filter through "All" and each admission status.
    fn cycle_status_filter(&mut self, services: &Services) {
        let all = PatientStatus::ALL;
        self.status_filter = match self.status_filter {
            None => Some(all[0]),
            Some(current) => all
                .iter()
                .position(|s| *s == current)
                .and_then(|i| all.get(i + 1))
                .copied(),
        };
        self.fetch_patients(services);
    }

    fn selected_patient(&self) -> Option<&Patient> {
        self.state.selected().and_then(|i| self.patients.get(i))
    }

    /// Moves the selected patient to the next admission status.
    fn cycle_status(&mut self, services: &mut Services) {
        let Some(patient) = self.selected_patient() else {
            return;
        };
        let statuses = PatientStatus::ALL;
        let index = statuses
            .iter()
            .position(|s| *s == patient.admission_status)
            .unwrap_or(0);
        let next = statuses[(index + 1) % statuses.len()];
        let update = PatientUpdate {
            admission_status: Change::Set(next),
            ..Default::default()
        };
        if let Some(updated) = services.patients.update(patient.id, update) {
            services
                .notifier()
                .success(&format!("{} is now {}", updated.full_name(), next));
        }
        self.fetch_patients(services);
    }

    fn delete_selected(&mut self, services: &mut Services) {
        let Some(patient) = self.selected_patient() else {
            return;
        };
        let name = patient.full_name();
        if services.patients.delete(patient.id) {
            services.notifier().success(&format!("Deleted {name}"));
        }
        self.fetch_patients(services);
    }

    fn handle_search_input(&mut self, key: KeyEvent, services: &Services) {
        match key.code {
            KeyCode::Char(c) => self.search.push(c),
            KeyCode::Backspace => {
                self.search.pop();
            }
            KeyCode::Esc => {
                self.search.clear();
                self.searching = false;
            }
            KeyCode::Enter | KeyCode::Down => self.searching = false,
            _ => return,
        }
        self.fetch_patients(services);
    }

    fn handle_delete_dialog(&mut self, key: KeyEvent, services: &mut Services, yes: bool) {
        match key.code {
            KeyCode::Left | KeyCode::Right | KeyCode::Tab => self.confirm_delete = Some(!yes),
            KeyCode::Enter => {
                self.confirm_delete = None;
                if yes {
                    self.delete_selected(services);
                }
            }
            KeyCode::Esc => self.confirm_delete = None,
            _ => {}
        }
    }

    fn details(patient: &Patient, stays: &[Admission]) -> Vec<Line<'static>> {
        let field = |label: &str, value: String| {
            Line::from(vec![
                Span::styled(format!("{label}: "), Style::default().fg(widgets::HELP)),
                Span::styled(value, Style::default().fg(widgets::TEXT)),
            ])
        };
        let or_none = |value: &str| {
            if value.trim().is_empty() {
                "None recorded".to_string()
            } else {
                value.to_string()
            }
        };
        vec![
            field(
                "Born",
                format!(
                    "{} | {} | Blood group {}",
                    patient.date_of_birth, patient.gender, patient.blood_group
                ),
            ),
            field("Contact", format!("{} | {}", patient.phone, or_none(&patient.email))),
            field("Address", or_none(&patient.address)),
            field(
                "Emergency contact",
                format!("{} ({})", patient.emergency_contact, patient.emergency_phone),
            ),
            field("Allergies", or_none(&patient.allergies)),
            field("Medications", or_none(&patient.medications)),
            field("History", or_none(&patient.medical_history)),
            field("Registered", patient.registration_date.to_string()),
            field(
                "Hospital stays",
                match stays.first() {
                    Some(latest) => format!(
                        "{} (latest: bed {}, {}, since {})",
                        stays.len(),
                        latest.bed_number,
                        latest.status,
                        latest.admission_date
                    ),
                    None => "None".to_string(),
                },
            ),
        ]
    }
}

impl Component for ListPatients {
    fn handle_input(&mut self, key: KeyEvent, services: &mut Services) -> Result<Option<Transition>> {
        if let Some(yes) = self.confirm_delete {
            self.handle_delete_dialog(key, services, yes);
            return Ok(None);
        }
        if self.searching {
            self.handle_search_input(key, services);
            return Ok(None);
        }

        match key.code {
            KeyCode::Tab | KeyCode::BackTab => self.focus_index = 1 - self.focus_index,
            KeyCode::Down if self.focus_index == PATIENT_LIST => {
                widgets::step_selection(&mut self.state, self.patients.len(), 1);
                self.load_stays(services);
            }
            KeyCode::Up if self.focus_index == PATIENT_LIST => {
                widgets::step_selection(&mut self.state, self.patients.len(), -1);
                self.load_stays(services);
            }
            KeyCode::Enter => {
                if self.focus_index == BACK_BUTTON {
                    return Ok(Some(Transition::Home));
                }
                if self.selected_patient().is_some() {
                    self.show_details = !self.show_details;
                    self.load_stays(services);
                }
            }
            KeyCode::Char('f') | KeyCode::Char('F') => self.cycle_status_filter(services),
            KeyCode::Char('/') => {
                self.searching = true;
                self.focus_index = PATIENT_LIST;
            }
            KeyCode::Char('a') | KeyCode::Char('A') => {
                return Ok(Some(Transition::Open(View::RegisterPatient)))
            }
            KeyCode::Char('s') | KeyCode::Char('S') => self.cycle_status(services),
            KeyCode::Char('d') | KeyCode::Char('D') | KeyCode::Delete => {
                if self.selected_patient().is_some() {
                    self.confirm_delete = Some(false);
                }
            }
            KeyCode::Char('r') | KeyCode::Char('R') => self.fetch_patients(services),
            KeyCode::Char('b') | KeyCode::Char('B') => return Ok(Some(Transition::Home)),
            KeyCode::Esc => {
                if self.show_details {
                    self.show_details = false;
                } else if !self.search.is_empty() {
                    self.search.clear();
                    self.fetch_patients(services);
                } else if self.status_filter.is_some() {
                    self.status_filter = None;
                    self.fetch_patients(services);
                } else {
                    return Ok(Some(Transition::Home));
                }
            }
            _ => {}
        }
        Ok(None)
    }

    fn render(&self, frame: &mut Frame) {
        widgets::background(frame);

        let details_height = if self.show_details { 11 } else { 0 };
        let layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3),              // Header
                Constraint::Length(3),              // Search
                Constraint::Min(8),                 // Table
                Constraint::Length(details_height), // Details
                Constraint::Length(2),              // Help
                Constraint::Length(2),              // Back button
            ])
            .margin(1)
            .split(frame.area());

        widgets::header(frame, layout[0], "🏥 PATIENT LIST");

        let search_label = if self.searching {
            "Search (Enter to finish)"
        } else {
            "Search (/)"
        };
        frame.render_widget(
            widgets::input(search_label, &self.search, self.searching, None),
            layout[1],
        );

        let header = widgets::table_header(&[
            "ID",
            "Name",
            "Date of Birth",
            "Gender",
            "Blood",
            "Phone",
            "Status",
        ]);

        let rows = self.patients.iter().map(|patient| {
            let status_color = match patient.admission_status {
                PatientStatus::Emergency => widgets::DANGER,
                PatientStatus::Admitted => widgets::WARNING,
                PatientStatus::Discharged => widgets::HELP,
                PatientStatus::Outpatient => widgets::SUCCESS,
            };
            Row::new(vec![
                Cell::from(patient.id.to_string()),
                Cell::from(patient.full_name()),
                Cell::from(patient.date_of_birth.to_string()),
                Cell::from(patient.gender.as_str()),
                Cell::from(patient.blood_group.as_str()),
                Cell::from(patient.phone.clone()),
                Cell::from(patient.admission_status.as_str())
                    .style(Style::default().fg(status_color)),
            ])
            .style(Style::default().fg(widgets::TEXT))
        });

        let focused = self.focus_index == PATIENT_LIST && !self.searching;
        let title = match self.status_filter {
            Some(status) => format!(" {status} patients ({}) ", self.patients.len()),
            None => format!(" Patients ({}) ", self.patients.len()),
        };
        let table = Table::new(
            rows,
            [
                Constraint::Length(5),
                Constraint::Percentage(25),
                Constraint::Length(13),
                Constraint::Length(8),
                Constraint::Length(6),
                Constraint::Percentage(20),
                Constraint::Length(11),
            ],
        )
        .header(header)
        .block(widgets::panel(&title))
        .row_highlight_style(widgets::row_highlight(focused))
        .highlight_symbol(if focused { "► " } else { "  " });

        frame.render_stateful_widget(table, layout[2], &mut self.state.clone());

        if self.show_details {
            if let Some(patient) = self.selected_patient() {
                let title = format!(" {} ", patient.full_name());
                frame.render_widget(
                    Paragraph::new(Self::details(patient, &self.stays))
                        .block(widgets::panel(&title))
                        .wrap(Wrap { trim: true }),
                    layout[3],
                );
            }
        }

        frame.render_widget(
            widgets::help(
                "↑↓: Navigate | Enter: Details | /: Search | F: Status filter | A: Add | S: Cycle status | D: Delete | R: Refresh | Esc: Back",
            ),
            layout[4],
        );
        frame.render_widget(
            widgets::button("Back", self.focus_index == BACK_BUTTON, widgets::INFO),
            layout[5],
        );

        if let Some(yes) = self.confirm_delete {
            let message = match self.selected_patient() {
                Some(patient) => format!("Delete {}?", patient.full_name()),
                None => "Delete this patient?".to_string(),
            };
            widgets::confirm_dialog(frame, "Confirm Delete", &message, yes);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{seed, Stores};
    use crate::services::testing::services_with;
    use crossterm::event::KeyModifiers;
    use time::macros::date;

    fn seeded() -> Services {
        let mut stores = Stores::memory();
        seed::seed_demo_data(&mut stores, date!(2024 - 06 - 03)).unwrap();
        services_with(stores).0
    }

    fn press(list: &mut ListPatients, services: &mut Services, code: KeyCode) -> Option<Transition> {
        list.handle_input(KeyEvent::new(code, KeyModifiers::NONE), services)
            .unwrap()
    }

    #[test]
    fn typing_a_search_narrows_the_table() {
        let mut services = seeded();
        let mut list = ListPatients::new(&services);
        let everyone = list.patients.len();

        press(&mut list, &mut services, KeyCode::Char('/'));
        let needle = list.patients[0].last_name.to_lowercase();
        for c in needle.chars() {
            press(&mut list, &mut services, KeyCode::Char(c));
        }
        assert!(list.patients.len() < everyone);
        assert!(list
            .patients
            .iter()
            .all(|p| p.last_name.to_lowercase().contains(&needle)
                || p.first_name.to_lowercase().contains(&needle)
                || p.email.to_lowercase().contains(&needle)));

        press(&mut list, &mut services, KeyCode::Enter);
        press(&mut list, &mut services, KeyCode::Esc);
        assert_eq!(list.patients.len(), everyone);
    }

    #[test]
    fn delete_asks_first() {
        let mut services = seeded();
        let mut list = ListPatients::new(&services);
        let before = list.patients.len();

        press(&mut list, &mut services, KeyCode::Char('d'));
        press(&mut list, &mut services, KeyCode::Enter);
        assert_eq!(list.patients.len(), before);

        press(&mut list, &mut services, KeyCode::Char('d'));
        press(&mut list, &mut services, KeyCode::Left);
        press(&mut list, &mut services, KeyCode::Enter);
        assert_eq!(list.patients.len(), before - 1);
        assert_eq!(services.patients.list().len(), before - 1);
    }

    #[test]
    fn status_cycles_through_every_value() {
        let mut services = seeded();
        let mut list = ListPatients::new(&services);
        let id = list.patients[0].id;
        let start = list.patients[0].admission_status;

        for _ in 0..PatientStatus::ALL.len() {
            press(&mut list, &mut services, KeyCode::Char('s'));
        }
        assert_eq!(services.patients.get(id).unwrap().admission_status, start);
    }

    #[test]
    fn add_key_opens_registration() {
        let mut services = seeded();
        let mut list = ListPatients::new(&services);
        assert_eq!(
            press(&mut list, &mut services, KeyCode::Char('a')),
            Some(Transition::Open(View::RegisterPatient))
        );
    }

    #[test]
    fn status_filter_steps_through_statuses_and_esc_clears_it() {
        let mut services = seeded();
        let mut list = ListPatients::new(&services);
        let everyone = list.patients.len();

        press(&mut list, &mut services, KeyCode::Char('f'));
        assert_eq!(list.status_filter, Some(PatientStatus::Outpatient));
        assert_eq!(list.patients.len(), 2);
        assert!(list
            .patients
            .iter()
            .all(|p| p.admission_status == PatientStatus::Outpatient));

        press(&mut list, &mut services, KeyCode::Esc);
        assert_eq!(list.status_filter, None);
        assert_eq!(list.patients.len(), everyone);
    }

    #[test]
    fn details_list_the_patients_stays() {
        let mut services = seeded();
        let mut list = ListPatients::new(&services);
        for _ in 0..PatientStatus::ALL.len() {
            press(&mut list, &mut services, KeyCode::Char('f'));
        }
        assert_eq!(list.status_filter, Some(PatientStatus::Discharged));
        assert_eq!(list.patients.len(), 1);

        press(&mut list, &mut services, KeyCode::Enter);
        assert!(list.show_details);
        assert_eq!(list.stays.len(), 1);
        assert_eq!(list.stays[0].diagnosis, "Hyperglycaemia");

        press(&mut list, &mut services, KeyCode::Enter);
        assert!(list.stays.is_empty());
    }
}
