use crate::app::Transition;
use crate::components::{widgets, Component};
use crate::models::{Appointment, AppointmentStatus, AppointmentUpdate, Change};
use crate::services::Services;
use crate::tui::Frame;
use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{prelude::*, widgets::*};
use std::collections::HashMap;
use time::Duration;

/// How many open appointments the "Upcoming" filter lists.
const UPCOMING_LIMIT: usize = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Filter {
    Today,
    Week,
    Upcoming,
    All,
    /// Every appointment of one patient.
    Patient(u64),
}

pub struct Appointments {
    appointments: Vec<Appointment>,
    patient_names: HashMap<u64, String>,
    doctor_names: HashMap<u64, String>,
    filter: Filter,
    state: TableState,
    show_details: bool,
    confirm_delete: Option<bool>,
}

impl Appointments {
    pub fn new(services: &Services) -> Self {
        let mut view = Self {
            appointments: Vec::new(),
            patient_names: services
                .patients
                .list()
                .into_iter()
                .map(|p| (p.id, p.full_name()))
                .collect(),
            doctor_names: services
                .staff
                .list()
                .into_iter()
                .map(|s| (s.id, s.full_name()))
                .collect(),
            filter: Filter::Today,
            state: TableState::default(),
            show_details: false,
            confirm_delete: None,
        };
        view.reload(services);
        view
    }

    fn reload(&mut self, services: &Services) {
        let today = services.clock().today();
        self.appointments = match self.filter {
            Filter::Today => services.appointments.on_date(today),
            Filter::Week => services
                .appointments
                .by_date_range(today, today + Duration::days(6)),
            Filter::Upcoming => services.appointments.upcoming(UPCOMING_LIMIT),
            Filter::All => services.appointments.list(),
            Filter::Patient(id) => services.appointments.by_patient(id),
        };
        if self.filter != Filter::Upcoming {
            self.appointments.sort_by_key(Appointment::starts_at);
        }
        widgets::clamp_selection(&mut self.state, self.appointments.len());
    }

    fn set_filter(&mut self, filter: Filter, services: &Services) {
        self.filter = filter;
        self.show_details = false;
        self.reload(services);
    }

    fn selected(&self) -> Option<&Appointment> {
        self.state.selected().and_then(|i| self.appointments.get(i))
    }

    fn name(names: &HashMap<u64, String>, id: u64, fallback: &str) -> String {
        names
            .get(&id)
            .cloned()
            .unwrap_or_else(|| format!("{fallback} #{id}"))
    }

    fn set_status(&mut self, services: &mut Services, status: AppointmentStatus) {
        let Some(appointment) = self.selected() else {
            return;
        };
        let update = AppointmentUpdate {
            status: Change::Set(status),
            ..Default::default()
        };
        if services.appointments.update(appointment.id, update).is_some() {
            services
                .notifier()
                .success(&format!("Appointment marked {status}"));
        }
        self.reload(services);
    }

    /// Moves the selected appointment to the next status in the list.
    fn cycle_status(&mut self, services: &mut Services) {
        let Some(current) = self.selected().map(|a| a.status) else {
            return;
        };
        let all = AppointmentStatus::ALL;
        let index = all.iter().position(|s| *s == current).unwrap_or(0);
        self.set_status(services, all[(index + 1) % all.len()]);
    }

    fn filter_title(&self) -> String {
        match self.filter {
            Filter::Today => "Today".to_string(),
            Filter::Week => "Next 7 days".to_string(),
            Filter::Upcoming => "Upcoming".to_string(),
            Filter::All => "All".to_string(),
            Filter::Patient(id) => {
                format!("Patient: {}", Self::name(&self.patient_names, id, "Patient"))
            }
        }
    }
}

impl Component for Appointments {
    fn handle_input(&mut self, key: KeyEvent, services: &mut Services) -> Result<Option<Transition>> {
        if let Some(yes) = self.confirm_delete {
            match key.code {
                KeyCode::Left | KeyCode::Right | KeyCode::Tab => self.confirm_delete = Some(!yes),
                KeyCode::Enter => {
                    self.confirm_delete = None;
                    if let Some(id) = self.selected().map(|a| a.id).filter(|_| yes) {
                        if services.appointments.delete(id) {
                            services.notifier().success("Appointment deleted");
                        }
                        self.reload(services);
                    }
                }
                KeyCode::Esc => self.confirm_delete = None,
                _ => {}
            }
            return Ok(None);
        }

        match key.code {
            KeyCode::Down => widgets::step_selection(&mut self.state, self.appointments.len(), 1),
            KeyCode::Up => widgets::step_selection(&mut self.state, self.appointments.len(), -1),
            KeyCode::Enter => {
                if self.selected().is_some() {
                    self.show_details = !self.show_details;
                }
            }
            KeyCode::Char('t') | KeyCode::Char('T') => self.set_filter(Filter::Today, services),
            KeyCode::Char('w') | KeyCode::Char('W') => self.set_filter(Filter::Week, services),
            KeyCode::Char('u') | KeyCode::Char('U') => self.set_filter(Filter::Upcoming, services),
            KeyCode::Char('a') | KeyCode::Char('A') => self.set_filter(Filter::All, services),
            KeyCode::Char('p') | KeyCode::Char('P') => {
                if let Some(patient) = self.selected().map(|a| a.patient_id) {
                    self.set_filter(Filter::Patient(patient), services);
                }
            }
            KeyCode::Char('s') | KeyCode::Char('S') => self.cycle_status(services),
            KeyCode::Char('c') | KeyCode::Char('C') => {
                self.set_status(services, AppointmentStatus::Completed)
            }
            KeyCode::Char('x') | KeyCode::Char('X') => {
                self.set_status(services, AppointmentStatus::Cancelled)
            }
            KeyCode::Char('d') | KeyCode::Char('D') | KeyCode::Delete => {
                if self.selected().is_some() {
                    self.confirm_delete = Some(false);
                }
            }
            KeyCode::Char('r') | KeyCode::Char('R') => self.reload(services),
            KeyCode::Esc => {
                if self.show_details {
                    self.show_details = false;
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

        let details_height = if self.show_details { 7 } else { 0 };
        let layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3),
                Constraint::Min(8),
                Constraint::Length(details_height),
                Constraint::Length(2),
            ])
            .margin(1)
            .split(frame.area());

        widgets::header(frame, layout[0], "📅 APPOINTMENTS");

        let rows = self.appointments.iter().map(|a| {
            let status_color = match a.status {
                AppointmentStatus::Scheduled => widgets::INFO,
                AppointmentStatus::InProgress => widgets::WARNING,
                AppointmentStatus::Completed => widgets::SUCCESS,
                AppointmentStatus::Cancelled | AppointmentStatus::NoShow => widgets::DANGER,
            };
            Row::new(vec![
                Cell::from(a.date.to_string()),
                Cell::from(format!("{:02}:{:02}", a.time.hour(), a.time.minute())),
                Cell::from(Self::name(&self.patient_names, a.patient_id, "Patient")),
                Cell::from(Self::name(&self.doctor_names, a.doctor_id, "Doctor")),
                Cell::from(a.department.clone()),
                Cell::from(a.reason.clone()),
                Cell::from(a.status.as_str()).style(Style::default().fg(status_color)),
            ])
            .style(Style::default().fg(widgets::TEXT))
        });

        let title = format!(" {} ({}) ", self.filter_title(), self.appointments.len());
        let table = Table::new(
            rows,
            [
                Constraint::Length(11),
                Constraint::Length(6),
                Constraint::Percentage(20),
                Constraint::Percentage(20),
                Constraint::Percentage(15),
                Constraint::Percentage(25),
                Constraint::Length(12),
            ],
        )
        .header(widgets::table_header(&[
            "Date", "Time", "Patient", "Doctor", "Department", "Reason", "Status",
        ]))
        .block(widgets::panel(&title))
        .row_highlight_style(widgets::row_highlight(true))
        .highlight_symbol("► ");
        frame.render_stateful_widget(table, layout[1], &mut self.state.clone());

        if self.show_details {
            if let Some(a) = self.selected() {
                let notes = if a.notes.is_empty() {
                    "No notes"
                } else {
                    a.notes.as_str()
                };
                let details = vec![
                    Line::from(format!("Reason: {}", a.reason)),
                    Line::from(format!("Duration: {} minutes | Booked on {}", a.duration, a.created_at)),
                    Line::from(format!("Notes: {notes}")),
                ];
                frame.render_widget(
                    Paragraph::new(details)
                        .style(Style::default().fg(widgets::TEXT))
                        .block(widgets::panel(" Appointment Details "))
                        .wrap(Wrap { trim: true }),
                    layout[2],
                );
            }
        }

        frame.render_widget(
            widgets::help(
                "T: Today | W: Week | U: Upcoming | A: All | P: This patient | S: Cycle status | C: Complete | X: Cancel | D: Delete | Esc: Back",
            ),
            layout[3],
        );

        if let Some(yes) = self.confirm_delete {
            widgets::confirm_dialog(frame, "Confirm Delete", "Delete this appointment?", yes);
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

    fn press(view: &mut Appointments, services: &mut Services, code: KeyCode) {
        view.handle_input(KeyEvent::new(code, KeyModifiers::NONE), services)
            .unwrap();
    }

    #[test]
    fn opens_on_todays_appointments_in_time_order() {
        let services = seeded();
        let view = Appointments::new(&services);
        assert_eq!(view.appointments.len(), 3);
        assert!(view
            .appointments
            .windows(2)
            .all(|w| w[0].starts_at() <= w[1].starts_at()));
    }

    #[test]
    fn filters_switch_the_listing() {
        let mut services = seeded();
        let mut view = Appointments::new(&services);

        press(&mut view, &mut services, KeyCode::Char('a'));
        assert_eq!(view.appointments.len(), 8);
        press(&mut view, &mut services, KeyCode::Char('u'));
        assert!(view.appointments.iter().all(Appointment::is_open));

        let patient = view.appointments[0].patient_id;
        press(&mut view, &mut services, KeyCode::Char('p'));
        assert!(view.appointments.iter().all(|a| a.patient_id == patient));
    }

    #[test]
    fn cancel_updates_the_stored_status() {
        let mut services = seeded();
        let mut view = Appointments::new(&services);
        let id = view.appointments[0].id;

        press(&mut view, &mut services, KeyCode::Char('x'));
        assert_eq!(
            services.appointments.get(id).unwrap().status,
            AppointmentStatus::Cancelled
        );
    }

    #[test]
    fn delete_needs_a_yes() {
        let mut services = seeded();
        let mut view = Appointments::new(&services);
        press(&mut view, &mut services, KeyCode::Char('d'));
        press(&mut view, &mut services, KeyCode::Right);
        press(&mut view, &mut services, KeyCode::Enter);
        assert_eq!(view.appointments.len(), 2);
        assert_eq!(services.appointments.list().len(), 7);
    }
}
