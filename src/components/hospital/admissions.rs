use crate::app::Transition;
use crate::components::{widgets, Component};
use crate::models::{Admission, AdmissionStatus, AdmissionUpdate, Change, DischargeDetails};
use crate::services::Services;
use crate::tui::Frame;
use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{prelude::*, widgets::*};
use std::collections::HashMap;

/// Statuses an admitted patient moves between before discharge.
const CARE_STATUSES: [AdmissionStatus; 3] = [
    AdmissionStatus::Active,
    AdmissionStatus::Stable,
    AdmissionStatus::Critical,
];

fn status_color(status: AdmissionStatus) -> Color {
    match status {
        AdmissionStatus::Critical => widgets::DANGER,
        AdmissionStatus::Active => widgets::WARNING,
        AdmissionStatus::Stable => widgets::SUCCESS,
        AdmissionStatus::Discharged => widgets::HELP,
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Mode {
    Table,
    Search,
    /// Discharging the selected admission, with the notes typed so far.
    Discharge(String),
}

pub struct Admissions {
    admissions: Vec<Admission>,
    patient_names: HashMap<u64, String>,
    department_names: HashMap<u64, String>,
    doctor_names: HashMap<u64, String>,
    show_discharged: bool,
    search: String,
    mode: Mode,
    state: TableState,
}

impl Admissions {
    pub fn new(services: &Services) -> Self {
        let mut view = Self {
            admissions: Vec::new(),
            patient_names: services
                .patients
                .list()
                .into_iter()
                .map(|p| (p.id, p.full_name()))
                .collect(),
            department_names: services
                .departments
                .list()
                .into_iter()
                .map(|d| (d.id, d.name))
                .collect(),
            doctor_names: services
                .staff
                .list()
                .into_iter()
                .map(|s| (s.id, s.full_name()))
                .collect(),
            show_discharged: false,
            search: String::new(),
            mode: Mode::Table,
            state: TableState::default(),
        };
        view.reload(services);
        view
    }

    fn reload(&mut self, services: &Services) {
        let mut admissions = if self.search.trim().is_empty() && !self.show_discharged {
            services.admissions.active()
        } else {
            services.admissions.search(&self.search)
        };
        if !self.show_discharged {
            admissions.retain(Admission::is_active);
        }
        // Newest first; discharged stays sink to the bottom.
        admissions.sort_by(|a, b| {
            b.is_active()
                .cmp(&a.is_active())
                .then(b.admission_date.cmp(&a.admission_date))
        });
        self.admissions = admissions;
        widgets::clamp_selection(&mut self.state, self.admissions.len());
    }

    fn selected(&self) -> Option<&Admission> {
        self.state.selected().and_then(|i| self.admissions.get(i))
    }

    fn lookup(names: &HashMap<u64, String>, id: u64) -> String {
        names.get(&id).cloned().unwrap_or_else(|| format!("#{id}"))
    }

    fn cycle_status(&mut self, services: &mut Services) {
        let Some(admission) = self.selected().filter(|a| a.is_active()) else {
            return;
        };
        let index = CARE_STATUSES
            .iter()
            .position(|s| *s == admission.status)
            .unwrap_or(0);
        let next = CARE_STATUSES[(index + 1) % CARE_STATUSES.len()];
        let update = AdmissionUpdate {
            status: Change::Set(next),
            ..Default::default()
        };
        if services.admissions.update(admission.id, update).is_some() {
            services
                .notifier()
                .success(&format!("Bed {} is now {}", admission.bed_number, next));
        }
        self.reload(services);
    }

    fn discharge(&mut self, services: &mut Services, notes: String) {
        let Some(id) = self.selected().map(|a| a.id) else {
            return;
        };
        let notes = notes.trim().to_string();
        let details = DischargeDetails {
            notes: (!notes.is_empty()).then_some(notes),
            diagnosis: None,
        };
        if let Some(discharged) = services.admissions.discharge(id, details) {
            let name = Self::lookup(&self.patient_names, discharged.patient_id);
            services
                .notifier()
                .success(&format!("{name} discharged from bed {}", discharged.bed_number));
        }
        self.reload(services);
    }

    fn handle_discharge(&mut self, key: KeyEvent, services: &mut Services, mut notes: String) {
        match key.code {
            KeyCode::Char(c) => {
                notes.push(c);
                self.mode = Mode::Discharge(notes);
            }
            KeyCode::Backspace => {
                notes.pop();
                self.mode = Mode::Discharge(notes);
            }
            KeyCode::Enter => {
                self.mode = Mode::Table;
                self.discharge(services, notes);
            }
            KeyCode::Esc => self.mode = Mode::Table,
            _ => self.mode = Mode::Discharge(notes),
        }
    }

    fn render_discharge(&self, frame: &mut Frame, notes: &str) {
        let Some(admission) = self.selected() else {
            return;
        };
        let area = widgets::centered(frame.area(), 64, 10);
        frame.render_widget(Clear, area);
        let block = widgets::panel(" Discharge Patient ");
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(2),
                Constraint::Length(3),
                Constraint::Length(1),
            ])
            .horizontal_margin(1)
            .split(inner);

        let summary = format!(
            "{} | bed {} | {}",
            Self::lookup(&self.patient_names, admission.patient_id),
            admission.bed_number,
            admission.diagnosis
        );
        frame.render_widget(
            Paragraph::new(summary)
                .style(Style::default().fg(widgets::TEXT))
                .wrap(Wrap { trim: true }),
            rows[0],
        );
        frame.render_widget(widgets::input("Discharge notes", notes, true, None), rows[1]);
        frame.render_widget(widgets::help("Enter: Discharge | Esc: Cancel"), rows[2]);
    }
}

impl Component for Admissions {
    fn handle_input(&mut self, key: KeyEvent, services: &mut Services) -> Result<Option<Transition>> {
        match std::mem::replace(&mut self.mode, Mode::Table) {
            Mode::Discharge(notes) => {
                self.handle_discharge(key, services, notes);
                return Ok(None);
            }
            Mode::Search => {
                match key.code {
                    KeyCode::Char(c) => {
                        self.search.push(c);
                        self.mode = Mode::Search;
                    }
                    KeyCode::Backspace => {
                        self.search.pop();
                        self.mode = Mode::Search;
                    }
                    KeyCode::Esc => self.search.clear(),
                    KeyCode::Enter | KeyCode::Down => {}
                    _ => self.mode = Mode::Search,
                }
                self.reload(services);
                return Ok(None);
            }
            Mode::Table => {}
        }

        match key.code {
            KeyCode::Down => widgets::step_selection(&mut self.state, self.admissions.len(), 1),
            KeyCode::Up => widgets::step_selection(&mut self.state, self.admissions.len(), -1),
            KeyCode::Char('/') => self.mode = Mode::Search,
            KeyCode::Char('h') | KeyCode::Char('H') => {
                self.show_discharged = !self.show_discharged;
                self.reload(services);
            }
            KeyCode::Char('s') | KeyCode::Char('S') => self.cycle_status(services),
            KeyCode::Char('x') | KeyCode::Char('X') => {
                if self.selected().is_some_and(Admission::is_active) {
                    self.mode = Mode::Discharge(String::new());
                }
            }
            KeyCode::Char('r') | KeyCode::Char('R') => self.reload(services),
            KeyCode::Esc => {
                if self.search.is_empty() {
                    return Ok(Some(Transition::Home));
                }
                self.search.clear();
                self.reload(services);
            }
            _ => {}
        }
        Ok(None)
    }

    fn render(&self, frame: &mut Frame) {
        widgets::background(frame);

        let layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3),
                Constraint::Length(3),
                Constraint::Min(8),
                Constraint::Length(2),
            ])
            .margin(1)
            .split(frame.area());

        widgets::header(frame, layout[0], "🛏 ADMISSIONS");

        let searching = self.mode == Mode::Search;
        let search_label = if searching {
            "Search bed or diagnosis (Enter to finish)"
        } else {
            "Search (/)"
        };
        frame.render_widget(
            widgets::input(search_label, &self.search, searching, None),
            layout[1],
        );

        let rows = self.admissions.iter().map(|a| {
            let discharge = match (a.actual_discharge, a.estimated_discharge) {
                (Some(actual), _) => actual.to_string(),
                (None, Some(estimated)) => format!("~{estimated}"),
                (None, None) => "-".to_string(),
            };
            Row::new(vec![
                Cell::from(a.bed_number.clone()),
                Cell::from(Self::lookup(&self.patient_names, a.patient_id)),
                Cell::from(Self::lookup(&self.department_names, a.department_id)),
                Cell::from(Self::lookup(&self.doctor_names, a.attending_doctor_id)),
                Cell::from(a.diagnosis.clone()),
                Cell::from(a.admission_date.to_string()),
                Cell::from(discharge),
                Cell::from(a.status.as_str()).style(Style::default().fg(status_color(a.status))),
            ])
            .style(Style::default().fg(widgets::TEXT))
        });

        let title = if self.show_discharged {
            format!(" All admissions ({}) ", self.admissions.len())
        } else {
            format!(" Current admissions ({}) ", self.admissions.len())
        };
        let focused = self.mode == Mode::Table;
        let table = Table::new(
            rows,
            [
                Constraint::Length(7),
                Constraint::Percentage(18),
                Constraint::Percentage(14),
                Constraint::Percentage(16),
                Constraint::Percentage(20),
                Constraint::Length(11),
                Constraint::Length(12),
                Constraint::Length(10),
            ],
        )
        .header(widgets::table_header(&[
            "Bed",
            "Patient",
            "Department",
            "Doctor",
            "Diagnosis",
            "Admitted",
            "Discharge",
            "Status",
        ]))
        .block(widgets::panel(&title))
        .row_highlight_style(widgets::row_highlight(focused))
        .highlight_symbol(if focused { "► " } else { "  " });
        frame.render_stateful_widget(table, layout[2], &mut self.state.clone());

        frame.render_widget(
            widgets::help(
                "↑↓: Navigate | S: Change status | X: Discharge | H: Show discharged | /: Search | Esc: Back",
            ),
            layout[3],
        );

        if let Mode::Discharge(notes) = &self.mode {
            self.render_discharge(frame, notes);
        }
    }
}
