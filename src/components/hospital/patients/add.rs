use crate::app::{Transition, View};
use crate::components::{widgets, Component};
use crate::models::{BloodGroup, Gender, PatientStatus};
use crate::notify::Level;
use crate::services::Services;
use crate::tui::Frame;
use crate::validation::{FieldErrors, PatientForm};
use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{prelude::*, widgets::*};

/// Form fields as (validation key, label). The first `COLUMN_LEN` sit in the
/// left column.
const FIELDS: [(&str, &str); 14] = [
    ("first_name", "First Name *"),
    ("last_name", "Last Name *"),
    ("date_of_birth", "Date of Birth * (YYYY-MM-DD)"),
    ("gender", "Gender * (Space to change)"),
    ("blood_group", "Blood Group * (Space to change)"),
    ("phone", "Phone *"),
    ("emergency_contact", "Emergency Contact *"),
    ("emergency_phone", "Emergency Phone *"),
    ("email", "Email"),
    ("address", "Address"),
    ("allergies", "Allergies"),
    ("medications", "Medications"),
    ("medical_history", "Medical History"),
    ("admission_status", "Status (Space to change)"),
];

const COLUMN_LEN: usize = 7;
const SUBMIT_BUTTON: usize = FIELDS.len();
const BACK_BUTTON: usize = FIELDS.len() + 1;
const FOCUS_STOPS: usize = FIELDS.len() + 2;

/// The next value after `current`, wrapping; an unset value starts at the first.
fn cycle<T: Copy + PartialEq>(all: &[T], current: Option<T>) -> T {
    let next = current
        .and_then(|value| all.iter().position(|v| *v == value))
        .map_or(0, |index| (index + 1) % all.len());
    all[next]
}

/// Patient registration form.
pub struct AddPatient {
    form: PatientForm,
    errors: FieldErrors,
    focus_index: usize,
}

impl Default for AddPatient {
    fn default() -> Self {
        Self {
            form: PatientForm::default(),
            errors: FieldErrors::default(),
            focus_index: 0,
        }
    }
}

impl AddPatient {
    pub fn new() -> Self {
        Self::default()
    }

    fn text_mut(&mut self, index: usize) -> Option<&mut String> {
        let form = &mut self.form;
        Some(match index {
            0 => &mut form.first_name,
            1 => &mut form.last_name,
            2 => &mut form.date_of_birth,
            5 => &mut form.phone,
            6 => &mut form.emergency_contact,
            7 => &mut form.emergency_phone,
            8 => &mut form.email,
            9 => &mut form.address,
            10 => &mut form.allergies,
            11 => &mut form.medications,
            12 => &mut form.medical_history,
            _ => return None,
        })
    }

    fn value(&self, index: usize) -> String {
        let form = &self.form;
        let choice = |label: Option<&'static str>| label.unwrap_or("Not selected").to_string();
        match index {
            0 => form.first_name.clone(),
            1 => form.last_name.clone(),
            2 => form.date_of_birth.clone(),
            3 => choice(form.gender.map(|g| g.as_str())),
            4 => choice(form.blood_group.map(|b| b.as_str())),
            5 => form.phone.clone(),
            6 => form.emergency_contact.clone(),
            7 => form.emergency_phone.clone(),
            8 => form.email.clone(),
            9 => form.address.clone(),
            10 => form.allergies.clone(),
            11 => form.medications.clone(),
            12 => form.medical_history.clone(),
            13 => form.admission_status.to_string(),
            _ => String::new(),
        }
    }

    /// Advances a choice field to its next value.
    fn cycle_choice(&mut self, index: usize) {
        let form = &mut self.form;
        match index {
            3 => form.gender = Some(cycle(Gender::ALL, form.gender)),
            4 => form.blood_group = Some(cycle(BloodGroup::ALL, form.blood_group)),
            13 => {
                form.admission_status = cycle(PatientStatus::ALL, Some(form.admission_status))
            }
            _ => {}
        }
    }

    fn clear_choice(&mut self, index: usize) {
        match index {
            3 => self.form.gender = None,
            4 => self.form.blood_group = None,
            _ => {}
        }
    }

    fn submit(&mut self, services: &mut Services) {
        match self.form.validate(services.clock().today()) {
            Ok(patient) => {
                if let Some(created) = services.patients.create(patient) {
                    services.notifier().success(&format!(
                        "Registered {} (ID {})",
                        created.full_name(),
                        created.id
                    ));
                    *self = Self::default();
                }
            }
            Err(errors) => {
                tracing::debug!(count = errors.len(), "patient form rejected");
                self.errors = errors;
            }
        }
    }
}

impl Component for AddPatient {
    fn handle_input(&mut self, key: KeyEvent, services: &mut Services) -> Result<Option<Transition>> {
        let index = self.focus_index;
        match key.code {
            KeyCode::Char(c) => match self.text_mut(index) {
                Some(text) => text.push(c),
                None if c == ' ' => self.cycle_choice(index),
                None => {}
            },
            KeyCode::Backspace => match self.text_mut(index) {
                Some(text) => {
                    text.pop();
                }
                None => self.clear_choice(index),
            },
            KeyCode::Tab => {
                self.focus_index = if index < SUBMIT_BUTTON {
                    SUBMIT_BUTTON
                } else if index == SUBMIT_BUTTON {
                    BACK_BUTTON
                } else {
                    0
                };
            }
            KeyCode::Down => self.focus_index = (index + 1) % FOCUS_STOPS,
            KeyCode::Up => self.focus_index = (index + FOCUS_STOPS - 1) % FOCUS_STOPS,
            KeyCode::Left if (COLUMN_LEN..FIELDS.len()).contains(&index) => {
                self.focus_index = index - COLUMN_LEN;
            }
            KeyCode::Right if index < COLUMN_LEN => {
                self.focus_index = (index + COLUMN_LEN).min(FIELDS.len() - 1);
            }
            KeyCode::Esc => return Ok(Some(Transition::Open(View::Patients))),
            KeyCode::Enter => match index {
                BACK_BUTTON => return Ok(Some(Transition::Open(View::Patients))),
                SUBMIT_BUTTON => self.submit(services),
                _ => self.focus_index = (index + 1) % FOCUS_STOPS,
            },
            _ => {}
        }
        Ok(None)
    }

    fn render(&self, frame: &mut Frame) {
        widgets::background(frame);

        let main_layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3),
                Constraint::Min(22),
                Constraint::Length(1),
                Constraint::Length(1),
                Constraint::Length(2),
                Constraint::Length(2),
            ])
            .margin(1)
            .split(frame.area());

        widgets::header(frame, main_layout[0], "🏥 PATIENT REGISTRATION");

        let body_block = widgets::panel(" New Patient ");
        let body = body_block.inner(main_layout[1]);
        frame.render_widget(body_block, main_layout[1]);

        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
            .spacing(2)
            .margin(1)
            .split(body);

        for (column, fields) in columns.iter().zip([0..COLUMN_LEN, COLUMN_LEN..FIELDS.len()]) {
            let rows = Layout::default()
                .direction(Direction::Vertical)
                .constraints(vec![Constraint::Length(3); COLUMN_LEN])
                .split(*column);
            for (row, index) in rows.iter().zip(fields) {
                let (key, label) = FIELDS[index];
                let value = self.value(index);
                frame.render_widget(
                    widgets::input(label, &value, self.focus_index == index, self.errors.get(key)),
                    *row,
                );
            }
        }

        if !self.errors.is_empty() {
            let summary = format!("Please fix {} field(s) before submitting", self.errors.len());
            frame.render_widget(widgets::message(&summary, Level::Error), main_layout[2]);
        }

        frame.render_widget(
            widgets::help("↑↓: Move | ←→: Switch column | Space: Change choice | Tab: Buttons | Esc: Back"),
            main_layout[3],
        );
        frame.render_widget(
            widgets::button(
                "Submit",
                self.focus_index == SUBMIT_BUTTON,
                widgets::SUCCESS,
            ),
            main_layout[4],
        );
        frame.render_widget(
            widgets::button("Back", self.focus_index == BACK_BUTTON, widgets::INFO),
            main_layout[5],
        );
    }
}
