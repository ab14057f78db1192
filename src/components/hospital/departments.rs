//! Department bed capacity: occupancy table, bed adjustments and a small
//! form for adding departments.

use crate::app::Transition;
use crate::components::{widgets, Component};
use crate::models::{Change, Department, DepartmentUpdate, OccupancyLevel};
use crate::notify::Level;
use crate::services::Services;
use crate::tui::Frame;
use crate::validation::{DepartmentForm, FieldErrors};
use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{prelude::*, widgets::*};

const FORM_FIELDS: [(&str, &str); 6] = [
    ("name", "Name *"),
    ("floor", "Floor"),
    ("head_of_department", "Head of Department"),
    ("phone", "Phone"),
    ("total_beds", "Total Beds"),
    ("occupied_beds", "Occupied Beds"),
];

fn level_color(level: OccupancyLevel) -> Color {
    match level {
        OccupancyLevel::Normal => widgets::SUCCESS,
        OccupancyLevel::High => widgets::WARNING,
        OccupancyLevel::Critical => widgets::DANGER,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Table,
    Search,
    Add,
    ConfirmDelete(bool),
}

pub struct Departments {
    departments: Vec<Department>,
    search: String,
    free_beds_only: bool,
    mode: Mode,
    form: DepartmentForm,
    form_focus: usize,
    form_errors: FieldErrors,
    state: TableState,
}

impl Departments {
    pub fn new(services: &Services) -> Self {
        let mut view = Self {
            departments: Vec::new(),
            search: String::new(),
            free_beds_only: false,
            mode: Mode::Table,
            form: DepartmentForm::default(),
            form_focus: 0,
            form_errors: FieldErrors::default(),
            state: TableState::default(),
        };
        view.reload(services);
        view
    }

    fn reload(&mut self, services: &Services) {
        self.departments = if self.free_beds_only {
            let mut free = services.departments.with_free_beds();
            let needle = self.search.trim().to_lowercase();
            free.retain(|d| {
                d.name.to_lowercase().contains(&needle)
                    || d.head_of_department.to_lowercase().contains(&needle)
            });
            free
        } else {
            services.departments.search(&self.search)
        };
        widgets::clamp_selection(&mut self.state, self.departments.len());
    }

    fn selected(&self) -> Option<&Department> {
        self.state.selected().and_then(|i| self.departments.get(i))
    }

    /// Occupies (`delta` > 0) or frees beds of the selected department,
    /// staying within its capacity.
    fn adjust_beds(&mut self, services: &mut Services, delta: i64) {
        let Some(department) = self.selected() else {
            return;
        };
        let occupied = (i64::from(department.occupied_beds) + delta)
            .clamp(0, i64::from(department.total_beds)) as u32;
        if occupied == department.occupied_beds {
            services.notifier().notify(
                Level::Warning,
                &format!("{} has no beds to adjust that way", department.name),
            );
            return;
        }
        let update = DepartmentUpdate {
            occupied_beds: Change::Set(occupied),
            ..Default::default()
        };
        let (id, name) = (department.id, department.name.clone());
        if let Some(updated) = services.departments.update(id, update) {
            services.notifier().success(&format!(
                "{name}: {} of {} beds occupied",
                updated.occupied_beds, updated.total_beds
            ));
        }
        self.reload(services);
    }

    fn field_mut(&mut self, index: usize) -> Option<&mut String> {
        let form = &mut self.form;
        Some(match index {
            0 => &mut form.name,
            1 => &mut form.floor,
            2 => &mut form.head_of_department,
            3 => &mut form.phone,
            4 => &mut form.total_beds,
            5 => &mut form.occupied_beds,
            _ => return None,
        })
    }

    fn field(&self, index: usize) -> &str {
        let form = &self.form;
        match index {
            0 => form.name.as_str(),
            1 => form.floor.as_str(),
            2 => form.head_of_department.as_str(),
            3 => form.phone.as_str(),
            4 => form.total_beds.as_str(),
            5 => form.occupied_beds.as_str(),
            _ => "",
        }
    }

    fn submit(&mut self, services: &mut Services) {
        match self.form.validate() {
            Ok(department) => {
                if let Some(created) = services.departments.create(department) {
                    services
                        .notifier()
                        .success(&format!("Added department {}", created.name));
                    self.close_form();
                    self.reload(services);
                }
            }
            Err(errors) => self.form_errors = errors,
        }
    }

    fn close_form(&mut self) {
        self.form = DepartmentForm::default();
        self.form_errors = FieldErrors::default();
        self.form_focus = 0;
        self.mode = Mode::Table;
    }

    fn handle_form(&mut self, key: KeyEvent, services: &mut Services) {
        let index = self.form_focus;
        match key.code {
            KeyCode::Char(c) => {
                if let Some(field) = self.field_mut(index) {
                    field.push(c);
                }
            }
            KeyCode::Backspace => {
                if let Some(field) = self.field_mut(index) {
                    field.pop();
                }
            }
            KeyCode::Down | KeyCode::Tab => self.form_focus = (index + 1) % FORM_FIELDS.len(),
            KeyCode::Up | KeyCode::BackTab => {
                self.form_focus = (index + FORM_FIELDS.len() - 1) % FORM_FIELDS.len()
            }
            KeyCode::Enter => self.submit(services),
            KeyCode::Esc => self.close_form(),
            _ => {}
        }
    }

    fn render_form(&self, frame: &mut Frame) {
        let area = widgets::centered(frame.area(), 60, 23);
        frame.render_widget(Clear, area);
        let block = widgets::panel(" New Department ");
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let mut constraints = vec![Constraint::Length(3); FORM_FIELDS.len()];
        constraints.push(Constraint::Length(1));
        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints(constraints)
            .horizontal_margin(1)
            .split(inner);

        for (index, (key, label)) in FORM_FIELDS.iter().enumerate() {
            frame.render_widget(
                widgets::input(
                    label,
                    self.field(index),
                    self.form_focus == index,
                    self.form_errors.get(key),
                ),
                rows[index],
            );
        }
        frame.render_widget(
            widgets::help("Enter: Save | ↑↓: Move | Esc: Cancel"),
            rows[FORM_FIELDS.len()],
        );
    }
}

impl Component for Departments {
    fn handle_input(&mut self, key: KeyEvent, services: &mut Services) -> Result<Option<Transition>> {
        match self.mode {
            Mode::Add => {
                self.handle_form(key, services);
                return Ok(None);
            }
            Mode::Search => {
                match key.code {
                    KeyCode::Char(c) => self.search.push(c),
                    KeyCode::Backspace => {
                        self.search.pop();
                    }
                    KeyCode::Esc => {
                        self.search.clear();
                        self.mode = Mode::Table;
                    }
                    KeyCode::Enter | KeyCode::Down => self.mode = Mode::Table,
                    _ => return Ok(None),
                }
                self.reload(services);
                return Ok(None);
            }
            Mode::ConfirmDelete(yes) => {
                match key.code {
                    KeyCode::Left | KeyCode::Right | KeyCode::Tab => {
                        self.mode = Mode::ConfirmDelete(!yes)
                    }
                    KeyCode::Enter => {
                        self.mode = Mode::Table;
                        if let Some((id, name)) = self
                            .selected()
                            .filter(|_| yes)
                            .map(|d| (d.id, d.name.clone()))
                        {
                            if services.departments.delete(id) {
                                services.notifier().success(&format!("Deleted {name}"));
                            }
                            self.reload(services);
                        }
                    }
                    KeyCode::Esc => self.mode = Mode::Table,
                    _ => {}
                }
                return Ok(None);
            }
            Mode::Table => {}
        }

        match key.code {
            KeyCode::Down => widgets::step_selection(&mut self.state, self.departments.len(), 1),
            KeyCode::Up => widgets::step_selection(&mut self.state, self.departments.len(), -1),
            KeyCode::Char('/') => self.mode = Mode::Search,
            KeyCode::Char('a') | KeyCode::Char('A') => self.mode = Mode::Add,
            KeyCode::Char('f') | KeyCode::Char('F') => {
                self.free_beds_only = !self.free_beds_only;
                self.reload(services);
            }
            KeyCode::Char('+') | KeyCode::Char('=') => self.adjust_beds(services, 1),
            KeyCode::Char('-') => self.adjust_beds(services, -1),
            KeyCode::Char('d') | KeyCode::Char('D') | KeyCode::Delete => {
                if self.selected().is_some() {
                    self.mode = Mode::ConfirmDelete(false);
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
                Constraint::Length(3),
                Constraint::Length(2),
            ])
            .margin(1)
            .split(frame.area());

        widgets::header(frame, layout[0], "🏨 DEPARTMENTS");

        let searching = self.mode == Mode::Search;
        let search_label = if searching {
            "Search name or head (Enter to finish)"
        } else {
            "Search (/)"
        };
        frame.render_widget(
            widgets::input(search_label, &self.search, searching, None),
            layout[1],
        );

        let rows = self.departments.iter().map(|d| {
            let color = level_color(d.occupancy_level());
            Row::new(vec![
                Cell::from(d.name.clone()),
                Cell::from(d.floor.clone()),
                Cell::from(d.head_of_department.clone()),
                Cell::from(d.phone.clone()),
                Cell::from(format!("{}/{}", d.occupied_beds, d.total_beds)),
                Cell::from(d.available_beds().to_string()),
                Cell::from(format!("{}%", d.occupancy_percent())).style(Style::default().fg(color)),
            ])
            .style(Style::default().fg(widgets::TEXT))
        });

        let title = if self.free_beds_only {
            format!(" Departments with free beds ({}) ", self.departments.len())
        } else {
            format!(" Departments ({}) ", self.departments.len())
        };
        let focused = self.mode == Mode::Table;
        let table = Table::new(
            rows,
            [
                Constraint::Percentage(20),
                Constraint::Length(8),
                Constraint::Percentage(25),
                Constraint::Length(10),
                Constraint::Length(8),
                Constraint::Length(6),
                Constraint::Length(10),
            ],
        )
        .header(widgets::table_header(&[
            "Name",
            "Floor",
            "Head",
            "Phone",
            "Beds",
            "Free",
            "Occupancy",
        ]))
        .block(widgets::panel(&title))
        .row_highlight_style(widgets::row_highlight(focused))
        .highlight_symbol(if focused { "► " } else { "  " });
        frame.render_stateful_widget(table, layout[2], &mut self.state.clone());

        if let Some(d) = self.selected() {
            let title = format!(" {} occupancy ", d.name);
            let gauge = Gauge::default()
                .block(widgets::panel(&title))
                .gauge_style(Style::default().fg(level_color(d.occupancy_level())))
                .percent(d.occupancy_percent().min(100) as u16)
                .label(format!("{} of {} beds", d.occupied_beds, d.total_beds));
            frame.render_widget(gauge, layout[3]);
        }

        frame.render_widget(
            widgets::help(
                "↑↓: Navigate | +/-: Occupy/free bed | F: Free beds only | A: Add | D: Delete | /: Search | Esc: Back",
            ),
            layout[4],
        );

        match self.mode {
            Mode::Add => self.render_form(frame),
            Mode::ConfirmDelete(yes) => {
                let message = self
                    .selected()
                    .map(|d| format!("Delete {}?", d.name))
                    .unwrap_or_else(|| "Delete this department?".to_string());
                widgets::confirm_dialog(frame, "Confirm Delete", &message, yes);
            }
            Mode::Table | Mode::Search => {}
        }
    }
}
