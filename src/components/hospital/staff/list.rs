//! Staff directory for the Hospital application.
//!
//! This module lists every staff member and supports:
//! - Searching by name, role, department or email
//! - Narrowing the list by department and by availability
//! - Changing a staff member's availability in place
//! - Viewing the contact details of the selected staff member

use crate::app::Transition;
use crate::components::{widgets, Component};
use crate::models::{Availability, Change, StaffMember, StaffUpdate};
use crate::services::Services;
use crate::tui::Frame;
use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{prelude::*, widgets::*};

/// Color used for an availability badge.
fn availability_color(availability: Availability) -> Color {
    match availability {
        Availability::Available => widgets::SUCCESS,
        Availability::Busy => widgets::WARNING,
        Availability::OnCall => widgets::INFO,
        Availability::OffDuty => widgets::HELP,
    }
}

/// Component for browsing the hospital staff.
pub struct StaffDirectory {
    /// Staff members matching the current search and filters
    staff: Vec<StaffMember>,
    /// Department names offered by the department filter
    departments: Vec<String>,
    /// Index into `departments`; `None` shows every department
    department_filter: Option<usize>,
    availability_filter: Option<Availability>,
    search: String,
    searching: bool,
    show_details: bool,
    state: TableState,
}

impl StaffDirectory {
    /// Creates the directory and loads the staff list.
    ///
    /// The department filter offers the names of the stored departments.
    pub fn new(services: &Services) -> Self {
        let mut directory = Self {
            staff: Vec::new(),
            departments: services
                .departments
                .list()
                .into_iter()
                .map(|d| d.name)
                .collect(),
            department_filter: None,
            availability_filter: None,
            search: String::new(),
            searching: false,
            show_details: false,
            state: TableState::default(),
        };
        directory.fetch_staff(services);
        directory
    }

    fn department(&self) -> Option<&str> {
        self.department_filter
            .and_then(|i| self.departments.get(i))
            .map(String::as_str)
    }

    /// Reloads the list through the narrowest service query for the current
    /// search and filters, then applies the remaining filters.
    ///
    /// The selection is kept where possible.
    fn fetch_staff(&mut self, services: &Services) {
        let department = self.department().map(str::to_owned);
        let mut staff = if !self.search.trim().is_empty() {
            services.staff.search(&self.search)
        } else if let Some(department) = &department {
            services.staff.by_department(department)
        } else if let Some(availability) = self.availability_filter {
            services.staff.by_availability(availability)
        } else {
            services.staff.list()
        };

        staff.retain(|member| {
            department.as_ref().map_or(true, |d| &member.department == d)
                && self
                    .availability_filter
                    .map_or(true, |a| member.availability_status == a)
        });
        staff.sort_by(|a, b| a.last_name.cmp(&b.last_name));

        self.staff = staff;
        widgets::clamp_selection(&mut self.state, self.staff.len());
        if self.staff.is_empty() {
            self.show_details = false;
        }
    }

    fn selected_member(&self) -> Option<&StaffMember> {
        self.state.selected().and_then(|i| self.staff.get(i))
    }

    /// Steps the department filter through "All" and each department.
    fn step_department(&mut self, step: isize, services: &Services) {
        // Position 0 stands for "All".
        let stops = self.departments.len() as isize + 1;
        let current = self.department_filter.map_or(0, |i| i as isize + 1);
        let next = (current + step).rem_euclid(stops);
        self.department_filter = (next > 0).then(|| next as usize - 1);
        self.fetch_staff(services);
    }

    /// Steps the availability filter through "All" and each availability.
    fn cycle_availability_filter(&mut self, services: &Services) {
        let all = Availability::ALL;
        self.availability_filter = match self.availability_filter {
            None => Some(all[0]),
            Some(current) => all
                .iter()
                .position(|a| *a == current)
                .and_then(|i| all.get(i + 1))
                .copied(),
        };
        self.fetch_staff(services);
    }

    /// Moves the selected member to the next availability.
    fn cycle_availability(&mut self, services: &mut Services) {
        let Some(member) = self.selected_member() else {
            return;
        };
        let all = Availability::ALL;
        let index = all
            .iter()
            .position(|a| *a == member.availability_status)
            .unwrap_or(0);
        let next = all[(index + 1) % all.len()];
        let update = StaffUpdate {
            availability_status: Change::Set(next),
            ..Default::default()
        };
        if let Some(updated) = services.staff.update(member.id, update) {
            services
                .notifier()
                .success(&format!("{} is now {}", updated.full_name(), next));
        }
        self.fetch_staff(services);
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
        self.fetch_staff(services);
    }

    fn filter_summary(&self) -> String {
        let availability = self
            .availability_filter
            .map_or("All", |a| a.as_str());
        format!(
            "Department: {} | Availability: {}",
            self.department().unwrap_or("All"),
            availability
        )
    }

    fn details(member: &StaffMember) -> Vec<Line<'static>> {
        let field = |label: &str, value: String| {
            Line::from(vec![
                Span::styled(format!("{label}: "), Style::default().fg(widgets::HELP)),
                Span::styled(value, Style::default().fg(widgets::TEXT)),
            ])
        };
        let specialization = if member.specialization.is_empty() {
            "General".to_string()
        } else {
            member.specialization.clone()
        };
        vec![
            field("Role", format!("{} | {}", member.role, specialization)),
            field("Department", member.department.clone()),
            field("Phone", member.phone.clone()),
            field("Email", member.email.clone()),
            field("Working hours", member.working_hours.clone()),
            field("Joined", member.join_date.to_string()),
        ]
    }
}

impl Component for StaffDirectory {
    fn handle_input(&mut self, key: KeyEvent, services: &mut Services) -> Result<Option<Transition>> {
        if self.searching {
            self.handle_search_input(key, services);
            return Ok(None);
        }

        match key.code {
            KeyCode::Down => widgets::step_selection(&mut self.state, self.staff.len(), 1),
            KeyCode::Up => widgets::step_selection(&mut self.state, self.staff.len(), -1),
            KeyCode::Right => self.step_department(1, services),
            KeyCode::Left => self.step_department(-1, services),
            KeyCode::Enter => {
                if self.selected_member().is_some() {
                    self.show_details = !self.show_details;
                }
            }
            KeyCode::Char('/') => self.searching = true,
            KeyCode::Char('v') | KeyCode::Char('V') => self.cycle_availability_filter(services),
            KeyCode::Char('s') | KeyCode::Char('S') => self.cycle_availability(services),
            KeyCode::Char('r') | KeyCode::Char('R') => self.fetch_staff(services),
            KeyCode::Char('b') | KeyCode::Char('B') => return Ok(Some(Transition::Home)),
            KeyCode::Esc => {
                if self.show_details {
                    self.show_details = false;
                } else if !self.search.is_empty() {
                    self.search.clear();
                    self.fetch_staff(services);
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

        let details_height = if self.show_details { 8 } else { 0 };
        let layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3),
                Constraint::Length(3),
                Constraint::Length(1),
                Constraint::Min(8),
                Constraint::Length(details_height),
                Constraint::Length(2),
            ])
            .margin(1)
            .split(frame.area());

        widgets::header(frame, layout[0], "🩺 STAFF DIRECTORY");

        let search_label = if self.searching {
            "Search (Enter to finish)"
        } else {
            "Search (/)"
        };
        frame.render_widget(
            widgets::input(search_label, &self.search, self.searching, None),
            layout[1],
        );
        frame.render_widget(
            Paragraph::new(self.filter_summary())
                .style(Style::default().fg(widgets::MUTED))
                .alignment(Alignment::Center),
            layout[2],
        );

        let rows = self.staff.iter().map(|member| {
            let availability = member.availability_status;
            Row::new(vec![
                Cell::from(member.id.to_string()),
                Cell::from(member.full_name()),
                Cell::from(member.role.clone()),
                Cell::from(member.department.clone()),
                Cell::from(member.phone.clone()),
                Cell::from(availability.as_str())
                    .style(Style::default().fg(availability_color(availability))),
            ])
            .style(Style::default().fg(widgets::TEXT))
        });

        let focused = !self.searching;
        let title = format!(" Staff ({}) ", self.staff.len());
        let table = Table::new(
            rows,
            [
                Constraint::Length(5),
                Constraint::Percentage(25),
                Constraint::Percentage(15),
                Constraint::Percentage(20),
                Constraint::Percentage(15),
                Constraint::Length(10),
            ],
        )
        .header(widgets::table_header(&[
            "ID",
            "Name",
            "Role",
            "Department",
            "Phone",
            "Status",
        ]))
        .block(widgets::panel(&title))
        .row_highlight_style(widgets::row_highlight(focused))
        .highlight_symbol(if focused { "► " } else { "  " });
        frame.render_stateful_widget(table, layout[3], &mut self.state.clone());

        if self.show_details {
            if let Some(member) = self.selected_member() {
                let title = format!(" {} ", member.full_name());
                frame.render_widget(
                    Paragraph::new(Self::details(member))
                        .block(widgets::panel(&title))
                        .wrap(Wrap { trim: true }),
                    layout[4],
                );
            }
        }

        frame.render_widget(
            widgets::help(
                "↑↓: Navigate | ←→: Department | V: Availability filter | S: Change availability | Enter: Details | /: Search | Esc: Back",
            ),
            layout[5],
        );
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

    fn press(directory: &mut StaffDirectory, services: &mut Services, code: KeyCode) {
        directory
            .handle_input(KeyEvent::new(code, KeyModifiers::NONE), services)
            .unwrap();
    }

    #[test]
    fn lists_everyone_by_last_name() {
        let services = seeded();
        let directory = StaffDirectory::new(&services);
        assert_eq!(directory.staff.len(), 8);
        assert_eq!(directory.staff[0].last_name, "Brooks");
    }

    #[test]
    fn department_and_availability_filters_combine() {
        let mut services = seeded();
        let mut directory = StaffDirectory::new(&services);

        // Departments are offered by name: Cardiology first.
        press(&mut directory, &mut services, KeyCode::Right);
        assert_eq!(directory.department(), Some("Cardiology"));
        assert_eq!(directory.staff.len(), 2);

        press(&mut directory, &mut services, KeyCode::Char('v'));
        press(&mut directory, &mut services, KeyCode::Char('v'));
        assert_eq!(directory.availability_filter, Some(Availability::Busy));
        let names: Vec<String> = directory.staff.iter().map(StaffMember::full_name).collect();
        assert_eq!(names, ["James Okafor"]);

        press(&mut directory, &mut services, KeyCode::Left);
        assert_eq!(directory.department(), None);
        assert_eq!(directory.staff.len(), 2);
    }

    #[test]
    fn search_matches_roles() {
        let mut services = seeded();
        let mut directory = StaffDirectory::new(&services);
        press(&mut directory, &mut services, KeyCode::Char('/'));
        for c in "nurse".chars() {
            press(&mut directory, &mut services, KeyCode::Char(c));
        }
        press(&mut directory, &mut services, KeyCode::Enter);
        assert_eq!(directory.staff.len(), 2);
        assert!(!directory.searching);
    }

    #[test]
    fn availability_changes_are_saved() {
        let mut services = seeded();
        let mut directory = StaffDirectory::new(&services);
        let member = directory.selected_member().cloned().unwrap();
        assert_eq!(member.availability_status, Availability::Available);

        press(&mut directory, &mut services, KeyCode::Char('s'));
        assert_eq!(
            services.staff.get(member.id).unwrap().availability_status,
            Availability::Busy
        );
    }

    #[test]
    fn escape_clears_search_before_leaving() {
        let mut services = seeded();
        let mut directory = StaffDirectory::new(&services);
        directory.search = "okafor".into();
        directory.fetch_staff(&services);

        let first = directory
            .handle_input(KeyEvent::new(KeyCode::Esc, KeyModifiers::NONE), &mut services)
            .unwrap();
        assert_eq!(first, None);
        assert_eq!(directory.staff.len(), 8);
        let second = directory
            .handle_input(KeyEvent::new(KeyCode::Esc, KeyModifiers::NONE), &mut services)
            .unwrap();
        assert_eq!(second, Some(Transition::Home));
    }
}
