use crate::app::Transition;
use crate::components::{widgets, Component};
use crate::models::AdmissionStatus;
use crate::refresh::RefreshSchedule;
use crate::services::{DashboardSnapshot, Services};
use crate::tui::Frame;
use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{prelude::*, widgets::*};
use std::collections::HashMap;
use std::time::{Duration, Instant};

/// Hospital-wide figures with the next appointments and current admissions.
pub struct Dashboard {
    snapshot: DashboardSnapshot,
    patient_names: HashMap<u64, String>,
    schedule: RefreshSchedule,
}

impl Dashboard {
    pub fn new(services: &Services, refresh_interval: Duration) -> Self {
        let mut schedule = RefreshSchedule::new(refresh_interval);
        schedule.start(Instant::now());
        let mut dashboard = Self {
            snapshot: DashboardSnapshot::default(),
            patient_names: HashMap::new(),
            schedule,
        };
        dashboard.reload(services);
        dashboard
    }

    fn reload(&mut self, services: &Services) {
        self.snapshot = services.dashboard();
        self.patient_names = services
            .patients
            .list()
            .into_iter()
            .map(|p| (p.id, p.full_name()))
            .collect();
    }

    fn patient_name(&self, id: u64) -> String {
        self.patient_names
            .get(&id)
            .cloned()
            .unwrap_or_else(|| format!("Patient #{id}"))
    }

    fn stat_card<'a>(title: &'a str, value: String, accent: Color) -> Paragraph<'a> {
        Paragraph::new(vec![
            Line::from(Span::styled(
                value,
                Style::default().fg(accent).add_modifier(Modifier::BOLD),
            )),
            Line::from(Span::styled(title, Style::default().fg(widgets::MUTED))),
        ])
        .alignment(Alignment::Center)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_type(BorderType::Rounded)
                .border_style(Style::default().fg(widgets::BORDER))
                .style(Style::default().bg(widgets::PANEL)),
        )
    }
}

impl Component for Dashboard {
    fn handle_input(&mut self, key: KeyEvent, services: &mut Services) -> Result<Option<Transition>> {
        match key.code {
            KeyCode::Char('r') | KeyCode::Char('R') => self.reload(services),
            KeyCode::Char('p') | KeyCode::Char('P') => {
                if self.schedule.is_running() {
                    self.schedule.stop();
                } else {
                    self.schedule.start(Instant::now());
                }
            }
            KeyCode::Esc | KeyCode::Char('b') | KeyCode::Char('B') => {
                return Ok(Some(Transition::Home))
            }
            _ => {}
        }
        Ok(None)
    }

    fn on_tick(&mut self, services: &mut Services) -> Result<()> {
        if self.schedule.poll(Instant::now()) {
            self.reload(services);
        }
        Ok(())
    }

    fn render(&self, frame: &mut Frame) {
        widgets::background(frame);

        let layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3),
                Constraint::Length(4),
                Constraint::Length(3),
                Constraint::Min(8),
                Constraint::Length(2),
            ])
            .margin(1)
            .split(frame.area());

        widgets::header(frame, layout[0], "📊 HOSPITAL DASHBOARD");

        let stats = &self.snapshot.stats;
        let cards = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Ratio(1, 5); 5])
            .split(layout[1]);
        let figures = [
            ("Total Patients", stats.total_patients.to_string(), widgets::INFO),
            (
                "Today's Appointments",
                stats.todays_appointments.to_string(),
                widgets::TITLE,
            ),
            ("Available Beds", stats.available_beds.to_string(), widgets::SUCCESS),
            (
                "Emergency Cases",
                stats.emergency_cases.to_string(),
                if stats.emergency_cases > 0 {
                    widgets::DANGER
                } else {
                    widgets::SUCCESS
                },
            ),
            ("Available Staff", stats.available_staff.to_string(), widgets::SUCCESS),
        ];
        for ((title, value, accent), area) in figures.into_iter().zip(cards.iter()) {
            frame.render_widget(Self::stat_card(title, value, accent), *area);
        }

        let occupancy_color = match stats.bed_occupancy_percent {
            p if p >= 90 => widgets::DANGER,
            p if p >= 70 => widgets::WARNING,
            _ => widgets::SUCCESS,
        };
        let gauge = Gauge::default()
            .block(widgets::panel(" Bed Occupancy "))
            .gauge_style(Style::default().fg(occupancy_color).bg(widgets::INPUT))
            .ratio(f64::from(stats.bed_occupancy_percent.min(100)) / 100.0)
            .label(format!("{}%", stats.bed_occupancy_percent));
        frame.render_widget(gauge, layout[2]);

        let lists = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
            .spacing(1)
            .split(layout[3]);

        let appointment_rows = self.snapshot.upcoming_appointments.iter().map(|a| {
            Row::new(vec![
                Cell::from(a.date.to_string()),
                Cell::from(format!("{:02}:{:02}", a.time.hour(), a.time.minute())),
                Cell::from(self.patient_name(a.patient_id)),
                Cell::from(a.department.clone()),
                Cell::from(a.status.as_str()),
            ])
            .style(Style::default().fg(widgets::TEXT))
        });
        let appointments = Table::new(
            appointment_rows,
            [
                Constraint::Length(11),
                Constraint::Length(6),
                Constraint::Percentage(35),
                Constraint::Percentage(30),
                Constraint::Length(12),
            ],
        )
        .header(widgets::table_header(&["Date", "Time", "Patient", "Department", "Status"]))
        .block(widgets::panel(" Upcoming Appointments "));
        frame.render_widget(appointments, lists[0]);

        let admission_rows = self.snapshot.active_admissions.iter().map(|a| {
            let status_color = match a.status {
                AdmissionStatus::Critical => widgets::DANGER,
                AdmissionStatus::Stable => widgets::SUCCESS,
                _ => widgets::TEXT,
            };
            Row::new(vec![
                Cell::from(a.bed_number.clone()),
                Cell::from(self.patient_name(a.patient_id)),
                Cell::from(a.diagnosis.clone()),
                Cell::from(a.status.as_str()).style(Style::default().fg(status_color)),
            ])
            .style(Style::default().fg(widgets::TEXT))
        });
        let admissions = Table::new(
            admission_rows,
            [
                Constraint::Length(7),
                Constraint::Percentage(35),
                Constraint::Percentage(40),
                Constraint::Length(10),
            ],
        )
        .header(widgets::table_header(&["Bed", "Patient", "Diagnosis", "Status"]))
        .block(widgets::panel(" Active Admissions "));
        frame.render_widget(admissions, lists[1]);

        let refresh = if self.schedule.is_running() {
            "auto-refresh on"
        } else {
            "auto-refresh paused"
        };
        frame.render_widget(
            widgets::help(&format!("R: Refresh | P: Pause/resume ({refresh}) | Esc: Back")),
            layout[4],
        );
    }
}
