use crate::app::{Transition, View};
use crate::components::{widgets, Component};
use crate::config::{APP_NAME, APP_VERSION};
use crate::services::Services;
use crate::tui::Frame;
use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    prelude::*,
    widgets::{Block, BorderType, Borders, List, ListItem, ListState, Padding, Paragraph},
};

const FEATURES: [&str; 5] = [
    "Overview",
    "Patient Care",
    "Walk-in Queue",
    "Scheduling",
    "Hospital Resources",
];

const SUBMENUS: [&[View]; 5] = [
    &[View::Dashboard],
    &[View::Patients, View::RegisterPatient, View::Admissions],
    &[View::Queue],
    &[View::Appointments],
    &[View::Staff, View::Departments],
];

const MENU_PANEL: usize = 0;
const SUBMENU_PANEL: usize = 1;

pub struct Home {
    /// 0 while browsing the menus, 1 when the Quit button is focused.
    selection_mode: usize,
    show_quit_dialog: bool,
    quit_dialog_selected: usize,
    active_panel: usize,
    selected_feature_index: usize,
    submenu_states: Vec<ListState>,
}

impl Home {
    pub fn new() -> Self {
        let submenu_states = FEATURES
            .iter()
            .map(|_| ListState::default().with_selected(Some(0)))
            .collect();

        Self {
            selection_mode: 0,
            show_quit_dialog: false,
            quit_dialog_selected: 1,
            active_panel: MENU_PANEL,
            selected_feature_index: 0,
            submenu_states,
        }
    }

    fn submenu(&self) -> &'static [View] {
        SUBMENUS[self.selected_feature_index]
    }

    fn step_submenu(&mut self, step: isize) {
        let len = self.submenu().len() as isize;
        let state = &mut self.submenu_states[self.selected_feature_index];
        let current = state.selected().unwrap_or(0) as isize;
        state.select(Some((current + step).rem_euclid(len) as usize));
    }

    fn open_quit_dialog(&mut self) {
        self.show_quit_dialog = true;
        self.quit_dialog_selected = 1;
    }

    fn handle_quit_dialog_input(&mut self, key: KeyEvent) -> Option<Transition> {
        match key.code {
            KeyCode::Left | KeyCode::Right | KeyCode::Tab => {
                self.quit_dialog_selected = 1 - self.quit_dialog_selected;
            }
            KeyCode::Enter => {
                self.show_quit_dialog = false;
                if self.quit_dialog_selected == 0 {
                    return Some(Transition::Quit);
                }
            }
            KeyCode::Esc => self.show_quit_dialog = false,
            _ => {}
        }
        None
    }
}

impl Default for Home {
    fn default() -> Self {
        Self::new()
    }
}

impl Component for Home {
    fn handle_input(&mut self, key: KeyEvent, _services: &mut Services) -> Result<Option<Transition>> {
        if self.show_quit_dialog {
            return Ok(self.handle_quit_dialog_input(key));
        }

        match key.code {
            KeyCode::Tab => self.selection_mode = (self.selection_mode + 1) % 2,
            KeyCode::Left if self.selection_mode == 0 => self.active_panel = MENU_PANEL,
            KeyCode::Right if self.selection_mode == 0 => self.active_panel = SUBMENU_PANEL,
            KeyCode::Up if self.selection_mode == 0 => {
                if self.active_panel == MENU_PANEL {
                    self.selected_feature_index =
                        (self.selected_feature_index + FEATURES.len() - 1) % FEATURES.len();
                } else {
                    self.step_submenu(-1);
                }
            }
            KeyCode::Down if self.selection_mode == 0 => {
                if self.active_panel == MENU_PANEL {
                    self.selected_feature_index = (self.selected_feature_index + 1) % FEATURES.len();
                } else {
                    self.step_submenu(1);
                }
            }
            KeyCode::Enter => {
                if self.selection_mode == 1 {
                    self.open_quit_dialog();
                } else if self.active_panel == MENU_PANEL {
                    self.active_panel = SUBMENU_PANEL;
                } else {
                    let index = self.submenu_states[self.selected_feature_index]
                        .selected()
                        .unwrap_or(0);
                    return Ok(self.submenu().get(index).copied().map(Transition::Open));
                }
            }
            KeyCode::Esc => {
                if self.active_panel == SUBMENU_PANEL {
                    self.active_panel = MENU_PANEL;
                } else {
                    self.open_quit_dialog();
                }
            }
            _ => {}
        }

        Ok(None)
    }

    fn render(&self, frame: &mut Frame) {
        widgets::background(frame);
        let area = frame.area();

        let main_layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(5),
                Constraint::Length(1),
                Constraint::Min(10),
                Constraint::Length(3),
                Constraint::Length(3),
            ])
            .split(area);

        let welcome_text = Line::from(vec![
            Span::styled(
                "Hospital operations, ",
                Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
            ),
            Span::styled(
                format!("{APP_NAME} v{APP_VERSION}"),
                Style::default().fg(widgets::INFO).add_modifier(Modifier::BOLD),
            ),
        ]);

        let welcome_block = Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(widgets::BORDER))
            .style(Style::default().bg(Color::Rgb(24, 24, 40)));
        let welcome_inner = welcome_block.inner(main_layout[0]);
        frame.render_widget(welcome_block, main_layout[0]);
        frame.render_widget(
            Paragraph::new(welcome_text)
                .alignment(Alignment::Center)
                .block(Block::default().padding(Padding::new(0, 0, 1, 0))),
            welcome_inner,
        );

        frame.render_widget(
            Paragraph::new("Please select a task:")
                .style(Style::default().fg(Color::Rgb(180, 190, 254)))
                .alignment(Alignment::Center),
            main_layout[1],
        );

        let content_layout = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(40), Constraint::Percentage(60)])
            .spacing(2)
            .margin(1)
            .split(main_layout[2]);

        let browsing = self.selection_mode == 0;
        let panel = |title: &'static str, focused: bool| {
            Block::default()
                .title(title)
                .title_style(
                    Style::default()
                        .fg(widgets::TITLE)
                        .add_modifier(Modifier::BOLD),
                )
                .borders(Borders::ALL)
                .border_type(BorderType::Rounded)
                .border_style(Style::default().fg(if focused {
                    widgets::FOCUS
                } else {
                    widgets::IDLE_BORDER
                }))
                .style(Style::default().bg(widgets::PANEL))
        };

        let menu_focused = browsing && self.active_panel == MENU_PANEL;
        let feature_items: Vec<ListItem> = FEATURES
            .iter()
            .enumerate()
            .map(|(idx, feature)| {
                let selected = idx == self.selected_feature_index;
                let style = match (selected, menu_focused) {
                    (true, true) => Style::default()
                        .fg(widgets::FOCUS)
                        .add_modifier(Modifier::BOLD),
                    (true, false) => Style::default()
                        .fg(widgets::SUCCESS)
                        .add_modifier(Modifier::BOLD),
                    _ => Style::default().fg(Color::Rgb(200, 200, 220)),
                };
                let prefix = if selected { " ► " } else { "   " };
                let icon = match idx {
                    0 => "📊",
                    1 => "🩺",
                    2 => "🎫",
                    3 => "📅",
                    _ => "🏥",
                };
                ListItem::new(format!("{prefix}{icon} {feature}")).style(style)
            })
            .collect();

        let menu_block = panel(" 🏥 Hospital Operations ", menu_focused);
        let menu_inner = menu_block.inner(content_layout[0]);
        frame.render_widget(menu_block, content_layout[0]);
        frame.render_widget(
            List::new(feature_items).block(Block::default().padding(Padding::new(0, 0, 1, 0))),
            menu_inner,
        );

        let submenu_focused = browsing && self.active_panel == SUBMENU_PANEL;
        let submenu_state = &self.submenu_states[self.selected_feature_index];
        let submenu_items: Vec<ListItem> = self
            .submenu()
            .iter()
            .enumerate()
            .map(|(idx, view)| {
                let selected = submenu_state.selected() == Some(idx);
                let style = match (selected, submenu_focused) {
                    (true, true) => Style::default()
                        .fg(widgets::FOCUS)
                        .add_modifier(Modifier::BOLD),
                    (true, false) => Style::default()
                        .fg(widgets::INFO)
                        .add_modifier(Modifier::BOLD),
                    _ => Style::default().fg(Color::Rgb(200, 200, 220)),
                };
                let prefix = if selected { " ► " } else { "   " };
                ListItem::new(format!("{prefix}{}", view.title())).style(style)
            })
            .collect();

        let submenu_block = panel(" Sub menu ", submenu_focused);
        let submenu_inner = submenu_block.inner(content_layout[1]);
        frame.render_widget(submenu_block, content_layout[1]);
        frame.render_widget(
            List::new(submenu_items).block(Block::default().padding(Padding::new(2, 0, 2, 0))),
            submenu_inner,
        );

        frame.render_widget(
            widgets::help("←→: Switch panels | ↑↓: Navigate | Enter: Select | Tab: Quit button | Ctrl+Q: Quit"),
            main_layout[3],
        );

        let quit_focused = self.selection_mode == 1;
        let quit_block = Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(if quit_focused {
                widgets::DANGER
            } else {
                Color::Rgb(100, 100, 140)
            }))
            .style(Style::default().bg(widgets::INPUT));
        let quit_inner = quit_block.inner(main_layout[4]);
        frame.render_widget(quit_block, main_layout[4]);
        frame.render_widget(widgets::button("Quit", quit_focused, widgets::DANGER), quit_inner);

        if self.show_quit_dialog {
            widgets::confirm_dialog(
                frame,
                "Confirm Quit",
                "Are you sure you want to quit?",
                self.quit_dialog_selected == 0,
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::testing::services;
    use crossterm::event::KeyModifiers;

    fn press(home: &mut Home, services: &mut Services, code: KeyCode) -> Option<Transition> {
        home.handle_input(KeyEvent::new(code, KeyModifiers::NONE), services)
            .unwrap()
    }

    #[test]
    fn enter_walks_from_menu_into_a_view() {
        let (mut services, _) = services();
        let mut home = Home::new();

        press(&mut home, &mut services, KeyCode::Down);
        assert_eq!(press(&mut home, &mut services, KeyCode::Enter), None);
        press(&mut home, &mut services, KeyCode::Down);
        assert_eq!(
            press(&mut home, &mut services, KeyCode::Enter),
            Some(Transition::Open(View::RegisterPatient))
        );
    }

    #[test]
    fn submenu_selection_wraps() {
        let (mut services, _) = services();
        let mut home = Home::new();
        for _ in 0..4 {
            press(&mut home, &mut services, KeyCode::Down);
        }
        press(&mut home, &mut services, KeyCode::Right);
        press(&mut home, &mut services, KeyCode::Up);
        assert_eq!(
            press(&mut home, &mut services, KeyCode::Enter),
            Some(Transition::Open(View::Departments))
        );
    }

    #[test]
    fn quit_needs_confirmation() {
        let (mut services, _) = services();
        let mut home = Home::new();

        press(&mut home, &mut services, KeyCode::Esc);
        assert!(home.show_quit_dialog);
        // "No" is preselected.
        assert_eq!(press(&mut home, &mut services, KeyCode::Enter), None);
        assert!(!home.show_quit_dialog);

        press(&mut home, &mut services, KeyCode::Esc);
        press(&mut home, &mut services, KeyCode::Left);
        assert_eq!(
            press(&mut home, &mut services, KeyCode::Enter),
            Some(Transition::Quit)
        );
    }
}
