//! Shared building blocks for the dashboard views.
//!
//! Every view draws on the same dark palette; the helpers here keep the
//! header, input boxes, buttons, dialogs and toasts consistent between them.

use crate::notify::{Level, Toast};
use crate::tui::Frame;
use ratatui::{prelude::*, widgets::*};

pub const BACKGROUND: Color = Color::Rgb(16, 16, 28);
pub const PANEL: Color = Color::Rgb(22, 22, 35);
pub const INPUT: Color = Color::Rgb(26, 26, 36);
pub const BORDER: Color = Color::Rgb(75, 75, 120);
pub const IDLE_BORDER: Color = Color::Rgb(140, 140, 200);
pub const FOCUS: Color = Color::Rgb(250, 250, 110);
pub const TITLE: Color = Color::Rgb(230, 230, 250);
pub const TEXT: Color = Color::Rgb(220, 220, 240);
pub const MUTED: Color = Color::Rgb(180, 180, 200);
pub const HELP: Color = Color::Rgb(140, 140, 170);
pub const SUCCESS: Color = Color::Rgb(140, 219, 140);
pub const INFO: Color = Color::Rgb(129, 199, 245);
pub const WARNING: Color = Color::Rgb(245, 190, 90);
pub const DANGER: Color = Color::Rgb(255, 100, 100);
pub const HIGHLIGHT: Color = Color::Rgb(40, 40, 65);

/// Fills the whole frame with the background colour.
pub fn background(frame: &mut Frame) {
    frame.render_widget(
        Block::default().style(Style::default().bg(BACKGROUND)),
        frame.area(),
    );
}

/// Screen title with a rule underneath.
pub fn header(frame: &mut Frame, area: Rect, title: &str) {
    let block = Block::default()
        .borders(Borders::BOTTOM)
        .border_style(Style::default().fg(BORDER))
        .style(Style::default().bg(BACKGROUND));
    frame.render_widget(block, area);

    let title = Paragraph::new(title)
        .style(
            Style::default()
                .fg(TITLE)
                .add_modifier(Modifier::BOLD)
                .bg(BACKGROUND),
        )
        .alignment(Alignment::Center);
    frame.render_widget(title, area);
}

pub fn panel(title: &str) -> Block<'_> {
    Block::default()
        .title(title)
        .title_alignment(Alignment::Center)
        .title_style(Style::default().fg(TITLE).add_modifier(Modifier::BOLD))
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(BORDER))
        .style(Style::default().bg(PANEL))
}

fn border(focused: bool) -> Style {
    if focused {
        Style::default().fg(FOCUS)
    } else {
        Style::default().fg(IDLE_BORDER)
    }
}

/// A labelled single-line text box.
pub fn input<'a>(label: &'a str, value: &'a str, focused: bool, error: Option<&'a str>) -> Paragraph<'a> {
    let mut block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .title(Span::styled(format!(" {label} "), Style::default().fg(TITLE)))
        .border_style(if error.is_some() && !focused {
            Style::default().fg(DANGER)
        } else {
            border(focused)
        })
        .style(Style::default().bg(INPUT));
    if let Some(error) = error {
        block = block.title_bottom(Span::styled(format!(" {error} "), Style::default().fg(DANGER)));
    }

    Paragraph::new(value)
        .style(Style::default().fg(TEXT).bg(INPUT))
        .block(block)
}

/// A `► label ◄` button that lights up when focused.
pub fn button(label: &str, focused: bool, accent: Color) -> Paragraph<'static> {
    let (text, style) = if focused {
        (
            format!("► {label} ◄"),
            Style::default().fg(accent).add_modifier(Modifier::BOLD),
        )
    } else {
        (format!("  {label}  "), Style::default().fg(MUTED))
    };
    Paragraph::new(text).style(style).alignment(Alignment::Center)
}

pub fn help(text: &str) -> Paragraph<'_> {
    Paragraph::new(text)
        .style(Style::default().fg(HELP).bg(BACKGROUND))
        .alignment(Alignment::Center)
}

pub fn row_highlight(focused: bool) -> Style {
    let bg = if focused { HIGHLIGHT } else { Color::Rgb(30, 30, 45) };
    Style::default().bg(bg).add_modifier(Modifier::BOLD)
}

pub fn table_header<'a>(titles: &[&'a str]) -> Row<'a> {
    Row::new(
        titles
            .iter()
            .map(|title| Cell::from(*title).style(Style::default().fg(TITLE))),
    )
    .style(Style::default().bg(INPUT))
    .height(1)
    .bottom_margin(1)
}

/// Moves a table selection by `step`, wrapping at both ends.
pub fn step_selection(state: &mut TableState, len: usize, step: isize) {
    if len == 0 {
        state.select(None);
        return;
    }
    let current = state.selected().unwrap_or(0) as isize;
    let next = (current + step).rem_euclid(len as isize) as usize;
    state.select(Some(next));
}

/// Keeps a selection inside a list that may have shrunk.
pub fn clamp_selection(state: &mut TableState, len: usize) {
    if len == 0 {
        state.select(None);
    } else {
        state.select(Some(state.selected().unwrap_or(0).min(len - 1)));
    }
}

/// A centred rectangle of at most `width` x `height`.
pub fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect::new(
        area.x + (area.width - width) / 2,
        area.y + (area.height - height) / 2,
        width,
        height,
    )
}

/// Yes/No confirmation dialog; `yes_selected` picks the highlighted button.
pub fn confirm_dialog(frame: &mut Frame, title: &str, message: &str, yes_selected: bool) {
    let area = centered(frame.area(), 50, 8);
    frame.render_widget(Clear, area);

    let block = Block::default()
        .title(format!(" {title} "))
        .title_style(Style::default().fg(TITLE).add_modifier(Modifier::BOLD))
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(IDLE_BORDER))
        .style(Style::default().bg(Color::Rgb(30, 30, 46)));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let layout = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints([Constraint::Length(2), Constraint::Length(2)])
        .split(inner);
    frame.render_widget(
        Paragraph::new(message)
            .style(Style::default().fg(TEXT).add_modifier(Modifier::BOLD))
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true }),
        layout[0],
    );

    let buttons = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(layout[1]);
    frame.render_widget(button("Yes", yes_selected, SUCCESS), buttons[0]);
    frame.render_widget(button("No", !yes_selected, DANGER), buttons[1]);
}

fn level_color(level: Level) -> Color {
    match level {
        Level::Success => SUCCESS,
        Level::Info => INFO,
        Level::Warning => WARNING,
        Level::Error => DANGER,
    }
}

/// Draws the live toast on the last line of the screen.
pub fn toast(frame: &mut Frame, toast: &Toast) {
    let area = frame.area();
    if area.height == 0 {
        return;
    }
    let line = Rect::new(area.x, area.y + area.height - 1, area.width, 1);
    let marker = match toast.level {
        Level::Success => "✓",
        Level::Info => "ℹ",
        Level::Warning | Level::Error => "⚠",
    };
    frame.render_widget(Clear, line);
    frame.render_widget(
        Paragraph::new(format!("{marker} {}", toast.message))
            .style(
                Style::default()
                    .fg(level_color(toast.level))
                    .bg(BACKGROUND)
                    .add_modifier(Modifier::BOLD),
            )
            .alignment(Alignment::Center),
        line,
    );
}

/// A one-line inline message, e.g. a form's validation summary.
pub fn message(text: &str, level: Level) -> Paragraph<'_> {
    Paragraph::new(text)
        .style(
            Style::default()
                .fg(level_color(level))
                .add_modifier(Modifier::BOLD)
                .bg(BACKGROUND),
        )
        .alignment(Alignment::Center)
}
