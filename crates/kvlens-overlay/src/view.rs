#![forbid(unsafe_code)]

//! Rendering: trigger badge, panel, edit dialog, failure notice.
//!
//! Everything draws over whatever the host already painted, so the
//! host calls [`render`] last in its own `view`.

use crossterm::event::KeyCode;
use ratatui::Frame;
use ratatui::layout::{Constraint, Flex, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Clear, Paragraph, Row, Table, Wrap};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use crate::overlay::{FailureNotice, Overlay};

/// Draw the overlay in its current mode. Draws nothing when disabled.
pub fn render(overlay: &Overlay, frame: &mut Frame) {
    if !overlay.config().enabled {
        return;
    }
    if !overlay.is_visible() {
        render_trigger_badge(overlay, frame);
        return;
    }

    render_panel(overlay, frame);
    if overlay.session().is_some() {
        render_edit_dialog(overlay, frame);
    }
    if overlay.notice().is_some() {
        render_notice(frame);
    }
}

/// The closed-state badge: one short hint in the bottom-right corner,
/// standing in for the original floating button.
fn render_trigger_badge(overlay: &Overlay, frame: &mut Frame) {
    let label = format!(" {} {} ", key_label(overlay.config().trigger), overlay.config().title);
    // Display cells, not chars: wide glyphs in the title must not
    // clip the badge.
    let width = label.as_str().width() as u16;
    let area = frame.area();
    if area.width < width + 1 || area.height == 0 {
        return;
    }
    let badge = Rect::new(area.right() - width - 1, area.bottom() - 1, width, 1);
    frame.render_widget(Clear, badge);
    frame.render_widget(
        Paragraph::new(label).style(Style::new().add_modifier(Modifier::REVERSED)),
        badge,
    );
}

fn render_panel(overlay: &Overlay, frame: &mut Frame) {
    let area = popup_area(frame.area(), 80, 70);
    frame.render_widget(Clear, area);

    let block = Block::bordered().title(format!(" {} ", overlay.config().title));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let [rows_area, hint_area] =
        Layout::vertical([Constraint::Min(1), Constraint::Length(1)]).areas(inner);

    if overlay.listing().is_empty() {
        frame.render_widget(
            Paragraph::new("store is empty").style(Style::new().add_modifier(Modifier::DIM)),
            rows_area,
        );
    } else {
        let value_width = rows_area.width.saturating_mul(6) / 10;
        let rows: Vec<Row> = overlay
            .listing()
            .iter()
            .map(|entry| {
                Row::new(vec![
                    Span::styled(entry.key.clone(), Style::new().add_modifier(Modifier::BOLD)),
                    Span::raw(single_line(&entry.value, value_width as usize)),
                ])
            })
            .collect();
        let table = Table::new(rows, [Constraint::Percentage(35), Constraint::Fill(1)])
            .row_highlight_style(Style::new().add_modifier(Modifier::REVERSED))
            .highlight_symbol("> ");
        let mut state = overlay.row_state.borrow_mut();
        state.select(Some(overlay.cursor()));
        frame.render_stateful_widget(table, rows_area, &mut state);
    }

    frame.render_widget(hint_line(&[
        ("j/k", "move"),
        ("e", "edit"),
        ("d", "delete"),
        ("r", "reload"),
        ("esc", "close"),
    ]), hint_area);
}

fn render_edit_dialog(overlay: &Overlay, frame: &mut Frame) {
    let Some(session) = overlay.session() else {
        return;
    };
    let area = popup_area(frame.area(), 60, 50);
    frame.render_widget(Clear, area);

    let title = format!(" edit: {} ", single_line(session.key(), area.width.saturating_sub(10) as usize));
    let block = Block::bordered().title(title);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let [draft_area, hint_area] =
        Layout::vertical([Constraint::Min(1), Constraint::Length(1)]).areas(inner);

    frame.render_widget(
        Paragraph::new(session.draft()).wrap(Wrap { trim: false }),
        draft_area,
    );
    frame.render_widget(
        hint_line(&[("ctrl+s", "save"), ("esc", "cancel"), ("enter", "newline")]),
        hint_area,
    );
}

fn render_notice(frame: &mut Frame) {
    let area = popup_area(frame.area(), 40, 20);
    frame.render_widget(Clear, area);

    let block = Block::bordered()
        .title(format!(" {} ", FailureNotice::TITLE))
        .title_style(Style::new().add_modifier(Modifier::BOLD));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let [message_area, hint_area] =
        Layout::vertical([Constraint::Min(1), Constraint::Length(1)]).areas(inner);
    frame.render_widget(
        Paragraph::new(FailureNotice::MESSAGE).wrap(Wrap { trim: true }),
        message_area,
    );
    frame.render_widget(hint_line(&[("enter", "dismiss")]), hint_area);
}

/// A centered popup rect sized as a percentage of `area`.
fn popup_area(area: Rect, percent_x: u16, percent_y: u16) -> Rect {
    let [area] = Layout::horizontal([Constraint::Percentage(percent_x)])
        .flex(Flex::Center)
        .areas(area);
    let [area] = Layout::vertical([Constraint::Percentage(percent_y)])
        .flex(Flex::Center)
        .areas(area);
    area
}

fn hint_line(hints: &[(&str, &str)]) -> Paragraph<'static> {
    let mut spans = Vec::new();
    for (i, (key, action)) in hints.iter().enumerate() {
        if i > 0 {
            spans.push(Span::raw("  "));
        }
        spans.push(Span::styled(
            (*key).to_string(),
            Style::new().add_modifier(Modifier::BOLD),
        ));
        spans.push(Span::raw(format!(" {action}")));
    }
    Paragraph::new(Line::from(spans)).style(Style::new().add_modifier(Modifier::DIM))
}

fn key_label(code: KeyCode) -> String {
    match code {
        KeyCode::F(n) => format!("F{n}"),
        KeyCode::Char(c) => c.to_string(),
        other => format!("{other:?}"),
    }
}

/// Flatten `value` to one display line of at most `max_width` cells,
/// replacing control characters and appending an ellipsis when
/// truncated.
fn single_line(value: &str, max_width: usize) -> String {
    if max_width == 0 {
        return String::new();
    }
    let cleaned = value
        .chars()
        .map(|c| if c.is_control() { ' ' } else { c });

    let mut out = String::new();
    let mut width = 0usize;
    for ch in cleaned.clone() {
        width += ch.width().unwrap_or(0);
    }
    if width <= max_width {
        out.extend(cleaned);
        return out;
    }

    let budget = max_width.saturating_sub(1);
    let mut used = 0usize;
    for ch in cleaned {
        let w = ch.width().unwrap_or(0);
        if used + w > budget {
            break;
        }
        out.push(ch);
        used += w;
    }
    out.push('…');
    out
}
