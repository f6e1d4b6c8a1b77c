#![forbid(unsafe_code)]

//! The demo host: a placeholder screen with the overlay mounted on top.

use crossterm::event::{Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use kvlens_overlay::{Overlay, render as render_overlay};
use kvlens_runtime::{Cmd, Model};
use ratatui::Frame;
use ratatui::layout::{Constraint, Layout};
use ratatui::style::{Modifier, Style};
use ratatui::text::Line;
use ratatui::widgets::{Block, Paragraph, Wrap};

use crate::msg::Msg;

pub struct DemoApp {
    overlay: Overlay,
}

impl DemoApp {
    pub fn new(overlay: Overlay) -> Self {
        Self { overlay }
    }

    fn handle_key(&mut self, key: KeyEvent) -> Cmd<Msg> {
        if key.kind != KeyEventKind::Press {
            return Cmd::none();
        }

        // The overlay gets first pick; while its panel is open it
        // swallows everything it did not map.
        if let Some(msg) = self.overlay.map_key(&key) {
            return self.overlay.update(msg).map(Msg::Overlay);
        }
        if self.overlay.wants_exclusive_input() {
            return Cmd::none();
        }

        match key.code {
            KeyCode::Char('q') => Cmd::quit(),
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => Cmd::quit(),
            _ => Cmd::none(),
        }
    }
}

impl Model for DemoApp {
    type Message = Msg;

    fn update(&mut self, msg: Msg) -> Cmd<Msg> {
        match msg {
            Msg::Key(key) => self.handle_key(key),
            Msg::Overlay(m) => self.overlay.update(m).map(Msg::Overlay),
            Msg::Noop => Cmd::none(),
        }
    }

    fn view(&self, frame: &mut Frame) {
        let [header, body] =
            Layout::vertical([Constraint::Length(1), Constraint::Min(0)]).areas(frame.area());

        frame.render_widget(
            Paragraph::new(" kvlens demo — press F12 to inspect the store, q to quit ")
                .style(Style::new().add_modifier(Modifier::REVERSED)),
            header,
        );

        let body_text = vec![
            Line::raw(""),
            Line::raw("This is a stand-in for your application screen."),
            Line::raw(""),
            Line::raw("The overlay reads and writes the JSON store on disk;"),
            Line::raw("edit or delete entries and re-open the panel to see"),
            Line::raw("changes made by other processes."),
        ];
        frame.render_widget(
            Paragraph::new(body_text)
                .wrap(Wrap { trim: false })
                .block(Block::bordered()),
            body,
        );

        render_overlay(&self.overlay, frame);
    }
}

impl From<Event> for Msg {
    fn from(event: Event) -> Self {
        match event {
            Event::Key(key) => Msg::Key(key),
            _ => Msg::Noop,
        }
    }
}
