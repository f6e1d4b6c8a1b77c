#![forbid(unsafe_code)]

use crossterm::event::KeyEvent;
use kvlens_overlay::OverlayMsg;

#[derive(Debug)]
pub enum Msg {
    Key(KeyEvent),
    Overlay(OverlayMsg),
    Noop,
}
