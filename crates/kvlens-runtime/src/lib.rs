#![forbid(unsafe_code)]

//! Minimal Elm-style runtime for kvlens terminal tools.
//!
//! State lives in a [`Model`]; every input becomes a message; `update`
//! is the only place state changes; side effects are [`Cmd`] values
//! executed by the [`Program`] loop. Rendering is a pure function of
//! the model, drawn through ratatui each pass.

pub mod program;

pub use program::{Cmd, Model, Program, ProgramConfig, drain};
