#![forbid(unsafe_code)]

//! Overlay configuration.

use crossterm::event::KeyCode;

/// Construction-time configuration for [`crate::Overlay`].
///
/// `enabled` replaces the ambient build-mode check a devtool would
/// otherwise reach for: the host resolves it once from its own build
/// configuration (`cfg!(debug_assertions)` or similar) and passes it
/// in, which keeps the gate testable. A disabled overlay renders
/// nothing and maps no input.
#[derive(Debug, Clone)]
pub struct OverlayConfig {
    /// Whether the overlay is active at all.
    pub enabled: bool,
    /// Panel title.
    pub title: String,
    /// Key that opens the panel while it is closed.
    pub trigger: KeyCode,
}

impl Default for OverlayConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            title: "kvlens".to_string(),
            trigger: KeyCode::F(12),
        }
    }
}

impl OverlayConfig {
    /// Set the enabled gate.
    pub fn enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    /// Set the panel title.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Set the open trigger key.
    pub fn with_trigger(mut self, trigger: KeyCode) -> Self {
        self.trigger = trigger;
        self
    }
}
