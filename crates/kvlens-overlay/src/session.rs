#![forbid(unsafe_code)]

//! The edit-session state.
//!
//! At most one session exists at a time; its existence is exactly
//! what gates the edit dialog. The key is immutable for the session's
//! lifetime; only the draft changes. The draft is seeded from the
//! value currently displayed in the listing, not re-fetched from
//! storage, so it can be stale relative to an external writer. That
//! staleness window is accepted for a single-user inspection tool.

/// One key being actively edited, with its unsaved draft.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditSession {
    key: String,
    draft: String,
}

impl EditSession {
    /// Start a session on `key`, seeding the draft with the row's
    /// currently displayed value.
    pub fn begin(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            draft: value.into(),
        }
    }

    /// The key under edit.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// The current draft text.
    pub fn draft(&self) -> &str {
        &self.draft
    }

    /// Append a character to the draft. Any character is accepted;
    /// drafts carry no validation.
    pub fn push_char(&mut self, ch: char) {
        self.draft.push(ch);
    }

    /// Append a line break to the draft (values may be multi-line).
    pub fn push_newline(&mut self) {
        self.draft.push('\n');
    }

    /// Remove the last character of the draft, if any. An empty draft
    /// is a valid draft.
    pub fn backspace(&mut self) {
        self.draft.pop();
    }
}
