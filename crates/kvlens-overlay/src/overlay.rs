#![forbid(unsafe_code)]

//! The overlay model: visibility, snapshot listing, edit session,
//! delete dispatch, and the single failure notice.

use std::cell::RefCell;
use std::sync::Arc;

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use kvlens_runtime::Cmd;
use kvlens_store::{KvStore, StoreError};
use ratatui::widgets::TableState;
use tracing::{debug, warn};

use crate::config::OverlayConfig;
use crate::msg::OverlayMsg;
use crate::session::EditSession;

/// One record as currently known to the overlay. A read-through
/// projection: never persisted here, discarded wholesale on reload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageEntry {
    pub key: String,
    pub value: String,
}

/// The one user-facing failure surface.
///
/// Every storage failure, whatever the operation, collapses into this
/// blocking, dismiss-only notice with a static message. The
/// distinguishing detail goes to the logs instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FailureNotice;

impl FailureNotice {
    pub const TITLE: &'static str = "Storage error";
    pub const MESSAGE: &'static str =
        "A storage operation failed. The listing was left unchanged.";
}

/// The inspector overlay. See the crate docs for the embedding
/// contract.
pub struct Overlay {
    config: OverlayConfig,
    store: Arc<dyn KvStore>,
    visible: bool,
    listing: Vec<StorageEntry>,
    cursor: usize,
    session: Option<EditSession>,
    notice: Option<FailureNotice>,
    /// Token of the most recently issued reload. Only a completion
    /// carrying this value may replace the listing.
    reload_seq: u64,
    pub(crate) row_state: RefCell<TableState>,
}

impl Overlay {
    pub fn new(store: Arc<dyn KvStore>, config: OverlayConfig) -> Self {
        Self {
            config,
            store,
            visible: false,
            listing: Vec::new(),
            cursor: 0,
            session: None,
            notice: None,
            reload_seq: 0,
            row_state: RefCell::new(TableState::default()),
        }
    }

    pub fn config(&self) -> &OverlayConfig {
        &self.config
    }

    pub fn is_visible(&self) -> bool {
        self.config.enabled && self.visible
    }

    /// The current point-in-time listing, in the backend's
    /// enumeration order.
    pub fn listing(&self) -> &[StorageEntry] {
        &self.listing
    }

    pub fn session(&self) -> Option<&EditSession> {
        self.session.as_ref()
    }

    pub fn notice(&self) -> Option<&FailureNotice> {
        self.notice.as_ref()
    }

    /// The row the cursor is on.
    pub fn selected(&self) -> Option<&StorageEntry> {
        self.listing.get(self.cursor)
    }

    pub(crate) fn cursor(&self) -> usize {
        self.cursor
    }

    /// Whether the overlay currently swallows all key input. Hosts
    /// should skip their own key handling while this holds.
    pub fn wants_exclusive_input(&self) -> bool {
        self.is_visible()
    }

    /// Translate a terminal key event into an overlay message, given
    /// the current mode (closed / listing / editing / notice). Returns
    /// `None` for events the overlay does not consume.
    pub fn map_key(&self, key: &KeyEvent) -> Option<OverlayMsg> {
        if !self.config.enabled || key.kind != KeyEventKind::Press {
            return None;
        }

        if !self.visible {
            return (key.code == self.config.trigger).then_some(OverlayMsg::Open);
        }

        // The notice is blocking and dismiss-only: everything but the
        // dismiss keys is swallowed by `wants_exclusive_input`.
        if self.notice.is_some() {
            return match key.code {
                KeyCode::Enter | KeyCode::Esc => Some(OverlayMsg::NoticeDismissed),
                _ => None,
            };
        }

        if self.session.is_some() {
            return match key.code {
                KeyCode::Esc => Some(OverlayMsg::CancelRequested),
                KeyCode::Char('s') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                    Some(OverlayMsg::SaveRequested)
                }
                KeyCode::Enter => Some(OverlayMsg::DraftNewline),
                KeyCode::Backspace => Some(OverlayMsg::DraftBackspace),
                KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
                    Some(OverlayMsg::DraftInput(c))
                }
                _ => None,
            };
        }

        // Ctrl/Alt chords stay with the host even while the panel is
        // open; only plain keys drive the listing.
        if key
            .modifiers
            .intersects(KeyModifiers::CONTROL | KeyModifiers::ALT)
        {
            return None;
        }
        match key.code {
            KeyCode::Esc | KeyCode::Char('q') => Some(OverlayMsg::Close),
            KeyCode::Char('r') => Some(OverlayMsg::ReloadRequested),
            KeyCode::Up | KeyCode::Char('k') => Some(OverlayMsg::CursorUp),
            KeyCode::Down | KeyCode::Char('j') => Some(OverlayMsg::CursorDown),
            KeyCode::Enter | KeyCode::Char('e') => Some(OverlayMsg::EditRequested),
            KeyCode::Delete | KeyCode::Char('d') => Some(OverlayMsg::DeleteRequested),
            _ => None,
        }
    }

    pub fn update(&mut self, msg: OverlayMsg) -> Cmd<OverlayMsg> {
        match msg {
            OverlayMsg::Open => self.open(),
            OverlayMsg::Close => {
                self.visible = false;
                Cmd::none()
            }
            OverlayMsg::ReloadRequested => self.reload(),
            OverlayMsg::ReloadFinished { seq, result } => self.apply_reload(seq, result),
            OverlayMsg::CursorUp => {
                self.cursor = self.cursor.saturating_sub(1);
                Cmd::none()
            }
            OverlayMsg::CursorDown => {
                if !self.listing.is_empty() {
                    self.cursor = (self.cursor + 1).min(self.listing.len() - 1);
                }
                Cmd::none()
            }
            OverlayMsg::EditRequested => {
                self.begin_edit();
                Cmd::none()
            }
            OverlayMsg::DraftInput(c) => {
                if let Some(session) = &mut self.session {
                    session.push_char(c);
                }
                Cmd::none()
            }
            OverlayMsg::DraftNewline => {
                if let Some(session) = &mut self.session {
                    session.push_newline();
                }
                Cmd::none()
            }
            OverlayMsg::DraftBackspace => {
                if let Some(session) = &mut self.session {
                    session.backspace();
                }
                Cmd::none()
            }
            OverlayMsg::SaveRequested => self.save(),
            OverlayMsg::SaveFinished { key, result } => self.finish_save(&key, result),
            OverlayMsg::CancelRequested => {
                // A true no-op on storage: no write, no reload.
                self.session = None;
                Cmd::none()
            }
            OverlayMsg::DeleteRequested => self.delete_selected(),
            OverlayMsg::DeleteFinished { key, result } => self.finish_delete(&key, result),
            OverlayMsg::NoticeDismissed => {
                self.notice = None;
                Cmd::none()
            }
        }
    }

    /// Show the panel. Opening always implies an immediate fresh
    /// reload; there is no stale-cache path.
    fn open(&mut self) -> Cmd<OverlayMsg> {
        if !self.config.enabled {
            return Cmd::none();
        }
        self.visible = true;
        self.reload()
    }

    /// Issue a snapshot load. The listing is only replaced when the
    /// completion still carries the latest token.
    fn reload(&mut self) -> Cmd<OverlayMsg> {
        self.reload_seq += 1;
        let seq = self.reload_seq;
        let store = Arc::clone(&self.store);
        debug!(seq, "snapshot reload issued");
        Cmd::task(move || OverlayMsg::ReloadFinished {
            seq,
            result: load_snapshot(store.as_ref()),
        })
    }

    fn apply_reload(
        &mut self,
        seq: u64,
        result: Result<Vec<StorageEntry>, StoreError>,
    ) -> Cmd<OverlayMsg> {
        if seq != self.reload_seq {
            debug!(seq, latest = self.reload_seq, "stale reload discarded");
            return Cmd::none();
        }
        match result {
            Ok(entries) => {
                debug!(seq, entries = entries.len(), "listing replaced");
                self.listing = entries;
                if self.cursor >= self.listing.len() {
                    self.cursor = self.listing.len().saturating_sub(1);
                }
            }
            Err(err) => {
                // Previous listing stays untouched on any load failure.
                warn!(error = %err, "snapshot load failed");
                self.notice = Some(FailureNotice);
            }
        }
        Cmd::none()
    }

    /// Enter (or replace) the edit session for the selected row,
    /// seeding the draft from the displayed value. Re-entering while a
    /// session exists is last-write-wins on the session identity.
    fn begin_edit(&mut self) {
        if let Some(entry) = self.listing.get(self.cursor) {
            self.session = Some(EditSession::begin(&entry.key, &entry.value));
        }
    }

    fn save(&mut self) -> Cmd<OverlayMsg> {
        let Some(session) = &self.session else {
            return Cmd::none();
        };
        let key = session.key().to_owned();
        let draft = session.draft().to_owned();
        let store = Arc::clone(&self.store);
        Cmd::task(move || {
            let result = store.write(&key, &draft);
            OverlayMsg::SaveFinished { key, result }
        })
    }

    fn finish_save(&mut self, key: &str, result: Result<(), StoreError>) -> Cmd<OverlayMsg> {
        match result {
            Ok(()) => {
                // The session ends once the write landed; the reload
                // that follows may still fail, which surfaces through
                // the usual notice without reviving the session.
                if self.session.as_ref().is_some_and(|s| s.key() == key) {
                    self.session = None;
                }
                self.reload()
            }
            Err(err) => {
                // Keep the session so the draft is not lost; the user
                // can retry the save or cancel.
                warn!(key, error = %err, "write failed");
                self.notice = Some(FailureNotice);
                Cmd::none()
            }
        }
    }

    fn delete_selected(&mut self) -> Cmd<OverlayMsg> {
        let Some(entry) = self.listing.get(self.cursor) else {
            return Cmd::none();
        };
        let key = entry.key.clone();
        let store = Arc::clone(&self.store);
        Cmd::task(move || {
            let result = store.delete(&key);
            OverlayMsg::DeleteFinished { key, result }
        })
    }

    fn finish_delete(&mut self, key: &str, result: Result<(), StoreError>) -> Cmd<OverlayMsg> {
        match result {
            Ok(()) => {
                // Editing a key that was just deleted would let a save
                // silently recreate it; end the session instead.
                if self.session.as_ref().is_some_and(|s| s.key() == key) {
                    debug!(key, "edit session auto-cancelled by delete");
                    self.session = None;
                }
                self.reload()
            }
            Err(err) => {
                warn!(key, error = %err, "delete failed");
                self.notice = Some(FailureNotice);
                Cmd::none()
            }
        }
    }
}

/// Enumerate all keys, then bulk-read their values. Rows whose key
/// vanished between the two calls are dropped rather than shown empty.
fn load_snapshot(store: &dyn KvStore) -> Result<Vec<StorageEntry>, StoreError> {
    let keys = store.list_keys()?;
    let values = store.read_many(&keys)?;
    Ok(values
        .into_iter()
        .filter_map(|(key, value)| value.map(|value| StorageEntry { key, value }))
        .collect())
}
