#![forbid(unsafe_code)]

//! Overlay messages.

use kvlens_store::StoreError;

use crate::overlay::StorageEntry;

/// Everything that can happen to the overlay.
///
/// User intents come out of [`crate::Overlay::map_key`]; the
/// `*Finished` variants are delivered by the runtime when a background
/// storage task completes.
#[derive(Debug)]
pub enum OverlayMsg {
    /// Show the panel. Always implies a fresh reload.
    Open,
    /// Hide the panel. In-memory state (including any edit session)
    /// survives until the next explicit action.
    Close,
    /// Manual reload of the listing.
    ReloadRequested,
    /// A snapshot load completed. `seq` identifies the request that
    /// issued it; stale completions are discarded.
    ReloadFinished {
        seq: u64,
        result: Result<Vec<StorageEntry>, StoreError>,
    },
    /// Move the row cursor up.
    CursorUp,
    /// Move the row cursor down.
    CursorDown,
    /// Start editing the selected row.
    EditRequested,
    /// Append a character to the draft.
    DraftInput(char),
    /// Append a line break to the draft.
    DraftNewline,
    /// Delete the last character of the draft.
    DraftBackspace,
    /// Persist the draft under the session's key.
    SaveRequested,
    /// The write behind a save completed.
    SaveFinished {
        key: String,
        result: Result<(), StoreError>,
    },
    /// Abandon the session without writing.
    CancelRequested,
    /// Delete the selected row's key from storage.
    DeleteRequested,
    /// The delete completed.
    DeleteFinished {
        key: String,
        result: Result<(), StoreError>,
    },
    /// Dismiss the failure notice.
    NoticeDismissed,
}
