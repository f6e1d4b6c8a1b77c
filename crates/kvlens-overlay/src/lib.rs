#![forbid(unsafe_code)]

//! A developer-facing key/value store inspector overlay.
//!
//! Closed, the overlay shows only a small trigger badge; a hotkey
//! opens a panel listing every entry in the attached [`kvlens_store::KvStore`].
//! Rows can be edited in a modal dialog or deleted in place, and the
//! listing can be reloaded on demand. The listing is a point-in-time
//! snapshot, replaced wholesale on every reload.
//!
//! The component is a sub-model in the Elm sense: the host maps key
//! events through [`Overlay::map_key`], feeds the resulting
//! [`OverlayMsg`] into [`Overlay::update`], and lifts the returned
//! command into its own message type with `Cmd::map`. Rendering is a
//! single call in the host's `view`, after the host has drawn its own
//! screen.
//!
//! # Example
//!
//! ```ignore
//! let store = Arc::new(JsonFileStore::open("state.json"));
//! let overlay = Overlay::new(store, OverlayConfig::default().enabled(cfg!(debug_assertions)));
//! // in update():  overlay.update(msg).map(Msg::Overlay)
//! // in view():    kvlens_overlay::render(&overlay, frame)
//! ```

mod config;
mod msg;
mod overlay;
mod session;
mod view;

pub use config::OverlayConfig;
pub use msg::OverlayMsg;
pub use overlay::{FailureNotice, Overlay, StorageEntry};
pub use session::EditSession;
pub use view::render;
