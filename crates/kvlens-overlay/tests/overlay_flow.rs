//! End-to-end overlay flows against an in-memory store.
//!
//! `drain` executes the update's background tasks inline, so each test
//! drives the full action -> task -> completion -> reload chain on one
//! thread, in a chosen order.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use kvlens_overlay::{Overlay, OverlayConfig, OverlayMsg};
use kvlens_runtime::{Cmd, drain};
use kvlens_store::{KvStore, MemoryStore, StoreError};

/// Run a command and feed every produced message back into the
/// overlay until nothing is left to do.
fn drive(overlay: &mut Overlay, cmd: Cmd<OverlayMsg>) {
    let (msgs, _quit) = drain(cmd);
    for msg in msgs {
        let next = overlay.update(msg);
        drive(overlay, next);
    }
}

fn send(overlay: &mut Overlay, msg: OverlayMsg) {
    let cmd = overlay.update(msg);
    drive(overlay, cmd);
}

fn task_of(cmd: Cmd<OverlayMsg>) -> Box<dyn FnOnce() -> OverlayMsg + Send> {
    match cmd {
        Cmd::Task(f) => f,
        other => panic!("expected a single task, got {other:?}"),
    }
}

fn listing_pairs(overlay: &Overlay) -> Vec<(String, String)> {
    overlay
        .listing()
        .iter()
        .map(|e| (e.key.clone(), e.value.clone()))
        .collect()
}

/// Store wrapper with an injectable backend fault on enumeration.
#[derive(Clone)]
struct FlakyStore {
    inner: MemoryStore,
    fail: Arc<AtomicBool>,
}

impl FlakyStore {
    fn new(inner: MemoryStore) -> Self {
        Self {
            inner,
            fail: Arc::new(AtomicBool::new(false)),
        }
    }

    fn set_failing(&self, failing: bool) {
        self.fail.store(failing, Ordering::SeqCst);
    }
}

impl KvStore for FlakyStore {
    fn list_keys(&self) -> Result<Vec<String>, StoreError> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("injected backend fault".into()));
        }
        self.inner.list_keys()
    }

    fn read_many(&self, keys: &[String]) -> Result<Vec<(String, Option<String>)>, StoreError> {
        self.inner.read_many(keys)
    }

    fn write(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.inner.write(key, value)
    }

    fn delete(&self, key: &str) -> Result<(), StoreError> {
        self.inner.delete(key)
    }
}

#[test]
fn open_lists_all_entries_in_enumeration_order() {
    let store = MemoryStore::seeded([("a", "1"), ("b", "2")]);
    let mut overlay = Overlay::new(Arc::new(store), OverlayConfig::default());

    send(&mut overlay, OverlayMsg::Open);

    assert!(overlay.is_visible());
    assert_eq!(
        listing_pairs(&overlay),
        vec![
            ("a".to_string(), "1".to_string()),
            ("b".to_string(), "2".to_string()),
        ]
    );
}

#[test]
fn open_issues_exactly_one_reload() {
    let store = MemoryStore::seeded([("a", "1")]);
    let mut overlay = Overlay::new(Arc::new(store), OverlayConfig::default());

    // One task, not a batch: the listing is loaded exactly once per open.
    let cmd = overlay.update(OverlayMsg::Open);
    assert!(matches!(cmd, Cmd::Task(_)));
    drive(&mut overlay, cmd);
    assert_eq!(overlay.listing().len(), 1);
}

#[test]
fn save_round_trips_the_draft() {
    let store = MemoryStore::seeded([("a", "1"), ("b", "2")]);
    let mut overlay = Overlay::new(Arc::new(store.clone()), OverlayConfig::default());
    send(&mut overlay, OverlayMsg::Open);

    send(&mut overlay, OverlayMsg::EditRequested);
    send(&mut overlay, OverlayMsg::DraftBackspace);
    send(&mut overlay, OverlayMsg::DraftInput('9'));
    send(&mut overlay, OverlayMsg::DraftInput('9'));
    assert_eq!(overlay.session().unwrap().draft(), "99");

    send(&mut overlay, OverlayMsg::SaveRequested);

    assert_eq!(store.snapshot()["a"], "99");
    assert!(overlay.session().is_none());
    assert!(listing_pairs(&overlay).contains(&("a".to_string(), "99".to_string())));
}

#[test]
fn cancel_leaves_storage_and_listing_untouched() {
    let store = MemoryStore::seeded([("a", "1"), ("b", "2")]);
    let mut overlay = Overlay::new(Arc::new(store.clone()), OverlayConfig::default());
    send(&mut overlay, OverlayMsg::Open);
    let before = store.snapshot();
    let listing_before = listing_pairs(&overlay);

    send(&mut overlay, OverlayMsg::EditRequested);
    send(&mut overlay, OverlayMsg::DraftInput('9'));
    send(&mut overlay, OverlayMsg::DraftInput('9'));
    send(&mut overlay, OverlayMsg::CancelRequested);

    assert!(overlay.session().is_none());
    assert_eq!(store.snapshot(), before);
    assert_eq!(listing_pairs(&overlay), listing_before);
}

#[test]
fn delete_removes_the_row() {
    let store = MemoryStore::seeded([("a", "1"), ("b", "2")]);
    let mut overlay = Overlay::new(Arc::new(store.clone()), OverlayConfig::default());
    send(&mut overlay, OverlayMsg::Open);

    send(&mut overlay, OverlayMsg::CursorDown);
    send(&mut overlay, OverlayMsg::DeleteRequested);

    assert!(!store.snapshot().contains_key("b"));
    assert_eq!(
        listing_pairs(&overlay),
        vec![("a".to_string(), "1".to_string())]
    );
}

#[test]
fn load_failure_preserves_previous_listing_and_raises_one_notice() {
    let store = FlakyStore::new(MemoryStore::seeded([("a", "1"), ("b", "2")]));
    let handle = store.clone();
    let mut overlay = Overlay::new(Arc::new(store), OverlayConfig::default());
    send(&mut overlay, OverlayMsg::Open);
    assert_eq!(overlay.listing().len(), 2);

    handle.set_failing(true);
    send(&mut overlay, OverlayMsg::ReloadRequested);

    assert_eq!(overlay.listing().len(), 2, "previous listing must survive");
    assert!(overlay.notice().is_some());

    // Dismiss, fix the backend, retry manually: the widget stays usable.
    send(&mut overlay, OverlayMsg::NoticeDismissed);
    handle.set_failing(false);
    send(&mut overlay, OverlayMsg::ReloadRequested);
    assert!(overlay.notice().is_none());
    assert_eq!(overlay.listing().len(), 2);
}

#[test]
fn stale_reload_is_discarded_in_favor_of_latest() {
    let store = MemoryStore::seeded([("a", "1")]);
    let mut overlay = Overlay::new(Arc::new(store.clone()), OverlayConfig::default());
    send(&mut overlay, OverlayMsg::Open);

    // Two reloads issued back to back; the first one's I/O completes
    // after the second's.
    let first = task_of(overlay.update(OverlayMsg::ReloadRequested));
    let second = task_of(overlay.update(OverlayMsg::ReloadRequested));

    store.write("a", "2").unwrap();
    let second_done = second();
    store.write("a", "3").unwrap();
    let first_done = first();

    send(&mut overlay, second_done);
    assert_eq!(
        listing_pairs(&overlay),
        vec![("a".to_string(), "2".to_string())]
    );

    // The stale completion carries fresher data, but its token lost.
    send(&mut overlay, first_done);
    assert_eq!(
        listing_pairs(&overlay),
        vec![("a".to_string(), "2".to_string())]
    );
}

#[test]
fn reload_failure_after_successful_save_still_ends_session() {
    let store = FlakyStore::new(MemoryStore::seeded([("a", "1")]));
    let mut overlay = Overlay::new(Arc::new(store.clone()), OverlayConfig::default());
    send(&mut overlay, OverlayMsg::Open);
    send(&mut overlay, OverlayMsg::EditRequested);
    send(&mut overlay, OverlayMsg::DraftInput('x'));

    // Write succeeds but the induced reload hits a backend fault: the
    // session still ends, and the failure surfaces as the notice.
    store.set_failing(true);
    send(&mut overlay, OverlayMsg::SaveRequested);
    assert!(overlay.session().is_none());
    assert!(overlay.notice().is_some());
    assert_eq!(store.inner.snapshot()["a"], "1x");
}

#[test]
fn delete_of_edited_key_ends_the_session() {
    let store = MemoryStore::seeded([("a", "1"), ("b", "2")]);
    let mut overlay = Overlay::new(Arc::new(store.clone()), OverlayConfig::default());
    send(&mut overlay, OverlayMsg::Open);

    send(&mut overlay, OverlayMsg::EditRequested);
    assert_eq!(overlay.session().unwrap().key(), "a");
    send(&mut overlay, OverlayMsg::DeleteRequested);

    assert!(overlay.session().is_none());
    assert!(!store.snapshot().contains_key("a"));
}
