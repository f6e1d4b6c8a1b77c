#![forbid(unsafe_code)]

mod app;
mod msg;

use std::env;
use std::fs::File;
use std::io;
use std::sync::Arc;

use kvlens_overlay::{Overlay, OverlayConfig};
use kvlens_runtime::{Program, ProgramConfig};
use kvlens_store::{JsonFileStore, KvStore};
use tracing_subscriber::EnvFilter;

fn main() -> io::Result<()> {
    init_logging();

    let path = env::args()
        .nth(1)
        .unwrap_or_else(|| "kvlens-demo-store.json".to_string());
    let store = Arc::new(JsonFileStore::open(path));
    seed_if_empty(store.as_ref());

    let overlay = Overlay::new(
        store,
        OverlayConfig::default()
            .enabled(cfg!(debug_assertions))
            .with_title("kvlens demo store"),
    );

    let program = Program::with_config(app::DemoApp::new(overlay), ProgramConfig::default());
    program.run()?;
    Ok(())
}

/// Tracing goes to a file named by `KVLENS_LOG`, never to the
/// terminal the UI owns. Unset means no subscriber at all.
fn init_logging() {
    let Ok(path) = env::var("KVLENS_LOG") else {
        return;
    };
    let Ok(file) = File::create(&path) else {
        eprintln!("kvlens-demo: cannot open log file {path}");
        return;
    };
    tracing_subscriber::fmt()
        .json()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(Arc::new(file))
        .init();
}

/// Give the inspector something to look at on first run.
fn seed_if_empty(store: &dyn KvStore) {
    let seeded = store.list_keys().map(|keys| !keys.is_empty());
    if seeded.unwrap_or(true) {
        return;
    }
    let defaults = [
        ("app.theme", "dark"),
        ("app.locale", "en-US"),
        ("auth.token", "redacted-demo-token"),
        ("cart.items", "[{\"sku\":\"kv-001\",\"qty\":2}]"),
        ("onboarding.done", "true"),
    ];
    for (key, value) in defaults {
        if let Err(err) = store.write(key, value) {
            tracing::warn!(key, error = %err, "seeding failed");
        }
    }
}
