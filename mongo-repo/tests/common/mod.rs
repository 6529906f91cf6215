#![allow(dead_code)]

use mongo_repo::DriverOptions;
use std::sync::Once;
use tracing_subscriber::EnvFilter;

static INIT: Once = Once::new();

/// Installs a test-friendly subscriber once per test binary. Filter with
/// `RUST_LOG`, e.g. `RUST_LOG=mongo_repo=debug`.
pub fn init_tracing() {
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}

pub fn dsn() -> String {
    std::env::var("MONGO_REPO_TEST_DSN").unwrap_or_else(|_| "mongodb://127.0.0.1:27017".to_owned())
}

pub fn options() -> DriverOptions {
    DriverOptions::new(dsn(), "mongo_repo_tests")
}
