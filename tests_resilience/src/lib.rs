//! Resilience Test Utilities
//!
//! Shared helpers for the fault and lifecycle tests of document persistence.
//!
//! ## Test Philosophy
//!
//! - **Safety under faults**: a failed write never leaves partial content behind
//! - **Deterministic failures**: every fault is scripted on the simulated host
//! - **One handle slot**: the current handle changes only on a successful flow
//! - **Real filesystem too**: the same flows run against [`LocalFsHost`] in a
//!   temporary directory

use services_document_persistence::{FlowOutcome, PersistenceController};
use services_file_access::{DialogResponse, LocalFsHost, ScriptedDialog, SimulatedHost};
use std::path::Path;
use tempfile::TempDir;

/// Routes `tracing` output through the test harness
///
/// Safe to call from every test; only the first call installs the subscriber.
/// Honors `RUST_LOG`, defaulting to `debug` for the persistence crates.
pub fn init_test_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        tracing_subscriber::EnvFilter::new(
            "services_file_access=debug,services_document_persistence=debug",
        )
    });
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_test_writer()
        .try_init();
}

/// Controller over a modern simulated host with `path` already opened
pub fn opened_sim_controller(path: &str, content: &str) -> PersistenceController<SimulatedHost> {
    init_test_tracing();
    let host = SimulatedHost::modern()
        .with_file(path, content)
        .with_dialog(DialogResponse::select(path));
    let mut controller = PersistenceController::new(host);
    match controller.open() {
        FlowOutcome::Completed(text) => assert_eq!(text, content),
        other => panic!("bootstrap open failed: {:?}", other),
    }
    controller
}

/// Controller over the local filesystem, rooted in a fresh temp directory
pub fn local_controller() -> (TempDir, PersistenceController<LocalFsHost>) {
    init_test_tracing();
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let controller = PersistenceController::new(LocalFsHost::new(ScriptedDialog::new()));
    (dir, controller)
}

/// Names of everything in `dir`, sorted
pub fn dir_listing(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = std::fs::read_dir(dir)
        .expect("Failed to read dir")
        .map(|entry| {
            entry
                .expect("Failed to read entry")
                .file_name()
                .to_string_lossy()
                .into_owned()
        })
        .collect();
    names.sort();
    names
}
