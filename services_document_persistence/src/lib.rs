//! # Document Persistence Service
//!
//! Single-document open / save / save-as on top of a host file-access
//! capability.
//!
//! ## Philosophy
//!
//! - **One handle slot**: the controller owns the current file handle and is
//!   the only thing that ever replaces it
//! - **Replace after success**: a new handle becomes current only once its
//!   first read or write has completed
//! - **Errors are status, not faults**: flows return a [`FlowOutcome`] and
//!   describe failures on the status line as `<ErrorKind> - <detail>`
//!
//! ## Non-Goals
//!
//! - Remembering handles across sessions
//! - Resolving concurrent writers
//! - Anything beyond one document at a time
//!
//! ## Example
//!
//! ```
//! use services_document_persistence::{FlowOutcome, PersistenceController, SessionKind};
//! use services_file_access::{DialogResponse, SimulatedHost};
//!
//! let host = SimulatedHost::modern().with_dialog(DialogResponse::select("/notes.txt"));
//! let mut controller = PersistenceController::new(host);
//!
//! // Nothing is open yet, so save goes through the save dialog.
//! assert_eq!(controller.save("hello"), FlowOutcome::Completed(()));
//! assert_eq!(controller.state().kind(), SessionKind::HasHandle);
//! assert_eq!(controller.host().file_content("/notes.txt").as_deref(), Some("hello"));
//! ```

pub mod config;
pub mod controller;
pub mod status;

pub use config::{
    CancellationFeedback, ConfigError, PersistenceConfig, DEFAULT_UNSUPPORTED_ADVISORY,
};
pub use controller::{FlowOutcome, PersistenceController, SessionKind, SessionState};
pub use status::{StatusLine, StatusReporter};
