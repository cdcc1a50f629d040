//! # File Access Service
//!
//! Capability-negotiated access to user-selected files.
//!
//! ## Philosophy
//!
//! - **No ambient host**: the host capability surface is a value implementing
//!   [`FileAccessHost`], passed in by whoever owns it
//! - **Probe once**: the [`CapabilityGeneration`] is resolved at startup and
//!   then used as configuration
//! - **Permission lives in the host**: handles never cache grants; every read
//!   and write may be refused
//! - **Staged writes**: content is published by closing a [`WritableStream`];
//!   until then the previous content stays in place
//!
//! ## Hosts
//!
//! - [`SimulatedHost`]: deterministic in-memory host with scripted dialogs and
//!   one-shot fault injection
//! - [`LocalFsHost`]: local filesystem with temp-file-and-rename staging

pub mod error;
pub mod generation;
pub mod handle;
pub mod host;
pub mod local_host;
pub mod picker_options;
pub mod sim_host;

pub use error::{ErrorKind, FileAccessError, HostError};
pub use generation::{CapabilityGeneration, CapabilityProbe, CapabilityResolver, EntryPoint};
pub use handle::FileHandle;
pub use host::{FileAccessHost, StreamState, WritableStream};
pub use local_host::{DialogChoice, FileDialog, LocalFsHost, ScriptedDialog};
pub use picker_options::{
    FileTypeFilter, LegacyAccept, LegacyPickerOptions, ModernFileType, ModernPickerOptions,
    PickerIntent, PickerOptions,
};
pub use sim_host::{DialogResponse, HostCall, HostFault, SimHandle, SimulatedHost};
