//! Host capability boundary
//!
//! A host is whatever actually owns the files: a sandboxed platform API, the
//! local filesystem, or a simulation. It is injected as a value implementing
//! [`FileAccessHost`] instead of being reached for as a global.

use core::fmt;
use core_types::StreamId;

use crate::error::HostError;
use crate::generation::CapabilityProbe;
use crate::picker_options::{LegacyPickerOptions, ModernPickerOptions};

/// Writable stream state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamState {
    /// Accepting chunks; nothing is visible at the target yet
    Open,
    /// Finalized; content is durable at the target
    Closed,
    /// Discarded; the target was never touched
    Aborted,
}

/// A staged write against one file
///
/// Like a storage transaction, the stream itself only tracks identity and
/// state; the host keeps the staged bytes keyed by [`StreamId`] and publishes
/// them on close.
#[derive(Debug)]
pub struct WritableStream {
    id: StreamId,
    state: StreamState,
    bytes_written: usize,
}

impl WritableStream {
    /// Creates an open stream
    pub fn new() -> Self {
        Self {
            id: StreamId::new(),
            state: StreamState::Open,
            bytes_written: 0,
        }
    }

    pub fn id(&self) -> StreamId {
        self.id
    }

    pub fn state(&self) -> StreamState {
        self.state
    }

    pub fn bytes_written(&self) -> usize {
        self.bytes_written
    }

    /// Records a staged chunk
    pub fn record_write(&mut self, len: usize) -> Result<(), HostError> {
        self.ensure_open()?;
        self.bytes_written += len;
        Ok(())
    }

    /// Marks the stream finalized
    pub fn finish(&mut self) -> Result<(), HostError> {
        self.ensure_open()?;
        self.state = StreamState::Closed;
        Ok(())
    }

    /// Marks the stream discarded
    pub fn abort(&mut self) -> Result<(), HostError> {
        self.ensure_open()?;
        self.state = StreamState::Aborted;
        self.bytes_written = 0;
        Ok(())
    }

    pub fn ensure_open(&self) -> Result<(), HostError> {
        match self.state {
            StreamState::Open => Ok(()),
            StreamState::Closed => Err(HostError::Io(format!("{} is already closed", self.id))),
            StreamState::Aborted => Err(HostError::Io(format!("{} was aborted", self.id))),
        }
    }
}

impl Default for WritableStream {
    fn default() -> Self {
        Self::new()
    }
}

/// Host file-access capability surface
///
/// Permission state lives entirely inside the host. Every call may fail with
/// [`HostError::NotAllowed`], including calls on a handle that succeeded before.
pub trait FileAccessHost: CapabilityProbe {
    /// Opaque host reference to a file
    type RawHandle: Clone + fmt::Debug + PartialEq;

    /// Modern open dialog; may return several handles when multi-select is on
    fn show_open_file_picker(
        &mut self,
        options: &ModernPickerOptions,
    ) -> Result<Vec<Self::RawHandle>, HostError>;

    /// Modern save dialog; the handle comes back pre-authorized for write
    fn show_save_file_picker(
        &mut self,
        options: &ModernPickerOptions,
    ) -> Result<Self::RawHandle, HostError>;

    /// Legacy unified dialog, open or save depending on `options.intent`
    fn choose_file_system_entries(
        &mut self,
        options: &LegacyPickerOptions,
    ) -> Result<Self::RawHandle, HostError>;

    /// Display name of the file behind a handle
    fn handle_name(&self, handle: &Self::RawHandle) -> String;

    /// Reads the full content behind a handle
    fn read_file(&mut self, handle: &Self::RawHandle) -> Result<Vec<u8>, HostError>;

    /// Opens a staged write stream, re-validating write permission
    fn create_writable(&mut self, handle: &Self::RawHandle) -> Result<WritableStream, HostError>;

    /// Stages a chunk; nothing reaches the target yet
    fn write_chunk(&mut self, stream: &mut WritableStream, data: &[u8]) -> Result<(), HostError>;

    /// Publishes staged content to the target
    ///
    /// On failure the previous content of the target must be intact.
    fn close_writable(&mut self, stream: &mut WritableStream) -> Result<(), HostError>;

    /// Discards staged content
    fn abort_writable(&mut self, stream: &mut WritableStream) -> Result<(), HostError>;
}
