//! # Simulated Host
//!
//! A deterministic in-memory host for exercising file-access flows without a
//! real platform.
//!
//! - Entry points are chosen at construction, so every generation can be
//!   simulated, including transitional hosts exposing both.
//! - Dialog answers are scripted up front; an empty script means the user
//!   dismissed the dialog.
//! - Write permission is tracked per file and enforced on every
//!   `create_writable`, the way a real host re-prompts.
//! - Faults are one-shot: each injected fault fires on the next matching call
//!   and is then consumed.
//! - Staged bytes live in per-stream buffers and only reach the file on close.

use core_types::StreamId;
use std::collections::{BTreeMap, BTreeSet, VecDeque};

use crate::error::HostError;
use crate::generation::{CapabilityProbe, EntryPoint};
use crate::host::{FileAccessHost, WritableStream};
use crate::picker_options::{
    LegacyPickerOptions, ModernPickerOptions, PickerIntent, PickerOptions,
};

/// Raw handle issued by the simulated host
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SimHandle {
    path: String,
}

impl SimHandle {
    pub fn path(&self) -> &str {
        &self.path
    }
}

/// Scripted answer to the next dialog
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DialogResponse {
    /// User picked these paths
    Select(Vec<String>),
    /// User closed the dialog
    Dismiss,
    /// Host refused to show the dialog
    Deny(String),
}

impl DialogResponse {
    pub fn select(path: impl Into<String>) -> Self {
        DialogResponse::Select(vec![path.into()])
    }
}

/// One-shot fault
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostFault {
    /// Next `read_file` is refused
    DenyRead,
    /// Next `create_writable` is refused
    DenyWrite,
    /// Next `write_chunk` fails
    FailWrite,
    /// Next `close_writable` is interrupted before the content is published
    FailClose,
}

/// Record of a host call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostCall {
    OpenPicker,
    SavePicker,
    ChooseEntries(PickerIntent),
    Read(String),
    CreateWritable(String),
    WriteChunk { path: String, len: usize },
    Close(String),
    Abort(String),
}

#[derive(Debug, Clone)]
struct SimFile {
    data: Vec<u8>,
    writable: bool,
}

#[derive(Debug, Clone)]
struct StagedWrite {
    path: String,
    data: Vec<u8>,
}

/// In-memory file-access host
#[derive(Debug, Clone, Default)]
pub struct SimulatedHost {
    entry_points: BTreeSet<EntryPoint>,
    files: BTreeMap<String, SimFile>,
    dialogs: VecDeque<DialogResponse>,
    faults: Vec<HostFault>,
    staged: BTreeMap<StreamId, StagedWrite>,
    calls: Vec<HostCall>,
    last_options: Option<PickerOptions>,
}

impl SimulatedHost {
    /// Creates a host exposing the given entry points
    pub fn new(entry_points: impl IntoIterator<Item = EntryPoint>) -> Self {
        Self {
            entry_points: entry_points.into_iter().collect(),
            ..Self::default()
        }
    }

    pub fn modern() -> Self {
        Self::new([EntryPoint::OpenFilePicker, EntryPoint::SaveFilePicker])
    }

    pub fn legacy() -> Self {
        Self::new([EntryPoint::ChooseFileSystemEntries])
    }

    /// Host exposing both generations
    pub fn transitional() -> Self {
        Self::new([
            EntryPoint::OpenFilePicker,
            EntryPoint::SaveFilePicker,
            EntryPoint::ChooseFileSystemEntries,
        ])
    }

    pub fn unsupported() -> Self {
        Self::new([])
    }

    /// Adds a file, writable unless revoked later
    pub fn with_file(mut self, path: impl Into<String>, content: impl AsRef<[u8]>) -> Self {
        self.insert_file(path, content);
        self
    }

    /// Queues a dialog answer
    pub fn with_dialog(mut self, response: DialogResponse) -> Self {
        self.push_dialog(response);
        self
    }

    pub fn insert_file(&mut self, path: impl Into<String>, content: impl AsRef<[u8]>) {
        self.files.insert(
            path.into(),
            SimFile {
                data: content.as_ref().to_vec(),
                writable: true,
            },
        );
    }

    /// Deletes a file behind the back of any handle
    pub fn remove_file(&mut self, path: &str) -> bool {
        self.files.remove(path).is_some()
    }

    pub fn push_dialog(&mut self, response: DialogResponse) {
        self.dialogs.push_back(response);
    }

    pub fn inject(&mut self, fault: HostFault) {
        self.faults.push(fault);
    }

    /// Revokes the write grant for a file
    pub fn revoke_write(&mut self, path: &str) {
        if let Some(file) = self.files.get_mut(path) {
            file.writable = false;
        }
    }

    pub fn grant_write(&mut self, path: &str) {
        if let Some(file) = self.files.get_mut(path) {
            file.writable = true;
        }
    }

    pub fn file_bytes(&self, path: &str) -> Option<&[u8]> {
        self.files.get(path).map(|file| file.data.as_slice())
    }

    pub fn file_content(&self, path: &str) -> Option<String> {
        self.file_bytes(path)
            .and_then(|data| String::from_utf8(data.to_vec()).ok())
    }

    pub fn calls(&self) -> &[HostCall] {
        &self.calls
    }

    pub fn count_calls<F>(&self, predicate: F) -> usize
    where
        F: Fn(&HostCall) -> bool,
    {
        self.calls.iter().filter(|call| predicate(call)).count()
    }

    /// Number of streams that were opened and not yet closed or aborted
    pub fn open_stream_count(&self) -> usize {
        self.staged.len()
    }

    /// Options passed to the most recent dialog
    pub fn last_options(&self) -> Option<&PickerOptions> {
        self.last_options.as_ref()
    }

    pub fn pending_dialogs(&self) -> usize {
        self.dialogs.len()
    }

    fn take_fault(&mut self, fault: HostFault) -> bool {
        match self.faults.iter().position(|f| *f == fault) {
            Some(index) => {
                self.faults.remove(index);
                true
            }
            None => false,
        }
    }

    fn require(&self, entry: EntryPoint) -> Result<(), HostError> {
        if self.entry_points.contains(&entry) {
            Ok(())
        } else {
            Err(HostError::EntryPointMissing(entry))
        }
    }

    fn next_dialog(&mut self, options: PickerOptions) -> Result<Vec<String>, HostError> {
        let response = self.dialogs.pop_front();
        let result = match response {
            None | Some(DialogResponse::Dismiss) => Err(HostError::Dismissed),
            Some(DialogResponse::Deny(reason)) => Err(HostError::NotAllowed(reason)),
            Some(DialogResponse::Select(paths)) if paths.is_empty() => Err(HostError::Dismissed),
            Some(DialogResponse::Select(paths)) => {
                match paths.iter().find(|path| !options.accepts_name(path)) {
                    Some(rejected) => Err(HostError::NotAllowed(format!(
                        "{} is not an accepted file type",
                        rejected
                    ))),
                    None => Ok(paths),
                }
            }
        };
        self.last_options = Some(options);
        result
    }

    fn open_existing(&self, path: String) -> Result<SimHandle, HostError> {
        if self.files.contains_key(&path) {
            Ok(SimHandle { path })
        } else {
            Err(HostError::NotFound(path))
        }
    }

    fn save_target(&mut self, path: String) -> SimHandle {
        let file = self.files.entry(path.clone()).or_insert(SimFile {
            data: Vec::new(),
            writable: true,
        });
        file.writable = true;
        SimHandle { path }
    }

    fn first(paths: Vec<String>) -> Result<String, HostError> {
        paths.into_iter().next().ok_or(HostError::Dismissed)
    }
}

impl CapabilityProbe for SimulatedHost {
    fn has_entry_point(&self, entry: EntryPoint) -> bool {
        self.entry_points.contains(&entry)
    }
}

impl FileAccessHost for SimulatedHost {
    type RawHandle = SimHandle;

    fn show_open_file_picker(
        &mut self,
        options: &ModernPickerOptions,
    ) -> Result<Vec<SimHandle>, HostError> {
        self.require(EntryPoint::OpenFilePicker)?;
        self.calls.push(HostCall::OpenPicker);

        let mut paths = self.next_dialog(PickerOptions::Modern(options.clone()))?;
        if !options.multiple {
            paths.truncate(1);
        }
        paths
            .into_iter()
            .map(|path| self.open_existing(path))
            .collect()
    }

    fn show_save_file_picker(
        &mut self,
        options: &ModernPickerOptions,
    ) -> Result<SimHandle, HostError> {
        self.require(EntryPoint::SaveFilePicker)?;
        self.calls.push(HostCall::SavePicker);

        let paths = self.next_dialog(PickerOptions::Modern(options.clone()))?;
        let path = Self::first(paths)?;
        Ok(self.save_target(path))
    }

    fn choose_file_system_entries(
        &mut self,
        options: &LegacyPickerOptions,
    ) -> Result<SimHandle, HostError> {
        self.require(EntryPoint::ChooseFileSystemEntries)?;
        self.calls.push(HostCall::ChooseEntries(options.intent));

        let paths = self.next_dialog(PickerOptions::Legacy(options.clone()))?;
        let path = Self::first(paths)?;
        match options.intent {
            PickerIntent::OpenFile => self.open_existing(path),
            PickerIntent::SaveFile => Ok(self.save_target(path)),
        }
    }

    fn handle_name(&self, handle: &SimHandle) -> String {
        handle
            .path
            .rsplit('/')
            .next()
            .unwrap_or(&handle.path)
            .to_string()
    }

    fn read_file(&mut self, handle: &SimHandle) -> Result<Vec<u8>, HostError> {
        self.calls.push(HostCall::Read(handle.path.clone()));
        if self.take_fault(HostFault::DenyRead) {
            return Err(HostError::NotAllowed("read access was refused".to_string()));
        }
        self.files
            .get(&handle.path)
            .map(|file| file.data.clone())
            .ok_or_else(|| HostError::NotFound(handle.path.clone()))
    }

    fn create_writable(&mut self, handle: &SimHandle) -> Result<WritableStream, HostError> {
        self.calls.push(HostCall::CreateWritable(handle.path.clone()));
        if self.take_fault(HostFault::DenyWrite) {
            return Err(HostError::NotAllowed("write access was refused".to_string()));
        }

        let file = self
            .files
            .get(&handle.path)
            .ok_or_else(|| HostError::NotFound(handle.path.clone()))?;
        if !file.writable {
            return Err(HostError::NotAllowed(format!(
                "write permission was revoked for {}",
                handle.path
            )));
        }

        let stream = WritableStream::new();
        self.staged.insert(
            stream.id(),
            StagedWrite {
                path: handle.path.clone(),
                data: Vec::new(),
            },
        );
        Ok(stream)
    }

    fn write_chunk(&mut self, stream: &mut WritableStream, data: &[u8]) -> Result<(), HostError> {
        stream.ensure_open()?;
        let path = self
            .staged
            .get(&stream.id())
            .map(|staged| staged.path.clone())
            .ok_or_else(|| HostError::Io(format!("unknown {}", stream.id())))?;
        self.calls.push(HostCall::WriteChunk {
            path,
            len: data.len(),
        });

        if self.take_fault(HostFault::FailWrite) {
            return Err(HostError::Io("stream write failed".to_string()));
        }

        if let Some(staged) = self.staged.get_mut(&stream.id()) {
            staged.data.extend_from_slice(data);
        }
        stream.record_write(data.len())
    }

    fn close_writable(&mut self, stream: &mut WritableStream) -> Result<(), HostError> {
        stream.ensure_open()?;
        let staged = self
            .staged
            .remove(&stream.id())
            .ok_or_else(|| HostError::Io(format!("unknown {}", stream.id())))?;
        self.calls.push(HostCall::Close(staged.path.clone()));

        if self.take_fault(HostFault::FailClose) {
            stream.abort()?;
            return Err(HostError::Io(
                "stream was interrupted before it could be finalized".to_string(),
            ));
        }

        let Some(file) = self.files.get_mut(&staged.path) else {
            stream.abort()?;
            return Err(HostError::NotFound(staged.path));
        };
        file.data = staged.data;
        stream.finish()
    }

    fn abort_writable(&mut self, stream: &mut WritableStream) -> Result<(), HostError> {
        stream.ensure_open()?;
        if let Some(staged) = self.staged.remove(&stream.id()) {
            self.calls.push(HostCall::Abort(staged.path));
        }
        stream.abort()
    }
}
