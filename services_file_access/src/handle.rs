//! File handles
//!
//! A [`FileHandle`] wraps the host's raw reference together with the
//! generation it was acquired under. It never caches permission: reads and
//! writes go to the host every time and may be refused every time.

use core_types::HandleId;
use std::fmt;

use crate::error::{FileAccessError, HostError};
use crate::generation::CapabilityGeneration;
use crate::host::FileAccessHost;
use crate::picker_options::{FileTypeFilter, PickerIntent, PickerOptions};

/// Reference to a single file on the host
#[derive(Debug, Clone, PartialEq)]
pub struct FileHandle<R> {
    id: HandleId,
    generation: CapabilityGeneration,
    name: String,
    raw: R,
}

impl<R> FileHandle<R>
where
    R: Clone + fmt::Debug + PartialEq,
{
    /// Acquires a handle through the host's open dialog
    ///
    /// With multi-select the host may return several files; only the first is
    /// kept.
    pub fn acquire_for_read<H>(
        host: &mut H,
        generation: CapabilityGeneration,
        filters: &[FileTypeFilter],
        multiple: bool,
    ) -> Result<Self, FileAccessError>
    where
        H: FileAccessHost<RawHandle = R> + ?Sized,
    {
        let options = picker_options(generation, PickerIntent::OpenFile, filters, multiple)?;
        let raw = match options {
            PickerOptions::Modern(options) => {
                let mut handles = host.show_open_file_picker(&options)?.into_iter();
                let first = handles.next().ok_or(HostError::Dismissed)?;
                let discarded = handles.count();
                if discarded > 0 {
                    tracing::debug!(discarded, "multiple files selected, keeping the first");
                }
                first
            }
            PickerOptions::Legacy(options) => host.choose_file_system_entries(&options)?,
        };
        Ok(Self::from_raw(host, generation, raw))
    }

    /// Acquires a handle through the host's save dialog
    ///
    /// The returned handle carries the write grant the dialog implies.
    pub fn acquire_for_write<H>(
        host: &mut H,
        generation: CapabilityGeneration,
        filters: &[FileTypeFilter],
    ) -> Result<Self, FileAccessError>
    where
        H: FileAccessHost<RawHandle = R> + ?Sized,
    {
        let options = picker_options(generation, PickerIntent::SaveFile, filters, false)?;
        let raw = match options {
            PickerOptions::Modern(options) => host.show_save_file_picker(&options)?,
            PickerOptions::Legacy(options) => host.choose_file_system_entries(&options)?,
        };
        Ok(Self::from_raw(host, generation, raw))
    }

    fn from_raw<H>(host: &H, generation: CapabilityGeneration, raw: R) -> Self
    where
        H: FileAccessHost<RawHandle = R> + ?Sized,
    {
        let handle = Self {
            id: HandleId::new(),
            generation,
            name: host.handle_name(&raw),
            raw,
        };
        tracing::debug!(
            handle = %handle.id,
            name = %handle.name,
            %generation,
            "acquired file handle"
        );
        handle
    }

    pub fn id(&self) -> HandleId {
        self.id
    }

    pub fn generation(&self) -> CapabilityGeneration {
        self.generation
    }

    /// Host-provided display name
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn raw(&self) -> &R {
        &self.raw
    }

    /// Reads the whole file as UTF-8 text
    pub fn read_text<H>(&self, host: &mut H) -> Result<String, FileAccessError>
    where
        H: FileAccessHost<RawHandle = R> + ?Sized,
    {
        let bytes = host.read_file(&self.raw)?;
        String::from_utf8(bytes)
            .map_err(|_| FileAccessError::Io("content is not valid UTF-8 text".to_string()))
    }

    /// Writes `content` through a staged stream
    ///
    /// Opening the stream re-validates write permission with the host. If any
    /// step before finalize fails, the stream is aborted and the file keeps its
    /// previous content.
    pub fn write_text_staged<H>(&self, host: &mut H, content: &str) -> Result<(), FileAccessError>
    where
        H: FileAccessHost<RawHandle = R> + ?Sized,
    {
        let mut stream = host.create_writable(&self.raw)?;

        if let Err(err) = host.write_chunk(&mut stream, content.as_bytes()) {
            if let Err(abort_err) = host.abort_writable(&mut stream) {
                tracing::debug!(handle = %self.id, error = %abort_err, "abort after failed write");
            }
            return Err(err.into());
        }

        host.close_writable(&mut stream)?;
        tracing::debug!(
            handle = %self.id,
            bytes = stream.bytes_written(),
            "staged write finalized"
        );
        Ok(())
    }
}

fn picker_options(
    generation: CapabilityGeneration,
    intent: PickerIntent,
    filters: &[FileTypeFilter],
    multiple: bool,
) -> Result<PickerOptions, FileAccessError> {
    PickerOptions::for_generation(generation, intent, filters, multiple).ok_or_else(|| {
        FileAccessError::Unsupported("no file access capability is available".to_string())
    })
}
