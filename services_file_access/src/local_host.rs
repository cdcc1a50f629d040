//! Local filesystem host
//!
//! Dialogs are delegated to a [`FileDialog`]; everything else goes to the
//! filesystem. Staged writes land in a temporary file next to the target and
//! are published with an atomic rename on close, so the target only ever holds
//! the old content or the complete new content.

use core_types::StreamId;
use std::collections::{BTreeMap, BTreeSet, VecDeque};
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

use crate::error::HostError;
use crate::generation::{CapabilityProbe, EntryPoint};
use crate::host::{FileAccessHost, WritableStream};
use crate::picker_options::{
    LegacyPickerOptions, ModernPickerOptions, PickerIntent, PickerOptions,
};

/// Outcome of a dialog
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DialogChoice {
    Selected(Vec<PathBuf>),
    Dismissed,
}

/// User-facing file selection surface
pub trait FileDialog {
    fn pick_open(&mut self, options: &PickerOptions) -> DialogChoice;
    fn pick_save(&mut self, options: &PickerOptions) -> DialogChoice;
}

/// Dialog that replays queued choices; an empty queue dismisses
#[derive(Debug, Clone, Default)]
pub struct ScriptedDialog {
    choices: VecDeque<DialogChoice>,
}

impl ScriptedDialog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, choice: DialogChoice) {
        self.choices.push_back(choice);
    }

    pub fn select(&mut self, path: impl Into<PathBuf>) {
        self.push(DialogChoice::Selected(vec![path.into()]));
    }

    pub fn dismiss(&mut self) {
        self.push(DialogChoice::Dismissed);
    }

    pub fn remaining(&self) -> usize {
        self.choices.len()
    }

    fn next(&mut self) -> DialogChoice {
        self.choices.pop_front().unwrap_or(DialogChoice::Dismissed)
    }
}

impl FileDialog for ScriptedDialog {
    fn pick_open(&mut self, _options: &PickerOptions) -> DialogChoice {
        self.next()
    }

    fn pick_save(&mut self, _options: &PickerOptions) -> DialogChoice {
        self.next()
    }
}

struct StagedFile {
    target: PathBuf,
    temp: NamedTempFile,
}

/// File-access host backed by the local filesystem
pub struct LocalFsHost<D: FileDialog = ScriptedDialog> {
    dialog: D,
    entry_points: BTreeSet<EntryPoint>,
    staged: BTreeMap<StreamId, StagedFile>,
}

impl<D: FileDialog> LocalFsHost<D> {
    /// Creates a host exposing the modern entry points
    pub fn new(dialog: D) -> Self {
        Self::with_entry_points(
            dialog,
            [EntryPoint::OpenFilePicker, EntryPoint::SaveFilePicker],
        )
    }

    pub fn with_entry_points(
        dialog: D,
        entry_points: impl IntoIterator<Item = EntryPoint>,
    ) -> Self {
        Self {
            dialog,
            entry_points: entry_points.into_iter().collect(),
            staged: BTreeMap::new(),
        }
    }

    pub fn dialog(&self) -> &D {
        &self.dialog
    }

    pub fn dialog_mut(&mut self) -> &mut D {
        &mut self.dialog
    }

    /// Number of staged writes not yet closed or aborted
    pub fn open_stream_count(&self) -> usize {
        self.staged.len()
    }

    fn require(&self, entry: EntryPoint) -> Result<(), HostError> {
        if self.entry_points.contains(&entry) {
            Ok(())
        } else {
            Err(HostError::EntryPointMissing(entry))
        }
    }

    fn pick(
        &mut self,
        options: &PickerOptions,
        intent: PickerIntent,
    ) -> Result<Vec<PathBuf>, HostError> {
        let choice = match intent {
            PickerIntent::OpenFile => self.dialog.pick_open(options),
            PickerIntent::SaveFile => self.dialog.pick_save(options),
        };
        let paths = match choice {
            DialogChoice::Selected(paths) if !paths.is_empty() => paths,
            _ => return Err(HostError::Dismissed),
        };

        for path in &paths {
            let name = file_name(path);
            if !options.accepts_name(&name) {
                return Err(HostError::NotAllowed(format!(
                    "{} is not an accepted file type",
                    name
                )));
            }
        }
        Ok(paths)
    }

    fn open_target(path: PathBuf) -> Result<PathBuf, HostError> {
        let meta = fs::metadata(&path).map_err(|err| map_io(err, &path))?;
        if meta.is_file() {
            Ok(path)
        } else {
            Err(HostError::NotFound(path.display().to_string()))
        }
    }

    /// A confirmed save dialog creates the target, leaving existing content
    /// in place until the first staged write lands.
    fn save_target(path: PathBuf) -> Result<PathBuf, HostError> {
        let parent = staging_dir(&path);
        if !parent.is_dir() {
            return Err(HostError::NotFound(parent.display().to_string()));
        }
        match fs::OpenOptions::new().write(true).create_new(true).open(&path) {
            Ok(_) => Ok(path),
            Err(err) if err.kind() == io::ErrorKind::AlreadyExists => Ok(path),
            Err(err) => Err(map_io(err, &path)),
        }
    }
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default()
}

fn staging_dir(path: &Path) -> PathBuf {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

fn map_io(err: io::Error, path: &Path) -> HostError {
    match err.kind() {
        io::ErrorKind::PermissionDenied => {
            HostError::NotAllowed(format!("{}: {}", path.display(), err))
        }
        io::ErrorKind::NotFound => HostError::NotFound(path.display().to_string()),
        _ => HostError::Io(format!("{}: {}", path.display(), err)),
    }
}

impl<D: FileDialog> CapabilityProbe for LocalFsHost<D> {
    fn has_entry_point(&self, entry: EntryPoint) -> bool {
        self.entry_points.contains(&entry)
    }
}

impl<D: FileDialog> FileAccessHost for LocalFsHost<D> {
    type RawHandle = PathBuf;

    fn show_open_file_picker(
        &mut self,
        options: &ModernPickerOptions,
    ) -> Result<Vec<PathBuf>, HostError> {
        self.require(EntryPoint::OpenFilePicker)?;
        let mut paths =
            self.pick(&PickerOptions::Modern(options.clone()), PickerIntent::OpenFile)?;
        if !options.multiple {
            paths.truncate(1);
        }
        paths.into_iter().map(Self::open_target).collect()
    }

    fn show_save_file_picker(
        &mut self,
        options: &ModernPickerOptions,
    ) -> Result<PathBuf, HostError> {
        self.require(EntryPoint::SaveFilePicker)?;
        let paths = self.pick(&PickerOptions::Modern(options.clone()), PickerIntent::SaveFile)?;
        let path = paths.into_iter().next().ok_or(HostError::Dismissed)?;
        Self::save_target(path)
    }

    fn choose_file_system_entries(
        &mut self,
        options: &LegacyPickerOptions,
    ) -> Result<PathBuf, HostError> {
        self.require(EntryPoint::ChooseFileSystemEntries)?;
        let paths = self.pick(&PickerOptions::Legacy(options.clone()), options.intent)?;
        let path = paths.into_iter().next().ok_or(HostError::Dismissed)?;
        match options.intent {
            PickerIntent::OpenFile => Self::open_target(path),
            PickerIntent::SaveFile => Self::save_target(path),
        }
    }

    fn handle_name(&self, handle: &PathBuf) -> String {
        file_name(handle)
    }

    fn read_file(&mut self, handle: &PathBuf) -> Result<Vec<u8>, HostError> {
        fs::read(handle).map_err(|err| map_io(err, handle))
    }

    fn create_writable(&mut self, handle: &PathBuf) -> Result<WritableStream, HostError> {
        let meta = fs::metadata(handle).map_err(|err| map_io(err, handle))?;
        if meta.permissions().readonly() {
            return Err(HostError::NotAllowed(format!(
                "{} is read-only",
                handle.display()
            )));
        }

        // Stage beside the link target so the rename replaces the real file
        // and leaves any symlink in place.
        let target = fs::canonicalize(handle).map_err(|err| map_io(err, handle))?;
        let dir = staging_dir(&target);
        let temp = tempfile::Builder::new()
            .prefix(".staged-")
            .suffix(".tmp")
            .tempfile_in(&dir)
            .map_err(|err| map_io(err, &dir))?;
        fs::set_permissions(temp.path(), meta.permissions())
            .map_err(|err| map_io(err, temp.path()))?;

        let stream = WritableStream::new();
        self.staged.insert(stream.id(), StagedFile { target, temp });
        Ok(stream)
    }

    fn write_chunk(&mut self, stream: &mut WritableStream, data: &[u8]) -> Result<(), HostError> {
        stream.ensure_open()?;
        let staged = self
            .staged
            .get_mut(&stream.id())
            .ok_or_else(|| HostError::Io(format!("unknown {}", stream.id())))?;
        staged
            .temp
            .write_all(data)
            .map_err(|err| map_io(err, &staged.target))?;
        stream.record_write(data.len())
    }

    fn close_writable(&mut self, stream: &mut WritableStream) -> Result<(), HostError> {
        stream.ensure_open()?;
        let StagedFile { target, temp } = self
            .staged
            .remove(&stream.id())
            .ok_or_else(|| HostError::Io(format!("unknown {}", stream.id())))?;

        // Dropping `temp` on any error path removes the staged file.
        if let Err(err) = temp.as_file().sync_all() {
            stream.abort()?;
            return Err(map_io(err, &target));
        }
        if let Err(err) = temp.persist(&target) {
            stream.abort()?;
            return Err(map_io(err.error, &target));
        }
        stream.finish()
    }

    fn abort_writable(&mut self, stream: &mut WritableStream) -> Result<(), HostError> {
        stream.ensure_open()?;
        self.staged.remove(&stream.id());
        stream.abort()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::StreamState;
    use crate::picker_options::FileTypeFilter;
    use tempfile::tempdir;

    fn text_options() -> ModernPickerOptions {
        ModernPickerOptions::new(&[FileTypeFilter::plain_text()], false)
    }

    fn dir_entries(dir: &Path) -> usize {
        fs::read_dir(dir).unwrap().count()
    }

    #[test]
    fn test_open_picker_selects_existing_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("notes.txt");
        fs::write(&path, "hello").unwrap();

        let mut host = LocalFsHost::new(ScriptedDialog::new());
        host.dialog_mut().select(&path);

        let handles = host.show_open_file_picker(&text_options()).unwrap();
        assert_eq!(handles, vec![path.clone()]);
        assert_eq!(host.handle_name(&handles[0]), "notes.txt");
        assert_eq!(host.read_file(&handles[0]).unwrap(), b"hello".to_vec());
    }

    #[test]
    fn test_open_picker_dismissed() {
        let mut host = LocalFsHost::new(ScriptedDialog::new());
        assert_eq!(
            host.show_open_file_picker(&text_options()),
            Err(HostError::Dismissed)
        );
    }

    #[test]
    fn test_open_picker_rejects_other_types() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("image.png");
        fs::write(&path, "png").unwrap();

        let mut host = LocalFsHost::new(ScriptedDialog::new());
        host.dialog_mut().select(&path);
        assert!(matches!(
            host.show_open_file_picker(&text_options()),
            Err(HostError::NotAllowed(_))
        ));
    }

    #[test]
    fn test_legacy_host_has_no_modern_entry() {
        let mut host = LocalFsHost::with_entry_points(
            ScriptedDialog::new(),
            [EntryPoint::ChooseFileSystemEntries],
        );
        assert_eq!(
            host.show_save_file_picker(&text_options()),
            Err(HostError::EntryPointMissing(EntryPoint::SaveFilePicker))
        );
    }

    #[test]
    fn test_staged_write_publishes_on_close() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("notes.txt");
        fs::write(&path, "old").unwrap();
        let mut host = LocalFsHost::new(ScriptedDialog::new());

        let mut stream = host.create_writable(&path).unwrap();
        host.write_chunk(&mut stream, b"new content").unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "old");

        host.close_writable(&mut stream).unwrap();
        assert_eq!(stream.state(), StreamState::Closed);
        assert_eq!(fs::read_to_string(&path).unwrap(), "new content");
        assert_eq!(dir_entries(dir.path()), 1);
    }

    #[test]
    fn test_save_dialog_creates_missing_target() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("fresh.txt");
        let mut host = LocalFsHost::new(ScriptedDialog::new());
        host.dialog_mut().select(&path);

        let target = host.show_save_file_picker(&text_options()).unwrap();
        assert_eq!(fs::read_to_string(&target).unwrap(), "");

        let mut stream = host.create_writable(&target).unwrap();
        host.write_chunk(&mut stream, b"first").unwrap();
        host.close_writable(&mut stream).unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "first");
    }

    #[test]
    fn test_abort_leaves_target_and_no_residue() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("notes.txt");
        fs::write(&path, "old").unwrap();
        let mut host = LocalFsHost::new(ScriptedDialog::new());

        let mut stream = host.create_writable(&path).unwrap();
        host.write_chunk(&mut stream, b"partial").unwrap();
        assert_eq!(dir_entries(dir.path()), 2);

        host.abort_writable(&mut stream).unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "old");
        assert_eq!(dir_entries(dir.path()), 1);
        assert_eq!(host.open_stream_count(), 0);
    }

    #[test]
    fn test_read_only_target_is_not_allowed() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("locked.txt");
        fs::write(&path, "old").unwrap();
        let mut permissions = fs::metadata(&path).unwrap().permissions();
        permissions.set_readonly(true);
        fs::set_permissions(&path, permissions).unwrap();

        let mut host = LocalFsHost::new(ScriptedDialog::new());
        assert!(matches!(
            host.create_writable(&path),
            Err(HostError::NotAllowed(_))
        ));
        assert_eq!(dir_entries(dir.path()), 1);
    }

    #[test]
    fn test_save_dialog_keeps_existing_content() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("notes.txt");
        fs::write(&path, "kept").unwrap();
        let mut host = LocalFsHost::new(ScriptedDialog::new());
        host.dialog_mut().select(&path);

        host.show_save_file_picker(&text_options()).unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "kept");
    }

    #[test]
    fn test_writable_on_deleted_target_is_not_found() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("gone.txt");
        fs::write(&path, "old").unwrap();
        fs::remove_file(&path).unwrap();

        let mut host = LocalFsHost::new(ScriptedDialog::new());
        assert_eq!(
            host.create_writable(&path).map(|_| ()),
            Err(HostError::NotFound(path.display().to_string()))
        );
        assert!(!path.exists());
        assert_eq!(dir_entries(dir.path()), 0);
    }

    #[cfg(unix)]
    #[test]
    fn test_staged_write_follows_symlink() {
        let dir = tempdir().unwrap();
        let real = dir.path().join("real.txt");
        let link = dir.path().join("link.txt");
        fs::write(&real, "v1").unwrap();
        std::os::unix::fs::symlink(&real, &link).unwrap();

        let mut host = LocalFsHost::new(ScriptedDialog::new());
        let mut stream = host.create_writable(&link).unwrap();
        host.write_chunk(&mut stream, b"v2").unwrap();
        host.close_writable(&mut stream).unwrap();

        assert_eq!(fs::read_to_string(&real).unwrap(), "v2");
        assert!(fs::symlink_metadata(&link).unwrap().file_type().is_symlink());
        assert_eq!(fs::read_to_string(&link).unwrap(), "v2");
        assert_eq!(dir_entries(dir.path()), 2);
    }

    #[test]
    fn test_save_target_needs_existing_directory() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("missing").join("notes.txt");
        let mut host = LocalFsHost::new(ScriptedDialog::new());
        host.dialog_mut().select(&path);

        assert!(matches!(
            host.show_save_file_picker(&text_options()),
            Err(HostError::NotFound(_))
        ));
    }
}
