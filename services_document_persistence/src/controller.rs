//! Open / save / save-as orchestration

use services_file_access::{
    CapabilityGeneration, CapabilityResolver, FileAccessError, FileAccessHost, FileHandle,
};

use crate::config::{CancellationFeedback, PersistenceConfig};
use crate::status::{StatusLine, StatusReporter};

/// Session state kind, without the handle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionKind {
    Unsupported,
    NoHandle,
    HasHandle,
}

/// Document session state
#[derive(Debug, Clone, PartialEq)]
pub enum SessionState<R> {
    /// No usable capability; terminal for the session
    Unsupported,
    /// Nothing opened or saved yet
    NoHandle,
    /// A handle is current
    HasHandle(FileHandle<R>),
}

impl<R> SessionState<R> {
    pub fn kind(&self) -> SessionKind {
        match self {
            SessionState::Unsupported => SessionKind::Unsupported,
            SessionState::NoHandle => SessionKind::NoHandle,
            SessionState::HasHandle(_) => SessionKind::HasHandle,
        }
    }

    pub fn handle(&self) -> Option<&FileHandle<R>> {
        match self {
            SessionState::HasHandle(handle) => Some(handle),
            _ => None,
        }
    }
}

/// Result of a flow as seen by the caller
///
/// Failures arrive as values; nothing past the controller ever sees an `Err`.
#[derive(Debug, Clone, PartialEq)]
pub enum FlowOutcome<T = ()> {
    Completed(T),
    /// A dialog was dismissed; state is unchanged
    Cancelled,
    /// The flow failed; state is unchanged and the status line says why
    Failed(FileAccessError),
    /// File access is disabled for this session
    Unsupported,
}

impl<T> FlowOutcome<T> {
    pub fn is_completed(&self) -> bool {
        matches!(self, FlowOutcome::Completed(_))
    }

    pub fn completed(self) -> Option<T> {
        match self {
            FlowOutcome::Completed(value) => Some(value),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&FileAccessError> {
        match self {
            FlowOutcome::Failed(err) => Some(err),
            _ => None,
        }
    }
}

/// Owner of the current file handle
///
/// The generation is resolved once at construction. Every flow takes
/// `&mut self`, so at most one flow runs at a time per controller and the
/// handle slot has exactly one writer.
pub struct PersistenceController<H: FileAccessHost, S: StatusReporter = StatusLine> {
    host: H,
    status: S,
    config: PersistenceConfig,
    generation: CapabilityGeneration,
    state: SessionState<H::RawHandle>,
}

impl<H: FileAccessHost> PersistenceController<H, StatusLine> {
    /// Creates a controller with default configuration and a [`StatusLine`]
    pub fn new(host: H) -> Self {
        Self::with_reporter(host, StatusLine::new(), PersistenceConfig::default())
    }

    pub fn with_config(host: H, config: PersistenceConfig) -> Self {
        Self::with_reporter(host, StatusLine::new(), config)
    }
}

impl<H: FileAccessHost, S: StatusReporter> PersistenceController<H, S> {
    /// Creates a controller reporting to `status`
    ///
    /// A configuration that fails [`PersistenceConfig::validate`] is replaced
    /// by the default one, so dialogs always offer at least one file type.
    pub fn with_reporter(host: H, mut status: S, config: PersistenceConfig) -> Self {
        let config = match config.validate() {
            Ok(()) => config,
            Err(err) => {
                tracing::warn!(error = %err, "invalid persistence configuration, using defaults");
                PersistenceConfig::default()
            }
        };
        let generation = CapabilityResolver::resolve(&host);
        let state = if generation.is_supported() {
            tracing::info!(%generation, "document persistence ready");
            SessionState::NoHandle
        } else {
            tracing::warn!("no file access capability, open and save are disabled");
            status.report(&config.unsupported_advisory);
            SessionState::Unsupported
        };

        Self {
            host,
            status,
            config,
            generation,
            state,
        }
    }

    /// Opens a file and returns its text
    ///
    /// The handle only becomes current once the content has been read.
    pub fn open(&mut self) -> FlowOutcome<String> {
        if self.is_unsupported() {
            return FlowOutcome::Unsupported;
        }

        let acquired = FileHandle::acquire_for_read(
            &mut self.host,
            self.generation,
            &self.config.accepted_types,
            self.config.allow_multiple_selection,
        );
        let handle = match acquired {
            Ok(handle) => handle,
            Err(err) => return self.fail("open", err),
        };

        match handle.read_text(&mut self.host) {
            Ok(text) => {
                tracing::info!(handle = %handle.id(), name = handle.name(), "document opened");
                self.state = SessionState::HasHandle(handle);
                self.status.clear();
                FlowOutcome::Completed(text)
            }
            Err(err) => self.fail("open", err),
        }
    }

    /// Saves through the current handle, or as a new file when there is none
    pub fn save(&mut self, text: &str) -> FlowOutcome {
        if self.is_unsupported() {
            return FlowOutcome::Unsupported;
        }
        let Some(handle) = self.state.handle() else {
            return self.save_as(text);
        };

        let id = handle.id();
        match handle.write_text_staged(&mut self.host, text) {
            Ok(()) => {
                tracing::info!(handle = %id, bytes = text.len(), "document saved");
                self.status.clear();
                FlowOutcome::Completed(())
            }
            Err(err) => self.fail("save", err),
        }
    }

    /// Saves to a newly chosen file
    ///
    /// The new handle replaces the current one only after the write succeeded.
    pub fn save_as(&mut self, text: &str) -> FlowOutcome {
        if self.is_unsupported() {
            return FlowOutcome::Unsupported;
        }

        let acquired = FileHandle::acquire_for_write(
            &mut self.host,
            self.generation,
            &self.config.accepted_types,
        );
        let handle = match acquired {
            Ok(handle) => handle,
            Err(err) => return self.fail("save_as", err),
        };

        if let Err(err) = handle.write_text_staged(&mut self.host, text) {
            return self.fail("save_as", err);
        }

        tracing::info!(
            handle = %handle.id(),
            name = handle.name(),
            bytes = text.len(),
            "document saved as"
        );
        self.state = SessionState::HasHandle(handle);
        self.status.clear();
        FlowOutcome::Completed(())
    }

    fn fail<T>(&mut self, flow: &'static str, err: FileAccessError) -> FlowOutcome<T> {
        if err.is_cancellation() {
            tracing::debug!(flow, "dialog dismissed");
            match self.config.cancellation {
                CancellationFeedback::Silent => self.status.clear(),
                CancellationFeedback::Transient => self.status.report(&err.to_string()),
            }
            return FlowOutcome::Cancelled;
        }

        tracing::warn!(flow, kind = %err.kind(), detail = err.detail(), "file access flow failed");
        self.status.report(&err.to_string());
        FlowOutcome::Failed(err)
    }

    pub fn generation(&self) -> CapabilityGeneration {
        self.generation
    }

    pub fn state(&self) -> &SessionState<H::RawHandle> {
        &self.state
    }

    pub fn current_handle(&self) -> Option<&FileHandle<H::RawHandle>> {
        self.state.handle()
    }

    /// Host name of the current file
    pub fn document_label(&self) -> Option<&str> {
        self.current_handle().map(|handle| handle.name())
    }

    pub fn is_unsupported(&self) -> bool {
        matches!(self.state, SessionState::Unsupported)
    }

    /// Fixed advisory, present only when file access is unsupported
    pub fn unsupported_text(&self) -> Option<&str> {
        if self.is_unsupported() {
            Some(&self.config.unsupported_advisory)
        } else {
            None
        }
    }

    pub fn config(&self) -> &PersistenceConfig {
        &self.config
    }

    pub fn status(&self) -> &S {
        &self.status
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use services_file_access::{DialogResponse, ErrorKind, HostCall, HostFault, SimulatedHost};

    fn opened(path: &str, content: &str) -> PersistenceController<SimulatedHost> {
        let host = SimulatedHost::modern()
            .with_file(path, content)
            .with_dialog(DialogResponse::select(path));
        let mut controller = PersistenceController::new(host);
        assert_eq!(
            controller.open(),
            FlowOutcome::Completed(content.to_string())
        );
        controller
    }

    #[test]
    fn test_initial_state() {
        let controller = PersistenceController::new(SimulatedHost::modern());
        assert_eq!(controller.state().kind(), SessionKind::NoHandle);
        assert_eq!(controller.generation(), CapabilityGeneration::Modern);
        assert!(controller.status().is_clear());
        assert!(controller.unsupported_text().is_none());
        assert!(controller.document_label().is_none());
    }

    #[test]
    fn test_unsupported_short_circuits() {
        let mut controller = PersistenceController::new(SimulatedHost::unsupported());
        assert!(controller.is_unsupported());
        assert_eq!(
            controller.unsupported_text(),
            Some(crate::config::DEFAULT_UNSUPPORTED_ADVISORY)
        );
        assert_eq!(
            controller.status().text(),
            Some(crate::config::DEFAULT_UNSUPPORTED_ADVISORY)
        );

        assert_eq!(controller.open(), FlowOutcome::Unsupported);
        assert_eq!(controller.save("x"), FlowOutcome::Unsupported);
        assert_eq!(controller.save_as("x"), FlowOutcome::Unsupported);
        assert!(controller.host().calls().is_empty());
        assert_eq!(controller.state().kind(), SessionKind::Unsupported);
    }

    #[test]
    fn test_open_stores_handle() {
        let controller = opened("/notes.txt", "hello");
        assert_eq!(controller.state().kind(), SessionKind::HasHandle);
        assert_eq!(controller.document_label(), Some("notes.txt"));
    }

    #[test]
    fn test_open_read_failure_keeps_prior_handle() {
        let mut controller = opened("/a.txt", "a");
        let before = controller.current_handle().cloned();

        controller.host_mut().insert_file("/b.txt", "b");
        controller.host_mut().push_dialog(DialogResponse::select("/b.txt"));
        controller.host_mut().inject(HostFault::DenyRead);

        let outcome = controller.open();
        assert_eq!(outcome.error().map(|e| e.kind()), Some(ErrorKind::PermissionDenied));
        assert_eq!(controller.current_handle().cloned(), before);
        assert_eq!(
            controller.status().text(),
            Some("PermissionDenied - read access was refused")
        );
    }

    #[test]
    fn test_save_writes_through_current_handle() {
        let mut controller = opened("/notes.txt", "hello");
        let id = controller.current_handle().map(|h| h.id());

        assert_eq!(controller.save("hello again"), FlowOutcome::Completed(()));
        assert_eq!(
            controller.host().file_content("/notes.txt").as_deref(),
            Some("hello again")
        );
        assert_eq!(controller.current_handle().map(|h| h.id()), id);
        assert_eq!(
            controller
                .host()
                .count_calls(|c| matches!(c, HostCall::SavePicker)),
            0
        );
    }

    #[test]
    fn test_save_io_failure_keeps_handle() {
        let mut controller = opened("/notes.txt", "hello");
        let before = controller.current_handle().cloned();
        controller.host_mut().inject(HostFault::FailClose);

        let outcome = controller.save("changed");
        assert_eq!(outcome.error().map(|e| e.kind()), Some(ErrorKind::IoError));
        assert_eq!(controller.current_handle().cloned(), before);
        assert_eq!(
            controller.host().file_content("/notes.txt").as_deref(),
            Some("hello")
        );

        assert!(controller.save("changed").is_completed());
        assert!(controller.status().is_clear());
    }

    #[test]
    fn test_save_as_replaces_handle_after_write() {
        let mut controller = opened("/a.txt", "a");
        let before = controller.current_handle().map(|h| h.id());
        controller.host_mut().push_dialog(DialogResponse::select("/b.txt"));

        assert!(controller.save_as("bee").is_completed());
        assert_ne!(controller.current_handle().map(|h| h.id()), before);
        assert_eq!(controller.document_label(), Some("b.txt"));
        assert_eq!(controller.host().file_content("/b.txt").as_deref(), Some("bee"));
        assert_eq!(controller.host().file_content("/a.txt").as_deref(), Some("a"));
    }

    #[test]
    fn test_save_as_write_failure_keeps_old_handle() {
        let mut controller = opened("/a.txt", "a");
        let before = controller.current_handle().cloned();
        controller.host_mut().push_dialog(DialogResponse::select("/b.txt"));
        controller.host_mut().inject(HostFault::DenyWrite);

        let outcome = controller.save_as("bee");
        assert_eq!(outcome.error().map(|e| e.kind()), Some(ErrorKind::PermissionDenied));
        assert_eq!(controller.current_handle().cloned(), before);
    }

    #[test]
    fn test_invalid_config_falls_back_to_defaults() {
        let host = SimulatedHost::modern()
            .with_file("/notes.txt", "hello")
            .with_dialog(DialogResponse::select("/notes.txt"));
        let config = PersistenceConfig::new()
            .with_accepted_types(vec![])
            .with_cancellation(CancellationFeedback::Transient);
        let mut controller = PersistenceController::with_config(host, config);

        assert_eq!(controller.config(), &PersistenceConfig::default());
        assert_eq!(controller.open(), FlowOutcome::Completed("hello".to_string()));
    }

    #[test]
    fn test_transient_cancellation_feedback() {
        let config = PersistenceConfig::new().with_cancellation(CancellationFeedback::Transient);
        let mut controller = PersistenceController::with_config(SimulatedHost::modern(), config);

        assert_eq!(controller.open(), FlowOutcome::Cancelled);
        assert_eq!(
            controller.status().text(),
            Some("UserCancelled - the dialog was dismissed")
        );
    }

    #[test]
    fn test_silent_cancellation_clears_stale_status() {
        let mut controller = opened("/a.txt", "a");
        controller.host_mut().inject(HostFault::DenyWrite);
        assert!(controller.save("x").error().is_some());
        assert!(!controller.status().is_clear());

        assert_eq!(controller.save_as("x"), FlowOutcome::Cancelled);
        assert!(controller.status().is_clear());
    }

    #[test]
    fn test_legacy_generation_flows() {
        let host = SimulatedHost::legacy()
            .with_dialog(DialogResponse::select("/legacy.txt"));
        let mut controller = PersistenceController::new(host);
        assert_eq!(controller.generation(), CapabilityGeneration::Legacy);

        assert!(controller.save("old api").is_completed());
        assert_eq!(
            controller.host().file_content("/legacy.txt").as_deref(),
            Some("old api")
        );
        assert_eq!(
            controller.current_handle().map(|h| h.generation()),
            Some(CapabilityGeneration::Legacy)
        );
    }
}
