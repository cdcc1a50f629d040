//! Status reporting
//!
//! The controller never returns raw faults to the caller. It hands a formatted
//! line to a [`StatusReporter`] instead, and clears it when a flow succeeds.

/// Sink for user-facing status text
pub trait StatusReporter {
    fn report(&mut self, message: &str);
    fn clear(&mut self);
}

/// A single observable status line
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StatusLine {
    current: Option<String>,
}

impl StatusLine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current text, `None` when clear
    pub fn text(&self) -> Option<&str> {
        self.current.as_deref()
    }

    pub fn is_clear(&self) -> bool {
        self.current.is_none()
    }
}

impl StatusReporter for StatusLine {
    fn report(&mut self, message: &str) {
        self.current = Some(message.to_string());
    }

    fn clear(&mut self) {
        self.current = None;
    }
}

impl<R: StatusReporter + ?Sized> StatusReporter for &mut R {
    fn report(&mut self, message: &str) {
        (**self).report(message);
    }

    fn clear(&mut self) {
        (**self).clear();
    }
}
