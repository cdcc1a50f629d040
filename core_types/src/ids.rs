//! Unique identifiers for file-access entities

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::new_uuid;

/// Unique identifier for an acquired file handle
///
/// Every successful picker interaction yields a handle with a fresh id, even
/// when the user picks the same file twice. Comparing ids is how callers tell
/// whether the current handle was replaced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct HandleId(Uuid);

impl HandleId {
    /// Creates a new random handle ID
    pub fn new() -> Self {
        Self(new_uuid())
    }
}

impl Default for HandleId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for HandleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Handle({})", self.0)
    }
}

/// Unique identifier for a staged write stream
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct StreamId(Uuid);

impl StreamId {
    /// Creates a new random stream ID
    pub fn new() -> Self {
        Self(new_uuid())
    }
}

impl Default for StreamId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for StreamId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Stream({})", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_handle_id_creation() {
        let id1 = HandleId::new();
        let id2 = HandleId::new();
        assert_ne!(id1, id2);
    }

    #[test]
    fn test_stream_id_creation() {
        assert_ne!(StreamId::new(), StreamId::new());
    }

    #[test]
    fn test_display() {
        assert!(format!("{}", HandleId::new()).starts_with("Handle("));
        assert!(format!("{}", StreamId::new()).starts_with("Stream("));
    }

    #[test]
    fn test_handle_id_serde() {
        let id = HandleId::new();
        let json = serde_json::to_string(&id).unwrap();
        let back: HandleId = serde_json::from_str(&json).unwrap();
        assert_eq!(id, back);
    }
}
