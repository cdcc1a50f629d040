//! Accepted-type descriptors for picker dialogs
//!
//! The same filter list is rendered in two shapes: the modern
//! description/accept map, and the flatter legacy shape that also carries the
//! open/save intent because legacy hosts share one entry point for both.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::generation::CapabilityGeneration;

/// One accepted file type
///
/// Extensions are stored without the leading dot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileTypeFilter {
    pub description: String,
    pub mime_type: String,
    pub extensions: Vec<String>,
}

impl FileTypeFilter {
    pub fn new(
        description: impl Into<String>,
        mime_type: impl Into<String>,
        extensions: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        Self {
            description: description.into(),
            mime_type: mime_type.into(),
            extensions: extensions
                .into_iter()
                .map(|ext| ext.into().trim_start_matches('.').to_string())
                .collect(),
        }
    }

    /// Plain text: `.txt`, `text/plain`
    pub fn plain_text() -> Self {
        Self::new("Text files", "text/plain", ["txt"])
    }

    /// Whether a file name carries one of this filter's extensions
    pub fn matches_name(&self, name: &str) -> bool {
        let Some((_, ext)) = name.rsplit_once('.') else {
            return false;
        };
        self.extensions
            .iter()
            .any(|accepted| accepted.eq_ignore_ascii_case(ext))
    }
}

/// What a picker is opened for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PickerIntent {
    OpenFile,
    SaveFile,
}

/// Modern accepted type entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModernFileType {
    pub description: String,
    /// MIME type to dotted extensions
    pub accept: BTreeMap<String, Vec<String>>,
}

/// Options for the modern open and save dialogs
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModernPickerOptions {
    pub types: Vec<ModernFileType>,
    #[serde(default, skip_serializing_if = "is_false")]
    pub multiple: bool,
}

fn is_false(value: &bool) -> bool {
    !*value
}

impl ModernPickerOptions {
    pub fn new(filters: &[FileTypeFilter], multiple: bool) -> Self {
        let types = filters
            .iter()
            .map(|filter| {
                let mut accept = BTreeMap::new();
                accept.insert(
                    filter.mime_type.clone(),
                    filter
                        .extensions
                        .iter()
                        .map(|ext| format!(".{}", ext))
                        .collect(),
                );
                ModernFileType {
                    description: filter.description.clone(),
                    accept,
                }
            })
            .collect();
        Self { types, multiple }
    }

    pub fn accepts_name(&self, name: &str) -> bool {
        let lower = name.to_ascii_lowercase();
        self.types.iter().any(|file_type| {
            file_type
                .accept
                .values()
                .flatten()
                .any(|ext| lower.ends_with(&ext.to_ascii_lowercase()))
        })
    }
}

/// Legacy accepted type entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LegacyAccept {
    pub description: String,
    pub mime_types: Vec<String>,
    pub extensions: Vec<String>,
}

/// Options for the legacy unified dialog
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LegacyPickerOptions {
    #[serde(rename = "type")]
    pub intent: PickerIntent,
    pub accepts: Vec<LegacyAccept>,
}

impl LegacyPickerOptions {
    pub fn new(intent: PickerIntent, filters: &[FileTypeFilter]) -> Self {
        let accepts = filters
            .iter()
            .map(|filter| LegacyAccept {
                description: filter.description.clone(),
                mime_types: vec![filter.mime_type.clone()],
                extensions: filter.extensions.clone(),
            })
            .collect();
        Self { intent, accepts }
    }

    pub fn accepts_name(&self, name: &str) -> bool {
        let Some((_, ext)) = name.rsplit_once('.') else {
            return false;
        };
        self.accepts.iter().any(|accept| {
            accept
                .extensions
                .iter()
                .any(|accepted| accepted.eq_ignore_ascii_case(ext))
        })
    }
}

/// Generation-appropriate picker options
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum PickerOptions {
    Modern(ModernPickerOptions),
    Legacy(LegacyPickerOptions),
}

impl PickerOptions {
    /// Builds the options shape for a generation
    ///
    /// Returns `None` for an unsupported host. Multi-select only applies to the
    /// modern open dialog.
    pub fn for_generation(
        generation: CapabilityGeneration,
        intent: PickerIntent,
        filters: &[FileTypeFilter],
        multiple: bool,
    ) -> Option<Self> {
        match generation {
            CapabilityGeneration::Modern => Some(PickerOptions::Modern(ModernPickerOptions::new(
                filters,
                multiple && intent == PickerIntent::OpenFile,
            ))),
            CapabilityGeneration::Legacy => Some(PickerOptions::Legacy(
                LegacyPickerOptions::new(intent, filters),
            )),
            CapabilityGeneration::Unsupported => None,
        }
    }

    pub fn accepts_name(&self, name: &str) -> bool {
        match self {
            PickerOptions::Modern(options) => options.accepts_name(name),
            PickerOptions::Legacy(options) => options.accepts_name(name),
        }
    }

    /// Renders the options the way the host receives them
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}
