//! Codec contract shared by the page file formats, and the format registry

use crate::ep1::Ep1Format;
use crate::htt::HttFormat;
use crate::pageset::PageSet;
use crate::t42::T42Format;
use crate::tti::TtiFormat;
use crate::Result;
use alloc::boxed::Box;
use alloc::string::{String, ToString};
use alloc::vec::Vec;
use bytes::Bytes;
use hashbrown::HashMap;
use serde::{Deserialize, Serialize};

#[cfg(feature = "logging")]
use tracing::warn;

/// Identifies a file format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FormatId {
    /// Line-oriented text dump
    Tti,
    /// Raw 42-byte packet stream
    T42,
    /// Vendor binary page file
    Ep1,
    /// Bit-reversed capture with sync bytes
    Htt,
}

impl FormatId {
    /// Every format
    pub const ALL: [FormatId; 4] = [FormatId::Tti, FormatId::T42, FormatId::Ep1, FormatId::Htt];

    /// Short lower-case name
    pub const fn name(self) -> &'static str {
        match self {
            FormatId::Tti => "tti",
            FormatId::T42 => "t42",
            FormatId::Ep1 => "ep1",
            FormatId::Htt => "htt",
        }
    }
}

impl core::fmt::Display for FormatId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.name())
    }
}

/// Result of a successful load
#[derive(Debug, Clone)]
pub struct LoadOutcome {
    /// The loaded pages
    pub pages: PageSet,
    /// Substitutions and ignored content, in input order
    pub warnings: Vec<String>,
}

/// Result of a save, which always produces output
#[derive(Debug, Clone)]
pub struct SaveOutcome {
    /// Encoded file contents
    pub data: Bytes,
    /// Content that could not be represented
    pub warnings: Vec<String>,
}

/// A page file format
pub trait PageFormat: Send + Sync {
    /// Format identifier
    fn id(&self) -> FormatId;

    /// Human readable name
    fn description(&self) -> &'static str;

    /// File extensions, lower case without the dot
    fn extensions(&self) -> &'static [&'static str];

    /// Decode a file
    fn load(&self, data: &[u8]) -> Result<LoadOutcome>;

    /// Encode a page set
    fn save(&self, pages: &PageSet) -> SaveOutcome;
}

/// Collects warnings during a load or save and logs each one
#[derive(Debug, Default)]
pub(crate) struct Diagnostics {
    warnings: Vec<String>,
}

impl Diagnostics {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn warn(&mut self, message: impl Into<String>) {
        let message = message.into();
        #[cfg(feature = "logging")]
        warn!("{}", message);
        self.warnings.push(message);
    }

    pub(crate) fn into_warnings(self) -> Vec<String> {
        self.warnings
    }
}

/// Table of available formats, looked up by id or file extension
pub struct FormatRegistry {
    formats: Vec<Box<dyn PageFormat>>,
    by_extension: HashMap<String, usize>,
}

impl Default for FormatRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl FormatRegistry {
    /// Registry with every built-in format
    pub fn new() -> Self {
        let mut registry = Self::empty();
        registry.register(Box::new(TtiFormat));
        registry.register(Box::new(T42Format));
        registry.register(Box::new(Ep1Format));
        registry.register(Box::new(HttFormat::default()));
        registry
    }

    /// Registry without formats
    pub fn empty() -> Self {
        Self {
            formats: Vec::new(),
            by_extension: HashMap::new(),
        }
    }

    /// Add a format; its extensions replace earlier registrations
    pub fn register(&mut self, format: Box<dyn PageFormat>) {
        let index = self.formats.len();
        for extension in format.extensions() {
            self.by_extension.insert(extension.to_string(), index);
        }
        self.formats.push(format);
    }

    /// Format with id `id`
    pub fn get(&self, id: FormatId) -> Option<&dyn PageFormat> {
        self.formats
            .iter()
            .find(|format| format.id() == id)
            .map(|format| format.as_ref())
    }

    /// Format for a file extension, case-insensitive, with or without the dot
    pub fn for_extension(&self, extension: &str) -> Option<&dyn PageFormat> {
        let extension = extension.trim_start_matches('.').to_ascii_lowercase();
        self.by_extension
            .get(&extension)
            .map(|&index| self.formats[index].as_ref())
    }

    /// Format for a file path, from the text after its last dot
    pub fn for_path(&self, path: &str) -> Option<&dyn PageFormat> {
        let name = path.rsplit(|c: char| c == '/' || c == '\\').next().unwrap_or(path);
        let (_, extension) = name.rsplit_once('.')?;
        self.for_extension(extension)
    }

    /// Registered formats in registration order
    pub fn iter(&self) -> impl Iterator<Item = &dyn PageFormat> {
        self.formats.iter().map(|format| format.as_ref())
    }
}
