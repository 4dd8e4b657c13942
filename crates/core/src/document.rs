//! Source document formats accepted by the service.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

/// The two word-processor formats the service converts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceFormat {
    /// Binary HWP document.
    Hwp,
    /// XML-based HWPX document.
    Hwpx,
}

impl SourceFormat {
    /// File extension without the leading dot.
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Hwp => "hwp",
            Self::Hwpx => "hwpx",
        }
    }

    /// Format name understood by the rendering engine's open call.
    pub fn engine_filter(&self) -> &'static str {
        match self {
            Self::Hwp => "HWP",
            Self::Hwpx => "HWPX",
        }
    }

    /// The other format of the pair.
    pub fn sibling(&self) -> Self {
        match self {
            Self::Hwp => Self::Hwpx,
            Self::Hwpx => Self::Hwp,
        }
    }

    /// Parses an extension, with or without the leading dot, ignoring case.
    pub fn from_extension(ext: &str) -> Option<Self> {
        let ext = ext.strip_prefix('.').unwrap_or(ext);
        if ext.eq_ignore_ascii_case("hwp") {
            Some(Self::Hwp)
        } else if ext.eq_ignore_ascii_case("hwpx") {
            Some(Self::Hwpx)
        } else {
            None
        }
    }

    /// Detects the format from a path's extension.
    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|ext| ext.to_str())
            .and_then(Self::from_extension)
    }

    /// Detects the format from a client-supplied filename.
    pub fn from_filename(filename: &str) -> Option<Self> {
        Self::from_path(Path::new(base_name(filename)))
    }
}

impl fmt::Display for SourceFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

/// Builds the download name for a converted upload: the original name with
/// its extension replaced by `.pdf`.
pub fn pdf_download_name(filename: &str) -> String {
    let base = base_name(filename);
    let stem = Path::new(base)
        .file_stem()
        .and_then(|s| s.to_str())
        .filter(|s| !s.is_empty())
        .unwrap_or("document");
    format!("{}.pdf", stem)
}

/// Strips any directory part a client may have sent, using either separator.
fn base_name(filename: &str) -> &str {
    filename
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or(filename)
}
