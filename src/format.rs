//! Content format selection and file-extension dispatch.

use std::path::Path;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::error::Error;

/// The embedding syntax a content string uses. An external, mutable
/// selector — never inferred from the content itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ContentFormat {
    /// HTML-like markup; images are `<img src="…">` tags.
    Html,
    /// Markdown-like markup; images are `![alt](…)` embeds.
    Markdown,
}

/// Map a file extension to its content format.
///
/// # Errors
///
/// Returns `Error::UnsupportedFormat` for unknown extensions.
pub fn format_for_path(path: &Path) -> Result<ContentFormat, Error> {
    let ext = path.extension().and_then(|e| return e.to_str()).unwrap_or("");

    return match ext {
        "htm" | "html" => Ok(ContentFormat::Html),
        "markdown" | "md" => Ok(ContentFormat::Markdown),
        _ => Err(Error::UnsupportedFormat {
            ext: ext.to_string(),
        }),
    };
}
