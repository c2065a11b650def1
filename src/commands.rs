//! Core CLI commands for embedsync: view, upload, file-ids, scan, init.

use std::path::{Path, PathBuf};

use serde::Serialize;
use walkdir::WalkDir;

use crate::codec::TokenExtractor;
use crate::config::{CONFIG_FILE, Config};
use crate::error::Error;
use crate::format::{ContentFormat, format_for_path};
use crate::matcher::embeds_for;
use crate::resolver::DownloadUrlBuilder;
use crate::types::{FileId, ResourceGroup, ResourceScope};

/// Starter config written by `init`. Parsed through `toml_edit` so the
/// comments survive any programmatic edits.
const CONFIG_TEMPLATE: &str = "\
# embedsync project configuration.

# API root used to recognize and build managed download URLs.
base_uri = \"https://console.example.com/api\"

# Quiet period for debounced write-backs, in milliseconds.
debounce_ms = 250

# Access token appended to resolved download URLs.
# token = \"...\"
";

/// One scanned content file and the file ids it references.
#[derive(Serialize)]
struct ScanEntry {
    /// Content file path, relative to the scan root.
    file: PathBuf,
    /// Referenced file ids, in order, duplicates preserved.
    file_ids: Vec<FileId>,
}

/// Print the file ids referenced by one stored-form content file.
///
/// # Errors
///
/// Returns errors from format detection, file reading, or JSON output.
pub fn file_ids(file: &Path, content_type: Option<ContentFormat>, json: bool) -> Result<(), Error> {
    let format = resolve_format(file, content_type)?;
    let content = std::fs::read_to_string(file)?;
    let ids = embeds_for(format).extract_file_ids(&content);

    if json {
        println!("{}", serde_json::to_string(&ids)?);
    } else {
        for id in &ids {
            println!("{id}");
        }
    }
    return Ok(());
}

/// Write a starter `.embedsync.toml`, refusing to overwrite.
///
/// # Errors
///
/// Returns `Error::ConfigExists` if the config file already exists,
/// or `Error::Io` if it cannot be written.
///
/// # Panics
///
/// Panics if the hardcoded config template is invalid TOML (compile-time
/// invariant).
pub fn init(root: &Path, base_uri: Option<&str>) -> Result<(), Error> {
    let path = root.join(CONFIG_FILE);
    if path.exists() {
        return Err(Error::ConfigExists { path });
    }

    let mut doc: toml_edit::DocumentMut = CONFIG_TEMPLATE.parse().expect("valid template");
    if let Some(uri) = base_uri {
        doc["base_uri"] = toml_edit::value(uri);
    }
    std::fs::write(&path, doc.to_string())?;
    eprintln!("Wrote {}", path.display());
    return Ok(());
}

/// Detect the content format: explicit flag first, file extension second.
///
/// # Errors
///
/// Returns `Error::UnsupportedFormat` when neither names a format.
fn resolve_format(file: &Path, content_type: Option<ContentFormat>) -> Result<ContentFormat, Error> {
    return match content_type {
        None => format_for_path(file),
        Some(format) => Ok(format),
    };
}

/// Walk a directory of content files and print every referenced file id.
/// Files with unsupported extensions are skipped; unreadable files are
/// reported to stderr and skipped; files without managed references are
/// omitted from the output.
///
/// # Errors
///
/// Returns a JSON error from output serialization.
pub fn scan(root: &Path, json: bool) -> Result<(), Error> {
    let mut entries: Vec<ScanEntry> = Vec::new();

    for entry in WalkDir::new(root)
        .sort_by_file_name()
        .into_iter()
        .filter_map(Result::ok)
        .filter(|e| return e.file_type().is_file())
    {
        let path = entry.path();
        let Ok(format) = format_for_path(path) else {
            continue;
        };
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) => {
                eprintln!("scan: skipping {}: {e}", path.display());
                continue;
            },
        };
        let ids = embeds_for(format).extract_file_ids(&content);
        if ids.is_empty() {
            continue;
        }
        let relative = path.strip_prefix(root).unwrap_or(path).to_path_buf();
        entries.push(ScanEntry {
            file: relative,
            file_ids: ids,
        });
    }

    if json {
        println!("{}", serde_json::to_string(&entries)?);
    } else {
        for entry in &entries {
            for id in &entry.file_ids {
                println!("{}\t{id}", entry.file.display());
            }
        }
    }
    return Ok(());
}

/// Transform view-form content into canonical stored form and print it.
///
/// # Errors
///
/// Returns errors from config loading, format detection, or file reading.
pub fn upload(
    file: &Path,
    content_type: Option<ContentFormat>,
    base_uri: Option<&str>,
) -> Result<(), Error> {
    let config = Config::load(Path::new("."))?;
    let base = config.require_base_uri(base_uri)?;
    let format = resolve_format(file, content_type)?;
    let content = std::fs::read_to_string(file)?;

    let extractor = TokenExtractor::new(base);
    print!("{}", embeds_for(format).rewrite_for_upload(&content, &extractor));
    return Ok(());
}

/// Resolve file tokens into download URLs for a scope and print the view
/// form.
///
/// # Errors
///
/// Returns errors from config loading, format detection, or file reading.
pub fn view(
    file: &Path,
    content_type: Option<ContentFormat>,
    base_uri: Option<&str>,
    group: ResourceGroup,
    resource_id: Option<&str>,
) -> Result<(), Error> {
    let config = Config::load(Path::new("."))?;
    let base = config.require_base_uri(base_uri)?;
    let format = resolve_format(file, content_type)?;
    let content = std::fs::read_to_string(file)?;

    let builder = DownloadUrlBuilder::new(base, config.token.as_deref().unwrap_or(""));
    let scope = ResourceScope {
        group,
        resource_id: resource_id.map(String::from),
    };
    print!("{}", embeds_for(format).rewrite_for_view(&content, &builder, &scope));
    return Ok(());
}
