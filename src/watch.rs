//! File watcher: derives the stored form of a view-form content file on
//! startup, then re-derives it on each save.

use std::path::Path;

use notify::{RecursiveMode, Watcher as _};

use crate::codec::TokenExtractor;
use crate::config::Config;
use crate::error::Error;
use crate::format::{ContentFormat, format_for_path};
use crate::matcher::embeds_for;

/// Create a filesystem watcher that sends events on the given channel.
///
/// # Errors
///
/// Returns `Error::WatchSetup` if the watcher cannot be created.
fn create_watcher(
    tx: crossbeam_channel::Sender<()>,
) -> Result<notify::RecommendedWatcher, Error> {
    return notify::recommended_watcher(move |res: Result<notify::Event, notify::Error>| {
        if let Ok(event) = res
            && matches!(
                event.kind,
                notify::EventKind::Create(_)
                    | notify::EventKind::Modify(_)
                    | notify::EventKind::Remove(_)
            )
        {
            let _ = tx.send(());
        }
    })
    .map_err(|e| {
        return Error::WatchSetup {
            reason: e.to_string(),
        };
    });
}

/// Entry point for the watch command.
///
/// Derives the stored form once, then watches the input file's directory
/// and re-derives on changes, debounced by the configured quiet period.
///
/// # Errors
///
/// Returns errors from config loading, format detection, the initial
/// derivation, or watcher setup.
pub fn run(
    input: &Path,
    out: &Path,
    content_type: Option<ContentFormat>,
    base_uri: Option<&str>,
) -> Result<(), Error> {
    let config = Config::load(Path::new("."))?;
    let base = config.require_base_uri(base_uri)?;
    let format = match content_type {
        None => format_for_path(input)?,
        Some(f) => f,
    };
    let extractor = TokenExtractor::new(base);

    eprintln!("watch: initial derivation");
    sync_once(input, out, format, &extractor)?;

    let (tx, rx) = crossbeam_channel::unbounded();
    let mut watcher = create_watcher(tx)?;

    let dir = input.parent().filter(|p| return p.exists()).unwrap_or(Path::new("."));
    watcher.watch(dir, RecursiveMode::NonRecursive).map_err(|e| {
        return Error::WatchSetup {
            reason: e.to_string(),
        };
    })?;

    eprintln!(
        "watch: monitoring {}, press Ctrl+C to stop",
        input.display()
    );

    while rx.recv().is_ok() {
        let debounce = config.debounce();
        while rx.recv_timeout(debounce).is_ok() {}
        eprintln!("watch: change detected, re-deriving...");
        if let Err(e) = sync_once(input, out, format, &extractor) {
            eprintln!("error: {e}");
        }
    }

    return Ok(());
}

/// Derive the stored form of the input and write it to the output path.
/// Skips the write when the derivation matches what is already on disk.
///
/// # Errors
///
/// Returns `Error::Io` if the input cannot be read or the output written.
fn sync_once(
    input: &Path,
    out: &Path,
    format: ContentFormat,
    extractor: &TokenExtractor,
) -> Result<(), Error> {
    let content = std::fs::read_to_string(input)?;
    let stored = embeds_for(format).rewrite_for_upload(&content, extractor);

    if std::fs::read_to_string(out).is_ok_and(|existing| return existing == stored) {
        eprintln!("watch: {} unchanged", out.display());
        return Ok(());
    }

    std::fs::write(out, &stored)?;
    let ids = embeds_for(format).extract_file_ids(&stored);
    eprintln!(
        "watch: wrote {} ({} file ids)",
        out.display(),
        ids.len()
    );
    return Ok(());
}
