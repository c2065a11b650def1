//! Crate-level error types for embedsync diagnostics.

use std::path::PathBuf;

/// All errors in embedsync carry enough context to produce a useful
/// diagnostic without a debugger. Content transformations themselves are
/// total and never construct one of these; errors only arise at the
/// config, CLI, and filesystem boundaries.
#[allow(clippy::error_impl_error, reason = "crate-internal error type")]
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// No base URI available from config or CLI flags, so download URLs
    /// can be neither matched nor built.
    #[error("base URI not configured: set `base_uri` in .embedsync.toml or pass --base-uri")]
    BaseUriNotConfigured,

    /// `init` refuses to overwrite an existing config file.
    #[error("config already exists: {}", path.display())]
    ConfigExists {
        /// Path to the config file that already exists.
        path: PathBuf,
    },

    /// Underlying I/O error from the filesystem.
    #[error("io: {0}")]
    Io(
        /// The wrapped I/O error.
        #[from]
        std::io::Error,
    ),

    /// JSON serialization failed.
    #[error("json serialize: {0}")]
    Json(
        /// The wrapped JSON serialization error.
        #[from]
        serde_json::Error,
    ),

    /// TOML deserialization failed.
    #[error("toml deserialize: {0}")]
    TomlDe(
        /// The wrapped TOML deserialization error.
        #[from]
        toml::de::Error,
    ),

    /// No content format registered for this file extension.
    #[error("no content format for extension: .{ext}")]
    UnsupportedFormat {
        /// File extension without the leading dot.
        ext: String,
    },

    /// Filesystem watcher could not be created or attached.
    #[error("watcher setup failed: {reason}")]
    WatchSetup {
        /// Description of the watcher failure.
        reason: String,
    },

    /// The synchronization worker thread panicked before handing its
    /// session back.
    #[error("sync worker panicked")]
    WorkerPanicked,
}
