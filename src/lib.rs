//! embedsync keeps two renditions of editable content synchronized:
//! a canonical "stored" form in which managed images are opaque
//! `<file-…>` tokens, and an editable "view" form in which those tokens
//! are resolved to downloadable URLs for a particular resource scope.
//!
//! The [`session::EditorSession`] state machine holds both renditions and
//! applies every write behind a value-equality guard; [`sync::spawn`]
//! wraps a session in a worker that debounces local edits and serializes
//! them with external updates over channels.

pub mod codec;
pub mod commands;
pub mod config;
pub mod error;
pub mod format;
pub mod matcher;
pub mod resolver;
pub mod session;
pub mod sync;
pub mod types;
pub mod watch;

pub use codec::TokenExtractor;
pub use error::Error;
pub use format::ContentFormat;
pub use resolver::{DownloadUrlBuilder, ResolveFileUrl};
pub use session::{EditorSession, SessionOptions};
pub use sync::{SessionEvent, SessionUpdate, SyncHandle};
pub use types::{FileId, ResourceGroup, ResourceScope};
