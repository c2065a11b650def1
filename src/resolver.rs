//! Token → URL resolution: the seam between content rewriting and the
//! file service that actually serves downloads.

use crate::types::{FileId, ResourceScope};

/// Builds download URLs against a fixed API root with a shared access
/// token. The standard `ResolveFileUrl` implementation for CLI use.
pub struct DownloadUrlBuilder {
    /// API root, stored without a trailing slash.
    base_uri: String,
    /// Opaque access token appended to every URL.
    token: String,
}

impl DownloadUrlBuilder {
    /// Build a URL builder for the given API root and access token.
    pub fn new(base_uri: &str, token: &str) -> Self {
        return Self {
            base_uri: base_uri.trim_end_matches('/').to_string(),
            token: token.to_string(),
        };
    }
}

impl ResolveFileUrl for DownloadUrlBuilder {
    /// `<base>/files/<scope-segment>/<file-id>?token=<token>`.
    fn resolve_file_url(&self, file_id: &FileId, scope: &ResourceScope) -> String {
        return format!(
            "{}/files/{}/{}?token={}",
            self.base_uri,
            scope.segment(),
            file_id.as_str(),
            self.token,
        );
    }
}

/// Resolves a file id to a downloadable URL for a given scope.
///
/// Supplied by the surrounding system; implementations never validate the
/// result. A deleted file simply yields a dead URL — resolution failures
/// are not this crate's concern.
pub trait ResolveFileUrl {
    /// Build the download URL for one file occurrence. Called once per
    /// occurrence, duplicates included.
    fn resolve_file_url(&self, file_id: &FileId, scope: &ResourceScope) -> String;
}
