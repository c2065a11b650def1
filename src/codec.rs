//! URL → file-token codec. The reverse direction (token → URL) lives
//! behind the `ResolveFileUrl` seam in `resolver`.

use regex::Regex;

/// Extracts file tokens from fully-qualified download URLs against a fixed
/// API root. Compiled once and shared across rewrites.
pub struct TokenExtractor {
    /// Matches `<base>/files/<segment>/<file-id>?token=<anything>`, where
    /// the file id is `file-` prefixed and contains no `/` or `?`.
    pattern: Regex,
}

impl TokenExtractor {
    /// Build an extractor for the given API root. A trailing slash on the
    /// base URI is ignored.
    ///
    /// # Panics
    ///
    /// Panics if the hardcoded URL pattern is invalid (compile-time
    /// invariant; the base URI itself is regex-escaped).
    pub fn new(base_uri: &str) -> Self {
        let base = regex::escape(base_uri.trim_end_matches('/'));
        let pattern = Regex::new(&format!(r"^{base}/files/[^/]+/(file-[^/?]+)\?token=.*$"))
            .expect("valid regex");
        return Self { pattern };
    }

    /// Convert a download URL into its `<file-…>` token form.
    ///
    /// URLs that are external, malformed, or already tokens are returned
    /// unchanged — a deliberate pass-through, not an error: content may
    /// legitimately embed images this tool does not manage.
    pub fn url_to_token(&self, url: &str) -> String {
        return match self.pattern.captures(url).and_then(|c| return c.get(1)) {
            None => url.to_string(),
            Some(id) => format!("<{}>", id.as_str()),
        };
    }
}
