//! Format-specific image-embed matchers: find embeds, rewrite them for
//! upload or view, and extract the file ids they reference.
//!
//! Every operation is total. Embeds that match no pattern are left
//! untouched, and only the URL/token substring inside a match is ever
//! substituted — surrounding markup and attributes survive verbatim.

use std::sync::LazyLock;

use regex::{Captures, Regex};

use crate::codec::TokenExtractor;
use crate::format::ContentFormat;
use crate::resolver::ResolveFileUrl;
use crate::types::{FileId, ResourceScope};

/// One matcher implementation per content format.
pub trait EmbedMatcher: Sync {
    /// Collect every `<file-…>` token embed, in order of first appearance,
    /// duplicates preserved. Expects content in stored form.
    fn extract_file_ids(&self, content: &str) -> Vec<FileId>;

    /// Replace managed download URLs with `<file-…>` tokens. Unmanaged
    /// URLs pass through unchanged.
    fn rewrite_for_upload(&self, content: &str, extractor: &TokenExtractor) -> String;

    /// Replace `<file-…>` tokens with resolved download URLs. The resolver
    /// is called once per occurrence, duplicates included.
    fn rewrite_for_view(
        &self,
        content: &str,
        resolver: &dyn ResolveFileUrl,
        scope: &ResourceScope,
    ) -> String;
}

/// Matcher for HTML-like markup: `<img … src="…" …>` tags.
struct HtmlEmbeds {
    /// Any image tag, with the `src` value captured. Attribute-order
    /// agnostic: other attributes may precede or follow `src`, but `src`
    /// must be a whole attribute name (`data-src` does not match).
    image: Regex,
    /// An image tag whose `src` is a `<file-…>` token, id captured.
    token_image: Regex,
}

impl HtmlEmbeds {
    /// Compile the HTML patterns.
    ///
    /// # Panics
    ///
    /// Panics if a hardcoded pattern is invalid (compile-time invariant).
    fn new() -> Self {
        return Self {
            image: Regex::new(r#"<img\s+(?:[^>]*\s)?src="([^"]+)"[^>]*>"#).expect("valid regex"),
            token_image: Regex::new(r#"<img\s+(?:[^>]*\s)?src="<(file-[^"]+)>"[^>]*>"#)
                .expect("valid regex"),
        };
    }
}

impl EmbedMatcher for HtmlEmbeds {
    fn extract_file_ids(&self, content: &str) -> Vec<FileId> {
        return self
            .token_image
            .captures_iter(content)
            .map(|cap| return FileId(cap[1].to_string()))
            .collect();
    }

    fn rewrite_for_upload(&self, content: &str, extractor: &TokenExtractor) -> String {
        return self
            .image
            .replace_all(content, |cap: &Captures<'_>| {
                let tag = &cap[0];
                let url = &cap[1];
                let replacement = extractor.url_to_token(url);
                // Pass-through URLs leave the whole tag untouched.
                return tag.replacen(url, &replacement, 1);
            })
            .into_owned();
    }

    fn rewrite_for_view(
        &self,
        content: &str,
        resolver: &dyn ResolveFileUrl,
        scope: &ResourceScope,
    ) -> String {
        return self
            .token_image
            .replace_all(content, |cap: &Captures<'_>| {
                let tag = &cap[0];
                let file_id = FileId(cap[1].to_string());
                let url = resolver.resolve_file_url(&file_id, scope);
                // The brackets go too: view content holds a plain URL.
                return tag.replacen(&file_id.token(), &url, 1);
            })
            .into_owned();
    }
}

/// Matcher for Markdown-like markup: `![alt](…)` embeds. Alt text is
/// preserved verbatim, including empty alt text.
struct MarkdownEmbeds {
    /// Any image embed, alt and URL captured.
    image: Regex,
    /// An image embed whose target is a `<file-…>` token, alt and id
    /// captured.
    token_image: Regex,
}

impl MarkdownEmbeds {
    /// Compile the Markdown patterns.
    ///
    /// # Panics
    ///
    /// Panics if a hardcoded pattern is invalid (compile-time invariant).
    fn new() -> Self {
        return Self {
            image: Regex::new(r"!\[([^\]]*)\]\(([^)]+)\)").expect("valid regex"),
            token_image: Regex::new(r"!\[([^\]]*)\]\(<(file-[^>]+)>\)").expect("valid regex"),
        };
    }
}

impl EmbedMatcher for MarkdownEmbeds {
    fn extract_file_ids(&self, content: &str) -> Vec<FileId> {
        return self
            .token_image
            .captures_iter(content)
            .map(|cap| return FileId(cap[2].to_string()))
            .collect();
    }

    fn rewrite_for_upload(&self, content: &str, extractor: &TokenExtractor) -> String {
        return self
            .image
            .replace_all(content, |cap: &Captures<'_>| {
                let alt = &cap[1];
                let url = &cap[2];
                let replacement = extractor.url_to_token(url);
                return format!("![{alt}]({replacement})");
            })
            .into_owned();
    }

    fn rewrite_for_view(
        &self,
        content: &str,
        resolver: &dyn ResolveFileUrl,
        scope: &ResourceScope,
    ) -> String {
        return self
            .token_image
            .replace_all(content, |cap: &Captures<'_>| {
                let alt = &cap[1];
                let file_id = FileId(cap[2].to_string());
                let url = resolver.resolve_file_url(&file_id, scope);
                return format!("![{alt}]({url})");
            })
            .into_owned();
    }
}

/// Select the matcher for a content format.
pub fn embeds_for(format: ContentFormat) -> &'static dyn EmbedMatcher {
    /// Shared HTML matcher, compiled on first use.
    static HTML: LazyLock<HtmlEmbeds> = LazyLock::new(HtmlEmbeds::new);
    /// Shared Markdown matcher, compiled on first use.
    static MARKDOWN: LazyLock<MarkdownEmbeds> = LazyLock::new(MarkdownEmbeds::new);

    return match format {
        ContentFormat::Html => &*HTML,
        ContentFormat::Markdown => &*MARKDOWN,
    };
}
