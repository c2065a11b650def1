//! Editor session state machine: reconciles external updates into view
//! content and commits debounced local edits back to stored content.
//!
//! The session core is time-free. The debounce window itself lives in the
//! `sync` runner; this module only distinguishes "a local edit is pending"
//! from "it has been committed". Every write is guarded by a value-equality
//! check, which is what breaks update cycles between the two directions.

use std::collections::BTreeSet;

use crate::codec::TokenExtractor;
use crate::format::ContentFormat;
use crate::matcher::embeds_for;
use crate::resolver::ResolveFileUrl;
use crate::types::{FileId, ResourceScope};

/// Outcome of committing a pending local edit: the stored content was
/// rewritten, and the file-id list may have changed with it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Commit {
    /// The new file-id list, present only when it differed from the
    /// previous list as a set.
    pub file_ids: Option<Vec<FileId>>,
    /// The newly committed stored content.
    pub stored_content: String,
}

/// Per-editing-session content state holder and synchronization
/// controller. Created per form instance, discarded on unmount; mirrors an
/// external store but persists nothing itself.
pub struct EditorSession {
    /// URL → token extractor for the configured API root.
    extractor: TokenExtractor,
    /// Derived cache: file ids referenced by the current stored content.
    file_ids: Vec<FileId>,
    /// Content format currently selected by the surrounding editor.
    format: ContentFormat,
    /// Whether a local edit is staged and awaiting its debounce commit.
    pending_edit: bool,
    /// Token → URL resolver collaborator.
    resolver: Box<dyn ResolveFileUrl + Send>,
    /// Scope parameterizing URL resolution.
    scope: ResourceScope,
    /// Canonical stored content: file tokens, host-independent.
    stored_content: String,
    /// Editable view content: file tokens resolved to URLs.
    view_content: String,
    /// Bumped once per actual view rewrite. Derivations that produce an
    /// equal value leave it unchanged, making the no-redundant-write
    /// guarantee observable.
    view_revision: u64,
}

/// Construction parameters for an `EditorSession`. The file-id list is
/// not supplied: it is a derived cache and is computed from the initial
/// stored content.
pub struct SessionOptions {
    /// API root used to recognize managed download URLs.
    pub base_uri: String,
    /// Initial content format.
    pub format: ContentFormat,
    /// Initial resolution scope.
    pub scope: ResourceScope,
    /// Externally-bound initial stored content; empty for new documents.
    pub stored_content: String,
}

impl SessionOptions {
    /// Options for an empty document in the given format and scope.
    pub fn empty(base_uri: &str, format: ContentFormat, scope: ResourceScope) -> Self {
        return Self {
            base_uri: base_uri.to_string(),
            format,
            scope,
            stored_content: String::new(),
        };
    }
}

impl EditorSession {
    /// Create a session, deriving the initial view content and file-id
    /// list from the initial stored content.
    pub fn new(options: SessionOptions, resolver: Box<dyn ResolveFileUrl + Send>) -> Self {
        let mut session = Self {
            extractor: TokenExtractor::new(&options.base_uri),
            file_ids: Vec::new(),
            format: options.format,
            pending_edit: false,
            resolver,
            scope: options.scope,
            stored_content: options.stored_content,
            view_content: String::new(),
            view_revision: 0,
        };
        session.file_ids = session.extract_file_ids(&session.stored_content);
        session.view_content = session.transform_for_view(&session.stored_content);
        return session;
    }

    /// Commit a staged local edit: derive the stored form of the current
    /// view content and, when it differs, rewrite stored content and
    /// recompute the file-id list.
    ///
    /// Returns `None` when nothing was pending or the derivation matched
    /// the current stored content. The file-id list is only rewritten when
    /// it differs from the previous value as a set, so collaborators
    /// watching it are not re-triggered by reorderings.
    pub fn commit_pending(&mut self) -> Option<Commit> {
        if !self.pending_edit {
            return None;
        }
        self.pending_edit = false;

        let candidate = self.transform_for_upload(&self.view_content);
        if candidate == self.stored_content {
            return None;
        }
        self.stored_content = candidate;

        // Tokens only exist in stored form, so extraction reads the
        // committed content, not the view.
        let next = self.extract_file_ids(&self.stored_content);
        let changed = as_id_set(&next) != as_id_set(&self.file_ids);
        if changed {
            self.file_ids = next.clone();
        }
        return Some(Commit {
            file_ids: changed.then(|| return next),
            stored_content: self.stored_content.clone(),
        });
    }

    /// File ids referenced by stored-form content, in order, duplicates
    /// preserved.
    pub fn extract_file_ids(&self, content: &str) -> Vec<FileId> {
        return embeds_for(self.format).extract_file_ids(content);
    }

    /// The derived file-id list for the current stored content.
    pub fn file_ids(&self) -> &[FileId] {
        return &self.file_ids;
    }

    /// Whether a local edit is staged and awaiting commit.
    pub fn has_pending_edit(&self) -> bool {
        return self.pending_edit;
    }

    /// Re-derive the view from the current stored content, writing it only
    /// when the derived value differs.
    fn reconcile(&mut self, flushed: Option<Commit>) -> Reconciled {
        let derived = self.transform_for_view(&self.stored_content);
        let view_changed = derived != self.view_content;
        if view_changed {
            self.view_content = derived;
            self.view_revision += 1;
        }
        return Reconciled {
            flushed,
            view_changed,
        };
    }

    /// External update: the editor switched content formats. Flushes any
    /// pending edit under the old format first, then re-derives the view.
    pub fn set_content_format(&mut self, format: ContentFormat) -> Reconciled {
        let flushed = self.commit_pending();
        self.format = format;
        return self.reconcile(flushed);
    }

    /// External update: the viewing scope changed. Stored content is
    /// untouched; the view derivation is invalidated and recomputed.
    pub fn set_resource_scope(&mut self, scope: ResourceScope) -> Reconciled {
        let flushed = self.commit_pending();
        self.scope = scope;
        return self.reconcile(flushed);
    }

    /// External update: new canonical content arrived (server refetch).
    ///
    /// A pending local edit is committed first, then the external value
    /// wins (last-applied-wins; see DESIGN.md). Setting an equal value
    /// leaves the view untouched.
    pub fn set_stored_content(&mut self, content: &str) -> Reconciled {
        let flushed = self.commit_pending();
        if content != self.stored_content {
            self.stored_content = content.to_string();
        }
        return self.reconcile(flushed);
    }

    /// Local edit: the user (or the embedding UI, programmatically) wrote
    /// new view content. Stages a pending commit; writing an equal value
    /// is a no-op and stages nothing.
    pub fn set_view_content(&mut self, content: &str) {
        if content == self.view_content {
            return;
        }
        self.view_content = content.to_string();
        self.view_revision += 1;
        self.pending_edit = true;
    }

    /// The canonical stored content.
    pub fn stored_content(&self) -> &str {
        return &self.stored_content;
    }

    /// Rewrite view-form content into stored form (URLs → tokens) under
    /// the current format. Total: non-matching input passes through.
    pub fn transform_for_upload(&self, content: &str) -> String {
        return embeds_for(self.format).rewrite_for_upload(content, &self.extractor);
    }

    /// Rewrite stored-form content into view form (tokens → URLs) under
    /// the current format and scope. Total: non-matching input passes
    /// through.
    pub fn transform_for_view(&self, content: &str) -> String {
        return embeds_for(self.format).rewrite_for_view(
            content,
            self.resolver.as_ref(),
            &self.scope,
        );
    }

    /// The editable view content.
    pub fn view_content(&self) -> &str {
        return &self.view_content;
    }

    /// Count of actual view rewrites since construction.
    pub fn view_revision(&self) -> u64 {
        return self.view_revision;
    }
}

/// Effects of applying an external update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reconciled {
    /// Commit produced by flushing a pending local edit first, if any.
    pub flushed: Option<Commit>,
    /// Whether the view derivation differed and was rewritten.
    pub view_changed: bool,
}

/// File-id list as a set, for the write guard on `file_ids`.
fn as_id_set(ids: &[FileId]) -> BTreeSet<&FileId> {
    return ids.iter().collect();
}
