//! Channel-driven synchronization runner.
//!
//! External updates and local edits are two producers funneled into one
//! event channel, so every apply step is serialized through a single
//! worker loop — no locks, no reactive graph. Local edits open a debounce
//! window implemented with `recv_timeout`; each further edit restarts the
//! window, and expiry (or any non-edit event) commits the pending edit.

use std::thread::JoinHandle;
use std::time::Duration;

use crossbeam_channel::{Receiver, RecvTimeoutError, Sender};

use crate::error::Error;
use crate::format::ContentFormat;
use crate::session::{Commit, EditorSession};
use crate::types::{FileId, ResourceScope};

/// Default quiet period before a local edit is committed.
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(250);

/// Inbound events from the two producers.
#[derive(Debug, Clone)]
pub enum SessionEvent {
    /// The surrounding editor switched content formats.
    ContentFormat(ContentFormat),
    /// The user edited the view content.
    LocalEdit(String),
    /// The viewing scope changed.
    ResourceScope(ResourceScope),
    /// Stop the runner after committing any pending edit.
    Shutdown,
    /// New canonical content arrived from outside (e.g. a server refetch).
    StoredUpdate(String),
}

/// Outbound notifications. Emitted only for actual writes — equal-value
/// derivations and set-equal file-id lists produce nothing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionUpdate {
    /// The file-id list was rewritten by a committed local edit.
    FileIds(Vec<FileId>),
    /// Stored content was rewritten by a committed local edit.
    Stored(String),
    /// View content was re-derived after an external update.
    View(String),
}

/// Handle to a running synchronization worker.
pub struct SyncHandle {
    /// Send side shared by both producers.
    pub events: Sender<SessionEvent>,
    /// Worker thread, joined by `shutdown`.
    handle: JoinHandle<EditorSession>,
    /// Receive side for observers.
    pub updates: Receiver<SessionUpdate>,
}

impl SyncHandle {
    /// Stop the worker, committing any pending edit first, and hand the
    /// session back.
    ///
    /// # Errors
    ///
    /// Returns `Error::WorkerPanicked` if the worker thread panicked.
    pub fn shutdown(self) -> Result<EditorSession, Error> {
        let _ = self.events.send(SessionEvent::Shutdown);
        return self.handle.join().map_err(|_panic| return Error::WorkerPanicked);
    }
}

/// Apply a single external update and emit its effects.
fn apply_external(
    session: &mut EditorSession,
    event: SessionEvent,
    updates: &Sender<SessionUpdate>,
) {
    let reconciled = match event {
        SessionEvent::ContentFormat(format) => session.set_content_format(format),
        SessionEvent::LocalEdit(_) | SessionEvent::Shutdown => return, // handled by callers
        SessionEvent::ResourceScope(scope) => session.set_resource_scope(scope),
        SessionEvent::StoredUpdate(content) => session.set_stored_content(&content),
    };

    emit_commit(reconciled.flushed, updates);
    if reconciled.view_changed {
        let _ = updates.send(SessionUpdate::View(session.view_content().to_string()));
    }
}

/// Absorb events until the quiet period elapses, then commit.
///
/// Returns `false` when the runner should stop (shutdown or disconnect);
/// the caller performs the final flush.
fn debounce_window(
    session: &mut EditorSession,
    events: &Receiver<SessionEvent>,
    updates: &Sender<SessionUpdate>,
    debounce: Duration,
) -> bool {
    loop {
        match events.recv_timeout(debounce) {
            // A further edit restarts the window.
            Ok(SessionEvent::LocalEdit(content)) => session.set_view_content(&content),
            Ok(SessionEvent::Shutdown) => return false,
            // Externals flush the pending edit themselves (session policy).
            Ok(other) => {
                apply_external(session, other, updates);
                return true;
            },
            Err(RecvTimeoutError::Disconnected) => return false,
            Err(RecvTimeoutError::Timeout) => {
                emit_commit(session.commit_pending(), updates);
                return true;
            },
        }
    }
}

/// Emit the updates for a commit, if one happened.
fn emit_commit(commit: Option<Commit>, updates: &Sender<SessionUpdate>) {
    let Some(commit) = commit else {
        return;
    };
    let _ = updates.send(SessionUpdate::Stored(commit.stored_content));
    if let Some(file_ids) = commit.file_ids {
        let _ = updates.send(SessionUpdate::FileIds(file_ids));
    }
}

/// Worker loop: one serialized apply step for both producers.
fn run(
    mut session: EditorSession,
    events: &Receiver<SessionEvent>,
    updates: &Sender<SessionUpdate>,
    debounce: Duration,
) -> EditorSession {
    loop {
        let Ok(event) = events.recv() else {
            break;
        };
        match event {
            SessionEvent::LocalEdit(content) => {
                session.set_view_content(&content);
                if !debounce_window(&mut session, events, updates, debounce) {
                    break;
                }
            },
            SessionEvent::Shutdown => break,
            other => apply_external(&mut session, other, updates),
        }
    }

    // Final flush: a pending edit survives shutdown/disconnect.
    emit_commit(session.commit_pending(), updates);
    return session;
}

/// Spawn a synchronization worker around a session.
pub fn spawn(session: EditorSession, debounce: Duration) -> SyncHandle {
    let (event_tx, event_rx) = crossbeam_channel::unbounded();
    let (update_tx, update_rx) = crossbeam_channel::unbounded();

    let handle = std::thread::spawn(move || {
        return run(session, &event_rx, &update_tx, debounce);
    });

    return SyncHandle {
        events: event_tx,
        handle,
        updates: update_rx,
    };
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::{SessionEvent, SessionUpdate, spawn};
    use crate::format::ContentFormat;
    use crate::resolver::DownloadUrlBuilder;
    use crate::session::{EditorSession, SessionOptions};
    use crate::types::{FileId, ResourceGroup, ResourceScope};

    /// Base URI shared by the runner tests.
    const BASE: &str = "https://host";

    /// Debounce short enough to keep the tests fast, long enough that a
    /// burst of sends lands inside one window.
    const DEBOUNCE: Duration = Duration::from_millis(50);

    /// Generous upper bound for receiving an expected update.
    const RECV_TIMEOUT: Duration = Duration::from_secs(2);

    fn markdown_session(stored: &str) -> EditorSession {
        let options = SessionOptions {
            base_uri: BASE.to_string(),
            format: ContentFormat::Markdown,
            scope: ResourceScope::with_resource_id(ResourceGroup::Project, "p-1"),
            stored_content: stored.to_string(),
        };
        return EditorSession::new(options, Box::new(DownloadUrlBuilder::new(BASE, "xyz")));
    }

    #[test]
    fn burst_of_edits_commits_once_with_final_value() {
        let handle = spawn(markdown_session(""), DEBOUNCE);

        for n in 0..5 {
            let edit = format!("![logo](https://host/files/p-1/file-{n}?token=t)");
            handle.events.send(SessionEvent::LocalEdit(edit)).unwrap();
        }

        let first = handle.updates.recv_timeout(RECV_TIMEOUT).unwrap();
        assert_eq!(first, SessionUpdate::Stored("![logo](<file-4>)".to_string()));
        let second = handle.updates.recv_timeout(RECV_TIMEOUT).unwrap();
        assert_eq!(
            second,
            SessionUpdate::FileIds(vec![FileId("file-4".to_string())])
        );
        // Exactly one Stored and one FileIds update for the whole burst.
        assert!(
            handle.updates.recv_timeout(DEBOUNCE * 3).is_err(),
            "expected a single commit for the burst"
        );

        let session = handle.shutdown().unwrap();
        assert_eq!(session.stored_content(), "![logo](<file-4>)");
    }

    #[test]
    fn no_further_updates_after_commit() {
        let handle = spawn(markdown_session(""), DEBOUNCE);
        handle
            .events
            .send(SessionEvent::LocalEdit("plain text".to_string()))
            .unwrap();

        assert_eq!(
            handle.updates.recv_timeout(RECV_TIMEOUT).unwrap(),
            SessionUpdate::Stored("plain text".to_string())
        );
        // No managed tokens, so the (empty) file-id set did not change.
        assert!(
            handle
                .updates
                .recv_timeout(DEBOUNCE * 3)
                .is_err(),
            "expected no further updates"
        );
        let _ = handle.shutdown().unwrap();
    }

    #[test]
    fn external_update_rederives_view() {
        let handle = spawn(markdown_session(""), DEBOUNCE);
        handle
            .events
            .send(SessionEvent::StoredUpdate("![a](<file-a>)".to_string()))
            .unwrap();

        assert_eq!(
            handle.updates.recv_timeout(RECV_TIMEOUT).unwrap(),
            SessionUpdate::View("![a](https://host/files/p-1/file-a?token=xyz)".to_string())
        );
        let _ = handle.shutdown().unwrap();
    }

    #[test]
    fn external_update_during_window_flushes_edit_first() {
        let handle = spawn(markdown_session(""), DEBOUNCE);
        handle
            .events
            .send(SessionEvent::LocalEdit("local draft".to_string()))
            .unwrap();
        handle
            .events
            .send(SessionEvent::StoredUpdate("![s](<file-s>)".to_string()))
            .unwrap();

        // The pending edit commits before the external value lands.
        assert_eq!(
            handle.updates.recv_timeout(RECV_TIMEOUT).unwrap(),
            SessionUpdate::Stored("local draft".to_string())
        );
        assert_eq!(
            handle.updates.recv_timeout(RECV_TIMEOUT).unwrap(),
            SessionUpdate::View("![s](https://host/files/p-1/file-s?token=xyz)".to_string())
        );

        let session = handle.shutdown().unwrap();
        assert_eq!(session.stored_content(), "![s](<file-s>)");
    }

    #[test]
    fn shutdown_flushes_pending_edit() {
        let handle = spawn(markdown_session(""), Duration::from_secs(60));
        handle
            .events
            .send(SessionEvent::LocalEdit("last words".to_string()))
            .unwrap();

        let session = handle.shutdown().unwrap();
        assert_eq!(session.stored_content(), "last words");
    }
}
