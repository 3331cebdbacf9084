//! Two-phase staging workflow for one in-flight submission.
//!
//! A [`StagingSession`] separates the unvalidated, mutable preview draft
//! from the committed, immutable record. The session exposes its state as
//! an explicit enumerated value plus a `tokio::sync::watch` channel:
//! callers observe transitions, they never block on requests.
//!
//! # State machine
//!
//! ```text
//! Idle ──request_preview──▶ PreviewLoading ──▶ PreviewReady ──commit──▶ Saving ──▶ Committed
//!                                │                  │  ▲                  │
//!                                ▼                  │  └─ edit (self)     ▼
//!                              Error ◀──────────────┴───────────────── Error
//! ```
//!
//! `Error` keeps the message and, after a failed commit, the draft, so
//! the caller can retry without re-previewing. `reset()` returns to
//! `Idle` from anywhere and makes any late-arriving response for the
//! superseded session a no-op. `Committed` is terminal: the next
//! submission starts with `reset()` or a fresh session.

use std::sync::{Arc, Mutex};

use tokio::sync::watch;

use crate::backend::{Backend, CommitRequest};
use crate::models::{PreviewDraft, PreviewInput};

/// Observable workflow state.
#[derive(Debug, Clone, PartialEq)]
pub enum StagingState {
    Idle,
    PreviewLoading,
    PreviewReady,
    Saving,
    Committed { id: String },
    Error { message: String },
}

impl StagingState {
    pub fn name(&self) -> &'static str {
        match self {
            StagingState::Idle => "idle",
            StagingState::PreviewLoading => "preview-loading",
            StagingState::PreviewReady => "preview-ready",
            StagingState::Saving => "saving",
            StagingState::Committed { .. } => "committed",
            StagingState::Error { .. } => "error",
        }
    }
}

/// Synchronous caller-bug rejections.
///
/// Backend failures never surface here; they resolve into
/// [`StagingState::Error`], observable through [`StagingSession::state`]
/// and the watch channel.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum StagingError {
    /// A preview or commit request is already in flight.
    #[error("a request is already in flight")]
    Busy,
    /// The draft can only be edited while a preview is ready.
    #[error("no editable draft in state {0}")]
    NotEditable(&'static str),
    /// Commit requires a previewed draft.
    #[error("nothing to commit in state {0}")]
    NothingToCommit(&'static str),
}

struct Inner {
    state: StagingState,
    draft: Option<PreviewDraft>,
    /// Bumped by every new request and by reset; a response whose epoch
    /// no longer matches is stale and dropped.
    epoch: u64,
}

/// One submission workflow: fetch → preview → edit → commit.
///
/// The interior lock is only held across state mutations, never across an
/// await, so `reset()` and state reads stay responsive while a request is
/// in flight.
pub struct StagingSession<B: Backend> {
    backend: Arc<B>,
    inner: Mutex<Inner>,
    watch_tx: watch::Sender<StagingState>,
}

impl<B: Backend> StagingSession<B> {
    pub fn new(backend: Arc<B>) -> Self {
        let (watch_tx, _) = watch::channel(StagingState::Idle);
        Self {
            backend,
            inner: Mutex::new(Inner {
                state: StagingState::Idle,
                draft: None,
                epoch: 0,
            }),
            watch_tx,
        }
    }

    /// Current state, cloned.
    pub fn state(&self) -> StagingState {
        self.inner.lock().unwrap().state.clone()
    }

    /// Current draft, cloned, if one is staged.
    pub fn draft(&self) -> Option<PreviewDraft> {
        self.inner.lock().unwrap().draft.clone()
    }

    /// Subscribe to state transitions.
    pub fn subscribe(&self) -> watch::Receiver<StagingState> {
        self.watch_tx.subscribe()
    }

    /// Request a summarized draft for the given input.
    ///
    /// Rejects with [`StagingError::Busy`] while a preview or commit is
    /// in flight. On success the session holds the draft in
    /// `PreviewReady`; on backend failure it lands in `Error` with no
    /// draft stored. Returns `Ok` in both of those cases; the outcome is
    /// the observed state.
    pub async fn request_preview(&self, input: PreviewInput) -> Result<(), StagingError> {
        let epoch = {
            let mut inner = self.inner.lock().unwrap();
            if matches!(
                inner.state,
                StagingState::PreviewLoading | StagingState::Saving
            ) {
                return Err(StagingError::Busy);
            }
            inner.epoch += 1;
            inner.draft = None;
            self.transition(&mut inner, StagingState::PreviewLoading);
            inner.epoch
        };

        let result = self.backend.preview(&input).await;

        let mut inner = self.inner.lock().unwrap();
        if inner.epoch != epoch {
            tracing::warn!("dropping stale preview response for a superseded session");
            return Ok(());
        }

        match result {
            Ok(response) => {
                inner.draft = Some(PreviewDraft {
                    source: response.source,
                    url: response
                        .url
                        .or_else(|| input.url().map(str::to_string)),
                    title: response.title,
                    text: response.text,
                    tags: response.tags,
                    entities: response.entities,
                    severity: response.severity,
                    probability: response.probability,
                    provenance: input,
                });
                self.transition(&mut inner, StagingState::PreviewReady);
            }
            Err(err) => {
                inner.draft = None;
                let state = StagingState::Error {
                    message: format!("preview failed: {}", err),
                };
                self.transition(&mut inner, state);
            }
        }
        Ok(())
    }

    /// Replace the draft's text in place. No server round-trip.
    ///
    /// Valid only while a preview is ready; anything else is a caller
    /// bug and is rejected without touching the session.
    pub fn edit_draft_text(&self, new_text: &str) -> Result<(), StagingError> {
        let mut inner = self.inner.lock().unwrap();
        let state_name = inner.state.name();
        if !matches!(inner.state, StagingState::PreviewReady) {
            return Err(StagingError::NotEditable(state_name));
        }
        match inner.draft.as_mut() {
            Some(draft) => {
                draft.text = new_text.to_string();
                Ok(())
            }
            None => Err(StagingError::NotEditable(state_name)),
        }
    }

    /// Persist the staged draft.
    ///
    /// Valid from `PreviewReady`, or from `Error` after a failed commit
    /// (the draft is retained there exactly for this retry). On success
    /// the session is `Committed { id }` and the draft is cleared; on
    /// failure the draft survives untouched.
    pub async fn commit(&self) -> Result<(), StagingError> {
        let (epoch, request) = {
            let mut inner = self.inner.lock().unwrap();
            if matches!(
                inner.state,
                StagingState::PreviewLoading | StagingState::Saving
            ) {
                return Err(StagingError::Busy);
            }
            let draft = match (&inner.state, inner.draft.as_ref()) {
                (StagingState::PreviewReady | StagingState::Error { .. }, Some(draft)) => draft,
                _ => return Err(StagingError::NothingToCommit(inner.state.name())),
            };
            let request = CommitRequest {
                url: draft.url.clone(),
                text: draft.text.clone(),
                title: draft.title.clone(),
            };
            inner.epoch += 1;
            self.transition(&mut inner, StagingState::Saving);
            (inner.epoch, request)
        };

        let result = self.backend.commit(&request).await;

        let mut inner = self.inner.lock().unwrap();
        if inner.epoch != epoch {
            tracing::warn!("dropping stale commit response for a superseded session");
            return Ok(());
        }

        match result {
            Ok(receipt) => {
                inner.draft = None;
                self.transition(&mut inner, StagingState::Committed { id: receipt.id });
            }
            Err(err) => {
                // The draft stays: a transient failure must never lose
                // user-edited text.
                let state = StagingState::Error {
                    message: format!("commit failed: {}", err),
                };
                self.transition(&mut inner, state);
            }
        }
        Ok(())
    }

    /// Discard the session: back to `Idle`, draft dropped, in-flight
    /// responses superseded.
    pub fn reset(&self) {
        let mut inner = self.inner.lock().unwrap();
        inner.epoch += 1;
        inner.draft = None;
        self.transition(&mut inner, StagingState::Idle);
    }

    fn transition(&self, inner: &mut Inner, state: StagingState) {
        tracing::debug!(prev = inner.state.name(), next = state.name(), "staging transition");
        inner.state = state.clone();
        self.watch_tx.send_replace(state);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::collections::VecDeque;
    use std::sync::Mutex as StdMutex;
    use tokio::sync::Notify;

    use crate::backend::{
        BackendError, BackendResult, CommitReceipt, DocumentPage, PreviewResponse,
        VisualizationPayload,
    };
    use crate::models::DocumentRecord;

    /// Backend double fed from scripted response queues. An optional gate
    /// holds preview calls open until released, for in-flight tests.
    struct ScriptedBackend {
        previews: StdMutex<VecDeque<BackendResult<PreviewResponse>>>,
        commits: StdMutex<VecDeque<BackendResult<CommitReceipt>>>,
        gate: StdMutex<Option<Arc<Notify>>>,
    }

    impl ScriptedBackend {
        fn new() -> Self {
            Self {
                previews: StdMutex::new(VecDeque::new()),
                commits: StdMutex::new(VecDeque::new()),
                gate: StdMutex::new(None),
            }
        }

        fn push_preview(&self, result: BackendResult<PreviewResponse>) {
            self.previews.lock().unwrap().push_back(result);
        }

        fn push_commit(&self, result: BackendResult<CommitReceipt>) {
            self.commits.lock().unwrap().push_back(result);
        }

        fn hold_previews(&self) -> Arc<Notify> {
            let gate = Arc::new(Notify::new());
            *self.gate.lock().unwrap() = Some(gate.clone());
            gate
        }
    }

    #[async_trait]
    impl Backend for ScriptedBackend {
        async fn preview(&self, _input: &PreviewInput) -> BackendResult<PreviewResponse> {
            let gate = self.gate.lock().unwrap().clone();
            if let Some(gate) = gate {
                gate.notified().await;
            }
            self.previews
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Err(BackendError::Transport("no scripted preview".into())))
        }

        async fn commit(&self, _request: &CommitRequest) -> BackendResult<CommitReceipt> {
            self.commits
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Err(BackendError::Transport("no scripted commit".into())))
        }

        async fn list_documents(&self, _page: u32, _page_size: u32) -> BackendResult<DocumentPage> {
            Err(BackendError::Transport("not scripted".into()))
        }

        async fn get_document(&self, _id: &str) -> BackendResult<DocumentRecord> {
            Err(BackendError::Transport("not scripted".into()))
        }

        async fn visualization_data(&self) -> BackendResult<VisualizationPayload> {
            Err(BackendError::Transport("not scripted".into()))
        }

        async fn notify(&self, _doc_id: &str) -> BackendResult<()> {
            Err(BackendError::Transport("not scripted".into()))
        }
    }

    fn sample_preview() -> PreviewResponse {
        PreviewResponse {
            url: None,
            source: None,
            title: "T".to_string(),
            text: "body".to_string(),
            tags: vec!["t1".to_string()],
            entities: Vec::new(),
            severity: 2.0,
            probability: 0.5,
        }
    }

    fn session_with(backend: ScriptedBackend) -> StagingSession<ScriptedBackend> {
        StagingSession::new(Arc::new(backend))
    }

    #[tokio::test]
    async fn preview_success_stages_a_draft_with_matching_provenance() {
        let backend = ScriptedBackend::new();
        backend.push_preview(Ok(sample_preview()));
        let session = session_with(backend);

        session
            .request_preview(PreviewInput::Url("http://e.x".to_string()))
            .await
            .unwrap();

        assert_eq!(session.state(), StagingState::PreviewReady);
        let draft = session.draft().unwrap();
        assert_eq!(draft.title, "T");
        assert_eq!(draft.url.as_deref(), Some("http://e.x"));
        assert_eq!(draft.provenance, PreviewInput::Url("http://e.x".to_string()));
    }

    #[tokio::test]
    async fn preview_failure_lands_in_error_with_no_draft() {
        let backend = ScriptedBackend::new();
        backend.push_preview(Err(BackendError::Status {
            status: 500,
            message: "boom".to_string(),
        }));
        let session = session_with(backend);

        session
            .request_preview(PreviewInput::Text("body".to_string()))
            .await
            .unwrap();

        assert!(matches!(session.state(), StagingState::Error { .. }));
        assert!(session.draft().is_none());
    }

    #[tokio::test]
    async fn preview_retry_after_failure_succeeds() {
        let backend = ScriptedBackend::new();
        backend.push_preview(Err(BackendError::Transport("down".to_string())));
        backend.push_preview(Ok(sample_preview()));
        let session = session_with(backend);

        let input = PreviewInput::Text("body".to_string());
        session.request_preview(input.clone()).await.unwrap();
        assert!(matches!(session.state(), StagingState::Error { .. }));

        session.request_preview(input).await.unwrap();
        assert_eq!(session.state(), StagingState::PreviewReady);
    }

    #[tokio::test]
    async fn editing_twice_with_the_same_text_is_idempotent() {
        let backend = ScriptedBackend::new();
        backend.push_preview(Ok(sample_preview()));
        let session = session_with(backend);
        session
            .request_preview(PreviewInput::Text("body".to_string()))
            .await
            .unwrap();

        session.edit_draft_text("edited").unwrap();
        let once = session.draft().unwrap();
        session.edit_draft_text("edited").unwrap();
        assert_eq!(session.draft().unwrap(), once);
    }

    #[tokio::test]
    async fn editing_outside_preview_ready_is_rejected() {
        let session = session_with(ScriptedBackend::new());
        assert_eq!(
            session.edit_draft_text("x"),
            Err(StagingError::NotEditable("idle"))
        );
    }

    #[tokio::test]
    async fn commit_success_is_terminal_and_clears_the_draft() {
        let backend = ScriptedBackend::new();
        backend.push_preview(Ok(sample_preview()));
        backend.push_commit(Ok(CommitReceipt {
            id: "doc-1".to_string(),
            created: true,
        }));
        let session = session_with(backend);

        session
            .request_preview(PreviewInput::Url("http://e.x".to_string()))
            .await
            .unwrap();
        session.commit().await.unwrap();

        assert_eq!(
            session.state(),
            StagingState::Committed {
                id: "doc-1".to_string()
            }
        );
        assert!(session.draft().is_none());
        assert_eq!(
            session.commit().await,
            Err(StagingError::NothingToCommit("committed"))
        );
    }

    #[tokio::test]
    async fn commit_failure_preserves_the_draft_exactly() {
        let backend = ScriptedBackend::new();
        backend.push_preview(Ok(sample_preview()));
        backend.push_commit(Err(BackendError::Transport("timeout".to_string())));
        backend.push_commit(Ok(CommitReceipt {
            id: "doc-2".to_string(),
            created: true,
        }));
        let session = session_with(backend);

        session
            .request_preview(PreviewInput::Text("body".to_string()))
            .await
            .unwrap();
        session.edit_draft_text("edited by hand").unwrap();
        let before = session.draft().unwrap();

        session.commit().await.unwrap();
        assert!(matches!(session.state(), StagingState::Error { .. }));
        assert_eq!(session.draft().unwrap(), before);

        // Retry straight from the error state, no re-preview.
        session.commit().await.unwrap();
        assert_eq!(
            session.state(),
            StagingState::Committed {
                id: "doc-2".to_string()
            }
        );
    }

    #[tokio::test]
    async fn commit_without_a_draft_is_rejected() {
        let session = session_with(ScriptedBackend::new());
        assert_eq!(
            session.commit().await,
            Err(StagingError::NothingToCommit("idle"))
        );
    }

    #[tokio::test]
    async fn a_second_preview_while_one_is_in_flight_is_rejected() {
        let backend = ScriptedBackend::new();
        let gate = backend.hold_previews();
        backend.push_preview(Ok(sample_preview()));
        let session = Arc::new(session_with(backend));

        let in_flight = {
            let session = session.clone();
            tokio::spawn(async move {
                session
                    .request_preview(PreviewInput::Text("body".to_string()))
                    .await
            })
        };
        while session.state() != StagingState::PreviewLoading {
            tokio::task::yield_now().await;
        }

        assert_eq!(
            session
                .request_preview(PreviewInput::Text("other".to_string()))
                .await,
            Err(StagingError::Busy)
        );
        assert_eq!(
            session.commit().await,
            Err(StagingError::Busy)
        );

        gate.notify_one();
        in_flight.await.unwrap().unwrap();
        assert_eq!(session.state(), StagingState::PreviewReady);
    }

    #[tokio::test]
    async fn a_response_arriving_after_reset_is_dropped() {
        let backend = ScriptedBackend::new();
        let gate = backend.hold_previews();
        backend.push_preview(Ok(sample_preview()));
        let session = Arc::new(session_with(backend));

        let in_flight = {
            let session = session.clone();
            tokio::spawn(async move {
                session
                    .request_preview(PreviewInput::Url("http://e.x".to_string()))
                    .await
            })
        };
        while session.state() != StagingState::PreviewLoading {
            tokio::task::yield_now().await;
        }

        session.reset();
        assert_eq!(session.state(), StagingState::Idle);

        gate.notify_one();
        in_flight.await.unwrap().unwrap();

        // The late response must not resurrect the superseded session.
        assert_eq!(session.state(), StagingState::Idle);
        assert!(session.draft().is_none());
    }

    #[tokio::test]
    async fn reset_returns_to_idle_from_any_state() {
        let backend = ScriptedBackend::new();
        backend.push_preview(Ok(sample_preview()));
        backend.push_commit(Ok(CommitReceipt {
            id: "doc-3".to_string(),
            created: true,
        }));
        let session = session_with(backend);

        session
            .request_preview(PreviewInput::Text("body".to_string()))
            .await
            .unwrap();
        session.commit().await.unwrap();
        assert!(matches!(session.state(), StagingState::Committed { .. }));

        session.reset();
        assert_eq!(session.state(), StagingState::Idle);
        assert!(session.draft().is_none());
    }

    #[tokio::test]
    async fn watch_subscribers_observe_transitions() {
        let backend = ScriptedBackend::new();
        backend.push_preview(Ok(sample_preview()));
        let session = session_with(backend);
        let rx = session.subscribe();

        session
            .request_preview(PreviewInput::Text("body".to_string()))
            .await
            .unwrap();

        assert_eq!(*rx.borrow(), StagingState::PreviewReady);
    }
}
