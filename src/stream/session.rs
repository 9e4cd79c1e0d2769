//! Stream session lifecycle.
//!
//! [`SearchSession`] owns the request lifecycle for one consumer: it opens
//! the streaming response, pipes chunks through the frame decoder and event
//! interpreter, applies the resulting events to the progress tracker and
//! result accumulator, and publishes [`SessionState`] snapshots through a
//! watch channel. At most one session is live per controller; starting a new
//! one cancels the previous one first, and a superseded session's
//! late-arriving updates are discarded.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use futures_util::StreamExt;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, error, warn};

use super::decoder::FrameDecoder;
use super::event::{describe_stage, interpret, messages, ProgressState, SearchEvent};
use super::progress::ProgressTracker;
use super::results::ResultAccumulator;
use crate::favorites::FavoritesStore;
use crate::models::{SearchFilters, University};
use crate::transport::{SearchTransport, TransportError};

/// Lifecycle phase of the current session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionPhase {
    #[default]
    Idle,
    Starting,
    Streaming,
    Completed,
    Failed,
    Cancelled,
}

impl SessionPhase {
    /// Whether the session has reached a terminal state.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Failed | Self::Cancelled)
    }
}

/// Observable state of the current search session.
///
/// Snapshots are internally consistent: results arrive in insertion order,
/// the progress value never decreases within a session, and `loading` clears
/// on every terminal phase.
#[derive(Debug, Clone, Default)]
pub struct SessionState {
    pub phase: SessionPhase,
    pub loading: bool,
    pub results: Vec<University>,
    pub error: Option<String>,
    pub progress: Option<ProgressState>,
    pub progress_value: f64,
    pub expected_total: Option<u64>,
}

/// State cell shared with the in-flight session task.
///
/// The epoch is bumped whenever a session is superseded; every write from a
/// session task checks it inside the watch lock, so a stale task's updates
/// never land.
struct Shared {
    epoch: AtomicU64,
    tx: watch::Sender<SessionState>,
}

impl Shared {
    fn apply(&self, epoch: u64, f: impl FnOnce(&mut SessionState)) {
        self.tx.send_if_modified(|state| {
            if self.epoch.load(Ordering::SeqCst) != epoch {
                return false;
            }
            f(state);
            true
        });
    }
}

/// Controller for the streaming search request lifecycle.
pub struct SearchSession {
    transport: Arc<dyn SearchTransport>,
    favorites: Arc<dyn FavoritesStore>,
    shared: Arc<Shared>,
    task: Option<JoinHandle<()>>,
}

impl SearchSession {
    /// Create an idle controller. `start` must be called from within a tokio
    /// runtime.
    pub fn new(transport: Arc<dyn SearchTransport>, favorites: Arc<dyn FavoritesStore>) -> Self {
        let (tx, _rx) = watch::channel(SessionState::default());
        Self {
            transport,
            favorites,
            shared: Arc::new(Shared {
                epoch: AtomicU64::new(0),
                tx,
            }),
            task: None,
        }
    }

    /// Subscribe to state snapshots.
    pub fn watch(&self) -> watch::Receiver<SessionState> {
        self.shared.tx.subscribe()
    }

    /// Clone of the current state.
    pub fn snapshot(&self) -> SessionState {
        self.shared.tx.borrow().clone()
    }

    /// Start a new session, superseding any session still in flight.
    ///
    /// All derived state is reset before the request is issued; the filters
    /// are passed through to the backend unmodified.
    pub fn start(&mut self, filters: SearchFilters) {
        self.supersede();
        let epoch = self.shared.epoch.load(Ordering::SeqCst);

        self.shared.tx.send_modify(|state| {
            *state = SessionState {
                phase: SessionPhase::Starting,
                loading: true,
                progress: Some(ProgressState::preparing()),
                ..SessionState::default()
            };
        });

        let transport = Arc::clone(&self.transport);
        let favorites = Arc::clone(&self.favorites);
        let shared = Arc::clone(&self.shared);
        self.task = Some(tokio::spawn(async move {
            run_session(transport, favorites, shared, epoch, filters).await;
        }));
    }

    /// Cancel the in-flight session, if any.
    ///
    /// Cancellation is not a failure: no error message, no fallback data.
    /// Loading clears, and a bar that started moving runs to the end.
    pub fn cancel(&mut self) {
        if self.supersede() {
            debug!("search session cancelled");
            self.shared.tx.send_if_modified(|state| {
                // The session may have reached a terminal state between the
                // last snapshot and the abort; leave that outcome alone.
                if state.phase.is_terminal() {
                    return false;
                }
                state.phase = SessionPhase::Cancelled;
                state.loading = false;
                if state.progress_value > 0.0 && state.progress_value < 100.0 {
                    state.progress_value = 100.0;
                }
                true
            });
        }
    }

    /// Abort the current task and bump the epoch so its late writes are
    /// discarded. Returns whether a session was actually in flight.
    fn supersede(&mut self) -> bool {
        self.shared.epoch.fetch_add(1, Ordering::SeqCst);
        match self.task.take() {
            Some(task) if !task.is_finished() => {
                task.abort();
                true
            }
            _ => false,
        }
    }
}

impl Drop for SearchSession {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

/// Drive one session from request to terminal state.
async fn run_session(
    transport: Arc<dyn SearchTransport>,
    favorites: Arc<dyn FavoritesStore>,
    shared: Arc<Shared>,
    epoch: u64,
    filters: SearchFilters,
) {
    let mut tracker = ProgressTracker::new();
    let mut accumulator = ResultAccumulator::new();

    let outcome = stream_events(
        transport.as_ref(),
        favorites.as_ref(),
        &shared,
        epoch,
        &filters,
        &mut tracker,
        &mut accumulator,
    )
    .await;

    // Decide the terminal outcome, then land it in a single write so
    // observers never see a terminal phase with stale loading/progress.
    let (phase, error, fallback) = match outcome {
        // A clean end without a `complete` frame still completes. The demo
        // fallback only kicks in when the backend reported an error and
        // nothing was accumulated.
        Ok(saw_error) if saw_error && accumulator.is_empty() => {
            (SessionPhase::Failed, None, true)
        }
        Ok(_) => (SessionPhase::Completed, None, false),
        Err(err) => {
            error!(error = %err, "search stream failed");
            let message = match &err {
                TransportError::BadResponse(_) => messages::BAD_RESPONSE,
                _ => messages::SEARCH_FAILED,
            };
            (SessionPhase::Failed, Some(message.to_string()), true)
        }
    };

    let results = if fallback {
        accumulator.load_demo_data();
        Some(accumulator.records().to_vec())
    } else {
        None
    };

    tracker.finalize();
    let value = tracker.value();
    shared.apply(epoch, |state| {
        state.phase = phase;
        if let Some(message) = error {
            state.error = Some(message);
        }
        if let Some(results) = results {
            state.results = results;
        }
        state.loading = false;
        state.progress_value = value;
    });
}

/// Read the stream to the end, applying every interpreted event.
///
/// Returns whether the backend emitted any `error` frame. Transport and read
/// failures propagate; cancellation never reaches here because the task is
/// aborted at an await point.
async fn stream_events(
    transport: &dyn SearchTransport,
    favorites: &dyn FavoritesStore,
    shared: &Shared,
    epoch: u64,
    filters: &SearchFilters,
    tracker: &mut ProgressTracker,
    accumulator: &mut ResultAccumulator,
) -> Result<bool, TransportError> {
    let mut stream = transport.open(filters).await?;
    shared.apply(epoch, |state| state.phase = SessionPhase::Streaming);

    let mut decoder = FrameDecoder::new();
    let mut saw_error = false;

    while let Some(chunk) = stream.next().await {
        let chunk = chunk?;
        for frame in decoder.feed(&chunk) {
            let Some(event) = interpret(&frame) else {
                continue;
            };
            apply_event(event, favorites, shared, epoch, tracker, accumulator, &mut saw_error);
        }
    }

    decoder.finish();
    Ok(saw_error)
}

/// Apply one domain event to the derived state and publish a snapshot.
fn apply_event(
    event: SearchEvent,
    favorites: &dyn FavoritesStore,
    shared: &Shared,
    epoch: u64,
    tracker: &mut ProgressTracker,
    accumulator: &mut ResultAccumulator,
    saw_error: &mut bool,
) {
    match event {
        SearchEvent::Progress(progress) => {
            tracker.apply_stage(&progress);
            let value = tracker.value();
            shared.apply(epoch, |state| {
                state.progress = Some(progress);
                state.progress_value = value;
            });
        }
        SearchEvent::Result {
            university,
            index,
            total,
        } => {
            accumulator.set_expected_total(total);
            accumulator.insert(university, favorites);
            if let Some(total) = total.filter(|&t| t > 0) {
                tracker.apply_result(index.unwrap_or(0), total);
            }

            let results = accumulator.records().to_vec();
            let expected = accumulator.expected_total();
            let value = tracker.value();
            shared.apply(epoch, |state| {
                state.results = results;
                state.expected_total = expected;
                state.progress_value = value;
            });
        }
        SearchEvent::Complete => {
            tracker.complete();
            let progress = describe_stage("completed", &serde_json::Value::Null);
            shared.apply(epoch, |state| {
                state.progress = Some(progress);
                state.progress_value = 100.0;
            });
        }
        SearchEvent::StreamError { message } => {
            *saw_error = true;
            warn!(message = %message, "backend reported an error mid-stream");
            shared.apply(epoch, |state| state.error = Some(message));
        }
    }
}
