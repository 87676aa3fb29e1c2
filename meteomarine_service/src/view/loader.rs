//! One-shot background loads owned by a view.
//!
//! A `ViewLoader` runs a single fetch on a worker thread and hands the
//! result back to the view through a channel. The view's state is only
//! ever written by the view itself (in `poll`/`wait`), and only while the
//! loader is alive and not cancelled. Dropping the loader cancels it, so a
//! torn-down view can never be updated by a late response.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::thread;

use crate::logging::{self, DataSource};
use crate::model::FetchError;

/// Generic message shown for every kind of load failure.
pub const LOAD_FAILED_MESSAGE: &str = "Failed to load weather data. Reload to try again.";

// ---------------------------------------------------------------------------
// Cancellation
// ---------------------------------------------------------------------------

/// Shared cancellation flag tied to a view's lifetime.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

// ---------------------------------------------------------------------------
// Load state
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub enum LoadState<T> {
    Loading,
    Loaded(T),
    /// Terminal: there is no automatic retry.
    Failed(FetchError),
}

impl<T> LoadState<T> {
    pub fn is_loading(&self) -> bool {
        matches!(self, LoadState::Loading)
    }

    pub fn data(&self) -> Option<&T> {
        match self {
            LoadState::Loaded(data) => Some(data),
            _ => None,
        }
    }

    /// What the user sees for a failure, whatever its cause.
    pub fn error_message(&self) -> Option<&'static str> {
        match self {
            LoadState::Failed(_) => Some(LOAD_FAILED_MESSAGE),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Loader
// ---------------------------------------------------------------------------

pub struct ViewLoader<T> {
    state: LoadState<T>,
    token: CancelToken,
    receiver: Option<Receiver<Result<T, FetchError>>>,
}

impl<T> std::fmt::Debug for ViewLoader<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ViewLoader")
            .field("loading", &self.state.is_loading())
            .field("cancelled", &self.token.is_cancelled())
            .finish()
    }
}

impl<T: Send + 'static> ViewLoader<T> {
    /// Starts `fetch` on a worker thread. The worker receives the loader's
    /// token and may check it to give up early.
    pub fn spawn<F>(name: &str, fetch: F) -> Self
    where
        F: FnOnce(&CancelToken) -> Result<T, FetchError> + Send + 'static,
    {
        let token = CancelToken::new();
        let worker_token = token.clone();
        let (tx, rx) = mpsc::channel();

        let spawned = thread::Builder::new()
            .name(format!("fetch-{}", name))
            .spawn(move || {
                let result = fetch(&worker_token);
                if worker_token.is_cancelled() {
                    logging::debug(DataSource::System, None, "discarding result of cancelled load");
                    return;
                }
                // The receiver is gone only if the view was dropped meanwhile
                let _ = tx.send(result);
            });

        match spawned {
            Ok(_) => Self {
                state: LoadState::Loading,
                token,
                receiver: Some(rx),
            },
            Err(e) => Self {
                state: LoadState::Failed(FetchError::Transport(format!(
                    "cannot start fetch worker: {}",
                    e
                ))),
                token,
                receiver: None,
            },
        }
    }
}

impl<T> ViewLoader<T> {
    /// A loader that already holds its outcome (no worker).
    pub fn ready(result: Result<T, FetchError>) -> Self {
        let mut loader = Self {
            state: LoadState::Loading,
            token: CancelToken::new(),
            receiver: None,
        };
        loader.apply(result);
        loader
    }

    pub fn state(&self) -> &LoadState<T> {
        &self.state
    }

    pub fn token(&self) -> &CancelToken {
        &self.token
    }

    /// Non-blocking check for the worker's result. Returns `true` when the
    /// state changed on this call, which happens at most once.
    pub fn poll(&mut self) -> bool {
        if !self.state.is_loading() || self.token.is_cancelled() {
            return false;
        }
        let Some(rx) = self.receiver.as_ref() else {
            return false;
        };
        match rx.try_recv() {
            Ok(result) => {
                self.apply(result);
                true
            }
            Err(TryRecvError::Empty) => false,
            Err(TryRecvError::Disconnected) => {
                self.apply(Err(FetchError::Transport(
                    "fetch worker exited without a result".to_string(),
                )));
                true
            }
        }
    }

    /// Blocks until the worker delivers. A cancelled loader stays `Loading`.
    pub fn wait(&mut self) -> &LoadState<T> {
        if self.state.is_loading() && !self.token.is_cancelled() {
            if let Some(rx) = self.receiver.as_ref() {
                let result = rx.recv().unwrap_or_else(|_| {
                    Err(FetchError::Transport(
                        "fetch worker exited without a result".to_string(),
                    ))
                });
                if !self.token.is_cancelled() {
                    self.apply(result);
                }
            }
        }
        &self.state
    }

    /// Detaches the loader from its worker. Any result still in flight is
    /// discarded.
    pub fn cancel(&mut self) {
        self.token.cancel();
        self.receiver = None;
    }

    fn apply(&mut self, result: Result<T, FetchError>) {
        self.receiver = None;
        self.state = match result {
            Ok(data) => LoadState::Loaded(data),
            Err(e) => LoadState::Failed(e),
        };
    }
}

impl<T> Drop for ViewLoader<T> {
    fn drop(&mut self) {
        self.token.cancel();
    }
}
