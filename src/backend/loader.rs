//! Process-wide loader for the embed player library
//!
//! The library is fetched at most once per process. While a fetch is in
//! flight, later requesters park a oneshot waiter and receive the same
//! outcome. The fetch runs on its own task, so a requester that goes away
//! mid-load does not strand the others.

use std::sync::{Arc, Mutex, MutexGuard, OnceLock};

use tokio::sync::oneshot;

use super::embedded::{EmbedApi, EmbedError};

type Waiter = oneshot::Sender<Result<(), EmbedError>>;

enum LoadState {
    Unloaded,
    Loading(Vec<Waiter>),
    Loaded,
}

static GLOBAL_LOADER: OnceLock<Arc<EmbedLibraryLoader>> = OnceLock::new();

pub struct EmbedLibraryLoader {
    api: Arc<dyn EmbedApi>,
    state: Arc<Mutex<LoadState>>,
}

impl EmbedLibraryLoader {
    pub fn new(api: Arc<dyn EmbedApi>) -> Self {
        Self {
            api,
            state: Arc::new(Mutex::new(LoadState::Unloaded)),
        }
    }

    /// The loader shared by the whole process. Only the first caller's `api`
    /// is used.
    pub fn global(api: Arc<dyn EmbedApi>) -> Arc<Self> {
        GLOBAL_LOADER
            .get_or_init(|| Arc::new(Self::new(api)))
            .clone()
    }

    #[cfg(test)]
    pub fn is_loaded(&self) -> bool {
        matches!(*lock(&self.state), LoadState::Loaded)
    }

    /// Resolve once the library is available.
    pub async fn ensure_loaded(&self) -> Result<(), EmbedError> {
        let rx = {
            let mut state = lock(&self.state);
            match &mut *state {
                LoadState::Loaded => return Ok(()),
                LoadState::Loading(waiters) => {
                    tracing::debug!(waiters = waiters.len() + 1, "Embed library load in flight, waiting");
                    let (tx, rx) = oneshot::channel();
                    waiters.push(tx);
                    rx
                }
                LoadState::Unloaded => {
                    let (tx, rx) = oneshot::channel();
                    *state = LoadState::Loading(vec![tx]);
                    self.spawn_fetch();
                    rx
                }
            }
        };

        rx.await.unwrap_or(Err(EmbedError::LoadAborted))
    }

    fn spawn_fetch(&self) {
        let api = self.api.clone();
        let mut guard = FetchGuard {
            state: self.state.clone(),
            settled: false,
        };
        tracing::info!("Fetching embed player library");

        tokio::spawn(async move {
            let result = api.load_library().await;
            guard.settle(result);
        });
    }
}

/// Hands the fetch outcome to every waiter. A fetch task that panics or is
/// aborted settles through `Drop` with `LoadAborted`.
struct FetchGuard {
    state: Arc<Mutex<LoadState>>,
    settled: bool,
}

impl FetchGuard {
    fn settle(&mut self, result: Result<(), EmbedError>) {
        self.settled = true;
        let waiters = {
            let mut state = lock(&self.state);
            let next = if result.is_ok() {
                LoadState::Loaded
            } else {
                LoadState::Unloaded
            };
            match std::mem::replace(&mut *state, next) {
                LoadState::Loading(waiters) => waiters,
                _ => Vec::new(),
            }
        };

        match &result {
            Ok(()) => tracing::info!(waiters = waiters.len(), "Embed player library loaded"),
            Err(e) => tracing::error!(error = %e, waiters = waiters.len(), "Embed player library failed to load"),
        }

        for waiter in waiters {
            let _ = waiter.send(result.clone());
        }
    }
}

impl Drop for FetchGuard {
    fn drop(&mut self) {
        if !self.settled {
            tracing::warn!("Embed library fetch ended without a result");
            self.settle(Err(EmbedError::LoadAborted));
        }
    }
}

fn lock(state: &Mutex<LoadState>) -> MutexGuard<'_, LoadState> {
    state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}
