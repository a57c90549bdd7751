use crate::{Error, Result};
use crate::client::{ApiClient, StatusApi, spawn_push};
use crate::config::ApiConfig;
use crate::types::PullState;
use crate::ui::{StatusIndicator, UiState};
use siftin_core::{LocalCache, LoginStatus, Source};
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::task::JoinHandle;

/// Steps of one sync cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncPhase {
    Init,
    CacheCheck,
    Trusted,
    RemoteCheck,
    Settled,
}

/// Per-page login-status controller.
///
/// A cycle runs on page ready and on every visibility regain. Local cache is
/// always read before the network; only a fresh logged-in verdict is trusted
/// without asking the API. Cycles are not de-duplicated: overlapping ones
/// reach the same settled state.
pub struct SyncOrchestrator {
    api: Arc<dyn StatusApi>,
    cache: LocalCache,
    current: Mutex<Option<LoginStatus>>,
    last_error: Mutex<Option<Error>>,
    background: Mutex<Vec<JoinHandle<()>>>,
}

impl SyncOrchestrator {
    pub fn new(cache: LocalCache, api: Arc<dyn StatusApi>) -> Self {
        Self {
            api,
            cache,
            current: Mutex::new(None),
            last_error: Mutex::new(None),
            background: Mutex::new(Vec::new()),
        }
    }

    /// Orchestrator backed by an `ApiClient` sharing the cache's storage
    pub fn with_default_api(cache: LocalCache, config: ApiConfig) -> Result<Self> {
        let client = ApiClient::new(config, cache.storage().clone())?;
        Ok(Self::new(cache, Arc::new(client)))
    }

    /// Verdict the last settled cycle produced
    pub fn current(&self) -> Option<LoginStatus> {
        lock(&self.current).clone()
    }

    /// Error that made the last remote check settle logged out, if any
    pub fn last_error(&self) -> Option<Error> {
        lock(&self.last_error).clone()
    }

    /// Run one cycle and return the settled indicator state
    pub async fn sync(&self, indicator: &dyn StatusIndicator) -> UiState {
        tracing::debug!("Sync phase: {:?}", SyncPhase::Init);
        indicator.render(&UiState::Checking);

        tracing::debug!("Sync phase: {:?}", SyncPhase::CacheCheck);
        let status = match self.cache.get() {
            Some(cached) if cached.logged_in() => {
                tracing::debug!("Sync phase: {:?}", SyncPhase::Trusted);
                self.push_in_background(cached.clone());
                cached
            }
            Some(_) => {
                tracing::debug!("Cached logged-out verdict needs remote confirmation");
                self.remote_check().await
            }
            None => self.remote_check().await,
        };

        self.settle(status, indicator)
    }

    /// Record a verdict produced by detection on this page
    pub fn record(&self, status: LoginStatus, indicator: &dyn StatusIndicator) -> UiState {
        self.cache.put(&status);
        self.push_in_background(status.clone());
        self.settle(status, indicator)
    }

    /// Wait for background pushes started by earlier cycles
    pub async fn flush(&self) {
        let pending: Vec<_> = lock(&self.background).drain(..).collect();
        for handle in pending {
            if let Err(e) = handle.await {
                tracing::debug!("Background status push did not complete: {}", e);
            }
        }
    }

    async fn remote_check(&self) -> LoginStatus {
        tracing::debug!("Sync phase: {:?}", SyncPhase::RemoteCheck);

        let result = self.api.pull().await;
        *lock(&self.last_error) = result.as_ref().err().cloned();

        match result {
            Ok(response) => match (response.status, response.logged_in) {
                (PullState::Success, Some(true)) => {
                    LoginStatus::new(true, response.user_name, Source::RemoteApi)
                }
                (PullState::Success, Some(false)) => {
                    self.cache.clear();
                    LoginStatus::logged_out(Source::RemoteApi)
                }
                (state, _) => {
                    tracing::debug!("Remote status is {:?}, treating as logged out", state);
                    self.cache.clear();
                    LoginStatus::logged_out(Source::RemoteApi)
                }
            },
            Err(e) => {
                tracing::warn!("Status sync failed, treating as logged out: {}", e);
                self.cache.clear();
                LoginStatus::logged_out(Source::RemoteApi)
            }
        }
    }

    fn settle(&self, status: LoginStatus, indicator: &dyn StatusIndicator) -> UiState {
        let state = UiState::from_status(&status);
        *lock(&self.current) = Some(status);

        tracing::debug!("Sync phase: {:?}", SyncPhase::Settled);
        indicator.render(&state);
        state
    }

    fn push_in_background(&self, status: LoginStatus) {
        let handle = spawn_push(Arc::clone(&self.api), status);
        let mut background = lock(&self.background);
        background.retain(|h| !h.is_finished());
        background.push(handle);
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}
