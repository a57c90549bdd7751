use crate::client::StatusApi;
use siftin_core::{LocalCache, LoginStatus};
use std::sync::Arc;
use tokio::sync::watch;

/// Create a connected sender / store pair
pub fn channel(cache: LocalCache) -> (Messenger, VerdictStore) {
    let (tx, rx) = watch::channel(None);
    (
        Messenger { tx },
        VerdictStore {
            rx,
            cache,
            api: None,
        },
    )
}

/// Page-side half: hands verdicts to the privileged store without waiting
#[derive(Clone)]
pub struct Messenger {
    tx: watch::Sender<Option<LoginStatus>>,
}

impl Messenger {
    /// Fire-and-forget; a verdict sent while no store is listening is dropped
    pub fn send(&self, verdict: LoginStatus) {
        tracing::debug!("Relaying verdict (logged_in={})", verdict.logged_in());
        if self.tx.send(Some(verdict)).is_err() {
            tracing::debug!("No verdict store listening, verdict dropped");
        }
    }
}

/// Privileged half: keeps only the newest verdict, persists it and reports it upstream
pub struct VerdictStore {
    rx: watch::Receiver<Option<LoginStatus>>,
    cache: LocalCache,
    api: Option<Arc<dyn StatusApi>>,
}

impl VerdictStore {
    pub fn with_api(mut self, api: Arc<dyn StatusApi>) -> Self {
        self.api = Some(api);
        self
    }

    /// Most recent verdict received, if any
    pub fn latest(&self) -> Option<LoginStatus> {
        self.rx.borrow().clone()
    }

    /// Process verdicts until every `Messenger` is dropped.
    ///
    /// Verdicts that arrive while one is being persisted collapse into the
    /// newest one.
    pub async fn run(mut self) -> Option<LoginStatus> {
        while self.rx.changed().await.is_ok() {
            let verdict = self.rx.borrow_and_update().clone();
            if let Some(verdict) = verdict {
                self.persist(&verdict).await;
            }
        }
        self.latest()
    }

    async fn persist(&self, verdict: &LoginStatus) {
        self.cache.put(verdict);

        if let Some(api) = &self.api {
            if let Err(e) = api.push(verdict).await {
                tracing::warn!("Failed to push relayed verdict: {}", e);
            }
        }
    }
}
