use crate::{Error, Result};
use crate::config::ApiConfig;
use crate::types::{Ack, DirectStatus, PullResponse, PushBody};
use async_trait::async_trait;
use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;
use siftin_core::{AUTH_TOKEN_KEY, LocalStorage, LoginStatus};
use std::sync::Arc;
use std::time::Duration;

const BOOKMARKLET_STATUS_PATH: &str = "/api/bookmarklet-status";
const LOGIN_STATUS_PATH: &str = "/api/linkedin-login-status";
const CLEAR_CACHE_PATH: &str = "/api/linkedin-auth-status/clear-cache";
const HEALTH_PATH: &str = "/";

/// The two status operations the sync cycle depends on
#[async_trait]
pub trait StatusApi: Send + Sync {
    /// Last verdict the backend received from any context
    async fn pull(&self) -> Result<PullResponse>;

    /// Report a freshly detected verdict
    async fn push(&self, status: &LoginStatus) -> Result<()>;
}

type RedirectHook = Arc<dyn Fn() + Send + Sync>;

/// HTTP client for the backend status API
#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    config: ApiConfig,
    storage: LocalStorage,
    on_auth_required: RedirectHook,
}

impl ApiClient {
    pub fn new(config: ApiConfig, storage: LocalStorage) -> Result<Self> {
        let http = http_client(concat!("siftin/", env!("CARGO_PKG_VERSION")))?;

        Ok(Self {
            http,
            config,
            storage,
            on_auth_required: Arc::new(|| {
                tracing::warn!("Authentication required, please log in again");
            }),
        })
    }

    /// Called after a 401 has cleared local credentials
    pub fn with_login_redirect(mut self, hook: impl Fn() + Send + Sync + 'static) -> Self {
        self.on_auth_required = Arc::new(hook);
        self
    }

    pub fn config(&self) -> &ApiConfig {
        &self.config
    }

    /// Direct detection query; the backend may drive a browser, so this uses the long deadline
    pub async fn login_status(&self) -> Result<DirectStatus> {
        let body = self
            .send(Method::GET, LOGIN_STATUS_PATH, None, self.config.heavy_timeout)
            .await?;
        decode(&body)
    }

    /// Force the backend to re-check on its next detection query
    pub async fn clear_server_cache(&self) -> Result<Ack> {
        let body = self
            .send(Method::POST, CLEAR_CACHE_PATH, None, self.config.status_timeout)
            .await?;
        decode(&body)
    }

    pub async fn health(&self) -> Result<Ack> {
        let body = self
            .send(Method::GET, HEALTH_PATH, None, self.config.status_timeout)
            .await?;
        decode(&body)
    }

    fn auth_token(&self) -> Option<String> {
        match self.storage.get_item(AUTH_TOKEN_KEY) {
            Ok(token) => token.filter(|t| !t.is_empty()),
            Err(e) => {
                tracing::debug!("Could not read auth token: {}", e);
                None
            }
        }
    }

    /// Issue a request raced against `timeout`.
    ///
    /// The request runs as its own task; when the timer wins, that task is
    /// left to finish on its own and its result is dropped.
    async fn send(
        &self,
        method: Method,
        path: &str,
        body: Option<serde_json::Value>,
        timeout: Duration,
    ) -> Result<String> {
        let url = self.config.endpoint(path);
        tracing::debug!("{} {}", method, url);

        let mut request = self.http.request(method, &url);
        if let Some(token) = self.auth_token() {
            request = request.bearer_auth(token);
        }
        if let Some(body) = body {
            request = request.json(&body);
        }

        let in_flight = tokio::spawn(async move {
            let response = request
                .send()
                .await
                .map_err(|e| Error::Unreachable(e.to_string()))?;
            let status = response.status();
            let text = response
                .text()
                .await
                .map_err(|e| Error::Unreachable(e.to_string()))?;
            Ok::<_, Error>((status, text))
        });

        let (status, text) = match tokio::time::timeout(timeout, in_flight).await {
            Err(_) => {
                tracing::warn!("{} timed out after {}ms", url, timeout.as_millis());
                return Err(Error::Timeout { timeout });
            }
            Ok(Err(join_error)) => return Err(Error::Unreachable(join_error.to_string())),
            Ok(Ok(result)) => result?,
        };

        if status == StatusCode::UNAUTHORIZED {
            self.handle_unauthorized();
            return Err(Error::AuthRequired);
        }

        if !status.is_success() {
            return Err(Error::Http {
                status: status.as_u16(),
                detail: error_detail(&text, status),
            });
        }

        Ok(text)
    }

    fn handle_unauthorized(&self) {
        if let Err(e) = self.storage.clear_auth() {
            tracing::warn!("Failed to clear local auth state: {}", e);
        }
        (self.on_auth_required)();
    }
}

#[async_trait]
impl StatusApi for ApiClient {
    async fn pull(&self) -> Result<PullResponse> {
        let body = self
            .send(
                Method::GET,
                BOOKMARKLET_STATUS_PATH,
                None,
                self.config.status_timeout,
            )
            .await?;
        decode(&body)
    }

    async fn push(&self, status: &LoginStatus) -> Result<()> {
        let body = serde_json::to_value(PushBody {
            logged_in: status.logged_in(),
            user_name: status.user_name(),
        })
        .map_err(|e| Error::Decode(e.to_string()))?;

        self.send(
            Method::POST,
            BOOKMARKLET_STATUS_PATH,
            Some(body),
            self.config.status_timeout,
        )
        .await?;

        tracing::debug!("Pushed login status (logged_in={})", status.logged_in());
        Ok(())
    }
}

/// Push without waiting; failures are logged and otherwise ignored
pub fn spawn_push(api: Arc<dyn StatusApi>, status: LoginStatus) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        if let Err(e) = api.push(&status).await {
            tracing::debug!("Background status push failed: {}", e);
        }
    })
}

/// Local TLS or header setup failures, reported apart from an unreachable server
fn http_client(user_agent: &str) -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .user_agent(user_agent)
        .build()
        .map_err(|e| Error::Client(e.to_string()))
}

fn decode<T: DeserializeOwned>(body: &str) -> Result<T> {
    serde_json::from_str(body).map_err(|e| Error::Decode(e.to_string()))
}

/// Server-provided `detail`, or a generic message when the body has none
fn error_detail(body: &str, status: StatusCode) -> String {
    let detail = serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|value| match value.get("detail") {
            Some(serde_json::Value::String(detail)) => Some(detail.clone()),
            Some(serde_json::Value::Null) | None => None,
            Some(other) => Some(other.to_string()),
        });

    detail.unwrap_or_else(|| format!("HTTP error! status: {}", status.as_u16()))
}
