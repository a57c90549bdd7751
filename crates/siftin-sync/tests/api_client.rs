use siftin_core::{AUTH_TOKEN_KEY, LocalCache, LocalStorage, LoginStatus, Source, USER_EMAIL_KEY};
use siftin_sync::{
    ApiClient, ApiConfig, Error, LogIndicator, PullState, StatusApi, SyncOrchestrator, UiState,
};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

#[derive(Debug, Clone, Default)]
struct RecordedRequest {
    head: String,
    body: String,
}

impl RecordedRequest {
    fn request_line(&self) -> &str {
        self.head.lines().next().unwrap_or_default()
    }

    fn has_header(&self, header: &str) -> bool {
        self.head.to_lowercase().contains(&header.to_lowercase())
    }
}

struct StubResponse {
    status: u16,
    body: &'static str,
    delay: Duration,
}

fn respond(status: u16, body: &'static str) -> StubResponse {
    StubResponse {
        status,
        body,
        delay: Duration::ZERO,
    }
}

struct StubServer {
    base_url: String,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
}

impl StubServer {
    /// Serve one canned response per incoming connection, in order
    async fn start(responses: Vec<StubResponse>) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let base_url = format!("http://{}", listener.local_addr().unwrap());
        let requests = Arc::new(Mutex::new(Vec::new()));
        let recorded = requests.clone();

        tokio::spawn(async move {
            for response in responses {
                let Ok((mut socket, _)) = listener.accept().await else {
                    return;
                };
                let request = read_request(&mut socket).await;
                recorded.lock().unwrap().push(request);

                tokio::time::sleep(response.delay).await;
                let raw = format!(
                    "HTTP/1.1 {} Stub\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                    response.status,
                    response.body.len(),
                    response.body
                );
                let _ = socket.write_all(raw.as_bytes()).await;
                let _ = socket.shutdown().await;
            }
        });

        Self { base_url, requests }
    }

    fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }
}

async fn read_request(socket: &mut TcpStream) -> RecordedRequest {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];

    loop {
        let n = socket.read(&mut chunk).await.unwrap_or(0);
        if n == 0 {
            return RecordedRequest::default();
        }
        buf.extend_from_slice(&chunk[..n]);

        let Some(end) = buf.windows(4).position(|w| w == b"\r\n\r\n") else {
            continue;
        };
        let head = String::from_utf8_lossy(&buf[..end]).to_string();
        let content_length = head
            .lines()
            .filter_map(|line| line.split_once(':'))
            .find(|(name, _)| name.trim().eq_ignore_ascii_case("content-length"))
            .and_then(|(_, value)| value.trim().parse::<usize>().ok())
            .unwrap_or(0);

        let body_start = end + 4;
        while buf.len() < body_start + content_length {
            let n = socket.read(&mut chunk).await.unwrap_or(0);
            if n == 0 {
                break;
            }
            buf.extend_from_slice(&chunk[..n]);
        }

        let body_end = (body_start + content_length).min(buf.len());
        return RecordedRequest {
            head,
            body: String::from_utf8_lossy(&buf[body_start..body_end]).to_string(),
        };
    }
}

fn temp_storage() -> (tempfile::TempDir, LocalStorage) {
    let dir = tempfile::tempdir().unwrap();
    let storage = LocalStorage::open(dir.path().join("storage.json"));
    (dir, storage)
}

fn client(server: &StubServer, storage: &LocalStorage) -> ApiClient {
    ApiClient::new(ApiConfig::new(&server.base_url).unwrap(), storage.clone()).unwrap()
}

#[tokio::test]
async fn test_pull_sends_bearer_token() {
    let server = StubServer::start(vec![respond(
        200,
        r#"{"status":"success","logged_in":true,"user_name":"Jane Doe"}"#,
    )])
    .await;
    let (_dir, storage) = temp_storage();
    storage.set_item(AUTH_TOKEN_KEY, "secret-token").unwrap();

    let response = client(&server, &storage).pull().await.unwrap();

    assert_eq!(response.status, PullState::Success);
    assert_eq!(response.logged_in, Some(true));
    assert_eq!(response.user_name.as_deref(), Some("Jane Doe"));

    let requests = server.requests();
    assert_eq!(requests[0].request_line(), "GET /api/bookmarklet-status HTTP/1.1");
    assert!(requests[0].has_header("authorization: Bearer secret-token"));
}

#[tokio::test]
async fn test_missing_token_omits_header() {
    let server = StubServer::start(vec![respond(200, r#"{"status":"not_set"}"#)]).await;
    let (_dir, storage) = temp_storage();

    let response = client(&server, &storage).pull().await.unwrap();

    assert_eq!(response.status, PullState::NotSet);
    assert!(!server.requests()[0].has_header("authorization:"));
}

#[tokio::test]
async fn test_push_posts_verdict() {
    let server = StubServer::start(vec![respond(200, r#"{"status":"success"}"#)]).await;
    let (_dir, storage) = temp_storage();

    let status = LoginStatus::new(true, Some("Jane Doe".to_string()), Source::LocalHeuristic);
    client(&server, &storage).push(&status).await.unwrap();

    let request = &server.requests()[0];
    assert_eq!(request.request_line(), "POST /api/bookmarklet-status HTTP/1.1");
    let body: serde_json::Value = serde_json::from_str(&request.body).unwrap();
    assert_eq!(body["logged_in"], true);
    assert_eq!(body["user_name"], "Jane Doe");
}

#[tokio::test]
async fn test_unauthorized_clears_credentials_and_redirects() {
    let server = StubServer::start(vec![respond(401, r#"{"detail":"Invalid token"}"#)]).await;
    let (_dir, storage) = temp_storage();
    storage.set_item(AUTH_TOKEN_KEY, "expired").unwrap();
    storage.set_item(USER_EMAIL_KEY, "jane@example.com").unwrap();

    let redirected = Arc::new(AtomicBool::new(false));
    let flag = redirected.clone();
    let api = client(&server, &storage)
        .with_login_redirect(move || flag.store(true, Ordering::SeqCst));

    let err = api.pull().await.unwrap_err();

    assert_eq!(err, Error::AuthRequired);
    assert!(redirected.load(Ordering::SeqCst));
    assert_eq!(storage.get_item(AUTH_TOKEN_KEY).unwrap(), None);
    assert_eq!(storage.get_item(USER_EMAIL_KEY).unwrap(), None);
}

#[tokio::test]
async fn test_http_error_carries_server_detail() {
    let server = StubServer::start(vec![respond(500, r#"{"detail":"Database offline"}"#)]).await;
    let (_dir, storage) = temp_storage();

    let err = client(&server, &storage).pull().await.unwrap_err();

    assert_eq!(
        err,
        Error::Http {
            status: 500,
            detail: "Database offline".to_string()
        }
    );
    assert_eq!(err.to_string(), "Database offline");
}

#[tokio::test]
async fn test_http_error_without_detail() {
    let server = StubServer::start(vec![respond(502, "<html>Bad gateway</html>")]).await;
    let (_dir, storage) = temp_storage();

    let err = client(&server, &storage).pull().await.unwrap_err();
    assert_eq!(err.to_string(), "HTTP error! status: 502");
}

#[tokio::test]
async fn test_refused_connection_is_unreachable() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let base_url = format!("http://{}", listener.local_addr().unwrap());
    drop(listener);

    let (_dir, storage) = temp_storage();
    let api = ApiClient::new(ApiConfig::new(&base_url).unwrap(), storage).unwrap();

    let err = api.pull().await.unwrap_err();
    assert!(matches!(err, Error::Unreachable(_)), "got {:?}", err);
}

#[tokio::test]
async fn test_slow_server_times_out() {
    let server = StubServer::start(vec![StubResponse {
        status: 200,
        body: r#"{"status":"success","logged_in":true}"#,
        delay: Duration::from_secs(2),
    }])
    .await;
    let (_dir, storage) = temp_storage();
    let config = ApiConfig::new(&server.base_url)
        .unwrap()
        .with_status_timeout(Duration::from_millis(100));
    let api = ApiClient::new(config, storage).unwrap();

    let err = api.pull().await.unwrap_err();

    assert_eq!(
        err,
        Error::Timeout {
            timeout: Duration::from_millis(100)
        }
    );
    assert!(err.to_string().contains("100ms"));
}

/// Collects formatted log output for assertions
#[derive(Clone, Default)]
struct LogBuffer(Arc<Mutex<Vec<u8>>>);

impl LogBuffer {
    fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).to_string()
    }
}

impl std::io::Write for LogBuffer {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

#[tokio::test]
async fn test_orchestrator_settles_logged_out_on_timeout() {
    let logs = LogBuffer::default();
    let writer = logs.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_writer(move || writer.clone())
        .with_max_level(tracing::Level::WARN)
        .with_ansi(false)
        .finish();
    let _guard = tracing::subscriber::set_default(subscriber);

    let server = StubServer::start(vec![StubResponse {
        status: 200,
        body: r#"{"status":"success","logged_in":true}"#,
        delay: Duration::from_secs(2),
    }])
    .await;
    let (_dir, storage) = temp_storage();
    let config = ApiConfig::new(&server.base_url)
        .unwrap()
        .with_status_timeout(Duration::from_millis(100));
    let orchestrator =
        SyncOrchestrator::with_default_api(LocalCache::new(storage), config).unwrap();

    let state = orchestrator.sync(&LogIndicator).await;

    assert_eq!(state, UiState::NotLoggedIn);
    assert!(!orchestrator.current().unwrap().logged_in());
    assert_eq!(
        orchestrator.last_error(),
        Some(Error::Timeout {
            timeout: Duration::from_millis(100)
        })
    );

    let logs = logs.contents();
    assert!(
        logs.contains("Status sync failed, treating as logged out: Request timed out after 100ms"),
        "logs were: {}",
        logs
    );
}

#[tokio::test]
async fn test_direct_login_status_and_cache_clear() {
    let server = StubServer::start(vec![
        respond(
            200,
            r#"{"logged_in":null,"status":"not_configured","message":"Firefox profile path not configured"}"#,
        ),
        respond(200, r#"{"status":"success","message":"Cache cleared."}"#),
    ])
    .await;
    let (_dir, storage) = temp_storage();
    let api = client(&server, &storage);

    let direct = api.login_status().await.unwrap();
    assert_eq!(direct.logged_in, None);
    assert_eq!(direct.status.as_deref(), Some("not_configured"));
    assert!(!direct.cached);

    let ack = api.clear_server_cache().await.unwrap();
    assert_eq!(ack.status.as_deref(), Some("success"));

    let requests = server.requests();
    assert_eq!(requests[0].request_line(), "GET /api/linkedin-login-status HTTP/1.1");
    assert_eq!(
        requests[1].request_line(),
        "POST /api/linkedin-auth-status/clear-cache HTTP/1.1"
    );
}
