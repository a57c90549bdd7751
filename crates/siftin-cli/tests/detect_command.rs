use assert_cmd::Command;
use predicates::prelude::*;
use std::path::{Path, PathBuf};

#[allow(deprecated)]
fn get_siftin_bin() -> PathBuf {
    assert_cmd::cargo::cargo_bin("siftin")
}

const FEED_PAGE: &str = r#"<!DOCTYPE html>
<html>
<head><title>Feed | LinkedIn</title></head>
<body>
  <nav id="global-nav" aria-label="Primary Navigation">
    <a href="/feed/">Home</a>
    <a href="/mynetwork/">My Network</a>
    <a href="/jobs/">Jobs</a>
    <a href="/messaging/">Messaging</a>
    <a href="/notifications/">Notifications</a>
    <div class="global-nav__me">
      <img class="global-nav__me-photo" alt="Jane Doe" src="me.jpg">
      <span>Me</span>
    </div>
  </nav>
  <main class="scaffold-finite-scroll__content">
    <div class="share-box-feed-entry__trigger">Start a post</div>
  </main>
</body>
</html>"#;

const GUEST_PAGE: &str = r#"<!DOCTYPE html>
<html>
<head><title>LinkedIn: Log In or Sign Up</title></head>
<body>
  <nav class="global-nav">
    <a href="/jobs/">Jobs</a>
    <a href="/login">Sign in</a>
    <a href="/signup">Join now</a>
  </nav>
</body>
</html>"#;

fn write_page(dir: &Path, name: &str, html: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, html).unwrap();
    path
}

fn siftin(storage: &Path) -> Command {
    let mut cmd = Command::new(get_siftin_bin());
    cmd.arg("--storage").arg(storage);
    cmd.env_remove("SIFTIN_API_URL");
    cmd
}

#[test]
fn test_detect_command_help() {
    let mut cmd = Command::new(get_siftin_bin());
    cmd.arg("detect").arg("--help");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("Detect LinkedIn login status"))
        .stdout(predicate::str::contains("--html"))
        .stdout(predicate::str::contains("--port"))
        .stdout(predicate::str::contains("--save"));
}

#[test]
fn test_detect_logged_in_page() {
    let dir = tempfile::tempdir().unwrap();
    let page = write_page(dir.path(), "feed.html", FEED_PAGE);

    siftin(&dir.path().join("storage.json"))
        .arg("detect")
        .arg("--html")
        .arg(&page)
        .arg("--url")
        .arg("https://www.linkedin.com/feed/")
        .args(["--format", "json"])
        .assert()
        .success()
        .stdout(predicate::str::contains(r#""logged_in": true"#))
        .stdout(predicate::str::contains("Jane Doe"))
        .stdout(predicate::str::contains("messaging"));
}

#[test]
fn test_detect_sign_in_page_is_logged_out() {
    let dir = tempfile::tempdir().unwrap();
    let page = write_page(dir.path(), "guest.html", GUEST_PAGE);

    siftin(&dir.path().join("storage.json"))
        .arg("detect")
        .arg("--html")
        .arg(&page)
        .args(["--format", "json"])
        .assert()
        .success()
        .stdout(predicate::str::contains(r#""logged_in": false"#))
        .stdout(predicate::str::contains(r#""user_name": null"#));
}

#[test]
fn test_detect_auth_wall_url_is_logged_out() {
    let dir = tempfile::tempdir().unwrap();
    let page = write_page(dir.path(), "feed.html", FEED_PAGE);

    siftin(&dir.path().join("storage.json"))
        .arg("detect")
        .arg("--html")
        .arg(&page)
        .arg("--url")
        .arg("https://www.linkedin.com/authwall?trk=feed")
        .assert()
        .success()
        .stdout(predicate::str::contains("Not Logged In"));
}

#[test]
fn test_detect_missing_file_fails() {
    let dir = tempfile::tempdir().unwrap();

    siftin(&dir.path().join("storage.json"))
        .arg("detect")
        .arg("--html")
        .arg(dir.path().join("missing.html"))
        .assert()
        .failure();
}

#[test]
fn test_detect_save_then_cache_show() {
    let dir = tempfile::tempdir().unwrap();
    let storage = dir.path().join("storage.json");
    let page = write_page(dir.path(), "feed.html", FEED_PAGE);

    siftin(&storage)
        .arg("detect")
        .arg("--html")
        .arg(&page)
        .arg("--save")
        .assert()
        .success();

    siftin(&storage)
        .arg("cache")
        .arg("show")
        .assert()
        .success()
        .stdout(predicate::str::contains("Logged In"))
        .stdout(predicate::str::contains("Jane Doe"));
}

#[test]
fn test_relay_persists_verdict() {
    let dir = tempfile::tempdir().unwrap();
    let storage = dir.path().join("storage.json");
    let page = write_page(dir.path(), "feed.html", FEED_PAGE);

    // Nothing listens on port 1; the push fails without failing the relay
    siftin(&storage)
        .args(["--api-url", "http://127.0.0.1:1", "--timeout-ms", "500"])
        .arg("relay")
        .arg("--html")
        .arg(&page)
        .assert()
        .success();

    siftin(&storage)
        .arg("cache")
        .arg("show")
        .args(["--format", "json"])
        .assert()
        .success()
        .stdout(predicate::str::contains(r#""logged_in": true"#));
}
