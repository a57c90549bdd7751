pub mod auth;
pub mod cache;
pub mod check;
pub mod completion;
pub mod detect;
pub mod relay;
pub mod server;
pub mod sync;

/// Sync cycles run on a single-threaded runtime
pub(crate) fn runtime() -> anyhow::Result<tokio::runtime::Runtime> {
    Ok(tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?)
}
