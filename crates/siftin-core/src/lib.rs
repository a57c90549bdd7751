pub mod cache;
pub mod error;
pub mod snapshot;
pub mod status;
pub mod storage;

pub use cache::{FRESHNESS_WINDOW_MS, LocalCache};
pub use error::{Error, Result};
pub use snapshot::PageSnapshot;
pub use status::{LoginStatus, Source, now_millis};
pub use storage::{AUTH_TOKEN_KEY, LINKEDIN_STATUS_KEY, LocalStorage, USER_EMAIL_KEY};
