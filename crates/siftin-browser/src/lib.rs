// Snapshots of a LinkedIn tab in a browser that already exposes a remote-debugging port

mod cdp_session;
mod error;

pub use cdp_session::{CdpSession, DEFAULT_DEBUGGING_PORT, LINKEDIN_FEED_URL, is_linkedin_url};
pub use error::{Error, Result};
