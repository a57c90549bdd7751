mod dom;
pub mod error;
pub mod login;
pub mod names;

pub use error::{Error, Result};
pub use login::{Detection, INDICATORS, Indicator, LOGIN_THRESHOLD, LoginDetector, Signal};
pub use names::is_valid_name;
