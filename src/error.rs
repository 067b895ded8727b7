use thirtyfour::error::WebDriverError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SiteError {
    #[error("authentication failed: {0}")]
    Authentication(String),

    #[error("element not found: {0}")]
    ElementNotFound(String),

    #[error("browser session lost: {0}")]
    SessionLost(String),

    #[error("webdriver error: {0}")]
    WebDriver(#[from] WebDriverError),
}

impl SiteError {
    /// True when the underlying browser session is unusable and must be
    /// discarded before the next login.
    pub fn is_session_lost(&self) -> bool {
        match self {
            SiteError::SessionLost(_) => true,
            SiteError::WebDriver(e) => session_gone(e),
            _ => false,
        }
    }
}

pub fn session_gone<E: std::fmt::Display>(e: &E) -> bool {
    let s = e.to_string().to_lowercase();
    s.contains("invalid session id")
        || s.contains("session deleted")
        || s.contains("not connected to devtools")
}

/// Wrap a raw webdriver error, promoting dead-session errors to `SessionLost`.
pub fn webdriver_err(e: WebDriverError) -> SiteError {
    if session_gone(&e) {
        SiteError::SessionLost(e.to_string())
    } else {
        SiteError::WebDriver(e)
    }
}
