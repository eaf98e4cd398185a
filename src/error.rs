//! Error types for the mind-map pipeline

use thiserror::Error;

/// Result type alias for pipeline operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while building or capturing a mind-map page
#[derive(Error, Debug)]
pub enum Error {
    /// Failed to serialize the node tree or options into the page template
    #[error("Template construction failed: {0}")]
    Template(String),

    /// Failed to launch the headless browser
    #[error("Browser launch failed: {0}")]
    Launch(String),

    /// Failed to load the generated page into the browser
    #[error("Failed to load page: {0}")]
    Load(String),

    /// Failed to capture the rendered page
    #[error("Capture failed: {0}")]
    Capture(String),

    /// The render signal did not appear in time
    #[error("Render signal timed out after {0}ms")]
    Timeout(u64),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    Config(String),
}

#[cfg(feature = "capture")]
impl From<anyhow::Error> for Error {
    fn from(err: anyhow::Error) -> Self {
        Error::Capture(err.to_string())
    }
}
