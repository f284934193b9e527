use thiserror::Error;

#[derive(Error, Debug)]
pub enum GoodscribeError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// A single static candidate could not be fetched or parsed.
    #[error("Fetch failed for {url}: {reason}")]
    Fetch { url: String, reason: String },

    /// Browser launch, navigation or timeout failure in the dynamic tier.
    #[error("Render failed: {0}")]
    Render(String),

    /// Neither tier produced both a title and an image.
    #[error("Scrape failed, check the link: {url}")]
    IncompleteResult { url: String },

    /// The page is still behind a login wall after the user confirmed login.
    #[error("Login required at {url}")]
    LoginRequired { url: String },

    #[error("Generation service unavailable: {0}")]
    Generation(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, GoodscribeError>;
