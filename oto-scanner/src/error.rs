use thiserror::Error;

#[derive(Error, Debug)]
pub enum FetchError {
    #[error("Invalid URL: {0}")]
    InvalidTarget(String),

    #[error("HTTP request failed: {0}")]
    Transport(#[source] reqwest::Error),

    #[error("Failed to read response body: {0}")]
    Read(#[source] reqwest::Error),

    #[error("Failed to create HTTP client: {0}")]
    ClientBuild(#[source] reqwest::Error),

    #[error("Failed to read cookie file {path}: {source}")]
    CookieFile {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

pub type Result<T> = std::result::Result<T, FetchError>;
