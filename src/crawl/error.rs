use thiserror::Error;

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
}

#[derive(Debug, Error)]
pub enum CrawlError {
    #[error("Transport fault: {0}")]
    Transport(#[from] FetchError),

    #[error("Deadline elapsed before any branch completed")]
    DeadlineElapsed,
}
