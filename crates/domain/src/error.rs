/// Shared error type used across all supportdesk crates.
///
/// The backend-facing variants (`Ingestion`, `Lookup`, `Delivery`,
/// `Completion`) are caught at the dispatch boundary and rendered into a
/// user-visible reply. `Config` is the only fatal class: it prevents the
/// assistant from accepting any input at all.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("IO: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("HTTP: {0}")]
    Http(String),

    #[error("timeout: {0}")]
    Timeout(String),

    #[error("document ingestion: {0}")]
    Ingestion(String),

    #[error("record lookup: {0}")]
    Lookup(String),

    #[error("notification delivery: {0}")]
    Delivery(String),

    #[error("completion: {0}")]
    Completion(String),

    #[error("config: {0}")]
    Config(String),

    #[error("{0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, Error>;
