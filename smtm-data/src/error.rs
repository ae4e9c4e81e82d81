use reqwest::StatusCode;
use thiserror::Error;

/// Recoverable failure raised while loading candles from the exchange.
///
/// Callers treat any variant as "no data available" and decide whether to retry.
#[derive(Error, Debug)]
pub enum DataError {
    #[error("candle request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("candle endpoint returned status {status}")]
    HttpStatus { status: StatusCode, body: String },

    #[error("candle response is not a record array: {0}")]
    InvalidResponse(#[from] serde_json::Error),

    #[error("candle endpoint returned no records")]
    EmptyResponse,

    #[error("http client setup failed: {0}")]
    Client(String),
}

pub type DataResult<T> = Result<T, DataError>;

/// Why a replay file was rejected. Only ever logged; the file initializer
/// reports failure through the provider's flag.
#[derive(Error, Debug)]
pub(crate) enum FileLoadError {
    #[error("cannot read replay file: {0}")]
    Io(#[from] std::io::Error),

    #[error("replay file is not a record array: {0}")]
    Json(#[from] serde_json::Error),

    #[error("replay file holds no records")]
    Empty,
}
