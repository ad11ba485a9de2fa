use thiserror::Error;

#[derive(Error, Debug)]
pub enum EntsoeError {
    #[error("UnknownAreaError: no bidding zone known for {0}")]
    UnknownAreaError(String),
    #[error("NetworkError: {0}")]
    NetworkError(#[from] reqwest::Error),
    #[error("UnauthorizedError: the api key was rejected")]
    UnauthorizedError,
    #[error("StatusError: http status {0}: {1}")]
    StatusError(u16, String),
    #[error("NoMatchingDataError: no matching data found for the requested period")]
    NoMatchingDataError,
    #[error("AcknowledgementError: {0}")]
    AcknowledgementError(String),
    #[error("DocumentError: {0}")]
    DocumentError(String),
    #[error("ResolutionError: unsupported resolution {0}")]
    ResolutionError(String),
}
