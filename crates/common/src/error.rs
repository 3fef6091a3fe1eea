use reqwest::StatusCode;
use thiserror::Error;

/// Prompt shown when a submission carries no code.
pub const EMPTY_INPUT_MESSAGE: &str = "Please enter or scan a QR code";
/// Used when the service rejects a code without saying why.
pub const DEFAULT_REJECTION_MESSAGE: &str = "Error fetching data";
/// Text of the blocking notice raised on transport failures.
pub const TRANSPORT_FAILURE_NOTICE: &str = "Something went wrong!";

/// Failures talking to the lookup service.
#[derive(Debug, Error)]
pub enum LookupError {
    #[error("base url {0} cannot carry a path")]
    InvalidBaseUrl(String),
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("unparsable response body (status {status})")]
    Malformed {
        status: StatusCode,
        #[source]
        source: serde_json::Error,
    },
    #[error("response reported success without product data")]
    MissingData,
    #[error("product data has an unexpected shape: {0}")]
    InvalidData(#[source] serde_json::Error),
}

/// Everything a submission can end in short of a product record.
///
/// `Display` is the inline message the operator sees.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScanError {
    #[error("{}", EMPTY_INPUT_MESSAGE)]
    EmptyInput,
    #[error("{0} already scanned")]
    Duplicate(String),
    #[error("a lookup is already in flight")]
    Busy,
    #[error("{code} {message}")]
    Rejected { code: String, message: String },
    #[error("{code} {}", TRANSPORT_FAILURE_NOTICE)]
    TransportFailure { code: String },
}
