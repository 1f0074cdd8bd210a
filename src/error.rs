use thiserror::Error;

#[derive(Error, Debug)]
pub enum ClientError {
    #[error("Invalid argument: {message}")]
    InvalidArgument { message: String },

    #[error("Invalid time format: {0}")]
    InvalidTimeFormat(String),

    #[error("Not initialized: {message}")]
    NotInitialized { message: String },

    #[error("Invalid query: {message}")]
    InvalidQuery { message: String },

    #[error("Unsupported operation: {message}")]
    UnsupportedOperation { message: String },

    #[error("Incomplete datum: missing {field}")]
    IncompleteDatum { field: &'static str },

    #[error("Request error. Unable to obtain data: {0}")]
    UpstreamUnreachable(String),

    #[error("No data returned. Empty body. Ensure all query parameters are correct.")]
    EmptyResponse,

    #[error("Unsupported data format. Response body cannot be parsed as JSON: {0}")]
    MalformedResponse(String),

    #[error("No data returned. Empty data array. Ensure all query parameters are correct.")]
    NoData,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ClientError {
    pub(crate) fn invalid_argument(message: impl Into<String>) -> Self {
        ClientError::InvalidArgument { message: message.into() }
    }

    pub(crate) fn not_initialized(message: impl Into<String>) -> Self {
        ClientError::NotInitialized { message: message.into() }
    }

    pub(crate) fn invalid_query(message: impl Into<String>) -> Self {
        ClientError::InvalidQuery { message: message.into() }
    }

    pub(crate) fn unsupported(message: impl Into<String>) -> Self {
        ClientError::UnsupportedOperation { message: message.into() }
    }

    /// HTTP-like status reported for request failures; `None` for local errors.
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::UpstreamUnreachable(_) | ClientError::MalformedResponse(_) => Some(502),
            ClientError::EmptyResponse | ClientError::NoData => Some(404),
            _ => None,
        }
    }

    /// True for the four kinds produced while fetching and decoding a response.
    pub fn is_request_error(&self) -> bool {
        self.status().is_some()
    }
}

pub type ClientResult<T> = Result<T, ClientError>;
