use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;

pub type Result<T> = std::result::Result<T, NodepubError>;

#[derive(Debug, Error)]
pub enum NodepubError {
    #[error("server validation failed for {server}: {message}")]
    Validation { server: String, message: String },

    #[error("could not decode server response ({message}): {body}")]
    ProtocolDecode {
        message: String,
        body: String,
        #[source]
        source: Option<serde_json::Error>,
    },

    #[error("remote operation `{operation}` failed with status {status}: {message}")]
    RemoteOperation {
        operation: &'static str,
        status: u16,
        message: String,
    },

    #[error("invalid query: {0}")]
    InvalidQuery(String),

    #[error("invalid query language `{language}`; valid languages are: {valid}")]
    InvalidLanguage { language: String, valid: String },

    #[error("invalid url: {0}")]
    InvalidUrl(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Base64(#[from] base64::DecodeError),

    #[error(transparent)]
    Http(#[from] reqwest::Error),
}

#[derive(Debug, Clone, Serialize)]
pub struct ErrorPayload {
    pub code: String,
    pub message: String,
    pub operation: String,
    pub trace_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uri: Option<String>,
}

impl NodepubError {
    pub(crate) fn decode(message: impl Into<String>, body: impl Into<String>) -> Self {
        Self::ProtocolDecode {
            message: message.into(),
            body: body.into(),
            source: None,
        }
    }

    /// A body that is not JSON at all; the parser error stays reachable through `source()`.
    pub(crate) fn malformed_json(source: serde_json::Error, body: impl Into<String>) -> Self {
        Self::ProtocolDecode {
            message: source.to_string(),
            body: body.into(),
            source: Some(source),
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            Self::Validation { .. } => "VALIDATION_FAILED",
            Self::ProtocolDecode { .. } => "PROTOCOL_DECODE",
            Self::RemoteOperation { .. } => "REMOTE_OPERATION_FAILED",
            Self::InvalidQuery(_) => "INVALID_QUERY",
            Self::InvalidLanguage { .. } => "INVALID_LANGUAGE",
            Self::InvalidUrl(_) => "INVALID_URL",
            Self::Io(_) => "IO_ERROR",
            Self::Json(_) => "JSON_ERROR",
            Self::Base64(_) => "BASE64_ERROR",
            Self::Http(_) => "HTTP_ERROR",
        }
    }

    pub fn to_payload(&self, operation: impl Into<String>, uri: Option<String>) -> ErrorPayload {
        ErrorPayload {
            code: self.code().to_string(),
            message: self.to_string(),
            operation: operation.into(),
            trace_id: Uuid::new_v4().to_string(),
            uri,
        }
    }
}
