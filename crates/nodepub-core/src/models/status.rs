use serde::{Serialize, Serializer};

use crate::error::NodepubError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Ok,
    Info,
    Error,
}

/// Outcome of a publish-family operation. Failures are captured here instead of returned as
/// errors.
#[derive(Debug, Serialize)]
pub struct Status {
    pub severity: Severity,
    pub message: String,
    #[serde(
        serialize_with = "serialize_cause",
        skip_serializing_if = "Option::is_none"
    )]
    pub cause: Option<NodepubError>,
}

impl Status {
    #[must_use]
    pub fn ok() -> Self {
        Self {
            severity: Severity::Ok,
            message: "ok".to_string(),
            cause: None,
        }
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Info,
            message: message.into(),
            cause: None,
        }
    }

    pub fn error(message: impl Into<String>, cause: NodepubError) -> Self {
        Self {
            severity: Severity::Error,
            message: message.into(),
            cause: Some(cause),
        }
    }

    #[must_use]
    pub fn is_ok(&self) -> bool {
        self.severity == Severity::Ok
    }

    #[must_use]
    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

fn serialize_cause<S>(cause: &Option<NodepubError>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    match cause {
        Some(err) => serializer.serialize_str(&err.to_string()),
        None => serializer.serialize_none(),
    }
}
