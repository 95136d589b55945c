use std::fmt;

use bytes::Bytes;

pub type RequestId = u64;

/// One image to classify, as sent in the multipart body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageUpload {
    pub file_name: String,
    pub mime_type: String,
    pub bytes: Bytes,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ClassScore {
    pub label: String,
    pub confidence: f64,
}

/// Parsed success response of the classification endpoint.
#[derive(Debug, Clone, PartialEq)]
pub struct Classification {
    pub prediction: String,
    pub confidence: f64,
    /// Full distribution in the order the server sent it.
    pub ranked: Vec<ClassScore>,
    pub processed_image: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HealthReport {
    pub status: String,
    pub model_loaded: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub enum EngineEvent {
    Classified {
        request_id: RequestId,
        result: Result<Classification, ClassifyError>,
    },
    HealthChecked(Result<HealthReport, ClassifyError>),
    CategoriesLoaded(Result<Vec<String>, ClassifyError>),
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{kind}: {message}")]
pub struct ClassifyError {
    pub kind: FailureKind,
    pub message: String,
}

impl ClassifyError {
    pub(crate) fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureKind {
    InvalidEndpoint,
    Network,
    Timeout,
    HttpStatus(u16),
    /// 2xx response whose body does not carry `success: true`.
    Rejected,
    MalformedResponse,
    TooLarge { max_bytes: u64, actual: u64 },
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureKind::InvalidEndpoint => write!(f, "invalid endpoint"),
            FailureKind::Network => write!(f, "network error"),
            FailureKind::Timeout => write!(f, "timeout"),
            FailureKind::HttpStatus(code) => write!(f, "http status {code}"),
            FailureKind::Rejected => write!(f, "prediction failed"),
            FailureKind::MalformedResponse => write!(f, "malformed response"),
            FailureKind::TooLarge { .. } => write!(f, "response too large"),
        }
    }
}
