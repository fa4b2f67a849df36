use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;

pub type Result<T> = std::result::Result<T, TaxoError>;

#[derive(Debug, Error)]
pub enum TaxoError {
    #[error("store unavailable: {0}")]
    StoreUnavailable(#[from] rusqlite::Error),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("validation failed: {0}")]
    Validation(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error("internal error: {0}")]
    Internal(String),
}

#[derive(Debug, Clone, Serialize)]
pub struct ErrorPayload {
    pub code: String,
    pub message: String,
    pub operation: String,
    pub trace_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
}

impl TaxoError {
    pub fn code(&self) -> &'static str {
        match self {
            Self::StoreUnavailable(_) => "STORE_UNAVAILABLE",
            Self::NotFound(_) => "NOT_FOUND",
            Self::Validation(_) => "VALIDATION_FAILED",
            Self::Io(_) => "IO_ERROR",
            Self::Json(_) => "JSON_ERROR",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }

    pub(crate) fn mutex_poisoned(what: &str) -> Self {
        Self::Internal(format!("{what} mutex poisoned"))
    }

    pub fn to_payload(&self, operation: impl Into<String>, path: Option<String>) -> ErrorPayload {
        ErrorPayload {
            code: self.code().to_string(),
            message: self.to_string(),
            operation: operation.into(),
            trace_id: Uuid::new_v4().to_string(),
            path,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sqlite_errors_surface_as_store_unavailable() {
        let err = TaxoError::from(rusqlite::Error::InvalidQuery);
        assert_eq!(err.code(), "STORE_UNAVAILABLE");
        assert!(err.to_string().starts_with("store unavailable"));
    }

    #[test]
    fn payload_carries_operation_and_fresh_trace_id() {
        let err = TaxoError::NotFound("empty store".to_string());
        let first = err.to_payload("tree.load", None);
        let second = err.to_payload("tree.load", Some("Animal".to_string()));

        assert_eq!(first.code, "NOT_FOUND");
        assert_eq!(first.operation, "tree.load");
        assert_ne!(first.trace_id, second.trace_id);

        let json = serde_json::to_value(&first).expect("serialize payload");
        assert!(json.get("path").is_none());
        let json = serde_json::to_value(&second).expect("serialize payload");
        assert_eq!(json["path"], "Animal");
    }
}
