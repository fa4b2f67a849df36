use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use tracing::error;

use taxotree_core::TaxoError;

#[expect(
    clippy::needless_pass_by_value,
    reason = "handlers naturally own error values from `Result` and pass them through"
)]
pub fn taxo_error_response(err: TaxoError, operation: &str, path: Option<String>) -> Response {
    let status = status_for_taxo_error(&err);
    let payload = err.to_payload(operation, path);
    error!(
        operation,
        code = payload.code.as_str(),
        trace_id = payload.trace_id.as_str(),
        status = status.as_u16(),
        error = %err,
        "request failed"
    );
    (status, Json(payload)).into_response()
}

fn status_for_taxo_error(err: &TaxoError) -> StatusCode {
    match err {
        TaxoError::Validation(_) => StatusCode::BAD_REQUEST,
        TaxoError::NotFound(_) => StatusCode::NOT_FOUND,
        TaxoError::StoreUnavailable(_)
        | TaxoError::Io(_)
        | TaxoError::Json(_)
        | TaxoError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn store_failures_map_to_internal_server_error() {
        let err = TaxoError::Internal("worker panicked".to_string());
        assert_eq!(status_for_taxo_error(&err), StatusCode::INTERNAL_SERVER_ERROR);
        let err = TaxoError::NotFound("empty".to_string());
        assert_eq!(status_for_taxo_error(&err), StatusCode::NOT_FOUND);
        let err = TaxoError::Validation("bad".to_string());
        assert_eq!(status_for_taxo_error(&err), StatusCode::BAD_REQUEST);
    }
}
