use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde_json::json;

use crate::health::aggregator::AggregationError;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Aggregation failure: {0}")]
    Aggregation(#[from] AggregationError),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            // Mechanism failure, not dependency failure: no dependency
            // report is available, only the service-unavailable signal.
            AppError::Aggregation(_) => {
                tracing::error!(error = %self, "Health aggregation mechanism failed");
                (StatusCode::SERVICE_UNAVAILABLE, "Service Unavailable")
            }
        };

        let body = json!({
            "statusCode": status.as_u16(),
            "message": message,
        });

        (status, Json(body)).into_response()
    }
}
