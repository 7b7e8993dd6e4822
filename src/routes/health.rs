//! Aggregated health endpoint.

use axum::{extract::State, response::Json};

use crate::error::AppError;
use crate::health::aggregator::AggregateHealth;
use crate::state::AppState;

/// `GET /api/health`
///
/// Returns 200 with the aggregate report whenever the checks themselves ran,
/// even if individual dependencies are down — the HTTP status reflects the
/// health of the aggregation mechanism, dependency health lives in the body.
/// A mechanism failure propagates as [`AppError`] and maps to 503.
pub async fn get_health(State(state): State<AppState>) -> Result<Json<AggregateHealth>, AppError> {
    let report = state.aggregator.get_health().await?;
    Ok(Json(report))
}
