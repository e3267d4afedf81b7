//! Estimate routes (e.g., /api/v1/estimate/*)

use axum::{routing::post, Router};

use crate::api::controller::estimate::EstimateController;
use crate::app_state::AppState;

pub fn estimate_routes() -> Router<AppState> {
    Router::new().route("/calculate", post(EstimateController::calculate))
}
