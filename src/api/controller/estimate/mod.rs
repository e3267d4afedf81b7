//! Estimate controller: connects routes to the estimation usecase

use axum::extract::State;
use axum::Json;
use validator::Validate;

use crate::api::dto::ApiResponse;
use crate::api::util::json::to_json;
use crate::app_state::AppState;
use crate::domain::estimate::dto::estimate_request::EstimateRequest;
use crate::domain::estimate::dto::estimate_response::EstimateResponse;
use crate::errors::AppError;

pub struct EstimateController;

impl EstimateController {
    pub async fn calculate(
        State(state): State<AppState>,
        Json(request): Json<EstimateRequest>,
    ) -> Result<Json<ApiResponse<EstimateResponse>>, AppError> {
        request
            .validate()
            .map_err(|err| AppError::ValidationError(err.to_string()))?;

        to_json(state.estimate_service.estimate(request).await)
    }
}
