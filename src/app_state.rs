use std::sync::Arc;

use anyhow::Result;

use crate::core::client::retail_prices::build_pricing_client;
use crate::domain::catalog::model::Catalog;
use crate::domain::estimate::service::estimate_service::EstimateService;

#[derive(Clone)]
pub struct AppState {
    pub estimate_service: Arc<EstimateService>,
}

/// Builds shared state once at startup: the immutable SKU catalog and the
/// retail prices client behind the estimate service.
pub fn build_app_state() -> Result<AppState> {
    let catalog = Arc::new(Catalog::builtin());
    let pricing = build_pricing_client()?;

    Ok(AppState {
        estimate_service: Arc::new(EstimateService::new(catalog, pricing)),
    })
}
