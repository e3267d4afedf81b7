use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::domain::catalog::model::WorkloadType;

/// Whether the estimate was actually priced. `PricingUnavailable` means the
/// retail price feed could not be read for the requested region, which is
/// distinct from a genuine zero-cost estimate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PricingStatus {
    Priced,
    PricingUnavailable,
}

/// One priced line in the estimate.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CostLineItem {
    pub sku: String,
    /// Instance count for VM lines; provisioned GB for the storage line.
    pub count: u64,
    pub category: String,
    pub monthly_cost: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct RecommendationView {
    pub sku: String,
    pub workload_type: WorkloadType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct EstimateResponse {
    pub environment_name: String,
    pub operating_system: String,
    pub region: String,
    pub subscriber_count: u64,
    pub recommendations: BTreeMap<String, RecommendationView>,
    pub itemized_costs: BTreeMap<String, CostLineItem>,
    pub total_cost: f64,
    pub pricing: PricingStatus,
    pub warnings: Vec<String>,
    pub generated_at: DateTime<Utc>,
}
