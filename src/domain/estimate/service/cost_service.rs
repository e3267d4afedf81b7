use std::collections::BTreeMap;

use tracing::warn;

use crate::core::client::retail_prices::PriceTable;
use crate::core::util::cost_util::{CostUtil, STORAGE_VOLUME_GB};
use crate::domain::catalog::model::WorkloadType;
use crate::domain::estimate::dto::estimate_request::ServerConfigRequest;
use crate::domain::estimate::dto::estimate_response::{CostLineItem, PricingStatus};
use crate::domain::estimate::service::recommendation_service::{
    RoleRecommendation, StorageRecommendation,
};

/// Aggregation result handed to the boundary layer. Totals are kept at full
/// float precision; two-decimal rendering is a display concern.
#[derive(Debug)]
pub struct CostEstimate {
    pub items: BTreeMap<String, CostLineItem>,
    pub total_monthly_cost: f64,
    pub pricing: PricingStatus,
    pub warnings: Vec<String>,
}

impl CostEstimate {
    fn unavailable(reason: &str) -> Self {
        Self {
            items: BTreeMap::new(),
            total_monthly_cost: 0.0,
            pricing: PricingStatus::PricingUnavailable,
            warnings: vec![reason.to_string()],
        }
    }
}

/// Retail `skuName` for an internal managed-disk token; the disk price feed
/// lists display names, not ARM-style tokens.
fn storage_retail_sku(sku: &str, warnings: &mut Vec<String>) -> String {
    match sku {
        "Standard_SSD_LRS_Disk_Size_P10" => "Standard SSD LRS Disk Size P10".to_string(),
        "Premium_SSD_LRS_Disk_Size_P20" => "Premium SSD LRS Disk Size P20".to_string(),
        "Premium_SSD_LRS_Disk_Size_P30" => "Premium SSD LRS Disk Size P30".to_string(),
        other => {
            warn!(sku = %other, "storage SKU has no display-name mapping, using raw token");
            warnings.push(format!(
                "storage SKU '{other}' has no display-name mapping; price lookup used the raw token"
            ));
            other.to_string()
        }
    }
}

/// Combines recommendations, requested counts, and fetched prices into
/// itemized and total monthly cost.
pub fn aggregate(
    recommendation: &BTreeMap<String, RoleRecommendation>,
    server_configs: &BTreeMap<String, ServerConfigRequest>,
    storage: Option<&StorageRecommendation>,
    compute_prices: &PriceTable,
    storage_prices: &PriceTable,
    price_tolerance: &str,
    hours_per_month: f64,
) -> CostEstimate {
    // An empty table means the fetch degraded to nothing; a partial estimate
    // would silently understate the total, so stop here.
    if compute_prices.is_empty() || storage_prices.is_empty() {
        warn!("price tables empty, cannot calculate costs");
        return CostEstimate::unavailable("pricing data unavailable for the requested region");
    }

    let mut items: BTreeMap<String, CostLineItem> = BTreeMap::new();
    let mut warnings = Vec::new();
    let mut total = 0.0;

    for (role_name, rec) in recommendation {
        match rec.workload_type {
            WorkloadType::Database | WorkloadType::Application => {}
            WorkloadType::Storage => continue,
        }

        let (count, category) = match server_configs.get(role_name) {
            Some(config) => (config.count, config.category.as_str()),
            None => (0, ""),
        };
        if count == 0 {
            continue;
        }

        let Some(hourly_price) = compute_prices.get(&rec.sku) else {
            warn!(role = %role_name, sku = %rec.sku, "no price for SKU, omitting line item");
            warnings.push(format!("no price found for {role_name} ({})", rec.sku));
            continue;
        };

        let monthly_cost = CostUtil::vm_monthly_cost(*hourly_price, hours_per_month, count);
        total += monthly_cost;
        items.insert(
            role_name.clone(),
            CostLineItem {
                sku: rec.sku.clone(),
                count,
                category: category.to_string(),
                monthly_cost,
            },
        );
    }

    // One storage line per request, independent of the per-role configs.
    if let Some(storage) = storage {
        let retail_sku = storage_retail_sku(&storage.sku, &mut warnings);
        match storage_prices.get(&retail_sku) {
            Some(price_per_gb) => {
                let monthly_cost = CostUtil::storage_monthly_cost(*price_per_gb, STORAGE_VOLUME_GB);
                total += monthly_cost;
                items.insert(
                    storage.name.clone(),
                    CostLineItem {
                        sku: storage.sku.clone(),
                        count: STORAGE_VOLUME_GB as u64,
                        category: price_tolerance.to_string(),
                        monthly_cost,
                    },
                );
            }
            None => {
                warn!(sku = %storage.sku, "no price for storage SKU, omitting line item");
                warnings.push(format!(
                    "no price found for {} ({})",
                    storage.name, storage.sku
                ));
            }
        }
    }

    CostEstimate {
        items,
        total_monthly_cost: total,
        pricing: PricingStatus::Priced,
        warnings,
    }
}
