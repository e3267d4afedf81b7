use std::collections::BTreeMap;
use std::sync::Arc;

use anyhow::Result;
use chrono::Utc;
use tracing::info;

use crate::core::client::retail_prices::{OsKind, RetailPricesClient};
use crate::core::util::cost_util::HOURS_PER_MONTH;
use crate::domain::catalog::model::{Catalog, WorkloadType};
use crate::domain::estimate::dto::estimate_request::EstimateRequest;
use crate::domain::estimate::dto::estimate_response::{EstimateResponse, RecommendationView};
use crate::domain::estimate::service::{cost_service, recommendation_service};

pub struct EstimateService {
    catalog: Arc<Catalog>,
    pricing: RetailPricesClient,
}

impl EstimateService {
    pub fn new(catalog: Arc<Catalog>, pricing: RetailPricesClient) -> Self {
        Self { catalog, pricing }
    }

    /// Runs one full estimation: fetch prices, resolve SKUs, aggregate costs.
    pub async fn estimate(&self, req: EstimateRequest) -> Result<EstimateResponse> {
        info!(
            environment = %req.environment_name,
            subscriber_count = req.subscriber_count,
            region = %req.region,
            price_tolerance = %req.price_tolerance,
            "calculating estimate"
        );

        let os = OsKind::parse(&req.operating_system);

        // Price tables are built fresh per request and the two fetches run
        // strictly in sequence; no state is shared across requests.
        let compute_prices = self.pricing.fetch_compute_prices(&req.region, os).await;
        let storage_prices = self.pricing.fetch_storage_prices(&req.region).await;

        let recommendation =
            recommendation_service::resolve(&self.catalog, req.subscriber_count, &req.server_configs);
        let storage = recommendation_service::resolve_storage(&self.catalog, &req.price_tolerance);

        let estimate = cost_service::aggregate(
            &recommendation,
            &req.server_configs,
            storage.as_ref(),
            &compute_prices,
            &storage_prices,
            &req.price_tolerance,
            HOURS_PER_MONTH,
        );

        let mut recommendations: BTreeMap<String, RecommendationView> = recommendation
            .into_iter()
            .map(|(role_name, rec)| {
                let category = req
                    .server_configs
                    .get(&role_name)
                    .map(|config| config.category.clone());
                (
                    role_name,
                    RecommendationView {
                        sku: rec.sku,
                        workload_type: rec.workload_type,
                        category,
                    },
                )
            })
            .collect();
        if let Some(storage) = storage {
            recommendations.insert(
                storage.name,
                RecommendationView {
                    sku: storage.sku,
                    workload_type: WorkloadType::Storage,
                    category: Some(req.price_tolerance.clone()),
                },
            );
        }

        Ok(EstimateResponse {
            environment_name: req.environment_name,
            operating_system: req.operating_system,
            region: req.region,
            subscriber_count: req.subscriber_count,
            recommendations,
            itemized_costs: estimate.items,
            total_cost: estimate.total_monthly_cost,
            pricing: estimate.pricing,
            warnings: estimate.warnings,
            generated_at: Utc::now(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::estimate::dto::estimate_request::ServerConfigRequest;
    use crate::domain::estimate::dto::estimate_response::PricingStatus;
    use mockito::Matcher;
    use serde_json::json;

    fn request() -> EstimateRequest {
        serde_json::from_value(json!({
            "environment_name": "prod",
            "subscriber_count": 500_000,
            "price_tolerance": "balanced",
            "region": "eastus",
            "operating_system": "linux",
            "server_configs": {"SQL Server": {"count": 2, "category": "balanced"}}
        }))
        .unwrap()
    }

    #[tokio::test]
    async fn estimates_end_to_end_against_stub_feed() {
        let mut server = mockito::Server::new_async().await;

        // Built-in catalog: SQL Server / balanced / 500k subscribers
        // resolves to Standard_D4s_v3.
        let _compute = server
            .mock("GET", "/")
            .match_query(Matcher::Regex("Virtual".to_string()))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                json!({
                    "Items": [
                        {"armSkuName": "Standard_D4s_v3", "skuName": "D4s v3", "retailPrice": 0.2}
                    ]
                })
                .to_string(),
            )
            .create_async()
            .await;

        let _storage = server
            .mock("GET", "/")
            .match_query(Matcher::Regex("Storage".to_string()))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                json!({
                    "Items": [
                        {"skuName": "Premium SSD LRS Disk Size P20", "retailPrice": 0.05}
                    ]
                })
                .to_string(),
            )
            .create_async()
            .await;

        let service = EstimateService::new(
            Arc::new(Catalog::builtin()),
            RetailPricesClient::without_delays(server.url()),
        );
        let response = service.estimate(request()).await.unwrap();

        assert_eq!(response.pricing, PricingStatus::Priced);
        assert_eq!(response.itemized_costs["SQL Server"].monthly_cost, 292.0);
        assert_eq!(response.itemized_costs["Database Storage"].monthly_cost, 51.2);

        let sum: f64 = response
            .itemized_costs
            .values()
            .map(|item| item.monthly_cost)
            .sum();
        assert_eq!(response.total_cost, sum);

        let sql = &response.recommendations["SQL Server"];
        assert_eq!(sql.sku, "Standard_D4s_v3");
        assert_eq!(sql.category.as_deref(), Some("balanced"));
        let storage = &response.recommendations["Database Storage"];
        assert_eq!(storage.sku, "Premium_SSD_LRS_Disk_Size_P20");
        assert_eq!(storage.workload_type, WorkloadType::Storage);
    }

    #[tokio::test]
    async fn unreachable_feed_reports_pricing_unavailable() {
        let mut server = mockito::Server::new_async().await;
        let _down = server
            .mock("GET", "/")
            .match_query(Matcher::Any)
            .with_status(503)
            .create_async()
            .await;

        let service = EstimateService::new(
            Arc::new(Catalog::builtin()),
            RetailPricesClient::without_delays(server.url()),
        );
        let response = service.estimate(request()).await.unwrap();

        assert_eq!(response.pricing, PricingStatus::PricingUnavailable);
        assert!(response.itemized_costs.is_empty());
        assert_eq!(response.total_cost, 0.0);
        // Recommendations are still echoed so the caller sees what would
        // have been priced.
        assert!(response.recommendations.contains_key("SQL Server"));
    }

    #[tokio::test]
    async fn storage_is_priced_once_regardless_of_role_configs() {
        let mut server = mockito::Server::new_async().await;
        let _compute = server
            .mock("GET", "/")
            .match_query(Matcher::Regex("Virtual".to_string()))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                json!({
                    "Items": [
                        {"armSkuName": "Standard_D4s_v3", "skuName": "D4s v3", "retailPrice": 0.2},
                        {"armSkuName": "Standard_D2s_v3", "skuName": "D2s v3", "retailPrice": 0.1}
                    ]
                })
                .to_string(),
            )
            .create_async()
            .await;
        let _storage = server
            .mock("GET", "/")
            .match_query(Matcher::Regex("Storage".to_string()))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                json!({
                    "Items": [
                        {"skuName": "Premium SSD LRS Disk Size P20", "retailPrice": 0.05}
                    ]
                })
                .to_string(),
            )
            .create_async()
            .await;

        let mut req = request();
        req.server_configs.insert(
            "Batch Processor".to_string(),
            ServerConfigRequest {
                count: 4,
                category: "balanced".to_string(),
            },
        );

        let service = EstimateService::new(
            Arc::new(Catalog::builtin()),
            RetailPricesClient::without_delays(server.url()),
        );
        let response = service.estimate(req).await.unwrap();

        let storage_lines = response
            .itemized_costs
            .iter()
            .filter(|(name, _)| name.as_str() == "Database Storage")
            .count();
        assert_eq!(storage_lines, 1);
        assert_eq!(response.itemized_costs["Database Storage"].count, 1024);
    }
}
