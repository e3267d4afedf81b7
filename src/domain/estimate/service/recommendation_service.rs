use std::collections::BTreeMap;

use tracing::debug;

use crate::domain::catalog::model::{Catalog, WorkloadType, LARGE_PAYER_THRESHOLD};
use crate::domain::estimate::dto::estimate_request::ServerConfigRequest;

#[derive(Debug, Clone, PartialEq)]
pub struct RoleRecommendation {
    pub sku: String,
    pub workload_type: WorkloadType,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StorageRecommendation {
    pub name: String,
    pub sku: String,
}

/// Maps each requested role to a concrete VM SKU.
///
/// A role missing from the catalog, or a requested category missing from that
/// role's tier map, yields no recommendation.
pub fn resolve(
    catalog: &Catalog,
    subscriber_count: u64,
    server_configs: &BTreeMap<String, ServerConfigRequest>,
) -> BTreeMap<String, RoleRecommendation> {
    let mut recommendations = BTreeMap::new();

    for (role_name, config) in server_configs {
        let Some(role) = catalog.server_role(role_name) else {
            debug!(role = %role_name, "role not in catalog, skipping");
            continue;
        };
        let Some(pair) = role.tiers.get(&config.category) else {
            debug!(
                role = %role_name,
                category = %config.category,
                "category not in role's catalog entry, skipping"
            );
            continue;
        };

        let sku = if subscriber_count < LARGE_PAYER_THRESHOLD {
            pair.small_payer_threshold.clone()
        } else {
            pair.large_payer_threshold.clone()
        };

        recommendations.insert(
            role_name.clone(),
            RoleRecommendation {
                sku,
                workload_type: role.workload_type,
            },
        );
    }

    recommendations
}

/// Storage SKU for the requested price tolerance, or `None` when the tier is
/// not in the catalog.
pub fn resolve_storage(catalog: &Catalog, price_tolerance: &str) -> Option<StorageRecommendation> {
    let (name, sku) = catalog.storage_sku(price_tolerance)?;
    Some(StorageRecommendation {
        name: name.to_string(),
        sku: sku.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::catalog::model::{ServerRoleDefinition, SkuPair, StorageDefinition};
    use std::collections::HashMap;

    fn fake_catalog() -> Catalog {
        Catalog {
            server_roles: vec![ServerRoleDefinition {
                name: "SQL Server".to_string(),
                workload_type: WorkloadType::Database,
                description: "test role".to_string(),
                tiers: HashMap::from([(
                    "general-purpose".to_string(),
                    SkuPair {
                        small_payer_threshold: "Standard_D2s_v5".to_string(),
                        large_payer_threshold: "Standard_D16s_v5".to_string(),
                    },
                )]),
            }],
            storage: vec![StorageDefinition {
                name: "Database Storage".to_string(),
                description: "test storage".to_string(),
                tiers: HashMap::from([(
                    "balanced".to_string(),
                    "Premium_SSD_LRS_Disk_Size_P20".to_string(),
                )]),
            }],
        }
    }

    fn configs(role: &str, category: &str, count: u64) -> BTreeMap<String, ServerConfigRequest> {
        BTreeMap::from([(
            role.to_string(),
            ServerConfigRequest {
                count,
                category: category.to_string(),
            },
        )])
    }

    #[test]
    fn below_threshold_selects_small_payer_sku() {
        let catalog = fake_catalog();
        for subscribers in [0, 500_000, 999_999] {
            let rec = resolve(&catalog, subscribers, &configs("SQL Server", "general-purpose", 2));
            assert_eq!(rec["SQL Server"].sku, "Standard_D2s_v5");
            assert_eq!(rec["SQL Server"].workload_type, WorkloadType::Database);
        }
    }

    #[test]
    fn at_and_above_threshold_selects_large_payer_sku() {
        let catalog = fake_catalog();
        for subscribers in [1_000_000, 2_000_000] {
            let rec = resolve(&catalog, subscribers, &configs("SQL Server", "general-purpose", 2));
            assert_eq!(rec["SQL Server"].sku, "Standard_D16s_v5");
        }
    }

    #[test]
    fn unknown_role_yields_no_recommendation() {
        let catalog = fake_catalog();
        let rec = resolve(&catalog, 500_000, &configs("Cache Server", "general-purpose", 2));
        assert!(rec.is_empty());
    }

    #[test]
    fn unknown_category_yields_no_recommendation() {
        let catalog = fake_catalog();
        let rec = resolve(&catalog, 500_000, &configs("SQL Server", "platinum", 2));
        assert!(rec.is_empty());
    }

    #[test]
    fn storage_resolves_by_tolerance_only() {
        let catalog = fake_catalog();
        let storage = resolve_storage(&catalog, "balanced").expect("balanced tier");
        assert_eq!(storage.name, "Database Storage");
        assert_eq!(storage.sku, "Premium_SSD_LRS_Disk_Size_P20");

        assert!(resolve_storage(&catalog, "platinum").is_none());
    }
}
