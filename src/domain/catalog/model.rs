//! Static server-role and storage catalog.
//!
//! The catalog is built once at startup and shared read-only through
//! `AppState`; services receive a reference instead of reaching for globals,
//! so tests can substitute their own catalogs.

use std::collections::HashMap;

use serde::Serialize;

/// Subscriber count at which recommendations switch to the large-payer SKU.
/// The boundary itself belongs to the large tier.
pub const LARGE_PAYER_THRESHOLD: u64 = 1_000_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum WorkloadType {
    Database,
    Application,
    Storage,
}

/// SKU choice below vs. at/above the large-payer threshold.
#[derive(Debug, Clone)]
pub struct SkuPair {
    pub small_payer_threshold: String,
    pub large_payer_threshold: String,
}

impl SkuPair {
    fn new(small: &str, large: &str) -> Self {
        Self {
            small_payer_threshold: small.to_string(),
            large_payer_threshold: large.to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ServerRoleDefinition {
    pub name: String,
    pub workload_type: WorkloadType,
    pub description: String,
    /// category -> SKU pair
    pub tiers: HashMap<String, SkuPair>,
}

#[derive(Debug, Clone)]
pub struct StorageDefinition {
    pub name: String,
    pub description: String,
    /// price tolerance -> SKU
    pub tiers: HashMap<String, String>,
}

#[derive(Debug, Clone, Default)]
pub struct Catalog {
    pub server_roles: Vec<ServerRoleDefinition>,
    pub storage: Vec<StorageDefinition>,
}

impl Catalog {
    pub fn server_role(&self, name: &str) -> Option<&ServerRoleDefinition> {
        self.server_roles.iter().find(|role| role.name == name)
    }

    /// Storage entry name and SKU for a price tolerance, taken from the first
    /// storage definition carrying that tier.
    pub fn storage_sku(&self, price_tolerance: &str) -> Option<(&str, &str)> {
        self.storage.iter().find_map(|entry| {
            entry
                .tiers
                .get(price_tolerance)
                .map(|sku| (entry.name.as_str(), sku.as_str()))
        })
    }

    /// The catalog shipped with the service.
    pub fn builtin() -> Self {
        Self {
            server_roles: vec![
                ServerRoleDefinition {
                    name: "SQL Server".to_string(),
                    workload_type: WorkloadType::Database,
                    description: "Primary database server for OLTP workloads.".to_string(),
                    tiers: HashMap::from([
                        (
                            "cost-optimized".to_string(),
                            SkuPair::new("Standard_D2as_v5", "Standard_DS4_v2"),
                        ),
                        (
                            "balanced".to_string(),
                            SkuPair::new("Standard_D4s_v3", "Standard_D8s_v3"),
                        ),
                        (
                            "performance-first".to_string(),
                            SkuPair::new("Standard_E8s_v3", "Standard_E16s_v3"),
                        ),
                    ]),
                },
                ServerRoleDefinition {
                    name: "Batch Processor".to_string(),
                    workload_type: WorkloadType::Application,
                    description: "Windows server for nightly batch jobs.".to_string(),
                    tiers: HashMap::from([
                        (
                            "cost-optimized".to_string(),
                            SkuPair::new("Standard_B2s", "Standard_B4ms"),
                        ),
                        (
                            "balanced".to_string(),
                            SkuPair::new("Standard_D2s_v3", "Standard_D4s_v3"),
                        ),
                        (
                            "performance-first".to_string(),
                            SkuPair::new("Standard_F4s_v2", "Standard_F8s_v2"),
                        ),
                    ]),
                },
            ],
            storage: vec![StorageDefinition {
                name: "Database Storage".to_string(),
                description: "Premium storage for database workloads.".to_string(),
                tiers: HashMap::from([
                    (
                        "cost-optimized".to_string(),
                        "Standard_SSD_LRS_Disk_Size_P10".to_string(),
                    ),
                    (
                        "balanced".to_string(),
                        "Premium_SSD_LRS_Disk_Size_P20".to_string(),
                    ),
                    (
                        "performance-first".to_string(),
                        "Premium_SSD_LRS_Disk_Size_P30".to_string(),
                    ),
                ]),
            }],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_roles_carry_both_thresholds_per_tier() {
        let catalog = Catalog::builtin();
        assert!(catalog.server_role("SQL Server").is_some());
        assert!(catalog.server_role("Batch Processor").is_some());

        for role in &catalog.server_roles {
            assert!(!role.tiers.is_empty());
            for pair in role.tiers.values() {
                assert!(!pair.small_payer_threshold.is_empty());
                assert!(!pair.large_payer_threshold.is_empty());
            }
        }
    }

    #[test]
    fn storage_sku_resolves_by_tolerance() {
        let catalog = Catalog::builtin();
        let (name, sku) = catalog.storage_sku("balanced").expect("balanced tier");
        assert_eq!(name, "Database Storage");
        assert_eq!(sku, "Premium_SSD_LRS_Disk_Size_P20");

        assert!(catalog.storage_sku("no-such-tier").is_none());
    }

    #[test]
    fn unknown_role_is_absent() {
        let catalog = Catalog::builtin();
        assert!(catalog.server_role("Cache Server").is_none());
    }
}
