use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_with::{serde_as, DisplayFromStr, PickFirst};
use validator::{Validate, ValidationError};

/// Estimate request body posted by the front-end.
#[serde_as]
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct EstimateRequest {
    #[validate(length(min = 1, max = 100))]
    pub environment_name: String,

    /// Accepts both a JSON number and a numeric string.
    #[serde_as(as = "PickFirst<(_, DisplayFromStr)>")]
    pub subscriber_count: u64,

    /// Storage tier selector, e.g. "balanced".
    #[validate(length(min = 1))]
    pub price_tolerance: String,

    /// Region code, e.g. "eastus".
    #[validate(length(min = 1))]
    pub region: String,

    /// "windows" selects Windows VM pricing; anything else prices the
    /// baseline OS.
    #[validate(length(min = 1))]
    pub operating_system: String,

    /// Role name -> requested count and category.
    #[validate(custom(function = validate_server_configs))]
    pub server_configs: BTreeMap<String, ServerConfigRequest>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfigRequest {
    /// Instance count; omitted means 0, which excludes the role from cost.
    #[serde(default)]
    pub count: u64,
    pub category: String,
}

fn validate_server_configs(
    configs: &BTreeMap<String, ServerConfigRequest>,
) -> Result<(), ValidationError> {
    if configs.is_empty() {
        return Err(ValidationError::new("server_configs_empty"));
    }
    Ok(())
}
