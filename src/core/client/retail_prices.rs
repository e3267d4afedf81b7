//! Azure Retail Prices API client.
//!
//! Compute and storage prices come from the same REST endpoint but with
//! different SKU key fields (`armSkuName` vs `skuName`) and unit granularity
//! (per hour vs per GB-month), so the two fetches stay separate.

use std::collections::HashMap;
use std::env;
use std::time::Duration;

use anyhow::{anyhow, Result};
use serde::Deserialize;
use tracing::{debug, error, info, warn};

/// Public retail prices endpoint.
const RETAIL_PRICES_API: &str = "https://prices.azure.com/api/retail/prices";

/// Attempts per page request, first try included.
const MAX_ATTEMPTS: u32 = 3;

/// Delay between continuation-link requests; the retail API rate-limits.
const PAGE_DELAY: Duration = Duration::from_secs(1);

/// Base for the exponential backoff between failed attempts.
const BACKOFF_BASE: Duration = Duration::from_secs(1);

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// SKU -> unit price. Hourly for VM meters, per GB-month for storage meters.
pub type PriceTable = HashMap<String, f64>;

/// OS dimension of the VM price query. Windows meters carry the OS in the
/// retail product name; anything else prices as the baseline OS.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OsKind {
    Windows,
    Other,
}

impl OsKind {
    pub fn parse(raw: &str) -> Self {
        if raw.eq_ignore_ascii_case("windows") {
            Self::Windows
        } else {
            Self::Other
        }
    }
}

#[derive(Debug, Deserialize)]
struct RetailPriceResponse {
    #[serde(rename = "Items", default)]
    items: Vec<RetailPriceItem>,
    #[serde(rename = "NextPageLink")]
    next_page_link: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RetailPriceItem {
    #[serde(rename = "armSkuName")]
    arm_sku_name: Option<String>,
    #[serde(rename = "skuName")]
    sku_name: Option<String>,
    #[serde(rename = "retailPrice")]
    retail_price: Option<f64>,
}

#[derive(Debug, Clone, Copy)]
enum SkuKey {
    /// `armSkuName`, the VM feed's stable identifier.
    Arm,
    /// `skuName`, the storage feed's display identifier.
    Display,
}

#[derive(Clone)]
pub struct RetailPricesClient {
    client: reqwest::Client,
    base_url: String,
    page_delay: Duration,
    backoff_base: Duration,
}

/// Builds the retail prices client, honoring `COSTPLAN_PRICING_API_URL` for
/// local development against a stub endpoint.
pub fn build_pricing_client() -> Result<RetailPricesClient> {
    let base_url = match env::var("COSTPLAN_PRICING_API_URL") {
        Ok(url) => {
            debug!("Using custom pricing API URL from COSTPLAN_PRICING_API_URL");
            url
        }
        Err(_) => RETAIL_PRICES_API.to_string(),
    };
    RetailPricesClient::new(base_url)
}

impl RetailPricesClient {
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        Ok(Self {
            client,
            base_url: base_url.into(),
            page_delay: PAGE_DELAY,
            backoff_base: BACKOFF_BASE,
        })
    }

    #[cfg(test)]
    pub(crate) fn without_delays(base_url: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url,
            page_delay: Duration::ZERO,
            backoff_base: Duration::ZERO,
        }
    }

    /// Current hourly VM prices for a region, keyed by `armSkuName`.
    ///
    /// Follows `NextPageLink` until exhausted. Never fails: when the retry
    /// budget runs out the walk stops and whatever was accumulated so far is
    /// returned — an empty or partial table is the caller's failure signal.
    pub async fn fetch_compute_prices(&self, region: &str, os: OsKind) -> PriceTable {
        let filter = compute_filter(region, os);
        let mut prices = PriceTable::new();
        let mut next_url = Some(format!(
            "{}?$filter={}",
            self.base_url,
            urlencoding::encode(&filter)
        ));
        let mut pages = 0usize;

        while let Some(url) = next_url.take() {
            let page = match self.get_page_with_retry(&url).await {
                Ok(page) => page,
                Err(err) => {
                    error!("❌ Giving up on compute price fetch: {err:#}");
                    break;
                }
            };

            pages += 1;
            merge_items(&mut prices, page.items, SkuKey::Arm);

            next_url = page.next_page_link.filter(|link| !link.is_empty());
            if next_url.is_some() {
                tokio::time::sleep(self.page_delay).await;
            }
        }

        info!(region, pages, skus = prices.len(), "compute price fetch complete");
        prices
    }

    /// Current per-GB-month storage prices for a region, keyed by `skuName`.
    /// The storage listing is not paginated.
    pub async fn fetch_storage_prices(&self, region: &str) -> PriceTable {
        let filter = storage_filter(region);
        let url = format!("{}?$filter={}", self.base_url, urlencoding::encode(&filter));

        let mut prices = PriceTable::new();
        match self.get_page_with_retry(&url).await {
            Ok(page) => merge_items(&mut prices, page.items, SkuKey::Display),
            Err(err) => error!("❌ Giving up on storage price fetch: {err:#}"),
        }

        info!(region, skus = prices.len(), "storage price fetch complete");
        prices
    }

    async fn get_page_with_retry(&self, url: &str) -> Result<RetailPriceResponse> {
        let mut last_err = None;

        for attempt in 1..=MAX_ATTEMPTS {
            match self.get_page(url).await {
                Ok(page) => return Ok(page),
                Err(err) => {
                    warn!(attempt, "retail price request failed: {err:#}");
                    last_err = Some(err);
                    if attempt < MAX_ATTEMPTS {
                        tokio::time::sleep(self.backoff_base * (1u32 << attempt)).await;
                    }
                }
            }
        }

        Err(last_err.unwrap_or_else(|| anyhow!("retail price request failed")))
    }

    async fn get_page(&self, url: &str) -> Result<RetailPriceResponse> {
        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(anyhow!("retail prices API returned {status}"));
        }
        Ok(response.json().await?)
    }
}

fn compute_filter(region: &str, os: OsKind) -> String {
    let mut filter = format!(
        "serviceName eq 'Virtual Machines' and armRegionName eq '{region}' \
         and priceType eq 'Consumption' and unitOfMeasure eq '1 Hour'"
    );
    if os == OsKind::Windows {
        filter.push_str(" and contains(productName, 'Windows')");
    }
    filter
}

fn storage_filter(region: &str) -> String {
    format!(
        "serviceName eq 'Storage' and armRegionName eq '{region}' \
         and priceType eq 'Consumption' and unitOfMeasure eq '1 GB/Month'"
    )
}

fn merge_items(prices: &mut PriceTable, items: Vec<RetailPriceItem>, key: SkuKey) {
    for item in items {
        let sku = match key {
            SkuKey::Arm => item.arm_sku_name,
            SkuKey::Display => item.sku_name,
        };
        let Some(sku) = sku.filter(|s| !s.is_empty()) else {
            continue;
        };
        // Zero-priced meters are placeholder rows in the retail feed.
        let Some(price) = item.retail_price.filter(|p| *p != 0.0) else {
            continue;
        };
        prices.insert(sku, price);
    }
}
