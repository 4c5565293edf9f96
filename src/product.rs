//! Product page resolution through the storefront's public product feed.
//!
//! A product detail page is usually a better sample of a shop's button
//! styling than its home page. The feed lives at `/products.json` on the shop
//! origin; the first product that has images and was published more than
//! [`MIN_PRODUCT_AGE_DAYS`] days ago is used.

use crate::{Error, Result};
use chrono::{DateTime, Duration, Utc};
use log::{debug, warn};
use serde::Deserialize;
use url::Url;

pub const MIN_PRODUCT_AGE_DAYS: i64 = 30;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProductFeed {
    #[serde(default)]
    pub products: Vec<Product>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Product {
    pub handle: String,
    #[serde(default)]
    pub images: Vec<serde_json::Value>,
    #[serde(default)]
    pub published_at: Option<String>,
}

impl Product {
    fn published(&self) -> Option<DateTime<Utc>> {
        let raw = self.published_at.as_deref()?;
        DateTime::parse_from_rfc3339(raw).ok().map(|d| d.with_timezone(&Utc))
    }
}

/// First product with at least one image published before `now` minus
/// [`MIN_PRODUCT_AGE_DAYS`]. Products without a parseable date never qualify.
pub fn select_product(feed: &ProductFeed, now: DateTime<Utc>) -> Option<&Product> {
    let cutoff = now - Duration::days(MIN_PRODUCT_AGE_DAYS);
    feed.products
        .iter()
        .find(|p| !p.images.is_empty() && p.published().map_or(false, |d| d < cutoff))
}

/// URL of the product feed for the shop serving `shop_url`
pub fn feed_url(shop_url: &str) -> Result<Url> {
    let base = Url::parse(shop_url).map_err(|e| Error::ConfigError(format!("Invalid shop URL '{}': {}", shop_url, e)))?;
    base.join("/products.json")
        .map_err(|e| Error::ConfigError(format!("Invalid shop URL '{}': {}", shop_url, e)))
}

/// URL of the product page for `handle`
pub fn product_url(shop_url: &str, handle: &str) -> Result<Url> {
    let base = Url::parse(shop_url).map_err(|e| Error::ConfigError(format!("Invalid shop URL '{}': {}", shop_url, e)))?;
    let mut url = base.join("/products/").map_err(|e| Error::ConfigError(e.to_string()))?;
    url.path_segments_mut()
        .map_err(|_| Error::ConfigError(format!("'{}' cannot be a base URL", shop_url)))?
        .pop_if_empty()
        .push(handle);
    Ok(url)
}

pub async fn fetch_feed(client: &reqwest::Client, shop_url: &str) -> Result<ProductFeed> {
    let url = feed_url(shop_url)?;
    let resp = client
        .get(url.clone())
        .send()
        .await
        .map_err(|e| Error::NetworkError(format!("GET {} failed: {}", url, e)))?
        .error_for_status()
        .map_err(|e| Error::NetworkError(format!("GET {} failed: {}", url, e)))?;

    resp.json::<ProductFeed>()
        .await
        .map_err(|e| Error::NetworkError(format!("Malformed product feed from {}: {}", url, e)))
}

async fn try_resolve(client: &reqwest::Client, shop_url: &str, now: DateTime<Utc>) -> Result<String> {
    let feed = fetch_feed(client, shop_url).await?;
    let product = select_product(&feed, now).ok_or_else(|| {
        Error::Other(format!("No product in the {}-product feed qualifies", feed.products.len()))
    })?;
    Ok(product_url(shop_url, &product.handle)?.to_string())
}

/// Resolve a representative product page for `shop_url`, falling back to
/// `shop_url` itself on any failure.
pub async fn resolve_target_url(client: &reqwest::Client, shop_url: &str, now: DateTime<Utc>) -> String {
    match try_resolve(client, shop_url, now).await {
        Ok(url) => {
            debug!("using product page {}", url);
            url
        }
        Err(e) => {
            warn!("Product page resolution failed, using {}: {}", shop_url, e);
            shop_url.to_string()
        }
    }
}
