//! Page capture: media masking, overlay removal and the clipped screenshot.

use crate::async_api::Page;
use crate::renderer::{Clip, ResourceKind};
use crate::{CaptureConfig, ExtractOptions, Result};
use log::debug;
use std::io::Write;
use std::time::Duration;
use tempfile::NamedTempFile;

/// Request kinds blocked while a page loads for capture
pub const BLOCKED_RESOURCES: [ResourceKind; 2] = [ResourceKind::Image, ResourceKind::Media];

/// Consent banners, newsletter popups and modal layers
pub const OVERLAY_SELECTORS: &[&str] = &[
    "#onetrust-consent-sdk",
    "#onetrust-banner-sdk",
    "#CybotCookiebotDialog",
    "#shopify-pc__banner",
    ".shopify-section-cookie-banner",
    "[id*='cookie']",
    "[class*='cookie']",
    "[id*='consent']",
    "[class*='consent']",
    "[class*='gdpr']",
    "[class*='newsletter-popup']",
    "[class*='popup']",
    "[class*='modal']",
    "[class*='overlay']",
    "[aria-modal='true']",
    "[class*='klaviyo']",
];

/// Fixed body children with exactly this z-index and taller than
/// [`OVERLAY_MIN_HEIGHT`] are removed as overlays
pub const OVERLAY_Z_INDEX: &str = "9999";

pub const OVERLAY_MIN_HEIGHT: f64 = 100.0;

/// Screenshot region: full viewport width from the top of the page, capped at
/// `max_height` and shortened by `bottom_margin`.
pub fn clip_for(content_height: f64, config: &CaptureConfig) -> Clip {
    let capped = content_height.min(config.max_height as f64);
    let height = (capped - config.bottom_margin as f64).max(1.0);
    Clip {
        x: 0.0,
        y: 0.0,
        width: config.viewport.width as f64,
        height,
    }
}

/// Prepare `page` and capture it into a temporary PNG that is removed when
/// the returned file is dropped.
pub async fn capture(page: &Page, options: &ExtractOptions, config: &CaptureConfig) -> Result<NamedTempFile> {
    let masked = page.mask_media().await?;
    debug!("masked {} media elements", masked);

    if options.remove_overlays {
        let removal = page
            .remove_overlays(OVERLAY_SELECTORS, OVERLAY_Z_INDEX, OVERLAY_MIN_HEIGHT)
            .await?;
        debug!("hid {} overlay elements, removed {}", removal.hidden, removal.removed);
        tokio::time::sleep(Duration::from_millis(config.settle_delay_ms)).await;
    }

    let height = page.content_height().await?;
    let clip = clip_for(height, config);
    let png = page.screenshot(clip).await?;

    let mut file = tempfile::Builder::new()
        .prefix("storestyle-")
        .suffix(".png")
        .tempfile()?;
    file.write_all(&png)?;
    file.flush()?;
    debug!("screenshot {}x{} written to {}", clip.width, clip.height, file.path().display());
    Ok(file)
}
