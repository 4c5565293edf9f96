//! Storefront style extraction
//!
//! Visits a storefront page in a headless browser and derives a compact
//! style profile: a ranked color palette, the page background color and the
//! styling of the page's primary call-to-action button.
//!
//! # Features
//!
//! - **CDP Backend** (default): renders pages with headless Chrome
//! - **Pluggable capabilities**: the page renderer and the palette extractor
//!   are traits, so the pipeline can run against any backend
//!
//! # Example
//!
//! ```no_run
//! # #[cfg(feature = "cdp")]
//! # async fn run() -> storestyle::Result<()> {
//! use std::sync::Arc;
//! use storestyle::{CaptureConfig, ExtractOptions, StyleExtractor};
//!
//! let config = CaptureConfig::default();
//! let renderer = Arc::new(storestyle::cdp::CdpRenderer::launch(config.clone())?);
//! let extractor = StyleExtractor::new(renderer, config)?;
//!
//! let profile = extractor.extract("https://shop.example.com", &ExtractOptions::default()).await?;
//! println!("button: {}", profile.primary_button.background_color);
//! # Ok(())
//! # }
//! ```

pub mod error;
pub use error::{Error, Result};

pub mod color;
pub mod dom;
pub mod style;

pub mod renderer;

// Async page facade (worker-thread backed)
pub mod async_api;

pub mod collector;
pub mod scorer;
pub mod theme;

pub mod capture;
pub mod palette;
pub mod product;

pub mod assembler;

#[cfg(feature = "cdp")]
pub mod cdp;

pub use assembler::{extract_styles, StyleExtractor};
pub use crate::palette::{ImagePaletteExtractor, PaletteExtractor};
pub use renderer::{PageHandle, PageRenderer};
pub use style::{ButtonStyle, Candidate, StyleProfile, Swatch};

/// Options for a single extraction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExtractOptions {
    /// Look up a representative product page through the shop's product
    /// feed before capturing
    pub use_product_page: bool,
    /// Hide consent banners, modals and full-screen overlays before capturing
    pub remove_overlays: bool,
}

impl Default for ExtractOptions {
    fn default() -> Self {
        Self {
            use_product_page: true,
            remove_overlays: false,
        }
    }
}

/// Capture configuration shared by the renderer and the extractor
///
/// # Examples
///
/// ```
/// let cfg = storestyle::CaptureConfig::default();
/// assert_eq!(cfg.viewport.width, 1280);
/// assert!(cfg.max_height > cfg.bottom_margin);
/// ```
#[derive(Debug, Clone)]
pub struct CaptureConfig {
    /// User agent string sent by the browser and the feed client
    pub user_agent: String,
    /// Browser window size; the screenshot width is `viewport.width`
    pub viewport: Viewport,
    /// Navigation timeout in milliseconds
    pub timeout_ms: u64,
    /// Screenshots never extend below this many CSS pixels
    pub max_height: u32,
    /// Cut from the bottom of the screenshot to keep footers out
    pub bottom_margin: u32,
    /// Pause after overlay removal, in milliseconds
    pub settle_delay_ms: u64,
    /// Timeout for the product feed request in milliseconds
    pub feed_timeout_ms: u64,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            user_agent: "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0 Safari/537.36".to_string(),
            viewport: Viewport::default(),
            timeout_ms: 30000,
            max_height: 2000,
            bottom_margin: 200,
            settle_delay_ms: 1000,
            feed_timeout_ms: 10000,
        }
    }
}

/// Viewport dimensions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            width: 1280,
            height: 2000,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_options() {
        let opts = ExtractOptions::default();
        assert!(opts.use_product_page);
        assert!(!opts.remove_overlays);
    }

    #[test]
    fn test_default_config() {
        let config = CaptureConfig::default();
        assert_eq!(config.viewport.width, 1280);
        assert_eq!(config.timeout_ms, 30000);
        assert_eq!(config.max_height, 2000);
        assert_eq!(config.bottom_margin, 200);
    }
}
