//! Style assembly: drives capture, palette extraction, candidate scoring and
//! theme resolution for one URL and merges them into a [`StyleProfile`].

use crate::async_api::Page;
use crate::color::Rgb;
use crate::palette::{self, ColorCount, ImagePaletteExtractor, PaletteExtractor};
use crate::renderer::{OpenOptions, PageRenderer};
use crate::style::{ButtonSource, ButtonStyle, Candidate, StyleProfile};
use crate::{capture, collector, product, scorer, theme};
use crate::{CaptureConfig, Error, ExtractOptions, Result};
use chrono::Utc;
use log::{debug, info, warn};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

/// Pick the primary button: the theme override if any, else the best scored
/// candidate, else the default style.
pub fn choose_button(
    theme_button: Option<ButtonStyle>,
    candidates: &[Candidate],
    background: Rgb,
) -> (ButtonStyle, ButtonSource) {
    if let Some(style) = theme_button {
        return (style, ButtonSource::Theme);
    }
    match scorer::select_best(candidates, background) {
        Some((winner, score)) => {
            debug!("best of {} candidates scored {:.2} ('{}')", candidates.len(), score, winner.text_content);
            (winner.style.clone(), ButtonSource::Scored)
        }
        None => (ButtonStyle::default(), ButtonSource::Default),
    }
}

/// Extracts style profiles, reusing one renderer and one HTTP client.
pub struct StyleExtractor<R: PageRenderer, P: PaletteExtractor = ImagePaletteExtractor> {
    renderer: Arc<R>,
    palette: Arc<P>,
    client: reqwest::Client,
    config: CaptureConfig,
}

impl<R: PageRenderer> StyleExtractor<R, ImagePaletteExtractor> {
    pub fn new(renderer: Arc<R>, config: CaptureConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(config.feed_timeout_ms))
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|e| Error::InitializationError(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            renderer,
            palette: Arc::new(ImagePaletteExtractor::default()),
            client,
            config,
        })
    }
}

impl<R: PageRenderer, P: PaletteExtractor> StyleExtractor<R, P> {
    /// Replace the palette extractor
    pub fn with_palette_extractor<Q: PaletteExtractor>(self, palette: Q) -> StyleExtractor<R, Q> {
        StyleExtractor {
            renderer: self.renderer,
            palette: Arc::new(palette),
            client: self.client,
            config: self.config,
        }
    }

    /// Extract the style profile of `url`.
    ///
    /// The page opened for the extraction is closed on every exit path.
    pub async fn extract(&self, url: &str, options: &ExtractOptions) -> Result<StyleProfile> {
        let target = if options.use_product_page {
            product::resolve_target_url(&self.client, url, Utc::now()).await
        } else {
            url.to_string()
        };
        debug!("extracting styles from {}", target);

        let open = OpenOptions {
            timeout_ms: self.config.timeout_ms,
            block: capture::BLOCKED_RESOURCES.to_vec(),
        };
        let page = Page::open(self.renderer.clone(), &target, open).await?;

        let result = self.extract_from(&page, options).await;
        if let Err(e) = page.close().await {
            warn!("Failed to close page for {}: {}", target, e);
        }
        result
    }

    async fn extract_from(&self, page: &Page, options: &ExtractOptions) -> Result<StyleProfile> {
        let screenshot = capture::capture(page, options, &self.config).await?;
        let path = screenshot.path().to_path_buf();

        let colors = run_blocking(self.palette.clone(), path, |p, path| p.analyze(path));
        let page_side = async { futures::try_join!(collector::collect(page), theme::resolve(page)) };

        let ((swatches, dominant), (candidates, theme_button)) = futures::try_join!(colors, page_side)?;
        drop(screenshot);

        let (primary_button, source) = choose_button(theme_button, &candidates, dominant);
        info!("primary button from {:?} source", source);

        Ok(assemble(swatches, dominant, primary_button))
    }
}

fn assemble(swatches: BTreeMap<String, ColorCount>, background: Rgb, primary_button: ButtonStyle) -> StyleProfile {
    StyleProfile {
        palette: palette::rank(swatches),
        background_color: background.to_hex(),
        primary_button,
    }
}

async fn run_blocking<P, T, F>(extractor: Arc<P>, path: PathBuf, f: F) -> Result<T>
where
    P: PaletteExtractor,
    T: Send + 'static,
    F: FnOnce(&P, &Path) -> Result<T> + Send + 'static,
{
    tokio::task::spawn_blocking(move || f(&extractor, &path))
        .await
        .map_err(|e| Error::PaletteError(format!("Palette task failed: {}", e)))?
}

/// Extract the style profile of `url` with the default capture configuration
/// and palette extractor.
pub async fn extract_styles<R: PageRenderer>(
    renderer: Arc<R>,
    url: &str,
    options: &ExtractOptions,
) -> Result<StyleProfile> {
    StyleExtractor::new(renderer, CaptureConfig::default())?
        .extract(url, options)
        .await
}
