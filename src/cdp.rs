//! Chrome DevTools Protocol renderer (uses the `headless_chrome` crate)

use crate::renderer::{Clip, OpenOptions, PageHandle, PageRenderer, ResourceKind};
use crate::{CaptureConfig, Error, Result};
use headless_chrome::browser::tab::{RequestInterceptor, RequestPausedDecision, Tab};
use headless_chrome::protocol::cdp::Fetch::events::RequestPausedEvent;
use headless_chrome::protocol::cdp::Fetch::FailRequest;
use headless_chrome::protocol::cdp::Network::{ErrorReason, ResourceType};
use headless_chrome::protocol::cdp::Page;
use headless_chrome::{Browser, LaunchOptions};
use log::{debug, warn};
use std::sync::Arc;
use std::time::{Duration, Instant};

const READY_POLL: Duration = Duration::from_millis(100);

/// A headless Chrome instance shared by every page it opens.
///
/// Launching Chrome is expensive; keep one renderer around and open a page
/// per extraction.
pub struct CdpRenderer {
    browser: Browser,
    config: CaptureConfig,
}

/// One Chrome tab
pub struct CdpPage {
    tab: Arc<Tab>,
}

impl CdpRenderer {
    /// Launch headless Chrome sized to the configured viewport
    pub fn launch(config: CaptureConfig) -> Result<Self> {
        let launch_options = LaunchOptions::default_builder()
            .headless(true)
            .window_size(Some((config.viewport.width, config.viewport.height)))
            .build()
            .map_err(|e| Error::InitializationError(format!("Failed to build launch options: {}", e)))?;

        let browser = Browser::new(launch_options)
            .map_err(|e| Error::InitializationError(format!("Failed to launch browser: {}", e)))?;

        Ok(Self { browser, config })
    }
}

impl PageRenderer for CdpRenderer {
    type Page = CdpPage;

    fn open(&self, url: &str, options: &OpenOptions) -> Result<CdpPage> {
        let tab = self
            .browser
            .new_tab()
            .map_err(|e| Error::InitializationError(format!("Failed to create tab: {}", e)))?;
        let page = CdpPage { tab };

        match page.prepare_and_navigate(url, options, &self.config.user_agent) {
            Ok(()) => Ok(page),
            Err(e) => {
                if let Err(close_err) = page.close() {
                    warn!("Failed to close tab after load error: {}", close_err);
                }
                Err(e)
            }
        }
    }
}

fn is_blocked(blocked: &[ResourceKind], resource_type: &ResourceType) -> bool {
    blocked.iter().any(|kind| {
        matches!(
            (kind, resource_type),
            (ResourceKind::Image, ResourceType::Image) | (ResourceKind::Media, ResourceType::Media)
        )
    })
}

impl CdpPage {
    fn prepare_and_navigate(&self, url: &str, options: &OpenOptions, user_agent: &str) -> Result<()> {
        self.tab.set_default_timeout(Duration::from_millis(options.timeout_ms));

        self.tab
            .set_user_agent(user_agent, None, None)
            .map_err(|e| Error::InitializationError(format!("Failed to set user agent: {}", e)))?;

        if !options.block.is_empty() {
            self.block_requests(options.block.clone())?;
        }

        self.tab
            .navigate_to(url)
            .map_err(|e| Error::LoadError(format!("Navigation to {} failed: {}", url, e)))?;

        self.wait_for_dom(options.timeout_ms)?;
        debug!("loaded {}", url);
        Ok(())
    }

    /// Fail requests of the given kinds before they are sent
    fn block_requests(&self, blocked: Vec<ResourceKind>) -> Result<()> {
        self.tab
            .enable_fetch(None, Some(false))
            .map_err(|e| Error::InitializationError(format!("Failed to enable fetch domain: {}", e)))?;

        let interceptor: Arc<dyn RequestInterceptor + Send + Sync> = Arc::new(
            move |_transport, _session_id, event: RequestPausedEvent| {
                if is_blocked(&blocked, &event.params.resource_Type) {
                    RequestPausedDecision::Fail(FailRequest {
                        request_id: event.params.request_id,
                        error_reason: ErrorReason::BlockedByClient,
                    })
                } else {
                    RequestPausedDecision::Continue(None)
                }
            },
        );

        self.tab
            .enable_request_interception(interceptor)
            .map_err(|e| Error::InitializationError(format!("Failed to enable request interception: {}", e)))?;
        Ok(())
    }

    /// Poll until the new document has been parsed
    fn wait_for_dom(&self, timeout_ms: u64) -> Result<()> {
        let deadline = Instant::now() + Duration::from_millis(timeout_ms);
        loop {
            let state = self
                .tab
                .evaluate("JSON.stringify([location.href, document.readyState])", false)
                .ok()
                .and_then(|obj| obj.value)
                .and_then(|v| v.as_str().and_then(|s| serde_json::from_str::<(String, String)>(s).ok()));

            if let Some((href, ready)) = state {
                if href != "about:blank" && ready != "loading" {
                    return Ok(());
                }
            }
            if Instant::now() >= deadline {
                return Err(Error::Timeout(timeout_ms));
            }
            std::thread::sleep(READY_POLL);
        }
    }
}

impl PageHandle for CdpPage {
    fn evaluate(&self, script: &str) -> Result<serde_json::Value> {
        let result = self
            .tab
            .evaluate(script, false)
            .map_err(|e| Error::ScriptError(format!("Evaluation failed: {}", e)))?;
        Ok(result.value.unwrap_or(serde_json::Value::Null))
    }

    fn screenshot(&self, clip: Clip) -> Result<Vec<u8>> {
        let viewport = Page::Viewport {
            x: clip.x,
            y: clip.y,
            width: clip.width,
            height: clip.height,
            scale: 1.0,
        };
        self.tab
            .capture_screenshot(Page::CaptureScreenshotFormatOption::Png, None, Some(viewport), true)
            .map_err(|e| Error::RenderError(format!("Screenshot failed: {}", e)))
    }

    fn close(self) -> Result<()> {
        self.tab.close(true)?;
        Ok(())
    }
}
