//! The page rendering capability the pipeline drives.
//!
//! A [`PageRenderer`] opens isolated pages; a [`PageHandle`] runs page-side
//! computations, takes screenshots and is closed when the extraction is done.
//! Backends only have to provide `evaluate`, `screenshot` and `close`: the
//! typed page commands have default implementations built on `evaluate`.

use crate::dom::{self, ElementStyle, OverlayRemoval, ThemeDescriptor};
use crate::Result;

/// Request categories that can be blocked while a page loads
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    Image,
    Media,
}

/// Options for opening a page. `open` returns once the DOM is parsed;
/// subresources may still be loading.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpenOptions {
    /// Navigation timeout in milliseconds
    pub timeout_ms: u64,
    /// Requests of these kinds are failed before they hit the network
    pub block: Vec<ResourceKind>,
}

impl Default for OpenOptions {
    fn default() -> Self {
        Self {
            timeout_ms: 30000,
            block: Vec::new(),
        }
    }
}

/// A screenshot region in CSS pixels, relative to the top of the document
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Clip {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

/// Opens pages. Implementations are expected to be reused across many
/// extractions; each `open` yields an independent page.
pub trait PageRenderer: Send + Sync + 'static {
    type Page: PageHandle + Send + 'static;

    /// Open `url` in a fresh page and wait until its DOM content is loaded
    fn open(&self, url: &str, options: &OpenOptions) -> Result<Self::Page>;
}

/// A live page.
pub trait PageHandle {
    /// Evaluate a script expression in the page and return its value
    fn evaluate(&self, script: &str) -> Result<serde_json::Value>;

    /// Capture `clip` as PNG bytes
    fn screenshot(&self, clip: Clip) -> Result<Vec<u8>>;

    /// Release the page
    fn close(self) -> Result<()>
    where
        Self: Sized;

    // --- Typed page commands (default implementations) ---

    /// Style records for every element matching [`dom::BUTTON_SELECTOR`], in
    /// document order. Not filtered for visibility.
    fn button_elements(&self) -> Result<Vec<ElementStyle>> {
        dom::decode(self.evaluate(&dom::buttons_script())?)
    }

    /// Style record of the first element matching `selector`
    fn query_element_style(&self, selector: &str) -> Result<Option<ElementStyle>> {
        dom::decode(self.evaluate(&dom::query_style_script(selector))?)
    }

    /// The storefront theme descriptor, if the page exposes one
    fn theme_descriptor(&self) -> Result<Option<ThemeDescriptor>> {
        dom::decode(self.evaluate(&dom::theme_descriptor_script())?)
    }

    /// Make already-loaded images, videos and background images invisible.
    /// Returns the number of elements touched.
    fn mask_media(&self) -> Result<u32> {
        dom::decode(self.evaluate(&dom::mask_media_script())?)
    }

    /// Hide elements matching `selectors` and remove fixed-position direct
    /// children of `<body>` with the given z-index that are taller than
    /// `min_height`.
    fn remove_overlays(&self, selectors: &[&str], z_index: &str, min_height: f64) -> Result<OverlayRemoval> {
        dom::decode(self.evaluate(&dom::hide_overlays_script(selectors, z_index, min_height))?)
    }

    /// Full scrollable height of the document in CSS pixels
    fn content_height(&self) -> Result<f64> {
        dom::decode(self.evaluate(&dom::content_height_script())?)
    }
}
