//! End-to-end extraction against a scripted page

use image::{Rgba, RgbaImage};
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use storestyle::color::Rgb;
use storestyle::dom::{ElementStyle, OverlayRemoval, ThemeDescriptor};
use storestyle::palette::ColorCount;
use storestyle::renderer::{Clip, OpenOptions, PageHandle, PageRenderer, ResourceKind};
use storestyle::theme::THEMES;
use storestyle::{
    ButtonStyle, CaptureConfig, Error, ExtractOptions, ImagePaletteExtractor, PaletteExtractor, Result, StyleExtractor,
};

/// What the scripted page reports
#[derive(Clone, Default)]
struct Scene {
    buttons: Vec<ElementStyle>,
    theme: Option<ThemeDescriptor>,
    selectors: HashMap<String, ElementStyle>,
    background: [u8; 3],
    fail_screenshot: bool,
}

/// Everything the pipeline asked of the renderer
#[derive(Default)]
struct Journal {
    opened: Vec<(String, OpenOptions)>,
    overlay_calls: Vec<(Vec<String>, String, f64)>,
    clips: Vec<Clip>,
    closed: usize,
}

struct ScriptedRenderer {
    scene: Scene,
    journal: Arc<Mutex<Journal>>,
}

struct ScriptedPage {
    scene: Scene,
    journal: Arc<Mutex<Journal>>,
}

impl PageRenderer for ScriptedRenderer {
    type Page = ScriptedPage;

    fn open(&self, url: &str, options: &OpenOptions) -> Result<ScriptedPage> {
        self.journal.lock().unwrap().opened.push((url.to_string(), options.clone()));
        Ok(ScriptedPage { scene: self.scene.clone(), journal: self.journal.clone() })
    }
}

impl PageHandle for ScriptedPage {
    fn evaluate(&self, script: &str) -> Result<Value> {
        Err(Error::ScriptError(format!("unexpected raw evaluation: {}", script)))
    }

    fn screenshot(&self, clip: Clip) -> Result<Vec<u8>> {
        self.journal.lock().unwrap().clips.push(clip);
        if self.scene.fail_screenshot {
            return Err(Error::RenderError("Screenshot failed: target closed".into()));
        }
        let [r, g, b] = self.scene.background;
        let img = RgbaImage::from_pixel(32, 32, Rgba([r, g, b, 255]));
        let mut png = Vec::new();
        img.write_to(&mut std::io::Cursor::new(&mut png), image::ImageFormat::Png)
            .map_err(|e| Error::RenderError(e.to_string()))?;
        Ok(png)
    }

    fn close(self) -> Result<()> {
        self.journal.lock().unwrap().closed += 1;
        Ok(())
    }

    fn button_elements(&self) -> Result<Vec<ElementStyle>> {
        Ok(self.scene.buttons.clone())
    }

    fn query_element_style(&self, selector: &str) -> Result<Option<ElementStyle>> {
        Ok(self.scene.selectors.get(selector).cloned())
    }

    fn theme_descriptor(&self) -> Result<Option<ThemeDescriptor>> {
        Ok(self.scene.theme.clone())
    }

    fn mask_media(&self) -> Result<u32> {
        Ok(0)
    }

    fn remove_overlays(&self, selectors: &[&str], z_index: &str, min_height: f64) -> Result<OverlayRemoval> {
        self.journal.lock().unwrap().overlay_calls.push((
            selectors.iter().map(|s| s.to_string()).collect(),
            z_index.to_string(),
            min_height,
        ));
        Ok(OverlayRemoval { hidden: 1, removed: 1 })
    }

    fn content_height(&self) -> Result<f64> {
        Ok(5000.0)
    }
}

fn button(bg: &str, text: &str) -> ElementStyle {
    ElementStyle {
        background_color: bg.to_string(),
        color: "rgb(255, 255, 255)".to_string(),
        border_width: "0px".to_string(),
        border_color: "rgb(0, 0, 0)".to_string(),
        border_radius: "4px".to_string(),
        text_transform: Some("none".to_string()),
        font_family: "Assistant, sans-serif".to_string(),
        font_weight: "400".to_string(),
        padding: "0px 30px".to_string(),
        display: "inline-flex".to_string(),
        visibility: "visible".to_string(),
        opacity: Some(1.0),
        width: 300.0,
        height: 46.0,
        text: text.to_string(),
        ..Default::default()
    }
}

fn extractor(scene: Scene) -> (StyleExtractor<ScriptedRenderer>, Arc<Mutex<Journal>>) {
    let journal = Arc::new(Mutex::new(Journal::default()));
    let renderer = Arc::new(ScriptedRenderer { scene, journal: journal.clone() });
    let config = CaptureConfig { settle_delay_ms: 0, feed_timeout_ms: 2000, ..Default::default() };
    (StyleExtractor::new(renderer, config).unwrap(), journal)
}

const NO_FEED: ExtractOptions = ExtractOptions { use_product_page: false, remove_overlays: false };

#[tokio::test]
async fn empty_page_gets_the_default_button() {
    let (ex, journal) = extractor(Scene { background: [255, 255, 255], ..Default::default() });
    let profile = ex.extract("https://shop.test", &NO_FEED).await.unwrap();

    assert_eq!(profile.primary_button, ButtonStyle::default());
    assert_eq!(profile.background_color, "#ffffff");
    assert_eq!(profile.palette.len(), 1);
    assert_eq!(profile.palette[0].hex, "#ffffff");

    let j = journal.lock().unwrap();
    assert_eq!(j.closed, 1);
    assert_eq!(j.opened[0].0, "https://shop.test");
    assert_eq!(j.opened[0].1.timeout_ms, 30000);
    assert_eq!(j.opened[0].1.block, vec![ResourceKind::Image, ResourceKind::Media]);
    assert_eq!(j.clips[0], Clip { x: 0.0, y: 0.0, width: 1280.0, height: 1800.0 });
    assert!(j.overlay_calls.is_empty());
}

#[tokio::test]
async fn call_to_action_wins_over_cookie_banner() {
    let scene = Scene {
        buttons: vec![
            button("rgb(0, 0, 0)", "accept cookies"),
            button("rgb(18, 18, 18)", "add to cart"),
            ElementStyle { display: "none".into(), ..button("rgb(0, 0, 0)", "buy now") },
        ],
        background: [255, 255, 255],
        ..Default::default()
    };
    let (ex, _) = extractor(scene);
    let profile = ex.extract("https://shop.test", &NO_FEED).await.unwrap();
    assert_eq!(profile.primary_button.background_color, "rgb(18, 18, 18)");
    assert_eq!(profile.primary_button.font_family, "Assistant, sans-serif");
}

#[tokio::test]
async fn theme_button_overrides_a_better_scored_candidate() {
    let dawn = &THEMES[0];
    let mut selectors = HashMap::new();
    // Invisible and low contrast: would never win on score
    selectors.insert(
        dawn.button_selector.to_string(),
        ElementStyle { display: "none".into(), ..button("rgba(255, 255, 255, 0.1)", "") },
    );
    let scene = Scene {
        buttons: vec![button("rgb(0, 0, 0)", "add to cart")],
        theme: Some(ThemeDescriptor { schema_name: Some(dawn.schema_name.into()), theme_store_id: None }),
        selectors,
        background: [255, 255, 255],
        ..Default::default()
    };
    let (ex, _) = extractor(scene);
    let profile = ex.extract("https://shop.test", &NO_FEED).await.unwrap();
    assert_eq!(profile.primary_button.background_color, "rgba(255, 255, 255, 0.1)");
}

#[tokio::test]
async fn theme_without_selector_match_falls_back_to_scoring() {
    let scene = Scene {
        buttons: vec![button("rgb(0, 0, 0)", "add to cart")],
        theme: Some(ThemeDescriptor { schema_name: None, theme_store_id: Some(THEMES[2].store_id) }),
        background: [255, 255, 255],
        ..Default::default()
    };
    let (ex, _) = extractor(scene);
    let profile = ex.extract("https://shop.test", &NO_FEED).await.unwrap();
    assert_eq!(profile.primary_button.background_color, "rgb(0, 0, 0)");
}

#[tokio::test]
async fn overlays_are_removed_when_requested() {
    let (ex, journal) = extractor(Scene { background: [10, 10, 10], ..Default::default() });
    let opts = ExtractOptions { use_product_page: false, remove_overlays: true };
    let profile = ex.extract("https://shop.test", &opts).await.unwrap();
    assert_eq!(profile.background_color, "#0a0a0a");

    let j = journal.lock().unwrap();
    assert_eq!(j.overlay_calls.len(), 1);
    let (selectors, z_index, min_height) = &j.overlay_calls[0];
    assert!(!selectors.is_empty());
    assert_eq!(z_index, "9999");
    assert_eq!(*min_height, 100.0);
}

#[derive(Default)]
struct PaletteCalls {
    separate: AtomicUsize,
    analyze: AtomicUsize,
}

/// Delegates to the image extractor, counting which entry points were used
struct CountingPalette {
    inner: ImagePaletteExtractor,
    calls: Arc<PaletteCalls>,
}

impl PaletteExtractor for CountingPalette {
    fn palette(&self, image: &Path) -> Result<BTreeMap<String, ColorCount>> {
        self.calls.separate.fetch_add(1, Ordering::SeqCst);
        self.inner.palette(image)
    }

    fn dominant_color(&self, image: &Path) -> Result<Rgb> {
        self.calls.separate.fetch_add(1, Ordering::SeqCst);
        self.inner.dominant_color(image)
    }

    fn analyze(&self, image: &Path) -> Result<(BTreeMap<String, ColorCount>, Rgb)> {
        self.calls.analyze.fetch_add(1, Ordering::SeqCst);
        self.inner.analyze(image)
    }
}

#[tokio::test]
async fn screenshot_is_analyzed_once_per_extraction() {
    let calls = Arc::new(PaletteCalls::default());
    let (ex, _) = extractor(Scene { background: [40, 80, 120], ..Default::default() });
    let ex = ex.with_palette_extractor(CountingPalette { inner: ImagePaletteExtractor::default(), calls: calls.clone() });

    let profile = ex.extract("https://shop.test", &NO_FEED).await.unwrap();
    assert_eq!(profile.background_color, "#285078");
    assert_eq!(calls.analyze.load(Ordering::SeqCst), 1);
    assert_eq!(calls.separate.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn screenshot_failure_propagates_and_still_closes_the_page() {
    let (ex, journal) = extractor(Scene { fail_screenshot: true, ..Default::default() });
    let res = ex.extract("https://shop.test", &NO_FEED).await;
    assert!(matches!(res, Err(Error::RenderError(_))));
    assert_eq!(journal.lock().unwrap().closed, 1);
}

/// Serve `status`/`body` for every request on an ephemeral port
fn serve_feed(status: u16, body: String) -> String {
    let server = tiny_http::Server::http("127.0.0.1:0").unwrap();
    let addr = server.server_addr();
    std::thread::spawn(move || {
        for request in server.incoming_requests() {
            let response = tiny_http::Response::from_string(body.clone())
                .with_status_code(status)
                .with_header("Content-Type: application/json".parse::<tiny_http::Header>().unwrap());
            let _ = request.respond(response);
        }
    });
    format!("http://{}", addr)
}

#[tokio::test]
async fn product_page_from_feed_is_captured() {
    let now = chrono::Utc::now();
    let body = serde_json::json!({ "products": [
        { "handle": "new-arrival", "images": [{"src": "x.jpg"}], "published_at": (now - chrono::Duration::days(1)).to_rfc3339() },
        { "handle": "best-seller", "images": [{"src": "y.jpg"}], "published_at": (now - chrono::Duration::days(40)).to_rfc3339() },
    ]})
    .to_string();
    let shop = serve_feed(200, body);

    let (ex, journal) = extractor(Scene { background: [255, 255, 255], ..Default::default() });
    ex.extract(&shop, &ExtractOptions::default()).await.unwrap();
    assert_eq!(journal.lock().unwrap().opened[0].0, format!("{}/products/best-seller", shop));
}

#[tokio::test]
async fn feed_failure_captures_the_original_url() {
    let shop = serve_feed(404, "not found".to_string());
    let (ex, journal) = extractor(Scene { background: [255, 255, 255], ..Default::default() });
    ex.extract(&shop, &ExtractOptions::default()).await.unwrap();
    assert_eq!(journal.lock().unwrap().opened[0].0, shop);
}
