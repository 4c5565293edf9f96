//! Page-side computations and the records they return.
//!
//! Every script is the body of a function receiving a single `args` object,
//! serialized from Rust, with the shared `readElementStyle` helper in scope.
//! Scripts return `JSON.stringify(..)` so the result crosses the evaluation
//! boundary as a single string regardless of backend.

use crate::{Error, Result};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};

const ELEMENT_STYLE_JS: &str = include_str!("js/element_style.js");
const BUTTONS_JS: &str = include_str!("js/buttons.js");
const QUERY_STYLE_JS: &str = include_str!("js/query_style.js");
const THEME_DESCRIPTOR_JS: &str = include_str!("js/theme_descriptor.js");
const MASK_MEDIA_JS: &str = include_str!("js/mask_media.js");
const HIDE_OVERLAYS_JS: &str = include_str!("js/hide_overlays.js");
const CONTENT_HEIGHT_JS: &str = include_str!("js/content_height.js");

/// Elements considered as call-to-action candidates
pub const BUTTON_SELECTOR: &str = r#"button, a[class*="btn"], a[class*="button"], [role="button"]"#;

/// Computed style and geometry of one element, as read by the page.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ElementStyle {
    pub background_color: String,
    pub color: String,
    pub border_style: Option<String>,
    pub border_width: String,
    pub border_color: String,
    pub border_radius: String,
    pub text_transform: Option<String>,
    pub font_family: String,
    pub font_weight: String,
    pub padding: String,
    pub display: String,
    pub visibility: String,
    /// `None` when the page reported a non-numeric opacity
    pub opacity: Option<f64>,
    pub width: f64,
    pub height: f64,
    pub text: String,
}

/// The page-global storefront theme descriptor, both halves optional
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ThemeDescriptor {
    pub schema_name: Option<String>,
    pub theme_store_id: Option<u64>,
}

/// Counts reported by the overlay removal command
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(default)]
pub struct OverlayRemoval {
    pub hidden: u32,
    pub removed: u32,
}

fn build(body: &str, args: Value) -> String {
    format!(
        "(function(args){{\n{}\n{}\n}})({})",
        ELEMENT_STYLE_JS, body, args
    )
}

pub fn buttons_script() -> String {
    build(BUTTONS_JS, json!({ "selector": BUTTON_SELECTOR }))
}

pub fn query_style_script(selector: &str) -> String {
    build(QUERY_STYLE_JS, json!({ "selector": selector }))
}

pub fn theme_descriptor_script() -> String {
    build(THEME_DESCRIPTOR_JS, json!({}))
}

pub fn mask_media_script() -> String {
    build(MASK_MEDIA_JS, json!({}))
}

pub fn hide_overlays_script(selectors: &[&str], z_index: &str, min_height: f64) -> String {
    build(
        HIDE_OVERLAYS_JS,
        json!({ "selectors": selectors, "zIndex": z_index, "minHeight": min_height }),
    )
}

pub fn content_height_script() -> String {
    build(CONTENT_HEIGHT_JS, json!({}))
}

/// Decode an evaluation result. Backends may hand back the stringified JSON
/// or an already-parsed value; both are accepted.
pub fn decode<T: DeserializeOwned>(value: Value) -> Result<T> {
    let parsed = match value {
        Value::String(s) => serde_json::from_str::<Value>(&s)
            .map_err(|e| Error::ScriptError(format!("Malformed page result: {}", e)))?,
        other => other,
    };
    serde_json::from_value(parsed)
        .map_err(|e| Error::ScriptError(format!("Unexpected page result shape: {}", e)))
}
