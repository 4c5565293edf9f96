//! Output data model: the style profile and its button style.

use serde::{Deserialize, Serialize};

/// Visual styling of a button, as computed CSS values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ButtonStyle {
    pub background_color: String,
    pub text_color: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub border_style: Option<String>,
    pub border_width: String,
    pub border_color: String,
    pub border_radius: String,
    pub text_transform: String,
    pub font_family: String,
    pub font_weight: String,
    pub padding: String,
}

impl Default for ButtonStyle {
    /// Black button with white text and no border, used when the page
    /// offers nothing better.
    fn default() -> Self {
        Self {
            background_color: "#000000".to_string(),
            text_color: "#ffffff".to_string(),
            border_style: None,
            border_width: "0px".to_string(),
            border_color: "transparent".to_string(),
            border_radius: "0px".to_string(),
            text_transform: "none".to_string(),
            font_family: "system-ui, -apple-system, sans-serif".to_string(),
            font_weight: "400".to_string(),
            padding: "12px 24px".to_string(),
        }
    }
}

/// Rendered size of an element in device pixels
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct BoundingRect {
    pub width: f64,
    pub height: f64,
}

/// A button found on the page, with the extra data needed to score it.
///
/// The rect and text are only meaningful while scoring; [`Candidate::into_style`]
/// drops them.
#[derive(Debug, Clone, PartialEq)]
pub struct Candidate {
    pub style: ButtonStyle,
    pub bounding_rect: BoundingRect,
    /// Trimmed, lowercased text content
    pub text_content: String,
}

impl Candidate {
    pub fn into_style(self) -> ButtonStyle {
        self.style
    }
}

/// A named palette color and how many pixels it accounts for
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Swatch {
    pub name: String,
    pub hex: String,
    pub population: u64,
}

/// Where the primary button of a profile came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ButtonSource {
    Theme,
    Scored,
    Default,
}

/// The extracted style of a storefront page
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StyleProfile {
    /// Most populous swatch first
    pub palette: Vec<Swatch>,
    pub background_color: String,
    pub primary_button: ButtonStyle,
}
