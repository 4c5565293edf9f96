//! Candidate collection: visible button-like elements and their styles.

use crate::async_api::Page;
use crate::dom::ElementStyle;
use crate::style::{BoundingRect, ButtonStyle, Candidate};
use crate::Result;

/// Whether the element is actually rendered.
pub fn is_visible(el: &ElementStyle) -> bool {
    el.display != "none"
        && el.visibility != "hidden"
        && el.opacity.unwrap_or(1.0) > 0.0
        && el.width > 0.0
        && el.height > 0.0
}

/// Convert a page record into a candidate. Text is trimmed and lowercased,
/// text-transform lowercased with a default of `none`.
pub fn to_candidate(el: ElementStyle) -> Candidate {
    let text_transform = el
        .text_transform
        .map(|t| t.trim().to_lowercase())
        .filter(|t| !t.is_empty())
        .unwrap_or_else(|| "none".to_string());

    Candidate {
        style: ButtonStyle {
            background_color: el.background_color,
            text_color: el.color,
            border_style: el.border_style.filter(|s| !s.is_empty()),
            border_width: el.border_width,
            border_color: el.border_color,
            border_radius: el.border_radius,
            text_transform,
            font_family: el.font_family,
            font_weight: el.font_weight,
            padding: el.padding,
        },
        bounding_rect: BoundingRect { width: el.width, height: el.height },
        text_content: el.text.trim().to_lowercase(),
    }
}

/// Keep visible elements, in discovery order, as candidates.
pub fn candidates_from(elements: Vec<ElementStyle>) -> Vec<Candidate> {
    elements.into_iter().filter(is_visible).map(to_candidate).collect()
}

/// Collect the visible call-to-action candidates on `page`.
pub async fn collect(page: &Page) -> Result<Vec<Candidate>> {
    let elements = page.button_elements().await?;
    let total = elements.len();
    let candidates = candidates_from(elements);
    log::debug!("{} of {} button elements are visible", candidates.len(), total);
    Ok(candidates)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn visible(text: &str) -> ElementStyle {
        ElementStyle {
            background_color: "rgb(0, 0, 0)".into(),
            color: "rgb(255, 255, 255)".into(),
            display: "inline-block".into(),
            visibility: "visible".into(),
            opacity: Some(1.0),
            width: 150.0,
            height: 44.0,
            text: text.into(),
            ..Default::default()
        }
    }

    #[test]
    fn hidden_elements_are_dropped() {
        let elements = vec![
            ElementStyle { display: "none".into(), ..visible("a") },
            ElementStyle { visibility: "hidden".into(), ..visible("b") },
            ElementStyle { opacity: Some(0.0), ..visible("c") },
            ElementStyle { width: 0.0, ..visible("d") },
            ElementStyle { height: 0.0, ..visible("e") },
            visible("kept"),
        ];
        let out = candidates_from(elements);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].text_content, "kept");
    }

    #[test]
    fn non_numeric_opacity_counts_as_visible() {
        assert!(is_visible(&ElementStyle { opacity: None, ..visible("x") }));
    }

    #[test]
    fn discovery_order_is_preserved() {
        let out = candidates_from(vec![visible("first"), visible("second"), visible("third")]);
        let texts: Vec<_> = out.iter().map(|c| c.text_content.as_str()).collect();
        assert_eq!(texts, ["first", "second", "third"]);
    }

    #[test]
    fn text_and_transform_are_normalized() {
        let c = to_candidate(ElementStyle {
            text_transform: Some("UPPERCASE".into()),
            border_style: Some(String::new()),
            ..visible("  Add To Cart \n")
        });
        assert_eq!(c.text_content, "add to cart");
        assert_eq!(c.style.text_transform, "uppercase");
        assert_eq!(c.style.border_style, None);
        assert_eq!(c.bounding_rect, BoundingRect { width: 150.0, height: 44.0 });

        let c = to_candidate(visible("x"));
        assert_eq!(c.style.text_transform, "none");
        assert_eq!(c.style.text_color, "rgb(255, 255, 255)");
    }
}
