//! Primary call-to-action scoring.
//!
//! Each candidate starts at [`REJECT`] and accumulates points for contrast
//! against the page background, call-to-action wording and size. Candidates
//! whose own background is (nearly) transparent are rejected outright.

use crate::color::{self, Rgb, WHITE};
use crate::style::Candidate;

/// Score of a rejected candidate, and the floor a winner must beat
pub const REJECT: f64 = -1.0;

/// Backgrounds less opaque than this are not real button fills
pub const MIN_ALPHA: f64 = 0.3;

const CONTRAST_WEIGHT: f64 = 3.0;

pub const PRIMARY_PHRASES: &[&str] = &[
    "add to cart",
    "add to bag",
    "buy now",
    "checkout",
    "subscribe",
    "shop now",
    "get started",
    "order now",
];
pub const SECONDARY_PHRASES: &[&str] = &["add to wishlist"];
pub const COOKIE_PHRASES: &[&str] = &["accept cookies", "accept all"];

const PRIMARY_BONUS: f64 = 25.0;
const SECONDARY_BONUS: f64 = 15.0;
const COOKIE_PENALTY: f64 = -20.0;

const MIN_WIDTH: f64 = 120.0;
const MIN_HEIGHT: f64 = 35.0;
const SIZE_BONUS: f64 = 5.0;

const MIN_TEXT_LEN: usize = 3;
const SHORT_TEXT_PENALTY: f64 = -5.0;

/// The candidate's own fill as an opaque color, or `None` if it should be
/// rejected. Unrecognized values are treated as white.
pub fn resolve_background(value: &str) -> Option<Rgb> {
    let value = value.trim();
    if let Some(rgba) = color::try_parse_rgb(value) {
        if rgba.a < MIN_ALPHA {
            return None;
        }
        return Some(rgba.rgb());
    }
    if color::is_hex_color(value) {
        return color::parse_hex_color(value);
    }
    if value.eq_ignore_ascii_case("transparent") || value.replace(' ', "") == "rgba(0,0,0,0)" {
        return None;
    }
    Some(WHITE)
}

fn keyword_score(text: &str) -> f64 {
    let text = text.trim().to_lowercase();
    let has_any = |phrases: &[&str]| phrases.iter().any(|p| text.contains(p));

    if has_any(PRIMARY_PHRASES) {
        PRIMARY_BONUS
    } else if has_any(SECONDARY_PHRASES) {
        SECONDARY_BONUS
    } else if has_any(COOKIE_PHRASES) {
        COOKIE_PENALTY
    } else {
        0.0
    }
}

/// Score `candidate` against the page `background`. Higher is better;
/// [`REJECT`] means the candidate cannot win.
pub fn score(candidate: &Candidate, background: Rgb) -> f64 {
    let fill = match resolve_background(&candidate.style.background_color) {
        Some(c) => c,
        None => return REJECT,
    };

    let mut score = REJECT;
    score += CONTRAST_WEIGHT * color::contrast_ratio(fill, background);
    score += keyword_score(&candidate.text_content);

    let rect = candidate.bounding_rect;
    if rect.width > MIN_WIDTH && rect.height > MIN_HEIGHT {
        score += SIZE_BONUS;
    }

    if candidate.text_content.trim().chars().count() < MIN_TEXT_LEN {
        score += SHORT_TEXT_PENALTY;
    }

    score
}

/// The highest scoring candidate above [`REJECT`]. Ties keep the earliest.
pub fn select_best(candidates: &[Candidate], background: Rgb) -> Option<(&Candidate, f64)> {
    let mut best: Option<(&Candidate, f64)> = None;
    let mut best_score = REJECT;

    for candidate in candidates {
        let s = score(candidate, background);
        if s > best_score {
            best_score = s;
            best = Some((candidate, s));
        }
    }
    best
}
