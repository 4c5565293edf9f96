//! Palette and dominant color extraction from a captured screenshot.

use crate::color::Rgb;
use crate::style::Swatch;
use crate::{Error, Result};
use ::palette::{Hsl, IntoColor, Srgb};
use std::collections::{BTreeMap, HashMap};
use std::path::Path;

/// A color and the number of sampled pixels it stands for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColorCount {
    pub rgb: Rgb,
    pub population: u64,
}

/// Derives colors from an image on disk.
pub trait PaletteExtractor: Send + Sync + 'static {
    /// Named swatches found in the image
    fn palette(&self, image: &Path) -> Result<BTreeMap<String, ColorCount>>;

    /// The single most common color of the image
    fn dominant_color(&self, image: &Path) -> Result<Rgb>;

    /// Swatches and dominant color together. Implementations that can share
    /// one decode of the image should override this.
    fn analyze(&self, image: &Path) -> Result<(BTreeMap<String, ColorCount>, Rgb)> {
        Ok((self.palette(image)?, self.dominant_color(image)?))
    }
}

/// Order swatches most populous first. Equal populations keep name order.
pub fn rank(swatches: BTreeMap<String, ColorCount>) -> Vec<Swatch> {
    let mut ranked: Vec<Swatch> = swatches
        .into_iter()
        .map(|(name, c)| Swatch { name, hex: c.rgb.to_hex(), population: c.population })
        .collect();
    ranked.sort_by(|a, b| b.population.cmp(&a.population));
    ranked
}

struct Target {
    name: &'static str,
    min_luma: f64,
    target_luma: f64,
    max_luma: f64,
    min_sat: f64,
    target_sat: f64,
    max_sat: f64,
}

const TARGETS: [Target; 6] = [
    Target { name: "Vibrant", min_luma: 0.3, target_luma: 0.5, max_luma: 0.7, min_sat: 0.35, target_sat: 1.0, max_sat: 1.0 },
    Target { name: "LightVibrant", min_luma: 0.55, target_luma: 0.74, max_luma: 1.0, min_sat: 0.35, target_sat: 1.0, max_sat: 1.0 },
    Target { name: "DarkVibrant", min_luma: 0.0, target_luma: 0.26, max_luma: 0.45, min_sat: 0.35, target_sat: 1.0, max_sat: 1.0 },
    Target { name: "Muted", min_luma: 0.3, target_luma: 0.5, max_luma: 0.7, min_sat: 0.0, target_sat: 0.3, max_sat: 0.4 },
    Target { name: "LightMuted", min_luma: 0.55, target_luma: 0.74, max_luma: 1.0, min_sat: 0.0, target_sat: 0.3, max_sat: 0.4 },
    Target { name: "DarkMuted", min_luma: 0.0, target_luma: 0.26, max_luma: 0.45, min_sat: 0.0, target_sat: 0.3, max_sat: 0.4 },
];

const WEIGHT_SAT: f64 = 3.0;
const WEIGHT_LUMA: f64 = 6.5;
const WEIGHT_POPULATION: f64 = 0.5;

/// Pixels more transparent than this are ignored
const MIN_PIXEL_ALPHA: u8 = 125;

/// Quantizing extractor built on the `image` crate.
///
/// Pixels are bucketed at 5 bits per channel; each bucket is represented by
/// the average of its pixels. Swatches are chosen per target by closeness
/// in saturation and lightness, weighted by population.
#[derive(Debug, Clone)]
pub struct ImagePaletteExtractor {
    /// Sample every `quality`-th pixel (1 = every pixel)
    pub quality: usize,
}

impl Default for ImagePaletteExtractor {
    fn default() -> Self {
        Self { quality: 5 }
    }
}

#[derive(Default)]
struct Bucket {
    r: u64,
    g: u64,
    b: u64,
    count: u64,
}

impl ImagePaletteExtractor {
    /// Quantized colors of the image, most populous first
    pub fn histogram(&self, image: &Path) -> Result<Vec<ColorCount>> {
        let img = image::open(image)
            .map_err(|e| Error::PaletteError(format!("Failed to decode {}: {}", image.display(), e)))?
            .to_rgba8();

        let step = self.quality.max(1);
        let mut buckets: HashMap<(u8, u8, u8), Bucket> = HashMap::new();
        for px in img.pixels().step_by(step) {
            let [r, g, b, a] = px.0;
            if a < MIN_PIXEL_ALPHA {
                continue;
            }
            let bucket = buckets.entry((r >> 3, g >> 3, b >> 3)).or_default();
            bucket.r += r as u64;
            bucket.g += g as u64;
            bucket.b += b as u64;
            bucket.count += 1;
        }

        let mut colors: Vec<((u8, u8, u8), ColorCount)> = buckets
            .into_iter()
            .map(|(key, b)| {
                let avg = |sum: u64| (sum / b.count) as u8;
                (key, ColorCount { rgb: Rgb::new(avg(b.r), avg(b.g), avg(b.b)), population: b.count })
            })
            .collect();
        colors.sort_by(|(ka, a), (kb, b)| b.population.cmp(&a.population).then(ka.cmp(kb)));
        Ok(colors.into_iter().map(|(_, c)| c).collect())
    }
}

impl PaletteExtractor for ImagePaletteExtractor {
    fn palette(&self, image: &Path) -> Result<BTreeMap<String, ColorCount>> {
        Ok(select_swatches(&self.histogram(image)?))
    }

    fn dominant_color(&self, image: &Path) -> Result<Rgb> {
        dominant(&self.histogram(image)?, image)
    }

    fn analyze(&self, image: &Path) -> Result<(BTreeMap<String, ColorCount>, Rgb)> {
        let colors = self.histogram(image)?;
        let most_common = dominant(&colors, image)?;
        Ok((select_swatches(&colors), most_common))
    }
}

fn dominant(colors: &[ColorCount], image: &Path) -> Result<Rgb> {
    colors
        .first()
        .map(|c| c.rgb)
        .ok_or_else(|| Error::PaletteError(format!("No opaque pixels in {}", image.display())))
}

/// Pick one color per target from a histogram; a color is used at most once.
fn select_swatches(colors: &[ColorCount]) -> BTreeMap<String, ColorCount> {
    let max_population = colors.iter().map(|c| c.population).max().unwrap_or(1).max(1) as f64;
    let hsl: Vec<(f64, f64)> = colors.iter().map(|c| saturation_lightness(c.rgb)).collect();
    let mut used = vec![false; colors.len()];
    let mut out = BTreeMap::new();

    for target in &TARGETS {
        let mut best: Option<(usize, f64)> = None;
        for (i, (sat, luma)) in hsl.iter().copied().enumerate() {
            if used[i]
                || sat < target.min_sat
                || sat > target.max_sat
                || luma < target.min_luma
                || luma > target.max_luma
            {
                continue;
            }
            let value = WEIGHT_SAT * (1.0 - (sat - target.target_sat).abs())
                + WEIGHT_LUMA * (1.0 - (luma - target.target_luma).abs())
                + WEIGHT_POPULATION * (colors[i].population as f64 / max_population);
            if best.map_or(true, |(_, v)| value > v) {
                best = Some((i, value));
            }
        }
        if let Some((i, _)) = best {
            used[i] = true;
            out.insert(target.name.to_string(), colors[i]);
        }
    }
    out
}

/// HSL saturation and lightness in `[0, 1]`
fn saturation_lightness(c: Rgb) -> (f64, f64) {
    let hsl: Hsl = Srgb::new(c.r as f32 / 255.0, c.g as f32 / 255.0, c.b as f32 / 255.0).into_color();
    (hsl.saturation as f64, hsl.lightness as f64)
}
