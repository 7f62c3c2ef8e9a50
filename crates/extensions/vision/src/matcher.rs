//! Template matching by normalized cross-correlation.
//!
//! The score at each offset is the zero-mean NCC of the template and the
//! screen window under it, in `[-1, 1]`. Window sums come from integral
//! images so only the cross term is computed per pixel.

use std::cmp::Ordering;

use image::GrayImage;
use serde::{Deserialize, Serialize};
use tracing::debug;

use uiprobe_config::MatchingConfig;
use uiprobe_protocols::Rect;

pub const DEFAULT_ACCEPTANCE_THRESHOLD: f64 = 0.9;
pub const DEFAULT_MERGE_THRESHOLD: f64 = 0.3;

/// Per-pixel variance below which an image patch is treated as flat.
const MIN_VARIANCE: f64 = 1e-3;

/// A qualifying match in screen pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoredMatch {
    pub rect: Rect,
    pub score: f64,
}

/// Locates a template inside a screenshot. Stateless.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TemplateImageMatcher {
    acceptance_threshold: f64,
    merge_threshold: f64,
}

impl Default for TemplateImageMatcher {
    fn default() -> Self {
        Self::new(DEFAULT_ACCEPTANCE_THRESHOLD, DEFAULT_MERGE_THRESHOLD)
    }
}

impl TemplateImageMatcher {
    /// Matches need a score strictly above `acceptance_threshold`; matches
    /// overlapping a better one by more than `merge_threshold` (IoU) are
    /// suppressed.
    pub fn new(acceptance_threshold: f64, merge_threshold: f64) -> Self {
        Self {
            acceptance_threshold,
            merge_threshold,
        }
    }

    pub fn from_config(config: &MatchingConfig) -> Self {
        Self::new(config.acceptance_threshold, config.merge_threshold)
    }

    pub fn acceptance_threshold(&self) -> f64 {
        self.acceptance_threshold
    }

    pub fn merge_threshold(&self) -> f64 {
        self.merge_threshold
    }

    /// Rectangles of all distinct matches, best first.
    pub fn find_matches(&self, screen: &GrayImage, template: &GrayImage) -> Vec<Rect> {
        self.find_scored_matches(screen, template)
            .into_iter()
            .map(|m| m.rect)
            .collect()
    }

    /// All distinct matches with their scores, best first.
    ///
    /// A flat template (near-zero variance) cannot be correlated and yields
    /// no matches, as does a template larger than the screen.
    pub fn find_scored_matches(&self, screen: &GrayImage, template: &GrayImage) -> Vec<ScoredMatch> {
        let (sw, sh) = screen.dimensions();
        let (tw, th) = template.dimensions();
        if tw == 0 || th == 0 || tw > sw || th > sh {
            return Vec::new();
        }

        let Some(prepared) = PreparedTemplate::new(template) else {
            debug!("Template {}x{} has no variance, skipping", tw, th);
            return Vec::new();
        };

        let integral = IntegralImage::new(screen);
        let n = prepared.len as f64;
        let mut candidates = Vec::new();

        for y in 0..=(sh - th) {
            for x in 0..=(sw - tw) {
                let (sum, sum_sq) = integral.window(x, y, tw, th);
                let window_var = sum_sq - sum * sum / n;
                if window_var / n < MIN_VARIANCE {
                    continue;
                }

                let score = prepared.cross(screen, x, y) / (prepared.var * window_var).sqrt();
                if score > self.acceptance_threshold {
                    candidates.push(ScoredMatch {
                        rect: Rect::new(x as i32, y as i32, tw, th),
                        score,
                    });
                }
            }
        }

        let matches = self.suppress(candidates);
        debug!(
            "Template {}x{} on screen {}x{}: {} matches",
            tw,
            th,
            sw,
            sh,
            matches.len()
        );
        matches
    }

    /// Non-max suppression: keep the best candidate of each overlapping group.
    fn suppress(&self, mut candidates: Vec<ScoredMatch>) -> Vec<ScoredMatch> {
        candidates.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(Ordering::Equal)
                .then(a.rect.y.cmp(&b.rect.y))
                .then(a.rect.x.cmp(&b.rect.x))
        });

        let mut kept: Vec<ScoredMatch> = Vec::new();
        for candidate in candidates {
            let overlaps = kept
                .iter()
                .any(|k| k.rect.overlap_ratio(&candidate.rect) > self.merge_threshold);
            if !overlaps {
                kept.push(candidate);
            }
        }
        kept
    }
}

/// Zero-mean template values and their sum of squares.
struct PreparedTemplate {
    width: u32,
    height: u32,
    len: usize,
    centered: Vec<f64>,
    var: f64,
}

impl PreparedTemplate {
    fn new(template: &GrayImage) -> Option<Self> {
        let (width, height) = template.dimensions();
        let len = (width as usize) * (height as usize);
        let mean = template.pixels().map(|p| p.0[0] as f64).sum::<f64>() / len as f64;
        let centered: Vec<f64> = template.pixels().map(|p| p.0[0] as f64 - mean).collect();
        let var: f64 = centered.iter().map(|v| v * v).sum();

        if var / (len as f64) < MIN_VARIANCE {
            return None;
        }
        Some(Self {
            width,
            height,
            len,
            centered,
            var,
        })
    }

    /// Sum of centered template values times screen pixels at offset (x, y).
    /// Equal to the zero-mean cross term because the centered values sum to zero.
    fn cross(&self, screen: &GrayImage, x: u32, y: u32) -> f64 {
        let mut acc = 0.0;
        for ty in 0..self.height {
            let row = (ty * self.width) as usize;
            for tx in 0..self.width {
                let pixel = screen.get_pixel(x + tx, y + ty).0[0] as f64;
                acc += self.centered[row + tx as usize] * pixel;
            }
        }
        acc
    }
}

/// Summed-area tables of pixel values and squared pixel values.
struct IntegralImage {
    stride: usize,
    sum: Vec<f64>,
    sum_sq: Vec<f64>,
}

impl IntegralImage {
    fn new(image: &GrayImage) -> Self {
        let (w, h) = image.dimensions();
        let stride = w as usize + 1;
        let mut sum = vec![0.0; stride * (h as usize + 1)];
        let mut sum_sq = vec![0.0; stride * (h as usize + 1)];

        for y in 0..h as usize {
            let mut row_sum = 0.0;
            let mut row_sq = 0.0;
            for x in 0..w as usize {
                let v = image.get_pixel(x as u32, y as u32).0[0] as f64;
                row_sum += v;
                row_sq += v * v;
                let i = (y + 1) * stride + x + 1;
                sum[i] = sum[i - stride] + row_sum;
                sum_sq[i] = sum_sq[i - stride] + row_sq;
            }
        }
        Self {
            stride,
            sum,
            sum_sq,
        }
    }

    /// Sum and sum of squares over the window at (x, y) of size w x h.
    fn window(&self, x: u32, y: u32, w: u32, h: u32) -> (f64, f64) {
        let (x0, y0) = (x as usize, y as usize);
        let (x1, y1) = (x0 + w as usize, y0 + h as usize);
        let at = |table: &[f64], x: usize, y: usize| table[y * self.stride + x];
        let area = |table: &[f64]| {
            at(table, x1, y1) - at(table, x0, y1) - at(table, x1, y0) + at(table, x0, y0)
        };
        (area(&self.sum), area(&self.sum_sq))
    }
}

#[cfg(test)]
#[path = "matcher_tests.rs"]
mod tests;
