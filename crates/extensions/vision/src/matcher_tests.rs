use image::{GrayImage, Luma};

use super::*;

/// Deterministic pseudo-random texture.
fn textured(width: u32, height: u32, seed: u32) -> GrayImage {
    GrayImage::from_fn(width, height, |x, y| {
        let mut v = x
            .wrapping_mul(73_856_093)
            ^ y.wrapping_mul(19_349_663)
            ^ seed.wrapping_mul(83_492_791);
        v ^= v >> 13;
        v = v.wrapping_mul(0x5bd1_e995);
        v ^= v >> 15;
        Luma([(v & 0xff) as u8])
    })
}

fn crop(image: &GrayImage, x: u32, y: u32, w: u32, h: u32) -> GrayImage {
    image::imageops::crop_imm(image, x, y, w, h).to_image()
}

fn paste(target: &mut GrayImage, patch: &GrayImage, x: u32, y: u32) {
    image::imageops::replace(target, patch, x as i64, y as i64);
}

fn within(actual: Rect, expected: Rect, tolerance: i32) -> bool {
    (actual.x - expected.x).abs() <= tolerance
        && (actual.y - expected.y).abs() <= tolerance
        && (actual.width as i32 - expected.width as i32).abs() <= tolerance
        && (actual.height as i32 - expected.height as i32).abs() <= tolerance
}

#[test]
fn test_exact_crop_is_found() {
    let screen = textured(80, 60, 1);
    let template = crop(&screen, 20, 20, 10, 10);

    let matches = TemplateImageMatcher::default().find_scored_matches(&screen, &template);

    assert!(!matches.is_empty());
    let expected = Rect::new(20, 20, 10, 10);
    assert!(within(matches[0].rect, expected, 2), "{:?}", matches[0]);
    assert!(matches[0].score > 0.99);
}

#[test]
fn test_uniform_template_returns_empty() {
    let screen = textured(50, 50, 2);
    let template = GrayImage::from_pixel(8, 8, Luma([128]));

    assert!(TemplateImageMatcher::default().find_matches(&screen, &template).is_empty());
}

#[test]
fn test_uniform_screen_returns_empty() {
    let screen = GrayImage::from_pixel(40, 40, Luma([10]));
    let template = textured(5, 5, 3);

    assert!(TemplateImageMatcher::default().find_matches(&screen, &template).is_empty());
}

#[test]
fn test_template_larger_than_screen() {
    let screen = textured(10, 10, 4);
    let template = textured(11, 5, 5);
    assert!(TemplateImageMatcher::default().find_matches(&screen, &template).is_empty());

    let empty = GrayImage::new(0, 0);
    assert!(TemplateImageMatcher::default().find_matches(&screen, &empty).is_empty());
}

#[test]
fn test_neighbouring_offsets_are_merged() {
    // A smooth gradient patch correlates highly at adjacent offsets.
    let mut screen = GrayImage::from_pixel(60, 60, Luma([0]));
    let gradient = GrayImage::from_fn(12, 12, |x, y| Luma([(x * 10 + y * 8) as u8]));
    paste(&mut screen, &gradient, 25, 30);
    let template = crop(&gradient, 0, 0, 12, 12);

    let unmerged = TemplateImageMatcher::new(0.9, 1.0).find_matches(&screen, &template);
    assert!(unmerged.len() > 1);

    let matches = TemplateImageMatcher::default().find_matches(&screen, &template);
    assert_eq!(matches.len(), 1, "{:?}", matches);
    assert!(within(matches[0], Rect::new(25, 30, 12, 12), 2));
}

#[test]
fn test_repeated_feature_reported_per_location() {
    let patch = textured(8, 8, 6);
    let mut screen = GrayImage::from_pixel(64, 32, Luma([0]));
    paste(&mut screen, &patch, 4, 4);
    paste(&mut screen, &patch, 40, 20);

    let matches = TemplateImageMatcher::default().find_matches(&screen, &patch);

    assert_eq!(matches.len(), 2);
    let mut origins: Vec<_> = matches.iter().map(|r| (r.x, r.y)).collect();
    origins.sort();
    assert_eq!(origins, vec![(4, 4), (40, 20)]);
}

#[test]
fn test_brightness_shift_still_matches() {
    let screen = textured(40, 40, 7);
    let shifted = GrayImage::from_fn(10, 10, |x, y| {
        Luma([(screen.get_pixel(15 + x, 5 + y).0[0] / 2).saturating_add(60)])
    });

    let matches = TemplateImageMatcher::default().find_scored_matches(&screen, &shifted);
    assert!(!matches.is_empty());
    assert!(within(matches[0].rect, Rect::new(15, 5, 10, 10), 2));
}

#[test]
fn test_absent_template_returns_empty() {
    let screen = textured(40, 40, 8);
    let template = textured(10, 10, 9);
    assert!(TemplateImageMatcher::default().find_matches(&screen, &template).is_empty());
}

#[test]
fn test_from_config() {
    let matcher = TemplateImageMatcher::from_config(&MatchingConfig::default());
    assert_eq!(matcher, TemplateImageMatcher::default());
    assert_eq!(matcher.acceptance_threshold(), 0.9);
    assert_eq!(matcher.merge_threshold(), 0.3);
}
