//! Template visibility as a verification check.

use std::sync::Arc;

use async_trait::async_trait;
use image::GrayImage;
use serde_json::json;

use uiprobe_protocols::{CheckOutcome, ClassifiedError, Screenshot, VerificationCheck};

use crate::image_utils::{decode_gray, load_gray};
use crate::mapper::CoordinateMapper;
use crate::matcher::TemplateImageMatcher;
use crate::VisionError;

/// Passes when a template is (or, for [`hidden`](Self::hidden), is no longer)
/// visible in the screenshot. The payload carries the logical rectangles found.
#[derive(Clone)]
pub struct TemplateVisibleCheck {
    template: Arc<GrayImage>,
    matcher: TemplateImageMatcher,
    mapper: CoordinateMapper,
    expect_visible: bool,
}

impl TemplateVisibleCheck {
    pub fn visible(
        template: GrayImage,
        matcher: TemplateImageMatcher,
        mapper: CoordinateMapper,
    ) -> Self {
        Self {
            template: Arc::new(template),
            matcher,
            mapper,
            expect_visible: true,
        }
    }

    pub fn hidden(
        template: GrayImage,
        matcher: TemplateImageMatcher,
        mapper: CoordinateMapper,
    ) -> Self {
        Self {
            expect_visible: false,
            ..Self::visible(template, matcher, mapper)
        }
    }

    pub fn from_file(
        path: impl AsRef<std::path::Path>,
        matcher: TemplateImageMatcher,
        mapper: CoordinateMapper,
    ) -> Result<Self, VisionError> {
        Ok(Self::visible(load_gray(path)?, matcher, mapper))
    }

    pub fn expects_visible(&self) -> bool {
        self.expect_visible
    }
}

#[async_trait]
impl VerificationCheck for TemplateVisibleCheck {
    async fn check(&self, screenshot: &Screenshot) -> Result<CheckOutcome, ClassifiedError> {
        let data = screenshot.data.clone();
        let template = self.template.clone();
        let matcher = self.matcher;
        let matches = tokio::task::spawn_blocking(move || {
            let screen = decode_gray(&data)?;
            Ok::<_, VisionError>(matcher.find_matches(&screen, &template))
        })
        .await
        .map_err(|e| ClassifiedError::unknown(format!("Matching task failed: {}", e)))?
        .map_err(ClassifiedError::from_error)?;

        let rects: Vec<_> = matches
            .into_iter()
            .map(|r| self.mapper.to_logical_rect(r))
            .collect();
        let visible = !rects.is_empty();
        let payload = json!({ "matches": rects });

        let outcome = match (self.expect_visible, visible) {
            (true, true) => CheckOutcome::passed(format!("Template visible ({} matches)", rects.len())),
            (true, false) => CheckOutcome::failed("Template not visible"),
            (false, false) => CheckOutcome::passed("Template no longer visible"),
            (false, true) => CheckOutcome::failed(format!("Template still visible ({} matches)", rects.len())),
        };
        Ok(outcome.with_payload(payload))
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use image::{ImageFormat, Luma};

    use super::*;

    fn textured(width: u32, height: u32) -> GrayImage {
        GrayImage::from_fn(width, height, |x, y| {
            let mut v = x.wrapping_mul(73_856_093) ^ y.wrapping_mul(19_349_663);
            v ^= v >> 13;
            v = v.wrapping_mul(0x5bd1_e995);
            v ^= v >> 15;
            Luma([(v & 0xff) as u8])
        })
    }

    fn screenshot_of(image: &GrayImage) -> Screenshot {
        let mut out = Cursor::new(Vec::new());
        image.write_to(&mut out, ImageFormat::Png).unwrap();
        Screenshot::new(out.into_inner(), image.width(), image.height())
    }

    #[tokio::test]
    async fn test_visible_template_passes_with_logical_rects() {
        let screen = textured(60, 40);
        let template = image::imageops::crop_imm(&screen, 30, 10, 12, 8).to_image();
        let check = TemplateVisibleCheck::visible(
            template,
            TemplateImageMatcher::default(),
            CoordinateMapper::new(2.0, 2.0).unwrap(),
        );

        let outcome = check.check(&screenshot_of(&screen)).await.unwrap();

        assert!(outcome.success);
        assert_eq!(
            outcome.payload.unwrap()["matches"][0],
            json!({ "x": 15, "y": 5, "width": 6, "height": 4 })
        );
    }

    #[tokio::test]
    async fn test_hidden_check_inverts_result() {
        let screen = textured(60, 40);
        let template = image::imageops::crop_imm(&screen, 30, 10, 12, 8).to_image();
        let blank = GrayImage::from_pixel(60, 40, Luma([0]));
        let check = TemplateVisibleCheck::hidden(
            template,
            TemplateImageMatcher::default(),
            CoordinateMapper::identity(),
        );

        assert!(!check.check(&screenshot_of(&screen)).await.unwrap().success);
        assert!(check.check(&screenshot_of(&blank)).await.unwrap().success);
    }

    #[tokio::test]
    async fn test_undecodable_screenshot_is_error() {
        let check = TemplateVisibleCheck::visible(
            textured(4, 4),
            TemplateImageMatcher::default(),
            CoordinateMapper::identity(),
        );
        let err = check
            .check(&Screenshot::new(vec![1, 2, 3], 1, 1))
            .await
            .unwrap_err();
        assert_eq!(err.category, uiprobe_protocols::ErrorCategory::NonRetryableError);
    }
}
