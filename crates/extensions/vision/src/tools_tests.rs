use image::{GrayImage, Luma};
use serde_json::json;
use tempfile::TempDir;

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

fn write_fixtures(dir: &TempDir) -> (String, String) {
    let screen = textured(60, 40);
    let template = image::imageops::crop_imm(&screen, 30, 10, 12, 8).to_image();

    let screen_path = dir.path().join("screen.png");
    let template_path = dir.path().join("template.png");
    screen.save(&screen_path).unwrap();
    template.save(&template_path).unwrap();
    (
        screen_path.to_string_lossy().into_owned(),
        template_path.to_string_lossy().into_owned(),
    )
}

#[tokio::test]
async fn test_find_template_returns_logical_rects() {
    let dir = TempDir::new().unwrap();
    let (screen, template) = write_fixtures(&dir);
    let tool = FindTemplateTool::new(
        TemplateImageMatcher::default(),
        CoordinateMapper::new(2.0, 2.0).unwrap(),
    );

    let result = tool
        .execute(json!({ "screen": screen, "template": template }))
        .await
        .unwrap();

    assert!(result.success);
    let output = result.structured_output.unwrap();
    assert_eq!(output["matches"][0]["physical"], json!({ "x": 30, "y": 10, "width": 12, "height": 8 }));
    assert_eq!(output["matches"][0]["rect"], json!({ "x": 15, "y": 5, "width": 6, "height": 4 }));
}

#[tokio::test]
async fn test_uniform_template_is_not_found() {
    let dir = TempDir::new().unwrap();
    let (screen, _) = write_fixtures(&dir);
    let flat = dir.path().join("flat.png");
    GrayImage::from_pixel(5, 5, Luma([200])).save(&flat).unwrap();

    let tool = FindTemplateTool::new(TemplateImageMatcher::default(), CoordinateMapper::identity());
    let result = tool
        .execute(json!({ "screen": screen, "template": flat.to_string_lossy() }))
        .await
        .unwrap();

    assert!(!result.success);
    assert_eq!(result.structured_output.unwrap()["count"], 0);
}

#[tokio::test]
async fn test_missing_file_is_execution_failure() {
    let tool = FindTemplateTool::new(TemplateImageMatcher::default(), CoordinateMapper::identity());
    let err = tool
        .execute(json!({ "screen": "/nonexistent/a.png", "template": "/nonexistent/b.png" }))
        .await
        .unwrap_err();
    assert!(matches!(err, ToolError::ExecutionFailed(_)));
}

#[tokio::test]
async fn test_invalid_params() {
    let tool = FindTemplateTool::new(TemplateImageMatcher::default(), CoordinateMapper::identity());
    let err = tool.execute(json!({ "screen": 3 })).await.unwrap_err();
    assert!(matches!(err, ToolError::InvalidParameters(_)));
}

#[test]
fn test_provider_lists_tool() {
    let provider = VisionToolProvider::new(TemplateImageMatcher::default(), CoordinateMapper::identity());
    let tools = provider.tools();
    assert_eq!(provider.provider_id(), "vision");
    assert_eq!(tools.len(), 1);
    assert_eq!(tools[0].definition().id, "vision_find_template");
}
