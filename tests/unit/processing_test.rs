//! Unit tests for image normalization

use facegen::response::file::detect_image_format;
use facegen::response::ImageProcessor;
use facegen::AppError;
use image::{ImageFormat, Rgb, RgbImage, Rgba, RgbaImage};
use std::io::Cursor;

fn encode(image: image::DynamicImage) -> Vec<u8> {
    let mut buffer = Cursor::new(Vec::new());
    image.write_to(&mut buffer, ImageFormat::Png).unwrap();
    buffer.into_inner()
}

fn solid_png(width: u32, height: u32) -> Vec<u8> {
    encode(image::DynamicImage::ImageRgb8(RgbImage::from_pixel(
        width,
        height,
        Rgb([10, 120, 200]),
    )))
}

#[test]
fn test_downscale_produces_exact_square() {
    let processor = ImageProcessor::new();
    let out = processor.normalize(&solid_png(256, 256), 64).unwrap();

    assert_eq!((out.width, out.height), (64, 64));
    assert_eq!(detect_image_format(&out.bytes), Some("png"));
    let decoded = image::load_from_memory(&out.bytes).unwrap().to_rgb8();
    assert_eq!(decoded.dimensions(), (64, 64));
    assert_eq!(decoded.get_pixel(32, 32), &Rgb([10, 120, 200]));
}

#[test]
fn test_non_square_input_is_center_cropped() {
    let mut wide = RgbImage::from_pixel(300, 100, Rgb([255, 0, 0]));
    for y in 0..100 {
        for x in 100..200 {
            wide.put_pixel(x, y, Rgb([0, 255, 0]));
        }
    }
    let raw = encode(image::DynamicImage::ImageRgb8(wide));

    let out = ImageProcessor::new().normalize(&raw, 50).unwrap();
    let decoded = image::load_from_memory(&out.bytes).unwrap().to_rgb8();
    assert_eq!(decoded.dimensions(), (50, 50));
    assert_eq!(decoded.get_pixel(25, 25), &Rgb([0, 255, 0]));
}

#[test]
fn test_alpha_channel_preserved() {
    let raw = encode(image::DynamicImage::ImageRgba8(RgbaImage::from_pixel(
        128,
        128,
        Rgba([0, 0, 0, 0]),
    )));
    let out = ImageProcessor::new().normalize(&raw, 32).unwrap();
    let decoded = image::load_from_memory(&out.bytes).unwrap();
    assert!(decoded.color().has_alpha());
}

#[test]
fn test_canonical_size_is_identity() {
    let raw = solid_png(16, 16);
    let out = ImageProcessor::new().normalize(&raw, 1024).unwrap();
    assert_eq!(out.bytes, raw);
    assert_eq!((out.width, out.height), (16, 16));
}

#[test]
fn test_upscale_rejected() {
    let err = ImageProcessor::new()
        .normalize(&solid_png(64, 64), 2048)
        .unwrap_err();
    assert!(matches!(err, AppError::Validation(ref m) if m == "unsupported upscale"));

    let err = ImageProcessor::new()
        .normalize(&solid_png(64, 64), 128)
        .unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));
}

#[test]
fn test_garbage_bytes_are_decode_error() {
    let err = ImageProcessor::new()
        .normalize(b"definitely not an image", 64)
        .unwrap_err();
    assert!(matches!(err, AppError::Decode(_)));
}

#[test]
fn test_output_is_deterministic() {
    let raw = solid_png(200, 120);
    let processor = ImageProcessor::new();
    let a = processor.normalize(&raw, 48).unwrap();
    let b = processor.normalize(&raw, 48).unwrap();
    assert_eq!(a, b);
}
