//! Image channel: grayscale luminance on the half circle [0, π]
//!
//! White maps to phase 0 and black to π. The cosine-based similarity score
//! spans its whole range across that half circle, so the full circle is never
//! used for encoding. On decode, phases in (π, 2π) are reflected back onto the
//! half circle (θ -> 2π - θ), which keeps raw engine output renderable.

use super::{normalize_phase, Decoded, Modality, PhaseCodec};
use anyhow::{ensure, Context, Result};
use image::imageops::FilterType;
use image::{DynamicImage, GrayImage};
use std::f64::consts::{PI, TAU};
use std::path::Path;

/// Gray level shown for a node that decodes to noise
pub const NOISE_GRAY: u8 = 128;

pub struct ImageCodec;

impl PhaseCodec for ImageCodec {
    type Sample = u8;

    const MODALITY: Modality = Modality::Image;

    fn encode(gray: u8) -> f64 {
        encode_luminance(gray as f64)
    }

    fn decode(phase: f64) -> Decoded<u8> {
        if !phase.is_finite() {
            return Decoded::Noise;
        }
        let phase = normalize_phase(phase);
        let folded = if phase > PI { TAU - phase } else { phase };
        let gray = (255.0 * (1.0 - folded / PI)).round().clamp(0.0, 255.0);
        Decoded::Value(gray as u8)
    }
}

/// Encode a fractional luminance in [0, 255] (clamped)
pub fn encode_luminance(luminance: f64) -> f64 {
    let luminance = if luminance.is_finite() {
        luminance.clamp(0.0, 255.0)
    } else {
        0.0
    };
    (1.0 - luminance / 255.0) * PI
}

/// ITU-R BT.601 luma
pub fn luminance(r: u8, g: u8, b: u8) -> f64 {
    0.299 * r as f64 + 0.587 * g as f64 + 0.114 * b as f64
}

/// Resample an image to `rows x cols` and encode it row-major
pub fn phases_from_image(img: &DynamicImage, rows: usize, cols: usize) -> Vec<f64> {
    let resized = img.resize_exact(cols as u32, rows as u32, FilterType::Triangle);
    resized
        .to_rgb8()
        .pixels()
        .map(|px| encode_luminance(luminance(px[0], px[1], px[2])))
        .collect()
}

/// Load an image file and encode it into a `rows x cols` phase grid.
///
/// This is the only producer of image-channel vectors from file input. A
/// failure leaves no partial output behind.
pub async fn load_image(path: impl AsRef<Path>, rows: usize, cols: usize) -> Result<Vec<f64>> {
    let path = path.as_ref();
    ensure!(rows > 0 && cols > 0, "image grid must be non-empty");

    let bytes = tokio::fs::read(path)
        .await
        .with_context(|| format!("Failed to read image {}", path.display()))?;
    ensure!(!bytes.is_empty(), "Image file {} is empty", path.display());

    let img = image::load_from_memory(&bytes)
        .with_context(|| format!("Failed to decode image {}", path.display()))?;
    let (width, height) = (img.width(), img.height());
    ensure!(
        width > 0 && height > 0,
        "Image {} has zero dimensions",
        path.display()
    );

    tracing::debug!(
        "Loaded {} ({}x{}) into a {}x{} phase grid",
        path.display(),
        width,
        height,
        cols,
        rows
    );
    Ok(phases_from_image(&img, rows, cols))
}

/// Decode a phase grid to gray levels; noise renders as mid-gray
pub fn decode_grid(phases: &[f64]) -> Vec<u8> {
    phases
        .iter()
        .map(|&p| ImageCodec::decode(p).value().unwrap_or(NOISE_GRAY))
        .collect()
}

/// Write a decoded phase grid as an 8-bit grayscale PNG
pub fn save_png(path: impl AsRef<Path>, phases: &[f64], rows: usize, cols: usize) -> Result<()> {
    let path = path.as_ref();
    ensure!(
        phases.len() == rows * cols,
        "Phase grid has {} nodes, expected {}x{}",
        phases.len(),
        rows,
        cols
    );
    let gray = GrayImage::from_raw(cols as u32, rows as u32, decode_grid(phases))
        .context("Gray buffer does not match image dimensions")?;
    gray.save(path)
        .with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage};

    #[test]
    fn test_gray_round_trip_within_one_level() {
        for g in 0..=255u8 {
            let decoded = ImageCodec::decode(ImageCodec::encode(g))
                .value()
                .expect("image decode is total for finite phases");
            assert!((decoded as i16 - g as i16).abs() <= 1, "{} -> {}", g, decoded);
        }
    }

    #[test]
    fn test_white_and_black_poles() {
        assert_eq!(ImageCodec::encode(255), 0.0);
        assert!((ImageCodec::encode(0) - PI).abs() < 1e-12);
    }

    #[test]
    fn test_reflection_above_pi() {
        // 3π/2 folds to π/2, i.e. mid gray
        let gray = ImageCodec::decode(1.5 * PI).value().unwrap();
        assert!((gray as i16 - 128).abs() <= 1);
        // slightly below 2π reads as nearly white
        assert!(ImageCodec::decode(TAU - 0.01).value().unwrap() >= 254);
        assert!(ImageCodec::decode(-0.01).value().unwrap() >= 254);
    }

    #[test]
    fn test_non_finite_is_noise() {
        assert!(ImageCodec::decode(f64::NAN).is_noise());
        assert!(ImageCodec::decode(f64::INFINITY).is_noise());
        assert_eq!(decode_grid(&[f64::NAN]), vec![NOISE_GRAY]);
    }

    #[test]
    fn test_luminance_clamping() {
        assert_eq!(encode_luminance(-10.0), PI);
        assert_eq!(encode_luminance(400.0), 0.0);
        assert!((luminance(255, 255, 255) - 255.0).abs() < 1e-9);
    }

    #[test]
    fn test_phases_from_image_resamples() {
        let mut img = RgbImage::new(8, 8);
        for (x, _, px) in img.enumerate_pixels_mut() {
            *px = if x < 4 { Rgb([255, 255, 255]) } else { Rgb([0, 0, 0]) };
        }
        let phases = phases_from_image(&DynamicImage::ImageRgb8(img), 4, 4);
        assert_eq!(phases.len(), 16);
        // left column white, right column black
        assert!(phases[0] < 0.2);
        assert!(phases[3] > PI - 0.2);
    }

    #[tokio::test]
    async fn test_png_round_trip_through_loader() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("grid.png");

        let phases: Vec<f64> = (0..16).map(|i| if i % 2 == 0 { 0.0 } else { PI }).collect();
        save_png(&path, &phases, 4, 4).unwrap();

        let loaded = load_image(&path, 4, 4).await.unwrap();
        assert_eq!(loaded.len(), 16);
        for (a, b) in phases.iter().zip(loaded.iter()) {
            assert!((a - b).abs() < 0.05);
        }
    }

    #[tokio::test]
    async fn test_load_failures_are_reported() {
        let dir = tempfile::tempdir().unwrap();
        assert!(load_image(dir.path().join("missing.png"), 4, 4).await.is_err());

        let garbage = dir.path().join("garbage.png");
        std::fs::write(&garbage, b"not an image").unwrap();
        assert!(load_image(&garbage, 4, 4).await.is_err());
    }

    #[test]
    fn test_save_png_rejects_wrong_shape() {
        let dir = tempfile::tempdir().unwrap();
        assert!(save_png(dir.path().join("bad.png"), &[0.0; 5], 2, 2).is_err());
    }
}
