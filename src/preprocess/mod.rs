//! Batch image preprocessing for network input tensors.
//!
//! A standalone utility, separate from the conversion pipeline: it walks a
//! directory of JPEG images, center-crops each to a square, resizes it, saves
//! the resized JPEG, and writes a raw tensor file next to it (same name,
//! `.raw` extension) containing the pixel data cast to 32-bit float,
//! mean-subtracted and scaled, in row-major height x width x channel order.
//!
//! There is no retry or recovery policy: the first fatal error propagates to
//! the caller.

use std::fs;
use std::path::{Path, PathBuf};

use image::imageops::{self, FilterType};
use image::{DynamicImage, RgbImage};
use thiserror::Error;

/// Errors from the preprocessing utility.
#[derive(Debug, Error)]
pub enum PreprocessError {
    #[error("'{0}' is not a directory")]
    NotADirectory(PathBuf),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("image error: {0}")]
    Image(#[from] image::ImageError),
}

/// Knobs for the preprocessing run.
///
/// The defaults match the Inception v3 input convention: 299x299, per-channel
/// mean 128, divisor 128, RGB channel order, float32 output.
#[derive(Debug, Clone)]
pub struct PreprocessOptions {
    /// Square output size in pixels.
    pub size: u32,
    /// Per-channel mean subtracted from each pixel, RGB order.
    pub mean: [f32; 3],
    /// Scalar divisor applied after mean subtraction.
    pub divisor: f32,
    /// Reverse the channel order to BGR in the raw output.
    pub bgr: bool,
    /// Write the raw tensor as uint8 instead of float32.
    pub save_uint8: bool,
}

impl Default for PreprocessOptions {
    fn default() -> Self {
        Self {
            size: 299,
            mean: [128.0, 128.0, 128.0],
            divisor: 128.0,
            bgr: false,
            save_uint8: false,
        }
    }
}

/// Convert every JPEG under `src` into a resized JPEG and a raw tensor file
/// under `dest`. Returns the number of raw tensors written.
pub fn convert_images(
    src: &Path,
    dest: &Path,
    opts: &PreprocessOptions,
) -> Result<usize, PreprocessError> {
    if !src.is_dir() {
        return Err(PreprocessError::NotADirectory(src.to_path_buf()));
    }
    fs::create_dir_all(dest)?;

    tracing::info!(src = %src.display(), "scaling images to square");
    for path in collect_jpegs(src)? {
        tracing::info!(image = %path.display(), "resizing");
        let img = image::open(&path)?;
        let resized = square_resize(&img, opts.size);
        let out = dest.join(path.file_name().unwrap_or(path.as_os_str()));
        resized.save(&out)?;
    }

    tracing::info!(dest = %dest.display(), "writing raw tensors");
    let mut written = 0;
    for path in collect_jpegs(dest)? {
        tracing::info!(image = %path.display(), "tensorizing");
        let img = image::open(&path)?.to_rgb8();
        let data = tensor_data(&img, opts);
        let raw_path = path.with_extension("raw");
        fs::write(&raw_path, raw_bytes(&data, opts.save_uint8))?;
        written += 1;
    }
    Ok(written)
}

/// JPEG files under `dir`, recursively, in sorted order.
///
/// Directory iteration order is OS-dependent; sorting keeps runs
/// deterministic.
fn collect_jpegs(dir: &Path) -> Result<Vec<PathBuf>, PreprocessError> {
    let mut found = Vec::new();
    let mut stack = vec![dir.to_path_buf()];
    while let Some(current) = stack.pop() {
        for entry in fs::read_dir(&current)? {
            let path = entry?.path();
            if path.is_dir() {
                stack.push(path);
            } else if is_jpeg(&path) {
                found.push(path);
            }
        }
    }
    found.sort();
    Ok(found)
}

fn is_jpeg(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("jpg") || e.eq_ignore_ascii_case("jpeg"))
}

/// The centered square crop rectangle for a `width` x `height` image:
/// `(x, y, side)`.
fn center_square(width: u32, height: u32) -> (u32, u32, u32) {
    let side = width.min(height);
    ((width - side) / 2, (height - side) / 2, side)
}

/// Center-crop to a square and resize to `size` x `size`.
///
/// Grayscale inputs are promoted to RGB by the conversion; Lanczos3 matches
/// the antialiased resampling of the original tooling.
fn square_resize(img: &DynamicImage, size: u32) -> RgbImage {
    let rgb = img.to_rgb8();
    let (width, height) = rgb.dimensions();
    let (x, y, side) = center_square(width, height);
    let cropped = imageops::crop_imm(&rgb, x, y, side, side).to_image();
    imageops::resize(&cropped, size, size, FilterType::Lanczos3)
}

/// Mean-subtracted, scaled pixel data in row-major HWC order.
fn tensor_data(img: &RgbImage, opts: &PreprocessOptions) -> Vec<f32> {
    let mut data = Vec::with_capacity((img.width() * img.height() * 3) as usize);
    for pixel in img.pixels() {
        let channels: [usize; 3] = if opts.bgr { [2, 1, 0] } else { [0, 1, 2] };
        for c in channels {
            data.push((f32::from(pixel.0[c]) - opts.mean[c]) / opts.divisor);
        }
    }
    data
}

/// Serialize tensor values: little-endian f32, or uint8 when requested.
fn raw_bytes(data: &[f32], save_uint8: bool) -> Vec<u8> {
    if save_uint8 {
        data.iter().map(|v| *v as u8).collect()
    } else {
        data.iter().flat_map(|v| v.to_le_bytes()).collect()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use image::Rgb;

    use super::*;

    #[test]
    fn center_square_rects() {
        assert_eq!(center_square(4, 2), (1, 0, 2));
        assert_eq!(center_square(2, 4), (0, 1, 2));
        assert_eq!(center_square(3, 3), (0, 0, 3));
    }

    #[test]
    fn square_resize_produces_requested_dims() {
        let img = DynamicImage::ImageRgb8(RgbImage::from_pixel(5, 3, Rgb([7, 7, 7])));
        let out = square_resize(&img, 2);
        assert_eq!(out.dimensions(), (2, 2));
    }

    #[test]
    fn tensor_values_are_mean_subtracted_and_scaled() {
        let img = RgbImage::from_pixel(1, 1, Rgb([255, 0, 128]));
        let data = tensor_data(&img, &PreprocessOptions::default());
        assert_eq!(data, vec![0.9921875, -1.0, 0.0]);
    }

    #[test]
    fn bgr_reverses_channel_order() {
        let img = RgbImage::from_pixel(1, 1, Rgb([255, 0, 128]));
        let opts = PreprocessOptions {
            bgr: true,
            ..PreprocessOptions::default()
        };
        assert_eq!(tensor_data(&img, &opts), vec![0.0, -1.0, 0.9921875]);
    }

    #[test]
    fn tensor_order_is_row_major_hwc() {
        // 2x1 image: left pixel then right pixel, 3 channels each.
        let mut img = RgbImage::new(2, 1);
        img.put_pixel(0, 0, Rgb([128, 128, 128]));
        img.put_pixel(1, 0, Rgb([255, 255, 255]));
        let data = tensor_data(&img, &PreprocessOptions::default());
        assert_eq!(data, vec![0.0, 0.0, 0.0, 0.9921875, 0.9921875, 0.9921875]);
    }

    #[test]
    fn raw_bytes_little_endian_f32() {
        let bytes = raw_bytes(&[-1.0], false);
        assert_eq!(bytes, (-1.0f32).to_le_bytes().to_vec());
        // uint8 output truncates toward zero.
        assert_eq!(raw_bytes(&[0.99, 2.7], true), vec![0, 2]);
    }
}
