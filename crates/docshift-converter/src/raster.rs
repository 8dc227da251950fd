//! In-process raster steps: PNG→JPEG recompression and resizing.
//!
//! Decoding and resampling are CPU-bound, so the async entry points move
//! the work onto the blocking pool.

use std::io::Cursor;
use std::path::{Path, PathBuf};

use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::{DynamicImage, ImageReader};

use crate::error::ConversionError;
use crate::models::ResizeSpec;

/// Decode `input` and write it to `output` as JPEG.
pub async fn recompress_to_jpeg(
    input: &Path,
    output: &Path,
    quality: u8,
) -> Result<(), ConversionError> {
    let (input, output) = (input.to_path_buf(), output.to_path_buf());
    tokio::task::spawn_blocking(move || {
        let image = decode(&input)?;
        write_jpeg(&image, &output, quality)
    })
    .await?
}

/// Decode `input`, resample it to `spec` and write it to `output` as JPEG.
pub async fn resize_to_jpeg(
    input: &Path,
    output: &Path,
    spec: ResizeSpec,
    quality: u8,
) -> Result<(), ConversionError> {
    let (input, output) = (input.to_path_buf(), output.to_path_buf());
    tokio::task::spawn_blocking(move || {
        let image = decode(&input)?;
        let resized = resize(&image, spec);
        tracing::debug!(
            from_width = image.width(),
            from_height = image.height(),
            to_width = resized.width(),
            to_height = resized.height(),
            "Image resized"
        );
        write_jpeg(&resized, &output, quality)
    })
    .await?
}

/// Resample to the target dimensions; a two-sided target is filled by
/// scaling to cover and cropping the centre.
pub fn resize(image: &DynamicImage, spec: ResizeSpec) -> DynamicImage {
    let (width, height) = spec.target_dimensions(image.width(), image.height());
    if spec.is_exact() {
        image.resize_to_fill(width, height, FilterType::Lanczos3)
    } else {
        image.resize_exact(width, height, FilterType::Lanczos3)
    }
}

/// Encode as baseline JPEG, flattening any alpha channel.
pub fn encode_jpeg(image: &DynamicImage, quality: u8) -> Result<Vec<u8>, ConversionError> {
    let mut buf = Cursor::new(Vec::new());
    let encoder = JpegEncoder::new_with_quality(&mut buf, quality);
    image.to_rgb8().write_with_encoder(encoder)?;
    Ok(buf.into_inner())
}

fn decode(path: &PathBuf) -> Result<DynamicImage, ConversionError> {
    Ok(ImageReader::open(path)?.with_guessed_format()?.decode()?)
}

fn write_jpeg(image: &DynamicImage, output: &Path, quality: u8) -> Result<(), ConversionError> {
    let bytes = encode_jpeg(image, quality)?;
    std::fs::write(output, bytes)?;
    Ok(())
}
