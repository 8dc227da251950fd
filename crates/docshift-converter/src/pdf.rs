//! Single-page PDF assembly from a raster image.
//!
//! The page's MediaBox equals the image's pixel dimensions. 8-bit
//! grayscale, RGB and CMYK JPEGs are embedded verbatim with `DCTDecode`;
//! every other input is decoded and embedded as `FlateDecode` RGB, with an
//! `SMask` when the image carries alpha.

use std::io::Write;
use std::path::Path;

use flate2::Compression;
use flate2::write::ZlibEncoder;
use image::{DynamicImage, ImageFormat};
use lopdf::content::{Content, Operation};
use lopdf::{Dictionary, Document, Object, ObjectId, Stream, dictionary};

use crate::error::ConversionError;

/// Build a one-page PDF from the image at `input`.
///
/// `original_name` picks the format by extension (`.jpg`, `.jpeg`,
/// `.png`); other names fall back to content sniffing.
pub async fn image_to_pdf(input: &Path, original_name: &str) -> Result<Vec<u8>, ConversionError> {
    let bytes = tokio::fs::read(input).await?;
    let name = original_name.to_string();
    tokio::task::spawn_blocking(move || build_pdf(&bytes, &name)).await?
}

/// Blocking core of [`image_to_pdf`].
pub fn build_pdf(bytes: &[u8], original_name: &str) -> Result<Vec<u8>, ConversionError> {
    let format = detect_format(bytes, original_name).ok_or_else(|| {
        ConversionError::UnsupportedImage {
            name: original_name.to_string(),
        }
    })?;

    let mut doc = Document::with_version("1.4");
    let (image_id, width, height) = match format {
        ImageFormat::Jpeg => match jpeg_header(bytes) {
            Some(header) if header.embeddable() => {
                let id = embed_jpeg(&mut doc, bytes, &header);
                (id, header.width, header.height)
            }
            _ => {
                let decoded = image::load_from_memory_with_format(bytes, ImageFormat::Jpeg)?;
                embed_decoded(&mut doc, &decoded)?
            }
        },
        _ => {
            let decoded = image::load_from_memory_with_format(bytes, format)?;
            embed_decoded(&mut doc, &decoded)?
        }
    };

    let pages_id = doc.new_object_id();
    let content = Content {
        operations: vec![
            Operation::new("q", vec![]),
            Operation::new(
                "cm",
                vec![
                    i64::from(width).into(),
                    0.into(),
                    0.into(),
                    i64::from(height).into(),
                    0.into(),
                    0.into(),
                ],
            ),
            Operation::new("Do", vec![Object::Name(b"Im0".to_vec())]),
            Operation::new("Q", vec![]),
        ],
    };
    let content_id = doc.add_object(Stream::new(Dictionary::new(), content.encode()?));

    let page_id = doc.add_object(dictionary! {
        "Type" => "Page",
        "Parent" => pages_id,
        "MediaBox" => vec![
            0.into(),
            0.into(),
            i64::from(width).into(),
            i64::from(height).into(),
        ],
        "Contents" => content_id,
        "Resources" => dictionary! {
            "XObject" => dictionary! { "Im0" => image_id },
        },
    });

    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => vec![page_id.into()],
            "Count" => 1,
        }),
    );
    let catalog_id = doc.add_object(dictionary! { "Type" => "Catalog", "Pages" => pages_id });
    doc.trailer.set("Root", catalog_id);

    let mut out = Vec::new();
    doc.save_to(&mut out)?;
    Ok(out)
}

fn detect_format(bytes: &[u8], original_name: &str) -> Option<ImageFormat> {
    let ext = Path::new(original_name)
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);
    match ext.as_deref() {
        Some("jpg" | "jpeg") => Some(ImageFormat::Jpeg),
        Some("png") => Some(ImageFormat::Png),
        _ => match image::guess_format(bytes).ok()? {
            f @ (ImageFormat::Jpeg | ImageFormat::Png) => Some(f),
            _ => None,
        },
    }
}

/// Frame header fields needed for a verbatim `DCTDecode` embed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct JpegHeader {
    precision: u8,
    width: u32,
    height: u32,
    components: u8,
    /// An Adobe APP14 segment was seen; its CMYK samples are inverted.
    adobe: bool,
}

impl JpegHeader {
    fn embeddable(&self) -> bool {
        self.precision == 8
            && matches!(self.components, 1 | 3 | 4)
            && self.width > 0
            && self.height > 0
    }
}

/// Walk the marker segments up to the first start-of-frame.
fn jpeg_header(bytes: &[u8]) -> Option<JpegHeader> {
    if bytes.get(..2)? != [0xFF, 0xD8] {
        return None;
    }
    let mut pos = 2;
    let mut adobe = false;
    loop {
        if *bytes.get(pos)? != 0xFF {
            return None;
        }
        let marker = *bytes.get(pos + 1)?;
        pos += 2;
        match marker {
            0xFF => pos -= 1,
            0x01 | 0xD0..=0xD7 => {}
            0xC0..=0xCF if !matches!(marker, 0xC4 | 0xC8 | 0xCC) => {
                let seg = bytes.get(pos + 2..pos + 8)?;
                return Some(JpegHeader {
                    precision: seg[0],
                    height: u16::from_be_bytes([seg[1], seg[2]]) as u32,
                    width: u16::from_be_bytes([seg[3], seg[4]]) as u32,
                    components: seg[5],
                    adobe,
                });
            }
            0xD9 | 0xDA => return None,
            _ => {
                let len = u16::from_be_bytes([*bytes.get(pos)?, *bytes.get(pos + 1)?]) as usize;
                if marker == 0xEE && bytes.get(pos + 2..pos + 7) == Some(b"Adobe".as_slice()) {
                    adobe = true;
                }
                pos += len;
            }
        }
    }
}

fn embed_jpeg(doc: &mut Document, bytes: &[u8], header: &JpegHeader) -> ObjectId {
    let color_space = match header.components {
        1 => "DeviceGray",
        4 => "DeviceCMYK",
        _ => "DeviceRGB",
    };
    let mut stream = Stream::new(
        dictionary! {
            "Type" => "XObject",
            "Subtype" => "Image",
            "Width" => header.width as i64,
            "Height" => header.height as i64,
            "ColorSpace" => color_space,
            "BitsPerComponent" => 8,
            "Filter" => "DCTDecode",
        },
        bytes.to_vec(),
    );
    if header.components == 4 && header.adobe {
        stream.dict.set(
            "Decode",
            vec![1.into(), 0.into(), 1.into(), 0.into(), 1.into(), 0.into(), 1.into(), 0.into()],
        );
    }
    stream.allows_compression = false;
    doc.add_object(stream)
}

fn embed_decoded(
    doc: &mut Document,
    image: &DynamicImage,
) -> Result<(ObjectId, u32, u32), ConversionError> {
    let (width, height) = (image.width(), image.height());

    let smask_id = if image.color().has_alpha() {
        let alpha: Vec<u8> = image.to_rgba8().pixels().map(|p| p.0[3]).collect();
        let stream = flate_image(width, height, "DeviceGray", &alpha)?;
        Some(doc.add_object(stream))
    } else {
        None
    };

    let mut stream = flate_image(width, height, "DeviceRGB", image.to_rgb8().as_raw())?;
    if let Some(id) = smask_id {
        stream.dict.set("SMask", id);
    }
    Ok((doc.add_object(stream), width, height))
}

fn flate_image(
    width: u32,
    height: u32,
    color_space: &str,
    samples: &[u8],
) -> Result<Stream, ConversionError> {
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(samples)?;
    let mut stream = Stream::new(
        dictionary! {
            "Type" => "XObject",
            "Subtype" => "Image",
            "Width" => width as i64,
            "Height" => height as i64,
            "ColorSpace" => Object::Name(color_space.as_bytes().to_vec()),
            "BitsPerComponent" => 8,
            "Filter" => "FlateDecode",
        },
        encoder.finish()?,
    );
    stream.allows_compression = false;
    Ok(stream)
}
