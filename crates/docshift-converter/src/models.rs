//! Domain models: operations, uploads, resize targets and outputs.

use std::fmt;
use std::path::PathBuf;

use bytes::Bytes;
use serde::Serialize;

use crate::error::{ConversionError, Stage};
use crate::scratch::ScratchJob;

/// Largest accepted resize dimension, in pixels.
pub const MAX_DIMENSION: u32 = 16_384;

/// MIME type of generated PDFs.
pub const PDF_CONTENT_TYPE: &str = "application/pdf";
/// MIME type of generated JPEGs.
pub const JPEG_CONTENT_TYPE: &str = "image/jpeg";
/// MIME type of generated Word documents.
pub const DOCX_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document";

/// The nine conversions the gateway offers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Operation {
    /// Office document → PDF 1.4.
    WordToPdf,
    /// PDF → docx via the Python script.
    PdfToWord,
    /// JPEG/PNG → single-page PDF 1.4.
    ImageToPdf,
    /// First PDF page → JPEG.
    PdfToImage,
    /// PNG → JPEG.
    PngToJpg,
    /// Spreadsheet → PDF 1.4.
    SpreadsheetToPdf,
    /// Image → resized JPEG.
    ResizeImage,
    /// PDF → recompressed PDF.
    CompressPdf,
    /// PDF → PDF rewritten at compatibility 1.4.
    DowngradePdf,
}

impl Operation {
    /// Every operation, in route order.
    pub const ALL: [Operation; 9] = [
        Self::WordToPdf,
        Self::PdfToWord,
        Self::ImageToPdf,
        Self::PdfToImage,
        Self::PngToJpg,
        Self::SpreadsheetToPdf,
        Self::ResizeImage,
        Self::CompressPdf,
        Self::DowngradePdf,
    ];

    /// HTTP path the operation is served on.
    pub fn route(&self) -> &'static str {
        match self {
            Self::WordToPdf => "/convert-word-to-pdf",
            Self::PdfToWord => "/convert-pdf-to-word",
            Self::ImageToPdf => "/convert-jpg-to-pdf",
            Self::PdfToImage => "/convert-pdf-to-jpg",
            Self::PngToJpg => "/convert-png-to-jpg",
            Self::SpreadsheetToPdf => "/convert-excel-to-pdf",
            Self::ResizeImage => "/resize-jpg",
            Self::CompressPdf => "/resize-pdf",
            Self::DowngradePdf => "/convert",
        }
    }

    /// Multipart field carrying the upload.
    pub fn field_name(&self) -> &'static str {
        match self {
            Self::WordToPdf => "wordFile",
            Self::PdfToWord | Self::PdfToImage | Self::CompressPdf | Self::DowngradePdf => {
                "pdfFile"
            }
            Self::ImageToPdf | Self::ResizeImage => "imageFile",
            Self::PngToJpg => "pngFile",
            Self::SpreadsheetToPdf => "excelFile",
        }
    }

    /// Content type of the produced artifact.
    pub fn content_type(&self) -> &'static str {
        match self {
            Self::PdfToWord => DOCX_CONTENT_TYPE,
            Self::PdfToImage | Self::PngToJpg | Self::ResizeImage => JPEG_CONTENT_TYPE,
            Self::WordToPdf
            | Self::ImageToPdf
            | Self::SpreadsheetToPdf
            | Self::CompressPdf
            | Self::DowngradePdf => PDF_CONTENT_TYPE,
        }
    }

    /// Filename suggested to the client.
    pub fn output_filename(&self) -> &'static str {
        match self {
            Self::PdfToWord => "converted.docx",
            Self::PdfToImage | Self::PngToJpg => "converted.jpg",
            Self::ResizeImage => "resized.jpg",
            Self::CompressPdf => "compressed.pdf",
            Self::WordToPdf | Self::ImageToPdf | Self::SpreadsheetToPdf | Self::DowngradePdf => {
                "converted.pdf"
            }
        }
    }

    /// Short client-facing message for a failed conversion.
    ///
    /// The full error is logged separately and never returned.
    pub fn failure_message(&self, err: &ConversionError) -> &'static str {
        let downgrade = err.stage() == Some(Stage::Downgrade);
        match self {
            Self::WordToPdf | Self::ImageToPdf if downgrade => "Failed to convert to PDF 1.4.",
            Self::WordToPdf | Self::ImageToPdf | Self::PngToJpg => "Conversion failed.",
            Self::PdfToWord if err.is_missing_output() => "Converted file not found.",
            Self::PdfToImage if err.is_missing_output() => "JPG output not found.",
            Self::PdfToWord | Self::PdfToImage => "Conversion failed.",
            Self::SpreadsheetToPdf if downgrade => "Ghostscript conversion failed.",
            Self::SpreadsheetToPdf => "LibreOffice conversion failed.",
            Self::ResizeImage => "Resize failed.",
            Self::CompressPdf => "Compression failed.",
            Self::DowngradePdf => "PDF conversion failed.",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::WordToPdf => "word_to_pdf",
            Self::PdfToWord => "pdf_to_word",
            Self::ImageToPdf => "image_to_pdf",
            Self::PdfToImage => "pdf_to_image",
            Self::PngToJpg => "png_to_jpg",
            Self::SpreadsheetToPdf => "spreadsheet_to_pdf",
            Self::ResizeImage => "resize_image",
            Self::CompressPdf => "compress_pdf",
            Self::DowngradePdf => "downgrade_pdf",
        };
        f.write_str(name)
    }
}

/// A file received in a request and persisted to its scratch job.
#[derive(Debug, Clone)]
pub struct Upload {
    /// Filename as sent by the client. Only its extension is ever used
    /// on disk.
    pub original_name: String,
    /// Declared MIME type, if any.
    pub content_type: Option<String>,
    /// Scratch path the bytes were written to.
    pub path: PathBuf,
    /// Number of bytes written.
    pub size: u64,
}

/// Target size for the resize operation; at least one side is set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ResizeSpec {
    /// Requested width in pixels.
    pub width: Option<u32>,
    /// Requested height in pixels.
    pub height: Option<u32>,
}

impl ResizeSpec {
    /// Parse the `width`/`height` form fields.
    ///
    /// Blank, non-numeric, zero and oversized values count as absent.
    pub fn from_form(width: Option<&str>, height: Option<&str>) -> Result<Self, ConversionError> {
        let spec = Self {
            width: width.and_then(parse_dimension),
            height: height.and_then(parse_dimension),
        };
        if spec.width.is_none() && spec.height.is_none() {
            return Err(ConversionError::InvalidResize);
        }
        Ok(spec)
    }

    /// Output dimensions for a source image of `src_width × src_height`.
    ///
    /// A single side keeps the source aspect ratio; both sides are used
    /// as-is and the image is cropped to cover them.
    pub fn target_dimensions(&self, src_width: u32, src_height: u32) -> (u32, u32) {
        let scale = |value: u32, num: u32, den: u32| -> u32 {
            let scaled = (value as f64 * num as f64 / den.max(1) as f64).round();
            (scaled as u32).clamp(1, MAX_DIMENSION)
        };
        match (self.width, self.height) {
            (Some(w), Some(h)) => (w, h),
            (Some(w), None) => (w, scale(src_height, w, src_width)),
            (None, Some(h)) => (scale(src_width, h, src_height), h),
            (None, None) => (src_width, src_height),
        }
    }

    /// Whether both sides are fixed, which requires a cover crop.
    pub fn is_exact(&self) -> bool {
        self.width.is_some() && self.height.is_some()
    }
}

fn parse_dimension(raw: &str) -> Option<u32> {
    raw.trim()
        .parse::<u32>()
        .ok()
        .filter(|v| (1..=MAX_DIMENSION).contains(v))
}

/// Everything the processor needs to run one conversion.
#[derive(Debug)]
pub struct ConversionRequest {
    /// Which conversion to run.
    pub operation: Operation,
    /// The request's scratch job; consumed and cleaned up by the processor.
    pub job: ScratchJob,
    /// The persisted upload, living inside `job`.
    pub upload: Upload,
    /// Resize target, required for [`Operation::ResizeImage`].
    pub resize: Option<ResizeSpec>,
}

/// The final artifact, read into memory.
#[derive(Debug, Clone)]
pub struct ConversionOutput {
    /// Raw bytes of the artifact.
    pub bytes: Bytes,
    /// Response content type.
    pub content_type: &'static str,
    /// Suggested filename.
    pub filename: &'static str,
}
