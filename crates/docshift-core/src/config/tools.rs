//! External converter locations.
//!
//! Each entry is either a bare program name resolved through `PATH` or an
//! explicit path to the executable.

use serde::{Deserialize, Serialize};

/// Programs the conversion pipelines shell out to.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolsConfig {
    /// Office document renderer (LibreOffice / soffice).
    pub libreoffice: String,
    /// Ghostscript, used for PDF version downgrade and compression.
    pub ghostscript: String,
    /// Poppler's `pdftoppm` page rasterizer.
    pub pdftoppm: String,
    /// Python interpreter with the `pdf2docx` package installed.
    pub python: String,
    /// Script invoked as `<python> <script> <input.pdf> <output.docx>`.
    pub pdf_to_word_script: String,
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self {
            libreoffice: "libreoffice".to_string(),
            ghostscript: "gs".to_string(),
            pdftoppm: "pdftoppm".to_string(),
            python: "venv/bin/python".to_string(),
            pdf_to_word_script: "scripts/convert_pdf_to_word.py".to_string(),
        }
    }
}
