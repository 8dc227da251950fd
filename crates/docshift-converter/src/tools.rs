//! Argument vectors for the external converters.
//!
//! Paths are always passed as separate arguments; nothing here is ever
//! joined into a shell string.

use std::ffi::OsString;
use std::path::Path;

use docshift_core::config::converter::ConverterConfig;
use docshift_core::config::tools::ToolsConfig;

use crate::executor::ToolInvocation;
use crate::scratch::file_url;

/// Python snippet printing the installed `pdf2docx` version.
const PDF2DOCX_PROBE: &str =
    "import pdf2docx, sys; print(getattr(pdf2docx, '__version__', 'ok'))";

/// Builds invocations from the configured tool locations.
#[derive(Debug, Clone)]
pub struct ToolCommands {
    tools: ToolsConfig,
    compatibility_level: String,
    compress_preset: String,
}

impl ToolCommands {
    /// Create a builder from the tool and converter sections.
    pub fn new(tools: &ToolsConfig, converter: &ConverterConfig) -> Self {
        Self {
            tools: tools.clone(),
            compatibility_level: converter.pdf_compatibility_level.clone(),
            compress_preset: converter.compress_preset.clone(),
        }
    }

    /// Configured tool locations.
    pub fn tools(&self) -> &ToolsConfig {
        &self.tools
    }

    /// Render an office document to PDF inside `out_dir`.
    ///
    /// `profile_dir` becomes a private LibreOffice user installation so
    /// concurrent renders do not contend for the profile lock.
    pub fn office_to_pdf(
        &self,
        input: &Path,
        profile_dir: &Path,
        out_dir: &Path,
    ) -> ToolInvocation {
        ToolInvocation::new(&self.tools.libreoffice)
            .arg(format!("-env:UserInstallation={}", file_url(profile_dir)))
            .args(["--headless", "--convert-to", "pdf", "--outdir"])
            .arg(out_dir)
            .arg(input)
    }

    /// Rewrite a PDF at the configured compatibility level.
    pub fn pdf_downgrade(&self, input: &Path, output: &Path) -> ToolInvocation {
        self.ghostscript(input, output, None)
    }

    /// Rewrite a PDF with the lossy compression preset.
    pub fn pdf_compress(&self, input: &Path, output: &Path) -> ToolInvocation {
        self.ghostscript(input, output, Some(&self.compress_preset))
    }

    fn ghostscript(&self, input: &Path, output: &Path, preset: Option<&str>) -> ToolInvocation {
        let mut invocation = ToolInvocation::new(&self.tools.ghostscript).args([
            "-sDEVICE=pdfwrite".to_string(),
            format!("-dCompatibilityLevel={}", self.compatibility_level),
        ]);
        if let Some(preset) = preset {
            invocation = invocation.arg(format!("-dPDFSETTINGS={preset}"));
        }
        invocation
            .args(["-dNOPAUSE", "-dBATCH", "-dQUIET"])
            .arg(output_file_arg(output))
            .arg(input)
    }

    /// Rasterize the first page of a PDF to `<out_base>.jpg`.
    pub fn pdf_first_page_to_jpeg(&self, input: &Path, out_base: &Path) -> ToolInvocation {
        ToolInvocation::new(&self.tools.pdftoppm)
            .args(["-jpeg", "-singlefile", "-f", "1", "-l", "1"])
            .arg(input)
            .arg(out_base)
    }

    /// Run the PDF-to-docx script.
    pub fn pdf_to_docx(&self, input: &Path, output: &Path) -> ToolInvocation {
        ToolInvocation::new(&self.tools.python)
            .arg(&self.tools.pdf_to_word_script)
            .arg(input)
            .arg(output)
    }

    /// `gs -version`.
    pub fn probe_ghostscript(&self) -> ToolInvocation {
        ToolInvocation::new(&self.tools.ghostscript).arg("-version")
    }

    /// `libreoffice --version`.
    pub fn probe_libreoffice(&self) -> ToolInvocation {
        ToolInvocation::new(&self.tools.libreoffice).arg("--version")
    }

    /// `pdftoppm -v`.
    pub fn probe_pdftoppm(&self) -> ToolInvocation {
        ToolInvocation::new(&self.tools.pdftoppm).arg("-v")
    }

    /// Import `pdf2docx` in the configured interpreter.
    pub fn probe_pdf2docx(&self) -> ToolInvocation {
        ToolInvocation::new(&self.tools.python).args(["-c", PDF2DOCX_PROBE])
    }
}

/// `-sOutputFile=` argument; Ghostscript treats `%` as a page-number
/// template, so literal percent signs are doubled.
fn output_file_arg(output: &Path) -> OsString {
    let mut arg = OsString::from("-sOutputFile=");
    arg.push(output.to_string_lossy().replace('%', "%%"));
    arg
}
