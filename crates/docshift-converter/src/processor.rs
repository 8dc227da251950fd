//! Conversion processor: runs one operation's pipeline inside its scratch
//! job and always cleans up. External tool runs share a concurrency limit;
//! in-process steps do not take a slot.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use bytes::Bytes;
use docshift_core::AppConfig;
use tokio::sync::Semaphore;
use tracing::{error, info, instrument};

use crate::error::{ConversionError, Stage};
use crate::executor::{ToolExecutor, ToolInvocation};
use crate::models::{ConversionOutput, ConversionRequest, Operation, ResizeSpec, Upload};
use crate::scratch::ScratchJob;
use crate::tools::ToolCommands;
use crate::{pdf, raster};

/// The main conversion processor.
#[derive(Debug, Clone)]
pub struct ConversionProcessor {
    executor: ToolExecutor,
    commands: ToolCommands,
    jpeg_quality: u8,
    /// Limits simultaneously running external tools; excess runs wait.
    limiter: Arc<Semaphore>,
}

impl ConversionProcessor {
    /// Create a processor from the loaded configuration.
    pub fn new(config: &AppConfig) -> Self {
        Self {
            executor: ToolExecutor::new(config.converter.tool_timeout()),
            commands: ToolCommands::new(&config.tools, &config.converter),
            jpeg_quality: config.converter.jpeg_quality,
            limiter: Arc::new(Semaphore::new(config.converter.max_concurrent_jobs)),
        }
    }

    /// Tool command builder shared with the diagnostics probe.
    pub fn commands(&self) -> &ToolCommands {
        &self.commands
    }

    /// Run a conversion and return the final artifact.
    ///
    /// The request's scratch job is removed before this returns, whatever
    /// the outcome.
    #[instrument(
        skip(self, request),
        fields(operation = %request.operation, job_id = %request.job.id())
    )]
    pub async fn convert(
        &self,
        request: ConversionRequest,
    ) -> Result<ConversionOutput, ConversionError> {
        let ConversionRequest {
            operation,
            mut job,
            upload,
            resize,
        } = request;

        let start = Instant::now();
        let result = self.run(operation, &mut job, &upload, resize).await;
        job.finish().await;

        match result {
            Ok(bytes) => {
                info!(
                    size = bytes.len(),
                    duration_ms = start.elapsed().as_millis() as u64,
                    "Conversion completed"
                );
                Ok(ConversionOutput {
                    bytes,
                    content_type: operation.content_type(),
                    filename: operation.output_filename(),
                })
            }
            Err(e) => {
                error!(
                    error = %e,
                    stage = ?e.stage(),
                    stderr = e.tool_stderr().unwrap_or_default(),
                    duration_ms = start.elapsed().as_millis() as u64,
                    "Conversion failed"
                );
                Err(e)
            }
        }
    }

    async fn run(
        &self,
        operation: Operation,
        job: &mut ScratchJob,
        upload: &Upload,
        resize: Option<ResizeSpec>,
    ) -> Result<Bytes, ConversionError> {
        let output = match operation {
            Operation::WordToPdf | Operation::SpreadsheetToPdf => {
                let rendered = self.render_office(job, &upload.path).await?;
                self.downgrade(job, &rendered, Stage::Downgrade).await?
            }
            Operation::PdfToWord => {
                let out = job.path_for("converted.docx");
                let cmd = self.commands.pdf_to_docx(&upload.path, &out);
                self.run_tool(Stage::Script, &cmd, &out).await?;
                out
            }
            Operation::ImageToPdf => {
                let embedded = job.path_for("embedded.pdf");
                let pdf = pdf::image_to_pdf(&upload.path, &upload.original_name)
                    .await
                    .map_err(|e| e.at(Stage::Embed))?;
                tokio::fs::write(&embedded, pdf)
                    .await
                    .map_err(|e| ConversionError::from(e).at(Stage::Embed))?;
                self.downgrade(job, &embedded, Stage::Downgrade).await?
            }
            Operation::PdfToImage => {
                let base = job.path_for("page");
                let out = job.path_for("page.jpg");
                let cmd = self.commands.pdf_first_page_to_jpeg(&upload.path, &base);
                self.run_tool(Stage::Rasterize, &cmd, &out).await?;
                out
            }
            Operation::PngToJpg => {
                let out = job.path_for("converted.jpg");
                raster::recompress_to_jpeg(&upload.path, &out, self.jpeg_quality)
                    .await
                    .map_err(|e| e.at(Stage::Raster))?;
                out
            }
            Operation::ResizeImage => {
                let spec = resize.ok_or(ConversionError::InvalidResize)?;
                let out = job.path_for("resized.jpg");
                raster::resize_to_jpeg(&upload.path, &out, spec, self.jpeg_quality)
                    .await
                    .map_err(|e| e.at(Stage::Raster))?;
                out
            }
            Operation::CompressPdf => {
                let out = job.path_for("compressed.pdf");
                let cmd = self.commands.pdf_compress(&upload.path, &out);
                self.run_tool(Stage::Compress, &cmd, &out).await?;
                out
            }
            Operation::DowngradePdf => self.downgrade(job, &upload.path, Stage::Downgrade).await?,
        };

        Ok(Bytes::from(tokio::fs::read(&output).await?))
    }

    /// Render an office document; the renderer names its output after the
    /// input stem inside the `render` directory.
    async fn render_office(
        &self,
        job: &mut ScratchJob,
        input: &Path,
    ) -> Result<PathBuf, ConversionError> {
        let profile = job.path_for("lo-profile");
        let render_dir = job.path_for("render");
        tokio::fs::create_dir_all(&render_dir).await?;

        let stem = input
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "upload".to_string());
        let rendered = render_dir.join(format!("{stem}.pdf"));

        let cmd = self.commands.office_to_pdf(input, &profile, &render_dir);
        self.run_tool(Stage::Render, &cmd, &rendered).await?;
        Ok(rendered)
    }

    async fn downgrade(
        &self,
        job: &mut ScratchJob,
        input: &Path,
        stage: Stage,
    ) -> Result<PathBuf, ConversionError> {
        let out = job.path_for("downgraded.pdf");
        let cmd = self.commands.pdf_downgrade(input, &out);
        self.run_tool(stage, &cmd, &out).await?;
        Ok(out)
    }

    /// Run a tool under a concurrency slot and require a non-empty file at
    /// `expected`.
    async fn run_tool(
        &self,
        stage: Stage,
        cmd: &ToolInvocation,
        expected: &Path,
    ) -> Result<(), ConversionError> {
        // The limiter is never closed, so `acquire` only fails in theory.
        let permit = self.limiter.acquire().await.ok();
        let result = self.executor.run(cmd).await;
        drop(permit);

        result.map_err(|e| ConversionError::tool(stage, e))?;
        ensure_output(stage, expected).await
    }
}

async fn ensure_output(stage: Stage, path: &Path) -> Result<(), ConversionError> {
    match tokio::fs::metadata(path).await {
        Ok(meta) if meta.is_file() && meta.len() > 0 => Ok(()),
        _ => Err(ConversionError::OutputMissing {
            stage,
            path: path.to_path_buf(),
        }),
    }
}
