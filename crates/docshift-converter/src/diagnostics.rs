//! Dependency probe behind `GET /_diagnostics`.
//!
//! Runs each external converter's version command concurrently with a
//! fixed timeout and reports pass/fail per tool. No conversion is run.

use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::{DateTime, Utc};
use docshift_core::AppConfig;
use serde::Serialize;

use crate::executor::{ExecutorError, ToolExecutor, ToolInvocation};
use crate::scratch::ScratchSpace;
use crate::tools::ToolCommands;

/// Outcome of running one probe command.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ToolCheck {
    /// The command line that was run.
    pub cmd: String,
    /// Failure description, `None` when the probe succeeded.
    pub error: Option<String>,
    /// Captured standard output.
    pub stdout: String,
    /// Captured standard error.
    pub stderr: String,
}

impl ToolCheck {
    /// Whether the tool responded without error.
    pub fn passed(&self) -> bool {
        self.error.is_none()
    }
}

/// Individual checks of a diagnostics run.
#[derive(Debug, Clone, Serialize)]
pub struct DiagnosticsChecks {
    /// A probe file could be created and removed in the scratch root.
    #[serde(rename = "uploads_writable")]
    pub scratch_writable: bool,
    /// Configured interpreter for the PDF-to-docx script.
    pub python_bin_path: String,
    /// Whether that interpreter exists (directly or on `PATH`).
    pub python_bin_exists: bool,
    /// Whether the PDF-to-docx script exists.
    pub python_script_exists: bool,
    /// `gs -version`.
    pub gs: ToolCheck,
    /// `libreoffice --version`.
    pub libreoffice: ToolCheck,
    /// `pdftoppm -v`.
    pub pdftoppm: ToolCheck,
    /// `pdf2docx` import check.
    pub pdf2docx: ToolCheck,
}

/// Full diagnostics response.
#[derive(Debug, Clone, Serialize)]
pub struct DiagnosticsReport {
    /// `true` iff every critical check passed.
    pub ok: bool,
    /// When the probe ran.
    pub checked_at: DateTime<Utc>,
    /// Individual results.
    pub checks: DiagnosticsChecks,
}

/// Runs the dependency probe.
#[derive(Debug, Clone)]
pub struct Diagnostics {
    commands: ToolCommands,
    executor: ToolExecutor,
    scratch: ScratchSpace,
    timeout: Duration,
}

impl Diagnostics {
    /// Create a probe for the configured tools and scratch root.
    pub fn new(config: &AppConfig, scratch: ScratchSpace) -> Self {
        Self {
            commands: ToolCommands::new(&config.tools, &config.converter),
            executor: ToolExecutor::default(),
            scratch,
            timeout: config.diagnostics.timeout(),
        }
    }

    /// Probe every dependency concurrently.
    pub async fn run(&self) -> DiagnosticsReport {
        let (scratch_writable, gs, libreoffice, pdftoppm, pdf2docx) = futures::join!(
            self.scratch_writable(),
            self.check(self.commands.probe_ghostscript()),
            self.check(self.commands.probe_libreoffice()),
            self.check(self.commands.probe_pdftoppm()),
            self.check(self.commands.probe_pdf2docx()),
        );

        let tools = self.commands.tools();
        let checks = DiagnosticsChecks {
            scratch_writable,
            python_bin_path: tools.python.clone(),
            python_bin_exists: executable_exists(&tools.python),
            python_script_exists: Path::new(&tools.pdf_to_word_script).is_file(),
            gs,
            libreoffice,
            pdftoppm,
            pdf2docx,
        };

        let ok = checks.scratch_writable
            && [&checks.gs, &checks.libreoffice, &checks.pdftoppm, &checks.pdf2docx]
                .iter()
                .all(|c| c.passed());

        if !ok {
            tracing::warn!("Dependency diagnostics reported failures");
        }

        DiagnosticsReport {
            ok,
            checked_at: Utc::now(),
            checks,
        }
    }

    async fn scratch_writable(&self) -> bool {
        match self.scratch.probe_writable().await {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(
                    root = %self.scratch.root().display(),
                    error = %e,
                    "Scratch root is not writable"
                );
                false
            }
        }
    }

    async fn check(&self, invocation: ToolInvocation) -> ToolCheck {
        let cmd = invocation.display();
        match self
            .executor
            .run_with_timeout(&invocation, Some(self.timeout))
            .await
        {
            Ok(outcome) => ToolCheck {
                cmd,
                error: None,
                stdout: outcome.stdout,
                stderr: outcome.stderr,
            },
            Err(e) => {
                let (stdout, stderr) = match &e {
                    ExecutorError::ProcessFailed { stdout, stderr, .. } => {
                        (stdout.clone(), stderr.clone())
                    }
                    _ => (String::new(), String::new()),
                };
                ToolCheck {
                    cmd,
                    error: Some(e.to_string()),
                    stdout,
                    stderr,
                }
            }
        }
    }
}

/// Whether `program` names an existing file, either directly or through
/// `PATH` when it is a bare name.
fn executable_exists(program: &str) -> bool {
    let path = Path::new(program);
    if path.components().count() > 1 {
        return path.is_file();
    }
    std::env::var_os("PATH")
        .map(|paths| {
            std::env::split_paths(&paths)
                .map(|dir| dir.join(program))
                .any(|candidate: PathBuf| candidate.is_file())
        })
        .unwrap_or(false)
}
