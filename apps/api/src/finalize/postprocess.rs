//! The outline-flattening pass run over a composed proposal.
//!
//! `PostProcessor` is the seam; `Ghostscript` is the production implementation.
//! External programs run through `ExternalCommand`, which owns the timeout and
//! kills the child when it expires.

use std::ffi::{OsStr, OsString};
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;
use tracing::{debug, info};

/// Bytes of diagnostic output kept in a failure.
const OUTPUT_TAIL: usize = 2048;

/// Ghostscript executable names, in lookup order.
pub const GHOSTSCRIPT_NAMES: [&str; 3] = ["gs", "gswin64c", "gswin32c"];

#[derive(Debug, Error)]
pub enum PostProcessError {
    #[error("{program} was not found on PATH")]
    NotFound { program: String },

    #[error("failed to run {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{program} failed ({status}): {output}")]
    Failed {
        program: String,
        status: String,
        output: String,
    },

    #[error("{program} did not finish within {seconds}s")]
    TimedOut { program: String, seconds: u64 },
}

/// Turns a finished PDF at `input` into the deliverable at `output`.
#[async_trait]
pub trait PostProcessor: Send + Sync {
    async fn process(&self, input: &Path, output: &Path) -> Result<(), PostProcessError>;

    /// Name used in logs.
    fn name(&self) -> &str;
}

/// One invocation of an external program with a hard deadline.
#[derive(Debug, Clone)]
pub struct ExternalCommand {
    program: PathBuf,
    args: Vec<OsString>,
    timeout: Duration,
}

impl ExternalCommand {
    pub fn new(program: impl Into<PathBuf>, timeout: Duration) -> Self {
        ExternalCommand {
            program: program.into(),
            args: Vec::new(),
            timeout,
        }
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<OsString>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    fn label(&self) -> String {
        self.program.display().to_string()
    }

    /// Runs to completion. Non-zero exit and timeout are errors.
    pub async fn run(&self) -> Result<(), PostProcessError> {
        let program = self.label();
        debug!(%program, args = ?self.args, "Spawning external command");

        let child = tokio::process::Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| {
                if source.kind() == std::io::ErrorKind::NotFound {
                    PostProcessError::NotFound {
                        program: program.clone(),
                    }
                } else {
                    PostProcessError::Spawn {
                        program: program.clone(),
                        source,
                    }
                }
            })?;

        // Dropping the pending future on timeout drops the child, which kills it.
        let output = match tokio::time::timeout(self.timeout, child.wait_with_output()).await {
            Err(_) => {
                return Err(PostProcessError::TimedOut {
                    program,
                    seconds: self.timeout.as_secs(),
                })
            }
            Ok(result) => result.map_err(|source| PostProcessError::Spawn {
                program: program.clone(),
                source,
            })?,
        };

        if output.status.success() {
            return Ok(());
        }
        // Ghostscript reports most errors on stdout.
        let diagnostics = if output.stderr.iter().all(u8::is_ascii_whitespace) {
            &output.stdout
        } else {
            &output.stderr
        };
        Err(PostProcessError::Failed {
            program,
            status: output.status.to_string(),
            output: tail(diagnostics),
        })
    }
}

fn tail(bytes: &[u8]) -> String {
    let start = bytes.len().saturating_sub(OUTPUT_TAIL);
    String::from_utf8_lossy(&bytes[start..]).trim().to_string()
}

/// First executable named by `names` found in the directories of `path_var`.
/// Names are tried in order; each name is searched across every directory
/// before falling back to the next.
pub fn locate_in(path_var: &OsStr, names: &[&str]) -> Option<PathBuf> {
    let dirs: Vec<PathBuf> = std::env::split_paths(path_var).collect();
    names.iter().find_map(|name| {
        let file = format!("{name}{}", std::env::consts::EXE_SUFFIX);
        dirs.iter().map(|dir| dir.join(&file)).find(|candidate| candidate.is_file())
    })
}

/// Converts every glyph to vector outlines with Ghostscript's `pdfwrite` device.
#[derive(Debug, Clone)]
pub struct Ghostscript {
    program: Option<PathBuf>,
    timeout: Duration,
}

impl Ghostscript {
    /// Looks Ghostscript up on `PATH` at each run.
    pub fn new(timeout: Duration) -> Self {
        Ghostscript {
            program: None,
            timeout,
        }
    }

    /// Uses an explicit executable instead of searching `PATH`.
    pub fn with_program(program: impl Into<PathBuf>, timeout: Duration) -> Self {
        Ghostscript {
            program: Some(program.into()),
            timeout,
        }
    }

    pub fn arguments(input: &Path, output: &Path) -> Vec<OsString> {
        let mut output_flag = OsString::from("-sOutputFile=");
        output_flag.push(output);
        vec![
            "-dNOPAUSE".into(),
            "-dBATCH".into(),
            "-dSAFER".into(),
            "-dQUIET".into(),
            "-sDEVICE=pdfwrite".into(),
            "-dNoOutputFonts".into(),
            output_flag,
            input.as_os_str().to_os_string(),
        ]
    }

    fn resolve_program(&self) -> Result<PathBuf, PostProcessError> {
        if let Some(program) = &self.program {
            return Ok(program.clone());
        }
        let path_var = std::env::var_os("PATH").unwrap_or_default();
        locate_in(&path_var, &GHOSTSCRIPT_NAMES).ok_or_else(|| PostProcessError::NotFound {
            program: GHOSTSCRIPT_NAMES.join(" / "),
        })
    }
}

#[async_trait]
impl PostProcessor for Ghostscript {
    async fn process(&self, input: &Path, output: &Path) -> Result<(), PostProcessError> {
        let program = self.resolve_program()?;
        info!(program = %program.display(), "Flattening text to outlines");
        ExternalCommand::new(program, self.timeout)
            .args(Self::arguments(input, output))
            .run()
            .await
    }

    fn name(&self) -> &str {
        "ghostscript"
    }
}
