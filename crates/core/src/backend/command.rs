//! Rendering engine that runs a headless office suite per conversion.

use std::path::{Path, PathBuf};
use std::process::Stdio;
use tempfile::TempDir;
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::Command;
use tokio::runtime::Runtime;
use tokio::task::JoinHandle;
use tokio::time::{timeout, Duration};
use tracing::{debug, warn};

use super::config::BackendConfig;
use super::error::BackendError;
use super::traits::RenderEngine;
use super::types::OpenOptions;
use crate::document::SourceFormat;

/// Runs the configured engine program once per conversion.
///
/// `acquire` builds a private context (a scratch profile and output
/// directory plus a small runtime to supervise the child process) and
/// `release` throws it away, so nothing is shared between conversions.
pub struct CommandEngine {
    config: BackendConfig,
    session: Option<Session>,
}

struct Session {
    runtime: Runtime,
    scratch: TempDir,
    document: Option<OpenDocument>,
}

struct OpenDocument {
    path: PathBuf,
    format: SourceFormat,
    options: OpenOptions,
}

impl Session {
    fn profile_dir(&self) -> PathBuf {
        self.scratch.path().join("profile")
    }

    fn out_dir(&self) -> PathBuf {
        self.scratch.path().join("out")
    }
}

impl CommandEngine {
    /// Creates an engine with the given configuration.
    pub fn new(config: BackendConfig) -> Self {
        Self {
            config,
            session: None,
        }
    }

    /// Creates an engine with default configuration.
    pub fn with_defaults() -> Self {
        Self::new(BackendConfig::default())
    }

    /// Returns the engine configuration.
    pub fn config(&self) -> &BackendConfig {
        &self.config
    }
}

impl RenderEngine for CommandEngine {
    fn name(&self) -> &str {
        "command"
    }

    fn acquire(&mut self) -> Result<(), BackendError> {
        if self.session.is_some() {
            warn!("Engine context was not released by the previous call; releasing now");
            self.release();
        }

        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|e| BackendError::context_unavailable(format!("runtime: {}", e)))?;

        let scratch = tempfile::Builder::new()
            .prefix("hwpdf-engine-")
            .tempdir()
            .map_err(|e| BackendError::context_unavailable(format!("scratch dir: {}", e)))?;

        let session = Session {
            runtime,
            scratch,
            document: None,
        };
        std::fs::create_dir_all(session.profile_dir())?;
        std::fs::create_dir_all(session.out_dir())?;

        debug!(scratch = %session.scratch.path().display(), "Engine context acquired");
        self.session = Some(session);
        Ok(())
    }

    fn open(
        &mut self,
        path: &Path,
        format: SourceFormat,
        options: &OpenOptions,
    ) -> Result<(), BackendError> {
        let session = self
            .session
            .as_mut()
            .ok_or_else(|| BackendError::context_unavailable("engine not acquired"))?;

        if !path.is_file() {
            return Err(BackendError::OpenFailed {
                path: path.to_path_buf(),
                reason: "file not found".to_string(),
            });
        }

        session.document = Some(OpenDocument {
            path: path.to_path_buf(),
            format,
            options: *options,
        });
        Ok(())
    }

    fn save_pdf(&mut self, output: &Path) -> Result<(), BackendError> {
        let session = self
            .session
            .as_ref()
            .ok_or_else(|| BackendError::context_unavailable("engine not acquired"))?;
        let document = session.document.as_ref().ok_or(BackendError::NoDocument)?;

        let out_dir = session.out_dir();
        let vars = TemplateVars {
            input: &document.path,
            output,
            outdir: &out_dir,
            profile: &session.profile_dir(),
            filter: document.format.engine_filter(),
            open_options: &document.options.to_engine_string(),
        };
        let args = expand_args(&self.config.args, &vars);

        debug!(program = %self.config.program.display(), ?args, "Running engine");
        let (stdout, stderr) = session.runtime.block_on(run_with_deadline(
            &self.config.program,
            &args,
            self.config.timeout_secs,
        ))?;
        if !stdout.trim().is_empty() {
            debug!(stdout = %stdout.trim(), "Engine output");
        }

        if output.exists() {
            return Ok(());
        }

        // Directory-style engines name the result after the input stem.
        let stem = document
            .path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        let produced = out_dir.join(format!("{}.pdf", stem));
        if produced.exists() {
            move_file(&produced, output)?;
            return Ok(());
        }

        Err(BackendError::export_failed(
            "engine exited successfully but produced no PDF",
            non_empty(stderr),
        ))
    }

    fn close_document(&mut self) {
        if let Some(session) = self.session.as_mut() {
            session.document = None;
        }
    }

    fn release(&mut self) {
        // Dropping the session removes the scratch directory and shuts the
        // runtime down.
        if let Some(session) = self.session.take() {
            let scratch = session.scratch.path().to_path_buf();
            drop(session);
            debug!(scratch = %scratch.display(), "Engine context released");
        }
    }
}

struct TemplateVars<'a> {
    input: &'a Path,
    output: &'a Path,
    outdir: &'a Path,
    profile: &'a Path,
    filter: &'a str,
    open_options: &'a str,
}

fn expand_args(template: &[String], vars: &TemplateVars<'_>) -> Vec<String> {
    template
        .iter()
        .map(|arg| {
            arg.replace("{input}", &vars.input.to_string_lossy())
                .replace("{output}", &vars.output.to_string_lossy())
                .replace("{outdir}", &vars.outdir.to_string_lossy())
                .replace("{profile}", &vars.profile.to_string_lossy())
                .replace("{filter}", vars.filter)
                .replace("{open_options}", vars.open_options)
        })
        .collect()
}

/// How long captured pipes are drained after the engine exits. Helpers the
/// engine forked inherit the pipes and may keep them open indefinitely.
const PIPE_DRAIN_GRACE: Duration = Duration::from_millis(500);

/// Runs `program` in its own process group. The deadline covers the engine
/// process only; when it is breached the whole group is killed and the
/// engine reaped. Helpers still alive after a normal exit are killed too.
/// Returns captured stdout and stderr.
async fn run_with_deadline(
    program: &Path,
    args: &[String],
    timeout_secs: u64,
) -> Result<(String, String), BackendError> {
    let mut command = Command::new(program);
    command
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);
    #[cfg(unix)]
    command.process_group(0);

    let mut child = command.spawn().map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            BackendError::ProgramNotFound {
                path: program.to_path_buf(),
            }
        } else {
            BackendError::Io(e)
        }
    })?;
    let group = child.id();

    let stdout = tokio::spawn(read_pipe(child.stdout.take()));
    let stderr = tokio::spawn(read_pipe(child.stderr.take()));

    let status = match timeout(Duration::from_secs(timeout_secs), child.wait()).await {
        Ok(Ok(status)) => status,
        Ok(Err(e)) => {
            kill_group(group);
            let _ = child.kill().await;
            return Err(BackendError::Io(e));
        }
        Err(_) => {
            kill_group(group);
            let _ = child.kill().await;
            stdout.abort();
            stderr.abort();
            return Err(BackendError::Timeout { timeout_secs });
        }
    };

    kill_group(group);
    let stdout = drain(stdout).await;
    let stderr = drain(stderr).await;

    if status.success() {
        Ok((stdout, stderr))
    } else {
        Err(BackendError::export_failed(
            format!("engine exited with code: {:?}", status.code()),
            non_empty(stderr),
        ))
    }
}

/// Waits a bounded time for a pipe reader, keeping nothing if it is still
/// blocked.
async fn drain(reader: JoinHandle<String>) -> String {
    let abort = reader.abort_handle();
    match timeout(PIPE_DRAIN_GRACE, reader).await {
        Ok(Ok(text)) => text,
        Ok(Err(_)) => String::new(),
        Err(_) => {
            abort.abort();
            warn!("Engine output pipes still open after exit, dropping capture");
            String::new()
        }
    }
}

/// Kills every process left in the engine's process group.
#[cfg(unix)]
fn kill_group(group: Option<u32>) {
    let Some(pgid) = group.and_then(|id| libc::pid_t::try_from(id).ok()) else {
        return;
    };
    // SAFETY: killpg only sends a signal. The group was created for this
    // engine run by `process_group(0)`; ESRCH means it is already empty.
    let rc = unsafe { libc::killpg(pgid, libc::SIGKILL) };
    if rc == 0 {
        debug!(pgid, "Killed leftover engine processes");
    }
}

#[cfg(not(unix))]
fn kill_group(_group: Option<u32>) {}

async fn read_pipe<R: AsyncRead + Unpin>(pipe: Option<R>) -> String {
    let mut buf = Vec::new();
    if let Some(mut pipe) = pipe {
        let _ = pipe.read_to_end(&mut buf).await;
    }
    String::from_utf8_lossy(&buf).into_owned()
}

fn non_empty(s: String) -> Option<String> {
    if s.trim().is_empty() {
        None
    } else {
        Some(s)
    }
}

/// Moves a file, falling back to copy-and-delete across filesystems.
fn move_file(from: &Path, to: &Path) -> std::io::Result<()> {
    if std::fs::rename(from, to).is_ok() {
        return Ok(());
    }
    std::fs::copy(from, to)?;
    std::fs::remove_file(from)
}
