//! Scripted rendering engine for testing.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use crate::backend::{BackendError, OpenOptions, RenderEngine};
use crate::document::SourceFormat;

use super::fixtures::PDF_BYTES;

/// What the engine does with a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineScript {
    /// Writes a small PDF to the requested output.
    Succeed,
    /// Opens the document but fails the export.
    Fail,
    /// Refuses to open the document.
    FailOpen,
    /// Claims the export worked without writing anything.
    ReportSuccessWithoutOutput,
    /// Panics in the middle of the export.
    Panic,
}

/// A call made on the engine, in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineCall {
    Acquire,
    Open {
        path: PathBuf,
        format: SourceFormat,
        options: OpenOptions,
    },
    Save {
        output: PathBuf,
    },
    Close,
    Release,
}

#[derive(Debug)]
struct EngineState {
    default: EngineScript,
    scripts: HashMap<PathBuf, EngineScript>,
    format_scripts: HashMap<SourceFormat, EngineScript>,
    delay: Duration,
    fail_acquire: bool,
    calls: Vec<EngineCall>,
    acquired: bool,
    overlap_detected: bool,
    current: Option<EngineScript>,
    saves: usize,
}

/// [`RenderEngine`] with scripted outcomes and overlap detection.
///
/// Clones share state, so a test keeps one handle while the adapter owns
/// another. An `acquire` while a previous context is still held flags an
/// overlap, which is how the serialization tests detect concurrent use.
///
/// # Example
///
/// ```rust,ignore
/// use hwpdf_core::testing::{EngineScript, ScriptedEngine};
///
/// let engine = ScriptedEngine::new();
/// engine.script("/tmp/hwpdf/a.hwp", EngineScript::Fail);
/// let adapter = BackendAdapter::new(engine.clone());
/// // ...
/// assert!(!engine.overlap_detected());
/// ```
#[derive(Debug, Clone)]
pub struct ScriptedEngine {
    state: Arc<Mutex<EngineState>>,
}

impl Default for ScriptedEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl ScriptedEngine {
    /// Creates an engine that succeeds on every document.
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(EngineState {
                default: EngineScript::Succeed,
                scripts: HashMap::new(),
                format_scripts: HashMap::new(),
                delay: Duration::ZERO,
                fail_acquire: false,
                calls: Vec::new(),
                acquired: false,
                overlap_detected: false,
                current: None,
                saves: 0,
            })),
        }
    }

    fn state(&self) -> MutexGuard<'_, EngineState> {
        self.state.lock().unwrap_or_else(|p| p.into_inner())
    }

    /// Sets the script for documents without their own.
    pub fn set_default(&self, script: EngineScript) {
        self.state().default = script;
    }

    /// Sets the script for one input path.
    pub fn script(&self, path: impl AsRef<Path>, script: EngineScript) {
        self.state()
            .scripts
            .insert(path.as_ref().to_path_buf(), script);
    }

    /// Sets the script for every document of `format` without its own.
    pub fn script_format(&self, format: SourceFormat, script: EngineScript) {
        self.state().format_scripts.insert(format, script);
    }

    /// Makes every export take `delay` while the context is held.
    pub fn set_delay(&self, delay: Duration) {
        self.state().delay = delay;
    }

    /// Makes `acquire` fail.
    pub fn fail_acquire(&self, fail: bool) {
        self.state().fail_acquire = fail;
    }

    /// Returns every call made so far.
    pub fn calls(&self) -> Vec<EngineCall> {
        self.state().calls.clone()
    }

    /// Number of `save_pdf` calls.
    pub fn save_count(&self) -> usize {
        self.state().saves
    }

    /// Whether a context is currently held.
    pub fn is_acquired(&self) -> bool {
        self.state().acquired
    }

    /// Whether two contexts were ever held at the same time.
    pub fn overlap_detected(&self) -> bool {
        self.state().overlap_detected
    }
}

impl RenderEngine for ScriptedEngine {
    fn name(&self) -> &str {
        "scripted"
    }

    fn acquire(&mut self) -> Result<(), BackendError> {
        let mut state = self.state();
        state.calls.push(EngineCall::Acquire);
        if state.fail_acquire {
            return Err(BackendError::context_unavailable("scripted acquire failure"));
        }
        if state.acquired {
            state.overlap_detected = true;
        }
        state.acquired = true;
        Ok(())
    }

    fn open(
        &mut self,
        path: &Path,
        format: SourceFormat,
        options: &OpenOptions,
    ) -> Result<(), BackendError> {
        let mut state = self.state();
        state.calls.push(EngineCall::Open {
            path: path.to_path_buf(),
            format,
            options: *options,
        });
        let script = state
            .scripts
            .get(path)
            .or_else(|| state.format_scripts.get(&format))
            .copied()
            .unwrap_or(state.default);
        if script == EngineScript::FailOpen {
            return Err(BackendError::OpenFailed {
                path: path.to_path_buf(),
                reason: "scripted open failure".to_string(),
            });
        }
        state.current = Some(script);
        Ok(())
    }

    fn save_pdf(&mut self, output: &Path) -> Result<(), BackendError> {
        let (script, delay) = {
            let mut state = self.state();
            state.calls.push(EngineCall::Save {
                output: output.to_path_buf(),
            });
            state.saves += 1;
            (state.current, state.delay)
        };

        if !delay.is_zero() {
            std::thread::sleep(delay);
        }

        match script {
            None => Err(BackendError::NoDocument),
            Some(EngineScript::Succeed) => {
                std::fs::write(output, PDF_BYTES)?;
                Ok(())
            }
            Some(EngineScript::Fail) => Err(BackendError::export_failed(
                "scripted export failure",
                Some("filter rejected document".to_string()),
            )),
            Some(EngineScript::ReportSuccessWithoutOutput) => Ok(()),
            Some(EngineScript::Panic) => panic!("scripted engine panic"),
            Some(EngineScript::FailOpen) => Err(BackendError::NoDocument),
        }
    }

    fn close_document(&mut self) {
        let mut state = self.state();
        state.calls.push(EngineCall::Close);
        state.current = None;
    }

    fn release(&mut self) {
        let mut state = self.state();
        state.calls.push(EngineCall::Release);
        state.acquired = false;
        state.current = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overlapping_acquire_is_detected() {
        let mut a = ScriptedEngine::new();
        let mut b = a.clone();

        a.acquire().unwrap();
        assert!(!a.overlap_detected());
        b.acquire().unwrap();
        assert!(a.overlap_detected());
    }

    #[test]
    fn test_per_path_script_overrides_default() {
        let dir = tempfile::TempDir::new().unwrap();
        let good = dir.path().join("good.hwp");
        let bad = dir.path().join("bad.hwp");

        let mut engine = ScriptedEngine::new();
        engine.script(&bad, EngineScript::FailOpen);

        engine.acquire().unwrap();
        assert!(engine
            .open(&bad, SourceFormat::Hwp, &OpenOptions::forced())
            .is_err());
        engine
            .open(&good, SourceFormat::Hwp, &OpenOptions::forced())
            .unwrap();
        engine.save_pdf(&dir.path().join("good.pdf")).unwrap();
        engine.release();

        assert!(dir.path().join("good.pdf").exists());
        assert_eq!(engine.save_count(), 1);
    }

    #[test]
    fn test_format_script_applies_below_path_script() {
        let dir = tempfile::TempDir::new().unwrap();
        let pinned = dir.path().join("pinned.hwpx");

        let mut engine = ScriptedEngine::new();
        engine.script_format(SourceFormat::Hwpx, EngineScript::FailOpen);
        engine.script(&pinned, EngineScript::Succeed);

        engine.acquire().unwrap();
        assert!(engine
            .open(&dir.path().join("other.hwpx"), SourceFormat::Hwpx, &OpenOptions::forced())
            .is_err());
        engine
            .open(&pinned, SourceFormat::Hwpx, &OpenOptions::forced())
            .unwrap();
        engine
            .open(&dir.path().join("plain.hwp"), SourceFormat::Hwp, &OpenOptions::forced())
            .unwrap();
    }

    #[test]
    fn test_save_without_open_fails() {
        let mut engine = ScriptedEngine::new();
        engine.acquire().unwrap();
        assert!(matches!(
            engine.save_pdf(Path::new("/nonexistent/out.pdf")),
            Err(BackendError::NoDocument)
        ));
    }
}
