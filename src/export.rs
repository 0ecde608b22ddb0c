//! Client-side export: capture the live card node and hand the PNG to a save sink.

pub mod capture;
pub mod node;
pub mod sink;

use std::{
    path::PathBuf,
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
    time::Duration,
};

use crate::foundation::error::{CardError, CardResult};

pub use capture::{CaptureBackend, CpuCapture, SvgCapture};
pub use node::{CardNode, LogoState};
pub use sink::{DirectorySink, MemorySink, SaveSink};

/// Default upper bound on one capture.
pub const DEFAULT_CAPTURE_TIMEOUT: Duration = Duration::from_secs(10);

/// Result of one export request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ExportOutcome {
    /// The PNG was handed to the sink.
    Saved {
        /// Suggested download name.
        file_name: String,
        /// Where the sink put it.
        path: PathBuf,
    },
    /// Another capture was still running; nothing was done.
    Busy,
    /// Capture or save failed; the reason was logged.
    Failed(String),
}

/// Download name for a company: whitespace runs become `_`, path separators and other
/// characters not allowed in file names become `_`, then `_yc_card.png` is appended.
pub fn export_file_name(company: &str) -> String {
    let mut out = String::with_capacity(company.len() + 12);
    let mut in_space = false;
    for c in company.chars() {
        if c.is_whitespace() {
            if !in_space {
                out.push('_');
            }
            in_space = true;
            continue;
        }
        in_space = false;
        if c.is_control() || matches!(c, '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|') {
            out.push('_');
        } else {
            out.push(c);
        }
    }
    out.push_str("_yc_card.png");
    out
}

/// Serialises captures of live nodes and saves the results.
#[derive(Clone)]
pub struct Exporter {
    backend: Arc<dyn CaptureBackend>,
    sink: Arc<dyn SaveSink>,
    in_progress: Arc<AtomicBool>,
    timeout: Duration,
}

struct InProgress<'a>(&'a AtomicBool);

impl Drop for InProgress<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl Exporter {
    /// Exporter capturing with `backend` and saving to `sink`.
    pub fn new(backend: Arc<dyn CaptureBackend>, sink: Arc<dyn SaveSink>) -> Self {
        Self {
            backend,
            sink,
            in_progress: Arc::new(AtomicBool::new(false)),
            timeout: DEFAULT_CAPTURE_TIMEOUT,
        }
    }

    /// Override the capture timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// `true` while a capture is running.
    pub fn in_progress(&self) -> bool {
        self.in_progress.load(Ordering::Acquire)
    }

    /// Capture `node` and save it. Never returns an error; see [`ExportOutcome`].
    #[tracing::instrument(level = "info", skip_all, fields(backend = self.backend.name(), company = node.model().company()))]
    pub async fn export(&self, node: &CardNode) -> ExportOutcome {
        if self
            .in_progress
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            tracing::debug!("export already in progress");
            return ExportOutcome::Busy;
        }
        let _guard = InProgress(&self.in_progress);

        match self.capture_and_save(node).await {
            Ok((file_name, path)) => {
                tracing::info!(file = %path.display(), "card exported");
                ExportOutcome::Saved { file_name, path }
            }
            Err(e) => {
                tracing::error!(error = %e, "error generating image");
                ExportOutcome::Failed(e.to_string())
            }
        }
    }

    async fn capture_and_save(&self, node: &CardNode) -> CardResult<(String, PathBuf)> {
        let file_name = export_file_name(node.model().company());

        let backend = Arc::clone(&self.backend);
        let owned = node.clone();
        let task = tokio::task::spawn_blocking(move || backend.capture(&owned));
        let png = tokio::time::timeout(self.timeout, task)
            .await
            .map_err(|_| CardError::capture(format!("timed out after {:?}", self.timeout)))?
            .map_err(|e| CardError::capture(format!("capture task failed: {e}")))??;

        let path = self.sink.save(&file_name, &png)?;
        Ok((file_name, path))
    }
}

#[cfg(test)]
#[path = "../tests/unit/export/exporter.rs"]
mod tests;
