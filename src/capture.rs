//! Render operation capture.
//!
//! Records every render operation the engine emits to an NDJSON file,
//! one line per operation with a sequence number and timestamp. The
//! resulting trace replays what the renderer was told, in order, which
//! is the whole observable output of a headless run.

use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, warn};

use crate::error::TideloopError;
use crate::render::{RenderOp, Renderer};

/// A single captured render operation.
#[derive(Debug, Serialize)]
struct CaptureEntry<'a> {
    /// Monotonic sequence number within this capture file.
    seq: u64,
    /// ISO 8601 timestamp.
    timestamp: String,
    /// The render operation.
    #[serde(flatten)]
    op: &'a RenderOp,
}

/// Writer for render operation capture files.
///
/// Writes NDJSON (newline-delimited JSON) lines. Thread-safe via
/// internal `Mutex`.
pub struct CaptureWriter {
    // std::sync::Mutex is intentional: held briefly for buffered write + flush,
    // never across .await points.
    writer: Mutex<BufWriter<File>>,
    path: PathBuf,
    seq: AtomicU64,
}

impl CaptureWriter {
    /// Opens (or creates) the capture file at `path` for appending.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened.
    pub fn create(path: &Path) -> Result<Self, TideloopError> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        debug!(path = %path.display(), "capture file opened");
        Ok(Self {
            writer: Mutex::new(BufWriter::new(file)),
            path: path.to_path_buf(),
            seq: AtomicU64::new(0),
        })
    }

    /// Records one render operation as a single NDJSON line.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or I/O fails.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn record(&self, op: &RenderOp) -> Result<(), TideloopError> {
        let entry = CaptureEntry {
            seq: self.seq.fetch_add(1, Ordering::SeqCst),
            timestamp: chrono::Utc::now().to_rfc3339(),
            op,
        };
        let line = serde_json::to_string(&entry)?;
        let mut writer = self.writer.lock().expect("capture writer lock poisoned");
        writeln!(writer, "{line}")?;
        writer.flush()?;
        drop(writer);
        Ok(())
    }

    /// Returns the path to the capture file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Renderer decorator that captures every operation before forwarding
/// it to the wrapped renderer.
///
/// Capture failures are logged and swallowed; a full disk must not
/// stall the animation.
pub struct CapturingRenderer {
    inner: Arc<dyn Renderer>,
    writer: Arc<CaptureWriter>,
}

impl CapturingRenderer {
    #[must_use]
    pub fn new(inner: Arc<dyn Renderer>, writer: Arc<CaptureWriter>) -> Self {
        Self { inner, writer }
    }
}

impl Renderer for CapturingRenderer {
    fn apply(&self, op: RenderOp) {
        if let Err(err) = self.writer.record(&op) {
            warn!(error = %err, "failed to capture render op");
        }
        self.inner.apply(op);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::{Actor, NullRenderer};

    #[test]
    fn records_sequenced_ndjson_lines() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("run.jsonl");
        let writer = CaptureWriter::create(&path).expect("create");

        writer
            .record(&RenderOp::SetOpacity {
                actor: Actor::Figure,
                opacity: 1.0,
            })
            .expect("record");
        writer
            .record(&RenderOp::ClearParticles)
            .expect("record");

        let contents = std::fs::read_to_string(&path).expect("read back");
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines.len(), 2);

        let first: serde_json::Value = serde_json::from_str(lines[0]).expect("valid json");
        assert_eq!(first["seq"], 0);
        assert_eq!(first["op"], "set_opacity");
        assert_eq!(first["actor"], "figure");
        let second: serde_json::Value = serde_json::from_str(lines[1]).expect("valid json");
        assert_eq!(second["seq"], 1);
        assert_eq!(second["op"], "clear_particles");
    }

    #[test]
    fn capturing_renderer_forwards_and_records() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("run.jsonl");
        let writer = Arc::new(CaptureWriter::create(&path).expect("create"));
        let renderer = CapturingRenderer::new(Arc::new(NullRenderer), writer);

        renderer.apply(RenderOp::ShowBreathOverlay);
        let contents = std::fs::read_to_string(&path).expect("read back");
        assert_eq!(contents.lines().count(), 1);
    }
}
