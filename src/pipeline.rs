//! Orchestration from "annotation finalized" to "output ready"
//!
//! The coordinator owns no job state of its own: it resolves the overlay
//! geometry, derives a fresh output path, builds the engine command and
//! submits it, then relays the engine's callbacks to the caller's observer.
//! A busy engine surfaces as
//! [`BurnError::AlreadyRunning`](crate::error::BurnError::AlreadyRunning)
//! for the caller to present; nothing is queued or retried silently.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::Utc;
use tracing::{info, warn};

use crate::compositor::CompositorConfig;
use crate::engine::{Engine, JobObserver};
use crate::error::Result;
use crate::geometry::{fit_within, Dimensions, MediaGeometry};

/// Pipeline-wide configuration
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Directory completed videos are written to
    pub output_dir: PathBuf,
    /// Engine command settings
    pub compositor: CompositorConfig,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            output_dir: dirs::video_dir()
                .unwrap_or_else(std::env::temp_dir)
                .join("vidmark"),
            compositor: CompositorConfig::default(),
        }
    }
}

/// A finalized annotation ready to burn.
#[derive(Debug, Clone)]
pub struct BurnRequest {
    /// Source video
    pub video: PathBuf,
    /// Rendered overlay still image
    pub overlay: PathBuf,
    /// Source video geometry (dimensions + rotation)
    pub geometry: MediaGeometry,
    /// Pixel bounds of the canvas the annotation was drawn on
    pub canvas: Dimensions,
}

/// Drives the full burn sequence against one [`Engine`].
pub struct BurnPipeline {
    config: PipelineConfig,
    engine: Arc<Engine>,
}

impl BurnPipeline {
    #[must_use]
    pub fn new(config: PipelineConfig, engine: Arc<Engine>) -> Self {
        Self { config, engine }
    }

    #[must_use]
    pub fn engine(&self) -> &Arc<Engine> {
        &self.engine
    }

    #[must_use]
    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Handle a finalized overlay: resolve geometry, derive the output path,
    /// build the command and submit it. Returns the output path the job will
    /// produce; completion arrives through `observer`.
    ///
    /// # Errors
    ///
    /// [`BurnError::AlreadyRunning`] when a job is in flight (a busy signal,
    /// not a fault — retry after the current job completes), construction
    /// errors from the command builder, and `Io` errors if the output
    /// directory cannot be created.
    ///
    /// [`BurnError::AlreadyRunning`]: crate::error::BurnError::AlreadyRunning
    pub fn on_overlay_finalized(
        &self,
        request: &BurnRequest,
        observer: Arc<dyn JobObserver>,
    ) -> Result<PathBuf> {
        let overlay_dims = fit_within(request.geometry.normalized(), request.canvas);

        std::fs::create_dir_all(&self.config.output_dir)?;
        let output = self.derive_output_path(&request.video);

        let args = self.config.compositor.build_burn_args(
            &request.video,
            &request.overlay,
            overlay_dims,
            &output,
        )?;

        info!(
            "burning {} overlay at {overlay_dims} -> {}",
            request.video.display(),
            output.display()
        );
        self.engine
            .submit(args, output.clone(), Arc::new(Handoff { inner: observer }))?;
        Ok(output)
    }

    /// Timestamp-derived output path that does not already exist. Two jobs
    /// can never collide on disk: submissions are serialized by the engine
    /// and the collision counter covers same-millisecond reuse.
    fn derive_output_path(&self, video: &Path) -> PathBuf {
        let stem = video
            .file_stem()
            .map_or_else(|| "video".to_string(), |s| s.to_string_lossy().to_string());
        let ts = Utc::now().timestamp_millis();
        let mut candidate = self.config.output_dir.join(format!("{stem}-marked-{ts}.mp4"));
        let mut n = 1;
        while candidate.exists() {
            candidate = self
                .config
                .output_dir
                .join(format!("{stem}-marked-{ts}-{n}.mp4"));
            n += 1;
        }
        candidate
    }
}

/// Wraps the caller's observer to log the result handoff.
struct Handoff {
    inner: Arc<dyn JobObserver>,
}

impl JobObserver for Handoff {
    fn on_start(&self) {
        self.inner.on_start();
    }

    fn on_progress(&self, line: &str) {
        self.inner.on_progress(line);
    }

    fn on_success(&self, output: &Path) {
        info!("handing off result: {}", output.display());
        self.inner.on_success(output);
    }

    fn on_failure(&self, message: &str) {
        warn!("burn failed: {message}");
        self.inner.on_failure(message);
    }
}
