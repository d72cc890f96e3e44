//! `vidmark` - Burn annotation overlays into captured video
//!
//! # Features
//!
//! - **Geometry resolution**: aspect-preserving fit between a video's
//!   post-rotation dimensions and the annotation canvas
//! - **Command construction**: deterministic scale-then-overlay ffmpeg
//!   filter graphs
//! - **Single-flight execution**: at most one transcode in flight, with
//!   start/progress/success/failure callbacks and a cancellation hook
//! - **Media probing**: dimensions and rotation metadata via ffprobe
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use vidmark::{BurnPipeline, BurnRequest, Dimensions, Engine, PipelineConfig};
//!
//! # struct Printer;
//! # impl vidmark::JobObserver for Printer {
//! #     fn on_start(&self) {}
//! #     fn on_progress(&self, _: &str) {}
//! #     fn on_success(&self, _: &std::path::Path) {}
//! #     fn on_failure(&self, _: &str) {}
//! # }
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = PipelineConfig::default();
//!     let engine = Engine::instance(&config.compositor.ffmpeg_path);
//!     engine.load().await?;
//!
//!     let geometry = vidmark::probe_geometry(
//!         &config.compositor.ffprobe_path,
//!         "clip.mp4".as_ref(),
//!     )
//!     .await?;
//!
//!     let pipeline = BurnPipeline::new(config, engine);
//!     let request = BurnRequest {
//!         video: "clip.mp4".into(),
//!         overlay: "overlay.png".into(),
//!         geometry,
//!         canvas: Dimensions::new(1080, 1920)?,
//!     };
//!     let output = pipeline.on_overlay_finalized(&request, Arc::new(Printer))?;
//!     println!("writing {}", output.display());
//!     Ok(())
//! }
//! ```

pub mod compositor;
pub mod config;
pub mod engine;
pub mod error;
pub mod geometry;
pub mod pipeline;
pub mod probe;

pub use compositor::CompositorConfig;
pub use engine::{Engine, JobObserver, JobPhase};
pub use error::{BurnError, Result};
pub use geometry::{fit_within, Dimensions, MediaGeometry, Rotation};
pub use pipeline::{BurnPipeline, BurnRequest, PipelineConfig};
pub use probe::probe_geometry;

/// Version of vidmark
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
