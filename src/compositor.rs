//! ffmpeg command construction for the scale-then-overlay filter graph
//!
//! The burn command takes two inputs (video first, overlay image second),
//! scales the overlay to the resolved canvas dimensions and composites it at
//! the top-left corner:
//!
//! ```text
//! -y -i in.mp4 -i overlay.png \
//!     -filter_complex "[1:v]scale=W:H[ovrl];[0:v][ovrl]overlay=x=0:y=0" \
//!     -c:v libx264 -preset ultrafast out.mp4
//! ```
//!
//! The argument order and flag spelling above are the contract the external
//! engine depends on; the builder is deterministic so parity tests can assert
//! on the exact vector.

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{BurnError, Result};
use crate::geometry::Dimensions;

/// Configuration for the compositing command
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompositorConfig {
    /// Path to the ffmpeg binary
    pub ffmpeg_path: String,
    /// Path to the ffprobe binary
    pub ffprobe_path: String,
    /// Target video codec
    pub video_codec: String,
    /// Encoding speed/quality preset
    pub preset: String,
}

impl Default for CompositorConfig {
    fn default() -> Self {
        Self {
            ffmpeg_path: which::which("ffmpeg").map_or_else(
                |_| "ffmpeg".to_string(),
                |p| p.to_string_lossy().to_string(),
            ),
            ffprobe_path: which::which("ffprobe").map_or_else(
                |_| "ffprobe".to_string(),
                |p| p.to_string_lossy().to_string(),
            ),
            video_codec: "libx264".to_string(),
            preset: "ultrafast".to_string(),
        }
    }
}

impl CompositorConfig {
    /// Set the video codec
    #[must_use]
    pub fn with_codec(mut self, codec: &str) -> Self {
        self.video_codec = codec.to_string();
        self
    }

    /// Set the encoding preset
    #[must_use]
    pub fn with_preset(mut self, preset: &str) -> Self {
        self.preset = preset.to_string();
        self
    }

    /// Filter graph scaling the overlay input to `dims` and compositing it
    /// onto the video at (0,0). Built fresh per invocation since it embeds
    /// the resolved dimensions.
    #[must_use]
    pub fn overlay_filter(dims: Dimensions) -> String {
        format!(
            "[1:v]scale={}:{}[ovrl];[0:v][ovrl]overlay=x=0:y=0",
            dims.width(),
            dims.height()
        )
    }

    /// Build the full burn argument list.
    ///
    /// Performs no I/O. Dimensions are valid by construction; paths must be
    /// non-empty.
    ///
    /// # Errors
    ///
    /// Returns [`BurnError::EmptyPath`] if any path argument is empty.
    pub fn build_burn_args(
        &self,
        video: &Path,
        overlay: &Path,
        overlay_dims: Dimensions,
        output: &Path,
    ) -> Result<Vec<String>> {
        let video = non_empty(video, "video")?;
        let overlay = non_empty(overlay, "overlay")?;
        let output = non_empty(output, "output")?;

        let args = vec![
            "-y".to_string(),
            "-i".to_string(),
            video,
            "-i".to_string(),
            overlay,
            "-filter_complex".to_string(),
            Self::overlay_filter(overlay_dims),
            "-c:v".to_string(),
            self.video_codec.clone(),
            "-preset".to_string(),
            self.preset.clone(),
            output,
        ];

        debug!("burn args: {:?}", args);
        Ok(args)
    }
}

fn non_empty(path: &Path, what: &'static str) -> Result<String> {
    if path.as_os_str().is_empty() {
        return Err(BurnError::EmptyPath(what));
    }
    Ok(path.to_string_lossy().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn config() -> CompositorConfig {
        CompositorConfig {
            ffmpeg_path: "ffmpeg".to_string(),
            ffprobe_path: "ffprobe".to_string(),
            video_codec: "libx264".to_string(),
            preset: "ultrafast".to_string(),
        }
    }

    fn dims(w: u32, h: u32) -> Dimensions {
        Dimensions::new(w, h).unwrap()
    }

    #[test]
    fn overlay_filter_embeds_dimensions() {
        let filter = CompositorConfig::overlay_filter(dims(1080, 607));
        assert_eq!(filter, "[1:v]scale=1080:607[ovrl];[0:v][ovrl]overlay=x=0:y=0");
    }

    #[test]
    fn burn_args_exact_shape() {
        let args = config()
            .build_burn_args(
                Path::new("/videos/in.mp4"),
                Path::new("/tmp/ov.png"),
                dims(1080, 607),
                Path::new("/videos/out.mp4"),
            )
            .unwrap();

        assert_eq!(
            args,
            vec![
                "-y",
                "-i",
                "/videos/in.mp4",
                "-i",
                "/tmp/ov.png",
                "-filter_complex",
                "[1:v]scale=1080:607[ovrl];[0:v][ovrl]overlay=x=0:y=0",
                "-c:v",
                "libx264",
                "-preset",
                "ultrafast",
                "/videos/out.mp4",
            ]
        );
    }

    #[test]
    fn burn_args_deterministic() {
        let cfg = config();
        let a = cfg
            .build_burn_args(
                Path::new("a.mp4"),
                Path::new("b.png"),
                dims(640, 480),
                Path::new("c.mp4"),
            )
            .unwrap();
        let b = cfg
            .build_burn_args(
                Path::new("a.mp4"),
                Path::new("b.png"),
                dims(640, 480),
                Path::new("c.mp4"),
            )
            .unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn changing_dims_changes_only_scale_token() {
        let cfg = config();
        let a = cfg
            .build_burn_args(
                Path::new("a.mp4"),
                Path::new("b.png"),
                dims(640, 480),
                Path::new("c.mp4"),
            )
            .unwrap();
        let b = cfg
            .build_burn_args(
                Path::new("a.mp4"),
                Path::new("b.png"),
                dims(1080, 607),
                Path::new("c.mp4"),
            )
            .unwrap();

        let diffs: Vec<usize> = (0..a.len()).filter(|&i| a[i] != b[i]).collect();
        assert_eq!(diffs.len(), 1);
        assert!(a[diffs[0]].contains("scale=640:480"));
        assert!(b[diffs[0]].contains("scale=1080:607"));
    }

    #[test]
    fn inputs_ordered_video_then_overlay() {
        let args = config()
            .build_burn_args(
                Path::new("video.mp4"),
                Path::new("overlay.png"),
                dims(100, 100),
                Path::new("out.mp4"),
            )
            .unwrap();

        let video_idx = args.iter().position(|a| a == "video.mp4").unwrap();
        let overlay_idx = args.iter().position(|a| a == "overlay.png").unwrap();
        assert!(video_idx < overlay_idx);
        assert_eq!(args[video_idx - 1], "-i");
        assert_eq!(args[overlay_idx - 1], "-i");
    }

    #[test]
    fn empty_paths_rejected() {
        let cfg = config();
        let err = cfg
            .build_burn_args(
                Path::new(""),
                Path::new("b.png"),
                dims(1, 1),
                Path::new("c.mp4"),
            )
            .unwrap_err();
        assert!(matches!(err, BurnError::EmptyPath("video")));

        let err = cfg
            .build_burn_args(
                Path::new("a.mp4"),
                Path::new(""),
                dims(1, 1),
                Path::new("c.mp4"),
            )
            .unwrap_err();
        assert!(matches!(err, BurnError::EmptyPath("overlay")));

        let err = cfg
            .build_burn_args(
                PathBuf::from("a.mp4").as_path(),
                Path::new("b.png"),
                dims(1, 1),
                Path::new(""),
            )
            .unwrap_err();
        assert!(matches!(err, BurnError::EmptyPath("output")));
    }
}
