//! Media geometry discovery via ffprobe
//!
//! The editing collaborator needs the video's pixel size and rotation before
//! it can size the annotation canvas. ffprobe reports raw stream dimensions;
//! rotation comes from display-matrix side data on modern files or the
//! legacy `rotate` stream tag on older ones.

use std::path::Path;
use std::process::Stdio;

use serde::Deserialize;
use tokio::process::Command;
use tracing::debug;

use crate::error::{BurnError, Result};
use crate::geometry::{Dimensions, MediaGeometry, Rotation};

#[derive(Debug, Deserialize)]
struct ProbeOutput {
    #[serde(default)]
    streams: Vec<ProbeStream>,
}

#[derive(Debug, Deserialize)]
struct ProbeStream {
    codec_type: String,
    width: Option<u32>,
    height: Option<u32>,
    #[serde(default)]
    side_data_list: Vec<SideData>,
    #[serde(default)]
    tags: ProbeTags,
}

#[derive(Debug, Deserialize)]
struct SideData {
    rotation: Option<f64>,
}

#[derive(Debug, Deserialize, Default)]
struct ProbeTags {
    rotate: Option<String>,
}

impl ProbeStream {
    /// Rotation in degrees. The display matrix reports counter-clockwise
    /// rotation, often negative; `Rotation::from_degrees` normalizes.
    fn rotation_degrees(&self) -> i64 {
        if let Some(r) = self.side_data_list.iter().find_map(|s| s.rotation) {
            return r as i64;
        }
        self.tags
            .rotate
            .as_deref()
            .and_then(|r| r.parse::<i64>().ok())
            .unwrap_or(0)
    }
}

/// Probe a video file for its [`MediaGeometry`].
///
/// # Errors
///
/// Returns [`BurnError::ProbeFailed`] if ffprobe cannot run or exits
/// non-zero, [`BurnError::NoVideoStream`] if the file has no video stream,
/// and [`BurnError::InvalidDimensions`] / [`BurnError::UnsupportedRotation`]
/// if the reported metadata is unusable.
pub async fn probe_geometry(ffprobe_path: &str, video: &Path) -> Result<MediaGeometry> {
    let output = Command::new(ffprobe_path)
        .args([
            "-v",
            "quiet",
            "-print_format",
            "json",
            "-show_streams",
            "-select_streams",
            "v:0",
        ])
        .arg(video)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .output()
        .await
        .map_err(|e| BurnError::ProbeFailed(format!("failed to run {ffprobe_path}: {e}")))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(BurnError::ProbeFailed(format!(
            "ffprobe exited with {}: {}",
            output.status,
            stderr.trim()
        )));
    }

    let parsed: ProbeOutput = serde_json::from_slice(&output.stdout)?;
    let geometry = geometry_from_streams(parsed, video)?;
    debug!(
        "probed {}: {} rotation {}",
        video.display(),
        geometry.source(),
        geometry.rotation().degrees()
    );
    Ok(geometry)
}

fn geometry_from_streams(parsed: ProbeOutput, video: &Path) -> Result<MediaGeometry> {
    let stream = parsed
        .streams
        .into_iter()
        .find(|s| s.codec_type == "video")
        .ok_or_else(|| BurnError::NoVideoStream(video.display().to_string()))?;

    let width = stream.width.unwrap_or(0);
    let height = stream.height.unwrap_or(0);
    let source = Dimensions::new(width, height)?;
    let rotation = Rotation::from_degrees(stream.rotation_degrees())?;
    Ok(MediaGeometry::new(source, rotation))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(json: &str) -> ProbeOutput {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn geometry_from_plain_stream() {
        let parsed = parse(
            r#"{"streams":[{"codec_type":"video","width":1920,"height":1080}]}"#,
        );
        let geo = geometry_from_streams(parsed, Path::new("a.mp4")).unwrap();
        assert_eq!(geo.source(), Dimensions::new(1920, 1080).unwrap());
        assert_eq!(geo.rotation(), Rotation::None);
        assert_eq!(geo.normalized(), geo.source());
    }

    #[test]
    fn rotation_from_display_matrix() {
        let parsed = parse(
            r#"{"streams":[{"codec_type":"video","width":1080,"height":1920,
                "side_data_list":[{"side_data_type":"Display Matrix","rotation":-90}]}]}"#,
        );
        let geo = geometry_from_streams(parsed, Path::new("a.mp4")).unwrap();
        assert_eq!(geo.rotation(), Rotation::ThreeQuarter);
        assert_eq!(geo.normalized(), Dimensions::new(1920, 1080).unwrap());
    }

    #[test]
    fn rotation_from_legacy_tag() {
        let parsed = parse(
            r#"{"streams":[{"codec_type":"video","width":1080,"height":1920,
                "tags":{"rotate":"90"}}]}"#,
        );
        let geo = geometry_from_streams(parsed, Path::new("a.mp4")).unwrap();
        assert_eq!(geo.rotation(), Rotation::Quarter);
        assert_eq!(geo.normalized(), Dimensions::new(1920, 1080).unwrap());
    }

    #[test]
    fn missing_video_stream_is_an_error() {
        let parsed = parse(r#"{"streams":[{"codec_type":"audio"}]}"#);
        let err = geometry_from_streams(parsed, Path::new("a.mp4")).unwrap_err();
        assert!(matches!(err, BurnError::NoVideoStream(_)));
    }

    #[test]
    fn zero_dimensions_rejected() {
        let parsed = parse(r#"{"streams":[{"codec_type":"video","width":0,"height":1080}]}"#);
        assert!(matches!(
            geometry_from_streams(parsed, Path::new("a.mp4")),
            Err(BurnError::InvalidDimensions { .. })
        ));
    }

    #[tokio::test]
    async fn probe_missing_binary_fails() {
        let err = probe_geometry("/nonexistent/prober-xyz", Path::new("a.mp4"))
            .await
            .unwrap_err();
        assert!(matches!(err, BurnError::ProbeFailed(_)));
    }
}
