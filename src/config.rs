//! Tool configuration loaded from `~/.config/vidmark/config.toml`
//!
//! The file is optional; every field falls back to a default so a missing
//! file means stock behavior (ffmpeg/ffprobe from PATH, libx264/ultrafast,
//! outputs next to the platform video directory).

use std::path::PathBuf;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::compositor::CompositorConfig;
use crate::pipeline::PipelineConfig;

/// On-disk configuration file shape. All fields optional.
#[derive(Debug, Clone, Deserialize, Default)]
struct ConfigFile {
    ffmpeg_path: Option<String>,
    ffprobe_path: Option<String>,
    video_codec: Option<String>,
    preset: Option<String>,
    output_dir: Option<PathBuf>,
}

/// Load pipeline configuration, merging the config file (if present) over
/// defaults.
///
/// # Errors
///
/// Returns an error only if the file exists but cannot be read or parsed.
pub fn load() -> Result<PipelineConfig> {
    let mut config = PipelineConfig::default();
    let path = config_path();
    if !path.exists() {
        return Ok(config);
    }

    let content = std::fs::read_to_string(&path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let file: ConfigFile = toml::from_str(&content)
        .with_context(|| format!("invalid TOML in {}", path.display()))?;

    let CompositorConfig {
        ffmpeg_path,
        ffprobe_path,
        video_codec,
        preset,
    } = config.compositor;
    config.compositor = CompositorConfig {
        ffmpeg_path: file.ffmpeg_path.unwrap_or(ffmpeg_path),
        ffprobe_path: file.ffprobe_path.unwrap_or(ffprobe_path),
        video_codec: file.video_codec.unwrap_or(video_codec),
        preset: file.preset.unwrap_or(preset),
    };
    if let Some(dir) = file.output_dir {
        config.output_dir = dir;
    }
    Ok(config)
}

/// Path to the config file.
fn config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join("vidmark")
        .join("config.toml")
}
