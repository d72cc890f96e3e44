use std::path::{Path, PathBuf};
use std::sync::{mpsc, Arc};

use anyhow::{anyhow, Context, Result};

use vidmark::{probe_geometry, BurnPipeline, BurnRequest, Dimensions, Engine, JobObserver};

/// Prints engine console lines and reports the terminal outcome back to the
/// command through a channel.
struct CliObserver {
    tx: mpsc::Sender<std::result::Result<PathBuf, String>>,
}

impl JobObserver for CliObserver {
    fn on_start(&self) {
        eprintln!("⏳ Transcoding started");
    }

    fn on_progress(&self, line: &str) {
        eprintln!("   {line}");
    }

    fn on_success(&self, output: &Path) {
        let _ = self.tx.send(Ok(output.to_path_buf()));
    }

    fn on_failure(&self, message: &str) {
        let _ = self.tx.send(Err(message.to_string()));
    }
}

pub async fn cmd_burn(
    video: &Path,
    overlay: &Path,
    canvas: Option<&str>,
    output_dir: Option<PathBuf>,
    codec: Option<&str>,
    preset: Option<&str>,
) -> Result<()> {
    let mut config = vidmark::config::load()?;
    if let Some(dir) = output_dir {
        config.output_dir = dir;
    }
    if let Some(codec) = codec {
        config.compositor.video_codec = codec.to_string();
    }
    if let Some(preset) = preset {
        config.compositor.preset = preset.to_string();
    }

    // Cheap argument validation before any engine work.
    let canvas_override = canvas.map(parse_canvas).transpose()?;

    eprintln!("🎬 Burning overlay into: {}", video.display());
    eprintln!("   Overlay: {}", overlay.display());

    let engine = Engine::instance(&config.compositor.ffmpeg_path);
    engine
        .load()
        .await
        .context("transcoding engine unavailable")?;

    let geometry = probe_geometry(&config.compositor.ffprobe_path, video).await?;
    eprintln!(
        "   Source: {} (rotation {})",
        geometry.source(),
        geometry.rotation().degrees()
    );

    let canvas = canvas_override.unwrap_or_else(|| geometry.normalized());

    let pipeline = BurnPipeline::new(config, engine);
    let (tx, rx) = mpsc::channel();
    let request = BurnRequest {
        video: video.to_path_buf(),
        overlay: overlay.to_path_buf(),
        geometry,
        canvas,
    };
    let output = pipeline.on_overlay_finalized(&request, Arc::new(CliObserver { tx }))?;
    eprintln!("   Writing: {}", output.display());

    let outcome = tokio::task::spawn_blocking(move || rx.recv())
        .await?
        .context("job ended without reporting an outcome")?;

    match outcome {
        Ok(path) => {
            eprintln!("✅ Done: {}", path.display());
            Ok(())
        }
        Err(message) => Err(anyhow!("transcode failed: {message}")),
    }
}

fn parse_canvas(spec: &str) -> Result<Dimensions> {
    let (w, h) = spec
        .split_once('x')
        .ok_or_else(|| anyhow!("canvas must be WxH, e.g. 1080x1920"))?;
    let width = w.trim().parse().context("invalid canvas width")?;
    let height = h.trim().parse().context("invalid canvas height")?;
    Ok(Dimensions::new(width, height)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canvas_spec_parses() {
        let dims = parse_canvas("1080x1920").unwrap();
        assert_eq!(dims.width(), 1080);
        assert_eq!(dims.height(), 1920);

        assert!(parse_canvas("1080").is_err());
        assert!(parse_canvas("0x1920").is_err());
        assert!(parse_canvas("axb").is_err());
    }
}
