use std::process::Stdio;

use anyhow::{bail, Result};
use tokio::process::Command;

use vidmark::Engine;

/// Report engine availability; exits non-zero when ffmpeg is unusable.
pub async fn cmd_check() -> Result<()> {
    let config = vidmark::config::load()?;

    let engine = Engine::instance(&config.compositor.ffmpeg_path);
    let ffmpeg = engine.load().await;
    match &ffmpeg {
        Ok(()) => println!("✅ ffmpeg: {}", config.compositor.ffmpeg_path),
        Err(e) => println!("❌ ffmpeg: {e}"),
    }

    let ffprobe_ok = Command::new(&config.compositor.ffprobe_path)
        .arg("-version")
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .await
        .map(|s| s.success())
        .unwrap_or(false);
    if ffprobe_ok {
        println!("✅ ffprobe: {}", config.compositor.ffprobe_path);
    } else {
        println!("❌ ffprobe: {}", config.compositor.ffprobe_path);
    }

    if ffmpeg.is_err() || !ffprobe_ok {
        bail!("transcoding engine not ready");
    }
    Ok(())
}
