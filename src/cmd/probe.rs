use std::path::Path;

use anyhow::Result;

use vidmark::probe_geometry;

pub async fn cmd_probe(video: &Path, json: bool) -> Result<()> {
    let config = vidmark::config::load()?;
    let geometry = probe_geometry(&config.compositor.ffprobe_path, video).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&geometry)?);
    } else {
        println!("source:     {}", geometry.source());
        println!("rotation:   {}", geometry.rotation().degrees());
        println!("normalized: {}", geometry.normalized());
    }

    Ok(())
}
