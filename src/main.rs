//! `vidmark` CLI - annotate-and-burn workflow for local video files

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

mod cmd;

#[derive(Parser)]
#[command(name = "vidmark")]
#[command(about = "Burn annotation overlays into captured video")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Burn an overlay image into a video
    Burn {
        /// Source video file
        video: PathBuf,

        /// Overlay still image, as rendered by the annotation surface
        overlay: PathBuf,

        /// Canvas bounds the overlay was drawn at, as WxH
        /// (defaults to the video's on-screen size)
        #[arg(short, long)]
        canvas: Option<String>,

        /// Output directory (defaults to the configured one)
        #[arg(short, long)]
        output_dir: Option<PathBuf>,

        /// Video codec
        #[arg(long)]
        codec: Option<String>,

        /// Encoding speed/quality preset
        #[arg(long)]
        preset: Option<String>,
    },

    /// Show a video's dimensions and rotation metadata
    Probe {
        /// Video file to inspect
        video: PathBuf,

        /// Emit JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// Check that ffmpeg and ffprobe are available
    Check,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .with_target(false)
        .compact()
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Burn {
            video,
            overlay,
            canvas,
            output_dir,
            codec,
            preset,
        } => {
            cmd::burn::cmd_burn(
                &video,
                &overlay,
                canvas.as_deref(),
                output_dir,
                codec.as_deref(),
                preset.as_deref(),
            )
            .await
        }
        Commands::Probe { video, json } => cmd::probe::cmd_probe(&video, json).await,
        Commands::Check => cmd::check::cmd_check().await,
    }
}
