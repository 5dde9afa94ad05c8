//! Command-line entry point: resolves a locator and prints the playback plan
//! the controller would follow for it.

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;

use motionsync::backend::remote::EmbedParams;
use motionsync::backend::Slot;
use motionsync::config::Settings;
use motionsync::core::time::{self, format_time};
use motionsync::core::{PlaybackOffset, SourceKind, VideoSource};
use motionsync::logging::init_tracing;

#[derive(Parser, Debug)]
#[command(name = "motionsync", version, about = "Plan a primary/overlay playback pair")]
struct Cli {
    /// Media path, direct URL or video page link
    locator: String,

    /// Overlay lead in seconds (0 to 20); defaults to the configured value
    #[arg(short, long)]
    offset: Option<f64>,

    /// Requested start position in seconds
    #[arg(short, long, default_value_t = 0.0)]
    start: f64,

    /// Settings file
    #[arg(short, long)]
    config: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let settings = match &cli.config {
        Some(path) => Settings::load(path)
            .with_context(|| format!("loading settings from {}", path.display()))?,
        None => Settings::default(),
    };
    init_tracing(settings.logging.level);

    let source = VideoSource::classify(&cli.locator)?;
    let offset =
        PlaybackOffset::from_seconds(cli.offset.unwrap_or(settings.sync.default_offset));
    let start = source.start_position(time::from_seconds(cli.start));
    let overlay_start = offset.overlay_target(start);
    tracing::debug!(locator = source.locator(), "plan resolved");

    println!("source:        {}", source.kind());
    println!("offset:        {offset}");
    println!("primary start: {}", format_time(start));
    println!("overlay start: {}", format_time(overlay_start));

    if let SourceKind::Remote { video_id } = source.kind() {
        for (slot, position) in [(Slot::Primary, start), (Slot::Overlay, overlay_start)] {
            let options = settings.remote_options(slot);
            let params = EmbedParams {
                host: options.embed_host,
                video_id: video_id.clone(),
                autoplay: settings.sync.autoplay,
                start: time::whole_seconds(position),
                muted: true,
                controls: options.show_controls,
            };
            println!("{slot} embed: {}", params.load_url()?);
        }
    }
    Ok(())
}
