use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "MIDI_ROLL",
    about = "Play a MIDI file back as a scrolling piano-roll!"
)]
pub struct Args {
    /// Path (or file:// URL) of the target MIDI file.
    pub midi: String,

    /// Width of the piano-roll viewport in pixels.
    #[arg(long, default_value_t = 960)]
    pub width: u32,

    /// Height of the piano-roll viewport in pixels.
    #[arg(long, default_value_t = 540)]
    pub height: u32,

    /// Playback speed multiplier (1.0 is real time).
    #[arg(short, long, default_value = "1.0")]
    pub speed: String,

    /// Start playback from this position, in milliseconds.
    #[arg(long = "seek-ms", default_value_t = 0.0)]
    pub seek_ms: f64,

    /// Frames per second for the playback loop.
    #[arg(long, default_value_t = 60)]
    pub fps: u32,

    /// YAML file overriding the default visualizer options.
    #[arg(short, long)]
    pub options: Option<PathBuf>,

    /// Render a single frame at the seek position into this PNG file and exit.
    #[arg(long)]
    pub snapshot: Option<PathBuf>,

    /// Dry run (print a summary of the decoded tracks and exit).
    #[arg(short, long, default_value_t = false)]
    pub dry_run: bool,

    /// Logs the playback position once per second while playing.
    #[arg(short, long)]
    pub verbose: bool,
}
