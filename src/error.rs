use thiserror::Error;

#[derive(Error, Debug)]
pub enum VisualizerError {
    /// The byte source could not be reached, or answered with a non-success status.
    #[error("unable to load MIDI file: {0}")]
    Network(String),

    /// A local file could not be read.
    #[error("failed to read MIDI file {path}: {reason}")]
    Read { path: String, reason: String },

    /// The bytes are not a parseable Standard MIDI File.
    #[error("unable to parse MIDI data: {0}")]
    Decode(String),

    /// The file parsed but holds no tracks. Rendered as an error state, never returned by a load.
    #[error("MIDI file contains no tracks")]
    EmptyScore,

    #[error("playback speed must be a positive number, got {0}")]
    InvalidSpeed(f64),

    /// A newer load was started before this one completed.
    #[error("load #{0} was superseded by a newer load")]
    Superseded(u64),
}

impl VisualizerError {
    /// Short text painted onto the surface and shown in the info panel.
    pub fn display_message(&self) -> &'static str {
        match self {
            VisualizerError::Network(_) => "Unable to load MIDI file",
            VisualizerError::Read { .. } => "Failed to read file",
            VisualizerError::Decode(_) => "Unable to parse MIDI data",
            VisualizerError::EmptyScore => "MIDI file contains no tracks",
            VisualizerError::InvalidSpeed(_) => "Invalid playback speed",
            VisualizerError::Superseded(_) => "Load superseded",
        }
    }
}

pub type VisualizerResult<T> = Result<T, VisualizerError>;
