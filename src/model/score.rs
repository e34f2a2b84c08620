use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct Note {
    pub pitch: u8,
    pub start_seconds: f64,
    pub duration_seconds: f64,
    /// Kept from the source file; the renderer does not read it.
    pub velocity: u8,
}

impl Note {
    pub fn end_seconds(&self) -> f64 {
        self.start_seconds + self.duration_seconds
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct Track {
    /// MIDI channel 0..=15; channel 9 carries percussion by convention.
    pub channel: u8,
    pub name: String,
    pub notes: Vec<Note>,
}

/// A decoded MIDI file: everything the piano-roll needs to draw and time itself.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct Score {
    pub name: Option<String>,
    /// Time of the last note-off across all tracks.
    pub duration_seconds: f64,
    pub tempo_bpm: Option<f64>,
    /// File order, which is also draw order.
    pub tracks: Vec<Track>,
}

impl Score {
    /// Builds a score whose duration is derived from its notes.
    pub fn from_tracks(name: Option<String>, tracks: Vec<Track>) -> Self {
        let duration_seconds = tracks
            .iter()
            .flat_map(|track| track.notes.iter())
            .map(Note::end_seconds)
            .fold(0.0, f64::max);

        Self {
            name,
            duration_seconds,
            tempo_bpm: None,
            tracks,
        }
    }

    pub fn duration_ms(&self) -> f64 {
        self.duration_seconds * 1000.0
    }

    pub fn note_count(&self) -> usize {
        self.tracks.iter().map(|track| track.notes.len()).sum()
    }
}
