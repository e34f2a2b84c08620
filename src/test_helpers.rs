//! Fixtures shared by the unit tests: synthesised MIDI files and a surface that records draw calls.

use crate::model::score::{Note, Score, Track};
use crate::render::{Color, Rect, Surface};
use midly::num::{u15, u24, u28, u4, u7};
use midly::{Format, Header, MetaMessage, MidiMessage, Smf, Timing, TrackEvent, TrackEventKind};

pub fn smf_bytes(ticks_per_quarter: u16, tracks: Vec<Vec<TrackEvent<'static>>>) -> Vec<u8> {
    let mut smf = Smf::new(Header::new(
        Format::Parallel,
        Timing::Metrical(u15::new(ticks_per_quarter)),
    ));
    smf.tracks = tracks;

    let mut bytes = Vec::new();
    smf.write_std(&mut bytes).expect("writing to a Vec cannot fail");
    bytes
}

pub fn note_on(delta: u32, channel: u8, key: u8, vel: u8) -> TrackEvent<'static> {
    TrackEvent {
        delta: u28::new(delta),
        kind: TrackEventKind::Midi {
            channel: u4::new(channel),
            message: MidiMessage::NoteOn {
                key: u7::new(key),
                vel: u7::new(vel),
            },
        },
    }
}

pub fn note_off(delta: u32, channel: u8, key: u8) -> TrackEvent<'static> {
    TrackEvent {
        delta: u28::new(delta),
        kind: TrackEventKind::Midi {
            channel: u4::new(channel),
            message: MidiMessage::NoteOff {
                key: u7::new(key),
                vel: u7::new(0),
            },
        },
    }
}

pub fn track_name(name: &'static str) -> TrackEvent<'static> {
    TrackEvent {
        delta: u28::new(0),
        kind: TrackEventKind::Meta(MetaMessage::TrackName(name.as_bytes())),
    }
}

pub fn tempo(delta: u32, mpqn: u32) -> TrackEvent<'static> {
    TrackEvent {
        delta: u28::new(delta),
        kind: TrackEventKind::Meta(MetaMessage::Tempo(u24::new(mpqn))),
    }
}

pub fn end_of_track(delta: u32) -> TrackEvent<'static> {
    TrackEvent {
        delta: u28::new(delta),
        kind: TrackEventKind::Meta(MetaMessage::EndOfTrack),
    }
}

/// A single-track file with one note per `(pitch, start_quarter, length_quarters)` at 120 bpm.
pub fn simple_midi(notes: &[(u8, u32, u32)]) -> Vec<u8> {
    let mut events = vec![track_name("Melody")];
    let mut cursor = 0u32;

    let mut points: Vec<(u32, bool, u8)> = notes
        .iter()
        .flat_map(|&(pitch, start, len)| [(start * 480, true, pitch), ((start + len) * 480, false, pitch)])
        .collect();
    points.sort_by_key(|&(tick, is_on, _)| (tick, is_on));

    for (tick, is_on, pitch) in points {
        let delta = tick - cursor;
        cursor = tick;
        events.push(if is_on {
            note_on(delta, 0, pitch, 100)
        } else {
            note_off(delta, 0, pitch)
        });
    }
    events.push(end_of_track(0));

    smf_bytes(480, vec![events])
}

pub fn note(pitch: u8, start_seconds: f64, duration_seconds: f64) -> Note {
    Note {
        pitch,
        start_seconds,
        duration_seconds,
        velocity: 100,
    }
}

pub fn one_track_score(channel: u8, name: &str, notes: Vec<Note>) -> Score {
    Score::from_tracks(
        Some(String::from("Fixture")),
        vec![Track {
            channel,
            name: name.to_string(),
            notes,
        }],
    )
}

#[derive(Debug, Clone, PartialEq)]
pub enum DrawCall {
    FillRect(Rect, Color),
    StrokeRect(Rect, Color),
    Line(f64, f64, f64, f64, Color),
    Text(String),
}

/// A surface that keeps every draw call since the last full clear.
#[derive(Debug, Default)]
pub struct RecordingSurface {
    pub width: u32,
    pub height: u32,
    pub calls: Vec<DrawCall>,
    pub clears: usize,
}

impl RecordingSurface {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            ..Default::default()
        }
    }

    /// Every `fill_rect` after the background clear.
    pub fn note_fills(&self) -> Vec<(Rect, Color)> {
        self.calls
            .iter()
            .skip(1)
            .filter_map(|call| match call {
                DrawCall::FillRect(rect, color) => Some((*rect, *color)),
                _ => None,
            })
            .collect()
    }

    pub fn texts(&self) -> Vec<String> {
        self.calls
            .iter()
            .filter_map(|call| match call {
                DrawCall::Text(text) => Some(text.clone()),
                _ => None,
            })
            .collect()
    }
}

impl Surface for RecordingSurface {
    fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn set_size(&mut self, width: u32, height: u32) {
        self.width = width;
        self.height = height;
    }

    fn clear(&mut self, color: Color) {
        self.clears += 1;
        self.calls.clear();
        self.calls.push(DrawCall::FillRect(
            Rect::new(0.0, 0.0, self.width as f64, self.height as f64),
            color,
        ));
    }

    fn fill_rect(&mut self, rect: Rect, color: Color) {
        self.calls.push(DrawCall::FillRect(rect, color));
    }

    fn stroke_rect(&mut self, rect: Rect, color: Color) {
        self.calls.push(DrawCall::StrokeRect(rect, color));
    }

    fn line(&mut self, x0: f64, y0: f64, x1: f64, y1: f64, _width: f64, color: Color) {
        self.calls.push(DrawCall::Line(x0, y0, x1, y1, color));
    }

    fn fill_text(&mut self, text: &str, _x: f64, _y: f64, _color: Color) {
        self.calls.push(DrawCall::Text(text.to_string()));
    }
}
