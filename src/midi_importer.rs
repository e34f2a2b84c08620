use crate::error::{VisualizerError, VisualizerResult};
use crate::model::score::*;
use log::{debug, warn};
use midly::{MetaMessage, MidiMessage, Smf, Timing, TrackEventKind};
use std::collections::{HashMap, VecDeque};

const DEFAULT_MPQN: u32 = 500_000;
const MICROSECONDS_PER_MINUTE: f64 = 60_000_000.0;

#[derive(Debug, Clone)]
struct TempoSegment {
    pub mpqn: u32,
    pub start_tick: u64,
    pub seconds_at_start: f64,
}

/// Maps absolute ticks to seconds for either timing mode of a Standard MIDI File.
#[derive(Debug)]
enum TickClock {
    Metrical {
        ticks_per_quarter: u64,
        segments: Vec<TempoSegment>,
    },
    Timecode {
        ticks_per_second: f64,
    },
}

impl TickClock {
    fn metrical(ticks_per_quarter: u64, mut tempo_changes: Vec<(u64, u32)>) -> Self {
        tempo_changes.sort_by_key(|(tick, _)| *tick);

        let mut last_tick: u64 = 0;
        let mut last_mpqn: u32 = DEFAULT_MPQN;
        let mut seconds_accum: f64 = 0.0;
        let mut segments: Vec<TempoSegment> = vec![TempoSegment {
            mpqn: DEFAULT_MPQN,
            start_tick: 0,
            seconds_at_start: 0.0,
        }];

        for (tick, mpqn) in tempo_changes.into_iter() {
            if tick > last_tick {
                seconds_accum += ticks_to_seconds(tick - last_tick, last_mpqn, ticks_per_quarter);
            }

            // a later change at the same tick overrides an earlier one
            if let Some(last) = segments.last_mut()
                && last.start_tick == tick
            {
                last.mpqn = mpqn;
            } else {
                segments.push(TempoSegment {
                    mpqn,
                    start_tick: tick,
                    seconds_at_start: seconds_accum,
                });
            }

            last_tick = tick;
            last_mpqn = mpqn;
        }

        TickClock::Metrical {
            ticks_per_quarter,
            segments,
        }
    }

    fn seconds_at(&self, tick: u64) -> f64 {
        match self {
            TickClock::Metrical {
                ticks_per_quarter,
                segments,
            } => {
                let segment = match segments.iter().rfind(|seg| seg.start_tick <= tick) {
                    Some(s) => s,
                    None => &segments[0],
                };

                segment.seconds_at_start
                    + ticks_to_seconds(tick - segment.start_tick, segment.mpqn, *ticks_per_quarter)
            }
            TickClock::Timecode { ticks_per_second } => tick as f64 / ticks_per_second,
        }
    }
}

fn ticks_to_seconds(ticks: u64, mpqn: u32, ticks_per_quarter: u64) -> f64 {
    (ticks as f64) * (mpqn as f64) / (ticks_per_quarter as f64) / 1_000_000.0
}

struct NoteInterval {
    pub pitch: u8,
    pub start_tick: u64,
    pub end_tick: u64,
    pub velocity: u8,
}

#[derive(Default)]
struct TrackDraft {
    name: Option<String>,
    channel: Option<u8>,
    intervals: Vec<NoteInterval>,
}

/// Decodes a Standard MIDI File into a [`Score`].
///
/// Notes are paired per track by `(channel, key)`, first-in first-out. A note-on with
/// velocity 0 closes a note, orphaned note-offs are ignored, and notes still open at
/// the end of the file are closed at the last tick seen.
pub fn decode_midi_bytes(bytes: &[u8]) -> VisualizerResult<Score> {
    let smf = Smf::parse(bytes).map_err(|e| VisualizerError::Decode(e.to_string()))?;

    debug!(
        "MIDI format: {:?}, timing: {:?}, tracks: {}",
        smf.header.format,
        smf.header.timing,
        smf.tracks.len()
    );

    let mut tempo_changes: Vec<(u64, u32)> = Vec::new();
    let mut drafts: Vec<TrackDraft> = Vec::with_capacity(smf.tracks.len());
    let mut last_tick: u64 = 0;

    for (track_idx, track) in smf.tracks.iter().enumerate() {
        let mut draft = TrackDraft::default();
        let mut open_notes: HashMap<(u8, u8), VecDeque<(u64, u8)>> = HashMap::new();
        let mut abs_tick: u64 = 0;

        for event in track.iter() {
            abs_tick = abs_tick.saturating_add(event.delta.as_int() as u64);

            match &event.kind {
                TrackEventKind::Meta(MetaMessage::Tempo(micro)) => {
                    let mpqn: u32 = micro.as_int();
                    tempo_changes.push((abs_tick, mpqn));
                    debug!(
                        "Tempo change at tick {} -> {} us/qn (track {})",
                        abs_tick, mpqn, track_idx
                    );
                }
                TrackEventKind::Meta(MetaMessage::TrackName(bytes)) => {
                    if draft.name.is_none() {
                        let name = String::from_utf8_lossy(bytes).trim().to_string();
                        debug!("Track {} name: {}", track_idx, name);
                        draft.name = Some(name);
                    }
                }
                TrackEventKind::Midi { channel, message } => {
                    let ch: u8 = channel.as_int();
                    draft.channel.get_or_insert(ch);

                    match message {
                        MidiMessage::NoteOn { key, vel } if vel.as_int() > 0 => {
                            open_notes
                                .entry((ch, key.as_int()))
                                .or_default()
                                .push_back((abs_tick, vel.as_int()));
                        }
                        MidiMessage::NoteOn { key, .. } | MidiMessage::NoteOff { key, .. } => {
                            close_note(
                                &mut open_notes,
                                &mut draft.intervals,
                                ch,
                                key.as_int(),
                                abs_tick,
                            );
                        }
                        _ => {}
                    }
                }
                _ => {}
            }
        }

        for ((ch, key), queue) in open_notes.into_iter() {
            for (start_tick, velocity) in queue {
                warn!(
                    "Unclosed NoteOn for {}, channel: {} at tick: {} auto-closing at: {}..!",
                    key, ch, start_tick, abs_tick
                );
                draft.intervals.push(NoteInterval {
                    pitch: key,
                    start_tick,
                    end_tick: abs_tick.max(start_tick),
                    velocity,
                });
            }
        }

        last_tick = last_tick.max(abs_tick);
        drafts.push(draft);
    }

    let first_tempo = tempo_changes
        .iter()
        .min_by_key(|(tick, _)| *tick)
        .map(|(_, mpqn)| *mpqn)
        .unwrap_or(DEFAULT_MPQN);

    let clock = match smf.header.timing {
        Timing::Metrical(t) => {
            let ticks_per_quarter = (t.as_int() as u64).max(1);
            debug!("Ticks per quarter note: {}", ticks_per_quarter);
            TickClock::metrical(ticks_per_quarter, tempo_changes)
        }
        Timing::Timecode(fps, subframe) => {
            let ticks_per_second = (fps.as_f32() as f64 * subframe.max(1) as f64).max(1.0);
            debug!("SMPTE timing: {} ticks per second", ticks_per_second);
            TickClock::Timecode { ticks_per_second }
        }
    };

    debug!("Last event at tick {}", last_tick);

    let name = drafts
        .first()
        .and_then(|draft| draft.name.clone())
        .filter(|name| !name.is_empty());

    let tracks: Vec<Track> = drafts
        .into_iter()
        .map(|draft| {
            let mut notes: Vec<Note> = draft
                .intervals
                .into_iter()
                .map(|interval| {
                    let start_seconds = clock.seconds_at(interval.start_tick);
                    let end_seconds = clock.seconds_at(interval.end_tick);

                    Note {
                        pitch: interval.pitch,
                        start_seconds,
                        duration_seconds: (end_seconds - start_seconds).max(0.0),
                        velocity: interval.velocity,
                    }
                })
                .collect();

            notes.sort_by(|a, b| a.start_seconds.total_cmp(&b.start_seconds));

            Track {
                channel: draft.channel.unwrap_or(0),
                name: draft.name.unwrap_or_default(),
                notes,
            }
        })
        .collect();

    let mut score = Score::from_tracks(name, tracks);
    score.tempo_bpm = Some(MICROSECONDS_PER_MINUTE / first_tempo.max(1) as f64);

    Ok(score)
}

fn close_note(
    open_notes: &mut HashMap<(u8, u8), VecDeque<(u64, u8)>>,
    intervals: &mut Vec<NoteInterval>,
    ch: u8,
    pitch: u8,
    abs_tick: u64,
) {
    match open_notes
        .get_mut(&(ch, pitch))
        .and_then(|queue| queue.pop_front())
    {
        Some((start_tick, velocity)) => intervals.push(NoteInterval {
            pitch,
            start_tick,
            end_tick: abs_tick,
            velocity,
        }),
        None => debug!(
            "Orphaned NoteOff for {} ch{} at tick {}..!",
            pitch, ch, abs_tick
        ),
    }
}
