use crate::error::VisualizerError;
use crate::model::options::{NoteColors, VisualizerOptions};
use crate::model::score::{Score, Track};
use crate::render::{Color, Rect, Surface};

pub const GRID_COLOR: Color = Color::rgba(255, 255, 255, 26);
pub const NOTE_BORDER_COLOR: Color = Color::rgba(0, 0, 0, 77);
pub const CURSOR_COLOR: Color = Color::rgba(255, 255, 255, 204);
pub const ERROR_TEXT_COLOR: Color = Color::rgb(0xff, 0x52, 0x52);
pub const CURSOR_WIDTH: f64 = 2.0;
pub const MIN_NOTE_WIDTH: f64 = 2.0;
pub const NO_DATA_MESSAGE: &str = "No MIDI data loaded";

const HIGHEST_PITCH: u8 = 127;
const PERCUSSION_CHANNEL: u8 = 9;
const PERCUSSION_KEYWORDS: &[&str] = &["drum", "percussion"];
const BASS_KEYWORDS: &[&str] = &["bass", "低音"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackKind {
    Default,
    Drums,
    Bass,
}

impl TrackKind {
    pub fn color(self, colors: &NoteColors) -> Color {
        match self {
            TrackKind::Default => colors.default,
            TrackKind::Drums => colors.drums,
            TrackKind::Bass => colors.bass,
        }
    }
}

/// Percussion channel first, then name keywords (percussion before bass).
pub fn classify_track(track: &Track) -> TrackKind {
    if track.channel == PERCUSSION_CHANNEL {
        return TrackKind::Drums;
    }

    let name = track.name.to_lowercase();
    if PERCUSSION_KEYWORDS.iter().any(|kw| name.contains(kw)) {
        TrackKind::Drums
    } else if BASS_KEYWORDS.iter().any(|kw| name.contains(kw)) {
        TrackKind::Bass
    } else {
        TrackKind::Default
    }
}

/// What the surface should show.
#[derive(Debug, Clone, Copy)]
pub enum Scene<'a> {
    /// Nothing has been loaded yet.
    Empty,
    /// The last load failed with this message.
    Failed(&'a str),
    Score {
        score: &'a Score,
        current_time_ms: f64,
    },
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameStats {
    pub notes_drawn: usize,
    pub notes_culled: usize,
}

/// Horizontal geometry of one frame.
#[derive(Debug, Clone, Copy)]
struct Timeline {
    second_width: f64,
    offset: f64,
}

impl Timeline {
    fn new(options: &VisualizerOptions, viewport_width: f64, current_time_ms: f64) -> Self {
        let second_width = options.pixels_per_time_step * options.time_scale;
        let offset = options.cursor_fraction * viewport_width - (current_time_ms / 1000.0) * second_width;

        Self {
            second_width,
            offset,
        }
    }

    fn x_at(&self, seconds: f64) -> f64 {
        seconds * self.second_width + self.offset
    }
}

fn row_y(options: &VisualizerOptions, viewport_height: f64, pitch: u8) -> f64 {
    viewport_height - pitch as f64 * (options.note_height + options.note_spacing)
}

/// Repaints `surface` for `scene`. The result depends only on the arguments and the surface size.
pub fn render_scene<S: Surface + ?Sized>(
    surface: &mut S,
    scene: Scene<'_>,
    options: &VisualizerOptions,
) -> FrameStats {
    surface.clear(options.background_color);

    let (score, current_time_ms) = match scene {
        Scene::Empty => {
            paint_message(surface, NO_DATA_MESSAGE);
            return FrameStats::default();
        }
        Scene::Failed(message) => {
            paint_message(surface, message);
            return FrameStats::default();
        }
        Scene::Score {
            score,
            current_time_ms,
        } => (score, current_time_ms),
    };

    if score.tracks.is_empty() {
        paint_message(surface, VisualizerError::EmptyScore.display_message());
        return FrameStats::default();
    }

    let (w, h) = surface.size();
    let (width, height) = (w as f64, h as f64);
    let timeline = Timeline::new(options, width, current_time_ms);
    let total_width = score.duration_seconds * timeline.second_width;

    draw_grid(surface, options, &timeline, total_width, width, height);

    let mut stats = FrameStats::default();
    for track in score.tracks.iter() {
        let color = classify_track(track).color(&options.note_colors);

        for note in track.notes.iter() {
            let rect = Rect::new(
                timeline.x_at(note.start_seconds),
                row_y(options, height, note.pitch),
                (note.duration_seconds * timeline.second_width).max(MIN_NOTE_WIDTH),
                options.note_height,
            );

            if !rect.touches_viewport(width, height) {
                stats.notes_culled += 1;
                continue;
            }

            surface.fill_rect(rect, color);
            surface.stroke_rect(rect, NOTE_BORDER_COLOR);
            stats.notes_drawn += 1;
        }
    }

    let cursor_x = options.cursor_fraction * width;
    surface.line(cursor_x, 0.0, cursor_x, height, CURSOR_WIDTH, CURSOR_COLOR);

    stats
}

fn draw_grid<S: Surface + ?Sized>(
    surface: &mut S,
    options: &VisualizerOptions,
    timeline: &Timeline,
    total_width: f64,
    width: f64,
    height: f64,
) {
    // one line per octave
    for pitch in (0..=HIGHEST_PITCH).step_by(12) {
        let y = row_y(options, height, pitch);
        if (0.0..=height).contains(&y) {
            surface.line(0.0, y, width, y, 1.0, GRID_COLOR);
        }
    }

    if timeline.second_width <= 0.0 {
        return;
    }

    // one line per second
    let seconds = (total_width / timeline.second_width).ceil().max(0.0) as u64;
    for i in 0..=seconds {
        let x = timeline.x_at(i as f64);
        if (0.0..=width).contains(&x) {
            surface.line(x, 0.0, x, height, 1.0, GRID_COLOR);
        }
    }
}

fn paint_message<S: Surface + ?Sized>(surface: &mut S, message: &str) {
    let (w, h) = surface.size();
    surface.fill_text(message, w as f64 / 2.0, h as f64 / 2.0, ERROR_TEXT_COLOR);
}
