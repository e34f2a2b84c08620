use crate::engine::{Clock, FrameId, FrameScheduler};
use crate::error::{VisualizerError, VisualizerResult};
use crate::loader::{Fetch, FileUrlFetcher, Response, read_local_file};
use crate::midi_importer::decode_midi_bytes;
use crate::model::options::VisualizerOptions;
use crate::model::score::Score;
use crate::render::{Scene, Surface, render_scene};
use crate::util::format_time;
use log::{debug, info, warn};
use std::path::Path;

/// Receives transport changes, e.g. so a synthesizer can follow the piano-roll.
pub trait TransportListener {
    fn on_play(&mut self, _position_ms: f64) {}
    fn on_pause(&mut self, _position_ms: f64) {}
    fn on_stop(&mut self) {}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportState {
    Stopped,
    Paused,
    Playing,
}

/// Handle for one in-flight load. Only the most recently begun ticket may commit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadTicket(u64);

type ContainerSize = Box<dyn Fn() -> (u32, u32)>;

/// A piano-roll player bound to one drawing surface.
///
/// Everything runs on the caller's thread: the host delivers frames requested from
/// the scheduler back through [`Visualizer::on_animation_frame`], and UI handlers call
/// the transport methods between frames.
pub struct Visualizer<S: Surface, C: Clock, F: FrameScheduler> {
    surface: S,
    container: ContainerSize,
    clock: C,
    scheduler: F,
    fetcher: Box<dyn Fetch>,
    listener: Option<Box<dyn TransportListener>>,
    options: VisualizerOptions,

    score: Option<Score>,
    load_error: Option<&'static str>,
    info: String,
    load_generation: u64,

    state: TransportState,
    current_time_ms: f64,
    anchor_wall_ms: f64,
    anchor_position_ms: f64,
    pending_frame: Option<FrameId>,
    render_count: u64,
}

impl<S: Surface, C: Clock, F: FrameScheduler> Visualizer<S, C, F> {
    /// Sizes `surface` to the container and paints the empty state.
    pub fn new(
        surface: S,
        container: impl Fn() -> (u32, u32) + 'static,
        clock: C,
        scheduler: F,
        options: VisualizerOptions,
    ) -> Self {
        let mut visualizer = Self {
            surface,
            container: Box::new(container),
            clock,
            scheduler,
            fetcher: Box::new(FileUrlFetcher::new()),
            listener: None,
            options,
            score: None,
            load_error: None,
            info: String::new(),
            load_generation: 0,
            state: TransportState::Stopped,
            current_time_ms: 0.0,
            anchor_wall_ms: 0.0,
            anchor_position_ms: 0.0,
            pending_frame: None,
            render_count: 0,
        };

        let (width, height) = (visualizer.container)();
        visualizer.surface.set_size(width, height);
        visualizer.render();
        visualizer
    }

    pub fn set_fetcher(&mut self, fetcher: impl Fetch + 'static) {
        self.fetcher = Box::new(fetcher);
    }

    pub fn set_listener(&mut self, listener: impl TransportListener + 'static) {
        self.listener = Some(Box::new(listener));
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    pub fn scheduler_mut(&mut self) -> &mut F {
        &mut self.scheduler
    }

    pub fn options(&self) -> &VisualizerOptions {
        &self.options
    }

    pub fn score(&self) -> Option<&Score> {
        self.score.as_ref()
    }

    /// `name | N tracks | M notes | m:ss`, or the last load error.
    pub fn info(&self) -> &str {
        &self.info
    }

    pub fn state(&self) -> TransportState {
        self.state
    }

    pub fn is_playing(&self) -> bool {
        self.state == TransportState::Playing
    }

    pub fn current_time_ms(&self) -> f64 {
        self.current_time_ms
    }

    pub fn duration_ms(&self) -> f64 {
        self.score.as_ref().map(Score::duration_ms).unwrap_or(0.0)
    }

    pub fn playback_speed(&self) -> f64 {
        1.0 / self.options.time_scale
    }

    pub fn pending_frame(&self) -> Option<FrameId> {
        self.pending_frame
    }

    /// Number of times the surface has been repainted.
    pub fn render_count(&self) -> u64 {
        self.render_count
    }

    // ---------------------------------------------------------------------
    // Loading
    // ---------------------------------------------------------------------

    /// Starts a load. Any earlier ticket still in flight becomes stale.
    pub fn begin_load(&mut self) -> LoadTicket {
        self.load_generation += 1;
        debug!("Began load #{}", self.load_generation);
        LoadTicket(self.load_generation)
    }

    /// Finishes the load behind `ticket` with the bytes it produced.
    ///
    /// A stale ticket changes nothing and yields [`VisualizerError::Superseded`].
    pub fn complete_load(
        &mut self,
        ticket: LoadTicket,
        bytes: VisualizerResult<Vec<u8>>,
    ) -> VisualizerResult<()> {
        if ticket.0 != self.load_generation {
            debug!(
                "Discarding result of load #{}, load #{} is current",
                ticket.0, self.load_generation
            );
            return Err(VisualizerError::Superseded(ticket.0));
        }

        let decoded = bytes.and_then(|bytes| decode_midi_bytes(&bytes));
        self.settle(decoded)
    }

    pub fn load_midi_from_url(&mut self, url: &str) -> VisualizerResult<()> {
        let ticket = self.begin_load();
        info!("Loading MIDI from '{}'...", url);

        let bytes = self.fetcher.fetch(url).and_then(Response::into_body);
        self.complete_load(ticket, bytes)
    }

    pub fn load_midi_from_file<P: AsRef<Path>>(&mut self, path: P) -> VisualizerResult<()> {
        let ticket = self.begin_load();
        info!("Loading MIDI file '{}'...", path.as_ref().display());

        let bytes = read_local_file(path);
        self.complete_load(ticket, bytes)
    }

    pub fn load_midi_from_bytes(&mut self, bytes: &[u8]) -> VisualizerResult<()> {
        self.begin_load();
        self.settle(decode_midi_bytes(bytes))
    }

    /// Installs an already decoded score, as a successful load would.
    pub fn load_score(&mut self, score: Score) {
        self.begin_load();
        // a decoded score cannot fail to settle
        let _ = self.settle(Ok(score));
    }

    fn settle(&mut self, outcome: VisualizerResult<Score>) -> VisualizerResult<()> {
        self.halt();
        self.state = TransportState::Stopped;
        self.current_time_ms = 0.0;

        match outcome {
            Ok(score) => {
                info!(
                    "Loaded '{}': {} tracks, {} notes, {:.3}s..!",
                    score.name.as_deref().unwrap_or("Unnamed MIDI"),
                    score.tracks.len(),
                    score.note_count(),
                    score.duration_seconds
                );

                self.info = format!(
                    "{} | {} tracks | {} notes | {}",
                    score.name.as_deref().unwrap_or("Unnamed MIDI"),
                    score.tracks.len(),
                    score.note_count(),
                    format_time(score.duration_seconds)
                );
                self.score = Some(score);
                self.load_error = None;
                self.render();
                Ok(())
            }
            Err(why) => {
                warn!("Failed to load MIDI: {}", why);

                let message = why.display_message();
                self.score = None;
                self.load_error = Some(message);
                self.info = message.to_string();
                self.render();
                Err(why)
            }
        }
    }

    // ---------------------------------------------------------------------
    // Transport
    // ---------------------------------------------------------------------

    pub fn play(&mut self) {
        if self.is_playing() || self.score.is_none() {
            return;
        }

        self.anchor(self.current_time_ms);
        self.state = TransportState::Playing;
        self.pending_frame = Some(self.scheduler.request_frame());

        debug!("Playing from {:.1}ms", self.current_time_ms);
        if let Some(listener) = self.listener.as_mut() {
            listener.on_play(self.current_time_ms);
        }
    }

    pub fn pause(&mut self) {
        if !self.is_playing() {
            return;
        }

        self.current_time_ms = self.clock_position().min(self.duration_ms());
        self.halt();
        self.state = TransportState::Paused;

        debug!("Paused at {:.1}ms", self.current_time_ms);
        if let Some(listener) = self.listener.as_mut() {
            listener.on_pause(self.current_time_ms);
        }
    }

    /// Pauses, rewinds to the start and repaints.
    pub fn stop(&mut self) {
        self.pause();
        self.current_time_ms = 0.0;
        self.state = TransportState::Stopped;
        self.render();

        debug!("Stopped");
        if let Some(listener) = self.listener.as_mut() {
            listener.on_stop();
        }
    }

    /// Moves the cursor to `time_ms`, clamped into the score.
    pub fn seek_to(&mut self, time_ms: f64) {
        if time_ms.is_nan() {
            warn!("Ignoring seek to NaN..!");
            return;
        }

        self.current_time_ms = time_ms.clamp(0.0, self.duration_ms());
        if self.is_playing() {
            self.anchor(self.current_time_ms);
        }

        self.render();
    }

    /// Sets the playback speed without moving the cursor. The roll is stretched by
    /// `1 / speed`; the cursor keeps following the wall clock.
    pub fn set_playback_speed(&mut self, speed: f64) -> VisualizerResult<()> {
        if !(speed.is_finite() && speed > 0.0) {
            warn!("Rejecting playback speed {}..!", speed);
            return Err(VisualizerError::InvalidSpeed(speed));
        }

        let was_playing = self.is_playing();
        if was_playing {
            self.pause();
        }

        self.options.time_scale = 1.0 / speed;
        self.render();

        if was_playing {
            self.play();
        }

        Ok(())
    }

    /// Advances the cursor for one delivered frame. Frames that were cancelled or
    /// superseded are ignored.
    pub fn on_animation_frame(&mut self, id: FrameId) {
        if self.pending_frame != Some(id) || !self.is_playing() {
            debug!("Ignoring stale frame {:?}", id);
            return;
        }
        self.pending_frame = None;

        let position = self.clock_position();
        if position >= self.duration_ms() {
            self.stop();
            return;
        }

        self.current_time_ms = position;
        self.render();
        self.pending_frame = Some(self.scheduler.request_frame());
    }

    /// Matches the surface to the container and repaints whatever it showed.
    pub fn handle_resize(&mut self) {
        let (width, height) = (self.container)();
        self.surface.set_size(width, height);
        debug!("Resized surface to {}x{}", width, height);

        self.render();
    }

    pub fn render(&mut self) {
        let scene = match (&self.score, self.load_error) {
            (Some(score), _) => Scene::Score {
                score,
                current_time_ms: self.current_time_ms,
            },
            (None, Some(message)) => Scene::Failed(message),
            (None, None) => Scene::Empty,
        };

        let stats = render_scene(&mut self.surface, scene, &self.options);
        self.render_count += 1;

        if stats.notes_drawn > 0 || stats.notes_culled > 0 {
            debug!(
                "Frame at {:.1}ms: {} notes drawn, {} culled",
                self.current_time_ms, stats.notes_drawn, stats.notes_culled
            );
        }
    }

    fn anchor(&mut self, position_ms: f64) {
        self.anchor_wall_ms = self.clock.now_ms();
        self.anchor_position_ms = position_ms;
    }

    fn clock_position(&self) -> f64 {
        let elapsed = (self.clock.now_ms() - self.anchor_wall_ms).max(0.0);
        self.anchor_position_ms + elapsed
    }

    /// Cancels the pending frame, if any.
    fn halt(&mut self) {
        if let Some(id) = self.pending_frame.take() {
            self.scheduler.cancel_frame(id);
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::engine::{ManualClock, ManualScheduler};
    use crate::render::{ERROR_TEXT_COLOR, NO_DATA_MESSAGE, PixelCanvas};
    use crate::test_helpers::*;
    use std::cell::{Cell, RefCell};
    use std::rc::Rc;

    type TestVisualizer = Visualizer<RecordingSurface, ManualClock, ManualScheduler>;

    const FRAME_MS: f64 = 16.0;

    fn visualizer(score: Option<Score>) -> (TestVisualizer, ManualClock) {
        env_logger::try_init().unwrap_or(());

        let clock = ManualClock::new(1_000.0);
        let mut vis = Visualizer::new(
            RecordingSurface::default(),
            || (320, 1200),
            clock.clone(),
            ManualScheduler::new(),
            VisualizerOptions::default(),
        );

        if let Some(score) = score {
            vis.load_score(score);
        }

        (vis, clock)
    }

    fn score_of_ms(duration_ms: f64) -> Score {
        one_track_score(0, "Lead", vec![note(60, 0.0, duration_ms / 1000.0)])
    }

    /// Advances the clock by `ms` and delivers the next due frame.
    fn frame_after(vis: &mut TestVisualizer, clock: &ManualClock, ms: f64) -> bool {
        clock.advance(ms);
        match vis.scheduler_mut().take_due() {
            Some(id) => {
                vis.on_animation_frame(id);
                true
            }
            None => false,
        }
    }

    #[test]
    fn starts_stopped_and_empty() {
        let (vis, _) = visualizer(None);

        assert_eq!(vis.state(), TransportState::Stopped);
        assert_eq!(vis.current_time_ms(), 0.0);
        assert_eq!(vis.surface().size(), (320, 1200));
        assert_eq!(vis.surface().texts(), vec![NO_DATA_MESSAGE.to_string()]);
        assert_eq!(vis.info(), "");
    }

    #[test]
    fn seek_clamps_into_score() {
        let (mut vis, _) = visualizer(Some(score_of_ms(10_000.0)));

        vis.seek_to(-500.0);
        assert_eq!(vis.current_time_ms(), 0.0);

        vis.seek_to(999_999.0);
        assert_eq!(vis.current_time_ms(), 10_000.0);

        vis.seek_to(f64::NAN);
        assert_eq!(vis.current_time_ms(), 10_000.0);

        vis.seek_to(2_500.0);
        assert_eq!(vis.current_time_ms(), 2_500.0);
    }

    #[test]
    fn seek_before_load_stays_at_zero() {
        let (mut vis, _) = visualizer(None);
        let renders = vis.render_count();

        vis.seek_to(1_234.0);
        assert_eq!(vis.current_time_ms(), 0.0);
        assert_eq!(vis.render_count(), renders + 1);
    }

    #[test]
    fn plays_to_completion() {
        let (mut vis, clock) = visualizer(Some(score_of_ms(2_000.0)));

        vis.play();
        assert!(vis.is_playing());

        let mut frames = 0;
        while frame_after(&mut vis, &clock, FRAME_MS) {
            frames += 1;
            if vis.is_playing() {
                assert!(vis.current_time_ms() < 2_000.0);
            }
            assert!(frames < 1_000, "playback never finished");
        }

        assert_eq!(frames, 125);
        assert_eq!(vis.state(), TransportState::Stopped);
        assert_eq!(vis.current_time_ms(), 0.0);
        assert_eq!(vis.pending_frame(), None);
        assert_eq!(vis.scheduler_mut().pending(), 0);
    }

    #[test]
    fn pause_then_play_resumes() {
        let (mut vis, clock) = visualizer(Some(score_of_ms(10_000.0)));

        vis.play();
        assert!(frame_after(&mut vis, &clock, 500.0));
        vis.pause();
        assert_eq!(vis.state(), TransportState::Paused);
        assert_eq!(vis.current_time_ms(), 500.0);

        // time spent paused does not count
        clock.advance(3_000.0);

        vis.play();
        assert!(frame_after(&mut vis, &clock, 100.0));
        assert_eq!(vis.current_time_ms(), 600.0);
    }

    #[test]
    fn pause_cancels_the_pending_frame() {
        let (mut vis, clock) = visualizer(Some(score_of_ms(10_000.0)));

        vis.play();
        let stale = vis.pending_frame().unwrap();
        clock.advance(200.0);
        vis.pause();

        assert_eq!(vis.pending_frame(), None);
        assert_eq!(vis.scheduler_mut().pending(), 0);
        assert_eq!(vis.scheduler_mut().cancelled(), 1);

        let renders = vis.render_count();
        clock.advance(200.0);
        vis.on_animation_frame(stale);
        assert_eq!(vis.render_count(), renders);
        assert_eq!(vis.current_time_ms(), 200.0);
    }

    #[test]
    fn play_is_a_noop_without_score_or_when_playing() {
        let (mut vis, _) = visualizer(None);
        vis.play();
        assert_eq!(vis.state(), TransportState::Stopped);
        assert_eq!(vis.scheduler_mut().requested(), 0);

        let (mut vis, _) = visualizer(Some(score_of_ms(1_000.0)));
        vis.play();
        vis.play();
        assert_eq!(vis.scheduler_mut().requested(), 1);

        vis.pause();
        vis.pause();
        assert_eq!(vis.state(), TransportState::Paused);
    }

    #[test]
    fn stop_rewinds_and_repaints() {
        let (mut vis, clock) = visualizer(Some(score_of_ms(10_000.0)));

        vis.play();
        assert!(frame_after(&mut vis, &clock, 700.0));
        let renders = vis.render_count();

        vis.stop();
        assert_eq!(vis.state(), TransportState::Stopped);
        assert_eq!(vis.current_time_ms(), 0.0);
        assert_eq!(vis.render_count(), renders + 1);
        assert_eq!(vis.scheduler_mut().pending(), 0);

        vis.seek_to(4_000.0);
        vis.play();
        vis.pause();
        vis.stop();
        assert_eq!(vis.state(), TransportState::Stopped);
        assert_eq!(vis.current_time_ms(), 0.0);
    }

    #[test]
    fn seek_while_playing_reanchors() {
        let (mut vis, clock) = visualizer(Some(score_of_ms(10_000.0)));

        vis.play();
        assert!(frame_after(&mut vis, &clock, 100.0));
        vis.seek_to(5_000.0);
        assert!(vis.is_playing());

        assert!(frame_after(&mut vis, &clock, 100.0));
        assert_eq!(vis.current_time_ms(), 5_100.0);
    }

    #[test]
    fn playback_speed() {
        let (mut vis, clock) = visualizer(Some(score_of_ms(10_000.0)));

        for bad in [0.0, -1.0, f64::NAN, f64::INFINITY] {
            assert!(matches!(
                vis.set_playback_speed(bad),
                Err(VisualizerError::InvalidSpeed(_))
            ));
        }
        assert_eq!(vis.options().time_scale, 1.0);

        vis.play();
        assert!(frame_after(&mut vis, &clock, 1_000.0));
        assert_eq!(vis.current_time_ms(), 1_000.0);

        vis.set_playback_speed(2.0).unwrap();
        assert!(vis.is_playing());
        assert_eq!(vis.options().time_scale, 0.5);
        assert_eq!(vis.playback_speed(), 2.0);
        assert_eq!(vis.current_time_ms(), 1_000.0);

        // the cursor follows the wall clock, speed only stretches the roll
        assert!(frame_after(&mut vis, &clock, 500.0));
        assert_eq!(vis.current_time_ms(), 1_500.0);
        assert_eq!(vis.scheduler_mut().pending(), 1);
    }

    #[test]
    fn speed_change_while_paused_repaints_only() {
        let (mut vis, _) = visualizer(Some(score_of_ms(10_000.0)));
        let renders = vis.render_count();

        vis.set_playback_speed(0.5).unwrap();
        assert_eq!(vis.options().time_scale, 2.0);
        assert_eq!(vis.render_count(), renders + 1);
        assert_eq!(vis.state(), TransportState::Stopped);
        assert_eq!(vis.scheduler_mut().requested(), 0);
    }

    #[test]
    fn resize_tracks_container() {
        env_logger::try_init().unwrap_or(());

        let size = Rc::new(Cell::new((200u32, 100u32)));
        let container = {
            let size = Rc::clone(&size);
            move || size.get()
        };
        let mut vis = Visualizer::new(
            RecordingSurface::default(),
            container,
            ManualClock::new(0.0),
            ManualScheduler::new(),
            VisualizerOptions::default(),
        );
        assert_eq!(vis.surface().size(), (200, 100));

        // the empty state is repainted at the new size too
        size.set((300, 150));
        let renders = vis.render_count();
        vis.handle_resize();
        assert_eq!(vis.surface().size(), (300, 150));
        assert_eq!(vis.render_count(), renders + 1);
        assert_eq!(vis.surface().texts(), vec![NO_DATA_MESSAGE.to_string()]);

        vis.load_score(score_of_ms(1_000.0));
        size.set((640, 480));
        let renders = vis.render_count();
        let clears = vis.surface().clears;
        vis.handle_resize();

        assert_eq!(vis.surface().size(), (640, 480));
        assert_eq!(vis.render_count(), renders + 1);
        assert_eq!(vis.surface().clears, clears + 1);
    }

    #[test]
    fn malformed_bytes_paint_an_error() {
        let (mut vis, _) = visualizer(Some(score_of_ms(1_000.0)));

        let result = vis.load_midi_from_bytes(b"this is not a midi file at all");
        assert!(matches!(result, Err(VisualizerError::Decode(_))));

        assert!(vis.score().is_none());
        assert_eq!(vis.info(), "Unable to parse MIDI data");
        assert_eq!(vis.surface().texts(), vec!["Unable to parse MIDI data".to_string()]);
        assert!(vis.surface().note_fills().is_empty());

        // the error state survives later repaints
        vis.handle_resize();
        vis.render();
        assert_eq!(vis.surface().texts(), vec!["Unable to parse MIDI data".to_string()]);
    }

    #[test]
    fn failed_load_survives_a_resize_on_pixels() {
        env_logger::try_init().unwrap_or(());

        let size = Rc::new(Cell::new((320u32, 120u32)));
        let container = {
            let size = Rc::clone(&size);
            move || size.get()
        };
        let mut vis = Visualizer::new(
            PixelCanvas::new(1, 1),
            container,
            ManualClock::new(0.0),
            ManualScheduler::new(),
            VisualizerOptions::default(),
        );
        assert!(vis.load_midi_from_bytes(b"garbage").is_err());

        size.set((200, 150));
        vis.handle_resize();

        let canvas = vis.surface();
        let background = vis.options().background_color;
        assert_eq!(canvas.size(), (200, 150));
        assert_eq!(canvas.pixel(0, 0), Some(background));
        assert!(canvas.pixels().contains(&ERROR_TEXT_COLOR));
        assert_eq!(vis.info(), "Unable to parse MIDI data");
    }

    #[test]
    fn url_loading() {
        let (mut vis, _) = visualizer(None);

        vis.set_fetcher(|url: &str| -> VisualizerResult<Response> {
            match url {
                "/song.mid" => Ok(Response::ok(simple_midi(&[(60, 0, 1), (64, 1, 2)]))),
                "/broken.mid" => Ok(Response::ok(b"garbage".to_vec())),
                _ => Ok(Response {
                    status: 500,
                    status_text: String::from("Internal Server Error"),
                    body: Vec::new(),
                }),
            }
        });

        vis.load_midi_from_url("/song.mid").unwrap();
        assert_eq!(vis.info(), "Melody | 1 tracks | 2 notes | 0:01");
        assert_eq!(vis.duration_ms(), 1_500.0);
        assert_eq!(vis.surface().note_fills().len(), 2);

        let result = vis.load_midi_from_url("/elsewhere.mid");
        assert!(matches!(result, Err(VisualizerError::Network(_))));
        assert_eq!(vis.info(), "Unable to load MIDI file");
        assert!(vis.score().is_none());

        let result = vis.load_midi_from_url("/broken.mid");
        assert!(matches!(result, Err(VisualizerError::Decode(_))));
    }

    #[test]
    fn file_loading() {
        let (mut vis, _) = visualizer(None);

        let result = vis.load_midi_from_file("/definitely/not/here.mid");
        assert!(matches!(result, Err(VisualizerError::Read { .. })));
        assert_eq!(vis.surface().texts(), vec!["Failed to read file".to_string()]);

        let path = std::env::temp_dir().join(format!("midi_roll_player_{}.mid", std::process::id()));
        std::fs::write(&path, simple_midi(&[(67, 0, 4)])).unwrap();

        vis.load_midi_from_file(&path).unwrap();
        assert_eq!(vis.duration_ms(), 2_000.0);
        assert!(vis.surface().texts().is_empty());

        std::fs::remove_file(path).unwrap();
    }

    #[test]
    fn newer_loads_supersede_older_ones() {
        let (mut vis, _) = visualizer(None);

        let first = vis.begin_load();
        let second = vis.begin_load();

        vis.complete_load(second, Ok(simple_midi(&[(60, 0, 2)]))).unwrap();
        assert_eq!(vis.duration_ms(), 1_000.0);
        let renders = vis.render_count();

        // late success and late failure are both dropped
        let late = vis.complete_load(first, Ok(simple_midi(&[(60, 0, 8)])));
        assert!(matches!(late, Err(VisualizerError::Superseded(_))));
        let late = vis.complete_load(first, Err(VisualizerError::Network(String::from("timeout"))));
        assert!(matches!(late, Err(VisualizerError::Superseded(_))));

        assert_eq!(vis.duration_ms(), 1_000.0);
        assert_eq!(vis.render_count(), renders);
        assert!(vis.info().starts_with("Melody"));
    }

    #[test]
    fn loading_resets_playback() {
        let (mut vis, clock) = visualizer(Some(score_of_ms(10_000.0)));

        vis.play();
        assert!(frame_after(&mut vis, &clock, 800.0));

        vis.load_score(score_of_ms(3_000.0));
        assert_eq!(vis.state(), TransportState::Stopped);
        assert_eq!(vis.current_time_ms(), 0.0);
        assert_eq!(vis.scheduler_mut().pending(), 0);
        assert_eq!(vis.duration_ms(), 3_000.0);
    }

    #[test]
    fn empty_score_is_an_error_state_not_a_failure() {
        let (mut vis, _) = visualizer(None);

        vis.load_score(Score::default());
        assert!(vis.score().is_some());
        assert_eq!(vis.info(), "Unnamed MIDI | 0 tracks | 0 notes | 0:00");
        assert_eq!(vis.surface().texts(), vec!["MIDI file contains no tracks".to_string()]);
    }

    #[test]
    fn repeated_renders_are_pixel_identical() {
        env_logger::try_init().unwrap_or(());

        let mut vis = Visualizer::new(
            PixelCanvas::new(1, 1),
            || (160, 720),
            ManualClock::new(0.0),
            ManualScheduler::new(),
            VisualizerOptions::default(),
        );
        vis.load_score(one_track_score(
            9,
            "Kit",
            vec![note(36, 0.0, 0.1), note(38, 0.5, 0.1), note(42, 0.25, 0.0)],
        ));
        vis.seek_to(300.0);

        let first = vis.surface().clone();
        vis.render();
        assert_eq!(vis.surface(), &first);
    }

    #[test]
    fn listener_follows_transport() {
        #[derive(Clone, Default)]
        struct Log(Rc<RefCell<Vec<String>>>);

        impl TransportListener for Log {
            fn on_play(&mut self, position_ms: f64) {
                self.0.borrow_mut().push(format!("play@{}", position_ms));
            }
            fn on_pause(&mut self, position_ms: f64) {
                self.0.borrow_mut().push(format!("pause@{}", position_ms));
            }
            fn on_stop(&mut self) {
                self.0.borrow_mut().push(String::from("stop"));
            }
        }

        let (mut vis, clock) = visualizer(Some(score_of_ms(10_000.0)));
        let log = Log::default();
        vis.set_listener(log.clone());

        vis.play();
        assert!(frame_after(&mut vis, &clock, 250.0));
        vis.pause();
        vis.stop();

        assert_eq!(
            *log.0.borrow(),
            vec!["play@0", "pause@250", "stop"]
        );
    }
}
