use MIDI_ROLL::{
    Args, PacedFrameScheduler, PixelCanvas, SystemClock, Visualizer, VisualizerOptions,
    classify_track, format_time, parse_speed,
};
use anyhow::Result;
use clap::Parser;
use log::{debug, info, warn};
use std::fs;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let options = match args.options.as_ref() {
        Some(path) => VisualizerOptions::from_yaml_file(path)?,
        None => VisualizerOptions::default(),
    };
    debug!("Visualizer options: {:?}", options);

    let (width, height) = (args.width, args.height);
    let mut visualizer = Visualizer::new(
        PixelCanvas::new(width, height),
        move || (width, height),
        SystemClock::new(),
        PacedFrameScheduler::new(args.fps),
        options,
    );

    visualizer.load_midi_from_url(&args.midi)?;
    visualizer.set_playback_speed(parse_speed(&args.speed))?;
    info!("{}", visualizer.info());

    if args.dry_run {
        if let Some(score) = visualizer.score() {
            for (i, track) in score.tracks.iter().enumerate() {
                info!(
                    "Track {}: name='{}' channel={} kind={:?} notes={}",
                    i,
                    track.name,
                    track.channel,
                    classify_track(track),
                    track.notes.len()
                );
            }
        }
        return Ok(());
    }

    visualizer.seek_to(args.seek_ms);

    if let Some(path) = args.snapshot.as_ref() {
        fs::write(path, visualizer.surface().encode_png()?)?;
        info!(
            "Wrote frame at {} to '{}'..!",
            format_time(visualizer.current_time_ms() / 1000.0),
            path.display()
        );
        return Ok(());
    }

    let stop_requested = Arc::new(AtomicBool::new(false));
    let stop_for_handler = Arc::clone(&stop_requested);
    ctrlc::set_handler(move || {
        warn!("Ctrl-C received, stopping playback..!");
        stop_for_handler.store(true, Ordering::SeqCst);
    })?;

    let total = format_time(visualizer.duration_ms() / 1000.0);
    let mut last_reported_second: Option<u64> = None;

    visualizer.play();
    while let Some(frame) = visualizer.scheduler_mut().wait_for_frame() {
        if stop_requested.load(Ordering::SeqCst) {
            visualizer.stop();
            break;
        }

        visualizer.on_animation_frame(frame);

        let second = (visualizer.current_time_ms() / 1000.0) as u64;
        if args.verbose && visualizer.is_playing() && last_reported_second != Some(second) {
            last_reported_second = Some(second);
            info!(
                "{} / {}",
                format_time(visualizer.current_time_ms() / 1000.0),
                total
            );
        }
    }

    info!("Playback finished, exiting..!");
    Ok(())
}
