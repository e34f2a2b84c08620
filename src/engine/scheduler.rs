use crate::engine::{Clock, FrameId, FrameScheduler};
use log::debug;
use spin_sleep::{SpinSleeper, SpinStrategy};
use std::collections::VecDeque;
use std::time::{Duration, Instant};

const DEFAULT_FPS: u32 = 60;

/// Monotonic wall clock measured from construction.
#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    origin: Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now_ms(&self) -> f64 {
        self.origin.elapsed().as_secs_f64() * 1000.0
    }
}

/// Hands out frames at a fixed rate, sleeping between them with a spin sleeper.
#[derive(Debug)]
pub struct PacedFrameScheduler {
    interval: Duration,
    sleeper: SpinSleeper,
    next_id: u64,
    pending: VecDeque<FrameId>,
    last_frame: Option<Instant>,
}

impl PacedFrameScheduler {
    pub fn new(fps: u32) -> Self {
        let fps = if fps == 0 { DEFAULT_FPS } else { fps };
        debug!("Frame scheduler pacing at {} fps", fps);

        Self {
            interval: Duration::from_secs_f64(1.0 / fps as f64),
            sleeper: SpinSleeper::new(100_000).with_spin_strategy(SpinStrategy::YieldThread),
            next_id: 0,
            pending: VecDeque::new(),
            last_frame: None,
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Blocks until the next frame boundary and returns the oldest pending frame.
    /// Returns `None` straight away when nothing is pending.
    pub fn wait_for_frame(&mut self) -> Option<FrameId> {
        let id = self.pending.pop_front()?;

        if let Some(last) = self.last_frame {
            let target = last + self.interval;
            let now = Instant::now();
            if target > now {
                self.sleeper.sleep(target - now);
            }
        }

        self.last_frame = Some(Instant::now());
        Some(id)
    }
}

impl Default for PacedFrameScheduler {
    fn default() -> Self {
        Self::new(DEFAULT_FPS)
    }
}

impl FrameScheduler for PacedFrameScheduler {
    fn request_frame(&mut self) -> FrameId {
        self.next_id += 1;
        let id = FrameId(self.next_id);
        self.pending.push_back(id);
        id
    }

    fn cancel_frame(&mut self, id: FrameId) {
        self.pending.retain(|pending| *pending != id);
    }
}
