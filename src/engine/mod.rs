mod manual;
mod scheduler;

pub use manual::*;
pub use scheduler::*;

/// Identifies one requested animation frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FrameId(pub u64);

/// Wall-clock source for the playback cursor. Not sample-accurate.
pub trait Clock {
    /// Milliseconds since an arbitrary fixed origin; never decreases.
    fn now_ms(&self) -> f64;
}

/// The host's "call me on the next frame" primitive.
///
/// Frames are delivered one at a time by whoever drives the scheduler, which hands
/// each due [`FrameId`] back to `Visualizer::on_animation_frame`.
pub trait FrameScheduler {
    fn request_frame(&mut self) -> FrameId;

    /// Drops a requested frame. Cancelling an unknown or already delivered frame is a no-op.
    fn cancel_frame(&mut self, id: FrameId);
}
