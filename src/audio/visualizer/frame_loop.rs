// src/audio/visualizer/frame_loop.rs
//! Display-refresh scheduling for the live visualizer.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Keeps a [`FrameLoop`] running; dropping it stops the loop for good.
#[derive(Debug)]
pub struct LoopGuard {
    alive: Arc<AtomicBool>,
}

impl LoopGuard {
    /// Stop the loop now instead of at drop.
    pub fn cancel(&self) {
        self.alive.store(false, Ordering::SeqCst);
    }
}

impl Drop for LoopGuard {
    fn drop(&mut self) {
        self.cancel();
    }
}

/// A self re-arming frame clock.
///
/// The loop hands out one frame per refresh interval for as long as its
/// [`LoopGuard`] lives. It never stops on its own.
#[derive(Debug)]
pub struct FrameLoop {
    alive: Arc<AtomicBool>,
    interval: Duration,
    next_frame: Instant,
}

impl FrameLoop {
    /// Start a loop at `fps` frames per second with its first frame due at `now`.
    pub fn start(fps: u32, now: Instant) -> (Self, LoopGuard) {
        let alive = Arc::new(AtomicBool::new(true));
        let frame_loop = Self {
            alive: alive.clone(),
            interval: Duration::from_secs(1) / fps.max(1),
            next_frame: now,
        };
        (frame_loop, LoopGuard { alive })
    }

    pub fn is_alive(&self) -> bool {
        self.alive.load(Ordering::SeqCst)
    }

    /// Returns true when a frame is due, re-arming for the next refresh.
    ///
    /// Missed refreshes are skipped rather than replayed.
    pub fn poll(&mut self, now: Instant) -> bool {
        if !self.is_alive() || now < self.next_frame {
            return false;
        }
        self.next_frame += self.interval;
        if self.next_frame <= now {
            self.next_frame = now + self.interval;
        }
        true
    }

    /// Time until the next frame, `None` once the loop is dead.
    pub fn time_until_next(&self, now: Instant) -> Option<Duration> {
        self.is_alive()
            .then(|| self.next_frame.saturating_duration_since(now))
    }
}
