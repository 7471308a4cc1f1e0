//! Ticker for the block-arrival slide.

use crate::{store::SnapshotStore, wake::Wake};
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};
use tokio::time::{interval, Duration, MissedTickBehavior};

/// Frames in one slide (~480 ms at [`FRAME_INTERVAL`]).
pub const ANIMATION_FRAMES: u32 = 12;
pub const FRAME_INTERVAL: Duration = Duration::from_millis(40);

/// Horizontal shift in cells for `frame` of `total`: `round(frame / total * column_width)`.
pub fn slide_offset(frame: u32, total: u32, column_width: u16) -> u16 {
    if total == 0 {
        return column_width;
    }
    let progress = frame.min(total) as f64 / total as f64;
    (progress * column_width as f64).round() as u16
}

pub struct Animator {
    store: SnapshotStore,
    wake: Wake,
    shutdown: Arc<AtomicBool>,
    total: u32,
    period: Duration,
}

impl Animator {
    pub fn new(store: SnapshotStore, wake: Wake, shutdown: Arc<AtomicBool>) -> Self {
        Self {
            store,
            wake,
            shutdown,
            total: ANIMATION_FRAMES,
            period: FRAME_INTERVAL,
        }
    }

    /// Advance one frame. Does nothing at all while no animation is armed.
    pub fn tick(&self) -> bool {
        if !self.store.advance_animation(self.total) {
            return false;
        }
        self.wake.signal();
        true
    }

    pub async fn run(self) {
        let mut ticker = interval(self.period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        loop {
            ticker.tick().await;
            if self.shutdown.load(Ordering::Acquire) {
                break;
            }
            self.tick();
        }
        log::debug!("animator stopped");
    }
}
