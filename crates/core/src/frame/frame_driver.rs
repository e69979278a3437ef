use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::{Duration, Instant};

/// Per-frame timing handed to listeners.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FrameTick {
    pub index: usize,
    /// Time since the driver started.
    pub elapsed: Duration,
    /// Time since the previous tick (zero on the first).
    pub delta: Duration,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FrameControl {
    Continue,
    Stop,
}

/// Receives one synchronous callback per rendered frame.
///
/// Callbacks never overlap: the driver waits for `on_update` to return
/// before scheduling the next frame.
pub trait FrameListener {
    fn on_update(&mut self, tick: &FrameTick) -> FrameControl;
}

/// Calls a listener at a fixed frame rate on the current thread.
///
/// Sleeps out whatever is left of each frame interval; a slow frame is not
/// compensated for, the next one simply starts late.
pub struct FixedRateFrameDriver {
    interval: Duration,
    max_frames: Option<usize>,
}

impl FixedRateFrameDriver {
    pub fn new(frames_per_second: u32) -> Self {
        Self::with_interval(Duration::from_secs(1) / frames_per_second.max(1))
    }

    pub fn with_interval(interval: Duration) -> Self {
        Self {
            interval,
            max_frames: None,
        }
    }

    pub fn with_max_frames(mut self, max_frames: usize) -> Self {
        self.max_frames = Some(max_frames);
        self
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Runs until the listener stops, the frame limit is hit, or `cancelled`
    /// is set. Returns the number of frames delivered.
    pub fn run(&self, listener: &mut dyn FrameListener, cancelled: &AtomicBool) -> usize {
        let start = Instant::now();
        let mut last = start;
        let mut index = 0;

        loop {
            if cancelled.load(Ordering::Relaxed) {
                log::info!("Frame driver cancelled after {index} frames");
                break;
            }
            if self.max_frames.is_some_and(|max| index >= max) {
                break;
            }

            let frame_start = Instant::now();
            let tick = FrameTick {
                index,
                elapsed: frame_start - start,
                delta: if index == 0 {
                    Duration::ZERO
                } else {
                    frame_start - last
                },
            };
            last = frame_start;
            index += 1;

            if listener.on_update(&tick) == FrameControl::Stop {
                break;
            }

            let spent = frame_start.elapsed();
            if spent < self.interval {
                thread::sleep(self.interval - spent);
            }
        }
        index
    }
}
