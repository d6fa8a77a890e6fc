//! Frame loop that drives a [`GameBoy`] until a frame limit or a shutdown
//! request, handing each finished frame to a sink.

use std::{
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
    thread,
    time::{Duration, Instant},
};

use log::{debug, info};

use crate::gameboy::GameBoy;

pub const GB_FPS: f64 = 59.7275;
pub const FRAME_TIME: Duration = Duration::from_nanos((1e9_f64 / GB_FPS) as u64);

/// Receives each completed frame (160x144, 0x00RRGGBB).
pub trait FrameSink {
    fn present(&mut self, frame: &[u32]);
}

impl<F: FnMut(&[u32])> FrameSink for F {
    fn present(&mut self, frame: &[u32]) {
        self(frame)
    }
}

/// Cloneable stop request shared between the frontend and the loop.
#[derive(Clone, Debug, Default)]
pub struct ShutdownFlag(Arc<AtomicBool>);

impl ShutdownFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn request(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_requested(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Sleeps so frames are presented at the hardware refresh rate.
#[derive(Debug)]
pub struct FramePacer {
    next: Option<Instant>,
    frame_time: Duration,
}

impl FramePacer {
    pub fn new() -> Self {
        Self::with_frame_time(FRAME_TIME)
    }

    pub fn with_frame_time(frame_time: Duration) -> Self {
        Self {
            next: None,
            frame_time,
        }
    }

    /// Blocks until the next frame deadline. A pacer that has fallen
    /// behind resynchronizes instead of trying to catch up.
    pub fn wait(&mut self) {
        let now = Instant::now();
        let target = *self.next.get_or_insert(now + self.frame_time);
        if now < target {
            thread::sleep(target - now);
            self.next = Some(target + self.frame_time);
        } else {
            self.next = Some(now + self.frame_time);
        }
    }
}

impl Default for FramePacer {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SessionOptions {
    pub pacing: bool,
    pub frame_limit: Option<u64>,
    pub save_on_exit: bool,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            pacing: true,
            frame_limit: None,
            save_on_exit: true,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SessionStats {
    /// Frames handed to the sink.
    pub frames: u64,
    pub cycles: u64,
}

/// Runs frames until `shutdown` is requested or the frame limit is reached,
/// then persists battery RAM if asked to.
///
/// The flag is checked once per frame. While the LCD is off no frame
/// completes, so the sink is not called, but each frame's worth of cycles
/// still counts toward the limit.
pub fn run<S: FrameSink + ?Sized>(
    gb: &mut GameBoy,
    sink: &mut S,
    shutdown: &ShutdownFlag,
    options: SessionOptions,
) -> SessionStats {
    let mut stats = SessionStats::default();
    let mut pacer = FramePacer::new();
    let start = Instant::now();
    let mut periods = 0u64;

    while !shutdown.is_requested() {
        if let Some(limit) = options.frame_limit
            && periods >= limit
        {
            break;
        }
        periods += 1;

        let frame = gb.run_frame();
        stats.cycles += frame.cycles;
        if frame.completed {
            sink.present(gb.framebuffer());
            stats.frames += 1;
        }

        if options.pacing {
            pacer.wait();
        }
    }

    if shutdown.is_requested() {
        debug!("shutdown requested after {} frames", stats.frames);
    }
    info!(
        "Ran {} frames ({} cycles) in {:.2?}",
        stats.frames,
        stats.cycles,
        start.elapsed()
    );

    if options.save_on_exit {
        gb.save_ram();
    }
    stats
}
