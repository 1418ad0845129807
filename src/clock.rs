//! # Frame-Paced Clock
//!
//! The clock runs a handler in batches ("frames") at a fixed tick rate so that
//! the handler is invoked, on average, `target_frequency` times per second.
//!
//! ```text
//! cycles_per_frame  = ceil(target_frequency / tick_frequency)
//! frame_interval_ms = floor(1000 / tick_frequency)
//! ```
//!
//! ## Scheduling Model
//!
//! Everything happens on the calling thread. [`Clock::run`] runs one frame
//! immediately, then sleeps until each following deadline and runs the next
//! frame. A frame never overlaps another: an invocation that arrives while a
//! frame is still in progress is dropped, not queued, and so is every
//! deadline the loop falls behind on by a whole interval.
//!
//! Stopping is cooperative. [`Clock::stop`] can be called from inside the
//! handler; the current frame still finishes, and no further frame starts.
//!
//! The clock keeps its state in `Cell`s so the handler may hold a shared
//! reference to it, which also makes it `!Sync`.

use std::cell::Cell;
use std::thread;
use std::time::{Duration, Instant};

use crate::{ClockError, ConfigError};

/// Target and tick frequencies for a [`Clock`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClockConfig {
    /// Handler invocations per second, in Hz.
    pub target_frequency: u64,
    /// Frames per second, in Hz.
    pub tick_frequency: u64,
}

impl Default for ClockConfig {
    /// 1 MHz in 60 frames per second.
    fn default() -> Self {
        Self {
            target_frequency: 1_000_000,
            tick_frequency: 60,
        }
    }
}

/// Snapshot of a clock's counters and derived measurements.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClockStats {
    /// When the clock was last started.
    pub start_time: Option<Instant>,
    /// When these stats were last recomputed.
    pub current_time: Option<Instant>,
    /// Frames completed.
    pub frames: u64,
    /// Frame invocations and deadlines skipped to avoid overlap.
    pub dropped_frames: u64,
    /// Wall-clock duration of the most recent frame.
    pub frame_duration: Duration,
    /// Measured handler invocations per second.
    pub actual_frequency: f64,
    /// Last frame duration as a percentage of the frame interval.
    pub usage: f64,
}

/// Periodic deadline source for the run loop.
#[derive(Debug, Clone, Copy)]
struct FrameTimer {
    next_deadline: Instant,
    interval: Duration,
}

impl FrameTimer {
    fn arm(now: Instant, interval: Duration) -> Self {
        Self {
            next_deadline: now + interval,
            interval,
        }
    }

    /// Sleeps until the next deadline and schedules the one after it.
    ///
    /// Returns how many deadlines had already passed and were skipped.
    fn wait(&mut self) -> u64 {
        let now = Instant::now();
        if now < self.next_deadline {
            thread::sleep(self.next_deadline - now);
        }

        self.next_deadline += self.interval;

        let now = Instant::now();
        if self.next_deadline > now {
            return 0;
        }
        if self.interval.is_zero() {
            self.next_deadline = now;
            return 0;
        }

        let behind = now.duration_since(self.next_deadline);
        let missed = (behind.as_nanos() / self.interval.as_nanos()) as u64 + 1;
        self.next_deadline += self.interval * missed as u32;
        missed
    }
}

/// Frame-paced scheduler.
///
/// # Examples
///
/// ```
/// use paced6502::{Clock, ClockConfig};
///
/// let clock = Clock::new(ClockConfig {
///     target_frequency: 1_000_000,
///     tick_frequency: 60,
/// })
/// .unwrap();
///
/// assert_eq!(clock.cycles_per_frame(), 16667);
/// assert_eq!(clock.frame_interval_ms(), 16);
///
/// // Run three frames, then stop from inside the handler
/// let mut calls = 0u64;
/// clock
///     .run(|| {
///         calls += 1;
///         if calls == 3 * 16667 {
///             clock.stop().unwrap();
///         }
///     })
///     .unwrap();
///
/// assert_eq!(clock.stats().frames, 3);
/// ```
#[derive(Debug)]
pub struct Clock {
    config: ClockConfig,
    cycles_per_frame: u64,
    frame_interval: Duration,

    running: Cell<bool>,
    timer: Cell<Option<FrameTimer>>,
    frame_in_progress: Cell<bool>,

    start_time: Cell<Option<Instant>>,
    current_time: Cell<Option<Instant>>,
    frames: Cell<u64>,
    dropped_frames: Cell<u64>,
    frame_duration: Cell<Duration>,
    actual_frequency: Cell<f64>,
    usage: Cell<f64>,
}

impl Clock {
    /// Creates a stopped clock.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidFrequency` if either frequency is zero.
    pub fn new(config: ClockConfig) -> Result<Self, ConfigError> {
        let ClockConfig {
            target_frequency,
            tick_frequency,
        } = config;

        if target_frequency == 0 || tick_frequency == 0 {
            return Err(ConfigError::InvalidFrequency {
                target_frequency,
                tick_frequency,
            });
        }

        Ok(Self {
            config,
            cycles_per_frame: target_frequency.div_ceil(tick_frequency),
            frame_interval: Duration::from_millis(1000 / tick_frequency),
            running: Cell::new(false),
            timer: Cell::new(None),
            frame_in_progress: Cell::new(false),
            start_time: Cell::new(None),
            current_time: Cell::new(None),
            frames: Cell::new(0),
            dropped_frames: Cell::new(0),
            frame_duration: Cell::new(Duration::ZERO),
            actual_frequency: Cell::new(target_frequency as f64),
            usage: Cell::new(0.0),
        })
    }

    /// Returns the configuration this clock was built with.
    pub fn config(&self) -> ClockConfig {
        self.config
    }

    /// Handler invocations per frame.
    pub fn cycles_per_frame(&self) -> u64 {
        self.cycles_per_frame
    }

    /// Time between frame deadlines.
    pub fn frame_interval(&self) -> Duration {
        self.frame_interval
    }

    /// Time between frame deadlines in whole milliseconds.
    pub fn frame_interval_ms(&self) -> u64 {
        self.frame_interval.as_millis() as u64
    }

    /// Returns true between `start` and `stop`.
    pub fn is_running(&self) -> bool {
        self.running.get()
    }

    /// Starts the clock: arms the frame timer and runs the first frame
    /// immediately.
    ///
    /// Returns false, without running anything, if the clock is already
    /// running.
    pub fn start<F: FnMut() + ?Sized>(&self, handler: &mut F) -> bool {
        if self.running.get() {
            return false;
        }

        let now = Instant::now();
        self.running.set(true);
        self.start_time.set(Some(now));
        self.timer
            .set(Some(FrameTimer::arm(now, self.frame_interval)));

        log::debug!(
            "clock started: {} Hz target, {} cycles every {} ms",
            self.config.target_frequency,
            self.cycles_per_frame,
            self.frame_interval_ms()
        );

        self.frame(handler);
        true
    }

    /// Waits for the next frame deadline and runs one frame.
    ///
    /// Returns `Ok(false)` once the clock is stopped, `Ok(true)` while it
    /// keeps running.
    ///
    /// # Errors
    ///
    /// Returns `ClockError::TimerNotArmed` if the clock is running without a
    /// frame timer.
    pub fn tick<F: FnMut() + ?Sized>(&self, handler: &mut F) -> Result<bool, ClockError> {
        if !self.running.get() {
            return Ok(false);
        }

        let mut timer = self.timer.get().ok_or(ClockError::TimerNotArmed)?;
        let missed = timer.wait();
        self.timer.set(Some(timer));

        if missed > 0 {
            self.dropped_frames.set(self.dropped_frames.get() + missed);
            log::warn!("clock fell behind, dropped {} frame(s)", missed);
        }

        self.frame(handler);
        Ok(self.running.get())
    }

    /// Starts the clock and keeps running frames until it is stopped.
    ///
    /// The handler stops the loop by calling [`stop`](Self::stop). Returns
    /// immediately if the clock is already running.
    ///
    /// # Errors
    ///
    /// Propagates `ClockError` from [`tick`](Self::tick).
    pub fn run<F: FnMut()>(&self, mut handler: F) -> Result<(), ClockError> {
        if !self.start(&mut handler) {
            return Ok(());
        }

        while self.tick(&mut handler)? {}
        Ok(())
    }

    /// Runs one frame: `cycles_per_frame` back-to-back handler calls.
    ///
    /// If a frame of this clock is already in progress the call does nothing
    /// and returns false.
    pub fn frame<F: FnMut() + ?Sized>(&self, handler: &mut F) -> bool {
        if self.frame_in_progress.replace(true) {
            self.dropped_frames.set(self.dropped_frames.get() + 1);
            log::warn!("frame requested while another frame is running, dropped");
            return false;
        }

        let frame_start = Instant::now();
        for _ in 0..self.cycles_per_frame {
            handler();
        }
        let duration = frame_start.elapsed();

        self.frame_duration.set(duration);
        self.frames.set(self.frames.get() + 1);
        self.frame_in_progress.set(false);

        log::trace!("frame {} took {:?}", self.frames.get(), duration);
        true
    }

    /// Cancels the frame timer. A frame in progress runs to completion.
    ///
    /// Does nothing if the clock is not running.
    ///
    /// # Errors
    ///
    /// Returns `ClockError::TimerNotArmed` if the clock is running but has
    /// no timer to cancel. The clock is left running.
    pub fn stop(&self) -> Result<(), ClockError> {
        if !self.running.get() {
            return Ok(());
        }

        if self.timer.take().is_none() {
            return Err(ClockError::TimerNotArmed);
        }
        self.running.set(false);

        log::debug!("clock stopped after {} frames", self.frames.get());
        Ok(())
    }

    /// Returns the clock's statistics.
    ///
    /// While running, the actual frequency and usage are recomputed first:
    ///
    /// ```text
    /// actual_frequency = frames * cycles_per_frame / elapsed_ms * 1000
    /// usage            = frame_duration_ms / frame_interval_ms * 100
    /// ```
    ///
    /// When stopped, the last computed values are returned unchanged.
    pub fn stats(&self) -> ClockStats {
        if self.running.get() {
            self.recompute();
        }

        ClockStats {
            start_time: self.start_time.get(),
            current_time: self.current_time.get(),
            frames: self.frames.get(),
            dropped_frames: self.dropped_frames.get(),
            frame_duration: self.frame_duration.get(),
            actual_frequency: self.actual_frequency.get(),
            usage: self.usage.get(),
        }
    }

    fn recompute(&self) {
        let now = Instant::now();
        self.current_time.set(Some(now));

        if let Some(start) = self.start_time.get() {
            let elapsed_ms = now.duration_since(start).as_secs_f64() * 1000.0;
            if elapsed_ms > 0.0 {
                let cycles = (self.frames.get() * self.cycles_per_frame) as f64;
                self.actual_frequency.set(cycles / elapsed_ms * 1000.0);
            }
        }

        let interval_ms = self.frame_interval.as_secs_f64() * 1000.0;
        if interval_ms > 0.0 {
            let frame_ms = self.frame_duration.get().as_secs_f64() * 1000.0;
            self.usage.set(frame_ms / interval_ms * 100.0);
        }
    }
}
