//! Fixed-step clock for the game loop.
//!
//! The battle driver is handed a millisecond timestamp per tick. In the
//! windowed game that timestamp is simulated time (`fixed_step_count *
//! fixed_dt`), so a slow frame produces several catch-up ticks with evenly
//! spaced timestamps instead of one long jump.

use std::time::Instant;

pub struct TimeState {
    pub fixed_dt: f64,
    pub max_accumulator: f64,
    accumulator: f64,
    pub total_time: f64,
    pub fixed_step_count: u64,
    pub steps_this_frame: u32,
    pub real_dt: f64,
    last_instant: Instant,
}

impl TimeState {
    pub fn new() -> Self {
        Self {
            fixed_dt: 1.0 / 60.0,
            max_accumulator: 0.25,
            accumulator: 0.0,
            total_time: 0.0,
            fixed_step_count: 0,
            steps_this_frame: 0,
            real_dt: 0.0,
            last_instant: Instant::now(),
        }
    }

    pub fn begin_frame(&mut self) {
        let now = Instant::now();
        let real_dt = now.duration_since(self.last_instant).as_secs_f64();
        self.last_instant = now;
        self.accumulate(real_dt);
    }

    /// Feed `real_dt` seconds of wall time into the accumulator.
    pub fn accumulate(&mut self, real_dt: f64) {
        self.real_dt = real_dt;

        // Spiral-of-death cap
        if self.real_dt > self.max_accumulator {
            log::warn!(
                "Frame took {:.1}ms, capping accumulator to {}ms",
                self.real_dt * 1000.0,
                self.max_accumulator * 1000.0
            );
            self.real_dt = self.max_accumulator;
        }

        self.accumulator += self.real_dt;
        self.steps_this_frame = 0;
    }

    pub fn should_step(&mut self) -> bool {
        if self.accumulator >= self.fixed_dt {
            self.accumulator -= self.fixed_dt;
            self.total_time += self.fixed_dt;
            self.fixed_step_count += 1;
            self.steps_this_frame += 1;
            true
        } else {
            false
        }
    }

    /// Simulated milliseconds since the clock was created. Monotonic.
    pub fn now_ms(&self) -> u64 {
        (self.total_time * 1000.0).round() as u64
    }
}

impl Default for TimeState {
    fn default() -> Self {
        Self::new()
    }
}
