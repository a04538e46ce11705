//! Fixed-timestep frame clock. Wall-clock time is fed into an accumulator and
//! the simulation consumes it in fixed `dt` slices, so gameplay stays
//! deterministic regardless of how fast the host repaints.

use std::time::Instant;

const FPS_SAMPLE_COUNT: usize = 60;

pub struct FrameClock {
    pub fixed_dt: f64,
    pub max_accumulator: f64,
    accumulator: f64,
    pub total_time: f64,
    pub fixed_step_count: u64,
    pub frame_count: u64,
    pub steps_this_frame: u32,
    pub real_dt: f64,
    last_instant: Instant,

    fps_samples: [f64; FPS_SAMPLE_COUNT],
    fps_sample_index: usize,
    pub smoothed_fps: f64,
    pub smoothed_frame_time_ms: f64,
}

impl FrameClock {
    pub fn new() -> Self {
        Self {
            fixed_dt: 1.0 / 60.0,
            max_accumulator: 0.25,
            accumulator: 0.0,
            total_time: 0.0,
            fixed_step_count: 0,
            frame_count: 0,
            steps_this_frame: 0,
            real_dt: 0.0,
            last_instant: Instant::now(),
            fps_samples: [1.0 / 60.0; FPS_SAMPLE_COUNT],
            fps_sample_index: 0,
            smoothed_fps: 60.0,
            smoothed_frame_time_ms: 16.667,
        }
    }

    pub fn begin_frame(&mut self) {
        let now = Instant::now();
        self.real_dt = now.duration_since(self.last_instant).as_secs_f64();
        self.last_instant = now;

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
        self.frame_count += 1;

        // FPS smoothing over a sliding window of recent frames.
        self.fps_samples[self.fps_sample_index] = self.real_dt;
        self.fps_sample_index = (self.fps_sample_index + 1) % FPS_SAMPLE_COUNT;
        let avg_dt: f64 = self.fps_samples.iter().sum::<f64>() / FPS_SAMPLE_COUNT as f64;
        self.smoothed_frame_time_ms = avg_dt * 1000.0;
        self.smoothed_fps = if avg_dt > 0.0 { 1.0 / avg_dt } else { 0.0 };
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
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn steps_consume_accumulated_time_in_fixed_slices() {
        let mut clock = FrameClock::new();
        // Inject time directly instead of sleeping.
        clock.accumulator = clock.fixed_dt * 3.5;
        let mut steps = 0;
        while clock.should_step() {
            steps += 1;
        }
        assert_eq!(steps, 3);
        assert_eq!(clock.fixed_step_count, 3);
        assert!(clock.accumulator < clock.fixed_dt);
    }

    #[test]
    fn no_step_without_enough_accumulated_time() {
        let mut clock = FrameClock::new();
        clock.accumulator = clock.fixed_dt * 0.5;
        assert!(!clock.should_step());
        assert_eq!(clock.fixed_step_count, 0);
    }

    #[test]
    fn begin_frame_caps_runaway_deltas() {
        let mut clock = FrameClock::new();
        clock.last_instant = Instant::now() - std::time::Duration::from_secs(5);
        clock.begin_frame();
        assert!(clock.real_dt <= clock.max_accumulator);
        assert!(clock.accumulator <= clock.max_accumulator + f64::EPSILON);
    }
}
