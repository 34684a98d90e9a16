use super::ring::RingBuffer;

/// Frames kept in the rolling window (~2 seconds at 60 Hz).
const WINDOW_LEN: usize = 120;
/// How often to log FPS/TPS (seconds).
const LOG_INTERVAL: f64 = 5.0;

#[derive(Debug, Clone, Copy, Default)]
struct FrameSample {
    dt: f64,
    ticks: u32,
}

/// Rolling frame-rate and tick-rate measurement.
pub struct RateStats {
    samples: RingBuffer<FrameSample>,
    /// Drawn frames per second over the window.
    pub fps: f64,
    /// Logical ticks per second over the window.
    pub tps: f64,
    frame_count: u64,
    tick_count: u64,

    // Periodic log accumulator.
    log_timer: f64,
    log_frames: u32,
    log_ticks: u32,
    log_frame_max: f64,
}

impl RateStats {
    pub fn new() -> Self {
        Self {
            samples: RingBuffer::new(WINDOW_LEN),
            fps: 0.0,
            tps: 0.0,
            frame_count: 0,
            tick_count: 0,
            log_timer: 0.0,
            log_frames: 0,
            log_ticks: 0,
            log_frame_max: 0.0,
        }
    }

    /// Record one drawn frame that took `dt` seconds and ran `ticks` ticks.
    pub fn record(&mut self, dt: f64, ticks: u32) {
        self.frame_count += 1;
        self.tick_count += u64::from(ticks);
        self.samples.push(FrameSample { dt, ticks });

        let (time, total_ticks) = self
            .samples
            .iter()
            .fold((0.0, 0u32), |(t, n), s| (t + s.dt, n + s.ticks));
        if time > 0.0 {
            self.fps = self.samples.len() as f64 / time;
            self.tps = f64::from(total_ticks) / time;
        }

        self.log_timer += dt;
        self.log_frames += 1;
        self.log_ticks += ticks;
        self.log_frame_max = self.log_frame_max.max(dt);

        if self.log_timer >= LOG_INTERVAL {
            log::info!(
                "FPS: {:.0} | TPS: {:.0} | max frame: {:.2}ms | total frames: {} | total ticks: {}",
                f64::from(self.log_frames) / self.log_timer,
                f64::from(self.log_ticks) / self.log_timer,
                self.log_frame_max * 1000.0,
                self.frame_count,
                self.tick_count,
            );
            self.log_timer = 0.0;
            self.log_frames = 0;
            self.log_ticks = 0;
            self.log_frame_max = 0.0;
        }
    }

    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }
}

impl Default for RateStats {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn one_tick_per_frame_at_60hz() {
        let mut stats = RateStats::new();
        for _ in 0..60 {
            stats.record(1.0 / 60.0, 1);
        }
        assert!((stats.fps - 60.0).abs() < 1e-6);
        assert!((stats.tps - 60.0).abs() < 1e-6);
        assert_eq!(stats.frame_count(), 60);
        assert_eq!(stats.tick_count(), 60);
    }

    #[test]
    fn fast_display_draws_more_than_it_ticks() {
        let mut stats = RateStats::new();
        for i in 0..240 {
            stats.record(1.0 / 120.0, i % 2);
        }
        assert!((stats.fps - 120.0).abs() < 1e-6);
        assert!((stats.tps - 60.0).abs() < 1e-6);
    }

    #[test]
    fn zero_dt_keeps_previous_rates() {
        let mut stats = RateStats::new();
        stats.record(0.0, 0);
        assert_eq!(stats.fps, 0.0);
        assert_eq!(stats.tps, 0.0);
    }
}
