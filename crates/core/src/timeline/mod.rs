use std::time::{Duration, Instant};

/// Fixed-rate frame pacer.
///
/// [`FrameClock::tick`] blocks until one frame period has passed since the
/// previous tick, then returns the time actually elapsed between the two.
#[derive(Debug, Clone)]
pub struct FrameClock {
    period: Option<Duration>,
    last_tick: Option<Instant>,
    frames: u64,
}

impl FrameClock {
    /// Paces to `fps` frames per second; `0` never sleeps.
    pub fn new(fps: u32) -> Self {
        let period = (fps > 0).then(|| Duration::from_secs_f64(1.0 / fps as f64));
        Self {
            period,
            last_tick: None,
            frames: 0,
        }
    }

    pub fn unthrottled() -> Self {
        Self::new(0)
    }

    pub fn period(&self) -> Option<Duration> {
        self.period
    }

    /// Number of ticks taken so far.
    pub fn frames(&self) -> u64 {
        self.frames
    }

    pub fn tick(&mut self) -> Duration {
        let now = Instant::now();
        let elapsed = match (self.last_tick, self.period) {
            (Some(last), Some(period)) => {
                let deadline = last + period;
                if deadline > now {
                    std::thread::sleep(deadline - now);
                }
                last.elapsed()
            }
            (Some(last), None) => now - last,
            (None, _) => Duration::ZERO,
        };

        self.last_tick = Some(Instant::now());
        self.frames += 1;
        elapsed
    }
}
