use std::time::{Duration, Instant};

/// Frames slower than this are dropped rather than simulated in one big jump.
pub const MAX_FRAME: Duration = Duration::from_millis(200);

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FrameTick {
    Run(f64),
    Skip(f64),
}

#[derive(Debug, Clone, Copy, Default)]
pub struct FrameClock {
    last: Option<Instant>,
}

impl FrameClock {
    pub fn new() -> Self {
        Self { last: None }
    }

    /// Seconds since the previous tick. The first tick has no reference point
    /// and is skipped, as is any frame of `MAX_FRAME` or longer.
    pub fn tick(&mut self, now: Instant) -> FrameTick {
        let Some(last) = self.last.replace(now) else {
            return FrameTick::Skip(0.0);
        };
        let dt = now.saturating_duration_since(last);
        if dt >= MAX_FRAME {
            FrameTick::Skip(dt.as_secs_f64())
        } else {
            FrameTick::Run(dt.as_secs_f64())
        }
    }

    pub fn reset(&mut self) {
        self.last = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_tick_is_skipped() {
        let mut clock = FrameClock::new();
        assert_eq!(clock.tick(Instant::now()), FrameTick::Skip(0.0));
    }

    #[test]
    fn short_frames_run_and_stalls_skip() {
        let start = Instant::now();
        let mut clock = FrameClock::new();
        clock.tick(start);
        assert_eq!(
            clock.tick(start + Duration::from_millis(16)),
            FrameTick::Run(0.016)
        );
        let stalled = start + Duration::from_millis(16) + Duration::from_millis(500);
        assert_eq!(clock.tick(stalled), FrameTick::Skip(0.5));
    }
}
