use std::time::{
    Duration,
    Instant,
};

use serde::{
    Deserialize,
    Serialize,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchedulerConfig {
    pub period:  Duration,
    /// Wall-clock lead over simulated time tolerated before ticks are skipped.
    pub max_lag: Duration,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            period:  Duration::from_millis(2),
            max_lag: Duration::from_millis(10),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tick {
    pub index:    u64,
    /// Simulated time since the first tick.
    pub sim_time: Duration,
    /// Simulated time advanced by this tick.
    pub dt:       Duration,
    /// Periods skipped to catch up with the wall clock.
    pub skipped:  u32,
}

/// Fixed-period simulated clock. Each call to [`Scheduler::advance`] moves
/// simulated time forward by one period, or by several when the wall clock
/// has run ahead by more than `max_lag`.
#[derive(Debug, Clone)]
pub struct Scheduler {
    config:   SchedulerConfig,
    origin:   Option<Instant>,
    sim_time: Duration,
    index:    u64,
    skipped:  u64,
}

impl Scheduler {
    pub fn new(config: SchedulerConfig) -> Self {
        Self {
            config,
            origin: None,
            sim_time: Duration::ZERO,
            index: 0,
            skipped: 0,
        }
    }

    #[inline]
    pub fn period(&self) -> Duration {
        self.config.period
    }

    #[inline]
    pub fn sim_time(&self) -> Duration {
        self.sim_time
    }

    /// Total periods skipped so far.
    #[inline]
    pub fn skipped(&self) -> u64 {
        self.skipped
    }

    /// The first call anchors the clock at `now` and yields tick zero.
    pub fn advance(&mut self, now: Instant) -> Tick {
        let origin = match self.origin {
            Some(origin) => origin,
            None => {
                self.origin = Some(now);

                return Tick {
                    index:    0,
                    sim_time: Duration::ZERO,
                    dt:       Duration::ZERO,
                    skipped:  0,
                };
            },
        };

        let period = self.config.period;
        let mut dt = period;
        let mut skipped = 0;

        let wall = now.saturating_duration_since(origin);
        let target = self.sim_time + period;

        if wall > target + self.config.max_lag && !period.is_zero() {
            let behind = (wall - target).as_nanos() / period.as_nanos();
            skipped = behind.min(u32::MAX as u128) as u32;
            dt += period * skipped;

            tracing::debug!(skipped, lag = ?(wall - target), "simulation behind wall clock");
        }

        self.sim_time += dt;
        self.index += 1;
        self.skipped += skipped as u64;

        Tick {
            index: self.index,
            sim_time: self.sim_time,
            dt,
            skipped,
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn ms(v: u64) -> Duration {
        Duration::from_millis(v)
    }

    #[test]
    fn on_time_ticks() {
        let mut scheduler = Scheduler::new(SchedulerConfig::default());
        let start = Instant::now();

        let first = scheduler.advance(start);
        assert_eq!(first.index, 0);
        assert_eq!(first.sim_time, Duration::ZERO);

        for i in 1..=5u64 {
            let tick = scheduler.advance(start + ms(i * 2));
            assert_eq!(tick.index, i);
            assert_eq!(tick.sim_time, ms(i * 2));
            assert_eq!(tick.dt, ms(2));
            assert_eq!(tick.skipped, 0);
        }
    }

    #[test]
    fn small_lag_is_tolerated() {
        let mut scheduler = Scheduler::new(SchedulerConfig::default());
        let start = Instant::now();

        scheduler.advance(start);
        let tick = scheduler.advance(start + ms(9));

        assert_eq!(tick.dt, ms(2));
        assert_eq!(scheduler.skipped(), 0);
    }

    #[test]
    fn skips_ahead() {
        let mut scheduler = Scheduler::new(SchedulerConfig::default());
        let start = Instant::now();

        scheduler.advance(start);
        let tick = scheduler.advance(start + ms(50));

        // target was 2 ms; 48 ms behind is 24 periods
        assert_eq!(tick.skipped, 24);
        assert_eq!(tick.sim_time, ms(50));
        assert_eq!(tick.dt, ms(50));
        assert_eq!(scheduler.skipped(), 24);

        let next = scheduler.advance(start + ms(52));
        assert_eq!(next.sim_time, ms(52));
        assert_eq!(next.skipped, 0);
    }

    #[test]
    fn running_ahead_does_not_wait() {
        let mut scheduler = Scheduler::new(SchedulerConfig::default());
        let start = Instant::now();

        scheduler.advance(start);
        let tick = scheduler.advance(start);

        assert_eq!(tick.sim_time, ms(2));
    }
}
