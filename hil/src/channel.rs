use std::{
    collections::VecDeque,
    time::Duration,
};

use serde::{
    Deserialize,
    Serialize,
};

/// Timing of one outbound sensor channel, relative to simulation start.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelConfig {
    pub enabled:     bool,
    /// Nothing is reported before this much simulated time has elapsed.
    pub start_delay: Duration,
    /// Report the state from this long ago.
    pub latency:     Duration,
    /// Minimum spacing between reports; `None` reports every tick.
    pub interval:    Option<Duration>,
}

impl Default for ChannelConfig {
    fn default() -> Self {
        Self {
            enabled:     true,
            start_delay: Duration::ZERO,
            latency:     Duration::ZERO,
            interval:    None,
        }
    }
}

impl ChannelConfig {
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            ..Default::default()
        }
    }

    pub fn every(interval: Duration) -> Self {
        Self {
            interval: Some(interval),
            ..Default::default()
        }
    }
}

/// Emission bookkeeping for one channel.
#[derive(Debug, Clone)]
pub(crate) struct ChannelSchedule {
    config:   ChannelConfig,
    next_due: Option<Duration>,
}

impl ChannelSchedule {
    pub fn new(config: ChannelConfig) -> Self {
        Self {
            config,
            next_due: None,
        }
    }

    #[inline]
    pub fn config(&self) -> &ChannelConfig {
        &self.config
    }

    /// Whether the channel reports at `sim_time`; marks the report as made.
    pub fn due(&mut self, sim_time: Duration) -> bool {
        if !self.config.enabled || sim_time < self.config.start_delay {
            return false;
        }

        match (self.config.interval, self.next_due) {
            (None, _) => true,
            (Some(_), Some(next)) if sim_time < next => false,
            (Some(interval), _) => {
                self.next_due = Some(sim_time + interval);
                true
            },
        }
    }
}

/// Recent samples, kept long enough to serve the largest configured latency.
#[derive(Debug, Clone)]
pub struct DelayLine<T> {
    depth:   Duration,
    samples: VecDeque<(Duration, T)>,
}

impl<T> DelayLine<T> {
    pub fn new(depth: Duration) -> Self {
        Self {
            depth,
            samples: VecDeque::new(),
        }
    }

    pub fn push(&mut self, at: Duration, sample: T) {
        self.samples.push_back((at, sample));

        let horizon = at.saturating_sub(self.depth);
        while self.samples.len() > 1 && self.samples[1].0 <= horizon {
            self.samples.pop_front();
        }
    }

    /// The newest sample taken at or before `now - latency`. Until one exists
    /// the oldest sample stands in.
    pub fn get(&self, now: Duration, latency: Duration) -> Option<&T> {
        let horizon = now.saturating_sub(latency);

        self.samples
            .iter()
            .rev()
            .find(|(at, _)| *at <= horizon)
            .or_else(|| self.samples.front())
            .map(|(_, sample)| sample)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn ms(v: u64) -> Duration {
        Duration::from_millis(v)
    }

    #[test]
    fn start_delay() {
        let mut schedule = ChannelSchedule::new(ChannelConfig {
            start_delay: ms(200),
            ..Default::default()
        });

        let due = (0..10).map(|i| schedule.due(ms(i * 50))).collect::<Vec<_>>();
        assert_eq!(due, vec![false, false, false, false, true, true, true, true, true, true]);
    }

    #[test]
    fn interval() {
        let mut schedule = ChannelSchedule::new(ChannelConfig::every(ms(100)));

        let due = (0..6).map(|i| schedule.due(ms(i * 40))).collect::<Vec<_>>();
        assert_eq!(due, vec![true, false, false, true, false, false]);
    }

    #[test]
    fn disabled() {
        let mut schedule = ChannelSchedule::new(ChannelConfig::disabled());
        assert!(!schedule.due(ms(1000)));
    }

    #[test]
    fn delay_line() {
        let mut line = DelayLine::new(ms(200));

        line.push(ms(0), 0);
        line.push(ms(100), 1);
        assert_eq!(line.get(ms(100), ms(200)), Some(&0));
        assert_eq!(line.get(ms(100), Duration::ZERO), Some(&1));

        for i in 2..10 {
            line.push(ms(i * 100), i);
        }

        assert_eq!(line.get(ms(900), ms(200)), Some(&7));
        assert_eq!(line.get(ms(900), ms(150)), Some(&7));
        assert_eq!(line.get(ms(900), Duration::ZERO), Some(&9));
    }

    #[test]
    fn delay_line_trims_to_depth() {
        let mut line = DelayLine::new(ms(200));

        for i in 0..100 {
            line.push(ms(i * 10), i);
        }

        assert!(line.samples.len() <= 22);
        assert_eq!(line.get(ms(990), ms(200)), Some(&79));
    }
}
