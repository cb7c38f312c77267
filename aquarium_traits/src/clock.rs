use chrono::{Local, NaiveDateTime};

/// Wall-clock abstraction for the simulation loop.
///
/// Readings depend on local time of day (day/night profile) and history
/// samples are aligned to wall-clock minutes, so the clock hands out
/// local naive timestamps rather than monotonic instants.
pub trait Clock {
    fn now(&self) -> NaiveDateTime;
}

/// Default clock backed by the system's local time zone.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl SystemClock {
    #[inline]
    pub fn new() -> Self {
        Self
    }
}

impl Clock for SystemClock {
    #[inline]
    fn now(&self) -> NaiveDateTime {
        Local::now().naive_local()
    }
}

impl<C: Clock + ?Sized> Clock for std::sync::Arc<C> {
    fn now(&self) -> NaiveDateTime {
        (**self).now()
    }
}

#[cfg(any(test, feature = "test-clock"))]
pub mod test_clock {
    use super::*;
    use chrono::{NaiveDate, TimeDelta};
    use std::sync::{Arc, Mutex};

    /// Deterministic test clock whose time can be advanced manually.
    #[derive(Debug, Clone)]
    pub struct ManualClock {
        now: Arc<Mutex<NaiveDateTime>>,
    }

    impl ManualClock {
        pub fn new(start: NaiveDateTime) -> Self {
            Self {
                now: Arc::new(Mutex::new(start)),
            }
        }

        /// Clock set to the given time of day on a fixed date.
        pub fn at(hour: u32, minute: u32) -> Self {
            let start = NaiveDate::from_ymd_opt(2024, 6, 1)
                .and_then(|d| d.and_hms_opt(hour, minute, 0))
                .unwrap_or_default();
            Self::new(start)
        }

        /// Advance the clock by the given duration.
        pub fn advance(&self, d: TimeDelta) {
            if let Ok(mut now) = self.now.lock() {
                *now += d;
            }
        }

        /// Jump to an absolute time.
        pub fn set(&self, t: NaiveDateTime) {
            if let Ok(mut now) = self.now.lock() {
                *now = t;
            }
        }
    }

    impl Clock for ManualClock {
        fn now(&self) -> NaiveDateTime {
            self.now.lock().map(|g| *g).unwrap_or_default()
        }
    }

    #[cfg(test)]
    mod tests {
        use super::*;
        use chrono::Timelike;

        #[test]
        fn advances_by_minutes() {
            let clock = ManualClock::at(9, 58);
            clock.advance(TimeDelta::minutes(3));
            assert_eq!(clock.now().hour(), 10);
            assert_eq!(clock.now().minute(), 1);
        }
    }
}
