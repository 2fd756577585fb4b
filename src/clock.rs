use chrono::{DateTime, Local, NaiveDate, Utc};

/// Source of the current instant, so mutations and relative timeframes stay
/// deterministic under test.
pub(crate) trait Clock {
    fn now(&self) -> DateTime<Utc>;

    /// The user's calendar date. Future-date checks and relative windows use this.
    fn today(&self) -> NaiveDate;
}

#[derive(Debug, Default, Clone, Copy)]
pub(crate) struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }

    fn today(&self) -> NaiveDate {
        Local::now().date_naive()
    }
}

/// A clock stopped at one instant. Tests pin dates with it, and dry runs
/// freeze the live clock so a scratch import sees the same "today".
#[derive(Debug, Clone, Copy)]
pub(crate) struct FixedClock {
    now: DateTime<Utc>,
    today: NaiveDate,
}

impl FixedClock {
    #[cfg(test)]
    pub(crate) fn on(date: NaiveDate) -> Self {
        Self {
            now: date.and_time(chrono::NaiveTime::default()).and_utc(),
            today: date,
        }
    }

    pub(crate) fn frozen(clock: &dyn Clock) -> Self {
        Self {
            now: clock.now(),
            today: clock.today(),
        }
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.now
    }

    fn today(&self) -> NaiveDate {
        self.today
    }
}
