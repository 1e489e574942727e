use chrono::{DateTime, Duration, FixedOffset, NaiveDate, NaiveTime, TimeZone, Utc};

/// Source of "now" for every policy decision.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Maps instants onto business days in a fixed UTC offset.
#[derive(Debug, Clone, Copy)]
pub struct BusinessCalendar {
    offset: FixedOffset,
}

impl BusinessCalendar {
    pub fn new(offset: FixedOffset) -> Self {
        Self { offset }
    }

    /// Business date the instant falls on.
    pub fn date_of(&self, instant: DateTime<Utc>) -> NaiveDate {
        instant.with_timezone(&self.offset).date_naive()
    }

    /// Instant at which the business clock reads `time` on `date`.
    pub fn instant_at(&self, date: NaiveDate, time: NaiveTime) -> DateTime<Utc> {
        let local = date.and_time(time);
        Utc.from_utc_datetime(&(local - Duration::seconds(self.offset.local_minus_utc() as i64)))
    }
}

#[cfg(test)]
pub mod testing {
    use super::*;
    use std::sync::Mutex;

    /// Clock pinned to an instant that tests move by hand.
    pub struct FixedClock(Mutex<DateTime<Utc>>);

    impl FixedClock {
        pub fn at(instant: DateTime<Utc>) -> Self {
            Self(Mutex::new(instant))
        }

        pub fn set(&self, instant: DateTime<Utc>) {
            *self.0.lock().unwrap() = instant;
        }

        pub fn advance(&self, by: Duration) {
            *self.0.lock().unwrap() += by;
        }
    }

    impl Clock for FixedClock {
        fn now(&self) -> DateTime<Utc> {
            *self.0.lock().unwrap()
        }
    }

    /// Shorthand for a UTC instant.
    pub fn utc(y: i32, mo: u32, d: u32, h: u32, mi: u32, s: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, mo, d, h, mi, s).unwrap()
    }
}

#[cfg(test)]
mod tests {
    use super::testing::utc;
    use super::*;

    #[test]
    fn business_date_follows_offset() {
        let dhaka = BusinessCalendar::new(FixedOffset::east_opt(6 * 3600).unwrap());
        // 20:30 UTC is already the next morning in UTC+6
        let instant = utc(2024, 3, 10, 20, 30, 0);
        assert_eq!(dhaka.date_of(instant), NaiveDate::from_ymd_opt(2024, 3, 11).unwrap());

        let utc_cal = BusinessCalendar::new(FixedOffset::east_opt(0).unwrap());
        assert_eq!(utc_cal.date_of(instant), NaiveDate::from_ymd_opt(2024, 3, 10).unwrap());
    }

    #[test]
    fn instant_at_converts_local_wall_time() {
        let dhaka = BusinessCalendar::new(FixedOffset::east_opt(6 * 3600).unwrap());
        let date = NaiveDate::from_ymd_opt(2024, 3, 11).unwrap();
        let nine = NaiveTime::from_hms_opt(9, 0, 0).unwrap();
        assert_eq!(dhaka.instant_at(date, nine), utc(2024, 3, 11, 3, 0, 0));
    }
}
