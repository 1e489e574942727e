use std::sync::Arc;

use chrono::{DateTime, Duration, NaiveDate, Timelike, Utc};
use tracing::{debug, info, warn};

use crate::clock::{BusinessCalendar, Clock};
use crate::error::{PolicyError, PolicyResult, StoreError};
use crate::model::attendance::{AttendanceRecord, AttendanceStatus, CheckOutUpdate, NewAttendance};
use crate::model::settings::WorkingHours;
use crate::policy::{SettingsProvider, round2};
use crate::store::AttendanceStore;

/// Overtime threshold used when no usable shift is configured.
pub const DEFAULT_STANDARD_SHIFT_HOURS: f64 = 9.0;

/// Decides on-time versus late for a check-in at `now` on business day `date`.
///
/// Arrival exactly at the end of the grace period is still `Present`.
pub fn arrival_status(
    hours: &WorkingHours,
    calendar: &BusinessCalendar,
    date: NaiveDate,
    now: DateTime<Utc>,
) -> AttendanceStatus {
    let Some(start) = hours.check_in_time() else {
        if !hours.check_in.trim().is_empty() {
            warn!(check_in = %hours.check_in, "Ignoring unparsable shift start");
        }
        return AttendanceStatus::Present;
    };

    let limit = calendar.instant_at(date, start) + Duration::minutes(hours.grace_period as i64);
    if now > limit {
        debug!(%now, %limit, "Check-in after grace period");
        AttendanceStatus::Late
    } else {
        AttendanceStatus::Present
    }
}

/// Configured shift length in hours; overnight shifts wrap past midnight.
pub fn standard_shift_hours(hours: Option<&WorkingHours>) -> f64 {
    let Some((start, end)) = hours.and_then(|h| Some((h.check_in_time()?, h.check_out_time()?))) else {
        return DEFAULT_STANDARD_SHIFT_HOURS;
    };

    let as_hours = |t: chrono::NaiveTime| t.hour() as f64 + t.minute() as f64 / 60.0;
    let mut length = as_hours(end) - as_hours(start);
    if length < 0.0 {
        length += 24.0;
    }

    if length > 0.0 { length } else { DEFAULT_STANDARD_SHIFT_HOURS }
}

/// Elapsed time in fractional hours.
pub fn elapsed_hours(from: DateTime<Utc>, to: DateTime<Utc>) -> f64 {
    (to - from).num_milliseconds() as f64 / 3_600_000.0
}

/// Working and overtime hours for a session, both rounded to two decimals.
pub fn session_hours(worked: f64, standard_shift: f64) -> (f64, f64) {
    let overtime = if worked > standard_shift {
        round2(worked - standard_shift)
    } else {
        0.0
    };
    (round2(worked), overtime)
}

/// Records the daily check-in / check-out pair for each user.
pub struct AttendanceRecorder {
    store: Arc<dyn AttendanceStore>,
    settings: Arc<SettingsProvider>,
    clock: Arc<dyn Clock>,
    calendar: BusinessCalendar,
}

impl AttendanceRecorder {
    pub fn new(
        store: Arc<dyn AttendanceStore>,
        settings: Arc<SettingsProvider>,
        clock: Arc<dyn Clock>,
        calendar: BusinessCalendar,
    ) -> Self {
        Self {
            store,
            settings,
            clock,
            calendar,
        }
    }

    pub async fn check_in(&self, user_id: u64) -> PolicyResult<AttendanceRecord> {
        let now = self.clock.now();
        let today = self.calendar.date_of(now);

        if self.store.find_attendance(user_id, today).await?.is_some() {
            return Err(PolicyError::AlreadyCheckedIn);
        }

        let settings = self.settings.get_settings().await?;
        let status = arrival_status(&settings.working_hours, &self.calendar, today, now);

        let record = self
            .store
            .insert_attendance(NewAttendance {
                user_id,
                date: today,
                check_in: now,
                status,
                created_at: now,
            })
            .await
            .map_err(|e| match e {
                // lost a race against a concurrent check-in for the same day
                StoreError::Duplicate => PolicyError::AlreadyCheckedIn,
                other => other.into(),
            })?;

        info!(user_id, date = %today, status = %status, "Checked in");
        Ok(record)
    }

    pub async fn check_out(&self, user_id: u64) -> PolicyResult<AttendanceRecord> {
        let now = self.clock.now();
        let today = self.calendar.date_of(now);

        let mut record = self
            .store
            .find_attendance(user_id, today)
            .await?
            .ok_or(PolicyError::NotCheckedIn)?;

        if record.check_out.is_some() {
            return Err(PolicyError::AlreadyCheckedOut);
        }
        let check_in = record.check_in.ok_or(PolicyError::NotCheckedIn)?;
        if now < check_in {
            return Err(PolicyError::CheckOutBeforeCheckIn);
        }

        let settings = self.settings.get_settings().await?;
        let standard_shift = standard_shift_hours(Some(&settings.working_hours));
        let (working_hours, overtime_hours) =
            session_hours(elapsed_hours(check_in, now), standard_shift);

        let update = CheckOutUpdate {
            check_out: now,
            working_hours,
            overtime_hours,
        };
        if !self.store.record_check_out(record.id, update).await? {
            return Err(PolicyError::AlreadyCheckedOut);
        }

        record.check_out = Some(now);
        record.working_hours = working_hours;
        record.overtime_hours = overtime_hours;

        info!(user_id, date = %today, working_hours, overtime_hours, "Checked out");
        Ok(record)
    }
}
