use std::sync::Arc;

use chrono::NaiveDate;
use serde::Serialize;
use utoipa::ToSchema;

use crate::clock::{BusinessCalendar, Clock};
use crate::error::{PolicyError, PolicyResult};
use crate::model::attendance::{AttendanceFilter, AttendanceLog, AttendanceRecord, AttendanceStatus};
use crate::model::role::Role;
use crate::model::salary::{MonthKey, SalaryListItem, SalaryRecord};
use crate::store::{AttendanceStore, SalaryStore, UserStore};

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct AttendanceSummary {
    #[schema(example = "2024-03-11", value_type = String, format = "date")]
    pub date: NaiveDate,
    #[schema(example = 40)]
    pub total_employees: i64,
    #[schema(example = 35)]
    pub present: i64,
    #[schema(example = 5)]
    pub absent: i64,
}

/// Read-only projections over committed attendance and salaries.
pub struct Reporting {
    users: Arc<dyn UserStore>,
    attendance: Arc<dyn AttendanceStore>,
    salaries: Arc<dyn SalaryStore>,
    clock: Arc<dyn Clock>,
    calendar: BusinessCalendar,
}

impl Reporting {
    pub fn new(
        users: Arc<dyn UserStore>,
        attendance: Arc<dyn AttendanceStore>,
        salaries: Arc<dyn SalaryStore>,
        clock: Arc<dyn Clock>,
        calendar: BusinessCalendar,
    ) -> Self {
        Self {
            users,
            attendance,
            salaries,
            clock,
            calendar,
        }
    }

    pub fn today(&self) -> NaiveDate {
        self.calendar.date_of(self.clock.now())
    }

    pub async fn daily(&self, user_id: u64) -> PolicyResult<Option<AttendanceRecord>> {
        Ok(self.attendance.find_attendance(user_id, self.today()).await?)
    }

    pub async fn monthly(&self, user_id: u64, month: u32, year: i32) -> PolicyResult<Vec<AttendanceRecord>> {
        let month = MonthKey::new(month, year).ok_or_else(|| {
            PolicyError::Validation(format!("invalid month {month}/{year}"))
        })?;
        Ok(self
            .attendance
            .list_attendance_for_user(user_id, month.first_day(), month.last_day())
            .await?)
    }

    /// `status` of `All` in any case disables the status filter.
    pub async fn logs(
        &self,
        start_date: Option<NaiveDate>,
        end_date: Option<NaiveDate>,
        status: Option<&str>,
    ) -> PolicyResult<Vec<AttendanceLog>> {
        let status = match status.map(str::trim) {
            None | Some("") => None,
            Some(s) if s.eq_ignore_ascii_case("all") => None,
            Some(s) => Some(s.parse::<AttendanceStatus>().map_err(|_| {
                PolicyError::Validation(format!("unknown attendance status {s:?}"))
            })?),
        };

        let filter = AttendanceFilter {
            start_date,
            end_date,
            status,
        };
        Ok(self.attendance.list_attendance_logs(&filter).await?)
    }

    pub async fn summary(&self) -> PolicyResult<AttendanceSummary> {
        let date = self.today();
        let total_employees = self.users.count_active_users_with_role(Role::Employee).await?;
        let present = self
            .attendance
            .count_attendance_on(date, AttendanceStatus::Present)
            .await?;

        Ok(AttendanceSummary {
            date,
            total_employees,
            present,
            absent: total_employees - present,
        })
    }

    pub async fn all_salaries(&self) -> PolicyResult<Vec<SalaryListItem>> {
        Ok(self.salaries.list_salaries().await?)
    }

    pub async fn salaries_for_user(&self, user_id: u64) -> PolicyResult<Vec<SalaryRecord>> {
        Ok(self.salaries.list_salaries_for_user(user_id).await?)
    }
}
