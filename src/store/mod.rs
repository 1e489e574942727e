//! Storage boundary for the policy engine.
//!
//! Each component only sees the narrow trait it needs. Uniqueness of
//! `(user, date)` attendance and `(user, month)` salaries is enforced by the
//! implementations and reported as [`StoreError::Duplicate`].
//!
//! [`StoreError::Duplicate`]: crate::error::StoreError::Duplicate

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::error::StoreResult;
use crate::model::attendance::{
    AttendanceFilter, AttendanceKey, AttendanceLog, AttendanceRecord, AttendanceStatus,
    CheckOutUpdate, NewAttendance,
};
use crate::model::role::Role;
use crate::model::salary::{MonthKey, NewSalary, SalaryListItem, SalaryRecord};
use crate::model::settings::CompanySettings;
use crate::model::user::User;

#[cfg(test)]
pub mod memory;
pub mod mysql;

#[async_trait]
pub trait SettingsStore: Send + Sync {
    /// Returns the settings document, creating the default one if none exists.
    async fn load_or_seed_settings(&self) -> StoreResult<CompanySettings>;

    async fn save_settings(&self, settings: &CompanySettings) -> StoreResult<()>;
}

#[async_trait]
pub trait UserStore: Send + Sync {
    async fn find_user(&self, user_id: u64) -> StoreResult<Option<User>>;

    async fn list_users_with_role(&self, role: Role) -> StoreResult<Vec<User>>;

    async fn count_active_users_with_role(&self, role: Role) -> StoreResult<i64>;
}

#[async_trait]
pub trait AttendanceStore: Send + Sync {
    async fn find_attendance(
        &self,
        user_id: u64,
        date: NaiveDate,
    ) -> StoreResult<Option<AttendanceRecord>>;

    async fn insert_attendance(&self, new: NewAttendance) -> StoreResult<AttendanceRecord>;

    /// Writes check-out fields only while the record has no check-out.
    /// Returns `false` when the record was missing or already checked out.
    async fn record_check_out(&self, id: u64, update: CheckOutUpdate) -> StoreResult<bool>;

    async fn list_attendance_for_user(
        &self,
        user_id: u64,
        from: NaiveDate,
        to: NaiveDate,
    ) -> StoreResult<Vec<AttendanceRecord>>;

    async fn count_attendance_with_status(
        &self,
        user_id: u64,
        from: NaiveDate,
        to: NaiveDate,
        statuses: &[AttendanceStatus],
    ) -> StoreResult<i64>;

    async fn count_attendance_on(&self, date: NaiveDate, status: AttendanceStatus) -> StoreResult<i64>;

    /// Newest date first, joined with the owner's profile.
    async fn list_attendance_logs(&self, filter: &AttendanceFilter) -> StoreResult<Vec<AttendanceLog>>;

    /// Every row whose `(user, date)` is shared with at least one other row.
    async fn find_duplicate_attendance(&self) -> StoreResult<Vec<AttendanceKey>>;

    async fn delete_attendance(&self, ids: &[u64]) -> StoreResult<u64>;
}

#[async_trait]
pub trait SalaryStore: Send + Sync {
    async fn find_salary(&self, id: u64) -> StoreResult<Option<SalaryRecord>>;

    async fn find_salary_for_month(
        &self,
        user_id: u64,
        month: MonthKey,
    ) -> StoreResult<Option<SalaryRecord>>;

    async fn insert_salary(&self, new: NewSalary) -> StoreResult<SalaryRecord>;

    /// Persists the mutable fields; `false` when the record no longer exists.
    async fn update_salary(&self, record: &SalaryRecord) -> StoreResult<bool>;

    async fn list_salaries_for_user(&self, user_id: u64) -> StoreResult<Vec<SalaryRecord>>;

    async fn list_salaries(&self) -> StoreResult<Vec<SalaryListItem>>;
}
