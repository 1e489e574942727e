use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};
use utoipa::ToSchema;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ToSchema, Display, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum AttendanceStatus {
    Present,
    #[default]
    Absent,
    Late,
    Leave,
}

impl AttendanceStatus {
    /// Statuses that count as a paid day when prorating salary.
    pub const PAID: [AttendanceStatus; 2] = [AttendanceStatus::Present, AttendanceStatus::Leave];
}

/// One employee's attendance for one business day.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AttendanceRecord {
    #[schema(example = 1)]
    pub id: u64,

    #[schema(example = 42)]
    pub user_id: u64,

    #[schema(example = "2024-03-11", value_type = String, format = "date")]
    pub date: NaiveDate,

    #[schema(example = "2024-03-11T03:02:11Z", value_type = Option<String>, format = "date-time")]
    pub check_in: Option<DateTime<Utc>>,

    #[schema(example = "2024-03-11T12:10:00Z", value_type = Option<String>, format = "date-time")]
    pub check_out: Option<DateTime<Utc>>,

    #[schema(example = 9.13)]
    pub working_hours: f64,

    #[schema(example = 0.13)]
    pub overtime_hours: f64,

    pub status: AttendanceStatus,

    #[schema(value_type = String, format = "date-time")]
    pub created_at: DateTime<Utc>,
}

/// Values written when a day's record is first created.
#[derive(Debug, Clone)]
pub struct NewAttendance {
    pub user_id: u64,
    pub date: NaiveDate,
    pub check_in: DateTime<Utc>,
    pub status: AttendanceStatus,
    pub created_at: DateTime<Utc>,
}

/// Derived fields written once at check-out.
#[derive(Debug, Clone, Copy)]
pub struct CheckOutUpdate {
    pub check_out: DateTime<Utc>,
    pub working_hours: f64,
    pub overtime_hours: f64,
}

/// Attendance row joined with the owning user's profile.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct AttendanceLog {
    #[serde(flatten)]
    pub record: AttendanceRecord,
    pub user_name: Option<String>,
    pub user_email: Option<String>,
    pub user_designation: Option<String>,
}

/// Key columns the deduplication sweep needs.
#[derive(Debug, Clone)]
pub struct AttendanceKey {
    pub id: u64,
    pub user_id: u64,
    pub date: NaiveDate,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default)]
pub struct AttendanceFilter {
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub status: Option<AttendanceStatus>,
}
