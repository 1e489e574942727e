use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};
use utoipa::ToSchema;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, ToSchema, Display, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum SalaryStatus {
    #[default]
    Unpaid,
    Paid,
}

// Dashboards send "Paid"/"Unpaid"; accept any casing.
impl<'de> Deserialize<'de> for SalaryStatus {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse()
            .map_err(|_| de::Error::unknown_variant(&raw, &["unpaid", "paid"]))
    }
}

/// A calendar month, rendered as the `YYYY-M` token salaries are keyed by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MonthKey {
    year: i32,
    month: u32,
}

impl MonthKey {
    pub fn new(month: u32, year: i32) -> Option<Self> {
        if !(1..=12).contains(&month) || !(1970..=9999).contains(&year) {
            return None;
        }
        Some(Self { year, month })
    }

    pub fn first_day(&self) -> NaiveDate {
        NaiveDate::from_ymd_opt(self.year, self.month, 1).unwrap_or(NaiveDate::MIN)
    }

    pub fn last_day(&self) -> NaiveDate {
        let next = if self.month == 12 {
            NaiveDate::from_ymd_opt(self.year + 1, 1, 1)
        } else {
            NaiveDate::from_ymd_opt(self.year, self.month + 1, 1)
        };
        next.and_then(|d| d.pred_opt()).unwrap_or(NaiveDate::MAX)
    }
}

impl fmt::Display for MonthKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.year, self.month)
    }
}

/// Monthly pay snapshot derived from attendance.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SalaryRecord {
    #[schema(example = 7)]
    pub id: u64,

    #[schema(example = 42)]
    pub user_id: u64,

    #[schema(example = "2024-3")]
    pub month: String,

    #[schema(example = 30000.0)]
    pub base_salary: f64,

    #[schema(example = 8000.0)]
    pub deductions: f64,

    #[schema(example = 0.0)]
    pub overtime_credits: f64,

    #[schema(example = 22000.0)]
    pub total_payable: f64,

    pub status: SalaryStatus,

    #[schema(value_type = Option<String>, format = "date-time")]
    pub paid_date: Option<DateTime<Utc>>,

    #[schema(value_type = String, format = "date-time")]
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewSalary {
    pub user_id: u64,
    pub month: MonthKey,
    pub base_salary: f64,
    pub deductions: f64,
    pub total_payable: f64,
    pub created_at: DateTime<Utc>,
}

/// Row of the admin salary listing.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct SalaryListItem {
    pub id: u64,
    #[schema(example = "Jane Doe")]
    pub employee_name: String,
    #[schema(example = "2024-3")]
    pub month: String,
    pub base_salary: f64,
    pub deductions: f64,
    pub net_pay: f64,
    pub status: SalaryStatus,
}
