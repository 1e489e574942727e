use chrono::NaiveTime;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct WorkingHours {
    /// Standard check-in time, `HH:MM`; empty when no shift is configured.
    #[schema(example = "09:00")]
    pub check_in: String,

    #[schema(example = "18:00")]
    pub check_out: String,

    /// Minutes after `check_in` that still count as on time.
    #[schema(example = 15)]
    pub grace_period: u32,
}

impl WorkingHours {
    pub fn check_in_time(&self) -> Option<NaiveTime> {
        parse_hhmm(&self.check_in)
    }

    pub fn check_out_time(&self) -> Option<NaiveTime> {
        parse_hhmm(&self.check_out)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct LeavePolicy {
    #[schema(example = 18)]
    pub annual_leave: u32,
    #[schema(example = 10)]
    pub sick_leave: u32,
    #[schema(example = 12)]
    pub casual_leave: u32,
    #[schema(example = 12)]
    pub maternity_leave: u32,
    pub require_approval: bool,
    pub notify_staff: bool,
    pub enable_half_day: bool,
}

/// The single company-wide policy document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct CompanySettings {
    #[schema(example = "WorkStream Inc.")]
    pub company_name: String,

    #[schema(example = "admin@workstream.com")]
    pub admin_email: String,

    pub working_hours: WorkingHours,

    #[schema(example = json!(["Sat", "Sun"]))]
    pub weekend_policy: Vec<String>,

    pub leave_policy: LeavePolicy,
}

/// Parses a strict `HH:MM` 24-hour wall time.
pub fn parse_hhmm(raw: &str) -> Option<NaiveTime> {
    let (h, m) = raw.trim().split_once(':')?;
    if h.is_empty() || h.len() > 2 || m.len() != 2 {
        return None;
    }
    NaiveTime::from_hms_opt(h.parse().ok()?, m.parse().ok()?, 0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_wall_times() {
        assert_eq!(parse_hhmm("09:00"), NaiveTime::from_hms_opt(9, 0, 0));
        assert_eq!(parse_hhmm("9:05"), NaiveTime::from_hms_opt(9, 5, 0));
        assert_eq!(parse_hhmm("23:59"), NaiveTime::from_hms_opt(23, 59, 0));
    }

    #[test]
    fn rejects_malformed_wall_times() {
        assert_eq!(parse_hhmm(""), None);
        assert_eq!(parse_hhmm("24:00"), None);
        assert_eq!(parse_hhmm("09:60"), None);
        assert_eq!(parse_hhmm("0900"), None);
        assert_eq!(parse_hhmm("09:0"), None);
    }

    #[test]
    fn default_settings_have_no_shift() {
        let settings = CompanySettings::default();
        assert!(settings.working_hours.check_in_time().is_none());
        assert!(settings.working_hours.check_out_time().is_none());
        assert_eq!(settings.working_hours.grace_period, 0);
    }
}
