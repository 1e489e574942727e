//! Attendance and payroll policy engine.
//!
//! Data flows one way: [`SettingsProvider`] feeds the [`AttendanceRecorder`],
//! whose committed records feed the [`PayrollCalculator`]; [`Reporting`] only
//! reads what the others wrote.

use std::sync::Arc;
use std::time::Duration;

use crate::clock::{BusinessCalendar, Clock};
use crate::config::Config;
use crate::store::{AttendanceStore, SalaryStore, SettingsStore, UserStore};

pub mod attendance;
pub mod dedup;
pub mod payroll;
pub mod report;
pub mod settings;

pub use attendance::AttendanceRecorder;
pub use payroll::{PayrollCalculator, PayrollPolicy};
pub use report::Reporting;
pub use settings::SettingsProvider;

/// Rounds to two decimal places, half away from zero.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// The four components wired to one store and one clock.
pub struct PolicyEngine {
    pub settings: Arc<SettingsProvider>,
    pub attendance: AttendanceRecorder,
    pub payroll: PayrollCalculator,
    pub reports: Reporting,
}

#[derive(Debug, Clone, Copy)]
pub struct EngineOptions {
    pub calendar: BusinessCalendar,
    pub payroll: PayrollPolicy,
    pub settings_ttl: Duration,
}

impl EngineOptions {
    pub fn from_config(config: &Config) -> Self {
        Self {
            calendar: BusinessCalendar::new(config.business_offset),
            payroll: PayrollPolicy {
                days_divisor: config.payroll_days_divisor,
                clamp_absences: config.payroll_clamp_absences,
            },
            settings_ttl: Duration::from_secs(config.settings_cache_ttl_secs),
        }
    }
}

impl PolicyEngine {
    pub fn new<S>(store: Arc<S>, clock: Arc<dyn Clock>, options: EngineOptions) -> Self
    where
        S: SettingsStore + UserStore + AttendanceStore + SalaryStore + 'static,
    {
        let settings = Arc::new(SettingsProvider::new(
            store.clone() as Arc<dyn SettingsStore>,
            options.settings_ttl,
        ));

        let attendance = AttendanceRecorder::new(
            store.clone() as Arc<dyn AttendanceStore>,
            settings.clone(),
            clock.clone(),
            options.calendar,
        );

        let payroll = PayrollCalculator::new(
            store.clone() as Arc<dyn UserStore>,
            store.clone() as Arc<dyn AttendanceStore>,
            store.clone() as Arc<dyn SalaryStore>,
            clock.clone(),
            options.payroll,
        );

        let reports = Reporting::new(
            store.clone() as Arc<dyn UserStore>,
            store.clone() as Arc<dyn AttendanceStore>,
            store as Arc<dyn SalaryStore>,
            clock,
            options.calendar,
        );

        Self {
            settings,
            attendance,
            payroll,
            reports,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::round2;

    #[test]
    fn round2_matches_two_decimal_rendering() {
        assert_eq!(round2(10.5), 10.5);
        assert_eq!(round2(1.499_999), 1.5);
        assert_eq!(round2(9.126), 9.13);
        assert_eq!(round2(-266.666_666), -266.67);
    }
}
