use std::sync::Arc;
use std::time::Duration;

use chrono::Weekday;
use moka::future::Cache;
use serde::Deserialize;
use tracing::{debug, info};
use utoipa::ToSchema;

use crate::error::{PolicyError, PolicyResult};
use crate::model::settings::{CompanySettings, LeavePolicy, parse_hhmm};
use crate::store::SettingsStore;

const MAX_GRACE_PERIOD_MINUTES: u32 = 24 * 60;

/// Serves the company settings document, cached until the next update.
pub struct SettingsProvider {
    store: Arc<dyn SettingsStore>,
    cache: Cache<(), CompanySettings>,
}

impl SettingsProvider {
    pub fn new(store: Arc<dyn SettingsStore>, ttl: Duration) -> Self {
        let cache = Cache::builder().max_capacity(1).time_to_live(ttl).build();
        Self { store, cache }
    }

    /// Returns the settings, seeding the default document on first use.
    pub async fn get_settings(&self) -> PolicyResult<CompanySettings> {
        if let Some(settings) = self.cache.get(&()).await {
            return Ok(settings);
        }

        debug!("Loading company settings from store");
        let settings = self.store.load_or_seed_settings().await?;
        self.cache.insert((), settings.clone()).await;
        Ok(settings)
    }

    pub async fn update_settings(&self, update: UpdateSettings) -> PolicyResult<CompanySettings> {
        let mut settings = self.store.load_or_seed_settings().await?;
        update.apply_to(&mut settings)?;

        self.store.save_settings(&settings).await?;
        self.cache.invalidate(&()).await;

        info!(
            check_in = %settings.working_hours.check_in,
            check_out = %settings.working_hours.check_out,
            grace_period = settings.working_hours.grace_period,
            "Company settings updated"
        );
        Ok(settings)
    }
}

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct UpdateWorkingHours {
    /// `HH:MM`, or empty to clear
    #[schema(example = "09:00")]
    pub check_in: Option<String>,

    #[schema(example = "18:00")]
    pub check_out: Option<String>,

    #[schema(example = 15)]
    pub grace_period: Option<u32>,
}

/// Partial settings update; omitted fields keep their stored value.
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct UpdateSettings {
    #[schema(example = "WorkStream Inc.")]
    pub company_name: Option<String>,

    #[schema(example = "admin@workstream.com")]
    pub admin_email: Option<String>,

    pub working_hours: Option<UpdateWorkingHours>,

    #[schema(example = json!(["Sat", "Sun"]))]
    pub weekend_policy: Option<Vec<String>>,

    pub leave_policy: Option<LeavePolicy>,
}

impl UpdateSettings {
    fn apply_to(self, settings: &mut CompanySettings) -> PolicyResult<()> {
        if let Some(name) = self.company_name {
            settings.company_name = name.trim().to_string();
        }

        if let Some(email) = self.admin_email {
            let email = email.trim();
            if !email.is_empty() && !email.contains('@') {
                return Err(PolicyError::Validation(format!(
                    "admin_email {email:?} is not an email address"
                )));
            }
            settings.admin_email = email.to_string();
        }

        if let Some(hours) = self.working_hours {
            if let Some(check_in) = hours.check_in {
                settings.working_hours.check_in = validate_wall_time("check_in", &check_in)?;
            }
            if let Some(check_out) = hours.check_out {
                settings.working_hours.check_out = validate_wall_time("check_out", &check_out)?;
            }
            if let Some(grace) = hours.grace_period {
                if grace > MAX_GRACE_PERIOD_MINUTES {
                    return Err(PolicyError::Validation(format!(
                        "grace_period must be at most {MAX_GRACE_PERIOD_MINUTES} minutes"
                    )));
                }
                settings.working_hours.grace_period = grace;
            }
        }

        if let Some(days) = self.weekend_policy {
            settings.weekend_policy = normalize_weekdays(&days)?;
        }

        if let Some(leave) = self.leave_policy {
            settings.leave_policy = leave;
        }

        Ok(())
    }
}

/// Empty clears the time; anything else must be `HH:MM`.
fn validate_wall_time(field: &str, raw: &str) -> PolicyResult<String> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(String::new());
    }
    match parse_hhmm(raw) {
        Some(time) => Ok(time.format("%H:%M").to_string()),
        None => Err(PolicyError::Validation(format!(
            "{field} must be HH:MM, got {raw:?}"
        ))),
    }
}

/// Maps day names (`Sat`, `saturday`, ...) to unique three-letter forms, Monday first.
fn normalize_weekdays(days: &[String]) -> PolicyResult<Vec<String>> {
    let mut parsed: Vec<Weekday> = Vec::with_capacity(days.len());
    for day in days {
        let weekday: Weekday = day
            .trim()
            .parse()
            .map_err(|_| PolicyError::Validation(format!("unknown weekday {day:?}")))?;
        if !parsed.contains(&weekday) {
            parsed.push(weekday);
        }
    }
    parsed.sort_by_key(|d| d.num_days_from_monday());
    Ok(parsed.into_iter().map(|d| d.to_string()).collect())
}
