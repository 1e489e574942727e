use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use utoipa::ToSchema;

use crate::clock::Clock;
use crate::config::DEFAULT_PAYROLL_DAYS_DIVISOR;
use crate::error::{PolicyError, PolicyResult, StoreError};
use crate::model::attendance::AttendanceStatus;
use crate::model::role::Role;
use crate::model::salary::{MonthKey, NewSalary, SalaryRecord, SalaryStatus};
use crate::model::user::{SalaryBasis, User};
use crate::policy::round2;
use crate::store::{AttendanceStore, SalaryStore, UserStore};

/// Proration constants.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PayrollPolicy {
    /// Working days per month, regardless of the calendar.
    pub days_divisor: u32,
    /// Floor the absence count at zero instead of crediting extra paid days.
    pub clamp_absences: bool,
}

impl Default for PayrollPolicy {
    fn default() -> Self {
        Self {
            days_divisor: DEFAULT_PAYROLL_DAYS_DIVISOR,
            clamp_absences: false,
        }
    }
}

/// Unrounded figures of one month's proration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Proration {
    pub monthly_base: f64,
    pub per_day: f64,
    pub absent_days: i64,
    pub deductions: f64,
    pub total_payable: f64,
}

impl PayrollPolicy {
    pub fn prorate(&self, monthly_base: f64, paid_days: i64) -> Proration {
        let divisor = self.days_divisor.max(1);
        let per_day = monthly_base / divisor as f64;

        let mut absent_days = divisor as i64 - paid_days;
        if self.clamp_absences {
            absent_days = absent_days.max(0);
        }

        let deductions = absent_days as f64 * per_day;
        Proration {
            monthly_base,
            per_day,
            absent_days,
            deductions,
            total_payable: monthly_base - deductions,
        }
    }
}

/// Monthly base pay of a user, rejecting missing or malformed salaries.
pub fn monthly_base(user: &User) -> PolicyResult<f64> {
    let invalid = |reason: &str| PolicyError::InvalidSalary {
        user_id: user.id,
        reason: reason.to_string(),
    };

    let salary = user.salary.ok_or_else(|| invalid("salary is not set"))?;
    if !salary.is_finite() {
        return Err(invalid("salary is not a number"));
    }
    if salary < 0.0 {
        return Err(invalid("salary is negative"));
    }

    Ok(match user.salary_type {
        SalaryBasis::Annual => salary / 12.0,
        SalaryBasis::Monthly => salary,
    })
}

/// Outcome of a single generation; an existing month is never overwritten.
#[derive(Debug, Clone)]
pub enum SalaryGeneration {
    Created(SalaryRecord),
    AlreadyExists(SalaryRecord),
}

impl SalaryGeneration {
    pub fn is_created(&self) -> bool {
        matches!(self, SalaryGeneration::Created(_))
    }

    pub fn record(&self) -> &SalaryRecord {
        match self {
            SalaryGeneration::Created(r) | SalaryGeneration::AlreadyExists(r) => r,
        }
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct BatchFailure {
    #[schema(example = 42)]
    pub user_id: u64,
    #[schema(example = "User 42 has no usable salary: salary is not set")]
    pub reason: String,
}

#[derive(Debug, Clone, Default, Serialize, ToSchema)]
pub struct BatchSummary {
    #[schema(example = 12)]
    pub created: usize,
    #[schema(example = 3)]
    pub skipped: usize,
    pub failed: Vec<BatchFailure>,
}

/// Manual correction of a salary record; omitted fields are left alone.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct AdjustSalary {
    #[schema(example = 30000.0)]
    pub base_salary: Option<f64>,
    #[schema(example = 5000.0)]
    pub deductions: Option<f64>,
    pub status: Option<SalaryStatus>,
}

impl AdjustSalary {
    fn validate(&self) -> PolicyResult<()> {
        if let Some(base) = self.base_salary {
            if !base.is_finite() || base < 0.0 {
                return Err(PolicyError::Validation(
                    "base_salary must be a non-negative number".into(),
                ));
            }
        }
        if let Some(deductions) = self.deductions {
            if !deductions.is_finite() {
                return Err(PolicyError::Validation("deductions must be a number".into()));
            }
        }
        Ok(())
    }
}

pub struct PayrollCalculator {
    users: Arc<dyn UserStore>,
    attendance: Arc<dyn AttendanceStore>,
    salaries: Arc<dyn SalaryStore>,
    clock: Arc<dyn Clock>,
    policy: PayrollPolicy,
}

impl PayrollCalculator {
    pub fn new(
        users: Arc<dyn UserStore>,
        attendance: Arc<dyn AttendanceStore>,
        salaries: Arc<dyn SalaryStore>,
        clock: Arc<dyn Clock>,
        policy: PayrollPolicy,
    ) -> Self {
        Self {
            users,
            attendance,
            salaries,
            clock,
            policy,
        }
    }

    pub async fn generate_salary(
        &self,
        user_id: u64,
        month: u32,
        year: i32,
    ) -> PolicyResult<SalaryGeneration> {
        let month = month_key(month, year)?;
        let user = self
            .users
            .find_user(user_id)
            .await?
            .ok_or(PolicyError::UserNotFound)?;

        self.generate_for(&user, month).await
    }

    /// Generates the month for every employee, isolating per-user failures.
    pub async fn generate_batch(&self, month: u32, year: i32) -> PolicyResult<BatchSummary> {
        let month = month_key(month, year)?;
        let employees = self.users.list_users_with_role(Role::Employee).await?;

        let mut summary = BatchSummary::default();
        for user in &employees {
            match self.generate_for(user, month).await {
                Ok(SalaryGeneration::Created(_)) => summary.created += 1,
                Ok(SalaryGeneration::AlreadyExists(_)) => {
                    info!(user_id = user.id, %month, "Salary already generated, skipping");
                    summary.skipped += 1;
                }
                Err(e) => {
                    warn!(user_id = user.id, %month, error = %e, "Salary generation failed");
                    summary.failed.push(BatchFailure {
                        user_id: user.id,
                        reason: e.to_string(),
                    });
                }
            }
        }

        info!(
            %month,
            created = summary.created,
            skipped = summary.skipped,
            failed = summary.failed.len(),
            "Batch salary generation finished"
        );
        Ok(summary)
    }

    pub async fn mark_paid(&self, salary_id: u64) -> PolicyResult<SalaryRecord> {
        let mut record = self.load(salary_id).await?;
        record.status = SalaryStatus::Paid;
        record.paid_date = Some(self.clock.now());

        self.store(&record).await?;
        info!(salary_id, user_id = record.user_id, month = %record.month, "Salary marked paid");
        Ok(record)
    }

    pub async fn adjust_salary(
        &self,
        salary_id: u64,
        adjust: AdjustSalary,
    ) -> PolicyResult<SalaryRecord> {
        adjust.validate()?;
        let mut record = self.load(salary_id).await?;

        let amounts_changed = adjust.base_salary.is_some() || adjust.deductions.is_some();
        if let Some(base) = adjust.base_salary {
            record.base_salary = round2(base);
        }
        if let Some(deductions) = adjust.deductions {
            record.deductions = round2(deductions);
        }
        if amounts_changed {
            record.total_payable = round2(record.base_salary - record.deductions);
        }

        match adjust.status {
            Some(SalaryStatus::Paid) => {
                record.status = SalaryStatus::Paid;
                if record.paid_date.is_none() {
                    record.paid_date = Some(self.clock.now());
                }
            }
            Some(SalaryStatus::Unpaid) => {
                record.status = SalaryStatus::Unpaid;
                record.paid_date = None;
            }
            None => {}
        }

        self.store(&record).await?;
        info!(salary_id, total_payable = record.total_payable, "Salary adjusted");
        Ok(record)
    }

    async fn generate_for(&self, user: &User, month: MonthKey) -> PolicyResult<SalaryGeneration> {
        if let Some(existing) = self.salaries.find_salary_for_month(user.id, month).await? {
            return Ok(SalaryGeneration::AlreadyExists(existing));
        }

        let base = monthly_base(user)?;
        let paid_days = self
            .attendance
            .count_attendance_with_status(
                user.id,
                month.first_day(),
                month.last_day(),
                &AttendanceStatus::PAID,
            )
            .await?;

        let figures = self.policy.prorate(base, paid_days);
        debug!(
            user_id = user.id,
            %month,
            paid_days,
            absent_days = figures.absent_days,
            per_day = figures.per_day,
            "Prorated salary"
        );

        let new = NewSalary {
            user_id: user.id,
            month,
            base_salary: round2(figures.monthly_base),
            deductions: round2(figures.deductions),
            total_payable: round2(figures.total_payable),
            created_at: self.clock.now(),
        };

        match self.salaries.insert_salary(new).await {
            Ok(record) => {
                info!(user_id = user.id, %month, total_payable = record.total_payable, "Salary generated");
                Ok(SalaryGeneration::Created(record))
            }
            Err(StoreError::Duplicate) => {
                // a concurrent generation committed first
                let existing = self
                    .salaries
                    .find_salary_for_month(user.id, month)
                    .await?
                    .ok_or(StoreError::Duplicate)?;
                Ok(SalaryGeneration::AlreadyExists(existing))
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn load(&self, salary_id: u64) -> PolicyResult<SalaryRecord> {
        self.salaries
            .find_salary(salary_id)
            .await?
            .ok_or(PolicyError::RecordNotFound)
    }

    async fn store(&self, record: &SalaryRecord) -> PolicyResult<()> {
        if self.salaries.update_salary(record).await? {
            Ok(())
        } else {
            Err(PolicyError::RecordNotFound)
        }
    }
}

fn month_key(month: u32, year: i32) -> PolicyResult<MonthKey> {
    MonthKey::new(month, year).ok_or_else(|| {
        PolicyError::Validation(format!(
            "invalid month {month}/{year}: month must be 1-12 and year 1970-9999"
        ))
    })
}
