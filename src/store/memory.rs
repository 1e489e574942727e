//! In-process store used by the test suite. Enforces the same uniqueness
//! rules as the MySQL schema.

use std::collections::BTreeMap;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::error::{StoreError, StoreResult};
use crate::model::attendance::{
    AttendanceFilter, AttendanceKey, AttendanceLog, AttendanceRecord, AttendanceStatus,
    CheckOutUpdate, NewAttendance,
};
use crate::model::role::Role;
use crate::model::salary::{MonthKey, NewSalary, SalaryListItem, SalaryRecord, SalaryStatus};
use crate::model::settings::CompanySettings;
use crate::model::user::{SalaryBasis, User};
use crate::store::{AttendanceStore, SalaryStore, SettingsStore, UserStore};

#[derive(Default)]
struct Inner {
    settings: Option<CompanySettings>,
    settings_loads: usize,
    users: BTreeMap<u64, User>,
    attendance: Vec<AttendanceRecord>,
    salaries: Vec<SalaryRecord>,
    next_id: u64,
}

impl Inner {
    fn next_id(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }
}

#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_user(&self, user: User) {
        self.inner.lock().unwrap().users.insert(user.id, user);
    }

    /// Inserts an employee with a monthly salary.
    pub fn add_employee(&self, id: u64, name: &str, salary: Option<f64>) {
        self.add_user(User {
            id,
            name: name.to_string(),
            email: format!("{}@workstream.test", name.to_lowercase().replace(' ', ".")),
            designation: Some("Engineer".to_string()),
            role: Role::Employee,
            is_active: true,
            salary,
            salary_type: SalaryBasis::Monthly,
        });
    }

    /// Bypasses the `(user, date)` constraint, as legacy data might.
    pub fn insert_attendance_unchecked(&self, mut record: AttendanceRecord) -> u64 {
        let mut inner = self.inner.lock().unwrap();
        record.id = inner.next_id();
        let id = record.id;
        inner.attendance.push(record);
        id
    }

    pub fn attendance(&self) -> Vec<AttendanceRecord> {
        self.inner.lock().unwrap().attendance.clone()
    }

    pub fn salaries(&self) -> Vec<SalaryRecord> {
        self.inner.lock().unwrap().salaries.clone()
    }

    pub fn settings_loads(&self) -> usize {
        self.inner.lock().unwrap().settings_loads
    }
}

#[async_trait]
impl SettingsStore for MemoryStore {
    async fn load_or_seed_settings(&self) -> StoreResult<CompanySettings> {
        let mut inner = self.inner.lock().unwrap();
        inner.settings_loads += 1;
        Ok(inner.settings.get_or_insert_with(CompanySettings::default).clone())
    }

    async fn save_settings(&self, settings: &CompanySettings) -> StoreResult<()> {
        self.inner.lock().unwrap().settings = Some(settings.clone());
        Ok(())
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn find_user(&self, user_id: u64) -> StoreResult<Option<User>> {
        Ok(self.inner.lock().unwrap().users.get(&user_id).cloned())
    }

    async fn list_users_with_role(&self, role: Role) -> StoreResult<Vec<User>> {
        let inner = self.inner.lock().unwrap();
        Ok(inner.users.values().filter(|u| u.role == role).cloned().collect())
    }

    async fn count_active_users_with_role(&self, role: Role) -> StoreResult<i64> {
        let inner = self.inner.lock().unwrap();
        Ok(inner
            .users
            .values()
            .filter(|u| u.role == role && u.is_active)
            .count() as i64)
    }
}

#[async_trait]
impl AttendanceStore for MemoryStore {
    async fn find_attendance(
        &self,
        user_id: u64,
        date: NaiveDate,
    ) -> StoreResult<Option<AttendanceRecord>> {
        let inner = self.inner.lock().unwrap();
        Ok(inner
            .attendance
            .iter()
            .filter(|a| a.user_id == user_id && a.date == date)
            .min_by_key(|a| (a.created_at, a.id))
            .cloned())
    }

    async fn insert_attendance(&self, new: NewAttendance) -> StoreResult<AttendanceRecord> {
        let mut inner = self.inner.lock().unwrap();
        if inner
            .attendance
            .iter()
            .any(|a| a.user_id == new.user_id && a.date == new.date)
        {
            return Err(StoreError::Duplicate);
        }

        let record = AttendanceRecord {
            id: inner.next_id(),
            user_id: new.user_id,
            date: new.date,
            check_in: Some(new.check_in),
            check_out: None,
            working_hours: 0.0,
            overtime_hours: 0.0,
            status: new.status,
            created_at: new.created_at,
        };
        inner.attendance.push(record.clone());
        Ok(record)
    }

    async fn record_check_out(&self, id: u64, update: CheckOutUpdate) -> StoreResult<bool> {
        let mut inner = self.inner.lock().unwrap();
        match inner
            .attendance
            .iter_mut()
            .find(|a| a.id == id && a.check_out.is_none())
        {
            Some(record) => {
                record.check_out = Some(update.check_out);
                record.working_hours = update.working_hours;
                record.overtime_hours = update.overtime_hours;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn list_attendance_for_user(
        &self,
        user_id: u64,
        from: NaiveDate,
        to: NaiveDate,
    ) -> StoreResult<Vec<AttendanceRecord>> {
        let inner = self.inner.lock().unwrap();
        let mut rows: Vec<_> = inner
            .attendance
            .iter()
            .filter(|a| a.user_id == user_id && a.date >= from && a.date <= to)
            .cloned()
            .collect();
        rows.sort_by_key(|a| a.date);
        Ok(rows)
    }

    async fn count_attendance_with_status(
        &self,
        user_id: u64,
        from: NaiveDate,
        to: NaiveDate,
        statuses: &[AttendanceStatus],
    ) -> StoreResult<i64> {
        let inner = self.inner.lock().unwrap();
        Ok(inner
            .attendance
            .iter()
            .filter(|a| {
                a.user_id == user_id && a.date >= from && a.date <= to && statuses.contains(&a.status)
            })
            .count() as i64)
    }

    async fn count_attendance_on(&self, date: NaiveDate, status: AttendanceStatus) -> StoreResult<i64> {
        let inner = self.inner.lock().unwrap();
        Ok(inner
            .attendance
            .iter()
            .filter(|a| a.date == date && a.status == status)
            .count() as i64)
    }

    async fn list_attendance_logs(&self, filter: &AttendanceFilter) -> StoreResult<Vec<AttendanceLog>> {
        let inner = self.inner.lock().unwrap();
        let mut rows: Vec<AttendanceLog> = inner
            .attendance
            .iter()
            .filter(|a| match (filter.start_date, filter.end_date) {
                (Some(start), Some(end)) => a.date >= start && a.date <= end,
                (Some(start), None) => a.date >= start,
                _ => true,
            })
            .filter(|a| filter.status.is_none_or(|s| a.status == s))
            .map(|a| {
                let user = inner.users.get(&a.user_id);
                AttendanceLog {
                    record: a.clone(),
                    user_name: user.map(|u| u.name.clone()),
                    user_email: user.map(|u| u.email.clone()),
                    user_designation: user.and_then(|u| u.designation.clone()),
                }
            })
            .collect();
        rows.sort_by(|a, b| {
            b.record
                .date
                .cmp(&a.record.date)
                .then(b.record.id.cmp(&a.record.id))
        });
        Ok(rows)
    }

    async fn find_duplicate_attendance(&self) -> StoreResult<Vec<AttendanceKey>> {
        let inner = self.inner.lock().unwrap();
        let mut groups: BTreeMap<(u64, NaiveDate), Vec<AttendanceKey>> = BTreeMap::new();
        for a in &inner.attendance {
            groups.entry((a.user_id, a.date)).or_default().push(AttendanceKey {
                id: a.id,
                user_id: a.user_id,
                date: a.date,
                created_at: a.created_at,
            });
        }

        Ok(groups
            .into_values()
            .filter(|g| g.len() > 1)
            .flat_map(|mut g| {
                g.sort_by_key(|k| (k.created_at, k.id));
                g
            })
            .collect())
    }

    async fn delete_attendance(&self, ids: &[u64]) -> StoreResult<u64> {
        let mut inner = self.inner.lock().unwrap();
        let before = inner.attendance.len();
        inner.attendance.retain(|a| !ids.contains(&a.id));
        Ok((before - inner.attendance.len()) as u64)
    }
}

#[async_trait]
impl SalaryStore for MemoryStore {
    async fn find_salary(&self, id: u64) -> StoreResult<Option<SalaryRecord>> {
        let inner = self.inner.lock().unwrap();
        Ok(inner.salaries.iter().find(|s| s.id == id).cloned())
    }

    async fn find_salary_for_month(
        &self,
        user_id: u64,
        month: MonthKey,
    ) -> StoreResult<Option<SalaryRecord>> {
        let month = month.to_string();
        let inner = self.inner.lock().unwrap();
        Ok(inner
            .salaries
            .iter()
            .find(|s| s.user_id == user_id && s.month == month)
            .cloned())
    }

    async fn insert_salary(&self, new: NewSalary) -> StoreResult<SalaryRecord> {
        let month = new.month.to_string();
        let mut inner = self.inner.lock().unwrap();
        if inner
            .salaries
            .iter()
            .any(|s| s.user_id == new.user_id && s.month == month)
        {
            return Err(StoreError::Duplicate);
        }

        let record = SalaryRecord {
            id: inner.next_id(),
            user_id: new.user_id,
            month,
            base_salary: new.base_salary,
            deductions: new.deductions,
            overtime_credits: 0.0,
            total_payable: new.total_payable,
            status: SalaryStatus::Unpaid,
            paid_date: None,
            created_at: new.created_at,
        };
        inner.salaries.push(record.clone());
        Ok(record)
    }

    async fn update_salary(&self, record: &SalaryRecord) -> StoreResult<bool> {
        let mut inner = self.inner.lock().unwrap();
        match inner.salaries.iter_mut().find(|s| s.id == record.id) {
            Some(stored) => {
                *stored = record.clone();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn list_salaries_for_user(&self, user_id: u64) -> StoreResult<Vec<SalaryRecord>> {
        let inner = self.inner.lock().unwrap();
        let mut rows: Vec<SalaryRecord> = inner
            .salaries
            .iter()
            .filter(|s| s.user_id == user_id)
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(rows)
    }

    async fn list_salaries(&self) -> StoreResult<Vec<SalaryListItem>> {
        let inner = self.inner.lock().unwrap();
        Ok(inner
            .salaries
            .iter()
            .map(|s| SalaryListItem {
                id: s.id,
                employee_name: inner
                    .users
                    .get(&s.user_id)
                    .map(|u| u.name.clone())
                    .unwrap_or_else(|| "Unknown".to_string()),
                month: s.month.clone(),
                base_salary: s.base_salary,
                deductions: s.deductions,
                net_pay: s.total_payable,
                status: s.status,
            })
            .collect())
    }
}
