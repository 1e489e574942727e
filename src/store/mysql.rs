use std::str::FromStr;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::{FromRow, MySqlPool};

use crate::error::{StoreError, StoreResult};
use crate::model::attendance::{
    AttendanceFilter, AttendanceKey, AttendanceLog, AttendanceRecord, AttendanceStatus,
    CheckOutUpdate, NewAttendance,
};
use crate::model::role::Role;
use crate::model::salary::{MonthKey, NewSalary, SalaryListItem, SalaryRecord, SalaryStatus};
use crate::model::settings::{CompanySettings, LeavePolicy, WorkingHours};
use crate::model::user::User;
use crate::store::{AttendanceStore, SalaryStore, SettingsStore, UserStore};

const SETTINGS_ID: u8 = 1;

/// sqlx-backed store over the MySQL schema in `migrations/`.
#[derive(Clone)]
pub struct MySqlStore {
    pool: MySqlPool,
}

impl MySqlStore {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }
}

fn decode<T: FromStr>(column: &str, raw: &str) -> StoreResult<T> {
    raw.parse()
        .map_err(|_| StoreError::Corrupt(format!("{column} = {raw:?}")))
}

// Helper enum for typed SQLx binding
enum FilterValue {
    Date(NaiveDate),
    Str(String),
}

// -------------------- settings --------------------

#[derive(FromRow)]
struct SettingsRow {
    company_name: String,
    admin_email: String,
    check_in_time: String,
    check_out_time: String,
    grace_period_minutes: u32,
    weekend_policy: String,
    annual_leave: u32,
    sick_leave: u32,
    casual_leave: u32,
    maternity_leave: u32,
    require_approval: bool,
    notify_staff: bool,
    enable_half_day: bool,
}

impl TryFrom<SettingsRow> for CompanySettings {
    type Error = StoreError;

    fn try_from(row: SettingsRow) -> StoreResult<Self> {
        let weekend_policy: Vec<String> = serde_json::from_str(&row.weekend_policy)
            .map_err(|e| StoreError::Corrupt(format!("weekend_policy: {e}")))?;

        Ok(CompanySettings {
            company_name: row.company_name,
            admin_email: row.admin_email,
            working_hours: WorkingHours {
                check_in: row.check_in_time,
                check_out: row.check_out_time,
                grace_period: row.grace_period_minutes,
            },
            weekend_policy,
            leave_policy: LeavePolicy {
                annual_leave: row.annual_leave,
                sick_leave: row.sick_leave,
                casual_leave: row.casual_leave,
                maternity_leave: row.maternity_leave,
                require_approval: row.require_approval,
                notify_staff: row.notify_staff,
                enable_half_day: row.enable_half_day,
            },
        })
    }
}

#[async_trait]
impl SettingsStore for MySqlStore {
    async fn load_or_seed_settings(&self) -> StoreResult<CompanySettings> {
        // INSERT IGNORE keeps concurrent first reads from racing each other
        sqlx::query("INSERT IGNORE INTO company_settings (id, weekend_policy) VALUES (?, '[]')")
            .bind(SETTINGS_ID)
            .execute(&self.pool)
            .await?;

        let row = sqlx::query_as::<_, SettingsRow>(
            r#"
            SELECT company_name, admin_email, check_in_time, check_out_time,
                   grace_period_minutes, weekend_policy,
                   annual_leave, sick_leave, casual_leave, maternity_leave,
                   require_approval, notify_staff, enable_half_day
            FROM company_settings
            WHERE id = ?
            "#,
        )
        .bind(SETTINGS_ID)
        .fetch_one(&self.pool)
        .await?;

        row.try_into()
    }

    async fn save_settings(&self, settings: &CompanySettings) -> StoreResult<()> {
        let weekend_policy = serde_json::to_string(&settings.weekend_policy)
            .map_err(|e| StoreError::Corrupt(format!("weekend_policy: {e}")))?;
        let leave = &settings.leave_policy;

        sqlx::query(
            r#"
            INSERT INTO company_settings
                (id, company_name, admin_email, check_in_time, check_out_time,
                 grace_period_minutes, weekend_policy,
                 annual_leave, sick_leave, casual_leave, maternity_leave,
                 require_approval, notify_staff, enable_half_day)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            ON DUPLICATE KEY UPDATE
                company_name = VALUES(company_name),
                admin_email = VALUES(admin_email),
                check_in_time = VALUES(check_in_time),
                check_out_time = VALUES(check_out_time),
                grace_period_minutes = VALUES(grace_period_minutes),
                weekend_policy = VALUES(weekend_policy),
                annual_leave = VALUES(annual_leave),
                sick_leave = VALUES(sick_leave),
                casual_leave = VALUES(casual_leave),
                maternity_leave = VALUES(maternity_leave),
                require_approval = VALUES(require_approval),
                notify_staff = VALUES(notify_staff),
                enable_half_day = VALUES(enable_half_day)
            "#,
        )
        .bind(SETTINGS_ID)
        .bind(&settings.company_name)
        .bind(&settings.admin_email)
        .bind(&settings.working_hours.check_in)
        .bind(&settings.working_hours.check_out)
        .bind(settings.working_hours.grace_period)
        .bind(weekend_policy)
        .bind(leave.annual_leave)
        .bind(leave.sick_leave)
        .bind(leave.casual_leave)
        .bind(leave.maternity_leave)
        .bind(leave.require_approval)
        .bind(leave.notify_staff)
        .bind(leave.enable_half_day)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

// -------------------- users --------------------

#[derive(FromRow)]
struct UserRow {
    id: u64,
    name: String,
    email: String,
    designation: Option<String>,
    role: String,
    is_active: bool,
    salary: Option<f64>,
    salary_type: String,
}

impl TryFrom<UserRow> for User {
    type Error = StoreError;

    fn try_from(row: UserRow) -> StoreResult<Self> {
        Ok(User {
            id: row.id,
            name: row.name,
            email: row.email,
            designation: row.designation,
            role: decode("users.role", &row.role)?,
            is_active: row.is_active,
            salary: row.salary,
            salary_type: decode("users.salary_type", &row.salary_type)?,
        })
    }
}

const USER_COLUMNS: &str =
    "id, name, email, designation, role, is_active, salary, salary_type";

#[async_trait]
impl UserStore for MySqlStore {
    async fn find_user(&self, user_id: u64) -> StoreResult<Option<User>> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?");
        sqlx::query_as::<_, UserRow>(&sql)
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?
            .map(User::try_from)
            .transpose()
    }

    async fn list_users_with_role(&self, role: Role) -> StoreResult<Vec<User>> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE role = ? ORDER BY id");
        sqlx::query_as::<_, UserRow>(&sql)
            .bind(role.to_string())
            .fetch_all(&self.pool)
            .await?
            .into_iter()
            .map(User::try_from)
            .collect()
    }

    async fn count_active_users_with_role(&self, role: Role) -> StoreResult<i64> {
        let total = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM users WHERE role = ? AND is_active = TRUE",
        )
        .bind(role.to_string())
        .fetch_one(&self.pool)
        .await?;

        Ok(total)
    }
}

// -------------------- attendance --------------------

#[derive(FromRow)]
struct AttendanceRow {
    id: u64,
    user_id: u64,
    date: NaiveDate,
    check_in: Option<DateTime<Utc>>,
    check_out: Option<DateTime<Utc>>,
    working_hours: f64,
    overtime_hours: f64,
    status: String,
    created_at: DateTime<Utc>,
}

impl TryFrom<AttendanceRow> for AttendanceRecord {
    type Error = StoreError;

    fn try_from(row: AttendanceRow) -> StoreResult<Self> {
        Ok(AttendanceRecord {
            id: row.id,
            user_id: row.user_id,
            date: row.date,
            check_in: row.check_in,
            check_out: row.check_out,
            working_hours: row.working_hours,
            overtime_hours: row.overtime_hours,
            status: decode("attendance.status", &row.status)?,
            created_at: row.created_at,
        })
    }
}

#[derive(FromRow)]
struct AttendanceLogRow {
    #[sqlx(flatten)]
    record: AttendanceRow,
    user_name: Option<String>,
    user_email: Option<String>,
    user_designation: Option<String>,
}

#[derive(FromRow)]
struct AttendanceKeyRow {
    id: u64,
    user_id: u64,
    date: NaiveDate,
    created_at: DateTime<Utc>,
}

const ATTENDANCE_COLUMNS: &str = "a.id, a.user_id, a.date, a.check_in, a.check_out, \
     a.working_hours, a.overtime_hours, a.status, a.created_at";

fn status_placeholders(statuses: &[AttendanceStatus]) -> String {
    vec!["?"; statuses.len()].join(", ")
}

#[async_trait]
impl AttendanceStore for MySqlStore {
    async fn find_attendance(
        &self,
        user_id: u64,
        date: NaiveDate,
    ) -> StoreResult<Option<AttendanceRecord>> {
        let sql = format!(
            "SELECT {ATTENDANCE_COLUMNS} FROM attendance a WHERE a.user_id = ? AND a.date = ? \
             ORDER BY a.created_at, a.id LIMIT 1"
        );
        sqlx::query_as::<_, AttendanceRow>(&sql)
            .bind(user_id)
            .bind(date)
            .fetch_optional(&self.pool)
            .await?
            .map(AttendanceRecord::try_from)
            .transpose()
    }

    async fn insert_attendance(&self, new: NewAttendance) -> StoreResult<AttendanceRecord> {
        let result = sqlx::query(
            r#"
            INSERT INTO attendance (user_id, date, check_in, status, created_at)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(new.user_id)
        .bind(new.date)
        .bind(new.check_in)
        .bind(new.status.to_string())
        .bind(new.created_at)
        .execute(&self.pool)
        .await?;

        Ok(AttendanceRecord {
            id: result.last_insert_id(),
            user_id: new.user_id,
            date: new.date,
            check_in: Some(new.check_in),
            check_out: None,
            working_hours: 0.0,
            overtime_hours: 0.0,
            status: new.status,
            created_at: new.created_at,
        })
    }

    async fn record_check_out(&self, id: u64, update: CheckOutUpdate) -> StoreResult<bool> {
        let result = sqlx::query(
            r#"
            UPDATE attendance
            SET check_out = ?, working_hours = ?, overtime_hours = ?
            WHERE id = ?
            AND check_out IS NULL
            "#,
        )
        .bind(update.check_out)
        .bind(update.working_hours)
        .bind(update.overtime_hours)
        .bind(id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() == 1)
    }

    async fn list_attendance_for_user(
        &self,
        user_id: u64,
        from: NaiveDate,
        to: NaiveDate,
    ) -> StoreResult<Vec<AttendanceRecord>> {
        let sql = format!(
            "SELECT {ATTENDANCE_COLUMNS} FROM attendance a \
             WHERE a.user_id = ? AND a.date BETWEEN ? AND ? ORDER BY a.date"
        );
        sqlx::query_as::<_, AttendanceRow>(&sql)
            .bind(user_id)
            .bind(from)
            .bind(to)
            .fetch_all(&self.pool)
            .await?
            .into_iter()
            .map(AttendanceRecord::try_from)
            .collect()
    }

    async fn count_attendance_with_status(
        &self,
        user_id: u64,
        from: NaiveDate,
        to: NaiveDate,
        statuses: &[AttendanceStatus],
    ) -> StoreResult<i64> {
        if statuses.is_empty() {
            return Ok(0);
        }

        let sql = format!(
            "SELECT COUNT(*) FROM attendance WHERE user_id = ? AND date BETWEEN ? AND ? \
             AND status IN ({})",
            status_placeholders(statuses)
        );
        let mut query = sqlx::query_scalar::<_, i64>(&sql)
            .bind(user_id)
            .bind(from)
            .bind(to);
        for status in statuses {
            query = query.bind(status.to_string());
        }

        Ok(query.fetch_one(&self.pool).await?)
    }

    async fn count_attendance_on(&self, date: NaiveDate, status: AttendanceStatus) -> StoreResult<i64> {
        let total = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM attendance WHERE date = ? AND status = ?",
        )
        .bind(date)
        .bind(status.to_string())
        .fetch_one(&self.pool)
        .await?;

        Ok(total)
    }

    async fn list_attendance_logs(&self, filter: &AttendanceFilter) -> StoreResult<Vec<AttendanceLog>> {
        let mut where_sql = String::from(" WHERE 1=1");
        let mut args: Vec<FilterValue> = Vec::new();

        if let Some(start) = filter.start_date {
            where_sql.push_str(" AND a.date >= ?");
            args.push(FilterValue::Date(start));
        }

        if let (Some(_), Some(end)) = (filter.start_date, filter.end_date) {
            where_sql.push_str(" AND a.date <= ?");
            args.push(FilterValue::Date(end));
        }

        if let Some(status) = filter.status {
            where_sql.push_str(" AND a.status = ?");
            args.push(FilterValue::Str(status.to_string()));
        }

        let sql = format!(
            r#"
            SELECT {ATTENDANCE_COLUMNS},
                   u.name AS user_name, u.email AS user_email, u.designation AS user_designation
            FROM attendance a
            LEFT JOIN users u ON u.id = a.user_id
            {where_sql}
            ORDER BY a.date DESC, a.id DESC
            "#
        );

        let mut query = sqlx::query_as::<_, AttendanceLogRow>(&sql);
        for arg in args {
            query = match arg {
                FilterValue::Date(d) => query.bind(d),
                FilterValue::Str(s) => query.bind(s),
            };
        }

        query
            .fetch_all(&self.pool)
            .await?
            .into_iter()
            .map(|row| -> StoreResult<AttendanceLog> {
                Ok(AttendanceLog {
                    record: row.record.try_into()?,
                    user_name: row.user_name,
                    user_email: row.user_email,
                    user_designation: row.user_designation,
                })
            })
            .collect()
    }

    async fn find_duplicate_attendance(&self) -> StoreResult<Vec<AttendanceKey>> {
        let rows = sqlx::query_as::<_, AttendanceKeyRow>(
            r#"
            SELECT a.id, a.user_id, a.date, a.created_at
            FROM attendance a
            JOIN (
                SELECT user_id, date
                FROM attendance
                GROUP BY user_id, date
                HAVING COUNT(*) > 1
            ) d ON d.user_id = a.user_id AND d.date = a.date
            ORDER BY a.user_id, a.date, a.created_at, a.id
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|r| AttendanceKey {
                id: r.id,
                user_id: r.user_id,
                date: r.date,
                created_at: r.created_at,
            })
            .collect())
    }

    async fn delete_attendance(&self, ids: &[u64]) -> StoreResult<u64> {
        if ids.is_empty() {
            return Ok(0);
        }

        let sql = format!(
            "DELETE FROM attendance WHERE id IN ({})",
            vec!["?"; ids.len()].join(", ")
        );
        let mut query = sqlx::query(&sql);
        for id in ids {
            query = query.bind(*id);
        }

        Ok(query.execute(&self.pool).await?.rows_affected())
    }
}

// -------------------- salaries --------------------

#[derive(FromRow)]
struct SalaryRow {
    id: u64,
    user_id: u64,
    month: String,
    base_salary: f64,
    deductions: f64,
    overtime_credits: f64,
    total_payable: f64,
    status: String,
    paid_date: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
}

impl TryFrom<SalaryRow> for SalaryRecord {
    type Error = StoreError;

    fn try_from(row: SalaryRow) -> StoreResult<Self> {
        Ok(SalaryRecord {
            id: row.id,
            user_id: row.user_id,
            month: row.month,
            base_salary: row.base_salary,
            deductions: row.deductions,
            overtime_credits: row.overtime_credits,
            total_payable: row.total_payable,
            status: decode("salaries.status", &row.status)?,
            paid_date: row.paid_date,
            created_at: row.created_at,
        })
    }
}

#[derive(FromRow)]
struct SalaryListRow {
    id: u64,
    employee_name: Option<String>,
    month: String,
    base_salary: f64,
    deductions: f64,
    total_payable: f64,
    status: String,
}

const SALARY_COLUMNS: &str = "id, user_id, month, base_salary, deductions, overtime_credits, \
     total_payable, status, paid_date, created_at";

#[async_trait]
impl SalaryStore for MySqlStore {
    async fn find_salary(&self, id: u64) -> StoreResult<Option<SalaryRecord>> {
        let sql = format!("SELECT {SALARY_COLUMNS} FROM salaries WHERE id = ?");
        sqlx::query_as::<_, SalaryRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .map(SalaryRecord::try_from)
            .transpose()
    }

    async fn find_salary_for_month(
        &self,
        user_id: u64,
        month: MonthKey,
    ) -> StoreResult<Option<SalaryRecord>> {
        let sql = format!("SELECT {SALARY_COLUMNS} FROM salaries WHERE user_id = ? AND month = ?");
        sqlx::query_as::<_, SalaryRow>(&sql)
            .bind(user_id)
            .bind(month.to_string())
            .fetch_optional(&self.pool)
            .await?
            .map(SalaryRecord::try_from)
            .transpose()
    }

    async fn insert_salary(&self, new: NewSalary) -> StoreResult<SalaryRecord> {
        let month = new.month.to_string();
        let result = sqlx::query(
            r#"
            INSERT INTO salaries
                (user_id, month, base_salary, deductions, total_payable, status, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(new.user_id)
        .bind(&month)
        .bind(new.base_salary)
        .bind(new.deductions)
        .bind(new.total_payable)
        .bind(SalaryStatus::Unpaid.to_string())
        .bind(new.created_at)
        .execute(&self.pool)
        .await?;

        Ok(SalaryRecord {
            id: result.last_insert_id(),
            user_id: new.user_id,
            month,
            base_salary: new.base_salary,
            deductions: new.deductions,
            overtime_credits: 0.0,
            total_payable: new.total_payable,
            status: SalaryStatus::Unpaid,
            paid_date: None,
            created_at: new.created_at,
        })
    }

    async fn update_salary(&self, record: &SalaryRecord) -> StoreResult<bool> {
        let result = sqlx::query(
            r#"
            UPDATE salaries
            SET base_salary = ?, deductions = ?, total_payable = ?, status = ?, paid_date = ?
            WHERE id = ?
            "#,
        )
        .bind(record.base_salary)
        .bind(record.deductions)
        .bind(record.total_payable)
        .bind(record.status.to_string())
        .bind(record.paid_date)
        .bind(record.id)
        .execute(&self.pool)
        .await?;

        // the client negotiates FOUND_ROWS, so unchanged rows still count as matched
        Ok(result.rows_affected() == 1)
    }

    async fn list_salaries_for_user(&self, user_id: u64) -> StoreResult<Vec<SalaryRecord>> {
        let sql = format!("SELECT {SALARY_COLUMNS} FROM salaries WHERE user_id = ? ORDER BY created_at DESC");
        sqlx::query_as::<_, SalaryRow>(&sql)
            .bind(user_id)
            .fetch_all(&self.pool)
            .await?
            .into_iter()
            .map(SalaryRecord::try_from)
            .collect()
    }

    async fn list_salaries(&self) -> StoreResult<Vec<SalaryListItem>> {
        let rows = sqlx::query_as::<_, SalaryListRow>(
            r#"
            SELECT s.id, u.name AS employee_name, s.month, s.base_salary, s.deductions,
                   s.total_payable, s.status
            FROM salaries s
            LEFT JOIN users u ON u.id = s.user_id
            ORDER BY s.created_at DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter()
            .map(|row| -> StoreResult<SalaryListItem> {
                Ok(SalaryListItem {
                    id: row.id,
                    employee_name: row.employee_name.unwrap_or_else(|| "Unknown".to_string()),
                    month: row.month,
                    base_salary: row.base_salary,
                    deductions: row.deductions,
                    net_pay: row.total_payable,
                    status: decode::<SalaryStatus>("salaries.status", &row.status)?,
                })
            })
            .collect()
    }
}
