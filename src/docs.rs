use crate::api::salary::{GenerateBatch, GenerateSalary};
use crate::model::attendance::{AttendanceLog, AttendanceRecord, AttendanceStatus};
use crate::model::salary::{SalaryListItem, SalaryRecord, SalaryStatus};
use crate::model::settings::{CompanySettings, LeavePolicy, WorkingHours};
use crate::policy::payroll::{AdjustSalary, BatchFailure, BatchSummary};
use crate::policy::report::AttendanceSummary;
use crate::policy::settings::{UpdateSettings, UpdateWorkingHours};
use utoipa::Modify;
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{OpenApi, openapi};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "WorkStream Attendance & Payroll API",
        version = "1.0.0",
        description = r#"
## Attendance & Payroll Policy Engine

Turns daily check-in / check-out events into attendance status, worked and
overtime hours, and monthly prorated salary records.

### Key Features
- **Attendance**
  - Check-in with late detection against the configured shift and grace period
  - Check-out with working and overtime hours
  - Daily, monthly, log and summary views
- **Salary**
  - Per-employee and batch monthly generation (never overwrites a month)
  - Manual adjustment and payment
- **Settings**
  - Company working hours, weekend and leave policy

### Security
Every endpoint requires a **JWT Bearer** access token.
Administrative operations are limited to the **admin** and **sub-admin** roles.

---
Built with **Rust**, **Actix Web**, **SQLx**, and **Utoipa**.
"#,
    ),
    paths(
        crate::api::attendance::check_in,
        crate::api::attendance::check_out,
        crate::api::attendance::daily,
        crate::api::attendance::monthly,
        crate::api::attendance::summary,
        crate::api::attendance::logs,

        crate::api::salary::list_salaries,
        crate::api::salary::update_salary,
        crate::api::salary::generate_salary,
        crate::api::salary::generate_batch,
        crate::api::salary::user_salaries,
        crate::api::salary::pay_salary,

        crate::api::settings::get_settings,
        crate::api::settings::update_settings
    ),
    components(
        schemas(
            AttendanceRecord,
            AttendanceLog,
            AttendanceStatus,
            AttendanceSummary,
            SalaryRecord,
            SalaryListItem,
            SalaryStatus,
            GenerateSalary,
            GenerateBatch,
            AdjustSalary,
            BatchSummary,
            BatchFailure,
            CompanySettings,
            WorkingHours,
            LeavePolicy,
            UpdateSettings,
            UpdateWorkingHours
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Attendance", description = "Check-in, check-out and attendance reporting APIs"),
        (name = "Salary", description = "Salary generation and payment APIs"),
        (name = "Settings", description = "Company policy settings APIs"),
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}
