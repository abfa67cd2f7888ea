use crate::api::attendance::{AttendanceDay, AttendanceListResponse, AttendanceQuery};
use crate::api::company::UpdatePolicy;
use crate::api::dashboard::{AttendanceToday, DashboardSummary, Headcount};
use crate::api::employee::{
    CreateDepartment, CreateEmployee, EmployeeListResponse, EmployeeQuery, UpdateEmployee,
};
use crate::api::leave_request::{
    AllocateBalance, BalanceView, CreateLeave, LeaveFilter, LeaveListResponse,
};
use crate::api::notification::{Announcement, NotificationListResponse, NotificationQuery};
use crate::api::payroll::{CreatePayroll, PaginatedPayrollResponse, PayrollQuery, PeriodQuery};
use crate::api::salary::AssignSalary;
use crate::model::attendance::AttendanceStatus;
use crate::model::company::Company;
use crate::model::department::Department;
use crate::model::employee::Employee;
use crate::model::leave_request::{LeaveRequest, LeaveStatus, LeaveType};
use crate::model::notification::Notification;
use crate::model::payroll::{PayrollRecord, PayrollStatus};
use crate::model::salary_info::SalaryInfo;
use crate::salary::{
    CompanySalaryStats, DepartmentSummary, PayrollPeriodSummary, SalarySlip, SlipDeductions,
    SlipEarnings,
};
use utoipa::Modify;
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{OpenApi, openapi};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "PeopleDesk API",
        version = "1.0.0",
        description = r#"
## PeopleDesk

This API powers **PeopleDesk**, an HR backend for a single company: employee
records, salary structures, payroll runs, attendance and leave.

### 🔹 Key Features
- **Employee Management**
  - Create, update, list, and view employee profiles and departments
- **Salary & Payroll**
  - Assign a monthly wage and derive the full component breakdown
  - Create payroll records per pay period and process them
- **Attendance Management**
  - Daily check-in and check-out tracking with a configurable policy
- **Leave Management**
  - Apply for leave, approve/reject requests, and track per-type balances
- **Notifications & Dashboard**
  - Company announcements, per-employee notifications and an HR overview

### 🔐 Security
Most endpoints are protected using **JWT Bearer authentication**.
Only authorized roles such as **Admin** or **HR** can access sensitive operations.

### 📦 Response Format
- JSON-based RESTful responses
- Pagination supported for list endpoints

---
Built with **Rust**, **Actix Web**, **SQLx**, and **Utoipa**.
"#,
    ),
    modifiers(&SecurityAddon),
    paths(
        crate::api::employee::create_employee,
        crate::api::employee::get_employee,
        crate::api::employee::list_employees,
        crate::api::employee::update_employee,
        crate::api::employee::delete_employee,
        crate::api::employee::create_department,
        crate::api::employee::list_departments,

        crate::api::salary::assign_salary,
        crate::api::salary::get_salary,
        crate::api::salary::get_salary_slip,
        crate::api::salary::salary_stats,
        crate::api::salary::department_stats,

        crate::api::payroll::create_payroll,
        crate::api::payroll::process_payroll,
        crate::api::payroll::payroll_summary,
        crate::api::payroll::get_payroll,
        crate::api::payroll::list_payrolls,

        crate::api::attendance::check_in,
        crate::api::attendance::check_out,
        crate::api::attendance::today_status,
        crate::api::attendance::list_attendance,

        crate::api::leave_request::leave_list,
        crate::api::leave_request::get_leave,
        crate::api::leave_request::create_leave,
        crate::api::leave_request::approve_leave,
        crate::api::leave_request::reject_leave,
        crate::api::leave_request::my_balances,
        crate::api::leave_request::employee_balances,
        crate::api::leave_request::allocate_balance,

        crate::api::notification::announce,
        crate::api::notification::my_notifications,
        crate::api::notification::mark_read,

        crate::api::company::get_policy,
        crate::api::company::update_policy,

        crate::api::dashboard::dashboard_summary
    ),
    components(
        schemas(
            CreateEmployee,
            UpdateEmployee,
            EmployeeQuery,
            Employee,
            EmployeeListResponse,
            CreateDepartment,
            Department,

            AssignSalary,
            SalaryInfo,
            SalarySlip,
            SlipEarnings,
            SlipDeductions,
            CompanySalaryStats,
            DepartmentSummary,

            CreatePayroll,
            PayrollQuery,
            PeriodQuery,
            PayrollRecord,
            PayrollStatus,
            PaginatedPayrollResponse,
            PayrollPeriodSummary,

            AttendanceQuery,
            AttendanceDay,
            AttendanceListResponse,
            AttendanceStatus,

            CreateLeave,
            LeaveFilter,
            LeaveRequest,
            LeaveType,
            LeaveStatus,
            LeaveListResponse,
            BalanceView,
            AllocateBalance,

            Announcement,
            NotificationQuery,
            Notification,
            NotificationListResponse,

            Company,
            UpdatePolicy,

            DashboardSummary,
            Headcount,
            AttendanceToday
        )
    ),
    tags(
        (name = "Employee", description = "Employee and department management APIs"),
        (name = "Salary", description = "Salary structure APIs"),
        (name = "Payroll", description = "Payroll run APIs"),
        (name = "Attendance", description = "Attendance tracking APIs"),
        (name = "Leave", description = "Leave management APIs"),
        (name = "Notification", description = "Notification APIs"),
        (name = "Company", description = "Company policy APIs"),
        (name = "Dashboard", description = "HR dashboard APIs"),
    )
)]
pub struct ApiDoc;

/// Registers the bearer scheme the `security(...)` clauses refer to.
pub struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
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
}
