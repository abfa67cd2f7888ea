pub mod attendance;
pub mod company;
pub mod department;
pub mod employee;
pub mod leave_balance;
pub mod leave_request;
pub mod notification;
pub mod payroll;
pub mod role;
pub mod salary_info;
