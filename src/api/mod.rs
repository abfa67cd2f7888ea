pub mod attendance;
pub mod company;
pub mod dashboard;
pub mod employee;
pub mod leave_request;
pub mod notification;
pub mod payroll;
pub mod salary;
