use crate::{
    api::{attendance, company, dashboard, employee, leave_request, notification, payroll, salary},
    auth::{handlers, middleware::auth_middleware},
    config::Config,
};
use actix_governor::{
    Governor, GovernorConfigBuilder, PeerIpKeyExtractor, governor::middleware::NoOpMiddleware,
};
use actix_web::{middleware::from_fn, web};
use std::sync::Arc;

pub fn configure(cfg: &mut web::ServiceConfig, config: Config) {
    // Helper to build per-route limiter
    fn build_limiter(requests_per_min: u32) -> Governor<PeerIpKeyExtractor, NoOpMiddleware> {
        let per_ms = if requests_per_min == 0 {
            1
        } else {
            60_000 / requests_per_min as u64
        };
        let cfg = GovernorConfigBuilder::default()
            .per_millisecond(per_ms)
            .burst_size(requests_per_min)
            .key_extractor(PeerIpKeyExtractor)
            .finish()
            .unwrap();
        Governor::new(&cfg)
    }

    let login_limiter = Arc::new(build_limiter(config.rate_login_per_min));
    let refresh_limiter = Arc::new(build_limiter(config.rate_refresh_per_min));
    let protected_limiter = Arc::new(build_limiter(config.rate_protected_per_min));

    // Public routes
    cfg.service(
        web::scope("/auth")
            .service(
                web::resource("/login")
                    .wrap(login_limiter.clone())
                    .route(web::post().to(handlers::login)),
            )
            .service(
                web::resource("/refresh")
                    .wrap(refresh_limiter.clone())
                    .route(web::post().to(handlers::refresh_token)),
            )
            .service(
                web::resource("/logout")
                    .wrap(login_limiter.clone())
                    .route(web::post().to(handlers::logout)),
            ),
    );

    // Protected routes
    cfg.service(
        web::scope(&config.api_prefix)
            .wrap(from_fn(auth_middleware))
             // authentication
            .wrap(protected_limiter) // rate limiting
            .service(handlers::me)
            .service(
                web::scope("/employees")
                    // /employees
                    .service(
                        web::resource("")
                            .route(web::post().to(employee::create_employee))
                            .route(web::get().to(employee::list_employees)),
                    )
                    // /employees/{id}
                    .service(
                        web::resource("/{id}")
                            .route(web::put().to(employee::update_employee))
                            .route(web::get().to(employee::get_employee))
                            .route(web::delete().to(employee::delete_employee)),
                    )
                    // /employees/{id}/account
                    .service(
                        web::resource("/{id}/account")
                            .route(web::post().to(handlers::provision_account)),
                    ),
            )
            .service(
                web::scope("/departments").service(
                    web::resource("")
                        .route(web::post().to(employee::create_department))
                        .route(web::get().to(employee::list_departments)),
                ),
            )
            .service(
                web::scope("/salary")
                    // literal segments first so "stats" never hits the id matcher
                    .service(
                        web::resource("/stats/summary")
                            .route(web::get().to(salary::salary_stats)),
                    )
                    .service(
                        web::resource("/stats/departments")
                            .route(web::get().to(salary::department_stats)),
                    )
                    // /salary/{employee_id}
                    .service(
                        web::resource("/{employee_id}")
                            .route(web::put().to(salary::assign_salary))
                            .route(web::get().to(salary::get_salary)),
                    )
                    // /salary/{employee_id}/slip
                    .service(
                        web::resource("/{employee_id}/slip")
                            .route(web::get().to(salary::get_salary_slip)),
                    ),
            )
            .service(
                web::scope("/payroll")
                    // /payroll
                    .service(
                        web::resource("")
                            .route(web::post().to(payroll::create_payroll))
                            .route(web::get().to(payroll::list_payrolls)),
                    )
                    // /payroll/summary
                    .service(
                        web::resource("/summary").route(web::get().to(payroll::payroll_summary)),
                    )
                    // /payroll/{id}
                    .service(web::resource("/{id}").route(web::get().to(payroll::get_payroll)))
                    // /payroll/{id}/process
                    .service(
                        web::resource("/{id}/process")
                            .route(web::put().to(payroll::process_payroll)),
                    ),
            )
            .service(
                web::scope("/attendance")
                    // /attendance/check-in
                    .service(
                        web::resource("/check-in").route(web::post().to(attendance::check_in)),
                    )
                    // /attendance/check-out
                    .service(
                        web::resource("/check-out").route(web::put().to(attendance::check_out)),
                    )
                    // /attendance/today
                    .service(
                        web::resource("/today").route(web::get().to(attendance::today_status)),
                    )
                    // /attendance
                    .service(
                        web::resource("").route(web::get().to(attendance::list_attendance)),
                    ),
            )
            .service(
                web::scope("/leave")
                    // /leave
                    .service(
                        web::resource("")
                            .route(web::get().to(leave_request::leave_list))
                            .route(web::post().to(leave_request::create_leave)),
                    )
                    // /leave/balance
                    .service(
                        web::resource("/balance")
                            .route(web::get().to(leave_request::my_balances)),
                    )
                    // /leave/balance/{employee_id}
                    .service(
                        web::resource("/balance/{employee_id}")
                            .route(web::get().to(leave_request::employee_balances))
                            .route(web::put().to(leave_request::allocate_balance)),
                    )
                    // /leave/{id}
                    .service(web::resource("/{id}").route(web::get().to(leave_request::get_leave)))
                    // /leave/{id}/approve
                    .service(
                        web::resource("/{id}/approve")
                            .route(web::put().to(leave_request::approve_leave)),
                    )
                    // /leave/{id}/reject
                    .service(
                        web::resource("/{id}/reject")
                            .route(web::put().to(leave_request::reject_leave)),
                    ),
            )
            .service(
                web::scope("/notifications")
                    // /notifications/announce
                    .service(
                        web::resource("/announce")
                            .route(web::post().to(notification::announce)),
                    )
                    // /notifications
                    .service(
                        web::resource("").route(web::get().to(notification::my_notifications)),
                    )
                    // /notifications/{id}/read
                    .service(
                        web::resource("/{id}/read").route(web::put().to(notification::mark_read)),
                    ),
            )
            .service(
                web::scope("/company").service(
                    web::resource("/policy")
                        .route(web::get().to(company::get_policy))
                        .route(web::put().to(company::update_policy)),
                ),
            )
            .service(
                web::scope("/dashboard").service(
                    web::resource("/summary").route(web::get().to(dashboard::dashboard_summary)),
                ),
            ),
    );
}

// LOGIN
//  ├─ access_token (15 min)
//  └─ refresh_token (7 days)

// API REQUEST
//  └─ Authorization: Bearer access_token

// ACCESS EXPIRED
//  └─ POST /refresh with refresh_token
//       └─ returns new access_token
