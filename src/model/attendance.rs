use chrono::{Duration, NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};
use utoipa::ToSchema;

use super::company::AttendancePolicy;

#[derive(Debug, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct Attendance {
    #[schema(example = 1)]
    pub id: u64,
    #[schema(example = 1001)]
    pub employee_id: u64,
    #[schema(example = "2026-01-05", value_type = String, format = "date")]
    pub date: NaiveDate,
    #[schema(example = "09:02:11", value_type = String, format = "time", nullable = true)]
    pub check_in: Option<NaiveTime>,
    #[schema(example = "18:01:45", value_type = String, format = "time", nullable = true)]
    pub check_out: Option<NaiveTime>,
}

/// Day status derived from the raw timestamps and company policy.
///
/// Never persisted; the record is re-evaluated from its two timestamps
/// plus the policy every time it is displayed.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, AsRefStr, Display, EnumString, ToSchema,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum AttendanceStatus {
    NotCheckedIn,
    CheckedIn,
    CheckedOut,
    HalfDay,
    OnLeave,
    Absent,
}

/// Result of evaluating one attendance day.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, ToSchema)]
pub struct DerivedAttendance {
    pub status: AttendanceStatus,
    /// Check-in after work start plus the grace period.
    pub late: bool,
    /// Minutes between check-in and check-out, zero while still
    /// checked in.
    pub worked_minutes: i64,
}

/// Evaluates the status for one day.
///
/// Approved leave wins over everything. A past day without a check-in is
/// absent; the current day without one is simply not checked in yet. With
/// both timestamps present the full-day threshold decides between a full
/// day and a half day.
pub fn derive_status(
    date: NaiveDate,
    today: NaiveDate,
    check_in: Option<NaiveTime>,
    check_out: Option<NaiveTime>,
    on_leave: bool,
    policy: &AttendancePolicy,
) -> DerivedAttendance {
    if on_leave {
        return DerivedAttendance {
            status: AttendanceStatus::OnLeave,
            late: false,
            worked_minutes: 0,
        };
    }

    let Some(check_in) = check_in else {
        let status = if date < today {
            AttendanceStatus::Absent
        } else {
            AttendanceStatus::NotCheckedIn
        };
        return DerivedAttendance {
            status,
            late: false,
            worked_minutes: 0,
        };
    };

    let late = is_late(check_in, policy);

    match check_out {
        None => DerivedAttendance {
            status: AttendanceStatus::CheckedIn,
            late,
            worked_minutes: 0,
        },
        Some(check_out) => {
            let worked_minutes = (check_out - check_in).num_minutes().max(0);
            let status = if worked_minutes >= i64::from(policy.full_day_minutes) {
                AttendanceStatus::CheckedOut
            } else {
                AttendanceStatus::HalfDay
            };
            DerivedAttendance {
                status,
                late,
                worked_minutes,
            }
        }
    }
}

/// Check-in strictly after work start plus grace counts as late.
pub fn is_late(check_in: NaiveTime, policy: &AttendancePolicy) -> bool {
    let latest_on_time = policy.work_start + Duration::minutes(i64::from(policy.grace_minutes));
    check_in > latest_on_time
}

/// Checkout gate: the policy's minimum tenure must have elapsed since
/// check-in.
pub fn can_check_out(check_in: NaiveTime, now: NaiveTime, policy: &AttendancePolicy) -> bool {
    (now - check_in).num_minutes() >= i64::from(policy.checkout_after_minutes)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn policy() -> AttendancePolicy {
        AttendancePolicy {
            work_start: NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
            grace_minutes: 15,
            full_day_minutes: 480,
            checkout_after_minutes: 240,
        }
    }

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 1, d).unwrap()
    }

    fn time(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    #[test]
    fn test_leave_wins_over_timestamps() {
        let d = derive_status(date(5), date(5), Some(time(9, 0)), None, true, &policy());
        assert_eq!(d.status, AttendanceStatus::OnLeave);
        assert!(!d.late);
    }

    #[test]
    fn test_today_without_check_in() {
        let d = derive_status(date(5), date(5), None, None, false, &policy());
        assert_eq!(d.status, AttendanceStatus::NotCheckedIn);
    }

    #[test]
    fn test_past_day_without_check_in_is_absent() {
        let d = derive_status(date(4), date(5), None, None, false, &policy());
        assert_eq!(d.status, AttendanceStatus::Absent);
    }

    #[test]
    fn test_checked_in_without_checkout() {
        let d = derive_status(date(5), date(5), Some(time(9, 10)), None, false, &policy());
        assert_eq!(d.status, AttendanceStatus::CheckedIn);
        assert!(!d.late);
        assert_eq!(d.worked_minutes, 0);
    }

    #[test]
    fn test_full_day_checkout() {
        let d = derive_status(
            date(5),
            date(5),
            Some(time(9, 0)),
            Some(time(17, 0)),
            false,
            &policy(),
        );
        assert_eq!(d.status, AttendanceStatus::CheckedOut);
        assert_eq!(d.worked_minutes, 480);
    }

    #[test]
    fn test_short_day_is_half_day() {
        let d = derive_status(
            date(5),
            date(5),
            Some(time(9, 0)),
            Some(time(13, 0)),
            false,
            &policy(),
        );
        assert_eq!(d.status, AttendanceStatus::HalfDay);
        assert_eq!(d.worked_minutes, 240);
    }

    /// Exactly at start plus grace is still on time; one minute past is
    /// late.
    #[test]
    fn test_grace_period_boundary() {
        assert!(!is_late(time(9, 15), &policy()));
        assert!(is_late(time(9, 16), &policy()));
        assert!(!is_late(time(8, 59), &policy()));
    }

    #[test]
    fn test_late_flag_carried_through_derivation() {
        let d = derive_status(
            date(5),
            date(5),
            Some(time(9, 30)),
            Some(time(18, 0)),
            false,
            &policy(),
        );
        assert!(d.late);
        assert_eq!(d.status, AttendanceStatus::CheckedOut);
    }

    /// Gate opens exactly when the minimum tenure has elapsed.
    #[test]
    fn test_checkout_gate_boundary() {
        let p = policy();
        assert!(!can_check_out(time(9, 0), time(12, 59), &p));
        assert!(can_check_out(time(9, 0), time(13, 0), &p));
        assert!(can_check_out(time(9, 0), time(18, 0), &p));
    }

    #[test]
    fn test_checkout_gate_rejects_clock_skew() {
        let p = policy();
        assert!(!can_check_out(time(14, 0), time(9, 0), &p));
    }

    #[test]
    fn test_status_serializes_kebab_case() {
        assert_eq!(AttendanceStatus::NotCheckedIn.as_ref(), "not-checked-in");
        assert_eq!(AttendanceStatus::HalfDay.to_string(), "half-day");
        assert_eq!(
            "on-leave".parse::<AttendanceStatus>().unwrap(),
            AttendanceStatus::OnLeave
        );
    }
}
