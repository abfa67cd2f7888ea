use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Allocated and consumed paid-leave days, one row per employee and leave
/// type.
#[derive(Debug, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct LeaveBalance {
    #[schema(example = 1)]
    pub id: u64,
    #[schema(example = 1001)]
    pub employee_id: u64,
    #[schema(example = "annual")]
    pub leave_type: String,
    #[schema(example = 20)]
    pub allocated_days: u32,
    #[schema(example = 5)]
    pub used_days: u32,
}

impl LeaveBalance {
    pub fn remaining_days(&self) -> u32 {
        self.allocated_days.saturating_sub(self.used_days)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_remaining_days_saturates() {
        let balance = LeaveBalance {
            id: 1,
            employee_id: 1001,
            leave_type: "annual".to_string(),
            allocated_days: 20,
            used_days: 25,
        };
        assert_eq!(balance.remaining_days(), 0);

        let balance = LeaveBalance {
            used_days: 5,
            ..balance
        };
        assert_eq!(balance.remaining_days(), 15);
    }
}
