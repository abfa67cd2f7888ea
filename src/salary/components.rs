//! Salary component derivation.
//!
//! Given an employee's agreed monthly wage, derives the full breakdown of
//! earning components (basic, HRA, standard allowance, performance bonus,
//! LTA, fixed allowance) and the statutory deduction components (provident
//! fund, professional tax). The fixed allowance is the residual that
//! balances the earning components against the wage, clamped at zero so no
//! component can ever go negative.

use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::error::{SalaryError, SalaryResult};

/// Basic salary as a share of the monthly wage.
pub const BASIC_RATE: Decimal = dec!(0.50);

/// House rent allowance as a share of basic salary.
pub const HRA_RATE: Decimal = dec!(0.50);

/// Flat standard allowance paid regardless of wage.
pub const STANDARD_ALLOWANCE: Decimal = dec!(4167);

/// Performance bonus as a share of the monthly wage (one month spread
/// across the year).
pub const PERFORMANCE_BONUS_RATE: Decimal = dec!(0.0833);

/// Leave travel allowance as a share of the monthly wage.
pub const LTA_RATE: Decimal = dec!(0.0833);

/// Provident fund contribution as a share of basic salary, for both the
/// employee and the employer portion.
pub const PF_RATE: Decimal = dec!(0.12);

/// Statutory monthly ceiling on each provident fund portion.
pub const PF_MONTHLY_CAP: Decimal = dec!(1800);

/// Flat monthly professional tax deduction.
pub const PROFESSIONAL_TAX: Decimal = dec!(200);

const MONTHS_PER_YEAR: Decimal = dec!(12);

/// The full derived breakdown for one monthly wage.
///
/// Recomputed whenever the wage changes; persisted rows are snapshots of
/// this struct plus the input wage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct SalaryComponents {
    /// The wage the breakdown was derived from, normalized to cents.
    #[schema(value_type = String, example = "50000")]
    pub monthly_wage: Decimal,
    /// Twelve times the monthly wage.
    #[schema(value_type = String, example = "600000")]
    pub yearly_wage: Decimal,
    #[schema(value_type = String, example = "25000")]
    pub basic: Decimal,
    #[schema(value_type = String, example = "12500")]
    pub hra: Decimal,
    #[schema(value_type = String, example = "4167")]
    pub standard_allowance: Decimal,
    #[schema(value_type = String, example = "4165")]
    pub performance_bonus: Decimal,
    #[schema(value_type = String, example = "4165")]
    pub lta: Decimal,
    /// Residual earning component; absorbs rounding so the earning
    /// components sum back to the wage. Clamped at zero.
    #[schema(value_type = String, example = "3")]
    pub fixed_allowance: Decimal,
    #[schema(value_type = String, example = "1800")]
    pub pf_employee: Decimal,
    #[schema(value_type = String, example = "1800")]
    pub pf_employer: Decimal,
    #[schema(value_type = String, example = "200")]
    pub professional_tax: Decimal,
}

impl SalaryComponents {
    /// Sum of all earning components.
    pub fn gross_earnings(&self) -> Decimal {
        self.basic
            + self.hra
            + self.standard_allowance
            + self.performance_bonus
            + self.lta
            + self.fixed_allowance
    }

    /// Employee-side deductions: provident fund plus professional tax.
    pub fn total_deductions(&self) -> Decimal {
        self.pf_employee + self.professional_tax
    }

    /// Gross earnings minus total deductions.
    pub fn net_pay(&self) -> Decimal {
        self.gross_earnings() - self.total_deductions()
    }
}

/// Rounds a monetary amount to cents, halves away from zero.
pub(crate) fn round_money(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Yearly wage for a monthly wage. Exact, no rounding.
pub fn yearly_wage(monthly_wage: Decimal) -> Decimal {
    monthly_wage * MONTHS_PER_YEAR
}

/// Derives the salary component breakdown for a monthly wage.
///
/// Pure and deterministic. Rejects negative wages with
/// [`SalaryError::NegativeWage`]; for any non-negative wage every derived
/// component is non-negative and, whenever the unclamped residual is
/// non-negative, the earning components sum to the wage exactly.
///
/// Both provident fund portions are capped at [`PF_MONTHLY_CAP`]. This is
/// the single canonical capping rule; every caller goes through this
/// function.
pub fn compute_components(monthly_wage: Decimal) -> SalaryResult<SalaryComponents> {
    if monthly_wage < Decimal::ZERO {
        return Err(SalaryError::NegativeWage { wage: monthly_wage });
    }

    let monthly_wage = round_money(monthly_wage);

    let basic = round_money(monthly_wage * BASIC_RATE);
    let hra = round_money(basic * HRA_RATE);
    let performance_bonus = round_money(monthly_wage * PERFORMANCE_BONUS_RATE);
    let lta = round_money(monthly_wage * LTA_RATE);

    // Residual after the four percentage components and the flat allowance.
    // Clamped so a wage below the flat constants cannot push it negative.
    let earned = basic + hra + STANDARD_ALLOWANCE + performance_bonus + lta;
    let fixed_allowance = (monthly_wage - earned).max(Decimal::ZERO);

    let pf = round_money(basic * PF_RATE).min(PF_MONTHLY_CAP);

    Ok(SalaryComponents {
        monthly_wage,
        yearly_wage: yearly_wage(monthly_wage),
        basic,
        hra,
        standard_allowance: STANDARD_ALLOWANCE,
        performance_bonus,
        lta,
        fixed_allowance,
        pf_employee: pf,
        pf_employer: pf,
        professional_tax: PROFESSIONAL_TAX,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn earnings_sum(c: &SalaryComponents) -> Decimal {
        c.basic + c.hra + c.standard_allowance + c.performance_bonus + c.lta + c.fixed_allowance
    }

    /// Reference scenario: wage 50000.
    #[test]
    fn test_breakdown_for_50000() {
        let c = compute_components(dec!(50000)).unwrap();

        assert_eq!(c.basic, dec!(25000));
        assert_eq!(c.hra, dec!(12500));
        assert_eq!(c.standard_allowance, dec!(4167));
        assert_eq!(c.performance_bonus, dec!(4165));
        assert_eq!(c.lta, dec!(4165));
        assert_eq!(c.fixed_allowance, dec!(3));
        assert_eq!(earnings_sum(&c), dec!(50000));

        // 12% of basic would be 3000; the statutory cap applies.
        assert_eq!(c.pf_employee, dec!(1800));
        assert_eq!(c.pf_employer, dec!(1800));
        assert_eq!(c.professional_tax, dec!(200));

        assert_eq!(c.gross_earnings(), dec!(50000));
        assert_eq!(c.total_deductions(), dec!(2000));
        assert_eq!(c.net_pay(), dec!(48000));
    }

    /// Zero wage keeps only the flat constants; the residual clamps to zero
    /// instead of going negative.
    #[test]
    fn test_breakdown_for_zero_wage() {
        let c = compute_components(Decimal::ZERO).unwrap();

        assert_eq!(c.basic, Decimal::ZERO);
        assert_eq!(c.hra, Decimal::ZERO);
        assert_eq!(c.performance_bonus, Decimal::ZERO);
        assert_eq!(c.lta, Decimal::ZERO);
        assert_eq!(c.standard_allowance, dec!(4167));
        assert_eq!(c.fixed_allowance, Decimal::ZERO);
        assert_eq!(c.pf_employee, Decimal::ZERO);
        assert_eq!(c.pf_employer, Decimal::ZERO);
        assert_eq!(c.professional_tax, dec!(200));
        assert_eq!(c.yearly_wage, Decimal::ZERO);
    }

    #[test]
    fn test_negative_wage_rejected() {
        let err = compute_components(dec!(-1)).unwrap_err();
        assert_eq!(err, SalaryError::NegativeWage { wage: dec!(-1) });
    }

    /// Below the cap threshold PF is plain 12% of basic.
    #[test]
    fn test_pf_uncapped_below_ceiling() {
        let c = compute_components(dec!(20000)).unwrap();
        assert_eq!(c.basic, dec!(10000));
        assert_eq!(c.pf_employee, dec!(1200));
        assert_eq!(c.pf_employer, dec!(1200));
    }

    /// Fractional wage: components are rounded to cents and the residual
    /// absorbs the rounding so the sum still matches the wage exactly.
    #[test]
    fn test_rounding_absorbed_by_fixed_allowance() {
        let c = compute_components(dec!(55555.55)).unwrap();

        assert_eq!(c.basic, dec!(27777.78));
        assert_eq!(c.hra, dec!(13888.89));
        assert_eq!(c.performance_bonus, dec!(4627.78));
        assert_eq!(c.lta, dec!(4627.78));
        assert_eq!(c.fixed_allowance, dec!(466.32));
        assert_eq!(earnings_sum(&c), dec!(55555.55));
    }

    /// No upper clamp: the residual grows without bound with the wage.
    #[test]
    fn test_large_wage_grows_fixed_allowance() {
        let small = compute_components(dec!(100000)).unwrap();
        let large = compute_components(dec!(10000000)).unwrap();
        assert!(large.fixed_allowance > small.fixed_allowance);
        assert_eq!(earnings_sum(&large), dec!(10000000));
    }

    #[test]
    fn test_yearly_wage_is_twelve_months() {
        assert_eq!(yearly_wage(dec!(50000)), dec!(600000));
        assert_eq!(compute_components(dec!(50000)).unwrap().yearly_wage, dec!(600000));
    }

    #[test]
    fn test_deterministic() {
        let a = compute_components(dec!(43210.98)).unwrap();
        let b = compute_components(dec!(43210.98)).unwrap();
        assert_eq!(a, b);
    }

    proptest! {
        /// Every component is non-negative for any non-negative wage.
        #[test]
        fn prop_components_non_negative(cents in 0i64..=100_000_000_00) {
            let wage = Decimal::new(cents, 2);
            let c = compute_components(wage).unwrap();
            prop_assert!(c.basic >= Decimal::ZERO);
            prop_assert!(c.hra >= Decimal::ZERO);
            prop_assert!(c.standard_allowance >= Decimal::ZERO);
            prop_assert!(c.performance_bonus >= Decimal::ZERO);
            prop_assert!(c.lta >= Decimal::ZERO);
            prop_assert!(c.fixed_allowance >= Decimal::ZERO);
            prop_assert!(c.pf_employee >= Decimal::ZERO);
            prop_assert!(c.professional_tax >= Decimal::ZERO);
        }

        /// Whenever the unclamped residual is non-negative the earning
        /// components sum back to the wage exactly; otherwise the residual
        /// clamps to zero and the flat constants dominate the wage.
        #[test]
        fn prop_earnings_sum_matches_wage(cents in 0i64..=100_000_000_00) {
            let wage = Decimal::new(cents, 2);
            let c = compute_components(wage).unwrap();
            let other = c.basic + c.hra + c.standard_allowance
                + c.performance_bonus + c.lta;
            if wage >= other {
                prop_assert_eq!(earnings_sum(&c), wage);
            } else {
                prop_assert_eq!(c.fixed_allowance, Decimal::ZERO);
                prop_assert!(earnings_sum(&c) > wage);
            }
        }

        /// Both PF portions honor the statutory cap and stay equal.
        #[test]
        fn prop_pf_capped_and_symmetric(cents in 0i64..=100_000_000_00) {
            let wage = Decimal::new(cents, 2);
            let c = compute_components(wage).unwrap();
            prop_assert!(c.pf_employee <= PF_MONTHLY_CAP);
            prop_assert_eq!(c.pf_employee, c.pf_employer);
        }

        /// Yearly wage is exactly twelve monthly wages.
        #[test]
        fn prop_yearly_is_twelve_monthly(cents in 0i64..=100_000_000_00) {
            let wage = Decimal::new(cents, 2);
            let c = compute_components(wage).unwrap();
            prop_assert_eq!(c.yearly_wage, wage * dec!(12));
        }
    }
}
