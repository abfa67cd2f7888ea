//! Error type for the salary engine.

use rust_decimal::Decimal;
use thiserror::Error;

/// Errors raised by the salary component calculator.
///
/// The calculator is pure arithmetic; the only failure mode is malformed
/// input. Persistence failures belong to the caller.
#[derive(Debug, Error, PartialEq)]
pub enum SalaryError {
    /// The supplied monthly wage was negative.
    #[error("monthly wage must not be negative, got {wage}")]
    NegativeWage {
        /// The rejected wage value.
        wage: Decimal,
    },
}

/// Result alias used across the salary engine.
pub type SalaryResult<T> = Result<T, SalaryError>;
