//! Discounting helpers: present values, annuity factors and the VAN

use serde::{Deserialize, Serialize};

use crate::error::{Result, SimulationError};
use crate::schedule::rates;

/// Monthly discounting at an effective annual rate
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DiscountRate {
    /// Effective annual rate
    pub annual_rate: f64,
}

impl DiscountRate {
    pub fn effective_annual(annual_rate: f64) -> Self {
        Self { annual_rate }
    }

    /// Monthly effective rate equivalent to the annual rate
    pub fn monthly_rate(&self) -> Result<f64> {
        rates::tea_to_tem(self.annual_rate)
    }

    /// Present value of monthly cash flows, period 0 first
    pub fn present_value(&self, cashflows: &[f64]) -> Result<f64> {
        npv(self.monthly_rate()?, cashflows)
    }
}

/// Net present value of periodic cash flows, period 0 undiscounted
pub fn npv(rate: f64, cashflows: &[f64]) -> Result<f64> {
    if !rate.is_finite() || rate <= -1.0 {
        return Err(SimulationError::InvalidRate(format!(
            "discount rate must be greater than -100%, got {}",
            rate
        )));
    }

    let one_plus_r = 1.0 + rate;
    let mut discount = 1.0;
    let mut result = 0.0;

    for (t, cf) in cashflows.iter().enumerate() {
        if t > 0 {
            discount *= one_plus_r;
        }
        result += cf / discount;
    }

    Ok(result)
}

/// Helper functions for level payment streams
pub struct PVCalculator;

impl PVCalculator {
    /// Present value of 1 paid at the end of each of `n_months` periods
    pub fn annuity_factor(n_months: u32, monthly_rate: f64) -> f64 {
        if monthly_rate.abs() < 1e-15 {
            return n_months as f64;
        }
        (1.0 - (1.0 + monthly_rate).powi(-(n_months as i32))) / monthly_rate
    }

    /// Level installment that repays `balance` over `n_months` periods
    pub fn level_installment(balance: f64, n_months: u32, monthly_rate: f64) -> f64 {
        if n_months == 0 {
            return balance;
        }
        balance / Self::annuity_factor(n_months, monthly_rate)
    }
}
