//! Internal Rate of Return (IRR) calculation
//!
//! Used for the TCEA (all-in flows) and the TIR (installment-only flows).

use serde::{Deserialize, Serialize};

use crate::error::{Result, SimulationError};

/// Solver settings for IRR searches
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IrrConfig {
    /// Convergence tolerance on the periodic rate
    pub tolerance: f64,
    /// Iteration budget for each of Newton-Raphson and the bisection fallback
    pub max_iterations: u32,
}

impl Default for IrrConfig {
    fn default() -> Self {
        Self {
            tolerance: 1e-7,
            max_iterations: 100,
        }
    }
}

const LOWER_BOUND: f64 = -0.99;
const UPPER_BOUND: f64 = 10.0;

/// Calculate the periodic Internal Rate of Return for a series of cash flows
/// using the Newton-Raphson method, falling back to bisection.
///
/// # Arguments
/// * `cashflows` - Cash flows per period, period 0 first (positive = inflow)
/// * `metric` - Name reported in the convergence error
///
/// # Returns
/// * the periodic rate `r` with NPV(r) = 0, or `ConvergenceError`
pub fn calculate_irr(cashflows: &[f64], config: &IrrConfig, metric: &'static str) -> Result<f64> {
    let failure = |iterations| SimulationError::ConvergenceError { metric, iterations };

    if cashflows.len() < 2 {
        return Err(failure(0));
    }

    // A root exists only if the flows change sign
    let has_positive = cashflows.iter().any(|&cf| cf > 1e-10);
    let has_negative = cashflows.iter().any(|&cf| cf < -1e-10);
    if !has_positive || !has_negative {
        return Err(failure(0));
    }

    let mut rate = 0.01;

    for _ in 0..config.max_iterations {
        let (npv, dnpv) = npv_and_derivative(cashflows, rate);

        if dnpv.abs() < 1e-20 {
            break;
        }

        let new_rate = (rate - npv / dnpv).clamp(LOWER_BOUND, UPPER_BOUND);

        if (new_rate - rate).abs() < config.tolerance {
            return Ok(new_rate);
        }

        rate = new_rate;
    }

    log::debug!("{}: Newton-Raphson did not converge, trying bisection", metric);
    calculate_irr_bisection(cashflows, config).ok_or_else(|| failure(config.max_iterations))
}

/// Calculate NPV and its derivative with respect to rate
fn npv_and_derivative(cashflows: &[f64], rate: f64) -> (f64, f64) {
    let mut npv = 0.0;
    let mut dnpv = 0.0;

    for (t, &cf) in cashflows.iter().enumerate() {
        let discount = (1.0 + rate).powi(t as i32);
        npv += cf / discount;
        if t > 0 {
            dnpv -= (t as f64) * cf / ((1.0 + rate).powi(t as i32 + 1));
        }
    }

    (npv, dnpv)
}

/// Fallback IRR calculation using bisection method
fn calculate_irr_bisection(cashflows: &[f64], config: &IrrConfig) -> Option<f64> {
    let mut low = LOWER_BOUND;
    let mut high = UPPER_BOUND;

    let mut npv_low = npv_at_rate(cashflows, low);
    let npv_high = npv_at_rate(cashflows, high);

    // Check that we have a root in this interval
    if npv_low * npv_high > 0.0 {
        return None;
    }

    for _ in 0..config.max_iterations {
        let mid = (low + high) / 2.0;
        let npv_mid = npv_at_rate(cashflows, mid);

        if npv_mid.abs() < config.tolerance || (high - low) / 2.0 < config.tolerance {
            return Some(mid);
        }

        if npv_mid * npv_low < 0.0 {
            high = mid;
        } else {
            low = mid;
            npv_low = npv_mid;
        }
    }

    None
}

/// Calculate NPV at a given periodic rate, period 0 undiscounted
pub fn npv_at_rate(cashflows: &[f64], rate: f64) -> f64 {
    cashflows
        .iter()
        .enumerate()
        .map(|(t, &cf)| cf / (1.0 + rate).powi(t as i32))
        .sum()
}

/// Annualize a monthly rate by compounding
pub fn annualize_monthly(rate: f64) -> f64 {
    (1.0 + rate).powi(12) - 1.0
}
