//! Annual to monthly rate conversion
//!
//! Every schedule runs on a monthly effective rate (TEM). TEA inputs are
//! de-compounded directly; TNA inputs are first compounded to a TEA at their
//! capitalization frequency.

use crate::error::{Result, SimulationError};
use crate::simulation::RateType;

/// Capitalization periods per year assumed for a TNA when none is given
pub const DEFAULT_CAPITALIZATION_PER_YEAR: u32 = 12;

fn check_rate(name: &str, rate: f64) -> Result<()> {
    if !rate.is_finite() {
        return Err(SimulationError::InvalidRate(format!(
            "{} must be a finite number, got {}",
            name, rate
        )));
    }
    if rate < 0.0 {
        return Err(SimulationError::InvalidRate(format!(
            "{} must not be negative, got {}",
            name, rate
        )));
    }
    Ok(())
}

/// TEM = (1 + TEA)^(1/12) - 1
pub fn tea_to_tem(tea: f64) -> Result<f64> {
    check_rate("TEA", tea)?;
    if tea == 0.0 {
        return Ok(0.0);
    }
    Ok((1.0 + tea).powf(1.0 / 12.0) - 1.0)
}

/// TEA = (1 + TNA / k)^k - 1
pub fn tna_to_tea(tna: f64, capitalization_per_year: u32) -> Result<f64> {
    check_rate("TNA", tna)?;
    if capitalization_per_year == 0 {
        return Err(SimulationError::InvalidRate(
            "capitalization per year must be at least 1".to_string(),
        ));
    }
    let k = capitalization_per_year as f64;
    Ok((1.0 + tna / k).powf(k) - 1.0)
}

/// TEA = (1 + TEM)^12 - 1
pub fn tem_to_tea(tem: f64) -> f64 {
    (1.0 + tem).powi(12) - 1.0
}

/// Effective annual rate for an annual rate of the given type
pub fn effective_annual_rate(
    annual_rate: f64,
    rate_type: RateType,
    capitalization_per_year: u32,
) -> Result<f64> {
    match rate_type {
        RateType::Tea => {
            check_rate("TEA", annual_rate)?;
            Ok(annual_rate)
        }
        RateType::Tna => tna_to_tea(annual_rate, capitalization_per_year),
    }
}

/// Monthly effective rate for an annual rate of the given type
pub fn monthly_effective_rate(
    annual_rate: f64,
    rate_type: RateType,
    capitalization_per_year: u32,
) -> Result<f64> {
    let tea = effective_annual_rate(annual_rate, rate_type, capitalization_per_year)?;
    tea_to_tem(tea)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_tea_to_tem() {
        let tem = tea_to_tem(0.12).unwrap();
        assert_relative_eq!(tem, 0.009488792934583046, epsilon = 1e-12);
    }

    #[test]
    fn test_zero_rate() {
        assert_eq!(tea_to_tem(0.0).unwrap(), 0.0);
        assert_eq!(monthly_effective_rate(0.0, RateType::Tna, 12).unwrap(), 0.0);
    }

    #[test]
    fn test_negative_rate_rejected() {
        assert!(matches!(tea_to_tem(-0.05), Err(SimulationError::InvalidRate(_))));
        assert!(matches!(
            monthly_effective_rate(-0.01, RateType::Tna, 12),
            Err(SimulationError::InvalidRate(_))
        ));
        assert!(matches!(tea_to_tem(f64::NAN), Err(SimulationError::InvalidRate(_))));
    }

    #[test]
    fn test_tna_monthly_capitalization() {
        // 12% nominal capitalized monthly is exactly 1% per month
        let tem = monthly_effective_rate(0.12, RateType::Tna, 12).unwrap();
        assert_relative_eq!(tem, 0.01, epsilon = 1e-12);

        let tea = tna_to_tea(0.12, 12).unwrap();
        assert_relative_eq!(tea, 0.12682503013196977, epsilon = 1e-12);
    }

    #[test]
    fn test_tna_daily_capitalization() {
        let tea = tna_to_tea(0.10, 360).unwrap();
        assert!(tea > 0.105 && tea < 0.106);
    }

    #[test]
    fn test_zero_capitalization_rejected() {
        assert!(matches!(tna_to_tea(0.1, 0), Err(SimulationError::InvalidRate(_))));
    }

    #[test]
    fn test_round_trip() {
        for tea in [0.0, 0.05, 0.0875, 0.12, 0.35] {
            let tem = tea_to_tem(tea).unwrap();
            assert_relative_eq!(tem_to_tea(tem), tea, epsilon = 1e-9);
        }
    }
}
