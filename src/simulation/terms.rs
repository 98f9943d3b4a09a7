//! Validation of simulation inputs into the numeric terms the engine runs on

use chrono::NaiveDate;

use super::data::{Currency, SimulationInput};
use crate::error::{Result, SimulationError};
use crate::schedule::rates::{self, DEFAULT_CAPITALIZATION_PER_YEAR};
use crate::schedule::GracePolicy;

/// Longest accepted loan term (50 years)
pub const MAX_TERM_MONTHS: i32 = 600;

/// Validated, normalized loan terms
#[derive(Debug, Clone, PartialEq)]
pub struct LoanTerms {
    pub principal: f64,
    pub bonus: f64,
    /// Principal net of the bonus, the balance entering period 1
    pub financed_amount: f64,
    pub currency: Currency,
    /// Effective annual rate of the loan
    pub tea: f64,
    /// Monthly effective rate
    pub tem: f64,
    pub term_months: u32,
    pub grace: GracePolicy,
    pub life_insurance_rate_monthly: f64,
    pub risk_insurance_rate_annual: f64,
    pub fees_monthly: f64,
    pub property_value: Option<f64>,
    /// Effective annual discount rate for the VAN
    pub discount_rate_annual: f64,
    pub start_date: Option<NaiveDate>,
}

impl LoanTerms {
    /// Amount the risk insurance rate applies to this period
    pub fn insured_value(&self, opening_balance: f64) -> f64 {
        self.property_value.unwrap_or(opening_balance)
    }
}

fn check_non_negative_rate(name: &str, value: f64) -> Result<()> {
    if !value.is_finite() || value < 0.0 {
        return Err(SimulationError::InvalidRate(format!(
            "{} must be a non-negative number, got {}",
            name, value
        )));
    }
    Ok(())
}

impl SimulationInput {
    /// Validate every input invariant, failing before any schedule work
    pub fn validate(&self) -> Result<LoanTerms> {
        if !self.principal.is_finite() || self.principal <= 0.0 {
            return Err(SimulationError::invalid_input(
                "principal",
                format!("must be positive, got {}", self.principal),
            ));
        }

        // Rates
        let annual_rate = self.manual_rate().ok_or_else(|| {
            SimulationError::InvalidRate(format!(
                "no {} given for a {} simulation",
                self.rate_type.label(),
                self.rate_type.label()
            ))
        })?;
        let capitalization = self
            .capitalization_per_year
            .unwrap_or(DEFAULT_CAPITALIZATION_PER_YEAR);
        let tea = rates::effective_annual_rate(annual_rate, self.rate_type, capitalization)?;
        let tem = rates::tea_to_tem(tea)?;

        check_non_negative_rate("life insurance rate", self.life_insurance_rate_monthly)?;
        check_non_negative_rate("risk insurance rate", self.risk_insurance_rate_annual)?;
        let discount_rate_annual = match self.discount_rate_annual {
            Some(rate) => {
                check_non_negative_rate("discount rate", rate)?;
                rate
            }
            None => tea,
        };

        if !self.fees_monthly.is_finite() || self.fees_monthly < 0.0 {
            return Err(SimulationError::invalid_input(
                "feesMonthly",
                format!("must not be negative, got {}", self.fees_monthly),
            ));
        }
        if let Some(value) = self.property_value {
            if !value.is_finite() || value <= 0.0 {
                return Err(SimulationError::invalid_input(
                    "propertyValue",
                    format!("must be positive, got {}", value),
                ));
            }
        }

        // MiVivienda bonus
        let bonus = if self.apply_mi_vivienda_bonus {
            if !self.bonus_amount.is_finite()
                || self.bonus_amount <= 0.0
                || self.bonus_amount >= self.principal
            {
                return Err(SimulationError::InvalidBonus(format!(
                    "bonus {} must be greater than 0 and less than the principal {}",
                    self.bonus_amount, self.principal
                )));
            }
            self.bonus_amount
        } else {
            if self.bonus_amount != 0.0 {
                return Err(SimulationError::InvalidBonus(format!(
                    "bonus amount {} given without applying the MiVivienda bonus",
                    self.bonus_amount
                )));
            }
            0.0
        };

        // Term and grace
        if self.term_months <= 0 || self.term_months > MAX_TERM_MONTHS {
            return Err(SimulationError::InvalidTerm(format!(
                "term must be between 1 and {} months, got {}",
                MAX_TERM_MONTHS, self.term_months
            )));
        }
        if self.grace_months < 0 || self.grace_months >= self.term_months {
            return Err(SimulationError::InvalidTerm(format!(
                "grace months {} must be between 0 and the term {} (exclusive)",
                self.grace_months, self.term_months
            )));
        }

        Ok(LoanTerms {
            principal: self.principal,
            bonus,
            financed_amount: self.principal - bonus,
            currency: self.currency,
            tea,
            tem,
            term_months: self.term_months as u32,
            grace: GracePolicy::new(self.grace_type, self.grace_months as u32),
            life_insurance_rate_monthly: self.life_insurance_rate_monthly,
            risk_insurance_rate_annual: self.risk_insurance_rate_annual,
            fees_monthly: self.fees_monthly,
            property_value: self.property_value,
            discount_rate_annual,
            start_date: self.start_date,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::simulation::{GraceType, RateType};
    use approx::assert_relative_eq;

    #[test]
    fn test_valid_terms() {
        let input = SimulationInput::new(200_000.0, RateType::Tea, 0.10, 240)
            .with_bonus(25_000.0)
            .with_grace(GraceType::Partial, 6);
        let terms = input.validate().unwrap();

        assert_eq!(terms.financed_amount, 175_000.0);
        assert_eq!(terms.term_months, 240);
        assert_eq!(terms.grace.grace_months, 6);
        assert_relative_eq!(terms.discount_rate_annual, 0.10);
    }

    #[test]
    fn test_bonus_not_below_principal() {
        let input = SimulationInput::new(100_000.0, RateType::Tea, 0.12, 12).with_bonus(150_000.0);
        assert!(matches!(input.validate(), Err(SimulationError::InvalidBonus(_))));

        let input = SimulationInput::new(100_000.0, RateType::Tea, 0.12, 12).with_bonus(100_000.0);
        assert!(matches!(input.validate(), Err(SimulationError::InvalidBonus(_))));
    }

    #[test]
    fn test_bonus_must_be_positive() {
        let input = SimulationInput::new(100_000.0, RateType::Tea, 0.12, 12).with_bonus(0.0);
        assert!(matches!(input.validate(), Err(SimulationError::InvalidBonus(_))));
    }

    #[test]
    fn test_bonus_amount_without_flag() {
        let mut input = SimulationInput::new(100_000.0, RateType::Tea, 0.12, 12);
        input.bonus_amount = 5_000.0;
        assert!(matches!(input.validate(), Err(SimulationError::InvalidBonus(_))));
    }

    #[test]
    fn test_negative_rate() {
        let input = SimulationInput::new(100_000.0, RateType::Tea, -0.05, 12);
        assert!(matches!(input.validate(), Err(SimulationError::InvalidRate(_))));
    }

    #[test]
    fn test_missing_rate() {
        let input = SimulationInput::without_rate(100_000.0, RateType::Tna, 12);
        assert!(matches!(input.validate(), Err(SimulationError::InvalidRate(_))));
    }

    #[test]
    fn test_invalid_term() {
        let input = SimulationInput::new(100_000.0, RateType::Tea, 0.12, 0);
        assert!(matches!(input.validate(), Err(SimulationError::InvalidTerm(_))));

        let input = SimulationInput::new(100_000.0, RateType::Tea, 0.12, 12)
            .with_grace(GraceType::Total, 12);
        assert!(matches!(input.validate(), Err(SimulationError::InvalidTerm(_))));
    }

    #[test]
    fn test_term_upper_bound() {
        let input = SimulationInput::new(100_000.0, RateType::Tea, 0.12, MAX_TERM_MONTHS);
        assert_eq!(input.validate().unwrap().term_months, 600);

        let input = SimulationInput::new(100_000.0, RateType::Tea, 0.12, MAX_TERM_MONTHS + 1);
        assert!(matches!(input.validate(), Err(SimulationError::InvalidTerm(_))));

        // Rejected before any schedule is allocated
        let input = SimulationInput::new(100_000.0, RateType::Tea, 0.12, 2_000_000_000);
        let result = crate::schedule::AmortizationEngine::default().simulate(&input);
        assert!(matches!(result, Err(SimulationError::InvalidTerm(_))));
    }

    #[test]
    fn test_invalid_principal_and_fees() {
        let input = SimulationInput::new(0.0, RateType::Tea, 0.12, 12);
        assert!(matches!(input.validate(), Err(SimulationError::InvalidInput { .. })));

        let input = SimulationInput::new(1000.0, RateType::Tea, 0.12, 12).with_fees(-1.0);
        assert!(matches!(input.validate(), Err(SimulationError::InvalidInput { .. })));
    }

    #[test]
    fn test_negative_insurance_rate() {
        let input = SimulationInput::new(1000.0, RateType::Tea, 0.12, 12).with_insurance(-0.001, 0.0);
        let err = input.validate().unwrap_err();
        assert!(matches!(err, SimulationError::InvalidRate(_)));
        assert!(err.is_validation());
    }
}
