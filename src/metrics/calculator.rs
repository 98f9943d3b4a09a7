//! Financial metrics derived from a generated schedule

use super::discount::DiscountRate;
use super::irr::{annualize_monthly, calculate_irr, IrrConfig};
use crate::error::Result;
use crate::schedule::{AmortizationSchedule, ScheduleTotals};
use crate::simulation::LoanTerms;

pub const TCEA: &str = "TCEA";
pub const TIR: &str = "TIR";

/// Computes TCEA, VAN, TIR and totals for one schedule
pub struct MetricsCalculator<'a> {
    terms: &'a LoanTerms,
    schedule: &'a AmortizationSchedule,
    irr: IrrConfig,
}

impl<'a> MetricsCalculator<'a> {
    pub fn new(terms: &'a LoanTerms, schedule: &'a AmortizationSchedule, irr: IrrConfig) -> Self {
        Self { terms, schedule, irr }
    }

    /// Constant installment of the amortizing phase, insurance and fees excluded
    pub fn monthly_payment(&self) -> f64 {
        self.schedule.constant_installment()
    }

    pub fn totals(&self) -> ScheduleTotals {
        self.schedule.totals()
    }

    /// Interest plus insurance plus fees over the life of the loan
    pub fn total_cost(&self, totals: &ScheduleTotals) -> f64 {
        totals.interest + totals.insurance() + totals.fees
    }

    /// Annualized IRR of the all-in flows against the financed amount
    pub fn tcea(&self) -> Result<f64> {
        let cashflows = self.schedule.all_in_cashflows(self.terms.financed_amount);
        let monthly = calculate_irr(&cashflows, &self.irr, TCEA)?;
        Ok(annualize_monthly(monthly))
    }

    /// Monthly IRR of the installment flows only
    pub fn tir(&self) -> Result<f64> {
        let cashflows = self.schedule.base_cashflows(self.terms.financed_amount);
        calculate_irr(&cashflows, &self.irr, TIR)
    }

    /// NPV of the all-in flows at the discount rate
    pub fn van(&self) -> Result<f64> {
        let cashflows = self.schedule.all_in_cashflows(self.terms.financed_amount);
        DiscountRate::effective_annual(self.terms.discount_rate_annual).present_value(&cashflows)
    }
}
