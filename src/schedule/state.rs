//! Running state of a schedule while it is being generated

use super::grace::PeriodPhase;
use crate::simulation::LoanTerms;

/// State of the loan at a point in time during schedule generation
#[derive(Debug, Clone)]
pub struct ScheduleState {
    /// Current period (1-indexed, 0 before the first period)
    pub period: u32,

    /// Phase of the current period
    pub phase: PeriodPhase,

    /// Balance at the start of the current period
    pub opening_balance: f64,

    /// Balance at the end of the previous period
    pub closing_balance: f64,

    /// Constant installment, fixed when the amortizing phase starts
    pub installment: Option<f64>,

    /// Interest capitalized into the balance during total grace
    pub capitalized_interest: f64,
}

impl ScheduleState {
    /// Initialize state at period 0, with the bonus already deducted
    pub fn from_terms(terms: &LoanTerms) -> Self {
        Self {
            period: 0,
            phase: terms.grace.treatment(1),
            opening_balance: terms.financed_amount,
            closing_balance: terms.financed_amount,
            installment: None,
            capitalized_interest: 0.0,
        }
    }

    /// Advance to the next period; the opening balance comes from the prior closing balance
    pub fn advance(&mut self, terms: &LoanTerms) {
        self.period += 1;
        self.phase = terms.grace.treatment(self.period);
        self.opening_balance = self.closing_balance;
    }

    /// Whether the current period closes the loan
    pub fn is_final_period(&self, terms: &LoanTerms) -> bool {
        self.period == terms.term_months
    }

    /// Amortizing periods remaining, the current one included
    pub fn remaining_periods(&self, terms: &LoanTerms) -> u32 {
        terms.term_months + 1 - self.period
    }
}
