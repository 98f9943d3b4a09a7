//! Grace period policy: how each period treats interest and principal

use serde::{Deserialize, Serialize};

use crate::simulation::GraceType;

/// Treatment of a single period
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PeriodPhase {
    /// Nothing collected, interest capitalizes
    TotalGrace,
    /// Interest collected, principal deferred
    PartialGrace,
    /// Constant-installment amortization
    Amortizing,
}

impl PeriodPhase {
    pub fn is_grace(&self) -> bool {
        !matches!(self, PeriodPhase::Amortizing)
    }
}

/// Amounts produced by one grace period
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GraceStep {
    pub interest: f64,
    pub principal: f64,
    pub installment: f64,
    pub closing_balance: f64,
}

/// Grace configuration of a loan
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GracePolicy {
    pub grace_type: GraceType,
    /// Effective grace months (always 0 for `GraceType::None`)
    pub grace_months: u32,
}

impl GracePolicy {
    pub fn new(grace_type: GraceType, grace_months: u32) -> Self {
        let grace_months = match grace_type {
            GraceType::None => 0,
            _ => grace_months,
        };
        Self { grace_type, grace_months }
    }

    pub fn none() -> Self {
        Self::new(GraceType::None, 0)
    }

    /// Phase of a 1-indexed period
    pub fn treatment(&self, period: u32) -> PeriodPhase {
        if period > self.grace_months {
            return PeriodPhase::Amortizing;
        }
        match self.grace_type {
            GraceType::Total => PeriodPhase::TotalGrace,
            GraceType::Partial => PeriodPhase::PartialGrace,
            GraceType::None => PeriodPhase::Amortizing,
        }
    }

    /// Number of periods left for amortization after grace
    pub fn amortizing_periods(&self, term_months: u32) -> u32 {
        term_months.saturating_sub(self.grace_months)
    }

    /// Roll a balance through one grace period.
    ///
    /// Returns `None` for amortizing periods, which the scheduler handles.
    pub fn apply(&self, phase: PeriodPhase, opening_balance: f64, tem: f64) -> Option<GraceStep> {
        let interest = opening_balance * tem;
        match phase {
            PeriodPhase::TotalGrace => Some(GraceStep {
                interest,
                principal: 0.0,
                installment: 0.0,
                closing_balance: opening_balance + interest,
            }),
            PeriodPhase::PartialGrace => Some(GraceStep {
                interest,
                principal: 0.0,
                installment: interest,
                closing_balance: opening_balance,
            }),
            PeriodPhase::Amortizing => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_treatment_by_period() {
        let policy = GracePolicy::new(GraceType::Partial, 3);
        assert_eq!(policy.treatment(1), PeriodPhase::PartialGrace);
        assert_eq!(policy.treatment(3), PeriodPhase::PartialGrace);
        assert_eq!(policy.treatment(4), PeriodPhase::Amortizing);
        assert_eq!(policy.amortizing_periods(12), 9);
    }

    #[test]
    fn test_none_ignores_months() {
        let policy = GracePolicy::new(GraceType::None, 6);
        assert_eq!(policy.grace_months, 0);
        assert_eq!(policy.treatment(1), PeriodPhase::Amortizing);
        assert_eq!(policy.amortizing_periods(12), 12);
    }

    #[test]
    fn test_total_grace_capitalizes() {
        let policy = GracePolicy::new(GraceType::Total, 2);
        let step = policy.apply(PeriodPhase::TotalGrace, 10_000.0, 0.01).unwrap();
        assert_eq!(step.principal, 0.0);
        assert_eq!(step.installment, 0.0);
        assert!((step.closing_balance - 10_100.0).abs() < 1e-9);
    }

    #[test]
    fn test_partial_grace_pays_interest() {
        let policy = GracePolicy::new(GraceType::Partial, 2);
        let step = policy.apply(PeriodPhase::PartialGrace, 10_000.0, 0.01).unwrap();
        assert_eq!(step.principal, 0.0);
        assert!((step.installment - 100.0).abs() < 1e-9);
        assert_eq!(step.closing_balance, 10_000.0);
        assert!(policy.apply(PeriodPhase::Amortizing, 10_000.0, 0.01).is_none());
    }
}
