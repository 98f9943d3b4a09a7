//! Schedule rows and simulation output structures

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::grace::PeriodPhase;

/// A single period of the amortization schedule
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AmortizationItem {
    // Timing
    pub period: u32,
    #[serde(default)]
    pub due_date: Option<NaiveDate>,
    pub phase: PeriodPhase,

    // Balances and base installment
    pub opening_balance: f64,
    pub interest: f64,
    pub principal: f64,
    pub installment: f64,

    // Charges on top of the installment
    pub life_insurance: f64,
    pub risk_insurance: f64,
    pub fees: f64,

    pub closing_balance: f64,
}

impl AmortizationItem {
    /// Create a row with zero amounts
    pub fn new(period: u32, phase: PeriodPhase) -> Self {
        Self {
            period,
            due_date: None,
            phase,
            opening_balance: 0.0,
            interest: 0.0,
            principal: 0.0,
            installment: 0.0,
            life_insurance: 0.0,
            risk_insurance: 0.0,
            fees: 0.0,
            closing_balance: 0.0,
        }
    }

    /// Insurance and fees charged this period
    pub fn charges(&self) -> f64 {
        self.life_insurance + self.risk_insurance + self.fees
    }

    /// All-in amount the borrower pays this period
    pub fn total_payment(&self) -> f64 {
        self.installment + self.charges()
    }
}

/// Ordered schedule, one row per period
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AmortizationSchedule {
    pub items: Vec<AmortizationItem>,
}

impl AmortizationSchedule {
    pub fn new() -> Self {
        Self { items: Vec::new() }
    }

    pub fn with_capacity(periods: usize) -> Self {
        Self {
            items: Vec::with_capacity(periods),
        }
    }

    pub fn add_row(&mut self, row: AmortizationItem) {
        self.items.push(row);
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn last(&self) -> Option<&AmortizationItem> {
        self.items.last()
    }

    /// Installment of the first amortizing period
    pub fn constant_installment(&self) -> f64 {
        self.items
            .iter()
            .find(|r| r.phase == PeriodPhase::Amortizing)
            .map(|r| r.installment)
            .unwrap_or(0.0)
    }

    /// Column sums of the schedule
    pub fn totals(&self) -> ScheduleTotals {
        self.items.iter().fold(ScheduleTotals::default(), |mut acc, r| {
            acc.interest += r.interest;
            acc.principal += r.principal;
            acc.installment += r.installment;
            acc.life_insurance += r.life_insurance;
            acc.risk_insurance += r.risk_insurance;
            acc.fees += r.fees;
            acc
        })
    }

    /// Borrower cash flows: +financed amount at period 0, then minus each all-in payment
    pub fn all_in_cashflows(&self, financed_amount: f64) -> Vec<f64> {
        std::iter::once(financed_amount)
            .chain(self.items.iter().map(|r| -r.total_payment()))
            .collect()
    }

    /// Borrower cash flows excluding insurance and fees
    pub fn base_cashflows(&self, financed_amount: f64) -> Vec<f64> {
        std::iter::once(financed_amount)
            .chain(self.items.iter().map(|r| -r.installment))
            .collect()
    }
}

/// Column totals of a schedule
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleTotals {
    pub interest: f64,
    pub principal: f64,
    pub installment: f64,
    pub life_insurance: f64,
    pub risk_insurance: f64,
    pub fees: f64,
}

impl ScheduleTotals {
    pub fn insurance(&self) -> f64 {
        self.life_insurance + self.risk_insurance
    }
}

/// A metric that could not be computed while the rest of the simulation was kept
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnavailableMetric {
    pub metric: String,
    pub reason: String,
}

/// Computed results of a simulation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulationOutput {
    /// Principal net of the MiVivienda bonus
    pub financed_amount: f64,
    pub tem: f64,
    pub monthly_payment: f64,
    pub tcea: Option<f64>,
    pub van: f64,
    /// Monthly IRR of the base installment flows
    pub tir: Option<f64>,
    pub total_interest: f64,
    pub total_life_insurance: f64,
    pub total_risk_insurance: f64,
    pub total_fees: f64,
    pub total_cost: f64,
    pub amortization_schedule: Vec<AmortizationItem>,
    #[serde(default)]
    pub unavailable_metrics: Vec<UnavailableMetric>,
}

impl SimulationOutput {
    pub fn schedule_totals(&self) -> ScheduleTotals {
        AmortizationSchedule {
            items: self.amortization_schedule.clone(),
        }
        .totals()
    }

    pub fn final_balance(&self) -> f64 {
        self.amortization_schedule
            .last()
            .map(|r| r.closing_balance)
            .unwrap_or(0.0)
    }

    pub fn is_complete(&self) -> bool {
        self.unavailable_metrics.is_empty()
    }
}
