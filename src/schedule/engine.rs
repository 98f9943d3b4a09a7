//! Core amortization engine: French-method schedules and simulation results

use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use std::str::FromStr;

use chrono::Months;
use serde::{Deserialize, Serialize};

use super::grace::PeriodPhase;
use super::items::{AmortizationItem, AmortizationSchedule, SimulationOutput, UnavailableMetric};
use super::state::ScheduleState;
use crate::error::{Result, SimulationError};
use crate::metrics::{IrrConfig, MetricsCalculator, PVCalculator, TCEA, TIR};
use crate::simulation::{LoanTerms, SimulationInput};

/// What to do when a rate metric (TCEA, TIR) fails to converge
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricFailurePolicy {
    /// Abort the simulation with the convergence error
    #[default]
    Fail,
    /// Keep the schedule, leave the metric empty and list it as unavailable
    MarkUnavailable,
}

impl FromStr for MetricFailurePolicy {
    type Err = SimulationError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "fail" => Ok(MetricFailurePolicy::Fail),
            "mark_unavailable" | "mark-unavailable" => Ok(MetricFailurePolicy::MarkUnavailable),
            other => Err(SimulationError::invalid_input(
                "metric_failure_policy",
                format!("unknown policy '{}'", other),
            )),
        }
    }
}

/// Configuration for the engine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Largest final-period residual accepted silently
    pub rounding_tolerance: f64,

    /// IRR solver settings used for TCEA and TIR
    pub irr: IrrConfig,

    pub metric_failure_policy: MetricFailurePolicy,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            rounding_tolerance: 0.01,
            irr: IrrConfig::default(),
            metric_failure_policy: MetricFailurePolicy::Fail,
        }
    }
}

fn env_value<T: FromStr>(name: &str) -> Option<T> {
    std::env::var(name).ok().and_then(|s| s.parse().ok())
}

impl EngineConfig {
    /// Load a configuration from a JSON file; missing keys keep their defaults
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path)?;
        Ok(serde_json::from_reader(BufReader::new(file))?)
    }

    /// Override settings from `IRR_TOLERANCE`, `IRR_MAX_ITERATIONS`,
    /// `ROUNDING_TOLERANCE` and `METRIC_FAILURE_POLICY`
    pub fn with_env_overrides(mut self) -> Self {
        if let Some(tolerance) = env_value("IRR_TOLERANCE") {
            self.irr.tolerance = tolerance;
        }
        if let Some(iterations) = env_value("IRR_MAX_ITERATIONS") {
            self.irr.max_iterations = iterations;
        }
        if let Some(tolerance) = env_value("ROUNDING_TOLERANCE") {
            self.rounding_tolerance = tolerance;
        }
        if let Some(policy) = env_value("METRIC_FAILURE_POLICY") {
            self.metric_failure_policy = policy;
        }
        self
    }

    pub fn with_failure_policy(mut self, policy: MetricFailurePolicy) -> Self {
        self.metric_failure_policy = policy;
        self
    }
}

/// Main amortization engine
#[derive(Debug, Clone, Default)]
pub struct AmortizationEngine {
    config: EngineConfig,
}

impl AmortizationEngine {
    pub fn new(config: EngineConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Validate the input, generate its schedule and derive every metric
    pub fn simulate(&self, input: &SimulationInput) -> Result<SimulationOutput> {
        let terms = input.validate()?;
        let schedule = self.build_schedule(&terms);
        self.compute_output(&terms, schedule)
    }

    /// Generate the period-by-period schedule for validated terms
    pub fn build_schedule(&self, terms: &LoanTerms) -> AmortizationSchedule {
        let mut schedule = AmortizationSchedule::with_capacity(terms.term_months as usize);
        let mut state = ScheduleState::from_terms(terms);

        for _period in 1..=terms.term_months {
            state.advance(terms);
            let row = self.calculate_period(terms, &mut state);
            schedule.add_row(row);
        }

        log::debug!(
            "Built {} periods: financed {:.2}, tem {:.8}, installment {:.2}, capitalized {:.2}",
            schedule.len(),
            terms.financed_amount,
            terms.tem,
            state.installment.unwrap_or(0.0),
            state.capitalized_interest,
        );

        schedule
    }

    /// Calculate balances and charges for a single period
    fn calculate_period(&self, terms: &LoanTerms, state: &mut ScheduleState) -> AmortizationItem {
        let mut row = AmortizationItem::new(state.period, state.phase);
        row.due_date = terms
            .start_date
            .and_then(|start| start.checked_add_months(Months::new(state.period)));
        row.opening_balance = state.opening_balance;

        if let Some(step) = terms.grace.apply(state.phase, state.opening_balance, terms.tem) {
            row.interest = step.interest;
            row.principal = step.principal;
            row.installment = step.installment;
            row.closing_balance = step.closing_balance;

            if state.phase == PeriodPhase::TotalGrace {
                state.capitalized_interest += step.interest;
            }
        } else {
            self.amortize(terms, state, &mut row);
        }

        self.apply_charges(terms, &mut row);

        state.closing_balance = row.closing_balance;
        row
    }

    /// Constant-installment amortization; the final period absorbs the residual
    fn amortize(&self, terms: &LoanTerms, state: &mut ScheduleState, row: &mut AmortizationItem) {
        // The installment is fixed against the balance entering the amortizing phase
        let installment = match state.installment {
            Some(installment) => installment,
            None => {
                let installment = PVCalculator::level_installment(
                    state.opening_balance,
                    state.remaining_periods(terms),
                    terms.tem,
                );
                state.installment = Some(installment);
                installment
            }
        };

        let opening = state.opening_balance;
        row.interest = opening * terms.tem;

        if state.is_final_period(terms) {
            let residual = opening - (installment - row.interest);
            if residual.abs() > self.config.rounding_tolerance {
                log::warn!(
                    "Final period residual {:.6} exceeds tolerance {}",
                    residual,
                    self.config.rounding_tolerance
                );
            }
            row.principal = opening;
            row.installment = row.interest + opening;
            row.closing_balance = 0.0;
        } else {
            row.principal = installment - row.interest;
            row.installment = installment;
            row.closing_balance = opening - row.principal;
        }
    }

    /// Insurance and fees charged on top of the installment
    fn apply_charges(&self, terms: &LoanTerms, row: &mut AmortizationItem) {
        row.life_insurance = terms.life_insurance_rate_monthly * row.opening_balance;
        row.risk_insurance =
            terms.risk_insurance_rate_annual / 12.0 * terms.insured_value(row.opening_balance);
        row.fees = terms.fees_monthly;
    }

    /// Derive totals and rate metrics, applying the metric failure policy
    pub fn compute_output(
        &self,
        terms: &LoanTerms,
        schedule: AmortizationSchedule,
    ) -> Result<SimulationOutput> {
        let calc = MetricsCalculator::new(terms, &schedule, self.config.irr);
        let totals = calc.totals();

        let mut unavailable = Vec::new();
        let tcea = self.resolve_metric(TCEA, calc.tcea(), &mut unavailable)?;
        let tir = self.resolve_metric(TIR, calc.tir(), &mut unavailable)?;
        let van = calc.van()?;

        Ok(SimulationOutput {
            financed_amount: terms.financed_amount,
            tem: terms.tem,
            monthly_payment: calc.monthly_payment(),
            tcea,
            van,
            tir,
            total_interest: totals.interest,
            total_life_insurance: totals.life_insurance,
            total_risk_insurance: totals.risk_insurance,
            total_fees: totals.fees,
            total_cost: calc.total_cost(&totals),
            amortization_schedule: schedule.items,
            unavailable_metrics: unavailable,
        })
    }

    fn resolve_metric(
        &self,
        metric: &'static str,
        result: Result<f64>,
        unavailable: &mut Vec<UnavailableMetric>,
    ) -> Result<Option<f64>> {
        match result {
            Ok(value) => Ok(Some(value)),
            Err(err @ SimulationError::ConvergenceError { .. }) => match self.config.metric_failure_policy {
                MetricFailurePolicy::Fail => Err(err),
                MetricFailurePolicy::MarkUnavailable => {
                    log::warn!("{} unavailable: {}", metric, err);
                    unavailable.push(UnavailableMetric {
                        metric: metric.to_string(),
                        reason: err.to_string(),
                    });
                    Ok(None)
                }
            },
            Err(err) => Err(err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::simulation::{GraceType, RateType};
    use approx::assert_abs_diff_eq;
    use chrono::NaiveDate;

    fn engine() -> AmortizationEngine {
        AmortizationEngine::new(EngineConfig::default())
    }

    #[test]
    fn test_tea_twelve_months() {
        let input = SimulationInput::new(100_000.0, RateType::Tea, 0.12, 12);
        let output = engine().simulate(&input).unwrap();

        assert_eq!(output.amortization_schedule.len(), 12);
        assert_abs_diff_eq!(output.tem, 0.009489, epsilon = 1e-6);
        assert_abs_diff_eq!(output.monthly_payment, 8_856.21, epsilon = 0.01);
        assert_eq!(output.final_balance(), 0.0);
    }

    #[test]
    fn test_tna_twelve_months() {
        let input = SimulationInput::new(100_000.0, RateType::Tna, 0.12, 12).with_capitalization(12);
        let output = engine().simulate(&input).unwrap();

        assert_abs_diff_eq!(output.tem, 0.01, epsilon = 1e-12);
        assert_abs_diff_eq!(output.monthly_payment, 8_884.88, epsilon = 0.01);
        assert_abs_diff_eq!(output.tir.unwrap(), 0.01, epsilon = 1e-8);
    }

    #[test]
    fn test_balance_chain() {
        let input = SimulationInput::new(50_000.0, RateType::Tea, 0.15, 36)
            .with_grace(GraceType::Total, 3);
        let output = engine().simulate(&input).unwrap();
        let rows = &output.amortization_schedule;

        for pair in rows.windows(2) {
            assert_eq!(pair[1].opening_balance, pair[0].closing_balance);
        }
        for row in rows {
            let expected = row.opening_balance + row.interest - row.installment;
            assert_abs_diff_eq!(row.closing_balance, expected, epsilon = 1e-6);
        }
        assert_eq!(rows.last().unwrap().closing_balance, 0.0);
    }

    #[test]
    fn test_total_grace() {
        let input = SimulationInput::new(100_000.0, RateType::Tea, 0.12, 24)
            .with_grace(GraceType::Total, 4);
        let output = engine().simulate(&input).unwrap();
        let rows = &output.amortization_schedule;

        for p in 0..4 {
            assert_eq!(rows[p].phase, PeriodPhase::TotalGrace);
            assert_eq!(rows[p].principal, 0.0);
            assert_eq!(rows[p].installment, 0.0);
            assert!(rows[p].closing_balance > rows[p].opening_balance);
        }

        // Amortization restarts over the remaining 20 periods on the capitalized balance
        let capitalized = rows[4].opening_balance;
        assert_abs_diff_eq!(capitalized, 100_000.0 * 1.12_f64.powf(4.0 / 12.0), epsilon = 1e-6);
        let expected = PVCalculator::level_installment(capitalized, 20, output.tem);
        assert_abs_diff_eq!(output.monthly_payment, expected, epsilon = 1e-9);

        let principal: f64 = rows.iter().map(|r| r.principal).sum();
        assert_abs_diff_eq!(principal, capitalized, epsilon = 0.01);
    }

    #[test]
    fn test_partial_grace() {
        let input = SimulationInput::new(100_000.0, RateType::Tea, 0.12, 24)
            .with_grace(GraceType::Partial, 4);
        let output = engine().simulate(&input).unwrap();
        let rows = &output.amortization_schedule;

        for p in 0..4 {
            assert_eq!(rows[p].phase, PeriodPhase::PartialGrace);
            assert_eq!(rows[p].principal, 0.0);
            assert_eq!(rows[p].opening_balance, 100_000.0);
            assert_abs_diff_eq!(rows[p].installment, rows[p].interest);
        }

        let principal: f64 = rows.iter().map(|r| r.principal).sum();
        assert_abs_diff_eq!(principal, 100_000.0, epsilon = 0.01);
    }

    #[test]
    fn test_bonus_reduces_financed_amount() {
        let input = SimulationInput::new(300_000.0, RateType::Tea, 0.09, 120).with_bonus(37_800.0);
        let output = engine().simulate(&input).unwrap();

        assert_eq!(output.financed_amount, 262_200.0);
        assert_eq!(output.amortization_schedule[0].opening_balance, 262_200.0);
        let principal: f64 = output.amortization_schedule.iter().map(|r| r.principal).sum();
        assert_abs_diff_eq!(principal, 262_200.0, epsilon = 0.01);
    }

    #[test]
    fn test_charges() {
        let input = SimulationInput::new(100_000.0, RateType::Tea, 0.10, 60)
            .with_insurance(0.0005, 0.0024)
            .with_fees(12.5);
        let output = engine().simulate(&input).unwrap();
        let first = &output.amortization_schedule[0];

        assert_abs_diff_eq!(first.life_insurance, 50.0, epsilon = 1e-9);
        // Without a property value the balance is insured
        assert_abs_diff_eq!(first.risk_insurance, 20.0, epsilon = 1e-9);
        assert_eq!(first.fees, 12.5);

        let expected_cost = output.total_interest
            + output.total_life_insurance
            + output.total_risk_insurance
            + output.total_fees;
        assert_abs_diff_eq!(output.total_cost, expected_cost, epsilon = 1e-9);
        assert_abs_diff_eq!(output.total_fees, 750.0, epsilon = 1e-9);
    }

    #[test]
    fn test_risk_insurance_on_property_value() {
        let input = SimulationInput::new(100_000.0, RateType::Tea, 0.10, 60)
            .with_insurance(0.0, 0.0024)
            .with_property_value(150_000.0);
        let output = engine().simulate(&input).unwrap();

        for row in &output.amortization_schedule {
            assert_abs_diff_eq!(row.risk_insurance, 30.0, epsilon = 1e-9);
        }
    }

    #[test]
    fn test_zero_rate() {
        let input = SimulationInput::new(12_000.0, RateType::Tea, 0.0, 12);
        let output = engine().simulate(&input).unwrap();

        assert_eq!(output.tem, 0.0);
        assert_abs_diff_eq!(output.monthly_payment, 1_000.0, epsilon = 1e-9);
        assert_eq!(output.total_interest, 0.0);
        assert_eq!(output.final_balance(), 0.0);
    }

    #[test]
    fn test_due_dates() {
        let start = NaiveDate::from_ymd_opt(2025, 1, 31).unwrap();
        let input = SimulationInput::new(10_000.0, RateType::Tea, 0.12, 3).with_start_date(start);
        let output = engine().simulate(&input).unwrap();
        let dates: Vec<_> = output
            .amortization_schedule
            .iter()
            .map(|r| r.due_date.unwrap())
            .collect();

        assert_eq!(dates[0], NaiveDate::from_ymd_opt(2025, 2, 28).unwrap());
        assert_eq!(dates[1], NaiveDate::from_ymd_opt(2025, 3, 31).unwrap());
        assert_eq!(dates[2], NaiveDate::from_ymd_opt(2025, 4, 30).unwrap());
    }

    #[test]
    fn test_validation_fails_fast() {
        let input = SimulationInput::new(100_000.0, RateType::Tea, 0.12, 12).with_bonus(150_000.0);
        let err = engine().simulate(&input).unwrap_err();
        assert!(matches!(err, SimulationError::InvalidBonus(_)));
    }

    fn starved_config() -> EngineConfig {
        EngineConfig {
            irr: IrrConfig {
                tolerance: 1e-15,
                max_iterations: 1,
            },
            ..Default::default()
        }
    }

    #[test]
    fn test_convergence_failure_aborts() {
        let input = SimulationInput::new(100_000.0, RateType::Tea, 0.12, 12);
        let err = AmortizationEngine::new(starved_config()).simulate(&input).unwrap_err();
        assert!(matches!(err, SimulationError::ConvergenceError { metric: "TCEA", .. }));
    }

    #[test]
    fn test_convergence_failure_marked_unavailable() {
        let config = starved_config().with_failure_policy(MetricFailurePolicy::MarkUnavailable);
        let input = SimulationInput::new(100_000.0, RateType::Tea, 0.12, 12);
        let output = AmortizationEngine::new(config).simulate(&input).unwrap();

        assert!(output.tcea.is_none());
        assert!(output.tir.is_none());
        assert_eq!(output.unavailable_metrics.len(), 2);
        assert_eq!(output.unavailable_metrics[0].metric, "TCEA");
        // The schedule itself is still complete
        assert_eq!(output.amortization_schedule.len(), 12);
        assert_eq!(output.final_balance(), 0.0);
    }

    #[test]
    fn test_policy_from_str() {
        assert_eq!("fail".parse::<MetricFailurePolicy>().unwrap(), MetricFailurePolicy::Fail);
        assert_eq!(
            "mark-unavailable".parse::<MetricFailurePolicy>().unwrap(),
            MetricFailurePolicy::MarkUnavailable
        );
        assert!("ignore".parse::<MetricFailurePolicy>().is_err());
    }

    #[test]
    fn test_config_defaults_from_partial_json() {
        let config: EngineConfig =
            serde_json::from_str(r#"{"metric_failure_policy": "mark_unavailable"}"#).unwrap();
        assert_eq!(config.metric_failure_policy, MetricFailurePolicy::MarkUnavailable);
        assert_eq!(config.irr, IrrConfig::default());
        assert_eq!(config.rounding_tolerance, 0.01);
    }
}
