//! Property tests over generated loans

use approx::assert_abs_diff_eq;
use proptest::prelude::*;

use mortgage_simulator::metrics::calculate_irr;
use mortgage_simulator::schedule::rates::{tea_to_tem, tem_to_tea};
use mortgage_simulator::schedule::PeriodPhase;
use mortgage_simulator::{
    AmortizationEngine, GraceType, IrrConfig, RateType, SimulationError, SimulationInput,
    SimulationOutput,
};

fn simulate(input: &SimulationInput) -> SimulationOutput {
    AmortizationEngine::default()
        .simulate(input)
        .expect("generated input should simulate")
}

fn grace_type() -> impl Strategy<Value = GraceType> {
    prop_oneof![
        Just(GraceType::None),
        Just(GraceType::Total),
        Just(GraceType::Partial),
    ]
}

prop_compose! {
    fn loan()(
        principal in 10_000.0f64..2_000_000.0,
        tea in 0.01f64..0.35,
        term in 12i32..=360,
        grace in grace_type(),
        grace_frac in 0.0f64..0.1,
        life in 0.0f64..0.001,
        fees in 0.0f64..30.0,
    ) -> SimulationInput {
        let grace_months = ((term as f64) * grace_frac).floor() as i32;
        SimulationInput::new(principal, RateType::Tea, tea, term)
            .with_grace(grace, grace_months)
            .with_insurance(life, 0.003)
            .with_fees(fees)
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn schedule_closes_at_zero(input in loan()) {
        let output = simulate(&input);
        prop_assert_eq!(output.amortization_schedule.len(), input.term_months as usize);
        prop_assert_eq!(output.final_balance(), 0.0);
    }

    #[test]
    fn principal_repays_financed_amount(input in loan()) {
        let output = simulate(&input);
        let items = &output.amortization_schedule;

        let capitalized: f64 = items
            .iter()
            .filter(|item| item.phase == PeriodPhase::TotalGrace)
            .map(|item| item.interest)
            .sum();
        let repaid: f64 = items.iter().map(|item| item.principal).sum();

        prop_assert!((repaid - (output.financed_amount + capitalized)).abs() <= 0.01);
    }

    #[test]
    fn balances_chain(input in loan()) {
        let output = simulate(&input);
        for pair in output.amortization_schedule.windows(2) {
            prop_assert!((pair[1].opening_balance - pair[0].closing_balance).abs() < 1e-9);
        }
        for item in &output.amortization_schedule {
            let expected = item.opening_balance + item.interest - item.installment;
            prop_assert!((item.closing_balance - expected).abs() < 1e-6 * item.opening_balance.max(1.0));
        }
    }

    #[test]
    fn grace_rows_defer_principal(input in loan()) {
        let output = simulate(&input);
        for item in &output.amortization_schedule {
            match item.phase {
                PeriodPhase::TotalGrace => {
                    prop_assert_eq!(item.principal, 0.0);
                    prop_assert!(item.closing_balance > item.opening_balance);
                }
                PeriodPhase::PartialGrace => {
                    prop_assert_eq!(item.principal, 0.0);
                    prop_assert_eq!(item.closing_balance, item.opening_balance);
                }
                PeriodPhase::Amortizing => {}
            }
        }
    }

    #[test]
    fn tir_matches_tem(input in loan()) {
        let output = simulate(&input);
        let tir = output.tir.expect("tir should converge");
        prop_assert!((tir - output.tem).abs() < 1e-6);
    }

    #[test]
    fn tea_tem_round_trip(tea in 0.0f64..2.0) {
        let tem = tea_to_tem(tea).unwrap();
        prop_assert!((tem_to_tea(tem) - tea).abs() < 1e-9);
    }
}

#[test]
fn reference_loans() {
    let tea = simulate(&SimulationInput::new(100_000.0, RateType::Tea, 0.12, 12));
    assert_abs_diff_eq!(tea.tem, 0.009489, epsilon = 1e-6);
    assert_abs_diff_eq!(tea.monthly_payment, 8_856.21, epsilon = 0.01);

    let tna = simulate(
        &SimulationInput::new(100_000.0, RateType::Tna, 0.12, 12).with_capitalization(12),
    );
    assert_abs_diff_eq!(tna.tem, 0.01, epsilon = 1e-12);
    assert_abs_diff_eq!(tna.monthly_payment, 8_884.88, epsilon = 0.01);
}

#[test]
fn invalid_inputs_fail_fast() {
    let engine = AmortizationEngine::default();

    let bonus = SimulationInput::new(100_000.0, RateType::Tea, 0.1, 120).with_bonus(150_000.0);
    assert!(matches!(engine.simulate(&bonus), Err(SimulationError::InvalidBonus(_))));

    let rate = SimulationInput::new(100_000.0, RateType::Tea, -0.05, 120);
    assert!(matches!(engine.simulate(&rate), Err(SimulationError::InvalidRate(_))));
}

#[test]
fn irr_reference_cashflows() {
    let irr = calculate_irr(&[-10_000.0, 3_000.0, 4_200.0, 6_800.0], &IrrConfig::default(), "IRR")
        .unwrap();
    assert_abs_diff_eq!(irr, 0.1634056007, epsilon = 1e-6);
}
