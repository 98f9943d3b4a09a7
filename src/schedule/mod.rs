//! Amortization schedule generation: rate conversion, grace periods and the French method

pub mod rates;
mod grace;
mod state;
mod items;
mod engine;

pub use grace::{GracePolicy, GraceStep, PeriodPhase};
pub use state::ScheduleState;
pub use items::{
    AmortizationItem, AmortizationSchedule, ScheduleTotals, SimulationOutput, UnavailableMetric,
};
pub use engine::{AmortizationEngine, EngineConfig, MetricFailurePolicy};
