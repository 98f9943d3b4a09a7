//! Simulation runner for single, batch and rate-sensitivity runs
//!
//! Holds one engine configuration and reuses it across many simulations.

use rayon::prelude::*;

use crate::error::Result;
use crate::schedule::{AmortizationEngine, EngineConfig, SimulationOutput};
use crate::simulation::{LoadedInput, RateType, SimulationInput};

/// Pre-configured runner for batch simulations
///
/// # Example
/// ```ignore
/// let runner = SimulationRunner::new(EngineConfig::default());
///
/// // Same loan under three alternative TEAs
/// let results = runner.run_rate_scenarios(&input, &[0.08, 0.10, 0.12]);
/// ```
#[derive(Debug, Clone, Default)]
pub struct SimulationRunner {
    engine: AmortizationEngine,
}

/// Outcome of one input in a batch
#[derive(Debug)]
pub struct BatchResult {
    pub simulation_id: String,
    pub result: Result<SimulationOutput>,
}

impl SimulationRunner {
    pub fn new(config: EngineConfig) -> Self {
        Self {
            engine: AmortizationEngine::new(config),
        }
    }

    pub fn config(&self) -> &EngineConfig {
        self.engine.config()
    }

    /// Run a single simulation
    pub fn run(&self, input: &SimulationInput) -> Result<SimulationOutput> {
        self.engine.simulate(input)
    }

    /// Run every input in parallel; one result per input, in input order
    pub fn run_batch(&self, inputs: &[LoadedInput]) -> Vec<BatchResult> {
        log::info!("Running {} simulations", inputs.len());

        let results: Vec<BatchResult> = inputs
            .par_iter()
            .map(|loaded| BatchResult {
                simulation_id: loaded.simulation_id.clone(),
                result: self.engine.simulate(&loaded.input),
            })
            .collect();

        let failed = results.iter().filter(|r| r.result.is_err()).count();
        log::info!("Batch complete: {} ok, {} failed", results.len() - failed, failed);
        results
    }

    /// Run the same loan under alternative effective annual rates
    pub fn run_rate_scenarios(
        &self,
        input: &SimulationInput,
        teas: &[f64],
    ) -> Vec<Result<SimulationOutput>> {
        teas.par_iter()
            .map(|&tea| {
                let mut scenario = input.clone();
                scenario.rate_type = RateType::Tea;
                scenario.tea = Some(tea);
                scenario.tna = None;
                self.engine.simulate(&scenario)
            })
            .collect()
    }
}
