//! Run every simulation in a CSV file and write one summary row per simulation
//!
//! Usage: run_batch <inputs.csv> [output.csv]

use std::env;
use std::time::Instant;

use anyhow::{Context, Result};
use serde::Serialize;

use mortgage_simulator::scenario::BatchResult;
use mortgage_simulator::simulation::load_inputs;
use mortgage_simulator::{EngineConfig, SimulationRunner};

/// One line of the batch summary
#[derive(Debug, Serialize)]
struct SummaryRow {
    #[serde(rename = "SimulationID")]
    simulation_id: String,
    #[serde(rename = "Status")]
    status: &'static str,
    #[serde(rename = "FinancedAmount")]
    financed_amount: Option<f64>,
    #[serde(rename = "TEM")]
    tem: Option<f64>,
    #[serde(rename = "MonthlyPayment")]
    monthly_payment: Option<f64>,
    #[serde(rename = "TCEA")]
    tcea: Option<f64>,
    #[serde(rename = "VAN")]
    van: Option<f64>,
    #[serde(rename = "TIR")]
    tir: Option<f64>,
    #[serde(rename = "TotalInterest")]
    total_interest: Option<f64>,
    #[serde(rename = "TotalCost")]
    total_cost: Option<f64>,
    #[serde(rename = "Error")]
    error: String,
}

impl From<&BatchResult> for SummaryRow {
    fn from(batch: &BatchResult) -> Self {
        match &batch.result {
            Ok(out) => SummaryRow {
                simulation_id: batch.simulation_id.clone(),
                status: "ok",
                financed_amount: Some(out.financed_amount),
                tem: Some(out.tem),
                monthly_payment: Some(out.monthly_payment),
                tcea: out.tcea,
                van: Some(out.van),
                tir: out.tir,
                total_interest: Some(out.total_interest),
                total_cost: Some(out.total_cost),
                error: String::new(),
            },
            Err(e) => SummaryRow {
                simulation_id: batch.simulation_id.clone(),
                status: "error",
                financed_amount: None,
                tem: None,
                monthly_payment: None,
                tcea: None,
                van: None,
                tir: None,
                total_interest: None,
                total_cost: None,
                error: e.to_string(),
            },
        }
    }
}

fn main() -> Result<()> {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    let input_path = args
        .get(1)
        .context("Usage: run_batch <inputs.csv> [output.csv]")?;
    let output_path = args.get(2).map(String::as_str).unwrap_or("batch_summary.csv");

    let start = Instant::now();
    println!("Loading simulations from {}...", input_path);
    let inputs = load_inputs(input_path)
        .with_context(|| format!("Failed to load {}", input_path))?;
    println!("Loaded {} simulations in {:?}", inputs.len(), start.elapsed());

    let runner = SimulationRunner::new(EngineConfig::default().with_env_overrides());

    println!("Running simulations...");
    let run_start = Instant::now();
    let results = runner.run_batch(&inputs);
    println!("Simulations complete in {:?}", run_start.elapsed());

    let mut writer = csv::Writer::from_path(output_path)
        .with_context(|| format!("Failed to create {}", output_path))?;
    for result in &results {
        writer.serialize(SummaryRow::from(result))?;
    }
    writer.flush()?;
    println!("Output written to {}", output_path);

    let failed: Vec<&BatchResult> = results.iter().filter(|r| r.result.is_err()).collect();
    println!("\nBatch Summary:");
    println!("  Succeeded: {}", results.len() - failed.len());
    println!("  Failed:    {}", failed.len());
    for batch in failed.iter().take(10) {
        if let Err(e) = &batch.result {
            println!("    {}: {}", batch.simulation_id, e);
        }
    }

    println!("\nTotal time: {:?}", start.elapsed());
    Ok(())
}
