//! Mortgage Simulator CLI
//!
//! Command-line interface for running mortgage simulations and exporting reports

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand, ValueEnum};
use serde::de::DeserializeOwned;

use mortgage_simulator::domain::{Bank, Client, Property};
use mortgage_simulator::export::{self, ExportContext};
use mortgage_simulator::{
    AmortizationEngine, Currency, EngineConfig, GraceType, MetricFailurePolicy, RateType,
    Simulation, SimulationInput, SimulationOutput,
};

#[derive(Parser, Debug)]
#[command(name = "mortgage-sim", version, about = "Mortgage loan simulator")]
struct Cli {
    /// Engine configuration file (JSON); environment overrides still apply
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Mark metrics that fail to converge as unavailable instead of failing
    #[arg(long, global = true)]
    allow_unavailable_metrics: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Simulate an input read from a JSON file
    Simulate(SimulateArgs),
    /// Simulate a loan described on the command line
    Quick(QuickArgs),
    /// Export a stored simulation record to CSV or JSON
    Export(ExportArgs),
}

#[derive(Args, Debug)]
struct SimulateArgs {
    /// Simulation input (camelCase JSON)
    #[arg(short = 'i', long)]
    input: PathBuf,

    /// Bank whose published rate the simulation borrows
    #[arg(long)]
    bank: Option<PathBuf>,

    /// Print the full output as JSON instead of a table
    #[arg(long)]
    json: bool,

    /// Write the report into this directory
    #[arg(long)]
    export_dir: Option<PathBuf>,

    /// Client name shown in the report
    #[arg(long)]
    client_name: Option<String>,
}

#[derive(Copy, Clone, Debug, ValueEnum)]
enum RateArg {
    Tea,
    Tna,
}

#[derive(Copy, Clone, Debug, ValueEnum)]
enum GraceArg {
    None,
    Total,
    Partial,
}

#[derive(Args, Debug)]
struct QuickArgs {
    #[arg(long)]
    principal: f64,

    /// Annual rate as a decimal (0.12 for 12%)
    #[arg(long)]
    rate: f64,

    #[arg(long, value_enum, default_value = "tea")]
    rate_type: RateArg,

    /// Capitalization periods per year for a TNA
    #[arg(long)]
    capitalization: Option<u32>,

    #[arg(long)]
    term: i32,

    #[arg(long, value_enum, default_value = "none")]
    grace: GraceArg,

    #[arg(long, default_value_t = 0)]
    grace_months: i32,

    /// MiVivienda bonus amount
    #[arg(long)]
    bonus: Option<f64>,

    #[arg(long, default_value_t = 0.0)]
    life_insurance: f64,

    #[arg(long, default_value_t = 0.0)]
    risk_insurance: f64,

    #[arg(long, default_value_t = 0.0)]
    fees: f64,

    #[arg(long)]
    property_value: Option<f64>,

    /// Loans in US dollars instead of soles
    #[arg(long)]
    usd: bool,

    /// First due date is one month after this date (YYYY-MM-DD)
    #[arg(long)]
    start_date: Option<NaiveDate>,

    /// Number of schedule rows to print
    #[arg(long, default_value_t = 24)]
    rows: usize,
}

#[derive(Copy, Clone, Debug, ValueEnum)]
enum ExportFormat {
    Csv,
    Json,
}

#[derive(Args, Debug)]
struct ExportArgs {
    /// Simulation record (camelCase JSON); computed first when it has no output
    #[arg(short = 's', long)]
    simulation: PathBuf,

    #[arg(long)]
    client: Option<PathBuf>,

    #[arg(long)]
    property: Option<PathBuf>,

    #[arg(long)]
    bank: Option<PathBuf>,

    #[arg(short = 'o', long, default_value = ".")]
    out_dir: PathBuf,

    #[arg(long, value_enum, default_value = "csv")]
    format: ExportFormat,
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let file = File::open(path).with_context(|| format!("Failed to open {}", path.display()))?;
    serde_json::from_reader(BufReader::new(file))
        .with_context(|| format!("Failed to parse {}", path.display()))
}

fn read_optional<T: DeserializeOwned>(path: Option<&PathBuf>) -> Result<Option<T>> {
    path.map(|p| read_json(p)).transpose()
}

fn engine_config(cli: &Cli) -> Result<EngineConfig> {
    let mut config = match &cli.config {
        Some(path) => EngineConfig::from_json_file(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => EngineConfig::default(),
    }
    .with_env_overrides();

    if cli.allow_unavailable_metrics {
        config = config.with_failure_policy(MetricFailurePolicy::MarkUnavailable);
    }
    Ok(config)
}

fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();
    let engine = AmortizationEngine::new(engine_config(&cli)?);

    match &cli.command {
        Command::Simulate(args) => simulate(&engine, args),
        Command::Quick(args) => quick(&engine, args),
        Command::Export(args) => export_record(&engine, args),
    }
}

fn simulate(engine: &AmortizationEngine, args: &SimulateArgs) -> Result<()> {
    let mut input: SimulationInput = read_json(&args.input)?;
    let bank: Option<Bank> = read_optional(args.bank.as_ref())?;
    if let Some(bank) = &bank {
        input.apply_bank_rate(bank)?;
    }

    let output = engine.simulate(&input).context("Simulation failed")?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        print_summary(&input, &output);
        print_schedule(&output, usize::MAX, input.currency);
    }

    if let Some(dir) = &args.export_dir {
        let mut ctx = ExportContext::from_entities(None, None, bank.as_ref());
        ctx.client_name = args.client_name.clone();
        let simulation = Simulation::new(String::new(), input).with_output(output);
        let workbook = export::build_workbook(&simulation, &ctx);
        for path in export::write_csv(&workbook, dir)? {
            println!("Report written to {}", path.display());
        }
    }
    Ok(())
}

fn quick(engine: &AmortizationEngine, args: &QuickArgs) -> Result<()> {
    let rate_type = match args.rate_type {
        RateArg::Tea => RateType::Tea,
        RateArg::Tna => RateType::Tna,
    };
    let grace_type = match args.grace {
        GraceArg::None => GraceType::None,
        GraceArg::Total => GraceType::Total,
        GraceArg::Partial => GraceType::Partial,
    };

    let mut input = SimulationInput::new(args.principal, rate_type, args.rate, args.term)
        .with_grace(grace_type, args.grace_months)
        .with_insurance(args.life_insurance, args.risk_insurance)
        .with_fees(args.fees);
    if args.usd {
        input = input.with_currency(Currency::Usd);
    }
    if let Some(k) = args.capitalization {
        input = input.with_capitalization(k);
    }
    if let Some(bonus) = args.bonus {
        input = input.with_bonus(bonus);
    }
    if let Some(value) = args.property_value {
        input = input.with_property_value(value);
    }
    if let Some(date) = args.start_date {
        input = input.with_start_date(date);
    }

    let output = engine.simulate(&input).context("Simulation failed")?;
    print_summary(&input, &output);
    print_schedule(&output, args.rows, input.currency);
    Ok(())
}

fn export_record(engine: &AmortizationEngine, args: &ExportArgs) -> Result<()> {
    let mut simulation: Simulation = read_json(&args.simulation)?;
    let client: Option<Client> = read_optional(args.client.as_ref())?;
    let property: Option<Property> = read_optional(args.property.as_ref())?;
    let bank: Option<Bank> = read_optional(args.bank.as_ref())?;

    if !simulation.is_computed() {
        let output = engine
            .simulate(&simulation.simulation_input)
            .context("Simulation record could not be computed")?;
        simulation = simulation.with_output(output);
    }

    let mut ctx = ExportContext::from_entities(client.as_ref(), property.as_ref(), bank.as_ref());
    if let Some(created_at) = simulation.created_at {
        ctx = ctx.with_created_at(created_at);
    }

    let workbook = export::build_workbook(&simulation, &ctx);
    let paths = match args.format {
        ExportFormat::Csv => export::write_csv(&workbook, &args.out_dir)?,
        ExportFormat::Json => vec![export::write_json(&workbook, &args.out_dir)?],
    };
    if paths.is_empty() {
        bail!("Nothing was exported");
    }
    for path in paths {
        println!("Report written to {}", path.display());
    }
    Ok(())
}

fn print_summary(input: &SimulationInput, output: &SimulationOutput) {
    let currency = input.currency;
    let percent = |v: Option<f64>| export::format_percent(v);
    let money = |v: f64| export::format_currency(Some(v), currency);

    println!("Mortgage Simulator v{}", env!("CARGO_PKG_VERSION"));
    println!("========================\n");
    println!("  Financed amount: {}", money(output.financed_amount));
    println!("  TEM:             {}", percent(Some(output.tem)));
    println!("  Installment:     {}", money(output.monthly_payment));
    println!("  TCEA:            {}", percent(output.tcea));
    println!("  TIR (monthly):   {}", percent(output.tir));
    println!("  VAN:             {}", money(output.van));
    println!("  Total interest:  {}", money(output.total_interest));
    println!("  Total cost:      {}", money(output.total_cost));
    for metric in &output.unavailable_metrics {
        println!("  {} unavailable: {}", metric.metric, metric.reason);
    }
    println!();
}

fn print_schedule(output: &SimulationOutput, rows: usize, currency: Currency) {
    println!("Schedule ({} periods, {}):", output.amortization_schedule.len(), currency.symbol());
    println!(
        "{:>6} {:>11} {:>14} {:>12} {:>12} {:>12} {:>10} {:>14}",
        "Period", "Due", "Opening", "Interest", "Principal", "Installment", "Charges", "Closing"
    );
    println!("{}", "-".repeat(98));

    for item in output.amortization_schedule.iter().take(rows) {
        println!(
            "{:>6} {:>11} {:>14.2} {:>12.2} {:>12.2} {:>12.2} {:>10.2} {:>14.2}",
            item.period,
            export::format_date(item.due_date),
            item.opening_balance,
            item.interest,
            item.principal,
            item.installment,
            item.charges(),
            item.closing_balance,
        );
    }

    let remaining = output.amortization_schedule.len().saturating_sub(rows);
    if remaining > 0 {
        println!("... {} more periods", remaining);
    }
}
