//! Load simulation inputs from CSV for batch runs

use std::path::Path;

use chrono::NaiveDate;
use csv::Reader;

use super::{Currency, GraceType, RateType, SimulationInput};
use crate::error::{Result, SimulationError};

/// Raw CSV row; the rate column is read as TEA or TNA according to `RateType`
#[derive(Debug, serde::Deserialize)]
struct CsvRow {
    #[serde(rename = "SimulationID")]
    simulation_id: String,
    #[serde(rename = "Principal")]
    principal: f64,
    #[serde(rename = "Currency")]
    currency: u8,
    #[serde(rename = "RateType")]
    rate_type: u8,
    #[serde(rename = "Rate")]
    rate: f64,
    #[serde(rename = "CapitalizationPerYear")]
    capitalization_per_year: Option<u32>,
    #[serde(rename = "TermMonths")]
    term_months: i32,
    #[serde(rename = "GraceType")]
    grace_type: u8,
    #[serde(rename = "GraceMonths")]
    grace_months: i32,
    #[serde(rename = "BonusAmount")]
    bonus_amount: Option<f64>,
    #[serde(rename = "LifeInsuranceRateMonthly")]
    life_insurance_rate_monthly: f64,
    #[serde(rename = "RiskInsuranceRateAnnual")]
    risk_insurance_rate_annual: f64,
    #[serde(rename = "FeesMonthly")]
    fees_monthly: f64,
    #[serde(rename = "PropertyValue")]
    property_value: Option<f64>,
    #[serde(rename = "StartDate")]
    start_date: Option<NaiveDate>,
}

/// A simulation input tagged with the identifier it was loaded under
#[derive(Debug, Clone)]
pub struct LoadedInput {
    pub simulation_id: String,
    pub input: SimulationInput,
}

impl CsvRow {
    fn to_input(self) -> Result<LoadedInput> {
        let currency = Currency::try_from(self.currency)?;
        let rate_type = RateType::try_from(self.rate_type)?;
        let grace_type = GraceType::try_from(self.grace_type)?;

        let mut input = SimulationInput::new(self.principal, rate_type, self.rate, self.term_months)
            .with_currency(currency)
            .with_grace(grace_type, self.grace_months)
            .with_insurance(self.life_insurance_rate_monthly, self.risk_insurance_rate_annual)
            .with_fees(self.fees_monthly);

        input.capitalization_per_year = self.capitalization_per_year;
        input.property_value = self.property_value;
        input.start_date = self.start_date;

        match self.bonus_amount {
            Some(bonus) if bonus != 0.0 => input = input.with_bonus(bonus),
            _ => {}
        }

        Ok(LoadedInput {
            simulation_id: self.simulation_id,
            input,
        })
    }
}

/// Load all simulation inputs from a CSV file
pub fn load_inputs<P: AsRef<Path>>(path: P) -> Result<Vec<LoadedInput>> {
    let reader = Reader::from_path(path)?;
    collect_rows(reader)
}

/// Load simulation inputs from any reader (e.g., string buffer, request body)
pub fn load_inputs_from_reader<R: std::io::Read>(reader: R) -> Result<Vec<LoadedInput>> {
    collect_rows(Reader::from_reader(reader))
}

fn collect_rows<R: std::io::Read>(mut reader: Reader<R>) -> Result<Vec<LoadedInput>> {
    let mut inputs = Vec::new();

    for (line, result) in reader.deserialize().enumerate() {
        let row: CsvRow = result?;
        let loaded = row.to_input().map_err(|err| {
            SimulationError::invalid_input(&format!("row {}", line + 1), err.to_string())
        })?;
        inputs.push(loaded);
    }

    Ok(inputs)
}
