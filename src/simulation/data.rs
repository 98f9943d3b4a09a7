//! Simulation data structures matching the backend's simulation resource

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::Bank;
use crate::error::{Result, SimulationError};
use crate::schedule::SimulationOutput;

/// Currency of the loan (wire codes 1 = PEN, 2 = USD)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum Currency {
    /// Peruvian soles
    #[default]
    Pen,
    /// US dollars
    Usd,
}

impl Currency {
    pub fn symbol(&self) -> &'static str {
        match self {
            Currency::Pen => "S/",
            Currency::Usd => "$",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Currency::Pen => "Soles (PEN)",
            Currency::Usd => "Dólares (USD)",
        }
    }
}

impl TryFrom<u8> for Currency {
    type Error = SimulationError;

    fn try_from(code: u8) -> Result<Self> {
        match code {
            1 => Ok(Currency::Pen),
            2 => Ok(Currency::Usd),
            other => Err(SimulationError::invalid_input(
                "currency",
                format!("unknown currency code {}", other),
            )),
        }
    }
}

impl From<Currency> for u8 {
    fn from(currency: Currency) -> u8 {
        match currency {
            Currency::Pen => 1,
            Currency::Usd => 2,
        }
    }
}

/// Kind of annual rate entered for the loan (wire codes 1 = TEA, 2 = TNA)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum RateType {
    /// Effective annual rate
    #[default]
    Tea,
    /// Nominal annual rate, capitalized `capitalization_per_year` times
    Tna,
}

impl RateType {
    pub fn label(&self) -> &'static str {
        match self {
            RateType::Tea => "TEA",
            RateType::Tna => "TNA",
        }
    }
}

impl TryFrom<u8> for RateType {
    type Error = SimulationError;

    fn try_from(code: u8) -> Result<Self> {
        match code {
            1 => Ok(RateType::Tea),
            2 => Ok(RateType::Tna),
            other => Err(SimulationError::InvalidRate(format!(
                "unknown rate type code {}",
                other
            ))),
        }
    }
}

impl From<RateType> for u8 {
    fn from(rate_type: RateType) -> u8 {
        match rate_type {
            RateType::Tea => 1,
            RateType::Tna => 2,
        }
    }
}

/// Grace period treatment (wire codes 0 = none, 1 = total, 2 = partial)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum GraceType {
    #[default]
    None,
    /// Nothing is collected; interest capitalizes
    Total,
    /// Interest is collected; principal is deferred
    Partial,
}

impl GraceType {
    /// Name shown in exported reports
    pub fn display_name(&self) -> &'static str {
        match self {
            GraceType::None => "Sin Gracia",
            GraceType::Total => "Total",
            GraceType::Partial => "Parcial",
        }
    }
}

impl TryFrom<u8> for GraceType {
    type Error = SimulationError;

    fn try_from(code: u8) -> Result<Self> {
        match code {
            0 => Ok(GraceType::None),
            1 => Ok(GraceType::Total),
            2 => Ok(GraceType::Partial),
            other => Err(SimulationError::InvalidTerm(format!(
                "unknown grace type code {}",
                other
            ))),
        }
    }
}

impl From<GraceType> for u8 {
    fn from(grace_type: GraceType) -> u8 {
        match grace_type {
            GraceType::None => 0,
            GraceType::Total => 1,
            GraceType::Partial => 2,
        }
    }
}

/// Input parameters of a mortgage simulation
///
/// Immutable once the simulation is created; the engine only reads it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulationInput {
    /// Amount requested, before the MiVivienda bonus
    pub principal: f64,

    #[serde(default)]
    pub currency: Currency,

    #[serde(default)]
    pub rate_type: RateType,

    /// Effective annual rate (used when `rate_type` is TEA)
    #[serde(default)]
    pub tea: Option<f64>,

    /// Nominal annual rate (used when `rate_type` is TNA)
    #[serde(default)]
    pub tna: Option<f64>,

    /// Capitalization periods per year for TNA (default 12)
    #[serde(default)]
    pub capitalization_per_year: Option<u32>,

    /// Loan term in months, grace included
    pub term_months: i32,

    #[serde(default)]
    pub grace_type: GraceType,

    #[serde(default)]
    pub grace_months: i32,

    #[serde(default)]
    pub apply_mi_vivienda_bonus: bool,

    #[serde(default)]
    pub bonus_amount: f64,

    /// Monthly life insurance rate applied to the opening balance
    #[serde(default)]
    pub life_insurance_rate_monthly: f64,

    /// Annual property insurance rate applied to the property value
    #[serde(default)]
    pub risk_insurance_rate_annual: f64,

    /// Flat monthly fees
    #[serde(default)]
    pub fees_monthly: f64,

    /// Insured property value; the opening balance is insured when absent
    #[serde(default)]
    pub property_value: Option<f64>,

    /// Effective annual discount rate for the VAN (defaults to the loan's TEA)
    #[serde(default)]
    pub discount_rate_annual: Option<f64>,

    #[serde(default)]
    pub start_date: Option<NaiveDate>,

    /// Bank whose published rate was borrowed, if any
    #[serde(default)]
    pub bank_id: Option<String>,
}

impl SimulationInput {
    /// Create an input with a manual rate and no grace, bonus, insurance or fees
    pub fn new(principal: f64, rate_type: RateType, annual_rate: f64, term_months: i32) -> Self {
        let (tea, tna) = match rate_type {
            RateType::Tea => (Some(annual_rate), None),
            RateType::Tna => (None, Some(annual_rate)),
        };

        Self {
            principal,
            currency: Currency::Pen,
            rate_type,
            tea,
            tna,
            capitalization_per_year: None,
            term_months,
            grace_type: GraceType::None,
            grace_months: 0,
            apply_mi_vivienda_bonus: false,
            bonus_amount: 0.0,
            life_insurance_rate_monthly: 0.0,
            risk_insurance_rate_annual: 0.0,
            fees_monthly: 0.0,
            property_value: None,
            discount_rate_annual: None,
            start_date: None,
            bank_id: None,
        }
    }

    /// Create an input whose rate will be borrowed from a bank
    pub fn without_rate(principal: f64, rate_type: RateType, term_months: i32) -> Self {
        let mut input = Self::new(principal, rate_type, 0.0, term_months);
        input.tea = None;
        input.tna = None;
        input
    }

    pub fn with_currency(mut self, currency: Currency) -> Self {
        self.currency = currency;
        self
    }

    pub fn with_capitalization(mut self, per_year: u32) -> Self {
        self.capitalization_per_year = Some(per_year);
        self
    }

    pub fn with_grace(mut self, grace_type: GraceType, grace_months: i32) -> Self {
        self.grace_type = grace_type;
        self.grace_months = grace_months;
        self
    }

    pub fn with_bonus(mut self, bonus_amount: f64) -> Self {
        self.apply_mi_vivienda_bonus = true;
        self.bonus_amount = bonus_amount;
        self
    }

    pub fn with_insurance(mut self, life_rate_monthly: f64, risk_rate_annual: f64) -> Self {
        self.life_insurance_rate_monthly = life_rate_monthly;
        self.risk_insurance_rate_annual = risk_rate_annual;
        self
    }

    pub fn with_fees(mut self, fees_monthly: f64) -> Self {
        self.fees_monthly = fees_monthly;
        self
    }

    pub fn with_property_value(mut self, value: f64) -> Self {
        self.property_value = Some(value);
        self
    }

    pub fn with_discount_rate(mut self, annual_rate: f64) -> Self {
        self.discount_rate_annual = Some(annual_rate);
        self
    }

    pub fn with_start_date(mut self, start_date: NaiveDate) -> Self {
        self.start_date = Some(start_date);
        self
    }

    /// The manually entered rate for the selected rate type, if any
    pub fn manual_rate(&self) -> Option<f64> {
        match self.rate_type {
            RateType::Tea => self.tea,
            RateType::Tna => self.tna,
        }
    }

    /// Borrow the annual rate published by a bank.
    ///
    /// A simulation either borrows a bank rate or carries a manual one, never both.
    /// TNA simulations fall back to the bank's TEA when it publishes no TNA.
    pub fn apply_bank_rate(&mut self, bank: &Bank) -> Result<()> {
        if let Some(rate) = self.manual_rate() {
            return Err(SimulationError::InvalidRate(format!(
                "manual rate {} already set; cannot also borrow the rate of bank '{}'",
                rate, bank.name
            )));
        }

        // A TNA of zero means the bank publishes none
        let published_tna = bank.annual_rate_tna.filter(|tna| *tna > 0.0);
        match (self.rate_type, published_tna) {
            (RateType::Tna, Some(tna)) => self.tna = Some(tna),
            (RateType::Tna, None) => {
                log::debug!(
                    "Bank '{}' publishes no TNA, switching simulation to its TEA",
                    bank.name
                );
                self.rate_type = RateType::Tea;
                self.tea = Some(bank.annual_rate_tea);
            }
            (RateType::Tea, _) => self.tea = Some(bank.annual_rate_tea),
        }

        self.bank_id = Some(bank.id.clone());
        Ok(())
    }
}

/// A persisted simulation: input parameters plus computed results
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Simulation {
    #[serde(default)]
    pub id: String,

    #[serde(default)]
    pub client_id: String,

    #[serde(default)]
    pub property_id: Option<String>,

    #[serde(default)]
    pub bank_id: Option<String>,

    pub simulation_input: SimulationInput,

    #[serde(default)]
    pub simulation_output: Option<SimulationOutput>,

    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl Simulation {
    /// Wrap an input for a client, not yet computed
    pub fn new(client_id: impl Into<String>, input: SimulationInput) -> Self {
        Self {
            id: String::new(),
            client_id: client_id.into(),
            property_id: None,
            bank_id: input.bank_id.clone(),
            simulation_input: input,
            simulation_output: None,
            created_at: None,
        }
    }

    pub fn with_output(mut self, output: SimulationOutput) -> Self {
        self.simulation_output = Some(output);
        self
    }

    pub fn is_computed(&self) -> bool {
        self.simulation_output.is_some()
    }
}
