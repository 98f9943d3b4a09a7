//! Dashboard report rows served under `/reports`

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::assembler::entities_from_response;
use super::entities::id_from_number_or_string;
use crate::error::Result;
use crate::simulation::Currency;

/// Report endpoints exposed by the backend
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportEndpoint {
    Summary,
    MostConsultedProperties,
    SimulationsByMonth,
    EntitySelection,
    PropertyConsultsByMonth,
}

impl ReportEndpoint {
    pub const ALL: [ReportEndpoint; 5] = [
        ReportEndpoint::Summary,
        ReportEndpoint::MostConsultedProperties,
        ReportEndpoint::SimulationsByMonth,
        ReportEndpoint::EntitySelection,
        ReportEndpoint::PropertyConsultsByMonth,
    ];

    pub fn path(&self) -> &'static str {
        match self {
            ReportEndpoint::Summary => "/reports/summary",
            ReportEndpoint::MostConsultedProperties => "/reports/most-consulted-properties",
            ReportEndpoint::SimulationsByMonth => "/reports/simulations-by-month",
            ReportEndpoint::EntitySelection => "/reports/entity-selection",
            ReportEndpoint::PropertyConsultsByMonth => "/reports/property-consults-by-month",
        }
    }
}

/// One row of the most consulted properties ranking
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TopProperty {
    #[serde(default, deserialize_with = "id_from_number_or_string")]
    pub property_id: String,
    #[serde(default)]
    pub code: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub price: f64,
    #[serde(default)]
    pub currency: Currency,
    #[serde(default)]
    pub consult_count: u32,
}

/// Simulation volume for one calendar month
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulationsByMonth {
    #[serde(default)]
    pub year: i32,
    #[serde(default)]
    pub month: u32,
    #[serde(default)]
    pub count: u32,
    #[serde(default)]
    pub total_amount: f64,
    #[serde(default)]
    pub average_amount: f64,
}

impl SimulationsByMonth {
    /// Average as sent, or total over count when the backend leaves it at zero
    pub fn average(&self) -> f64 {
        if self.average_amount > 0.0 || self.count == 0 {
            self.average_amount
        } else {
            self.total_amount / self.count as f64
        }
    }
}

pub fn top_properties_from_response(response: Value) -> Result<Vec<TopProperty>> {
    let mut rows: Vec<TopProperty> = entities_from_response(response)?;
    rows.sort_by(|a, b| b.consult_count.cmp(&a.consult_count));
    Ok(rows)
}

/// Monthly rows in chronological order
pub fn simulations_by_month_from_response(response: Value) -> Result<Vec<SimulationsByMonth>> {
    let mut rows: Vec<SimulationsByMonth> = entities_from_response(response)?;
    rows.sort_by_key(|row| (row.year, row.month));
    Ok(rows)
}
