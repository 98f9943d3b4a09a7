//! Resources exchanged with the backend: clients, properties, banks and users

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use crate::session::Role;
use crate::simulation::{Currency, RateType};

#[derive(Deserialize)]
#[serde(untagged)]
enum RawId {
    Number(i64),
    Text(String),
}

/// Identifiers arrive as numbers from some endpoints and as strings from others
pub(crate) fn id_from_number_or_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match RawId::deserialize(deserializer)? {
        RawId::Number(id) => id.to_string(),
        RawId::Text(id) => id,
    })
}

/// A prospective borrower
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Client {
    pub id: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub full_name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub annual_income: f64,
    #[serde(default)]
    pub created_by_user_name: String,
    #[serde(default)]
    pub created_at_utc: Option<DateTime<Utc>>,
}

impl Client {
    /// Full name as sent by the backend, or first and last name joined
    pub fn display_name(&self) -> String {
        if !self.full_name.is_empty() {
            return self.full_name.clone();
        }
        format!("{} {}", self.first_name, self.last_name).trim().to_string()
    }
}

/// Image attached to a property listing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropertyImage {
    pub id: String,
    pub url: String,
}

/// A property listing a simulation may reference
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Property {
    pub id: String,
    #[serde(default)]
    pub code: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub district: String,
    #[serde(default)]
    pub province: String,
    /// Backend code: 1 = house, 2 = apartment, ...
    #[serde(rename = "type", default = "default_property_type")]
    pub property_type: u8,
    #[serde(default)]
    pub area_m2: f64,
    #[serde(default)]
    pub price: f64,
    #[serde(default)]
    pub currency: Currency,
    #[serde(default)]
    pub images: Vec<PropertyImage>,
    /// Plain image URLs, as sent when creating or editing
    #[serde(default)]
    pub images_url: Vec<String>,
    #[serde(default)]
    pub created_by: String,
    #[serde(default)]
    pub consults_count: u32,
    #[serde(default)]
    pub created_at_utc: Option<DateTime<Utc>>,
}

fn default_property_type() -> u8 {
    1
}

/// A bank publishing a reference rate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Bank {
    #[serde(default, deserialize_with = "id_from_number_or_string")]
    pub id: String,
    pub name: String,
    pub annual_rate_tea: f64,
    #[serde(default)]
    pub annual_rate_tna: Option<f64>,
    #[serde(default)]
    pub effective_from: Option<NaiveDate>,
}

/// Write shape of a bank for create/update requests
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BankResource {
    pub name: String,
    pub annual_rate_tea: f64,
    pub effective_from: Option<NaiveDate>,
}

impl Bank {
    pub fn to_resource(&self) -> BankResource {
        BankResource {
            name: self.name.clone(),
            annual_rate_tea: self.annual_rate_tea,
            effective_from: self.effective_from,
        }
    }
}

/// Financial entity as managed from the settings screen
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FinancialEntity {
    #[serde(default, deserialize_with = "id_from_number_or_string")]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub annual_rate_tea: f64,
    #[serde(default)]
    pub annual_rate_tna: Option<f64>,
    #[serde(default)]
    pub effective_from: Option<NaiveDate>,
    #[serde(default = "default_active")]
    pub is_active: bool,
}

fn default_active() -> bool {
    true
}

impl FinancialEntity {
    /// Rate source view of the entity; inactive entities publish no rate
    pub fn as_bank(&self) -> Option<Bank> {
        if !self.is_active {
            return None;
        }
        Some(Bank {
            id: self.id.clone(),
            name: self.name.clone(),
            annual_rate_tea: self.annual_rate_tea,
            annual_rate_tna: self.annual_rate_tna,
            effective_from: self.effective_from,
        })
    }
}

/// An application user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub username: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub dni: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
    pub role: Role,
    #[serde(default)]
    pub default_currency: Currency,
    #[serde(default)]
    pub default_rate_type: RateType,
    #[serde(default)]
    pub created_at_utc: Option<DateTime<Utc>>,
}
