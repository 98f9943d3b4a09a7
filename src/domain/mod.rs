pub mod assembler;
mod entities;
pub mod reports;

pub use assembler::{entities_from_response, entities_from_str, entity_from_resource};
pub use entities::{Bank, BankResource, Client, FinancialEntity, Property, PropertyImage, User};
pub use reports::{ReportEndpoint, SimulationsByMonth, TopProperty};
