//! Simulation inputs, validation and CSV loading

mod data;
mod terms;
pub mod loader;

pub use data::{Currency, GraceType, RateType, Simulation, SimulationInput};
pub use terms::{LoanTerms, MAX_TERM_MONTHS};
pub use loader::{load_inputs, load_inputs_from_reader, LoadedInput};
