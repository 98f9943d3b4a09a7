//! Mortgage Simulator - amortization engine for fixed-rate mortgage loans
//!
//! This library provides:
//! - TEA/TNA to monthly effective rate conversion
//! - French-method schedules with total or partial grace periods
//! - MiVivienda bonus, life and property insurance and monthly fees
//! - TCEA, VAN and TIR metrics
//! - Two-sheet report export (summary and schedule)
//! - Typed roles, permissions and an explicit session
//! - Parallel batch runs over CSV inputs

pub mod error;
pub mod simulation;
pub mod schedule;
pub mod metrics;
pub mod export;
pub mod domain;
pub mod session;
pub mod scenario;

// Re-export commonly used types
pub use error::{Result, SimulationError};
pub use simulation::{Currency, GraceType, RateType, Simulation, SimulationInput};
pub use schedule::{AmortizationEngine, AmortizationItem, EngineConfig, MetricFailurePolicy, SimulationOutput};
pub use metrics::IrrConfig;
pub use export::{build_workbook, ExportContext, Workbook};
pub use session::{Permission, Role, Session};
pub use scenario::SimulationRunner;
