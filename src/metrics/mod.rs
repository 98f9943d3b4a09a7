//! Financial metrics: IRR-based TCEA and TIR, VAN and cost totals

mod irr;
mod discount;
mod calculator;

pub use irr::{annualize_monthly, calculate_irr, npv_at_rate, IrrConfig};
pub use discount::{npv, DiscountRate, PVCalculator};
pub use calculator::{MetricsCalculator, TCEA, TIR};
