//! Partner logistics dashboard engine: loads the scorecard and map documents,
//! derives the report views (filters, aggregates, rankings, projections) and
//! shapes them for console tables and file exports.

pub mod filter;
pub mod loader;
pub mod metrics;
pub mod output;
pub mod present;
pub mod ranking;
pub mod region;
pub mod series;
pub mod state;
pub mod types;
pub mod util;
