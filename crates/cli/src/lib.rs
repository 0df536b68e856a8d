//! Library interface for the receval CLI
//!
//! Exposes operator selection and sweep wiring so they can be tested apart
//! from the binary in main.rs.

pub mod selection;
pub mod sweep;

pub use selection::{resolve_selection, SweepSelection};
pub use sweep::{build_grid, run_sweep};
