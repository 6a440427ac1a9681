//! Constants and helpers shared across the application.

pub mod constants;
pub mod utils;
