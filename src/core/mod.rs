pub mod config;
pub mod error;
pub mod types;

pub use config::{ActionStyle, OracleConfig, PlannerConfig};
pub use error::{PlannerError, Result};
