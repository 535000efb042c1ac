pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::cli::{AgentArgs, CheckArgs};

pub use config::{AtlasMnsConfig, LoadReport, Parameter};
pub use core::session::AtlasMns;
pub use domain::model::{CaMode, DatabaseSettings};
pub use utils::error::{AtlasMnsError, Result};
