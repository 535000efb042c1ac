pub mod atlas;
pub mod results_db;
pub mod scheduler_db;
pub mod session;

pub use crate::domain::model::{AnchorSummary, CaMode, DatabaseSettings};
pub use crate::utils::error::Result;
