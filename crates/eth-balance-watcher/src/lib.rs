use serde::{Deserialize, Serialize};

pub mod balance;
mod environment_variables;
pub use environment_variables::*;
pub mod metrics;
pub mod monitor;
pub mod server;
mod wallet;
pub use wallet::*;

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
pub struct HealthResponse {
    pub status: String,
}

impl HealthResponse {
    pub fn healthy() -> Self {
        Self {
            status: "healthy".to_string(),
        }
    }
}
