pub mod manager;

pub use manager::SerialSession;

use serde::{Deserialize, Serialize};

/// Connection state as reported to the browser
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionStatus {
    pub connected: bool,
    pub port: Option<String>,
}
