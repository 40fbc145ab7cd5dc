pub mod settings;

pub use settings::{BridgeConfig, SessionTimings, DEFAULT_HTTP_PORT};
