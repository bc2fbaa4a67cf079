pub mod constants;
pub mod settings;

pub use settings::{AdminConfig, Config, LoggingConfig, SessionConfig};
