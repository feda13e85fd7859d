pub mod adapters;
pub mod config_manager;

pub use adapters::{ConfigSource, FileConfigSource};
pub use config_manager::AdapterConfig;
