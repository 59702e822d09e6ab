// ABOUTME: Runtime configuration for a launcher invocation
// Settings file, layered variable lookup and resolution into a RuntimeConfig

pub mod error;
pub mod resolver;
pub mod settings;
pub mod vars;

pub use error::ConfigError;
pub use resolver::{resolve, RuntimeConfig};
pub use settings::Settings;
pub use vars::{Environment, Vars};
