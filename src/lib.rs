// ABOUTME: Library crate for the geodesic launcher exposing public API for testing and external use

pub mod cli;
pub mod config;
pub mod docker;
pub mod error;
pub mod platform;
pub mod session;

pub use error::LauncherError;
pub use session::launch;
