// ABOUTME: Docker integration for the geodesic session container

pub mod invoker;
pub mod runtime;

pub use invoker::{exec_args, run_args, LOGIN_SHELL};
pub use runtime::{ContainerRuntime, DockerCli, RuntimeError};
