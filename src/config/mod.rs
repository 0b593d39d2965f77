mod settings;
mod solver_config;

pub use settings::{LogFormat, Settings};
pub use solver_config::{ProviderConfig, SolverConfig};
