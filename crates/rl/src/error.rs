use features::ConfigurationError;
use thiserror::Error;
use toolchain::ToolchainError;

#[derive(Error, Debug)]
pub enum EnvError {
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),
    #[error(transparent)]
    Toolchain(#[from] ToolchainError),
    #[error("expected {expected} actions, one per loop, got {got}")]
    ActionArity { expected: usize, got: usize },
    #[error("all {n_loops} loops have been stepped; call reset")]
    EpisodeDone { n_loops: usize },
    #[error("loop index {idx} out of range for {n_loops} loops")]
    LoopIndex { idx: usize, n_loops: usize },
}
