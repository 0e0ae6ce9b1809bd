use crate::StepInfo;
use std::time::Duration;
use toolchain::{DirectiveMap, Toolchain, ToolchainError};

/// A toolchain paired with the baseline runtime it measured up front.
///
/// The baseline is the unmodified program (empty directive map) and never
/// changes afterwards.
pub struct Calibrated<T> {
    toolchain: T,
    baseline: Duration,
}

/// Outcome of one scored evaluation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct Trial {
    pub reward: f64,
    pub info: StepInfo,
}

impl<T: Toolchain> Calibrated<T> {
    /// Runs the baseline evaluation.
    ///
    /// # Errors
    ///
    /// Propagates the baseline run's failure; there is no environment
    /// without a baseline.
    pub fn new(mut toolchain: T) -> Result<Self, ToolchainError> {
        let baseline = toolchain.evaluate(&DirectiveMap::new())?;
        tracing::info!("[baseline] runtime: {:.4}s", baseline.as_secs_f64());
        Ok(Self { toolchain, baseline })
    }

    /// Baseline runtime in seconds.
    #[must_use]
    pub fn baseline_time(&self) -> f64 {
        self.baseline.as_secs_f64()
    }

    #[must_use]
    pub fn toolchain(&self) -> &T {
        &self.toolchain
    }

    /// Evaluates `directives`; positive reward means faster than baseline.
    pub(crate) fn trial(&mut self, directives: &DirectiveMap) -> Result<Trial, ToolchainError> {
        let runtime = self.toolchain.evaluate(directives)?.as_secs_f64();
        tracing::info!("[trial] runtime: {runtime:.4}s");
        Ok(Trial {
            reward: self.baseline_time() - runtime,
            info: StepInfo { runtime },
        })
    }
}
