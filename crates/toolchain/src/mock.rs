use crate::{DirectiveMap, Stage, Toolchain, ToolchainError};
use std::collections::VecDeque;
use std::time::Duration;

/// Scripted toolchain for tests.
///
/// Each call to [`Toolchain::evaluate`] records its directives and returns
/// the next queued runtime, or `default_runtime` once the queue is empty.
#[derive(Debug, Clone)]
pub struct MockToolchain {
    pub default_runtime: Duration,
    runtimes: VecDeque<Duration>,
    failure: Option<(usize, Stage)>,
    calls: Vec<DirectiveMap>,
}

impl MockToolchain {
    #[must_use]
    pub fn new(default_runtime: Duration) -> Self {
        Self {
            default_runtime,
            runtimes: VecDeque::new(),
            failure: None,
            calls: Vec::new(),
        }
    }

    /// Queues runtimes returned by successive evaluations.
    #[must_use]
    pub fn with_runtimes(mut self, runtimes: impl IntoIterator<Item = Duration>) -> Self {
        self.runtimes.extend(runtimes);
        self
    }

    /// Makes the evaluation with zero-based index `call` fail in `stage`.
    #[must_use]
    pub fn failing_at(mut self, call: usize, stage: Stage) -> Self {
        self.failure = Some((call, stage));
        self
    }

    /// Directive maps received so far, oldest first.
    #[must_use]
    pub fn calls(&self) -> &[DirectiveMap] {
        &self.calls
    }
}

impl Toolchain for MockToolchain {
    fn evaluate(&mut self, directives: &DirectiveMap) -> Result<Duration, ToolchainError> {
        let call = self.calls.len();
        self.calls.push(directives.clone());
        match self.failure {
            Some((at, stage)) if at == call => Err(match stage {
                Stage::Execute => ToolchainError::Execution { code: Some(1) },
                stage => ToolchainError::Stage {
                    stage,
                    code: Some(1),
                    stderr: format!("mock failure in {stage}"),
                },
            }),
            _ => Ok(self.runtimes.pop_front().unwrap_or(self.default_runtime)),
        }
    }
}
