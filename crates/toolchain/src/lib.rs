#![deny(clippy::all, clippy::pedantic)]

//! Build-and-measure pipeline driven by vectorization directives.
//!
//! A [`Toolchain`] turns a [`DirectiveMap`] into one wall-clock
//! measurement. [`LlvmToolchain`] does this with `opt` and `clang` and a set
//! of well-known files in a working directory; the `mock` feature provides
//! a scripted stand-in for tests.

use std::fmt;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

mod config;
mod directive;
mod llvm;
#[cfg(feature = "mock")]
mod mock;

pub use config::{Tool, ToolchainConfig};
pub use directive::{Directive, DirectiveMap, InvalidDirective, VECTOR_WIDTHS};
pub use llvm::LlvmToolchain;
#[cfg(feature = "mock")]
pub use mock::MockToolchain;

/// The four strictly ordered steps of one evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    /// Directive application and feature regeneration.
    Apply,
    Vectorize,
    Compile,
    /// Running the produced binary under the timer.
    Execute,
}

impl Stage {
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Stage::Apply => "apply",
            Stage::Vectorize => "vectorize",
            Stage::Compile => "compile",
            Stage::Execute => "execute",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Error, Debug)]
pub enum ToolchainError {
    #[error("toolchain stage `{stage}` exited with code {code:?}: {stderr}")]
    Stage {
        stage: Stage,
        code: Option<i32>,
        stderr: String,
    },
    #[error("failed to launch `{stage}` stage: {source}")]
    Launch {
        stage: Stage,
        source: std::io::Error,
    },
    #[error("measured program exited with code {code:?}")]
    Execution { code: Option<i32> },
    #[error("measured program did not finish within {0:?}")]
    Timeout(Duration),
    #[error("failed to write directive file {path}: {source}")]
    DirectiveFile {
        path: PathBuf,
        source: std::io::Error,
    },
}

impl ToolchainError {
    /// The stage an error is attributed to, if any.
    #[must_use]
    pub fn stage(&self) -> Option<Stage> {
        match self {
            ToolchainError::Stage { stage, .. } | ToolchainError::Launch { stage, .. } => Some(*stage),
            ToolchainError::Execution { .. } | ToolchainError::Timeout(_) => Some(Stage::Execute),
            ToolchainError::DirectiveFile { .. } => Some(Stage::Apply),
        }
    }
}

pub trait Toolchain {
    /// Applies `directives`, rebuilds the program, runs it once and returns
    /// the elapsed wall-clock time of that run.
    ///
    /// An empty map evaluates the unmodified program. Implementations run
    /// their stages strictly in order and never retry: the first failure is
    /// returned as is. Taking `&mut self` keeps evaluations on one
    /// orchestrator from overlapping.
    ///
    /// # Errors
    ///
    /// Returns [`ToolchainError`] for a failing stage, a misbehaving measured
    /// program, or an I/O failure writing the directive file.
    fn evaluate(&mut self, directives: &DirectiveMap) -> Result<Duration, ToolchainError>;
}
