#![deny(clippy::all, clippy::pedantic)]

//! Loop vectorization as a reinforcement learning environment.
//!
//! An agent picks a vectorization directive per loop, the program is rebuilt
//! and timed through a [`toolchain::Toolchain`], and the reward is the
//! time saved against a baseline measured once at construction.
//!
//! Two shapes share the [`Env`] interface:
//! - [`SingleLoopEnv`] observes and acts on one loop per step.
//! - [`WholeProgramEnv`] observes every loop and takes one action per loop.
//!
//! Every step ends its episode.

mod action;
mod calibrated;
mod env;
mod error;
mod single;
mod whole;

pub use action::{decode, NUM_ACTIONS};
pub use calibrated::Calibrated;
pub use env::{ActionSpace, Env, StepInfo, Transition};
pub use error::EnvError;
pub use single::SingleLoopEnv;
pub use whole::WholeProgramEnv;

/// Which environment shape to build.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    #[default]
    SingleLoop,
    WholeProgram,
}
