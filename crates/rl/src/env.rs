use crate::EnvError;

/// Reinforcement learning environment trait.
///
/// Gym-style: [`reset`] yields the first observation of an episode and
/// [`step`] applies one action. Unlike a simulator, a step here rebuilds and
/// runs a program, so it can fail; failures are returned rather than folded
/// into the reward.
///
/// [`reset`]: Env::reset
/// [`step`]: Env::step
pub trait Env {
    type Action;

    /// Start a new episode and return its observation.
    fn reset(&mut self) -> Vec<f32>;

    /// Apply `action`.
    ///
    /// # Errors
    ///
    /// Any toolchain failure aborts the step and no reward is produced.
    fn step(&mut self, action: Self::Action) -> Result<Transition, EnvError>;

    /// Length of every observation this environment returns.
    fn obs_size(&self) -> usize;

    fn action_space(&self) -> ActionSpace;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionSpace {
    /// One choice among `n`.
    Discrete(usize),
    /// One choice per entry, entry `i` among `nvec[i]`.
    MultiDiscrete(Vec<usize>),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StepInfo {
    /// Measured runtime of this trial in seconds.
    pub runtime: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Transition {
    pub obs: Vec<f32>,
    /// Baseline runtime minus trial runtime, in seconds.
    pub reward: f64,
    pub done: bool,
    pub info: StepInfo,
}
