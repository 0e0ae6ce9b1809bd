use crate::action::{decode, NUM_ACTIONS};
use crate::calibrated::Calibrated;
use crate::{ActionSpace, Env, EnvError, Transition};
use features::{encode_all, FeatureStore, LoopFeature, OBS_WIDTH};
use toolchain::{DirectiveMap, Toolchain};

/// Every loop at once: the observation concatenates all loops and an
/// action carries one choice per loop, in load order.
pub struct WholeProgramEnv<T> {
    store: FeatureStore,
    core: Calibrated<T>,
}

impl<T: Toolchain> WholeProgramEnv<T> {
    /// Measures the baseline and builds the environment.
    ///
    /// # Errors
    ///
    /// Returns [`EnvError::Toolchain`] if the baseline run fails.
    pub fn new(store: FeatureStore, toolchain: T) -> Result<Self, EnvError> {
        let core = Calibrated::new(toolchain)?;
        Ok(Self { store, core })
    }

    #[must_use]
    pub fn n_loops(&self) -> usize {
        self.store.len()
    }

    #[must_use]
    pub fn loops(&self) -> &[LoopFeature] {
        self.store.loops()
    }

    #[must_use]
    pub fn baseline_time(&self) -> f64 {
        self.core.baseline_time()
    }

    #[must_use]
    pub fn toolchain(&self) -> &T {
        self.core.toolchain()
    }

    fn directives(&self, actions: &[i64]) -> Result<DirectiveMap, EnvError> {
        if actions.len() != self.store.len() {
            return Err(EnvError::ActionArity {
                expected: self.store.len(),
                got: actions.len(),
            });
        }
        Ok(self
            .store
            .loops()
            .iter()
            .zip(actions)
            .map(|(feature, &action)| (feature.loop_id.clone(), decode(action)))
            .collect())
    }
}

impl<T: Toolchain> Env for WholeProgramEnv<T> {
    type Action = Vec<i64>;

    fn reset(&mut self) -> Vec<f32> {
        encode_all(self.store.loops())
    }

    fn step(&mut self, actions: Vec<i64>) -> Result<Transition, EnvError> {
        let directives = self.directives(&actions)?;
        let trial = self.core.trial(&directives)?;
        Ok(Transition {
            obs: vec![0.0; self.obs_size()],
            reward: trial.reward,
            done: true,
            info: trial.info,
        })
    }

    fn obs_size(&self) -> usize {
        OBS_WIDTH * self.store.len()
    }

    fn action_space(&self) -> ActionSpace {
        ActionSpace::MultiDiscrete(vec![NUM_ACTIONS; self.store.len()])
    }
}
