use crate::action::{decode, NUM_ACTIONS};
use crate::calibrated::Calibrated;
use crate::{ActionSpace, Env, EnvError, Transition};
use features::{encode, FeatureStore, LoopFeature, OBS_WIDTH};
use toolchain::{DirectiveMap, Toolchain};

/// One loop per episode.
///
/// [`Env::reset`] presents the first loop. [`Env::step`] applies a single
/// directive to the loop under the cursor, scores it, ends the episode and
/// moves the cursor on. The cursor only matters to callers that step again
/// without resetting; [`SingleLoopEnv::reset_at`] positions it explicitly.
pub struct SingleLoopEnv<T> {
    store: FeatureStore,
    core: Calibrated<T>,
    cursor: usize,
}

impl<T: Toolchain> SingleLoopEnv<T> {
    /// Measures the baseline and builds the environment.
    ///
    /// # Errors
    ///
    /// Returns [`EnvError::Toolchain`] if the baseline run fails.
    pub fn new(store: FeatureStore, toolchain: T) -> Result<Self, EnvError> {
        let core = Calibrated::new(toolchain)?;
        Ok(Self { store, core, cursor: 0 })
    }

    /// Starts an episode at loop `idx` instead of the first one.
    ///
    /// # Errors
    ///
    /// Returns [`EnvError::LoopIndex`] if `idx` is not a loop index.
    pub fn reset_at(&mut self, idx: usize) -> Result<Vec<f32>, EnvError> {
        let feature = self.store.get(idx).ok_or(EnvError::LoopIndex {
            idx,
            n_loops: self.store.len(),
        })?;
        self.cursor = idx;
        Ok(encode(feature).to_vec())
    }

    /// Index of the loop the next step acts on; equals `n_loops` once the
    /// scan has passed the last loop.
    #[must_use]
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    #[must_use]
    pub fn current_loop(&self) -> Option<&LoopFeature> {
        self.store.get(self.cursor)
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
}

impl<T: Toolchain> Env for SingleLoopEnv<T> {
    type Action = i64;

    fn reset(&mut self) -> Vec<f32> {
        self.cursor = 0;
        encode(&self.store.loops()[0]).to_vec()
    }

    fn step(&mut self, action: i64) -> Result<Transition, EnvError> {
        let feature = self.store.get(self.cursor).ok_or(EnvError::EpisodeDone {
            n_loops: self.store.len(),
        })?;
        let directive = decode(action);
        tracing::debug!("loop {} <- {directive:?}", feature.loop_id);

        let mut directives = DirectiveMap::new();
        directives.insert(feature.loop_id.clone(), directive);
        let trial = self.core.trial(&directives)?;
        self.cursor += 1;

        Ok(Transition {
            obs: vec![0.0; OBS_WIDTH],
            reward: trial.reward,
            done: true,
            info: trial.info,
        })
    }

    fn obs_size(&self) -> usize {
        OBS_WIDTH
    }

    fn action_space(&self) -> ActionSpace {
        ActionSpace::Discrete(NUM_ACTIONS)
    }
}
