//! # vecloop Application Logic
//!
//! [`run`] wires the command line into a toolchain and an environment.
//! `explore` stands in for a learning loop: it draws actions uniformly at
//! random, which is enough to check an installation end to end and to get a
//! first picture of which loops respond to vectorization.

use crate::cli::{Cli, Command, ExploreArgs};
use anyhow::{Context, Result};
use features::FeatureStore;
use rl::{decode, Env, Mode, SingleLoopEnv, WholeProgramEnv, NUM_ACTIONS};
use toolchain::LlvmToolchain;

/// Best action seen so far for one loop (or one whole-program vector).
#[derive(Debug, Clone)]
struct Best<A> {
    action: A,
    reward: f64,
    runtime: f64,
}

fn keep_best<A>(slot: &mut Option<Best<A>>, action: A, reward: f64, runtime: f64) {
    if slot.as_ref().map_or(true, |best| reward > best.reward) {
        *slot = Some(Best { action, reward, runtime });
    }
}

/// Execute the parsed command.
///
/// # Errors
///
/// Returns configuration, feature loading and toolchain errors unchanged
/// apart from added context.
pub fn run(cli: Cli) -> Result<()> {
    let config = cli.toolchain.resolve()?;
    let mut toolchain = LlvmToolchain::new(config).context("preparing the working directory")?;
    tracing::info!("Working directory: {}", toolchain.work_dir().display());

    match cli.command {
        Command::Extract => {
            let path = toolchain.extract_features().context("running the directive pass")?;
            let store = FeatureStore::load(&path)?;
            tracing::info!("Extracted {} loops into {}", store.len(), path.display());
            for feature in store.loops() {
                tracing::info!("  {} {:?}", feature.loop_id, features::encode(feature));
            }
            Ok(())
        }
        Command::Explore(args) => explore(toolchain, &args),
    }
}

fn explore(toolchain: LlvmToolchain, args: &ExploreArgs) -> Result<()> {
    let path = args
        .features
        .clone()
        .unwrap_or_else(|| toolchain.features_path());
    let store = FeatureStore::load(&path)
        .context("loading loop features (try `vecloop extract` first)")?;
    let mut rng = args.seed.map_or_else(fastrand::Rng::new, fastrand::Rng::with_seed);
    let action_range = 0..NUM_ACTIONS as i64;

    match Mode::from(args.mode) {
        Mode::SingleLoop => {
            let mut env = SingleLoopEnv::new(store, toolchain).context("measuring the baseline")?;
            tracing::info!(
                "Single-loop mode: {} loops, baseline {:.4}s",
                env.n_loops(),
                env.baseline_time()
            );
            let mut best: Vec<Option<Best<i64>>> = vec![None; env.n_loops()];
            for episode in 0..args.episodes {
                let idx = episode % env.n_loops();
                env.reset_at(idx)?;
                let action = rng.i64(action_range.clone());
                let t = env.step(action)?;
                tracing::info!(
                    "episode {episode}: loop {} action {action} ({:?}) reward {:+.4} runtime {:.4}s",
                    env.loops()[idx].loop_id,
                    decode(action),
                    t.reward,
                    t.info.runtime
                );
                keep_best(&mut best[idx], action, t.reward, t.info.runtime);
            }
            for (feature, slot) in env.loops().iter().zip(&best) {
                match slot {
                    Some(b) => tracing::info!(
                        "best for {}: {:?} reward {:+.4} runtime {:.4}s",
                        feature.loop_id,
                        decode(b.action),
                        b.reward,
                        b.runtime
                    ),
                    None => tracing::info!("best for {}: not explored", feature.loop_id),
                }
            }
        }
        Mode::WholeProgram => {
            let mut env =
                WholeProgramEnv::new(store, toolchain).context("measuring the baseline")?;
            tracing::info!(
                "Whole-program mode: {} loops, baseline {:.4}s",
                env.n_loops(),
                env.baseline_time()
            );
            let mut best: Option<Best<Vec<i64>>> = None;
            for episode in 0..args.episodes {
                env.reset();
                let actions: Vec<i64> = (0..env.n_loops())
                    .map(|_| rng.i64(action_range.clone()))
                    .collect();
                let t = env.step(actions.clone())?;
                tracing::info!(
                    "episode {episode}: actions {actions:?} reward {:+.4} runtime {:.4}s",
                    t.reward,
                    t.info.runtime
                );
                keep_best(&mut best, actions, t.reward, t.info.runtime);
            }
            if let Some(b) = best {
                tracing::info!(
                    "best vector {:?} reward {:+.4} runtime {:.4}s",
                    b.action,
                    b.reward,
                    b.runtime
                );
                for (feature, &action) in env.loops().iter().zip(&b.action) {
                    tracing::info!("  {}: {:?}", feature.loop_id, decode(action));
                }
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keep_best_prefers_higher_reward() {
        let mut slot = None;
        keep_best(&mut slot, 1, -0.2, 1.2);
        keep_best(&mut slot, 2, 0.1, 0.9);
        keep_best(&mut slot, 3, 0.05, 0.95);
        let best = slot.unwrap();
        assert_eq!(best.action, 2);
        assert!((best.runtime - 0.9).abs() < 1e-12);
    }
}
