//! # vecloop
//!
//! A feedback loop for learning per-loop vectorization choices.
//!
//! ## Overview
//!
//! An agent looks at static features of each loop in a program (block,
//! load, store, arithmetic and call counts plus an estimated trip count)
//! and picks a directive: leave the loop scalar, or vectorize it at width
//! 2, 4 or 8. The program is rebuilt with those directives, executed, and
//! the agent is rewarded with the time saved relative to the untouched
//! program.
//!
//! ## The Crates
//!
//! -   **[`features`]:** Loads the per-loop feature file written by the
//!     extraction pass and encodes loops as observation vectors.
//! -   **[`toolchain`]:** The directive wire format and the build-and-measure
//!     pipeline (`opt` directive pass, `opt` loop vectorizer, `clang`, timed
//!     run). A `mock` feature provides a scripted pipeline for tests.
//! -   **[`rl`]:** The environments. [`rl::SingleLoopEnv`] acts on one loop
//!     per episode, [`rl::WholeProgramEnv`] on all loops at once.
//! -   **`vecloop`:** This crate. Its binary extracts features and runs a
//!     random-exploration driver against either environment.
//!
//! ## Working Directory
//!
//! The pipeline communicates with the directive pass through fixed file
//! names (`loop_actions.json`, `tmp_opt.ll`, `tmp_vec.ll`, `a.out`) inside
//! its working directory. One working directory serves one environment.

pub use features;
pub use rl;
pub use toolchain;
