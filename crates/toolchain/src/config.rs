use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::time::Duration;

/// An external program plus any arguments placed before the stage's own.
///
/// `program = "sh", args = ["fake_opt.sh"]` runs a wrapper script in place
/// of the real tool.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Tool {
    pub program: PathBuf,
    #[serde(default)]
    pub args: Vec<String>,
}

impl Tool {
    #[must_use]
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self { program: program.into(), args: Vec::new() }
    }

    #[must_use]
    pub fn with_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub(crate) fn command(&self) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args);
        cmd
    }
}

/// Locations and commands used by [`crate::LlvmToolchain`].
///
/// Relative artifact paths are resolved against `work_dir`, which is also
/// the current directory of every process the pipeline starts.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ToolchainConfig {
    pub work_dir: PathBuf,
    /// Program under test in textual LLVM IR. Never written to.
    pub ir_path: PathBuf,
    pub opt: Tool,
    pub clang: Tool,
    pub pass_plugin: PathBuf,
    pub pass_name: String,
    pub vectorize_pass: String,
    pub opt_level: String,
    pub directive_file: PathBuf,
    pub features_file: PathBuf,
    pub applied_ir: PathBuf,
    pub vectorized_ir: PathBuf,
    pub binary: PathBuf,
    /// Kill the measured program after this many seconds.
    pub run_timeout_secs: Option<f64>,
}

impl Default for ToolchainConfig {
    fn default() -> Self {
        Self {
            work_dir: PathBuf::from("."),
            ir_path: PathBuf::from("benchmark.ll"),
            opt: Tool::new("opt"),
            clang: Tool::new("clang"),
            pass_plugin: PathBuf::from("./LoopRLOpt.so"),
            pass_name: "loop-rl-opt".to_string(),
            vectorize_pass: "loop-vectorize".to_string(),
            opt_level: "-O3".to_string(),
            directive_file: PathBuf::from("loop_actions.json"),
            features_file: PathBuf::from("loop_features.json"),
            applied_ir: PathBuf::from("tmp_opt.ll"),
            vectorized_ir: PathBuf::from("tmp_vec.ll"),
            binary: PathBuf::from("a.out"),
            run_timeout_secs: None,
        }
    }
}

impl ToolchainConfig {
    /// Reads a JSON config; missing fields keep their defaults.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the file cannot be read, or an
    /// `InvalidData` error if it is not a valid config object.
    pub fn from_json_file(path: impl AsRef<Path>) -> std::io::Result<Self> {
        let json = std::fs::read_to_string(path)?;
        serde_json::from_str(&json)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))
    }

    #[must_use]
    pub fn run_timeout(&self) -> Option<Duration> {
        self.run_timeout_secs
            .filter(|secs| secs.is_finite() && *secs > 0.0)
            .and_then(|secs| Duration::try_from_secs_f64(secs).ok())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_keeps_defaults() {
        let cfg: ToolchainConfig = serde_json::from_str(
            r#"{"ir_path": "kernel.ll", "opt": {"program": "opt-17"}, "run_timeout_secs": 2.5}"#,
        )
        .unwrap();
        assert_eq!(cfg.ir_path, PathBuf::from("kernel.ll"));
        assert_eq!(cfg.opt, Tool::new("opt-17"));
        assert_eq!(cfg.clang, Tool::new("clang"));
        assert_eq!(cfg.directive_file, PathBuf::from("loop_actions.json"));
        assert_eq!(cfg.run_timeout(), Some(Duration::from_millis(2500)));
    }

    #[test]
    fn unrepresentable_timeout_is_ignored() {
        let cfg: ToolchainConfig = serde_json::from_str(r#"{"run_timeout_secs": 1e20}"#).unwrap();
        assert_eq!(cfg.run_timeout(), None);
        let cfg = ToolchainConfig { run_timeout_secs: Some(1e19), ..ToolchainConfig::default() };
        assert_eq!(cfg.run_timeout(), Some(Duration::from_secs(10_000_000_000_000_000_000)));
    }

    #[test]
    fn non_positive_timeout_is_ignored() {
        let cfg = ToolchainConfig { run_timeout_secs: Some(0.0), ..ToolchainConfig::default() };
        assert_eq!(cfg.run_timeout(), None);
    }
}
