use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::{Path, PathBuf};
use toolchain::{Tool, ToolchainConfig};

#[derive(Parser, Debug)]
#[command(name = "vecloop", version, about = "Learn per-loop vectorization directives")]
pub struct Cli {
    #[command(flatten)]
    pub toolchain: ToolchainArgs,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the directive pass with no directives to (re)write the feature file.
    Extract,
    /// Run episodes with a uniformly random agent and report the best choices.
    Explore(ExploreArgs),
}

#[derive(Args, Debug)]
pub struct ToolchainArgs {
    /// JSON toolchain config; flags below override it.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Directory holding the directive file and build artifacts.
    #[arg(long, global = true)]
    pub work_dir: Option<PathBuf>,

    /// Program under test as textual LLVM IR.
    #[arg(long, global = true)]
    pub ir: Option<PathBuf>,

    /// Directive pass plugin.
    #[arg(long, global = true)]
    pub plugin: Option<PathBuf>,

    #[arg(long, global = true)]
    pub opt: Option<PathBuf>,

    #[arg(long, global = true)]
    pub clang: Option<PathBuf>,

    /// Kill the measured program after this many seconds.
    #[arg(long, global = true)]
    pub timeout: Option<f64>,
}

#[derive(Args, Debug)]
pub struct ExploreArgs {
    /// Feature file; defaults to the one in the working directory.
    #[arg(long)]
    pub features: Option<PathBuf>,

    #[arg(long, value_enum, default_value_t = ModeArg::Single)]
    pub mode: ModeArg,

    #[arg(long, default_value_t = 16)]
    pub episodes: usize,

    #[arg(long)]
    pub seed: Option<u64>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum ModeArg {
    /// One loop per episode.
    Single,
    /// All loops per episode.
    Whole,
}

impl From<ModeArg> for rl::Mode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::Single => rl::Mode::SingleLoop,
            ModeArg::Whole => rl::Mode::WholeProgram,
        }
    }
}

impl ToolchainArgs {
    /// Merges the config file (if any) with command line overrides.
    ///
    /// Paths given on the command line are relative to the current
    /// directory; paths inside the config file are relative to its
    /// `work_dir`.
    pub fn resolve(&self) -> Result<ToolchainConfig> {
        let mut config = match &self.config {
            Some(path) => ToolchainConfig::from_json_file(path)
                .with_context(|| format!("reading toolchain config {}", path.display()))?,
            None => ToolchainConfig::default(),
        };
        let cwd = std::env::current_dir().context("resolving the current directory")?;
        if let Some(dir) = &self.work_dir {
            config.work_dir = dir.clone();
        }
        if let Some(ir) = &self.ir {
            config.ir_path = anchored(&cwd, ir);
        }
        if let Some(plugin) = &self.plugin {
            config.pass_plugin = anchored(&cwd, plugin);
        }
        if let Some(opt) = &self.opt {
            config.opt = Tool::new(program(&cwd, opt));
        }
        if let Some(clang) = &self.clang {
            config.clang = Tool::new(program(&cwd, clang));
        }
        if self.timeout.is_some() {
            config.run_timeout_secs = self.timeout;
        }
        Ok(config)
    }
}

pub fn anchored(cwd: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        cwd.join(path)
    }
}

/// Bare names such as `opt-17` are left for a `PATH` lookup; anything with
/// a directory part is anchored like other paths.
pub fn program(cwd: &Path, path: &Path) -> PathBuf {
    match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => anchored(cwd, path),
        _ => path.to_path_buf(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_override_defaults() {
        let cli = Cli::parse_from([
            "vecloop", "--ir", "/src/bench.ll", "--timeout", "3", "explore", "--mode", "whole",
            "--episodes", "4",
        ]);
        let config = cli.toolchain.resolve().unwrap();
        assert_eq!(config.ir_path, PathBuf::from("/src/bench.ll"));
        assert_eq!(config.run_timeout_secs, Some(3.0));
        assert_eq!(config.opt, Tool::new("opt"));
        match cli.command {
            Command::Explore(args) => {
                assert_eq!(rl::Mode::from(args.mode), rl::Mode::WholeProgram);
                assert_eq!(args.episodes, 4);
            }
            Command::Extract => panic!("expected explore"),
        }
    }

    #[test]
    fn relative_flags_are_anchored_to_cwd() {
        let cwd = Path::new("/home/user/proj");
        assert_eq!(anchored(cwd, Path::new("bench.ll")), PathBuf::from("/home/user/proj/bench.ll"));
        assert_eq!(anchored(cwd, Path::new("/abs.ll")), PathBuf::from("/abs.ll"));
    }

    #[test]
    fn tool_paths_with_directories_are_anchored() {
        let cwd = Path::new("/home/user/proj");
        assert_eq!(program(cwd, Path::new("opt-17")), PathBuf::from("opt-17"));
        assert_eq!(
            program(cwd, Path::new("./bin/opt")),
            PathBuf::from("/home/user/proj/./bin/opt")
        );
        assert_eq!(program(cwd, Path::new("/usr/bin/clang")), PathBuf::from("/usr/bin/clang"));
    }

    #[test]
    fn relative_tool_flags_survive_a_separate_work_dir() {
        let cli = Cli::parse_from([
            "vecloop", "--work-dir", "runs/0", "--opt", "./bin/opt", "--clang", "clang-17",
            "extract",
        ]);
        let config = cli.toolchain.resolve().unwrap();
        let cwd = std::env::current_dir().unwrap();
        assert_eq!(config.opt, Tool::new(cwd.join("./bin/opt")));
        assert!(config.opt.program.is_absolute());
        assert_eq!(config.clang, Tool::new("clang-17"));
    }
}
