use crate::{DirectiveMap, Stage, Toolchain, ToolchainConfig, ToolchainError};
use std::path::{Path, PathBuf};
use std::process::{Child, Command, ExitStatus, Stdio};
use std::time::{Duration, Instant};

const POLL_INTERVAL: Duration = Duration::from_millis(1);

/// Orchestrates `opt` (directive pass), `opt` (loop vectorizer) and `clang`,
/// then times the resulting binary.
///
/// All artifacts live at fixed names inside the configured working
/// directory, so two toolchains must not share one. Give each environment
/// its own `work_dir` when more than one runs at a time.
pub struct LlvmToolchain {
    config: ToolchainConfig,
    work_dir: PathBuf,
}

impl LlvmToolchain {
    /// Anchors `config.work_dir` to the current directory and creates it if
    /// needed.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the current directory cannot be determined
    /// or the working directory cannot be created.
    pub fn new(config: ToolchainConfig) -> std::io::Result<Self> {
        let work_dir = if config.work_dir.is_absolute() {
            config.work_dir.clone()
        } else {
            std::env::current_dir()?.join(&config.work_dir)
        };
        std::fs::create_dir_all(&work_dir)?;
        Ok(Self { config, work_dir })
    }

    #[must_use]
    pub fn config(&self) -> &ToolchainConfig {
        &self.config
    }

    #[must_use]
    pub fn work_dir(&self) -> &Path {
        &self.work_dir
    }

    fn path(&self, relative: &Path) -> PathBuf {
        self.work_dir.join(relative)
    }

    #[must_use]
    pub fn directive_path(&self) -> PathBuf {
        self.path(&self.config.directive_file)
    }

    #[must_use]
    pub fn features_path(&self) -> PathBuf {
        self.path(&self.config.features_file)
    }

    #[must_use]
    pub fn binary_path(&self) -> PathBuf {
        self.path(&self.config.binary)
    }

    /// Runs the directive pass alone with no directives so it rewrites the
    /// feature file, and returns that file's path.
    ///
    /// # Errors
    ///
    /// Fails like the apply stage of [`Toolchain::evaluate`].
    pub fn extract_features(&mut self) -> Result<PathBuf, ToolchainError> {
        self.apply(&DirectiveMap::new())?;
        Ok(self.features_path())
    }

    fn write_directives(&self, directives: &DirectiveMap) -> Result<(), ToolchainError> {
        let path = self.directive_path();
        let json = serde_json::to_vec(directives).map_err(|e| ToolchainError::DirectiveFile {
            path: path.clone(),
            source: e.into(),
        })?;
        std::fs::write(&path, json).map_err(|source| ToolchainError::DirectiveFile { path, source })
    }

    fn apply(&self, directives: &DirectiveMap) -> Result<(), ToolchainError> {
        self.write_directives(directives)?;
        let mut cmd = self.config.opt.command();
        cmd.arg(format!("-load-pass-plugin={}", self.path(&self.config.pass_plugin).display()))
            .arg(format!("-passes={}", self.config.pass_name))
            .arg(self.path(&self.config.ir_path))
            .arg("-S")
            .arg("-o")
            .arg(self.path(&self.config.applied_ir));
        self.run_stage(Stage::Apply, cmd)
    }

    fn vectorize(&self) -> Result<(), ToolchainError> {
        let mut cmd = self.config.opt.command();
        cmd.arg(format!("-passes={}", self.config.vectorize_pass))
            .arg(self.path(&self.config.applied_ir))
            .arg("-S")
            .arg("-o")
            .arg(self.path(&self.config.vectorized_ir));
        self.run_stage(Stage::Vectorize, cmd)
    }

    fn compile(&self) -> Result<(), ToolchainError> {
        let mut cmd = self.config.clang.command();
        cmd.arg(self.path(&self.config.vectorized_ir))
            .arg(&self.config.opt_level)
            .arg("-o")
            .arg(self.binary_path());
        self.run_stage(Stage::Compile, cmd)
    }

    fn run_stage(&self, stage: Stage, mut cmd: Command) -> Result<(), ToolchainError> {
        cmd.current_dir(&self.work_dir).stdin(Stdio::null());
        tracing::debug!("[{stage}] {cmd:?}");
        let output = cmd
            .output()
            .map_err(|source| ToolchainError::Launch { stage, source })?;
        if output.status.success() {
            return Ok(());
        }
        let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
        tracing::debug!("[{stage}] failed with {}: {stderr}", output.status);
        Err(ToolchainError::Stage {
            stage,
            code: output.status.code(),
            stderr,
        })
    }

    fn execute(&self) -> Result<Duration, ToolchainError> {
        let launch = |source: std::io::Error| ToolchainError::Launch { stage: Stage::Execute, source };
        let mut cmd = Command::new(self.binary_path());
        cmd.current_dir(&self.work_dir)
            .stdin(Stdio::null())
            .stdout(Stdio::null());

        let start = Instant::now();
        let mut child = cmd.spawn().map_err(launch)?;
        // A limit past the end of the clock is no limit at all.
        let deadline = self
            .config
            .run_timeout()
            .and_then(|limit| start.checked_add(limit).map(|deadline| (limit, deadline)));
        let status = match deadline {
            None => child.wait().map_err(launch)?,
            Some((limit, deadline)) => match wait_until(&mut child, deadline).map_err(launch)? {
                Some(status) => status,
                None => return Err(ToolchainError::Timeout(limit)),
            },
        };
        let elapsed = start.elapsed();

        if status.success() {
            Ok(elapsed)
        } else {
            Err(ToolchainError::Execution { code: status.code() })
        }
    }
}

/// Waits for `child` until `deadline`; on expiry kills and reaps it and
/// returns `None`.
fn wait_until(child: &mut Child, deadline: Instant) -> std::io::Result<Option<ExitStatus>> {
    loop {
        if let Some(status) = child.try_wait()? {
            return Ok(Some(status));
        }
        let now = Instant::now();
        if now >= deadline {
            child.kill()?;
            child.wait()?;
            return Ok(None);
        }
        std::thread::sleep(POLL_INTERVAL.min(deadline - now));
    }
}

impl Toolchain for LlvmToolchain {
    fn evaluate(&mut self, directives: &DirectiveMap) -> Result<Duration, ToolchainError> {
        self.apply(directives)?;
        self.vectorize()?;
        self.compile()?;
        self.execute()
    }
}
