//! Drives `LlvmToolchain` against shell scripts standing in for `opt` and
//! `clang`. The scripts copy IR through, log each stage to `stages.log`,
//! fail when a `fail_<stage>` marker exists, and build the "binary" from
//! `program.sh`.
#![cfg(unix)]

use std::fs;
use std::path::Path;
use std::time::Duration;
use tempfile::TempDir;
use toolchain::{
    Directive, DirectiveMap, LlvmToolchain, Stage, Tool, Toolchain, ToolchainConfig, ToolchainError,
};

const FAKE_OPT: &str = r#"
out=""; in=""; pass=""
while [ $# -gt 0 ]; do
  case "$1" in
    -o) out="$2"; shift ;;
    -passes=*) pass="${1#-passes=}" ;;
    -*) ;;
    *) in="$1" ;;
  esac
  shift
done
if [ -e "fail_$pass" ]; then echo "boom in $pass" >&2; exit 1; fi
echo "$pass" >> stages.log
if [ "$pass" = "loop-rl-opt" ]; then
  echo '[{"loop_id": "main:for.body", "num_blocks": 1}]' > loop_features.json
fi
cp "$in" "$out"
"#;

const FAKE_CLANG: &str = r#"
out=""
while [ $# -gt 0 ]; do
  case "$1" in
    -o) out="$2"; shift ;;
  esac
  shift
done
if [ -e fail_compile ]; then echo "boom in compile" >&2; exit 1; fi
echo compile >> stages.log
{ echo '#!/bin/sh'; cat program.sh; } > "$out"
chmod +x "$out"
"#;

struct Fixture {
    dir: TempDir,
}

impl Fixture {
    fn new(program: &str) -> Self {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("fake_opt.sh"), FAKE_OPT).unwrap();
        fs::write(dir.path().join("fake_clang.sh"), FAKE_CLANG).unwrap();
        fs::write(dir.path().join("benchmark.ll"), "; ModuleID = 'benchmark.c'\n").unwrap();
        fs::write(dir.path().join("program.sh"), program).unwrap();
        Self { dir }
    }

    fn path(&self) -> &Path {
        self.dir.path()
    }

    fn config(&self) -> ToolchainConfig {
        ToolchainConfig {
            work_dir: self.path().to_path_buf(),
            opt: Tool::new("sh").with_args([self.path().join("fake_opt.sh").display().to_string()]),
            clang: Tool::new("sh")
                .with_args([self.path().join("fake_clang.sh").display().to_string()]),
            ..ToolchainConfig::default()
        }
    }

    fn toolchain(&self) -> LlvmToolchain {
        LlvmToolchain::new(self.config()).unwrap()
    }

    fn touch(&self, name: &str) {
        fs::write(self.path().join(name), "").unwrap();
    }

    fn stages(&self) -> Vec<String> {
        fs::read_to_string(self.path().join("stages.log"))
            .unwrap_or_default()
            .lines()
            .map(str::to_string)
            .collect()
    }

    fn directives_on_disk(&self) -> serde_json::Value {
        let json = fs::read_to_string(self.path().join("loop_actions.json")).unwrap();
        serde_json::from_str(&json).unwrap()
    }
}

fn width_two_for_l1() -> DirectiveMap {
    let mut map = DirectiveMap::new();
    map.insert("L1".to_string(), Directive::Width(2));
    map
}

#[test]
fn stages_run_in_order_and_directives_reach_disk() {
    let fx = Fixture::new("exit 0\n");
    let mut tc = fx.toolchain();
    let elapsed = tc.evaluate(&width_two_for_l1()).unwrap();

    assert!(elapsed < Duration::from_secs(5));
    assert_eq!(fx.stages(), ["loop-rl-opt", "loop-vectorize", "compile"]);
    assert_eq!(fx.directives_on_disk(), serde_json::json!({"L1": {"width": 2}}));
    assert!(fx.path().join("tmp_opt.ll").exists());
    assert!(fx.path().join("tmp_vec.ll").exists());
    assert!(tc.binary_path().exists());
}

#[test]
fn empty_map_overwrites_stale_directives() {
    let fx = Fixture::new("exit 0\n");
    fs::write(fx.path().join("loop_actions.json"), r#"{"old": {"width": 8}}"#).unwrap();
    let mut tc = fx.toolchain();
    tc.evaluate(&DirectiveMap::new()).unwrap();
    assert_eq!(fx.directives_on_disk(), serde_json::json!({}));
}

#[test]
fn elapsed_time_covers_the_measured_run() {
    let fx = Fixture::new("sleep 0.2\n");
    let mut tc = fx.toolchain();
    let elapsed = tc.evaluate(&DirectiveMap::new()).unwrap();
    assert!(elapsed >= Duration::from_millis(200), "elapsed {elapsed:?}");
}

#[test]
fn failing_stage_is_tagged() {
    for (marker, stage) in [
        ("fail_loop-rl-opt", Stage::Apply),
        ("fail_loop-vectorize", Stage::Vectorize),
        ("fail_compile", Stage::Compile),
    ] {
        let fx = Fixture::new("exit 0\n");
        fx.touch(marker);
        let err = fx.toolchain().evaluate(&width_two_for_l1()).unwrap_err();
        match err {
            ToolchainError::Stage { stage: got, code, stderr } => {
                assert_eq!(got, stage);
                assert_eq!(code, Some(1));
                assert!(stderr.contains("boom"), "stderr: {stderr}");
            }
            other => panic!("expected stage error for {stage}, got {other}"),
        }
    }
}

#[test]
fn later_stages_do_not_run_after_a_failure() {
    let fx = Fixture::new("exit 0\n");
    fx.touch("fail_loop-vectorize");
    let _ = fx.toolchain().evaluate(&DirectiveMap::new());
    assert_eq!(fx.stages(), ["loop-rl-opt"]);
}

#[test]
fn nonzero_exit_of_measured_program_is_execution_error() {
    let fx = Fixture::new("exit 3\n");
    let err = fx.toolchain().evaluate(&DirectiveMap::new()).unwrap_err();
    assert!(matches!(err, ToolchainError::Execution { code: Some(3) }), "{err}");
    assert_eq!(err.stage(), Some(Stage::Execute));
}

#[test]
fn runaway_program_is_killed_after_timeout() {
    let fx = Fixture::new("exec sleep 5\n");
    let config = ToolchainConfig { run_timeout_secs: Some(0.2), ..fx.config() };
    let mut tc = LlvmToolchain::new(config).unwrap();
    let start = std::time::Instant::now();
    let err = tc.evaluate(&DirectiveMap::new()).unwrap_err();
    assert!(matches!(err, ToolchainError::Timeout(limit) if limit == Duration::from_millis(200)));
    assert!(start.elapsed() < Duration::from_secs(4));
}

#[test]
fn huge_timeout_waits_for_the_program() {
    for secs in [1e19, 1e20] {
        let fx = Fixture::new("exit 0\n");
        let config = ToolchainConfig { run_timeout_secs: Some(secs), ..fx.config() };
        let mut tc = LlvmToolchain::new(config).unwrap();
        let elapsed = tc.evaluate(&DirectiveMap::new()).unwrap();
        assert!(elapsed < Duration::from_secs(5), "timeout {secs}: {elapsed:?}");
    }
}

#[test]
fn missing_tool_is_launch_error() {
    let fx = Fixture::new("exit 0\n");
    let config = ToolchainConfig {
        opt: Tool::new(fx.path().join("no-such-opt")),
        ..fx.config()
    };
    let err = LlvmToolchain::new(config).unwrap().evaluate(&DirectiveMap::new()).unwrap_err();
    assert!(matches!(err, ToolchainError::Launch { stage: Stage::Apply, .. }), "{err}");
}

#[test]
fn extract_runs_only_the_directive_pass() {
    let fx = Fixture::new("exit 0\n");
    let mut tc = fx.toolchain();
    let path = tc.extract_features().unwrap();
    assert_eq!(path, fx.path().join("loop_features.json"));
    assert!(path.exists());
    assert_eq!(fx.stages(), ["loop-rl-opt"]);
    assert_eq!(fx.directives_on_disk(), serde_json::json!({}));
}

#[test]
fn nested_work_dir_is_created() {
    let fx = Fixture::new("exit 0\n");
    let nested = fx.path().join("runs").join("env-0");
    let config = ToolchainConfig { work_dir: nested.clone(), ..fx.config() };
    let tc = LlvmToolchain::new(config).unwrap();
    assert!(nested.is_dir());
    assert_eq!(tc.directive_path(), nested.join("loop_actions.json"));
}
