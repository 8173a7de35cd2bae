//! `cargo` as the host toolchain.

use std::{
    ffi::OsString,
    fs,
    io::{ErrorKind, Read},
    path::{Path, PathBuf},
    process::{Child, Command, ExitStatus, Stdio},
    sync::mpsc::{self, Receiver},
    thread,
    time::{Duration, Instant},
};

use eyre::{Context, ContextCompat, Result, bail};
use kiln_codegen::{
    Severity,
    pipeline::{BuildResult, BuildStatus, Invocation, Toolchain, ValidationIssue},
};

const POLL_INTERVAL: Duration = Duration::from_millis(50);
/// How long output is still collected after the process was killed
const DRAIN_GRACE: Duration = Duration::from_millis(500);

/// Runs `cargo check` / `cargo build` in the generated project.
#[derive(Debug, Clone)]
pub struct CargoToolchain {
    program: OsString,
    /// Arguments placed before the subcommand
    prefix: Vec<OsString>,
    envs: Vec<(OsString, OsString)>,
}

impl Default for CargoToolchain {
    fn default() -> Self {
        Self::new()
    }
}

impl CargoToolchain {
    pub fn new() -> Self {
        Self::with_command("cargo", Vec::<OsString>::new())
    }

    /// Use another program, e.g. a toolchain wrapper such as `rustup run stable cargo`.
    pub fn with_command(
        program: impl Into<OsString>,
        prefix: impl IntoIterator<Item = impl Into<OsString>>,
    ) -> Self {
        Self {
            program: program.into(),
            prefix: prefix.into_iter().map(Into::into).collect(),
            envs: Vec::new(),
        }
    }

    /// Set an environment variable for every spawned process, e.g. `CARGO_TARGET_DIR`.
    pub fn with_env(mut self, key: impl Into<OsString>, value: impl Into<OsString>) -> Self {
        self.envs.push((key.into(), value.into()));
        self
    }

    fn command(&self, root: &Path) -> Command {
        let mut command = Command::new(&self.program);
        command
            .args(&self.prefix)
            .envs(self.envs.iter().cloned())
            .current_dir(root)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        command
    }

    fn run(&self, root: &Path, subcommand: &str, invocation: &Invocation) -> BuildResult {
        let started = Instant::now();
        let program = self.program.to_string_lossy().into_owned();
        tracing::debug!(%program, subcommand, root = %root.display(), "spawning toolchain");

        let spawned = self
            .command(root)
            .args([subcommand, "--message-format=short"])
            .spawn();
        let mut child = match spawned {
            Ok(child) => child,
            Err(err) => {
                tracing::warn!(%program, "toolchain failed to start: {err}");
                return BuildResult::failed(None, started.elapsed())
                    .with_output("", format!("failed to start `{program}`: {err}"));
            }
        };

        let stdout = drain(child.stdout.take());
        let stderr = drain(child.stderr.take());
        let waited = wait(&mut child, started, invocation);
        let elapsed = started.elapsed();

        // Grandchildren may keep the pipes open after a kill.
        let grace = || Some(Instant::now() + DRAIN_GRACE);
        let (result, deadline) = match waited {
            Waited::Exited(status) if status.success() => (BuildResult::succeeded(elapsed), None),
            Waited::Exited(status) => (BuildResult::failed(status.code(), elapsed), None),
            Waited::TimedOut => {
                tracing::warn!(subcommand, timeout = ?invocation.timeout, "toolchain timed out");
                (BuildResult::new(BuildStatus::TimedOut, elapsed), grace())
            }
            Waited::Cancelled => {
                tracing::info!(subcommand, "toolchain cancelled");
                (BuildResult::new(BuildStatus::Cancelled, elapsed), grace())
            }
            Waited::Lost(err) => {
                return BuildResult::failed(None, elapsed)
                    .with_output("", format!("lost track of `{program}`: {err}"));
            }
        };
        let stdout = collect(&stdout, deadline);
        let stderr = collect(&stderr, deadline);
        let issues = parse_diagnostics(&stderr);
        tracing::info!(
            subcommand,
            status = ?result.status,
            issues = issues.len(),
            elapsed_ms = elapsed.as_millis() as u64,
            "toolchain finished"
        );
        result.with_issues(issues).with_output(stdout, stderr)
    }

    /// Where cargo puts build output for the project at `root`.
    ///
    /// Honors `CARGO_TARGET_DIR` and `build.target-dir`.
    fn target_dir(&self, root: &Path) -> Result<PathBuf> {
        let output = self
            .command(root)
            .args(["metadata", "--format-version", "1", "--no-deps"])
            .output()
            .wrap_err("failed to run `cargo metadata`")?;
        if !output.status.success() {
            bail!(
                "`cargo metadata` failed: {}",
                String::from_utf8_lossy(&output.stderr).trim()
            );
        }

        let metadata: serde_json::Value = serde_json::from_slice(&output.stdout)
            .wrap_err("failed to parse `cargo metadata` output")?;
        let dir = metadata
            .get("target_directory")
            .and_then(|d| d.as_str())
            .wrap_err("`cargo metadata` reported no target directory")?;
        Ok(PathBuf::from(dir))
    }

    /// Copy `<target>/debug/<package>` to `output`.
    fn copy_binary(&self, root: &Path, output: &Path) -> Result<()> {
        let manifest_path = root.join("Cargo.toml");
        let manifest = fs::read_to_string(&manifest_path)
            .wrap_err_with(|| format!("failed to read {}", manifest_path.display()))?;
        let manifest: toml::Table = toml::from_str(&manifest)
            .wrap_err_with(|| format!("failed to parse {}", manifest_path.display()))?;
        let package = manifest
            .get("package")
            .and_then(|p| p.get("name"))
            .and_then(|n| n.as_str())
            .wrap_err("manifest has no package name")?;

        let binary = self
            .target_dir(root)?
            .join("debug")
            .join(format!("{package}{}", std::env::consts::EXE_SUFFIX));
        if let Some(parent) = output.parent() {
            fs::create_dir_all(parent)
                .wrap_err_with(|| format!("failed to create {}", parent.display()))?;
        }
        fs::copy(&binary, output).wrap_err_with(|| {
            format!(
                "failed to copy {} to {}",
                binary.display(),
                output.display()
            )
        })?;
        Ok(())
    }
}

impl Toolchain for CargoToolchain {
    fn name(&self) -> &'static str {
        "cargo"
    }

    fn check(&self, root: &Path, invocation: &Invocation) -> BuildResult {
        self.run(root, "check", invocation)
    }

    fn build(&self, root: &Path, output: &Path, invocation: &Invocation) -> BuildResult {
        let result = self.run(root, "build", invocation);
        if !result.success() {
            return result;
        }

        let output = root.join(output);
        match self.copy_binary(root, &output) {
            Ok(()) => result.with_artifact(output),
            Err(err) => {
                let stderr = format!("{}\n{err:#}", result.stderr);
                BuildResult::failed(None, result.duration)
                    .with_output(result.stdout, stderr)
                    .with_issues(result.issues)
            }
        }
    }
}

enum Waited {
    Exited(ExitStatus),
    TimedOut,
    Cancelled,
    Lost(std::io::Error),
}

/// Poll until exit, killing the child on timeout or cancellation.
fn wait(child: &mut Child, started: Instant, invocation: &Invocation) -> Waited {
    loop {
        match child.try_wait() {
            Ok(Some(status)) => return Waited::Exited(status),
            Ok(None) => {}
            Err(err) => return Waited::Lost(err),
        }

        let stop = if invocation.cancel.is_cancelled() {
            Waited::Cancelled
        } else if started.elapsed() >= invocation.timeout {
            Waited::TimedOut
        } else {
            thread::sleep(POLL_INTERVAL);
            continue;
        };

        if let Err(err) = child.kill() {
            tracing::warn!("failed to kill toolchain: {err}");
        }
        let _ = child.wait();
        return stop;
    }
}

/// Forward a pipe to a channel chunk by chunk.
fn drain<R: Read + Send + 'static>(pipe: Option<R>) -> Receiver<Vec<u8>> {
    let (tx, rx) = mpsc::channel();
    if let Some(mut pipe) = pipe {
        thread::spawn(move || {
            let mut buf = [0u8; 8192];
            loop {
                match pipe.read(&mut buf) {
                    Ok(0) => break,
                    Ok(n) => {
                        if tx.send(buf[..n].to_vec()).is_err() {
                            break;
                        }
                    }
                    Err(err) if err.kind() == ErrorKind::Interrupted => {}
                    Err(_) => break,
                }
            }
        });
    }
    rx
}

/// Everything forwarded until the pipe closes, or until `deadline` when given.
fn collect(rx: &Receiver<Vec<u8>>, deadline: Option<Instant>) -> String {
    let mut buf = Vec::new();
    loop {
        let chunk = match deadline {
            None => rx.recv().ok(),
            Some(deadline) => rx
                .recv_timeout(deadline.saturating_duration_since(Instant::now()))
                .ok(),
        };
        match chunk {
            Some(chunk) => buf.extend_from_slice(&chunk),
            None => break,
        }
    }
    String::from_utf8_lossy(&buf).into_owned()
}

/// Extract `path:line:col: severity: message` lines from short-format output.
pub fn parse_diagnostics(output: &str) -> Vec<ValidationIssue> {
    output.lines().filter_map(parse_line).collect()
}

fn parse_line(line: &str) -> Option<ValidationIssue> {
    let mut parts = line.splitn(4, ':');
    let file = parts.next()?.trim();
    let line_no = parts.next()?.trim().parse().ok()?;
    let column = parts.next()?.trim().parse().ok()?;
    let (severity, message) = parts.next()?.trim_start().split_once(": ")?;

    let severity = if severity.starts_with("error") {
        Severity::Error
    } else if severity.starts_with("warning") {
        Severity::Warning
    } else {
        return None;
    };
    Some(
        ValidationIssue::error(file, message.trim())
            .at(line_no, column)
            .with_severity(severity),
    )
}
