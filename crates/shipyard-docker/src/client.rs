use std::fmt;
use std::path::Path;

use serde::Deserialize;
use shipyard_core::Port;

use crate::docker::DockerError;
use crate::executor::{DockerExecutor, RealExecutor};

/// Docker operations client, parameterized over the executor for testability.
pub struct DockerClient<E: DockerExecutor = RealExecutor> {
    executor: E,
}

impl DockerClient<RealExecutor> {
    pub fn new() -> Self {
        Self {
            executor: RealExecutor::new(),
        }
    }
}

impl Default for DockerClient<RealExecutor> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: DockerExecutor> DockerClient<E> {
    pub fn with_executor(executor: E) -> Self {
        Self { executor }
    }

    // ── Preflight ──

    pub async fn check_prerequisites(&self) -> Result<PreflightReport, PreflightError> {
        let mut report = PreflightReport::default();

        // 1. docker CLI available
        match self.executor.exec(&args(["--version"])).await {
            Ok(v) => report.client_version = Some(parse_client_version(&v)),
            Err(_) => return Err(PreflightError::DockerNotInstalled),
        }

        // 2. Daemon reachable
        match self
            .executor
            .exec(&args(["version", "--format", "{{.Server.Version}}"]))
            .await
        {
            Ok(v) if !v.trim().is_empty() => report.server_version = Some(v.trim().to_owned()),
            _ => return Err(PreflightError::DaemonUnavailable),
        }

        tracing::debug!(
            client = ?report.client_version,
            server = ?report.server_version,
            "docker preflight passed"
        );
        Ok(report)
    }

    // ── Doctor ──

    /// Run all diagnostic checks without early return.
    /// Returns a report with pass/fail for each check item.
    pub async fn doctor(&self) -> DoctorReport {
        let mut report = DoctorReport::default();

        // 1. docker CLI
        match self.executor.exec(&args(["--version"])).await {
            Ok(v) => report.docker = CheckResult::ok(&parse_client_version(&v)),
            Err(e) => report.docker = CheckResult::fail(&e.to_string()),
        }

        // 2. Daemon
        match self
            .executor
            .exec(&args(["version", "--format", "{{.Server.Version}}"]))
            .await
        {
            Ok(v) if !v.trim().is_empty() => report.daemon = CheckResult::ok(v.trim()),
            _ => report.daemon = CheckResult::fail("daemon not reachable, is Docker running?"),
        }

        // 3. BuildKit (needed for the launcher build context)
        match self.executor.exec(&args(["buildx", "version"])).await {
            Ok(v) => {
                let line = v.lines().next().unwrap_or_default().trim().to_owned();
                report.buildx = CheckResult::ok(&line);
            }
            Err(_) => report.buildx = CheckResult::fail("docker buildx not available"),
        }

        report
    }

    // ── Build ──

    /// Build the image. Any failure aborts the build: no retry, and docker
    /// leaves no tagged image behind.
    ///
    /// `capture`: when `true`, runs `docker build --quiet` and returns the image ID.
    ///            when `false`, build output is streamed to the terminal.
    pub async fn build_image(&self, request: &BuildRequest<'_>) -> Result<Option<String>, BuildError> {
        let context = path_str(request.context_dir)?;
        let dockerfile = path_str(request.dockerfile)?;

        let mut cmd = args(["build", "--tag", request.tag, "--file", dockerfile]);
        for (name, dir) in request.extra_contexts {
            cmd.push("--build-context".to_owned());
            cmd.push(format!("{name}={}", path_str(dir)?));
        }
        if request.capture {
            cmd.push("--quiet".to_owned());
        }
        cmd.push(context.to_owned());

        tracing::info!(tag = request.tag, context, "building image");
        if request.capture {
            let id = self
                .executor
                .exec(&cmd)
                .await
                .map_err(|e| BuildError::Build { source: e })?;
            Ok(Some(id.trim().to_owned()))
        } else {
            self.executor
                .exec_streaming(&cmd)
                .await
                .map_err(|e| BuildError::Build { source: e })?;
            Ok(None)
        }
    }

    // ── Images ──

    pub async fn image_exists(&self, tag: &str) -> bool {
        self.executor
            .exec(&args(["image", "inspect", "--format", "{{.Id}}", tag]))
            .await
            .is_ok()
    }

    pub async fn inspect_image(&self, tag: &str) -> Result<ImageSummary, ImageError> {
        let output = self
            .executor
            .exec(&args(["image", "inspect", "--format", "{{json .}}", tag]))
            .await
            .map_err(|e| ImageError::Inspect { source: e })?;

        serde_json::from_str(output.trim()).map_err(|e| ImageError::Parse { source: e })
    }

    pub async fn remove_image(&self, tag: &str) -> Result<(), ImageError> {
        self.executor
            .exec(&args(["image", "rm", tag]))
            .await
            .map_err(|e| ImageError::Remove { source: e })?;
        Ok(())
    }

    // ── Run ──

    /// Start the image in the foreground, streaming its output.
    ///
    /// With `port` set, the container gets `<port_env>=<port>` and the
    /// host port is published to it; otherwise the image default applies.
    pub async fn run_container(&self, tag: &str, options: &RunOptions) -> Result<(), RunError> {
        let container_port = options.port.unwrap_or(options.default_port);
        let host_port = options.host_port.unwrap_or(container_port);

        let mut cmd = args(["run", "--rm", "--init"]);
        cmd.push("--publish".to_owned());
        cmd.push(format!("{host_port}:{container_port}"));
        if let Some(port) = options.port {
            cmd.push("--env".to_owned());
            cmd.push(format!("{}={port}", options.port_env));
        }
        cmd.push(tag.to_owned());

        tracing::info!(tag, %host_port, %container_port, "starting container");
        self.executor
            .exec_streaming(&cmd)
            .await
            .map_err(|e| RunError::Run { source: e })
    }
}

// ── Helper ──

fn args<const N: usize>(a: [&str; N]) -> Vec<String> {
    a.iter().map(|s| (*s).to_owned()).collect()
}

fn path_str(path: &Path) -> Result<&str, BuildError> {
    path.to_str()
        .ok_or_else(|| BuildError::InvalidPath(path.to_path_buf()))
}

/// "Docker version 27.0.3, build 7d4bcd8" → "27.0.3"
fn parse_client_version(output: &str) -> String {
    let line = output.lines().next().unwrap_or_default().trim();
    line.strip_prefix("Docker version ")
        .and_then(|rest| rest.split(',').next())
        .unwrap_or(line)
        .trim()
        .to_owned()
}

// ── Request types ──

#[derive(Debug, Clone, Copy)]
pub struct BuildRequest<'a> {
    pub context_dir: &'a Path,
    pub dockerfile: &'a Path,
    pub tag: &'a str,
    /// Named build contexts (`COPY --from=<name>`), e.g. the launcher binary
    pub extra_contexts: &'a [(&'a str, &'a Path)],
    pub capture: bool,
}

#[derive(Debug, Clone)]
pub struct RunOptions {
    /// Port override handed to the container; `None` keeps the image default
    pub port: Option<Port>,
    /// Port the image listens on when not overridden
    pub default_port: Port,
    /// Host port to publish; defaults to the container port
    pub host_port: Option<Port>,
    /// Environment variable the container reads its port from
    pub port_env: String,
}

// ── Report types ──

#[derive(Debug, Default)]
pub struct PreflightReport {
    pub client_version: Option<String>,
    pub server_version: Option<String>,
}

#[derive(Debug, Default)]
pub struct DoctorReport {
    pub docker: CheckResult,
    pub daemon: CheckResult,
    pub buildx: CheckResult,
    pub config_file: CheckResult,
    pub manifest: CheckResult,
    pub entry_module: CheckResult,
}

impl DoctorReport {
    pub fn all_passed(&self) -> bool {
        self.rows().iter().all(|(_, r)| r.passed)
    }

    fn rows(&self) -> [(&'static str, &CheckResult); 6] {
        [
            ("docker CLI", &self.docker),
            ("Docker daemon", &self.daemon),
            ("BuildKit (buildx)", &self.buildx),
            ("shipyard.toml", &self.config_file),
            ("Dependency manifest", &self.manifest),
            ("Entry module", &self.entry_module),
        ]
    }
}

impl fmt::Display for DoctorReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (label, result) in self.rows() {
            writeln!(f, "  [{}] {label:<20} {}", result.icon(), result.detail)?;
        }
        Ok(())
    }
}

#[derive(Debug, Default, Clone)]
pub struct CheckResult {
    pub passed: bool,
    pub detail: String,
}

impl CheckResult {
    pub fn ok(detail: &str) -> Self {
        Self {
            passed: true,
            detail: detail.to_owned(),
        }
    }

    pub fn fail(detail: &str) -> Self {
        Self {
            passed: false,
            detail: detail.to_owned(),
        }
    }

    pub fn icon(&self) -> &'static str {
        if self.passed { "OK" } else { "NG" }
    }
}

/// Subset of `docker image inspect` output.
#[derive(Debug, Clone, Deserialize)]
pub struct ImageSummary {
    #[serde(rename = "Id")]
    pub id: String,
    #[serde(rename = "Created", default)]
    pub created: String,
    #[serde(rename = "Size", default)]
    pub size: u64,
    #[serde(rename = "Config", default)]
    pub config: ImageRuntimeConfig,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ImageRuntimeConfig {
    #[serde(rename = "Cmd", default)]
    pub cmd: Option<Vec<String>>,
    #[serde(rename = "Env", default)]
    pub env: Option<Vec<String>>,
    #[serde(rename = "WorkingDir", default)]
    pub working_dir: String,
}

// ── Error types ──

#[derive(Debug, thiserror::Error)]
pub enum PreflightError {
    #[error("docker CLI not installed, see https://docs.docker.com/get-docker/")]
    DockerNotInstalled,

    #[error("Docker daemon not reachable, start Docker and retry")]
    DaemonUnavailable,
}

#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    #[error("build path is not valid UTF-8: {0}")]
    InvalidPath(std::path::PathBuf),

    #[error("image build failed")]
    Build { source: DockerError },
}

#[derive(Debug, thiserror::Error)]
pub enum ImageError {
    #[error("failed to inspect image")]
    Inspect { source: DockerError },

    #[error("unexpected docker image inspect output")]
    Parse { source: serde_json::Error },

    #[error("failed to remove image")]
    Remove { source: DockerError },
}

#[derive(Debug, thiserror::Error)]
pub enum RunError {
    #[error("container exited with an error")]
    Run { source: DockerError },
}
