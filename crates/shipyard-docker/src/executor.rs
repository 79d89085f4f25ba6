use std::collections::VecDeque;
use std::path::PathBuf;
use std::process::Stdio;

use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::Command;

use crate::docker::DockerError;

/// Lines of stderr kept for the error when a streamed command fails.
const STDERR_TAIL: usize = 20;

/// Runs docker CLI commands. The client only talks to docker through this
/// trait; tests substitute a mockall mock.
#[allow(async_fn_in_trait)]
pub trait DockerExecutor: Send + Sync {
    /// Run to completion and return stdout.
    async fn exec(&self, args: &[String]) -> Result<String, DockerError>;

    /// Run with output shown live. On failure the error carries the tail
    /// of stderr (e.g. the failing `pip install` lines).
    async fn exec_streaming(&self, args: &[String]) -> Result<(), DockerError>;
}

/// Executor backed by a docker-compatible CLI binary.
#[derive(Debug, Clone)]
pub struct RealExecutor {
    program: PathBuf,
}

impl RealExecutor {
    /// Uses `$SHIPYARD_DOCKER` when set (e.g. `podman`), otherwise `docker`.
    pub fn new() -> Self {
        let program = std::env::var_os("SHIPYARD_DOCKER")
            .filter(|p| !p.is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("docker"));
        Self::with_program(program)
    }

    pub fn with_program(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }

    fn command(&self, args: &[String]) -> Command {
        let mut cmd = Command::new(&self.program);
        // `--build-context` needs BuildKit even on older engines.
        cmd.args(args).env("DOCKER_BUILDKIT", "1");
        cmd
    }

    fn not_found(&self, source: std::io::Error) -> DockerError {
        DockerError::NotFound {
            program: self.program.clone(),
            source,
        }
    }
}

impl Default for RealExecutor {
    fn default() -> Self {
        Self::new()
    }
}

impl DockerExecutor for RealExecutor {
    async fn exec(&self, args: &[String]) -> Result<String, DockerError> {
        tracing::debug!(program = %self.program.display(), ?args, "exec");
        let output = self
            .command(args)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await
            .map_err(|e| self.not_found(e))?;

        if !output.status.success() {
            return Err(DockerError::CommandFailed {
                args: args.to_vec(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_owned(),
            });
        }
        String::from_utf8(output.stdout).map_err(|e| DockerError::InvalidUtf8 { source: e })
    }

    async fn exec_streaming(&self, args: &[String]) -> Result<(), DockerError> {
        tracing::debug!(program = %self.program.display(), ?args, "exec (streaming)");
        let mut child = self
            .command(args)
            .stdout(Stdio::inherit())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| self.not_found(e))?;

        // Echo stderr as it arrives, remembering the last lines.
        let mut tail = VecDeque::with_capacity(STDERR_TAIL);
        if let Some(stderr) = child.stderr.take() {
            let mut lines = BufReader::new(stderr).lines();
            while let Some(line) = lines
                .next_line()
                .await
                .map_err(|e| DockerError::Output { source: e })?
            {
                eprintln!("{line}");
                if tail.len() == STDERR_TAIL {
                    tail.pop_front();
                }
                tail.push_back(line);
            }
        }

        let status = child
            .wait()
            .await
            .map_err(|e| DockerError::Output { source: e })?;
        if status.success() {
            Ok(())
        } else {
            let mut stderr = Vec::from(tail).join("\n");
            if stderr.is_empty() {
                stderr = format!("exit status: {status}");
            }
            Err(DockerError::CommandFailed {
                args: args.to_vec(),
                stderr,
            })
        }
    }
}
