use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum DockerError {
    #[error("failed to start {program}, see https://docs.docker.com/get-docker/")]
    NotFound {
        program: PathBuf,
        source: std::io::Error,
    },

    #[error("docker {} failed:\n{stderr}", args.join(" "))]
    CommandFailed { args: Vec<String>, stderr: String },

    #[error("docker output was not valid UTF-8")]
    InvalidUtf8 { source: std::string::FromUtf8Error },

    #[error("failed to read docker output")]
    Output { source: std::io::Error },
}
