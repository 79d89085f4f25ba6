use shipyard_core::LauncherKind;

use crate::plan::{BuildPlan, LAUNCHER_CONTEXT, LAUNCHER_PATH, Stage};

/// Renders a [`BuildPlan`] as a single-stage Dockerfile.
pub struct DockerfileGenerator<'a> {
    plan: &'a BuildPlan,
}

impl<'a> DockerfileGenerator<'a> {
    pub fn new(plan: &'a BuildPlan) -> Self {
        Self { plan }
    }

    pub fn render(&self) -> String {
        self.plan
            .stages()
            .iter()
            .map(|stage| {
                let mut block = format!("# === Stage {}: {} ===\n", stage.rank(), stage.title());
                for line in instructions(stage) {
                    block.push_str(&line);
                    block.push('\n');
                }
                block
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

fn instructions(stage: &Stage) -> Vec<String> {
    match stage {
        Stage::Base { image } => vec![format!("FROM {image}")],
        Stage::Workdir { path, env } => {
            let mut lines = vec![format!("WORKDIR {path}")];
            lines.extend(
                env.iter()
                    .map(|(key, value)| format!("ENV {key}={}", env_value(value))),
            );
            lines
        }
        Stage::StageManifest { source, target } => vec![format!("COPY {source} ./{target}")],
        Stage::InstallDependencies { command } => vec![format!("RUN {}", exec_form(command))],
        Stage::StageSource {
            source,
            destination,
        } => vec![format!("COPY {source} {}", copy_destination(destination))],
        Stage::Entrypoint(entry) => {
            let mut lines = Vec::new();
            if entry.launcher == LauncherKind::Embedded {
                lines.push(format!(
                    "COPY --from={LAUNCHER_CONTEXT} shipyard {LAUNCHER_PATH}"
                ));
            }
            lines.push(format!("ENV {}={}", entry.port_env, entry.default_port));
            lines.push(format!("EXPOSE {}", entry.default_port));
            lines.push(format!("CMD {}", exec_form(&entry.command())));
            lines
        }
    }
}

/// JSON array form, so arguments are never re-split by a shell.
fn exec_form(args: &[String]) -> String {
    let quoted: Vec<String> = args.iter().map(|a| json_string(a)).collect();
    format!("[{}]", quoted.join(", "))
}

fn json_string(s: &str) -> String {
    serde_json::Value::String(s.to_owned()).to_string()
}

fn copy_destination(destination: &str) -> String {
    let trimmed = destination.trim_end_matches('/');
    if trimmed.is_empty() || trimmed == "." {
        ".".to_owned()
    } else if trimmed.starts_with("./") {
        format!("{trimmed}/")
    } else {
        format!("./{trimmed}/")
    }
}

fn env_value(value: &str) -> String {
    let plain = !value.is_empty()
        && value
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.' | '/' | ':' | ','));
    if plain {
        value.to_owned()
    } else {
        // Docker expands `$` inside double-quoted ENV values.
        json_string(value).replace('$', r"\$")
    }
}
