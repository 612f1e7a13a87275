use crate::domain::{ContainerEngine, ContainerSpec, ContainerState};
use anyhow::{Context, Result, bail};
use std::ffi::OsStr;
use std::path::Path;
use std::process::{Command, ExitStatus, Output, Stdio};

/// Engine adapter driving a podman-compatible CLI over subprocess calls.
#[derive(Debug, Clone)]
pub struct PodmanEngine {
    binary: String,
}

impl PodmanEngine {
    pub fn new(binary: impl Into<String>) -> Self {
        Self {
            binary: binary.into(),
        }
    }

    pub fn is_available(&self) -> bool {
        Command::new(&self.binary)
            .arg("--version")
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .map(|s| s.success())
            .unwrap_or(false)
    }

    fn run<I, S>(&self, args: I, context: &str) -> Result<()>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        let output = self.output(args, context)?;
        ensure_success(&output, context)?;
        Ok(())
    }

    fn capture<I, S>(&self, args: I, context: &str) -> Result<String>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        let output = self.output(args, context)?;
        ensure_success(&output, context)?;
        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }

    fn output<I, S>(&self, args: I, context: &str) -> Result<Output>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        Command::new(&self.binary)
            .args(args.into_iter().map(|item| item.as_ref().to_os_string()))
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .with_context(|| context.to_string())
    }
}

impl Default for PodmanEngine {
    fn default() -> Self {
        Self::new("podman")
    }
}

impl ContainerEngine for PodmanEngine {
    fn build_image(&self, tag: &str, containerfile: &Path, context_dir: &Path) -> Result<()> {
        self.run(
            [
                OsStr::new("build"),
                OsStr::new("-t"),
                OsStr::new(tag),
                OsStr::new("-f"),
                containerfile.as_os_str(),
                context_dir.as_os_str(),
            ],
            &format!("building image {tag} from {:?}", containerfile),
        )
    }

    fn list_images(&self) -> Result<Vec<String>> {
        let stdout = self.capture(
            ["images", "--format", "{{.Repository}}:{{.Tag}}"],
            "listing images",
        )?;
        Ok(stdout
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(str::to_string)
            .collect())
    }

    fn remove_image(&self, reference: &str) -> Result<()> {
        self.run(["rmi", reference], &format!("removing image {reference}"))
    }

    fn create_container(&self, spec: &ContainerSpec) -> Result<String> {
        let mut args: Vec<String> = vec!["create".into(), "--name".into(), spec.name.into()];

        if spec.publish_all_ports {
            args.push("--publish-all".into());
        }

        args.push(spec.image.into());

        // podman prints the new container id on stdout
        self.capture(args, &format!("creating container {}", spec.name))
    }

    fn start_container(&self, id: &str) -> Result<()> {
        self.run(["start", id], &format!("starting container {id}"))
    }

    fn stop_container(&self, id: &str) -> Result<()> {
        self.run(["stop", id], &format!("stopping container {id}"))
    }

    fn wait_container(&self, id: &str) -> Result<i64> {
        let stdout = self.capture(["wait", id], &format!("waiting for container {id}"))?;
        stdout
            .parse()
            .with_context(|| format!("parsing exit status {stdout:?} of container {id}"))
    }

    fn inspect_container(&self, id: &str) -> Result<ContainerState> {
        let output = self.output(
            [
                "container",
                "inspect",
                id,
                "--format",
                "{{.State.Status}}",
            ],
            &format!("inspecting container {id}"),
        )?;

        if !output.status.success() {
            return Ok(ContainerState::Unknown);
        }

        let status = String::from_utf8_lossy(&output.stdout).trim().to_lowercase();
        Ok(match status.as_str() {
            "created" | "configured" | "initialized" => ContainerState::Created,
            "running" => ContainerState::Running,
            "exited" | "stopped" => ContainerState::Exited,
            _ => ContainerState::Unknown,
        })
    }
}

fn ensure_success(output: &Output, context: &str) -> Result<()> {
    if output.status.success() {
        return Ok(());
    }

    let stderr = String::from_utf8_lossy(&output.stderr);
    bail!(
        "engine returned status {:?} ({context}): {}",
        status_code(output.status),
        stderr.trim()
    )
}

fn status_code(status: ExitStatus) -> i32 {
    status.code().unwrap_or(-1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_binary_is_not_available() {
        let engine = PodmanEngine::new("podbox-no-such-engine-binary");
        assert!(!engine.is_available());
    }

    #[test]
    fn missing_binary_fails_with_context() {
        let engine = PodmanEngine::new("podbox-no-such-engine-binary");
        let err = engine.list_images().unwrap_err();
        assert!(err.to_string().contains("listing images"));
    }
}
