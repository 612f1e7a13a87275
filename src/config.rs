use anyhow::{Context, Result, bail};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Client settings loaded from `podbox.toml`.
#[derive(Debug, Clone, Deserialize, Default, PartialEq, Eq)]
#[serde(default)]
pub struct ClientConfig {
    pub engine: EngineSettings,
    pub image: ImageSettings,
    pub run: RunSettings,
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct EngineSettings {
    /// Engine CLI binary, resolved through PATH.
    pub binary: String,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            binary: "podman".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ImageSettings {
    /// Base image every built image derives from. Must ship the runtime
    /// named by `run_command`.
    pub base_image: String,
    /// Directory inside the image where packaged units are installed.
    pub install_dir: String,
    /// Runtime entry command baked into the image CMD.
    pub run_command: String,
}

impl Default for ImageSettings {
    fn default() -> Self {
        Self {
            base_image: "docker.io/podbox/runtime:latest".to_string(),
            install_dir: "/srv/units".to_string(),
            run_command: "runtime".to_string(),
        }
    }
}

impl ImageSettings {
    pub fn with_base_image(mut self, base_image: &str) -> Self {
        self.base_image = base_image.to_string();
        self
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct RunSettings {
    /// How long to wait for a service container to report running.
    pub start_timeout: String,
    /// Poll interval while waiting.
    pub start_interval: String,
}

impl Default for RunSettings {
    fn default() -> Self {
        Self {
            start_timeout: "10s".to_string(),
            start_interval: "100ms".to_string(),
        }
    }
}

impl RunSettings {
    pub fn start_timeout(&self) -> Result<Duration> {
        parse_duration(&self.start_timeout)
    }

    pub fn start_interval(&self) -> Result<Duration> {
        parse_duration(&self.start_interval)
    }
}

pub fn default_config_dir() -> PathBuf {
    std::env::var("HOME")
        .map(|home| PathBuf::from(home).join(".config/podbox"))
        .unwrap_or_else(|_| PathBuf::from("/etc/podbox"))
}

pub fn config_path(config_dir: &Path) -> PathBuf {
    config_dir.join("podbox.toml")
}

/// Loads the client config from `config_dir`. A missing file yields the
/// defaults; an unreadable or invalid file is an error.
pub fn load_config(config_dir: &Path) -> Result<ClientConfig> {
    let path = config_path(config_dir);

    if !path.exists() {
        return Ok(ClientConfig::default());
    }

    let content = fs::read_to_string(&path).with_context(|| format!("reading {:?}", path))?;
    parse_config(&content, &path)
}

fn parse_config(content: &str, path: &Path) -> Result<ClientConfig> {
    let config: ClientConfig =
        toml::from_str(content).with_context(|| format!("parsing {:?}", path))?;

    if config.engine.binary.trim().is_empty() {
        bail!("'engine.binary' in {:?} must not be blank", path);
    }
    if config.image.base_image.trim().is_empty() {
        bail!("'image.base_image' in {:?} must not be blank", path);
    }
    if config.image.install_dir.trim().is_empty() {
        bail!("'image.install_dir' in {:?} must not be blank", path);
    }
    if config.image.run_command.trim().is_empty() {
        bail!("'image.run_command' in {:?} must not be blank", path);
    }

    config
        .run
        .start_timeout()
        .with_context(|| format!("'run.start_timeout' in {:?}", path))?;
    config
        .run
        .start_interval()
        .with_context(|| format!("'run.start_interval' in {:?}", path))?;

    Ok(config)
}

pub fn parse_duration(s: &str) -> Result<Duration> {
    let s = s.trim();
    if let Some(stripped) = s.strip_suffix("ms") {
        let millis: u64 = stripped.parse()?;
        Ok(Duration::from_millis(millis))
    } else if let Some(stripped) = s.strip_suffix('s') {
        let secs: u64 = stripped.parse()?;
        Ok(Duration::from_secs(secs))
    } else if let Some(stripped) = s.strip_suffix('m') {
        let mins: u64 = stripped.parse()?;
        Ok(Duration::from_secs(mins * 60))
    } else {
        Err(anyhow::anyhow!("invalid duration format: {}", s))
    }
}
