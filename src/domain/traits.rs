use super::{ContainerSpec, ContainerState};
use anyhow::Result;
use std::fmt::Debug;
use std::path::Path;

/// Narrow boundary to the container engine.
///
/// Engine failures are reported through `anyhow`; the client maps them into
/// its own error type at the facade boundary.
pub trait ContainerEngine: Send + Sync + Debug {
    /// Build an image from a staged context directory
    fn build_image(&self, tag: &str, containerfile: &Path, context_dir: &Path) -> Result<()>;

    /// References (`name:version`) of every image the engine knows
    fn list_images(&self) -> Result<Vec<String>>;

    /// Remove an image by reference
    fn remove_image(&self, reference: &str) -> Result<()>;

    /// Create a container; returns the engine-assigned container id
    fn create_container(&self, spec: &ContainerSpec) -> Result<String>;

    /// Start a created container
    fn start_container(&self, id: &str) -> Result<()>;

    /// Stop a running container
    fn stop_container(&self, id: &str) -> Result<()>;

    /// Block until the container exits; returns its exit status
    fn wait_container(&self, id: &str) -> Result<i64>;

    /// Current state of a container, `Unknown` when the engine has no
    /// record of the id
    fn inspect_container(&self, id: &str) -> Result<ContainerState>;
}
