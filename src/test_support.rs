use crate::domain::{ContainerEngine, ContainerSpec, ContainerState};
use anyhow::{Result, bail};
use std::collections::HashMap;
use std::path::Path;
use std::sync::RwLock;
use std::sync::atomic::{AtomicU64, Ordering};

#[derive(Debug, Clone)]
#[allow(dead_code)]
pub struct FakeContainer {
    pub id: String,
    pub name: String,
    pub image: String,
    pub state: ContainerState,
    pub publish_all_ports: bool,
}

/// In-memory engine double. Records every call, keeps image references and
/// container states, and can be told to fail a single operation kind.
#[derive(Debug)]
pub struct FakeEngine {
    images: RwLock<Vec<String>>,
    containers: RwLock<HashMap<String, FakeContainer>>,
    commands: RwLock<Vec<String>>,
    fail_on: RwLock<Option<String>>,
    exit_status: RwLock<i64>,
    next_id: AtomicU64,
}

impl FakeEngine {
    pub fn new() -> Self {
        Self {
            images: RwLock::new(Vec::new()),
            containers: RwLock::new(HashMap::new()),
            commands: RwLock::new(Vec::new()),
            fail_on: RwLock::new(None),
            exit_status: RwLock::new(0),
            next_id: AtomicU64::new(1),
        }
    }

    pub fn add_image(&self, reference: &str) {
        let mut images = self.images.write().unwrap();
        if !images.iter().any(|existing| existing == reference) {
            images.push(reference.to_string());
        }
    }

    pub fn has_image(&self, reference: &str) -> bool {
        self.images
            .read()
            .unwrap()
            .iter()
            .any(|existing| existing == reference)
    }

    pub fn container_state(&self, id: &str) -> Option<ContainerState> {
        self.containers
            .read()
            .unwrap()
            .get(id)
            .map(|container| container.state.clone())
    }

    pub fn container(&self, id: &str) -> Option<FakeContainer> {
        self.containers.read().unwrap().get(id).cloned()
    }

    pub fn set_fail_on(&self, operation: &str) {
        *self.fail_on.write().unwrap() = Some(operation.to_string());
    }

    /// Exit status reported by `wait_container` for every container.
    pub fn set_exit_status(&self, status: i64) {
        *self.exit_status.write().unwrap() = status;
    }

    pub fn commands(&self) -> Vec<String> {
        self.commands.read().unwrap().clone()
    }

    fn record(&self, command: &str) {
        self.commands.write().unwrap().push(command.to_string());
    }

    fn check_fail(&self, operation: &str) -> Result<()> {
        if let Some(ref fail_on) = *self.fail_on.read().unwrap() {
            if fail_on == operation {
                bail!("fake failure on: {}", operation);
            }
        }
        Ok(())
    }
}

impl Default for FakeEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl ContainerEngine for FakeEngine {
    fn build_image(&self, tag: &str, containerfile: &Path, context_dir: &Path) -> Result<()> {
        self.record(&format!("build:{}", tag));
        self.check_fail("build")?;

        if !containerfile.is_file() {
            bail!("missing Containerfile at {:?}", containerfile);
        }
        if !context_dir.is_dir() {
            bail!("missing build context at {:?}", context_dir);
        }

        self.add_image(tag);
        Ok(())
    }

    fn list_images(&self) -> Result<Vec<String>> {
        self.record("list_images");
        self.check_fail("list_images")?;

        Ok(self.images.read().unwrap().clone())
    }

    fn remove_image(&self, reference: &str) -> Result<()> {
        self.record(&format!("rmi:{}", reference));
        self.check_fail("rmi")?;

        let mut images = self.images.write().unwrap();
        let Some(position) = images.iter().position(|existing| existing == reference) else {
            bail!("no such image: {}", reference);
        };
        images.remove(position);
        Ok(())
    }

    fn create_container(&self, spec: &ContainerSpec) -> Result<String> {
        self.record(&format!("create:{}:{}", spec.name, spec.image));
        self.check_fail("create")?;

        if !self.has_image(spec.image) {
            bail!("no such image: {}", spec.image);
        }

        let mut containers = self.containers.write().unwrap();
        if containers.values().any(|container| container.name == spec.name) {
            bail!("container name already in use: {}", spec.name);
        }

        let id = format!("ctr-{}", self.next_id.fetch_add(1, Ordering::SeqCst));
        containers.insert(
            id.clone(),
            FakeContainer {
                id: id.clone(),
                name: spec.name.to_string(),
                image: spec.image.to_string(),
                state: ContainerState::Created,
                publish_all_ports: spec.publish_all_ports,
            },
        );
        Ok(id)
    }

    fn start_container(&self, id: &str) -> Result<()> {
        self.record(&format!("start:{}", id));
        self.check_fail("start")?;

        let mut containers = self.containers.write().unwrap();
        let Some(container) = containers.get_mut(id) else {
            bail!("no such container: {}", id);
        };
        container.state = ContainerState::Running;
        Ok(())
    }

    fn stop_container(&self, id: &str) -> Result<()> {
        self.record(&format!("stop:{}", id));
        self.check_fail("stop")?;

        let mut containers = self.containers.write().unwrap();
        let Some(container) = containers.get_mut(id) else {
            bail!("no such container: {}", id);
        };
        container.state = ContainerState::Exited;
        Ok(())
    }

    fn wait_container(&self, id: &str) -> Result<i64> {
        self.record(&format!("wait:{}", id));
        self.check_fail("wait")?;

        let mut containers = self.containers.write().unwrap();
        let Some(container) = containers.get_mut(id) else {
            bail!("no such container: {}", id);
        };
        container.state = ContainerState::Exited;
        Ok(*self.exit_status.read().unwrap())
    }

    fn inspect_container(&self, id: &str) -> Result<ContainerState> {
        self.record(&format!("inspect:{}", id));
        self.check_fail("inspect")?;

        Ok(self
            .containers
            .read()
            .unwrap()
            .get(id)
            .map(|container| container.state.clone())
            .unwrap_or(ContainerState::Unknown))
    }
}
