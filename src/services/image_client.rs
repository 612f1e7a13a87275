use crate::config::{ClientConfig, ImageSettings};
use crate::domain::{
    BuildOptions, ContainerEngine, ContainerSpec, ContainerState, ImageRef, ServiceContainer,
};
use crate::error::{ClientError, Result};
use crate::infra::BuildContext;
use std::path::PathBuf;
use std::sync::Arc;
use std::thread;
use std::time::Instant;
use tracing::{debug, info};
use uuid::Uuid;

/// Facade over the container engine for packaged function and service
/// units: builds images, queries and deletes them, runs them as containers
/// and stops the containers again.
///
/// The client keeps no state of its own between calls; the engine is the
/// source of truth, and every image or container a caller creates is the
/// caller's to delete.
pub struct ImageClient {
    engine: Arc<dyn ContainerEngine>,
    config: ClientConfig,
}

impl ImageClient {
    pub fn new(engine: Arc<dyn ContainerEngine>, config: ClientConfig) -> Self {
        Self { engine, config }
    }

    /// Wires the client to the local podman-compatible engine named in
    /// `config`.
    pub fn with_local_engine(config: ClientConfig) -> Self {
        let engine = Arc::new(crate::infra::PodmanEngine::new(config.engine.binary.clone()));
        Self::new(engine, config)
    }

    /// Builds a run-to-completion image from inline artifact text.
    ///
    /// The image is named `lowercase(unit_name):latest` unless a custom
    /// name and version are given; a custom name without a version is
    /// rejected before the engine is contacted.
    pub fn create_main_image(
        &self,
        unit_name: &str,
        options: Option<&BuildOptions>,
        artifact: &str,
        image_name: Option<&str>,
        image_version: Option<&str>,
    ) -> Result<ImageRef> {
        let image = ImageRef::resolve(unit_name, image_name, image_version)?;

        if artifact.trim().is_empty() {
            return Err(ClientError::InvalidArgument(
                "main artifact text must not be empty".into(),
            ));
        }

        let settings = self.build_settings(options);
        let context = BuildContext::for_main_unit(&settings, unit_name, artifact)?;

        info!("building main image {image}");
        self.engine
            .build_image(&image.reference(), context.containerfile(), context.dir())?;

        Ok(image)
    }

    /// Builds a long-running service image from packaged unit files.
    ///
    /// Every path must point to an existing file (`~` is expanded first)
    /// and the set must not be empty. Naming follows the same rules as
    /// `create_main_image`.
    pub fn create_service_image(
        &self,
        unit_name: &str,
        options: Option<&BuildOptions>,
        packages: &[PathBuf],
        image_name: Option<&str>,
        image_version: Option<&str>,
    ) -> Result<ImageRef> {
        let image = ImageRef::resolve(unit_name, image_name, image_version)?;

        if packages.is_empty() {
            return Err(ClientError::InvalidArgument(
                "at least one package path is required".into(),
            ));
        }
        let packages = resolve_packages(packages)?;

        let settings = self.build_settings(options);
        let context = BuildContext::for_service_unit(&settings, &packages)?;

        info!("building service image {image}");
        self.engine
            .build_image(&image.reference(), context.containerfile(), context.dir())?;

        Ok(image)
    }

    /// Looks up an image by name, matching any version. A miss is not an
    /// error: the result is `None`, for a blank name too. Does not touch
    /// engine state.
    pub fn get_image(&self, name: &str) -> Result<Option<ImageRef>> {
        let name = name.trim();
        if name.is_empty() {
            return Ok(None);
        }

        let images = self.engine.list_images()?;
        Ok(images
            .iter()
            .filter_map(|reference| ImageRef::parse(reference))
            .find(|image| image.name == name))
    }

    /// Deletes an image by name, optionally pinned to a version. Deleting
    /// an image that does not exist is not an error; it reports `false`.
    pub fn delete_image(&self, name: &str, version: Option<&str>) -> Result<bool> {
        let images = self.engine.list_images()?;
        let found = images
            .iter()
            .filter_map(|reference| ImageRef::parse(reference))
            .find(|image| {
                image.name == name && version.is_none_or(|version| image.version == version)
            });

        match found {
            Some(image) => {
                info!("deleting image {image}");
                self.engine.remove_image(&image.reference())?;
                Ok(true)
            }
            None => {
                debug!("image {name} not present, nothing to delete");
                Ok(false)
            }
        }
    }

    /// Runs a main image to completion, blocking until the container
    /// process exits. The image is looked up by name, any version.
    ///
    /// Returns the captured process output; capture is not wired up yet,
    /// so the result is currently always `None`. The exited container is
    /// left in place for the caller to remove.
    pub fn run_main_container(&self, image_name: &str) -> Result<Option<String>> {
        let image = self
            .get_image(image_name)?
            .ok_or_else(|| ClientError::ImageNotFound {
                reference: image_name.to_string(),
            })?;

        let reference = image.reference();
        let name = container_name(&image.name);
        let spec = ContainerSpec {
            name: &name,
            image: &reference,
            publish_all_ports: false,
        };

        info!("running main container {name} from {reference}");
        let id = self.engine.create_container(&spec)?;
        self.engine.start_container(&id)?;
        let status = self.engine.wait_container(&id)?;

        if status != 0 {
            return Err(anyhow::anyhow!(
                "main container {name} exited with status {status}"
            )
            .into());
        }

        // TODO: surface captured stdout once the engine boundary exposes
        // log streaming
        Ok(None)
    }

    /// Starts a long-running service container from an exact image
    /// reference (`name:version`) and hands back a stoppable handle once
    /// the engine reports the container running.
    ///
    /// A reference that does not resolve to an existing image is an error;
    /// in particular a bare name never matches.
    pub fn run_service_container(&self, image_reference: &str) -> Result<ServiceContainer> {
        let images = self.engine.list_images()?;
        if !images.iter().any(|reference| reference == image_reference) {
            return Err(ClientError::ImageNotFound {
                reference: image_reference.to_string(),
            });
        }

        let base_name = image_reference
            .split_once(':')
            .map_or(image_reference, |(name, _)| name);
        let name = container_name(base_name);
        let spec = ContainerSpec {
            name: &name,
            image: image_reference,
            publish_all_ports: true,
        };

        info!("starting service container {name} from {image_reference}");
        let id = self.engine.create_container(&spec)?;
        self.engine.start_container(&id)?;
        self.wait_until_running(&id)?;

        Ok(ServiceContainer {
            container_id: id,
            container_name: name,
            image: image_reference.to_string(),
        })
    }

    /// Stops a running container. Unlike `delete_image`, a container id
    /// the engine does not know (or that is not running) is a hard error.
    pub fn stop_container(&self, container_id: &str) -> Result<bool> {
        match self.engine.inspect_container(container_id)? {
            ContainerState::Running => {
                info!("stopping container {container_id}");
                self.engine.stop_container(container_id)?;
                Ok(true)
            }
            _ => Err(ClientError::ContainerNotRunning {
                id: container_id.to_string(),
            }),
        }
    }

    fn build_settings(&self, options: Option<&BuildOptions>) -> ImageSettings {
        match options.and_then(|options| options.base_image.as_deref()) {
            Some(base_image) => self.config.image.clone().with_base_image(base_image),
            None => self.config.image.clone(),
        }
    }

    fn wait_until_running(&self, id: &str) -> Result<()> {
        let timeout = self.config.run.start_timeout()?;
        let interval = self.config.run.start_interval()?;
        let deadline = Instant::now() + timeout;

        loop {
            match self.engine.inspect_container(id)? {
                ContainerState::Running => return Ok(()),
                ContainerState::Exited => {
                    return Err(anyhow::anyhow!(
                        "container {id} exited before reaching the running state"
                    )
                    .into());
                }
                ContainerState::Created | ContainerState::Unknown => {
                    if Instant::now() >= deadline {
                        return Err(anyhow::anyhow!(
                            "container {id} did not reach the running state within {timeout:?}"
                        )
                        .into());
                    }
                    debug!("container {id} still starting");
                    thread::sleep(interval);
                }
            }
        }
    }
}

fn resolve_packages(packages: &[PathBuf]) -> Result<Vec<PathBuf>> {
    packages
        .iter()
        .map(|package| {
            let expanded =
                PathBuf::from(shellexpand::tilde(&package.to_string_lossy()).into_owned());
            if expanded.is_file() {
                Ok(expanded)
            } else {
                Err(ClientError::PackageNotFound {
                    path: package.clone(),
                })
            }
        })
        .collect()
}

fn container_name(image_name: &str) -> String {
    format!("{image_name}-{}", Uuid::new_v4())
}
