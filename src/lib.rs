pub mod config;
pub mod domain;
pub mod error;
pub mod infra;
pub mod services;

// Make test_support available for integration tests
// In a real production crate, we might use a feature flag "test-utils"
pub mod test_support;

pub use config::{ClientConfig, EngineSettings, ImageSettings, RunSettings, load_config};
pub use domain::{
    BuildOptions, ContainerEngine, ContainerSpec, ContainerState, ImageRef, ServiceContainer,
    VERSION_LATEST,
};
pub use error::{ClientError, Result};
pub use infra::PodmanEngine;
pub use services::ImageClient;
