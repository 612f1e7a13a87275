pub mod build_context;
pub mod podman_engine;

pub use build_context::BuildContext;
pub use podman_engine::PodmanEngine;
