mod container;
mod image;
pub mod traits;

pub use container::{ContainerSpec, ContainerState, ServiceContainer};
pub use image::{BuildOptions, ImageRef, VERSION_LATEST};
pub use traits::ContainerEngine;
