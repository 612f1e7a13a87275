use std::path::PathBuf;

pub type Result<T> = std::result::Result<T, ClientError>;

/// Single error type raised by every failing client operation.
///
/// Outcomes that are part of the normal contract are not errors: querying an
/// image that does not exist yields `Ok(None)` and deleting an image that
/// does not exist yields `Ok(false)`.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// A required argument was missing or blank.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// A custom image name was supplied without a version.
    #[error("image name '{name}' requires an explicit version")]
    MissingVersion { name: String },

    /// A packaged unit path does not point to an existing file.
    #[error("package not found: {path}")]
    PackageNotFound { path: PathBuf },

    /// A run operation referenced an image the engine does not know.
    #[error("image not found: {reference}")]
    ImageNotFound { reference: String },

    /// `stop_container` referenced a container that is not running.
    #[error("no running container with id '{id}'")]
    ContainerNotRunning { id: String },

    /// The underlying container engine failed.
    #[error(transparent)]
    Engine(#[from] anyhow::Error),
}
