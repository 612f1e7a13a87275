use crate::error::{ClientError, Result};
use std::fmt;

/// Version applied when the caller does not pick one.
pub const VERSION_LATEST: &str = "latest";

/// Identity of a built image, addressed as `name:version`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageRef {
    pub name: String,
    pub version: String,
}

impl ImageRef {
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
        }
    }

    /// Resolves the image identity for a packaged unit.
    ///
    /// Without a custom name the image is named after the lowercased unit
    /// name. A custom name must come with a version; a version on its own
    /// is applied to the lowercased unit name. The default version is
    /// `latest`.
    pub fn resolve(
        unit_name: &str,
        custom_name: Option<&str>,
        custom_version: Option<&str>,
    ) -> Result<Self> {
        if unit_name.trim().is_empty() {
            return Err(ClientError::InvalidArgument(
                "unit name must not be empty".into(),
            ));
        }

        match (custom_name, custom_version) {
            (Some(name), _) if name.trim().is_empty() => Err(ClientError::InvalidArgument(
                "custom image name must not be blank".into(),
            )),
            (Some(name), Some(version)) => Ok(Self::new(name, version)),
            (Some(name), None) => Err(ClientError::MissingVersion {
                name: name.to_string(),
            }),
            (None, Some(version)) => Ok(Self::new(unit_name.to_lowercase(), version)),
            (None, None) => Ok(Self::new(unit_name.to_lowercase(), VERSION_LATEST)),
        }
    }

    /// Parses a `name:version` string. A bare name carries no version and
    /// parses to nothing.
    pub fn parse(reference: &str) -> Option<Self> {
        let (name, version) = reference.split_once(':')?;
        if name.is_empty() || version.is_empty() {
            return None;
        }
        Some(Self::new(name, version))
    }

    pub fn reference(&self) -> String {
        format!("{}:{}", self.name, self.version)
    }
}

impl fmt::Display for ImageRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.name, self.version)
    }
}

/// Per-build knobs. Everything engine-wide lives in `ClientConfig`.
#[derive(Debug, Clone, Default)]
pub struct BuildOptions {
    /// Overrides the configured base image for this build only.
    pub base_image: Option<String>,
}
