//! Deployment targets and their per-target settings.

use std::fmt;
use std::str::FromStr;

use crate::ConfigError;

/// Environment a render or deploy is aimed at.
///
/// Passed explicitly into every render call; there is no process-wide
/// "current target".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DeploymentTarget {
    Production,
    Staging,
    #[default]
    Development,
}

impl DeploymentTarget {
    /// Lowercase name as used on the command line and in `APP_CONFIG`.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Production => "production",
            Self::Staging => "staging",
            Self::Development => "development",
        }
    }

    /// Whether this target has S3 buckets to publish to.
    #[must_use]
    pub fn is_deployed(self) -> bool {
        !matches!(self, Self::Development)
    }
}

impl fmt::Display for DeploymentTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DeploymentTarget {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "production" => Ok(Self::Production),
            "staging" => Ok(Self::Staging),
            "development" | "dev" => Ok(Self::Development),
            other => Err(ConfigError::UnknownTarget(other.to_owned())),
        }
    }
}

/// Settings that depend on the deployment target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetSettings {
    /// Buckets the site is published to (empty for development).
    pub s3_buckets: Vec<String>,
    /// Base URL the rendered site is reachable at.
    pub s3_base_url: String,
    /// Client-side debug flag.
    pub debug: bool,
}
