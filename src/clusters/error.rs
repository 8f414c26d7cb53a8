//! Error types for cluster operations

use thiserror::Error;

use crate::clusters::AddonName;

/// Errors from cluster backends and the shared diagnostics collector.
#[derive(Debug, Error)]
pub enum ClusterError {
    /// No usable connection config could be resolved. The message names
    /// every resolution step that was attempted.
    #[error("unable to resolve cluster connection config: {0}")]
    ConfigResolution(String),

    #[error("addon component {addon} is already loaded into cluster {cluster}")]
    AddonAlreadyLoaded { addon: AddonName, cluster: String },

    #[error("addon {0} not found")]
    AddonNotFound(AddonName),

    #[error("failed to deploy addon {addon}: {reason}")]
    AddonDeploy { addon: AddonName, reason: String },

    #[error("failed to delete addon {addon}: {reason}")]
    AddonDelete { addon: AddonName, reason: String },

    #[error("invalid server version {raw:?}: {source}")]
    InvalidVersion {
        raw: String,
        #[source]
        source: semver::Error,
    },

    #[error("Kubernetes API error: {0}")]
    Api(#[from] kube::Error),

    #[error("failed to serialize diagnostics: {0}")]
    Serialize(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
