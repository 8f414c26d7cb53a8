//! Client and connection-config resolution
//!
//! Resolution order matches what test environments expect: in-cluster
//! service-account credentials first, then the local kubeconfig under its
//! default loading rules (`KUBECONFIG` env honored). An explicit path skips
//! both and reads exactly that file.

use std::path::Path;

use kube::config::{KubeConfigOptions, Kubeconfig};
use kube::{Client, Config};
use semver::Version;

use crate::clusters::error::ClusterError;

/// Resolve a connection config for an already-running cluster.
pub async fn resolve_config(kubeconfig: Option<&Path>) -> Result<Config, ClusterError> {
    if let Some(path) = kubeconfig {
        let kc = Kubeconfig::read_from(path).map_err(|e| {
            ClusterError::ConfigResolution(format!(
                "failed to read kubeconfig {}: {}",
                path.display(),
                e
            ))
        })?;
        return Config::from_custom_kubeconfig(kc, &KubeConfigOptions::default())
            .await
            .map_err(|e| {
                ClusterError::ConfigResolution(format!(
                    "failed to load kubeconfig {}: {}",
                    path.display(),
                    e
                ))
            });
    }

    let incluster_err = match Config::incluster() {
        Ok(config) => return Ok(config),
        Err(e) => e,
    };

    crate::log_info!("Not running in-cluster, falling back to local kubeconfig");

    let kc = Kubeconfig::read().map_err(|e| {
        ClusterError::ConfigResolution(format!(
            "in-cluster: {incluster_err}; kubeconfig: {e}"
        ))
    })?;

    Config::from_custom_kubeconfig(kc, &KubeConfigOptions::default())
        .await
        .map_err(|e| {
            ClusterError::ConfigResolution(format!(
                "in-cluster: {incluster_err}; kubeconfig: {e}"
            ))
        })
}

/// Build an API client, keeping the resolved config alongside it.
pub async fn build_client(kubeconfig: Option<&Path>) -> Result<(Client, Config), ClusterError> {
    let config = resolve_config(kubeconfig).await?;
    let client = Client::try_from(config.clone())?;
    Ok((client, config))
}

/// Parse a server `gitVersion` string into a semantic version.
///
/// The API server reports versions with a leading `v` ("v1.28.0"); that
/// prefix is stripped before parsing.
pub fn parse_git_version(git_version: &str) -> Result<Version, ClusterError> {
    let trimmed = git_version.strip_prefix('v').unwrap_or(git_version);
    Version::parse(trimmed).map_err(|e| ClusterError::InvalidVersion {
        raw: git_version.to_string(),
        source: e,
    })
}
