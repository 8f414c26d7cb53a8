//! Command implementations for the ktf CLI

pub mod check;
pub mod cluster;
pub mod diagnostics;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::clusters::generic::GenericCluster;
use crate::config::Settings;

/// Pick the kubeconfig to use: CLI flag wins over the settings file.
pub(crate) fn resolve_kubeconfig(flag: Option<PathBuf>, settings: &Settings) -> Option<PathBuf> {
    flag.or_else(|| {
        settings
            .defaults
            .kubeconfig_path
            .as_ref()
            .map(PathBuf::from)
    })
}

/// Connect to the target cluster.
pub(crate) async fn connect(kubeconfig: Option<&Path>) -> Result<GenericCluster> {
    match kubeconfig {
        Some(path) => GenericCluster::with_kubeconfig(path).await,
        None => GenericCluster::connect().await,
    }
    .context("Failed to connect to cluster")
}
