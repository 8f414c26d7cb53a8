//! Cluster connectivity check

use anyhow::{Context, Result};
use colored::Colorize;
use std::path::PathBuf;

use crate::config::Settings;
use crate::k8s;

/// Handle check command
pub async fn check(kubeconfig: Option<PathBuf>) -> Result<()> {
    crate::log_info!("Checking cluster connectivity...");

    let settings = Settings::load();
    let kubeconfig = super::resolve_kubeconfig(kubeconfig, &settings);

    let (client, config) = k8s::build_client(kubeconfig.as_deref())
        .await
        .context("No usable connection config")?;

    println!(
        "{} Connection config resolved ({})",
        "✓".green(),
        config.cluster_url
    );

    let version = client
        .apiserver_version()
        .await
        .context("API server not reachable")?;

    println!(
        "{} API server reachable ({})",
        "✓".green(),
        version.git_version
    );

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    #[ignore] // Requires real cluster
    async fn test_check_against_live_cluster() {
        check(None).await.expect("Should pass connectivity check");
    }
}
