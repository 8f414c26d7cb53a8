//! Cluster inspection commands

use anyhow::{Context, Result};
use colored::Colorize;
use k8s_openapi::api::core::v1::Node;
use kube::api::{Api, ListParams};
use std::path::PathBuf;

use crate::clusters::Cluster;
use crate::config::Settings;

/// Handle cluster info command
pub async fn info(kubeconfig: Option<PathBuf>) -> Result<()> {
    let settings = Settings::load();
    let kubeconfig = super::resolve_kubeconfig(kubeconfig, &settings);
    let cluster = super::connect(kubeconfig.as_deref()).await?;

    crate::log_info!("Querying cluster info...");

    let version = cluster
        .version()
        .await
        .context("Failed to query server version")?;

    let nodes: Api<Node> = Api::all(cluster.client().clone());
    let node_count = nodes
        .list(&ListParams::default())
        .await
        .context("Failed to list nodes")?
        .items
        .len();

    println!("{} {}", "Cluster:".bold(), cluster.name());
    println!("{} {}", "Type:".bold(), cluster.cluster_type());
    println!("{} {}", "Server:".bold(), cluster.config().cluster_url);
    println!("{} {}", "Version:".bold(), version);
    println!("{} {}", "Nodes:".bold(), node_count);

    Ok(())
}

/// Handle cluster version command
pub async fn version(kubeconfig: Option<PathBuf>) -> Result<()> {
    let settings = Settings::load();
    let kubeconfig = super::resolve_kubeconfig(kubeconfig, &settings);
    let cluster = super::connect(kubeconfig.as_deref()).await?;

    let version = cluster
        .version()
        .await
        .context("Failed to query server version")?;

    println!("{}", version);

    Ok(())
}
