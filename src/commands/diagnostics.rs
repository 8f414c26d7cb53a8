//! Diagnostics collection commands

use anyhow::{Context, Result};
use colored::Colorize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::clusters::Cluster;
use crate::clusters::diagnostics::dump_diagnostics;
use crate::config::Settings;
use crate::utils::OperationProgress;

/// Handle diagnostics dump command
pub async fn dump(meta: String, kubeconfig: Option<PathBuf>) -> Result<()> {
    let settings = Settings::load();
    let kubeconfig = super::resolve_kubeconfig(kubeconfig, &settings);
    let cluster = super::connect(kubeconfig.as_deref()).await?;

    let progress = settings
        .behavior
        .show_progress
        .then(|| OperationProgress::new("Collecting cluster diagnostics..."));

    let result = match settings.diagnostics.out_dir.as_deref() {
        Some(base) => dump_into(&cluster, &meta, Path::new(base)).await,
        None => cluster
            .dump_diagnostics(&meta)
            .await
            .context("Failed to collect diagnostics"),
    };

    if let Some(progress) = &progress {
        match &result {
            Ok(_) => progress.finish_success("Diagnostics collected"),
            Err(_) => progress.finish_error("Diagnostics collection failed"),
        }
    }

    let out_dir = result?;
    println!("{} {}", "Diagnostics written to:".bold(), out_dir.display());

    Ok(())
}

/// Dump under a caller-chosen base directory instead of the system temp dir.
async fn dump_into(cluster: &dyn Cluster, meta: &str, base: &Path) -> Result<PathBuf> {
    fs::create_dir_all(base)
        .with_context(|| format!("Failed to create diagnostics base dir {}", base.display()))?;

    let out_dir = tempfile::Builder::new()
        .prefix("ktf-diag-")
        .tempdir_in(base)
        .context("Failed to create diagnostics directory")?
        .keep();

    dump_diagnostics(cluster, meta, &out_dir)
        .await
        .context("Failed to collect diagnostics")?;

    Ok(out_dir)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    #[ignore] // Requires real cluster
    async fn test_dump_into_custom_dir() {
        use crate::clusters::generic::GenericCluster;

        let cluster = GenericCluster::connect().await.expect("Should connect");
        let base = tempfile::tempdir().expect("Should create base dir");

        let out_dir = dump_into(&cluster, "test", base.path())
            .await
            .expect("Should collect diagnostics");

        assert!(out_dir.starts_with(base.path()));
        assert!(out_dir.join("meta.txt").exists());
    }
}
