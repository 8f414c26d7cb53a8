//! Generic Kubernetes cluster backend
//!
//! Attaches to any already-running cluster instead of provisioning one. The
//! connection config comes from in-cluster credentials when available,
//! otherwise from the local kubeconfig. Provisioning and teardown are out of
//! scope for this backend; [`cleanup`](Cluster::cleanup) releases nothing
//! because nothing is owned.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use kube::{Client, Config};
use semver::Version;
use tokio::sync::RwLock;

use crate::clusters::diagnostics;
use crate::clusters::error::ClusterError;
use crate::clusters::{Addon, AddonName, AddonState, Cluster, ClusterType};
use crate::k8s;

/// Cluster type tag for the generic backend.
pub const GENERIC_CLUSTER_TYPE: ClusterType = ClusterType::new("generic");

/// Prefix for diagnostics output directories.
const DIAG_DIR_PREFIX: &str = "ktf-diag-";

struct AddonEntry {
    addon: Arc<dyn Addon>,
    state: AddonState,
}

/// A [`Cluster`] backed by any pre-existing Kubernetes cluster.
pub struct GenericCluster {
    name: String,
    client: Client,
    config: Config,
    addons: RwLock<HashMap<AddonName, AddonEntry>>,
}

impl GenericCluster {
    /// Connect to the surrounding cluster: in-cluster credentials first,
    /// local kubeconfig as fallback.
    pub async fn connect() -> Result<Self, ClusterError> {
        let (client, config) = k8s::build_client(None).await?;
        Ok(Self::from_parts(client, config))
    }

    /// Connect using a specific kubeconfig file.
    pub async fn with_kubeconfig(path: &Path) -> Result<Self, ClusterError> {
        let (client, config) = k8s::build_client(Some(path)).await?;
        Ok(Self::from_parts(client, config))
    }

    /// Build a handle from an already-resolved connection config.
    pub fn from_config(config: Config) -> Result<Self, ClusterError> {
        let client = Client::try_from(config.clone())?;
        Ok(Self::from_parts(client, config))
    }

    fn from_parts(client: Client, config: Config) -> Self {
        Self {
            name: GENERIC_CLUSTER_TYPE.as_str().to_string(),
            client,
            config,
            addons: RwLock::new(HashMap::new()),
        }
    }

    /// Snapshot of registered addon names and their states.
    pub async fn addon_states(&self) -> Vec<(AddonName, AddonState)> {
        let addons = self.addons.read().await;
        let mut states: Vec<(AddonName, AddonState)> = addons
            .iter()
            .map(|(name, entry)| (name.clone(), entry.state))
            .collect();
        states.sort_by(|a, b| a.0.cmp(&b.0));
        states
    }
}

#[async_trait]
impl Cluster for GenericCluster {
    fn name(&self) -> &str {
        &self.name
    }

    fn cluster_type(&self) -> ClusterType {
        GENERIC_CLUSTER_TYPE
    }

    fn client(&self) -> &Client {
        &self.client
    }

    fn config(&self) -> &Config {
        &self.config
    }

    async fn version(&self) -> Result<Version, ClusterError> {
        let info = self.client.apiserver_version().await?;
        k8s::parse_git_version(&info.git_version)
    }

    async fn cleanup(&self) -> Result<(), ClusterError> {
        // Lifecycle hook only: generic clusters own no provisioned resources.
        let _addons = self.addons.write().await;
        Ok(())
    }

    async fn deploy_addon(&self, addon: Arc<dyn Addon>) -> Result<(), ClusterError> {
        let name = addon.name();

        {
            let mut addons = self.addons.write().await;
            if addons.contains_key(&name) {
                return Err(ClusterError::AddonAlreadyLoaded {
                    addon: name,
                    cluster: self.name.clone(),
                });
            }
            addons.insert(
                name.clone(),
                AddonEntry {
                    addon: Arc::clone(&addon),
                    state: AddonState::Pending,
                },
            );
        }

        // The registration is visible as pending while the callback runs;
        // it is finalized or rolled back depending on the outcome.
        match addon.deploy(self).await {
            Ok(()) => {
                let mut addons = self.addons.write().await;
                if let Some(entry) = addons.get_mut(&name) {
                    entry.state = AddonState::Ready;
                }
                crate::log_info!("Addon {} deployed to cluster {}", name, self.name);
                Ok(())
            }
            Err(err) => {
                let mut addons = self.addons.write().await;
                addons.remove(&name);
                Err(ClusterError::AddonDeploy {
                    addon: name,
                    reason: format!("{err:#}"),
                })
            }
        }
    }

    async fn delete_addon(&self, addon: Arc<dyn Addon>) -> Result<(), ClusterError> {
        let name = addon.name();

        // The map stays locked for the whole operation so the addon is never
        // observable half-removed.
        let mut addons = self.addons.write().await;
        if !addons.contains_key(&name) {
            return Ok(());
        }

        addon
            .delete(self)
            .await
            .map_err(|err| ClusterError::AddonDelete {
                addon: name.clone(),
                reason: format!("{err:#}"),
            })?;

        addons.remove(&name);
        crate::log_info!("Addon {} deleted from cluster {}", name, self.name);
        Ok(())
    }

    async fn get_addon(&self, name: &AddonName) -> Result<Arc<dyn Addon>, ClusterError> {
        let addons = self.addons.read().await;
        addons
            .get(name)
            .map(|entry| Arc::clone(&entry.addon))
            .ok_or_else(|| ClusterError::AddonNotFound(name.clone()))
    }

    async fn list_addons(&self) -> Vec<Arc<dyn Addon>> {
        let addons = self.addons.read().await;
        addons
            .values()
            .map(|entry| Arc::clone(&entry.addon))
            .collect()
    }

    async fn dump_diagnostics(&self, meta: &str) -> Result<PathBuf, ClusterError> {
        let out_dir = tempfile::Builder::new()
            .prefix(DIAG_DIR_PREFIX)
            .tempdir()?
            .keep();

        diagnostics::dump_diagnostics(self, meta, &out_dir).await?;
        Ok(out_dir)
    }
}

impl std::fmt::Debug for GenericCluster {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GenericCluster")
            .field("name", &self.name)
            .field("cluster_url", &self.config.cluster_url.to_string())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;
    use tokio::sync::Notify;

    /// Handle that never talks to a real cluster; API calls would fail, the
    /// addon registry does not care.
    fn offline_cluster() -> GenericCluster {
        let config = Config::new("http://127.0.0.1:8080".parse().unwrap());
        GenericCluster::from_config(config).expect("client from static config")
    }

    struct RecordingAddon {
        name: &'static str,
        fail_deploy: bool,
        fail_delete: bool,
        deploys: AtomicUsize,
        deletes: AtomicUsize,
    }

    impl RecordingAddon {
        fn with_flags(name: &'static str, fail_deploy: bool, fail_delete: bool) -> Arc<Self> {
            Arc::new(Self {
                name,
                fail_deploy,
                fail_delete,
                deploys: AtomicUsize::new(0),
                deletes: AtomicUsize::new(0),
            })
        }

        fn new(name: &'static str) -> Arc<Self> {
            Self::with_flags(name, false, false)
        }

        fn failing_deploy(name: &'static str) -> Arc<Self> {
            Self::with_flags(name, true, false)
        }

        fn failing_delete(name: &'static str) -> Arc<Self> {
            Self::with_flags(name, false, true)
        }
    }

    #[async_trait]
    impl Addon for RecordingAddon {
        fn name(&self) -> AddonName {
            AddonName::from(self.name)
        }

        async fn deploy(&self, _cluster: &dyn Cluster) -> anyhow::Result<()> {
            self.deploys.fetch_add(1, Ordering::SeqCst);
            if self.fail_deploy {
                anyhow::bail!("deploy blew up");
            }
            Ok(())
        }

        async fn delete(&self, _cluster: &dyn Cluster) -> anyhow::Result<()> {
            self.deletes.fetch_add(1, Ordering::SeqCst);
            if self.fail_delete {
                anyhow::bail!("delete blew up");
            }
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_accessors() {
        let cluster = offline_cluster();
        assert_eq!(cluster.name(), "generic");
        assert_eq!(cluster.cluster_type(), GENERIC_CLUSTER_TYPE);
        assert_eq!(cluster.cluster_type().as_str(), "generic");
    }

    #[tokio::test]
    async fn test_deploy_registers_and_finalizes() {
        let cluster = offline_cluster();
        let addon = RecordingAddon::new("metallb");

        cluster.deploy_addon(addon.clone()).await.unwrap();

        assert_eq!(addon.deploys.load(Ordering::SeqCst), 1);
        assert_eq!(cluster.list_addons().await.len(), 1);
        let states = cluster.addon_states().await;
        assert_eq!(states, vec![(AddonName::from("metallb"), AddonState::Ready)]);
    }

    #[tokio::test]
    async fn test_duplicate_deploy_rejected() {
        let cluster = offline_cluster();
        let addon = RecordingAddon::new("metallb");

        cluster.deploy_addon(addon.clone()).await.unwrap();
        let err = cluster.deploy_addon(addon.clone()).await.unwrap_err();

        assert!(matches!(err, ClusterError::AddonAlreadyLoaded { .. }));
        assert!(err.to_string().contains("metallb"));
        // Rejection happens before the callback; exactly one entry remains.
        assert_eq!(addon.deploys.load(Ordering::SeqCst), 1);
        assert_eq!(cluster.list_addons().await.len(), 1);
    }

    #[tokio::test]
    async fn test_deploy_failure_rolls_back() {
        let cluster = offline_cluster();
        let addon = RecordingAddon::failing_deploy("kong");

        let err = cluster.deploy_addon(addon.clone()).await.unwrap_err();

        assert!(matches!(err, ClusterError::AddonDeploy { .. }));
        assert!(err.to_string().contains("deploy blew up"));
        assert!(cluster.list_addons().await.is_empty());
        // A failed deploy leaves the name free for another attempt.
        cluster
            .deploy_addon(RecordingAddon::new("kong"))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_delete_unregistered_is_noop() {
        let cluster = offline_cluster();
        let addon = RecordingAddon::new("metallb");

        cluster.delete_addon(addon.clone()).await.unwrap();

        assert_eq!(addon.deletes.load(Ordering::SeqCst), 0);
        assert!(cluster.list_addons().await.is_empty());
    }

    #[tokio::test]
    async fn test_deploy_then_delete_leaves_empty_map() {
        let cluster = offline_cluster();
        let addon = RecordingAddon::new("metallb");

        cluster.deploy_addon(addon.clone()).await.unwrap();
        cluster.delete_addon(addon.clone()).await.unwrap();

        assert_eq!(addon.deletes.load(Ordering::SeqCst), 1);
        assert!(cluster.list_addons().await.is_empty());
        assert!(cluster.addon_states().await.is_empty());
    }

    #[tokio::test]
    async fn test_delete_failure_keeps_entry() {
        let cluster = offline_cluster();
        let addon = RecordingAddon::failing_delete("cert-manager");

        cluster.deploy_addon(addon.clone()).await.unwrap();
        let err = cluster.delete_addon(addon.clone()).await.unwrap_err();

        assert!(matches!(err, ClusterError::AddonDelete { .. }));
        assert_eq!(cluster.list_addons().await.len(), 1);
        assert!(cluster.get_addon(&AddonName::from("cert-manager")).await.is_ok());
    }

    #[tokio::test]
    async fn test_get_addon_missing_references_name() {
        let cluster = offline_cluster();

        let err = cluster
            .get_addon(&AddonName::from("no-such-addon"))
            .await
            .unwrap_err();

        assert!(matches!(err, ClusterError::AddonNotFound(_)));
        assert!(err.to_string().contains("no-such-addon"));
    }

    #[tokio::test]
    async fn test_cleanup_is_noop() {
        let cluster = offline_cluster();
        let addon = RecordingAddon::new("metallb");
        cluster.deploy_addon(addon).await.unwrap();

        cluster.cleanup().await.unwrap();

        // Cleanup does not touch the addon map.
        assert_eq!(cluster.list_addons().await.len(), 1);
    }

    struct GatedAddon {
        gate: Arc<Notify>,
    }

    #[async_trait]
    impl Addon for GatedAddon {
        fn name(&self) -> AddonName {
            AddonName::from("slow")
        }

        async fn deploy(&self, _cluster: &dyn Cluster) -> anyhow::Result<()> {
            self.gate.notified().await;
            Ok(())
        }

        async fn delete(&self, _cluster: &dyn Cluster) -> anyhow::Result<()> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_pending_state_visible_mid_deploy() {
        let cluster = Arc::new(offline_cluster());
        let gate = Arc::new(Notify::new());
        let addon = Arc::new(GatedAddon { gate: gate.clone() });

        let task = tokio::spawn({
            let cluster = Arc::clone(&cluster);
            let addon: Arc<dyn Addon> = addon;
            async move { cluster.deploy_addon(addon).await }
        });

        let name = AddonName::from("slow");
        loop {
            let states = cluster.addon_states().await;
            if states.contains(&(name.clone(), AddonState::Pending)) {
                break;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }

        // The pending addon is already observable.
        assert!(cluster.get_addon(&name).await.is_ok());

        gate.notify_one();
        task.await.unwrap().unwrap();

        assert_eq!(
            cluster.addon_states().await,
            vec![(name, AddonState::Ready)]
        );
    }

    #[tokio::test]
    #[ignore] // Requires real cluster
    async fn test_connect_and_version() {
        let cluster = GenericCluster::connect().await.expect("Should connect");
        let version = cluster.version().await.expect("Should query version");
        assert!(version.major >= 1);
    }
}
