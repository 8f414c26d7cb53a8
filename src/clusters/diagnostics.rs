//! Shared diagnostics collector
//!
//! Every backend delegates here from its `dump_diagnostics` implementation.
//! The collector writes identification metadata first, then dumps cluster
//! state namespace by namespace. Pod logs are collected best effort: a pod
//! that disappears mid-collection is warned about and skipped.
//!
//! Layout of the output directory:
//!
//! ```text
//! meta.txt
//! version.json
//! addons.txt
//! namespaces/<ns>/pods.yaml
//! namespaces/<ns>/events.txt
//! namespaces/<ns>/logs/<pod>_<container>.log
//! ```

use std::fs;
use std::path::Path;

use k8s_openapi::api::core::v1::{Event, Namespace, Pod};
use kube::api::{Api, ListParams, LogParams};

use crate::clusters::Cluster;
use crate::clusters::error::ClusterError;

/// Collect diagnostics for `cluster` into `out_dir`.
///
/// The `meta` string goes to `meta.txt` so dumps taken at different times can
/// be told apart.
pub async fn dump_diagnostics(
    cluster: &dyn Cluster,
    meta: &str,
    out_dir: &Path,
) -> Result<(), ClusterError> {
    fs::write(out_dir.join("meta.txt"), format!("{meta}\n"))?;

    let version = cluster.client().apiserver_version().await?;
    let version_json = serde_json::to_string_pretty(&version)
        .map_err(|e| ClusterError::Serialize(e.to_string()))?;
    fs::write(out_dir.join("version.json"), version_json)?;

    let mut addon_listing = String::new();
    for addon in cluster.list_addons().await {
        addon_listing.push_str(&format!("{}\n", addon.name()));
    }
    fs::write(out_dir.join("addons.txt"), addon_listing)?;

    let namespaces: Api<Namespace> = Api::all(cluster.client().clone());
    for ns in namespaces.list(&ListParams::default()).await?.items {
        let Some(ns_name) = ns.metadata.name else {
            continue;
        };
        dump_namespace(cluster, &ns_name, &out_dir.join("namespaces").join(&ns_name)).await?;
    }

    Ok(())
}

async fn dump_namespace(
    cluster: &dyn Cluster,
    namespace: &str,
    ns_dir: &Path,
) -> Result<(), ClusterError> {
    crate::log_debug!("Collecting diagnostics for namespace {}", namespace);
    fs::create_dir_all(ns_dir)?;

    let pods: Api<Pod> = Api::namespaced(cluster.client().clone(), namespace);
    let pod_list = pods.list(&ListParams::default()).await?;

    let pods_yaml = serde_yaml::to_string(&pod_list.items)
        .map_err(|e| ClusterError::Serialize(e.to_string()))?;
    fs::write(ns_dir.join("pods.yaml"), pods_yaml)?;

    let events: Api<Event> = Api::namespaced(cluster.client().clone(), namespace);
    let mut event_listing = String::new();
    for event in events.list(&ListParams::default()).await?.items {
        event_listing.push_str(&format_event(&event));
        event_listing.push('\n');
    }
    fs::write(ns_dir.join("events.txt"), event_listing)?;

    let logs_dir = ns_dir.join("logs");
    fs::create_dir_all(&logs_dir)?;

    for pod in &pod_list.items {
        let Some(pod_name) = pod.metadata.name.as_deref() else {
            continue;
        };
        let containers = pod
            .spec
            .as_ref()
            .map(|spec| spec.containers.as_slice())
            .unwrap_or_default();

        for container in containers {
            let params = LogParams {
                container: Some(container.name.clone()),
                ..LogParams::default()
            };
            match pods.logs(pod_name, &params).await {
                Ok(logs) => {
                    let file = logs_dir.join(format!("{}_{}.log", pod_name, container.name));
                    fs::write(file, logs)?;
                }
                Err(err) => {
                    crate::log_warn!(
                        "Skipping logs for {}/{} container {}: {}",
                        namespace,
                        pod_name,
                        container.name,
                        err
                    );
                }
            }
        }
    }

    Ok(())
}

/// Render an event as a single `events.txt` line.
fn format_event(event: &Event) -> String {
    let last_seen = event
        .last_timestamp
        .as_ref()
        .map(|t| t.0.to_rfc3339())
        .unwrap_or_else(|| "-".to_string());
    let type_ = event.type_.as_deref().unwrap_or("-");
    let reason = event.reason.as_deref().unwrap_or("-");
    let kind = event.involved_object.kind.as_deref().unwrap_or("-");
    let name = event.involved_object.name.as_deref().unwrap_or("-");
    let message = event.message.as_deref().unwrap_or("");

    format!("{last_seen} {type_} {reason} {kind}/{name}: {message}")
}
