//! Pluggable cluster abstraction for test environments
//!
//! A [`Cluster`] is a handle to a running Kubernetes cluster. Backends decide
//! where the cluster comes from (the generic backend attaches to a
//! pre-existing one); test code programs against the trait and stays
//! backend-agnostic. [`Addon`]s are externally defined capabilities deployed
//! into a cluster and tracked by name.

pub mod diagnostics;
pub mod error;
pub mod generic;

use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use kube::{Client, Config};
use semver::Version;

use crate::clusters::error::ClusterError;

/// Tag identifying which backend produced a cluster handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ClusterType(&'static str);

impl ClusterType {
    pub const fn new(tag: &'static str) -> Self {
        Self(tag)
    }

    pub fn as_str(&self) -> &'static str {
        self.0
    }
}

impl fmt::Display for ClusterType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0)
    }
}

/// Unique key for an addon within a cluster.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AddonName(String);

impl AddonName {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AddonName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for AddonName {
    fn from(name: &str) -> Self {
        Self(name.to_string())
    }
}

impl From<String> for AddonName {
    fn from(name: String) -> Self {
        Self(name)
    }
}

/// Registration state of an addon within a cluster.
///
/// An addon is `Pending` from the moment it is registered until its deploy
/// callback returns successfully. A failed deploy removes the entry, so a
/// `Pending` entry always has a deploy in flight.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddonState {
    Pending,
    Ready,
}

impl fmt::Display for AddonState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AddonState::Pending => f.write_str("pending"),
            AddonState::Ready => f.write_str("ready"),
        }
    }
}

/// An externally defined capability that can be deployed into a cluster.
///
/// Implementations receive the surrounding cluster handle so they can reach
/// the API server through it. Errors are opaque to the cluster; it only
/// decides whether to keep or roll back the registration.
#[async_trait]
pub trait Addon: Send + Sync {
    /// Unique name this addon is registered under.
    fn name(&self) -> AddonName;

    /// Deploy the addon into the given cluster.
    async fn deploy(&self, cluster: &dyn Cluster) -> anyhow::Result<()>;

    /// Remove the addon from the given cluster.
    async fn delete(&self, cluster: &dyn Cluster) -> anyhow::Result<()>;
}

impl fmt::Debug for dyn Addon {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Addon").field("name", &self.name()).finish()
    }
}

/// Uniform surface over any cluster backend.
#[async_trait]
pub trait Cluster: Send + Sync {
    /// Cluster name.
    fn name(&self) -> &str;

    /// Which backend produced this handle.
    fn cluster_type(&self) -> ClusterType;

    /// API client connected to this cluster.
    fn client(&self) -> &Client;

    /// Connection config the client was built from.
    fn config(&self) -> &Config;

    /// Server version reported by the live API.
    async fn version(&self) -> Result<Version, ClusterError>;

    /// Release any resources owned by this handle.
    async fn cleanup(&self) -> Result<(), ClusterError>;

    /// Register and deploy an addon; fails if the name is already taken.
    async fn deploy_addon(&self, addon: Arc<dyn Addon>) -> Result<(), ClusterError>;

    /// Delete a deployed addon; no-op if it was never registered.
    async fn delete_addon(&self, addon: Arc<dyn Addon>) -> Result<(), ClusterError>;

    /// Look up a registered addon by name.
    async fn get_addon(&self, name: &AddonName) -> Result<Arc<dyn Addon>, ClusterError>;

    /// Snapshot of all registered addons.
    async fn list_addons(&self) -> Vec<Arc<dyn Addon>>;

    /// Collect diagnostics into a fresh directory and return its path.
    async fn dump_diagnostics(&self, meta: &str) -> Result<PathBuf, ClusterError>;
}
