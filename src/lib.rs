//! ktf - Kubernetes testing framework cluster toolkit
//!
//! A pluggable cluster abstraction for test environments. The library
//! exposes the [`Cluster`] and [`Addon`] traits plus the generic backend,
//! which attaches to any already-running Kubernetes cluster; the `ktf`
//! binary is a thin read-only CLI over it.

pub mod clusters;
pub mod commands;
pub mod config;
pub mod k8s;
pub mod utils;

pub use clusters::error::ClusterError;
pub use clusters::generic::{GENERIC_CLUSTER_TYPE, GenericCluster};
pub use clusters::{Addon, AddonName, AddonState, Cluster, ClusterType};
