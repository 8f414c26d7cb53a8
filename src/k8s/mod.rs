//! Kubernetes connection plumbing

pub mod client;

pub use client::{build_client, parse_git_version, resolve_config};
