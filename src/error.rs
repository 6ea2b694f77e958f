//! Error types shared across the refresh pipeline.
//!
//! `RefreshError`'s `Display` output is what operators read in the status
//! document, so every variant names the object it concerns.

use std::time::Duration;

use thiserror::Error;

/// Failures decoding a certificate payload.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("tls.crt does not exist in {namespace}/{name}")]
    MissingPayload { namespace: String, name: String },

    #[error("tls.crt for {namespace}/{name} is empty")]
    EmptyPayload { namespace: String, name: String },

    #[error("failed to decode certificate {namespace}/{name}: {reason}")]
    DecodeFailure {
        namespace: String,
        name: String,
        reason: String,
    },

    #[error("failed to parse certificate {namespace}/{name}: {reason}")]
    ParseFailure {
        namespace: String,
        name: String,
        reason: String,
    },
}

/// Failures talking to the Cluster Directory.
#[derive(Debug, Error)]
pub enum DirectoryError {
    #[error("{kind} {namespace}/{name} not found")]
    NotFound {
        kind: &'static str,
        namespace: String,
        name: String,
    },

    #[error("access denied: {0}")]
    AccessDenied(String),

    #[error("{operation} timed out after {}s", .timeout.as_secs())]
    Timeout {
        operation: String,
        timeout: Duration,
    },

    #[error("kubernetes API error: {0}")]
    Api(#[from] kube::Error),
}

/// Categorized failures of a single refresh cycle.
#[derive(Debug, Error)]
pub enum RefreshError {
    #[error("failed to list namespaces: {0}")]
    Enumeration(#[source] DirectoryError),

    #[error("failed to list TLS sources in namespace {namespace}: {source}")]
    NamespaceListing {
        namespace: String,
        #[source]
        source: DirectoryError,
    },

    #[error("failed to fetch secret {namespace}/{secret_name} for {owner}: {source}")]
    SourceFetch {
        namespace: String,
        secret_name: String,
        owner: String,
        #[source]
        source: DirectoryError,
    },

    #[error(transparent)]
    Parse(#[from] ParseError),
}

/// Failures building the kube client at startup.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("no readable kubeconfig in {0}")]
    NoKubeconfig(String),

    #[error("invalid kubeconfig: {0}")]
    Kubeconfig(#[from] kube::config::KubeconfigError),

    #[error("no in-cluster configuration and no kubeconfig found: {0}")]
    InCluster(#[from] kube::config::InClusterError),

    #[error("failed to create kubernetes client: {0}")]
    Client(#[from] kube::Error),
}
