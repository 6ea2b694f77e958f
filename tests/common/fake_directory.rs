//! In-memory Cluster Directory for driving refresh cycles without a cluster.
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use certwatch::cluster::CertificateDirectory;
use certwatch::error::DirectoryError;
use certwatch::models::CertificateSource;

#[derive(Default)]
pub struct FakeDirectory {
    enumeration_denied: bool,
    namespaces: Vec<String>,
    sources: HashMap<String, Vec<CertificateSource>>,
    denied_namespaces: HashSet<String>,
    payloads: HashMap<(String, String), Option<Vec<u8>>>,
    hanging_secrets: HashSet<String>,
}

impl FakeDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Namespace listing itself is refused.
    pub fn deny_enumeration(mut self) -> Self {
        self.enumeration_denied = true;
        self
    }

    pub fn namespace(mut self, namespace: &str) -> Self {
        if !self.namespaces.iter().any(|n| n == namespace) {
            self.namespaces.push(namespace.to_string());
        }
        self
    }

    /// Listing sources in `namespace` is refused.
    pub fn deny_namespace(mut self, namespace: &str) -> Self {
        self = self.namespace(namespace);
        self.denied_namespaces.insert(namespace.to_string());
        self
    }

    /// An ingress in `namespace` referencing `secret` for `hosts`, whose secret holds `pem`.
    pub fn ingress(self, namespace: &str, owner: &str, secret: &str, hosts: &[&str], pem: &str) -> Self {
        self.source(namespace, owner, secret, hosts, Some(pem.as_bytes().to_vec()))
    }

    /// A source whose secret lacks the `tls.crt` key.
    pub fn without_payload(self, namespace: &str, owner: &str, secret: &str) -> Self {
        self.source(namespace, owner, secret, &[], None)
    }

    /// A source whose raw `tls.crt` bytes are `data`.
    pub fn raw_payload(self, namespace: &str, owner: &str, secret: &str, data: &[u8]) -> Self {
        self.source(namespace, owner, secret, &[], Some(data.to_vec()))
    }

    /// A source whose secret was deleted after listing.
    pub fn deleted_secret(mut self, namespace: &str, owner: &str, secret: &str) -> Self {
        self = self.namespace(namespace);
        self.sources
            .entry(namespace.to_string())
            .or_default()
            .push(CertificateSource::new(owner, namespace, secret, Vec::new()));
        self
    }

    /// Fetching `secret` never completes.
    pub fn hanging(mut self, namespace: &str, owner: &str, secret: &str) -> Self {
        self = self.deleted_secret(namespace, owner, secret);
        self.hanging_secrets.insert(secret.to_string());
        self
    }

    fn source(mut self, namespace: &str, owner: &str, secret: &str, hosts: &[&str], payload: Option<Vec<u8>>) -> Self {
        self = self.namespace(namespace);
        self.sources.entry(namespace.to_string()).or_default().push(CertificateSource::new(
            owner,
            namespace,
            secret,
            hosts.iter().map(|h| h.to_string()).collect(),
        ));
        self.payloads
            .insert((namespace.to_string(), secret.to_string()), payload);
        self
    }
}

#[async_trait]
impl CertificateDirectory for FakeDirectory {
    async fn list_namespaces(&self) -> Result<Vec<String>, DirectoryError> {
        if self.enumeration_denied {
            return Err(DirectoryError::AccessDenied("namespaces is forbidden".to_string()));
        }
        Ok(self.namespaces.clone())
    }

    async fn list_tls_sources(&self, namespace: &str) -> Result<Vec<CertificateSource>, DirectoryError> {
        if self.denied_namespaces.contains(namespace) {
            return Err(DirectoryError::AccessDenied(format!("ingresses in {namespace} is forbidden")));
        }
        Ok(self.sources.get(namespace).cloned().unwrap_or_default())
    }

    async fn fetch_certificate_payload(
        &self,
        namespace: &str,
        secret_name: &str,
    ) -> Result<Option<Vec<u8>>, DirectoryError> {
        if self.hanging_secrets.contains(secret_name) {
            tokio::time::sleep(Duration::from_secs(24 * 3600)).await;
        }

        self.payloads
            .get(&(namespace.to_string(), secret_name.to_string()))
            .cloned()
            .ok_or_else(|| DirectoryError::NotFound {
                kind: "secret",
                namespace: namespace.to_string(),
                name: secret_name.to_string(),
            })
    }
}

/// Delegates to a [`FakeDirectory`] that tests can replace between cycles.
pub struct SwappableDirectory {
    current: Mutex<Arc<FakeDirectory>>,
}

impl SwappableDirectory {
    pub fn new(directory: FakeDirectory) -> Self {
        Self {
            current: Mutex::new(Arc::new(directory)),
        }
    }

    pub fn replace(&self, directory: FakeDirectory) {
        *self.current.lock().unwrap() = Arc::new(directory);
    }

    fn current(&self) -> Arc<FakeDirectory> {
        Arc::clone(&self.current.lock().unwrap())
    }
}

#[async_trait]
impl CertificateDirectory for SwappableDirectory {
    async fn list_namespaces(&self) -> Result<Vec<String>, DirectoryError> {
        self.current().list_namespaces().await
    }

    async fn list_tls_sources(&self, namespace: &str) -> Result<Vec<CertificateSource>, DirectoryError> {
        self.current().list_tls_sources(namespace).await
    }

    async fn fetch_certificate_payload(
        &self,
        namespace: &str,
        secret_name: &str,
    ) -> Result<Option<Vec<u8>>, DirectoryError> {
        self.current().fetch_certificate_payload(namespace, secret_name).await
    }
}
