//! Access to the TLS-bearing objects of a cluster.

pub mod directory;
pub mod kubeconfig;

use async_trait::async_trait;

use crate::error::DirectoryError;
use crate::models::CertificateSource;

pub use directory::{KubeDirectory, SourceKind};
pub use kubeconfig::build_client;

/// Key holding the PEM certificate chain in a `kubernetes.io/tls` Secret.
pub const TLS_CERT_KEY: &str = "tls.crt";

/// Enumerates certificate sources and fetches their payloads.
///
/// Implementations perform one listing call per namespace and must not retain
/// anything between calls; the refresh loop asks again every cycle.
#[async_trait]
pub trait CertificateDirectory: Send + Sync {
    async fn list_namespaces(&self) -> Result<Vec<String>, DirectoryError>;

    async fn list_tls_sources(&self, namespace: &str) -> Result<Vec<CertificateSource>, DirectoryError>;

    /// Returns the `tls.crt` bytes of a secret, or `None` when the key is absent.
    async fn fetch_certificate_payload(
        &self,
        namespace: &str,
        secret_name: &str,
    ) -> Result<Option<Vec<u8>>, DirectoryError>;
}
