// Rust structs describing the cluster objects a refresh cycle inspects
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CertificateSource {
    /// Ingress (or Secret) that references the certificate
    #[serde(rename = "name")]
    pub owner_name: String,
    pub namespace: String,
    pub secret_name: String,
    /// Hostnames the owner expects the certificate to cover, empty for bare Secrets
    #[serde(rename = "hosts")]
    pub expected_hosts: Vec<String>,
}

impl CertificateSource {
    pub fn new(
        owner_name: impl Into<String>,
        namespace: impl Into<String>,
        secret_name: impl Into<String>,
        expected_hosts: Vec<String>,
    ) -> Self {
        Self {
            owner_name: owner_name.into(),
            namespace: namespace.into(),
            secret_name: secret_name.into(),
            expected_hosts,
        }
    }

    /// `namespace/owner`, the identity used in every diagnostic.
    pub fn qualified_name(&self) -> String {
        format!("{}/{}", self.namespace, self.owner_name)
    }
}
