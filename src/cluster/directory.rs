use async_trait::async_trait;
use clap::ValueEnum;
use k8s_openapi::api::core::v1::{Namespace, Secret};
use k8s_openapi::api::networking::v1::Ingress;
use kube::api::{Api, ListParams};
use kube::{Client, ResourceExt};

use super::{CertificateDirectory, TLS_CERT_KEY};
use crate::error::DirectoryError;
use crate::models::CertificateSource;

const TLS_SECRET_TYPE: &str = "kubernetes.io/tls";

/// Set by kubed on secrets it replicated from another namespace.
const KUBED_ORIGIN_NAMESPACE_LABEL: &str = "kubed.appscode.com/origin.namespace";

/// Which objects a refresh cycle treats as certificate sources.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SourceKind {
    /// TLS sections of Ingress objects, with their hosts as expected names
    Ingress,
    /// Every `kubernetes.io/tls` Secret, without expected names
    Secrets,
}

/// [`CertificateDirectory`] backed by the Kubernetes API.
#[derive(Clone)]
pub struct KubeDirectory {
    client: Client,
    kind: SourceKind,
}

impl KubeDirectory {
    pub fn new(client: Client, kind: SourceKind) -> Self {
        Self { client, kind }
    }

    async fn ingress_sources(&self, namespace: &str) -> Result<Vec<CertificateSource>, DirectoryError> {
        let api: Api<Ingress> = Api::namespaced(self.client.clone(), namespace);
        let ingresses = api.list(&ListParams::default()).await?;

        Ok(ingresses
            .items
            .iter()
            .flat_map(|ingress| ingress_tls_sources(ingress, namespace))
            .collect())
    }

    async fn secret_sources(&self, namespace: &str) -> Result<Vec<CertificateSource>, DirectoryError> {
        let api: Api<Secret> = Api::namespaced(self.client.clone(), namespace);
        let secrets = api.list(&ListParams::default()).await?;

        Ok(secrets
            .items
            .iter()
            .filter(|secret| is_original_tls_secret(secret, namespace))
            .map(|secret| CertificateSource::new(secret.name_any(), namespace, secret.name_any(), Vec::new()))
            .collect())
    }
}

/// One source per `spec.tls[]` entry that names a secret.
fn ingress_tls_sources(ingress: &Ingress, namespace: &str) -> Vec<CertificateSource> {
    let owner = ingress.name_any();

    ingress
        .spec
        .as_ref()
        .and_then(|spec| spec.tls.as_ref())
        .into_iter()
        .flatten()
        .filter_map(|tls| {
            let secret_name = tls.secret_name.as_ref()?;
            let hosts = tls.hosts.clone().unwrap_or_default();
            Some(CertificateSource::new(owner.clone(), namespace, secret_name.clone(), hosts))
        })
        .collect()
}

/// TLS secrets, minus kubed replicas whose origin lies in another namespace.
fn is_original_tls_secret(secret: &Secret, namespace: &str) -> bool {
    if secret.type_.as_deref() != Some(TLS_SECRET_TYPE) {
        return false;
    }

    match secret.labels().get(KUBED_ORIGIN_NAMESPACE_LABEL) {
        Some(origin) => origin == namespace,
        None => true,
    }
}

fn map_get_error(err: kube::Error, kind: &'static str, namespace: &str, name: &str) -> DirectoryError {
    match err {
        kube::Error::Api(response) if response.code == 404 => DirectoryError::NotFound {
            kind,
            namespace: namespace.to_string(),
            name: name.to_string(),
        },
        kube::Error::Api(response) if response.code == 403 => DirectoryError::AccessDenied(response.message),
        other => DirectoryError::Api(other),
    }
}

fn map_list_error(err: kube::Error) -> DirectoryError {
    match err {
        kube::Error::Api(response) if response.code == 403 => DirectoryError::AccessDenied(response.message),
        other => DirectoryError::Api(other),
    }
}

#[async_trait]
impl CertificateDirectory for KubeDirectory {
    async fn list_namespaces(&self) -> Result<Vec<String>, DirectoryError> {
        let api: Api<Namespace> = Api::all(self.client.clone());
        let namespaces = api.list(&ListParams::default()).await.map_err(map_list_error)?;

        Ok(namespaces.items.iter().map(|ns| ns.name_any()).collect())
    }

    async fn list_tls_sources(&self, namespace: &str) -> Result<Vec<CertificateSource>, DirectoryError> {
        let sources = match self.kind {
            SourceKind::Ingress => self.ingress_sources(namespace).await,
            SourceKind::Secrets => self.secret_sources(namespace).await,
        };

        sources.map_err(|e| match e {
            DirectoryError::Api(err) => map_list_error(err),
            other => other,
        })
    }

    async fn fetch_certificate_payload(
        &self,
        namespace: &str,
        secret_name: &str,
    ) -> Result<Option<Vec<u8>>, DirectoryError> {
        let api: Api<Secret> = Api::namespaced(self.client.clone(), namespace);
        let secret = api
            .get(secret_name)
            .await
            .map_err(|e| map_get_error(e, "secret", namespace, secret_name))?;

        Ok(secret
            .data
            .and_then(|mut data| data.remove(TLS_CERT_KEY))
            .map(|bytes| bytes.0))
    }
}
