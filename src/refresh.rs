use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};

use crate::certs::{classify, parse_certificate};
use crate::cluster::CertificateDirectory;
use crate::error::{DirectoryError, RefreshError};
use crate::models::{CertificateRecord, CertificateSource, ParsedCertificate, Severity, Snapshot, ThresholdConfig};
use crate::publisher::StatusPublisher;

/// Periodically rebuilds the certificate snapshot from the cluster and
/// publishes it.
///
/// Each cycle starts from nothing: every source is listed, fetched, parsed and
/// classified again, and failures only ever cost the source they concern.
pub struct RefreshLoop {
    directory: Arc<dyn CertificateDirectory>,
    publisher: Arc<StatusPublisher>,
    thresholds: ThresholdConfig,
    interval: Duration,
    call_timeout: Duration,
}

/// Data accumulated while one cycle runs; never visible to readers.
#[derive(Default)]
struct Cycle {
    records: Vec<CertificateRecord>,
    warnings: Vec<String>,
    errors: Vec<String>,
}

impl Cycle {
    fn fail(&mut self, error: RefreshError) {
        self.errors.push(error.to_string());
    }

    fn into_snapshot(self, generated_at: DateTime<Utc>) -> Snapshot {
        Snapshot::new(generated_at, self.records, self.warnings, self.errors)
    }
}

impl RefreshLoop {
    pub fn new(
        directory: Arc<dyn CertificateDirectory>,
        publisher: Arc<StatusPublisher>,
        thresholds: ThresholdConfig,
        interval: Duration,
        call_timeout: Duration,
    ) -> Self {
        Self {
            directory,
            publisher,
            thresholds,
            interval,
            call_timeout,
        }
    }

    /// Runs cycles forever, sleeping `interval` between the end of one and the
    /// start of the next.
    pub async fn run(self) {
        log::info!("refresh: updating every {}s", self.interval.as_secs());
        loop {
            self.run_cycle().await;
            tokio::time::sleep(self.interval).await;
        }
    }

    /// Builds a snapshot for the current time and publishes it.
    pub async fn run_cycle(&self) {
        let started_at = Utc::now();
        let started = Instant::now();
        log::info!("refresh: fetching certificate data");

        let snapshot = self.collect(started_at).await;

        for error in &snapshot.errors {
            log::error!("refresh: {error}");
        }
        for warning in &snapshot.warnings {
            log::warn!("refresh: {warning}");
        }
        log::info!(
            "refresh: fetched {} certificate(s) in {} seconds",
            snapshot.records.len(),
            started.elapsed().as_secs()
        );

        self.publisher.publish(snapshot);
    }

    /// Builds the snapshot of one cycle that started at `now`, without publishing it.
    pub async fn collect(&self, now: DateTime<Utc>) -> Snapshot {
        let mut cycle = Cycle::default();

        let namespaces = match self
            .bounded(|| "listing namespaces".to_string(), self.directory.list_namespaces())
            .await
        {
            Ok(namespaces) => namespaces,
            Err(e) => {
                cycle.fail(RefreshError::Enumeration(e));
                return cycle.into_snapshot(now);
            }
        };

        for namespace in &namespaces {
            let sources = match self
                .bounded(
                    || format!("listing TLS sources in {namespace}"),
                    self.directory.list_tls_sources(namespace),
                )
                .await
            {
                Ok(sources) => sources,
                Err(source) => {
                    cycle.fail(RefreshError::NamespaceListing {
                        namespace: namespace.clone(),
                        source,
                    });
                    continue;
                }
            };

            for source in sources {
                self.inspect(source, now, &mut cycle).await;
            }
        }

        cycle.into_snapshot(now)
    }

    async fn inspect(&self, source: CertificateSource, now: DateTime<Utc>, cycle: &mut Cycle) {
        let payload = self
            .bounded(
                || format!("fetching secret {}/{}", source.namespace, source.secret_name),
                self.directory
                    .fetch_certificate_payload(&source.namespace, &source.secret_name),
            )
            .await;

        let payload = match payload {
            Ok(payload) => payload,
            Err(e) => {
                cycle.fail(RefreshError::SourceFetch {
                    namespace: source.namespace.clone(),
                    secret_name: source.secret_name.clone(),
                    owner: source.owner_name.clone(),
                    source: e,
                });
                return;
            }
        };

        let certificate = match parse_certificate(payload.as_deref(), &source.namespace, &source.secret_name) {
            Ok(certificate) => certificate,
            Err(e) => {
                cycle.fail(e.into());
                cycle.records.push(CertificateRecord::unparsed(source));
                return;
            }
        };

        let verdict = classify(&certificate, &source.expected_hosts, &self.thresholds, now);
        let prefix = diagnostic_prefix(&source, &certificate);

        if let Some(diagnostic) = &verdict.diagnostic {
            match verdict.severity {
                Severity::Crit => cycle.errors.push(format!("{prefix} {diagnostic}")),
                Severity::Warn => cycle.warnings.push(format!("{prefix} {diagnostic}")),
                Severity::Ok => {}
            }
        }
        for mismatch in &verdict.host_mismatches {
            log::warn!("refresh: {prefix} {mismatch}");
        }

        cycle
            .records
            .push(CertificateRecord::classified(source, certificate, verdict));
    }

    /// Bounds a Cluster Directory call by the configured timeout.
    async fn bounded<T>(
        &self,
        operation: impl FnOnce() -> String,
        call: impl Future<Output = Result<T, DirectoryError>>,
    ) -> Result<T, DirectoryError> {
        match tokio::time::timeout(self.call_timeout, call).await {
            Ok(result) => result,
            Err(_) => Err(DirectoryError::Timeout {
                operation: operation(),
                timeout: self.call_timeout,
            }),
        }
    }
}

/// `certificate ns/owner (host, host)`; the certificate's own DNS names stand
/// in when the owner expects no hosts.
fn diagnostic_prefix(source: &CertificateSource, certificate: &ParsedCertificate) -> String {
    let hosts = if source.expected_hosts.is_empty() {
        certificate.dns_names.join(", ")
    } else {
        source.expected_hosts.join(", ")
    };
    format!("certificate {} ({hosts})", source.qualified_name())
}
