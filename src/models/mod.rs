pub mod certificate;
pub mod k8s;
pub mod snapshot;

use chrono::{DateTime, Utc};
use serde::Serializer;

pub use certificate::{CertificateRecord, CertificateVerdict, ParsedCertificate, Severity, ThresholdConfig};
pub use k8s::CertificateSource;
pub use snapshot::Snapshot;

/// Timestamps are published as display strings (`2025-01-31 12:00:00 UTC`),
/// not RFC 3339, so monitoring scripts can print them verbatim.
pub(crate) fn display_time<S: Serializer>(time: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_str(time)
}
