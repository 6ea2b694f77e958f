use chrono::{DateTime, Utc};

use super::hostname::certificate_covers;
use crate::models::{CertificateVerdict, ParsedCertificate, Severity, ThresholdConfig};

const SECONDS_PER_DAY: i64 = 86_400;

/// Whole days between `now` and `not_after`, truncated toward zero.
pub fn days_left(not_after: DateTime<Utc>, now: DateTime<Utc>) -> i64 {
    (not_after.timestamp() - now.timestamp()) / SECONDS_PER_DAY
}

/// Classifies a certificate against its expected hosts and the expiry thresholds.
///
/// Severity tracks expiry only. Validity is lost either by expiring or by
/// failing to cover one of `expected_hosts`; a host mismatch on its own
/// leaves the severity at OK.
pub fn classify(
    certificate: &ParsedCertificate,
    expected_hosts: &[String],
    thresholds: &ThresholdConfig,
    now: DateTime<Utc>,
) -> CertificateVerdict {
    let days_left = days_left(certificate.not_after, now);

    let host_mismatches: Vec<String> = expected_hosts
        .iter()
        .filter(|host| !certificate_covers(certificate, host))
        .map(|host| format!("certificate does not cover host {host}"))
        .collect();

    let mut is_valid = host_mismatches.is_empty();

    let (severity, diagnostic) = if days_left <= 0 {
        is_valid = false;
        (Severity::Crit, Some(format!("expired on {}", certificate.not_after)))
    } else if days_left <= thresholds.critical_days_left {
        (
            Severity::Crit,
            Some(format!("will expire in {days_left} days ({})", certificate.not_after)),
        )
    } else if days_left < thresholds.warn_days_left {
        (
            Severity::Warn,
            Some(format!("will expire in {days_left} days ({})", certificate.not_after)),
        )
    } else {
        (Severity::Ok, None)
    };

    CertificateVerdict {
        days_left,
        is_valid,
        severity,
        diagnostic,
        host_mismatches,
    }
}
