use chrono::{DateTime, Utc};
use serde::{Serialize, Serializer};

use super::display_time;
use super::k8s::CertificateSource;

/// Expiry thresholds, fixed for the lifetime of the process.
///
/// `warn_days_left` is expected to exceed `critical_days_left`; otherwise the
/// WARN tier can never be reached.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ThresholdConfig {
    pub critical_days_left: i64,
    pub warn_days_left: i64,
}

impl Default for ThresholdConfig {
    fn default() -> Self {
        Self {
            critical_days_left: 3,
            warn_days_left: 30,
        }
    }
}

/// Fields extracted from a decoded leaf certificate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ParsedCertificate {
    #[serde(serialize_with = "display_time")]
    pub not_before: DateTime<Utc>,
    #[serde(serialize_with = "display_time")]
    pub not_after: DateTime<Utc>,
    #[serde(rename = "issuer")]
    pub issuer_common_name: String,
    #[serde(rename = "commonNames")]
    pub subject_common_names: Vec<String>,
    pub dns_names: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Severity {
    Ok,
    Warn,
    Crit,
}

/// Outcome of classifying one certificate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CertificateVerdict {
    /// Whole days until `notAfter`; negative once expired.
    pub days_left: i64,
    /// False when expired or when an expected host is not covered.
    pub is_valid: bool,
    pub severity: Severity,
    /// Expiry diagnostic, present for WARN and CRIT.
    pub diagnostic: Option<String>,
    /// One entry per expected host the certificate does not cover.
    pub host_mismatches: Vec<String>,
}

impl CertificateVerdict {
    pub fn diagnostics(&self) -> impl Iterator<Item = &str> {
        self.diagnostic
            .iter()
            .chain(self.host_mismatches.iter())
            .map(String::as_str)
    }
}

/// One discovered source together with whatever could be derived from it.
/// `certificate` and `verdict` are both absent when the payload failed to parse.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CertificateRecord {
    pub source: CertificateSource,
    pub certificate: Option<ParsedCertificate>,
    pub verdict: Option<CertificateVerdict>,
}

impl CertificateRecord {
    pub fn unparsed(source: CertificateSource) -> Self {
        Self {
            source,
            certificate: None,
            verdict: None,
        }
    }

    pub fn classified(source: CertificateSource, certificate: ParsedCertificate, verdict: CertificateVerdict) -> Self {
        Self {
            source,
            certificate: Some(certificate),
            verdict: Some(verdict),
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct RecordJson<'a> {
    #[serde(flatten)]
    source: &'a CertificateSource,
    #[serde(skip_serializing_if = "Option::is_none")]
    certificate: Option<CertificateJson<'a>>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CertificateJson<'a> {
    #[serde(flatten)]
    certificate: &'a ParsedCertificate,
    days_left: i64,
    is_valid: bool,
    severity: Severity,
    diagnostics: Vec<&'a str>,
}

impl Serialize for CertificateRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let certificate = match (&self.certificate, &self.verdict) {
            (Some(certificate), Some(verdict)) => Some(CertificateJson {
                certificate,
                days_left: verdict.days_left,
                is_valid: verdict.is_valid,
                severity: verdict.severity,
                diagnostics: verdict.diagnostics().collect(),
            }),
            _ => None,
        };

        RecordJson {
            source: &self.source,
            certificate,
        }
        .serialize(serializer)
    }
}
