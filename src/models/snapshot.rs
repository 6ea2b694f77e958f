use chrono::{DateTime, Utc};
use serde::Serialize;

use super::certificate::CertificateRecord;
use super::display_time;

/// The complete result of one refresh cycle. Never mutated once built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Snapshot {
    #[serde(rename = "lastUpdated", serialize_with = "display_time")]
    pub generated_at: DateTime<Utc>,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
    #[serde(rename = "certificates")]
    pub records: Vec<CertificateRecord>,
}

impl Snapshot {
    pub fn new(
        generated_at: DateTime<Utc>,
        records: Vec<CertificateRecord>,
        warnings: Vec<String>,
        errors: Vec<String>,
    ) -> Self {
        Self {
            generated_at,
            errors,
            warnings,
            records,
        }
    }

    /// Placeholder served until the first cycle completes.
    pub fn empty(generated_at: DateTime<Utc>) -> Self {
        Self::new(generated_at, Vec::new(), Vec::new(), Vec::new())
    }

    pub fn is_healthy(&self) -> bool {
        self.errors.is_empty() && self.warnings.is_empty()
    }
}
