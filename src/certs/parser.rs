use chrono::{DateTime, Utc};
use x509_parser::certificate::X509Certificate;
use x509_parser::extensions::GeneralName;
use x509_parser::prelude::FromDer;
use x509_parser::time::ASN1Time;

use crate::error::ParseError;
use crate::models::ParsedCertificate;

/// Decodes the first PEM block of a `tls.crt` payload into a [`ParsedCertificate`].
///
/// `payload` is `None` when the secret has no `tls.crt` key at all.
/// `namespace` and `name` identify the owning secret in error messages.
pub fn parse_certificate(
    payload: Option<&[u8]>,
    namespace: &str,
    name: &str,
) -> Result<ParsedCertificate, ParseError> {
    let payload = payload.ok_or_else(|| ParseError::MissingPayload {
        namespace: namespace.to_string(),
        name: name.to_string(),
    })?;

    if payload.is_empty() {
        return Err(ParseError::EmptyPayload {
            namespace: namespace.to_string(),
            name: name.to_string(),
        });
    }

    let block = pem::parse(payload).map_err(|e| ParseError::DecodeFailure {
        namespace: namespace.to_string(),
        name: name.to_string(),
        reason: e.to_string(),
    })?;

    let parse_failure = |reason: String| ParseError::ParseFailure {
        namespace: namespace.to_string(),
        name: name.to_string(),
        reason,
    };

    let (_rem, cert) = X509Certificate::from_der(block.contents()).map_err(|e| parse_failure(e.to_string()))?;

    let validity = cert.validity();
    let not_before = to_utc(validity.not_before).ok_or_else(|| parse_failure("notBefore out of range".to_string()))?;
    let not_after = to_utc(validity.not_after).ok_or_else(|| parse_failure("notAfter out of range".to_string()))?;

    let issuer_common_name = cert
        .issuer()
        .iter_common_name()
        .filter_map(|attr| attr.as_str().ok())
        .next()
        .unwrap_or_default()
        .to_string();

    let mut subject_common_names = Vec::new();
    for cn in cert.subject().iter_common_name().filter_map(|attr| attr.as_str().ok()) {
        push_unique(&mut subject_common_names, cn);
    }

    let mut dns_names = Vec::new();
    if let Ok(Some(san)) = cert.subject_alternative_name() {
        for general_name in &san.value.general_names {
            if let GeneralName::DNSName(dns) = general_name {
                push_unique(&mut dns_names, dns);
            }
        }
    }

    Ok(ParsedCertificate {
        not_before,
        not_after,
        issuer_common_name,
        subject_common_names,
        dns_names,
    })
}

fn to_utc(time: ASN1Time) -> Option<DateTime<Utc>> {
    DateTime::<Utc>::from_timestamp(time.timestamp(), 0)
}

fn push_unique(names: &mut Vec<String>, name: &str) {
    if !names.iter().any(|n| n == name) {
        names.push(name.to_string());
    }
}
