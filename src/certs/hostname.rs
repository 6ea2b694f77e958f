// TLS server identity matching, following RFC 6125 section 6.4

use crate::models::ParsedCertificate;

/// Returns true when `host` is covered by the certificate.
///
/// DNS SANs are authoritative; subject common names are only consulted when
/// the certificate carries no DNS SAN at all.
pub fn certificate_covers(certificate: &ParsedCertificate, host: &str) -> bool {
    let presented = if certificate.dns_names.is_empty() {
        &certificate.subject_common_names
    } else {
        &certificate.dns_names
    };

    presented.iter().any(|pattern| matches_host(pattern, host))
}

/// Matches a reference `host` against a presented identifier that may carry
/// a wildcard as its complete left-most label (`*.example.com`).
pub fn matches_host(pattern: &str, host: &str) -> bool {
    let pattern = normalize(pattern);
    let host = normalize(host);

    if pattern.is_empty() || host.is_empty() {
        return false;
    }

    let Some(suffix) = pattern.strip_prefix("*.") else {
        return pattern == host;
    };

    // A wildcard needs at least two labels to its right, so `*.com` matches nothing.
    if suffix.contains('*') || !suffix.contains('.') {
        return false;
    }

    match host.split_once('.') {
        Some((label, rest)) => !label.is_empty() && rest == suffix,
        None => false,
    }
}

fn normalize(name: &str) -> String {
    name.trim().trim_end_matches('.').to_ascii_lowercase()
}
