//! Self-signed test certificates with controllable validity windows.
use rcgen::{CertificateParams, DnType, KeyPair};
use time::OffsetDateTime;

/// `n` days plus an hour of slack, so whole-day truncation still lands on `n`
/// however long the test takes between generating and classifying.
pub fn days(n: i64) -> chrono::Duration {
    chrono::Duration::days(n) + chrono::Duration::hours(1)
}

/// PEM certificate covering `sans`, valid from a week ago until `valid_for` from now.
pub fn certificate_pem(sans: &[&str], valid_for: chrono::Duration) -> String {
    let mut params = CertificateParams::new(sans.iter().map(|s| s.to_string()).collect::<Vec<_>>()).unwrap();
    if let Some(first) = sans.first() {
        params.distinguished_name.push(DnType::CommonName, *first);
    }

    let now = OffsetDateTime::now_utc();
    params.not_before = now - time::Duration::days(7);
    params.not_after = now + time::Duration::seconds(valid_for.num_seconds());

    let key = KeyPair::generate().unwrap();
    params.self_signed(&key).unwrap().pem()
}
