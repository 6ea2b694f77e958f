use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::time::Duration;

use clap::Parser;

use crate::cluster::SourceKind;
use crate::models::ThresholdConfig;

/// Runtime configuration. Every flag can also be set through the
/// environment variable named next to it.
#[derive(Parser, Debug, Clone)]
#[command(name = "certwatch")]
#[command(about = "Publishes the health of a cluster's TLS certificates")]
#[command(version)]
pub struct Config {
    /// Kubeconfig path list; in-cluster configuration is used when unset
    #[arg(long, env = "KUBECONFIG")]
    pub kubeconfig: Option<String>,

    /// Kubeconfig context to use instead of the current one
    #[arg(long, env = "KUBE_CONTEXT")]
    pub context: Option<String>,

    /// Seconds between refresh cycles
    #[arg(long, env = "UPDATE_INTERVAL", default_value_t = 60, value_parser = clap::value_parser!(u64).range(1..))]
    pub update_interval: u64,

    /// Port the status endpoint listens on
    #[arg(long, env = "LISTEN_PORT", default_value_t = 8080)]
    pub listen_port: u16,

    /// Address the status endpoint binds to
    #[arg(long, env = "LISTEN_ADDRESS", default_value_t = IpAddr::V4(Ipv4Addr::UNSPECIFIED))]
    pub listen_address: IpAddr,

    /// Days left at or below which a certificate is critical
    #[arg(long, env = "DAYS_LEFT_CRITICAL_THRESHOLD", default_value_t = 3, value_parser = clap::value_parser!(i64).range(0..))]
    pub critical_days: i64,

    /// Days left below which a certificate raises a warning
    #[arg(long, env = "DAYS_LEFT_WARN_THRESHOLD", default_value_t = 30, value_parser = clap::value_parser!(i64).range(0..))]
    pub warn_days: i64,

    /// Objects to read certificates from
    #[arg(long, env = "CERT_SOURCE", value_enum, default_value_t = SourceKind::Ingress)]
    pub source: SourceKind,

    /// Seconds allowed for each Kubernetes API call
    #[arg(long, env = "REQUEST_TIMEOUT", default_value_t = 30, value_parser = clap::value_parser!(u64).range(1..))]
    pub request_timeout: u64,
}

impl Config {
    pub fn thresholds(&self) -> ThresholdConfig {
        ThresholdConfig {
            critical_days_left: self.critical_days,
            warn_days_left: self.warn_days,
        }
    }

    pub fn update_interval(&self) -> Duration {
        Duration::from_secs(self.update_interval)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout)
    }

    pub fn listen_addr(&self) -> SocketAddr {
        SocketAddr::new(self.listen_address, self.listen_port)
    }

    /// Logs configuration that is accepted but cannot behave as intended.
    pub fn validate(&self) {
        if self.warn_days <= self.critical_days {
            log::warn!(
                "config: warn threshold ({} days) does not exceed critical threshold ({} days); no certificate will be reported as WARN",
                self.warn_days,
                self.critical_days
            );
        }
    }
}
