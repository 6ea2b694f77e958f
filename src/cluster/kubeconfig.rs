use std::path::PathBuf;

use kube::config::{KubeConfigOptions, Kubeconfig};
use kube::{Client, Config};

use crate::error::ClientError;

/// Splits a KUBECONFIG-style path list (`:` on Unix, `;` on Windows).
/// Blank entries are dropped.
pub fn split_kubeconfig_paths(list: &str) -> Vec<PathBuf> {
    let sep = if cfg!(windows) { ';' } else { ':' };

    list.split(sep)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(PathBuf::from)
        .collect()
}

/// `~/.kube/config`, used when neither KUBECONFIG nor in-cluster config is available.
fn default_kubeconfig_path() -> Option<PathBuf> {
    dirs::home_dir().map(|h| h.join(".kube").join("config"))
}

/// Appends the entries of a later KUBECONFIG file to an earlier one. The first
/// file that names a current context decides it.
fn merge_kubeconfig(mut base: Kubeconfig, extra: Kubeconfig) -> Kubeconfig {
    base.clusters.extend(extra.clusters);
    base.auth_infos.extend(extra.auth_infos);
    base.contexts.extend(extra.contexts);
    if base.current_context.is_none() {
        base.current_context = extra.current_context;
    }
    base
}

/// Tries to load each path as a kubeconfig and merges all that succeed.
/// Every file is logged with its outcome.
fn load_from_paths(paths: &[PathBuf]) -> Option<Kubeconfig> {
    let mut merged: Option<Kubeconfig> = None;

    for path in paths {
        if !path.exists() {
            log::info!("kubeconfig: skip (not found) {}", path.display());
            continue;
        }

        match Kubeconfig::read_from(path) {
            Ok(cfg) => {
                log::info!("kubeconfig: ok ({} context(s)) {}", cfg.contexts.len(), path.display());
                merged = Some(match merged.take() {
                    None => cfg,
                    Some(base) => merge_kubeconfig(base, cfg),
                });
            }
            Err(e) => {
                log::warn!("kubeconfig: skip (parse error: {e}) {}", path.display());
            }
        }
    }

    merged
}

async fn from_kubeconfig(kubeconfig: Kubeconfig, context: Option<&str>) -> Result<Config, ClientError> {
    let options = KubeConfigOptions {
        context: context.map(str::to_string),
        ..KubeConfigOptions::default()
    };
    Ok(Config::from_custom_kubeconfig(kubeconfig, &options).await?)
}

/// Builds the kube client the Cluster Directory talks through.
///
/// Resolution order:
/// 1. `kubeconfig` (a KUBECONFIG-style path list): every readable file is merged
///    with kubectl semantics; `context` selects a non-default context.
/// 2. In-cluster service account configuration.
/// 3. `~/.kube/config`, for running outside a cluster without KUBECONFIG.
pub async fn build_client(kubeconfig: Option<&str>, context: Option<&str>) -> Result<Client, ClientError> {
    let config = match kubeconfig.filter(|v| !v.trim().is_empty()) {
        Some(list) => {
            let paths = split_kubeconfig_paths(list);
            let merged = load_from_paths(&paths).ok_or_else(|| ClientError::NoKubeconfig(list.to_string()))?;
            from_kubeconfig(merged, context).await?
        }
        None => match Config::incluster() {
            Ok(config) => {
                if context.is_some() {
                    log::warn!("kubeconfig: context override ignored for in-cluster configuration");
                }
                log::info!("kubeconfig: using in-cluster configuration");
                config
            }
            Err(incluster) => {
                let fallback = default_kubeconfig_path().and_then(|path| {
                    log::info!("kubeconfig: not running in a cluster ({incluster}), trying {}", path.display());
                    load_from_paths(&[path])
                });
                match fallback {
                    Some(cfg) => from_kubeconfig(cfg, context).await?,
                    None => return Err(ClientError::InCluster(incluster)),
                }
            }
        },
    };

    Ok(Client::try_from(config)?)
}
