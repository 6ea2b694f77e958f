use std::sync::Arc;

use axum::extract::State;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::Router;
use http::{header, StatusCode};
use tokio::net::TcpListener;
use tower_http::trace::{DefaultOnRequest, DefaultOnResponse, TraceLayer};
use tracing::Level;

use crate::models::Snapshot;
use crate::publisher::StatusPublisher;

/// HTTP status for a snapshot: 202 with errors, 201 with only warnings, 200 otherwise.
pub fn status_code(snapshot: &Snapshot) -> StatusCode {
    if !snapshot.errors.is_empty() {
        StatusCode::ACCEPTED
    } else if !snapshot.warnings.is_empty() {
        StatusCode::CREATED
    } else {
        StatusCode::OK
    }
}

/// Serves the current snapshot on every path.
pub fn router(publisher: Arc<StatusPublisher>) -> Router {
    Router::new()
        .route("/", get(status))
        .fallback(status)
        .layer(
            TraceLayer::new_for_http()
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .with_state(publisher)
}

async fn status(State(publisher): State<Arc<StatusPublisher>>) -> Response {
    let snapshot = publisher.current_snapshot();
    let code = status_code(&snapshot);

    let body = match serde_json::to_string_pretty(snapshot.as_ref()) {
        Ok(body) => body,
        Err(e) => {
            log::error!("status: failed to serialize snapshot: {e}");
            serde_json::json!({ "error": e.to_string() }).to_string()
        }
    };

    (code, [(header::CONTENT_TYPE, "application/json")], body).into_response()
}

/// Serves the status endpoint until Ctrl-C or SIGTERM.
pub async fn serve(listener: TcpListener, publisher: Arc<StatusPublisher>) -> std::io::Result<()> {
    axum::serve(listener, router(publisher))
        .with_graceful_shutdown(shutdown_signal())
        .await
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            log::error!("server: failed to listen for Ctrl-C: {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                log::error!("server: failed to listen for SIGTERM: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    log::info!("server: shutting down");
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use chrono::{TimeZone, Utc};
    use http::Request;
    use tower::ServiceExt;

    fn snapshot(warnings: &[&str], errors: &[&str]) -> Snapshot {
        Snapshot::new(
            Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap(),
            Vec::new(),
            warnings.iter().map(|s| s.to_string()).collect(),
            errors.iter().map(|s| s.to_string()).collect(),
        )
    }

    async fn fetch(publisher: Arc<StatusPublisher>, uri: &str) -> (StatusCode, Option<String>, serde_json::Value) {
        let response = router(publisher)
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let code = response.status();
        let content_type = response
            .headers()
            .get(header::CONTENT_TYPE)
            .map(|v| v.to_str().unwrap().to_string());
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (code, content_type, serde_json::from_slice(&body).unwrap())
    }

    #[test]
    fn status_code_tiers() {
        assert_eq!(status_code(&snapshot(&[], &[])), StatusCode::OK);
        assert_eq!(status_code(&snapshot(&["w"], &[])), StatusCode::CREATED);
        assert_eq!(status_code(&snapshot(&[], &["e"])), StatusCode::ACCEPTED);
        assert_eq!(status_code(&snapshot(&["w"], &["e"])), StatusCode::ACCEPTED);
    }

    #[tokio::test]
    async fn serves_current_snapshot_as_json() {
        let publisher = Arc::new(StatusPublisher::with_snapshot(snapshot(&["expiring soon"], &[])));

        let (code, content_type, body) = fetch(publisher, "/").await;
        assert_eq!(code, StatusCode::CREATED);
        assert_eq!(content_type.as_deref(), Some("application/json"));
        assert_eq!(body["lastUpdated"], "2025-01-01 00:00:00 UTC");
        assert_eq!(body["warnings"][0], "expiring soon");
        assert_eq!(body["errors"], serde_json::json!([]));
    }

    #[tokio::test]
    async fn any_path_serves_status() {
        let publisher = Arc::new(StatusPublisher::with_snapshot(snapshot(&[], &["expired"])));

        let (code, _, body) = fetch(publisher, "/healthz").await;
        assert_eq!(code, StatusCode::ACCEPTED);
        assert_eq!(body["errors"][0], "expired");
    }

    #[tokio::test]
    async fn reflects_latest_publish() {
        let publisher = Arc::new(StatusPublisher::with_snapshot(snapshot(&[], &["expired"])));
        publisher.publish(snapshot(&[], &[]));

        let (code, _, _) = fetch(publisher, "/").await;
        assert_eq!(code, StatusCode::OK);
    }

    #[derive(Clone, Default)]
    struct Capture(Arc<std::sync::Mutex<Vec<u8>>>);

    impl std::io::Write for Capture {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn requests_are_logged_at_info() {
        let capture = Capture::default();
        let writer = capture.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(Level::INFO)
            .with_ansi(false)
            .with_writer(move || writer.clone())
            .finish();
        let _guard = tracing::subscriber::set_default(subscriber);

        fetch(Arc::new(StatusPublisher::new()), "/").await;

        let output = String::from_utf8(capture.0.lock().unwrap().clone()).unwrap();
        assert!(output.contains("started processing request"));
        assert!(output.contains("finished processing request"));
    }
}
