//! HTTP surface of the server: a single `GET /cotacao` endpoint.
use std::sync::Arc;
use std::time::Instant;

use axum::extract::State;
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::Router;
use log::info;
use quotation_common::QuotationError;
use quotation_common::net::QUOTATION_PATH;

use crate::service::QuotationService;

/// Builds the router serving the quotation endpoint.
pub fn app_router(service: Arc<QuotationService>) -> Router {
    Router::new()
        .route(QUOTATION_PATH, get(get_quotation))
        .with_state(service)
}

async fn get_quotation(State(service): State<Arc<QuotationService>>) -> Response {
    let _log = RequestLog::start();
    match service.quote().await {
        Ok(reply) => (
            [(header::CONTENT_TYPE, "application/json")],
            reply.body,
        )
            .into_response(),
        Err(e) => ApiError(e).into_response(),
    }
}

/// Logs the start of a request and, on drop, its end, whichever way it exits.
struct RequestLog {
    started: Instant,
}

impl RequestLog {
    fn start() -> Self {
        info!("Request init");
        Self {
            started: Instant::now(),
        }
    }
}

impl Drop for RequestLog {
    fn drop(&mut self) {
        info!("Request end ({:?})", self.started.elapsed());
    }
}

/// Maps a failed request onto an HTTP status with the error text as body.
struct ApiError(QuotationError);

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            QuotationError::UpstreamTimeout { .. } => StatusCode::GATEWAY_TIMEOUT,
            QuotationError::UpstreamUnavailable { .. }
            | QuotationError::UpstreamMalformedResponse { .. } => StatusCode::BAD_GATEWAY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, self.0.to_string()).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::UpstreamProvider;
    use crate::service::Deadlines;
    use crate::store::QuotationStore;
    use crate::test_support::{QUOTATION_BODY, count_rows, spawn_upstream};
    use quotation_common::CurrencyPair;
    use std::time::Duration;
    use tempfile::{TempDir, tempdir};
    use tokio::net::TcpListener;
    use tokio::task::JoinSet;

    /// Serves the router on an ephemeral port and returns the endpoint URL.
    async fn spawn_server(
        upstream: &str,
        deadlines: Deadlines,
    ) -> (String, QuotationStore, TempDir) {
        let dir = tempdir().unwrap();
        let store = QuotationStore::open(dir.path().join("quotations.db")).unwrap();
        store.ensure_schema().unwrap();
        let service = QuotationService::new(
            UpstreamProvider::new(upstream, CurrencyPair::default()),
            store.clone(),
            deadlines,
        );
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app_router(Arc::new(service))).await.unwrap();
        });
        (format!("http://{}{}", addr, QUOTATION_PATH), store, dir)
    }

    #[tokio::test]
    async fn passes_upstream_body_through() {
        let upstream = spawn_upstream(QUOTATION_BODY, Duration::ZERO).await;
        let (url, store, _dir) = spawn_server(
            &upstream,
            Deadlines {
                fetch: Duration::from_secs(2),
                persist: Duration::from_secs(2),
            },
        )
        .await;

        let response = reqwest::get(&url).await.unwrap();

        assert_eq!(response.status(), reqwest::StatusCode::OK);
        assert_eq!(
            response.headers()[reqwest::header::CONTENT_TYPE],
            "application/json"
        );
        assert_eq!(response.text().await.unwrap(), QUOTATION_BODY);
        assert_eq!(count_rows(store.path()), 1);
    }

    #[tokio::test]
    async fn upstream_timeout_is_a_gateway_timeout() {
        let upstream = spawn_upstream(QUOTATION_BODY, Duration::from_millis(500)).await;
        let (url, store, _dir) = spawn_server(
            &upstream,
            Deadlines {
                fetch: Duration::from_millis(200),
                persist: Duration::from_secs(2),
            },
        )
        .await;

        let response = reqwest::get(&url).await.unwrap();

        assert_eq!(response.status(), reqwest::StatusCode::GATEWAY_TIMEOUT);
        assert!(response.text().await.unwrap().contains("upstream fetch deadline"));
        assert_eq!(count_rows(store.path()), 0);
    }

    #[tokio::test]
    async fn malformed_upstream_is_a_bad_gateway() {
        let upstream = spawn_upstream("not json", Duration::ZERO).await;
        let (url, _store, _dir) = spawn_server(
            &upstream,
            Deadlines {
                fetch: Duration::from_secs(2),
                persist: Duration::from_secs(2),
            },
        )
        .await;

        let response = reqwest::get(&url).await.unwrap();

        assert_eq!(response.status(), reqwest::StatusCode::BAD_GATEWAY);
    }

    #[tokio::test]
    async fn concurrent_requests_each_store_one_row() {
        let upstream = spawn_upstream(QUOTATION_BODY, Duration::from_millis(20)).await;
        let (url, store, _dir) = spawn_server(
            &upstream,
            Deadlines {
                fetch: Duration::from_secs(2),
                persist: Duration::from_secs(5),
            },
        )
        .await;

        let mut requests = JoinSet::new();
        for _ in 0..10 {
            let url = url.clone();
            requests.spawn(async move { reqwest::get(&url).await.unwrap().status() });
        }
        let mut ok = 0;
        while let Some(status) = requests.join_next().await {
            if status.unwrap() == reqwest::StatusCode::OK {
                ok += 1;
            }
        }

        assert_eq!(ok, 10);
        assert_eq!(count_rows(store.path()), 10);
    }
}
