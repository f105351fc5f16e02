//! Fixtures shared by the server's unit tests.
use std::path::Path;
use std::time::Duration;

use axum::Router;
use axum::routing::get;
use quotation_common::{CanonicalQuotation, CurrencyPair};
use rusqlite::Connection;
use tokio::net::TcpListener;

pub const QUOTATION_BODY: &str = concat!(
    r#"{"USDBRL":{"code":"USD","codein":"BRL","name":"Dólar Americano/Real Brasileiro","#,
    r#""high":"5.4612","low":"5.4012","varBid":"-0.0171","pctChange":"-0.31","#,
    r#""bid":"5.43","ask":"5.4310","timestamp":"1714769999","#,
    r#""create_date":"2024-05-03 17:59:59"}}"#,
);

/// Serves `body` for the default pair after `delay`; returns the API base URL.
pub async fn spawn_upstream(body: &'static str, delay: Duration) -> String {
    let path = format!("/json/last/{}", CurrencyPair::default());
    let router = Router::new().route(
        &path,
        get(move || async move {
            tokio::time::sleep(delay).await;
            body
        }),
    );
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{}/json/last", addr)
}

pub fn sample_quotation() -> CanonicalQuotation {
    CanonicalQuotation::from_upstream(QUOTATION_BODY.as_bytes(), &CurrencyPair::default()).unwrap()
}

pub fn count_rows(path: &Path) -> i64 {
    let conn = Connection::open(path).unwrap();
    conn.query_row("SELECT COUNT(*) FROM quotations", [], |row| row.get(0))
        .unwrap()
}
