//! Shared endpoint constants, deadlines and helpers used by client and server.
use std::time::Duration;

use crate::currency::CurrencyPair;

/// HTTP port the quotation server listens on.
pub const SERVER_PORT: u16 = 8080;
/// Path of the quotation endpoint.
pub const QUOTATION_PATH: &str = "/cotacao";
/// Base URL of the upstream quotation API; the pair is appended as the last segment.
pub const UPSTREAM_BASE_URL: &str = "https://economia.awesomeapi.com.br/json/last";

/// Upper bound for the server's call to the upstream API.
pub const UPSTREAM_FETCH_TIMEOUT: Duration = Duration::from_millis(200);
/// Upper bound for writing one quotation to the store.
pub const PERSIST_TIMEOUT: Duration = Duration::from_millis(10);
/// Upper bound for the client's call to the server.
pub const CLIENT_TIMEOUT: Duration = Duration::from_millis(300);

/// Helper to format an address with a port like "ip:port".
pub fn addr(ip: &str, port: u16) -> String {
    format!("{}:{}", ip, port)
}

/// Full upstream URL for `pair`, e.g. `.../json/last/USD-BRL`.
pub fn upstream_url(base: &str, pair: &CurrencyPair) -> String {
    format!("{}/{}", base.trim_end_matches('/'), pair)
}

/// Default URL of the server endpoint as seen from the local machine.
pub fn default_server_url() -> String {
    format!("http://{}{}", addr("localhost", SERVER_PORT), QUOTATION_PATH)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn upstream_url_appends_pair_segment() {
        let pair = CurrencyPair::default();
        assert_eq!(
            upstream_url(UPSTREAM_BASE_URL, &pair),
            "https://economia.awesomeapi.com.br/json/last/USD-BRL"
        );
        assert_eq!(
            upstream_url("http://127.0.0.1:9000/json/last/", &pair),
            "http://127.0.0.1:9000/json/last/USD-BRL"
        );
    }

    #[test]
    fn default_server_url_points_at_quotation_path() {
        assert_eq!(default_server_url(), "http://localhost:8080/cotacao");
    }
}
