use std::time::Duration;

use reqwest::{Client, Proxy};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{DataError, DataResult};

/// HTTP settings for the candle endpoint.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct TransportConfig {
    pub request_timeout_secs: u64,
    pub connect_timeout_secs: u64,
    /// Any scheme reqwest accepts: `http://`, `https://`, `socks5://`, `socks5h://`.
    pub proxy_url: Option<String>,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            request_timeout_secs: 30,
            connect_timeout_secs: 10,
            proxy_url: None,
        }
    }
}

pub fn build_candle_client(transport: &TransportConfig) -> DataResult<Client> {
    let builder = Client::builder()
        .user_agent(concat!("smtm-data/", env!("CARGO_PKG_VERSION")))
        .timeout(Duration::from_secs(transport.request_timeout_secs))
        .connect_timeout(Duration::from_secs(transport.connect_timeout_secs));

    let builder = match transport.proxy_url.as_deref() {
        Some(url) => {
            let proxy = Proxy::all(url)
                .map_err(|err| DataError::Client(format!("invalid proxy {url}: {err}")))?;
            builder.proxy(proxy)
        }
        None => builder,
    };

    debug!(proxied = transport.proxy_url.is_some(), "candle client configured");
    builder
        .build()
        .map_err(|err| DataError::Client(err.to_string()))
}
