use std::path::Path;

use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::{DataError, DataResult, FileLoadError};
use crate::transport::{build_candle_client, TransportConfig};
use crate::types::{Candle, MarketInfo};

pub const UPBIT_MINUTE_CANDLES_URL: &str = "https://api.upbit.com/v1/candles/minutes/1";
pub const DEFAULT_MARKET: &str = "KRW-BTC";
pub const DEFAULT_COUNT: u32 = 100;

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DataProviderConfig {
    pub endpoint: String,
    pub market: String,
    pub count: u32,
    pub transport: TransportConfig,
}

impl Default for DataProviderConfig {
    fn default() -> Self {
        Self {
            endpoint: UPBIT_MINUTE_CANDLES_URL.to_string(),
            market: DEFAULT_MARKET.to_string(),
            count: DEFAULT_COUNT,
            transport: TransportConfig::default(),
        }
    }
}

#[derive(Debug, Serialize)]
struct CandleQuery<'a> {
    market: &'a str,
    count: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    to: Option<&'a str>,
}

/// Replays historical candles one at a time for the simulator.
///
/// Two initializers fill the store and they fail differently:
/// [`initialize_with_file`](Self::initialize_with_file) only clears the
/// initialized flag, while
/// [`initialize_from_server`](Self::initialize_from_server) also returns a
/// [`DataError`]. Neither touches previously loaded data on failure.
#[derive(Debug, Default)]
pub struct SimulationDataProvider {
    config: DataProviderConfig,
    client: Option<Client>,
    data: Vec<Candle>,
    index: usize,
    is_initialized: bool,
}

impl SimulationDataProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_config(config: DataProviderConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    /// Use a prebuilt client instead of one derived from the net profile.
    pub fn with_client(config: DataProviderConfig, client: Client) -> Self {
        Self {
            config,
            client: Some(client),
            ..Self::default()
        }
    }

    pub fn is_initialized(&self) -> bool {
        self.is_initialized
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn data(&self) -> &[Candle] {
        &self.data
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Records still to be served; zero while uninitialized.
    pub fn remaining(&self) -> usize {
        if self.is_initialized {
            self.data.len() - self.index
        } else {
            0
        }
    }

    /// Load candles from a JSON array on disk, kept in file order.
    ///
    /// A missing file, malformed JSON or an empty array leaves the provider
    /// uninitialized; the reason is only logged.
    pub fn initialize_with_file(&mut self, path: impl AsRef<Path>) {
        let path = path.as_ref();
        match load_candles(path) {
            Ok(candles) => {
                info!(path = %path.display(), records = candles.len(), "replay file loaded");
                self.install(candles);
            }
            Err(err) => {
                self.is_initialized = false;
                warn!(path = %path.display(), %err, "replay file rejected");
            }
        }
    }

    /// Fetch up to `count` candles ending at `end` (server default: now) and
    /// store them oldest-first.
    pub async fn initialize_from_server(&mut self, end: Option<&str>, count: u32) -> DataResult<()> {
        match self.fetch_candles(end, count).await {
            Ok(mut candles) => {
                // exchange pages are newest-first
                candles.reverse();
                info!(
                    market = %self.config.market,
                    records = candles.len(),
                    end = end.unwrap_or("latest"),
                    "candles loaded from server"
                );
                self.install(candles);
                Ok(())
            }
            Err(err) => {
                self.is_initialized = false;
                warn!(market = %self.config.market, %err, "server initialization failed");
                Err(err)
            }
        }
    }

    /// Latest candles with the configured count.
    pub async fn initialize_from_server_default(&mut self) -> DataResult<()> {
        let count = self.config.count;
        self.initialize_from_server(None, count).await
    }

    /// Next record in replay order, or `None` when uninitialized or exhausted.
    pub fn get_info(&mut self) -> Option<MarketInfo> {
        if !self.is_initialized {
            return None;
        }
        let info = MarketInfo::from(self.data.get(self.index)?);
        self.index += 1;
        Some(info)
    }

    fn install(&mut self, candles: Vec<Candle>) {
        self.data = candles;
        self.index = 0;
        self.is_initialized = true;
    }

    fn http_client(&mut self) -> DataResult<Client> {
        if let Some(client) = &self.client {
            return Ok(client.clone());
        }
        let client = build_candle_client(&self.config.transport)?;
        self.client = Some(client.clone());
        Ok(client)
    }

    async fn fetch_candles(&mut self, end: Option<&str>, count: u32) -> DataResult<Vec<Candle>> {
        let client = self.http_client()?;
        let query = CandleQuery {
            market: &self.config.market,
            count,
            to: end,
        };
        debug!(endpoint = %self.config.endpoint, ?query, "requesting candles");

        let response = client.get(&self.config.endpoint).query(&query).send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(DataError::HttpStatus { status, body });
        }

        let body = response.bytes().await?;
        let candles: Vec<Candle> = serde_json::from_slice(&body)?;
        if candles.is_empty() {
            return Err(DataError::EmptyResponse);
        }
        Ok(candles)
    }
}

fn load_candles(path: &Path) -> Result<Vec<Candle>, FileLoadError> {
    let contents = std::fs::read_to_string(path)?;
    let candles: Vec<Candle> = serde_json::from_str(&contents)?;
    if candles.is_empty() {
        return Err(FileLoadError::Empty);
    }
    Ok(candles)
}
