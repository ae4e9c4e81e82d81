//! Historical candle replay for the smtm trading simulator.

pub mod error;
pub mod provider;
pub mod transport;
pub mod types;

pub use error::{DataError, DataResult};
pub use provider::{
    DataProviderConfig, SimulationDataProvider, DEFAULT_COUNT, DEFAULT_MARKET,
    UPBIT_MINUTE_CANDLES_URL,
};
pub use transport::{build_candle_client, TransportConfig};
pub use types::{format_end_time, strip_timezone, Candle, MarketInfo};
