use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

const DATE_TIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// One minute candle as published by the exchange (and as stored in replay files).
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Candle {
    pub market: String,
    pub candle_date_time_kst: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub candle_date_time_utc: Option<String>,
    pub opening_price: f64,
    pub high_price: f64,
    pub low_price: f64,
    pub trade_price: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<i64>,
    pub candle_acc_trade_price: f64,
    pub candle_acc_trade_volume: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<u32>,
}

/// Exchange-neutral view of a [`Candle`] handed to the simulator.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct MarketInfo {
    pub market: String,
    pub date_time: String,
    pub opening_price: f64,
    pub high_price: f64,
    pub low_price: f64,
    pub closing_price: f64,
    pub acc_price: f64,
    pub acc_volume: f64,
}

impl From<&Candle> for MarketInfo {
    fn from(candle: &Candle) -> Self {
        Self {
            market: candle.market.clone(),
            date_time: strip_timezone(&candle.candle_date_time_kst),
            opening_price: candle.opening_price,
            high_price: candle.high_price,
            low_price: candle.low_price,
            closing_price: candle.trade_price,
            acc_price: candle.candle_acc_trade_price,
            acc_volume: candle.candle_acc_trade_volume,
        }
    }
}

/// Drops a trailing `Z` or `+HH:MM` offset, keeping the wall-clock part.
///
/// Values that are not ISO-8601 are returned unchanged.
pub fn strip_timezone(raw: &str) -> String {
    let trimmed = raw.trim();
    if let Ok(parsed) = DateTime::parse_from_rfc3339(trimmed) {
        return parsed.naive_local().format(DATE_TIME_FORMAT).to_string();
    }
    if let Ok(parsed) = NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%dT%H:%M:%S%.f") {
        return parsed.format(DATE_TIME_FORMAT).to_string();
    }
    trimmed.to_string()
}

/// Renders an upper bound for the `to` query parameter, truncated to the minute.
pub fn format_end_time(end: DateTime<Utc>) -> String {
    end.format("%Y-%m-%dT%H:%M:00Z").to_string()
}
