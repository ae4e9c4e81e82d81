use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use smtm_data::{format_end_time, DataProviderConfig};

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub log_path: Option<String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            log_path: Some("logs".to_string()),
        }
    }
}

/// Where the replay harness takes its candles from.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub enum ReplaySource {
    File,
    Server,
}

impl Default for ReplaySource {
    fn default() -> Self {
        ReplaySource::Server
    }
}

#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ReplayConfig {
    pub source: ReplaySource,
    pub file_path: Option<String>,
    /// Upper bound passed as `to` for server replays.
    pub end: Option<String>,
}

impl ReplayConfig {
    /// `end` as sent on the wire. RFC 3339 instants are shifted to UTC and
    /// truncated to the minute; anything else is forwarded untouched.
    pub fn end_param(&self) -> Option<String> {
        let raw = self.end.as_deref()?;
        Some(match DateTime::parse_from_rfc3339(raw) {
            Ok(parsed) => format_end_time(parsed.with_timezone(&Utc)),
            Err(_) => raw.to_string(),
        })
    }
}

#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct NodeConfig {
    pub logging: LoggingConfig,
    pub data_provider: DataProviderConfig,
    pub replay: ReplayConfig,
}

impl NodeConfig {
    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?;
        let mut cfg: NodeConfig = match path.extension().and_then(|s| s.to_str()) {
            Some("yaml") | Some("yml") => serde_yaml::from_str(&contents)?,
            _ => toml::from_str(&contents)?,
        };
        apply_env_overrides(&mut cfg);
        Ok(cfg)
    }

    pub fn redacted(&self) -> Self {
        let mut cloned = self.clone();
        if cloned.data_provider.transport.proxy_url.is_some() {
            cloned.data_provider.transport.proxy_url = Some("***".to_string());
        }
        cloned
    }
}

fn apply_env_overrides(cfg: &mut NodeConfig) {
    if let Ok(level) = std::env::var("SMTM_LOG_LEVEL") {
        cfg.logging.level = level;
    }
    if let Ok(proxy_url) = std::env::var("SMTM_PROXY_URL") {
        cfg.data_provider.transport.proxy_url = Some(proxy_url);
    }
    if let Ok(endpoint) = std::env::var("SMTM_CANDLE_URL") {
        cfg.data_provider.endpoint = endpoint;
    }
    if let Ok(market) = std::env::var("SMTM_MARKET") {
        cfg.data_provider.market = market;
    }
    if let Ok(file_path) = std::env::var("SMTM_REPLAY_FILE") {
        cfg.replay.source = ReplaySource::File;
        cfg.replay.file_path = Some(file_path);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use smtm_data::DEFAULT_MARKET;
    use tempfile::NamedTempFile;

    #[test]
    fn loads_from_toml_file() {
        let mut file = NamedTempFile::new().unwrap();
        let contents = br#"
[logging]
level = "debug"

[data_provider]
endpoint = "http://127.0.0.1:9999/v1/candles/minutes/1"
market = "KRW-ETH"
count = 200

[data_provider.transport]
request_timeout_secs = 5

[replay]
source = "File"
file_path = "tests/data/test_record.json"
"#;
        std::io::Write::write_all(&mut file, contents).unwrap();

        let cfg = NodeConfig::from_file(file.path()).unwrap();
        assert_eq!(cfg.logging.level, "debug");
        assert_eq!(cfg.data_provider.market, "KRW-ETH");
        assert_eq!(cfg.data_provider.count, 200);
        assert_eq!(cfg.data_provider.transport.request_timeout_secs, 5);
        assert_eq!(cfg.data_provider.transport.connect_timeout_secs, 10);
        assert_eq!(cfg.replay.source, ReplaySource::File);
        assert_eq!(
            cfg.replay.file_path.as_deref(),
            Some("tests/data/test_record.json")
        );
    }

    #[test]
    fn missing_sections_fall_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[logging]\nlevel = \"warn\"\n").unwrap();

        let cfg = NodeConfig::from_file(&path).unwrap();
        assert_eq!(cfg.logging.level, "warn");
        assert_eq!(cfg.data_provider.market, DEFAULT_MARKET);
        assert_eq!(cfg.data_provider.count, 100);
        assert_eq!(cfg.replay.source, ReplaySource::Server);
    }

    #[test]
    fn loads_yaml_by_extension() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        std::fs::write(
            &path,
            "data_provider:\n  market: KRW-XRP\nreplay:\n  source: Server\n  end: \"2020-04-30T07:30:00Z\"\n",
        )
        .unwrap();

        let cfg = NodeConfig::from_file(&path).unwrap();
        assert_eq!(cfg.data_provider.market, "KRW-XRP");
        assert_eq!(cfg.replay.end.as_deref(), Some("2020-04-30T07:30:00Z"));
    }

    #[test]
    fn env_vars_override_file_values() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            r#"
[data_provider]
market = "KRW-BTC"
count = 25
"#,
        )
        .unwrap();

        std::env::set_var("SMTM_CANDLE_URL", "http://localhost:8081/candles");
        std::env::set_var("SMTM_PROXY_URL", "socks5h://127.0.0.1:9050");

        let cfg = NodeConfig::from_file(&path).unwrap();
        assert_eq!(cfg.data_provider.count, 25);
        assert_eq!(cfg.data_provider.market, "KRW-BTC");
        assert_eq!(cfg.data_provider.endpoint, "http://localhost:8081/candles");
        assert_eq!(
            cfg.data_provider.transport.proxy_url.as_deref(),
            Some("socks5h://127.0.0.1:9050")
        );

        std::env::remove_var("SMTM_CANDLE_URL");
        std::env::remove_var("SMTM_PROXY_URL");
    }

    #[test]
    fn missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(NodeConfig::from_file(&dir.path().join("absent.toml")).is_err());
    }

    #[test]
    fn end_param_normalizes_rfc3339_to_utc_minute() {
        let replay = ReplayConfig {
            end: Some("2020-04-30T16:30:42+09:00".to_string()),
            ..ReplayConfig::default()
        };
        assert_eq!(replay.end_param().as_deref(), Some("2020-04-30T07:30:00Z"));
    }

    #[test]
    fn end_param_forwards_other_strings() {
        let replay = ReplayConfig {
            end: Some("2020-04-30 07:30:00".to_string()),
            ..ReplayConfig::default()
        };
        assert_eq!(replay.end_param().as_deref(), Some("2020-04-30 07:30:00"));
        assert_eq!(ReplayConfig::default().end_param(), None);
    }

    #[test]
    fn redacts_proxy_credentials() {
        let mut cfg = NodeConfig::default();
        cfg.data_provider.transport.proxy_url = Some("http://user:pw@proxy:3128".to_string());
        let redacted = cfg.redacted();
        assert_eq!(
            redacted.data_provider.transport.proxy_url.as_deref(),
            Some("***")
        );
        assert_eq!(redacted.data_provider.market, cfg.data_provider.market);
    }
}
