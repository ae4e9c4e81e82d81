use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use smtm_config::{NodeConfig, ReplaySource};
use smtm_data::SimulationDataProvider;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    let config_path = std::env::var("SMTM_CONFIG_PATH")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("config/config.toml"));
    let (node_config, config_err) = match NodeConfig::from_file(&config_path) {
        Ok(cfg) => (cfg, None),
        Err(err) => (NodeConfig::default(), Some(err)),
    };

    let log_dir = node_config.logging.log_path.as_ref().map(PathBuf::from);
    let _log_guard = smtm_log::init_tracing(log_dir.as_deref())?;
    smtm_log::reload_tracing_filter(&node_config.logging.level)?;
    if let Some(err) = config_err {
        warn!(?err, ?config_path, "failed to load config file, using defaults");
    }
    info!(config = ?node_config.redacted(), "replay starting");

    let mut provider = SimulationDataProvider::from_config(node_config.data_provider.clone());
    match node_config.replay.source {
        ReplaySource::File => {
            let path = node_config
                .replay
                .file_path
                .as_deref()
                .context("replay.file_path is required for file replays")?;
            provider.initialize_with_file(path);
            if !provider.is_initialized() {
                bail!("no candles loaded from {path}");
            }
        }
        ReplaySource::Server => {
            let count = node_config.data_provider.count;
            let end = node_config.replay.end_param();
            provider
                .initialize_from_server(end.as_deref(), count)
                .await
                .context("no candles available from server")?;
        }
    }

    let mut served = 0usize;
    while let Some(info) = provider.get_info() {
        served += 1;
        info!(index = provider.index(), record = %serde_json::to_string(&info)?, "market info");
    }

    info!(served, "replay finished");
    Ok(())
}
