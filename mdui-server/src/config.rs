use std::{fs, ops::RangeInclusive};

use anyhow::{Context, Result};
use clap::Parser;
use serde::Deserialize;

use mdui_flow::DEFAULT_ENTITY_ID_PARAMETER;

#[derive(Parser, Debug, Clone, Deserialize)]
#[command(name = "server")]
#[command(author, version, about, long_about = None)]
pub struct AppConfig {
    #[clap(long)]
    #[arg(short = 'c')]
    #[serde(default)]
    pub config: Option<String>,
    #[clap(long, env)]
    #[arg(default_value_t = String::from("mdui_server=info,tower_http=info"))]
    #[serde(default = "default_rust_log")]
    pub rust_log: String,
    #[clap(long, env)]
    #[arg(value_parser = port_in_range,short = 'p', default_value_t = 30050)]
    #[serde(default = "default_port")]
    pub port: u16,
    /// Request parameter carrying the service provider entity id.
    #[clap(long, env)]
    #[arg(default_value_t = String::from(DEFAULT_ENTITY_ID_PARAMETER))]
    #[serde(default = "default_entity_id_parameter")]
    pub entity_id_parameter: String,
    /// JSON service definition file, or a directory of them.
    #[clap(long, env)]
    pub services_path: String,
    /// TOML catalogue of MDUI entries.
    #[clap(long, env)]
    #[serde(default)]
    pub metadata_path: Option<String>,
    #[clap(long, env)]
    #[arg(default_value_t = false)]
    #[serde(default)]
    pub mdui_service_fallback: bool,
    /// Seconds between service registry reloads, 0 disables reloading.
    #[clap(long, env)]
    #[arg(default_value_t = 60)]
    #[serde(default = "default_reload_interval")]
    pub reload_interval: u64,
    #[clap(long, env)]
    #[arg(default_value_t = 512)]
    #[serde(default = "default_cache_size")]
    pub cache_size: usize,
}

fn default_rust_log() -> String {
    String::from("mdui_server=info,tower_http=info")
}

fn default_port() -> u16 {
    30050
}

fn default_entity_id_parameter() -> String {
    String::from(DEFAULT_ENTITY_ID_PARAMETER)
}

fn default_reload_interval() -> u64 {
    60
}

fn default_cache_size() -> usize {
    512
}

const PORT_RANGE: RangeInclusive<usize> = 1..=65535;

fn port_in_range(s: &str) -> Result<u16, String> {
    let port: usize = s
        .parse()
        .map_err(|_| format!("`{s}` isn't a port number"))?;
    if PORT_RANGE.contains(&port) {
        Ok(port as u16)
    } else {
        Err(format!(
            "port not in range {}-{}",
            PORT_RANGE.start(),
            PORT_RANGE.end()
        ))
    }
}

pub fn load(cfg: &str) -> Result<AppConfig> {
    let content =
        fs::read_to_string(cfg).context("could not read config file")?;
    toml::from_str(&content).context("could not parse config file")
}
