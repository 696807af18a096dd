//! Command-line interface.
//!
//! Flags override values loaded from the config file and environment.

use clap::Parser;

use crate::config::Settings;
use crate::utils::logging::LogFormat;

/// Bridge Zenoh topics to WebSocket visualization channels.
#[derive(Parser, Debug, Default)]
#[command(name = "foxbridge", version, about)]
pub struct Cli {
    /// Configuration file (TOML, YAML or JSON). Defaults to `config/default` if present.
    #[arg(long, short = 'c')]
    pub config: Option<String>,

    /// Log level: error, warn, info, debug or trace.
    #[arg(long)]
    pub log_level: Option<String>,

    /// Log output format.
    #[arg(long, value_enum)]
    pub log_format: Option<LogFormat>,

    /// Port of the viewer WebSocket server.
    #[arg(long)]
    pub ws_port: Option<u16>,

    /// Port of the companion HTTP server (0 picks a free port).
    #[arg(long)]
    pub http_port: Option<u16>,

    /// Zenoh session mode: `peer` or `client`.
    #[arg(long, value_parser = ["peer", "client"])]
    pub zenoh_mode: Option<String>,

    /// Zenoh endpoint to connect to (e.g. `tcp/192.168.1.100:7447`). Can be repeated.
    #[arg(long)]
    pub zenoh_connect: Vec<String>,
}

impl Cli {
    /// Apply every flag that was given on top of `settings`.
    pub fn apply(&self, mut settings: Settings) -> Settings {
        if let Some(level) = &self.log_level {
            settings.logging.level = level.clone();
        }
        if let Some(format) = self.log_format {
            settings.logging.format = format.as_str().to_string();
        }
        if let Some(port) = self.ws_port {
            settings.server.port = port;
        }
        if let Some(port) = self.http_port {
            settings.http.port = port;
        }
        if let Some(mode) = &self.zenoh_mode {
            settings.zenoh.mode = mode.clone();
        }
        if !self.zenoh_connect.is_empty() {
            settings.zenoh.connect = self.zenoh_connect.clone();
        }
        settings
    }
}
