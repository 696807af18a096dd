use serde::Deserialize;

/// Top-level configuration settings for the application.
///
/// Includes settings for the viewer WebSocket server, the companion HTTP
/// endpoint, the Zenoh session, the bridge itself and logging.
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct Settings {
    pub server: ServerSettings,
    pub http: HttpSettings,
    pub zenoh: ZenohSettings,
    pub bridge: BridgeSettings,
    pub logging: LoggingSettings,
}

/// Viewer WebSocket server address.
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
}

/// Companion HTTP endpoint address. Port `0` picks a free port.
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct HttpSettings {
    pub host: String,
    pub port: u16,
}

/// Zenoh session and subscription parameters.
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct ZenohSettings {
    /// `peer` or `client`.
    pub mode: String,
    pub connect: Vec<String>,
    pub listen: Vec<String>,
    /// Optional JSON5 Zenoh configuration file applied before the overrides above.
    pub config_file: Option<String>,
    /// Key expression of the single wildcard subscription.
    pub key_expr: String,
}

/// Routing and channel policy of the bridge.
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct BridgeSettings {
    /// Shared topic for location fixes derived from any telemetry source.
    pub position_topic: String,
    pub pose_topic: String,
    pub transform_topic: String,
    /// Topic patterns dropped outright before any decoding.
    pub ignored_topics: Vec<String>,
    /// Topic patterns forwarded without schema inference.
    pub schema_exclusions: Vec<String>,
    /// Emit a throughput log line every this many messages (0 disables it).
    pub stats_interval: u64,
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct LoggingSettings {
    pub level: String,
    /// `text` or `json`.
    pub format: String,
}

/// Partial configuration settings loaded from files or environment.
///
/// Every field is optional; missing values are filled from defaults by [`PartialSettings::merge`].
#[derive(Debug, Default, Deserialize)]
pub struct PartialSettings {
    pub server: Option<PartialServerSettings>,
    pub http: Option<PartialHttpSettings>,
    pub zenoh: Option<PartialZenohSettings>,
    pub bridge: Option<PartialBridgeSettings>,
    pub logging: Option<PartialLoggingSettings>,
}

#[derive(Debug, Default, Deserialize)]
pub struct PartialServerSettings {
    pub host: Option<String>,
    pub port: Option<u16>,
}

#[derive(Debug, Default, Deserialize)]
pub struct PartialHttpSettings {
    pub host: Option<String>,
    pub port: Option<u16>,
}

#[derive(Debug, Default, Deserialize)]
pub struct PartialZenohSettings {
    pub mode: Option<String>,
    pub connect: Option<Vec<String>>,
    pub listen: Option<Vec<String>>,
    pub config_file: Option<String>,
    pub key_expr: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct PartialBridgeSettings {
    pub position_topic: Option<String>,
    pub pose_topic: Option<String>,
    pub transform_topic: Option<String>,
    pub ignored_topics: Option<Vec<String>>,
    pub schema_exclusions: Option<Vec<String>>,
    pub stats_interval: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
pub struct PartialLoggingSettings {
    pub level: Option<String>,
    pub format: Option<String>,
}

impl PartialSettings {
    /// Fill every missing value from `default`.
    pub fn merge(self, default: Settings) -> Settings {
        let server = self.server.unwrap_or_default();
        let http = self.http.unwrap_or_default();
        let zenoh = self.zenoh.unwrap_or_default();
        let bridge = self.bridge.unwrap_or_default();
        let logging = self.logging.unwrap_or_default();

        Settings {
            server: ServerSettings {
                host: server.host.unwrap_or(default.server.host),
                port: server.port.unwrap_or(default.server.port),
            },
            http: HttpSettings {
                host: http.host.unwrap_or(default.http.host),
                port: http.port.unwrap_or(default.http.port),
            },
            zenoh: ZenohSettings {
                mode: zenoh.mode.unwrap_or(default.zenoh.mode),
                connect: zenoh.connect.unwrap_or(default.zenoh.connect),
                listen: zenoh.listen.unwrap_or(default.zenoh.listen),
                config_file: zenoh.config_file.or(default.zenoh.config_file),
                key_expr: zenoh.key_expr.unwrap_or(default.zenoh.key_expr),
            },
            bridge: BridgeSettings {
                position_topic: bridge
                    .position_topic
                    .unwrap_or(default.bridge.position_topic),
                pose_topic: bridge.pose_topic.unwrap_or(default.bridge.pose_topic),
                transform_topic: bridge
                    .transform_topic
                    .unwrap_or(default.bridge.transform_topic),
                ignored_topics: bridge
                    .ignored_topics
                    .unwrap_or(default.bridge.ignored_topics),
                schema_exclusions: bridge
                    .schema_exclusions
                    .unwrap_or(default.bridge.schema_exclusions),
                stats_interval: bridge
                    .stats_interval
                    .unwrap_or(default.bridge.stats_interval),
            },
            logging: LoggingSettings {
                level: logging.level.unwrap_or(default.logging.level),
                format: logging.format.unwrap_or(default.logging.format),
            },
        }
    }
}

/// Provides default values for `Settings`.
///
/// Ensures the application has sensible defaults if no configuration is provided.
impl Default for Settings {
    fn default() -> Self {
        Self {
            server: ServerSettings {
                host: "0.0.0.0".to_string(),
                port: 8765,
            },
            http: HttpSettings {
                host: "0.0.0.0".to_string(),
                port: 0,
            },
            zenoh: ZenohSettings {
                mode: "peer".to_string(),
                connect: Vec::new(),
                listen: Vec::new(),
                config_file: None,
                key_expr: "**".to_string(),
            },
            bridge: BridgeSettings::default(),
            logging: LoggingSettings {
                level: "info".to_string(),
                format: "text".to_string(),
            },
        }
    }
}

impl Default for BridgeSettings {
    fn default() -> Self {
        Self {
            position_topic: "vehicle/position".to_string(),
            pose_topic: "vehicle/pose".to_string(),
            transform_topic: "vehicle/transform".to_string(),
            ignored_topics: vec!["rosout/**".to_string()],
            schema_exclusions: Vec::new(),
            stats_interval: 1000,
        }
    }
}
