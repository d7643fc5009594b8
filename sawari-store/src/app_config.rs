use serde::Deserialize;
use std::env;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub business_rules: BusinessRules,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub port: u16,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    pub url: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct BusinessRules {
    /// Seconds a seat lock stays valid before the sweeper may reclaim it.
    #[serde(default = "default_lock_ttl")]
    pub lock_ttl_seconds: u64,

    /// How often the background sweep runs.
    #[serde(default = "default_sweep_interval")]
    pub sweep_interval_seconds: u64,

    /// GST rate used when the operator has no configured rate.
    #[serde(default = "default_gst")]
    pub default_gst_percent: f64,

    /// Per-seat fare of last resort when neither the seat nor the bus
    /// carries price data.
    #[serde(default = "default_fallback_fare")]
    pub fallback_seat_fare: f64,
}

fn default_lock_ttl() -> u64 {
    492 // 8.2 minutes
}

fn default_sweep_interval() -> u64 {
    60
}

fn default_gst() -> f64 {
    5.0
}

fn default_fallback_fare() -> f64 {
    500.0
}

impl Default for BusinessRules {
    fn default() -> Self {
        Self {
            lock_ttl_seconds: default_lock_ttl(),
            sweep_interval_seconds: default_sweep_interval(),
            default_gst_percent: default_gst(),
            fallback_seat_fare: default_fallback_fare(),
        }
    }
}

impl Config {
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let s = config::Config::builder()
            .add_source(config::File::with_name("config/default"))
            // Environment-specific overrides are optional
            .add_source(config::File::with_name(&format!("config/{}", run_mode)).required(false))
            // Local overrides, not checked in
            .add_source(config::File::with_name("config/local").required(false))
            // E.g. SAWARI_SERVER__PORT=8080
            .add_source(config::Environment::with_prefix("SAWARI").separator("__"))
            .build()?;

        s.try_deserialize()
    }
}
