use crate::module::n2yo::ObserverLocation;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

const CONFIG_PATH: &str = "config.toml";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default = "default_log_level")]
    pub log_level: String,

    pub observer: ObserverConfig,
    pub n2yo: N2yoConfig,
    pub geocode: GeocodeConfig,
    pub sink: SinkConfig,

    #[serde(default)]
    pub schedule: ScheduleConfig,

    #[serde(default)]
    pub audit: AuditConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObserverConfig {
    pub latitude: f64,
    pub longitude: f64,

    /// Altitude above sea level in meters
    #[serde(default)]
    pub altitude_m: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct N2yoConfig {
    /// No default on purpose: credentials must come from the operator
    pub api_key: String,

    #[serde(default = "default_n2yo_base_url")]
    pub base_url: String,

    #[serde(default = "default_search_radius")]
    pub search_radius_deg: u32,

    /// 0 = all categories
    #[serde(default)]
    pub category_id: u32,

    #[serde(default = "default_position_seconds")]
    pub position_seconds: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeocodeConfig {
    pub api_key: String,

    #[serde(default = "default_geocode_base_url")]
    pub base_url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SinkConfig {
    /// Webhook endpoint of the one preconfigured destination
    pub webhook_url: String,

    #[serde(default = "default_messages_per_minute")]
    pub messages_per_minute: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleConfig {
    #[serde(default = "default_discovery_interval")]
    pub discovery_interval_minutes: u64,

    #[serde(default)]
    pub rollup_hour_utc: u32,

    #[serde(default = "default_true")]
    pub initial_discovery: bool,
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            discovery_interval_minutes: default_discovery_interval(),
            rollup_hour_utc: 0,
            initial_discovery: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditConfig {
    #[serde(default = "default_audit_path")]
    pub path: String,
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            path: default_audit_path(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_n2yo_base_url() -> String {
    "https://api.n2yo.com/rest/v1/satellite".to_string()
}

fn default_geocode_base_url() -> String {
    "https://api.opencagedata.com/geocode/v1/json".to_string()
}

fn default_search_radius() -> u32 {
    30
}

fn default_position_seconds() -> u32 {
    2
}

fn default_messages_per_minute() -> u32 {
    30
}

fn default_discovery_interval() -> u64 {
    10
}

fn default_audit_path() -> String {
    "data/pass_log.jsonl".to_string()
}

fn default_true() -> bool {
    true
}

impl AppConfig {
    pub fn observer_location(&self) -> ObserverLocation {
        ObserverLocation {
            latitude: self.observer.latitude,
            longitude: self.observer.longitude,
            altitude_m: self.observer.altitude_m,
        }
    }

    fn validate(&self) -> anyhow::Result<()> {
        if !(-90.0..=90.0).contains(&self.observer.latitude)
            || !(-180.0..=180.0).contains(&self.observer.longitude)
        {
            anyhow::bail!(
                "Invalid observer location: {}, {}",
                self.observer.latitude,
                self.observer.longitude
            );
        }
        if self.n2yo.search_radius_deg == 0 || self.n2yo.search_radius_deg > 90 {
            anyhow::bail!(
                "search_radius_deg must be within (0, 90], got {}",
                self.n2yo.search_radius_deg
            );
        }
        if self.n2yo.position_seconds == 0 {
            anyhow::bail!("position_seconds must be at least 1");
        }
        if self.schedule.rollup_hour_utc > 23 {
            anyhow::bail!(
                "rollup_hour_utc must be within 0..=23, got {}",
                self.schedule.rollup_hour_utc
            );
        }
        if self.n2yo.api_key.is_empty()
            || self.geocode.api_key.is_empty()
            || self.sink.webhook_url.is_empty()
        {
            anyhow::bail!("api keys and the sink webhook URL must not be empty");
        }
        Ok(())
    }
}

pub static CONFIG: OnceLock<AppConfig> = OnceLock::new();

pub fn read_config() -> anyhow::Result<()> {
    let config_str = std::fs::read_to_string(CONFIG_PATH)
        .map_err(|e| anyhow::anyhow!("Failed to read config file {}: {}", CONFIG_PATH, e))?;

    let config: AppConfig = toml::from_str(&config_str)
        .map_err(|e| anyhow::anyhow!("Failed to parse config file {}: {}", CONFIG_PATH, e))?;

    config.validate()?;

    CONFIG
        .set(config)
        .map_err(|_| anyhow::anyhow!("Configuration already loaded"))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINIMAL: &str = r#"
        [observer]
        latitude = 40.7
        longitude = -74.0

        [n2yo]
        api_key = "N2YO-KEY"

        [geocode]
        api_key = "OC-KEY"

        [sink]
        webhook_url = "https://discord.com/api/webhooks/1/abc"
    "#;

    #[test]
    fn test_minimal_config_gets_defaults() {
        let config: AppConfig = toml::from_str(MINIMAL).unwrap();
        config.validate().unwrap();

        assert_eq!(config.log_level, "info");
        assert_eq!(config.observer.altitude_m, 0.0);
        assert_eq!(config.n2yo.search_radius_deg, 30);
        assert_eq!(config.n2yo.category_id, 0);
        assert_eq!(config.n2yo.position_seconds, 2);
        assert_eq!(config.schedule.discovery_interval_minutes, 10);
        assert_eq!(config.schedule.rollup_hour_utc, 0);
        assert!(config.schedule.initial_discovery);
        assert_eq!(config.audit.path, "data/pass_log.jsonl");
        assert_eq!(config.sink.messages_per_minute, 30);
    }

    #[test]
    fn test_missing_credentials_fail_parsing() {
        let result: Result<AppConfig, _> = toml::from_str(
            r#"
            [observer]
            latitude = 40.7
            longitude = -74.0

            [n2yo]
            api_key = "N2YO-KEY"

            [geocode]
            api_key = "OC-KEY"
            "#,
        );
        assert!(result.is_err()); // no [sink] section
    }

    #[test]
    fn test_out_of_range_radius_fails_validation() {
        let mut config: AppConfig = toml::from_str(MINIMAL).unwrap();
        config.n2yo.search_radius_deg = 120;
        assert!(config.validate().is_err());

        config.n2yo.search_radius_deg = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_out_of_range_rollup_hour_fails_validation() {
        let mut config: AppConfig = toml::from_str(MINIMAL).unwrap();
        config.schedule.rollup_hour_utc = 24;
        assert!(config.validate().is_err());
    }
}
