///! Data types for the N2YO satellite data provider
///!
///! Field names follow the provider's JSON wire format. Every positional
///! field is optional: the provider omits fields it has no data for, and a
///! missing field must degrade to a placeholder downstream instead of
///! failing deserialization.

use serde::{Deserialize, Serialize};

/// NORAD ID type (satellite unique identifier)
pub type NoradId = u32;

/// Fixed ground observer, set once at startup from configuration.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ObserverLocation {
    pub latitude: f64,
    pub longitude: f64,
    /// Altitude above sea level in meters
    pub altitude_m: f64,
}

/// One element of the provider's `above` array.
///
/// Only the identifier and display name are consumed; the provider sends
/// more fields, which serde ignores.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiscoveredSatellite {
    pub satid: NoradId,
    pub satname: String,
}

/// The `info` block of a positions response. Display data only, so every
/// field tolerates absence.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SatelliteInfo {
    #[serde(default)]
    pub satid: Option<NoradId>,
    #[serde(default)]
    pub satname: Option<String>,
    #[serde(default)]
    pub transactionscount: Option<u64>,
}

impl SatelliteInfo {
    /// Display name with the provider's documented fallback.
    pub fn display_name(&self) -> &str {
        self.satname.as_deref().unwrap_or("Unknown")
    }
}

/// A single position sample. Any field may be absent.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Position {
    #[serde(default)]
    pub satlatitude: Option<f64>,
    #[serde(default)]
    pub satlongitude: Option<f64>,
    /// Altitude in kilometers
    #[serde(default)]
    pub sataltitude: Option<f64>,
    #[serde(default)]
    pub azimuth: Option<f64>,
    #[serde(default)]
    pub elevation: Option<f64>,
}

/// Provider-reported count of remaining permitted requests.
///
/// Observed and logged, never enforced.
pub type QuotaSignal = Option<u32>;

/// Result of one discovery query.
#[derive(Debug, Clone)]
pub struct Discovery {
    pub satellites: Vec<DiscoveredSatellite>,
    pub quota: QuotaSignal,
}

/// Result of one positions query.
#[derive(Debug, Clone)]
pub struct PositionReport {
    pub info: SatelliteInfo,
    pub positions: Vec<Position>,
    pub quota: QuotaSignal,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_position_tolerates_missing_fields() {
        let sample: Position = serde_json::from_str(r#"{"satlatitude": 12.5}"#).unwrap();
        assert_eq!(sample.satlatitude, Some(12.5));
        assert_eq!(sample.satlongitude, None);
        assert_eq!(sample.azimuth, None);
    }

    #[test]
    fn test_discovered_satellite_ignores_extra_fields() {
        let sat: DiscoveredSatellite = serde_json::from_str(
            r#"{"satid": 25544, "satname": "SPACE STATION", "intDesignator": "1998-067A", "satalt": 417.2}"#,
        )
        .unwrap();
        assert_eq!(sat.satid, 25544);
        assert_eq!(sat.satname, "SPACE STATION");
    }

    #[test]
    fn test_display_name_fallback() {
        let info = SatelliteInfo::default();
        assert_eq!(info.display_name(), "Unknown");

        let info = SatelliteInfo {
            satname: Some("NOAA 19".to_string()),
            ..Default::default()
        };
        assert_eq!(info.display_name(), "NOAA 19");
    }
}
