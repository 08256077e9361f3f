///! Notification composition
///!
///! Builds the structured message dispatched to the chat sink. Composition
///! is total: every positional field degrades to a placeholder when absent,
///! so a sparse provider response can never fail message building.

use crate::module::n2yo::{NoradId, Position, SatelliteInfo};
use chrono::Utc;

/// Accent color for pass notifications (the sink renders it as the embed
/// stripe).
pub const PASS_COLOR: u32 = 0x3498db;

/// Placeholder for absent location figures.
const NOT_AVAILABLE: &str = "N/A";
/// Placeholder for absent look angles.
const NOT_AVAILABLE_LONG: &str = "Not available";

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// A structured message for the notification sink.
#[derive(Debug, Clone, PartialEq)]
pub struct Notification {
    pub title: String,
    pub url: Option<String>,
    pub description: Option<String>,
    pub color: Option<u32>,
    pub fields: Vec<NotificationField>,
    pub footer: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NotificationField {
    pub name: String,
    pub value: String,
    pub inline: bool,
}

fn format_figure(value: Option<f64>, fallback: &str) -> String {
    match value {
        Some(v) => v.to_string(),
        None => fallback.to_string(),
    }
}

/// Compose the notification for one newly reported satellite.
///
/// Only the first position sample is rendered; the place name, when the
/// geocoder resolved one, is appended as an extra line.
pub fn compose_pass_notification(
    norad_id: NoradId,
    info: &SatelliteInfo,
    positions: &[Position],
    place: Option<&str>,
) -> Notification {
    let timestamp = Utc::now().format(TIMESTAMP_FORMAT).to_string();

    let mut fields = vec![NotificationField {
        name: "🌍 NORAD ID".to_string(),
        value: info
            .satid
            .map(|id| id.to_string())
            .unwrap_or_else(|| norad_id.to_string()),
        inline: true,
    }];

    if let Some(position) = positions.first() {
        let mut block = format!(
            "📍 Location: Lat: {}, Lon: {}, Alt: {} km\n🔄 Azimuth: {}\n📡 Elevation: {}",
            format_figure(position.satlatitude, NOT_AVAILABLE),
            format_figure(position.satlongitude, NOT_AVAILABLE),
            format_figure(position.sataltitude, NOT_AVAILABLE),
            format_figure(position.azimuth, NOT_AVAILABLE_LONG),
            format_figure(position.elevation, NOT_AVAILABLE_LONG),
        );

        if let Some(place) = place {
            block.push_str("\n📍 Overhead: ");
            block.push_str(place);
        }

        fields.push(NotificationField {
            name: "🛰️ Position Info".to_string(),
            value: block,
            inline: false,
        });
    }

    Notification {
        title: format!("🛰️ Satellite: {}", info.display_name()),
        url: Some(format!("https://www.n2yo.com/satellite/?s={}", norad_id)),
        description: Some(timestamp),
        color: Some(PASS_COLOR),
        fields,
        footer: info
            .transactionscount
            .map(|count| format!("N2YO Transactions: {}/1000", count)),
    }
}

/// Compose the daily rollup summary.
pub fn compose_daily_rollup(reported_count: usize) -> Notification {
    let timestamp = Utc::now().format(TIMESTAMP_FORMAT).to_string();

    Notification {
        title: "📊 Daily Satellite Report 📊".to_string(),
        url: None,
        description: Some(timestamp),
        color: Some(PASS_COLOR),
        fields: vec![NotificationField {
            name: "Total satellites tracked".to_string(),
            value: reported_count.to_string(),
            inline: true,
        }],
        footer: None,
    }
}
