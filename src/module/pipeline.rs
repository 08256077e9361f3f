///! Enrichment & notify pipeline
///!
///! The only stateful path in the process. One discovery cycle lists the
///! satellites above the horizon, and every satellite not yet in the
///! seen-set is enriched (position lookup, then best-effort reverse
///! geocode), notified, audited, and marked seen - in the order the
///! provider returned them.
///!
///! Failure policy:
///! - discovery failure: the whole cycle degrades to empty, logged
///! - position failure: the satellite stays un-seen and is retried on the
///!   next cycle
///! - geocode miss: the notification goes out without the place line
///! - dispatch failure: logged, the satellite is still marked seen
///!   (at-most-once delivery)

use crate::module::audit::{AuditLog, AuditRecord};
use crate::module::geocode::PlaceResolver;
use crate::module::n2yo::{
    DiscoveredSatellite, ObserverLocation, QuotaSignal, SatelliteProvider,
};
use crate::module::notify::{
    compose_daily_rollup, compose_pass_notification, NotifySink, RateLimiter,
};
use crate::module::reported::ReportedSet;
use tokio::sync::Mutex;

/// Per-process discovery parameters, read once from configuration.
#[derive(Debug, Clone)]
pub struct PipelineSettings {
    pub observer: ObserverLocation,
    /// Search radius in degrees, (0, 90]
    pub search_radius_deg: u32,
    /// Provider category filter, 0 = all categories
    pub category_id: u32,
    /// Number of successive position samples to request
    pub position_seconds: u32,
}

pub struct PassPipeline<P, G, S> {
    provider: P,
    geocoder: G,
    sink: S,
    audit: AuditLog,
    reported: ReportedSet,
    limiter: Mutex<RateLimiter>,
    settings: PipelineSettings,
}

impl<P, G, S> PassPipeline<P, G, S>
where
    P: SatelliteProvider,
    G: PlaceResolver,
    S: NotifySink,
{
    pub fn new(
        provider: P,
        geocoder: G,
        sink: S,
        audit: AuditLog,
        reported: ReportedSet,
        limiter: RateLimiter,
        settings: PipelineSettings,
    ) -> Self {
        Self {
            provider,
            geocoder,
            sink,
            audit,
            reported,
            limiter: Mutex::new(limiter),
            settings,
        }
    }

    pub fn reported(&self) -> &ReportedSet {
        &self.reported
    }

    /// Run one discovery cycle to completion.
    pub async fn run_discovery_cycle(&self) {
        let discovery = match self
            .provider
            .satellites_above(
                &self.settings.observer,
                self.settings.search_radius_deg,
                self.settings.category_id,
            )
            .await
        {
            Ok(discovery) => discovery,
            Err(e) => {
                tracing::error!("Satellite discovery failed: {}", e);
                return;
            }
        };

        log_quota(discovery.quota);
        tracing::info!(
            "Discovery cycle found {} satellites above the horizon",
            discovery.satellites.len()
        );

        for satellite in &discovery.satellites {
            if self.reported.contains(satellite.satid).await {
                continue;
            }
            self.report_new_satellite(satellite).await;
        }
    }

    /// Enrich, notify, audit, and mark one newly discovered satellite.
    async fn report_new_satellite(&self, satellite: &DiscoveredSatellite) {
        let report = match self
            .provider
            .satellite_positions(
                satellite.satid,
                &self.settings.observer,
                self.settings.position_seconds,
            )
            .await
        {
            Ok(report) => report,
            Err(e) => {
                // Not marked seen: eligible again on the next cycle.
                tracing::warn!(
                    "Position lookup for {} ({}) failed, will retry next cycle: {}",
                    satellite.satname,
                    satellite.satid,
                    e
                );
                return;
            }
        };

        log_quota(report.quota);

        let Some(first_sample) = report.positions.first().copied() else {
            tracing::warn!(
                "Provider returned no position samples for {} ({}), will retry next cycle",
                satellite.satname,
                satellite.satid
            );
            return;
        };

        let place = match (first_sample.satlatitude, first_sample.satlongitude) {
            (Some(latitude), Some(longitude)) => {
                self.geocoder.resolve_place(latitude, longitude).await
            }
            _ => None,
        };

        let notification = compose_pass_notification(
            satellite.satid,
            &report.info,
            &report.positions,
            place.as_deref(),
        );

        self.limiter.lock().await.acquire().await;
        match self.sink.send(&notification).await {
            Ok(()) => {
                tracing::info!("Sent notification for {}", report.info.display_name());
            }
            Err(e) => {
                // At-most-once: the pass is considered handled even when
                // delivery failed, so the satellite is still marked seen.
                tracing::error!(
                    "Failed to dispatch notification for {}: {}",
                    report.info.display_name(),
                    e
                );
            }
        }

        self.audit
            .append(&AuditRecord::positions(
                report.info.display_name(),
                report.positions.clone(),
            ))
            .await;

        self.reported.mark_reported(satellite.satid).await;
    }

    /// Dispatch the daily summary. Mutates nothing.
    pub async fn run_daily_rollup(&self) {
        let reported_count = self.reported.len().await;
        let notification = compose_daily_rollup(reported_count);

        match self.sink.send(&notification).await {
            Ok(()) => tracing::info!("Sent daily report ({} satellites tracked)", reported_count),
            Err(e) => tracing::error!("Failed to dispatch daily report: {}", e),
        }
    }
}

fn log_quota(quota: QuotaSignal) {
    if let Some(remaining) = quota {
        tracing::info!("Remaining provider API calls: {}", remaining);
    }
}
