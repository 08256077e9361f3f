use passwatch::config;
use passwatch::module::audit::AuditLog;
use passwatch::module::geocode::GeocodeClient;
use passwatch::module::n2yo::N2yoClient;
use passwatch::module::notify::{NotifySink, RateLimiter, WebhookSink};
use passwatch::module::pipeline::{PassPipeline, PipelineSettings};
use passwatch::module::reported::ReportedSet;
use passwatch::module::scheduled::{ScheduledTaskConfig, ScheduledTaskManager};

use anyhow::{Context, Result};
use std::sync::Arc;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration
    config::read_config()?;
    let config = config::CONFIG.get().unwrap();

    // Initialize logging
    let _logging_guard = passwatch::logging::init_logging("logs", "passwatch", &config.log_level);

    tracing::info!("Passwatch starting...");
    tracing::info!(
        "Observer location: {}, {} ({} m)",
        config.observer.latitude,
        config.observer.longitude,
        config.observer.altitude_m
    );

    // Build clients
    let provider = N2yoClient::new(&config.n2yo.base_url, &config.n2yo.api_key)?;
    let geocoder = GeocodeClient::new(&config.geocode.base_url, &config.geocode.api_key)?;
    let sink = WebhookSink::new(&config.sink.webhook_url)?;

    // The sink must report itself ready before any job is armed; a sink
    // that cannot be reached at startup halts the process.
    sink.verify()
        .await
        .context("Notification sink failed startup verification")?;

    let settings = PipelineSettings {
        observer: config.observer_location(),
        search_radius_deg: config.n2yo.search_radius_deg,
        category_id: config.n2yo.category_id,
        position_seconds: config.n2yo.position_seconds,
    };

    let pipeline = Arc::new(PassPipeline::new(
        provider,
        geocoder,
        sink,
        AuditLog::new(&config.audit.path),
        ReportedSet::new(),
        RateLimiter::per_minute(config.sink.messages_per_minute),
        settings,
    ));

    // Configure and start scheduled jobs
    let task_config = ScheduledTaskConfig {
        discovery_interval_minutes: config.schedule.discovery_interval_minutes,
        rollup_hour_utc: config.schedule.rollup_hour_utc,
        initial_discovery: config.schedule.initial_discovery,
    };

    let mut task_manager = ScheduledTaskManager::new(task_config, pipeline);
    task_manager.start_all().await?;
    tracing::info!("All scheduled jobs started successfully");

    tokio::signal::ctrl_c().await?;
    tracing::info!("Shutdown signal received.");
    task_manager.shutdown().await;

    Ok(())
}
