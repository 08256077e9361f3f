///! Scheduled task manager - Centralize all periodic jobs
///!
///! Two independent timer-driven jobs share the pipeline:
///! - Discovery cycle (short period): runs the enrichment pipeline
///! - Daily rollup (long period): dispatches one summary at a fixed UTC hour
///!
///! Each job re-arms only after its previous run completes, so a job never
///! overlaps itself. Jobs are armed only after the notification sink has
///! verified itself (the caller gates `start_all` on that).

use crate::module::geocode::PlaceResolver;
use crate::module::n2yo::SatelliteProvider;
use crate::module::notify::NotifySink;
use crate::module::pipeline::PassPipeline;
use chrono::{DateTime, Duration as ChronoDuration, Timelike, Utc};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;

/// Configuration for scheduled jobs
#[derive(Debug, Clone)]
pub struct ScheduledTaskConfig {
    /// Interval between discovery cycles (in minutes)
    pub discovery_interval_minutes: u64,

    /// UTC hour at which the daily rollup fires (minute zero)
    pub rollup_hour_utc: u32,

    /// Run a discovery cycle immediately on startup
    pub initial_discovery: bool,
}

impl Default for ScheduledTaskConfig {
    fn default() -> Self {
        Self {
            discovery_interval_minutes: 10,
            rollup_hour_utc: 0,
            initial_discovery: true,
        }
    }
}

/// Scheduled task manager
pub struct ScheduledTaskManager<P, G, S> {
    config: ScheduledTaskConfig,
    pipeline: Arc<PassPipeline<P, G, S>>,
    task_handles: Vec<JoinHandle<()>>,
}

impl<P, G, S> ScheduledTaskManager<P, G, S>
where
    P: SatelliteProvider + 'static,
    G: PlaceResolver + 'static,
    S: NotifySink + 'static,
{
    pub fn new(config: ScheduledTaskConfig, pipeline: Arc<PassPipeline<P, G, S>>) -> Self {
        Self {
            config,
            pipeline,
            task_handles: Vec::new(),
        }
    }

    /// Start both scheduled jobs. Call only once the sink is ready.
    pub async fn start_all(&mut self) -> anyhow::Result<()> {
        tracing::info!("Starting scheduled task manager...");

        let discovery_handle = self.start_discovery_task();
        self.task_handles.push(discovery_handle);

        let rollup_handle = self.start_rollup_task();
        self.task_handles.push(rollup_handle);

        tracing::info!(
            "Started {} scheduled jobs (discovery every {} min, rollup daily at {:02}:00 UTC)",
            self.task_handles.len(),
            self.config.discovery_interval_minutes,
            self.config.rollup_hour_utc
        );

        Ok(())
    }

    fn start_discovery_task(&self) -> JoinHandle<()> {
        let pipeline = self.pipeline.clone();
        let interval_minutes = self.config.discovery_interval_minutes;
        let initial = self.config.initial_discovery;

        tracing::info!(
            "Scheduling discovery cycle (interval: {} minutes, initial: {})",
            interval_minutes,
            initial
        );

        tokio::spawn(async move {
            if initial {
                tracing::info!("Performing initial discovery cycle...");
                pipeline.run_discovery_cycle().await;
            }

            Self::discovery_loop(pipeline, interval_minutes).await;
        })
    }

    /// Discovery loop - runs to completion before re-arming, never overlaps
    async fn discovery_loop(pipeline: Arc<PassPipeline<P, G, S>>, interval_minutes: u64) {
        loop {
            let now = Utc::now();
            let next_trigger = calculate_next_discovery_time(now, interval_minutes);
            let sleep_duration = (next_trigger - now)
                .to_std()
                .unwrap_or(Duration::from_secs(60));

            tracing::info!(
                "Next discovery cycle at: {} (in {:.1} min)",
                next_trigger.format("%Y-%m-%d %H:%M:%S UTC"),
                sleep_duration.as_secs_f64() / 60.0
            );

            tokio::time::sleep(sleep_duration).await;

            pipeline.run_discovery_cycle().await;
        }
    }

    fn start_rollup_task(&self) -> JoinHandle<()> {
        let pipeline = self.pipeline.clone();
        let rollup_hour = self.config.rollup_hour_utc;

        tracing::info!("Scheduling daily rollup (daily at {:02}:00 UTC)", rollup_hour);

        tokio::spawn(async move {
            Self::rollup_loop(pipeline, rollup_hour).await;
        })
    }

    /// Rollup loop - one summary per day at the configured hour
    async fn rollup_loop(pipeline: Arc<PassPipeline<P, G, S>>, rollup_hour: u32) {
        loop {
            let now = Utc::now();
            let next_trigger = calculate_next_rollup_time(now, rollup_hour);
            let sleep_duration = (next_trigger - now)
                .to_std()
                .unwrap_or(Duration::from_secs(3600));

            tracing::info!(
                "Next daily rollup at: {} (in {:.1} hours)",
                next_trigger.format("%Y-%m-%d %H:%M:%S UTC"),
                sleep_duration.as_secs_f64() / 3600.0
            );

            tokio::time::sleep(sleep_duration).await;

            pipeline.run_daily_rollup().await;
        }
    }

    /// Gracefully shutdown all jobs
    pub async fn shutdown(self) {
        tracing::info!("Shutting down scheduled task manager...");

        for handle in self.task_handles {
            handle.abort();
        }

        tracing::info!("All scheduled jobs stopped");
    }
}

/// Next discovery trigger: a plain interval from now. The loop re-arms only
/// after the previous cycle finished, which keeps cycles from overlapping
/// however long one takes.
fn calculate_next_discovery_time(now: DateTime<Utc>, interval_minutes: u64) -> DateTime<Utc> {
    now + ChronoDuration::minutes(interval_minutes.max(1) as i64)
}

/// Next rollup trigger: today at the target hour (minute zero) if that is
/// still ahead, otherwise tomorrow at the target hour.
fn calculate_next_rollup_time(now: DateTime<Utc>, target_hour: u32) -> DateTime<Utc> {
    let target_hour = target_hour.min(23);

    let today_target = now
        .with_hour(target_hour)
        .unwrap()
        .with_minute(0)
        .unwrap()
        .with_second(0)
        .unwrap()
        .with_nanosecond(0)
        .unwrap();

    if today_target > now {
        today_target
    } else {
        today_target + ChronoDuration::days(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_calculate_next_discovery_time() {
        let now = Utc.with_ymd_and_hms(2026, 3, 1, 10, 0, 0).unwrap();
        let next = calculate_next_discovery_time(now, 10);
        assert_eq!(next, Utc.with_ymd_and_hms(2026, 3, 1, 10, 10, 0).unwrap());

        // A zero interval still moves forward
        let next = calculate_next_discovery_time(now, 0);
        assert!(next > now);
    }

    #[test]
    fn test_calculate_next_rollup_time_before_target_hour() {
        // At 01:30, a 03:00 rollup fires today; a midnight rollup tomorrow
        let now = Utc.with_ymd_and_hms(2026, 3, 1, 1, 30, 0).unwrap();

        let next = calculate_next_rollup_time(now, 3);
        assert_eq!(next, Utc.with_ymd_and_hms(2026, 3, 1, 3, 0, 0).unwrap());

        let next = calculate_next_rollup_time(now, 0);
        assert_eq!(next, Utc.with_ymd_and_hms(2026, 3, 2, 0, 0, 0).unwrap());
    }

    #[test]
    fn test_calculate_next_rollup_time_after_target_hour() {
        let now = Utc.with_ymd_and_hms(2026, 3, 1, 5, 0, 0).unwrap();
        let next = calculate_next_rollup_time(now, 3);
        assert_eq!(next, Utc.with_ymd_and_hms(2026, 3, 2, 3, 0, 0).unwrap());
    }

    #[test]
    fn test_calculate_next_rollup_time_exactly_at_target() {
        // Firing exactly at the target schedules the following day
        let now = Utc.with_ymd_and_hms(2026, 3, 1, 3, 0, 0).unwrap();
        let next = calculate_next_rollup_time(now, 3);
        assert_eq!(next, Utc.with_ymd_and_hms(2026, 3, 2, 3, 0, 0).unwrap());
    }

    #[test]
    fn test_rollup_hour_is_clamped() {
        let now = Utc.with_ymd_and_hms(2026, 3, 1, 5, 0, 0).unwrap();
        let next = calculate_next_rollup_time(now, 99);
        assert_eq!(next.hour(), 23);
    }
}
