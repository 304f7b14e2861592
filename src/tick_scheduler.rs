//! TickScheduler - periodic driver for the guardian loop
//!
//! ## Responsibilities
//!
//! - Invoke `GuardianLoop::tick` at a fixed cadence
//! - Serialise ticks with every other access through the loop's mutex
//! - Log and count failed ticks; the next tick is the retry

use crate::error::Result;
use crate::guardian_loop::{GuardianLoop, TickOutcome};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::{Mutex, RwLock};
use tokio::time::{interval, MissedTickBehavior};

/// Shortest accepted tick interval
const MIN_INTERVAL_MS: u64 = 10;

/// Tick counters
#[derive(Debug, Clone, Default, Serialize)]
pub struct TickStats {
    pub ticks: u64,
    pub failures: u64,
    pub consecutive_failures: u64,
    /// Ticks that took longer than the interval
    pub overruns: u64,
    pub worst_case_ms: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_tick_at: Option<DateTime<Utc>>,
}

/// TickScheduler instance
pub struct TickScheduler {
    guardian: Arc<Mutex<GuardianLoop>>,
    period: Duration,
    running: Arc<RwLock<bool>>,
    /// Bumped by every `start`; a task whose generation is stale exits
    generation: Arc<AtomicU64>,
    stats: Arc<RwLock<TickStats>>,
}

impl TickScheduler {
    pub fn new(guardian: Arc<Mutex<GuardianLoop>>, period: Duration) -> Self {
        Self {
            guardian,
            period: period.max(Duration::from_millis(MIN_INTERVAL_MS)),
            running: Arc::new(RwLock::new(false)),
            generation: Arc::new(AtomicU64::new(0)),
            stats: Arc::new(RwLock::new(TickStats::default())),
        }
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    /// Start the tick task; a second call while running is ignored.
    ///
    /// A task left over from an earlier `stop` exits at its next wakeup
    /// without ticking, so only one task ever drives the loop.
    pub async fn start(&self) {
        let task_generation = {
            let mut running = self.running.write().await;
            if *running {
                tracing::warn!("Tick scheduler already running");
                return;
            }
            *running = true;
            self.generation.fetch_add(1, Ordering::SeqCst) + 1
        };

        tracing::info!(
            period_ms = self.period.as_millis() as u64,
            generation = task_generation,
            "Starting tick scheduler"
        );

        let guardian = self.guardian.clone();
        let stats = self.stats.clone();
        let running = self.running.clone();
        let generation = self.generation.clone();
        let period = self.period;

        tokio::spawn(async move {
            let mut ticker = interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                ticker.tick().await;

                {
                    let is_running = running.read().await;
                    if !*is_running || generation.load(Ordering::SeqCst) != task_generation {
                        break;
                    }
                }

                let _ = Self::run_once(&guardian, &stats, period).await;
            }

            tracing::info!(generation = task_generation, "Tick scheduler task exited");
        });
    }

    /// Stop after the tick in progress
    pub async fn stop(&self) {
        let mut running = self.running.write().await;
        *running = false;
        tracing::info!("Stopping tick scheduler");
    }

    pub async fn is_running(&self) -> bool {
        *self.running.read().await
    }

    pub async fn stats(&self) -> TickStats {
        self.stats.read().await.clone()
    }

    /// Run one tick under the loop mutex and record the result
    pub async fn run_once(
        guardian: &Mutex<GuardianLoop>,
        stats: &RwLock<TickStats>,
        budget: Duration,
    ) -> Result<TickOutcome> {
        let started = Instant::now();
        let result = guardian.lock().await.tick().await;
        let elapsed = started.elapsed();

        let mut stats = stats.write().await;
        stats.ticks += 1;
        stats.last_tick_at = Some(Utc::now());
        stats.worst_case_ms = stats.worst_case_ms.max(elapsed.as_millis() as u64);
        if elapsed > budget {
            stats.overruns += 1;
            tracing::warn!(
                elapsed_ms = elapsed.as_millis() as u64,
                budget_ms = budget.as_millis() as u64,
                "Guardian tick overran its interval"
            );
        }

        match &result {
            Ok(_) => {
                if stats.consecutive_failures > 0 {
                    tracing::info!(
                        failures = stats.consecutive_failures,
                        "Guardian tick recovered"
                    );
                }
                stats.consecutive_failures = 0;
            }
            Err(e) => {
                stats.failures += 1;
                stats.consecutive_failures += 1;
                stats.last_error = Some(e.to_string());
                tracing::error!(
                    error = %e,
                    consecutive_failures = stats.consecutive_failures,
                    "Guardian tick failed"
                );
            }
        }

        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::guardian_loop::tests::{guardian, Rig};

    #[tokio::test]
    async fn test_run_once_records_failures_and_recovery() {
        let rig = Rig::new(200);
        let mut inner = guardian(&rig).await;
        inner.toggle().await.unwrap();
        let guardian = Mutex::new(inner);
        let stats = RwLock::new(TickStats::default());
        let budget = Duration::from_secs(5);

        rig.detector.fail.store(true, Ordering::SeqCst);
        assert!(TickScheduler::run_once(&guardian, &stats, budget).await.is_err());
        assert!(TickScheduler::run_once(&guardian, &stats, budget).await.is_err());
        {
            let s = stats.read().await;
            assert_eq!(s.ticks, 2);
            assert_eq!(s.failures, 2);
            assert_eq!(s.consecutive_failures, 2);
            assert!(s.last_error.as_deref().unwrap_or("").contains("detector"));
        }

        rig.detector.fail.store(false, Ordering::SeqCst);
        assert!(TickScheduler::run_once(&guardian, &stats, budget).await.is_ok());
        let s = stats.read().await;
        assert_eq!(s.ticks, 3);
        assert_eq!(s.failures, 2);
        assert_eq!(s.consecutive_failures, 0);
        assert!(s.last_tick_at.is_some());
    }

    #[tokio::test]
    async fn test_start_ticks_until_stopped() {
        let rig = Rig::new(200);
        let mut inner = guardian(&rig).await;
        inner.toggle().await.unwrap();
        let scheduler = TickScheduler::new(Arc::new(Mutex::new(inner)), Duration::from_millis(10));

        scheduler.start().await;
        scheduler.start().await;
        assert!(scheduler.is_running().await);
        tokio::time::sleep(Duration::from_millis(150)).await;
        scheduler.stop().await;
        tokio::time::sleep(Duration::from_millis(50)).await;

        let ticked = scheduler.stats().await.ticks;
        assert!(ticked >= 2, "ticks = {}", ticked);
        assert!(rig.detector.calls.load(Ordering::SeqCst) >= 2);

        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(scheduler.stats().await.ticks, ticked);
    }

    #[tokio::test]
    async fn test_restart_within_one_period_keeps_single_task() {
        let rig = Rig::new(200);
        let mut inner = guardian(&rig).await;
        inner.toggle().await.unwrap();
        let scheduler = TickScheduler::new(Arc::new(Mutex::new(inner)), Duration::from_millis(100));

        scheduler.start().await;
        tokio::time::sleep(Duration::from_millis(20)).await;
        scheduler.stop().await;
        scheduler.start().await;
        assert!(scheduler.is_running().await);

        tokio::time::sleep(Duration::from_millis(1000)).await;
        scheduler.stop().await;

        // one immediate tick from each start, then ten at 100ms; two live
        // tasks would put this near 21
        let ticked = scheduler.stats().await.ticks;
        assert!((8..=15).contains(&ticked), "ticks = {}", ticked);
    }
}
