//! Race coordinator - bidirectional search orchestration
//!
//! This module drives a single race:
//! - Allocating the discovery caches, ledger, frontiers and outcome record
//! - Spawning the forward crawlers and the backward crawler
//! - Enforcing the wall-clock deadline and cancelling stragglers
//! - Reconstructing the path from frozen cache snapshots

use crate::config::RaceConfig;
use crate::provider::LinkProvider;
use crate::race::crawler::{Crawler, CrawlerConfig, CrawlerHandles, CrawlerReport};
use crate::race::frontier::Frontier;
use crate::race::path::reconstruct_path;
use crate::state::{BackwardLedger, CrawlerState, Direction, DiscoveryCache, RaceRecord};
use crate::WikiraceError;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::task::JoinHandle;
use tracing::Instrument;

/// Parameters of one race
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RaceParams {
    pub start: String,
    pub end: String,
    pub timeout: Duration,
    /// Forward crawlers; exactly one backward crawler always runs
    pub workers: usize,
}

impl RaceParams {
    /// Builds parameters using the configured timeout and worker count
    pub fn new(start: impl Into<String>, end: impl Into<String>, config: &RaceConfig) -> Self {
        Self {
            start: start.into(),
            end: end.into(),
            timeout: Duration::from_secs(config.timeout),
            workers: config.workers,
        }
    }
}

/// How a race ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RaceOutcome {
    /// A chain of links from start to end
    Found { path: Vec<String> },

    /// The forward side ran out of pages without meeting the backward side
    NoPath,

    /// At least one crawler was still running at the deadline
    TimedOut,

    /// Every forward crawler failed before the race could finish
    Failed { errors: Vec<String> },
}

impl RaceOutcome {
    pub fn is_found(&self) -> bool {
        matches!(self, Self::Found { .. })
    }

    pub fn path(&self) -> Option<&[String]> {
        match self {
            Self::Found { path } => Some(path),
            _ => None,
        }
    }
}

/// Everything known about a finished race
#[derive(Debug)]
pub struct RaceReport {
    pub outcome: RaceOutcome,

    /// Wall-clock time from spawning the crawlers to the outcome
    pub elapsed: Duration,

    /// Provider time accumulated by the forward crawlers
    pub forward_network: Duration,

    /// Provider time accumulated by the backward crawler
    pub backward_network: Duration,

    /// Titles discovered by each side
    pub forward_discovered: usize,
    pub backward_discovered: usize,

    /// Reports from the crawlers that finished before the deadline
    pub crawlers: Vec<CrawlerReport>,
}

impl RaceReport {
    /// Network time as historically reported: the sum over both sides, halved
    ///
    /// This is an approximation kept for existing consumers; use
    /// `forward_network` and `backward_network` for per-side figures.
    pub fn network_time(&self) -> Duration {
        (self.forward_network + self.backward_network) / 2
    }
}

/// Main race coordinator
pub struct Coordinator<P: LinkProvider> {
    provider: Arc<P>,
    config: RaceConfig,
}

impl<P: LinkProvider> Coordinator<P> {
    /// Creates a coordinator around a link provider
    pub fn new(provider: P, config: RaceConfig) -> Self {
        Self {
            provider: Arc::new(provider),
            config,
        }
    }

    pub fn config(&self) -> &RaceConfig {
        &self.config
    }

    fn crawler_config(&self, name: String, direction: Direction, anchor: &str) -> CrawlerConfig {
        CrawlerConfig {
            name,
            direction,
            anchor: anchor.to_string(),
            links_batch_size: self.config.links_batch_size,
            reversible_batch_size: self.config.reversible_batch_size,
            max_attempts: self.config.max_attempts,
            retry_delay: Duration::from_millis(self.config.retry_delay_ms),
        }
    }

    /// Runs one race
    ///
    /// # Returns
    ///
    /// * `Ok(RaceReport)` - The race finished, timed out or found nothing
    /// * `Err(WikiraceError)` - A crawler task panicked, or the meeting point
    ///   could not be turned into a path
    pub async fn race(&self, params: &RaceParams) -> Result<RaceReport, WikiraceError> {
        tracing::info!(
            "Racing from '{}' to '{}' with {} forward workers (timeout {:?})",
            params.start,
            params.end,
            params.workers,
            params.timeout
        );

        let started = Instant::now();

        if params.start == params.end {
            return Ok(RaceReport {
                outcome: RaceOutcome::Found {
                    path: vec![params.start.clone()],
                },
                elapsed: started.elapsed(),
                forward_network: Duration::ZERO,
                backward_network: Duration::ZERO,
                forward_discovered: 1,
                backward_discovered: 1,
                crawlers: Vec::new(),
            });
        }

        let forward_cache = DiscoveryCache::new();
        let backward_cache = DiscoveryCache::new();
        let ledger = BackwardLedger::new();
        let forward_frontier = Frontier::new();
        let record = Arc::new(RaceRecord::new());

        // Build every crawler before spawning any, so both anchors are seeded
        let mut crawlers = Vec::with_capacity(params.workers + 1);
        for i in 0..params.workers.max(1) {
            let handles = CrawlerHandles {
                own_cache: forward_cache.clone(),
                other_cache: backward_cache.clone(),
                ledger: ledger.clone(),
                frontier: forward_frontier.clone(),
                record: Arc::clone(&record),
            };
            let config = self.crawler_config(format!("start-{}", i), Direction::Forward, &params.start);
            crawlers.push(Crawler::new(config, handles));
        }

        let handles = CrawlerHandles {
            own_cache: backward_cache.clone(),
            other_cache: forward_cache.clone(),
            ledger: ledger.clone(),
            frontier: Frontier::new(),
            record: Arc::clone(&record),
        };
        let config = self.crawler_config("end".to_string(), Direction::Backward, &params.end);
        crawlers.push(Crawler::new(config, handles));

        let tasks: Vec<JoinHandle<CrawlerReport>> = crawlers
            .into_iter()
            .map(|crawler| {
                let span = tracing::info_span!("crawler", name = %crawler.name());
                tokio::spawn(crawler.run(Arc::clone(&self.provider)).instrument(span))
            })
            .collect();

        let deadline = tokio::time::Instant::now() + params.timeout;
        let mut reports = Vec::with_capacity(tasks.len());
        let mut timed_out = false;

        for mut task in tasks {
            match tokio::time::timeout_at(deadline, &mut task).await {
                Ok(Ok(report)) => reports.push(report),
                Ok(Err(e)) => {
                    tracing::error!("Crawler task failed: {}", e);
                    record.cancel();
                    return Err(WikiraceError::Join(e));
                }
                Err(_) => timed_out = true,
            }
        }

        let elapsed = started.elapsed();

        if timed_out {
            // Unfinished crawlers observe this at their next check and close
            record.cancel();
        }

        let outcome = if timed_out {
            RaceOutcome::TimedOut
        } else if let Some((meeting, direction)) = record.meeting() {
            tracing::debug!("Meeting point '{}' claimed by the {} side", meeting, direction);
            let path = reconstruct_path(
                &meeting,
                &forward_cache.snapshot(),
                &backward_cache.snapshot(),
            )?;
            RaceOutcome::Found { path }
        } else if record.is_exhausted() {
            RaceOutcome::NoPath
        } else {
            forward_outcome(&reports)
        };

        tracing::info!("Race finished in {:?}: {:?}", elapsed, outcome);

        Ok(RaceReport {
            outcome,
            elapsed,
            forward_network: record.network_time(Direction::Forward),
            backward_network: record.network_time(Direction::Backward),
            forward_discovered: forward_cache.len(),
            backward_discovered: backward_cache.len(),
            crawlers: reports,
        })
    }
}

/// Decides the outcome of a race nobody won
///
/// Exhaustion by any forward crawler is authoritative: the shared frontier was
/// empty with no batch in flight. If no forward crawler got that far, every
/// one of them failed.
fn forward_outcome(reports: &[CrawlerReport]) -> RaceOutcome {
    let forward: Vec<&CrawlerReport> = reports
        .iter()
        .filter(|report| report.direction == Direction::Forward)
        .collect();

    if forward
        .iter()
        .any(|report| report.outcome == CrawlerState::Exhausted)
    {
        return RaceOutcome::NoPath;
    }

    let errors: Vec<String> = reports
        .iter()
        .filter_map(|report| {
            report
                .error
                .as_ref()
                .map(|e| format!("{}: {}", report.name, e))
        })
        .collect();

    if errors.is_empty() {
        RaceOutcome::NoPath
    } else {
        RaceOutcome::Failed { errors }
    }
}

/// Runs a race with a freshly built coordinator
///
/// # Example
///
/// ```no_run
/// use wikirace::config::Config;
/// use wikirace::race::{run_race, RaceParams};
/// use wikirace::provider::WikipediaProvider;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let config = Config::default();
/// let provider = WikipediaProvider::from_config(&config)?;
/// let params = RaceParams::new("Gray wolf", "Canada", &config.race);
/// let report = run_race(provider, config.race.clone(), &params).await?;
/// println!("{:?}", report.outcome);
/// # Ok(())
/// # }
/// ```
pub async fn run_race<P: LinkProvider>(
    provider: P,
    config: RaceConfig,
    params: &RaceParams,
) -> Result<RaceReport, WikiraceError> {
    Coordinator::new(provider, config).race(params).await
}
