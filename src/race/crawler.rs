//! Race crawler
//!
//! A crawler is bound to one direction and one anchor page. It repeatedly
//! claims a batch from its frontier, asks the link provider for the batch's
//! outbound links, and records every newly learned title in its own discovery
//! cache. The first crawler to learn a title that the opposite side already
//! knows claims the race.
//!
//! Forward crawlers score new edges with the ranking heuristic and push them
//! onto the shared forward frontier. The backward crawler only keeps edges
//! whose child links back to the parent, and records proximity signals in the
//! backward ledger for the forward side to rank with.

use crate::provider::{LinkBatch, LinkProvider, LinkSession};
use crate::race::frontier::Frontier;
use crate::race::rank::rank;
use crate::state::{
    BackwardLedger, CrawlerState, Direction, DiscoveryCache, Edge, RaceRecord, DISTANCE_NEAR,
    DISTANCE_REVERSIBLE,
};
use crate::{ProviderError, ProviderResult};
use std::collections::HashSet;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Static settings for one crawler
#[derive(Debug, Clone)]
pub struct CrawlerConfig {
    /// Name used in logs (`start-0`, `start-1`, ..., `end`)
    pub name: String,

    /// Which side of the race this crawler expands
    pub direction: Direction,

    /// The start page for forward crawlers, the end page for the backward one
    pub anchor: String,

    /// Titles expanded per link lookup
    pub links_batch_size: usize,

    /// Candidates per reversibility lookup
    pub reversible_batch_size: usize,

    /// Attempts per provider call
    pub max_attempts: u32,

    /// Delay between attempts
    pub retry_delay: Duration,
}

/// Handles to the race state a crawler reads and writes
#[derive(Debug, Clone)]
pub struct CrawlerHandles {
    /// Discovery cache of this crawler's direction
    pub own_cache: DiscoveryCache,

    /// Discovery cache of the opposite direction
    pub other_cache: DiscoveryCache,

    /// Backward proximity ledger
    pub ledger: BackwardLedger,

    /// Frontier this crawler pops from and pushes to
    pub frontier: Frontier,

    /// Shared outcome record
    pub record: Arc<RaceRecord>,
}

/// What a crawler did before it closed
#[derive(Debug)]
pub struct CrawlerReport {
    pub name: String,
    pub direction: Direction,

    /// The state reached just before the session was closed
    pub outcome: CrawlerState,

    /// Number of link lookups completed
    pub batches: u64,

    /// The error that stopped the crawler, if any
    pub error: Option<ProviderError>,
}

/// One worker of the race
#[derive(Debug)]
pub struct Crawler {
    config: CrawlerConfig,
    handles: CrawlerHandles,
    state: CrawlerState,
    batches: u64,
}

impl Crawler {
    /// Creates a crawler and seeds its anchor
    ///
    /// The anchor is inserted into the own cache with an empty parent and
    /// queued with score 0, unless a sibling already seeded it.
    pub fn new(config: CrawlerConfig, handles: CrawlerHandles) -> Self {
        if handles.own_cache.insert_if_absent(&config.anchor, "") {
            handles.frontier.push(Edge::root(config.anchor.clone()), 0);
        }

        Self {
            config,
            handles,
            state: CrawlerState::Connecting,
            batches: 0,
        }
    }

    pub fn state(&self) -> CrawlerState {
        self.state
    }

    pub fn name(&self) -> &str {
        &self.config.name
    }

    fn transition(&mut self, next: CrawlerState) {
        if self.state.can_transition_to(next) {
            tracing::trace!("{} -> {}", self.state, next);
            self.state = next;
        } else {
            tracing::warn!("Ignoring invalid transition {} -> {}", self.state, next);
        }
    }

    /// Runs the crawler to completion
    ///
    /// The provider session is closed on every exit path.
    pub async fn run<P: LinkProvider>(mut self, provider: Arc<P>) -> CrawlerReport {
        tracing::info!("Connecting to link provider");

        let mut session = match provider.connect().await {
            Ok(session) => session,
            Err(e) => {
                tracing::error!("Failed to connect: {}", e);
                self.transition(CrawlerState::Failed);
                return self.into_report(Some(e));
            }
        };

        self.transition(CrawlerState::Crawling);
        tracing::info!("Starting with page: {}", self.config.anchor);

        let error = match self.crawl(&mut session).await {
            Ok(outcome) => {
                self.transition(outcome);
                None
            }
            Err(e) => {
                tracing::error!("Crawl failed: {}", e);
                self.transition(CrawlerState::Failed);
                Some(e)
            }
        };

        session.close().await;
        let report = self.into_report(error);
        tracing::info!("Closing crawler ({})", report.outcome);
        report
    }

    fn into_report(mut self, error: Option<ProviderError>) -> CrawlerReport {
        let outcome = self.state;
        self.transition(CrawlerState::Closed);
        CrawlerReport {
            name: self.config.name,
            direction: self.config.direction,
            outcome,
            batches: self.batches,
            error,
        }
    }

    /// The crawl loop
    ///
    /// Returns the outcome state the crawler should move to.
    async fn crawl<S: LinkSession>(&mut self, session: &mut S) -> ProviderResult<CrawlerState> {
        loop {
            let record = Arc::clone(&self.handles.record);
            let ticket = match self
                .handles
                .frontier
                .next_batch(self.config.links_batch_size, || record.should_stop())
                .await
            {
                Some(ticket) => ticket,
                None => {
                    let state = self.stopped_state();
                    if state == CrawlerState::Exhausted
                        && self.config.direction == Direction::Forward
                    {
                        tracing::info!("Forward frontier exhausted");
                        self.handles.record.finish_exhausted();
                    }
                    return Ok(state);
                }
            };

            let titles = ticket.titles();
            tracing::debug!(
                "({}) {}",
                self.handles.own_cache.len(),
                titles.join("|")
            );

            let batch = match self.fetch_links(session, &titles).await {
                Ok(batch) => batch,
                Err(e) => {
                    // Siblings must not see an empty frontier while these are unexpanded
                    self.requeue(ticket.edges());
                    return Err(e);
                }
            };
            self.batches += 1;

            let found = self.process_batch(session, batch).await?;

            // Release the in-flight slot only after this batch's edges are queued
            drop(ticket);

            if found {
                return Ok(CrawlerState::Found);
            }
        }
    }

    /// Puts the edges of a batch that could not be expanded back on the frontier
    fn requeue(&self, edges: &[Edge]) {
        tracing::debug!("Requeueing {} unexpanded titles", edges.len());
        for edge in edges {
            let score = match self.config.direction {
                Direction::Forward => rank(edge, &self.handles.ledger),
                Direction::Backward => 0,
            };
            self.handles.frontier.push(edge.clone(), score);
        }
    }

    /// State to report when the loop ends without this crawler winning
    ///
    /// The backward crawler also reports `Exhausted` when it stops because the
    /// forward side ran out of pages.
    fn stopped_state(&self) -> CrawlerState {
        let record = &self.handles.record;
        if record.is_found() {
            CrawlerState::Yielded
        } else if record.is_cancelled() {
            CrawlerState::TimedOut
        } else {
            CrawlerState::Exhausted
        }
    }

    async fn process_batch<S: LinkSession>(
        &mut self,
        session: &mut S,
        batch: LinkBatch,
    ) -> ProviderResult<bool> {
        for (from, to) in &batch.normalized {
            if !self.handles.own_cache.alias(from, to) {
                continue;
            }
            tracing::debug!("Normalised '{}' to '{}'", from, to);

            if self.handles.other_cache.contains(to) && self.claim(to) {
                return Ok(true);
            }
        }

        if !batch.done {
            tracing::debug!("Link lookup stopped early; batch may be incomplete");
        }

        match self.config.direction {
            Direction::Forward => Ok(self.check_forward(batch.edges)),
            Direction::Backward => self.check_backward(session, batch.edges).await,
        }
    }

    /// Records newly learned forward edges and queues them by rank
    fn check_forward(&mut self, edges: Vec<Edge>) -> bool {
        for edge in edges {
            if self.handles.record.is_found() {
                return false;
            }

            if !self.handles.own_cache.insert_if_absent(&edge.title, &edge.parent) {
                continue;
            }

            if self.handles.other_cache.contains(&edge.title) {
                return self.claim(&edge.title);
            }

            let score = rank(&edge, &self.handles.ledger);
            self.handles.frontier.push(edge, score);
        }

        false
    }

    /// Confirms backward edges in sub-batches and records the reversible ones
    ///
    /// Every edge of a sub-batch enters the ledger before the lookup. Titles
    /// the backward side already knows lead to the end page, so they resolve
    /// as reversible without being looked up again.
    async fn check_backward<S: LinkSession>(
        &mut self,
        session: &mut S,
        edges: Vec<Edge>,
    ) -> ProviderResult<bool> {
        for chunk in edges.chunks(self.config.reversible_batch_size) {
            if self.handles.record.should_stop() {
                return Ok(false);
            }

            for edge in chunk {
                self.handles.ledger.mark_unresolved(&edge.title, &edge.parent);
            }

            let (known, candidates): (Vec<&Edge>, Vec<&Edge>) = chunk
                .iter()
                .partition(|edge| self.handles.own_cache.contains(&edge.title));
            for edge in known {
                self.handles.ledger.resolve(&edge.title, DISTANCE_REVERSIBLE);
            }
            if candidates.is_empty() {
                continue;
            }
            let candidates: Vec<Edge> = candidates.into_iter().cloned().collect();

            let reversible = match self.fetch_reversible(session, &candidates).await {
                Ok(reversible) => reversible,
                Err(e) => {
                    for edge in &candidates {
                        self.handles.ledger.resolve(&edge.title, DISTANCE_NEAR);
                    }
                    return Err(e);
                }
            };

            let confirmed: HashSet<&Edge> = reversible.iter().collect();
            for edge in &candidates {
                let distance = if confirmed.contains(edge) {
                    DISTANCE_REVERSIBLE
                } else {
                    DISTANCE_NEAR
                };
                self.handles.ledger.resolve(&edge.title, distance);
            }

            for edge in &reversible {
                if !self.handles.own_cache.insert_if_absent(&edge.title, &edge.parent) {
                    continue;
                }

                if self.handles.other_cache.contains(&edge.title) {
                    return Ok(self.claim(&edge.title));
                }

                self.handles.frontier.push(edge.clone(), 0);
            }
        }

        Ok(false)
    }

    fn claim(&self, title: &str) -> bool {
        if self.handles.record.claim(title, self.config.direction) {
            tracing::info!("Found meeting point: {}", title);
            true
        } else {
            tracing::debug!("Meeting point {} found after the race was claimed", title);
            false
        }
    }

    async fn fetch_links<S: LinkSession>(
        &self,
        session: &mut S,
        titles: &[String],
    ) -> ProviderResult<LinkBatch> {
        let mut attempt = 0;
        loop {
            attempt += 1;
            let started = Instant::now();
            let result = session.fetch_links(titles).await;
            self.handles
                .record
                .add_network_time(self.config.direction, started.elapsed());

            match result {
                Ok(batch) => return Ok(batch),
                Err(e) => self.retry_or_fail(attempt, "link lookup", e).await?,
            }
        }
    }

    async fn fetch_reversible<S: LinkSession>(
        &self,
        session: &mut S,
        candidates: &[Edge],
    ) -> ProviderResult<Vec<Edge>> {
        let mut attempt = 0;
        loop {
            attempt += 1;
            let started = Instant::now();
            let result = session.fetch_reversible(candidates).await;
            self.handles
                .record
                .add_network_time(self.config.direction, started.elapsed());

            match result {
                Ok(reversible) => return Ok(reversible),
                Err(e) => self.retry_or_fail(attempt, "reversibility check", e).await?,
            }
        }
    }

    /// Sleeps before another attempt, or returns the error once attempts run out
    async fn retry_or_fail(
        &self,
        attempt: u32,
        what: &str,
        error: ProviderError,
    ) -> ProviderResult<()> {
        if attempt >= self.config.max_attempts || self.handles.record.should_stop() {
            return Err(ProviderError::Exhausted {
                attempts: attempt,
                last: Box::new(error),
            });
        }

        tracing::warn!(
            "{} failed (attempt {}/{}): {}",
            what,
            attempt,
            self.config.max_attempts,
            error
        );
        tokio::time::sleep(self.config.retry_delay).await;
        Ok(())
    }
}
