//! Priority frontier of edges waiting to be expanded
//!
//! This module handles:
//! - Ordering edges by heuristic score (lower scores are expanded first)
//! - Deterministic tie-breaking on title, then parent
//! - Atomic batch pops shared between several crawlers
//! - Tracking batches still being expanded, so an empty heap only means
//!   "exhausted" once nobody can push more work into it

use crate::state::Edge;
use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::sync::Notify;

/// Upper bound on how long a waiting crawler sleeps before re-checking for cancellation
const WAIT_POLL: Duration = Duration::from_millis(50);

/// An edge queued for expansion with its score
#[derive(Debug, Clone)]
pub struct QueuedEdge {
    /// Priority score (lower is expanded first)
    pub score: i32,

    /// The edge to expand
    pub edge: Edge,
}

// Lower scores have higher priority (are popped first from BinaryHeap)
impl Ord for QueuedEdge {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .score
            .cmp(&self.score)
            .then_with(|| other.edge.cmp(&self.edge))
    }
}

impl PartialOrd for QueuedEdge {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for QueuedEdge {
    fn eq(&self, other: &Self) -> bool {
        self.score == other.score && self.edge == other.edge
    }
}

impl Eq for QueuedEdge {}

#[derive(Debug, Default)]
struct FrontierState {
    heap: BinaryHeap<QueuedEdge>,
    in_flight: usize,
}

/// Result of a non-blocking pop
#[derive(Debug)]
pub enum BatchPoll {
    /// A batch was claimed
    Ready(BatchTicket),

    /// Nothing queued, but other crawlers are still expanding batches
    Waiting,

    /// Nothing queued and nothing in flight
    Exhausted,
}

/// Shared frontier handle
///
/// Clones share the same queue. The forward side hands one frontier to all of
/// its crawlers; the backward crawler owns a private one.
#[derive(Debug, Clone, Default)]
pub struct Frontier {
    state: Arc<Mutex<FrontierState>>,
    notify: Arc<Notify>,
}

impl Frontier {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, FrontierState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Adds an edge with the given score
    pub fn push(&self, edge: Edge, score: i32) {
        self.lock().heap.push(QueuedEdge { score, edge });
        self.notify.notify_waiters();
    }

    /// Claims up to `max` of the best-scored edges in one step
    pub fn try_pop_batch(&self, max: usize) -> BatchPoll {
        let mut state = self.lock();

        if state.heap.is_empty() {
            return if state.in_flight > 0 {
                BatchPoll::Waiting
            } else {
                BatchPoll::Exhausted
            };
        }

        let mut edges = Vec::with_capacity(max.min(state.heap.len()));
        while edges.len() < max {
            match state.heap.pop() {
                Some(queued) => edges.push(queued.edge),
                None => break,
            }
        }
        state.in_flight += 1;

        BatchPoll::Ready(BatchTicket {
            frontier: self.clone(),
            edges,
        })
    }

    /// Waits for the next batch
    ///
    /// Returns `None` once the frontier is exhausted or `should_stop` reports
    /// true. While siblings still hold batches, this waits for them to push
    /// new edges or finish.
    pub async fn next_batch<F>(&self, max: usize, should_stop: F) -> Option<BatchTicket>
    where
        F: Fn() -> bool,
    {
        loop {
            if should_stop() {
                return None;
            }

            let notified = self.notify.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();

            match self.try_pop_batch(max) {
                BatchPoll::Ready(ticket) => return Some(ticket),
                BatchPoll::Exhausted => return None,
                BatchPoll::Waiting => {
                    let _ = tokio::time::timeout(WAIT_POLL, notified).await;
                }
            }
        }
    }

    fn release(&self) {
        {
            let mut state = self.lock();
            state.in_flight = state.in_flight.saturating_sub(1);
        }
        self.notify.notify_waiters();
    }

    /// Number of queued edges
    pub fn len(&self) -> usize {
        self.lock().heap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().heap.is_empty()
    }

    /// Number of claimed batches not yet released
    pub fn in_flight(&self) -> usize {
        self.lock().in_flight
    }

    /// Returns true if nothing is queued and nothing is being expanded
    pub fn is_exhausted(&self) -> bool {
        let state = self.lock();
        state.heap.is_empty() && state.in_flight == 0
    }
}

/// A claimed batch of edges
///
/// The batch counts as in flight until the ticket is dropped, so crawlers
/// drop it only after pushing everything the batch produced.
#[derive(Debug)]
pub struct BatchTicket {
    frontier: Frontier,
    edges: Vec<Edge>,
}

impl BatchTicket {
    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    /// Titles of the claimed edges, in pop order
    pub fn titles(&self) -> Vec<String> {
        self.edges.iter().map(|edge| edge.title.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }
}

impl Drop for BatchTicket {
    fn drop(&mut self) {
        self.frontier.release();
    }
}
