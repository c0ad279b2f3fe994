//! Bidirectional race engine
//!
//! This module contains the core search logic, including:
//! - The ranking heuristic for forward edges
//! - The shared priority frontier
//! - The crawler state machine for both directions
//! - Race coordination, deadline handling and outcome reporting
//! - Path reconstruction from the two discovery caches

mod coordinator;
mod crawler;
mod frontier;
mod path;
mod rank;

pub use coordinator::{run_race, Coordinator, RaceOutcome, RaceParams, RaceReport};
pub use crawler::{Crawler, CrawlerConfig, CrawlerHandles, CrawlerReport};
pub use frontier::{BatchPoll, BatchTicket, Frontier, QueuedEdge};
pub use path::{reconstruct_path, walk_to_anchor};
pub use rank::{is_hub, rank, HUB_PAGES};
