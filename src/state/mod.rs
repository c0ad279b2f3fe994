//! Shared race state
//!
//! This module provides the data structures shared between crawlers during a race.
//!
//! # Components
//!
//! - `Edge`: A directed link from a parent page to a child title
//! - `DiscoveryCache`: Per-direction map from a seen title to the parent that revealed it
//! - `BackwardLedger`: Backward-side proximity signals consulted by the ranking heuristic
//! - `CrawlerState`: Lifecycle of a single crawler
//! - `RaceRecord`: Write-once success claim, cancellation flag and network timers

mod crawler_state;
mod discovery;
mod edge;
mod ledger;
mod record;

// Re-export main types
pub use crawler_state::CrawlerState;
pub use discovery::DiscoveryCache;
pub use edge::Edge;
pub use ledger::{BackwardLedger, LedgerEntry, DISTANCE_NEAR, DISTANCE_REVERSIBLE};
pub use record::{Direction, RaceRecord};
