//! Ranking heuristic for frontier edges
//!
//! Lower scores are expanded first. Every rule that applies is added
//! independently:
//!
//! | Condition                               | Score          |
//! |-----------------------------------------|----------------|
//! | title is a hub page                     | -10            |
//! | parent is a hub page                    | -1             |
//! | parent resolved in the backward ledger  | -(5 / d)       |
//! | title resolved in the backward ledger   | -(10 / d)      |
//!
//! `d` is the ledger distance (1 or 2) and the division truncates.

use crate::state::{BackwardLedger, Edge};

/// Countries and broadly-linked pages, lowercase
pub const HUB_PAGES: &[&str] = &[
    // Countries
    "united states of america",
    "united kingdom",
    "great britain",
    "united states",
    "canada",
    "germany",
    "africa",
    "japan",
    "china",
    "russia",
    // Highly connected
    "adolf hitler",
    "2007",
    "2006",
    "2004",
    "2005",
    "1967",
    "1990s",
    "billy jean king",
    "deaths in 2004",
    "star alliance destinations",
    "list of accidents and incidents on commercial aircraft",
    "list of town tramway systems in north america",
];

const HUB_TITLE_BONUS: i32 = 10;
const HUB_PARENT_BONUS: i32 = 1;
const LEDGER_PARENT_BONUS: i32 = 5;
const LEDGER_TITLE_BONUS: i32 = 10;

/// Returns true if the title (compared case-insensitively) is a hub page
pub fn is_hub(title: &str) -> bool {
    let lower = title.to_lowercase();
    HUB_PAGES.contains(&lower.as_str())
}

/// Scores an edge; lower is higher priority
pub fn rank(edge: &Edge, ledger: &BackwardLedger) -> i32 {
    let mut score = 0;

    if is_hub(&edge.title) {
        score -= HUB_TITLE_BONUS;
    }

    if is_hub(&edge.parent) {
        score -= HUB_PARENT_BONUS;
    }

    if let Some(distance) = ledger.distance(&edge.parent) {
        score -= LEDGER_PARENT_BONUS / i32::from(distance.max(1));
    }

    if let Some(distance) = ledger.distance(&edge.title) {
        score -= LEDGER_TITLE_BONUS / i32::from(distance.max(1));
    }

    score
}
