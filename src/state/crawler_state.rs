/// Crawler lifecycle definitions
///
/// A crawler connects, crawls until it finds a meeting point, runs out of
/// work, is cancelled or fails, and is always closed afterwards.
use std::fmt;

/// Represents the current state of a crawler
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CrawlerState {
    // ===== Active States =====
    /// Opening a session with the link provider
    Connecting,

    /// Pulling batches from the frontier and expanding them
    Crawling,

    // ===== Outcome States =====
    /// This crawler claimed the meeting point
    Found,

    /// The frontier ran dry with no meeting point
    Exhausted,

    /// Another crawler claimed the race first
    Yielded,

    /// The race was cancelled by the coordinator's deadline
    TimedOut,

    /// A provider call failed after all retry attempts
    Failed,

    // ===== Final State =====
    /// The provider session has been released
    Closed,
}

impl CrawlerState {
    /// Returns true if the crawler is still doing work
    pub fn is_active(&self) -> bool {
        matches!(self, Self::Connecting | Self::Crawling)
    }

    /// Returns true if the crawler has reached an outcome or been closed
    pub fn is_terminal(&self) -> bool {
        !self.is_active()
    }

    /// Returns true if moving from `self` to `next` is a legal transition
    pub fn can_transition_to(&self, next: CrawlerState) -> bool {
        use CrawlerState::*;
        match (self, next) {
            (Connecting, Crawling) => true,
            (Connecting, Failed | TimedOut) => true,
            (Crawling, Found | Exhausted | Yielded | TimedOut | Failed) => true,
            (Found | Exhausted | Yielded | TimedOut | Failed, Closed) => true,
            _ => false,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Connecting => "connecting",
            Self::Crawling => "crawling",
            Self::Found => "found",
            Self::Exhausted => "exhausted",
            Self::Yielded => "yielded",
            Self::TimedOut => "timed_out",
            Self::Failed => "failed",
            Self::Closed => "closed",
        }
    }
}

impl fmt::Display for CrawlerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
