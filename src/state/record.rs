use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

/// Which end of the race a crawler expands from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    /// Expands outbound links from the start page
    Forward,
    /// Expands from the end page, keeping only links that point back
    Backward,
}

impl Direction {
    pub fn opposite(&self) -> Self {
        match self {
            Self::Forward => Self::Backward,
            Self::Backward => Self::Forward,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Forward => "forward",
            Self::Backward => "backward",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Shared outcome record for one race
///
/// `found` flips exactly once through a compare-and-swap, so only one crawler
/// gets to record the meeting title. `exhausted` is raised by the first
/// forward crawler that finds the shared frontier empty with nothing in
/// flight. Network time is accumulated per direction by every crawler on
/// every provider call.
#[derive(Debug, Default)]
pub struct RaceRecord {
    found: AtomicBool,
    cancelled: AtomicBool,
    exhausted: AtomicBool,
    meeting: Mutex<Option<(String, Direction)>>,
    forward_nanos: AtomicU64,
    backward_nanos: AtomicU64,
}

impl RaceRecord {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attempts to claim the race for a meeting title
    ///
    /// # Returns
    ///
    /// * `true` - This caller won; the meeting title is recorded
    /// * `false` - Another crawler already claimed the race
    pub fn claim(&self, title: &str, direction: Direction) -> bool {
        if self
            .found
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return false;
        }
        let mut meeting = self.meeting.lock().unwrap_or_else(PoisonError::into_inner);
        *meeting = Some((title.to_string(), direction));
        true
    }

    pub fn is_found(&self) -> bool {
        self.found.load(Ordering::Acquire)
    }

    /// Asks every crawler to stop at its next check
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }

    /// Records that the forward side ran out of pages
    pub fn finish_exhausted(&self) {
        self.exhausted.store(true, Ordering::Release);
    }

    pub fn is_exhausted(&self) -> bool {
        self.exhausted.load(Ordering::Acquire)
    }

    /// Returns true once the race is won, cancelled or exhausted
    pub fn should_stop(&self) -> bool {
        self.is_found() || self.is_cancelled() || self.is_exhausted()
    }

    /// The claimed meeting title and the direction that discovered it
    pub fn meeting(&self) -> Option<(String, Direction)> {
        self.meeting
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Adds time spent waiting on the provider
    pub fn add_network_time(&self, direction: Direction, elapsed: Duration) {
        let nanos = u64::try_from(elapsed.as_nanos()).unwrap_or(u64::MAX);
        let counter = match direction {
            Direction::Forward => &self.forward_nanos,
            Direction::Backward => &self.backward_nanos,
        };
        counter.fetch_add(nanos, Ordering::Relaxed);
    }

    pub fn network_time(&self, direction: Direction) -> Duration {
        let counter = match direction {
            Direction::Forward => &self.forward_nanos,
            Direction::Backward => &self.backward_nanos,
        };
        Duration::from_nanos(counter.load(Ordering::Relaxed))
    }

    /// Sum of both directions' network time
    pub fn total_network_time(&self) -> Duration {
        self.network_time(Direction::Forward) + self.network_time(Direction::Backward)
    }
}
