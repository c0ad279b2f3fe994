//! Link provider abstraction
//!
//! The race engine only needs two lookups from the remote link graph:
//! - the complete set of outbound links for a batch of titles
//! - which (child, parent) candidates are reversible, i.e. the child links back
//!
//! `WikipediaProvider` implements both against the MediaWiki query API.
//! Tests substitute an in-memory graph.

mod wikipedia;

pub use wikipedia::{build_http_client, WikipediaProvider, WikipediaSession};

use crate::state::Edge;
use crate::ProviderResult;
use async_trait::async_trait;

/// Everything learned from one logical link lookup
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LinkBatch {
    /// Every outbound link of the requested titles, in response order
    pub edges: Vec<Edge>,

    /// `(requested, canonical)` pairs for titles the provider normalised
    pub normalized: Vec<(String, String)>,

    /// False when pagination was cut short and `edges` may be incomplete
    pub done: bool,
}

/// Factory for per-crawler provider sessions
#[async_trait]
pub trait LinkProvider: Send + Sync + 'static {
    type Session: LinkSession;

    /// Opens a session; each crawler holds exactly one
    async fn connect(&self) -> ProviderResult<Self::Session>;
}

/// A connection to the link provider owned by one crawler
#[async_trait]
pub trait LinkSession: Send + 'static {
    /// Fetches all outbound links for `titles`, following pagination to the end
    async fn fetch_links(&mut self, titles: &[String]) -> ProviderResult<LinkBatch>;

    /// Returns the subset of `candidates` whose title links back to its parent
    async fn fetch_reversible(&mut self, candidates: &[Edge]) -> ProviderResult<Vec<Edge>>;

    /// Releases the session
    async fn close(&mut self) {}
}
