//! MediaWiki link provider
//!
//! This module talks to a MediaWiki `api.php` endpoint, including:
//! - Building HTTP clients with the configured User-Agent and `From` headers
//! - Batched `prop=links` lookups restricted to one namespace
//! - Following `continue` tokens until a lookup is complete
//! - Reporting title normalisation
//! - Reversibility checks through the `pltitles` filter

use crate::config::{ApiConfig, Config, UserAgentConfig};
use crate::provider::{LinkBatch, LinkProvider, LinkSession};
use crate::state::Edge;
use crate::{ConfigError, ProviderError, ProviderResult};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, FROM};
use reqwest::Client;
use serde::Deserialize;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::time::Duration;
use url::Url;

/// Builds an HTTP client with proper identification headers
///
/// # Arguments
///
/// * `user_agent` - The user agent configuration
/// * `request_timeout` - Timeout applied to every request
///
/// # Example
///
/// ```no_run
/// use std::time::Duration;
/// use wikirace::config::UserAgentConfig;
/// use wikirace::provider::build_http_client;
///
/// let client = build_http_client(&UserAgentConfig::default(), Duration::from_secs(30)).unwrap();
/// ```
pub fn build_http_client(
    user_agent: &UserAgentConfig,
    request_timeout: Duration,
) -> Result<Client, ProviderError> {
    let mut headers = HeaderMap::new();
    if let Ok(from) = HeaderValue::from_str(&user_agent.contact_email) {
        headers.insert(FROM, from);
    }

    Client::builder()
        .user_agent(user_agent.header_value())
        .default_headers(headers)
        .timeout(request_timeout)
        .connect_timeout(Duration::from_secs(10))
        .gzip(true)
        .brotli(true)
        .build()
        .map_err(|source| ProviderError::Http {
            context: "building HTTP client".to_string(),
            source,
        })
}

/// Link provider backed by a MediaWiki API endpoint
#[derive(Debug, Clone)]
pub struct WikipediaProvider {
    client: Client,
    endpoint: Url,
    namespace: i32,
    max_continuations: u32,
}

impl WikipediaProvider {
    /// Creates a provider from the loaded configuration
    pub fn from_config(config: &Config) -> Result<Self, crate::WikiraceError> {
        let endpoint = Url::parse(&config.api.endpoint)
            .map_err(|e| ConfigError::InvalidUrl(format!("Invalid endpoint: {}", e)))?;
        let client = build_http_client(
            &config.user_agent,
            Duration::from_secs(config.api.request_timeout_secs),
        )?;
        Ok(Self::new(client, endpoint, &config.api))
    }

    pub fn new(client: Client, endpoint: Url, api: &ApiConfig) -> Self {
        Self {
            client,
            endpoint,
            namespace: api.namespace,
            max_continuations: api.max_continuations,
        }
    }
}

#[async_trait]
impl LinkProvider for WikipediaProvider {
    type Session = WikipediaSession;

    async fn connect(&self) -> ProviderResult<WikipediaSession> {
        tracing::info!("Connecting to {}", self.endpoint.host_str().unwrap_or("link API"));
        Ok(WikipediaSession {
            client: self.client.clone(),
            endpoint: self.endpoint.clone(),
            namespace: self.namespace,
            max_continuations: self.max_continuations,
            requests: 0,
        })
    }
}

/// One crawler's connection to the MediaWiki API
#[derive(Debug)]
pub struct WikipediaSession {
    client: Client,
    endpoint: Url,
    namespace: i32,
    max_continuations: u32,
    requests: u64,
}

#[derive(Debug, Deserialize)]
struct QueryResponse {
    #[serde(rename = "continue")]
    continuation: Option<BTreeMap<String, serde_json::Value>>,
    query: Option<QueryBody>,
    error: Option<ApiError>,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    code: String,
    #[serde(default)]
    info: String,
}

#[derive(Debug, Default, Deserialize)]
struct QueryBody {
    #[serde(default)]
    normalized: Vec<Normalized>,
    #[serde(default)]
    pages: HashMap<String, Page>,
}

#[derive(Debug, Deserialize)]
struct Normalized {
    from: String,
    to: String,
}

#[derive(Debug, Deserialize)]
struct Page {
    title: String,
    #[serde(default)]
    links: Vec<PageLink>,
}

#[derive(Debug, Deserialize)]
struct PageLink {
    title: String,
}

/// Pages and normalisations gathered across every continuation of one query
#[derive(Debug, Default)]
struct QueryPages {
    links: Vec<(String, Vec<String>)>,
    normalized: Vec<(String, String)>,
    done: bool,
}

impl WikipediaSession {
    /// Number of HTTP requests issued by this session
    pub fn request_count(&self) -> u64 {
        self.requests
    }

    fn base_params(&self, titles: &[String]) -> Vec<(String, String)> {
        vec![
            ("action".to_string(), "query".to_string()),
            ("format".to_string(), "json".to_string()),
            ("prop".to_string(), "links".to_string()),
            ("pllimit".to_string(), "max".to_string()),
            ("plnamespace".to_string(), self.namespace.to_string()),
            ("titles".to_string(), titles.join("|")),
        ]
    }

    /// Runs one logical query, following continuation tokens until exhausted
    async fn query(&mut self, params: Vec<(String, String)>) -> ProviderResult<QueryPages> {
        let mut pages = QueryPages::default();
        let mut continuation: Vec<(String, String)> = Vec::new();

        for _ in 0..self.max_continuations {
            let mut request = params.clone();
            request.extend(continuation.iter().cloned());

            let response = self.send(&request).await?;

            if let Some(error) = response.error {
                return Err(ProviderError::Malformed(format!(
                    "API error {}: {}",
                    error.code, error.info
                )));
            }

            if let Some(body) = response.query {
                pages
                    .normalized
                    .extend(body.normalized.into_iter().map(|n| (n.from, n.to)));

                let mut batch: Vec<_> = body.pages.into_iter().collect();
                // Page ids are map keys; sort them so edge order is reproducible
                batch.sort_by(|(a, _), (b, _)| a.cmp(b));
                for (_, page) in batch {
                    let links = page.links.into_iter().map(|link| link.title).collect();
                    pages.links.push((page.title, links));
                }
            }

            match response.continuation {
                Some(tokens) => {
                    continuation = tokens
                        .into_iter()
                        .map(|(key, value)| {
                            let value = match value {
                                serde_json::Value::String(s) => s,
                                other => other.to_string(),
                            };
                            (key, value)
                        })
                        .collect();
                }
                None => {
                    pages.done = true;
                    return Ok(pages);
                }
            }
        }

        tracing::warn!(
            "Stopped following continuations after {} requests",
            self.max_continuations
        );
        Ok(pages)
    }

    async fn send(&mut self, params: &[(String, String)]) -> ProviderResult<QueryResponse> {
        self.requests += 1;

        let response = self
            .client
            .get(self.endpoint.clone())
            .query(params)
            .send()
            .await
            .map_err(|source| ProviderError::Http {
                context: format!("querying {}", self.endpoint),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(ProviderError::Status {
                status: status.as_u16(),
                url: response.url().to_string(),
            });
        }

        let body = response.bytes().await.map_err(|source| ProviderError::Http {
            context: "reading response body".to_string(),
            source,
        })?;

        Ok(serde_json::from_slice(&body)?)
    }
}

#[async_trait]
impl LinkSession for WikipediaSession {
    async fn fetch_links(&mut self, titles: &[String]) -> ProviderResult<LinkBatch> {
        if titles.is_empty() {
            return Ok(LinkBatch {
                done: true,
                ..LinkBatch::default()
            });
        }

        let params = self.base_params(titles);
        let pages = self.query(params).await?;

        let edges = pages
            .links
            .into_iter()
            .flat_map(|(parent, links)| {
                links
                    .into_iter()
                    .map(move |title| Edge::new(title, parent.clone()))
            })
            .collect();

        Ok(LinkBatch {
            edges,
            normalized: pages.normalized,
            done: pages.done,
        })
    }

    async fn fetch_reversible(&mut self, candidates: &[Edge]) -> ProviderResult<Vec<Edge>> {
        if candidates.is_empty() {
            return Ok(Vec::new());
        }

        let mut children: Vec<String> = Vec::new();
        let mut parents: Vec<String> = Vec::new();
        for edge in candidates {
            if !children.contains(&edge.title) {
                children.push(edge.title.clone());
            }
            if !parents.contains(&edge.parent) {
                parents.push(edge.parent.clone());
            }
        }

        tracing::debug!("Checking for reversible: {}", children.join("|"));

        let mut params = self.base_params(&children);
        params.push(("pltitles".to_string(), parents.join("|")));
        let pages = self.query(params).await?;

        let canonical: HashMap<String, String> = pages.normalized.into_iter().collect();
        let mut links_back: HashMap<String, HashSet<String>> = HashMap::new();
        for (title, links) in pages.links {
            links_back.entry(title).or_default().extend(links);
        }

        let reversible = candidates
            .iter()
            .filter(|edge| {
                let child = canonical.get(&edge.title).unwrap_or(&edge.title);
                links_back
                    .get(child)
                    .map_or(false, |links| links.contains(&edge.parent))
            })
            .cloned()
            .collect();

        Ok(reversible)
    }

    async fn close(&mut self) {
        tracing::debug!("Closing session after {} requests", self.requests);
    }
}
