use serde::Deserialize;

/// Main configuration structure for Wikirace
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub race: RaceConfig,
    #[serde(rename = "user-agent")]
    pub user_agent: UserAgentConfig,
    pub api: ApiConfig,
}

/// Race behavior configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RaceConfig {
    /// Wall-clock bound for a whole race, in seconds
    pub timeout: u64,

    /// Number of forward crawlers (one backward crawler always runs)
    pub workers: usize,

    /// Titles expanded per link lookup
    #[serde(rename = "links-batch-size")]
    pub links_batch_size: usize,

    /// Candidate edges checked per reversibility lookup
    #[serde(rename = "reversible-batch-size")]
    pub reversible_batch_size: usize,

    /// Attempts per provider call before the crawler gives up
    #[serde(rename = "max-attempts")]
    pub max_attempts: u32,

    /// Delay between attempts (milliseconds)
    #[serde(rename = "retry-delay-ms")]
    pub retry_delay_ms: u64,
}

impl Default for RaceConfig {
    fn default() -> Self {
        Self {
            timeout: 60,
            workers: 2,
            links_batch_size: 10,
            reversible_batch_size: 50,
            max_attempts: 3,
            retry_delay_ms: 500,
        }
    }
}

/// User agent identification configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct UserAgentConfig {
    /// Name of the crawler
    #[serde(rename = "crawler-name")]
    pub crawler_name: String,

    /// Version of the crawler
    #[serde(rename = "crawler-version")]
    pub crawler_version: String,

    /// URL with information about the crawler
    #[serde(rename = "contact-url")]
    pub contact_url: String,

    /// Email address sent in the `From` header
    #[serde(rename = "contact-email")]
    pub contact_email: String,
}

impl Default for UserAgentConfig {
    fn default() -> Self {
        Self {
            crawler_name: "Wikiracer".to_string(),
            crawler_version: env!("CARGO_PKG_VERSION").to_string(),
            contact_url: "https://github.com/wikirace/wikirace".to_string(),
            contact_email: "wikiracer@example.com".to_string(),
        }
    }
}

impl UserAgentConfig {
    /// Formats the User-Agent header value: `Name/Version (+ContactURL; ContactEmail)`
    pub fn header_value(&self) -> String {
        format!(
            "{}/{} (+{}; {})",
            self.crawler_name, self.crawler_version, self.contact_url, self.contact_email
        )
    }
}

/// Remote link-graph API configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// MediaWiki `api.php` endpoint
    pub endpoint: String,

    /// Namespace links are restricted to (0 = articles)
    pub namespace: i32,

    /// Upper bound on continuation requests for one logical lookup
    #[serde(rename = "max-continuations")]
    pub max_continuations: u32,

    /// Per-request timeout (seconds)
    #[serde(rename = "request-timeout-secs")]
    pub request_timeout_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://en.wikipedia.org/w/api.php".to_string(),
            namespace: 0,
            max_continuations: 500,
            request_timeout_secs: 30,
        }
    }
}
