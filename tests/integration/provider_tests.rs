//! Integration tests for the MediaWiki link provider
//!
//! These tests use wiremock to stand in for `api.php` and check the query
//! parameters, pagination, normalisation and reversibility handling.

use serde_json::json;
use std::time::Duration;
use url::Url;
use wikirace::config::{ApiConfig, UserAgentConfig};
use wikirace::provider::{build_http_client, LinkProvider, LinkSession, WikipediaProvider};
use wikirace::state::Edge;
use wikirace::ProviderError;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const API_PATH: &str = "/w/api.php";

fn test_user_agent() -> UserAgentConfig {
    UserAgentConfig {
        crawler_name: "TestRacer".to_string(),
        crawler_version: "1.0.0".to_string(),
        contact_url: "https://example.com/contact".to_string(),
        contact_email: "test@example.com".to_string(),
    }
}

fn provider_for(server: &MockServer, max_continuations: u32) -> WikipediaProvider {
    let endpoint =
        Url::parse(&format!("{}{}", server.uri(), API_PATH)).expect("Failed to parse endpoint");
    let client = build_http_client(&test_user_agent(), Duration::from_secs(5))
        .expect("Failed to build client");
    let api = ApiConfig {
        endpoint: endpoint.to_string(),
        namespace: 0,
        max_continuations,
        request_timeout_secs: 5,
    };
    WikipediaProvider::new(client, endpoint, &api)
}

fn titles(names: &[&str]) -> Vec<String> {
    names.iter().map(|name| name.to_string()).collect()
}

#[tokio::test]
async fn test_fetch_links_sends_query_parameters() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(API_PATH))
        .and(query_param("action", "query"))
        .and(query_param("format", "json"))
        .and(query_param("prop", "links"))
        .and(query_param("pllimit", "max"))
        .and(query_param("plnamespace", "0"))
        .and(query_param("titles", "Gray wolf|Coyote"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "batchcomplete": "",
            "query": {
                "pages": {
                    "736": {"pageid": 736, "ns": 0, "title": "Gray wolf",
                            "links": [{"ns": 0, "title": "Canada"}]},
                    "812": {"pageid": 812, "ns": 0, "title": "Coyote",
                            "links": [{"ns": 0, "title": "Prairie"}]}
                }
            }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let provider = provider_for(&server, 10);
    let mut session = provider.connect().await.unwrap();

    let batch = session
        .fetch_links(&titles(&["Gray wolf", "Coyote"]))
        .await
        .unwrap();

    assert!(batch.done);
    assert_eq!(
        batch.edges,
        vec![
            Edge::new("Canada", "Gray wolf"),
            Edge::new("Prairie", "Coyote"),
        ]
    );
}

#[tokio::test]
async fn test_fetch_links_follows_continuation() {
    let server = MockServer::start().await;

    // Mounted first so it wins for the continued request
    Mock::given(method("GET"))
        .and(path(API_PATH))
        .and(query_param("plcontinue", "736|0|Coyote"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "batchcomplete": "",
            "query": {
                "pages": {
                    "736": {"pageid": 736, "ns": 0, "title": "Gray wolf",
                            "links": [{"ns": 0, "title": "Coyote"}]}
                }
            }
        })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path(API_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "continue": {"plcontinue": "736|0|Coyote", "continue": "||"},
            "query": {
                "pages": {
                    "736": {"pageid": 736, "ns": 0, "title": "Gray wolf",
                            "links": [{"ns": 0, "title": "Canada"}]}
                }
            }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let provider = provider_for(&server, 10);
    let mut session = provider.connect().await.unwrap();

    let batch = session.fetch_links(&titles(&["Gray wolf"])).await.unwrap();

    assert!(batch.done);
    assert_eq!(
        batch.edges,
        vec![
            Edge::new("Canada", "Gray wolf"),
            Edge::new("Coyote", "Gray wolf"),
        ]
    );
    assert_eq!(session.request_count(), 2);
}

#[tokio::test]
async fn test_fetch_links_stops_at_continuation_limit() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(API_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "continue": {"plcontinue": "736|0|More", "continue": "||"},
            "query": {
                "pages": {
                    "736": {"pageid": 736, "ns": 0, "title": "Gray wolf",
                            "links": [{"ns": 0, "title": "Canada"}]}
                }
            }
        })))
        .expect(3)
        .mount(&server)
        .await;

    let provider = provider_for(&server, 3);
    let mut session = provider.connect().await.unwrap();

    let batch = session.fetch_links(&titles(&["Gray wolf"])).await.unwrap();

    assert!(!batch.done);
    assert_eq!(batch.edges.len(), 3);
    assert_eq!(session.request_count(), 3);
}

#[tokio::test]
async fn test_fetch_links_reports_normalisation() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(API_PATH))
        .and(query_param("titles", "gray wolf"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "query": {
                "normalized": [{"from": "gray wolf", "to": "Gray wolf"}],
                "pages": {
                    "736": {"pageid": 736, "ns": 0, "title": "Gray wolf",
                            "links": [{"ns": 0, "title": "Canada"}]}
                }
            }
        })))
        .mount(&server)
        .await;

    let provider = provider_for(&server, 10);
    let mut session = provider.connect().await.unwrap();

    let batch = session.fetch_links(&titles(&["gray wolf"])).await.unwrap();

    assert_eq!(
        batch.normalized,
        vec![("gray wolf".to_string(), "Gray wolf".to_string())]
    );
    assert_eq!(batch.edges, vec![Edge::new("Canada", "Gray wolf")]);
}

#[tokio::test]
async fn test_missing_page_has_no_links() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(API_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "query": {
                "pages": {
                    "-1": {"ns": 0, "title": "Atlantis", "missing": ""}
                }
            }
        })))
        .mount(&server)
        .await;

    let provider = provider_for(&server, 10);
    let mut session = provider.connect().await.unwrap();

    let batch = session.fetch_links(&titles(&["Atlantis"])).await.unwrap();
    assert!(batch.edges.is_empty());
    assert!(batch.done);
}

#[tokio::test]
async fn test_fetch_reversible_filters_candidates() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(API_PATH))
        .and(query_param("titles", "Ice cream|Camel|Sorbet"))
        .and(query_param("pltitles", "Dessert"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "query": {
                "pages": {
                    "101": {"pageid": 101, "ns": 0, "title": "Ice cream",
                            "links": [{"ns": 0, "title": "Dessert"}]},
                    "102": {"pageid": 102, "ns": 0, "title": "Camel"},
                    "103": {"pageid": 103, "ns": 0, "title": "Sorbet",
                            "links": [{"ns": 0, "title": "Dessert"}]}
                }
            }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let provider = provider_for(&server, 10);
    let mut session = provider.connect().await.unwrap();

    let candidates = vec![
        Edge::new("Ice cream", "Dessert"),
        Edge::new("Camel", "Dessert"),
        Edge::new("Sorbet", "Dessert"),
    ];
    let reversible = session.fetch_reversible(&candidates).await.unwrap();

    assert_eq!(
        reversible,
        vec![
            Edge::new("Ice cream", "Dessert"),
            Edge::new("Sorbet", "Dessert"),
        ]
    );
}

#[tokio::test]
async fn test_fetch_reversible_matches_each_parent() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(API_PATH))
        .and(query_param("pltitles", "Canada|Mexico"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "query": {
                "pages": {
                    "201": {"pageid": 201, "ns": 0, "title": "Gray wolf",
                            "links": [{"ns": 0, "title": "Canada"}]}
                }
            }
        })))
        .mount(&server)
        .await;

    let provider = provider_for(&server, 10);
    let mut session = provider.connect().await.unwrap();

    let candidates = vec![
        Edge::new("Gray wolf", "Canada"),
        Edge::new("Gray wolf", "Mexico"),
    ];
    let reversible = session.fetch_reversible(&candidates).await.unwrap();

    assert_eq!(reversible, vec![Edge::new("Gray wolf", "Canada")]);
}

#[tokio::test]
async fn test_fetch_reversible_follows_normalised_child() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(API_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "query": {
                "normalized": [{"from": "ice cream", "to": "Ice cream"}],
                "pages": {
                    "101": {"pageid": 101, "ns": 0, "title": "Ice cream",
                            "links": [{"ns": 0, "title": "Dessert"}]}
                }
            }
        })))
        .mount(&server)
        .await;

    let provider = provider_for(&server, 10);
    let mut session = provider.connect().await.unwrap();

    let candidates = vec![Edge::new("ice cream", "Dessert")];
    let reversible = session.fetch_reversible(&candidates).await.unwrap();

    assert_eq!(reversible, candidates);
}

#[tokio::test]
async fn test_http_error_status() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(API_PATH))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let provider = provider_for(&server, 10);
    let mut session = provider.connect().await.unwrap();

    let result = session.fetch_links(&titles(&["Gray wolf"])).await;
    assert!(matches!(
        result,
        Err(ProviderError::Status { status: 503, .. })
    ));
}

#[tokio::test]
async fn test_api_error_body() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(API_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "error": {"code": "toomanyvalues", "info": "Too many values supplied"}
        })))
        .mount(&server)
        .await;

    let provider = provider_for(&server, 10);
    let mut session = provider.connect().await.unwrap();

    match session.fetch_links(&titles(&["Gray wolf"])).await {
        Err(ProviderError::Malformed(message)) => assert!(message.contains("toomanyvalues")),
        other => panic!("unexpected result {:?}", other),
    }
}

#[tokio::test]
async fn test_invalid_json_body() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(API_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>maintenance</html>"))
        .mount(&server)
        .await;

    let provider = provider_for(&server, 10);
    let mut session = provider.connect().await.unwrap();

    let result = session.fetch_links(&titles(&["Gray wolf"])).await;
    assert!(matches!(result, Err(ProviderError::Decode(_))));
}

#[tokio::test]
async fn test_identification_headers() {
    let server = MockServer::start().await;
    let user_agent = test_user_agent();

    Mock::given(method("GET"))
        .and(path(API_PATH))
        .and(header("user-agent", user_agent.header_value().as_str()))
        .and(header("from", "test@example.com"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"query": {"pages": {}}})))
        .expect(1)
        .mount(&server)
        .await;

    let provider = provider_for(&server, 10);
    let mut session = provider.connect().await.unwrap();

    let batch = session.fetch_links(&titles(&["Gray wolf"])).await.unwrap();
    assert!(batch.edges.is_empty());
}

#[tokio::test]
async fn test_empty_lookups_skip_the_network() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500))
        .expect(0)
        .mount(&server)
        .await;

    let provider = provider_for(&server, 10);
    let mut session = provider.connect().await.unwrap();

    let batch = session.fetch_links(&[]).await.unwrap();
    assert!(batch.edges.is_empty());
    assert!(session.fetch_reversible(&[]).await.unwrap().is_empty());
    assert_eq!(session.request_count(), 0);
}
