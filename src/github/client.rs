use crate::error::{Result, TrendingError};
use crate::github::{rank_by_stars, Repository, Window};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use chrono::{DateTime, TimeZone, Utc};
use reqwest::header::{HeaderMap, ACCEPT, AUTHORIZATION};
use reqwest::{Client, Response, StatusCode};
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, info};

const GITHUB_ACCEPT: &str = "application/vnd.github+json";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

/// Largest page the search endpoint serves
const MAX_PER_PAGE: u32 = 100;

/// GitHub REST client for the trending search and README lookups
pub struct GitHubClient {
    token: String,
    base_url: String,
    client: Client,
}

impl GitHubClient {
    /// Create a client; an empty token is rejected before any request
    pub fn new(token: String, base_url: String) -> Result<Self> {
        if token.trim().is_empty() {
            return Err(TrendingError::auth("GitHub token is empty"));
        }

        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .user_agent(concat!("trending-digest/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            token,
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        })
    }

    /// Fetch up to `limit` repositories active in `window`, most starred first
    pub async fn search_trending(&self, window: &Window, limit: u32) -> Result<Vec<Repository>> {
        let per_page = limit.clamp(1, MAX_PER_PAGE);
        let per_page_param = per_page.to_string();
        let query = format!("created:>{}", window.since_param());
        let url = format!("{}/search/repositories", self.base_url);

        info!(%query, per_page, days = window.days, "Searching GitHub for trending repositories");

        let response = self
            .client
            .get(&url)
            .query(&[
                ("q", query.as_str()),
                ("sort", "stars"),
                ("order", "desc"),
                ("per_page", per_page_param.as_str()),
            ])
            .header(AUTHORIZATION, format!("Bearer {}", self.token))
            .header(ACCEPT, GITHUB_ACCEPT)
            .send()
            .await?;

        let response = check_status(response).await?;
        let body = response.text().await?;
        let page: SearchResponse = serde_json::from_str(&body)?;
        let fetched = page.items.len();

        let mut repos: Vec<Repository> = page
            .items
            .into_iter()
            .map(Repository::from)
            .filter(|repo| repo.active_within(window))
            .collect();

        rank_by_stars(&mut repos);
        repos.truncate(per_page as usize);

        debug!(fetched, kept = repos.len(), "Trending search complete");
        Ok(repos)
    }

    /// Fetch the decoded default-branch README, `None` when the repository has none
    pub async fn fetch_readme(&self, full_name: &str) -> Result<Option<String>> {
        let url = format!("{}/repos/{}/readme", self.base_url, full_name);

        let response = self
            .client
            .get(&url)
            .header(AUTHORIZATION, format!("Bearer {}", self.token))
            .header(ACCEPT, GITHUB_ACCEPT)
            .send()
            .await?;

        if response.status() == StatusCode::NOT_FOUND {
            debug!(repo = full_name, "Repository has no README");
            return Ok(None);
        }

        let response = check_status(response).await?;
        let body = response.text().await?;
        let payload: ReadmeResponse = serde_json::from_str(&body)?;
        decode_content(&payload.content).map(Some)
    }
}

/// Map GitHub error statuses onto the error taxonomy
async fn check_status(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let headers = response.headers().clone();
    let body = response
        .text()
        .await
        .unwrap_or_else(|_| "Unknown error".to_string());
    let message = serde_json::from_str::<ErrorBody>(&body)
        .map(|b| b.message)
        .unwrap_or(body);

    Err(classify_failure(status, &headers, message))
}

fn classify_failure(status: StatusCode, headers: &HeaderMap, message: String) -> TrendingError {
    let quota_exhausted = header_value(headers, "x-ratelimit-remaining") == Some("0")
        || message.to_lowercase().contains("rate limit");

    match status {
        StatusCode::UNAUTHORIZED => TrendingError::Auth(message),
        StatusCode::TOO_MANY_REQUESTS => TrendingError::RateLimit {
            reset_at: reset_time(headers),
        },
        StatusCode::FORBIDDEN if quota_exhausted => TrendingError::RateLimit {
            reset_at: reset_time(headers),
        },
        StatusCode::FORBIDDEN => TrendingError::Auth(message),
        _ => TrendingError::Api {
            status: status.as_u16(),
            message,
        },
    }
}

fn header_value<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name).and_then(|v| v.to_str().ok())
}

fn reset_time(headers: &HeaderMap) -> Option<DateTime<Utc>> {
    header_value(headers, "x-ratelimit-reset")
        .and_then(|v| v.parse::<i64>().ok())
        .and_then(|secs| Utc.timestamp_opt(secs, 0).single())
}

/// Decode the line-wrapped base64 payload of the contents API
fn decode_content(content: &str) -> Result<String> {
    let compact: String = content.chars().filter(|c| !c.is_whitespace()).collect();
    let bytes = STANDARD.decode(compact)?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    items: Vec<ApiRepository>,
}

#[derive(Debug, Deserialize)]
struct ApiRepository {
    full_name: String,
    name: String,
    owner: ApiOwner,
    #[serde(default)]
    stargazers_count: u64,
    #[serde(default)]
    forks_count: u64,
    language: Option<String>,
    description: Option<String>,
    html_url: String,
    created_at: Option<DateTime<Utc>>,
    pushed_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize)]
struct ApiOwner {
    login: String,
    #[serde(default)]
    html_url: String,
}

impl From<ApiRepository> for Repository {
    fn from(api: ApiRepository) -> Self {
        Self {
            full_name: api.full_name,
            name: api.name,
            owner: api.owner.login,
            owner_url: api.owner.html_url,
            stars: api.stargazers_count,
            forks: api.forks_count,
            language: api.language,
            description: api.description,
            html_url: api.html_url,
            created_at: api.created_at,
            pushed_at: api.pushed_at,
            ai_summary: None,
        }
    }
}

#[derive(Debug, Deserialize)]
struct ReadmeResponse {
    #[serde(default)]
    content: String,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}


#[cfg(test)]
mod tests {
    use super::test_support::{api_item, search_body};
    use super::*;
    use chrono::Duration as ChronoDuration;
    use mockito::{Matcher, Server};

    const DEFAULT_URL: &str = "https://api.github.com";

    fn client_for(server: &Server) -> GitHubClient {
        GitHubClient::new("test-token".to_string(), server.url()).unwrap()
    }

    #[test]
    fn test_empty_token_rejected() {
        let result = GitHubClient::new("  ".to_string(), DEFAULT_URL.to_string());
        assert!(matches!(result, Err(TrendingError::Auth(_))));
    }

    #[tokio::test]
    async fn test_search_trending_sorts_filters_and_truncates() {
        let mut server = Server::new_async().await;
        let now = Utc::now();
        let body = search_body(vec![
            api_item("a/low", 10, now - ChronoDuration::days(1)),
            api_item("b/high", 500, now - ChronoDuration::days(2)),
            api_item("c/stale", 900, now - ChronoDuration::days(30)),
            api_item("d/mid", 50, now - ChronoDuration::days(3)),
        ]);

        let mock = server
            .mock("GET", "/search/repositories")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("sort".into(), "stars".into()),
                Matcher::UrlEncoded("order".into(), "desc".into()),
                Matcher::UrlEncoded("per_page".into(), "2".into()),
                Matcher::Regex("q=created".into()),
            ]))
            .match_header("authorization", "Bearer test-token")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(body)
            .create_async()
            .await;

        let client = client_for(&server);
        let window = Window::days_back(7).unwrap();
        let repos = client.search_trending(&window, 2).await.unwrap();

        let names: Vec<&str> = repos.iter().map(|r| r.full_name.as_str()).collect();
        assert_eq!(names, vec!["b/high", "d/mid"]);
        assert!(repos.iter().all(|r| r.active_within(&window)));
        assert_eq!(repos[0].owner, "b");
        assert_eq!(repos[0].forks, 125);
        assert_eq!(repos[0].language.as_deref(), Some("Rust"));

        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_search_unauthorized_is_auth_error() {
        let mut server = Server::new_async().await;
        server
            .mock("GET", "/search/repositories")
            .match_query(Matcher::Any)
            .with_status(401)
            .with_body(r#"{"message":"Bad credentials"}"#)
            .create_async()
            .await;

        let err = client_for(&server)
            .search_trending(&Window::days_back(7).unwrap(), 5)
            .await
            .unwrap_err();

        match err {
            TrendingError::Auth(message) => assert_eq!(message, "Bad credentials"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_search_exhausted_quota_is_rate_limit() {
        let mut server = Server::new_async().await;
        server
            .mock("GET", "/search/repositories")
            .match_query(Matcher::Any)
            .with_status(403)
            .with_header("x-ratelimit-remaining", "0")
            .with_header("x-ratelimit-reset", "1753372800")
            .with_body(r#"{"message":"API rate limit exceeded"}"#)
            .create_async()
            .await;

        let err = client_for(&server)
            .search_trending(&Window::days_back(7).unwrap(), 5)
            .await
            .unwrap_err();

        match err {
            TrendingError::RateLimit { reset_at } => {
                assert_eq!(reset_at.map(|t| t.timestamp()), Some(1_753_372_800));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_search_server_error_is_api_error() {
        let mut server = Server::new_async().await;
        server
            .mock("GET", "/search/repositories")
            .match_query(Matcher::Any)
            .with_status(502)
            .with_body("bad gateway")
            .create_async()
            .await;

        let err = client_for(&server)
            .search_trending(&Window::days_back(7).unwrap(), 5)
            .await
            .unwrap_err();

        assert!(matches!(err, TrendingError::Api { status: 502, .. }));
    }

    #[tokio::test]
    async fn test_unreachable_host_is_network_error() {
        let client =
            GitHubClient::new("test-token".to_string(), "http://127.0.0.1:1".to_string()).unwrap();
        let err = client
            .search_trending(&Window::days_back(7).unwrap(), 5)
            .await
            .unwrap_err();
        assert!(matches!(err, TrendingError::Network(_)));
    }

    #[tokio::test]
    async fn test_fetch_readme_decodes_wrapped_base64() {
        let mut server = Server::new_async().await;
        // "# Hello\nworld\n" split across lines like the contents API does
        server
            .mock("GET", "/repos/owner/project/readme")
            .with_status(200)
            .with_body(r#"{"encoding":"base64","content":"IyBIZWxs\nbwp3b3JsZAo=\n"}"#)
            .create_async()
            .await;

        let readme = client_for(&server)
            .fetch_readme("owner/project")
            .await
            .unwrap();
        assert_eq!(readme.as_deref(), Some("# Hello\nworld\n"));
    }

    #[tokio::test]
    async fn test_malformed_search_body_is_json_error() {
        let mut server = Server::new_async().await;
        server
            .mock("GET", "/search/repositories")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"items": [{"full_name": 42}]"#)
            .create_async()
            .await;

        let err = client_for(&server)
            .search_trending(&Window::days_back(7).unwrap(), 5)
            .await
            .unwrap_err();
        assert!(matches!(err, TrendingError::Json(_)));
    }

    #[tokio::test]
    async fn test_fetch_readme_bad_base64_is_decode_error() {
        let mut server = Server::new_async().await;
        server
            .mock("GET", "/repos/owner/garbled/readme")
            .with_status(200)
            .with_body(r#"{"encoding":"base64","content":"!!not base64!!"}"#)
            .create_async()
            .await;

        let err = client_for(&server)
            .fetch_readme("owner/garbled")
            .await
            .unwrap_err();
        assert!(matches!(err, TrendingError::Decode(_)));
    }

    #[tokio::test]
    async fn test_fetch_readme_missing_is_none() {
        let mut server = Server::new_async().await;
        server
            .mock("GET", "/repos/owner/empty/readme")
            .with_status(404)
            .with_body(r#"{"message":"Not Found"}"#)
            .create_async()
            .await;

        let readme = client_for(&server).fetch_readme("owner/empty").await.unwrap();
        assert!(readme.is_none());
    }

    #[test]
    fn test_too_many_requests_is_rate_limit() {
        let mut headers = HeaderMap::new();
        headers.insert("x-ratelimit-reset", "1753372800".parse().unwrap());
        let err = classify_failure(
            StatusCode::TOO_MANY_REQUESTS,
            &headers,
            "slow down".to_string(),
        );
        match err {
            TrendingError::RateLimit { reset_at } => {
                assert_eq!(reset_at.map(|t| t.timestamp()), Some(1_753_372_800));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_forbidden_rate_limit_message_without_header() {
        let err = classify_failure(
            StatusCode::FORBIDDEN,
            &HeaderMap::new(),
            "You have exceeded a secondary Rate Limit".to_string(),
        );
        assert!(matches!(err, TrendingError::RateLimit { reset_at: None }));
    }

    #[test]
    fn test_forbidden_without_quota_hint_is_auth() {
        let err = classify_failure(
            StatusCode::FORBIDDEN,
            &HeaderMap::new(),
            "Resource not accessible".to_string(),
        );
        assert!(matches!(err, TrendingError::Auth(_)));
    }
}
