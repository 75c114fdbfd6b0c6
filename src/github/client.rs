//! GitHub issue client

use reqwest::header::{ACCEPT, AUTHORIZATION};
use reqwest::{Response, StatusCode};

use super::error::FetchError;
use super::reaction::ReactionKind;
use super::types::{ApiErrorBody, IssueSnapshot};
use crate::config::GitHubConfig;

/// Media type that makes the issue endpoint include the `reactions` rollup
pub const REACTIONS_PREVIEW: &str = "application/vnd.github.squirrel-girl-preview+json";

/// Status reported when an issue payload has no reaction data
const MISSING_REACTIONS_STATUS: u16 = 502;

/// Read-only client for the issues endpoint
pub struct IssueClient {
    client: reqwest::Client,
    api_url: String,
}

impl IssueClient {
    pub fn new(config: &GitHubConfig) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .user_agent(config.user_agent.as_str())
            .build()?;

        Ok(Self {
            client,
            api_url: config.api_url.trim_end_matches('/').to_string(),
        })
    }

    /// Fetch one issue and return the count of `kind` reactions on it.
    ///
    /// `token`, when present, is sent as a bearer credential; otherwise the
    /// request is anonymous.
    pub async fn fetch_reaction_count(
        &self,
        owner: &str,
        repo: &str,
        issue_number: u64,
        kind: ReactionKind,
        token: Option<&str>,
    ) -> Result<u64, FetchError> {
        let issue = self.get_issue(owner, repo, issue_number, token).await?;

        let reactions = issue.reactions.ok_or_else(|| FetchError::Api {
            status: MISSING_REACTIONS_STATUS,
            message: format!("Issue {owner}/{repo}#{issue_number} has no reaction data"),
        })?;

        Ok(reactions.count(kind))
    }

    async fn get_issue(
        &self,
        owner: &str,
        repo: &str,
        issue_number: u64,
        token: Option<&str>,
    ) -> Result<IssueSnapshot, FetchError> {
        let url = format!(
            "{}/repos/{owner}/{repo}/issues/{issue_number}",
            self.api_url
        );
        let mut request = self.client.get(&url).header(ACCEPT, REACTIONS_PREVIEW);

        if let Some(token) = token {
            request = request.header(AUTHORIZATION, format!("Bearer {token}"));
        }

        let response = request.send().await?;

        if !response.status().is_success() {
            return Err(api_error(response).await);
        }

        response
            .json::<IssueSnapshot>()
            .await
            .map_err(|e| FetchError::Unexpected(format!("Failed to parse GitHub API response: {e}")))
    }
}

/// Turn a non-success response into `FetchError::Api`.
///
/// GitHub puts a human readable `message` in its JSON error bodies; fall back
/// to the status reason, then to whatever text came back.
async fn api_error(response: Response) -> FetchError {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    FetchError::Api {
        status: status.as_u16(),
        message: error_message(status, &body),
    }
}

fn error_message(status: StatusCode, body: &str) -> String {
    if let Ok(parsed) = serde_json::from_str::<ApiErrorBody>(body) {
        return parsed.message;
    }
    match status.canonical_reason() {
        Some(reason) => reason.to_string(),
        None if !body.trim().is_empty() => body.trim().to_string(),
        None => format!("HTTP {}", status.as_u16()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{header, header_exists, method, path};
    use wiremock::{Mock, MockServer, Request, ResponseTemplate};

    const ISSUE_PATH: &str = "/repos/octocat/Hello-World/issues/42";

    fn client_for(server: &MockServer) -> IssueClient {
        IssueClient::new(&GitHubConfig {
            api_url: server.uri(),
            user_agent: "reaction-badge-tests".to_string(),
            token_env: "UNUSED".to_string(),
        })
        .unwrap()
    }

    fn issue_body() -> serde_json::Value {
        json!({
            "number": 42,
            "reactions": { "total_count": 7, "+1": 5, "-1": 2, "heart": 0 }
        })
    }

    #[tokio::test]
    async fn test_fetch_requested_kind() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(ISSUE_PATH))
            .and(header("accept", REACTIONS_PREVIEW))
            .and(header("user-agent", "reaction-badge-tests"))
            .respond_with(ResponseTemplate::new(200).set_body_json(issue_body()))
            .expect(2)
            .mount(&server)
            .await;

        let client = client_for(&server);
        let up = client
            .fetch_reaction_count("octocat", "Hello-World", 42, ReactionKind::ThumbsUp, None)
            .await
            .unwrap();
        let down = client
            .fetch_reaction_count("octocat", "Hello-World", 42, ReactionKind::ThumbsDown, None)
            .await
            .unwrap();

        assert_eq!(up, 5);
        assert_eq!(down, 2);
    }

    #[tokio::test]
    async fn test_bearer_token_sent_when_present() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(ISSUE_PATH))
            .and(header("authorization", "Bearer s3cret"))
            .respond_with(ResponseTemplate::new(200).set_body_json(issue_body()))
            .expect(1)
            .mount(&server)
            .await;

        let count = client_for(&server)
            .fetch_reaction_count(
                "octocat",
                "Hello-World",
                42,
                ReactionKind::ThumbsUp,
                Some("s3cret"),
            )
            .await
            .unwrap();

        assert_eq!(count, 5);
    }

    #[tokio::test]
    async fn test_no_authorization_header_without_token() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(ISSUE_PATH))
            .and(header_exists("authorization"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path(ISSUE_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_json(issue_body()))
            .mount(&server)
            .await;

        let count = client_for(&server)
            .fetch_reaction_count("octocat", "Hello-World", 42, ReactionKind::ThumbsUp, None)
            .await
            .unwrap();
        assert_eq!(count, 5);

        let requests: Vec<Request> = server.received_requests().await.unwrap();
        assert_eq!(requests.len(), 1);
        assert!(!requests[0].headers.contains_key("authorization"));
    }

    #[tokio::test]
    async fn test_not_found_carries_status_and_message() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(ISSUE_PATH))
            .respond_with(ResponseTemplate::new(404).set_body_json(json!({
                "message": "Not Found",
                "documentation_url": "https://docs.github.com/rest/issues/issues#get-an-issue"
            })))
            .mount(&server)
            .await;

        let err = client_for(&server)
            .fetch_reaction_count("octocat", "Hello-World", 42, ReactionKind::ThumbsUp, None)
            .await
            .unwrap_err();

        assert_eq!(
            err,
            FetchError::Api {
                status: 404,
                message: "Not Found".to_string()
            }
        );
        assert_eq!(err.remote_status(), Some(404));
    }

    #[tokio::test]
    async fn test_rate_limit_message_passed_through() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(ISSUE_PATH))
            .respond_with(ResponseTemplate::new(403).set_body_json(json!({
                "message": "API rate limit exceeded for 127.0.0.1."
            })))
            .mount(&server)
            .await;

        let err = client_for(&server)
            .fetch_reaction_count("octocat", "Hello-World", 42, ReactionKind::ThumbsUp, None)
            .await
            .unwrap_err();

        assert_eq!(err.remote_status(), Some(403));
        assert_eq!(err.to_string(), "API rate limit exceeded for 127.0.0.1.");
    }

    #[tokio::test]
    async fn test_missing_reactions_is_api_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(ISSUE_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "number": 42 })))
            .mount(&server)
            .await;

        let err = client_for(&server)
            .fetch_reaction_count("octocat", "Hello-World", 42, ReactionKind::ThumbsUp, None)
            .await
            .unwrap_err();

        assert_eq!(err.remote_status(), Some(502));
    }

    #[tokio::test]
    async fn test_malformed_body_is_unexpected() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(ISSUE_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&server)
            .await;

        let err = client_for(&server)
            .fetch_reaction_count("octocat", "Hello-World", 42, ReactionKind::ThumbsUp, None)
            .await
            .unwrap_err();

        assert!(matches!(err, FetchError::Unexpected(_)));
        assert_eq!(err.remote_status(), None);
    }

    #[test]
    fn test_error_message_fallbacks() {
        assert_eq!(
            error_message(StatusCode::NOT_FOUND, r#"{"message":"Not Found"}"#),
            "Not Found"
        );
        assert_eq!(
            error_message(StatusCode::BAD_GATEWAY, "<html>oops</html>"),
            "Bad Gateway"
        );
        let odd = StatusCode::from_u16(599).unwrap();
        assert_eq!(error_message(odd, " upstream gone "), "upstream gone");
        assert_eq!(error_message(odd, ""), "HTTP 599");
    }
}
