//! Draft post publishing collaborator.

use std::time::Duration;

use reqwest::blocking::{Client, Response};
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{ReleasePostError, Result};
use crate::pipeline::Stage;

/// Default WordPress.com REST API base URL.
pub const DEFAULT_API_BASE: &str = "https://public-api.wordpress.com/rest/v1.1";

/// User-Agent header value for API requests.
const USER_AGENT_VALUE: &str = "release-post";

/// Reference to a created draft.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DraftPost {
    pub url: String,
}

pub trait Publisher {
    /// Create an unpublished post on `site_id` and return where it lives.
    fn create_draft(
        &self,
        site_id: &str,
        auth_token: &str,
        title: &str,
        html: &str,
    ) -> Result<DraftPost>;
}

#[derive(Debug, Serialize)]
struct NewPost<'a> {
    title: &'a str,
    content: &'a str,
    status: &'a str,
}

#[derive(Debug, Deserialize)]
struct CreatedPost {
    #[serde(rename = "URL")]
    url: String,
}

#[derive(Debug, Deserialize)]
struct ApiErrorResponse {
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

/// Publishes drafts through the WordPress.com REST API.
#[derive(Debug, Clone)]
pub struct WpComPublisher {
    client: Client,
    api_base: String,
}

impl WpComPublisher {
    /// Build a publisher for `api_base`; `timeout` of `None` waits indefinitely.
    pub fn new(api_base: impl Into<String>, timeout: Option<Duration>) -> Result<Self> {
        let client = Client::builder()
            .user_agent(USER_AGENT_VALUE)
            .timeout(timeout)
            .build()
            .map_err(|e| ReleasePostError::collaborator(Stage::Publish, e.to_string()))?;

        Ok(WpComPublisher {
            client,
            api_base: api_base.into(),
        })
    }

    fn posts_url(&self, site_id: &str) -> String {
        format!(
            "{}/sites/{}/posts/new",
            self.api_base.trim_end_matches('/'),
            site_id
        )
    }

    fn handle_error_response(response: Response) -> ReleasePostError {
        let status = response.status();
        let message = match response.json::<ApiErrorResponse>() {
            Ok(body) => body
                .message
                .or(body.error)
                .unwrap_or_else(|| "Unknown error".to_string()),
            Err(_) => "Unknown error".to_string(),
        };

        let message = match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                format!("authentication failed ({}): {}", status.as_u16(), message)
            }
            _ if status.is_server_error() => {
                format!("server error ({}): {}", status.as_u16(), message)
            }
            _ => format!("API error ({}): {}", status.as_u16(), message),
        };

        ReleasePostError::collaborator(Stage::Publish, message)
    }
}

impl Publisher for WpComPublisher {
    fn create_draft(
        &self,
        site_id: &str,
        auth_token: &str,
        title: &str,
        html: &str,
    ) -> Result<DraftPost> {
        let url = self.posts_url(site_id);
        info!(%url, title, "creating draft post");

        let response = self
            .client
            .post(&url)
            .bearer_auth(auth_token)
            .json(&NewPost {
                title,
                content: html,
                status: "draft",
            })
            .send()
            .map_err(|e| {
                ReleasePostError::collaborator(Stage::Publish, format!("network error: {}", e))
            })?;

        if !response.status().is_success() {
            return Err(Self::handle_error_response(response));
        }

        let created: CreatedPost = response.json().map_err(|e| {
            ReleasePostError::collaborator(
                Stage::Publish,
                format!("Failed to parse response: {}", e),
            )
        })?;

        Ok(DraftPost { url: created.url })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_posts_url_trims_trailing_slash() {
        let publisher = WpComPublisher::new("https://api.example.com/rest/", None).unwrap();
        assert_eq!(
            publisher.posts_url("96396764"),
            "https://api.example.com/rest/sites/96396764/posts/new"
        );
    }

    #[test]
    fn test_new_post_body_is_a_draft() {
        let body = serde_json::to_value(NewPost {
            title: "T",
            content: "<p>x</p>",
            status: "draft",
        })
        .unwrap();
        assert_eq!(body["status"], "draft");
        assert_eq!(body["content"], "<p>x</p>");
    }
}
