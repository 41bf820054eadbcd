//! HTTP client for the osreport server.

mod sse;

use anyhow::{Context as _, Result};
use futures::{Stream, StreamExt};
use reqwest::{RequestBuilder, Response, Url};

use osreport_server::routes::{
    HealthResponse, ProjectsResponse, RefreshResponse, RefreshStartedResponse, StatusResponse,
};
use osreport_types::{ProgressMessage, Report};

use sse::SseDecoder;

/// Query-string filters for `GET /api/v1/resources`.
#[derive(Debug, Default, Clone)]
pub struct ReportQuery {
    pub projects: Vec<String>,
    pub project_ids: Vec<String>,
    pub types: Vec<String>,
    pub statuses: Vec<String>,
    pub force: bool,
}

impl ReportQuery {
    /// Query pairs; empty filters are left out.
    pub fn pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        for (key, values) in [
            ("project", &self.projects),
            ("project_id", &self.project_ids),
            ("type", &self.types),
            ("status", &self.statuses),
        ] {
            if !values.is_empty() {
                pairs.push((key, values.join(",")));
            }
        }
        if self.force {
            pairs.push(("force", "true".to_string()));
        }
        pairs
    }
}

/// Client for the osreport REST API.
#[derive(Debug, Clone)]
pub struct Client {
    base_url: Url,
    http: reqwest::Client,
    token: Option<String>,
}

impl Client {
    /// Create a client for `base_url`, sending `token` on protected routes.
    pub fn new(base_url: &str, token: Option<String>) -> Result<Self> {
        let base_url =
            Url::parse(base_url).with_context(|| format!("Invalid server URL: {}", base_url))?;

        Ok(Self {
            base_url,
            http: reqwest::Client::new(),
            token,
        })
    }

    fn request(&self, method: reqwest::Method, path: &str) -> Result<RequestBuilder> {
        let url = self.base_url.join(path)?;
        let builder = self.http.request(method, url);
        Ok(match &self.token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        })
    }

    /// Check server health.
    pub async fn health(&self) -> Result<HealthResponse> {
        let response = self.request(reqwest::Method::GET, "/health")?.send().await?;
        Ok(check(response).await?.json().await?)
    }

    /// Stored report status.
    pub async fn status(&self) -> Result<StatusResponse> {
        let response = self
            .request(reqwest::Method::GET, "/api/v1/status")?
            .send()
            .await?;
        Ok(check(response).await?.json().await?)
    }

    /// The current report, filtered.
    pub async fn report(&self, query: &ReportQuery) -> Result<Report> {
        let response = self
            .request(reqwest::Method::GET, "/api/v1/resources")?
            .query(&query.pairs())
            .send()
            .await?;
        Ok(check(response).await?.json().await?)
    }

    /// Projects of the current report.
    pub async fn projects(&self) -> Result<ProjectsResponse> {
        let response = self
            .request(reqwest::Method::GET, "/api/v1/projects")?
            .send()
            .await?;
        Ok(check(response).await?.json().await?)
    }

    /// Refresh and wait for the result.
    pub async fn refresh(&self) -> Result<RefreshResponse> {
        let response = self
            .request(reqwest::Method::POST, "/api/v1/refresh")?
            .send()
            .await?;
        Ok(check(response).await?.json().await?)
    }

    /// Start a background refresh.
    pub async fn start_refresh(&self) -> Result<RefreshStartedResponse> {
        let response = self
            .request(reqwest::Method::POST, "/api/v1/refresh/progress")?
            .send()
            .await?;
        Ok(check(response).await?.json().await?)
    }

    /// Follow a background refresh until its terminal event.
    pub fn progress(
        &self,
        session_id: &str,
    ) -> Result<impl Stream<Item = Result<ProgressMessage>> + use<>> {
        let request = self
            .request(reqwest::Method::GET, "/api/v1/progress")?
            .query(&[("session_id", session_id)]);

        Ok(async_stream::try_stream! {
            let response = check(request.send().await?).await?;
            let mut body = response.bytes_stream();
            let mut decoder = SseDecoder::default();

            'events: while let Some(chunk) = body.next().await {
                for data in decoder.feed(&chunk?) {
                    let message: ProgressMessage = serde_json::from_str(&data)?;
                    let terminal = message.is_terminal();
                    yield message;
                    if terminal {
                        break 'events;
                    }
                }
            }
        })
    }
}

/// Turn a non-2xx response into an error carrying the server's message.
async fn check(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<serde_json::Value>(&body)
        .ok()
        .and_then(|v| {
            v.get("message")
                .or_else(|| v.get("error"))
                .and_then(|m| m.as_str())
                .map(str::to_string)
        })
        .unwrap_or(body);

    anyhow::bail!("Server returned {}: {}", status, message)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_query_pairs() {
        let query = ReportQuery {
            projects: vec!["infra".to_string(), "web".to_string()],
            types: vec!["server".to_string()],
            force: true,
            ..Default::default()
        };

        assert_eq!(
            query.pairs(),
            vec![
                ("project", "infra,web".to_string()),
                ("type", "server".to_string()),
                ("force", "true".to_string()),
            ]
        );
        assert!(ReportQuery::default().pairs().is_empty());
    }

    #[test]
    fn test_invalid_base_url() {
        assert!(Client::new("not a url", None).is_err());
        assert!(Client::new("http://localhost:8080", None).is_ok());
    }
}
