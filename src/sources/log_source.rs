use crate::error::{DashboardError, Result};
use reqwest::Client;
use std::fmt;
use std::path::PathBuf;

pub const DEFAULT_LOG_SOURCE: &str = "epoch_dashboard_log.md";

/// Where the markdown status log is read from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogSource {
    Http(String),
    File(PathBuf),
}

impl LogSource {
    /// URLs with an http(s) scheme are fetched, anything else is a path
    pub fn parse(raw: &str) -> Self {
        let lower = raw.to_ascii_lowercase();
        if lower.starts_with("http://") || lower.starts_with("https://") {
            LogSource::Http(raw.to_string())
        } else {
            LogSource::File(PathBuf::from(raw))
        }
    }
}

impl fmt::Display for LogSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogSource::Http(url) => f.write_str(url),
            LogSource::File(path) => write!(f, "{}", path.display()),
        }
    }
}

#[derive(Debug, Clone)]
pub struct StatusLogClient {
    http: Client,
    source: LogSource,
}

impl StatusLogClient {
    pub fn new(http: Client, source: LogSource) -> Self {
        Self { http, source }
    }

    pub fn source(&self) -> &LogSource {
        &self.source
    }

    /// Fetch the raw log text. Non-2xx answers are errors.
    pub async fn fetch_text(&self) -> Result<String> {
        match &self.source {
            LogSource::Http(url) => {
                let response = self.http.get(url).send().await?;
                let status = response.status();
                if !status.is_success() {
                    return Err(DashboardError::Status {
                        url: url.clone(),
                        status,
                    });
                }
                let text = response.text().await?;
                tracing::debug!(bytes = text.len(), %url, "fetched status log");
                Ok(text)
            }
            LogSource::File(path) => {
                let text = tokio::fs::read_to_string(path).await?;
                tracing::debug!(bytes = text.len(), path = %path.display(), "read status log");
                Ok(text)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn sources_are_told_apart_by_scheme() {
        assert_eq!(
            LogSource::parse("https://example.org/log.md"),
            LogSource::Http("https://example.org/log.md".to_string())
        );
        assert_eq!(
            LogSource::parse("logs/epoch.md"),
            LogSource::File(PathBuf::from("logs/epoch.md"))
        );
    }

    #[tokio::test]
    async fn fetches_over_http() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/epoch_dashboard_log.md"))
            .respond_with(
                ResponseTemplate::new(200).set_body_string("| 2024-01-01 10:00 | A | Online | N/A |"),
            )
            .mount(&server)
            .await;

        let client = StatusLogClient::new(
            Client::new(),
            LogSource::parse(&format!("{}/epoch_dashboard_log.md", server.uri())),
        );
        let text = client.fetch_text().await.unwrap();
        assert!(text.contains("Online"));
    }

    #[tokio::test]
    async fn non_success_status_is_an_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let client = StatusLogClient::new(Client::new(), LogSource::parse(&server.uri()));
        let err = client.fetch_text().await.unwrap_err();
        assert!(matches!(
            err,
            DashboardError::Status { status, .. } if status.as_u16() == 503
        ));
    }

    #[tokio::test]
    async fn reads_local_files() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "| 2024-01-01 10:00 | Website | Offline | N/A |").unwrap();

        let client =
            StatusLogClient::new(Client::new(), LogSource::File(file.path().to_path_buf()));
        let text = client.fetch_text().await.unwrap();
        assert!(text.contains("Website"));
    }

    #[tokio::test]
    async fn missing_file_is_an_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let client = StatusLogClient::new(
            Client::new(),
            LogSource::File(dir.path().join("missing.md")),
        );
        assert!(matches!(
            client.fetch_text().await.unwrap_err(),
            DashboardError::Io(_)
        ));
    }
}
