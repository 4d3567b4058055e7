use std::path::Path;
use std::time::Instant;

use audit_common::{Page, PageTiming};
use tracing::{debug, info};

use crate::config::CliConfig;
use crate::error::AppError;

pub struct Fetcher {
    http: reqwest::Client,
    config: CliConfig,
}

impl Fetcher {
    pub fn new(config: CliConfig) -> Result<Self, AppError> {
        let http = reqwest::Client::builder()
            .user_agent(config.user_agent.clone())
            .build()?;
        Ok(Self { http, config })
    }

    /// GET `url` and parse the body, recording headers and timing.
    ///
    /// The page keeps the final URL after redirects.
    pub async fn fetch(&self, url: &str) -> Result<Page, AppError> {
        let started = Instant::now();
        let resp = self
            .http
            .get(url)
            .timeout(self.config.fetch_timeout)
            .send()
            .await?;
        let response_time = started.elapsed();

        let status = resp.status();
        if !status.is_success() {
            return Err(AppError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let final_url = resp.url().to_string();
        let headers: Vec<(String, String)> = resp
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                Some((name.as_str().to_string(), value.to_str().ok()?.to_string()))
            })
            .collect();
        let body = resp.text().await?;
        let timing = PageTiming {
            response_time,
            total_time: started.elapsed(),
            transfer_bytes: body.len(),
        };
        info!(
            url = %final_url,
            status = status.as_u16(),
            response_ms = response_time.as_millis() as u64,
            bytes = body.len(),
            "page fetched"
        );

        Ok(Page::parse(final_url, body).with_headers(headers).with_timing(timing))
    }
}

pub fn is_remote(target: &str) -> bool {
    let lower = target.to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://")
}

/// Read a saved HTML file. Without `url` the page is addressed by its file path.
pub async fn read_local(path: &Path, url: Option<&str>) -> Result<Page, AppError> {
    let source = tokio::fs::read_to_string(path)
        .await
        .map_err(|source| AppError::Read {
            path: path.to_path_buf(),
            source,
        })?;
    let url = match url {
        Some(url) => url.to_string(),
        None => {
            let absolute = std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf());
            format!("file://{}", absolute.display())
        }
    };
    debug!(path = %path.display(), bytes = source.len(), "page read from disk");
    Ok(Page::parse(url, source))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_remote() {
        assert!(is_remote("https://example.com"));
        assert!(is_remote("HTTP://example.com"));
        assert!(!is_remote("page.html"));
        assert!(!is_remote("./https-notes.html"));
    }

    #[tokio::test]
    async fn test_read_local_with_url_override() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("page.html");
        std::fs::write(&path, "<title>Saved</title>").unwrap();

        let page = read_local(&path, Some("https://example.com/saved")).await.unwrap();
        assert_eq!(page.url(), "https://example.com/saved");
        assert_eq!(page.title(), "Saved");
        assert!(page.timing().is_none());

        let page = read_local(&path, None).await.unwrap();
        assert!(page.url().starts_with("file://"));
    }

    #[tokio::test]
    async fn test_read_local_missing_file() {
        let err = read_local(Path::new("/nonexistent/seo-audit/page.html"), None)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Read { .. }));
    }
}
