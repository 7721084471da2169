use crate::config::JobSearchConfig;
use chrono::NaiveDate;
use reqwest::StatusCode;
use serde::Deserialize;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, info, warn};

const BASE_BACKOFF: Duration = Duration::from_millis(500);
const DATE_FORMAT: &str = "%Y-%m-%dT00:00:00";

#[derive(Debug, thiserror::Error)]
pub enum JobSearchError {
    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),
    #[error("job search request for {day} at offset {offset} failed: {source}")]
    Transport {
        day: NaiveDate,
        offset: u32,
        #[source]
        source: reqwest::Error,
    },
    #[error("job search response for {day} at offset {offset} was not valid JSON: {source}")]
    Decode {
        day: NaiveDate,
        offset: u32,
        #[source]
        source: reqwest::Error,
    },
}

#[derive(Debug, Deserialize)]
struct SearchPage {
    #[serde(default)]
    hits: Vec<Value>,
}

enum PageOutcome {
    Hits(Vec<Value>),
    Rejected(StatusCode),
}

/// Pages through the public job-search API one publication day at a time.
pub struct JobSearchClient {
    http: reqwest::Client,
    config: JobSearchConfig,
    backoff: Duration,
}

impl JobSearchClient {
    pub fn new(config: JobSearchConfig) -> Result<Self, JobSearchError> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(JobSearchError::Client)?;

        Ok(Self {
            http,
            config,
            backoff: BASE_BACKOFF,
        })
    }

    /// Overrides the base delay between retries.
    pub fn with_backoff(mut self, backoff: Duration) -> Self {
        self.backoff = backoff;
        self
    }

    /// Hits published on every day in `start..=end`, in day order.
    pub async fn fetch_range(&self, start: NaiveDate, end: NaiveDate) -> Result<Vec<Value>, JobSearchError> {
        let mut hits = Vec::new();
        for day in start.iter_days().take_while(|day| *day <= end) {
            hits.extend(self.fetch_day(day).await?);
        }

        info!(%start, %end, hits = hits.len(), "fetched job ads");
        Ok(hits)
    }

    pub async fn fetch_day(&self, day: NaiveDate) -> Result<Vec<Value>, JobSearchError> {
        let page_size = self.config.page_size.max(1);
        let mut hits = Vec::new();
        let mut offset = 0;

        while offset < self.config.max_offset {
            match self.fetch_page(day, offset).await? {
                PageOutcome::Hits(page) if page.is_empty() => break,
                PageOutcome::Hits(page) => {
                    debug!(%day, offset, hits = page.len(), "fetched job-search page");
                    hits.extend(page);
                }
                PageOutcome::Rejected(status) => {
                    warn!(%day, offset, status = status.as_u16(), "job search rejected request; skipping rest of day");
                    break;
                }
            }
            offset += page_size;
        }

        info!(%day, hits = hits.len(), "fetched job ads for day");
        Ok(hits)
    }

    async fn fetch_page(&self, day: NaiveDate, offset: u32) -> Result<PageOutcome, JobSearchError> {
        let published_after = day.format(DATE_FORMAT).to_string();
        let published_before = day
            .succ_opt()
            .unwrap_or(day)
            .format(DATE_FORMAT)
            .to_string();
        let limit = self.config.page_size.to_string();
        let offset_param = offset.to_string();

        let mut attempt = 0;
        loop {
            if attempt > 0 {
                tokio::time::sleep(self.backoff * (1 << (attempt - 1))).await;
            }
            let retries_left = attempt < self.config.max_retries;
            attempt += 1;

            let mut request = self
                .http
                .get(&self.config.base_url)
                .header("accept", "application/json")
                .query(&[
                    ("published-after", published_after.as_str()),
                    ("published-before", published_before.as_str()),
                    ("limit", limit.as_str()),
                    ("offset", offset_param.as_str()),
                ]);
            if let Some(key) = self.config.api_key.as_deref() {
                request = request.header("api-key", key);
            }

            let response = match request.send().await {
                Ok(response) => response,
                Err(source) if retries_left => {
                    warn!(%day, offset, attempt, error = %source, "job search request failed; retrying");
                    continue;
                }
                Err(source) => return Err(JobSearchError::Transport { day, offset, source }),
            };

            let status = response.status();
            if status.is_success() {
                let page: SearchPage = response
                    .json()
                    .await
                    .map_err(|source| JobSearchError::Decode { day, offset, source })?;
                return Ok(PageOutcome::Hits(page.hits));
            }

            if is_transient(status) && retries_left {
                warn!(%day, offset, attempt, status = status.as_u16(), "transient job search failure; retrying");
                continue;
            }
            return Ok(PageOutcome::Rejected(status));
        }
    }
}

fn is_transient(status: StatusCode) -> bool {
    status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transient_statuses_are_rate_limits_and_server_errors() {
        assert!(is_transient(StatusCode::TOO_MANY_REQUESTS));
        assert!(is_transient(StatusCode::SERVICE_UNAVAILABLE));
        assert!(!is_transient(StatusCode::BAD_REQUEST));
        assert!(!is_transient(StatusCode::NOT_FOUND));
    }

    #[test]
    fn search_page_tolerates_missing_hits() {
        let page: SearchPage = serde_json::from_str(r#"{"total":{"value":0}}"#).expect("page json");
        assert!(page.hits.is_empty());
    }
}
