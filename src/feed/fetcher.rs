use crate::cache::FailureReason;
use crate::feed::page::parse_page;
use crate::feed::parser::{parse_day, ParseResult};
use crate::model::{dedupe, Item};
use crate::util::day_start;
use chrono::NaiveDate;
use chrono_tz::Tz;
use futures::StreamExt;
use std::time::Duration;
use thiserror::Error;

/// Public archive endpoint. Days are served as `{base}/YYYYMMDD.js`.
pub const DEFAULT_BASE_URL: &str = "https://hckrnews.com/data";

/// Site whose listing pages are scraped for the most recent days.
pub const DEFAULT_SITE_URL: &str = "https://hckrnews.com";

const MAX_DAY_SIZE: usize = 10 * 1024 * 1024; // 10MB, pages included

/// Errors that can occur while fetching one day.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Network-level error (DNS, connection, TLS, etc.)
    #[error("Request failed: {0}")]
    Network(#[from] reqwest::Error),
    /// HTTP response with non-2xx status code
    #[error("HTTP error: status {0}")]
    HttpStatus(u16),
    /// Request exceeded the configured timeout
    #[error("Request timed out")]
    Timeout,
    /// Server returned 429 Too Many Requests after max retries
    #[error("Rate limited after {0} retries")]
    RateLimited(u32),
    /// Response body exceeded the 10MB size limit
    #[error("Response too large")]
    ResponseTooLarge,
    /// Response was incomplete (received fewer bytes than Content-Length)
    #[error("Incomplete response: expected {expected} bytes, received {received}")]
    IncompleteResponse { expected: u64, received: usize },
    /// Body was not a JSON array of stories
    #[error("Malformed response: {0}")]
    Malformed(String),
    /// Valid body with no usable stories
    #[error("No stories for this day")]
    Empty,
}

impl FetchError {
    /// Collapse the detailed error into what the day cache records.
    pub fn failure(&self) -> FailureReason {
        match self {
            Self::Network(_)
            | Self::HttpStatus(_)
            | Self::Timeout
            | Self::RateLimited(_)
            | Self::IncompleteResponse { .. } => FailureReason::NetworkError,
            Self::ResponseTooLarge | Self::Malformed(_) => FailureReason::MalformedResponse,
            Self::Empty => FailureReason::EmptyResponse,
        }
    }
}

/// Timeout and retry policy for [`fetch_day`].
#[derive(Debug, Clone, Copy)]
pub struct FetchOptions {
    pub timeout: Duration,
    pub max_retries: u32,
    /// First backoff delay; doubles on every retry.
    pub backoff: Duration,
}

impl Default for FetchOptions {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            max_retries: 3,
            backoff: Duration::from_secs(1),
        }
    }
}

impl FetchOptions {
    fn delay(&self, retry: u32) -> Duration {
        self.backoff.saturating_mul(2u32.saturating_pow(retry)) // 1s, 2s, 4s
    }
}

/// URL of the archive file for `date`.
pub fn day_url(base_url: &str, date: NaiveDate) -> String {
    format!(
        "{}/{}.js",
        base_url.trim_end_matches('/'),
        date.format("%Y%m%d")
    )
}

/// Fetch and parse one day of the archive.
///
/// # Errors
///
/// - [`FetchError::Network`] - Connection or TLS errors
/// - [`FetchError::Timeout`] - A request exceeded `options.timeout`
/// - [`FetchError::HttpStatus`] - Non-2xx response (5xx only after retries)
/// - [`FetchError::RateLimited`] - 429 response after max retries
/// - [`FetchError::ResponseTooLarge`] - Body exceeded 10MB
/// - [`FetchError::Malformed`] - Body was not a JSON array
/// - [`FetchError::Empty`] - No titled stories in the body
pub async fn fetch_day(
    client: &reqwest::Client,
    base_url: &str,
    date: NaiveDate,
    options: FetchOptions,
) -> Result<Vec<Item>, FetchError> {
    let bytes = fetch_bytes(client, &day_url(base_url, date), options).await?;

    let ParseResult { items, skipped } =
        parse_day(&bytes).map_err(|e| FetchError::Malformed(e.to_string()))?;

    if skipped > 0 {
        tracing::debug!(%date, skipped, "Entries without a title skipped");
    }
    if items.is_empty() {
        return Err(FetchError::Empty);
    }

    tracing::info!(%date, count = items.len(), "Fetched day");
    Ok(items)
}

/// URL of the site page listing `date`: the front page for `today`, a dated
/// page otherwise.
pub fn page_url(site_url: &str, date: NaiveDate, today: NaiveDate) -> String {
    let site_url = site_url.trim_end_matches('/');
    if date == today {
        format!("{}/", site_url)
    } else {
        format!("{}/{}", site_url, date.format("%Y%m%d"))
    }
}

/// Scrape one day from the site's listing pages.
///
/// For `today` the front page is used and only stories above its first day
/// separator that were submitted after midnight in `tz` are kept.
///
/// # Errors
///
/// Same transport errors as [`fetch_day`]; [`FetchError::Empty`] when the
/// page lists no stories for `date`.
pub async fn fetch_page_day(
    client: &reqwest::Client,
    site_url: &str,
    date: NaiveDate,
    today: NaiveDate,
    tz: Tz,
    options: FetchOptions,
) -> Result<Vec<Item>, FetchError> {
    let bytes = fetch_bytes(client, &page_url(site_url, date, today), options).await?;
    let html = String::from_utf8_lossy(&bytes);
    let page = parse_page(&html).map_err(|e| FetchError::Malformed(e.to_string()))?;

    if page.skipped > 0 {
        tracing::debug!(%date, skipped = page.skipped, "Job ads and untitled rows skipped");
    }

    let items = if date == today {
        let midnight = day_start(today, tz);
        page.current
            .into_iter()
            .filter(|item| item.submitted_at >= midnight)
            .collect()
    } else {
        page.into_all()
    };

    let items = dedupe(items);
    if items.is_empty() {
        return Err(FetchError::Empty);
    }

    tracing::info!(%date, count = items.len(), "Scraped day from site");
    Ok(items)
}

/// Where day listings are read from.
#[derive(Debug, Clone)]
pub struct Sources {
    /// Archive endpoint for [`fetch_day`].
    pub data_url: String,
    /// Site root for [`fetch_page_day`].
    pub site_url: String,
    /// Timezone the archive's days are cut in.
    pub timezone: Tz,
}

/// True for `today` and the day before it.
pub fn is_recent(date: NaiveDate, today: NaiveDate) -> bool {
    date == today || today.pred_opt() == Some(date)
}

/// Fetch the stories for `date`.
///
/// The two most recent days are scraped from the site, whose pages carry the
/// homepage flag and leave out job ads. If that fails the archive file is
/// used instead. Older days, or any day when `today` is unknown, come from
/// the archive directly.
pub async fn fetch_stories(
    client: &reqwest::Client,
    sources: &Sources,
    date: NaiveDate,
    today: Option<NaiveDate>,
    options: FetchOptions,
) -> Result<Vec<Item>, FetchError> {
    if let Some(today) = today.filter(|today| is_recent(date, *today)) {
        match fetch_page_day(client, &sources.site_url, date, today, sources.timezone, options)
            .await
        {
            Ok(items) => return Ok(items),
            Err(e) => {
                tracing::warn!(%date, error = %e, "Site page unavailable, falling back to archive");
            }
        }
    }
    fetch_day(client, &sources.data_url, date, options).await
}

/// GET `url` with the timeout, retry and size policy in `options`.
async fn fetch_bytes(
    client: &reqwest::Client,
    url: &str,
    options: FetchOptions,
) -> Result<Vec<u8>, FetchError> {
    let mut retry_count = 0;

    loop {
        let response = tokio::time::timeout(options.timeout, client.get(url).send())
            .await
            .map_err(|_| FetchError::Timeout)?
            .map_err(FetchError::Network)?;

        let status = response.status();

        if status == reqwest::StatusCode::TOO_MANY_REQUESTS || status.is_server_error() {
            if retry_count >= options.max_retries {
                return Err(if status.is_server_error() {
                    FetchError::HttpStatus(status.as_u16())
                } else {
                    FetchError::RateLimited(options.max_retries)
                });
            }

            let delay = options.delay(retry_count);
            tracing::warn!(
                %url,
                %status,
                retry = retry_count,
                delay_ms = delay.as_millis() as u64,
                "Request failed, backing off"
            );
            tokio::time::sleep(delay).await;
            retry_count += 1;
            continue;
        }

        if !status.is_success() {
            return Err(FetchError::HttpStatus(status.as_u16()));
        }

        match read_limited_bytes(response, MAX_DAY_SIZE).await {
            Ok(bytes) => return Ok(bytes),
            Err(FetchError::IncompleteResponse { expected, received })
                if retry_count < options.max_retries =>
            {
                let delay = options.delay(retry_count);
                tracing::debug!(
                    %url,
                    expected,
                    received,
                    attempt = retry_count + 1,
                    "Retrying incomplete download"
                );
                tokio::time::sleep(delay).await;
                retry_count += 1;
            }
            Err(e) => return Err(e),
        }
    }
}

async fn read_limited_bytes(
    response: reqwest::Response,
    limit: usize,
) -> Result<Vec<u8>, FetchError> {
    let expected_length = response.content_length();

    if let Some(len) = expected_length {
        if len > limit as u64 {
            return Err(FetchError::ResponseTooLarge);
        }
    }

    let mut bytes = Vec::with_capacity(expected_length.unwrap_or(0) as usize);
    let mut stream = response.bytes_stream();

    while let Some(chunk) = stream.next().await {
        let chunk = chunk.map_err(FetchError::Network)?;
        if bytes.len().saturating_add(chunk.len()) > limit {
            return Err(FetchError::ResponseTooLarge);
        }
        bytes.extend_from_slice(&chunk);
    }

    if let Some(expected) = expected_length {
        if (bytes.len() as u64) < expected {
            return Err(FetchError::IncompleteResponse {
                expected,
                received: bytes.len(),
            });
        }
    }

    Ok(bytes)
}
