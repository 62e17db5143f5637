//! Fetch collaborator for the daily archive.
//!
//! - [`fetcher`] - HTTP retrieval with timeout, retry and size limits, and
//!   the choice between site pages and the archive
//! - [`parser`] - Lenient JSON parsing into [`Item`](crate::model::Item)s
//! - [`page`] - HTML scraping of the site's listing pages
//!
//! ```ignore
//! let items = fetch_stories(&client, &sources, date, Some(today), FetchOptions::default()).await?;
//! ```

mod fetcher;
mod page;
mod parser;

pub use fetcher::{
    day_url, fetch_day, fetch_page_day, fetch_stories, is_recent, page_url, FetchError,
    FetchOptions, Sources, DEFAULT_BASE_URL, DEFAULT_SITE_URL,
};
pub use page::{parse_page, PageStories};
pub use parser::{parse_day, ParseError, ParseResult};
