//! Utility functions for common operations.
//!
//! - **URL validation**: only plain web links are handed to the browser
//! - **Text processing**: terminal-safe titles and width-aware truncation
//! - **Time**: compact relative timestamps and archive-day boundaries

mod text;
mod time;
mod url_validator;

pub use text::{display_width, fit_to_width, sanitize_line, truncate_to_width};
pub use time::{archive_day, day_start, format_clock, format_relative_time};
pub use url_validator::{validate_base_url, validate_url_for_open, UrlValidationError};
