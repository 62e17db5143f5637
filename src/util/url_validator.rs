use thiserror::Error;
use url::Url;

/// Errors that can occur during URL validation.
#[derive(Error, Debug)]
pub enum UrlValidationError {
    /// The URL string could not be parsed.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
    /// The URL uses a scheme other than http or https.
    #[error("Unsupported scheme: {0} (only http/https allowed)")]
    UnsupportedScheme(String),
    /// The URL has no host component.
    #[error("URL has no host")]
    MissingHost,
    /// A base URL carried a query string or fragment.
    #[error("Base URL must not contain a query or fragment")]
    UnexpectedQuery,
}

fn parse_web_url(url_str: &str) -> Result<Url, UrlValidationError> {
    let url = Url::parse(url_str.trim())?;

    match url.scheme() {
        "http" | "https" => {}
        scheme => return Err(UrlValidationError::UnsupportedScheme(scheme.to_owned())),
    }

    if url.host_str().map_or(true, str::is_empty) {
        return Err(UrlValidationError::MissingHost);
    }

    Ok(url)
}

/// Validates a story or comments URL before handing it to the system browser.
///
/// Story links come from a remote archive, so anything that is not a plain
/// web address (`file://`, `javascript:`, custom handlers) is refused.
///
/// ```
/// use hckr::util::validate_url_for_open;
///
/// assert!(validate_url_for_open("https://news.ycombinator.com/item?id=1").is_ok());
/// assert!(validate_url_for_open("file:///etc/passwd").is_err());
/// assert!(validate_url_for_open("javascript:alert(1)").is_err());
/// ```
pub fn validate_url_for_open(url_str: &str) -> Result<Url, UrlValidationError> {
    parse_web_url(url_str)
}

/// Validates the archive base URL from config and normalizes it without a
/// trailing slash, ready for `{base}/{YYYYMMDD}.js`.
///
/// Local addresses are accepted so a mirror or test server can stand in for
/// the public archive.
pub fn validate_base_url(url_str: &str) -> Result<String, UrlValidationError> {
    let url = parse_web_url(url_str)?;
    if url.query().is_some() || url.fragment().is_some() {
        return Err(UrlValidationError::UnexpectedQuery);
    }
    Ok(url.as_str().trim_end_matches('/').to_string())
}
