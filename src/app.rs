use crate::config::Config;
use crate::feed::{FetchError, FetchOptions, Sources};
use crate::keybindings::KeybindingRegistry;
use crate::model::Item;
use crate::nav::{DayStatus, Navigator};
use crate::theme::{StyleMap, ThemeVariant};
use crate::util::{archive_day, validate_base_url};
use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDate, Utc};
use chrono_tz::Tz;
use ratatui::style::Style;
use ratatui::widgets::TableState;
use reqwest::redirect::Policy;
use std::borrow::Cow;
use std::collections::HashMap;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::Instant;

/// How long a status message stays visible.
const STATUS_TTL: Duration = Duration::from_secs(3);

// ============================================================================
// Background Events
// ============================================================================

/// Messages posted by background tasks to the UI loop.
#[derive(Debug)]
pub enum AppEvent {
    /// A day fetch finished. `generation` is the one the cache issued with
    /// the request; the cache drops the result if it no longer matches.
    DayFetched {
        date: NaiveDate,
        generation: u64,
        result: Result<Vec<Item>, FetchError>,
    },
    /// A day fetch task panicked instead of reporting a result.
    TaskPanicked {
        task: &'static str,
        date: NaiveDate,
        generation: u64,
        error: String,
    },
}

// ============================================================================
// HTTP Client Configuration
// ============================================================================

/// Redirect policy for archive requests.
///
/// - Limits redirects to 3 hops maximum
/// - Detects redirect loops (same URL appearing twice in chain)
fn create_redirect_policy() -> Policy {
    Policy::custom(|attempt| {
        if attempt.previous().len() >= 3 {
            return attempt.error("Too many redirects (max 3)");
        }

        let url = attempt.url();
        if attempt.previous().iter().any(|prev| prev.as_str() == url.as_str()) {
            return attempt.error("Redirect loop detected");
        }

        tracing::debug!(
            from = %attempt.previous().last().map(|u| u.as_str()).unwrap_or("initial"),
            to = %url,
            hop = attempt.previous().len() + 1,
            "Following redirect"
        );

        attempt.follow()
    })
}

fn build_http_client(options: &FetchOptions) -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .user_agent(concat!("hckr/", env!("CARGO_PKG_VERSION")))
        .redirect(create_redirect_policy())
        .pool_max_idle_per_host(4)
        .pool_idle_timeout(Duration::from_secs(30))
        .tcp_keepalive(Duration::from_secs(60))
        // Per-attempt timeout is enforced in fetch_day; this bounds the whole
        // exchange in case a body stalls mid-stream.
        .timeout(options.timeout.saturating_mul(2))
        .build()
        .context("Failed to build HTTP client")
}

/// Calendar day the archive is currently filling, in its own timezone.
pub fn archive_today(tz: Tz) -> NaiveDate {
    archive_day(Utc::now(), tz)
}

// ============================================================================
// Application State
// ============================================================================

pub struct App {
    pub nav: Navigator,

    // Fetching
    pub http_client: reqwest::Client,
    /// Archive and site endpoints plus the archive timezone, which is also
    /// used for the time column.
    pub sources: Sources,
    pub fetch_options: FetchOptions,
    /// In-flight fetch tasks, one per date, with the generation they serve.
    pub fetch_handles: HashMap<NaiveDate, (u64, JoinHandle<()>)>,

    // Presentation
    pub theme_variant: ThemeVariant,
    pub theme: StyleMap,
    pub keybindings: KeybindingRegistry,
    pub table_state: TableState,
    pub status_message: Option<(Cow<'static, str>, Instant)>,
    pub needs_redraw: bool,
    pub spinner_frame: usize,
    pub show_help: bool,
    pub help_scroll_offset: usize,
}

impl App {
    /// Build the application shell around `nav` using `config` for the
    /// archive endpoint, theme and key overrides.
    ///
    /// # Errors
    ///
    /// Fails if `config.base_url` or `config.site_url` is not a usable
    /// http(s) URL or the HTTP client cannot be constructed.
    pub fn new(config: &Config, nav: Navigator) -> Result<Self> {
        let data_url = validate_base_url(&config.base_url)
            .with_context(|| format!("Invalid base_url '{}'", config.base_url))?;
        let site_url = validate_base_url(&config.site_url)
            .with_context(|| format!("Invalid site_url '{}'", config.site_url))?;
        let sources = Sources {
            data_url,
            site_url,
            timezone: config.archive_timezone(),
        };
        let fetch_options = config.fetch_options();
        let http_client = build_http_client(&fetch_options)?;

        let theme_variant = ThemeVariant::from_str_name(&config.theme).unwrap_or_else(|| {
            tracing::warn!(theme = %config.theme, "Unknown theme, using dark");
            ThemeVariant::default()
        });

        let mut keybindings = KeybindingRegistry::new();
        for warning in keybindings.apply_overrides(&config.keybindings) {
            tracing::warn!("{}", warning);
        }

        Ok(Self {
            nav,
            http_client,
            sources,
            fetch_options,
            fetch_handles: HashMap::new(),
            theme_variant,
            theme: StyleMap::from_palette(&theme_variant.palette()),
            keybindings,
            table_state: TableState::default(),
            status_message: None,
            needs_redraw: true,
            spinner_frame: 0,
            show_help: false,
            help_scroll_offset: 0,
        })
    }

    pub fn style(&self, role: &str) -> Style {
        self.theme.resolve(role)
    }

    /// Switch to a different theme variant at runtime.
    pub fn set_theme(&mut self, variant: ThemeVariant) {
        self.theme_variant = variant;
        self.theme = StyleMap::from_palette(&variant.palette());
        self.needs_redraw = true;
    }

    /// Cycle to the next theme variant. Returns its name for the status bar.
    pub fn cycle_theme(&mut self) -> &'static str {
        let next = self.theme_variant.next();
        self.set_theme(next);
        next.name()
    }

    pub fn set_status(&mut self, msg: impl Into<Cow<'static, str>>) {
        self.status_message = Some((msg.into(), Instant::now()));
    }

    /// Clear the status message once it is older than three seconds.
    /// Returns true if a message was actually cleared.
    pub fn clear_expired_status(&mut self) -> bool {
        if let Some((_, time)) = &self.status_message {
            if time.elapsed() >= STATUS_TTL {
                self.status_message = None;
                return true;
            }
        }
        false
    }

    pub fn is_loading(&self) -> bool {
        self.nav.status() == DayStatus::Loading
    }

    /// Advance the latest published day once the archive rolls over.
    ///
    /// Only a navigator that is bounded by a latest day is touched, and the
    /// bound only moves forward. Returns whether it moved.
    pub fn refresh_latest(&mut self, now: DateTime<Utc>) -> bool {
        let today = archive_day(now, self.sources.timezone);
        match self.nav.latest() {
            Some(latest) if today > latest => {
                self.nav.set_latest(today);
                self.needs_redraw = true;
                true
            }
            _ => false,
        }
    }

    /// Forget the task handle for `date` if it belongs to `generation`.
    pub fn release_fetch(&mut self, date: NaiveDate, generation: u64) {
        if self
            .fetch_handles
            .get(&date)
            .is_some_and(|(g, _)| *g == generation)
        {
            self.fetch_handles.remove(&date);
        }
    }

    /// Abort every in-flight fetch. Called on shutdown.
    pub fn abort_fetches(&mut self) {
        for (date, (generation, handle)) in self.fetch_handles.drain() {
            tracing::debug!(%date, generation, "Aborting fetch task");
            handle.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keybindings::Action;
    use crate::nav::NavOptions;
    use chrono::TimeZone;
    use crossterm::event::{KeyCode, KeyModifiers};
    use tokio::time;

    fn nav() -> Navigator {
        Navigator::new(
            NaiveDate::from_ymd_opt(2024, 5, 1).unwrap(),
            NavOptions::default(),
        )
    }

    fn test_app() -> App {
        App::new(&Config::default(), nav()).unwrap()
    }

    #[tokio::test]
    async fn test_new_uses_config_defaults() {
        let app = test_app();
        assert_eq!(app.sources.data_url, "https://hckrnews.com/data");
        assert_eq!(app.sources.site_url, "https://hckrnews.com");
        assert_eq!(app.sources.timezone, chrono_tz::America::Los_Angeles);
        assert_eq!(app.theme_variant, ThemeVariant::Dark);
        assert!(app.needs_redraw);
        assert!(app.is_loading());
    }

    #[tokio::test]
    async fn test_new_rejects_bad_base_url() {
        let config = Config {
            base_url: "ftp://example.com/data".to_string(),
            ..Config::default()
        };
        let err = App::new(&config, nav()).err().unwrap();
        assert!(err.to_string().contains("Invalid base_url"));
    }

    #[tokio::test]
    async fn test_new_normalizes_base_url() {
        let config = Config {
            base_url: "http://127.0.0.1:9000/data/".to_string(),
            ..Config::default()
        };
        let app = App::new(&config, nav()).unwrap();
        assert_eq!(app.sources.data_url, "http://127.0.0.1:9000/data");
    }

    #[tokio::test]
    async fn test_unknown_theme_falls_back_to_dark() {
        let config = Config {
            theme: "solarized".to_string(),
            ..Config::default()
        };
        let app = App::new(&config, nav()).unwrap();
        assert_eq!(app.theme_variant, ThemeVariant::Dark);
    }

    #[tokio::test]
    async fn test_keybinding_overrides_applied() {
        let mut config = Config::default();
        config
            .keybindings
            .insert("refresh".to_string(), "F5".to_string());
        let app = App::new(&config, nav()).unwrap();
        assert_eq!(
            app.keybindings
                .action_for_key(KeyCode::F(5), KeyModifiers::NONE),
            Some(Action::Refresh)
        );
    }

    #[tokio::test]
    async fn test_cycle_theme() {
        let mut app = test_app();
        app.needs_redraw = false;
        assert_eq!(app.cycle_theme(), "Light");
        assert_eq!(app.theme_variant, ThemeVariant::Light);
        assert!(app.needs_redraw);
        assert_eq!(app.cycle_theme(), "Dark");
    }

    #[tokio::test]
    async fn test_status_expires_after_3_seconds() {
        let mut app = test_app();
        time::pause();
        app.set_status("Test message");

        time::advance(Duration::from_secs(2)).await;
        assert!(!app.clear_expired_status());
        assert!(app.status_message.is_some());

        time::advance(Duration::from_secs(2)).await;
        assert!(app.clear_expired_status());
        assert!(app.status_message.is_none());
    }

    #[tokio::test]
    async fn test_abort_fetches_drains_handles() {
        let mut app = test_app();
        let date = app.nav.current_date();
        app.fetch_handles
            .insert(date, (1, tokio::spawn(std::future::pending::<()>())));
        app.abort_fetches();
        assert!(app.fetch_handles.is_empty());
    }

    #[tokio::test]
    async fn test_release_fetch_matches_generation() {
        let mut app = test_app();
        let date = app.nav.current_date();
        app.fetch_handles
            .insert(date, (7, tokio::spawn(std::future::pending::<()>())));

        app.release_fetch(date, 6);
        assert!(app.fetch_handles.contains_key(&date));
        app.release_fetch(date, 7);
        assert!(app.fetch_handles.is_empty());
    }

    #[tokio::test]
    async fn test_new_rejects_bad_site_url() {
        let config = Config {
            site_url: "not a url".to_string(),
            ..Config::default()
        };
        let err = App::new(&config, nav()).err().unwrap();
        assert!(err.to_string().contains("Invalid site_url"));
    }

    #[tokio::test]
    async fn test_refresh_latest_follows_midnight() {
        let may_1 = NaiveDate::from_ymd_opt(2024, 5, 1).unwrap();
        let nav = Navigator::new(
            may_1,
            NavOptions {
                latest: Some(may_1),
                ..NavOptions::default()
            },
        );
        let mut app = App::new(&Config::default(), nav).unwrap();
        app.needs_redraw = false;

        // 23:30 PDT on May 1
        let before = Utc.with_ymd_and_hms(2024, 5, 2, 6, 30, 0).unwrap();
        assert!(!app.refresh_latest(before));
        assert!(!app.nav.can_go_forward());

        // 00:30 PDT on May 2
        let after = Utc.with_ymd_and_hms(2024, 5, 2, 7, 30, 0).unwrap();
        assert!(app.refresh_latest(after));
        assert!(app.needs_redraw);
        assert_eq!(app.nav.latest(), NaiveDate::from_ymd_opt(2024, 5, 2));

        // The bound never moves back
        assert!(!app.refresh_latest(before));
        assert_eq!(app.nav.latest(), NaiveDate::from_ymd_opt(2024, 5, 2));
    }

    #[tokio::test]
    async fn test_refresh_latest_leaves_unbounded_navigator() {
        let mut app = test_app();
        assert!(!app.refresh_latest(Utc::now()));
        assert_eq!(app.nav.latest(), None);
    }
}
