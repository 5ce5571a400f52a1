use std::time::Duration;

use url::Url;

use crate::dispatch::RequestDispatcher;
use crate::error::Result;
use crate::ui::UiPort;

/// Default server the demo page is served from.
pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:5000";

#[derive(Debug, Clone)]
pub struct ConsoleConfig {
    /// Base URL that endpoint paths such as `/api/satset/encounter` are joined onto.
    pub base_url: String,
    /// How long an alert stays visible before it dismisses itself (default: 4s).
    pub alert_duration: Duration,
    /// Optional per-request timeout. `None` means a hung request keeps the
    /// loading badge shown until it settles.
    pub request_timeout: Option<Duration>,
    pub headless: bool,
    pub chrome_path: Option<String>,
    pub viewport_width: u32,
    pub viewport_height: u32,
    /// Default timeout for live-page operations like `wait_for_selector` (default: 30s).
    pub page_timeout: Duration,
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            alert_duration: Duration::from_secs(4),
            request_timeout: None,
            headless: true,
            chrome_path: None,
            viewport_width: 1280,
            viewport_height: 900,
            page_timeout: Duration::from_secs(30),
        }
    }
}

impl ConsoleConfig {
    /// Parse the configured base URL.
    pub fn base_url(&self) -> Result<Url> {
        Ok(Url::parse(&self.base_url)?)
    }
}

pub struct ConsoleBuilder {
    config: ConsoleConfig,
}

impl ConsoleBuilder {
    pub fn new() -> Self {
        Self {
            config: ConsoleConfig::default(),
        }
    }

    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.config.base_url = base_url.into();
        self
    }

    pub fn alert_duration(mut self, duration: Duration) -> Self {
        self.config.alert_duration = duration;
        self
    }

    /// Abort requests that take longer than `timeout`.
    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.config.request_timeout = Some(timeout);
        self
    }

    pub fn headless(mut self, headless: bool) -> Self {
        self.config.headless = headless;
        self
    }

    pub fn chrome_path(mut self, path: impl Into<String>) -> Self {
        self.config.chrome_path = Some(path.into());
        self
    }

    pub fn viewport(mut self, width: u32, height: u32) -> Self {
        self.config.viewport_width = width;
        self.config.viewport_height = height;
        self
    }

    /// Set the default timeout for live-page operations like `wait_for_selector`.
    pub fn page_timeout(mut self, timeout: Duration) -> Self {
        self.config.page_timeout = timeout;
        self
    }

    pub fn build_config(self) -> ConsoleConfig {
        self.config
    }

    /// Build a dispatcher that renders into `ui`.
    pub fn dispatcher<U: UiPort>(self, ui: U) -> Result<RequestDispatcher<U>> {
        RequestDispatcher::new(&self.build_config(), ui)
    }
}

impl Default for ConsoleBuilder {
    fn default() -> Self {
        Self::new()
    }
}
