use std::time::Duration;

use chromiumoxide::browser::{Browser as CrBrowser, BrowserConfig as CrBrowserConfig};
use chromiumoxide::handler::viewport::Viewport;
use futures::StreamExt;

use crate::config::{ConsoleBuilder, ConsoleConfig};
use crate::error::{Error, Result};
use crate::page::LivePage;

/// Chrome flags that cut startup time without affecting page behavior.
const PERF_ARGS: &[&str] = &[
    "disable-gpu",
    "disable-extensions",
    "mute-audio",
    "no-default-browser-check",
    "no-first-run",
    "disable-popup-blocking",
];

/// A headless Chrome used to drive the demo page itself.
pub struct ConsoleBrowser {
    browser: CrBrowser,
    page_timeout: Duration,
    alert_duration: Duration,
    handler_task: tokio::task::JoinHandle<()>,
}

impl ConsoleBrowser {
    pub fn builder() -> ConsoleBuilder {
        ConsoleBuilder::new()
    }

    /// Launch a browser instance with the given configuration.
    pub async fn launch(config: ConsoleConfig) -> Result<Self> {
        let mut builder = CrBrowserConfig::builder();

        if config.headless {
            builder = builder.new_headless_mode().no_sandbox();
        } else {
            builder = builder.with_head().no_sandbox();
        }

        // chromiumoxide adds the `--` prefix itself
        for arg in PERF_ARGS {
            builder = builder.arg(*arg);
        }

        if let Some(ref path) = config.chrome_path {
            builder = builder.chrome_executable(path);
        }

        builder = builder.viewport(Viewport {
            width: config.viewport_width,
            height: config.viewport_height,
            device_scale_factor: None,
            emulating_mobile: false,
            is_landscape: false,
            has_touch: false,
        });

        let cr_config = builder
            .build()
            .map_err(|e| Error::LaunchError(e.to_string()))?;

        let (browser, mut handler) = CrBrowser::launch(cr_config)
            .await
            .map_err(|e| Error::LaunchError(e.to_string()))?;

        let handler_task = tokio::spawn(async move {
            while let Some(_event) = handler.next().await {}
        });

        tracing::debug!(headless = config.headless, "browser launched");

        Ok(Self {
            browser,
            page_timeout: config.page_timeout,
            alert_duration: config.alert_duration,
            handler_task,
        })
    }

    /// Open a new tab on `url`.
    pub async fn open(&self, url: &str) -> Result<LivePage> {
        let cr_page = self
            .browser
            .new_page(url)
            .await
            .map_err(|e| Error::NavigationError(e.to_string()))?;

        Ok(LivePage::new(cr_page, self.page_timeout, self.alert_duration))
    }

    /// Close Chrome and wait for the process to exit.
    ///
    /// Dropping a `ConsoleBrowser` only signals the child to die; call this
    /// before the process ends so no Chrome is left running.
    pub async fn close(mut self) -> Result<()> {
        self.browser
            .close()
            .await
            .map_err(|e| Error::ShutdownError(e.to_string()))?;
        self.browser
            .wait()
            .await
            .map_err(|e| Error::ShutdownError(e.to_string()))?;
        self.handler_task.abort();
        tracing::debug!("browser closed");
        Ok(())
    }
}
