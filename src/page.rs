use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use chromiumoxide::page::Page as CrPage;
use serde_json::Value;

use crate::autofill::Scenario;
use crate::error::{Error, Result};
use crate::form::{Form, FormField};
use crate::ui::{render_result, AlertLevel, ResultStatus, UiPort};

/// Element id of the alert banner.
pub const ALERT_BOX_ID: &str = "alertBox";
/// Element id of the loading badge.
pub const LOADING_BADGE_ID: &str = "loadingBadge";

/// The demo page open in a browser tab.
///
/// Reads and fills its `<form>` elements, and implements [`UiPort`] by
/// writing to the page's alert banner, loading badge and result slots.
#[derive(Clone)]
pub struct LivePage {
    inner: CrPage,
    default_timeout: Duration,
    alert_duration: Duration,
}

impl LivePage {
    pub(crate) fn new(inner: CrPage, default_timeout: Duration, alert_duration: Duration) -> Self {
        Self {
            inner,
            default_timeout,
            alert_duration,
        }
    }

    /// Returns a reference to the underlying chromiumoxide Page.
    pub fn inner(&self) -> &CrPage {
        &self.inner
    }

    // ── Queries ─────────────────────────────────────────────────────

    /// Wait for an element matching `selector` to appear in the DOM.
    /// Polls every 100ms up to the configured page timeout.
    pub async fn wait_for_selector(&self, selector: &str) -> Result<()> {
        let interval = Duration::from_millis(100);
        let start = std::time::Instant::now();

        loop {
            match self.inner.find_element(selector).await {
                Ok(_) => return Ok(()),
                Err(_) if start.elapsed() < self.default_timeout => {
                    tokio::time::sleep(interval).await;
                }
                Err(_) => {
                    return Err(Error::NavigationError(format!(
                        "Timed out waiting for selector: {selector}"
                    )));
                }
            }
        }
    }

    /// Text content of the element with the given id, `None` if it does not exist.
    pub async fn text_of(&self, id: &str) -> Result<Option<String>> {
        let id_js = serde_json::to_string(id)?;
        let js = format!(
            r#"(() => {{
                const el = document.getElementById({id_js});
                return el ? el.textContent : null;
            }})()"#
        );
        let value = self.eval(&js).await?;
        Ok(value.as_str().map(str::to_string))
    }

    // ── Forms ───────────────────────────────────────────────────────

    /// Read a form's entries the way `FormData` sees them.
    pub async fn read_form(&self, form_id: &str) -> Result<Form> {
        let id_js = serde_json::to_string(form_id)?;
        let js = format!(
            r#"JSON.stringify((() => {{
                const form = document.getElementById({id_js});
                if (!form) return null;
                return Array.from(new FormData(form).entries())
                    .filter(([, value]) => typeof value === 'string')
                    .map(([name, value]) => ({{ name, value }}));
            }})())"#
        );
        let json_str: String = self
            .inner
            .evaluate(js)
            .await
            .map_err(|e| Error::JsError(e.to_string()))?
            .into_value()
            .map_err(|e| Error::JsError(e.to_string()))?;

        let fields: Option<Vec<FormField>> = serde_json::from_str(&json_str)?;
        let fields = fields.ok_or_else(|| Error::UnknownForm(form_id.to_string()))?;
        Ok(Form::from_fields(form_id, fields))
    }

    /// Write `scenario` into the live form, skipping fields it does not have.
    /// Returns the number of fields written.
    pub async fn autofill(&self, form_id: &str, scenario: Scenario, now: DateTime<Utc>) -> Result<usize> {
        let id_js = serde_json::to_string(form_id)?;
        let values: serde_json::Map<String, Value> = scenario
            .values(now)
            .into_iter()
            .map(|(name, value)| (name.to_string(), Value::String(value)))
            .collect();
        let values_js = serde_json::to_string(&values)?;
        let js = format!(
            r#"(() => {{
                const form = document.getElementById({id_js});
                if (!form) return -1;
                let written = 0;
                for (const [name, value] of Object.entries({values_js})) {{
                    const el = form.querySelector(`[name="${{name}}"]`);
                    if (el) {{ el.value = value; written++; }}
                }}
                return written;
            }})()"#
        );
        let written = self.eval(&js).await?.as_i64().unwrap_or(-1);
        if written < 0 {
            return Err(Error::UnknownForm(form_id.to_string()));
        }
        tracing::debug!(scenario = %scenario, form = form_id, written, "autofill applied in page");
        Ok(written as usize)
    }

    async fn eval(&self, js: &str) -> Result<Value> {
        let result = self
            .inner
            .evaluate(js)
            .await
            .map_err(|e| Error::JsError(e.to_string()))?;
        Ok(result.value().cloned().unwrap_or(Value::Null))
    }

    /// Run a UI update; the page missing an element is not an error.
    async fn render(&self, js: String) {
        if let Err(e) = self.eval(&js).await {
            tracing::warn!(error = %e, "failed to update page UI");
        }
    }
}

#[async_trait]
impl UiPort for LivePage {
    async fn show_alert(&self, message: &str, level: AlertLevel) {
        let Ok(message_js) = serde_json::to_string(message) else {
            return;
        };
        let ms = self.alert_duration.as_millis();
        let js = format!(
            r#"(() => {{
                const box = document.getElementById('{ALERT_BOX_ID}');
                if (!box) return;
                box.className = 'alert alert-{level}';
                box.textContent = {message_js};
                box.classList.remove('d-none');
                const seq = (window.__alertSeq || 0) + 1;
                window.__alertSeq = seq;
                setTimeout(() => {{
                    if (window.__alertSeq === seq) box.classList.add('d-none');
                }}, {ms});
            }})()"#
        );
        self.render(js).await;
    }

    async fn show_loading(&self) {
        let js = format!(
            r#"(() => {{
                const badge = document.getElementById('{LOADING_BADGE_ID}');
                if (badge) badge.classList.remove('d-none');
            }})()"#
        );
        self.render(js).await;
    }

    async fn hide_loading(&self) {
        let js = format!(
            r#"(() => {{
                const badge = document.getElementById('{LOADING_BADGE_ID}');
                if (badge) badge.classList.add('d-none');
            }})()"#
        );
        self.render(js).await;
    }

    async fn show_result(&self, slot: &str, data: &Value, status: ResultStatus) {
        let (Ok(slot_js), Ok(text_js)) = (
            serde_json::to_string(slot),
            serde_json::to_string(&render_result(data, status)),
        ) else {
            return;
        };
        let js = format!(
            r#"(() => {{
                const box = document.getElementById({slot_js});
                if (!box) return;
                box.style.display = 'block';
                box.textContent = {text_js};
            }})()"#
        );
        self.render(js).await;
    }
}
