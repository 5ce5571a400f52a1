//! The UI surface a dispatch renders into: one alert banner, one loading
//! badge and any number of result slots.
//!
//! [`UiPort`] is implemented by [`MemoryUi`] (tests and embedding),
//! [`TerminalUi`] (the CLI) and [`crate::page::LivePage`] (the real demo page).

use std::collections::{HashMap, HashSet, VecDeque};
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;

/// Severity of an alert banner, rendered as `alert alert-<level>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertLevel {
    Info,
    Warning,
    Success,
    Danger,
}

impl AlertLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            AlertLevel::Info => "info",
            AlertLevel::Warning => "warning",
            AlertLevel::Success => "success",
            AlertLevel::Danger => "danger",
        }
    }
}

impl fmt::Display for AlertLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The single alert record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alert {
    pub message: String,
    pub level: AlertLevel,
    pub visible: bool,
}

/// Status line shown above a result: a numeric HTTP code, or the `ERR`
/// sentinel when no response was received.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResultStatus {
    Http(u16),
    Err,
}

impl fmt::Display for ResultStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResultStatus::Http(code) => write!(f, "{code}"),
            ResultStatus::Err => f.write_str("ERR"),
        }
    }
}

/// Text written into a result slot: `HTTP <status>` then the body as
/// pretty-printed JSON with a two-space indent.
pub fn render_result(data: &Value, status: ResultStatus) -> String {
    let pretty = serde_json::to_string_pretty(data).unwrap_or_else(|_| data.to_string());
    format!("HTTP {status}\n{pretty}")
}

#[async_trait]
pub trait UiPort: Send + Sync {
    /// Replace the current alert and schedule its dismissal.
    async fn show_alert(&self, message: &str, level: AlertLevel);

    async fn show_loading(&self);

    async fn hide_loading(&self);

    /// Write a result into `slot`. A slot that does not exist is skipped.
    async fn show_result(&self, slot: &str, data: &Value, status: ResultStatus);
}

#[async_trait]
impl<T: UiPort + ?Sized> UiPort for Arc<T> {
    async fn show_alert(&self, message: &str, level: AlertLevel) {
        (**self).show_alert(message, level).await
    }

    async fn show_loading(&self) {
        (**self).show_loading().await
    }

    async fn hide_loading(&self) {
        (**self).hide_loading().await
    }

    async fn show_result(&self, slot: &str, data: &Value, status: ResultStatus) {
        (**self).show_result(slot, data, status).await
    }
}

/// Content of one result slot.
#[derive(Debug, Clone, PartialEq)]
pub struct SlotContent {
    pub status: ResultStatus,
    pub data: Value,
}

impl SlotContent {
    pub fn render(&self) -> String {
        render_result(&self.data, self.status)
    }
}

/// Alerts kept by [`MemoryUi::alert_history`]; older ones are dropped.
pub const ALERT_HISTORY_LIMIT: usize = 64;

#[derive(Debug, Default)]
struct UiState {
    alert: Option<Alert>,
    alert_generation: u64,
    history: VecDeque<Alert>,
    loading: bool,
    slots: HashMap<String, SlotContent>,
}

/// In-process UI state. Clones share the same state.
#[derive(Clone)]
pub struct MemoryUi {
    state: Arc<Mutex<UiState>>,
    /// `None` accepts writes to any slot id.
    known_slots: Option<Arc<HashSet<String>>>,
    alert_duration: Duration,
}

impl MemoryUi {
    pub fn new(alert_duration: Duration) -> Self {
        Self {
            state: Arc::default(),
            known_slots: None,
            alert_duration,
        }
    }

    /// Only the given slot ids exist; results for any other slot are dropped.
    pub fn with_slots<I, S>(alert_duration: Duration, slots: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            known_slots: Some(Arc::new(slots.into_iter().map(Into::into).collect())),
            ..Self::new(alert_duration)
        }
    }

    fn lock(&self) -> MutexGuard<'_, UiState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// The alert currently on screen, if any.
    pub fn visible_alert(&self) -> Option<Alert> {
        self.lock().alert.clone().filter(|alert| alert.visible)
    }

    /// The last alert shown, whether or not it has been dismissed.
    pub fn last_alert(&self) -> Option<Alert> {
        self.lock().alert.clone()
    }

    /// The most recent alerts, oldest first, at most [`ALERT_HISTORY_LIMIT`].
    pub fn alert_history(&self) -> Vec<Alert> {
        self.lock().history.iter().cloned().collect()
    }

    pub fn is_loading(&self) -> bool {
        self.lock().loading
    }

    pub fn slot(&self, slot: &str) -> Option<SlotContent> {
        self.lock().slots.get(slot).cloned()
    }
}

impl Default for MemoryUi {
    fn default() -> Self {
        Self::new(Duration::from_secs(4))
    }
}

#[async_trait]
impl UiPort for MemoryUi {
    async fn show_alert(&self, message: &str, level: AlertLevel) {
        let alert = Alert {
            message: message.to_string(),
            level,
            visible: true,
        };
        let generation = {
            let mut state = self.lock();
            state.alert_generation += 1;
            if state.history.len() == ALERT_HISTORY_LIMIT {
                state.history.pop_front();
            }
            state.history.push_back(alert.clone());
            state.alert = Some(alert);
            state.alert_generation
        };

        let state = Arc::clone(&self.state);
        let duration = self.alert_duration;
        tokio::spawn(async move {
            tokio::time::sleep(duration).await;
            let mut state = state.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
            // A newer alert owns the banner now.
            if state.alert_generation == generation {
                if let Some(alert) = state.alert.as_mut() {
                    alert.visible = false;
                }
            }
        });
    }

    async fn show_loading(&self) {
        self.lock().loading = true;
    }

    async fn hide_loading(&self) {
        self.lock().loading = false;
    }

    async fn show_result(&self, slot: &str, data: &Value, status: ResultStatus) {
        if let Some(known) = &self.known_slots {
            if !known.contains(slot) {
                tracing::debug!(slot, "result slot not present, skipping");
                return;
            }
        }
        self.lock().slots.insert(
            slot.to_string(),
            SlotContent {
                status,
                data: data.clone(),
            },
        );
    }
}

/// Renders alerts through `tracing` and results to stdout.
#[derive(Debug, Default, Clone, Copy)]
pub struct TerminalUi;

#[async_trait]
impl UiPort for TerminalUi {
    async fn show_alert(&self, message: &str, level: AlertLevel) {
        match level {
            AlertLevel::Danger => tracing::error!("{message}"),
            AlertLevel::Warning => tracing::warn!("{message}"),
            AlertLevel::Info | AlertLevel::Success => tracing::info!("{message}"),
        }
    }

    async fn show_loading(&self) {
        tracing::debug!("loading");
    }

    async fn hide_loading(&self) {
        tracing::debug!("done loading");
    }

    async fn show_result(&self, slot: &str, data: &Value, status: ResultStatus) {
        println!("[{slot}]\n{}", render_result(data, status));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn renders_status_line_and_indented_json() {
        let text = render_result(&json!({"error": "ACSN required"}), ResultStatus::Err);
        assert_eq!(text, "HTTP ERR\n{\n  \"error\": \"ACSN required\"\n}");

        let text = render_result(&json!({"ok": true}), ResultStatus::Http(201));
        assert!(text.starts_with("HTTP 201\n"));
    }

    #[tokio::test(start_paused = true)]
    async fn alert_dismisses_after_duration() {
        let ui = MemoryUi::new(Duration::from_secs(4));
        ui.show_alert("hello", AlertLevel::Info).await;
        assert!(ui.visible_alert().is_some());

        tokio::time::sleep(Duration::from_millis(3999)).await;
        assert!(ui.visible_alert().is_some());

        tokio::time::sleep(Duration::from_millis(2)).await;
        assert!(ui.visible_alert().is_none());
        assert_eq!(ui.last_alert().map(|a| a.message), Some("hello".to_string()));
    }

    #[tokio::test(start_paused = true)]
    async fn newer_alert_is_not_hidden_by_older_timer() {
        let ui = MemoryUi::new(Duration::from_secs(4));
        ui.show_alert("first", AlertLevel::Warning).await;
        tokio::time::sleep(Duration::from_secs(3)).await;
        ui.show_alert("second", AlertLevel::Success).await;

        // First alert's timer fires here.
        tokio::time::sleep(Duration::from_millis(1500)).await;
        let alert = ui.visible_alert().expect("second alert still visible");
        assert_eq!(alert.message, "second");
        assert_eq!(alert.level, AlertLevel::Success);

        tokio::time::sleep(Duration::from_secs(3)).await;
        assert!(ui.visible_alert().is_none());
        assert_eq!(ui.alert_history().len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn alert_history_is_bounded() {
        let ui = MemoryUi::default();
        for i in 0..ALERT_HISTORY_LIMIT + 6 {
            ui.show_alert(&format!("alert {i}"), AlertLevel::Info).await;
        }

        let history = ui.alert_history();
        assert_eq!(history.len(), ALERT_HISTORY_LIMIT);
        assert_eq!(history[0].message, "alert 6");
        assert_eq!(
            history.last().map(|a| a.message.clone()),
            Some(format!("alert {}", ALERT_HISTORY_LIMIT + 5))
        );
    }

    #[tokio::test]
    async fn unknown_slot_is_skipped() {
        let ui = MemoryUi::with_slots(Duration::from_secs(4), ["result-encounter"]);
        ui.show_result("result-missing", &json!({}), ResultStatus::Http(200))
            .await;
        ui.show_result("result-encounter", &json!({"id": 1}), ResultStatus::Http(200))
            .await;

        assert!(ui.slot("result-missing").is_none());
        assert_eq!(
            ui.slot("result-encounter").map(|s| s.status),
            Some(ResultStatus::Http(200))
        );
    }
}
