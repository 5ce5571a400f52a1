//! Sends one JSON request and renders its outcome.
//!
//! Every dispatch follows the same choreography: show the loading badge and
//! a "processing" alert, perform the request, write `HTTP <status>` plus the
//! body into the result slot, raise a success or danger alert, and hide the
//! loading badge on every exit path.

use std::panic::AssertUnwindSafe;
use std::process::ExitCode;

use futures::FutureExt;
use reqwest::{Client, Method};
use serde_json::{json, Value};
use url::Url;

use crate::config::ConsoleConfig;
use crate::error::Result;
use crate::form::Payload;
use crate::ui::{AlertLevel, ResultStatus, UiPort};

pub const PROCESSING_MESSAGE: &str = "Memproses permintaan...";
pub const SUCCESS_MESSAGE: &str = "Permintaan berhasil diproses";
pub const FALLBACK_ERROR_MESSAGE: &str = "Terjadi kesalahan";

/// How a dispatch ended. Request failures are outcomes, not errors.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// A response was received. `ok` is true for 2xx statuses.
    Completed { status: u16, ok: bool, body: Value },
    /// The request never completed.
    NetworkError(String),
    /// The form failed local validation and nothing was sent.
    Rejected(String),
}

impl Outcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Outcome::Completed { ok: true, .. })
    }

    /// Process exit status for a command that ended with this outcome.
    pub fn exit_code(&self) -> ExitCode {
        if self.is_success() {
            ExitCode::SUCCESS
        } else {
            ExitCode::FAILURE
        }
    }
}

/// Parse a response body as JSON, falling back to `{"raw": <text>}`.
pub fn parse_body(text: String) -> Value {
    match serde_json::from_str(&text) {
        Ok(value) => value,
        Err(_) => json!({ "raw": text }),
    }
}

/// Message for the danger alert: the body's `message` field unless it is
/// falsy (missing, null, false, zero or the empty string).
fn error_message(body: &Value) -> String {
    match body.get("message") {
        Some(Value::String(message)) if !message.is_empty() => message.clone(),
        Some(Value::Number(n)) if n.as_f64() == Some(0.0) => FALLBACK_ERROR_MESSAGE.to_string(),
        Some(Value::Null) | Some(Value::String(_)) | Some(Value::Bool(false)) | None => {
            FALLBACK_ERROR_MESSAGE.to_string()
        }
        Some(other) => other.to_string(),
    }
}

pub struct RequestDispatcher<U> {
    client: Client,
    base_url: Url,
    ui: U,
}

impl<U: UiPort> RequestDispatcher<U> {
    pub fn new(config: &ConsoleConfig, ui: U) -> Result<Self> {
        let mut builder = Client::builder();
        if let Some(timeout) = config.request_timeout {
            builder = builder.timeout(timeout);
        }
        Ok(Self {
            client: builder.build()?,
            base_url: config.base_url()?,
            ui,
        })
    }

    pub fn ui(&self) -> &U {
        &self.ui
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// POST `payload` as JSON to `endpoint` and render the outcome into `slot`.
    pub async fn submit(&self, endpoint: &str, payload: &Payload, slot: &str) -> Outcome {
        self.dispatch(Method::POST, endpoint, Some(payload), slot)
            .await
    }

    /// GET `endpoint` and render the outcome into `slot`.
    pub async fn lookup(&self, endpoint: &str, slot: &str) -> Outcome {
        self.dispatch(Method::GET, endpoint, None, slot).await
    }

    async fn dispatch(
        &self,
        method: Method,
        endpoint: &str,
        payload: Option<&Payload>,
        slot: &str,
    ) -> Outcome {
        self.ui.show_loading().await;

        let outcome = AssertUnwindSafe(self.run(method, endpoint, payload, slot))
            .catch_unwind()
            .await;

        self.ui.hide_loading().await;

        match outcome {
            Ok(outcome) => outcome,
            Err(panic) => std::panic::resume_unwind(panic),
        }
    }

    async fn run(
        &self,
        method: Method,
        endpoint: &str,
        payload: Option<&Payload>,
        slot: &str,
    ) -> Outcome {
        self.ui
            .show_alert(PROCESSING_MESSAGE, AlertLevel::Info)
            .await;

        match self.exchange(method.clone(), endpoint, payload).await {
            Ok((status, text)) => {
                let body = parse_body(text);
                let ok = status.is_success();
                self.ui
                    .show_result(slot, &body, ResultStatus::Http(status.as_u16()))
                    .await;

                if ok {
                    tracing::info!(%method, endpoint, status = status.as_u16(), "request succeeded");
                    self.ui.show_alert(SUCCESS_MESSAGE, AlertLevel::Success).await;
                } else {
                    let message = error_message(&body);
                    tracing::warn!(%method, endpoint, status = status.as_u16(), %message, "request failed");
                    self.ui
                        .show_alert(&format!("Error: {message}"), AlertLevel::Danger)
                        .await;
                }

                Outcome::Completed {
                    status: status.as_u16(),
                    ok,
                    body,
                }
            }
            Err(description) => {
                tracing::warn!(%method, endpoint, error = %description, "request did not complete");
                self.ui
                    .show_alert(&format!("Network Error: {description}"), AlertLevel::Danger)
                    .await;
                self.ui
                    .show_result(slot, &json!({ "error": description }), ResultStatus::Err)
                    .await;
                Outcome::NetworkError(description)
            }
        }
    }

    /// Perform the request and read the whole body as text.
    async fn exchange(
        &self,
        method: Method,
        endpoint: &str,
        payload: Option<&Payload>,
    ) -> std::result::Result<(reqwest::StatusCode, String), String> {
        let url = self.base_url.join(endpoint).map_err(|e| e.to_string())?;
        tracing::debug!(%method, %url, "sending request");

        let mut request = self.client.request(method, url);
        if let Some(payload) = payload {
            request = request.json(payload);
        }

        let response = request.send().await.map_err(|e| e.to_string())?;
        let status = response.status();
        let text = response.text().await.map_err(|e| e.to_string())?;
        Ok((status, text))
    }
}
