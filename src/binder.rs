//! Routes each known form to its endpoint and result slot.

use serde_json::json;
use url::{ParseError, Url};

use crate::dispatch::{Outcome, RequestDispatcher};
use crate::error::{Error, Result};
use crate::form::{Form, FormKind};
use crate::ui::{ResultStatus, UiPort};

/// Path prefix of the imaging lookup; the accession number is appended as one segment.
pub const IMAGING_LOOKUP_PREFIX: &str = "/api/satset/imageid/";

/// Field the imaging lookup form requires.
pub const ACSN_FIELD: &str = "acsn";

pub const ACSN_REQUIRED: &str = "ACSN required";

/// `.` and `..` would be collapsed by URL normalization and hit the prefix itself.
pub const ACSN_INVALID: &str = "ACSN invalid";

fn is_dot_segment(segment: &str) -> bool {
    matches!(segment, "." | "..")
}

/// Where a form's submission goes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    /// POST the form fields as JSON.
    Post(&'static str),
    /// GET `prefix` + the value of `field`, percent-encoded.
    Lookup {
        prefix: &'static str,
        field: &'static str,
    },
}

impl FormKind {
    pub fn route(&self) -> Route {
        match self {
            FormKind::DicomProcess => Route::Post("/api/dicom/process"),
            FormKind::Encounter => Route::Post("/api/satset/encounter"),
            FormKind::ServiceRequest => Route::Post("/api/satset/service-req"),
            FormKind::Observation => Route::Post("/api/satset/observation"),
            FormKind::Diagnostic => Route::Post("/api/satset/conclusion"),
            FormKind::Batch1 => Route::Post("/api/satset/batch1"),
            FormKind::Batch2 => Route::Post("/api/satset/batch2"),
            FormKind::Batch3 => Route::Post("/api/satset/batch3"),
            FormKind::Batch4 => Route::Post("/api/satset/batch4"),
            FormKind::ImagingLookup => Route::Lookup {
                prefix: IMAGING_LOOKUP_PREFIX,
                field: ACSN_FIELD,
            },
        }
    }
}

/// Append `segment` to `base` + `prefix` as a single percent-encoded path segment.
///
/// Dot segments cannot be expressed as a path segment and are rejected.
pub fn lookup_url(base: &Url, prefix: &str, segment: &str) -> Result<Url> {
    if is_dot_segment(segment) {
        return Err(Error::InvalidSegment(segment.to_string()));
    }
    let mut url = base.join(prefix)?;
    url.path_segments_mut()
        .map_err(|_| Error::UrlError(ParseError::RelativeUrlWithCannotBeABaseBase))?
        .pop_if_empty()
        .push(segment);
    Ok(url)
}

/// Intercepts form submissions and hands them to a [`RequestDispatcher`].
pub struct FormBinder<U> {
    dispatcher: RequestDispatcher<U>,
}

impl<U: UiPort> FormBinder<U> {
    pub fn new(dispatcher: RequestDispatcher<U>) -> Self {
        Self { dispatcher }
    }

    pub fn dispatcher(&self) -> &RequestDispatcher<U> {
        &self.dispatcher
    }

    pub fn ui(&self) -> &U {
        self.dispatcher.ui()
    }

    /// Submit `form`, resolving its kind from the form id.
    pub async fn submit(&self, form: &Form) -> Result<Outcome> {
        let kind: FormKind = form.id().parse()?;
        self.submit_as(kind, form).await
    }

    /// Submit `form` along the route of `kind`.
    ///
    /// Returns `Err` only for a lookup URL that cannot be built; every request
    /// outcome, including the missing-ACSN case, is rendered and returned as
    /// an [`Outcome`].
    pub async fn submit_as(&self, kind: FormKind, form: &Form) -> Result<Outcome> {
        let payload = form.to_payload();
        let slot = kind.result_slot();

        match kind.route() {
            Route::Post(endpoint) => {
                tracing::debug!(form = %kind, endpoint, fields = payload.len(), "submitting form");
                Ok(self.dispatcher.submit(endpoint, &payload, &slot).await)
            }
            Route::Lookup { prefix, field } => {
                let Some(value) = payload.get(field).and_then(|v| v.as_str()) else {
                    tracing::debug!(form = %kind, field, "lookup field missing, not sending");
                    return Ok(self.reject(&slot, ACSN_REQUIRED).await);
                };
                if is_dot_segment(value) {
                    tracing::debug!(form = %kind, field, value, "lookup field is a dot segment, not sending");
                    return Ok(self.reject(&slot, ACSN_INVALID).await);
                }
                let url = lookup_url(self.dispatcher.base_url(), prefix, value)?;
                Ok(self.dispatcher.lookup(url.as_str(), &slot).await)
            }
        }
    }

    /// Render a local validation failure without touching the network.
    async fn reject(&self, slot: &str, reason: &str) -> Outcome {
        self.dispatcher
            .ui()
            .show_result(slot, &json!({ "error": reason }), ResultStatus::Err)
            .await;
        Outcome::Rejected(reason.to_string())
    }
}
