use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::autofill::Scenario;
use crate::error::{Error, Result};

/// JSON object sent as a request body, in form field order.
pub type Payload = serde_json::Map<String, Value>;

/// A named field and its current value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormField {
    pub name: String,
    pub value: String,
}

impl FromStr for FormField {
    type Err = Error;

    /// Parse a `name=value` assignment. The value may be empty or contain `=`.
    fn from_str(s: &str) -> Result<Self> {
        match s.split_once('=') {
            Some((name, value)) if !name.trim().is_empty() => Ok(FormField {
                name: name.trim().to_string(),
                value: value.to_string(),
            }),
            _ => Err(Error::InvalidAssignment(s.to_string())),
        }
    }
}

/// The forms rendered by the demo page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FormKind {
    DicomProcess,
    Encounter,
    ServiceRequest,
    Observation,
    Diagnostic,
    Batch1,
    Batch2,
    Batch3,
    Batch4,
    ImagingLookup,
}

impl FormKind {
    pub const ALL: [FormKind; 10] = [
        FormKind::DicomProcess,
        FormKind::Encounter,
        FormKind::ServiceRequest,
        FormKind::Observation,
        FormKind::Diagnostic,
        FormKind::Batch1,
        FormKind::Batch2,
        FormKind::Batch3,
        FormKind::Batch4,
        FormKind::ImagingLookup,
    ];

    /// Suffix shared by the form id and its result slot.
    fn key(&self) -> &'static str {
        match self {
            FormKind::DicomProcess => "dicom-process",
            FormKind::Encounter => "encounter",
            FormKind::ServiceRequest => "servicereq",
            FormKind::Observation => "observation",
            FormKind::Diagnostic => "diagnostic",
            FormKind::Batch1 => "batch1",
            FormKind::Batch2 => "batch2",
            FormKind::Batch3 => "batch3",
            FormKind::Batch4 => "batch4",
            FormKind::ImagingLookup => "imaging-lookup",
        }
    }

    /// Element id of the `<form>`, e.g. `form-encounter`.
    pub fn form_id(&self) -> String {
        format!("form-{}", self.key())
    }

    /// Element id of the result slot, e.g. `result-encounter`.
    pub fn result_slot(&self) -> String {
        format!("result-{}", self.key())
    }

    /// The autofill preset whose fields this form renders.
    pub fn scenario(&self) -> Scenario {
        match self {
            FormKind::DicomProcess => Scenario::DicomProcess,
            FormKind::Encounter => Scenario::Encounter,
            FormKind::ServiceRequest => Scenario::ServiceRequest,
            FormKind::Observation => Scenario::Observation,
            FormKind::Diagnostic => Scenario::Diagnostic,
            FormKind::Batch1 => Scenario::Batch1,
            FormKind::Batch2 => Scenario::Batch2,
            FormKind::Batch3 => Scenario::Batch3,
            FormKind::Batch4 => Scenario::Batch4,
            FormKind::ImagingLookup => Scenario::Imaging,
        }
    }

    /// Field names rendered by this form.
    pub fn field_names(&self) -> Vec<&'static str> {
        self.scenario().field_names()
    }
}

impl fmt::Display for FormKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for FormKind {
    type Err = Error;

    /// Accepts either the element id (`form-encounter`) or its suffix (`encounter`).
    fn from_str(s: &str) -> Result<Self> {
        let key = s.strip_prefix("form-").unwrap_or(s);
        FormKind::ALL
            .into_iter()
            .find(|kind| kind.key() == key)
            .ok_or_else(|| Error::UnknownForm(s.to_string()))
    }
}

/// An HTML form reduced to its named fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Form {
    id: String,
    fields: Vec<FormField>,
}

impl Form {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            fields: Vec::new(),
        }
    }

    /// The empty form the page renders for `kind`.
    pub fn blank(kind: FormKind) -> Self {
        kind.field_names()
            .into_iter()
            .fold(Self::new(kind.form_id()), |form, name| form.with_field(name, ""))
    }

    pub fn from_fields(id: impl Into<String>, fields: Vec<FormField>) -> Self {
        Self {
            id: id.into(),
            fields,
        }
    }

    /// Append a field, or overwrite it if the name already exists.
    pub fn with_field(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        let name = name.into();
        let value = value.into();
        match self.fields.iter_mut().find(|f| f.name == name) {
            Some(field) => field.value = value,
            None => self.fields.push(FormField { name, value }),
        }
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn fields(&self) -> &[FormField] {
        &self.fields
    }

    pub fn has_field(&self, name: &str) -> bool {
        self.fields.iter().any(|f| f.name == name)
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|f| f.name == name)
            .map(|f| f.value.as_str())
    }

    /// Set an existing field's value. Returns `false` (and changes nothing)
    /// when the form has no field with that name.
    pub fn set(&mut self, name: &str, value: impl Into<String>) -> bool {
        match self.fields.iter_mut().find(|f| f.name == name) {
            Some(field) => {
                field.value = value.into();
                true
            }
            None => false,
        }
    }

    /// Collect the non-empty fields into a request payload.
    pub fn to_payload(&self) -> Payload {
        let mut payload = Payload::new();
        for field in self.fields.iter().filter(|f| !f.value.is_empty()) {
            payload.insert(field.name.clone(), Value::String(field.value.clone()));
        }
        payload
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn payload_skips_empty_values() {
        let form = Form::new("form-encounter")
            .with_field("identifier_value", "RG2023I0000175")
            .with_field("subject_display", "")
            .with_field("subject_id", "P10443013727");

        let payload = form.to_payload();
        assert_eq!(payload.len(), 2);
        assert!(!payload.contains_key("subject_display"));
        let keys: Vec<_> = payload.keys().map(String::as_str).collect();
        assert_eq!(keys, ["identifier_value", "subject_id"]);
    }

    #[test]
    fn set_ignores_missing_fields() {
        let mut form = Form::blank(FormKind::ImagingLookup);
        assert!(form.set("acsn", "20250002"));
        assert!(!form.set("subject_id", "P10443013727"));
        assert_eq!(form.fields().len(), 1);
        assert_eq!(form.get("acsn"), Some("20250002"));
    }

    #[test]
    fn parses_assignments() {
        let field: FormField = "conclusion_text=a=b".parse().unwrap();
        assert_eq!(field.name, "conclusion_text");
        assert_eq!(field.value, "a=b");

        let field: FormField = "subject_display=".parse().unwrap();
        assert_eq!(field.value, "");

        assert!(matches!(
            "no-equals-sign".parse::<FormField>(),
            Err(Error::InvalidAssignment(_))
        ));
        assert!("=value".parse::<FormField>().is_err());
    }

    #[test]
    fn parses_form_ids() {
        assert_eq!("form-batch3".parse::<FormKind>().unwrap(), FormKind::Batch3);
        assert_eq!("servicereq".parse::<FormKind>().unwrap(), FormKind::ServiceRequest);
        assert!(matches!(
            "form-nope".parse::<FormKind>(),
            Err(Error::UnknownForm(_))
        ));
        assert_eq!(FormKind::ImagingLookup.result_slot(), "result-imaging-lookup");
    }
}
