//! Sample-data presets for the demo forms.
//!
//! Each [`Scenario`] is a static list of `(field, value)` pairs. Values are
//! either literals or functions of the click time, so applying a scenario is
//! deterministic given `now`.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Duration, SecondsFormat, Utc};

use crate::error::{Error, Result};
use crate::form::Form;

/// A preset value: a literal, or a timestamp relative to the moment of the click.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldValue {
    Literal(&'static str),
    Now,
    MinutesFromNow(i64),
}

impl FieldValue {
    pub fn resolve(&self, now: DateTime<Utc>) -> String {
        match self {
            FieldValue::Literal(value) => (*value).to_string(),
            FieldValue::Now => timestamp(now),
            FieldValue::MinutesFromNow(minutes) => timestamp(now + Duration::minutes(*minutes)),
        }
    }
}

/// Round-trip UTC timestamp with millisecond precision, e.g. `2025-08-01T05:57:41.000Z`.
pub fn timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Millis, true)
}

const PATIENT_ID: &str = "P10443013727";
const PATIENT_REF: &str = "Patient/P10443013727";
const PATIENT_NAME: &str = "MILA YASYFI TASBIHA";
const REFERRER_ID: &str = "10016869420";
const REFERRER_REF: &str = "Practitioner/10016869420";
const REFERRER_NAME: &str = "dr. ARIAWAN SETIADI, Sp.A";
const RADIOLOGIST_ID: &str = "10000504193";
const RADIOLOGIST_REF: &str = "Practitioner/10000504193";
const RADIOLOGIST_NAME: &str = "dr. RINI SUSANTI, Sp.Rad";
const LOCATION_ID: &str = "ecff1c64-3f62-4469-b577-ea38f263b276";
const LOCATION_REF: &str = "Location/ecff1c64-3f62-4469-b577-ea38f263b276";
const ACSN: &str = "20250002";
const STUDY_UID: &str = "1.2.840.113619.2.55.3.604688433.783.159975";
const LOINC_CODE: &str = "24648-8";
const LOINC_DISPLAY: &str = "XR Chest PA upright";
const ENCOUNTER_ID: &str = "6dc2dc13-0b5a-4105-996e-6403e43be60a";
const SERVICE_REQUEST_ID: &str = "a33163ec-ba77-4775-8d20-83035b76e668";
const IMAGING_STUDY_ID: &str = "75b7e9d0-c079-419c-84f8-8dba7b9cd585";
const READING: &str = "Hasil Bacaan adalah Tak tampak bercak pada kedua lapangan paru";
const BATCH_PERIOD_START: &str = "2025-08-01T05:57:41+00:00";
const BATCH_PERIOD_END: &str = "2025-08-01T06:07:41+00:00";

use self::FieldValue::{Literal as L, MinutesFromNow, Now};

const DICOM_PROCESS: &[(&str, FieldValue)] = &[
    ("study", L(STUDY_UID)),
    ("patientid", L(PATIENT_ID)),
    ("accesionnum", L(ACSN)),
];

const ENCOUNTER: &[(&str, FieldValue)] = &[
    ("identifier_value", L("RG2023I0000175")),
    ("subject_id", L(PATIENT_ID)),
    ("subject_reference", L(PATIENT_REF)),
    ("subject_display", L(PATIENT_NAME)),
    ("individual_id", L(REFERRER_ID)),
    ("individual_reference", L(REFERRER_REF)),
    ("individual_display", L(REFERRER_NAME)),
    ("period_start", Now),
    ("period_end", MinutesFromNow(10)),
    ("location_id", L(LOCATION_ID)),
    ("location_reference", L(LOCATION_REF)),
    (
        "location_display",
        L("Ruang 1, Poliklinik Anak, Lantai 1, Gedung Poliklinik"),
    ),
];

const SERVICE_REQUEST: &[(&str, FieldValue)] = &[
    ("identifier_value", L("RG2023I0000176")),
    ("noacsn", L(ACSN)),
    ("subject_id", L(PATIENT_ID)),
    ("encounter_id", L("015aa41f-88d7-4b0b-b5f1-d511522bfa87")),
    ("period_start", Now),
    ("requester_reference", L(REFERRER_REF)),
    ("requester_display", L(REFERRER_NAME)),
    ("performer_reference", L(RADIOLOGIST_REF)),
    ("performer_display", L(RADIOLOGIST_NAME)),
];

const OBSERVATION: &[(&str, FieldValue)] = &[
    ("identifier_value", L("RG2023I0000174")),
    ("codind_code", L(LOINC_CODE)),
    ("coding_display", L(LOINC_DISPLAY)),
    ("subject_id", L(PATIENT_ID)),
    ("subject_display", L(PATIENT_NAME)),
    ("encounter_id", L(ENCOUNTER_ID)),
    ("period_start", Now),
    ("performer_id", L(RADIOLOGIST_ID)),
    ("performer_display", L(RADIOLOGIST_NAME)),
    ("performer_value", L(READING)),
    ("service_request_id", L(SERVICE_REQUEST_ID)),
    ("imaging_study_id", L(IMAGING_STUDY_ID)),
];

const DIAGNOSTIC: &[(&str, FieldValue)] = &[
    ("identifier_value", L("RG2023I0000174")),
    ("codind_code", L(LOINC_CODE)),
    ("coding_display", L(LOINC_DISPLAY)),
    ("subject_id", L(PATIENT_ID)),
    ("encounter_id", L(ENCOUNTER_ID)),
    ("period_start", Now),
    ("performer_id", L(RADIOLOGIST_ID)),
    ("imaging_study_id", L(IMAGING_STUDY_ID)),
    ("observation_id", L("82b9af58-c98d-4263-9a6f-9a04fdfec43a")),
    ("service_request_id", L(SERVICE_REQUEST_ID)),
    ("conclusion_text", L(READING)),
];

const BATCH1: &[(&str, FieldValue)] = &[
    ("identifier_value", L("RG2023I0000175")),
    ("subject_id", L(PATIENT_ID)),
    ("subject_reference", L(PATIENT_REF)),
    ("subject_display", L(PATIENT_NAME)),
    ("individual_id", L(REFERRER_ID)),
    ("individual_reference", L(REFERRER_REF)),
    ("individual_display", L(REFERRER_NAME)),
    ("period_start", L(BATCH_PERIOD_START)),
    ("period_end", L(BATCH_PERIOD_END)),
    ("location_id", L(LOCATION_ID)),
    ("location_reference", L(LOCATION_REF)),
    ("location_display", L("Ruang 1, Poliklinik Anak")),
    ("noacsn", L(ACSN)),
    ("requester_reference", L(REFERRER_REF)),
    ("requester_display", L(REFERRER_NAME)),
    ("performer_reference", L(RADIOLOGIST_REF)),
    ("performer_display", L(RADIOLOGIST_NAME)),
];

const BATCH2: &[(&str, FieldValue)] = &[
    ("identifier_value", L("RG2023I0000174")),
    ("codind_code", L(LOINC_CODE)),
    ("coding_display", L(LOINC_DISPLAY)),
    ("subject_id", L(PATIENT_ID)),
    ("subject_display", L(PATIENT_NAME)),
    ("encounter_id", L(ENCOUNTER_ID)),
    ("period_start", Now),
    ("performer_id", L(RADIOLOGIST_ID)),
    ("performer_display", L(RADIOLOGIST_NAME)),
    ("performer_value", L(READING)),
    ("service_request_id", L(SERVICE_REQUEST_ID)),
    ("imaging_study_id", L(IMAGING_STUDY_ID)),
    ("conclusion_text", L(READING)),
];

const BATCH3: &[(&str, FieldValue)] = &[
    ("identifier_value", L("RG2023I0000175")),
    ("subject_id", L(PATIENT_ID)),
    ("subject_reference", L(PATIENT_REF)),
    ("subject_display", L(PATIENT_NAME)),
    ("individual_id", L(REFERRER_ID)),
    ("individual_reference", L(REFERRER_REF)),
    ("individual_display", L(REFERRER_NAME)),
    ("period_start", L(BATCH_PERIOD_START)),
    ("period_end", L(BATCH_PERIOD_END)),
    ("location_id", L(LOCATION_ID)),
    ("location_reference", L(LOCATION_REF)),
    ("location_display", L("Ruang 1, Poliklinik Anak")),
    ("noacsn", L(ACSN)),
    ("requester_reference", L(REFERRER_REF)),
    ("requester_display", L(REFERRER_NAME)),
    ("performer_id", L(RADIOLOGIST_ID)),
    ("performer_reference", L(RADIOLOGIST_REF)),
    ("performer_display", L(RADIOLOGIST_NAME)),
    ("codind_code", L(LOINC_CODE)),
    ("coding_display", L(LOINC_DISPLAY)),
    ("performer_value", L(READING)),
    ("imaging_study_id", L(IMAGING_STUDY_ID)),
    ("conclusion_text", L(READING)),
];

const BATCH4: &[(&str, FieldValue)] = &[
    ("identifier_value", L("RG2023I0000175")),
    ("subject_id", L(PATIENT_ID)),
    ("subject_reference", L(PATIENT_REF)),
    ("subject_display", L(PATIENT_NAME)),
    ("individual_id", L(REFERRER_ID)),
    ("individual_reference", L(REFERRER_REF)),
    ("individual_display", L(REFERRER_NAME)),
    ("period_start", L(BATCH_PERIOD_START)),
    ("period_end", L(BATCH_PERIOD_END)),
    ("location_id", L(LOCATION_ID)),
    ("location_reference", L(LOCATION_REF)),
    ("location_display", L("Ruang 1, Poliklinik Anak")),
    ("noacsn", L(ACSN)),
    ("requester_reference", L(REFERRER_REF)),
    ("requester_display", L(REFERRER_NAME)),
    ("performer_id", L(RADIOLOGIST_ID)),
    ("performer_reference", L(RADIOLOGIST_REF)),
    ("performer_display", L(RADIOLOGIST_NAME)),
    ("codind_code", L(LOINC_CODE)),
    ("coding_display", L(LOINC_DISPLAY)),
    ("performer_value", L(READING)),
    ("conclusion_text", L(READING)),
    ("study", L(STUDY_UID)),
    ("patientid", L(PATIENT_ID)),
    ("accesionnum", L(ACSN)),
];

const IMAGING: &[(&str, FieldValue)] = &[("acsn", L(ACSN))];

/// Autofill presets, keyed by the `data-autofill` tag of their button.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Scenario {
    DicomProcess,
    Encounter,
    ServiceRequest,
    Observation,
    Diagnostic,
    Batch1,
    Batch2,
    Batch3,
    Batch4,
    Imaging,
}

impl Scenario {
    pub const ALL: [Scenario; 10] = [
        Scenario::DicomProcess,
        Scenario::Encounter,
        Scenario::ServiceRequest,
        Scenario::Observation,
        Scenario::Diagnostic,
        Scenario::Batch1,
        Scenario::Batch2,
        Scenario::Batch3,
        Scenario::Batch4,
        Scenario::Imaging,
    ];

    pub fn tag(&self) -> &'static str {
        match self {
            Scenario::DicomProcess => "dicom-process",
            Scenario::Encounter => "encounter",
            Scenario::ServiceRequest => "servicereq",
            Scenario::Observation => "observation",
            Scenario::Diagnostic => "diagnostic",
            Scenario::Batch1 => "batch1",
            Scenario::Batch2 => "batch2",
            Scenario::Batch3 => "batch3",
            Scenario::Batch4 => "batch4",
            Scenario::Imaging => "imaging",
        }
    }

    pub fn entries(&self) -> &'static [(&'static str, FieldValue)] {
        match self {
            Scenario::DicomProcess => DICOM_PROCESS,
            Scenario::Encounter => ENCOUNTER,
            Scenario::ServiceRequest => SERVICE_REQUEST,
            Scenario::Observation => OBSERVATION,
            Scenario::Diagnostic => DIAGNOSTIC,
            Scenario::Batch1 => BATCH1,
            Scenario::Batch2 => BATCH2,
            Scenario::Batch3 => BATCH3,
            Scenario::Batch4 => BATCH4,
            Scenario::Imaging => IMAGING,
        }
    }

    pub fn field_names(&self) -> Vec<&'static str> {
        self.entries().iter().map(|(name, _)| *name).collect()
    }

    /// Resolve every entry against `now`.
    pub fn values(&self, now: DateTime<Utc>) -> Vec<(&'static str, String)> {
        self.entries()
            .iter()
            .map(|(name, value)| (*name, value.resolve(now)))
            .collect()
    }

    /// Write the preset into `form`, skipping fields the form does not have.
    /// Returns the number of fields written.
    pub fn apply(&self, form: &mut Form, now: DateTime<Utc>) -> usize {
        let written = self
            .values(now)
            .into_iter()
            .filter(|(name, value)| form.set(name, value.as_str()))
            .count();
        tracing::debug!(scenario = self.tag(), form = form.id(), written, "autofill applied");
        written
    }
}

impl fmt::Display for Scenario {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

impl FromStr for Scenario {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Scenario::ALL
            .into_iter()
            .find(|scenario| scenario.tag() == s)
            .ok_or_else(|| Error::UnknownScenario(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn timestamps_match_iso_string_format() {
        let now = Utc.with_ymd_and_hms(2025, 8, 1, 5, 57, 41).unwrap();
        assert_eq!(FieldValue::Now.resolve(now), "2025-08-01T05:57:41.000Z");
        assert_eq!(
            FieldValue::MinutesFromNow(10).resolve(now),
            "2025-08-01T06:07:41.000Z"
        );
    }

    #[test]
    fn tags_round_trip() {
        for scenario in Scenario::ALL {
            assert_eq!(scenario.tag().parse::<Scenario>().unwrap(), scenario);
        }
        assert!(matches!(
            "batch5".parse::<Scenario>(),
            Err(Error::UnknownScenario(_))
        ));
    }

    #[test]
    fn no_scenario_repeats_a_field() {
        for scenario in Scenario::ALL {
            let mut names = scenario.field_names();
            let total = names.len();
            names.sort_unstable();
            names.dedup();
            assert_eq!(names.len(), total, "{scenario} repeats a field");
        }
    }
}
