use chrono::{TimeZone, Utc};
use satset_console::autofill::timestamp;
use satset_console::{Form, FormKind, Scenario};

#[test]
fn test_imaging_sets_only_acsn() {
    let now = Utc::now();
    let mut form = Form::new("form-imaging-lookup")
        .with_field("acsn", "")
        .with_field("note", "keep me")
        .with_field("subject_id", "P000");

    let written = Scenario::Imaging.apply(&mut form, now);

    assert_eq!(written, 1);
    assert_eq!(form.get("acsn"), Some("20250002"));
    assert_eq!(form.get("note"), Some("keep me"));
    assert_eq!(form.get("subject_id"), Some("P000"));
}

#[test]
fn test_encounter_values() {
    let now = Utc.with_ymd_and_hms(2026, 3, 14, 9, 26, 53).unwrap();
    let mut form = Form::blank(FormKind::Encounter);

    let written = Scenario::Encounter.apply(&mut form, now);
    assert_eq!(written, form.fields().len());

    let payload = form.to_payload();
    assert_eq!(payload["identifier_value"], "RG2023I0000175");
    assert_eq!(payload["subject_id"], "P10443013727");
    assert_eq!(payload["subject_reference"], "Patient/P10443013727");
    assert_eq!(payload["individual_display"], "dr. ARIAWAN SETIADI, Sp.A");
    assert_eq!(payload["period_start"], timestamp(now));
    assert_eq!(payload["period_start"], "2026-03-14T09:26:53.000Z");
    assert_eq!(payload["period_end"], "2026-03-14T09:36:53.000Z");
}

#[test]
fn test_batch_periods_are_fixed() {
    let now = Utc::now();
    for scenario in [Scenario::Batch1, Scenario::Batch3, Scenario::Batch4] {
        let values = scenario.values(now);
        let start = values.iter().find(|(name, _)| *name == "period_start");
        assert_eq!(
            start.map(|(_, v)| v.as_str()),
            Some("2025-08-01T05:57:41+00:00"),
            "{scenario} period_start"
        );
    }
}

#[test]
fn test_every_form_accepts_its_own_scenario() {
    let now = Utc::now();
    for kind in FormKind::ALL {
        let mut form = Form::blank(kind);
        let written = kind.scenario().apply(&mut form, now);
        assert_eq!(written, form.fields().len(), "{kind}");
        assert!(form.fields().iter().all(|f| !f.value.is_empty()), "{kind}");
    }
}

#[test]
fn test_foreign_fields_are_skipped() {
    let now = Utc::now();
    let mut form = Form::blank(FormKind::DicomProcess);
    let before = form.clone();

    // Encounter shares no fields with the DICOM form.
    assert_eq!(Scenario::Encounter.apply(&mut form, now), 0);
    assert_eq!(form, before);

    // Batch 4 carries the DICOM fields too.
    assert_eq!(Scenario::Batch4.apply(&mut form, now), 3);
    assert_eq!(
        form.get("study"),
        Some("1.2.840.113619.2.55.3.604688433.783.159975")
    );
    assert_eq!(form.get("accesionnum"), Some("20250002"));
}
