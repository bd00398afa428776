use serde_json::json;
use taxbuddy_lib::{
    assistant::extractor::{checksum_bytes, parse_extraction, resolve_media_type, strip_code_fence},
    tax::lenient::Lenient,
};

#[test]
fn code_fences_are_unwrapped() {
    assert_eq!(strip_code_fence("```json\n{\"a\": 1}\n```"), "{\"a\": 1}");
    assert_eq!(strip_code_fence("  ```\n{}\n```  "), "{}");
    assert_eq!(strip_code_fence("{\"plain\": true}\n"), "{\"plain\": true}");
}

#[test]
fn extraction_keeps_absent_fields_absent() {
    let document = parse_extraction(
        "```json\n{\"personal_info\": {\"name\": \"A Taxpayer\", \"pan_number\": null, \"assessment_year\": \"2024-25\"}, \"income_sources\": [{\"type\": \"Salary\", \"amount\": \"9,00,000\"}], \"deductions_claimed\": null, \"taxes_paid\": {\"tds\": 45000, \"advance_tax\": null}, \"employer\": \"Acme\"}\n```",
    )
    .expect("extraction parses");

    let info = document.personal_info().expect("personal info");
    assert_eq!(info.name().as_deref(), Some("A Taxpayer"));
    assert_eq!(info.pan_number(), None);
    assert_eq!(document.assessment_year().as_deref(), Some("2024-25"));
    assert!(document.deductions_claimed.is_none());
    assert!(document.deduction_entries().is_empty());
    let salary = document.income_sources().next().expect("income source");
    assert_eq!(
        salary.amount.as_ref().and_then(|amount| amount.as_number()),
        Some(900000.0)
    );
    assert_eq!(document.extra["employer"], "Acme");

    let taxes = document
        .taxes_paid
        .as_ref()
        .and_then(Lenient::known)
        .expect("taxes paid");
    assert!(taxes.advance_tax.is_none());
}

#[test]
fn wrongly_shaped_fields_are_kept_verbatim() {
    let cases = [
        ("{\"taxes_paid\": \"not stated\"}", "taxes_paid", json!("not stated")),
        ("{\"personal_info\": [\"A Taxpayer\"]}", "personal_info", json!(["A Taxpayer"])),
        ("{\"income_sources\": \"lots\"}", "income_sources", json!("lots")),
        ("{\"deductions_claimed\": [\"80C\"]}", "deductions_claimed", json!(["80C"])),
        (
            "{\"deductions_claimed\": {\"80C\": 50000}}",
            "deductions_claimed",
            json!({ "80C": 50000 }),
        ),
        (
            "{\"personal_info\": {\"assessment_year\": [2024], \"pan_number\": 12}}",
            "personal_info",
            json!({ "name": null, "assessment_year": [2024], "pan_number": 12 }),
        ),
    ];

    for (response, field, expected) in cases {
        let document = parse_extraction(response).expect("any object is accepted");
        let value = serde_json::to_value(&document).expect("serialize");
        assert_eq!(value[field], expected, "field {field} from {response}");
    }
}

#[test]
fn wrongly_shaped_fields_contribute_nothing() {
    let document = parse_extraction(
        "{\"personal_info\": {\"assessment_year\": [2024], \"pan_number\": 12}, \"deductions_claimed\": [\"80C\", {\"section\": \"80D\", \"amount\": \"Rs. 5,000\"}], \"income_sources\": \"lots\"}",
    )
    .expect("parses");

    let info = document.personal_info().expect("personal info object");
    assert_eq!(info.assessment_year(), None);
    assert_eq!(info.pan_number().as_deref(), Some("12"));
    assert_eq!(document.income_sources().count(), 0);
    assert_eq!(document.deduction_entries().len(), 2);

    let known: Vec<_> = document.deductions().collect();
    assert_eq!(known.len(), 1);
    assert!(known[0].is_section("80d"));
    assert_eq!(known[0].amount_value(), 5000.0);
}

#[test]
fn extraction_rejects_non_json_and_non_objects() {
    let err = parse_extraction("Sorry, I cannot read this document.").expect_err("not json");
    assert_eq!(err.code(), "EXTRACTION_FORMAT");

    let err = parse_extraction("[{\"section\": \"80C\"}]").expect_err("not an object");
    assert_eq!(err.code(), "EXTRACTION_FORMAT");
}

#[test]
fn media_type_comes_from_declaration_or_extension() {
    assert_eq!(
        resolve_media_type("scan.bin", Some("image/png")).expect("declared"),
        "image/png"
    );
    assert_eq!(
        resolve_media_type("Form16.PDF", Some("application/octet-stream")).expect("extension"),
        "application/pdf"
    );
    assert_eq!(
        resolve_media_type("photo.jpg", None).expect("jpg"),
        "image/jpeg"
    );

    let err = resolve_media_type("notes.docx", None).expect_err("unsupported");
    assert_eq!(err.code(), "INVALID_INPUT");
}

#[test]
fn checksum_is_stable_sha256_hex() {
    let digest = checksum_bytes(b"abc");
    assert_eq!(
        digest,
        "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
    );
    assert_ne!(checksum_bytes(b"abd"), digest);
}
