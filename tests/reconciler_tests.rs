use taxbuddy_lib::{
    core::types::SectionTotal,
    tax::{
        document::{claims, DeductionClaim, DeductionEntry, ExtractedDocument},
        lenient::Lenient,
        reconciler::{
            merge_tracked, reconcile, upsert_user_section, ProfessionalTaxTable,
            PROFESSIONAL_TAX_FIELD,
        },
    },
};

fn document(json: serde_json::Value) -> ExtractedDocument {
    serde_json::from_value(json).expect("document fixture should deserialize")
}

fn amount_of(entries: &[DeductionEntry], section: &str) -> Option<f64> {
    claims(entries)
        .find(|claim| claim.is_section(section))
        .map(DeductionClaim::amount_value)
}

fn entries(list: Vec<DeductionClaim>) -> Vec<DeductionEntry> {
    list.into_iter().map(Lenient::Known).collect()
}

#[test]
fn empty_aggregate_and_zero_override_is_identity() {
    let fixtures = vec![
        document(serde_json::json!({})),
        document(serde_json::json!({ "deductions_claimed": null })),
        document(serde_json::json!({ "deductions_claimed": [] })),
        document(serde_json::json!({
            "deductions_claimed": [
                { "section": "80C", "amount": 50000 },
                { "section": "80D", "amount": "12,500" },
                { "section": "80G", "amount": null },
                { "section": "80C", "amount": 1000, "note": "duplicate row" }
            ]
        })),
    ];

    for doc in fixtures {
        let reconciled = reconcile(&doc, &[], 0.0, 0.0);
        assert_eq!(reconciled.deductions(), doc.deduction_entries());
    }
}

#[test]
fn zero_override_does_not_append_80d_even_with_tracked_80d() {
    let mut list = entries(vec![DeductionClaim::new("80C", 50000.0)]);
    let before = list.clone();

    upsert_user_section(&mut list, 0.0);
    assert_eq!(list, before);

    let totals = vec![SectionTotal::new("80D", 15000.0)];
    merge_tracked(&mut list, &totals);
    assert_eq!(list, before);
}

#[test]
fn negative_or_nan_override_is_ignored() {
    let mut list = entries(vec![DeductionClaim::new("80D", 9000.0)]);
    upsert_user_section(&mut list, -1.0);
    upsert_user_section(&mut list, f64::NAN);
    assert_eq!(amount_of(&list, "80D"), Some(9000.0));
}

#[test]
fn override_replaces_first_80d_entry_only() {
    let mut list = entries(vec![
        DeductionClaim::new("80d", 5000.0),
        DeductionClaim::new("80D", 7000.0),
    ]);
    upsert_user_section(&mut list, 25000.0);

    let amounts: Vec<f64> = claims(&list).map(DeductionClaim::amount_value).collect();
    assert_eq!(amounts, vec![25000.0, 7000.0]);
}

#[test]
fn additive_merge_is_not_idempotent() {
    let mut list = entries(vec![DeductionClaim::new("80C", 50000.0)]);
    let totals = vec![
        SectionTotal::new("80C", 20000.0),
        SectionTotal::new("80G", 3000.0),
    ];

    merge_tracked(&mut list, &totals);
    let first_80c = amount_of(&list, "80C").expect("80C present");
    let first_80g = amount_of(&list, "80G").expect("80G appended");

    merge_tracked(&mut list, &totals);
    let second_80c = amount_of(&list, "80C").expect("80C present");
    let second_80g = amount_of(&list, "80G").expect("80G present");

    assert_eq!(first_80c, 70000.0);
    assert!(second_80c > first_80c);
    assert!(second_80g > first_80g);
}

#[test]
fn end_to_end_override_and_tracked_totals() {
    let doc = document(serde_json::json!({
        "personal_info": { "name": "A Taxpayer", "pan_number": null, "assessment_year": "2024-25" },
        "deductions_claimed": [{ "section": "80C", "amount": 50000 }]
    }));
    let totals = vec![
        SectionTotal::new("80C", 20000.0),
        SectionTotal::new("80D", 15000.0),
    ];

    let reconciled = reconcile(&doc, &totals, 10000.0, 0.0);
    let list = reconciled.deductions();

    assert_eq!(list.len(), 2);
    assert_eq!(amount_of(list, "80C"), Some(70000.0));
    assert_eq!(amount_of(list, "80D"), Some(10000.0));
    assert_eq!(
        doc.deduction_entries().len(),
        1,
        "session document stays untouched"
    );
}

#[test]
fn lenient_document_amounts_are_merged_numerically() {
    let doc = document(serde_json::json!({
        "deductions_claimed": [{ "section": "80C", "amount": "Rs. 1,00,000" }]
    }));
    let reconciled = reconcile(&doc, &[SectionTotal::new(" 80c ", 500.0)], 0.0, 0.0);
    assert_eq!(amount_of(reconciled.deductions(), "80C"), Some(100500.0));
}

#[test]
fn malformed_entries_are_carried_but_never_matched() {
    let doc = document(serde_json::json!({
        "deductions_claimed": ["80D", { "section": ["80C"], "amount": 100 }, null]
    }));
    let reconciled = reconcile(&doc, &[SectionTotal::new("80C", 500.0)], 12000.0, 0.0);
    let list = reconciled.deductions();

    assert_eq!(list.len(), 5);
    assert_eq!(list[0], Lenient::Raw(serde_json::json!("80D")));
    assert_eq!(list[2], Lenient::Raw(serde_json::Value::Null));
    assert_eq!(amount_of(list, "80D"), Some(12000.0));
    assert_eq!(amount_of(list, "80C"), Some(500.0));

    let value = serde_json::to_value(&reconciled).expect("serialize");
    assert_eq!(value["deductions_claimed"][1]["section"], serde_json::json!(["80C"]));
}

#[test]
fn deductions_that_are_not_a_list_are_left_alone_unless_something_is_added() {
    let doc = document(serde_json::json!({ "deductions_claimed": { "80C": 50000 } }));
    assert!(doc.deduction_entries().is_empty());

    let untouched = reconcile(&doc, &[], 0.0, 0.0);
    let value = serde_json::to_value(&untouched).expect("serialize");
    assert_eq!(value["deductions_claimed"], serde_json::json!({ "80C": 50000 }));

    let with_override = reconcile(&doc, &[], 9000.0, 0.0);
    assert_eq!(with_override.deductions().len(), 1);
    assert_eq!(amount_of(with_override.deductions(), "80D"), Some(9000.0));
}

#[test]
fn professional_tax_is_written_into_the_calculator_input() {
    let doc = document(serde_json::json!({
        "income_sources": [{ "type": "Salary", "amount": 900000 }],
        "professional_tax": 999,
        "employer": "Acme"
    }));
    let table = ProfessionalTaxTable::default();
    let reconciled = reconcile(&doc, &[], 0.0, table.lookup(Some("maharashtra")));
    let value = serde_json::to_value(&reconciled).expect("serialize");

    assert_eq!(value[PROFESSIONAL_TAX_FIELD], 2500.0);
    assert_eq!(value["employer"], "Acme");
    assert_eq!(value["income_sources"][0]["type"], "Salary");
}

#[test]
fn professional_tax_lookup_is_case_insensitive_and_defaults_to_zero() {
    let table = ProfessionalTaxTable::default();
    assert_eq!(table.lookup(Some("  Tamil   Nadu ")), 2500.0);
    assert_eq!(table.lookup(Some("KARNATAKA")), 2400.0);
    assert_eq!(table.lookup(Some("Atlantis")), 0.0);
    assert_eq!(table.lookup(None), 0.0);

    let overridden = table
        .with_overrides("Goa=1200, Karnataka=2500")
        .expect("overrides parse");
    assert_eq!(overridden.lookup(Some("goa")), 1200.0);
    assert_eq!(overridden.lookup(Some("karnataka")), 2500.0);

    let err = ProfessionalTaxTable::default()
        .with_overrides("Goa")
        .expect_err("missing amount");
    assert_eq!(err.code(), "CONFIG_ERROR");
}
