use chrono::NaiveDate;
use taxbuddy_lib::{
    db::{
        repositories::{calculations, deductions, events},
        Database, DATABASE_FILE,
    },
    tax::{
        document::DeductionClaim,
        parser::{parse_tax_summary, ParseStrategy},
        summary::TaxSummary,
    },
};

fn date(raw: &str) -> NaiveDate {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d").expect("valid date")
}

fn summary(gross: f64) -> TaxSummary {
    parse_tax_summary(
        &format!(
            "<JSON_OUTPUT>{{\"gross_total_income\": {gross}, \"recommended_regime\": \"Old\", \"tax_saving_with_recommendation\": 1500, \"final_amount_due_under_recommendation\": 2400, \"status\": \"Tax Due\", \"model_note\": \"kept\"}}</JSON_OUTPUT>"
        ),
        ParseStrategy::DelimiterTagged,
    )
    .expect("summary")
    .with_context(
        Some("2024-25".to_string()),
        vec![DeductionClaim::new("80C", 150000.0)],
    )
}

#[tokio::test]
async fn deductions_are_listed_by_section_then_newest_date() {
    let db = Database::in_memory().await.expect("db should initialize");
    let pool = db.pool();

    deductions::insert_deduction(pool, "alice", "80D", Some("Health insurance"), 12000.0, date("2024-06-01"))
        .await
        .expect("insert 80D");
    deductions::insert_deduction(pool, "alice", "80C", Some("PPF"), 50000.0, date("2024-04-10"))
        .await
        .expect("insert 80C");
    deductions::insert_deduction(pool, "alice", "80C", None, 20000.0, date("2024-09-15"))
        .await
        .expect("insert 80C later");
    deductions::insert_deduction(pool, "bob", "80C", None, 1.0, date("2024-01-01"))
        .await
        .expect("insert other owner");

    let listed = deductions::list_deductions(pool, "alice")
        .await
        .expect("list deductions");
    let order: Vec<(&str, f64)> = listed
        .iter()
        .map(|record| (record.section.as_str(), record.amount))
        .collect();
    assert_eq!(order, vec![("80C", 20000.0), ("80C", 50000.0), ("80D", 12000.0)]);
    assert_eq!(listed[1].description.as_deref(), Some("PPF"));
    assert_eq!(listed[0].date_added, date("2024-09-15"));

    let totals = deductions::section_totals(pool, "alice")
        .await
        .expect("section totals");
    assert_eq!(totals.len(), 2);
    assert_eq!(totals[0].section, "80C");
    assert_eq!(totals[0].total_amount, 70000.0);
    assert_eq!(totals[1].total_amount, 12000.0);
}

#[tokio::test]
async fn deletes_are_scoped_to_the_owner() {
    let db = Database::in_memory().await.expect("db should initialize");
    let pool = db.pool();

    let record = deductions::insert_deduction(pool, "alice", "80G", None, 500.0, date("2024-05-05"))
        .await
        .expect("insert");

    let foreign = deductions::delete_deduction(pool, "mallory", record.id)
        .await
        .expect("delete attempt");
    assert!(!foreign);

    let deleted = deductions::delete_deduction(pool, "alice", record.id)
        .await
        .expect("delete");
    assert!(deleted);
    let again = deductions::delete_deduction(pool, "alice", record.id)
        .await
        .expect("delete again");
    assert!(!again);
    assert!(deductions::list_deductions(pool, "alice")
        .await
        .expect("list")
        .is_empty());
}

#[tokio::test]
async fn events_are_ordered_by_start_date() {
    let db = Database::in_memory().await.expect("db should initialize");
    let pool = db.pool();

    events::insert_event(pool, "alice", "File ITR", date("2024-07-31"))
        .await
        .expect("insert event");
    let advance = events::insert_event(pool, "alice", "Advance tax instalment", date("2024-06-15"))
        .await
        .expect("insert event");
    events::insert_event(pool, "bob", "Other", date("2024-01-01"))
        .await
        .expect("insert event");

    let listed = events::list_events(pool, "alice").await.expect("list events");
    let titles: Vec<&str> = listed.iter().map(|event| event.title.as_str()).collect();
    assert_eq!(titles, vec!["Advance tax instalment", "File ITR"]);

    assert!(!events::delete_event(pool, "bob", advance.id)
        .await
        .expect("foreign delete"));
    assert!(events::delete_event(pool, "alice", advance.id)
        .await
        .expect("delete"));
    assert_eq!(events::list_events(pool, "alice").await.expect("list").len(), 1);
}

#[tokio::test]
async fn calculations_round_trip_with_denormalised_columns() {
    let db = Database::in_memory().await.expect("db should initialize");
    let pool = db.pool();

    let first = calculations::insert_calculation(pool, "alice", &summary(800000.0))
        .await
        .expect("insert first");
    let second = calculations::insert_calculation(pool, "alice", &summary(950000.0))
        .await
        .expect("insert second");
    calculations::insert_calculation(pool, "bob", &summary(1.0))
        .await
        .expect("insert other owner");

    assert_eq!(first.assessment_year.as_deref(), Some("2024-25"));
    assert_eq!(first.recommended_regime.as_deref(), Some("Old"));
    assert_eq!(first.gross_income, Some(800000.0));
    assert_eq!(first.tax_saving, Some(1500.0));
    assert_eq!(first.final_amount_due, Some(2400.0));

    let listed = calculations::list_calculations(pool, "alice")
        .await
        .expect("list calculations");
    assert_eq!(listed.len(), 2);
    assert_eq!(listed[0].id, second.id, "newest first");
    assert_eq!(listed[1].summary, summary(800000.0));
    assert_eq!(listed[1].summary.extra["model_note"], "kept");
}

#[tokio::test]
async fn file_backed_database_persists_between_opens() {
    let dir = tempfile::tempdir().expect("tempdir");

    {
        let db = Database::new(dir.path()).await.expect("open database");
        deductions::insert_deduction(db.pool(), "alice", "80C", None, 100.0, date("2024-04-01"))
            .await
            .expect("insert");
        db.pool().close().await;
    }

    assert!(dir.path().join(DATABASE_FILE).exists());
    let reopened = Database::new(dir.path()).await.expect("reopen database");
    let listed = deductions::list_deductions(reopened.pool(), "alice")
        .await
        .expect("list");
    assert_eq!(listed.len(), 1);
}
