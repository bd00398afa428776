use sqlx::{sqlite::SqliteRow, Row, SqlitePool};

use crate::{
    core::{
        errors::{AppError, AppResult},
        types::CalculationRecord,
    },
    db::repositories::parse_timestamp,
    tax::summary::{Regime, TaxSummary},
};

/// Stores the summary blob plus the denormalised columns used for history views.
pub async fn insert_calculation(
    pool: &SqlitePool,
    owner: &str,
    summary: &TaxSummary,
) -> AppResult<CalculationRecord> {
    let blob = serde_json::to_string(summary)
        .map_err(|err| AppError::Internal(format!("serialize summary: {err}")))?;
    let regime = summary.recommended_regime.as_ref().map(Regime::label);

    let id = sqlx::query(
        r#"
        INSERT INTO calculations (
            owner, assessment_year, gross_income, recommended_regime,
            tax_saving, final_amount_due, calculation_data
        )
        VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
        "#,
    )
    .bind(owner)
    .bind(summary.assessment_year.as_deref())
    .bind(summary.gross_total_income)
    .bind(regime)
    .bind(summary.tax_saving_with_recommendation)
    .bind(summary.final_amount_due_under_recommendation)
    .bind(blob)
    .execute(pool)
    .await?
    .last_insert_rowid();

    get_calculation(pool, owner, id).await
}

pub async fn get_calculation(
    pool: &SqlitePool,
    owner: &str,
    id: i64,
) -> AppResult<CalculationRecord> {
    let row = sqlx::query(
        r#"
        SELECT id, owner, assessment_year, gross_income, recommended_regime,
               tax_saving, final_amount_due, calculation_data, created_at
        FROM calculations
        WHERE id = ?1 AND owner = ?2
        "#,
    )
    .bind(id)
    .bind(owner)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| AppError::NotFound(format!("calculation {id}")))?;

    map_calculation(row)
}

pub async fn list_calculations(pool: &SqlitePool, owner: &str) -> AppResult<Vec<CalculationRecord>> {
    let rows = sqlx::query(
        r#"
        SELECT id, owner, assessment_year, gross_income, recommended_regime,
               tax_saving, final_amount_due, calculation_data, created_at
        FROM calculations
        WHERE owner = ?1
        ORDER BY created_at DESC, id DESC
        "#,
    )
    .bind(owner)
    .fetch_all(pool)
    .await?;

    rows.into_iter().map(map_calculation).collect()
}

fn map_calculation(row: SqliteRow) -> AppResult<CalculationRecord> {
    let blob: String = row.try_get("calculation_data")?;
    let summary: TaxSummary = serde_json::from_str(&blob)
        .map_err(|err| AppError::Database(format!("invalid calculation blob: {err}")))?;
    Ok(CalculationRecord {
        id: row.try_get("id")?,
        owner: row.try_get("owner")?,
        assessment_year: row.try_get("assessment_year")?,
        gross_income: row.try_get("gross_income")?,
        recommended_regime: row.try_get("recommended_regime")?,
        tax_saving: row.try_get("tax_saving")?,
        final_amount_due: row.try_get("final_amount_due")?,
        summary,
        created_at: parse_timestamp(row.try_get("created_at")?)?,
    })
}
