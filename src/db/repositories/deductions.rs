use chrono::NaiveDate;
use sqlx::{sqlite::SqliteRow, Row, SqlitePool};

use crate::{
    core::{
        errors::{AppError, AppResult},
        types::{DeductionRecord, SectionTotal},
    },
    db::repositories::{parse_date, DATE_FORMAT},
};

pub async fn insert_deduction(
    pool: &SqlitePool,
    owner: &str,
    section: &str,
    description: Option<&str>,
    amount: f64,
    date_added: NaiveDate,
) -> AppResult<DeductionRecord> {
    let id = sqlx::query(
        r#"
        INSERT INTO deductions (owner, section, description, amount, date_added)
        VALUES (?1, ?2, ?3, ?4, ?5)
        "#,
    )
    .bind(owner)
    .bind(section)
    .bind(description)
    .bind(amount)
    .bind(date_added.format(DATE_FORMAT).to_string())
    .execute(pool)
    .await?
    .last_insert_rowid();

    let row = sqlx::query(
        r#"
        SELECT id, owner, section, description, amount, date_added
        FROM deductions
        WHERE id = ?1
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| AppError::NotFound(format!("deduction {id}")))?;
    map_deduction(row)
}

pub async fn list_deductions(pool: &SqlitePool, owner: &str) -> AppResult<Vec<DeductionRecord>> {
    let rows = sqlx::query(
        r#"
        SELECT id, owner, section, description, amount, date_added
        FROM deductions
        WHERE owner = ?1
        ORDER BY section ASC, date_added DESC, id DESC
        "#,
    )
    .bind(owner)
    .fetch_all(pool)
    .await?;

    rows.into_iter().map(map_deduction).collect()
}

pub async fn section_totals(pool: &SqlitePool, owner: &str) -> AppResult<Vec<SectionTotal>> {
    let rows = sqlx::query(
        r#"
        SELECT section, SUM(amount) AS total_amount
        FROM deductions
        WHERE owner = ?1
        GROUP BY section
        ORDER BY section ASC
        "#,
    )
    .bind(owner)
    .fetch_all(pool)
    .await?;

    rows.into_iter().map(map_section_total).collect()
}

/// Deletes one entry owned by `owner`; false when nothing matched.
pub async fn delete_deduction(pool: &SqlitePool, owner: &str, id: i64) -> AppResult<bool> {
    let affected = sqlx::query("DELETE FROM deductions WHERE id = ?1 AND owner = ?2")
        .bind(id)
        .bind(owner)
        .execute(pool)
        .await?
        .rows_affected();
    Ok(affected > 0)
}

fn map_section_total(row: SqliteRow) -> AppResult<SectionTotal> {
    Ok(SectionTotal {
        section: row.try_get("section")?,
        total_amount: row.try_get("total_amount")?,
    })
}

fn map_deduction(row: SqliteRow) -> AppResult<DeductionRecord> {
    Ok(DeductionRecord {
        id: row.try_get("id")?,
        owner: row.try_get("owner")?,
        section: row.try_get("section")?,
        description: row.try_get("description")?,
        amount: row.try_get("amount")?,
        date_added: parse_date(row.try_get("date_added")?)?,
    })
}
