use chrono::NaiveDate;
use sqlx::{sqlite::SqliteRow, Row, SqlitePool};

use crate::{
    core::{
        errors::{AppError, AppResult},
        types::UserEvent,
    },
    db::repositories::{parse_date, DATE_FORMAT},
};

pub async fn insert_event(
    pool: &SqlitePool,
    owner: &str,
    title: &str,
    start_date: NaiveDate,
) -> AppResult<UserEvent> {
    let id = sqlx::query(
        r#"
        INSERT INTO user_events (owner, title, start_date)
        VALUES (?1, ?2, ?3)
        "#,
    )
    .bind(owner)
    .bind(title)
    .bind(start_date.format(DATE_FORMAT).to_string())
    .execute(pool)
    .await?
    .last_insert_rowid();

    let row = sqlx::query("SELECT id, owner, title, start_date FROM user_events WHERE id = ?1")
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("event {id}")))?;
    map_event(row)
}

pub async fn list_events(pool: &SqlitePool, owner: &str) -> AppResult<Vec<UserEvent>> {
    let rows = sqlx::query(
        r#"
        SELECT id, owner, title, start_date
        FROM user_events
        WHERE owner = ?1
        ORDER BY start_date ASC, id ASC
        "#,
    )
    .bind(owner)
    .fetch_all(pool)
    .await?;

    rows.into_iter().map(map_event).collect()
}

pub async fn delete_event(pool: &SqlitePool, owner: &str, id: i64) -> AppResult<bool> {
    let affected = sqlx::query("DELETE FROM user_events WHERE id = ?1 AND owner = ?2")
        .bind(id)
        .bind(owner)
        .execute(pool)
        .await?
        .rows_affected();
    Ok(affected > 0)
}

fn map_event(row: SqliteRow) -> AppResult<UserEvent> {
    Ok(UserEvent {
        id: row.try_get("id")?,
        owner: row.try_get("owner")?,
        title: row.try_get("title")?,
        start_date: parse_date(row.try_get("start_date")?)?,
    })
}
