// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! # PostgreSQL Alert Repository
//!
//! Compiles an [`AlertQuery`] into one filtered, ordered and windowed SQL
//! statement over `alerts JOIN security_events`. The total count and the page
//! are read from the same REPEATABLE READ snapshot.

use async_trait::async_trait;
use sqlx::postgres::{PgPool, PgRow};
use sqlx::{Postgres, QueryBuilder, Row};

use crate::domain::alert::{Alert, AlertId, AlertStatus, AlertView};
use crate::domain::event::EventId;
use crate::domain::query::{AlertPage, AlertQuery, PageRequest, SortDirection, SortKey};
use crate::domain::repository::{AlertRepository, RepositoryError};

use super::postgres_event::event_from_row;

const VIEW_COLUMNS: &str = r#"
    a.id AS alert_id, a.event_id, a.status, a.created_at,
    e.source, e.event_type, e.severity, e.description, e.recorded_at
"#;

const VIEW_SOURCE: &str = " FROM alerts a JOIN security_events e ON e.id = a.event_id";

pub struct PostgresAlertRepository {
    pool: PgPool,
}

impl PostgresAlertRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn parse_status(raw: &str) -> Result<AlertStatus, RepositoryError> {
    raw.parse::<AlertStatus>()
        .map_err(|_| RepositoryError::Corrupt(format!("unknown alert status '{}'", raw)))
}

fn alert_from_row(row: &PgRow, id_column: &str) -> Result<Alert, RepositoryError> {
    let status: String = row.try_get("status")?;
    Ok(Alert::restore(
        AlertId(row.try_get(id_column)?),
        EventId(row.try_get("event_id")?),
        parse_status(&status)?,
        row.try_get("created_at")?,
    ))
}

fn view_from_row(row: &PgRow) -> Result<AlertView, RepositoryError> {
    let alert = alert_from_row(row, "alert_id")?;
    let event = event_from_row(row, "event_id")?;
    Ok(AlertView::new(&alert, event))
}

/// Escapes `%`, `_` and the escape character itself for use with
/// `ILIKE ... ESCAPE '\'`.
fn escape_like(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len());
    for c in term.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

fn push_conditions(builder: &mut QueryBuilder<'_, Postgres>, query: &AlertQuery) {
    builder.push(" WHERE TRUE");

    if let Some(status) = query.filter.status {
        builder.push(" AND a.status = ").push_bind(status.as_str());
    }
    if let Some(severity) = query.filter.severity {
        builder.push(" AND e.severity = ").push_bind(severity.as_str());
    }
    if let Some(term) = &query.search {
        let pattern = format!("%{}%", escape_like(term));
        builder
            .push(" AND (e.source ILIKE ")
            .push_bind(pattern.clone())
            .push(r" ESCAPE '\' OR e.description ILIKE ")
            .push_bind(pattern.clone())
            .push(r" ESCAPE '\' OR e.event_type ILIKE ")
            .push_bind(pattern)
            .push(r" ESCAPE '\')");
    }
}

fn count_statement(query: &AlertQuery) -> QueryBuilder<'static, Postgres> {
    let mut builder = QueryBuilder::new("SELECT COUNT(*) AS total");
    builder.push(VIEW_SOURCE);
    push_conditions(&mut builder, query);
    builder
}

fn page_statement(query: &AlertQuery, page: PageRequest) -> QueryBuilder<'static, Postgres> {
    let mut builder = QueryBuilder::new("SELECT");
    builder.push(VIEW_COLUMNS).push(VIEW_SOURCE);
    push_conditions(&mut builder, query);

    builder.push(" ORDER BY ");
    for spec in query.ordering.specs() {
        // status compares by byte order to match the in-memory store
        let column = match spec.key {
            SortKey::CreatedAt => "a.created_at",
            SortKey::Status => "a.status COLLATE \"C\"",
        };
        let direction = match spec.direction {
            SortDirection::Ascending => "ASC",
            SortDirection::Descending => "DESC",
        };
        builder.push(column).push(" ").push(direction).push(", ");
    }
    builder.push("a.id ASC");

    builder
        .push(" LIMIT ")
        .push_bind(page.limit() as i64)
        .push(" OFFSET ")
        .push_bind(page.offset() as i64);
    builder
}

#[async_trait]
impl AlertRepository for PostgresAlertRepository {
    async fn find_view(&self, id: AlertId) -> Result<Option<AlertView>, RepositoryError> {
        let sql = format!("SELECT {}{} WHERE a.id = $1", VIEW_COLUMNS, VIEW_SOURCE);
        let row = sqlx::query(&sql).bind(id.0).fetch_optional(&self.pool).await?;
        row.as_ref().map(view_from_row).transpose()
    }

    async fn find_by_event(&self, event_id: EventId) -> Result<Vec<Alert>, RepositoryError> {
        let rows = sqlx::query(
            r#"
            SELECT id, event_id, status, created_at
            FROM alerts
            WHERE event_id = $1
            ORDER BY id ASC
            "#,
        )
        .bind(event_id.0)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(|row| alert_from_row(row, "id")).collect()
    }

    async fn query(&self, query: &AlertQuery) -> Result<AlertPage, RepositoryError> {
        let mut tx = self.pool.begin().await?;
        sqlx::query("SET TRANSACTION ISOLATION LEVEL REPEATABLE READ")
            .execute(&mut *tx)
            .await?;

        let total: i64 = count_statement(query)
            .build()
            .fetch_one(&mut *tx)
            .await
            .map_err(|e| RepositoryError::Database(format!("Failed to count alerts: {}", e)))?
            .try_get("total")?;
        let count = total.max(0) as usize;
        let page = query.page.resolve(count);

        let rows = page_statement(query, page)
            .build()
            .fetch_all(&mut *tx)
            .await
            .map_err(|e| RepositoryError::Database(format!("Failed to list alerts: {}", e)))?;
        tx.commit().await?;

        let results = rows.iter().map(view_from_row).collect::<Result<Vec<_>, _>>()?;
        Ok(AlertPage { count, page, results })
    }

    async fn update_status(&self, id: AlertId, status: AlertStatus) -> Result<Option<AlertView>, RepositoryError> {
        let row = sqlx::query(
            r#"
            WITH updated AS (
                UPDATE alerts SET status = $2
                WHERE id = $1
                RETURNING id, event_id, status, created_at
            )
            SELECT u.id AS alert_id, u.event_id, u.status, u.created_at,
                   e.source, e.event_type, e.severity, e.description, e.recorded_at
            FROM updated u
            JOIN security_events e ON e.id = u.event_id
            "#,
        )
        .bind(id.0)
        .bind(status.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| RepositoryError::Database(format!("Failed to update alert {}: {}", id, e)))?;

        row.as_ref().map(view_from_row).transpose()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::query::AlertQueryParams;

    fn query(status: Option<&str>, search: Option<&str>, ordering: Option<&str>) -> AlertQuery {
        AlertQuery::from_params(&AlertQueryParams {
            status: status.map(str::to_string),
            search: search.map(str::to_string),
            ordering: ordering.map(str::to_string),
            ..Default::default()
        })
        .unwrap()
    }

    #[test]
    fn test_escape_like() {
        assert_eq!(escape_like("50%_off\\"), "50\\%\\_off\\\\");
        assert_eq!(escape_like("plain"), "plain");
    }

    #[test]
    fn test_page_statement_default_ordering() {
        let sql = page_statement(&AlertQuery::default(), PageRequest::default()).into_sql();
        assert!(sql.contains("WHERE TRUE ORDER BY a.created_at ASC, a.id ASC LIMIT $1 OFFSET $2"));
    }

    #[test]
    fn test_page_statement_with_filters_and_ordering() {
        let sql = page_statement(&query(Some("OPEN"), Some("root"), Some("-status,created_at")), PageRequest::default()).into_sql();
        assert!(sql.contains("a.status = $1"));
        assert!(sql.contains("e.source ILIKE $2"));
        assert!(sql.contains("e.event_type ILIKE $4"));
        assert!(sql.contains("ORDER BY a.status COLLATE \"C\" DESC, a.created_at ASC, a.id ASC"));
        assert!(sql.contains("LIMIT $5 OFFSET $6"));
    }

    #[test]
    fn test_count_statement_has_no_window() {
        let sql = count_statement(&query(Some("RESOLVED"), None, None)).into_sql();
        assert!(sql.starts_with("SELECT COUNT(*) AS total FROM alerts a JOIN security_events e"));
        assert!(!sql.contains("LIMIT"));
        assert!(!sql.contains("ORDER BY"));
    }
}
