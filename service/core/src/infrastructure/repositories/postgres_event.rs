// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! # PostgreSQL Security Event Repository
//!
//! Production `SecurityEventRepository` backed by the `security_events` and
//! `alerts` tables. An event and its derived alert are written inside one
//! transaction; a failure in either insert rolls both back.

use async_trait::async_trait;
use chrono::{DateTime, SubsecRound, Utc};
use sqlx::postgres::{PgPool, PgRow};
use sqlx::Row;

use crate::domain::alert::{Alert, AlertId};
use crate::domain::derivation::DerivedAlert;
use crate::domain::event::{EventId, NewSecurityEvent, SecurityEvent, Severity};
use crate::domain::repository::{RepositoryError, SecurityEventRepository};

pub struct PostgresSecurityEventRepository {
    pool: PgPool,
}

impl PostgresSecurityEventRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Maps a row carrying the `security_events` columns, prefixed or not.
pub(super) fn event_from_row(row: &PgRow, id_column: &str) -> Result<SecurityEvent, RepositoryError> {
    let severity: String = row.try_get("severity")?;
    let severity = severity
        .parse::<Severity>()
        .map_err(|_| RepositoryError::Corrupt(format!("unknown severity '{}'", severity)))?;

    Ok(SecurityEvent {
        id: EventId(row.try_get(id_column)?),
        source: row.try_get("source")?,
        event_type: row.try_get("event_type")?,
        severity,
        description: row.try_get("description")?,
        timestamp: row.try_get("recorded_at")?,
    })
}

#[async_trait]
impl SecurityEventRepository for PostgresSecurityEventRepository {
    async fn insert(
        &self,
        event: NewSecurityEvent,
        derived: Option<DerivedAlert>,
    ) -> Result<(SecurityEvent, Option<Alert>), RepositoryError> {
        // timestamptz keeps microseconds
        let now: DateTime<Utc> = Utc::now().trunc_subsecs(6);
        let mut tx = self.pool.begin().await?;

        let event_id: i64 = sqlx::query(
            r#"
            INSERT INTO security_events (source, event_type, severity, description, recorded_at)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id
            "#,
        )
        .bind(&event.source)
        .bind(&event.event_type)
        .bind(event.severity.as_str())
        .bind(&event.description)
        .bind(now)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| RepositoryError::Database(format!("Failed to insert security event: {}", e)))?
        .try_get("id")?;

        let event = event.into_event(EventId(event_id), now);

        let alert = match derived {
            Some(derived) => {
                // status falls back to the column default, OPEN
                let alert_id: i64 = sqlx::query(
                    r#"
                    INSERT INTO alerts (event_id, created_at)
                    VALUES ($1, $2)
                    RETURNING id
                    "#,
                )
                .bind(event_id)
                .bind(now)
                .fetch_one(&mut *tx)
                .await
                .map_err(|e| RepositoryError::Database(format!("Failed to insert alert: {}", e)))?
                .try_get("id")?;
                Some(derived.into_alert(AlertId(alert_id), event.id, now))
            }
            None => None,
        };

        tx.commit().await?;
        Ok((event, alert))
    }

    async fn find_by_id(&self, id: EventId) -> Result<Option<SecurityEvent>, RepositoryError> {
        let row = sqlx::query(
            r#"
            SELECT id, source, event_type, severity, description, recorded_at
            FROM security_events
            WHERE id = $1
            "#,
        )
        .bind(id.0)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(|row| event_from_row(row, "id")).transpose()
    }

    async fn delete(&self, id: EventId) -> Result<(), RepositoryError> {
        // alerts.event_id is ON DELETE CASCADE
        sqlx::query("DELETE FROM security_events WHERE id = $1")
            .bind(id.0)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}
