//! Season repository

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::{FromRow, PgConnection};
use uuid::Uuid;

use crate::error::DatabaseError;
use crate::repositories::advisory_xact_lock;

/// Season data access
pub struct SeasonRepository;

impl SeasonRepository {
    pub async fn find(conn: &mut PgConnection, id: Uuid) -> Result<Option<SeasonRow>, DatabaseError> {
        let row = sqlx::query_as::<_, SeasonRow>(
            r#"
            SELECT id, start_year, end_year, membership_amount, discount_percent, status, created_at
            FROM seasons
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(conn)
        .await?;

        Ok(row)
    }

    /// All seasons, oldest first
    pub async fn list(conn: &mut PgConnection) -> Result<Vec<SeasonRow>, DatabaseError> {
        let rows = sqlx::query_as::<_, SeasonRow>(
            r#"
            SELECT id, start_year, end_year, membership_amount, discount_percent, status, created_at
            FROM seasons
            ORDER BY start_year, end_year
            "#,
        )
        .fetch_all(conn)
        .await?;

        Ok(rows)
    }

    /// Inserts a season
    ///
    /// A season with the same years fails with `DuplicateEntry`.
    pub async fn insert(conn: &mut PgConnection, row: &SeasonRow) -> Result<(), DatabaseError> {
        sqlx::query(
            r#"
            INSERT INTO seasons (
                id, start_year, end_year, membership_amount, discount_percent, status, created_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(row.id)
        .bind(row.start_year)
        .bind(row.end_year)
        .bind(row.membership_amount)
        .bind(row.discount_percent)
        .bind(row.status)
        .bind(row.created_at)
        .execute(conn)
        .await?;

        Ok(())
    }

    /// Makes a season the only active one
    ///
    /// Concurrent activations are serialized on a global advisory lock, and
    /// the other seasons are deactivated before the target is activated so
    /// the single-active index never sees two active rows. Returns false
    /// when the season does not exist.
    pub async fn activate(conn: &mut PgConnection, id: Uuid) -> Result<bool, DatabaseError> {
        advisory_xact_lock(&mut *conn, "seasons:activation").await?;

        let exists = sqlx::query_scalar::<_, Uuid>("SELECT id FROM seasons WHERE id = $1 FOR UPDATE")
            .bind(id)
            .fetch_optional(&mut *conn)
            .await?;
        if exists.is_none() {
            return Ok(false);
        }

        sqlx::query("UPDATE seasons SET status = 'inactive' WHERE status = 'active' AND id <> $1")
            .bind(id)
            .execute(&mut *conn)
            .await?;

        sqlx::query("UPDATE seasons SET status = 'active' WHERE id = $1")
            .bind(id)
            .execute(&mut *conn)
            .await?;

        Ok(true)
    }
}

/// Season status
#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "season_status", rename_all = "snake_case")]
pub enum SeasonStatus {
    Active,
    Inactive,
}

/// Database row for a season
#[derive(Debug, Clone, FromRow)]
pub struct SeasonRow {
    pub id: Uuid,
    pub start_year: i32,
    pub end_year: i32,
    pub membership_amount: Decimal,
    pub discount_percent: Decimal,
    pub status: SeasonStatus,
    pub created_at: DateTime<Utc>,
}
