//! Workshop and workshop price repository

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::{FromRow, PgConnection};
use uuid::Uuid;

use crate::error::DatabaseError;

/// Workshop data access
pub struct WorkshopRepository;

impl WorkshopRepository {
    pub async fn find(conn: &mut PgConnection, id: Uuid) -> Result<Option<WorkshopRow>, DatabaseError> {
        let row = sqlx::query_as::<_, WorkshopRow>(
            r#"
            SELECT id, name, status, allow_multiple, max_per_member, created_at
            FROM workshops
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(conn)
        .await?;

        Ok(row)
    }

    /// Workshops among the given ids, by name
    pub async fn find_many(conn: &mut PgConnection, ids: &[Uuid]) -> Result<Vec<WorkshopRow>, DatabaseError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let rows = sqlx::query_as::<_, WorkshopRow>(
            r#"
            SELECT id, name, status, allow_multiple, max_per_member, created_at
            FROM workshops
            WHERE id = ANY($1)
            ORDER BY name, id
            "#,
        )
        .bind(ids)
        .fetch_all(conn)
        .await?;

        Ok(rows)
    }

    pub async fn insert(conn: &mut PgConnection, row: &WorkshopRow) -> Result<(), DatabaseError> {
        sqlx::query(
            r#"
            INSERT INTO workshops (id, name, status, allow_multiple, max_per_member, created_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(row.id)
        .bind(&row.name)
        .bind(row.status)
        .bind(row.allow_multiple)
        .bind(row.max_per_member)
        .bind(row.created_at)
        .execute(conn)
        .await?;

        Ok(())
    }

    pub async fn find_price(
        conn: &mut PgConnection,
        workshop_id: Uuid,
        season_id: Uuid,
    ) -> Result<Option<WorkshopPriceRow>, DatabaseError> {
        let row = sqlx::query_as::<_, WorkshopPriceRow>(
            r#"
            SELECT id, workshop_id, season_id, amount
            FROM workshop_prices
            WHERE workshop_id = $1 AND season_id = $2
            "#,
        )
        .bind(workshop_id)
        .bind(season_id)
        .fetch_optional(conn)
        .await?;

        Ok(row)
    }

    pub async fn insert_price(conn: &mut PgConnection, row: &WorkshopPriceRow) -> Result<(), DatabaseError> {
        sqlx::query(
            r#"
            INSERT INTO workshop_prices (id, workshop_id, season_id, amount)
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(row.id)
        .bind(row.workshop_id)
        .bind(row.season_id)
        .bind(row.amount)
        .execute(conn)
        .await?;

        Ok(())
    }
}

/// Workshop status
#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "workshop_status", rename_all = "snake_case")]
pub enum WorkshopStatus {
    Active,
    Inactive,
}

/// Database row for a workshop
#[derive(Debug, Clone, FromRow)]
pub struct WorkshopRow {
    pub id: Uuid,
    pub name: String,
    pub status: WorkshopStatus,
    pub allow_multiple: bool,
    pub max_per_member: Option<i32>,
    pub created_at: DateTime<Utc>,
}

/// Database row for a workshop price
#[derive(Debug, Clone, FromRow)]
pub struct WorkshopPriceRow {
    pub id: Uuid,
    pub workshop_id: Uuid,
    pub season_id: Uuid,
    pub amount: Decimal,
}
