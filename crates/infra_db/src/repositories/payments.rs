//! Payment repository

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::{FromRow, PgConnection};
use uuid::Uuid;

use crate::error::DatabaseError;

/// Payment data access
pub struct PaymentRepository;

impl PaymentRepository {
    /// Payments of a family for a season, by payment date
    pub async fn for_family_season(
        conn: &mut PgConnection,
        family_id: Uuid,
        season_id: Uuid,
    ) -> Result<Vec<PaymentRow>, DatabaseError> {
        let rows = sqlx::query_as::<_, PaymentRow>(
            r#"
            SELECT id, family_id, season_id, amount, payment_type, payment_date, cashing_date,
                   status, reference, notes, created_at, updated_at
            FROM payments
            WHERE family_id = $1 AND season_id = $2
            ORDER BY payment_date, id
            "#,
        )
        .bind(family_id)
        .bind(season_id)
        .fetch_all(conn)
        .await?;

        Ok(rows)
    }

    pub async fn find(conn: &mut PgConnection, id: Uuid) -> Result<Option<PaymentRow>, DatabaseError> {
        let row = sqlx::query_as::<_, PaymentRow>(
            r#"
            SELECT id, family_id, season_id, amount, payment_type, payment_date, cashing_date,
                   status, reference, notes, created_at, updated_at
            FROM payments
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(conn)
        .await?;

        Ok(row)
    }

    pub async fn insert(conn: &mut PgConnection, row: &PaymentRow) -> Result<(), DatabaseError> {
        sqlx::query(
            r#"
            INSERT INTO payments (
                id, family_id, season_id, amount, payment_type, payment_date, cashing_date,
                status, reference, notes, created_at, updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            "#,
        )
        .bind(row.id)
        .bind(row.family_id)
        .bind(row.season_id)
        .bind(row.amount)
        .bind(row.payment_type)
        .bind(row.payment_date)
        .bind(row.cashing_date)
        .bind(row.status)
        .bind(&row.reference)
        .bind(&row.notes)
        .bind(row.created_at)
        .bind(row.updated_at)
        .execute(conn)
        .await?;

        Ok(())
    }

    /// Rewrites every mutable column of a payment
    pub async fn update(conn: &mut PgConnection, row: &PaymentRow) -> Result<u64, DatabaseError> {
        let result = sqlx::query(
            r#"
            UPDATE payments
            SET season_id = $2, amount = $3, payment_type = $4, payment_date = $5,
                cashing_date = $6, status = $7, reference = $8, notes = $9, updated_at = $10
            WHERE id = $1
            "#,
        )
        .bind(row.id)
        .bind(row.season_id)
        .bind(row.amount)
        .bind(row.payment_type)
        .bind(row.payment_date)
        .bind(row.cashing_date)
        .bind(row.status)
        .bind(&row.reference)
        .bind(&row.notes)
        .bind(row.updated_at)
        .execute(conn)
        .await?;

        Ok(result.rows_affected())
    }

    pub async fn delete(conn: &mut PgConnection, id: Uuid) -> Result<u64, DatabaseError> {
        let result = sqlx::query("DELETE FROM payments WHERE id = $1")
            .bind(id)
            .execute(conn)
            .await?;

        Ok(result.rows_affected())
    }
}

/// Payment type
#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "payment_type", rename_all = "snake_case")]
pub enum PaymentType {
    Cash,
    Check,
    Transfer,
    Card,
}

/// Payment status
#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "payment_status", rename_all = "snake_case")]
pub enum PaymentStatus {
    Pending,
    Completed,
    Cancelled,
}

/// Database row for a payment
#[derive(Debug, Clone, FromRow)]
pub struct PaymentRow {
    pub id: Uuid,
    pub family_id: Uuid,
    pub season_id: Uuid,
    pub amount: Decimal,
    pub payment_type: PaymentType,
    pub payment_date: DateTime<Utc>,
    pub cashing_date: Option<DateTime<Utc>>,
    pub status: PaymentStatus,
    pub reference: Option<String>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
