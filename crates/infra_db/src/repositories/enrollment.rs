//! Membership and registration repositories

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::{FromRow, PgConnection};
use uuid::Uuid;

use crate::error::DatabaseError;

/// Membership data access
pub struct MembershipRepository;

impl MembershipRepository {
    /// Memberships of the given members for a season, in family order
    pub async fn for_members(
        conn: &mut PgConnection,
        member_ids: &[Uuid],
        season_id: Uuid,
    ) -> Result<Vec<MembershipRow>, DatabaseError> {
        if member_ids.is_empty() {
            return Ok(Vec::new());
        }

        let rows = sqlx::query_as::<_, MembershipRow>(
            r#"
            SELECT id, member_id, season_id, family_order, amount, status, created_at
            FROM memberships
            WHERE member_id = ANY($1) AND season_id = $2
            ORDER BY family_order, id
            "#,
        )
        .bind(member_ids)
        .bind(season_id)
        .fetch_all(conn)
        .await?;

        Ok(rows)
    }

    pub async fn find_for(
        conn: &mut PgConnection,
        member_id: Uuid,
        season_id: Uuid,
    ) -> Result<Option<MembershipRow>, DatabaseError> {
        let row = sqlx::query_as::<_, MembershipRow>(
            r#"
            SELECT id, member_id, season_id, family_order, amount, status, created_at
            FROM memberships
            WHERE member_id = $1 AND season_id = $2
            "#,
        )
        .bind(member_id)
        .bind(season_id)
        .fetch_optional(conn)
        .await?;

        Ok(row)
    }

    /// Inserts a membership
    ///
    /// A second membership for the same member and season fails with
    /// `DuplicateEntry`.
    pub async fn insert(conn: &mut PgConnection, row: &MembershipRow) -> Result<(), DatabaseError> {
        sqlx::query(
            r#"
            INSERT INTO memberships (id, member_id, season_id, family_order, amount, status, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(row.id)
        .bind(row.member_id)
        .bind(row.season_id)
        .bind(row.family_order)
        .bind(row.amount)
        .bind(row.status)
        .bind(row.created_at)
        .execute(conn)
        .await?;

        Ok(())
    }

    /// Moves the memberships of the given members for a season from one
    /// status to another, returning the number of rows changed
    pub async fn transition_statuses(
        conn: &mut PgConnection,
        member_ids: &[Uuid],
        season_id: Uuid,
        from: MembershipStatus,
        to: MembershipStatus,
    ) -> Result<u64, DatabaseError> {
        if member_ids.is_empty() {
            return Ok(0);
        }

        let result = sqlx::query(
            r#"
            UPDATE memberships
            SET status = $4
            WHERE member_id = ANY($1) AND season_id = $2 AND status = $3
            "#,
        )
        .bind(member_ids)
        .bind(season_id)
        .bind(from)
        .bind(to)
        .execute(conn)
        .await?;

        Ok(result.rows_affected())
    }
}

/// Registration data access
pub struct RegistrationRepository;

impl RegistrationRepository {
    /// Registrations of the given members for a season, oldest first
    pub async fn for_members(
        conn: &mut PgConnection,
        member_ids: &[Uuid],
        season_id: Uuid,
    ) -> Result<Vec<RegistrationRow>, DatabaseError> {
        if member_ids.is_empty() {
            return Ok(Vec::new());
        }

        let rows = sqlx::query_as::<_, RegistrationRow>(
            r#"
            SELECT id, member_id, workshop_id, season_id, quantity, total_price,
                   discount_percent, created_at, updated_at
            FROM registrations
            WHERE member_id = ANY($1) AND season_id = $2
            ORDER BY created_at, id
            "#,
        )
        .bind(member_ids)
        .bind(season_id)
        .fetch_all(conn)
        .await?;

        Ok(rows)
    }

    pub async fn find(conn: &mut PgConnection, id: Uuid) -> Result<Option<RegistrationRow>, DatabaseError> {
        let row = sqlx::query_as::<_, RegistrationRow>(
            r#"
            SELECT id, member_id, workshop_id, season_id, quantity, total_price,
                   discount_percent, created_at, updated_at
            FROM registrations
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(conn)
        .await?;

        Ok(row)
    }

    pub async fn find_for(
        conn: &mut PgConnection,
        member_id: Uuid,
        workshop_id: Uuid,
        season_id: Uuid,
    ) -> Result<Option<RegistrationRow>, DatabaseError> {
        let row = sqlx::query_as::<_, RegistrationRow>(
            r#"
            SELECT id, member_id, workshop_id, season_id, quantity, total_price,
                   discount_percent, created_at, updated_at
            FROM registrations
            WHERE member_id = $1 AND workshop_id = $2 AND season_id = $3
            "#,
        )
        .bind(member_id)
        .bind(workshop_id)
        .bind(season_id)
        .fetch_optional(conn)
        .await?;

        Ok(row)
    }

    pub async fn insert(conn: &mut PgConnection, row: &RegistrationRow) -> Result<(), DatabaseError> {
        sqlx::query(
            r#"
            INSERT INTO registrations (
                id, member_id, workshop_id, season_id, quantity, total_price,
                discount_percent, created_at, updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            "#,
        )
        .bind(row.id)
        .bind(row.member_id)
        .bind(row.workshop_id)
        .bind(row.season_id)
        .bind(row.quantity)
        .bind(row.total_price)
        .bind(row.discount_percent)
        .bind(row.created_at)
        .bind(row.updated_at)
        .execute(conn)
        .await?;

        Ok(())
    }

    /// Rewrites the quantity and price of a registration
    pub async fn update(conn: &mut PgConnection, row: &RegistrationRow) -> Result<u64, DatabaseError> {
        let result = sqlx::query(
            r#"
            UPDATE registrations
            SET quantity = $2, total_price = $3, discount_percent = $4, updated_at = $5
            WHERE id = $1
            "#,
        )
        .bind(row.id)
        .bind(row.quantity)
        .bind(row.total_price)
        .bind(row.discount_percent)
        .bind(row.updated_at)
        .execute(conn)
        .await?;

        Ok(result.rows_affected())
    }

    pub async fn delete(conn: &mut PgConnection, id: Uuid) -> Result<u64, DatabaseError> {
        let result = sqlx::query("DELETE FROM registrations WHERE id = $1")
            .bind(id)
            .execute(conn)
            .await?;

        Ok(result.rows_affected())
    }
}

/// Membership status
#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "membership_status", rename_all = "snake_case")]
pub enum MembershipStatus {
    Pending,
    Completed,
    Cancelled,
}

/// Database row for a membership
#[derive(Debug, Clone, FromRow)]
pub struct MembershipRow {
    pub id: Uuid,
    pub member_id: Uuid,
    pub season_id: Uuid,
    pub family_order: i32,
    pub amount: Decimal,
    pub status: MembershipStatus,
    pub created_at: DateTime<Utc>,
}

/// Database row for a workshop registration
#[derive(Debug, Clone, FromRow)]
pub struct RegistrationRow {
    pub id: Uuid,
    pub member_id: Uuid,
    pub workshop_id: Uuid,
    pub season_id: Uuid,
    pub quantity: i32,
    pub total_price: Decimal,
    pub discount_percent: Decimal,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
