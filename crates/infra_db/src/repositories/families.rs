//! Family and member repository

use chrono::{DateTime, NaiveDate, Utc};
use sqlx::{FromRow, PgConnection};
use uuid::Uuid;

use crate::error::DatabaseError;

/// Family and member data access
pub struct FamilyRepository;

impl FamilyRepository {
    pub async fn find(conn: &mut PgConnection, id: Uuid) -> Result<Option<FamilyRow>, DatabaseError> {
        let row = sqlx::query_as::<_, FamilyRow>(
            r#"
            SELECT id, name, email, phone, address, created_at
            FROM families
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(conn)
        .await?;

        Ok(row)
    }

    /// Locks the family row until the end of the transaction
    ///
    /// Returns false when the family does not exist.
    pub async fn lock(conn: &mut PgConnection, id: Uuid) -> Result<bool, DatabaseError> {
        let locked = sqlx::query_scalar::<_, Uuid>("SELECT id FROM families WHERE id = $1 FOR UPDATE")
            .bind(id)
            .fetch_optional(conn)
            .await?;

        Ok(locked.is_some())
    }

    pub async fn insert(conn: &mut PgConnection, row: &FamilyRow) -> Result<(), DatabaseError> {
        sqlx::query(
            r#"
            INSERT INTO families (id, name, email, phone, address, created_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(row.id)
        .bind(&row.name)
        .bind(&row.email)
        .bind(&row.phone)
        .bind(&row.address)
        .bind(row.created_at)
        .execute(conn)
        .await?;

        Ok(())
    }

    pub async fn find_member(conn: &mut PgConnection, id: Uuid) -> Result<Option<MemberRow>, DatabaseError> {
        let row = sqlx::query_as::<_, MemberRow>(
            r#"
            SELECT id, family_id, first_name, last_name, birth_date, is_minor,
                   guardian_last_name, guardian_first_name, created_at
            FROM members
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(conn)
        .await?;

        Ok(row)
    }

    /// Members of a family, by name
    pub async fn members_by_family(conn: &mut PgConnection, family_id: Uuid) -> Result<Vec<MemberRow>, DatabaseError> {
        let rows = sqlx::query_as::<_, MemberRow>(
            r#"
            SELECT id, family_id, first_name, last_name, birth_date, is_minor,
                   guardian_last_name, guardian_first_name, created_at
            FROM members
            WHERE family_id = $1
            ORDER BY last_name, first_name, id
            "#,
        )
        .bind(family_id)
        .fetch_all(conn)
        .await?;

        Ok(rows)
    }

    pub async fn insert_member(conn: &mut PgConnection, row: &MemberRow) -> Result<(), DatabaseError> {
        sqlx::query(
            r#"
            INSERT INTO members (
                id, family_id, first_name, last_name, birth_date, is_minor,
                guardian_last_name, guardian_first_name, created_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            "#,
        )
        .bind(row.id)
        .bind(row.family_id)
        .bind(&row.first_name)
        .bind(&row.last_name)
        .bind(row.birth_date)
        .bind(row.is_minor)
        .bind(&row.guardian_last_name)
        .bind(&row.guardian_first_name)
        .bind(row.created_at)
        .execute(conn)
        .await?;

        Ok(())
    }
}

/// Database row for a family
#[derive(Debug, Clone, FromRow)]
pub struct FamilyRow {
    pub id: Uuid,
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Database row for a member
#[derive(Debug, Clone, FromRow)]
pub struct MemberRow {
    pub id: Uuid,
    pub family_id: Option<Uuid>,
    pub first_name: String,
    pub last_name: String,
    pub birth_date: Option<NaiveDate>,
    pub is_minor: bool,
    pub guardian_last_name: Option<String>,
    pub guardian_first_name: Option<String>,
    pub created_at: DateTime<Utc>,
}
