//! Issued invoice repository
//!
//! Only issued invoices are stored; drafts are computed on demand. Lines are
//! kept in `invoice_items` in their printed order.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::{FromRow, PgConnection};
use uuid::Uuid;

use crate::error::DatabaseError;

/// Invoice data access
pub struct InvoiceRepository;

impl InvoiceRepository {
    /// The invoice of a family for a season with its lines
    pub async fn find_for(
        conn: &mut PgConnection,
        family_id: Uuid,
        season_id: Uuid,
    ) -> Result<Option<(InvoiceRow, Vec<InvoiceItemRow>)>, DatabaseError> {
        let invoice = sqlx::query_as::<_, InvoiceRow>(
            r#"
            SELECT id, invoice_number, family_id, season_id, status, total_amount, issued_at
            FROM invoices
            WHERE family_id = $1 AND season_id = $2
            "#,
        )
        .bind(family_id)
        .bind(season_id)
        .fetch_optional(&mut *conn)
        .await?;

        let Some(invoice) = invoice else {
            return Ok(None);
        };

        let items = sqlx::query_as::<_, InvoiceItemRow>(
            r#"
            SELECT invoice_id, position, label, unit_price, quantity, line_total
            FROM invoice_items
            WHERE invoice_id = $1
            ORDER BY position
            "#,
        )
        .bind(invoice.id)
        .fetch_all(&mut *conn)
        .await?;

        Ok(Some((invoice, items)))
    }

    /// Number of invoices issued for a season
    pub async fn count_for_start_year(conn: &mut PgConnection, start_year: i32) -> Result<i64, DatabaseError> {
        let count = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(*)
            FROM invoices i
            JOIN seasons s ON s.id = i.season_id
            WHERE s.start_year = $1
            "#,
        )
        .bind(start_year)
        .fetch_one(conn)
        .await?;

        Ok(count)
    }

    /// Inserts an invoice and its lines
    ///
    /// A second invoice for the same family and season, or a reused number,
    /// fails with `DuplicateEntry`.
    pub async fn insert(
        conn: &mut PgConnection,
        invoice: &InvoiceRow,
        items: &[InvoiceItemRow],
    ) -> Result<(), DatabaseError> {
        sqlx::query(
            r#"
            INSERT INTO invoices (id, invoice_number, family_id, season_id, status, total_amount, issued_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(invoice.id)
        .bind(&invoice.invoice_number)
        .bind(invoice.family_id)
        .bind(invoice.season_id)
        .bind(invoice.status)
        .bind(invoice.total_amount)
        .bind(invoice.issued_at)
        .execute(&mut *conn)
        .await?;

        for item in items {
            sqlx::query(
                r#"
                INSERT INTO invoice_items (invoice_id, position, label, unit_price, quantity, line_total)
                VALUES ($1, $2, $3, $4, $5, $6)
                "#,
            )
            .bind(item.invoice_id)
            .bind(item.position)
            .bind(&item.label)
            .bind(item.unit_price)
            .bind(item.quantity)
            .bind(item.line_total)
            .execute(&mut *conn)
            .await?;
        }

        Ok(())
    }
}

/// Invoice status
#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "invoice_status", rename_all = "snake_case")]
pub enum InvoiceStatus {
    Draft,
    Issued,
    PartiallyPaid,
    Paid,
    Cancelled,
}

/// Database row for an issued invoice
#[derive(Debug, Clone, FromRow)]
pub struct InvoiceRow {
    pub id: Uuid,
    pub invoice_number: String,
    pub family_id: Uuid,
    pub season_id: Uuid,
    pub status: InvoiceStatus,
    pub total_amount: Decimal,
    pub issued_at: DateTime<Utc>,
}

/// Database row for an invoice line
#[derive(Debug, Clone, FromRow)]
pub struct InvoiceItemRow {
    pub invoice_id: Uuid,
    pub position: i32,
    pub label: String,
    pub unit_price: Decimal,
    pub quantity: i32,
    pub line_total: Decimal,
}
