//! Conversions between database rows and domain models

use core_kernel::{
    FamilyId, InvoiceId, MemberId, MembershipId, Money, PaymentId, Percentage, RegistrationId,
    SeasonId, WorkshopId, WorkshopPriceId,
};
use domain_billing::{Invoice, InvoiceItem, InvoiceStatus, Payment, PaymentStatus, PaymentType};
use domain_membership::{
    Family, Guardian, Member, Membership, MembershipStatus, Registration, Season, SeasonStatus,
    Workshop, WorkshopPrice, WorkshopStatus,
};
use rust_decimal::Decimal;

use crate::error::DatabaseError;
use crate::repositories::enrollment::{
    MembershipRow, MembershipStatus as DbMembershipStatus, RegistrationRow,
};
use crate::repositories::families::{FamilyRow, MemberRow};
use crate::repositories::invoices::{InvoiceItemRow, InvoiceRow, InvoiceStatus as DbInvoiceStatus};
use crate::repositories::payments::{
    PaymentRow, PaymentStatus as DbPaymentStatus, PaymentType as DbPaymentType,
};
use crate::repositories::seasons::{SeasonRow, SeasonStatus as DbSeasonStatus};
use crate::repositories::workshops::{WorkshopPriceRow, WorkshopRow, WorkshopStatus as DbWorkshopStatus};

// =============================================================================
// Scalars
// =============================================================================

fn percentage(value: Decimal) -> Result<Percentage, DatabaseError> {
    Percentage::new(value).map_err(|e| DatabaseError::SerializationError(e.to_string()))
}

fn count_from_db(value: i32, column: &str) -> Result<u32, DatabaseError> {
    u32::try_from(value)
        .map_err(|_| DatabaseError::SerializationError(format!("negative {column}: {value}")))
}

fn count_to_db(value: u32, column: &str) -> Result<i32, DatabaseError> {
    i32::try_from(value)
        .map_err(|_| DatabaseError::SerializationError(format!("{column} out of range: {value}")))
}

// =============================================================================
// Families and members
// =============================================================================

pub fn family_from_row(row: FamilyRow) -> Family {
    Family {
        id: FamilyId::from(row.id),
        name: row.name,
        email: row.email,
        phone: row.phone,
        address: row.address,
        created_at: row.created_at,
    }
}

pub fn family_to_row(family: &Family) -> FamilyRow {
    FamilyRow {
        id: family.id.into(),
        name: family.name.clone(),
        email: family.email.clone(),
        phone: family.phone.clone(),
        address: family.address.clone(),
        created_at: family.created_at,
    }
}

pub fn member_from_row(row: MemberRow) -> Member {
    let guardian = match (row.guardian_last_name, row.guardian_first_name) {
        (Some(last_name), Some(first_name)) => Some(Guardian { last_name, first_name }),
        _ => None,
    };

    Member {
        id: MemberId::from(row.id),
        family_id: row.family_id.map(FamilyId::from),
        first_name: row.first_name,
        last_name: row.last_name,
        birth_date: row.birth_date,
        is_minor: row.is_minor,
        guardian,
        created_at: row.created_at,
    }
}

pub fn member_to_row(member: &Member) -> MemberRow {
    MemberRow {
        id: member.id.into(),
        family_id: member.family_id.map(Into::into),
        first_name: member.first_name.clone(),
        last_name: member.last_name.clone(),
        birth_date: member.birth_date,
        is_minor: member.is_minor,
        guardian_last_name: member.guardian.as_ref().map(|g| g.last_name.clone()),
        guardian_first_name: member.guardian.as_ref().map(|g| g.first_name.clone()),
        created_at: member.created_at,
    }
}

// =============================================================================
// Seasons and workshops
// =============================================================================

pub fn season_from_row(row: SeasonRow) -> Result<Season, DatabaseError> {
    Ok(Season {
        id: SeasonId::from(row.id),
        start_year: row.start_year,
        end_year: row.end_year,
        membership_amount: Money::new(row.membership_amount),
        discount_percent: percentage(row.discount_percent)?,
        status: match row.status {
            DbSeasonStatus::Active => SeasonStatus::Active,
            DbSeasonStatus::Inactive => SeasonStatus::Inactive,
        },
        created_at: row.created_at,
    })
}

pub fn season_to_row(season: &Season) -> SeasonRow {
    SeasonRow {
        id: season.id.into(),
        start_year: season.start_year,
        end_year: season.end_year,
        membership_amount: season.membership_amount.amount(),
        discount_percent: season.discount_percent.value(),
        status: match season.status {
            SeasonStatus::Active => DbSeasonStatus::Active,
            SeasonStatus::Inactive => DbSeasonStatus::Inactive,
        },
        created_at: season.created_at,
    }
}

pub fn workshop_from_row(row: WorkshopRow) -> Result<Workshop, DatabaseError> {
    Ok(Workshop {
        id: WorkshopId::from(row.id),
        name: row.name,
        status: match row.status {
            DbWorkshopStatus::Active => WorkshopStatus::Active,
            DbWorkshopStatus::Inactive => WorkshopStatus::Inactive,
        },
        allow_multiple: row.allow_multiple,
        max_per_member: row
            .max_per_member
            .map(|max| count_from_db(max, "max_per_member"))
            .transpose()?,
        created_at: row.created_at,
    })
}

pub fn workshop_to_row(workshop: &Workshop) -> Result<WorkshopRow, DatabaseError> {
    Ok(WorkshopRow {
        id: workshop.id.into(),
        name: workshop.name.clone(),
        status: match workshop.status {
            WorkshopStatus::Active => DbWorkshopStatus::Active,
            WorkshopStatus::Inactive => DbWorkshopStatus::Inactive,
        },
        allow_multiple: workshop.allow_multiple,
        max_per_member: workshop
            .max_per_member
            .map(|max| count_to_db(max, "max_per_member"))
            .transpose()?,
        created_at: workshop.created_at,
    })
}

pub fn price_from_row(row: WorkshopPriceRow) -> WorkshopPrice {
    WorkshopPrice {
        id: WorkshopPriceId::from(row.id),
        workshop_id: WorkshopId::from(row.workshop_id),
        season_id: SeasonId::from(row.season_id),
        amount: Money::new(row.amount),
    }
}

pub fn price_to_row(price: &WorkshopPrice) -> WorkshopPriceRow {
    WorkshopPriceRow {
        id: price.id.into(),
        workshop_id: price.workshop_id.into(),
        season_id: price.season_id.into(),
        amount: price.amount.amount(),
    }
}

// =============================================================================
// Memberships and registrations
// =============================================================================

pub fn membership_status_to_db(status: MembershipStatus) -> DbMembershipStatus {
    match status {
        MembershipStatus::Pending => DbMembershipStatus::Pending,
        MembershipStatus::Completed => DbMembershipStatus::Completed,
        MembershipStatus::Cancelled => DbMembershipStatus::Cancelled,
    }
}

fn membership_status_from_db(status: DbMembershipStatus) -> MembershipStatus {
    match status {
        DbMembershipStatus::Pending => MembershipStatus::Pending,
        DbMembershipStatus::Completed => MembershipStatus::Completed,
        DbMembershipStatus::Cancelled => MembershipStatus::Cancelled,
    }
}

pub fn membership_from_row(row: MembershipRow) -> Result<Membership, DatabaseError> {
    Ok(Membership {
        id: MembershipId::from(row.id),
        member_id: MemberId::from(row.member_id),
        season_id: SeasonId::from(row.season_id),
        family_order: count_from_db(row.family_order, "family_order")?,
        amount: Money::new(row.amount),
        status: membership_status_from_db(row.status),
        created_at: row.created_at,
    })
}

pub fn membership_to_row(membership: &Membership) -> Result<MembershipRow, DatabaseError> {
    Ok(MembershipRow {
        id: membership.id.into(),
        member_id: membership.member_id.into(),
        season_id: membership.season_id.into(),
        family_order: count_to_db(membership.family_order, "family_order")?,
        amount: membership.amount.amount(),
        status: membership_status_to_db(membership.status),
        created_at: membership.created_at,
    })
}

pub fn registration_from_row(row: RegistrationRow) -> Result<Registration, DatabaseError> {
    Ok(Registration {
        id: RegistrationId::from(row.id),
        member_id: MemberId::from(row.member_id),
        workshop_id: WorkshopId::from(row.workshop_id),
        season_id: SeasonId::from(row.season_id),
        quantity: count_from_db(row.quantity, "quantity")?,
        total_price: Money::new(row.total_price),
        discount_percent: percentage(row.discount_percent)?,
        created_at: row.created_at,
        updated_at: row.updated_at,
    })
}

pub fn registration_to_row(registration: &Registration) -> Result<RegistrationRow, DatabaseError> {
    Ok(RegistrationRow {
        id: registration.id.into(),
        member_id: registration.member_id.into(),
        workshop_id: registration.workshop_id.into(),
        season_id: registration.season_id.into(),
        quantity: count_to_db(registration.quantity, "quantity")?,
        total_price: registration.total_price.amount(),
        discount_percent: registration.discount_percent.value(),
        created_at: registration.created_at,
        updated_at: registration.updated_at,
    })
}

// =============================================================================
// Payments
// =============================================================================

pub fn payment_from_row(row: PaymentRow) -> Payment {
    Payment {
        id: PaymentId::from(row.id),
        family_id: FamilyId::from(row.family_id),
        season_id: SeasonId::from(row.season_id),
        amount: Money::new(row.amount),
        payment_type: match row.payment_type {
            DbPaymentType::Cash => PaymentType::Cash,
            DbPaymentType::Check => PaymentType::Check,
            DbPaymentType::Transfer => PaymentType::Transfer,
            DbPaymentType::Card => PaymentType::Card,
        },
        payment_date: row.payment_date,
        cashing_date: row.cashing_date,
        status: match row.status {
            DbPaymentStatus::Pending => PaymentStatus::Pending,
            DbPaymentStatus::Completed => PaymentStatus::Completed,
            DbPaymentStatus::Cancelled => PaymentStatus::Cancelled,
        },
        reference: row.reference,
        notes: row.notes,
        created_at: row.created_at,
        updated_at: row.updated_at,
    }
}

pub fn payment_to_row(payment: &Payment) -> PaymentRow {
    PaymentRow {
        id: payment.id.into(),
        family_id: payment.family_id.into(),
        season_id: payment.season_id.into(),
        amount: payment.amount.amount(),
        payment_type: match payment.payment_type {
            PaymentType::Cash => DbPaymentType::Cash,
            PaymentType::Check => DbPaymentType::Check,
            PaymentType::Transfer => DbPaymentType::Transfer,
            PaymentType::Card => DbPaymentType::Card,
        },
        payment_date: payment.payment_date,
        cashing_date: payment.cashing_date,
        status: match payment.status {
            PaymentStatus::Pending => DbPaymentStatus::Pending,
            PaymentStatus::Completed => DbPaymentStatus::Completed,
            PaymentStatus::Cancelled => DbPaymentStatus::Cancelled,
        },
        reference: payment.reference.clone(),
        notes: payment.notes.clone(),
        created_at: payment.created_at,
        updated_at: payment.updated_at,
    }
}

// =============================================================================
// Invoices
// =============================================================================

pub fn invoice_from_rows(row: InvoiceRow, items: Vec<InvoiceItemRow>) -> Result<Invoice, DatabaseError> {
    let items = items
        .into_iter()
        .map(|item| {
            Ok(InvoiceItem {
                label: item.label,
                unit_price: Money::new(item.unit_price),
                quantity: count_from_db(item.quantity, "quantity")?,
                line_total: Money::new(item.line_total),
            })
        })
        .collect::<Result<Vec<_>, DatabaseError>>()?;

    Ok(Invoice {
        id: Some(InvoiceId::from(row.id)),
        invoice_number: Some(row.invoice_number),
        family_id: FamilyId::from(row.family_id),
        season_id: SeasonId::from(row.season_id),
        status: match row.status {
            DbInvoiceStatus::Draft => InvoiceStatus::Draft,
            DbInvoiceStatus::Issued => InvoiceStatus::Issued,
            DbInvoiceStatus::PartiallyPaid => InvoiceStatus::PartiallyPaid,
            DbInvoiceStatus::Paid => InvoiceStatus::Paid,
            DbInvoiceStatus::Cancelled => InvoiceStatus::Cancelled,
        },
        items,
        total_amount: Money::new(row.total_amount),
        issued_at: Some(row.issued_at),
    })
}

/// Splits an issued invoice into its header and line rows
///
/// Drafts are never stored and fail with `SerializationError`.
pub fn invoice_to_rows(invoice: &Invoice) -> Result<(InvoiceRow, Vec<InvoiceItemRow>), DatabaseError> {
    let (Some(id), Some(number), Some(issued_at)) =
        (invoice.id, invoice.invoice_number.as_ref(), invoice.issued_at)
    else {
        return Err(DatabaseError::SerializationError(
            "only issued invoices can be stored".to_string(),
        ));
    };

    let row = InvoiceRow {
        id: id.into(),
        invoice_number: number.clone(),
        family_id: invoice.family_id.into(),
        season_id: invoice.season_id.into(),
        status: match invoice.status {
            InvoiceStatus::Draft => DbInvoiceStatus::Draft,
            InvoiceStatus::Issued => DbInvoiceStatus::Issued,
            InvoiceStatus::PartiallyPaid => DbInvoiceStatus::PartiallyPaid,
            InvoiceStatus::Paid => DbInvoiceStatus::Paid,
            InvoiceStatus::Cancelled => DbInvoiceStatus::Cancelled,
        },
        total_amount: invoice.total_amount.amount(),
        issued_at,
    };

    let items = invoice
        .items
        .iter()
        .enumerate()
        .map(|(position, item)| {
            Ok(InvoiceItemRow {
                invoice_id: row.id,
                position: count_to_db(position as u32, "position")?,
                label: item.label.clone(),
                unit_price: item.unit_price.amount(),
                quantity: count_to_db(item.quantity, "quantity")?,
                line_total: item.line_total.amount(),
            })
        })
        .collect::<Result<Vec<_>, DatabaseError>>()?;

    Ok((row, items))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use rust_decimal_macros::dec;

    #[test]
    fn test_member_without_guardian_names_has_no_guardian() {
        let row = MemberRow {
            id: uuid::Uuid::new_v4(),
            family_id: None,
            first_name: "Léa".to_string(),
            last_name: "Martin".to_string(),
            birth_date: None,
            is_minor: false,
            guardian_last_name: Some("Martin".to_string()),
            guardian_first_name: None,
            created_at: Utc::now(),
        };

        let member = member_from_row(row);
        assert!(member.guardian.is_none());
        assert!(member.family_id.is_none());
    }

    #[test]
    fn test_out_of_range_discount_is_rejected() {
        let row = SeasonRow {
            id: uuid::Uuid::new_v4(),
            start_year: 2024,
            end_year: 2025,
            membership_amount: dec!(50),
            discount_percent: dec!(140),
            status: DbSeasonStatus::Inactive,
            created_at: Utc::now(),
        };

        assert!(matches!(
            season_from_row(row),
            Err(DatabaseError::SerializationError(_))
        ));
    }

    #[test]
    fn test_negative_quantity_is_rejected() {
        assert!(count_from_db(-1, "quantity").is_err());
        assert_eq!(count_from_db(3, "quantity").ok(), Some(3));
    }

    #[test]
    fn test_draft_invoice_cannot_be_stored() {
        let draft = Invoice::draft(FamilyId::new(), SeasonId::new(), Vec::new());
        assert!(invoice_to_rows(&draft).is_err());
    }

    #[test]
    fn test_issued_invoice_lines_keep_their_order() {
        let items = vec![
            InvoiceItem {
                label: "Léa Martin - Membership 2024-2025".to_string(),
                unit_price: Money::new(dec!(50)),
                quantity: 1,
                line_total: Money::new(dec!(50)),
            },
            InvoiceItem {
                label: "Léa Martin - Pottery".to_string(),
                unit_price: Money::new(dec!(120)),
                quantity: 2,
                line_total: Money::new(dec!(240)),
            },
        ];
        let invoice = Invoice::draft(FamilyId::new(), SeasonId::new(), items)
            .issue("INV-2024-00001".to_string(), Utc::now())
            .expect("non-empty draft issues");

        let (row, lines) = invoice_to_rows(&invoice).expect("issued invoice converts");
        assert_eq!(row.invoice_number, "INV-2024-00001");
        assert_eq!(lines.iter().map(|l| l.position).collect::<Vec<_>>(), vec![0, 1]);

        let restored = invoice_from_rows(row, lines).expect("rows convert back");
        assert_eq!(restored.items, invoice.items);
        assert_eq!(restored.total_amount, Money::new(dec!(290)));
    }
}
