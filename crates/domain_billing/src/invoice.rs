//! Family invoices
//!
//! A draft invoice is a projection of a family's current obligations for a
//! season and is never stored. Issuing it stores a numbered snapshot whose
//! lines no longer follow later changes to memberships or registrations.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

use core_kernel::{FamilyId, InvoiceId, MemberId, Money, SeasonId, WorkshopId};
use domain_membership::{Member, Membership, Registration, Season, Workshop};

use crate::error::BillingError;

/// Invoice status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InvoiceStatus {
    /// Unsaved projection
    Draft,
    /// Numbered snapshot
    Issued,
    PartiallyPaid,
    Paid,
    Cancelled,
}

impl InvoiceStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            InvoiceStatus::Draft => "draft",
            InvoiceStatus::Issued => "issued",
            InvoiceStatus::PartiallyPaid => "partially_paid",
            InvoiceStatus::Paid => "paid",
            InvoiceStatus::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for InvoiceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A line of an invoice
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvoiceItem {
    pub label: String,
    /// Informational; zero when the discounted total has no exact unit price
    pub unit_price: Money,
    pub quantity: u32,
    pub line_total: Money,
}

impl InvoiceItem {
    /// Line for a season membership
    pub fn membership(member_name: &str, season: &Season, amount: Money) -> Self {
        Self {
            label: format!("{} - Membership {}", member_name, season.label()),
            unit_price: amount,
            quantity: 1,
            line_total: amount,
        }
    }

    /// Line for a workshop registration
    pub fn registration(member_name: &str, workshop_name: &str, quantity: u32, line_total: Money) -> Self {
        Self {
            label: format!("{} - {}", member_name, workshop_name),
            unit_price: line_total.exact_share(quantity).unwrap_or_else(Money::zero),
            quantity,
            line_total,
        }
    }
}

/// An invoice for one family and one season
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Invoice {
    /// `None` while draft
    pub id: Option<InvoiceId>,
    /// `None` while draft
    pub invoice_number: Option<String>,
    pub family_id: FamilyId,
    pub season_id: SeasonId,
    pub status: InvoiceStatus,
    pub items: Vec<InvoiceItem>,
    pub total_amount: Money,
    /// `None` while draft
    pub issued_at: Option<DateTime<Utc>>,
}

impl Invoice {
    /// Creates a draft from its lines
    pub fn draft(family_id: FamilyId, season_id: SeasonId, items: Vec<InvoiceItem>) -> Self {
        let total_amount = items.iter().map(|i| i.line_total).sum();
        Self {
            id: None,
            invoice_number: None,
            family_id,
            season_id,
            status: InvoiceStatus::Draft,
            items,
            total_amount,
            issued_at: None,
        }
    }

    pub fn is_draft(&self) -> bool {
        self.status == InvoiceStatus::Draft
    }

    /// Turns a draft into an issued snapshot
    ///
    /// Lines and total are carried over untouched.
    ///
    /// # Errors
    ///
    /// - `InvoiceAlreadyIssued` if the invoice is not a draft
    /// - `EmptyInvoice` if it has no line
    pub fn issue(self, invoice_number: String, now: DateTime<Utc>) -> Result<Self, BillingError> {
        if !self.is_draft() {
            return Err(BillingError::InvoiceAlreadyIssued {
                family_id: self.family_id,
                season_id: self.season_id,
                invoice_number: self.invoice_number.unwrap_or_default(),
            });
        }
        if self.items.is_empty() {
            return Err(BillingError::EmptyInvoice {
                family_id: self.family_id,
                season_id: self.season_id,
            });
        }

        Ok(Self {
            id: Some(InvoiceId::new_v7()),
            invoice_number: Some(invoice_number),
            status: InvoiceStatus::Issued,
            issued_at: Some(now),
            ..self
        })
    }
}

/// "INV-2024-00001" for the first invoice issued in a season starting in 2024
///
/// `issued_in_start_year` counts every invoice already issued in seasons that
/// share the start year.
pub fn invoice_number(season: &Season, issued_in_start_year: u64) -> String {
    format!("INV-{}-{:05}", season.start_year, issued_in_start_year + 1)
}

/// Projects a family's obligations for a season into a draft invoice
///
/// Membership lines come first in family order, then registration lines by
/// member name and workshop name. Records of other seasons are skipped.
pub fn build_draft_invoice(
    family_id: FamilyId,
    season: &Season,
    members: &[Member],
    memberships: &[Membership],
    registrations: &[Registration],
    workshops: &[Workshop],
) -> Invoice {
    let names: HashMap<MemberId, String> = members.iter().map(|m| (m.id, m.full_name())).collect();
    let workshop_names: HashMap<WorkshopId, &str> = workshops.iter().map(|w| (w.id, w.name.as_str())).collect();

    let member_name = |id: &MemberId| names.get(id).cloned().unwrap_or_else(|| id.to_string());
    let workshop_name = |id: &WorkshopId| {
        workshop_names
            .get(id)
            .map(|n| n.to_string())
            .unwrap_or_else(|| id.to_string())
    };

    let mut season_memberships: Vec<&Membership> =
        memberships.iter().filter(|m| m.season_id == season.id).collect();
    season_memberships.sort_by(|a, b| {
        a.family_order
            .cmp(&b.family_order)
            .then_with(|| member_name(&a.member_id).cmp(&member_name(&b.member_id)))
    });

    let mut season_registrations: Vec<(String, String, &Registration)> = registrations
        .iter()
        .filter(|r| r.season_id == season.id)
        .map(|r| (member_name(&r.member_id), workshop_name(&r.workshop_id), r))
        .collect();
    season_registrations.sort_by(|a, b| a.0.cmp(&b.0).then_with(|| a.1.cmp(&b.1)));

    let items = season_memberships
        .into_iter()
        .map(|m| InvoiceItem::membership(&member_name(&m.member_id), season, m.amount))
        .chain(
            season_registrations
                .into_iter()
                .map(|(member, workshop, r)| InvoiceItem::registration(&member, &workshop, r.quantity, r.total_price)),
        )
        .collect();

    Invoice::draft(family_id, season.id, items)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use core_kernel::Percentage;
    use domain_membership::{
        quote_registration, AdmissionRequest, NewMember, NewMembership, WorkshopPrice,
    };
    use rust_decimal_macros::dec;

    struct Family {
        id: FamilyId,
        season: Season,
        members: Vec<Member>,
        memberships: Vec<Membership>,
        registrations: Vec<Registration>,
        workshops: Vec<Workshop>,
    }

    fn member(family_id: FamilyId, first: &str) -> Member {
        Member::create(NewMember {
            family_id: Some(family_id),
            first_name: first.to_string(),
            last_name: "Martin".to_string(),
            ..Default::default()
        })
        .unwrap()
    }

    fn family() -> Family {
        let id = FamilyId::new();
        let season = Season::new(2024, 2025, Money::new(dec!(100)), Percentage::new(dec!(10)).unwrap()).unwrap();
        let zoe = member(id, "Zoe");
        let adam = member(id, "Adam");
        let memberships: Vec<Membership> = [&zoe, &adam]
            .iter()
            .enumerate()
            .map(|(i, m)| {
                Membership::enroll(
                    NewMembership {
                        member_id: m.id,
                        season_id: season.id,
                        family_order: None,
                        amount: None,
                    },
                    &season,
                    i,
                )
            })
            .collect();

        let pottery = Workshop::new("Pottery", true, Some(5)).unwrap();
        let choir = Workshop::new("Choir", false, None).unwrap();
        let pottery_price = WorkshopPrice::new(pottery.id, season.id, Money::new(dec!(33.33)));
        let choir_price = WorkshopPrice::new(choir.id, season.id, Money::new(dec!(40)));

        let registrations = vec![
            // Adam is the second member: 3 x 33.33 x 0.9 = 89.991 -> 89.99
            Registration::new(
                &AdmissionRequest { member_id: adam.id, workshop_id: pottery.id, season_id: season.id, quantity: 3 },
                quote_registration(Some(&pottery_price), &memberships[1], &season, 3),
            ),
            Registration::new(
                &AdmissionRequest { member_id: zoe.id, workshop_id: choir.id, season_id: season.id, quantity: 1 },
                quote_registration(Some(&choir_price), &memberships[0], &season, 1),
            ),
            Registration::new(
                &AdmissionRequest { member_id: adam.id, workshop_id: choir.id, season_id: season.id, quantity: 1 },
                quote_registration(Some(&choir_price), &memberships[1], &season, 1),
            ),
        ];

        Family {
            id,
            season,
            members: vec![zoe, adam],
            memberships,
            registrations,
            workshops: vec![pottery, choir],
        }
    }

    fn draft(f: &Family) -> Invoice {
        build_draft_invoice(f.id, &f.season, &f.members, &f.memberships, &f.registrations, &f.workshops)
    }

    #[test]
    fn test_draft_lines_and_total() {
        let f = family();
        let invoice = draft(&f);

        assert!(invoice.is_draft());
        assert!(invoice.id.is_none());
        assert!(invoice.invoice_number.is_none());
        assert!(invoice.issued_at.is_none());

        let labels: Vec<&str> = invoice.items.iter().map(|i| i.label.as_str()).collect();
        assert_eq!(
            labels,
            vec![
                "Zoe Martin - Membership 2024-2025",
                "Adam Martin - Membership 2024-2025",
                "Adam Martin - Choir",
                "Adam Martin - Pottery",
                "Zoe Martin - Choir",
            ]
        );
        // 100 + 100 + 36 + 89.99 + 40
        assert_eq!(invoice.total_amount, Money::new(dec!(365.99)));
    }

    #[test]
    fn test_unit_price_only_when_exact() {
        let f = family();
        let invoice = draft(&f);

        let pottery = invoice.items.iter().find(|i| i.label.ends_with("Pottery")).unwrap();
        assert_eq!(pottery.quantity, 3);
        assert_eq!(pottery.line_total, Money::new(dec!(89.99)));
        assert!(pottery.unit_price.is_zero());

        let choir = invoice.items.iter().find(|i| i.label == "Adam Martin - Choir").unwrap();
        assert_eq!(choir.unit_price, Money::new(dec!(36)));
    }

    #[test]
    fn test_other_season_records_skipped() {
        let mut f = family();
        let next = Season::new(2025, 2026, Money::new(dec!(100)), Percentage::zero()).unwrap();
        f.season = next;

        let invoice = draft(&f);
        assert!(invoice.items.is_empty());
        assert!(invoice.total_amount.is_zero());
    }

    #[test]
    fn test_issue_keeps_lines_and_total() {
        let f = family();
        let draft = draft(&f);
        let now = Utc.with_ymd_and_hms(2024, 11, 2, 10, 0, 0).unwrap();

        let issued = draft.clone().issue(invoice_number(&f.season, 6), now).unwrap();

        assert_eq!(issued.status, InvoiceStatus::Issued);
        assert_eq!(issued.invoice_number.as_deref(), Some("INV-2024-00007"));
        assert_eq!(issued.issued_at, Some(now));
        assert!(issued.id.is_some());
        assert_eq!(issued.items, draft.items);
        assert_eq!(issued.total_amount, draft.total_amount);
    }

    #[test]
    fn test_issue_twice_fails() {
        let f = family();
        let now = Utc::now();
        let issued = draft(&f).issue(invoice_number(&f.season, 0), now).unwrap();

        let err = issued.issue(invoice_number(&f.season, 1), now).unwrap_err();
        assert!(matches!(err, BillingError::InvoiceAlreadyIssued { ref invoice_number, .. } if invoice_number == "INV-2024-00001"));
    }

    #[test]
    fn test_empty_draft_cannot_be_issued() {
        let err = Invoice::draft(FamilyId::new(), SeasonId::new(), vec![])
            .issue("INV-2024-00001".to_string(), Utc::now())
            .unwrap_err();
        assert!(matches!(err, BillingError::EmptyInvoice { .. }));
    }
}
