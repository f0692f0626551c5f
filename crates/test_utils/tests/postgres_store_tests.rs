//! Integration tests for the PostgreSQL store
//!
//! Each test starts its own PostgreSQL container, so they need Docker and are
//! ignored by default. Run them with `cargo test -p test_utils -- --ignored`.

use std::sync::Arc;

use rust_decimal_macros::dec;

use core_kernel::{Clock, ErrorCode, PortError};
use domain_billing::{
    AssociationStore, EnrollmentService, FamilyPaymentService, InvoiceService, NewSeason,
    PaymentStatus, SeasonService,
};
use domain_membership::{AdmissionRequest, Family, Membership, MembershipStatus, SeasonStatus};
use infra_db::PostgresAssociationStore;
use test_utils::{
    assert_all_memberships, assert_error_code, assert_money_eq, assert_settled, assert_stats,
    assert_unsettled, db_test, EntityFixtures, PaymentBuilder, Scenario, ScenarioBuilder,
    TemporalFixtures,
};

fn clock() -> Arc<dyn Clock> {
    Arc::new(TemporalFixtures::clock())
}

fn payments(store: &PostgresAssociationStore) -> FamilyPaymentService {
    FamilyPaymentService::new(Arc::new(store.clone()), clock())
}

async fn memberships(store: &PostgresAssociationStore, scenario: &Scenario) -> Vec<Membership> {
    let member_ids: Vec<_> = scenario.members.iter().map(|m| m.id).collect();
    let mut tx = store.begin().await.unwrap();
    let memberships = tx.memberships(&member_ids, scenario.season_id()).await.unwrap();
    tx.commit().await.unwrap();
    memberships
}

// ============================================================================
// Payments and reconciliation
// ============================================================================

db_test!(test_full_payment_completes_memberships, store, {
    let scenario = ScenarioBuilder::new().with_members(2).build();
    scenario.seed_postgres(&store).await.unwrap();

    let stats = payments(&store)
        .family_balance(scenario.family_id(), scenario.season_id())
        .await
        .unwrap();
    assert_stats(&stats, dec!(0), dec!(60), dec!(60));

    let recorded = payments(&store)
        .add_family_payment(PaymentBuilder::for_scenario(&scenario).with_amount(dec!(60)).build())
        .await
        .unwrap();

    assert_eq!(recorded.payment.status, PaymentStatus::Completed);
    assert_settled(&recorded.reconciliations[0].stats);
    assert_all_memberships(&memberships(&store, &scenario).await, MembershipStatus::Completed);
});

db_test!(test_deleting_payment_reopens_memberships, store, {
    let scenario = ScenarioBuilder::new().with_members(1).build();
    scenario.seed_postgres(&store).await.unwrap();
    let recorded = payments(&store)
        .add_family_payment(PaymentBuilder::for_scenario(&scenario).with_amount(dec!(30)).build())
        .await
        .unwrap();

    let outcome = payments(&store).delete_family_payment(recorded.payment.id).await.unwrap();

    assert_eq!(outcome.updated, 1);
    assert_unsettled(&outcome.stats);
    assert_all_memberships(&memberships(&store, &scenario).await, MembershipStatus::Pending);
});

db_test!(test_concurrent_deletes_report_payment_not_found, store, {
    let scenario = ScenarioBuilder::new().with_members(1).build();
    scenario.seed_postgres(&store).await.unwrap();
    let recorded = payments(&store)
        .add_family_payment(PaymentBuilder::for_scenario(&scenario).with_amount(dec!(30)).build())
        .await
        .unwrap();
    let id = recorded.payment.id;

    let first = payments(&store);
    let second = payments(&store);
    let (a, b) = tokio::join!(first.delete_family_payment(id), second.delete_family_payment(id));

    let (won, lost) = if a.is_ok() { (a, b) } else { (b, a) };
    assert_eq!(won.unwrap().updated, 1);
    assert_error_code(&lost, ErrorCode::PaymentNotFound);
    assert_all_memberships(&memberships(&store, &scenario).await, MembershipStatus::Pending);
});

db_test!(test_future_check_stays_pending, store, {
    let scenario = ScenarioBuilder::new().with_members(1).build();
    scenario.seed_postgres(&store).await.unwrap();

    let recorded = payments(&store)
        .add_family_payment(
            PaymentBuilder::for_scenario(&scenario)
                .with_amount(dec!(30))
                .check_cashed_on(TemporalFixtures::next_week())
                .build(),
        )
        .await
        .unwrap();

    assert_eq!(recorded.payment.status, PaymentStatus::Pending);
    assert_money_eq(&recorded.reconciliations[0].stats.total_paid, dec!(0));
    assert_all_memberships(&memberships(&store, &scenario).await, MembershipStatus::Pending);
});

// ============================================================================
// Registrations
// ============================================================================

db_test!(test_registration_discount_and_duplicate, store, {
    let scenario = ScenarioBuilder::new()
        .with_members(2)
        .with_workshop(EntityFixtures::pottery(), dec!(120))
        .build();
    scenario.seed_postgres(&store).await.unwrap();
    let enrollment = EnrollmentService::new(Arc::new(store.clone()));
    let request = AdmissionRequest {
        member_id: scenario.members[1].id,
        workshop_id: scenario.workshops[0].id,
        season_id: scenario.season_id(),
        quantity: 1,
    };

    let change = enrollment.create_registration(request).await.unwrap();
    assert_money_eq(&change.registration.total_price, dec!(108));

    let duplicate = enrollment.create_registration(request).await;
    assert_error_code(&duplicate, ErrorCode::WorkshopRegistrationAlreadyExists);
});

// ============================================================================
// Invoices
// ============================================================================

db_test!(test_invoice_numbers_per_season, store, {
    let martin = ScenarioBuilder::new().with_members(1).build();
    martin.seed_postgres(&store).await.unwrap();
    let durand = Family::new("Durand");
    store.insert_family(&durand).await.unwrap();
    let member = EntityFixtures::adult(&durand, "Lea");
    store.insert_member(&member).await.unwrap();
    EnrollmentService::new(Arc::new(store.clone()))
        .enroll_member(domain_membership::NewMembership {
            member_id: member.id,
            season_id: martin.season_id(),
            family_order: None,
            amount: None,
        })
        .await
        .unwrap();

    let invoices = InvoiceService::new(Arc::new(store.clone()), clock());
    let first = invoices.issue_invoice(martin.family_id(), martin.season_id()).await.unwrap();
    let second = invoices.issue_invoice(durand.id, martin.season_id()).await.unwrap();

    assert_eq!(first.invoice_number.as_deref(), Some("INV-2024-00001"));
    assert_eq!(second.invoice_number.as_deref(), Some("INV-2024-00002"));

    let fetched = invoices
        .get_invoice_for_family_and_season(martin.family_id(), martin.season_id())
        .await
        .unwrap();
    assert_eq!(fetched.invoice_number, first.invoice_number);
    assert_eq!(fetched.items, first.items);

    let again = invoices.issue_invoice(martin.family_id(), martin.season_id()).await;
    assert_error_code(&again, ErrorCode::InvoiceAlreadyIssued);
});

db_test!(test_invoice_numbers_shared_by_start_year, store, {
    let scenario = ScenarioBuilder::new().with_members(1).build();
    scenario.seed_postgres(&store).await.unwrap();
    let longer = SeasonService::new(Arc::new(store.clone()))
        .create_season(NewSeason {
            start_year: 2024,
            end_year: 2026,
            membership_amount: core_kernel::Money::new(dec!(45)),
            discount_percent: core_kernel::Percentage::zero(),
        })
        .await
        .unwrap();
    EnrollmentService::new(Arc::new(store.clone()))
        .enroll_member(domain_membership::NewMembership {
            member_id: scenario.members[0].id,
            season_id: longer.id,
            family_order: None,
            amount: None,
        })
        .await
        .unwrap();

    let invoices = InvoiceService::new(Arc::new(store.clone()), clock());
    let first = invoices.issue_invoice(scenario.family_id(), scenario.season_id()).await.unwrap();
    let second = invoices.issue_invoice(scenario.family_id(), longer.id).await.unwrap();

    assert_eq!(first.invoice_number.as_deref(), Some("INV-2024-00001"));
    assert_eq!(second.invoice_number.as_deref(), Some("INV-2024-00002"));
});

// ============================================================================
// Seasons
// ============================================================================

db_test!(test_single_active_season, store, {
    let seasons = SeasonService::new(Arc::new(store.clone()));
    let new_season = |start_year: i32| NewSeason {
        start_year,
        end_year: start_year + 1,
        membership_amount: core_kernel::Money::new(dec!(30)),
        discount_percent: core_kernel::Percentage::zero(),
    };
    let first = seasons.create_season(new_season(2024)).await.unwrap();
    let second = seasons.create_season(new_season(2025)).await.unwrap();

    seasons.activate_season(first.id).await.unwrap();
    let activated = seasons.activate_season(second.id).await.unwrap();
    assert_eq!(activated.status, SeasonStatus::Active);

    let mut tx = store.begin().await.unwrap();
    let active: Vec<_> = tx
        .list_seasons()
        .await
        .unwrap()
        .into_iter()
        .filter(|s| s.status == SeasonStatus::Active)
        .collect();
    tx.commit().await.unwrap();
    assert_eq!(active.len(), 1);
    assert_eq!(active[0].id, second.id);

    let duplicate = seasons.create_season(new_season(2024)).await;
    assert_error_code(&duplicate, ErrorCode::SeasonAlreadyExists);
});

// ============================================================================
// Units of work
// ============================================================================

db_test!(test_uncommitted_work_is_rolled_back, store, {
    let season = EntityFixtures::season();

    let mut tx = store.begin().await.unwrap();
    tx.insert_season(&season).await.unwrap();
    drop(tx);

    let mut tx = store.begin().await.unwrap();
    assert!(tx.find_season(season.id).await.unwrap().is_none());
});

db_test!(test_unique_membership_reports_conflict, store, {
    let scenario = ScenarioBuilder::new().with_members(1).build();
    scenario.seed_postgres(&store).await.unwrap();
    let mut duplicate = scenario.memberships[0].clone();
    duplicate.id = core_kernel::MembershipId::new_v7();

    let mut tx = store.begin().await.unwrap();
    let err = tx.insert_membership(&duplicate).await.unwrap_err();

    assert!(matches!(err, PortError::Conflict { .. }), "unexpected error: {err:?}");
});

db_test!(test_missing_rows_report_not_found, store, {
    let mut tx = store.begin().await.unwrap();

    assert!(tx.find_family(core_kernel::FamilyId::new()).await.unwrap().is_none());
    let err = tx.delete_payment(core_kernel::PaymentId::new()).await.unwrap_err();
    assert!(matches!(err, PortError::NotFound { .. }), "unexpected error: {err:?}");
});
