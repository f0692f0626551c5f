//! HTTP tests for the association billing API, run against the in-memory
//! store

use std::sync::Arc;

use axum::http::{HeaderName, HeaderValue, StatusCode};
use axum_test::TestServer;
use rust_decimal::Decimal;
use serde_json::{json, Value};

use domain_billing::InMemoryAssociationStore;
use interface_api::{config::ApiConfig, create_router};
use test_utils::{EntityFixtures, Scenario, ScenarioBuilder, TemporalFixtures};

struct TestApp {
    server: TestServer,
    scenario: Scenario,
}

impl TestApp {
    /// A server over a store holding one family with `members` memberships
    /// priced 30.00, a single-unit workshop priced 120.00 and a workshop
    /// capped at three units priced 40.00
    async fn new(members: usize) -> Self {
        let store = Arc::new(InMemoryAssociationStore::new());
        let scenario = ScenarioBuilder::new()
            .with_members(members)
            .with_workshop(EntityFixtures::pottery(), Decimal::from(120))
            .with_workshop(EntityFixtures::swimming(), Decimal::from(40))
            .build();
        scenario.seed_memory(&store).await;

        let app = create_router(store, Arc::new(TemporalFixtures::clock()), ApiConfig::default());
        Self {
            server: TestServer::new(app).unwrap(),
            scenario,
        }
    }

    fn family_path(&self, suffix: &str) -> String {
        format!(
            "/api/v1/families/{}/seasons/{}/{}",
            self.scenario.family_id().as_uuid(),
            self.scenario.season_id().as_uuid(),
            suffix
        )
    }

    fn payment_body(&self, amount: &str) -> Value {
        json!({
            "family_id": self.scenario.family_id(),
            "season_id": self.scenario.season_id(),
            "amount": amount,
            "payment_type": "cash",
            "payment_date": TemporalFixtures::now(),
        })
    }

    async fn balance(&self) -> Value {
        let response = self.server.get(&self.family_path("balance")).await;
        response.assert_status_ok();
        response.json::<Value>()
    }
}

fn decimal(value: &Value) -> Decimal {
    value
        .as_str()
        .map(|s| s.parse().unwrap())
        .or_else(|| value.as_f64().map(|f| Decimal::try_from(f).unwrap()))
        .unwrap_or_else(|| panic!("not a decimal: {value}"))
}

// ============================================================================
// Health
// ============================================================================

#[tokio::test]
async fn test_health_endpoints() {
    let app = TestApp::new(0).await;

    let response = app.server.get("/health").await;
    response.assert_status_ok();
    assert_eq!(response.json::<Value>()["status"], "healthy");

    let response = app.server.get("/health/ready").await;
    response.assert_status_ok();
    assert_eq!(response.json::<Value>()["status"], "ready");
}

#[tokio::test]
async fn test_request_id_is_propagated() {
    let app = TestApp::new(0).await;

    let response = app
        .server
        .get("/health")
        .add_header(
            HeaderName::from_static("x-request-id"),
            HeaderValue::from_static("req-42"),
        )
        .await;

    assert_eq!(response.header(HeaderName::from_static("x-request-id")), "req-42");
}

// ============================================================================
// Payments
// ============================================================================

#[tokio::test]
async fn test_payment_settles_family_balance() {
    let app = TestApp::new(2).await;
    let before = app.balance().await;
    assert_eq!(decimal(&before["total_due"]), Decimal::from(60));

    let response = app
        .server
        .post("/api/v1/payments")
        .json(&app.payment_body("60.00"))
        .await;

    response.assert_status(StatusCode::CREATED);
    let body = response.json::<Value>();
    assert_eq!(body["payment"]["status"], "completed");
    assert_eq!(body["reconciliations"][0]["updated"], 2);

    let after = app.balance().await;
    assert_eq!(decimal(&after["balance"]), Decimal::ZERO);
}

#[tokio::test]
async fn test_deleting_payment_reopens_balance() {
    let app = TestApp::new(1).await;
    let created = app
        .server
        .post("/api/v1/payments")
        .json(&app.payment_body("30.00"))
        .await
        .json::<Value>();
    let id = created["payment"]["id"].as_str().unwrap().to_string();

    let response = app.server.delete(&format!("/api/v1/payments/{id}")).await;

    response.assert_status_ok();
    assert_eq!(decimal(&response.json::<Value>()["stats"]["balance"]), Decimal::from(30));

    let again = app.server.delete(&format!("/api/v1/payments/{id}")).await;
    again.assert_status(StatusCode::NOT_FOUND);
    assert_eq!(again.json::<Value>()["code"], "PAYMENT_NOT_FOUND");
}

#[tokio::test]
async fn test_clearing_cashing_date_completes_check() {
    let app = TestApp::new(1).await;
    let mut body = app.payment_body("30.00");
    body["payment_type"] = json!("check");
    body["cashing_date"] = json!(TemporalFixtures::next_week());
    let created = app.server.post("/api/v1/payments").json(&body).await.json::<Value>();
    assert_eq!(created["payment"]["status"], "pending");
    let id = created["payment"]["id"].as_str().unwrap().to_string();

    let response = app
        .server
        .put(&format!("/api/v1/payments/{id}"))
        .json(&json!({ "cashing_date": null }))
        .await;

    response.assert_status_ok();
    assert_eq!(response.json::<Value>()["payment"]["status"], "completed");
}

#[tokio::test]
async fn test_payment_errors_carry_codes() {
    let app = TestApp::new(1).await;

    let mut unknown_family = app.payment_body("10.00");
    unknown_family["family_id"] = json!(uuid::Uuid::new_v4());
    let response = app.server.post("/api/v1/payments").json(&unknown_family).await;
    response.assert_status(StatusCode::NOT_FOUND);
    let body = response.json::<Value>();
    assert_eq!(body["error"], "not_found");
    assert_eq!(body["code"], "FAMILY_NOT_FOUND");

    let response = app
        .server
        .post("/api/v1/payments")
        .json(&app.payment_body("0"))
        .await;
    response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(response.json::<Value>()["code"], "INVALID_AMOUNT");

    for amount in ["79228162514264337593543950335", "10.005"] {
        let response = app
            .server
            .post("/api/v1/payments")
            .json(&app.payment_body(amount))
            .await;
        response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(response.json::<Value>()["code"], "INVALID_AMOUNT");
    }
}

// ============================================================================
// Registrations
// ============================================================================

#[tokio::test]
async fn test_registration_rules() {
    let app = TestApp::new(2).await;
    let registration = |member: usize, workshop: usize, quantity: u32| {
        json!({
            "member_id": app.scenario.members[member].id,
            "workshop_id": app.scenario.workshops[workshop].id,
            "season_id": app.scenario.season_id(),
            "quantity": quantity,
        })
    };

    let response = app
        .server
        .post("/api/v1/registrations")
        .json(&registration(1, 0, 1))
        .await;
    response.assert_status(StatusCode::CREATED);
    let body = response.json::<Value>();
    assert_eq!(decimal(&body["registration"]["total_price"]), Decimal::from(108));

    let duplicate = app
        .server
        .post("/api/v1/registrations")
        .json(&registration(1, 0, 1))
        .await;
    duplicate.assert_status(StatusCode::CONFLICT);
    assert_eq!(duplicate.json::<Value>()["code"], "WORKSHOP_REGISTRATION_ALREADY_EXISTS");

    let multiple = app
        .server
        .post("/api/v1/registrations")
        .json(&registration(0, 0, 2))
        .await;
    multiple.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(multiple.json::<Value>()["code"], "MULTIPLE_NOT_ALLOWED");

    let capped = app
        .server
        .post("/api/v1/registrations")
        .json(&registration(0, 1, 4))
        .await;
    capped.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(capped.json::<Value>()["code"], "MAX_PER_MEMBER_EXCEEDED");
}

#[tokio::test]
async fn test_registration_reopens_settled_balance() {
    let app = TestApp::new(1).await;
    app.server
        .post("/api/v1/payments")
        .json(&app.payment_body("30.00"))
        .await
        .assert_status(StatusCode::CREATED);

    let response = app
        .server
        .post("/api/v1/registrations")
        .json(&json!({
            "member_id": app.scenario.members[0].id,
            "workshop_id": app.scenario.workshops[1].id,
            "season_id": app.scenario.season_id(),
        }))
        .await;

    response.assert_status(StatusCode::CREATED);
    let body = response.json::<Value>();
    assert_eq!(body["registration"]["quantity"], 1);
    assert_eq!(body["reconciliation"]["transition"]["to"], "pending");
    assert_eq!(decimal(&app.balance().await["balance"]), Decimal::from(40));
}

// ============================================================================
// Seasons
// ============================================================================

#[tokio::test]
async fn test_season_creation_and_activation() {
    let app = TestApp::new(0).await;
    let season = |start_year: i32| {
        json!({
            "start_year": start_year,
            "end_year": start_year + 1,
            "membership_amount": "45.00",
        })
    };

    let response = app.server.post("/api/v1/seasons").json(&season(2030)).await;
    response.assert_status(StatusCode::CREATED);
    let created = response.json::<Value>();
    assert_eq!(created["status"], "inactive");
    let id = created["id"].as_str().unwrap().to_string();

    let response = app.server.post(&format!("/api/v1/seasons/{id}/activate")).await;
    response.assert_status_ok();
    assert_eq!(response.json::<Value>()["status"], "active");

    let duplicate = app.server.post("/api/v1/seasons").json(&season(2030)).await;
    duplicate.assert_status(StatusCode::CONFLICT);
    assert_eq!(duplicate.json::<Value>()["code"], "SEASON_ALREADY_EXISTS");

    let inverted = app
        .server
        .post("/api/v1/seasons")
        .json(&json!({ "start_year": 2031, "end_year": 2031, "membership_amount": "45.00" }))
        .await;
    inverted.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(inverted.json::<Value>()["code"], "INVALID_SEASON_STARTYEAR_ENDYEAR");

    let sub_cent = app
        .server
        .post("/api/v1/seasons")
        .json(&json!({ "start_year": 2032, "end_year": 2033, "membership_amount": "45.005" }))
        .await;
    sub_cent.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(sub_cent.json::<Value>()["code"], "INVALID_AMOUNT");

    let unknown = app
        .server
        .post(&format!("/api/v1/seasons/{}/activate", uuid::Uuid::new_v4()))
        .await;
    unknown.assert_status(StatusCode::NOT_FOUND);
}

// ============================================================================
// Invoices
// ============================================================================

#[tokio::test]
async fn test_draft_then_issued_invoice() {
    let app = TestApp::new(2).await;

    let response = app.server.get(&app.family_path("invoice")).await;
    response.assert_status_ok();
    let draft = response.json::<Value>();
    assert_eq!(draft["status"], "draft");
    assert_eq!(draft["items"].as_array().unwrap().len(), 2);
    assert!(draft["invoice_number"].is_null());

    let response = app.server.post(&app.family_path("invoice/issue")).await;
    response.assert_status(StatusCode::CREATED);
    let issued = response.json::<Value>();
    assert_eq!(issued["status"], "issued");
    assert_eq!(issued["invoice_number"], "INV-2024-00001");
    assert_eq!(decimal(&issued["total_amount"]), Decimal::from(60));

    let again = app.server.post(&app.family_path("invoice/issue")).await;
    again.assert_status(StatusCode::CONFLICT);
    assert_eq!(again.json::<Value>()["code"], "INVOICE_ALREADY_ISSUED");
}

#[tokio::test]
async fn test_empty_invoice_cannot_be_issued() {
    let app = TestApp::new(0).await;

    let response = app.server.post(&app.family_path("invoice/issue")).await;

    response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(response.json::<Value>()["code"], "EMPTY_INVOICE");
}
