use actix_web::{http::StatusCode, test, test::TestRequest, web, web::ServiceConfig, App};
use chrono::{TimeZone, Utc};
use oig_common::Money;
use order_engine::{
    cache::MemoryCache,
    db_types::{Order, OrderId, OrderItem, OrderStatusType},
    test_utils::RecordingPublisher,
    DedupConfig,
    OrderFlowApi,
    OrderQueryApi,
};
use serde_json::json;

use super::helpers::{get_request, post_request};
use crate::{
    endpoint_tests::mocks::MockOrderStore,
    queue::IntakeQueue,
    routes::{enqueue_order, CreateOrderRoute, OrderByExternalIdRoute, OrdersByStatusRoute},
};

#[actix_web::test]
async fn submit_order_returns_created() {
    let _ = env_logger::try_init().ok();
    let body = json!({
        "externalId": "ORDER-001",
        "items": [
            { "productCode": "PROD-001", "quantity": 2, "unitPrice": 50.0 },
            { "productCode": "PROD-002", "quantity": 1, "unitPrice": 19.99 }
        ]
    });
    let (status, body) = post_request("/orders", body, configure_intake).await.expect("Request failed");
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body, ORDER_JSON);
}

#[actix_web::test]
async fn duplicate_submission_returns_conflict() {
    let _ = env_logger::try_init().ok();
    let body = json!({
        "externalId": "ORDER-001",
        "items": [{ "productCode": "PROD-001", "quantity": 1, "unitPrice": 10.0 }]
    });
    let (status, body) = post_request("/orders", body, configure_duplicate).await.expect("Request failed");
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body, r#"{"error":"Order ORDER-001 has already been processed"}"#);
}

#[actix_web::test]
async fn submission_without_items_is_rejected() {
    let _ = env_logger::try_init().ok();
    let body = json!({ "externalId": "ORDER-002", "items": [] });
    let (status, body) = post_request("/orders", body, configure_validation_rejection).await.expect("Request failed");
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, r#"{"error":"The order could not be accepted: Order has no items"}"#);
}

#[actix_web::test]
async fn submission_with_blank_id_is_rejected() {
    let _ = env_logger::try_init().ok();
    let body = json!({
        "externalId": "   ",
        "items": [{ "productCode": "PROD-001", "quantity": 1, "unitPrice": 10.0 }]
    });
    let (status, body) = post_request("/orders", body, configure_intake_untouched).await.expect("Request failed");
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, r#"{"error":"The order could not be accepted: Order has no external id"}"#);
}

#[actix_web::test]
async fn enqueued_submissions_land_on_the_intake_queue() {
    let _ = env_logger::try_init().ok();
    let (intake, mut receiver) = IntakeQueue::new(4);
    let app = App::new().app_data(web::Data::new(intake.producer())).service(enqueue_order);
    let service = test::init_service(app).await;
    let body = json!({
        "externalId": "ORDER-009",
        "items": [{ "productCode": "PROD-001", "quantity": 1, "unitPrice": 10.0 }]
    });
    let req = TestRequest::post().uri("/orders/enqueue").set_json(body).to_request();
    let res = test::call_service(&service, req).await;
    assert_eq!(res.status(), StatusCode::ACCEPTED);
    let queued = receiver.recv().await.expect("nothing was queued");
    assert_eq!(queued.external_id, "ORDER-009");
    assert_eq!(queued.items.len(), 1);
}

#[actix_web::test]
async fn fetch_order_by_external_id() {
    let _ = env_logger::try_init().ok();
    let (status, body) = get_request("/orders/external/ORDER-001", configure_queries).await.expect("Request failed");
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, ORDER_JSON);
}

#[actix_web::test]
async fn fetch_unknown_order_returns_not_found() {
    let _ = env_logger::try_init().ok();
    let (status, body) = get_request("/orders/external/NOPE", configure_queries).await.expect("Request failed");
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, r#"{"error":"The data was not found. No matching order"}"#);
}

#[actix_web::test]
async fn fetch_orders_by_status() {
    let _ = env_logger::try_init().ok();
    let (status, body) = get_request("/orders/status/completed", configure_queries).await.expect("Request failed");
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, format!("[{ORDER_JSON}]"));
}

#[actix_web::test]
async fn fetch_orders_with_bogus_status_is_rejected() {
    let _ = env_logger::try_init().ok();
    let (status, body) = get_request("/orders/status/shipped", configure_queries).await.expect("Request failed");
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, r#"{"error":"Could not read request path: Invalid order status: shipped"}"#);
}

type MockedFlowApi = OrderFlowApi<MockOrderStore, MemoryCache, RecordingPublisher>;
type MockedIntakeRoute = CreateOrderRoute<MockOrderStore, MemoryCache, RecordingPublisher>;

fn intake_app(store: MockOrderStore, cfg: &mut ServiceConfig) {
    let api: MockedFlowApi = OrderFlowApi::new(store, MemoryCache::new(), RecordingPublisher::new(), DedupConfig::default());
    cfg.service(MockedIntakeRoute::new()).app_data(web::Data::new(api));
}

fn configure_intake(cfg: &mut ServiceConfig) {
    let mut store = MockOrderStore::new();
    store.expect_order_exists().returning(|_| Ok(false));
    store.expect_insert_order().returning(|_| Ok(stored_order(OrderStatusType::Processing)));
    store.expect_update_order_status().returning(|_, _| Ok(stored_order(OrderStatusType::Completed)));
    intake_app(store, cfg);
}

fn configure_duplicate(cfg: &mut ServiceConfig) {
    let mut store = MockOrderStore::new();
    store.expect_order_exists().returning(|_| Ok(true));
    intake_app(store, cfg);
}

// a blank-id rejection must happen before the store is ever consulted
fn configure_intake_untouched(cfg: &mut ServiceConfig) {
    intake_app(MockOrderStore::new(), cfg);
}

// validation rejections come after the duplicate screen, so the store answers the existence
// check but must never see a write
fn configure_validation_rejection(cfg: &mut ServiceConfig) {
    let mut store = MockOrderStore::new();
    store.expect_order_exists().returning(|_| Ok(false));
    intake_app(store, cfg);
}

fn configure_queries(cfg: &mut ServiceConfig) {
    let mut store = MockOrderStore::new();
    store.expect_fetch_order_by_order_id().returning(|order_id| {
        if order_id == &OrderId::from("ORDER-001") {
            Ok(Some(stored_order(OrderStatusType::Completed)))
        } else {
            Ok(None)
        }
    });
    store.expect_fetch_orders().returning(|_, _| Ok(vec![stored_order(OrderStatusType::Completed)]));
    let api = OrderQueryApi::new(store);
    cfg.service(OrderByExternalIdRoute::<MockOrderStore>::new())
        .service(OrdersByStatusRoute::<MockOrderStore>::new())
        .app_data(web::Data::new(api));
}

fn stored_order(status: OrderStatusType) -> Order {
    Order {
        id: 1,
        order_id: OrderId::from("ORDER-001"),
        status,
        total_amount: Money::from_cents(11_999),
        created_at: Utc.with_ymd_and_hms(2024, 2, 29, 13, 30, 0).unwrap(),
        updated_at: Utc.with_ymd_and_hms(2024, 2, 29, 13, 30, 0).unwrap(),
        items: vec![
            OrderItem {
                id: 1,
                product_code: "PROD-001".to_string(),
                quantity: 2,
                unit_price: Money::from_cents(5_000),
                total_price: Money::from_cents(10_000),
            },
            OrderItem {
                id: 2,
                product_code: "PROD-002".to_string(),
                quantity: 1,
                unit_price: Money::from_cents(1_999),
                total_price: Money::from_cents(1_999),
            },
        ],
    }
}

const ORDER_JSON: &str = r#"{"id":1,"order_id":"ORDER-001","status":"COMPLETED","total_amount":119.99,"created_at":"2024-02-29T13:30:00Z","updated_at":"2024-02-29T13:30:00Z","items":[{"id":1,"product_code":"PROD-001","quantity":2,"unit_price":50.0,"total_price":100.0},{"id":2,"product_code":"PROD-002","quantity":1,"unit_price":19.99,"total_price":19.99}]}"#;
