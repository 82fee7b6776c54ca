use actix_web::{
    http::{header::ContentType, StatusCode},
    test::TestRequest,
    web,
};
use boat_order_engine::db_types::{Order, OrderStatusType};
use serde_json::json;
use yookassa_tools::helpers::{calculate_signature, SIGNATURE_HEADER};

use super::{
    helpers::{finish, json, new_api, send, TestApi, ALICE_ID, WEBHOOK_SECRET},
    mocks::accepting_provider,
};

fn notification(event: &str, status: &str, payment_id: &str, order_id: Option<i64>) -> String {
    let metadata = match order_id {
        Some(id) => json!({ "order_id": id.to_string() }),
        None => json!({}),
    };
    json!({
        "type": "notification",
        "event": event,
        "object": { "id": payment_id, "status": status, "paid": status == "succeeded", "metadata": metadata }
    })
    .to_string()
}

fn payment_succeeded(order: &Order) -> String {
    notification("payment.succeeded", "succeeded", &format!("pay-{}", order.id), Some(order.id))
}

fn webhook(body: String, signature: Option<String>) -> TestRequest {
    let mut req = TestRequest::post().uri("/webhooks/yookassa").insert_header(ContentType::json());
    if let Some(sig) = signature {
        req = req.insert_header((SIGNATURE_HEADER, sig));
    }
    req.set_payload(body)
}

fn signed(body: String) -> TestRequest {
    let signature = calculate_signature(WEBHOOK_SECRET, body.as_bytes());
    webhook(body, Some(signature))
}

async fn pending_order(api: &web::Data<TestApi>) -> Order {
    api.create_order(ALICE_ID, 7, 3).await.expect("Order could not be placed")
}

async fn status_of(api: &web::Data<TestApi>, order_id: i64) -> OrderStatusType {
    api.fetch_order(order_id).await.expect("Order has vanished").status
}

#[actix_web::test]
async fn unsigned_notifications_are_refused() {
    let api = new_api(accepting_provider()).await;
    let order = pending_order(&api).await;

    let (status, body) = send(&api, webhook(payment_succeeded(&order), None)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json(&body)["error"], "bad_request");

    let forged = calculate_signature("not-the-shop-secret", payment_succeeded(&order).as_bytes());
    let (status, body) = send(&api, webhook(payment_succeeded(&order), Some(forged))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json(&body)["error"], "bad_request");

    assert_eq!(status_of(&api, order.id).await, OrderStatusType::Pending);
    finish(api).await;
}

#[actix_web::test]
async fn tampered_notifications_are_refused() {
    let api = new_api(accepting_provider()).await;
    let order = pending_order(&api).await;
    let genuine = payment_succeeded(&order);
    let signature = calculate_signature(WEBHOOK_SECRET, genuine.as_bytes());

    let len = genuine.len();
    for pos in [0, len / 3, len / 2, len - 2, len - 1] {
        let mut bytes = genuine.clone().into_bytes();
        bytes[pos] ^= 0x01;
        let tampered = String::from_utf8(bytes).expect("Flipping the low bit keeps ASCII intact");
        let (status, body) = send(&api, webhook(tampered, Some(signature.clone()))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "byte {pos}: {body}");
        assert_eq!(json(&body)["error"], "bad_request");
    }
    assert_eq!(status_of(&api, order.id).await, OrderStatusType::Pending);

    // The untouched body with the same signature still goes through
    let (status, _) = send(&api, webhook(genuine, Some(signature))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(status_of(&api, order.id).await, OrderStatusType::Paid);
    finish(api).await;
}

#[actix_web::test]
async fn successful_payment_marks_the_order_paid() {
    let api = new_api(accepting_provider()).await;
    let order = pending_order(&api).await;

    let (status, body) = send(&api, signed(payment_succeeded(&order))).await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(json(&body), json!({ "status": "ok" }));
    assert_eq!(status_of(&api, order.id).await, OrderStatusType::Paid);

    // The provider may deliver the same notification again
    let (status, body) = send(&api, signed(payment_succeeded(&order))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json(&body), json!({ "status": "ok" }));
    assert_eq!(status_of(&api, order.id).await, OrderStatusType::Paid);
    finish(api).await;
}

#[actix_web::test]
async fn other_events_are_ignored() {
    let api = new_api(accepting_provider()).await;
    let order = pending_order(&api).await;
    let body = notification("payment.canceled", "canceled", &format!("pay-{}", order.id), Some(order.id));
    let (status, body) = send(&api, signed(body)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json(&body), json!({ "status": "ignored" }));
    assert_eq!(status_of(&api, order.id).await, OrderStatusType::Pending);
    finish(api).await;
}

#[actix_web::test]
async fn payment_for_a_cancelled_order_is_acknowledged() {
    let api = new_api(accepting_provider()).await;
    let order = pending_order(&api).await;
    api.update_status(order.id, OrderStatusType::Cancelled).await.expect("Order could not be cancelled");

    let (status, body) = send(&api, signed(payment_succeeded(&order))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json(&body), json!({ "status": "ok" }));
    assert_eq!(status_of(&api, order.id).await, OrderStatusType::Cancelled);
    finish(api).await;
}

#[actix_web::test]
async fn unusable_notifications() {
    let api = new_api(accepting_provider()).await;

    let (status, body) = send(&api, signed("{\"event\": \"payment.succeeded\"".to_string())).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json(&body)["error"], "bad_request");

    let no_order = notification("payment.succeeded", "succeeded", "pay-1", None);
    let (status, body) = send(&api, signed(no_order)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json(&body)["error"], "bad_request");

    let unknown_order = notification("payment.succeeded", "succeeded", "pay-999", Some(999));
    let (status, body) = send(&api, signed(unknown_order)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json(&body)["error"], "not_found");
    finish(api).await;
}
