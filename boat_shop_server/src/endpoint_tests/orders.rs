use actix_web::{http::StatusCode, test::TestRequest};
use boat_order_engine::{db_types::Rubles, ProviderError};
use serde_json::json;

use super::{
    helpers::{admin_token, bearer, finish, issue_token, json, new_api, send, user_token, ALICE_ID, BOB_ID},
    mocks::{accepting_provider, intent_for, MockProvider},
};

fn place_order(token: &str, product_id: i64, pickup_point_id: i64) -> TestRequest {
    TestRequest::post()
        .uri("/orders/")
        .insert_header(bearer(token))
        .set_json(json!({ "product_id": product_id, "pickup_point_id": pickup_point_id }))
}

fn set_status(token: &str, order_id: i64, status: &str) -> TestRequest {
    TestRequest::patch().uri(&format!("/orders/{order_id}/")).insert_header(bearer(token)).set_json(json!({ "status": status }))
}

fn get(token: &str, path: &str) -> TestRequest {
    TestRequest::get().uri(path).insert_header(bearer(token))
}

#[actix_web::test]
async fn health_check() {
    let api = new_api(MockProvider::new()).await;
    let (status, body) = send(&api, TestRequest::get().uri("/health")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "👍️\n");
    finish(api).await;
}

#[actix_web::test]
async fn place_an_order() {
    let mut provider = MockProvider::new();
    provider
        .expect_create_payment()
        .withf(|req| {
            req.amount == Rubles::from(450_000) &&
                req.idempotence_key == format!("order-{}", req.order_id) &&
                req.description == format!("Order #{}", req.order_id)
        })
        .times(1)
        .returning(|req| Ok(intent_for(req.order_id)));
    let api = new_api(provider).await;
    let (status, body) = send(&api, place_order(&user_token(ALICE_ID), 7, 3)).await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    let order = json(&body);
    let id = order["id"].as_i64().unwrap();
    assert_eq!(order["status"], "pending");
    assert_eq!(order["user_id"], ALICE_ID);
    assert_eq!(order["total_price"], 450_000);
    assert_eq!(order["product_name"], "Skiff-300");
    assert_eq!(order["pickup_point_name"], "Central");
    assert_eq!(order["payment_id"], format!("pay-{id}"));
    assert_eq!(order["payment_url"], format!("https://yoomoney.example/checkout/pay-{id}"));
    assert!(order["expires_at"].is_string());
    finish(api).await;
}

#[actix_web::test]
async fn orders_need_a_valid_token() {
    let api = new_api(MockProvider::new()).await;
    let req = TestRequest::post().uri("/orders/").set_json(json!({ "product_id": 7, "pickup_point_id": 3 }));
    let (status, body) = send(&api, req).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(json(&body)["error"], "unauthorized");

    let mut token = user_token(ALICE_ID);
    token.replace_range(token.len() - 10..token.len() - 5, "00000");
    let (status, body) = send(&api, get(&token, "/orders/")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(json(&body)["error"], "unauthorized");

    let (status, body) = send(&api, place_order(&issue_token(ALICE_ID, false, false), 7, 3)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(json(&body)["error"], "forbidden");
    finish(api).await;
}

#[actix_web::test]
async fn unorderable_requests() {
    // The provider is never consulted for any of these
    let api = new_api(MockProvider::new()).await;
    let token = user_token(ALICE_ID);

    let (status, body) = send(&api, place_order(&token, 8, 3)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json(&body)["error"], "unavailable");

    let (status, body) = send(&api, place_order(&token, 7, 99)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json(&body)["error"], "not_found");

    let (status, body) = send(&api, place_order(&token, 404, 3)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json(&body)["error"], "not_found");

    let req = TestRequest::post()
        .uri("/orders/")
        .insert_header(bearer(&token))
        .set_json(json!({ "product_id": "seven", "pickup_point_id": 3 }));
    let (status, body) = send(&api, req).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json(&body)["error"], "bad_request");

    let (status, body) = send(&api, get(&token, "/orders/")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json(&body), json!([]));
    finish(api).await;
}

#[actix_web::test]
async fn provider_outage_cancels_the_order() {
    let mut provider = MockProvider::new();
    provider
        .expect_create_payment()
        .times(1)
        .returning(|_| Err(ProviderError::Unavailable("connection timed out".into())));
    let api = new_api(provider).await;
    let token = user_token(ALICE_ID);
    let (status, body) = send(&api, place_order(&token, 7, 3)).await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(json(&body)["error"], "payment_unavailable");

    let (status, body) = send(&api, get(&token, "/orders/")).await;
    assert_eq!(status, StatusCode::OK);
    let orders = json(&body);
    let orders = orders.as_array().unwrap();
    assert_eq!(orders.len(), 1);
    assert_eq!(orders[0]["status"], "cancelled");
    assert!(orders[0]["payment_id"].is_null());
    finish(api).await;
}

#[actix_web::test]
async fn provider_rejection_is_reported() {
    let mut provider = MockProvider::new();
    provider.expect_create_payment().times(1).returning(|_| Err(ProviderError::Rejected("invalid_request".into())));
    let api = new_api(provider).await;
    let (status, body) = send(&api, place_order(&user_token(ALICE_ID), 7, 3)).await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(json(&body)["error"], "provider_rejected");
    finish(api).await;
}

#[actix_web::test]
async fn users_only_see_their_own_orders() {
    let api = new_api(accepting_provider()).await;
    let alice = user_token(ALICE_ID);
    let bob = user_token(BOB_ID);
    let (_, body) = send(&api, place_order(&alice, 7, 3)).await;
    let alices_order = json(&body)["id"].as_i64().unwrap();
    send(&api, place_order(&alice, 7, 3)).await;
    send(&api, place_order(&bob, 7, 3)).await;

    let (status, body) = send(&api, get(&alice, "/orders/")).await;
    assert_eq!(status, StatusCode::OK);
    let orders = json(&body);
    let orders = orders.as_array().unwrap();
    assert_eq!(orders.len(), 2);
    assert!(orders.iter().all(|o| o["user_id"] == ALICE_ID));

    let path = format!("/orders/{alices_order}/");
    let (status, body) = send(&api, get(&alice, &path)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json(&body)["id"], alices_order);

    let (status, body) = send(&api, get(&bob, &path)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json(&body)["error"], "not_found");

    let (status, body) = send(&api, get(&admin_token(), &path)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json(&body)["user_id"], ALICE_ID);

    let (status, body) = send(&api, get(&alice, "/orders/abc/")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json(&body)["error"], "bad_request");
    finish(api).await;
}

#[actix_web::test]
async fn only_admins_list_every_order() {
    let api = new_api(accepting_provider()).await;
    send(&api, place_order(&user_token(ALICE_ID), 7, 3)).await;
    send(&api, place_order(&user_token(BOB_ID), 7, 3)).await;

    let (status, body) = send(&api, get(&user_token(ALICE_ID), "/orders/all-orders")).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(json(&body)["error"], "forbidden");

    let (status, body) = send(&api, get(&admin_token(), "/orders/all-orders")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json(&body).as_array().unwrap().len(), 2);
    finish(api).await;
}

#[actix_web::test]
async fn admins_change_order_status() {
    let api = new_api(accepting_provider()).await;
    let (_, body) = send(&api, place_order(&user_token(ALICE_ID), 7, 3)).await;
    let id = json(&body)["id"].as_i64().unwrap();

    let (status, body) = send(&api, set_status(&user_token(ALICE_ID), id, "cancelled")).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(json(&body)["error"], "forbidden");

    let admin = admin_token();
    let (status, body) = send(&api, set_status(&admin, id, "completed")).await;
    assert_eq!(status, StatusCode::CONFLICT);
    let body = json(&body);
    assert_eq!(body["error"], "invalid_transition");
    assert_eq!(body["current"], "pending");
    assert_eq!(body["requested"], "completed");

    let (status, body) = send(&api, set_status(&admin, id, "shipped")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json(&body)["error"], "bad_request");

    let (status, body) = send(&api, set_status(&admin, 999, "cancelled")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json(&body)["error"], "not_found");

    let (status, body) = send(&api, set_status(&admin, id, "pending")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json(&body)["status"], "pending");

    let (status, body) = send(&api, set_status(&admin, id, "cancelled")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json(&body)["status"], "cancelled");

    let (_, body) = send(&api, get(&user_token(ALICE_ID), &format!("/orders/{id}/"))).await;
    assert_eq!(json(&body)["status"], "cancelled");
    finish(api).await;
}

#[actix_web::test]
async fn order_paths_work_without_a_trailing_slash() {
    let api = new_api(accepting_provider()).await;
    let (_, body) = send(&api, place_order(&user_token(ALICE_ID), 7, 3)).await;
    let id = json(&body)["id"].as_i64().unwrap();

    let (status, body) = send(&api, get(&user_token(ALICE_ID), &format!("/orders/{id}"))).await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(json(&body)["id"], id);

    let (status, body) = send(&api, get(&user_token(BOB_ID), &format!("/orders/{id}"))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json(&body)["error"], "not_found");

    let req = TestRequest::patch()
        .uri(&format!("/orders/{id}"))
        .insert_header(bearer(&admin_token()))
        .set_json(json!({ "status": "cancelled" }));
    let (status, body) = send(&api, req).await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(json(&body)["status"], "cancelled");

    // The literal route still wins over the order id
    let (status, _) = send(&api, get(&admin_token(), "/orders/all-orders")).await;
    assert_eq!(status, StatusCode::OK);
    finish(api).await;
}

#[actix_web::test]
async fn unknown_routes_get_an_error_body() {
    let api = new_api(MockProvider::new()).await;
    let (status, body) = send(&api, TestRequest::get().uri("/boats")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let body = json(&body);
    assert_eq!(body["error"], "not_found");
    assert_eq!(body["message"], "No route for GET /boats");

    let (status, body) = send(&api, TestRequest::delete().uri("/health")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json(&body)["error"], "not_found");

    let (status, body) = send(&api, get(&user_token(ALICE_ID), "/orders/7/items")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json(&body)["error"], "not_found");
    finish(api).await;
}
