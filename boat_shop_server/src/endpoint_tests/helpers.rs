use actix_web::{
    body::MessageBody,
    http::{header, StatusCode},
    test,
    test::TestRequest,
    web,
    App,
};
use boat_order_engine::{
    db_types::{NewPickupPoint, NewProduct, ProductType, Rubles},
    test_utils::prepare_env::{prepare_test_env, random_db_path, tear_down},
    CatalogManagement,
    OrderFlowApi,
    SqliteDatabase,
};
use chrono::{Duration, Utc};
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use log::debug;
use shop_common::Secret;

use super::mocks::MockProvider;
use crate::{
    auth::{JwtClaims, TokenVerifier},
    config::AuthConfig,
    server::configure_routes,
};

// Test-only secrets. DO NOT re-use these anywhere.
pub const JWT_SECRET: &str = "endpoint-test-jwt-secret";
pub const WEBHOOK_SECRET: &str = "endpoint-test-webhook-secret";

pub const ADMIN_ID: i64 = 1;
pub const ALICE_ID: i64 = 42;
pub const BOB_ID: i64 = 43;

pub type TestApi = OrderFlowApi<SqliteDatabase, MockProvider>;

pub fn issue_token(user_id: i64, is_superuser: bool, is_active: bool) -> String {
    let claims = JwtClaims {
        sub: user_id.to_string(),
        is_active,
        is_superuser,
        exp: (Utc::now() + Duration::days(1)).timestamp(),
    };
    encode(&Header::new(Algorithm::HS256), &claims, &EncodingKey::from_secret(JWT_SECRET.as_bytes()))
        .expect("Failed to sign token")
}

pub fn user_token(user_id: i64) -> String {
    issue_token(user_id, false, true)
}

pub fn admin_token() -> String {
    issue_token(ADMIN_ID, true, true)
}

pub fn bearer(token: &str) -> (header::HeaderName, String) {
    (header::AUTHORIZATION, format!("Bearer {token}"))
}

/// A migrated database holding an active boat (#7), an inactive boat (#8) and one pickup point (#3).
pub async fn seeded_database() -> SqliteDatabase {
    let url = random_db_path();
    prepare_test_env(&url).await;
    let db = SqliteDatabase::new_with_url(&url, 5).await.expect("Error creating connection to database");
    let skiff = NewProduct::new("Skiff-300", Rubles::from(450_000), ProductType::Boat).with_id(7);
    db.insert_product(skiff).await.expect("Error inserting product");
    let dinghy = NewProduct::new("Dinghy-200", Rubles::from(90_000), ProductType::Boat).with_id(8).inactive();
    db.insert_product(dinghy).await.expect("Error inserting product");
    let central = NewPickupPoint::new("Central", "Main 10", "Mo-Fr 9-18").with_id(3);
    db.insert_pickup_point(central).await.expect("Error inserting pickup point");
    db
}

pub async fn new_api(provider: MockProvider) -> web::Data<TestApi> {
    web::Data::new(OrderFlowApi::new(seeded_database().await, provider))
}

pub async fn finish(api: web::Data<TestApi>) {
    tear_down(api.db().clone()).await;
}

/// Sends `req` through the full set of routes and returns the status and body. Errors raised by the middleware are
/// rendered the same way the server would render them.
pub async fn send(api: &web::Data<TestApi>, req: TestRequest) -> (StatusCode, String) {
    let verifier = TokenVerifier::new(&AuthConfig::new(JWT_SECRET));
    let app = App::new().app_data(api.clone()).configure(move |cfg| {
        configure_routes::<SqliteDatabase, MockProvider>(cfg, verifier, Secret::new(WEBHOOK_SECRET.to_string()), true)
    });
    let service = test::init_service(app).await;
    debug!("Making request");
    match test::try_call_service(&service, req.to_request()).await {
        Ok(res) => {
            let status = res.status();
            let body = test::read_body(res).await;
            (status, String::from_utf8_lossy(&body).into_owned())
        },
        Err(e) => {
            let res = e.error_response();
            let status = res.status();
            let body = res.into_body().try_into_bytes().map(|b| String::from_utf8_lossy(&b).into_owned());
            (status, body.unwrap_or_default())
        },
    }
}

pub fn json(body: &str) -> serde_json::Value {
    serde_json::from_str(body).unwrap_or_else(|e| panic!("Response is not JSON ({e}): {body}"))
}
