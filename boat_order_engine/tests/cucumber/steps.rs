use boat_order_engine::{
    db_types::{OrderStatusType, Rubles},
    CatalogManagement,
    PaymentConfirmation,
};
use chrono::Duration;
use cucumber::{then, when};

use crate::{cucumber::OrderWorld, support::provider::TestPaymentProvider};

#[when(expr = "user {int} orders product {int} for pickup at point {int}")]
async fn place_order(world: &mut OrderWorld, user_id: i64, product_id: i64, pickup_point_id: i64) {
    match world.api().create_order(user_id, product_id, pickup_point_id).await {
        Ok(order) => {
            world.last_order = Some(order);
            world.last_error = None;
        },
        Err(e) => world.last_error = Some(e),
    }
}

#[when(expr = "an admin sets the order status to {string}")]
async fn admin_sets_status(world: &mut OrderWorld, status: String) {
    let status = status.parse::<OrderStatusType>().expect("Not a valid order status");
    let id = world.last_order_id();
    match world.api().update_status(id, status).await {
        Ok(order) => {
            world.last_order = Some(order);
            world.last_error = None;
        },
        Err(e) => world.last_error = Some(e),
    }
}

#[when("the payment provider confirms the payment")]
async fn provider_confirms(world: &mut OrderWorld) {
    let id = world.last_order_id();
    let payment_id = TestPaymentProvider::payment_id_for(id);
    let confirmation = world.api().confirm_payment(id, &payment_id).await.expect("Error confirming payment");
    world.last_confirmation = Some(confirmation);
}

#[when(expr = "the price of product {int} changes to {int} rubles")]
async fn change_price(world: &mut OrderWorld, product_id: i64, price: i64) {
    world.api().db().update_product_price(product_id, Rubles::from(price)).await.expect("Error changing price");
}

#[when(expr = "pickup point {int} is renamed to {string}")]
async fn rename_pickup_point(world: &mut OrderWorld, id: i64, name: String) {
    world.api().db().rename_pickup_point(id, &name).await.expect("Error renaming pickup point");
}

#[when(expr = "pickup point {int} is removed")]
async fn remove_pickup_point(world: &mut OrderWorld, id: i64) {
    let removed = world.api().db().delete_pickup_point(id).await.expect("Error removing pickup point");
    assert!(removed, "Pickup point {id} did not exist");
}

#[when(expr = "{int} minutes pass")]
async fn time_passes(world: &mut OrderWorld, minutes: i64) {
    world.system().clock.advance(Duration::minutes(minutes));
}

#[when("the expiry sweep runs")]
async fn expiry_sweep(world: &mut OrderWorld) {
    world.api().expire_unpaid_orders().await.expect("Error expiring orders");
}

#[then("the order succeeds")]
async fn order_succeeds(world: &mut OrderWorld) {
    assert!(world.last_error.is_none(), "Unexpected error: {:?}", world.last_error);
    assert!(world.last_order.is_some(), "No order was placed");
}

#[then(expr = "the request fails with {string}")]
async fn request_fails(world: &mut OrderWorld, tag: String) {
    let err = world.last_error.as_ref().expect("The request did not fail");
    assert_eq!(err.tag(), tag, "Unexpected error: {err}");
}

#[then(expr = "the order status is {string}")]
async fn order_status(world: &mut OrderWorld, status: String) {
    let id = world.last_order_id();
    let order = world.api().fetch_order(id).await.expect("Error fetching order");
    assert_eq!(order.status.to_string(), status);
}

#[then(expr = "the order total is {int} rubles")]
async fn order_total(world: &mut OrderWorld, total: i64) {
    let id = world.last_order_id();
    let order = world.api().fetch_order(id).await.expect("Error fetching order");
    assert_eq!(order.total_price, Rubles::from(total));
}

#[then(expr = "the order is collected from {string} at {string}")]
async fn order_pickup_point(world: &mut OrderWorld, name: String, address: String) {
    let id = world.last_order_id();
    let order = world.api().fetch_order(id).await.expect("Error fetching order");
    assert_eq!(order.pickup_point_name, name);
    assert_eq!(order.pickup_point_address, address);
}

#[then("the order has a payment link")]
async fn order_has_payment(world: &mut OrderWorld) {
    let id = world.last_order_id();
    let order = world.api().fetch_order(id).await.expect("Error fetching order");
    assert_eq!(order.payment_id, Some(TestPaymentProvider::payment_id_for(id)));
    assert!(order.payment_url.is_some_and(|url| url.starts_with("https://")));
    assert!(order.expires_at.is_some());
}

#[then(expr = "the payment provider was asked for {int} rubles for the order")]
async fn provider_request(world: &mut OrderWorld, amount: i64) {
    let id = world.last_order_id();
    let requests = world.system().provider.requests();
    let request = requests.iter().find(|r| r.order_id == id).expect("No payment was requested for the order");
    assert_eq!(request.amount, Rubles::from(amount));
    assert_eq!(request.description, format!("Order #{id}"));
    assert_eq!(request.idempotence_key, format!("order-{id}"));
}

#[then(expr = "user {int} has {int} order(s)")]
async fn user_order_count(world: &mut OrderWorld, user_id: i64, count: usize) {
    let orders = world.api().list_user_orders(user_id).await.expect("Error listing orders");
    assert_eq!(orders.len(), count);
}

#[then(expr = "the latest order of user {int} is {string}")]
async fn latest_order_status(world: &mut OrderWorld, user_id: i64, status: String) {
    let orders = world.api().list_user_orders(user_id).await.expect("Error listing orders");
    let latest = orders.first().expect("User has no orders");
    assert_eq!(latest.status.to_string(), status);
    assert!(latest.payment_id.is_none());
}

#[then("the repeated notification was acknowledged")]
async fn repeated_notification(world: &mut OrderWorld) {
    let confirmation = world.last_confirmation.as_ref().expect("No payment was confirmed");
    assert!(matches!(confirmation, PaymentConfirmation::AlreadyPaid(_)), "Got {confirmation:?}");
}
