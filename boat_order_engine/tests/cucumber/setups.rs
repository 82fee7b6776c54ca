use boat_order_engine::{
    db_types::{NewPickupPoint, NewProduct, ProductType, Rubles},
    CatalogManagement,
};
use cucumber::given;

use crate::{
    cucumber::{world::OrderSystem, OrderWorld},
    support::provider::ProviderMode,
};

#[given("a fresh install")]
async fn fresh_database(world: &mut OrderWorld) {
    let system = OrderSystem::new().await;
    world.system = Some(system);
}

#[given(expr = "an active boat {string} with id {int} priced at {int} rubles")]
async fn active_boat(world: &mut OrderWorld, name: String, id: i64, price: i64) {
    let product = NewProduct::new(name, Rubles::from(price), ProductType::Boat).with_id(id);
    world.api().db().insert_product(product).await.expect("Error inserting product");
}

#[given(expr = "an inactive boat {string} with id {int} priced at {int} rubles")]
async fn inactive_boat(world: &mut OrderWorld, name: String, id: i64, price: i64) {
    let product = NewProduct::new(name, Rubles::from(price), ProductType::Boat).with_id(id).inactive();
    world.api().db().insert_product(product).await.expect("Error inserting product");
}

#[given(expr = "a pickup point {string} with id {int} at {string} open {string}")]
async fn pickup_point(world: &mut OrderWorld, name: String, id: i64, address: String, hours: String) {
    let point = NewPickupPoint::new(name, address, hours).with_id(id);
    world.api().db().insert_pickup_point(point).await.expect("Error inserting pickup point");
}

#[given("the payment provider is unavailable")]
async fn provider_unavailable(world: &mut OrderWorld) {
    world.system().provider.set_mode(ProviderMode::Unavailable);
}

#[given("the payment provider rejects payments")]
async fn provider_rejects(world: &mut OrderWorld) {
    world.system().provider.set_mode(ProviderMode::Reject);
}
